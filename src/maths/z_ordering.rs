//! Morton/Z-order direction codes.

use crate::maths::vector3::Vector3;
use crate::types::RealScalar;

/// Determines the direction code (0-7) of a point relative to an origin.
///
/// One bit per axis, set when the point's coordinate is >= the origin's:
/// x contributes 4, y contributes 2, z contributes 1. Boundary ties resolve
/// to the high side. The code doubles as the child slot during octree
/// insertion and as the bin index of the field-of-points search, so it must
/// stay consistent with the child-splitting offsets in the octree.
///
/// ```text
///      3------7.
///      |`.    | `.
///      |  `2--+---6
///      |   |  |   |
///      1---+--5.  |
///       `. |    `.|
///         `0------4
/// ```
pub fn determine_direction<T: RealScalar>(origin: &Vector3<T>, p: &Vector3<T>) -> u8 {
    let mut direction = 0;
    if p.x >= origin.x {
        direction |= 4;
    }
    if p.y >= origin.y {
        direction |= 2;
    }
    if p.z >= origin.z {
        direction |= 1;
    }
    direction
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn codes_relative_to_origin() {
        let origin = Vector3::new(0.0, 0.0, 0.0);
        assert_eq!(determine_direction(&origin, &Vector3::new(0.8, 0.7, 0.8)), 7);
        assert_eq!(determine_direction(&origin, &Vector3::new(0.5, -0.1, 0.9)), 5);
        assert_eq!(
            determine_direction(&origin, &Vector3::new(-0.5, 0.1, -0.9)),
            2
        );
        assert_eq!(
            determine_direction(&origin, &Vector3::new(-1.0, -1.0, -1.0)),
            0
        );
    }

    #[test]
    fn ties_resolve_to_the_high_side() {
        let origin = Vector3::new(1.0, 2.0, 3.0);
        assert_eq!(determine_direction(&origin, &origin), 7);
        assert_eq!(
            determine_direction(&origin, &Vector3::new(1.0, 1.9, 3.0)),
            5
        );
    }
}
