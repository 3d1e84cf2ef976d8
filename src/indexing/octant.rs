//! The octree node.

use crate::maths::distance::distance_squared;
use crate::maths::vector3::Vector3;
use crate::maths::z_ordering::determine_direction;
use crate::types::RealScalar;

/// One node of the octree: a leaf holding point indices, or a branch
/// holding exactly 8 children.
///
/// The 0-or-8 invariant is carried by the type: `children` is either
/// `None` (leaf) or a boxed array of all eight children (branch). A
/// branch's own point bucket is always empty; points migrate to the
/// children when a leaf splits.
#[derive(Debug)]
pub struct Octant<T: RealScalar> {
    /// Geometric center of the octant.
    pub center: Vector3<T>,
    /// Half-width per axis.
    pub extent: Vector3<T>,
    /// `center - extent`.
    pub aabb_min: Vector3<T>,
    /// `center + extent`.
    pub aabb_max: Vector3<T>,
    /// Indices into the externally owned point array. Non-empty only on
    /// leaves; every held point lies within `[aabb_min, aabb_max]`.
    pub points: Vec<usize>,
    /// Empty for a leaf, all eight children for a branch.
    pub children: Option<Box<[Octant<T>; 8]>>,
}

impl<T: RealScalar> Octant<T> {
    /// Creates a childless octant with the given center and half-extent.
    pub fn new(center: Vector3<T>, extent: Vector3<T>) -> Self {
        Self {
            center,
            extent,
            aabb_min: center - extent,
            aabb_max: center + extent,
            points: Vec::new(),
            children: None,
        }
    }

    /// True when the octant has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// True when the point bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Child slot (0-7) the given point belongs to, by Morton direction
    /// code relative to the octant center.
    pub fn child_octant(&self, point: &Vector3<T>) -> u8 {
        determine_direction(&self.center, point)
    }

    /// Minimum possible squared distance from the octant's box to a point;
    /// zero when the point is inside.
    ///
    /// Clamps the query coordinate into the box per axis, so the value is a
    /// true lower bound on the distance to any point held in this subtree.
    pub fn minimum_distance_squared(&self, point: &Vector3<T>) -> T {
        let zero = T::zero();
        let dx = (self.aabb_min.x - point.x).max(zero).max(point.x - self.aabb_max.x);
        let dy = (self.aabb_min.y - point.y).max(zero).max(point.y - self.aabb_max.y);
        let dz = (self.aabb_min.z - point.z).max(zero).max(point.z - self.aabb_max.z);
        dx * dx + dy * dy + dz * dz
    }

    /// True when the octant's box overlaps the sphere around `point`.
    pub fn within_sphere(&self, point: &Vector3<T>, radius: T, radius_squared: T) -> bool {
        let abs_rel = Vector3::new(
            (point.x - self.center.x).abs(),
            (point.y - self.center.y).abs(),
            (point.z - self.center.z).abs(),
        );

        // Minkowski sum of the box and the sphere radius.
        if abs_rel.x > radius + self.extent.x
            || abs_rel.y > radius + self.extent.y
            || abs_rel.z > radius + self.extent.z
        {
            return false;
        }

        // Overlapping a face, or fully inside.
        if abs_rel.x < self.extent.x || abs_rel.y < self.extent.y || abs_rel.z < self.extent.z {
            return true;
        }

        // Corner case: exact distance from the nearest corner.
        distance_squared(&self.extent, &abs_rel) < radius_squared
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    fn octant() -> Octant<f64> {
        Octant::new(Vector3::splat(0.0), Vector3::splat(1.0))
    }

    #[test]
    fn aabb_derivation() {
        let o = octant();
        assert_eq!(o.aabb_min, Vector3::splat(-1.0));
        assert_eq!(o.aabb_max, Vector3::splat(1.0));
        assert!(o.is_leaf());
        assert!(o.is_empty());
    }

    #[test]
    fn minimum_distance_inside_is_zero() {
        let o = octant();
        assert_relative_eq!(
            o.minimum_distance_squared(&Vector3::new(0.5, -0.5, 0.25)),
            0.0
        );
    }

    #[test]
    fn minimum_distance_outside() {
        let o = octant();
        // 2 beyond the +x face.
        assert_relative_eq!(
            o.minimum_distance_squared(&Vector3::new(3.0, 0.0, 0.0)),
            4.0
        );
        // Diagonal past the (+,+,+) corner by (1,1,1).
        assert_relative_eq!(
            o.minimum_distance_squared(&Vector3::new(2.0, 2.0, 2.0)),
            3.0
        );
    }

    #[test]
    fn sphere_overlap() {
        let o = octant();
        // Sphere centered beyond the face but overlapping it.
        assert!(o.within_sphere(&Vector3::new(2.5, 0.0, 0.0), 2.0, 4.0));
        // Too far away.
        assert!(!o.within_sphere(&Vector3::new(5.0, 0.0, 0.0), 2.0, 4.0));
        // Corner case: sphere near the (+,+,+) corner, just out of reach.
        let corner_query = Vector3::new(2.0, 2.0, 2.0);
        assert!(!o.within_sphere(&corner_query, 1.0, 1.0));
        assert!(o.within_sphere(&corner_query, 1.8, 1.8 * 1.8));
    }

    #[test]
    fn child_slot_matches_direction_code() {
        let o = octant();
        assert_eq!(o.child_octant(&Vector3::new(0.8, 0.7, 0.8)), 7);
        assert_eq!(o.child_octant(&Vector3::new(0.5, -0.1, 0.9)), 5);
        assert_eq!(o.child_octant(&Vector3::new(-0.5, -0.5, -0.5)), 0);
    }
}
