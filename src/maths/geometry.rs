//! Element containment solvers and shape functions.
//!
//! Each solver inverts the element's coordinate map with a closed-form
//! Cramer's-rule 3x3 solve (no iterative solver) and reports containment
//! of the query point against a tolerance window widened by `slack`. The
//! wedge and hexahedron maps are multilinear; their systems drop the
//! bilinear coupling terms, which is exact for prismatic and
//! parallelepiped-shaped elements and a best-effort approximation
//! otherwise, in keeping with the relaxation policy of the containment
//! search.

use crate::maths::element_type::ElementType;
use crate::maths::vector3::Vector3;
use crate::types::RealScalar;

/// Parametric coordinates of a query point inside its containing element.
///
/// Used downstream to evaluate shape functions at the query point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MuesfData<T: RealScalar> {
    /// First local coordinate.
    pub g: T,
    /// Second local coordinate.
    pub h: T,
    /// Third local coordinate.
    pub r: T,
}

/// Scalar triple product `a . (b x c)`, the determinant of the column
/// matrix `[a b c]`.
fn det3<T: RealScalar>(a: &Vector3<T>, b: &Vector3<T>, c: &Vector3<T>) -> T {
    let bc = b.cross(c);
    a.x * bc.x + a.y * bc.y + a.z * bc.z
}

/// Solves `[a b c] (g, h, r)^T = rhs` by Cramer's rule.
///
/// A degenerate element yields a zero determinant and non-finite local
/// coordinates; those fail every window comparison downstream, so the
/// element is simply reported as non-containing.
fn solve3<T: RealScalar>(
    a: &Vector3<T>,
    b: &Vector3<T>,
    c: &Vector3<T>,
    rhs: &Vector3<T>,
) -> (T, T, T) {
    let det = det3(a, b, c);
    let g = det3(rhs, b, c) / det;
    let h = det3(a, rhs, c) / det;
    let r = det3(a, b, rhs) / det;
    (g, h, r)
}

/// Tetrahedron containment: local coordinates from the affine map anchored
/// at node 0, contained when `g, h, r > -slack` and `g + h + r < 1 + slack`.
///
/// The element centroid maps to `g = h = r = 0.25`.
pub fn tetrahedron_containment<T: RealScalar>(
    points: &[Vector3<T>],
    element: &[usize],
    query: &Vector3<T>,
    slack: T,
) -> Option<MuesfData<T>> {
    let c0 = points[element[0]];
    let e1 = points[element[1]] - c0;
    let e2 = points[element[2]] - c0;
    let e3 = points[element[3]] - c0;
    let (g, h, r) = solve3(&e1, &e2, &e3, &(*query - c0));

    let lo = -slack;
    let hi = T::one() + slack;
    if g > lo && h > lo && r > lo && g + h + r < hi {
        Some(MuesfData { g, h, r })
    } else {
        None
    }
}

/// Wedge (6-node) containment: nodes 0-2 span the bottom triangle
/// (`r = -1`), nodes 3-5 the top (`r = +1`). Contained when `g, h` lie in
/// `(-slack, 1 + slack)` and `r` in `(-1 - slack, 1 + slack)`.
///
/// The element centroid maps to `g = h = 1/3`, `r = 0`.
pub fn wedge_containment<T: RealScalar>(
    points: &[Vector3<T>],
    element: &[usize],
    query: &Vector3<T>,
    slack: T,
) -> Option<MuesfData<T>> {
    let half = T::from(0.5).unwrap();
    let sixth = T::from(6.0).unwrap().recip();
    let c: Vec<Vector3<T>> = element.iter().map(|&n| points[n]).collect();

    // Midplane anchor and in-plane/axial directions of the prism.
    let anchor = (c[0] + c[3]) * half;
    let col_g = (c[1] + c[4] - c[0] - c[3]) * half;
    let col_h = (c[2] + c[5] - c[0] - c[3]) * half;
    let col_r = (c[3] - c[0] + c[4] - c[1] + c[5] - c[2]) * sixth;
    let (g, h, r) = solve3(&col_g, &col_h, &col_r, &(*query - anchor));

    let lo = -slack;
    let hi = T::one() + slack;
    let axial_lo = -T::one() - slack;
    if g > lo && g < hi && h > lo && h < hi && r > axial_lo && r < hi {
        Some(MuesfData { g, h, r })
    } else {
        None
    }
}

/// Hexahedron (8-node) containment: trilinear node ordering with `g`, `h`
/// and `r` each spanning `[-1, 1]`. Contained when all three lie in
/// `(-1 - slack, 1 + slack)`.
///
/// The element centroid maps to `g = h = r = 0`.
pub fn hexahedron_containment<T: RealScalar>(
    points: &[Vector3<T>],
    element: &[usize],
    query: &Vector3<T>,
    slack: T,
) -> Option<MuesfData<T>> {
    let c: Vec<Vector3<T>> = element.iter().map(|&n| points[n]).collect();
    let sum = c.iter().fold(Vector3::default(), |acc, &v| acc + v);

    // Sign of each local axis at the trilinear corner nodes.
    const SIGN_G: [f64; 8] = [-1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0];
    const SIGN_H: [f64; 8] = [-1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0];
    const SIGN_R: [f64; 8] = [-1.0, -1.0, -1.0, -1.0, 1.0, 1.0, 1.0, 1.0];

    let mut col_g = Vector3::default();
    let mut col_h = Vector3::default();
    let mut col_r = Vector3::default();
    for (i, &v) in c.iter().enumerate() {
        col_g += v * T::from(SIGN_G[i]).unwrap();
        col_h += v * T::from(SIGN_H[i]).unwrap();
        col_r += v * T::from(SIGN_R[i]).unwrap();
    }

    let eight = T::from(8.0).unwrap();
    let rhs = *query * eight - sum;
    let (g, h, r) = solve3(&col_g, &col_h, &col_r, &rhs);

    let lo = -T::one() - slack;
    let hi = T::one() + slack;
    if g > lo && g < hi && h > lo && h < hi && r > lo && r < hi {
        Some(MuesfData { g, h, r })
    } else {
        None
    }
}

/// Dispatches to the type-appropriate containment solver.
pub fn element_containment<T: RealScalar>(
    element_type: ElementType,
    points: &[Vector3<T>],
    element: &[usize],
    query: &Vector3<T>,
    slack: T,
) -> Option<MuesfData<T>> {
    match element_type {
        ElementType::Tetrahedron => tetrahedron_containment(points, element, query, slack),
        ElementType::Wedge => wedge_containment(points, element, query, slack),
        ElementType::Hexahedron => hexahedron_containment(points, element, query, slack),
    }
}

/// Evaluates the element's shape functions at the given local coordinates.
///
/// Returns one weight per element node, in node order; the weights sum to
/// one for any local coordinates, so they can be used directly to blend
/// corner values.
pub fn shape_function_weights<T: RealScalar>(
    element_type: ElementType,
    coords: &MuesfData<T>,
) -> Vec<T> {
    let MuesfData { g, h, r } = *coords;
    let one = T::one();
    match element_type {
        ElementType::Tetrahedron => vec![one - g - h - r, g, h, r],
        ElementType::Wedge => {
            let half = T::from(0.5).unwrap();
            vec![
                (one - g - h) * (one - r) * half,
                g * (one - r) * half,
                h * (one - r) * half,
                (one - g - h) * (one + r) * half,
                g * (one + r) * half,
                h * (one + r) * half,
            ]
        }
        ElementType::Hexahedron => {
            let eighth = T::from(8.0).unwrap().recip();
            vec![
                (one - g) * (one - h) * (one - r) * eighth,
                (one + g) * (one - h) * (one - r) * eighth,
                (one + g) * (one + h) * (one - r) * eighth,
                (one - g) * (one + h) * (one - r) * eighth,
                (one - g) * (one - h) * (one + r) * eighth,
                (one + g) * (one - h) * (one + r) * eighth,
                (one + g) * (one + h) * (one + r) * eighth,
                (one - g) * (one + h) * (one + r) * eighth,
            ]
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    use crate::constants::INITIAL_TOLERANCE_SLACK;

    fn unit_tetrahedron() -> Vec<Vector3<f64>> {
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        ]
    }

    fn right_wedge() -> Vec<Vector3<f64>> {
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 2.0),
            Vector3::new(1.0, 0.0, 2.0),
            Vector3::new(0.0, 1.0, 2.0),
        ]
    }

    fn unit_hexahedron() -> Vec<Vector3<f64>> {
        vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(1.0, 0.0, 1.0),
            Vector3::new(1.0, 1.0, 1.0),
            Vector3::new(0.0, 1.0, 1.0),
        ]
    }

    fn centroid(points: &[Vector3<f64>]) -> Vector3<f64> {
        points.iter().fold(Vector3::default(), |a, &v| a + v) / points.len() as f64
    }

    #[test]
    fn tetrahedron_centroid_round_trip() {
        let points = unit_tetrahedron();
        let element = vec![0, 1, 2, 3];
        let q = centroid(&points);
        let data =
            tetrahedron_containment(&points, &element, &q, INITIAL_TOLERANCE_SLACK).unwrap();
        assert_relative_eq!(data.g, 0.25, epsilon = 1e-12);
        assert_relative_eq!(data.h, 0.25, epsilon = 1e-12);
        assert_relative_eq!(data.r, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn tetrahedron_rejects_outside_point() {
        let points = unit_tetrahedron();
        let element = vec![0, 1, 2, 3];
        let far = Vector3::new(10.0, 10.0, 10.0);
        assert!(tetrahedron_containment(&points, &element, &far, INITIAL_TOLERANCE_SLACK)
            .is_none());
    }

    #[test]
    fn wedge_centroid_round_trip() {
        let points = right_wedge();
        let element = vec![0, 1, 2, 3, 4, 5];
        let q = centroid(&points);
        let data = wedge_containment(&points, &element, &q, INITIAL_TOLERANCE_SLACK).unwrap();
        assert_relative_eq!(data.g, 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(data.h, 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(data.r, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn wedge_rejects_outside_point() {
        let points = right_wedge();
        let element = vec![0, 1, 2, 3, 4, 5];
        let far = Vector3::new(-5.0, -5.0, 20.0);
        assert!(wedge_containment(&points, &element, &far, INITIAL_TOLERANCE_SLACK).is_none());
    }

    #[test]
    fn hexahedron_centroid_round_trip() {
        let points = unit_hexahedron();
        let element = vec![0, 1, 2, 3, 4, 5, 6, 7];
        let q = centroid(&points);
        let data =
            hexahedron_containment(&points, &element, &q, INITIAL_TOLERANCE_SLACK).unwrap();
        assert_relative_eq!(data.g, 0.0, epsilon = 1e-12);
        assert_relative_eq!(data.h, 0.0, epsilon = 1e-12);
        assert_relative_eq!(data.r, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn hexahedron_corner_maps_to_reference_corner() {
        let points = unit_hexahedron();
        let element = vec![0, 1, 2, 3, 4, 5, 6, 7];
        // Slightly inside node 6 (+g, +h, +r).
        let q = Vector3::new(0.99, 0.99, 0.99);
        let data =
            hexahedron_containment(&points, &element, &q, INITIAL_TOLERANCE_SLACK).unwrap();
        assert_relative_eq!(data.g, 0.98, epsilon = 1e-12);
        assert_relative_eq!(data.h, 0.98, epsilon = 1e-12);
        assert_relative_eq!(data.r, 0.98, epsilon = 1e-12);
    }

    #[test]
    fn hexahedron_rejects_outside_point() {
        let points = unit_hexahedron();
        let element = vec![0, 1, 2, 3, 4, 5, 6, 7];
        let far = Vector3::new(3.0, 0.5, 0.5);
        assert!(
            hexahedron_containment(&points, &element, &far, INITIAL_TOLERANCE_SLACK).is_none()
        );
    }

    #[test]
    fn relaxed_window_accepts_near_miss() {
        let points = unit_tetrahedron();
        let element = vec![0, 1, 2, 3];
        // Just outside the face g + h + r = 1.
        let q = Vector3::new(0.4, 0.4, 0.3);
        assert!(tetrahedron_containment(&points, &element, &q, 0.01).is_none());
        assert!(tetrahedron_containment(&points, &element, &q, 0.2).is_some());
    }

    #[test]
    fn shape_function_weights_sum_to_one() {
        let coords = MuesfData {
            g: 0.21,
            h: 0.34,
            r: 0.17,
        };
        for element_type in [
            ElementType::Tetrahedron,
            ElementType::Wedge,
            ElementType::Hexahedron,
        ] {
            let weights = shape_function_weights(element_type, &coords);
            let total: f64 = weights.iter().sum();
            assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn shape_functions_interpolate_corners() {
        // At a corner's local coordinates, its weight is 1 and all others 0.
        let corner = MuesfData {
            g: -1.0,
            h: -1.0,
            r: -1.0,
        };
        let weights = shape_function_weights(ElementType::Hexahedron, &corner);
        assert_relative_eq!(weights[0], 1.0, epsilon = 1e-12);
        for w in &weights[1..] {
            assert_relative_eq!(*w, 0.0, epsilon = 1e-12);
        }
    }
}
