//! Euclidean distance helpers.

use crate::maths::vector3::Vector3;
use crate::types::RealScalar;

/// Squared Euclidean distance, omitting the square root when only relative
/// order matters.
pub fn distance_squared<T: RealScalar>(p: &Vector3<T>, q: &Vector3<T>) -> T {
    let dx = q.x - p.x;
    let dy = q.y - p.y;
    let dz = q.z - p.z;
    dx * dx + dy * dy + dz * dz
}

/// Euclidean distance.
pub fn distance<T: RealScalar>(p: &Vector3<T>, q: &Vector3<T>) -> T {
    distance_squared(p, q).sqrt()
}

/// Average squared distance from `query` to all nodes of one element.
///
/// Used by the element-distance query to decide which element a point
/// belongs to.
pub fn average_distance_squared<T: RealScalar>(
    element: &[usize],
    points: &[Vector3<T>],
    query: &Vector3<T>,
) -> T {
    let total: T = element
        .iter()
        .map(|&n| distance_squared(query, &points[n]))
        .sum();
    total / T::from(element.len()).unwrap()
}
