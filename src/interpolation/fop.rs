//! Field of points: blends the closest source node from each octant
//! direction around the target point, weighted by inverse distance.

use log::info;

use crate::indexing::octree::Octree;
use crate::interpolation::{
    apply_components, apply_integration_fields, plan_targets, proportional_distance_weights, Plan,
};
use crate::maths::vector3::Vector3;
use crate::model::Model;
use crate::types::RealScalar;

fn field_plan<T: RealScalar>(octree: &Octree<'_, T>, query: &Vector3<T>, radius: T) -> Plan<T> {
    let contributors: Vec<(usize, T)> = octree
        .field_of_points(query, radius)
        .into_iter()
        .flatten()
        .collect();
    if contributors.is_empty() {
        return Vec::new();
    }
    proportional_distance_weights(&contributors)
}

/// Maps `source` fields onto `target` by the field-of-points method,
/// considering source nodes within `radius` of each target point.
///
/// Target points with no source node inside the radius are left at zero.
/// Target arrays must be sized beforehand with
/// [`Model::set_target_indexes`].
pub fn field_of_points_method<T: RealScalar>(
    octree: &Octree<'_, T>,
    source: &Model<T>,
    target: &mut Model<T>,
    radius: T,
) {
    if source.by_node() {
        info!(
            "field of points: {} target nodes, radius {}",
            target.nodes.len(),
            radius
        );
        let plans = plan_targets(octree, &target.nodes, |query| {
            field_plan(octree, query, radius)
        });
        apply_components(&plans, &source.displacement, &mut target.displacement);
    }

    if source.by_integration() {
        info!(
            "field of points: {} target integration points, radius {}",
            target.integration.len(),
            radius
        );
        let plans = plan_targets(octree, &target.integration, |query| {
            field_plan(octree, query, radius)
        });
        apply_integration_fields(&plans, source, target);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::DEFAULT_FIELD_RADIUS;
    use crate::maths::vector3::Vector3;
    use approx::assert_relative_eq;

    fn cube_corner_source() -> Model<f64> {
        // Unit cube corners, each holding its own x coordinate as data.
        let mut nodes = Vec::new();
        let mut displacement = Vec::new();
        for i in 0..8 {
            let x = if i & 4 != 0 { 1.0 } else { 0.0 };
            let y = if i & 2 != 0 { 1.0 } else { 0.0 };
            let z = if i & 1 != 0 { 1.0 } else { 0.0 };
            nodes.push(Vector3::new(x, y, z));
            displacement.push([x, y, z]);
        }
        Model {
            nodes,
            displacement,
            ..Default::default()
        }
    }

    #[test]
    fn blend_stays_inside_the_value_hull() {
        let source = cube_corner_source();
        let mut target = Model {
            nodes: vec![Vector3::new(0.5, 0.5, 0.5)],
            ..Default::default()
        };
        target.set_target_indexes(&source);

        let octree = Octree::new(&source.nodes, 10, 1).unwrap();
        field_of_points_method(&octree, &source, &mut target, DEFAULT_FIELD_RADIUS);

        // The cube center sees one corner per direction, all equidistant,
        // so the blend is the plain average.
        for k in 0..3 {
            assert_relative_eq!(target.displacement[0][k], 0.5, epsilon = 1e-12);
        }
    }

    #[test]
    fn out_of_radius_target_is_left_at_zero() {
        let source = cube_corner_source();
        let mut target = Model {
            nodes: vec![Vector3::new(100.0, 100.0, 100.0)],
            ..Default::default()
        };
        target.set_target_indexes(&source);

        let octree = Octree::new(&source.nodes, 10, 1).unwrap();
        field_of_points_method(&octree, &source, &mut target, 1.0);
        assert_eq!(target.displacement[0], [0.0, 0.0, 0.0]);
    }
}
