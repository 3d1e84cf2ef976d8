//! Distance method using elements: blends the node values of the most
//! suitable nearby element, weighted by inverse distance.

use log::info;

use crate::indexing::octree::Octree;
use crate::interpolation::{
    apply_components, apply_integration_fields, plan_targets, proportional_distance_weights, Plan,
};
use crate::maths::distance::distance;
use crate::maths::vector3::Vector3;
use crate::model::Model;
use crate::types::RealScalar;

fn element_plan<T: RealScalar>(
    octree: &Octree<'_, T>,
    source: &Model<T>,
    query: &Vector3<T>,
    scan_budget: usize,
) -> Plan<T> {
    let best_element = octree.dmue(query, scan_budget);
    let contributors: Vec<(usize, T)> = source.elements[best_element]
        .iter()
        .map(|&n| (n, distance(query, &source.nodes[n])))
        .collect();
    proportional_distance_weights(&contributors)
}

/// Maps `source` fields onto `target` by the distance method using
/// elements, examining up to `scan_budget` candidate elements per target
/// point.
///
/// The octree must carry `source`'s element index. Target arrays must be
/// sized beforehand with [`Model::set_target_indexes`].
pub fn distance_using_elements_method<T: RealScalar>(
    octree: &Octree<'_, T>,
    source: &Model<T>,
    target: &mut Model<T>,
    scan_budget: usize,
) {
    if source.by_node() {
        info!(
            "distance using elements: {} target nodes, scan budget {}",
            target.nodes.len(),
            scan_budget
        );
        let plans = plan_targets(octree, &target.nodes, |query| {
            element_plan(octree, source, query, scan_budget)
        });
        apply_components(&plans, &source.displacement, &mut target.displacement);
    }

    if source.by_integration() {
        info!(
            "distance using elements: {} target integration points, scan budget {}",
            target.integration.len(),
            scan_budget
        );
        let plans = plan_targets(octree, &target.integration, |query| {
            element_plan(octree, source, query, scan_budget)
        });
        apply_integration_fields(&plans, source, target);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::DEFAULT_ELEMENT_SCAN_BUDGET;
    use approx::assert_relative_eq;

    #[test]
    fn blends_the_surrounding_element_nodes() {
        let source = Model {
            nodes: vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
            ],
            elements: vec![vec![0, 1, 2, 3]],
            displacement: vec![
                [2.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
                [2.0, 0.0, 0.0],
            ],
            ..Default::default()
        };
        let mut target = Model {
            nodes: vec![Vector3::new(0.3, 0.3, 0.2)],
            ..Default::default()
        };
        target.set_target_indexes(&source);

        let octree = Octree::with_elements(&source.nodes, &source.elements, 10, 1).unwrap();
        distance_using_elements_method(&octree, &source, &mut target, DEFAULT_ELEMENT_SCAN_BUDGET);

        // A constant field reproduces exactly, since the weights sum to 1.
        assert_relative_eq!(target.displacement[0][0], 2.0, epsilon = 1e-12);
        assert_relative_eq!(target.displacement[0][1], 0.0);
    }

    #[test]
    fn integration_pass_fills_stress() {
        // Node and integration counts agree so nearest-node indices address
        // the integration-mapped arrays.
        let source = Model {
            nodes: vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
            ],
            elements: vec![vec![0, 1, 2, 3]],
            stress: vec![[3.0; 6]; 4],
            ..Default::default()
        };
        let mut target = Model {
            nodes: source.nodes.clone(),
            elements: source.elements.clone(),
            ..Default::default()
        };
        target.set_target_indexes(&source);

        let octree = Octree::with_elements(&source.nodes, &source.elements, 10, 1).unwrap();
        distance_using_elements_method(&octree, &source, &mut target, DEFAULT_ELEMENT_SCAN_BUDGET);

        for k in 0..6 {
            assert_relative_eq!(target.stress[0][k], 3.0, epsilon = 1e-12);
        }
    }
}
