//! Nearest point method: every target value is copied from the closest
//! source node.

use log::info;

use crate::indexing::octree::Octree;
use crate::interpolation::{apply_components, apply_integration_fields, plan_targets};
use crate::model::Model;
use crate::types::RealScalar;

/// Maps `source` fields onto `target` by nearest source node.
///
/// Target arrays must be sized beforehand with
/// [`Model::set_target_indexes`].
pub fn nearest_point_method<T: RealScalar>(
    octree: &Octree<'_, T>,
    source: &Model<T>,
    target: &mut Model<T>,
) {
    if source.by_node() {
        info!("nearest point method: {} target nodes", target.nodes.len());
        let plans = plan_targets(octree, &target.nodes, |query| {
            vec![(octree.nearest(query), T::one())]
        });
        apply_components(&plans, &source.displacement, &mut target.displacement);
    }

    if source.by_integration() {
        info!(
            "nearest point method: {} target integration points",
            target.integration.len()
        );
        let plans = plan_targets(octree, &target.integration, |query| {
            vec![(octree.nearest(query), T::one())]
        });
        apply_integration_fields(&plans, source, target);
    }
}
