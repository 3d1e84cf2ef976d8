//! Element shape function: locates the element containing each target
//! point and blends its corner values with the element's shape functions
//! evaluated at the point's parametric coordinates.

use log::info;

use crate::indexing::octree::Octree;
use crate::interpolation::{apply_components, apply_integration_fields, try_plan_targets, Plan};
use crate::maths::geometry::shape_function_weights;
use crate::maths::vector3::Vector3;
use crate::model::Model;
use crate::types::{RealScalar, Result};

fn shape_plan<T: RealScalar>(
    octree: &Octree<'_, T>,
    source: &Model<T>,
    query: &Vector3<T>,
    leaf_scan_budget: usize,
) -> Result<Plan<T>> {
    let element_type = octree
        .element_type()
        .expect("shape function mapping requires an element index");
    let (element, coords) = octree.muesf(query, leaf_scan_budget)?;
    let weights = shape_function_weights(element_type, &coords);
    Ok(source.elements[element]
        .iter()
        .zip(weights)
        .map(|(&n, w)| (n, w))
        .collect())
}

/// Maps `source` fields onto `target` by element shape functions,
/// scanning up to `leaf_scan_budget` octree leaves per containment round.
///
/// The octree must carry `source`'s element index. Fails with
/// [`crate::types::Error::Unmappable`] when some target point cannot be
/// attributed to any source element even after tolerance relaxation.
/// Target arrays must be sized beforehand with
/// [`Model::set_target_indexes`].
pub fn element_shape_function_method<T: RealScalar>(
    octree: &Octree<'_, T>,
    source: &Model<T>,
    target: &mut Model<T>,
    leaf_scan_budget: usize,
) -> Result<()> {
    if source.by_node() {
        info!(
            "element shape function: {} target nodes, leaf scan budget {}",
            target.nodes.len(),
            leaf_scan_budget
        );
        let plans = try_plan_targets(octree, &target.nodes, |query| {
            shape_plan(octree, source, query, leaf_scan_budget)
        })?;
        apply_components(&plans, &source.displacement, &mut target.displacement);
    }

    if source.by_integration() {
        info!(
            "element shape function: {} target integration points, leaf scan budget {}",
            target.integration.len(),
            leaf_scan_budget
        );
        let plans = try_plan_targets(octree, &target.integration, |query| {
            shape_plan(octree, source, query, leaf_scan_budget)
        })?;
        apply_integration_fields(&plans, source, target);
    }

    Ok(())
}
