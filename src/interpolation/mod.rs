//! Parallel field mapping between a source and a target model.
//!
//! Each driver walks the target's node and integration point arrays in
//! parallel, decides per target point which source values contribute and
//! with what weight, and blends them into the target's field arrays. The
//! drivers differ only in how contributors are selected:
//!
//! * [`npm`] copies from the single nearest source node.
//! * [`fop`] blends the closest source node per octant direction within a
//!   radius, weighted by inverse distance.
//! * [`dmue`] blends the nodes of the most suitable nearby element,
//!   weighted by inverse distance.
//! * [`esf`] blends the corner values of the element geometrically
//!   containing the target point, weighted by its shape functions.
//!
//! All four first probe the index for an exact coincidence with a source
//! node and copy that node's value directly when one exists.

pub mod dmue;
pub mod esf;
pub mod fop;
pub mod npm;

use itertools::izip;
use rayon::prelude::*;

use crate::indexing::octree::Octree;
use crate::maths::vector3::Vector3;
use crate::model::Model;
use crate::types::RealScalar;

/// Source contributions for one target point: (source index, weight).
///
/// Weights are normalized to sum to one; an empty plan leaves the target
/// value untouched.
pub(crate) type Plan<T> = Vec<(usize, T)>;

/// Builds one plan per target point in parallel.
///
/// Every point is first checked for exact coincidence with a source node,
/// which short-circuits to a unit-weight copy; `fallback` supplies the
/// driver-specific plan otherwise.
pub(crate) fn plan_targets<T, F>(
    octree: &Octree<'_, T>,
    targets: &[Vector3<T>],
    fallback: F,
) -> Vec<Plan<T>>
where
    T: RealScalar,
    F: Fn(&Vector3<T>) -> Plan<T> + Sync,
{
    targets
        .par_iter()
        .map(|query| match octree.find(query) {
            Some(coincident) => vec![(coincident, T::one())],
            None => fallback(query),
        })
        .collect()
}

/// Fallible variant of [`plan_targets`], for drivers whose query can fail.
pub(crate) fn try_plan_targets<T, F>(
    octree: &Octree<'_, T>,
    targets: &[Vector3<T>],
    fallback: F,
) -> crate::types::Result<Vec<Plan<T>>>
where
    T: RealScalar,
    F: Fn(&Vector3<T>) -> crate::types::Result<Plan<T>> + Sync,
{
    targets
        .par_iter()
        .map(|query| match octree.find(query) {
            Some(coincident) => Ok(vec![(coincident, T::one())]),
            None => fallback(query),
        })
        .collect()
}

/// Inverse-distance weights: each contributor's coefficient is the total
/// distance over its own distance, normalized so the weights sum to one.
///
/// Zero distances cannot occur here; an exactly coincident point is
/// handled by the `find` short-circuit before any plan is built.
pub(crate) fn proportional_distance_weights<T: RealScalar>(
    contributors: &[(usize, T)],
) -> Plan<T> {
    let distance_total: T = contributors.iter().map(|&(_, d)| d).sum();
    let coefficients: Vec<T> = contributors
        .iter()
        .map(|&(_, d)| distance_total / d)
        .collect();
    let coefficient_total: T = coefficients.iter().copied().sum();
    contributors
        .iter()
        .zip(coefficients)
        .map(|(&(index, _), c)| (index, c / coefficient_total))
        .collect()
}

/// Applies plans to a fixed-arity component field (displacement, stress
/// and strain tensors).
pub(crate) fn apply_components<T: RealScalar, const N: usize>(
    plans: &[Plan<T>],
    source: &[[T; N]],
    target: &mut [[T; N]],
) {
    target
        .par_iter_mut()
        .zip(plans.par_iter())
        .for_each(|(out, plan)| {
            for &(index, weight) in plan {
                for (o, s) in izip!(out.iter_mut(), &source[index]) {
                    *o = *o + *s * weight;
                }
            }
        });
}

/// Applies plans to a scalar field (accumulated strain).
pub(crate) fn apply_scalar<T: RealScalar>(plans: &[Plan<T>], source: &[T], target: &mut [T]) {
    target
        .par_iter_mut()
        .zip(plans.par_iter())
        .for_each(|(out, plan)| {
            for &(index, weight) in plan {
                *out = *out + source[index] * weight;
            }
        });
}

/// Applies plans to every integration-mapped field the source carries.
///
/// The source's integration-indexed arrays must be addressable by the
/// node indices the plans hold, which in practice means node and
/// integration counts agree on the source model.
pub(crate) fn apply_integration_fields<T: RealScalar>(
    plans: &[Plan<T>],
    source: &Model<T>,
    target: &mut Model<T>,
) {
    if !source.stress.is_empty() {
        apply_components(plans, &source.stress, &mut target.stress);
    }
    if !source.total_strain.is_empty() {
        apply_components(plans, &source.total_strain, &mut target.total_strain);
    }
    if !source.plastic_strain.is_empty() {
        apply_components(plans, &source.plastic_strain, &mut target.plastic_strain);
    }
    if !source.accumulated_strain.is_empty() {
        apply_scalar(
            plans,
            &source.accumulated_strain,
            &mut target.accumulated_strain,
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn proportional_weights_sum_to_one() {
        let contributors = vec![(0, 1.0), (3, 2.0), (7, 0.5)];
        let plan = proportional_distance_weights(&contributors);
        let total: f64 = plan.iter().map(|&(_, w)| w).sum();
        assert_relative_eq!(total, 1.0);
        // Closer contributors outweigh farther ones.
        assert!(plan[2].1 > plan[0].1);
        assert!(plan[0].1 > plan[1].1);
    }

    #[test]
    fn single_contributor_takes_full_weight() {
        let plan = proportional_distance_weights(&[(5, 3.2)]);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].0, 5);
        assert_relative_eq!(plan[0].1, 1.0);
    }

    #[test]
    fn component_application_blends() {
        let plans = vec![vec![(0, 0.25), (1, 0.75)]];
        let source = vec![[4.0, 0.0, 8.0], [0.0, 4.0, 8.0]];
        let mut target = vec![[0.0; 3]];
        apply_components(&plans, &source, &mut target);
        assert_relative_eq!(target[0][0], 1.0);
        assert_relative_eq!(target[0][1], 3.0);
        assert_relative_eq!(target[0][2], 8.0);
    }

    #[test]
    fn empty_plan_leaves_target_untouched() {
        let plans: Vec<Plan<f64>> = vec![Vec::new()];
        let source = vec![7.0];
        let mut target = vec![0.5];
        apply_scalar(&plans, &source, &mut target);
        assert_relative_eq!(target[0], 0.5);
    }
}
