//! Crate-wide constants.

/// Default maximum octree depth, root octant at depth 0.
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Default number of points a leaf may hold before it is subdivided.
pub const DEFAULT_LEAF_SPLIT_THRESHOLD: usize = 8;

/// Initial slack applied to every containment tolerance window.
pub const INITIAL_TOLERANCE_SLACK: f64 = 0.01;

/// Widening applied to every containment tolerance window per relaxation
/// round of the containment search.
pub const RELAXATION_STEP: f64 = 0.05;

/// Relaxation rounds after which a containment search reports the query
/// point as unmappable. At [`RELAXATION_STEP`] per round this widens the
/// parametric windows by ±5.0, far beyond any physically meaningful local
/// coordinate.
pub const MAX_RELAXATION_ROUNDS: usize = 100;

/// Default number of distinct elements scanned by the element-distance
/// query before it settles on the best candidate.
pub const DEFAULT_ELEMENT_SCAN_BUDGET: usize = 50;

/// Default number of leaves the containment search may scan per relaxation
/// round before the tolerance windows are widened.
pub const DEFAULT_LEAF_SCAN_BUDGET: usize = 1000;

/// Default search radius for the field-of-points query.
pub const DEFAULT_FIELD_RADIUS: f64 = 10.0;
