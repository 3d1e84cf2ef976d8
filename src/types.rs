//! General type definitions.

use std::fmt::{Debug, Display};
use std::iter::Sum;

use num::traits::Float;

/// Scalar types usable as point coordinates.
///
/// Blanket-implemented for every floating point type satisfying the bounds;
/// in practice `f64` (the default throughout) and `f32`.
pub trait RealScalar:
    Float + Default + Debug + Display + Sum + Send + Sync + 'static
{
}
impl<T: Float + Default + Debug + Display + Sum + Send + Sync + 'static> RealScalar for T {}

/// Failure modes of index construction and containment mapping.
///
/// A missed exact-match lookup is *not* an error: [`Octree::find`] returns
/// `Option<usize>` and callers treat `None` as ordinary control flow.
///
/// [`Octree::find`]: crate::indexing::octree::Octree::find
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An octree was requested over an empty point set.
    #[error("octree constructed from an empty set of points")]
    EmptyInput,
    /// An element-indexed octree was requested with an empty element set.
    #[error("element index constructed from an empty set of elements")]
    EmptyElements,
    /// The mesh's nodes-per-element count is not 4, 6 or 8.
    #[error("unsupported element arity: {0} nodes per element")]
    UnsupportedElementArity(usize),
    /// No containing element was found even after the relaxation cap.
    ///
    /// Source and target geometries do not overlap anywhere near the query
    /// point; the containment search gave up after `rounds` tolerance
    /// relaxations rather than looping forever.
    #[error("no containing element found after {rounds} relaxation rounds")]
    Unmappable {
        /// Relaxation rounds performed before giving up.
        rounds: usize,
    },
}

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;
