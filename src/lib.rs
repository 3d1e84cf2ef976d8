//! # Fieldmap
//!
//! Mapping of finite element field data (displacement, stress, strain)
//! from a source mesh onto a target mesh with an unrelated discretization.
//!
//! The crate is built around an octree index over the source mesh nodes,
//! optionally annotated with element connectivity. Four query algorithms
//! (exact match, branch-and-bound nearest neighbour, radius/field-of-points
//! search, and element containment with tolerance relaxation) feed four
//! parallel interpolation drivers that fill the target mesh's field arrays.
//!
//! ## References
//! \[1\] Samet, Hanan. "The quadtree and related hierarchical data
//! structures." ACM Computing Surveys 16.2 (1984): 187-260.
//!
//! \[2\] Hjelle, Oyvind, and Morten Daehlen. "Triangulations and
//! applications." Springer (2006), ch. 8 (barycentric interpolation).
#![cfg_attr(feature = "strict", deny(warnings))]
#![warn(missing_docs)]

pub mod constants;
pub mod indexing;
pub mod instrumentation;
pub mod interpolation;
pub mod maths;
pub mod model;
pub mod types;
