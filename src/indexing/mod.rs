//! Spatial indexing of mesh nodes.

pub mod octant;
pub mod octree;
