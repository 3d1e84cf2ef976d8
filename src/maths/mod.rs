//! Geometric primitives and element-level maths.

pub mod distance;
pub mod element_type;
pub mod geometry;
pub mod vector3;
pub mod z_ordering;
