//! Element classification by nodes-per-element count.

use std::fmt;

use crate::types::{Error, Result};

/// Supported finite element families, distinguished by node count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementType {
    /// 4-node solid element.
    Tetrahedron,
    /// 6-node solid element.
    Wedge,
    /// 8-node solid element.
    Hexahedron,
}

/// Derives the element type from the first element's arity.
///
/// Arity is uniform across a mesh, so only the first element is examined.
/// Node counts outside {4, 6, 8} are a configuration error, detected here
/// once at construction rather than inside any query.
pub fn determine_element_type(elements: &[Vec<usize>]) -> Result<ElementType> {
    let nodes_per_element = elements[0].len();
    match nodes_per_element {
        4 => Ok(ElementType::Tetrahedron),
        6 => Ok(ElementType::Wedge),
        8 => Ok(ElementType::Hexahedron),
        n => Err(Error::UnsupportedElementArity(n)),
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Tetrahedron => write!(f, "Tetrahedron"),
            ElementType::Wedge => write!(f, "Wedge"),
            ElementType::Hexahedron => write!(f, "Hexahedron"),
        }
    }
}
