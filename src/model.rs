//! Finite element model container: geometry plus the field arrays the
//! interpolation drivers read and write.

use log::debug;

use crate::maths::vector3::Vector3;
use crate::types::RealScalar;

/// A mesh with its solution fields.
///
/// Displacement is indexed by node. Stress, total strain, plastic strain
/// and accumulated strain are indexed by integration point (one per
/// element, at the element centroid). An empty field array means the model
/// carries no data of that kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Model<T: RealScalar> {
    /// Node coordinates.
    pub nodes: Vec<Vector3<T>>,
    /// Element connectivity, as node indices.
    pub elements: Vec<Vec<usize>>,
    /// Nodal displacement, 3 components per node.
    pub displacement: Vec<[T; 3]>,
    /// Stress tensor in Voigt notation, 6 components per integration point.
    pub stress: Vec<[T; 6]>,
    /// Total strain, 6 components per integration point.
    pub total_strain: Vec<[T; 6]>,
    /// Plastic strain, 6 components per integration point.
    pub plastic_strain: Vec<[T; 6]>,
    /// Accumulated equivalent strain, scalar per integration point.
    pub accumulated_strain: Vec<T>,
    /// Integration point coordinates, one per element.
    pub integration: Vec<Vector3<T>>,
}

impl<T: RealScalar> Model<T> {
    /// True when the model carries data mapped by node.
    pub fn by_node(&self) -> bool {
        !self.displacement.is_empty()
    }

    /// True when the model carries data mapped by integration point.
    pub fn by_integration(&self) -> bool {
        !self.stress.is_empty()
            || !self.total_strain.is_empty()
            || !self.plastic_strain.is_empty()
            || !self.accumulated_strain.is_empty()
    }

    /// Computes the integration points as element centroids. Idempotent:
    /// a model that already has integration data keeps it.
    pub fn assign_integration(&mut self) {
        if !self.integration.is_empty() {
            return;
        }
        self.integration.reserve(self.elements.len());
        for element in &self.elements {
            let sum = element
                .iter()
                .fold(Vector3::splat(T::zero()), |acc, &n| acc + self.nodes[n]);
            let count = T::from(element.len()).unwrap();
            self.integration.push(sum / count);
        }
        debug!("assigned {} integration points", self.integration.len());
    }

    /// Sizes this model's field arrays to receive a mapping from `source`,
    /// zero-filled, and assigns integration points when any
    /// integration-mapped data exists on the source.
    pub fn set_target_indexes(&mut self, source: &Model<T>) {
        if !source.displacement.is_empty() {
            self.displacement.resize(self.nodes.len(), [T::zero(); 3]);
        }
        if source.by_integration() {
            self.assign_integration();
            if !source.stress.is_empty() {
                self.stress.resize(self.elements.len(), [T::zero(); 6]);
            }
            if !source.total_strain.is_empty() {
                self.total_strain.resize(self.elements.len(), [T::zero(); 6]);
            }
            if !source.plastic_strain.is_empty() {
                self.plastic_strain.resize(self.elements.len(), [T::zero(); 6]);
            }
            if !source.accumulated_strain.is_empty() {
                self.accumulated_strain.resize(self.elements.len(), T::zero());
            }
        }
    }
}
