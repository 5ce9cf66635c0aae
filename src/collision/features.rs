//! Topological contact identity.
//!
//! Box faces and the vertices of the incident edge are numbered; a contact
//! point remembers which reference/incident edges produced it. The resulting
//! key is stable across frames for the same topological contact, which is
//! what lets the solver warm-start instead of re-converging from zero.

/// Edge number of a box face, counted counter-clockwise from the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EdgeId {
    #[default]
    None,
    Edge1,
    Edge2,
    Edge3,
    Edge4,
}

/// Identifies which edges of the two colliding boxes produced a contact
/// point. Compared by equality when matching contacts across frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FeaturePair {
    pub in_edge1: EdgeId,
    pub out_edge1: EdgeId,
    pub in_edge2: EdgeId,
    pub out_edge2: EdgeId,
}

impl FeaturePair {
    /// Swaps the roles of the two bodies. Applied when box B served as the
    /// reference face, so identifiers stay comparable from a canonical
    /// body-A-first perspective.
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.in_edge1, &mut self.in_edge2);
        std::mem::swap(&mut self.out_edge1, &mut self.out_edge2);
    }
}
