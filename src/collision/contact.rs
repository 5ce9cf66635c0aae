use crate::math::vec2::Vec2;

use super::features::FeaturePair;

/// A single contact point between two bodies, produced fresh each step by
/// the narrow phase and carried through one solve by the owning arbiter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Contact {
    /// Contact point in world coordinates.
    pub position: Vec2,
    /// Unit normal pointing from body A toward body B.
    pub normal: Vec2,
    /// Signed distance along the normal; negative when penetrating.
    pub separation: f64,
    /// Stable identity used to match this contact across frames.
    pub feature: FeaturePair,

    // Solver state. Accumulated impulses survive across frames via the
    // arbiter's feature matching; the rest is rebuilt every pre-step.
    pub pn: f64,
    pub pt: f64,
    pub mass_normal: f64,
    pub mass_tangent: f64,
    pub bias: f64,
}
