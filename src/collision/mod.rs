pub mod broad_phase;
pub mod contact;
pub mod detection;
pub mod features;

// Re-export key types
pub use broad_phase::{AllPairs, BroadPhase};
pub use contact::Contact;
pub use detection::collide;
pub use features::{EdgeId, FeaturePair};
