//! # impulse2d
//!
//! A small real-time 2D rigid-body physics engine built on a
//! sequential-impulse solver: boxes, circles, and triangles under gravity,
//! with persistent contacts, warm starting, friction, and point joints.
//!
//! - `math`: 2D vector and 2x2 rotation matrix primitives
//! - `objects`: rigid bodies and shape-derived mass properties
//! - `collision`: narrow-phase detection and broad-phase pair enumeration
//! - `constraints`: contact arbiters and point joints
//! - `world`: body/joint pools and the per-step simulation loop
//! - `scene`: YAML scene configuration loader

pub mod collision;
pub mod constraints;
pub mod math;
pub mod objects;
pub mod scene;
pub mod world;

// Re-export key types for easier use
pub use collision::{collide, AllPairs, BroadPhase, Contact, EdgeId, FeaturePair};
pub use constraints::{Arbiter, ArbiterKey, Joint};
pub use math::{Mat22, Vec2};
pub use objects::{Body, Shape};
pub use scene::{SceneConfig, SceneError, SceneLoader};
pub use world::{BodyHandle, World, WorldError};
