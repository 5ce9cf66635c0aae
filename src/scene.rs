//! Scene configuration loader.
//!
//! Scenes are plain YAML files naming gravity, solver iterations, and the
//! bodies and joints to create, so layouts can be tuned without
//! recompiling. A body with no `mass` entry is static.
//!
//! ```yaml
//! gravity: {x: 0.0, y: -10.0}
//! iterations: 10
//! bodies:
//!   - shape: box
//!     extents: {x: 10.0, y: 1.0}
//!     position: {x: 0.0, y: -0.5}
//!   - shape: circle
//!     extents: {x: 1.0, y: 1.0}
//!     mass: 1.0
//!     position: {x: 0.0, y: 3.0}
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::math::vec2::Vec2;
use crate::objects::body::Body;
use crate::world::physics_world::{BodyHandle, World, WorldError};

/// Error type for scene loading operations.
#[derive(Debug)]
pub enum SceneError {
    Io(std::io::Error),
    Parse(serde_yaml::Error),
    NotFound(String),
    World(WorldError),
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::Io(e) => write!(f, "IO error: {}", e),
            SceneError::Parse(e) => write!(f, "YAML parse error: {}", e),
            SceneError::NotFound(name) => write!(f, "scene not found: {}", name),
            SceneError::World(e) => write!(f, "world error: {}", e),
        }
    }
}

impl std::error::Error for SceneError {}

impl From<std::io::Error> for SceneError {
    fn from(err: std::io::Error) -> Self {
        SceneError::Io(err)
    }
}

impl From<serde_yaml::Error> for SceneError {
    fn from(err: serde_yaml::Error) -> Self {
        SceneError::Parse(err)
    }
}

impl From<WorldError> for SceneError {
    fn from(err: WorldError) -> Self {
        SceneError::World(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Box,
    Circle,
    Triangle,
}

/// One body entry in a scene file. Omitting `mass` makes the body static.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyConfig {
    pub shape: ShapeKind,
    pub extents: Vec2,
    #[serde(default)]
    pub mass: Option<f64>,
    #[serde(default)]
    pub position: Vec2,
    #[serde(default)]
    pub rotation: f64,
    #[serde(default = "default_friction")]
    pub friction: f64,
    #[serde(default)]
    pub velocity: Vec2,
    #[serde(default)]
    pub angular_velocity: f64,
    #[serde(default = "default_draggable")]
    pub draggable: bool,
}

/// One joint entry; body fields index into the scene's body list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointConfig {
    pub body1: usize,
    pub body2: usize,
    pub anchor: Vec2,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_gravity")]
    pub gravity: Vec2,
    #[serde(default = "default_iterations")]
    pub iterations: usize,
    pub bodies: Vec<BodyConfig>,
    #[serde(default)]
    pub joints: Vec<JointConfig>,
}

fn default_friction() -> f64 {
    0.2
}

fn default_draggable() -> bool {
    true
}

fn default_gravity() -> Vec2 {
    Vec2::new(0.0, -10.0)
}

fn default_iterations() -> usize {
    10
}

impl SceneConfig {
    /// Clears the world and populates it with this scene's bodies and
    /// joints. Returns the handles of the created bodies, in file order.
    pub fn instantiate(&self, world: &mut World) -> Result<Vec<BodyHandle>, SceneError> {
        world.clear();
        world.gravity = self.gravity;
        world.iterations = self.iterations;

        let mut handles = Vec::with_capacity(self.bodies.len());
        for config in &self.bodies {
            let mut body = Body::new();
            let mass = config.mass.unwrap_or(f64::INFINITY);
            match config.shape {
                ShapeKind::Box => body.set_as_box(config.extents, mass),
                ShapeKind::Circle => body.set_as_circle(config.extents, mass),
                ShapeKind::Triangle => body.set_as_triangle(config.extents, mass),
            }
            body.position = config.position;
            body.rotation = config.rotation;
            body.friction = config.friction;
            body.velocity = config.velocity;
            body.angular_velocity = config.angular_velocity;
            body.draggable = config.draggable;
            handles.push(world.add_body(body)?);
        }

        for config in &self.joints {
            let body1 = *handles
                .get(config.body1)
                .ok_or(SceneError::World(WorldError::InvalidBody(config.body1)))?;
            let body2 = *handles
                .get(config.body2)
                .ok_or(SceneError::World(WorldError::InvalidBody(config.body2)))?;
            world.add_joint(body1, body2, config.anchor)?;
        }

        info!(
            "scene instantiated: {} bodies, {} joints",
            handles.len(),
            self.joints.len()
        );
        Ok(handles)
    }
}

/// Loads named scene files from a base directory.
pub struct SceneLoader {
    base_path: PathBuf,
}

impl SceneLoader {
    /// Create a new loader rooted at the given directory.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Load a scene by name (without the .yaml extension).
    pub fn load(&self, name: &str) -> Result<SceneConfig, SceneError> {
        let path = self.base_path.join(format!("{}.yaml", name));
        if !path.exists() {
            return Err(SceneError::NotFound(name.to_string()));
        }
        debug!("loading scene from {}", path.display());
        let contents = fs::read_to_string(&path)?;
        let config: SceneConfig = serde_yaml::from_str(&contents)?;
        Ok(config)
    }
}
