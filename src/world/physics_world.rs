use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use log::{debug, trace};

use crate::collision::broad_phase::{AllPairs, BroadPhase};
use crate::collision::detection::collide;
use crate::constraints::arbiter::{Arbiter, ArbiterKey};
use crate::constraints::joint::Joint;
use crate::math::vec2::Vec2;
use crate::objects::body::Body;

/// Index of a body in the world's pool, returned by `add_body`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyHandle(pub usize);

/// Errors from populating the world's fixed-capacity pools.
#[derive(Debug, PartialEq, Eq)]
pub enum WorldError {
    TooManyBodies,
    TooManyJoints,
    InvalidBody(usize),
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::TooManyBodies => {
                write!(f, "body pool is full ({} slots)", World::MAX_BODIES)
            }
            WorldError::TooManyJoints => {
                write!(f, "joint pool is full ({} slots)", World::MAX_JOINTS)
            }
            WorldError::InvalidBody(index) => write!(f, "invalid body index: {}", index),
        }
    }
}

impl std::error::Error for WorldError {}

/// Owns every body, the live arbiter set, and the joint list, and advances
/// the whole simulation one fixed timestep at a time.
pub struct World {
    pub bodies: Vec<Body>,
    pub joints: Vec<Joint>,
    pub arbiters: BTreeMap<ArbiterKey, Arbiter>,
    pub gravity: Vec2,
    pub iterations: usize,
    pub broad_phase: Box<dyn BroadPhase>,
}

impl World {
    /// Body pool capacity. Slots are reused across scene loads rather than
    /// allocated per body.
    pub const MAX_BODIES: usize = 200;
    /// Joint pool capacity.
    pub const MAX_JOINTS: usize = 100;

    pub fn new(gravity: Vec2, iterations: usize) -> Self {
        Self {
            bodies: Vec::with_capacity(Self::MAX_BODIES),
            joints: Vec::with_capacity(Self::MAX_JOINTS),
            arbiters: BTreeMap::new(),
            gravity,
            iterations,
            broad_phase: Box::new(AllPairs),
        }
    }

    /// Adds a body to the pool and returns its handle.
    pub fn add_body(&mut self, body: Body) -> Result<BodyHandle, WorldError> {
        if self.bodies.len() >= Self::MAX_BODIES {
            return Err(WorldError::TooManyBodies);
        }
        let handle = BodyHandle(self.bodies.len());
        self.bodies.push(body);
        Ok(handle)
    }

    /// Adds a joint between two bodies through a world-space anchor point.
    /// Local anchors are captured from the bodies' current poses.
    pub fn add_joint(
        &mut self,
        body1: BodyHandle,
        body2: BodyHandle,
        anchor: Vec2,
    ) -> Result<(), WorldError> {
        if self.joints.len() >= Self::MAX_JOINTS {
            return Err(WorldError::TooManyJoints);
        }
        if body1.0 >= self.bodies.len() {
            return Err(WorldError::InvalidBody(body1.0));
        }
        if body2.0 >= self.bodies.len() || body1 == body2 {
            return Err(WorldError::InvalidBody(body2.0));
        }
        let joint = Joint::new(body1.0, body2.0, anchor, &self.bodies);
        self.joints.push(joint);
        Ok(())
    }

    pub fn body(&self, handle: BodyHandle) -> &Body {
        &self.bodies[handle.0]
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> &mut Body {
        &mut self.bodies[handle.0]
    }

    /// Drops all arbiters and joints and zeroes the body count. The pool
    /// storage is kept for reuse by the next scene.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.joints.clear();
        self.arbiters.clear();
        debug!("world cleared");
    }

    /// Advances the simulation by one time step `dt`.
    ///
    /// If `dragged` names a body, its velocities are forced to zero at entry
    /// and force-driven velocity changes skip it for this step; solver
    /// impulses still react to its position.
    pub fn step(&mut self, dt: f64, dragged: Option<BodyHandle>) {
        if dt <= 0.0 {
            return;
        }
        let inv_dt = 1.0 / dt;

        // 1. Determine overlapping pairs and refresh the arbiter set
        self.update_arbiters();

        if let Some(handle) = dragged {
            if let Some(body) = self.bodies.get_mut(handle.0) {
                body.velocity = Vec2::ZERO;
                body.angular_velocity = 0.0;
            }
        }

        // 2. Apply gravity and accumulated forces to velocities
        for (index, body) in self.bodies.iter_mut().enumerate() {
            if body.is_static() {
                continue;
            }
            if dragged == Some(BodyHandle(index)) {
                continue;
            }
            body.velocity += (self.gravity + body.force * body.inv_mass) * dt;
            body.angular_velocity += body.torque * body.inv_inertia * dt;
        }

        // 3. Warm start
        for arbiter in self.arbiters.values_mut() {
            arbiter.pre_step(&mut self.bodies, inv_dt);
        }
        for joint in &mut self.joints {
            joint.pre_step(&mut self.bodies, inv_dt);
        }

        // 4. Sequential impulse iterations, fixed count
        for _ in 0..self.iterations {
            for arbiter in self.arbiters.values_mut() {
                arbiter.apply_impulse(&mut self.bodies);
            }
            for joint in &mut self.joints {
                joint.apply_impulse(&mut self.bodies);
            }
        }

        // 5. Integrate velocities and clear the per-step accumulators
        for body in &mut self.bodies {
            body.position += body.velocity * dt;
            body.rotation += body.angular_velocity * dt;
            body.clear_accumulators();
        }

        trace!(
            "step complete: {} bodies, {} arbiters, {} joints",
            self.bodies.len(),
            self.arbiters.len(),
            self.joints.len()
        );
    }

    /// Runs the broad and narrow phases, creating, refreshing, and
    /// destroying arbiters so that one exists exactly for each pair with at
    /// least one contact.
    fn update_arbiters(&mut self) {
        let pairs = self.broad_phase.candidate_pairs(&self.bodies);

        for (i, j) in pairs {
            let key = ArbiterKey::new(i, j);
            let contacts = collide(&self.bodies[key.body1], &self.bodies[key.body2]);

            if contacts.is_empty() {
                if self.arbiters.remove(&key).is_some() {
                    debug!("arbiter destroyed: ({}, {})", key.body1, key.body2);
                }
            } else {
                match self.arbiters.entry(key) {
                    Entry::Occupied(mut entry) => entry.get_mut().update(contacts),
                    Entry::Vacant(entry) => {
                        debug!("arbiter created: ({}, {})", key.body1, key.body2);
                        entry.insert(Arbiter::new(key, contacts, &self.bodies));
                    }
                }
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Vec2::new(0.0, -10.0), 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-9;

    fn dynamic_box(extents: Vec2, position: Vec2) -> Body {
        let mut body = Body::new();
        body.set_as_box(extents, 1.0);
        body.position = position;
        body
    }

    fn static_box(extents: Vec2, position: Vec2) -> Body {
        let mut body = Body::new();
        body.set_as_box(extents, f64::INFINITY);
        body.position = position;
        body
    }

    #[test]
    fn test_world_default() {
        let world = World::default();
        assert!(world.bodies.is_empty());
        assert!(world.joints.is_empty());
        assert!(world.arbiters.is_empty());
        assert_eq!(world.gravity, Vec2::new(0.0, -10.0));
        assert_eq!(world.iterations, 10);
    }

    #[test]
    fn test_add_body_returns_sequential_handles() {
        let mut world = World::default();
        let h1 = world.add_body(Body::new()).unwrap();
        let h2 = world.add_body(Body::new()).unwrap();
        assert_eq!(h1, BodyHandle(0));
        assert_eq!(h2, BodyHandle(1));
        assert_eq!(world.bodies.len(), 2);
    }

    #[test]
    fn test_body_pool_capacity() {
        let mut world = World::default();
        for _ in 0..World::MAX_BODIES {
            world.add_body(Body::new()).unwrap();
        }
        assert_eq!(world.add_body(Body::new()), Err(WorldError::TooManyBodies));
    }

    #[test]
    fn test_add_joint_validates_handles() {
        let mut world = World::default();
        let h1 = world.add_body(Body::new()).unwrap();
        assert_eq!(
            world.add_joint(h1, BodyHandle(5), Vec2::ZERO),
            Err(WorldError::InvalidBody(5))
        );
        assert_eq!(
            world.add_joint(h1, h1, Vec2::ZERO),
            Err(WorldError::InvalidBody(0))
        );
    }

    #[test]
    fn test_clear_resets_pools() {
        let mut world = World::default();
        let h1 = world
            .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::ZERO))
            .unwrap();
        let h2 = world
            .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::new(0.5, 0.0)))
            .unwrap();
        world.add_joint(h1, h2, Vec2::ZERO).unwrap();
        world.step(1.0 / 60.0, None);
        assert!(!world.arbiters.is_empty());

        world.clear();
        assert!(world.bodies.is_empty());
        assert!(world.joints.is_empty());
        assert!(world.arbiters.is_empty());
    }

    #[test]
    fn test_step_applies_gravity() {
        let mut world = World::default();
        let handle = world
            .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::ZERO))
            .unwrap();
        let dt = 0.1;

        world.step(dt, None);
        let body = world.body(handle);
        assert!((body.velocity.y - -1.0).abs() < EPSILON);
        assert!((body.position.y - -0.1).abs() < EPSILON);
    }

    #[test]
    fn test_step_ignores_nonpositive_dt() {
        let mut world = World::default();
        let handle = world
            .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::ZERO))
            .unwrap();
        world.step(0.0, None);
        world.step(-1.0, None);
        assert_eq!(world.body(handle).velocity, Vec2::ZERO);
    }

    #[test]
    fn test_step_applies_accumulated_force_once() {
        let mut world = World::default();
        world.gravity = Vec2::ZERO;
        let handle = world
            .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::ZERO))
            .unwrap();
        world.body_mut(handle).add_force(Vec2::new(10.0, 0.0));

        let dt = 0.1;
        world.step(dt, None);
        assert!((world.body(handle).velocity.x - 1.0).abs() < EPSILON);
        assert_eq!(world.body(handle).force, Vec2::ZERO);

        // The accumulator was cleared, so a second step adds nothing
        world.step(dt, None);
        assert!((world.body(handle).velocity.x - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_static_body_never_moves() {
        let mut world = World::default();
        let ground = world
            .add_body(static_box(Vec2::new(10.0, 1.0), Vec2::new(0.0, -0.5)))
            .unwrap();
        world
            .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::new(0.0, 0.4)))
            .unwrap();

        for _ in 0..60 {
            world.step(1.0 / 60.0, None);
        }

        let body = world.body(ground);
        assert_eq!(body.position, Vec2::new(0.0, -0.5));
        assert_eq!(body.rotation, 0.0);
        assert_eq!(body.inv_mass, 0.0);
        assert_eq!(body.inv_inertia, 0.0);
    }

    #[test]
    fn test_arbiter_lifecycle_follows_overlap() {
        let mut world = World::default();
        world.gravity = Vec2::ZERO;
        let a = world
            .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::ZERO))
            .unwrap();
        let b = world
            .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::new(0.9, 0.0)))
            .unwrap();

        world.step(1.0 / 60.0, None);
        let key = ArbiterKey::new(a.0, b.0);
        assert!(world.arbiters.contains_key(&key));

        // Move the pair far apart; the arbiter must be destroyed
        world.body_mut(b).position = Vec2::new(5.0, 0.0);
        world.body_mut(a).velocity = Vec2::ZERO;
        world.body_mut(b).velocity = Vec2::ZERO;
        world.step(1.0 / 60.0, None);
        assert!(!world.arbiters.contains_key(&key));
    }

    #[test]
    fn test_dragged_body_skips_force_integration() {
        let mut world = World::default();
        let dragged = world
            .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::new(0.0, 5.0)))
            .unwrap();
        let falling = world
            .add_body(dynamic_box(Vec2::new(1.0, 1.0), Vec2::new(10.0, 5.0)))
            .unwrap();
        world.body_mut(dragged).velocity = Vec2::new(3.0, 3.0);

        world.step(1.0 / 60.0, Some(dragged));

        // Dragged body: velocities zeroed at entry, no gravity applied
        assert_eq!(world.body(dragged).velocity, Vec2::ZERO);
        assert_eq!(world.body(dragged).position, Vec2::new(0.0, 5.0));
        // The other body falls normally
        assert!(world.body(falling).velocity.y < 0.0);
    }

    #[test]
    fn test_joint_holds_pendulum_distance() {
        let mut world = World::default();
        let anchor = world
            .add_body(static_box(Vec2::new(0.2, 0.2), Vec2::ZERO))
            .unwrap();
        let bob = world
            .add_body(dynamic_box(Vec2::new(0.5, 0.5), Vec2::new(1.5, 0.0)))
            .unwrap();
        world.add_joint(anchor, bob, Vec2::ZERO).unwrap();

        for _ in 0..120 {
            world.step(1.0 / 60.0, None);
        }

        // The bob swings but stays pinned to the anchor point
        let distance = world.body(bob).position.magnitude();
        assert!(
            (distance - 1.5).abs() < 0.1,
            "pendulum length drifted to {}",
            distance
        );
    }
}
