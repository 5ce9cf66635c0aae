use crate::math::vec2::Vec2;

/// The geometric shape of a rigid body. Each variant carries its full
/// extents: width/height for boxes and triangles, diameter for circles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Box(Vec2),
    Circle(f64),
    Triangle(Vec2),
}

/// A single rigid body. All state is public: the scene builder and the
/// renderer read and write these fields directly, and the solver mutates
/// velocities in place during a step.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub shape: Shape,

    // Primary state
    pub position: Vec2,
    pub rotation: f64, // Radians
    pub velocity: Vec2,
    pub angular_velocity: f64,

    // Accumulators for forces/torques applied during a time step
    pub force: Vec2,
    pub torque: f64,

    pub friction: f64,

    // Mass properties; an infinite mass marks a static body
    pub mass: f64,
    pub inv_mass: f64,
    pub inertia: f64,
    pub inv_inertia: f64,

    /// Whether an external drag interaction may pick this body up.
    /// Physics-neutral; the solver never reads it.
    pub draggable: bool,
}

const DEFAULT_FRICTION: f64 = 0.2;

impl Body {
    /// Creates a static unit box at the origin.
    pub fn new() -> Self {
        Self {
            shape: Shape::Box(Vec2::new(1.0, 1.0)),
            position: Vec2::ZERO,
            rotation: 0.0,
            velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            friction: DEFAULT_FRICTION,
            mass: f64::INFINITY,
            inv_mass: 0.0,
            inertia: f64::INFINITY,
            inv_inertia: 0.0,
            draggable: true,
        }
    }

    /// Re-initializes this body as a box of the given extents (w x h).
    /// Resets all kinematic state and derives mass properties:
    /// inertia = m * (w^2 + h^2) / 12.
    pub fn set_as_box(&mut self, extents: Vec2, mass: f64) {
        self.reset_state();
        self.shape = Shape::Box(extents);
        let inertia = mass * (extents.x * extents.x + extents.y * extents.y) / 12.0;
        self.set_mass(mass, inertia);
    }

    /// Re-initializes this body as a circle. The radius is half of
    /// `extents.x`; inertia = m * r^2 / 2.
    pub fn set_as_circle(&mut self, extents: Vec2, mass: f64) {
        self.reset_state();
        self.shape = Shape::Circle(extents.x);
        let radius = extents.x / 2.0;
        let inertia = mass * radius * radius / 2.0;
        self.set_mass(mass, inertia);
    }

    /// Re-initializes this body as a triangle bounded by the given extents.
    /// Inertia = m * (w^2 + h^2) / 18, consistent with the box formula.
    pub fn set_as_triangle(&mut self, extents: Vec2, mass: f64) {
        self.reset_state();
        self.shape = Shape::Triangle(extents);
        let inertia = mass * (extents.x * extents.x + extents.y * extents.y) / 18.0;
        self.set_mass(mass, inertia);
    }

    /// True when the body has infinite mass and never moves.
    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    /// Accumulates a force acting at the center of mass.
    pub fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    /// Accumulates a force acting at a world-space point, contributing both
    /// linear force and torque.
    pub fn add_force_at_point(&mut self, force: Vec2, point: Vec2) {
        self.force += force;
        self.torque += (point - self.position).cross(force);
    }

    /// Zeroes the force/torque accumulators. Called at the end of each step.
    pub fn clear_accumulators(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }

    fn reset_state(&mut self) {
        self.position = Vec2::ZERO;
        self.rotation = 0.0;
        self.velocity = Vec2::ZERO;
        self.angular_velocity = 0.0;
        self.force = Vec2::ZERO;
        self.torque = 0.0;
        self.friction = DEFAULT_FRICTION;
    }

    // A non-finite or non-positive mass yields a static body.
    fn set_mass(&mut self, mass: f64, inertia: f64) {
        if mass.is_finite() && mass > 0.0 {
            self.mass = mass;
            self.inv_mass = 1.0 / mass;
            self.inertia = inertia;
            self.inv_inertia = 1.0 / inertia;
        } else {
            self.mass = f64::INFINITY;
            self.inv_mass = 0.0;
            self.inertia = f64::INFINITY;
            self.inv_inertia = 0.0;
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::new()
    }
}
