use crate::math::mat22::Mat22;
use crate::math::vec2::Vec2;
use crate::objects::body::Body;

use super::body_pair_mut;

/// A bilateral point constraint: one anchor on each body, forced to
/// coincide in world space. Solved with the same accumulated-impulse
/// technique as a contact's normal constraint, but always active — there is
/// no separation test and the joint is never destroyed.
#[derive(Debug, Clone, Copy)]
pub struct Joint {
    pub body1: usize,
    pub body2: usize,
    /// Anchor in body 1's rotating frame.
    pub local_anchor1: Vec2,
    /// Anchor in body 2's rotating frame.
    pub local_anchor2: Vec2,
    /// Accumulated impulse, carried across frames for warm starting.
    pub p: Vec2,
    pub bias_factor: f64,
    pub softness: f64,

    // Rebuilt from current orientations every pre-step
    m: Mat22,
    bias: Vec2,
    r1: Vec2,
    r2: Vec2,
}

impl Joint {
    /// Creates a joint between two bodies through a world-space anchor
    /// point, captured in each body's local frame at the current poses.
    pub fn new(body1: usize, body2: usize, anchor: Vec2, bodies: &[Body]) -> Self {
        let b1 = &bodies[body1];
        let b2 = &bodies[body2];

        let rot1_t = Mat22::from_angle(b1.rotation).transpose();
        let rot2_t = Mat22::from_angle(b2.rotation).transpose();

        Self {
            body1,
            body2,
            local_anchor1: rot1_t * (anchor - b1.position),
            local_anchor2: rot2_t * (anchor - b2.position),
            p: Vec2::ZERO,
            bias_factor: 0.2,
            softness: 0.0,
            m: Mat22::default(),
            bias: Vec2::ZERO,
            r1: Vec2::ZERO,
            r2: Vec2::ZERO,
        }
    }

    /// World-space positions of the two anchors at the bodies' current poses.
    pub fn world_anchors(&self, bodies: &[Body]) -> (Vec2, Vec2) {
        let b1 = &bodies[self.body1];
        let b2 = &bodies[self.body2];
        let p1 = b1.position + Mat22::from_angle(b1.rotation) * self.local_anchor1;
        let p2 = b2.position + Mat22::from_angle(b2.rotation) * self.local_anchor2;
        (p1, p2)
    }

    /// Recomputes the effective-mass matrix and positional bias from the
    /// current orientations, then applies the warm-started impulse.
    pub fn pre_step(&mut self, bodies: &mut [Body], inv_dt: f64) {
        let (b1, b2) = body_pair_mut(bodies, self.body1, self.body2);

        let rot1 = Mat22::from_angle(b1.rotation);
        let rot2 = Mat22::from_angle(b2.rotation);
        self.r1 = rot1 * self.local_anchor1;
        self.r2 = rot2 * self.local_anchor2;

        // K = mass diagonal + each body's inertia term, softness on the
        // diagonal
        let inv_mass_sum = b1.inv_mass + b2.inv_mass;
        let k1 = Mat22::new(
            Vec2::new(inv_mass_sum, 0.0),
            Vec2::new(0.0, inv_mass_sum),
        );
        let k2 = Mat22::new(
            Vec2::new(
                b1.inv_inertia * self.r1.y * self.r1.y,
                -b1.inv_inertia * self.r1.x * self.r1.y,
            ),
            Vec2::new(
                -b1.inv_inertia * self.r1.x * self.r1.y,
                b1.inv_inertia * self.r1.x * self.r1.x,
            ),
        );
        let k3 = Mat22::new(
            Vec2::new(
                b2.inv_inertia * self.r2.y * self.r2.y,
                -b2.inv_inertia * self.r2.x * self.r2.y,
            ),
            Vec2::new(
                -b2.inv_inertia * self.r2.x * self.r2.y,
                b2.inv_inertia * self.r2.x * self.r2.x,
            ),
        );
        let mut k = k1 + k2 + k3;
        k.col1.x += self.softness;
        k.col2.y += self.softness;
        self.m = k.invert();

        let p1 = b1.position + self.r1;
        let p2 = b2.position + self.r2;
        self.bias = (p2 - p1) * (-self.bias_factor * inv_dt);

        // Warm start
        b1.velocity -= self.p * b1.inv_mass;
        b1.angular_velocity -= b1.inv_inertia * self.r1.cross(self.p);
        b2.velocity += self.p * b2.inv_mass;
        b2.angular_velocity += b2.inv_inertia * self.r2.cross(self.p);
    }

    /// Removes the anchor-point velocity error (plus the position bias) and
    /// accumulates the impulse for next frame's warm start.
    pub fn apply_impulse(&mut self, bodies: &mut [Body]) {
        let (b1, b2) = body_pair_mut(bodies, self.body1, self.body2);

        let dv = b2.velocity + Vec2::new(-self.r2.y, self.r2.x) * b2.angular_velocity
            - b1.velocity
            - Vec2::new(-self.r1.y, self.r1.x) * b1.angular_velocity;

        let impulse = self.m * (self.bias - dv - self.p * self.softness);

        b1.velocity -= impulse * b1.inv_mass;
        b1.angular_velocity -= b1.inv_inertia * self.r1.cross(impulse);
        b2.velocity += impulse * b2.inv_mass;
        b2.angular_velocity += b2.inv_inertia * self.r2.cross(impulse);

        self.p += impulse;
    }
}
