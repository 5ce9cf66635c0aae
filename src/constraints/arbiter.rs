use crate::collision::contact::Contact;
use crate::math::vec2::Vec2;
use crate::objects::body::Body;

use super::body_pair_mut;

/// Canonical unordered pair of body pool indices. `(a, b)` and `(b, a)`
/// produce the same key, and the derived ordering keeps the arbiter map's
/// iteration deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArbiterKey {
    pub body1: usize,
    pub body2: usize,
}

impl ArbiterKey {
    pub fn new(a: usize, b: usize) -> Self {
        if a < b {
            Self { body1: a, body2: b }
        } else {
            Self { body1: b, body2: a }
        }
    }
}

/// Owns the persistent contact set for one body pair: matches fresh contacts
/// to last frame's by feature identity, and runs the sequential-impulse
/// iteration for the pair.
#[derive(Debug, Clone)]
pub struct Arbiter {
    pub body1: usize,
    pub body2: usize,
    pub contacts: Vec<Contact>,
    /// Combined friction coefficient, the geometric mean of the pair's.
    pub friction: f64,
}

impl Arbiter {
    /// Penetration depth tolerated before the position bias kicks in.
    pub const ALLOWED_PENETRATION: f64 = 0.01;
    /// Fraction of the remaining penetration corrected per second of bias.
    pub const BIAS_FACTOR: f64 = 0.2;

    pub fn new(key: ArbiterKey, contacts: Vec<Contact>, bodies: &[Body]) -> Self {
        let friction = (bodies[key.body1].friction * bodies[key.body2].friction).sqrt();
        Self {
            body1: key.body1,
            body2: key.body2,
            contacts,
            friction,
        }
    }

    /// Replaces the contact set with this frame's contacts, carrying the
    /// accumulated impulses over from any old contact with the same feature.
    pub fn update(&mut self, mut new_contacts: Vec<Contact>) {
        for contact in &mut new_contacts {
            if let Some(old) = self
                .contacts
                .iter()
                .find(|old| old.feature == contact.feature)
            {
                contact.pn = old.pn;
                contact.pt = old.pt;
            }
        }
        self.contacts = new_contacts;
    }

    /// Computes effective masses and the position-bias velocity for every
    /// contact, then applies the warm-start impulses so the first solver
    /// iteration starts from last frame's solution.
    pub fn pre_step(&mut self, bodies: &mut [Body], inv_dt: f64) {
        let (b1, b2) = body_pair_mut(bodies, self.body1, self.body2);

        for contact in &mut self.contacts {
            let r1 = contact.position - b1.position;
            let r2 = contact.position - b2.position;

            let rn1 = r1.dot(contact.normal);
            let rn2 = r2.dot(contact.normal);
            let k_normal = b1.inv_mass
                + b2.inv_mass
                + b1.inv_inertia * (r1.dot(r1) - rn1 * rn1)
                + b2.inv_inertia * (r2.dot(r2) - rn2 * rn2);
            contact.mass_normal = 1.0 / k_normal;

            let tangent = Vec2::new(contact.normal.y, -contact.normal.x);
            let rt1 = r1.dot(tangent);
            let rt2 = r2.dot(tangent);
            let k_tangent = b1.inv_mass
                + b2.inv_mass
                + b1.inv_inertia * (r1.dot(r1) - rt1 * rt1)
                + b2.inv_inertia * (r2.dot(r2) - rt2 * rt2);
            contact.mass_tangent = 1.0 / k_tangent;

            contact.bias = -Self::BIAS_FACTOR
                * inv_dt
                * (contact.separation + Self::ALLOWED_PENETRATION).min(0.0);

            // Warm start with the accumulated impulses
            let p = contact.normal * contact.pn + tangent * contact.pt;
            b1.velocity -= p * b1.inv_mass;
            b1.angular_velocity -= b1.inv_inertia * r1.cross(p);
            b2.velocity += p * b2.inv_mass;
            b2.angular_velocity += b2.inv_inertia * r2.cross(p);
        }
    }

    /// One sequential-impulse pass over the pair's contacts: normal first,
    /// then friction, in a fixed order.
    pub fn apply_impulse(&mut self, bodies: &mut [Body]) {
        let (b1, b2) = body_pair_mut(bodies, self.body1, self.body2);

        for contact in &mut self.contacts {
            let r1 = contact.position - b1.position;
            let r2 = contact.position - b2.position;

            // Relative velocity at the contact point
            let dv = b2.velocity + Vec2::new(-r2.y, r2.x) * b2.angular_velocity
                - b1.velocity
                - Vec2::new(-r1.y, r1.x) * b1.angular_velocity;

            let vn = dv.dot(contact.normal);
            let d_pn = contact.mass_normal * (-vn + contact.bias);

            // Clamp the accumulated impulse: contacts push, never pull
            let pn0 = contact.pn;
            contact.pn = (pn0 + d_pn).max(0.0);
            let d_pn = contact.pn - pn0;

            let pn = contact.normal * d_pn;
            b1.velocity -= pn * b1.inv_mass;
            b1.angular_velocity -= b1.inv_inertia * r1.cross(pn);
            b2.velocity += pn * b2.inv_mass;
            b2.angular_velocity += b2.inv_inertia * r2.cross(pn);

            // Relative velocity again, post normal impulse
            let dv = b2.velocity + Vec2::new(-r2.y, r2.x) * b2.angular_velocity
                - b1.velocity
                - Vec2::new(-r1.y, r1.x) * b1.angular_velocity;

            let tangent = Vec2::new(contact.normal.y, -contact.normal.x);
            let vt = dv.dot(tangent);
            let d_pt = contact.mass_tangent * (-vt);

            // Coulomb cone: |pt| <= friction * pn, on the accumulated value
            let max_pt = self.friction * contact.pn;
            let pt0 = contact.pt;
            contact.pt = (pt0 + d_pt).clamp(-max_pt, max_pt);
            let d_pt = contact.pt - pt0;

            let pt = tangent * d_pt;
            b1.velocity -= pt * b1.inv_mass;
            b1.angular_velocity -= b1.inv_inertia * r1.cross(pt);
            b2.velocity += pt * b2.inv_mass;
            b2.angular_velocity += b2.inv_inertia * r2.cross(pt);
        }
    }
}
