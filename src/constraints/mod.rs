use crate::objects::body::Body;

pub mod arbiter;
pub mod joint;

// Re-export the constraint types for easier access
pub use arbiter::{Arbiter, ArbiterKey};
pub use joint::Joint;

/// Helper to safely get mutable references to two different bodies in a
/// slice. Panics if the indices are equal or out of bounds; both are
/// internal invariants of the arbiter map and joint validation.
pub(crate) fn body_pair_mut(
    bodies: &mut [Body],
    idx_a: usize,
    idx_b: usize,
) -> (&mut Body, &mut Body) {
    if idx_a == idx_b {
        panic!("a constraint cannot connect a body to itself");
    }
    if idx_a >= bodies.len() || idx_b >= bodies.len() {
        panic!("body index out of bounds");
    }

    // Ensure a < b for split_at_mut
    if idx_a < idx_b {
        let (slice_a, slice_b) = bodies.split_at_mut(idx_b);
        (&mut slice_a[idx_a], &mut slice_b[0])
    } else {
        let (slice_b, slice_a) = bodies.split_at_mut(idx_a);
        (&mut slice_a[0], &mut slice_b[idx_b])
    }
}
