use crate::objects::body::Body;

/// Enumerates the body pairs worth handing to the narrow phase. Kept behind
/// a trait so a spatial index can replace the all-pairs sweep without
/// touching arbiter or world logic.
pub trait BroadPhase {
    /// Returns candidate pairs as indices into the body slice, each pair
    /// with the smaller index first.
    fn candidate_pairs(&self, bodies: &[Body]) -> Vec<(usize, usize)>;
}

/// Checks every unordered pair. O(n^2), fine at this body count.
pub struct AllPairs;

impl BroadPhase for AllPairs {
    fn candidate_pairs(&self, bodies: &[Body]) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                // Two static bodies can never generate impulses
                if bodies[i].is_static() && bodies[j].is_static() {
                    continue;
                }
                pairs.push((i, j));
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec2::Vec2;

    fn dynamic_body() -> Body {
        let mut body = Body::new();
        body.set_as_box(Vec2::new(1.0, 1.0), 1.0);
        body
    }

    #[test]
    fn test_all_pairs_enumerates_each_pair_once() {
        let bodies = vec![dynamic_body(), dynamic_body(), dynamic_body()];
        let pairs = AllPairs.candidate_pairs(&bodies);
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_all_pairs_skips_static_static() {
        let bodies = vec![Body::new(), Body::new(), dynamic_body()];
        let pairs = AllPairs.candidate_pairs(&bodies);
        assert_eq!(pairs, vec![(0, 2), (1, 2)]);
    }

    #[test]
    fn test_all_pairs_empty_world() {
        assert!(AllPairs.candidate_pairs(&[]).is_empty());
    }
}
