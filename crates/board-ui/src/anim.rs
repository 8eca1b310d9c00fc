//! Animation planning: minimal piece motion between two placements.
//!
//! Appeared pieces are matched to the closest unclaimed vanished piece of
//! the same color and role; each match becomes a motion vector from the
//! old square to the new one. Vanished pieces that nothing claimed fade
//! out in place.

use std::collections::HashMap;

use board_core::{geometry, Piece, Square};

/// Motion vector for one appeared piece, in board-coordinate units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimVector {
    /// Full offset from the vanished source square (source minus
    /// destination).
    pub from: (f64, f64),
    /// Offset at the current tick, eased toward zero.
    pub current: (f64, f64),
}

#[derive(Debug, Clone, Default)]
pub struct AnimPlan {
    /// Destination square to its motion vector.
    pub anims: HashMap<Square, AnimVector>,
    /// Vanished squares with no matched appearance.
    pub fadings: HashMap<Square, Piece>,
}

impl AnimPlan {
    pub fn is_empty(&self) -> bool {
        self.anims.is_empty() && self.fadings.is_empty()
    }
}

/// An animation in flight.
#[derive(Debug, Clone)]
pub struct AnimCurrent {
    /// Clock reading when the animation (re)started.
    pub start: f64,
    /// Reciprocal of the duration in milliseconds.
    pub frequency: f64,
    pub plan: AnimPlan,
}

/// Ease-in-out cubic over `[0, 1]`.
pub fn ease(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        (t - 1.0) * (2.0 * t - 2.0) * (2.0 * t - 2.0) + 1.0
    }
}

pub fn compute_plan(prev: &HashMap<Square, Piece>, current: &HashMap<Square, Piece>) -> AnimPlan {
    let mut news: Vec<(Square, Piece)> = Vec::new();
    let mut missings: Vec<(Square, Piece)> = Vec::new();
    for sq in Square::all() {
        match (current.get(&sq), prev.get(&sq)) {
            (Some(cur), Some(pre)) => {
                if !cur.same_movement(pre) {
                    missings.push((sq, *pre));
                    news.push((sq, *cur));
                }
            }
            (Some(cur), None) => news.push((sq, *cur)),
            (None, Some(pre)) => missings.push((sq, *pre)),
            (None, None) => {}
        }
    }
    let mut plan = AnimPlan::default();
    let mut claimed = vec![false; missings.len()];
    for (dest, piece) in news {
        let mut best: Option<usize> = None;
        let mut best_d = i32::MAX;
        for (i, (orig, missing)) in missings.iter().enumerate() {
            if claimed[i] || !missing.same_movement(&piece) {
                continue;
            }
            let d = geometry::distance_sq(orig.coords(), dest.coords());
            if d < best_d {
                best_d = d;
                best = Some(i);
            }
        }
        if let Some(i) = best {
            claimed[i] = true;
            let (orig, _) = missings[i];
            let vector = (
                (orig.file() as i8 - dest.file() as i8) as f64,
                (orig.rank() as i8 - dest.rank() as i8) as f64,
            );
            plan.anims.insert(
                dest,
                AnimVector {
                    from: vector,
                    current: vector,
                },
            );
        }
    }
    for (i, (orig, piece)) in missings.into_iter().enumerate() {
        if !claimed[i] {
            plan.fadings.insert(orig, piece);
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use board_core::fen;
    use board_core::{Color, Role};

    fn sq(key: &str) -> Square {
        key.parse().unwrap()
    }

    #[test]
    fn test_single_move_one_vector_no_fades() {
        let prev = fen::read("8/8/8/8/8/8/8/1N6");
        let cur = fen::read("8/8/8/8/8/2N5/8/8");
        let plan = compute_plan(&prev, &cur);
        assert_eq!(plan.anims.len(), 1);
        assert!(plan.fadings.is_empty());
        let vector = plan.anims[&sq("c3")];
        // from b1 to c3: one file left, two ranks down
        assert_eq!(vector.from, (-1.0, -2.0));
        assert_eq!(vector.current, vector.from);
    }

    #[test]
    fn test_promotion_fades_pawn_no_slide() {
        let prev = fen::read("8/8/8/8/4P3/8/8/8");
        let cur = fen::read("8/8/8/8/4Q3/8/8/8");
        let plan = compute_plan(&prev, &cur);
        assert!(plan.anims.is_empty());
        assert_eq!(plan.fadings.len(), 1);
        let faded = plan.fadings[&sq("e4")];
        assert_eq!(faded.role, Role::Pawn);
        assert_eq!(faded.color, Color::White);
    }

    #[test]
    fn test_capture_fades_victim_and_slides_attacker() {
        let prev = fen::read("8/8/8/3p4/4B3/8/8/8");
        let cur = fen::read("8/8/8/3B4/8/8/8/8");
        let plan = compute_plan(&prev, &cur);
        assert_eq!(plan.anims.len(), 1);
        assert!(plan.anims.contains_key(&sq("d5")));
        assert_eq!(plan.fadings.len(), 1);
        assert_eq!(plan.fadings[&sq("d5")].role, Role::Pawn);
    }

    #[test]
    fn test_nearest_match_wins() {
        // two white rooks vanish, one appears: the closer one slides
        let prev = fen::read("8/8/8/8/8/8/8/R6R");
        let cur = fen::read("8/8/8/8/8/8/8/5R2");
        let plan = compute_plan(&prev, &cur);
        let vector = plan.anims[&sq("f1")];
        // matched to h1 (distance 2), not a1 (distance 5)
        assert_eq!(vector.from, (2.0, 0.0));
        assert_eq!(plan.fadings.len(), 1);
        assert!(plan.fadings.contains_key(&sq("a1")));
    }

    #[test]
    fn test_vanished_piece_claimed_at_most_once() {
        // one queen vanishes, two appear: only one appearance gets a vector
        let prev = fen::read("8/8/8/8/3Q4/8/8/8");
        let cur = fen::read("8/8/8/8/8/2Q1Q3/8/8");
        let plan = compute_plan(&prev, &cur);
        assert_eq!(plan.anims.len(), 1);
        assert!(plan.fadings.is_empty());
    }

    #[test]
    fn test_unchanged_board_is_empty_plan() {
        let prev = fen::read(fen::INITIAL);
        let plan = compute_plan(&prev, &prev.clone());
        assert!(plan.is_empty());
    }

    #[test]
    fn test_ease_endpoints() {
        assert_eq!(ease(0.0), 0.0);
        assert_eq!(ease(1.0), 1.0);
        assert!((ease(0.5) - 0.5).abs() < 1e-9);
    }
}
