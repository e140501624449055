// Seeded tie-breaking among near-best moves

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cmp::Ordering;

use crate::types::Direction;

/// Picks a move from `scored`.
///
/// Candidates are sorted by score (stable, best first). Those whose gap to the best,
/// relative to `max(1, |best|)`, is at most `margin` stay in the running, capped at
/// `max(1, k)`. A `StdRng` seeded with `seed` picks uniformly among them, so the same
/// inputs always produce the same move. Returns `None` for an empty slice.
pub fn select_move(
    scored: &[(Direction, f64)],
    k: usize,
    margin: f64,
    seed: u64,
) -> Option<(Direction, f64)> {
    let mut ranked = scored.to_vec();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let best = ranked.first()?.1;
    let denom = best.abs().max(1.0);

    let mut candidates: Vec<(Direction, f64)> = ranked
        .into_iter()
        .filter(|&(_, score)| (best - score) / denom <= margin)
        .collect();
    candidates.truncate(k.max(1));

    let mut rng = StdRng::seed_from_u64(seed);
    let pick = rng.random_range(0..candidates.len());
    Some(candidates[pick])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(select_move(&[], 2, 0.02, 42), None);
    }

    #[test]
    fn test_clear_winner_is_always_chosen() {
        let scored = [
            (Direction::Up, 1.0),
            (Direction::Left, 10.0),
            (Direction::Down, 5.0),
        ];
        for seed in 0..50 {
            assert_eq!(
                select_move(&scored, 2, 0.02, seed),
                Some((Direction::Left, 10.0))
            );
        }
    }

    #[test]
    fn test_tie_break_within_margin() {
        let scored = [(Direction::Up, 10.0), (Direction::Right, 9.9)];
        let mut seen = std::collections::HashSet::new();
        for seed in 0..200 {
            let (dir, _) = select_move(&scored, 2, 0.02, seed).unwrap();
            seen.insert(dir);
        }
        assert!(seen.contains(&Direction::Up));
        assert!(seen.contains(&Direction::Right));
    }

    #[test]
    fn test_same_seed_same_choice() {
        let scored = [
            (Direction::Up, 3.0),
            (Direction::Down, 3.0),
            (Direction::Left, 3.0),
        ];
        let first = select_move(&scored, 3, 0.02, 1234);
        for _ in 0..10 {
            assert_eq!(select_move(&scored, 3, 0.02, 1234), first);
        }
    }

    #[test]
    fn test_candidate_count_caps_the_pool() {
        let scored = [
            (Direction::Up, 3.0),
            (Direction::Down, 3.0),
            (Direction::Left, 3.0),
        ];
        // k = 1 always takes the first of the stable-sorted ties
        for seed in 0..20 {
            assert_eq!(select_move(&scored, 1, 0.5, seed).unwrap().0, Direction::Up);
        }
        // k = 0 behaves like k = 1
        assert_eq!(select_move(&scored, 0, 0.5, 7).unwrap().0, Direction::Up);
    }

    #[test]
    fn test_margin_uses_unit_floor_for_small_scores() {
        // Relative gap 0.01 / max(1, 0.05) = 0.01 stays inside a 0.02 margin
        let scored = [(Direction::Up, 0.05), (Direction::Down, 0.04)];
        let mut seen = std::collections::HashSet::new();
        for seed in 0..200 {
            seen.insert(select_move(&scored, 2, 0.02, seed).unwrap().0);
        }
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_negative_scores_use_magnitude() {
        // Gap 1.0 over |-100| = 0.01
        let scored = [(Direction::Left, -101.0), (Direction::Right, -100.0)];
        let mut seen = std::collections::HashSet::new();
        for seed in 0..200 {
            seen.insert(select_move(&scored, 2, 0.02, seed).unwrap().0);
        }
        assert_eq!(seen.len(), 2);

        assert_eq!(
            select_move(&scored, 2, 0.001, 3),
            Some((Direction::Right, -100.0))
        );
    }
}
