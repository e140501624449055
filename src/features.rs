// Per-move feature probes
//
// The controlled snake alone is advanced with `hypothetical_step`, and every probe reads
// one heuristic off that single result. Opponents stay frozen, so these are local signals
// for diagnostics and logging, not game-accurate outcomes.

use serde::Serialize;

use crate::config::GameRulesConfig;
use crate::grid;
use crate::heuristics;
use crate::moves::count_safe_moves;
use crate::simulate::hypothetical_step;
use crate::state::WorldState;
use crate::types::Direction;

/// Every probe for one candidate move
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MoveFeatures {
    pub direction: Direction,
    pub area_count: usize,
    pub area_normalized: f64,
    pub corridor_penalty: u8,
    pub safe_degree: usize,
    pub center: f64,
    pub longer_proximity: f64,
    pub low_health: bool,
    pub inverse_food_distance: f64,
}

fn after(state: &WorldState, dir: Direction, rules: &GameRulesConfig) -> WorldState {
    hypothetical_step(state, &state.me_id, dir, rules).0
}

/// Negative Manhattan distance from our head to the board center
fn center_score(next: &WorldState) -> f64 {
    -f64::from(grid::manhattan(next.me().head(), next.center()))
}

/// (hungry, inverse distance to nearest uncontested food)
fn food_signal(next: &WorldState, health_low_threshold: i32) -> (bool, f64) {
    (
        next.me().health < health_low_threshold,
        heuristics::inverse_food_distance(next),
    )
}

impl MoveFeatures {
    /// Runs every probe for `dir` off a single hypothetical step
    pub fn probe(
        state: &WorldState,
        dir: Direction,
        rules: &GameRulesConfig,
        health_low_threshold: i32,
    ) -> Self {
        let next = after(state, dir, rules);
        let area = heuristics::reachable_area(&next);
        let safe_degree = count_safe_moves(&next, next.me());
        let (low_health, inverse_food_distance) = food_signal(&next, health_low_threshold);

        MoveFeatures {
            direction: dir,
            area_count: area.count,
            area_normalized: area.normalized,
            corridor_penalty: heuristics::corridor_penalty_for(safe_degree),
            safe_degree,
            center: center_score(&next),
            longer_proximity: heuristics::longer_proximity_term(&next),
            low_health,
            inverse_food_distance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Snake;
    use crate::types::Coord;

    fn c(x: i32, y: i32) -> Coord {
        Coord::new(x, y)
    }

    fn food_state(with_opponent: bool) -> WorldState {
        let mut snakes = vec![Snake::new("me", 20, vec![c(1, 1)])];
        if with_opponent {
            snakes.push(Snake::new(
                "opp",
                90,
                vec![c(4, 1), c(4, 0), c(3, 0), c(2, 0)],
            ));
        }
        WorldState::new(7, 7, 0, "me", snakes, vec![c(3, 1)], vec![], 0)
    }

    #[test]
    fn test_flood_fill_normalized_space() {
        let state = WorldState::new(
            3,
            3,
            0,
            "me",
            vec![Snake::new("me", 90, vec![c(1, 1)])],
            vec![],
            vec![],
            0,
        );
        let probe = MoveFeatures::probe(&state, Direction::Up, &GameRulesConfig::default(), 35);
        assert_eq!(probe.area_count, 9);
        assert_eq!(probe.area_normalized, 1.0);
    }

    #[test]
    fn test_low_hp_food_signal() {
        let state = food_state(true);
        let probe = MoveFeatures::probe(&state, Direction::Right, &GameRulesConfig::default(), 35);
        assert!(probe.low_health);
        assert_eq!(
            probe.inverse_food_distance, 0.0,
            "Food contested by longer opponent should be ignored."
        );
    }

    #[test]
    fn test_food_available_when_uncontested() {
        let state = food_state(false);
        let probe = MoveFeatures::probe(&state, Direction::Right, &GameRulesConfig::default(), 35);
        assert!(probe.low_health);
        assert!(probe.inverse_food_distance > 0.0);
    }

    #[test]
    fn test_probe_reads_the_stepped_state() {
        let state = food_state(true);
        let rules = GameRulesConfig::default();
        let probe = MoveFeatures::probe(&state, Direction::Up, &rules, 35);

        let next = after(&state, Direction::Up, &rules);
        assert_eq!(next.me().head(), c(1, 2));
        assert_eq!(probe.area_count, heuristics::reachable_area(&next).count);
        assert_eq!(probe.safe_degree, count_safe_moves(&next, next.me()));
        assert_eq!(probe.corridor_penalty, heuristics::corridor_penalty_for(probe.safe_degree));
        assert_eq!(probe.longer_proximity, heuristics::longer_proximity_term(&next));
        assert_eq!(probe.center, -3.0);
    }
}
