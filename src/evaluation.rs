// Heuristic evaluator
//
// Scores a fully simulated state from the controlled snake's point of view. The
// score is a pure function of the state, the weights and the hunger threshold.

use serde::Serialize;

use crate::config::Weights;
use crate::grid;
use crate::heuristics;
use crate::moves::count_safe_moves;
use crate::state::WorldState;

/// Raw (unweighted) heuristic terms for one state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub area: f64,
    pub low_health: bool,
    pub inverse_food_distance: f64,
    pub corridor_penalty: u8,
    pub in_hazard: bool,
    pub head_to_head: f64,
    pub center_distance: i32,
    pub safe_moves: usize,
    pub longer_proximity: f64,
    pub stability: f64,
    pub voronoi: f64,
}

impl ScoreBreakdown {
    /// Computes every term for `state`
    pub fn of(state: &WorldState, health_low_threshold: i32) -> Self {
        let me = state.me();
        let area = heuristics::reachable_area(state);
        let safe_moves = count_safe_moves(state, me);

        // Head-to-head pressure fades when we are the shorter snake on the board.
        let longest = state.opponents().map(|s| s.length()).max().unwrap_or(0);
        let raw_h2h = heuristics::head_to_head_term(state);
        let head_to_head = if longest == 0 {
            raw_h2h
        } else {
            raw_h2h * (me.length() as f64 / (longest as f64 + 1e-9)).min(1.0)
        };

        ScoreBreakdown {
            area: area.normalized,
            low_health: me.health < health_low_threshold,
            inverse_food_distance: heuristics::inverse_food_distance(state),
            corridor_penalty: heuristics::corridor_penalty_for(safe_moves),
            in_hazard: state.is_hazard(me.head()),
            head_to_head,
            center_distance: grid::manhattan(me.head(), state.center()),
            safe_moves,
            longer_proximity: heuristics::longer_proximity_term(state),
            stability: area.count as f64 / state.total_cells().max(1) as f64,
            voronoi: heuristics::voronoi_control(state),
        }
    }

    /// Weighted sum of the terms
    pub fn total(&self, weights: &Weights) -> f64 {
        let hungry = if self.low_health { 1.0 } else { 0.0 };
        let hazard = if self.in_hazard { 1.0 } else { 0.0 };

        weights.area * self.area
            + weights.food * hungry * self.inverse_food_distance
            - weights.corridor * f64::from(self.corridor_penalty)
            - weights.hazard * hazard
            + weights.h2h * self.head_to_head
            - weights.center * f64::from(self.center_distance)
            + weights.degree * self.safe_moves as f64
            + weights.longer * self.longer_proximity
            + weights.stability * self.stability
            + weights.voronoi * self.voronoi
    }
}

/// Scalar score of `state`; higher is better for the controlled snake
pub fn evaluate(state: &WorldState, weights: &Weights, health_low_threshold: i32) -> f64 {
    ScoreBreakdown::of(state, health_low_threshold).total(weights)
}
