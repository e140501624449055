// Adversarial beam search
//
// For one candidate root move we simulate the most plausible opponent replies,
// keep the best `beam_width` resulting states, and score the move by the mean over
// those states (optionally after one more ply of our own best reply). Averaging
// rewards moves whose whole spread of likely replies is good, not just the best one.

use log::debug;
use rayon::prelude::*;
use std::cmp::Ordering;

use crate::config::Config;
use crate::evaluation::evaluate;
use crate::grid;
use crate::moves::{count_safe_moves, legal_moves, my_legal_moves};
use crate::simulate::{hypothetical_step, simulate_turn, MoveMap};
use crate::state::{Snake, WorldState};
use crate::types::Direction;

/// A simulated successor with its immediate score
#[derive(Debug, Clone)]
pub struct Child {
    pub score: f64,
    pub state: WorldState,
}

/// Top-ranked moves for one opponent, best first
pub type OpponentRanking = (String, Vec<(Direction, f64)>);

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn score_of(state: &WorldState, config: &Config) -> f64 {
    evaluate(state, &config.weights, config.scores.health_low_threshold)
}

/// Score for a dead end: the current evaluation minus a fixed penalty, which keeps
/// losing options ordered among themselves
fn losing_score(state: &WorldState, config: &Config) -> f64 {
    score_of(state, config) - config.scores.losing_branch_penalty
}

/// Cheap "how likely is this move" score for an opponent.
///
/// Successor safe-move count, plus a pull toward food when the opponent is hungry,
/// plus a small length bias. Deliberately separate from `evaluate`, which is far
/// more expensive and scores from our point of view.
pub fn opponent_plausibility(
    state: &WorldState,
    opponent: &Snake,
    dir: Direction,
    config: &Config,
) -> f64 {
    let (next, _) = hypothetical_step(state, &opponent.id, dir, &config.game_rules);
    let Some(moved) = next.snake(&opponent.id) else {
        return 0.0;
    };

    let degree = count_safe_moves(&next, moved) as f64;
    let toward_food = if opponent.health < config.scores.health_low_threshold {
        next.food
            .iter()
            .map(|&food| grid::manhattan(moved.head(), food))
            .min()
            .map_or(0.0, |d| 1.0 / (f64::from(d) + 1.0))
    } else {
        0.0
    };

    degree + toward_food + config.scores.opponent_length_bias * moved.length() as f64
}

/// Ranks every living opponent's legal moves and keeps each one's top `K`
pub fn rank_opponent_moves(state: &WorldState, config: &Config) -> Vec<OpponentRanking> {
    let keep = config.search.opponent_branch_factor.max(1);

    state
        .opponents()
        .map(|opponent| {
            let mut scored: Vec<(Direction, f64)> = legal_moves(state, opponent)
                .into_iter()
                .map(|dir| (dir, opponent_plausibility(state, opponent, dir, config)))
                .collect();
            scored.sort_by(|a, b| descending(a.1, b.1));
            scored.truncate(keep);
            (opponent.id.clone(), scored)
        })
        .collect()
}

/// Cross product of the per-opponent rankings, pruned to the `beam_width` best
/// combined plausibility after each opponent is folded in.
///
/// Opponents without legal moves are left out of every combination.
pub fn top_combinations(rankings: &[OpponentRanking], beam_width: usize) -> Vec<MoveMap> {
    let mut combos: Vec<(MoveMap, f64)> = vec![(MoveMap::new(), 0.0)];

    for (id, moves) in rankings {
        let mut expanded: Vec<(MoveMap, f64)> = Vec::with_capacity(combos.len() * moves.len());
        for (combo, combo_score) in &combos {
            for &(dir, score) in moves {
                let mut next = combo.clone();
                next.insert(id.clone(), dir);
                expanded.push((next, combo_score + score));
            }
        }
        if expanded.is_empty() {
            continue;
        }
        expanded.sort_by(|a, b| descending(a.1, b.1));
        expanded.truncate(beam_width.max(1));
        combos = expanded;
    }

    combos.into_iter().map(|(combo, _)| combo).collect()
}

/// Simulates `my_move` against the top opponent reply combinations and keeps the
/// `beam_width` best children, best first
pub fn expand_with_opponents(state: &WorldState, my_move: Direction, config: &Config) -> Vec<Child> {
    let beam_width = config.search.beam_width.max(1);
    let rankings = rank_opponent_moves(state, config);
    let mut combos = top_combinations(&rankings, beam_width);
    if combos.is_empty() {
        combos.push(MoveMap::new());
    }

    let mut children: Vec<Child> = combos
        .into_par_iter()
        .map(|mut combo| {
            combo.insert(state.me_id.clone(), my_move);
            let next = simulate_turn(state, &combo, &config.game_rules);
            Child {
                score: score_of(&next, config),
                state: next,
            }
        })
        .collect();

    children.sort_by(|a, b| descending(a.score, b.score));
    children.truncate(beam_width);
    children
}

/// Best mean outcome over our legal moves in `state`, looking `remaining` plies ahead
fn best_future_score(state: &WorldState, remaining: u8, config: &Config) -> f64 {
    if remaining == 0 {
        return score_of(state, config);
    }

    let moves = my_legal_moves(state);
    if moves.is_empty() {
        return losing_score(state, config);
    }

    moves
        .into_iter()
        .map(|dir| {
            let children = expand_with_opponents(state, dir, config);
            if children.is_empty() {
                return losing_score(state, config);
            }
            mean(children.iter().map(|child| {
                if remaining == 1 {
                    child.score
                } else {
                    best_future_score(&child.state, remaining - 1, config)
                }
            }))
        })
        .fold(f64::NEG_INFINITY, f64::max)
}

/// Scores `root_move` for the controlled snake.
///
/// The root ply is always simulated, so depths 0 and 1 both return the mean score of
/// the kept root children; depth 2 replaces each child's score with our best reply.
pub fn beam_search(state: &WorldState, root_move: Direction, config: &Config) -> f64 {
    let children = expand_with_opponents(state, root_move, config);
    if children.is_empty() {
        return losing_score(state, config);
    }

    let depth = config.search.depth;
    let score = if depth <= 1 {
        mean(children.iter().map(|child| child.score))
    } else {
        mean(
            children
                .iter()
                .map(|child| best_future_score(&child.state, depth - 1, config)),
        )
    };

    debug!(
        "Turn {}: {} -> {:.3} over {} children (depth {})",
        state.turn,
        root_move,
        score,
        children.len(),
        depth
    );
    score
}
