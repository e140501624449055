// Per-turn decision loop
//
// Every legal root move is scored by the beam search, one after another, until the
// move deadline runs out. The seeded selector then breaks near-ties among the best
// scores. The async `get_move` entry point runs this on tokio's blocking pool so the
// Rocket workers stay free.

use log::{error, info, warn};
use serde_json::{json, Value};
use std::cmp::Ordering;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::moves::my_legal_moves;
use crate::search::beam_search;
use crate::selection::select_move;
use crate::state::{SnapshotError, WorldState};
use crate::types::{Board, Direction, Game, GameState, You};

/// Direction returned when no legal move exists
pub const DEFAULT_MOVE: Direction = Direction::Up;

/// Outcome of one turn's decision
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub direction: Direction,
    /// Beam score of the chosen move; `None` when no move was legal
    pub score: Option<f64>,
    /// Every root move scored before the deadline, best first
    pub candidates: Vec<(Direction, f64)>,
    pub elapsed_ms: u64,
}

/// Battlesnake bot exposing one method per API endpoint
pub struct Bot {
    config: Config,
    debug_logger: DebugLogger,
}

impl Bot {
    /// Creates a bot without a decision log
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        Bot::with_logger(config, DebugLogger::disabled())
    }

    /// Creates a bot that appends every decision to `debug_logger`
    pub fn with_logger(config: Config, debug_logger: DebugLogger) -> Self {
        Bot {
            config,
            debug_logger,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        json!({
            "apiversion": "1",
            "author": "beam-snake",
            "color": "#3366CC",
            "head": "default",
            "tail": "default",
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, _turn: i32, board: &Board, you: &You) {
        info!(
            "GAME START {} as {} ({}x{}, {} snakes)",
            game.id,
            you.id,
            board.width,
            board.height,
            board.snakes.len()
        );
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, turn: i32, _board: &Board, _you: &You) {
        info!("GAME OVER {} after {} turns", game.id, turn);
    }

    /// Computes the next move
    /// Corresponds to POST /move endpoint
    ///
    /// # Returns
    /// * `Ok(Value)` - `{"move": "<direction>"}`
    /// * `Err(SnapshotError)` - the snapshot cannot describe a real board; no move is made
    pub async fn get_move(&self, snapshot: &GameState) -> Result<Value, SnapshotError> {
        let owned = snapshot.clone();
        let config = self.config.clone();

        let decision = match tokio::task::spawn_blocking(move || Bot::decide(&owned, &config)).await {
            Ok(result) => result?,
            Err(e) => {
                error!("Turn {}: decision task failed: {}", snapshot.turn, e);
                Decision {
                    direction: DEFAULT_MOVE,
                    score: None,
                    candidates: vec![],
                    elapsed_ms: 0,
                }
            }
        };

        self.debug_logger.log_decision(snapshot.clone(), &decision);
        Ok(json!({ "move": decision.direction.as_str() }))
    }

    /// Validates the snapshot and runs the decision loop on it
    pub fn decide(snapshot: &GameState, config: &Config) -> Result<Decision, SnapshotError> {
        let start_time = Instant::now();
        let state = WorldState::from_snapshot(snapshot, config.selection.base_seed)?;
        Ok(Bot::decide_state(&state, config, start_time))
    }

    /// Scores every legal root move in order, stopping early once `deadline_ms` has
    /// passed since `start_time`, and picks among the near-best scores
    pub fn decide_state(state: &WorldState, config: &Config, start_time: Instant) -> Decision {
        Self::log_snapshot(state);

        let legal = my_legal_moves(state);
        if legal.is_empty() {
            warn!(
                "Turn {}: no legal moves, defaulting to {}",
                state.turn, DEFAULT_MOVE
            );
            return Decision {
                direction: DEFAULT_MOVE,
                score: None,
                candidates: vec![],
                elapsed_ms: start_time.elapsed().as_millis() as u64,
            };
        }

        let deadline = Duration::from_millis(config.timing.deadline_ms);
        let mut scored: Vec<(Direction, f64)> = Vec::with_capacity(legal.len());

        for (index, &dir) in legal.iter().enumerate() {
            scored.push((dir, beam_search(state, dir, config)));

            let remaining = legal.len() - index - 1;
            if remaining > 0 && start_time.elapsed() > deadline {
                warn!(
                    "Turn {}: deadline of {}ms reached, skipping {} root move(s)",
                    state.turn, config.timing.deadline_ms, remaining
                );
                break;
            }
        }

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        info!(
            "Turn {}: candidates [{}]",
            state.turn,
            scored
                .iter()
                .map(|(dir, score)| format!("{}={:.3}", dir, score))
                .collect::<Vec<_>>()
                .join(", ")
        );

        let seed = state.decision_seed(0);
        let (direction, score) = select_move(
            &scored,
            config.selection.tie_candidate_count,
            config.selection.tie_margin,
            seed,
        )
        .map_or((DEFAULT_MOVE, None), |(dir, score)| (dir, Some(score)));

        let elapsed_ms = start_time.elapsed().as_millis() as u64;
        info!(
            "Turn {}: Chose {} (score: {}, time: {}ms)",
            state.turn,
            direction,
            score.map_or_else(|| "-".to_string(), |s| format!("{:.3}", s)),
            elapsed_ms
        );

        Decision {
            direction,
            score,
            candidates: scored,
            elapsed_ms,
        }
    }

    fn log_snapshot(state: &WorldState) {
        let snakes: Vec<String> = state
            .active_snakes()
            .map(|s| {
                format!(
                    "{}{} hp={} len={} head=({},{})",
                    s.id,
                    if s.id == state.me_id { "*" } else { "" },
                    s.health,
                    s.length(),
                    s.head().x,
                    s.head().y
                )
            })
            .collect();
        info!(
            "Turn {}: {}x{} board, {} food, snakes: {}",
            state.turn,
            state.width,
            state.height,
            state.food.len(),
            snakes.join("; ")
        );
    }
}
