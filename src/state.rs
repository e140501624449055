// World state: the per-turn snapshot of board and snakes that the search clones and advances

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use sha1::{Digest, Sha1};
use std::collections::{BTreeMap, HashSet};

use crate::grid;
use crate::types::{Coord, GameState};

/// Why a snake left the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeathCause {
    Wall,
    Body,
    #[serde(rename = "self")]
    SelfCollision,
    HeadToHead,
    Starvation,
    NoMove,
}

impl DeathCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeathCause::Wall => "wall",
            DeathCause::Body => "body",
            DeathCause::SelfCollision => "self",
            DeathCause::HeadToHead => "head-to-head",
            DeathCause::Starvation => "starvation",
            DeathCause::NoMove => "no-move",
        }
    }
}

/// A snake inside a simulated world. The body is never empty; `body[0]` is the head.
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    pub id: String,
    pub name: String,
    pub health: i32,
    pub body: Vec<Coord>,
    pub eliminated: bool,
    pub death_cause: Option<DeathCause>,
}

impl Snake {
    /// Test builder for a live snake. Panics if `body` is empty; snapshots go
    /// through `WorldState::from_snapshot`, which rejects empty bodies instead.
    #[cfg(test)]
    pub fn new(id: &str, health: i32, body: Vec<Coord>) -> Self {
        assert!(!body.is_empty(), "snake body must not be empty");
        Snake {
            id: id.to_string(),
            name: id.to_string(),
            health,
            body,
            eliminated: false,
            death_cause: None,
        }
    }

    pub fn head(&self) -> Coord {
        self.body[0]
    }

    pub fn length(&self) -> usize {
        self.body.len()
    }

    pub fn eliminate(&mut self, cause: DeathCause) {
        self.eliminated = true;
        self.death_cause = Some(cause);
    }
}

/// Semantic problems with an incoming snapshot that serde cannot catch
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("invalid board dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("snake '{0}' has an empty body")]
    EmptyBody(String),
    #[error("duplicate snake id '{0}'")]
    DuplicateSnake(String),
    #[error("controlled snake '{0}' is not on the board")]
    MissingYou(String),
}

/// Derives the deterministic seed for one game turn.
///
/// SHA-1 of `"{base_seed}|{game_id}|{turn}"`, read as a big-endian integer and
/// masked to 31 bits.
pub fn derive_seed(base_seed: u64, game_id: &str, turn: i32) -> u64 {
    let material = format!("{}|{}|{}", base_seed, game_id, turn);
    let digest = Sha1::digest(material.as_bytes());
    let low = [digest[16], digest[17], digest[18], digest[19]];
    u64::from(u32::from_be_bytes(low) & 0x7FFF_FFFF)
}

/// Snapshot of the board and every snake for one (possibly hypothetical) turn.
///
/// Every simulation step returns a fresh `WorldState`; nothing is shared between
/// copies, so branches of the search never observe each other.
#[derive(Debug, Clone)]
pub struct WorldState {
    pub width: i32,
    pub height: i32,
    pub turn: i32,
    pub snakes: BTreeMap<String, Snake>,
    pub me_id: String,
    pub food: HashSet<Coord>,
    pub hazards: HashSet<Coord>,
    pub seed: u64,
}

impl WorldState {
    /// Test builder. `me_id` must name one of `snakes`.
    #[cfg(test)]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        width: i32,
        height: i32,
        turn: i32,
        me_id: &str,
        snakes: Vec<Snake>,
        food: impl IntoIterator<Item = Coord>,
        hazards: impl IntoIterator<Item = Coord>,
        seed: u64,
    ) -> Self {
        WorldState {
            width,
            height,
            turn,
            snakes: snakes.into_iter().map(|s| (s.id.clone(), s)).collect(),
            me_id: me_id.to_string(),
            food: food.into_iter().collect(),
            hazards: hazards.into_iter().collect(),
            seed,
        }
    }

    /// Converts a decoded API snapshot, validating what serde cannot
    pub fn from_snapshot(snapshot: &GameState, base_seed: u64) -> Result<Self, SnapshotError> {
        let board = &snapshot.board;
        if board.width <= 0 || board.height <= 0 {
            return Err(SnapshotError::InvalidDimensions {
                width: board.width,
                height: board.height,
            });
        }

        let mut snakes = BTreeMap::new();
        for wire in &board.snakes {
            if wire.body.is_empty() {
                return Err(SnapshotError::EmptyBody(wire.id.clone()));
            }
            let snake = Snake {
                id: wire.id.clone(),
                name: wire.name.clone().unwrap_or_else(|| wire.id.clone()),
                health: wire.health,
                body: wire.body.clone(),
                eliminated: wire.eliminated,
                death_cause: None,
            };
            if snakes.insert(wire.id.clone(), snake).is_some() {
                return Err(SnapshotError::DuplicateSnake(wire.id.clone()));
            }
        }

        if !snakes.contains_key(&snapshot.you.id) {
            return Err(SnapshotError::MissingYou(snapshot.you.id.clone()));
        }

        Ok(WorldState {
            width: board.width,
            height: board.height,
            turn: snapshot.turn,
            snakes,
            me_id: snapshot.you.id.clone(),
            food: board.food.iter().copied().collect(),
            hazards: board.hazards.iter().copied().collect(),
            seed: derive_seed(base_seed, &snapshot.game.id, snapshot.turn),
        })
    }

    /// The controlled snake. Snakes are never removed from a state, only eliminated.
    pub fn me(&self) -> &Snake {
        &self.snakes[self.me_id.as_str()]
    }

    pub fn snake(&self, id: &str) -> Option<&Snake> {
        self.snakes.get(id)
    }

    /// Non-eliminated snakes other than the controlled one, ordered by id
    pub fn opponents(&self) -> impl Iterator<Item = &Snake> + '_ {
        self.snakes
            .values()
            .filter(move |s| s.id != self.me_id && !s.eliminated)
    }

    pub fn active_snakes(&self) -> impl Iterator<Item = &Snake> + '_ {
        self.snakes.values().filter(|s| !s.eliminated)
    }

    /// Every cell covered by an active snake's body
    pub fn occupied(&self) -> HashSet<Coord> {
        self.active_snakes()
            .flat_map(|s| s.body.iter().copied())
            .collect()
    }

    pub fn inside(&self, point: Coord) -> bool {
        grid::inside(point, self.width, self.height)
    }

    pub fn is_food(&self, point: Coord) -> bool {
        self.food.contains(&point)
    }

    pub fn is_hazard(&self, point: Coord) -> bool {
        self.hazards.contains(&point)
    }

    pub fn total_cells(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn center(&self) -> Coord {
        grid::board_center(self.width, self.height)
    }

    /// Seed for the `index`-th random decision taken from this state.
    ///
    /// Each decision draws from its own generator so results never depend on how
    /// many other draws happened before it.
    pub fn decision_seed(&self, index: u64) -> u64 {
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(index));
        (rng.random::<f64>() * 1_000_000.0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Battlesnake, Board, Game, You};
    use std::collections::HashMap;

    fn wire_snake(id: &str, body: Vec<Coord>) -> Battlesnake {
        Battlesnake {
            id: id.to_string(),
            name: None,
            health: 90,
            body,
            head: None,
            length: None,
            latency: None,
            shout: None,
            eliminated: false,
        }
    }

    fn snapshot(snakes: Vec<Battlesnake>, you: &str) -> GameState {
        GameState {
            game: Game {
                id: "test-game".to_string(),
                ruleset: HashMap::new(),
                timeout: 500,
            },
            turn: 0,
            board: Board {
                height: 7,
                width: 7,
                food: vec![Coord::new(3, 3), Coord::new(3, 3)],
                snakes,
                hazards: vec![],
            },
            you: You { id: you.to_string() },
        }
    }

    #[test]
    fn test_derive_seed_matches_reference_values() {
        assert_eq!(derive_seed(42, "test-game", 0), 1_216_815_943);
        assert_eq!(derive_seed(42, "policy-eval", 0), 316_713_218);
        assert_eq!(derive_seed(7, "abc", 12), 849_053_921);
    }

    #[test]
    fn test_from_snapshot_builds_state() {
        let snap = snapshot(
            vec![
                wire_snake("me", vec![Coord::new(1, 1), Coord::new(1, 0)]),
                wire_snake("opp", vec![Coord::new(5, 5)]),
            ],
            "me",
        );
        let state = WorldState::from_snapshot(&snap, 42).unwrap();
        assert_eq!(state.me().head(), Coord::new(1, 1));
        assert_eq!(state.me().name, "me");
        assert_eq!(state.opponents().count(), 1);
        assert_eq!(state.food.len(), 1, "duplicate food collapses into a set");
        assert_eq!(state.seed, 1_216_815_943);
    }

    #[test]
    fn test_from_snapshot_rejects_missing_you() {
        let snap = snapshot(vec![wire_snake("opp", vec![Coord::new(5, 5)])], "me");
        assert_eq!(
            WorldState::from_snapshot(&snap, 42).unwrap_err(),
            SnapshotError::MissingYou("me".to_string())
        );
    }

    #[test]
    fn test_from_snapshot_rejects_empty_body() {
        let snap = snapshot(vec![wire_snake("me", vec![])], "me");
        assert_eq!(
            WorldState::from_snapshot(&snap, 42).unwrap_err(),
            SnapshotError::EmptyBody("me".to_string())
        );
    }

    #[test]
    fn test_from_snapshot_rejects_bad_dimensions() {
        let mut snap = snapshot(vec![wire_snake("me", vec![Coord::new(0, 0)])], "me");
        snap.board.width = 0;
        assert!(matches!(
            WorldState::from_snapshot(&snap, 42),
            Err(SnapshotError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_clone_is_deep() {
        let state = WorldState::new(
            5,
            5,
            0,
            "me",
            vec![Snake::new("me", 90, vec![Coord::new(2, 2)])],
            vec![Coord::new(0, 0)],
            vec![],
            1,
        );
        let mut copy = state.clone();
        copy.snakes.get_mut("me").unwrap().body.insert(0, Coord::new(2, 3));
        copy.food.clear();
        assert_eq!(state.me().length(), 1);
        assert_eq!(state.food.len(), 1);
    }

    #[test]
    fn test_decision_seed_is_reproducible_and_index_sensitive() {
        let state = WorldState::new(
            5,
            5,
            0,
            "me",
            vec![Snake::new("me", 90, vec![Coord::new(2, 2)])],
            vec![],
            vec![],
            derive_seed(42, "g", 3),
        );
        assert_eq!(state.decision_seed(0), state.clone().decision_seed(0));
        assert!(state.decision_seed(0) < 1_000_000);
        let draws: HashSet<u64> = (0..8).map(|i| state.decision_seed(i)).collect();
        assert!(draws.len() > 1);
    }
}
