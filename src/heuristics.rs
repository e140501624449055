// Spatial heuristics: reachable area, territory, corridors, head-to-head pressure and
// food contention. Everything here reads a state and never mutates it.

use std::collections::{HashSet, VecDeque};

use crate::grid;
use crate::pathfinding::shortest_path_length;
use crate::state::WorldState;
use crate::types::Coord;

/// Result of a flood fill
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Area {
    /// Cells reachable from the start, the start included
    pub count: usize,
    /// `count` over the number of unblocked cells
    pub normalized: f64,
}

/// Breadth-first count of in-bounds cells reachable from `start` without entering `blocked`
pub fn flood_fill(start: Coord, blocked: &HashSet<Coord>, width: i32, height: i32) -> usize {
    let mut queue = VecDeque::from([start]);
    let mut visited = HashSet::from([start]);
    let mut count = 0;

    while let Some(point) = queue.pop_front() {
        count += 1;
        for next in grid::neighbors(point) {
            if !grid::inside(next, width, height) || blocked.contains(&next) {
                continue;
            }
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    count
}

/// Flood fill from `start` with every active body blocked except `start` itself
pub fn reachable_area_from(state: &WorldState, start: Coord) -> Area {
    let mut blocked = state.occupied();
    blocked.remove(&start);

    let count = flood_fill(start, &blocked, state.width, state.height);
    let empty = state.total_cells().saturating_sub(blocked.len()).max(1);
    Area {
        count,
        normalized: count as f64 / empty as f64,
    }
}

/// Reachable area from the controlled snake's head
pub fn reachable_area(state: &WorldState) -> Area {
    reachable_area_from(state, state.me().head())
}

/// Share of unoccupied cells strictly closer (Manhattan) to our head than to any
/// living opponent's head. 1.0 with no opponents.
pub fn voronoi_control(state: &WorldState) -> f64 {
    let rival_heads: Vec<Coord> = state.opponents().map(|s| s.head()).collect();
    if rival_heads.is_empty() {
        return 1.0;
    }

    let my_head = state.me().head();
    let occupied = state.occupied();
    let mut total = 0usize;
    let mut controlled = 0usize;

    for x in 0..state.width {
        for y in 0..state.height {
            let cell = Coord::new(x, y);
            if occupied.contains(&cell) {
                continue;
            }
            total += 1;
            let mine = grid::manhattan(my_head, cell);
            let theirs = rival_heads
                .iter()
                .map(|&head| grid::manhattan(head, cell))
                .min()
                .unwrap_or(i32::MAX);
            if mine < theirs {
                controlled += 1;
            }
        }
    }

    if total == 0 {
        return 0.0;
    }
    controlled as f64 / total as f64
}

/// Maps a safe-move count to a corridor penalty: 2 for at most one exit, 1 for two
pub fn corridor_penalty_for(safe_moves: usize) -> u8 {
    match safe_moves {
        0 | 1 => 2,
        2 => 1,
        _ => 0,
    }
}

/// -1 when an adjacent opponent is at least as long as us, +1 when only shorter
/// opponents are adjacent, 0 otherwise
pub fn head_to_head_term(state: &WorldState) -> f64 {
    let me = state.me();
    let mut threatened = false;
    let mut threatening = false;

    for opponent in state.opponents() {
        if grid::manhattan(me.head(), opponent.head()) != 1 {
            continue;
        }
        if opponent.length() >= me.length() {
            threatened = true;
        } else {
            threatening = true;
        }
    }

    if threatened {
        -1.0
    } else if threatening {
        1.0
    } else {
        0.0
    }
}

/// Food we could win: any pellet an equal-or-longer opponent reaches at least as
/// fast (by Manhattan distance) is dropped
pub fn uncontested_food(state: &WorldState) -> HashSet<Coord> {
    let me = state.me();
    state
        .food
        .iter()
        .copied()
        .filter(|&pellet| {
            let mine = grid::manhattan(me.head(), pellet);
            !state
                .opponents()
                .any(|opp| opp.length() >= me.length() && grid::manhattan(opp.head(), pellet) <= mine)
        })
        .collect()
}

/// Path distance from our head to the nearest uncontested food, `None` when there is
/// no such food or none is reachable
pub fn nearest_food_distance(state: &WorldState) -> Option<u32> {
    let targets = uncontested_food(state);
    if targets.is_empty() {
        return None;
    }

    let head = state.me().head();
    let mut blocked = state.occupied();
    blocked.remove(&head);
    shortest_path_length(head, &targets, &blocked, state.width, state.height)
}

/// `1 / (d + 1)` for the nearest uncontested food, 0 when there is none
pub fn inverse_food_distance(state: &WorldState) -> f64 {
    nearest_food_distance(state).map_or(0.0, |d| 1.0 / (d as f64 + 1.0))
}

/// `-1 / (d + 1)` for the nearest opponent at least as long as us, 0 when none
pub fn longer_proximity_term(state: &WorldState) -> f64 {
    let me = state.me();
    state
        .opponents()
        .filter(|opp| opp.length() >= me.length())
        .map(|opp| grid::manhattan(me.head(), opp.head()))
        .min()
        .map_or(0.0, |d| -1.0 / (d as f64 + 1.0))
}
