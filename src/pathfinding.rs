// A* shortest distance from one cell to the nearest of several goals

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::grid;
use crate::types::Coord;

/// Shortest path length from `start` to any cell in `goals`, avoiding `blocked`.
///
/// Uniform step cost with the minimum Manhattan distance to any goal as heuristic,
/// which never overestimates. Open-set ties on (f, g) pop in insertion order.
/// Returns `None` when no goal is reachable or `goals` is empty.
pub fn shortest_path_length(
    start: Coord,
    goals: &HashSet<Coord>,
    blocked: &HashSet<Coord>,
    width: i32,
    height: i32,
) -> Option<u32> {
    nearest_goal(start, goals, blocked, width, height).map(|(_, cost)| cost)
}

/// The first goal popped from the open set, with its path length
fn nearest_goal(
    start: Coord,
    goals: &HashSet<Coord>,
    blocked: &HashSet<Coord>,
    width: i32,
    height: i32,
) -> Option<(Coord, u32)> {
    if goals.is_empty() {
        return None;
    }

    let estimate = |point: Coord| -> u32 {
        goals
            .iter()
            .map(|&goal| grid::manhattan(point, goal) as u32)
            .min()
            .unwrap_or(0)
    };

    let mut sequence: u64 = 0;
    let mut frontier = BinaryHeap::new();
    frontier.push(Reverse((estimate(start), 0u32, sequence, start)));

    let mut costs: HashMap<Coord, u32> = HashMap::new();
    costs.insert(start, 0);
    let mut visited: HashSet<Coord> = HashSet::new();

    while let Some(Reverse((_, cost, _, point))) = frontier.pop() {
        if !visited.insert(point) {
            continue;
        }
        if goals.contains(&point) {
            return Some((point, cost));
        }

        for next in grid::neighbors(point) {
            if !grid::inside(next, width, height) || blocked.contains(&next) {
                continue;
            }
            let next_cost = cost + 1;
            if costs.get(&next).map_or(true, |&known| next_cost < known) {
                costs.insert(next, next_cost);
                sequence += 1;
                frontier.push(Reverse((next_cost + estimate(next), next_cost, sequence, next)));
            }
        }
    }

    None
}
