// Legal move filter
//
// A move is legal when it keeps the snake on the board, does not run into a body
// (tail-slip into our own tail only when not eating), and does not step onto a cell
// that an equal-or-longer rival could also enter next turn.
//
// "Rival" means every other active snake, the controlled one included, so opponents
// ranked through this filter also steer clear of cells we could contest.

use crate::grid;
use crate::state::{Snake, WorldState};
use crate::types::{Coord, Direction};

/// Checks whether moving `snake` onto `point` hits a wall or any active body.
///
/// Our own tail is passable when `will_eat` is false, since it vacates this turn.
/// Other snakes' tails are treated as solid because we cannot know if they eat.
pub fn is_body_collision(state: &WorldState, point: Coord, snake: &Snake, will_eat: bool) -> bool {
    if !state.inside(point) {
        return true;
    }

    state.active_snakes().any(|other| {
        let tail_index = other.body.len() - 1;
        other.body.iter().enumerate().any(|(index, &segment)| {
            segment == point && !(other.id == snake.id && !will_eat && index == tail_index)
        })
    })
}

/// Directions that survive the wall/body check alone, with their target cells
pub fn non_colliding_moves(state: &WorldState, snake: &Snake) -> Vec<(Direction, Coord)> {
    let head = snake.head();
    Direction::all()
        .into_iter()
        .map(|dir| (dir, dir.apply(&head)))
        .filter(|&(_, target)| !is_body_collision(state, target, snake, state.is_food(target)))
        .collect()
}

/// Generates all legal moves for a snake, in `Direction::all()` order.
/// Eliminated snakes have none.
pub fn legal_moves(state: &WorldState, snake: &Snake) -> Vec<Direction> {
    if snake.eliminated {
        return vec![];
    }

    non_colliding_moves(state, snake)
        .into_iter()
        .filter(|&(_, target)| !loses_head_to_head(state, snake, target))
        .map(|(dir, _)| dir)
        .collect()
}

/// Legal moves of the controlled snake
pub fn my_legal_moves(state: &WorldState) -> Vec<Direction> {
    legal_moves(state, state.me())
}

/// Number of legal moves; zero means certain death under one-ply lookahead
pub fn count_safe_moves(state: &WorldState, snake: &Snake) -> usize {
    legal_moves(state, snake).len()
}

/// True when some active rival at least as long as `snake` can also reach `target`.
/// Rival destinations use the wall/body check only, not this filter recursively.
fn loses_head_to_head(state: &WorldState, snake: &Snake, target: Coord) -> bool {
    let length = snake.length();
    state
        .active_snakes()
        .filter(|other| other.id != snake.id && other.length() >= length)
        .filter(|other| grid::manhattan(other.head(), target) == 1)
        .any(|other| {
            non_colliding_moves(state, other)
                .iter()
                .any(|&(_, reach)| reach == target)
        })
}
