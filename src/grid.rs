// Grid geometry helpers shared by the simulator and the heuristics

use crate::types::{Coord, Direction};

/// The four orthogonal neighbors of `point`, in `Direction::all()` order.
/// Out-of-bounds cells are included; callers filter with `inside`.
pub fn neighbors(point: Coord) -> [Coord; 4] {
    Direction::all().map(|dir| dir.apply(&point))
}

/// Calculates Manhattan distance between two coordinates
pub fn manhattan(a: Coord, b: Coord) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Checks if a coordinate lies within a `width` x `height` board
pub fn inside(point: Coord, width: i32, height: i32) -> bool {
    point.x >= 0 && point.x < width && point.y >= 0 && point.y < height
}

/// Center cell of the board, rounding toward the origin on even sizes
pub fn board_center(width: i32, height: i32) -> Coord {
    Coord::new((width - 1) / 2, (height - 1) / 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_follow_direction_order() {
        let n = neighbors(Coord::new(2, 2));
        assert_eq!(
            n,
            [
                Coord::new(2, 3),
                Coord::new(2, 1),
                Coord::new(1, 2),
                Coord::new(3, 2)
            ]
        );
    }

    #[test]
    fn test_manhattan() {
        assert_eq!(manhattan(Coord::new(0, 0), Coord::new(3, 4)), 7);
        assert_eq!(manhattan(Coord::new(5, 5), Coord::new(5, 5)), 0);
        assert_eq!(manhattan(Coord::new(-1, 2), Coord::new(1, -2)), 6);
    }

    #[test]
    fn test_inside_edges() {
        assert!(inside(Coord::new(0, 0), 11, 11));
        assert!(inside(Coord::new(10, 10), 11, 11));
        assert!(!inside(Coord::new(11, 0), 11, 11));
        assert!(!inside(Coord::new(0, -1), 11, 11));
    }

    #[test]
    fn test_board_center() {
        assert_eq!(board_center(11, 11), Coord::new(5, 5));
        assert_eq!(board_center(10, 6), Coord::new(4, 2));
    }
}
