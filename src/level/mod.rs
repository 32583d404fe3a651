//! # Level Module
//!
//! Grid coordinates, tiles and the level buffer the generator works on.
//!
//! A level is a flat, row-major sequence of tiles. Tiles are addressed either
//! by a [`Position`] or by their linear index `x + y * width`.

pub mod grid;
pub mod tile;

pub use grid::*;
pub use tile::*;

use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate on the level grid.
///
/// # Examples
///
/// ```
/// use slidegen::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let adjacent = pos.adjacent_positions();
/// assert_eq!(adjacent.len(), 8); // All 8 surrounding positions
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns all 8 adjacent positions (including diagonals).
    ///
    /// Used by the pattern annealing to pick swap partners.
    pub fn adjacent_positions(self) -> Vec<Position> {
        vec![
            Position::new(self.x - 1, self.y - 1), // NW
            Position::new(self.x, self.y - 1),     // N
            Position::new(self.x + 1, self.y - 1), // NE
            Position::new(self.x - 1, self.y),     // W
            Position::new(self.x + 1, self.y),     // E
            Position::new(self.x - 1, self.y + 1), // SW
            Position::new(self.x, self.y + 1),     // S
            Position::new(self.x + 1, self.y + 1), // SE
        ]
    }
}

/// The four slide directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    West,
    East,
}

impl Direction {
    /// Converts a direction to a position delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use slidegen::{Direction, Position};
    ///
    /// let delta = Direction::North.to_delta();
    /// assert_eq!(delta, Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::South => Position::new(0, 1),
            Direction::West => Position::new(-1, 0),
            Direction::East => Position::new(1, 0),
        }
    }

    /// Whether this direction moves along the horizontal axis.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::West | Direction::East)
    }

    /// All slide directions, vertical axis first.
    ///
    /// The order fixes the order of outgoing edges in the movement graph.
    pub fn all() -> [Direction; 4] {
        [
            Direction::North,
            Direction::South,
            Direction::West,
            Direction::East,
        ]
    }
}
