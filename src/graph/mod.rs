//! # Movement Graph
//!
//! Directed adjacency induced by the slide rule on a fixed layout.
//!
//! From every open tile the player can slide in each cardinal direction. The
//! slide moves through open tiles, wrapping at the grid edges, and stops on
//! the last open tile before a wall. If no wall is met within one full lap, or
//! the very first tile is a wall, that direction yields no edge.
//!
//! Edges are not necessarily reciprocal: sliding from `u` may land on `v`
//! while sliding back from `v` stops somewhere else entirely.

pub mod analysis;

pub use analysis::*;

use crate::{Direction, Level, Position};

/// Outgoing slide edges of every tile of a level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovementGraph {
    width: u32,
    edges: Vec<Vec<usize>>,
}

impl MovementGraph {
    /// Builds the graph for `level` from scratch.
    ///
    /// # Examples
    ///
    /// ```
    /// use slidegen::{Level, MovementGraph, Position};
    ///
    /// let level = Level::bordered(5, 5);
    /// let graph = MovementGraph::build(&level);
    /// let start = level.index_of(Position::new(1, 1));
    /// assert_eq!(graph.neighbors(start).len(), 2);
    /// ```
    pub fn build(level: &Level) -> Self {
        let mut edges = vec![Vec::new(); level.size()];

        for (index, out) in edges.iter_mut().enumerate() {
            if level.is_wall(index) {
                continue;
            }
            let origin = level.position_of(index);
            for direction in Direction::all() {
                if let Some(landing) = Self::slide(level, origin, direction) {
                    out.push(level.index_of(landing));
                }
            }
        }

        Self {
            width: level.width,
            edges,
        }
    }

    /// Slides from `origin` in `direction` and returns the landing tile.
    ///
    /// The step count is capped at the axis length, so the search always
    /// terminates even on a row or column without walls.
    pub fn slide(level: &Level, origin: Position, direction: Direction) -> Option<Position> {
        let delta = direction.to_delta();
        let axis_len = if direction.is_horizontal() {
            level.width
        } else {
            level.height
        };

        let mut landing = None;
        let mut next = level.wrap(origin, delta);
        let mut steps = 0;
        while !level.is_wall(level.index_of(next)) {
            landing = Some(next);
            next = level.wrap(next, delta);
            steps += 1;
            if steps > axis_len {
                return None;
            }
        }

        landing
    }

    /// Outgoing edges of `index`, in North, South, West, East order.
    pub fn neighbors(&self, index: usize) -> &[usize] {
        &self.edges[index]
    }

    /// Number of tiles the graph was built over.
    pub fn size(&self) -> usize {
        self.edges.len()
    }

    pub(crate) fn position_of(&self, index: usize) -> Position {
        let width = self.width as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }

    /// Writes every non-empty adjacency list, one tile per line.
    ///
    /// Coordinates are 1-based to match how levels are usually discussed.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (index, targets) in self.edges.iter().enumerate() {
            if targets.is_empty() {
                continue;
            }
            let from = self.position_of(index);
            out.push_str(&format!("({}, {}):", from.x + 1, from.y + 1));
            for &target in targets {
                let to = self.position_of(target);
                out.push_str(&format!(" ({}, {})", to.x + 1, to.y + 1));
            }
            out.push('\n');
        }
        out
    }
}
