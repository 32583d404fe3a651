//! # Graph Analysis
//!
//! Read-only breadth-first queries over a [`MovementGraph`].
//!
//! - [`MovementGraph::best_score`] ranks exit candidates and measures difficulty
//! - [`MovementGraph::reachable_set`] lists everything the player can get to
//! - [`MovementGraph::path_exists`] answers a single point-to-point question
//!
//! None of these queries draw randomness; identical graphs give identical answers.

use super::MovementGraph;
use crate::utils::slide_score_delta;
use pathfinding::prelude::{bfs, bfs_reach};
use std::collections::VecDeque;

/// Best exit candidate found by [`MovementGraph::best_score`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScorePair {
    /// Tile index with the highest accumulated score
    pub exit: usize,
    /// Accumulated score of that tile
    pub score: f64,
}

/// Set of tiles reachable from some start tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachableSet {
    members: Vec<bool>,
}

impl ReachableSet {
    pub fn contains(&self, index: usize) -> bool {
        self.members.get(index).copied().unwrap_or(false)
    }

    /// Reachable tile indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter_map(|(index, &m)| m.then_some(index))
    }
}

impl MovementGraph {
    /// Breadth-first search from `start` accumulating slide scores.
    ///
    /// Every slide adds `|dx + dy|^1.5 + 15`. A tile is settled the first time
    /// it leaves the queue; later queue entries for it are ignored. Ties keep
    /// the tile that was dequeued first, so the result only depends on the
    /// graph and `start`.
    ///
    /// # Examples
    ///
    /// ```
    /// use slidegen::{Level, MovementGraph, Position};
    ///
    /// let level = Level::bordered(5, 5);
    /// let graph = MovementGraph::build(&level);
    /// let start = level.index_of(Position::new(1, 1));
    ///
    /// let best = graph.best_score(start);
    /// assert_eq!(best.exit, level.index_of(Position::new(3, 3)));
    /// ```
    pub fn best_score(&self, start: usize) -> ScorePair {
        let mut unexplored = VecDeque::new();
        let mut explored = vec![false; self.size()];
        let mut best = ScorePair {
            exit: start,
            score: -1.0,
        };

        unexplored.push_back((start, 0.0));
        while let Some((vertex, score)) = unexplored.pop_front() {
            if explored[vertex] {
                continue;
            }
            explored[vertex] = true;

            if score > best.score {
                best = ScorePair {
                    exit: vertex,
                    score,
                };
            }

            let from = self.position_of(vertex);
            for &next in self.neighbors(vertex) {
                if !explored[next] {
                    let delta = slide_score_delta(from, self.position_of(next));
                    unexplored.push_back((next, score + delta));
                }
            }
        }

        best
    }

    /// Every tile reachable from `start`, including `start` itself.
    pub fn reachable_set(&self, start: usize) -> ReachableSet {
        let mut members = vec![false; self.size()];
        for index in bfs_reach(start, |&v| self.neighbors(v).iter().copied()) {
            members[index] = true;
        }
        ReachableSet { members }
    }

    /// Whether `goal` can be reached from `start`.
    ///
    /// Stops as soon as the goal is found instead of exploring everything,
    /// which matters because the stuck check calls this once per reachable tile.
    pub fn path_exists(&self, start: usize, goal: usize) -> bool {
        if start == goal {
            return true;
        }
        bfs(&start, |&v| self.neighbors(v).iter().copied(), |&v| v == goal).is_some()
    }

    /// First tile reachable from `start` that cannot reach `exit`, if any.
    ///
    /// Tiles that are not reachable from `start` are never considered.
    pub fn find_stuck_tile(&self, start: usize, exit: usize) -> Option<usize> {
        self.reachable_set(start)
            .iter()
            .find(|&tile| !self.path_exists(tile, exit))
    }

    /// Whether the player starting at `start` can end up somewhere without a way to `exit`.
    pub fn is_stuck(&self, start: usize, exit: usize) -> bool {
        self.find_stuck_tile(start, exit).is_some()
    }
}
