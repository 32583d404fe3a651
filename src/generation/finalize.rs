//! # Result Finalizer
//!
//! Turns the optimizer's best layout into a playable level.

use super::BestLevel;
use crate::{GenerationConfig, Level, MovementGraph, Position, SlideError, SlideResult, Tile};
use log::{info, trace, warn};

/// A finished level with player and exit marked.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedLevel {
    /// Layout including the player and exit tiles
    pub level: Level,
    /// Player start tile index
    pub player: usize,
    /// Exit tile index
    pub exit: usize,
    /// Score of the layout
    pub score: f64,
    /// Optimizer iteration that produced the layout
    pub iteration: u32,
}

impl GeneratedLevel {
    /// Serializes the level into its `width * height` character string.
    pub fn to_level_string(&self) -> String {
        self.level.to_level_string()
    }

    pub fn player_position(&self) -> Position {
        self.level.position_of(self.player)
    }

    pub fn exit_position(&self) -> Position {
        self.level.position_of(self.exit)
    }
}

/// Post-condition checks of a finished level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelDiagnostics {
    /// The exit can be reached from the player tile
    pub exit_reachable: bool,
    /// A tile reachable from the player that cannot reach the exit
    pub stuck_tile: Option<usize>,
}

impl LevelDiagnostics {
    /// Runs all checks for a layout.
    pub fn inspect(level: &Level, player: usize, exit: usize) -> Self {
        let graph = MovementGraph::build(level);
        Self {
            exit_reachable: graph.path_exists(player, exit),
            stuck_tile: graph.find_stuck_tile(player, exit),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.exit_reachable && self.stuck_tile.is_none()
    }

    /// Converts failed checks into an error.
    pub fn into_result(self) -> SlideResult<()> {
        if !self.exit_reachable {
            return Err(SlideError::InvalidLevel(
                "Exit is not reachable from the player".to_string(),
            ));
        }
        if let Some(tile) = self.stuck_tile {
            return Err(SlideError::InvalidLevel(format!(
                "Player can get stuck at tile {}",
                tile
            )));
        }
        Ok(())
    }
}

/// Marks player and exit on the best layout and re-checks it.
///
/// The checks only log; a failing check indicates a bug in the search, not
/// bad input, and the level is returned regardless.
pub fn finalize(best: BestLevel, player: usize, config: &GenerationConfig) -> GeneratedLevel {
    let mut level = best.level;
    level.set_tile(player, Tile::Player);
    level.set_tile(best.exit, Tile::Exit);

    info!(
        "Best recorded level with score {:7.2}/{:7.2} at iteration {}",
        best.score, config.target_score, best.iteration
    );
    if config.render_progress {
        trace!("\n{}", level);
    }

    let diagnostics = LevelDiagnostics::inspect(&level, player, best.exit);
    if !diagnostics.exit_reachable {
        warn!("End reachable: NO");
    }
    if let Some(tile) = diagnostics.stuck_tile {
        warn!("Can get stuck: YES (tile {})", tile);
    }

    GeneratedLevel {
        level,
        player,
        exit: best.exit,
        score: best.score,
        iteration: best.iteration,
    }
}

/// Parses a level string and checks every finished-level invariant.
///
/// The string must hold exactly one player and one exit, the exit must be
/// reachable and no reachable tile may be stuck.
///
/// # Examples
///
/// ```
/// use slidegen::verify_level_string;
///
/// assert!(verify_level_string("######p--##--e######", 5, 4).is_ok());
/// assert!(verify_level_string("######p--##---######", 5, 4).is_err());
/// ```
pub fn verify_level_string(s: &str, width: u32, height: u32) -> SlideResult<Level> {
    let level = Level::parse(s, width, height)?;

    for marker in [Tile::Player, Tile::Exit] {
        let count = level.count(marker);
        if count != 1 {
            return Err(SlideError::InvalidLevel(format!(
                "Expected exactly one {:?} tile, found {}",
                marker, count
            )));
        }
    }

    let player = level.find(Tile::Player).unwrap_or_default();
    let exit = level.find(Tile::Exit).unwrap_or_default();
    LevelDiagnostics::inspect(&level, player, exit).into_result()?;
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_best(config: &GenerationConfig) -> BestLevel {
        BestLevel {
            level: Level::bordered(config.width, config.height),
            exit: config.index_of(Position::new(25, 13)),
            score: 189.0,
            iteration: 3,
        }
    }

    #[test]
    fn test_finalize_marks_tiles() {
        let config = GenerationConfig::for_testing(1);
        let player = config.index_of(Position::new(1, 1));

        let generated = finalize(open_best(&config), player, &config);
        assert_eq!(generated.level.tile(player), Tile::Player);
        assert_eq!(generated.level.count(Tile::Player), 1);
        assert_eq!(generated.level.count(Tile::Exit), 1);
        assert_eq!(generated.exit_position(), Position::new(25, 13));
        assert_eq!(generated.player_position(), Position::new(1, 1));
        assert_eq!(generated.iteration, 3);

        let text = generated.to_level_string();
        assert_eq!(text.len(), config.size());
        assert!(verify_level_string(&text, config.width, config.height).is_ok());
    }

    #[test]
    fn test_diagnostics_flags_problems() {
        let level = Level::bordered(7, 5);
        let at = |x, y| level.index_of(Position::new(x, y));

        let ok = LevelDiagnostics::inspect(&level, at(1, 1), at(5, 3));
        assert!(ok.is_ok());
        assert!(ok.into_result().is_ok());

        // (3,2) is never a landing spot in an empty room
        let unreachable = LevelDiagnostics::inspect(&level, at(1, 1), at(3, 2));
        assert!(!unreachable.exit_reachable);
        assert_eq!(unreachable.stuck_tile, Some(at(1, 1)));
        assert!(matches!(
            unreachable.into_result(),
            Err(SlideError::InvalidLevel(_))
        ));
    }

    #[test]
    fn test_verify_requires_single_markers() {
        assert!(verify_level_string("######p--##---######", 5, 4).is_err());
        assert!(verify_level_string("######pp-##--e######", 5, 4).is_err());
        assert!(verify_level_string("######p--##--e#####", 5, 4).is_err());
    }
}
