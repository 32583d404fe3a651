//! Tile values and their textual alphabet.

use crate::{SlideError, SlideResult};
use serde::{Deserialize, Serialize};

/// A single cell of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tile {
    /// Blocks slides; the player stops on the tile before it
    Wall,
    /// Open floor
    #[default]
    Space,
    /// Player start, open for movement purposes
    Player,
    /// Level exit, open for movement purposes
    Exit,
}

impl Tile {
    /// Character used for walls in level strings.
    pub const WALL_CHAR: char = '#';
    /// Character used for open space in level strings.
    pub const SPACE_CHAR: char = '-';
    /// Character used for the player in level strings.
    pub const PLAYER_CHAR: char = 'p';
    /// Character used for the exit in level strings.
    pub const EXIT_CHAR: char = 'e';

    /// Whether slides are stopped by this tile.
    pub fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }

    /// Whether the tile is a vertex of the movement graph.
    pub fn is_open(self) -> bool {
        !self.is_wall()
    }

    /// Returns the level string character for this tile.
    pub fn to_char(self) -> char {
        match self {
            Tile::Wall => Self::WALL_CHAR,
            Tile::Space => Self::SPACE_CHAR,
            Tile::Player => Self::PLAYER_CHAR,
            Tile::Exit => Self::EXIT_CHAR,
        }
    }

    /// Parses a level string character.
    ///
    /// # Examples
    ///
    /// ```
    /// use slidegen::Tile;
    ///
    /// assert_eq!(Tile::from_char('#').unwrap(), Tile::Wall);
    /// assert!(Tile::from_char('?').is_err());
    /// ```
    pub fn from_char(c: char) -> SlideResult<Tile> {
        match c {
            Self::WALL_CHAR => Ok(Tile::Wall),
            Self::SPACE_CHAR => Ok(Tile::Space),
            Self::PLAYER_CHAR => Ok(Tile::Player),
            Self::EXIT_CHAR => Ok(Tile::Exit),
            other => Err(SlideError::InvalidLevel(format!(
                "Unknown tile character '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_char())
    }
}
