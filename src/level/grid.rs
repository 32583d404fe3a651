//! # Level Grid
//!
//! Owned, fixed-size tile buffer for a single level.

use super::{Position, Tile};
use crate::{utils::wrap_offset, SlideError, SlideResult};
use serde::{Deserialize, Serialize};

/// A rectangular, toroidal level.
///
/// Tiles are stored row-major; tile `i` lives at `(i % width, i / width)`.
///
/// # Examples
///
/// ```
/// use slidegen::{Level, Position, Tile};
///
/// let mut level = Level::new(5, 4);
/// level.set_tile(level.index_of(Position::new(2, 1)), Tile::Wall);
/// assert_eq!(level.size(), 20);
/// assert!(level.is_wall(7));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    tiles: Vec<Tile>,
}

impl Level {
    /// Creates a level of open space.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, Tile::Space)
    }

    /// Creates a level where every tile is `tile`.
    pub fn filled(width: u32, height: u32, tile: Tile) -> Self {
        Self {
            width,
            height,
            tiles: vec![tile; (width * height) as usize],
        }
    }

    /// Creates a level of open space enclosed by a one-tile wall border.
    pub fn bordered(width: u32, height: u32) -> Self {
        let mut level = Self::new(width, height);
        for i in 0..level.size() {
            if level.is_border(i) {
                level.tiles[i] = Tile::Wall;
            }
        }
        level
    }

    /// Parses a level string of exactly `width * height` characters.
    ///
    /// # Examples
    ///
    /// ```
    /// use slidegen::{Level, Tile};
    ///
    /// let level = Level::parse("#####-p-##-e-#####", 6, 3).unwrap();
    /// assert_eq!(level.tile(7), Tile::Space);
    /// assert_eq!(level.find(Tile::Exit), Some(11));
    /// assert!(Level::parse("##", 6, 3).is_err());
    /// ```
    pub fn parse(s: &str, width: u32, height: u32) -> SlideResult<Self> {
        let tiles = s
            .chars()
            .map(Tile::from_char)
            .collect::<SlideResult<Vec<_>>>()?;

        if tiles.len() != (width * height) as usize {
            return Err(SlideError::InvalidLevel(format!(
                "Expected {} tiles for a {}x{} level, got {}",
                width * height,
                width,
                height,
                tiles.len()
            )));
        }

        Ok(Self {
            width,
            height,
            tiles,
        })
    }

    /// Serializes the level into its `width * height` character string.
    pub fn to_level_string(&self) -> String {
        self.tiles.iter().map(|tile| tile.to_char()).collect()
    }

    /// Total number of tiles.
    pub fn size(&self) -> usize {
        self.tiles.len()
    }

    /// Linear index of a position. The position must be inside the grid.
    pub fn index_of(&self, pos: Position) -> usize {
        (pos.x + pos.y * self.width as i32) as usize
    }

    /// Position of a linear index.
    pub fn position_of(&self, index: usize) -> Position {
        let width = self.width as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }

    /// Checks whether a position lies inside the grid.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    /// Moves `pos` by `delta`, wrapping around the grid edges.
    pub fn wrap(&self, pos: Position, delta: Position) -> Position {
        Position::new(
            wrap_offset(pos.x, delta.x, self.width as i32),
            wrap_offset(pos.y, delta.y, self.height as i32),
        )
    }

    /// Whether the tile lies on the outer rows or columns.
    pub fn is_border(&self, index: usize) -> bool {
        let pos = self.position_of(index);
        pos.x == 0 || pos.y == 0 || pos.x == self.width as i32 - 1 || pos.y == self.height as i32 - 1
    }

    pub fn tile(&self, index: usize) -> Tile {
        self.tiles[index]
    }

    pub fn set_tile(&mut self, index: usize, tile: Tile) {
        self.tiles[index] = tile;
    }

    pub fn is_wall(&self, index: usize) -> bool {
        self.tiles[index].is_wall()
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Overwrites this level's tiles with another level of the same size.
    pub fn copy_from(&mut self, other: &Level) {
        self.tiles.copy_from_slice(&other.tiles);
    }

    /// Index of the first tile equal to `tile`.
    pub fn find(&self, tile: Tile) -> Option<usize> {
        self.tiles.iter().position(|&t| t == tile)
    }

    /// Number of tiles equal to `tile`.
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|&&t| t == tile).count()
    }

    /// Renders the level with player and exit markers overlaid.
    ///
    /// Used for progress output while a search is still running.
    pub fn render_with_markers(&self, player: usize, exit: usize) -> String {
        let mut marked = self.clone();
        marked.set_tile(player, Tile::Player);
        marked.set_tile(exit, Tile::Exit);
        marked.to_string()
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.tiles.chunks(self.width as usize) {
            for tile in row {
                write!(f, "{}", tile)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
