//! # Level Generator
//!
//! Entry point that runs density construction, search and finalization.

use super::{finalize, DensityField, DensityFieldGenerator, GeneratedLevel, LevelDiagnostics, LevelOptimizer};
use crate::{GenerationConfig, Generator, Position, SlideError, SlideResult, Tile};
use log::{info, warn};
use rand::rngs::StdRng;

/// Generates a complete level for a start tile and target density.
///
/// # Examples
///
/// ```no_run
/// use slidegen::{generation::utils, GenerationConfig, Generator, LevelGenerator, Position};
///
/// let config = GenerationConfig::new();
/// let mut rng = utils::create_rng(&config);
/// let generated = LevelGenerator::new(Position::new(1, 1), 0.1)
///     .generate(&config, &mut rng)
///     .unwrap();
/// assert_eq!(generated.to_level_string().len(), 27 * 15);
/// ```
#[derive(Debug, Clone)]
pub struct LevelGenerator {
    /// Player start tile
    pub start: Position,
    /// Average wall probability of the density field
    pub avg_density: f32,
}

impl LevelGenerator {
    pub fn new(start: Position, avg_density: f32) -> Self {
        Self { start, avg_density }
    }

    fn start_index(&self, config: &GenerationConfig) -> SlideResult<usize> {
        if !config.contains(self.start) {
            return Err(SlideError::InvalidConfig(format!(
                "Start position ({}, {}) is outside the {}x{} level",
                self.start.x, self.start.y, config.width, config.height
            )));
        }
        Ok(config.index_of(self.start))
    }

    /// Searches for a level using a prepared density field.
    pub fn generate_with_density(
        &self,
        config: &GenerationConfig,
        density: &DensityField,
        rng: &mut StdRng,
    ) -> SlideResult<GeneratedLevel> {
        config.validate()?;
        let player = self.start_index(config)?;
        if density.width() != config.width || density.height() != config.height {
            return Err(SlideError::InvalidConfig(format!(
                "Density field is {}x{}, configuration expects {}x{}",
                density.width(),
                density.height(),
                config.width,
                config.height
            )));
        }

        let outcome = match LevelOptimizer::new(config, density, player).run(rng) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Level generation failed");
                return Err(e);
            }
        };

        Ok(finalize(outcome.best, player, config))
    }

    /// Generates a level string and the exit index to chain the next level from.
    ///
    /// Returns an empty string on generation failure, together with the start
    /// index so the caller can retry from the same tile. A start outside the
    /// grid falls back to the tile at `(1, 1)`.
    pub fn generate_string(&self, config: &GenerationConfig, rng: &mut StdRng) -> (String, usize) {
        match self.generate(config, rng) {
            Ok(generated) => (generated.to_level_string(), generated.exit),
            Err(e) => {
                warn!("{}", e);
                (String::new(), self.retry_index(config))
            }
        }
    }

    fn retry_index(&self, config: &GenerationConfig) -> usize {
        match self.start_index(config) {
            Ok(index) => index,
            Err(e) => {
                warn!("{}, retrying from (2, 2)", e);
                config.width as usize + 1
            }
        }
    }
}

impl Generator<GeneratedLevel> for LevelGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> SlideResult<GeneratedLevel> {
        config.validate()?;
        self.start_index(config)?;
        info!(
            "Level generation started with start = ({}, {}) and target density = {}",
            self.start.x + 1,
            self.start.y + 1,
            self.avg_density
        );

        let density = DensityFieldGenerator::new(self.avg_density).generate(config, rng)?;
        self.generate_with_density(config, &density, rng)
    }

    fn validate(&self, generated: &GeneratedLevel, config: &GenerationConfig) -> SlideResult<()> {
        let level = &generated.level;
        if level.width != config.width || level.height != config.height {
            return Err(SlideError::InvalidLevel(format!(
                "Level is {}x{}, configuration expects {}x{}",
                level.width, level.height, config.width, config.height
            )));
        }
        if level.count(Tile::Player) != 1 || level.count(Tile::Exit) != 1 {
            return Err(SlideError::InvalidLevel(
                "Level must contain exactly one player and one exit".to_string(),
            ));
        }
        if level.tile(generated.player) != Tile::Player || level.tile(generated.exit) != Tile::Exit {
            return Err(SlideError::InvalidLevel(
                "Player or exit index does not match the level".to_string(),
            ));
        }
        LevelDiagnostics::inspect(level, generated.player, generated.exit).into_result()
    }

    fn generator_type(&self) -> &'static str {
        "LevelGenerator"
    }
}
