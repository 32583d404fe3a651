//! # Generation Module
//!
//! Procedural level generation for the sliding puzzle.
//!
//! Generation runs in stages:
//! 1. [`density`]: assign every tile a probability of becoming a wall, with
//!    optional spatial patterns
//! 2. [`optimizer`]: sample layouts from those probabilities and hill-climb
//!    towards the target score, remembering the best level that cannot trap
//!    the player
//! 3. [`finalize`]: mark player and exit on the best level and validate it
//!
//! [`LevelGenerator`] ties the stages together.

pub mod density;
pub mod finalize;
pub mod levelgen;
pub mod optimizer;

pub use density::*;
pub use finalize::*;
pub use levelgen::*;
pub use optimizer::*;

use crate::{config, Position, SlideError, SlideResult};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for level generation.
///
/// Grid dimensions and tuning constants of the search. Missing fields in a
/// JSON document fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Level width in tiles
    pub width: u32,
    /// Level height in tiles
    pub height: u32,
    /// Score at which the search stops
    pub target_score: f64,
    /// Maximum number of optimizer iterations
    pub iteration_limit: u32,
    /// Number of pattern annealing iterations
    pub pattern_iteration_limit: u32,
    /// Chance that a tile is re-rolled when perturbing a level (0.0 to 1.0)
    pub reroll_chance: f64,
    /// Fraction of target score or iteration budget that enables stuck checks
    pub stuck_check_ratio: f64,
    /// Upper clamp for tile densities before the border boost
    pub max_tile_density: f32,
    /// Noise amplitude added to every tile density
    pub base_noise: f32,
    /// Largest extra noise amplitude when patterns are enabled
    pub max_pattern_noise: u32,
    /// Random seed; entropy-seeded when absent
    pub seed: Option<u64>,
    /// Emit ASCII renders of intermediate states at trace level
    pub render_progress: bool,
}

impl GenerationConfig {
    /// Creates the default generation configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use slidegen::GenerationConfig;
    ///
    /// let config = GenerationConfig::new();
    /// assert_eq!(config.size(), 27 * 15);
    /// assert_eq!(config.iteration_limit, 65536);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new() -> Self {
        Self {
            width: config::DEFAULT_WIDTH,
            height: config::DEFAULT_HEIGHT,
            target_score: config::DEFAULT_TARGET_SCORE,
            iteration_limit: config::DEFAULT_ITERATION_LIMIT,
            pattern_iteration_limit: config::DEFAULT_PATTERN_ITERATION_LIMIT,
            reroll_chance: config::DEFAULT_REROLL_CHANCE,
            stuck_check_ratio: config::DEFAULT_STUCK_CHECK_RATIO,
            max_tile_density: config::DEFAULT_MAX_TILE_DENSITY,
            base_noise: config::DEFAULT_BASE_NOISE,
            max_pattern_noise: config::DEFAULT_MAX_PATTERN_NOISE,
            seed: None,
            render_progress: false,
        }
    }

    /// Creates a seeded configuration with small budgets for tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            target_score: 600.0,
            iteration_limit: 2048,
            pattern_iteration_limit: 64,
            seed: Some(seed),
            ..Self::new()
        }
    }

    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> SlideResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to pretty-printed JSON.
    pub fn to_json(&self) -> SlideResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> SlideResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Checks that the configuration can drive a generation run.
    ///
    /// Every value that later feeds a random range, a clamp or an index
    /// computation is checked here, so a validated configuration never makes
    /// generation panic.
    pub fn validate(&self) -> SlideResult<()> {
        if self.width < 3 || self.height < 3 {
            return Err(SlideError::InvalidConfig(format!(
                "Level must be at least 3x3, got {}x{}",
                self.width, self.height
            )));
        }
        let tiles = self.width as u64 * self.height as u64;
        if tiles > config::MAX_LEVEL_TILES {
            return Err(SlideError::InvalidConfig(format!(
                "Level of {}x{} has {} tiles, at most {} are supported",
                self.width,
                self.height,
                tiles,
                config::MAX_LEVEL_TILES
            )));
        }
        if self.iteration_limit == 0 {
            return Err(SlideError::InvalidConfig(
                "Iteration limit must be positive".to_string(),
            ));
        }
        if !self.target_score.is_finite() {
            return Err(SlideError::InvalidConfig(
                "Target score must be finite".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.reroll_chance) {
            return Err(SlideError::InvalidConfig(format!(
                "Reroll chance {} is outside [0, 1]",
                self.reroll_chance
            )));
        }
        if !(0.0..=1.0).contains(&self.max_tile_density) {
            return Err(SlideError::InvalidConfig(format!(
                "Maximum tile density {} is outside [0, 1]",
                self.max_tile_density
            )));
        }
        if !self.stuck_check_ratio.is_finite() || self.stuck_check_ratio < 0.0 {
            return Err(SlideError::InvalidConfig(format!(
                "Stuck check ratio {} must be finite and not negative",
                self.stuck_check_ratio
            )));
        }
        if !(0.0..=config::MAX_NOISE_AMPLITUDE).contains(&self.base_noise) {
            return Err(SlideError::InvalidConfig(format!(
                "Base noise {} is outside [0, {}]",
                self.base_noise,
                config::MAX_NOISE_AMPLITUDE
            )));
        }
        if self.max_pattern_noise as f32 > config::MAX_NOISE_AMPLITUDE {
            return Err(SlideError::InvalidConfig(format!(
                "Pattern noise {} exceeds {}",
                self.max_pattern_noise,
                config::MAX_NOISE_AMPLITUDE
            )));
        }
        Ok(())
    }

    /// Number of tiles in a level.
    pub fn size(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Linear index of a position.
    pub fn index_of(&self, pos: Position) -> usize {
        (pos.x + pos.y * self.width as i32) as usize
    }

    /// Position of a linear index.
    pub fn position_of(&self, index: usize) -> Position {
        let width = self.width as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }

    /// Checks if a position lies on the grid.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Trait for procedural generators.
///
/// Every stage that produces content from a configuration and a random
/// source implements this trait, so stages can be run and checked alike.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> SlideResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> SlideResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use rand::SeedableRng;

    /// Creates a random number generator from the config.
    ///
    /// Seeded runs are reproducible; unseeded runs draw from OS entropy.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use std::io::Write;

    #[test]
    fn test_generation_config_defaults() {
        let config = GenerationConfig::default();
        assert_eq!(config.width, 27);
        assert_eq!(config.height, 15);
        assert_eq!(config.target_score, 4800.0);
        assert_eq!(config.iteration_limit, 1 << 16);
        assert_eq!(config.pattern_iteration_limit, 1 << 14);
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_config_geometry() {
        let config = GenerationConfig::new();
        let pos = Position::new(3, 2);
        assert_eq!(config.index_of(pos), 57);
        assert_eq!(config.position_of(57), pos);
        assert!(config.contains(pos));
        assert!(!config.contains(Position::new(-1, 2)));
        assert!(!config.contains(Position::new(3, 15)));
    }

    #[test]
    fn test_config_validation() {
        let mut config = GenerationConfig::for_testing(1);
        assert!(config.validate().is_ok());

        config.width = 2;
        assert!(matches!(config.validate(), Err(SlideError::InvalidConfig(_))));

        let invalid = [
            GenerationConfig {
                reroll_chance: 1.5,
                ..GenerationConfig::for_testing(1)
            },
            GenerationConfig {
                iteration_limit: 0,
                ..GenerationConfig::for_testing(1)
            },
            GenerationConfig {
                base_noise: f32::INFINITY,
                ..GenerationConfig::for_testing(1)
            },
            GenerationConfig {
                base_noise: f32::NAN,
                ..GenerationConfig::for_testing(1)
            },
            GenerationConfig {
                base_noise: f32::MAX,
                ..GenerationConfig::for_testing(1)
            },
            GenerationConfig {
                max_pattern_noise: u32::MAX,
                ..GenerationConfig::for_testing(1)
            },
            GenerationConfig {
                max_tile_density: f32::NAN,
                ..GenerationConfig::for_testing(1)
            },
            GenerationConfig {
                max_tile_density: f32::INFINITY,
                ..GenerationConfig::for_testing(1)
            },
            GenerationConfig {
                stuck_check_ratio: f64::NAN,
                ..GenerationConfig::for_testing(1)
            },
            GenerationConfig {
                stuck_check_ratio: f64::INFINITY,
                ..GenerationConfig::for_testing(1)
            },
            GenerationConfig {
                width: u32::MAX,
                height: u32::MAX,
                ..GenerationConfig::for_testing(1)
            },
            GenerationConfig {
                width: 1 << 16,
                height: 1 << 16,
                ..GenerationConfig::for_testing(1)
            },
        ];
        for config in invalid {
            assert!(
                matches!(config.validate(), Err(SlideError::InvalidConfig(_))),
                "accepted {:?}",
                config
            );
        }
    }

    #[test]
    fn test_validated_noise_never_panics() {
        let config = GenerationConfig {
            base_noise: config::MAX_NOISE_AMPLITUDE,
            pattern_iteration_limit: 4,
            ..GenerationConfig::for_testing(1)
        };
        assert!(config.validate().is_ok());

        for seed in 0..4 {
            let mut rng = StdRng::seed_from_u64(seed);
            let field = DensityFieldGenerator::new(0.1)
                .generate(&config, &mut rng)
                .unwrap();
            assert_eq!(field.size(), config.size());
        }
    }

    #[test]
    fn test_config_json_partial() {
        let config = GenerationConfig::from_json(r#"{ "width": 9, "seed": 7 }"#).unwrap();
        assert_eq!(config.width, 9);
        assert_eq!(config.height, 15);
        assert_eq!(config.seed, Some(7));

        let json = config.to_json().unwrap();
        assert_eq!(GenerationConfig::from_json(&json).unwrap(), config);

        assert!(GenerationConfig::from_json(r#"{ "height": 1 }"#).is_err());
        assert!(matches!(
            GenerationConfig::from_json("not json"),
            Err(SlideError::Serde(_))
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "target_score": 1200.0 }}"#).unwrap();

        let config = GenerationConfig::from_file(file.path()).unwrap();
        assert_eq!(config.target_score, 1200.0);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            GenerationConfig::from_file(missing),
            Err(SlideError::Io(_))
        ));
    }

    #[test]
    fn test_utils_rng_is_seeded() {
        let config = GenerationConfig::for_testing(12345);
        let mut a = utils::create_rng(&config);
        let mut b = utils::create_rng(&config);
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());
    }
}
