//! # Slidegen
//!
//! Procedural level generation for sliding tile puzzles.
//!
//! ## Architecture Overview
//!
//! A player stands on a tile and, given a direction, slides through open space
//! (wrapping around the grid edges) until the next tile is a wall. Slidegen
//! produces levels for that rule which are solvable, contain no dead ends and
//! hit a target difficulty. The pipeline is built from a few pieces:
//!
//! - **Level**: tiles, positions and the textual level format
//! - **Movement Graph**: the directed "where can I slide to" relation of a layout
//! - **Analysis**: best-score search, reachability and stuck detection
//! - **Density Field**: per-tile wall probabilities, optionally annealed into patterns
//! - **Optimizer**: hill-climbing search over sampled layouts
//! - **Finalizer**: marks player and exit, validates and serializes the result
//!
//! ## Example
//!
//! ```no_run
//! use slidegen::{generation::utils, GenerationConfig, Generator, LevelGenerator, Position};
//!
//! let config = GenerationConfig::new();
//! let mut rng = utils::create_rng(&config);
//! let generator = LevelGenerator::new(Position::new(1, 1), 0.1);
//!
//! match generator.generate(&config, &mut rng) {
//!     Ok(generated) => println!("{}", generated.to_level_string()),
//!     Err(e) => eprintln!("{}", e),
//! }
//! ```

pub mod generation;
pub mod graph;
pub mod level;
pub mod utils;

// Core module re-exports
pub use generation::*;
pub use graph::*;
pub use level::*;
pub use utils::*;

/// Core error type for the level generator.
#[derive(thiserror::Error, Debug)]
pub enum SlideError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Level data is malformed or violates a level invariant
    #[error("Invalid level: {0}")]
    InvalidLevel(String),

    /// The iteration budget ran out before any valid level was recorded
    #[error("Generation failed: no valid level after {iterations} iterations")]
    GenerationFailed { iterations: u32 },
}

/// Result type used throughout the slidegen codebase.
pub type SlideResult<T> = Result<T, SlideError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default generation constants and configuration limits.
pub mod config {
    /// Default level width in tiles
    pub const DEFAULT_WIDTH: u32 = 27;

    /// Default level height in tiles
    pub const DEFAULT_HEIGHT: u32 = 15;

    /// Score a level must reach before the search stops
    pub const DEFAULT_TARGET_SCORE: f64 = 4800.0;

    /// Iteration budget of the level optimizer
    pub const DEFAULT_ITERATION_LIMIT: u32 = 1 << 16;

    /// Iteration budget of the density pattern annealing
    pub const DEFAULT_PATTERN_ITERATION_LIMIT: u32 = 1 << 14;

    /// Probability that a tile is re-rolled in a single perturbation
    pub const DEFAULT_REROLL_CHANCE: f64 = 0.02;

    /// Fraction of the target score (or iteration budget) at which stuck checks start
    pub const DEFAULT_STUCK_CHECK_RATIO: f64 = 0.875;

    /// Upper clamp for density values before the border boost
    pub const DEFAULT_MAX_TILE_DENSITY: f32 = 0.875;

    /// Noise amplitude applied to every tile density
    pub const DEFAULT_BASE_NOISE: f32 = 0.125;

    /// Largest extra noise amplitude when patterns are enabled
    pub const DEFAULT_MAX_PATTERN_NOISE: u32 = 8;

    /// Largest level a configuration may describe, in tiles
    pub const MAX_LEVEL_TILES: u64 = 1 << 24;

    /// Largest accepted noise amplitude, for base and pattern noise alike
    pub const MAX_NOISE_AMPLITUDE: f32 = 1024.0;
}
