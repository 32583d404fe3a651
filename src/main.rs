//! # Slidegen Command Line Driver
//!
//! Generates a chain of levels, each starting where the previous one exited,
//! and prints their level strings.

use clap::Parser;
use rand::Rng;
use slidegen::{generation::utils, GenerationConfig, LevelGenerator, SlideResult};
#[cfg(feature = "dev-tools")]
use tracing::{error, info, Level};

#[cfg(not(feature = "dev-tools"))]
use log::{error, info};

/// Command line arguments for the level generator.
#[derive(Parser, Debug)]
#[command(name = "slidegen")]
#[command(about = "Procedural level generator for sliding tile puzzles")]
#[command(version)]
struct Args {
    /// Number of levels to generate
    #[arg(short, long, default_value_t = 1)]
    count: u32,

    /// Random seed (overrides the config file)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file with generation settings
    #[arg(long)]
    config: Option<std::path::PathBuf>,

    /// Print each level as rows in addition to the level string
    #[arg(long)]
    render: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> SlideResult<()> {
    let args = Args::parse();

    initialize_logging(&args.log_level)?;

    info!("Starting slidegen v{}", slidegen::VERSION);

    let mut config = match &args.config {
        Some(path) => GenerationConfig::from_file(path)?,
        None => GenerationConfig::new(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    config.validate()?;

    let mut rng = utils::create_rng(&config);

    // First level starts one tile in from the top-left corner
    let mut start = config.width as usize + 1;
    for round in 0..args.count {
        // Cubing skews the target towards sparse levels, range [1/128, 1/2)
        let d: f32 = rng.gen_range(0.125..0.5);
        let target_density = 4.0 * d * d * d;

        let generator = LevelGenerator::new(config.position_of(start), target_density);
        let (level, exit) = generator.generate_string(&config, &mut rng);
        if level.is_empty() {
            error!("Level {} failed, retrying from the same start", round + 1);
        }

        println!("{}", level);
        if args.render && !level.is_empty() {
            for row in level.as_bytes().chunks(config.width as usize) {
                println!("{}", String::from_utf8_lossy(row));
            }
            println!();
        }

        start = exit;
    }

    Ok(())
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> SlideResult<()> {
    #[cfg(feature = "dev-tools")]
    {
        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::INFO,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .init();
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .format_target(false)
            .init();
    }

    Ok(())
}
