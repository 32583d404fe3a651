//! # Level Optimizer
//!
//! Stochastic search for a level that reaches the target score without
//! trapping the player.
//!
//! Each iteration re-rolls a small random subset of tiles, rebuilds the
//! movement graph and scores the result. A trial replaces the current
//! baseline when it scores at least as well (hill climbing). Independently,
//! the best trial that is solvable and free of stuck spots is remembered and
//! becomes the result once the target is hit or the budget runs out.
//!
//! The stuck check costs one reachability query per reachable tile, so it only
//! runs once a trial gets close to the target score or the budget is nearly
//! spent.

use crate::{DensityField, GenerationConfig, Level, MovementGraph, SlideError, SlideResult, Tile};
use log::{debug, info, trace};
use rand::{rngs::StdRng, Rng};

/// Where the search currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    /// Trials are far from the target; stuck checks are not run yet
    Searching,
    /// The last checked trial could trap the player
    Stuck,
    /// The last checked trial was free of stuck spots
    Improving,
    /// A stuck-free trial reached the target score
    Converged,
    /// The budget ran out without any valid level
    Failed,
}

/// Outcome of the stuck check for a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StuckCheck {
    /// The trial was not checked
    Skipped,
    /// Some reachable tile cannot reach the exit
    Stuck,
    /// Every reachable tile can reach the exit
    Clear,
}

/// Best valid layout seen during a search.
#[derive(Debug, Clone, PartialEq)]
pub struct BestLevel {
    /// Layout without player or exit markers
    pub level: Level,
    /// Exit tile chosen by the best-score search
    pub exit: usize,
    /// Score of the layout
    pub score: f64,
    /// Iteration the layout was found in
    pub iteration: u32,
}

/// Result of a completed search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub best: BestLevel,
    /// Iterations spent
    pub iterations: u32,
    /// Phase the search ended in
    pub phase: SearchPhase,
}

/// Hill-climbing search over layouts sampled from a density field.
#[derive(Debug)]
pub struct LevelOptimizer<'a> {
    config: &'a GenerationConfig,
    density: &'a DensityField,
    player: usize,
}

impl<'a> LevelOptimizer<'a> {
    /// Creates an optimizer for the player tile `player`.
    pub fn new(config: &'a GenerationConfig, density: &'a DensityField, player: usize) -> Self {
        Self {
            config,
            density,
            player,
        }
    }

    /// Samples the starting layout, keeping the player's tile open.
    pub fn initial_level(&self, rng: &mut StdRng) -> Level {
        let mut level = self.density.sample_level(rng);
        level.set_tile(self.player, Tile::Space);
        level
    }

    /// Re-rolls each non-permanent tile with probability `reroll_chance`.
    pub fn perturb(&self, level: &mut Level, rng: &mut StdRng) {
        for index in 0..level.size() {
            if !self.density.is_permanent_wall(index) && rng.gen::<f64>() < self.config.reroll_chance
            {
                level.set_tile(index, self.density.sample_tile(index, rng));
            }
        }
        level.set_tile(self.player, Tile::Space);
    }

    /// Whether a trial is far enough along to pay for a stuck check.
    fn stuck_check_due(&self, score: f64, iteration: u32) -> bool {
        let ratio = self.config.stuck_check_ratio;
        score > ratio * self.config.target_score
            || iteration as f64 > ratio * self.config.iteration_limit as f64
    }

    /// Runs the stuck check on a trial if it is due.
    pub fn check_stuck(
        &self,
        graph: &MovementGraph,
        exit: usize,
        score: f64,
        iteration: u32,
    ) -> StuckCheck {
        if !self.stuck_check_due(score, iteration) {
            return StuckCheck::Skipped;
        }
        match graph.find_stuck_tile(self.player, exit) {
            Some(tile) => {
                trace!("Tile {} cannot reach exit {}", tile, exit);
                StuckCheck::Stuck
            }
            None => StuckCheck::Clear,
        }
    }

    /// Hill-climbing acceptance step.
    ///
    /// A trial scoring at least `last_score` becomes the new baseline;
    /// otherwise `level` is restored from `last_level`. Either way both
    /// layouts are equal afterwards and `last_score` never decreases.
    /// Returns whether the trial was kept.
    pub fn accept_trial(
        level: &mut Level,
        last_level: &mut Level,
        score: f64,
        last_score: &mut f64,
    ) -> bool {
        if score >= *last_score {
            last_level.copy_from(level);
            *last_score = score;
            true
        } else {
            level.copy_from(last_level);
            false
        }
    }

    /// Runs the search until the target is reached or the budget is spent.
    ///
    /// Fails with [`SlideError::GenerationFailed`] if no valid level was ever
    /// recorded.
    pub fn run(&self, rng: &mut StdRng) -> SlideResult<SearchOutcome> {
        let limit = self.config.iteration_limit;
        let target = self.config.target_score;
        let report_every = (limit / 64).max(1);

        let mut level = self.initial_level(rng);
        let mut last_level = level.clone();
        let mut last_score = MovementGraph::build(&level).best_score(self.player).score;

        let mut best: Option<BestLevel> = None;
        let mut phase = SearchPhase::Searching;
        let mut iteration = 0;
        let mut since_report = 0;

        loop {
            iteration += 1;
            if iteration > limit {
                info!("Iteration limit reached");
                return match best {
                    Some(best) => Ok(SearchOutcome {
                        best,
                        iterations: limit,
                        phase,
                    }),
                    None => Err(SlideError::GenerationFailed { iterations: limit }),
                };
            }

            self.perturb(&mut level, rng);
            let graph = MovementGraph::build(&level);
            let candidate = graph.best_score(self.player);
            let score = candidate.score;

            let stuck = self.check_stuck(&graph, candidate.exit, score, iteration);
            let next_phase = match stuck {
                StuckCheck::Skipped => phase,
                StuckCheck::Stuck => SearchPhase::Stuck,
                StuckCheck::Clear => SearchPhase::Improving,
            };
            if next_phase != phase {
                debug!("Search phase {:?} -> {:?} at iteration {}", phase, next_phase, iteration);
                phase = next_phase;
            }

            let beats_best = best.as_ref().map_or(true, |b| score > b.score);
            if stuck == StuckCheck::Clear
                && candidate.exit != self.player
                && beats_best
                && graph.path_exists(self.player, candidate.exit)
            {
                debug!("New best level with score {:.2} at iteration {}", score, iteration);
                best = Some(BestLevel {
                    level: level.clone(),
                    exit: candidate.exit,
                    score,
                    iteration,
                });
            }

            since_report += 1;
            let kept = Self::accept_trial(&mut level, &mut last_level, score, &mut last_score);
            if kept && since_report >= report_every {
                since_report = 0;
                debug!(
                    "Score: {:7.2} Target: {:7.2} Iteration {}",
                    score, target, iteration
                );
                if self.config.render_progress {
                    trace!(
                        "\n{}",
                        level.render_with_markers(self.player, candidate.exit)
                    );
                }
            }

            if stuck == StuckCheck::Clear && score >= target {
                if let Some(best) = best {
                    debug!("Search converged at iteration {}", iteration);
                    return Ok(SearchOutcome {
                        best,
                        iterations: iteration,
                        phase: SearchPhase::Converged,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generation::utils, Position};

    fn open_config(target_score: f64) -> GenerationConfig {
        GenerationConfig {
            target_score,
            iteration_limit: 64,
            ..GenerationConfig::for_testing(7)
        }
    }

    #[test]
    fn test_initial_level_opens_player_tile() {
        let config = open_config(100.0);
        let density = DensityField::uniform(config.width, config.height, 1.0);
        let player = config.index_of(Position::new(4, 4));
        let optimizer = LevelOptimizer::new(&config, &density, player);
        let mut rng = utils::create_rng(&config);

        let level = optimizer.initial_level(&mut rng);
        assert_eq!(level.count(Tile::Space), 1);
        assert_eq!(level.tile(player), Tile::Space);
    }

    #[test]
    fn test_perturb_keeps_permanent_walls() {
        let config = GenerationConfig {
            reroll_chance: 1.0,
            ..open_config(100.0)
        };
        let density = DensityField::walled(config.width, config.height, 0.5);
        let player = config.index_of(Position::new(1, 1));
        let optimizer = LevelOptimizer::new(&config, &density, player);
        let mut rng = utils::create_rng(&config);

        let mut level = optimizer.initial_level(&mut rng);
        for _ in 0..10 {
            optimizer.perturb(&mut level, &mut rng);
            for index in 0..level.size() {
                if density.is_border(index) {
                    assert!(level.is_wall(index));
                }
            }
            assert_eq!(level.tile(player), Tile::Space);
        }
    }

    #[test]
    fn test_stuck_check_gating() {
        let config = open_config(1000.0);
        let density = DensityField::walled(config.width, config.height, 0.0);
        let player = config.index_of(Position::new(1, 1));
        let optimizer = LevelOptimizer::new(&config, &density, player);
        let graph = MovementGraph::build(&Level::bordered(config.width, config.height));
        let exit = config.index_of(Position::new(25, 13));

        assert_eq!(optimizer.check_stuck(&graph, exit, 100.0, 1), StuckCheck::Skipped);
        assert_eq!(optimizer.check_stuck(&graph, exit, 900.0, 1), StuckCheck::Clear);
        assert_eq!(optimizer.check_stuck(&graph, exit, 100.0, 60), StuckCheck::Clear);

        let unreachable = config.index_of(Position::new(5, 5));
        assert_eq!(
            optimizer.check_stuck(&graph, unreachable, 900.0, 1),
            StuckCheck::Stuck
        );
    }

    #[test]
    fn test_accept_trial_keeps_better_layout() {
        let mut level = Level::bordered(7, 5);
        let mut last_level = Level::new(7, 5);
        let mut last_score = 40.0;

        assert!(LevelOptimizer::accept_trial(&mut level, &mut last_level, 55.0, &mut last_score));
        assert_eq!(last_score, 55.0);
        assert_eq!(last_level, Level::bordered(7, 5));
        assert_eq!(level, last_level);

        // Ties are accepted
        level.set_tile(8, Tile::Wall);
        assert!(LevelOptimizer::accept_trial(&mut level, &mut last_level, 55.0, &mut last_score));
        assert!(last_level.is_wall(8));
    }

    #[test]
    fn test_accept_trial_reverts_worse_layout() {
        let mut level = Level::new(7, 5);
        let mut last_level = Level::bordered(7, 5);
        let mut last_score = 40.0;

        assert!(!LevelOptimizer::accept_trial(&mut level, &mut last_level, 39.5, &mut last_score));
        assert_eq!(last_score, 40.0);
        assert_eq!(level, Level::bordered(7, 5));
        assert_eq!(last_level, Level::bordered(7, 5));
    }

    #[test]
    fn test_baseline_score_never_decreases() {
        let config = GenerationConfig {
            reroll_chance: 0.2,
            ..open_config(1000.0)
        };
        let density = DensityField::walled(config.width, config.height, 0.2);
        let player = config.index_of(Position::new(1, 1));
        let optimizer = LevelOptimizer::new(&config, &density, player);
        let mut rng = utils::create_rng(&config);

        let mut level = optimizer.initial_level(&mut rng);
        let mut last_level = level.clone();
        let mut last_score = MovementGraph::build(&level).best_score(player).score;
        let mut reverted = 0;

        for _ in 0..200 {
            optimizer.perturb(&mut level, &mut rng);
            let score = MovementGraph::build(&level).best_score(player).score;
            let previous = last_score;

            let kept = LevelOptimizer::accept_trial(&mut level, &mut last_level, score, &mut last_score);
            assert_eq!(kept, score >= previous);
            assert!(last_score >= previous);
            assert_eq!(level, last_level);
            assert_eq!(MovementGraph::build(&level).best_score(player).score, last_score);
            if !kept {
                reverted += 1;
            }
        }
        assert!(reverted > 0);
    }

    #[test]
    fn test_open_room_converges_immediately() {
        let config = open_config(150.0);
        let density = DensityField::walled(config.width, config.height, 0.0);
        let player = config.index_of(Position::new(1, 1));
        let mut rng = utils::create_rng(&config);

        let outcome = LevelOptimizer::new(&config, &density, player)
            .run(&mut rng)
            .unwrap();
        assert_eq!(outcome.phase, SearchPhase::Converged);
        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.best.iteration, 1);
        assert_eq!(outcome.best.exit, config.index_of(Position::new(25, 13)));
        assert_eq!(outcome.best.level, Level::bordered(config.width, config.height));
    }

    #[test]
    fn test_unreachable_target_keeps_best_level() {
        // The open room tops out below 200, so the search runs out of budget
        // but still has a valid level to return.
        let config = open_config(5000.0);
        let density = DensityField::walled(config.width, config.height, 0.0);
        let player = config.index_of(Position::new(1, 1));
        let mut rng = utils::create_rng(&config);

        let outcome = LevelOptimizer::new(&config, &density, player)
            .run(&mut rng)
            .unwrap();
        assert_eq!(outcome.iterations, config.iteration_limit);
        assert_eq!(outcome.phase, SearchPhase::Improving);
        assert!(outcome.best.score < config.target_score);
    }

    #[test]
    fn test_solid_level_fails() {
        let config = open_config(100.0);
        let density = DensityField::uniform(config.width, config.height, 1.0);
        let player = config.index_of(Position::new(3, 3));
        let mut rng = utils::create_rng(&config);

        let result = LevelOptimizer::new(&config, &density, player).run(&mut rng);
        assert!(matches!(
            result,
            Err(SlideError::GenerationFailed { iterations: 64 })
        ));
    }
}
