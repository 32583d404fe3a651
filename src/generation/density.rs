//! # Density Field
//!
//! Per-tile wall probabilities used to sample candidate layouts.
//!
//! The field starts as the target density plus uniform noise. Half of all
//! fields additionally get much stronger noise which is then annealed into
//! spatial patterns (stripes, checkerboards, blobs) by swapping neighbouring
//! values whenever that increases local contrast. Finally values are clamped
//! and the outer ring of tiles gets a shared boost so levels tend to be
//! enclosed.

use crate::{GenerationConfig, Generator, Level, Position, SlideError, SlideResult, Tile};
use log::{debug, trace};
use rand::{rngs::StdRng, Rng};

/// Reach of the pattern score neighbourhood in each direction (a 7x7 window).
const PATTERN_RADIUS: i32 = 3;

/// Pairs closer than this squared distance add contrast, farther pairs subtract it.
const PATTERN_FALLOFF: f32 = 8.0;

/// Swaps attempted per annealing iteration at full temperature.
const PATTERN_MAX_SWAPS: f32 = 16.0;

/// Wall probability of every tile of a level.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityField {
    width: u32,
    height: u32,
    values: Vec<f32>,
    patterned: bool,
    border_boost: f32,
}

impl DensityField {
    /// Creates a field with the same density everywhere.
    pub fn uniform(width: u32, height: u32, density: f32) -> Self {
        Self {
            width,
            height,
            values: vec![density; (width * height) as usize],
            patterned: false,
            border_boost: 0.0,
        }
    }

    /// Creates a field from explicit row-major values.
    pub fn from_values(width: u32, height: u32, values: Vec<f32>) -> SlideResult<Self> {
        if values.len() != (width * height) as usize {
            return Err(SlideError::InvalidConfig(format!(
                "Density field for a {}x{} level needs {} values, got {}",
                width,
                height,
                width * height,
                values.len()
            )));
        }
        Ok(Self {
            width,
            height,
            values,
            patterned: false,
            border_boost: 0.0,
        })
    }

    /// Creates a field with permanent walls on the border and `interior` inside.
    ///
    /// Border values are overwritten rather than boosted, so
    /// [`DensityField::border_boost`] stays at zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use slidegen::DensityField;
    ///
    /// let field = DensityField::walled(5, 4, 0.25);
    /// assert!(field.is_permanent_wall(0));
    /// assert_eq!(field.get(6), 0.25);
    /// ```
    pub fn walled(width: u32, height: u32, interior: f32) -> Self {
        let mut field = Self::uniform(width, height, interior);
        for index in 0..field.size() {
            if field.is_border(index) {
                field.values[index] = 1.0;
            }
        }
        field
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn get(&self, index: usize) -> f32 {
        self.values[index]
    }

    pub fn set(&mut self, index: usize, density: f32) {
        self.values[index] = density;
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Whether pattern annealing shaped this field.
    pub fn is_patterned(&self) -> bool {
        self.patterned
    }

    /// Amount added to every border tile.
    pub fn border_boost(&self) -> f32 {
        self.border_boost
    }

    /// Tiles at density 1 or above are walls in every sampled layout and are never re-rolled.
    pub fn is_permanent_wall(&self, index: usize) -> bool {
        self.values[index] >= 1.0
    }

    /// Whether the tile lies on the outer rows or columns.
    pub fn is_border(&self, index: usize) -> bool {
        let pos = self.position_of(index);
        pos.x == 0 || pos.y == 0 || pos.x == self.width as i32 - 1 || pos.y == self.height as i32 - 1
    }

    fn position_of(&self, index: usize) -> Position {
        let width = self.width as usize;
        Position::new((index % width) as i32, (index / width) as i32)
    }

    fn index_of(&self, pos: Position) -> usize {
        (pos.x + pos.y * self.width as i32) as usize
    }

    /// Rolls a single tile against its density.
    pub fn sample_tile(&self, index: usize, rng: &mut StdRng) -> Tile {
        if self.is_permanent_wall(index) {
            return Tile::Wall;
        }
        if self.values[index] <= rng.gen::<f32>() {
            Tile::Space
        } else {
            Tile::Wall
        }
    }

    /// Samples a full layout from the field.
    pub fn sample_level(&self, rng: &mut StdRng) -> Level {
        let mut level = Level::new(self.width, self.height);
        for index in 0..self.size() {
            level.set_tile(index, self.sample_tile(index, rng));
        }
        level
    }

    /// Clamps every value into `[0, max]`.
    pub fn clamp(&mut self, max: f32) {
        for value in &mut self.values {
            *value = value.clamp(0.0, max);
        }
    }

    /// Adds `amount` to every border tile without clamping.
    pub fn boost_border(&mut self, amount: f32) {
        for index in 0..self.size() {
            if self.is_border(index) {
                self.values[index] += amount;
            }
        }
        self.border_boost += amount;
    }

    /// Local contrast score used by the pattern annealing.
    ///
    /// Sums `(8 - d^2) * |a - b|` over every ordered pair of distinct tiles
    /// within a 7x7 window, where `d^2` is their squared distance. Pairs that
    /// would fall off the grid are skipped.
    pub fn pattern_score(&self) -> f32 {
        let mut score = 0.0;
        for index in 0..self.size() {
            let pos = self.position_of(index);
            let density = self.values[index];
            for dy in -PATTERN_RADIUS..=PATTERN_RADIUS {
                for dx in -PATTERN_RADIUS..=PATTERN_RADIUS {
                    let other = Position::new(pos.x + dx, pos.y + dy);
                    if (dx == 0 && dy == 0) || !self.in_bounds(other) {
                        continue;
                    }
                    let weight = PATTERN_FALLOFF - (dx * dx + dy * dy) as f32;
                    score += weight * (density - self.values[self.index_of(other)]).abs();
                }
            }
        }
        score
    }

    fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width as i32 && pos.y < self.height as i32
    }

    /// Swaps a random interior tile with one of its eight neighbours.
    fn swap_random_neighbors(&mut self, rng: &mut StdRng) {
        let pos = Position::new(
            rng.gen_range(1..=self.width as i32 - 2),
            rng.gen_range(1..=self.height as i32 - 2),
        );
        let neighbors = pos.adjacent_positions();
        let other = neighbors[rng.gen_range(0..neighbors.len())];
        let (a, b) = (self.index_of(pos), self.index_of(other));
        self.values.swap(a, b);
    }

    /// Renders the field as rows of two-decimal values.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in self.values.chunks(self.width as usize) {
            let line: Vec<String> = row.iter().map(|v| format!("{:.2}", v)).collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        out
    }
}

/// Hill-climbs the field towards higher [`DensityField::pattern_score`].
///
/// Each iteration performs a number of random neighbour swaps that shrinks
/// quadratically from 16 down to zero, then keeps the result only if it
/// strictly beats the best score so far. Returns the final score.
pub fn anneal_patterns(field: &mut DensityField, iterations: u32, rng: &mut StdRng) -> f32 {
    let mut retained = field.values.clone();
    let mut best_score = f32::MIN;
    let report_every = (iterations / 16).max(1);

    for iteration in 0..iterations {
        let cooling = 1.0 - iteration as f32 / iterations as f32;
        let temperature = PATTERN_MAX_SWAPS * cooling * cooling;
        let swaps = temperature.ceil() as u32;
        for _ in 0..swaps {
            field.swap_random_neighbors(rng);
        }

        let score = field.pattern_score();
        if iteration % report_every == 0 {
            debug!(
                "Tile pattern with score {:10.2} at iteration {:7}",
                score, iteration
            );
        }

        if score > best_score {
            retained.copy_from_slice(&field.values);
            best_score = score;
        } else {
            field.values.copy_from_slice(&retained);
        }
    }

    debug!(
        "Tile pattern with score {:10.2} after {} iterations",
        best_score, iterations
    );
    best_score
}

/// Builds the density field for a target average density.
#[derive(Debug, Clone)]
pub struct DensityFieldGenerator {
    /// Average wall probability the field is centred on
    pub avg_density: f32,
}

impl DensityFieldGenerator {
    pub fn new(avg_density: f32) -> Self {
        Self { avg_density }
    }
}

impl Generator<DensityField> for DensityFieldGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> SlideResult<DensityField> {
        config.validate()?;
        let patterns_enabled = rng.gen_bool(0.5);
        if patterns_enabled {
            debug!("Patterns ON");
        }

        let mut max_noise = config.base_noise;
        if patterns_enabled && config.max_pattern_noise > 0 {
            max_noise += rng.gen_range(1..=config.max_pattern_noise) as f32;
        }

        let mut field = DensityField::uniform(config.width, config.height, self.avg_density);
        if max_noise > 0.0 {
            for value in &mut field.values {
                *value += rng.gen_range(-max_noise..max_noise);
            }
        }

        if patterns_enabled {
            anneal_patterns(&mut field, config.pattern_iteration_limit, rng);
            field.patterned = true;
        }

        field.clamp(config.max_tile_density);

        let wall_density = rng.gen_range(0.0..1.0);
        field.boost_border(wall_density);

        if config.render_progress {
            trace!("Density field:\n{}", field.render());
        }

        self.validate(&field, config)?;
        Ok(field)
    }

    fn validate(&self, field: &DensityField, config: &GenerationConfig) -> SlideResult<()> {
        if field.width != config.width || field.height != config.height {
            return Err(SlideError::InvalidConfig(format!(
                "Density field is {}x{}, configuration expects {}x{}",
                field.width, field.height, config.width, config.height
            )));
        }
        if field.values.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(SlideError::InvalidConfig(
                "Density field contains negative or non-finite values".to_string(),
            ));
        }
        Ok(())
    }

    fn generator_type(&self) -> &'static str {
        "DensityFieldGenerator"
    }
}
