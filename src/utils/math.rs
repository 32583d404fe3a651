//! # Grid Mathematics
//!
//! Wraparound arithmetic for the toroidal grid and the slide scoring formula.

use crate::Position;

/// Flat cost every slide adds to a path score.
pub const SLIDE_BASE_COST: f64 = 15.0;

/// Exponent applied to the slide length.
pub const SLIDE_LENGTH_EXPONENT: f64 = 1.5;

/// Returns `value + offset` wrapped into `0..len` (modulo, not remainder).
///
/// # Examples
///
/// ```
/// use slidegen::wrap_offset;
///
/// assert_eq!(wrap_offset(0, -1, 15), 14);
/// assert_eq!(wrap_offset(14, 1, 15), 0);
/// assert_eq!(wrap_offset(3, 2, 15), 5);
/// ```
pub fn wrap_offset(value: i32, offset: i32, len: i32) -> i32 {
    (value + offset).rem_euclid(len)
}

/// Score contributed by a single slide from `from` to `to`.
///
/// Uses the raw (unwrapped) coordinate difference, so a slide that wraps
/// around the edge is scored by where it lands, not by how far it travelled.
///
/// # Examples
///
/// ```
/// use slidegen::{slide_score_delta, Position};
///
/// let delta = slide_score_delta(Position::new(1, 1), Position::new(5, 1));
/// assert_eq!(delta, 4f64.powf(1.5) + 15.0);
/// ```
pub fn slide_score_delta(from: Position, to: Position) -> f64 {
    let dist = (to.x - from.x + to.y - from.y).abs();
    (dist as f64).powf(SLIDE_LENGTH_EXPONENT) + SLIDE_BASE_COST
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_offset_negative() {
        assert_eq!(wrap_offset(0, -1, 27), 26);
        assert_eq!(wrap_offset(0, -28, 27), 26);
    }

    #[test]
    fn test_wrap_offset_positive() {
        assert_eq!(wrap_offset(26, 1, 27), 0);
        assert_eq!(wrap_offset(26, 28, 27), 0);
        assert_eq!(wrap_offset(10, 0, 27), 10);
    }

    #[test]
    fn test_score_delta_minimum() {
        let pos = Position::new(3, 3);
        assert_eq!(slide_score_delta(pos, Position::new(4, 3)), 16.0);
        assert!(slide_score_delta(pos, pos) >= SLIDE_BASE_COST);
    }

    #[test]
    fn test_score_delta_uses_raw_difference() {
        // Left and right slides of equal length score the same
        let left = slide_score_delta(Position::new(10, 2), Position::new(1, 2));
        let right = slide_score_delta(Position::new(1, 2), Position::new(10, 2));
        assert_eq!(left, right);
        assert!((left - 42.0).abs() < 1e-9);
    }
}
