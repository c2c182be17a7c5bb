//! Locale-independent text to float conversion
use nom::{combinator::all_consuming, error::Error, number::complete::float};

/// Parse a whole token as a finite `f32`.
///
/// Accepts decimal and exponent notation. Trailing characters, `nan`/`inf`
/// and literals that overflow `f32` make the conversion fail.
pub fn parse_float(token: &str) -> Option<f32> {
    all_consuming(float::<&str, Error<&str>>)(token)
        .ok()
        .map(|(_, value)| value)
        .filter(|value| value.is_finite())
}
