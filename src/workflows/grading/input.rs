//! Text-to-number normalization at the input boundary.
//!
//! A score is either a number in `[0, 100]` or absent. Empty and non-numeric
//! text is absent, never zero; `,` is accepted as the decimal separator; values
//! outside the scale are clamped rather than rejected.

use super::rounding::clamp_score;
use serde::{Deserialize, Deserializer};

/// Parses a raw score, returning `None` for anything that is not a number.
pub fn parse_score(raw: &str) -> Option<f64> {
    parse_decimal(raw).map(clamp_score)
}

/// Parses a credit value; missing, malformed, and negative credits count as zero.
pub fn parse_credit(raw: &str) -> f64 {
    parse_decimal(raw).map(normalize_credit).unwrap_or(0.0)
}

pub(crate) fn normalize_score(value: Option<f64>) -> Option<f64> {
    value.filter(|score| score.is_finite()).map(clamp_score)
}

pub(crate) fn normalize_credit(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Accepts a JSON number, numeric text, empty text, or null.
pub(crate) fn deserialize_score<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrText::Number(value)) => normalize_score(Some(value)),
        Some(NumberOrText::Text(text)) => parse_score(&text),
        None => None,
    })
}

pub(crate) fn deserialize_credit<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(match raw {
        Some(NumberOrText::Number(value)) => normalize_credit(value),
        Some(NumberOrText::Text(text)) => parse_credit(&text),
        None => 0.0,
    })
}
