//! Entry boundary: turns keypad values and pasted text into validated spins.
//!
//! Nothing outside 0–36 gets past this module.

use super::types::Spin;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("number {0} is outside 0-36")]
    OutOfRange(i64),
    #[error("'{0}' is not a number")]
    NotNumeric(String),
    #[error("no numbers 0-36 found in input")]
    Empty,
}

pub fn parse_spin(raw: &str) -> Result<Spin, InputError> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(InputError::Empty);
    }
    let n: i64 = s.parse().map_err(|_| {
        warn!(input = s, "rejected non-numeric spin");
        InputError::NotNumeric(s.to_string())
    })?;
    Spin::new(n).inspect_err(|_| warn!(number = n, "rejected out-of-range spin"))
}

/// Extracts every bare integer in 0–36 from free text, in reading order.
///
/// Tokens glued to letters (`12a`, `x7`) are not bare integers and are skipped,
/// as are integers outside the wheel.
pub fn extract_spins(text: &str) -> Vec<Spin> {
    text.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|tok| !tok.is_empty() && tok.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|tok| tok.parse::<i64>().ok())
        .filter_map(|n| Spin::new(n).ok())
        .collect()
}

pub fn parse_bulk(text: &str) -> Result<Vec<Spin>, InputError> {
    let spins = extract_spins(text);
    if spins.is_empty() {
        warn!("bulk input held no numbers 0-36");
        return Err(InputError::Empty);
    }
    Ok(spins)
}
