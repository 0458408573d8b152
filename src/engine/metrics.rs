//! Recency-window measurements over a newest-first list of numbers.
//!
//! Every helper here reads `numbers[0]` as the most recent spin. The analyzers
//! share them so the signal scoring and the display checklist can never
//! disagree about what "3 hits in the last 5" means.

use super::column::Column;
use serde::Serialize;

pub const SHARE_WINDOW: usize = 20;
pub const STREAK_WINDOW: usize = 10;

/// Hits of `col` among the `n` most recent numbers (zeros included in the window).
pub fn count_recent(numbers: &[u8], n: usize, col: Column) -> usize {
    numbers
        .iter()
        .take(n)
        .filter(|&&x| Column::of(x) == col)
        .count()
}

pub fn zeros_recent(numbers: &[u8], n: usize) -> usize {
    numbers.iter().take(n).filter(|&&x| x == 0).count()
}

pub fn valid_columns(numbers: &[u8], n: usize) -> Vec<Column> {
    numbers
        .iter()
        .take(n)
        .map(|&x| Column::of(x))
        .filter(|c| c.is_bettable())
        .collect()
}

/// Share of `col` in the non-zero part of the `window` most recent numbers, 0–100.
pub fn share_pct(numbers: &[u8], window: usize, col: Column) -> f64 {
    let valid = valid_columns(numbers, window);
    if valid.is_empty() {
        return 0.0;
    }
    let hits = valid.iter().filter(|&&c| c == col).count();
    hits as f64 / valid.len() as f64 * 100.0
}

/// Current run of `col` from the newest spin backwards. Zeros do not break it.
pub fn current_streak(numbers: &[u8], col: Column) -> usize {
    let mut streak = 0;
    for &n in numbers.iter().take(STREAK_WINDOW) {
        let c = Column::of(n);
        if c == col {
            streak += 1;
        } else if c.is_bettable() {
            break;
        }
    }
    streak
}

/// True when the two most recent hits of `col` are 2 to 4 spins apart.
pub fn has_echo(numbers: &[u8], col: Column) -> bool {
    let mut hits = numbers
        .iter()
        .take(STREAK_WINDOW)
        .enumerate()
        .filter(|(_, &n)| Column::of(n) == col)
        .map(|(i, _)| i);
    match (hits.next(), hits.next()) {
        (Some(a), Some(b)) => (2..=4).contains(&(b - a)),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ColumnStats {
    pub col1: f64,
    pub col2: f64,
    pub col3: f64,
    pub last5_zeros: usize,
}

impl ColumnStats {
    pub fn from_history(numbers: &[u8]) -> Self {
        Self {
            col1: share_pct(numbers, SHARE_WINDOW, Column::One),
            col2: share_pct(numbers, SHARE_WINDOW, Column::Two),
            col3: share_pct(numbers, SHARE_WINDOW, Column::Three),
            last5_zeros: zeros_recent(numbers, 5),
        }
    }

    pub fn pct(&self, col: Column) -> f64 {
        match col {
            Column::One => self.col1,
            Column::Two => self.col2,
            Column::Three => self.col3,
            Column::None => 0.0,
        }
    }
}
