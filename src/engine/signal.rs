//! Column signal generator.
//!
//! Scores each bettable column from recency-weighted hit counts plus the
//! pattern analyzer's hot column, picks the best one and runs it through the
//! entry gates. Pure function of the history window.

use super::column::Column;
use super::metrics::{count_recent, current_streak, has_echo, share_pct, zeros_recent, SHARE_WINDOW};
use super::patterns::{analyze_patterns, PatternAnalysis, Trend};
use serde::Serialize;

pub const MIN_HISTORY: usize = 5;

// Scoring weights
const SHARE_WEIGHT: f64 = 0.8;
const LAST5_BONUS: [(usize, f64); 3] = [(4, 30.0), (3, 20.0), (2, 10.0)];
const LAST3_BONUS: f64 = 15.0;
const ECHO_BONUS: f64 = 10.0;
const STREAK_UNIT: f64 = 10.0;
const HOT_BONUS: f64 = 5.0;
const HOT_RISING_BONUS: f64 = 20.0;

// Gates
const MIN_SHARE_PCT: f64 = 30.0;
const MIN_SHARE_PCT_HOT: f64 = 25.0;
const HIGH_DOMINANCE_PCT: f64 = 40.0;

// Confidence
const CONFIDENCE_SCALE: f64 = 0.6;
const CONFIDENCE_BASE_CAP: f64 = 60.0;
const PRESSURE_BONUS: f64 = 10.0;
const REPETITION_BONUS: f64 = 10.0;
const HIGH_PRESSURE_BONUS: f64 = 15.0;
const ZERO_PENALTY: f64 = 25.0;
const ZERO_BLOCK_COUNT: usize = 2;

pub const TRIGGER_HIGH_PRESSURE: &str = "High pressure (4+/7)";
pub const TRIGGER_STEADY_PRESSURE: &str = "Steady pressure (3/7)";
pub const TRIGGER_SHORT_MOMENTUM: &str = "Short-term momentum (3+/5)";
pub const TRIGGER_IMMEDIATE_MOMENTUM: &str = "Immediate momentum (2/3)";
pub const TRIGGER_DOMINANCE: &str = "High dominance";
pub const TRIGGER_ECHO: &str = "Echo rhythm";
pub const TRIGGER_REPETITION: &str = "Repetition pattern";
pub const BLOCK_ZEROS: &str = "Zero instability (2+/5)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalLevel {
    Weak,
    Medium,
    Good,
    Strong,
}

impl SignalLevel {
    pub fn from_confidence(confidence: u32) -> Self {
        match confidence {
            85.. => SignalLevel::Strong,
            65..=84 => SignalLevel::Good,
            50..=64 => SignalLevel::Medium,
            _ => SignalLevel::Weak,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SignalLevel::Weak => "WEAK",
            SignalLevel::Medium => "MEDIUM",
            SignalLevel::Good => "GOOD",
            SignalLevel::Strong => "STRONG",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub column: Column,
    pub confidence: u32,
    pub triggers: Vec<&'static str>,
    pub blocks: Vec<&'static str>,
    pub is_valid: bool,
    pub level: SignalLevel,
}

#[derive(Debug, Clone, Copy)]
struct ColumnScore {
    column: Column,
    score: f64,
    share_pct: f64,
    count7: usize,
    count5: usize,
    count3: usize,
    echo: bool,
}

fn score_column(numbers: &[u8], col: Column, patterns: &PatternAnalysis) -> ColumnScore {
    let share = share_pct(numbers, SHARE_WINDOW, col);
    let count7 = count_recent(numbers, 7, col);
    let count5 = count_recent(numbers, 5, col);
    let count3 = count_recent(numbers, 3, col);
    let echo = has_echo(numbers, col);
    let streak = current_streak(numbers, col);

    let mut score = share * SHARE_WEIGHT;
    if let Some(&(_, bonus)) = LAST5_BONUS.iter().find(|(hits, _)| count5 >= *hits) {
        score += bonus;
    }
    if count3 >= 2 {
        score += LAST3_BONUS;
    }
    if echo {
        score += ECHO_BONUS;
    }
    if streak >= 2 {
        score += streak as f64 * STREAK_UNIT;
    }
    if patterns.hot_column == Some(col) {
        score += if patterns.recent_trend == Trend::Up {
            HOT_RISING_BONUS
        } else {
            HOT_BONUS
        };
    }

    ColumnScore {
        column: col,
        score,
        share_pct: share,
        count7,
        count5,
        count3,
        echo,
    }
}

/// Recommends a target column, or `None` when no column clears the gates.
///
/// `numbers` is newest-first. `_consecutive_losses` is accepted for interface
/// compatibility; every caller passes 0 and it does not gate anything.
pub fn generate_signal(numbers: &[u8], _consecutive_losses: u32) -> Option<Signal> {
    if numbers.len() < MIN_HISTORY {
        return None;
    }

    let patterns = analyze_patterns(numbers);
    let best = Column::BETTABLE
        .iter()
        .map(|&col| score_column(numbers, col, &patterns))
        .fold(None, |best: Option<ColumnScore>, cur| match best {
            Some(b) if cur.score <= b.score => Some(b),
            _ => Some(cur),
        })?;

    let min_share = if best.count5 >= 3 {
        MIN_SHARE_PCT_HOT
    } else {
        MIN_SHARE_PCT
    };
    if best.share_pct < min_share {
        return None;
    }

    let high_pressure = best.count7 >= 4;
    let dominant_pressure = best.share_pct >= HIGH_DOMINANCE_PCT && best.count7 >= 3;
    let short_momentum = best.count5 >= 3;
    if !(high_pressure || dominant_pressure || short_momentum) {
        return None;
    }

    let mut triggers = Vec::new();
    if high_pressure {
        triggers.push(TRIGGER_HIGH_PRESSURE);
    } else if best.count7 >= 3 {
        triggers.push(TRIGGER_STEADY_PRESSURE);
    }
    if short_momentum {
        triggers.push(TRIGGER_SHORT_MOMENTUM);
    }
    if best.count3 >= 2 {
        triggers.push(TRIGGER_IMMEDIATE_MOMENTUM);
    }
    if best.share_pct >= HIGH_DOMINANCE_PCT {
        triggers.push(TRIGGER_DOMINANCE);
    }
    if best.echo {
        triggers.push(TRIGGER_ECHO);
    }
    if patterns.has_repetition_pattern {
        triggers.push(TRIGGER_REPETITION);
    }

    let mut confidence = (best.score * CONFIDENCE_SCALE).min(CONFIDENCE_BASE_CAP);
    if best.count7 >= 3 {
        confidence += PRESSURE_BONUS;
    }
    if patterns.has_repetition_pattern {
        confidence += REPETITION_BONUS;
    }
    if high_pressure {
        confidence += HIGH_PRESSURE_BONUS;
    }

    let mut blocks = Vec::new();
    if zeros_recent(numbers, 5) >= ZERO_BLOCK_COUNT {
        confidence -= ZERO_PENALTY;
        blocks.push(BLOCK_ZEROS);
    }

    let confidence = confidence.clamp(0.0, 100.0).round() as u32;
    Some(Signal {
        column: best.column,
        confidence,
        triggers,
        is_valid: blocks.is_empty(),
        blocks,
        level: SignalLevel::from_confidence(confidence),
    })
}
