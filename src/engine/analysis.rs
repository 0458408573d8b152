use super::column::Column;
use super::metrics::{count_recent, current_streak, has_echo, ColumnStats};
use super::patterns::{analyze_patterns, PatternAnalysis, Trend};
use super::signal::{generate_signal, Signal};
use serde::Serialize;

/// Heuristic conditions shown next to the signal, evaluated for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Checklist {
    pub dominance: bool,
    pub pressure: bool,
    pub continuity: bool,
    pub momentum: bool,
    pub hot_zone: bool,
    pub streak: bool,
    pub echo: bool,
    pub pattern: bool,
    pub no_blocks: bool,
    pub progression_safe: bool,
}

impl Checklist {
    pub fn passed(&self) -> usize {
        [
            self.dominance,
            self.pressure,
            self.continuity,
            self.momentum,
            self.hot_zone,
            self.streak,
            self.echo,
            self.pattern,
            self.no_blocks,
            self.progression_safe,
        ]
        .iter()
        .filter(|&&b| b)
        .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub stats: ColumnStats,
    pub checks: Checklist,
    pub patterns: PatternAnalysis,
    pub focus: Column,
    pub signal: Option<Signal>,
}

/// Read-only snapshot of a history for display: column shares, checklist and signal.
///
/// The signal generator is always called with zero consecutive losses; only the
/// `progression_safe` check looks at `consecutive_losses`.
pub fn analyze_full_session(numbers: &[u8], consecutive_losses: u32) -> AnalysisResult {
    let stats = ColumnStats::from_history(numbers);
    let signal = generate_signal(numbers, 0);
    let patterns = analyze_patterns(numbers);

    let focus = signal
        .as_ref()
        .map(|s| s.column)
        .or(patterns.hot_column)
        .unwrap_or(Column::One);

    let checks = Checklist {
        dominance: stats.pct(focus) >= 35.0,
        pressure: count_recent(numbers, 7, focus) >= 4,
        continuity: count_recent(numbers, 4, focus) >= 2,
        momentum: count_recent(numbers, 3, focus) >= 2,
        hot_zone: patterns.hot_column == Some(focus) && patterns.recent_trend == Trend::Up,
        streak: current_streak(numbers, focus) >= 2,
        echo: has_echo(numbers, focus),
        pattern: patterns.has_alternating_pattern || patterns.has_repetition_pattern,
        no_blocks: signal.as_ref().map_or(true, |s| s.blocks.is_empty()),
        progression_safe: consecutive_losses < 2,
    };

    AnalysisResult {
        stats,
        checks,
        patterns,
        focus,
        signal,
    }
}

impl AnalysisResult {
    pub fn empty() -> Self {
        analyze_full_session(&[], 0)
    }
}
