//! Short-window pattern detection over the most recent 15 spins.

use super::column::Column;
use super::metrics::valid_columns;
use serde::Serialize;

const PATTERN_WINDOW: usize = 15;
const MIN_ALTERNATIONS: usize = 4;
const MIN_REPETITION_RUN: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternAnalysis {
    pub has_alternating_pattern: bool,
    pub has_repetition_pattern: bool,
    /// `None` only when the window holds no non-zero spin.
    pub hot_column: Option<Column>,
    pub cold_column: Option<Column>,
    pub recent_trend: Trend,
    /// Informational, 0–100.
    pub pattern_strength: f64,
}

pub fn analyze_patterns(numbers: &[u8]) -> PatternAnalysis {
    let columns = valid_columns(numbers, PATTERN_WINDOW);

    let alternations = columns
        .windows(3)
        .filter(|w| w[0] == w[2] && w[0] != w[1])
        .count();
    let has_alternating_pattern = alternations >= MIN_ALTERNATIONS;
    let has_repetition_pattern = longest_run(&columns) >= MIN_REPETITION_RUN;

    let counts = Column::BETTABLE.map(|col| (col, columns.iter().filter(|&&c| c == col).count()));
    let (hot_column, cold_column) = if columns.is_empty() {
        (None, None)
    } else {
        // First max / first min wins on ties.
        let hot = counts.iter().fold(counts[0], |best, &cur| if cur.1 > best.1 { cur } else { best });
        let cold = counts.iter().fold(counts[0], |best, &cur| if cur.1 < best.1 { cur } else { best });
        (Some(hot), Some(cold))
    };

    let recent_trend = match hot_column {
        Some((hot, _)) => {
            let recent = columns.iter().take(5).filter(|&&c| c == hot).count();
            if recent >= 3 {
                Trend::Up
            } else if recent <= 1 {
                Trend::Down
            } else {
                Trend::Stable
            }
        }
        None => Trend::Stable,
    };

    let mut strength = 0.0;
    if has_alternating_pattern {
        strength += 20.0;
    }
    if has_repetition_pattern {
        strength += 25.0;
    }
    if let Some((_, hot_count)) = hot_column {
        strength += hot_count as f64 / columns.len() as f64 * 50.0;
    }
    if recent_trend == Trend::Up {
        strength += 15.0;
    }

    PatternAnalysis {
        has_alternating_pattern,
        has_repetition_pattern,
        hot_column: hot_column.map(|(c, _)| c),
        cold_column: cold_column.map(|(c, _)| c),
        recent_trend,
        pattern_strength: strength.min(100.0),
    }
}

fn longest_run(columns: &[Column]) -> usize {
    columns
        .chunk_by(|a, b| a == b)
        .map(|run| run.len())
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_alternation() {
        // C1 C2 C1 C2 C1 C2
        let h = [1, 2, 4, 5, 7, 8];
        let p = analyze_patterns(&h);
        assert!(p.has_alternating_pattern);
        assert!(!p.has_repetition_pattern);
    }

    #[test]
    fn detects_repetition_and_up_trend() {
        let h = [3, 6, 9, 1, 2];
        let p = analyze_patterns(&h);
        assert!(p.has_repetition_pattern);
        assert_eq!(p.hot_column, Some(Column::Three));
        assert_eq!(p.recent_trend, Trend::Up);
        // 20 (none) + 25 + 3/5*50 + 15
        assert!((p.pattern_strength - 70.0).abs() < 1e-9, "got {}", p.pattern_strength);
    }

    #[test]
    fn ties_resolve_in_column_order() {
        let h = [1, 2, 3];
        let p = analyze_patterns(&h);
        assert_eq!(p.hot_column, Some(Column::One));
        assert_eq!(p.cold_column, Some(Column::One));
        assert_eq!(p.recent_trend, Trend::Down);
    }

    #[test]
    fn only_zeros_has_no_hot_column() {
        let p = analyze_patterns(&[0, 0, 0]);
        assert_eq!(p.hot_column, None);
        assert_eq!(p.recent_trend, Trend::Stable);
        assert_eq!(p.pattern_strength, 0.0);
    }

    #[test]
    fn window_is_fifteen_spins() {
        let mut h = vec![1u8, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3];
        h.extend([36u8; 10]);
        let p = analyze_patterns(&h);
        assert!(!p.has_repetition_pattern, "the run of C3 is outside the window");
    }
}
