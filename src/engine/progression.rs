//! Recovery ladder and bankroll setup arithmetic.
//!
//! Multipliers are expressed in units of the minimum bet:
//! N1-N5 are 1x, 1x, 2x, 3x, 5x and R1-R5 are 8x, 12x, 18x, 26x, 40x.

use serde::Serialize;
use thiserror::Error;

pub const PROGRESSION: [u32; 10] = [1, 1, 2, 3, 5, 8, 12, 18, 26, 40];
pub const TOTAL_UNITS: u32 = 116;
pub const AVAILABLE_CHIPS: [f64; 6] = [0.50, 2.50, 10.0, 50.0, 250.0, 1000.0];

/// A column pays 2:1, so a winning bet returns three times the stake.
pub const PAYOUT_MULTIPLE: f64 = 3.0;
pub const MIN_BANKROLL: f64 = 30.0;
/// The unit is sized so the risked slice of the bankroll covers this many units.
const UNITS_PER_RISK: f64 = 12.0;
/// Steps 0..NORMAL_STEPS are the normal phase, the rest is recovery.
const NORMAL_STEPS: usize = 5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SetupError {
    #[error("bankroll must be a finite amount, got {0}")]
    NotFinite(f64),
    #[error("bankroll {bankroll:.2} is below the minimum of {min:.2}")]
    BankrollTooSmall { bankroll: f64, min: f64 },
    #[error("entry percentage must be in (0, 100], got {0}")]
    BadPercentage(f64),
}

/// Stake for `step` of the ladder. Steps past the table use the last multiplier.
pub fn bet_for_step(min_bet: f64, step: usize) -> f64 {
    let mult = PROGRESSION
        .get(step)
        .or(PROGRESSION.last())
        .copied()
        .unwrap_or(1);
    min_bet * mult as f64
}

/// Largest chip not above `(bankroll * pct / 100) / 12`; the smallest chip when none fits.
pub fn unit_value(bankroll: f64, pct: f64, chips: &[f64]) -> f64 {
    let raw_unit = bankroll * pct / 100.0 / UNITS_PER_RISK;
    let smallest = chips.first().copied().unwrap_or(0.0);
    chips
        .iter()
        .copied()
        .take_while(|&chip| chip <= raw_unit)
        .last()
        .unwrap_or(smallest)
}

/// Number of ladder steps whose cumulative stake still fits in `bankroll`.
///
/// Always at least 1 so a session can place its base bet.
pub fn max_affordable_steps(bankroll: f64, min_bet: f64) -> usize {
    let affordable = PROGRESSION
        .iter()
        .scan(0.0, |spent, &mult| {
            *spent += min_bet * mult as f64;
            Some(*spent)
        })
        .take_while(|&spent| spent <= bankroll)
        .count();
    affordable.clamp(1, PROGRESSION.len())
}

/// `N1`..`N5` during the normal phase, `R1`..`R5` during recovery.
pub fn step_label(step: usize) -> String {
    if step >= NORMAL_STEPS {
        format!("R{}", step - NORMAL_STEPS + 1)
    } else {
        format!("N{}", step + 1)
    }
}

pub fn is_recovery(step: usize) -> bool {
    step >= NORMAL_STEPS
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankrollConfig {
    pub initial_bankroll: f64,
    pub entry_percentage: f64,
    pub min_bet: f64,
    pub current_bankroll: f64,
    /// Ladder length the bankroll can sustain; a loss at step `max_steps - 1` busts.
    pub max_steps: usize,
}

impl BankrollConfig {
    pub fn setup(bankroll: f64, entry_percentage: f64) -> Result<Self, SetupError> {
        if !bankroll.is_finite() {
            return Err(SetupError::NotFinite(bankroll));
        }
        if bankroll < MIN_BANKROLL {
            return Err(SetupError::BankrollTooSmall {
                bankroll,
                min: MIN_BANKROLL,
            });
        }
        if !(entry_percentage > 0.0 && entry_percentage <= 100.0) {
            return Err(SetupError::BadPercentage(entry_percentage));
        }
        let min_bet = unit_value(bankroll, entry_percentage, &AVAILABLE_CHIPS);
        Ok(Self {
            initial_bankroll: bankroll,
            entry_percentage,
            min_bet,
            current_bankroll: bankroll,
            max_steps: max_affordable_steps(bankroll, min_bet),
        })
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps.clamp(1, PROGRESSION.len());
        self
    }

    pub fn is_last_step(&self, step: usize) -> bool {
        step + 1 >= self.max_steps
    }

    pub fn max_exposure(&self) -> f64 {
        self.min_bet * TOTAL_UNITS as f64
    }
}
