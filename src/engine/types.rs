use super::column::Column;
use super::input::InputError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// A validated roulette number, 0–36.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Spin(u8);

impl Spin {
    pub const MAX: u8 = 36;

    pub fn new(number: i64) -> Result<Self, InputError> {
        match u8::try_from(number) {
            Ok(n) if n <= Self::MAX => Ok(Spin(n)),
            _ => Err(InputError::OutOfRange(number)),
        }
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn column(self) -> Column {
        Column::of(self.0)
    }
}

impl TryFrom<i64> for Spin {
    type Error = InputError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        Spin::new(n)
    }
}

impl fmt::Display for Spin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One observed spin. Simulation entries count toward hit/miss statistics but
/// never move the bankroll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    #[serde(rename = "number")]
    spin: Spin,
    timestamp: DateTime<Utc>,
    is_simulation: bool,
}

impl Observation {
    pub fn new(spin: Spin, timestamp: DateTime<Utc>, is_simulation: bool) -> Self {
        Self {
            spin,
            timestamp,
            is_simulation,
        }
    }

    pub fn live(spin: Spin, timestamp: DateTime<Utc>) -> Self {
        Self::new(spin, timestamp, false)
    }

    pub fn simulated(spin: Spin, timestamp: DateTime<Utc>) -> Self {
        Self::new(spin, timestamp, true)
    }

    pub fn spin(&self) -> Spin {
        self.spin
    }

    pub fn number(&self) -> u8 {
        self.spin.number()
    }

    pub fn column(&self) -> Column {
        self.spin.column()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_simulation(&self) -> bool {
        self.is_simulation
    }
}

pub fn numbers_of(history: &[Observation]) -> Vec<u8> {
    history.iter().map(Observation::number).collect()
}
