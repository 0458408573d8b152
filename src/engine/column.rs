use serde::Serialize;

/// Column of a roulette number. Zero sits outside all three columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Column {
    None,
    One,
    Two,
    Three,
}

impl Column {
    /// The three bettable columns, in scoring order.
    pub const BETTABLE: [Column; 3] = [Column::One, Column::Two, Column::Three];

    pub fn of(number: u8) -> Self {
        match number {
            1..=36 => match (number - 1) % 3 {
                0 => Column::One,
                1 => Column::Two,
                _ => Column::Three,
            },
            _ => Column::None,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            Column::None => 0,
            Column::One => 1,
            Column::Two => 2,
            Column::Three => 3,
        }
    }

    pub fn is_bettable(self) -> bool {
        self != Column::None
    }

    pub fn label(self) -> &'static str {
        match self {
            Column::None => "-",
            Column::One => "C1",
            Column::Two => "C2",
            Column::Three => "C3",
        }
    }
}

pub fn classify_column(number: u8) -> u8 {
    Column::of(number).id()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_has_no_column() {
        assert_eq!(classify_column(0), 0);
        assert_eq!(Column::of(0), Column::None);
        assert!(!Column::of(0).is_bettable());
    }

    #[test]
    fn classifies_every_number_on_the_wheel() {
        for n in 1..=36u8 {
            assert_eq!(classify_column(n), (n - 1) % 3 + 1, "number {n}");
        }
        assert_eq!(classify_column(1), 1);
        assert_eq!(classify_column(2), 2);
        assert_eq!(classify_column(3), 3);
        assert_eq!(classify_column(34), 1);
        assert_eq!(classify_column(35), 2);
        assert_eq!(classify_column(36), 3);
    }

    #[test]
    fn out_of_range_maps_to_none() {
        assert_eq!(Column::of(37), Column::None);
        assert_eq!(Column::of(u8::MAX), Column::None);
    }
}
