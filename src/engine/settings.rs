use super::progression::{BankrollConfig, SetupError};

/// `CT_BANKROLL`, `CT_ENTRY_PCT`, `CT_MAX_STEPS` and `CT_BULK_AS_SIMULATION`.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub bankroll: f64,
    pub entry_percentage: f64,
    pub max_steps: Option<usize>,
    pub bulk_as_simulation: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            bankroll: 100.0,
            entry_percentage: 10.0,
            max_steps: None,
            bulk_as_simulation: true,
        }
    }
}

impl SessionSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let get_f = |k: &str, d: f64| get(k).and_then(|v| v.trim().parse().ok()).unwrap_or(d);
        let get_b = |k: &str, d: bool| {
            get(k)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(d)
        };
        Self {
            bankroll: get_f("CT_BANKROLL", d.bankroll),
            entry_percentage: get_f("CT_ENTRY_PCT", d.entry_percentage),
            max_steps: get("CT_MAX_STEPS").and_then(|v| v.trim().parse().ok()),
            bulk_as_simulation: get_b("CT_BULK_AS_SIMULATION", d.bulk_as_simulation),
        }
    }

    pub fn bankroll_config(&self) -> Result<BankrollConfig, SetupError> {
        let cfg = BankrollConfig::setup(self.bankroll, self.entry_percentage)?;
        Ok(match self.max_steps {
            Some(n) => cfg.with_max_steps(n),
            None => cfg,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(SessionSettings::from_lookup(|_| None), SessionSettings::default());
    }

    #[test]
    fn reads_overrides() {
        let s = SessionSettings::from_lookup(lookup(&[
            ("CT_BANKROLL", "500"),
            ("CT_ENTRY_PCT", " 20 "),
            ("CT_MAX_STEPS", "4"),
            ("CT_BULK_AS_SIMULATION", "false"),
        ]));
        assert_eq!(s.bankroll, 500.0);
        assert_eq!(s.entry_percentage, 20.0);
        assert_eq!(s.max_steps, Some(4));
        assert!(!s.bulk_as_simulation);
        let cfg = s.bankroll_config().unwrap();
        assert_eq!(cfg.max_steps, 4);
        // 500 * 20% / 12 = 8.33
        assert_eq!(cfg.min_bet, 2.50);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let s = SessionSettings::from_lookup(lookup(&[("CT_BANKROLL", "lots"), ("CT_MAX_STEPS", "-1")]));
        assert_eq!(s.bankroll, 100.0);
        assert_eq!(s.max_steps, None);
    }

    #[test]
    fn invalid_bankroll_is_reported() {
        let s = SessionSettings {
            bankroll: 10.0,
            ..SessionSettings::default()
        };
        assert!(s.bankroll_config().is_err());
    }
}
