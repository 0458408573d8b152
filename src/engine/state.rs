//! Session state holder.
//!
//! `SessionState` is immutable per turn: `reduce` builds the next state from an
//! event and a full replay. `SessionHolder` owns the current state, commits
//! replacements and turns each commit into notifications. It takes `&mut self`
//! for every mutation, so two recalculations can never interleave.

use super::notify::{Announcer, Notification};
use super::progression::BankrollConfig;
use super::session::{recalculate_session, SessionSnapshot};
use super::types::{Observation, Spin};
use chrono::{DateTime, Utc};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Configure(BankrollConfig),
    Spin {
        spin: Spin,
        at: DateTime<Utc>,
    },
    /// `spins` are newest first: `spins[0]` becomes the newest observation.
    Bulk {
        spins: Vec<Spin>,
        at: DateTime<Utc>,
        simulation: bool,
    },
    Undo,
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub config: Option<BankrollConfig>,
    /// Newest first.
    pub history: Vec<Observation>,
    pub derived: Option<SessionSnapshot>,
}

impl SessionState {
    pub fn new(config: BankrollConfig) -> Self {
        Self::default().reduce(SessionEvent::Configure(config))
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub fn numbers(&self) -> Vec<u8> {
        super::types::numbers_of(&self.history)
    }

    /// Next state after `event`. History changes always trigger a full replay.
    pub fn reduce(&self, event: SessionEvent) -> SessionState {
        let (config, history) = match event {
            SessionEvent::Reset => return SessionState::default(),
            SessionEvent::Configure(cfg) => (Some(cfg), self.history.clone()),
            SessionEvent::Spin { spin, at } => {
                let mut history = Vec::with_capacity(self.history.len() + 1);
                history.push(Observation::live(spin, at));
                history.extend(self.history.iter().cloned());
                (self.config.clone(), history)
            }
            SessionEvent::Bulk {
                spins,
                at,
                simulation,
            } => {
                let mut history: Vec<Observation> = spins
                    .into_iter()
                    .map(|s| Observation::new(s, at, simulation))
                    .collect();
                history.extend(self.history.iter().cloned());
                (self.config.clone(), history)
            }
            SessionEvent::Undo => {
                let history = self.history.iter().skip(1).cloned().collect();
                (self.config.clone(), history)
            }
        };

        let derived = recalculate_session(&history, config.as_ref());
        let config = match (config, &derived) {
            (Some(cfg), Some(d)) => Some(BankrollConfig {
                current_bankroll: d.current_bankroll,
                ..cfg
            }),
            (cfg, _) => cfg,
        };

        SessionState {
            config,
            history,
            derived,
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionHolder {
    state: SessionState,
    announcer: Announcer,
}

impl SessionHolder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: BankrollConfig) -> Self {
        let mut holder = Self::new();
        holder.dispatch(SessionEvent::Configure(config));
        holder
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> Option<&SessionSnapshot> {
        self.state.derived.as_ref()
    }

    pub fn dispatch(&mut self, event: SessionEvent) -> Vec<Notification> {
        let reset = matches!(event, SessionEvent::Reset);
        let next = self.state.reduce(event);
        let prev = std::mem::replace(&mut self.state, next);

        if reset {
            self.announcer.clear();
            info!("session reset");
            return Vec::new();
        }

        if let Some(d) = &self.state.derived {
            info!(
                spins = self.state.history.len(),
                wins = d.wins,
                losses = d.losses,
                step = d.progression_step,
                profit = d.profit,
                cooldown = d.cooldown_remaining,
                "session recalculated"
            );
        }
        self.announcer
            .observe(prev.derived.as_ref(), self.state.derived.as_ref())
    }

    pub fn push_spin(&mut self, spin: Spin) -> Vec<Notification> {
        self.dispatch(SessionEvent::Spin {
            spin,
            at: Utc::now(),
        })
    }

    pub fn push_bulk(&mut self, spins: Vec<Spin>, simulation: bool) -> Vec<Notification> {
        if spins.is_empty() {
            return Vec::new();
        }
        self.dispatch(SessionEvent::Bulk {
            spins,
            at: Utc::now(),
            simulation,
        })
    }

    pub fn undo(&mut self) -> Vec<Notification> {
        if self.state.history.is_empty() {
            return Vec::new();
        }
        self.dispatch(SessionEvent::Undo)
    }

    pub fn reset(&mut self) {
        self.dispatch(SessionEvent::Reset);
    }
}
