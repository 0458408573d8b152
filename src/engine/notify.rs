//! Notifications raised between two committed session states.

use super::column::Column;
use super::session::SessionSnapshot;
use super::signal::Signal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Notification {
    Win { amount: f64 },
    Loss,
    SignalRaised {
        signal: Signal,
        step: usize,
        /// Target moved while a progression was running.
        is_switch: bool,
    },
}

/// Remembers which column was last announced as bettable.
///
/// "Bettable" means the displayed signal is valid and cooldown is over, so a
/// signal hidden by cooldown is announced again the moment it becomes usable.
#[derive(Debug, Clone, Default)]
pub struct Announcer {
    announced: Option<Column>,
}

impl Announcer {
    pub fn announced(&self) -> Option<Column> {
        self.announced
    }

    pub fn clear(&mut self) {
        self.announced = None;
    }

    pub fn observe(
        &mut self,
        prev: Option<&SessionSnapshot>,
        next: Option<&SessionSnapshot>,
    ) -> Vec<Notification> {
        let mut out = Vec::new();
        let Some(next) = next else {
            return out;
        };
        let (prev_wins, prev_losses) = prev.map_or((0, 0), |p| (p.wins, p.losses));

        if next.wins > prev_wins {
            out.push(Notification::Win {
                amount: next.last_win_amount,
            });
        }
        if next.losses > prev_losses {
            out.push(Notification::Loss);
        }

        let ready = next
            .signal()
            .filter(|s| s.is_valid && next.cooldown_remaining == 0);
        if let Some(sig) = ready {
            if self.announced != Some(sig.column) {
                out.push(Notification::SignalRaised {
                    signal: sig.clone(),
                    step: next.progression_step,
                    is_switch: next.progression_step > 0 && self.announced.is_some(),
                });
            }
        }
        self.announced = ready.map(|s| s.column);
        out
    }
}
