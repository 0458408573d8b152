//! Session recalculation engine.
//!
//! Replays the whole history, oldest spin first, on every call. There is no
//! incremental path: whatever the engine shows now is exactly what a replay
//! from the first spin produces, so undo and bulk import can never drift.
//!
//! Per spin:
//! 1. resolve the bet placed on the target chosen at the previous spin
//! 2. feed the spin to the signal generator
//! 3. pick (or switch) the target for the next spin, honouring cooldown
//! 4. on the newest spin, record the debug bet record and the cooldown to show

use super::analysis::{analyze_full_session, AnalysisResult};
use super::column::Column;
use super::progression::{bet_for_step, BankrollConfig, PAYOUT_MULTIPLE, PROGRESSION};
use super::signal::{generate_signal, Signal, SignalLevel};
use super::types::{numbers_of, Observation};
use serde::Serialize;
use tracing::debug;

/// Spins to wait after a win or bust before a new entry is accepted.
pub const COOLDOWN_SPINS: i64 = 3;
/// Confidence shown for a target kept alive only by the progression.
pub const RECONCILED_CONFIDENCE: u32 = 95;
pub const TRIGGER_ACTIVE_PROGRESSION: &str = "Active progression";

/// "Far back" end marker so the very first signal is not held by cooldown.
const NO_END_INDEX: i64 = -10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BetOutcome {
    Win,
    Loss,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BetRecord {
    pub actual: u8,
    pub actual_column: Column,
    pub target: Option<Column>,
    pub outcome: BetOutcome,
}

/// Everything derived from one replay. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub wins: u32,
    pub losses: u32,
    pub profit: f64,
    pub current_bankroll: f64,
    pub progression_step: usize,
    pub consecutive_losses: u32,
    pub cooldown_remaining: usize,
    pub last_result: Option<BetRecord>,
    pub target_switched: bool,
    pub last_win_amount: f64,
    pub active_target: Option<Column>,
    pub analysis: AnalysisResult,
}

impl SessionSnapshot {
    pub fn signal(&self) -> Option<&Signal> {
        self.analysis.signal.as_ref()
    }

    pub fn next_bet(&self, config: &BankrollConfig) -> f64 {
        bet_for_step(config.min_bet, self.progression_step)
    }
}

struct Replay<'a> {
    config: &'a BankrollConfig,
    ladder: &'a [u32],
    target: Option<Column>,
    step: usize,
    consecutive_losses: u32,
    wins: u32,
    losses: u32,
    profit: f64,
    bankroll: f64,
    last_end_index: i64,
    switched: bool,
    last_win_amount: f64,
    cooldown_remaining: usize,
    last_result: Option<BetRecord>,
    seen: Vec<u8>,
}

impl<'a> Replay<'a> {
    fn new(config: &'a BankrollConfig, ladder: &'a [u32], len: usize) -> Self {
        Self {
            config,
            ladder,
            target: None,
            step: 0,
            consecutive_losses: 0,
            wins: 0,
            losses: 0,
            profit: 0.0,
            bankroll: config.initial_bankroll,
            last_end_index: NO_END_INDEX,
            switched: false,
            last_win_amount: 0.0,
            cooldown_remaining: 0,
            last_result: None,
            seen: Vec::with_capacity(len),
        }
    }

    fn resolve(&mut self, idx: i64, obs: &Observation, target: Column, is_last: bool) {
        let actual = Column::of(obs.number());
        let bet = self.bet();
        let won = actual == target;

        if is_last {
            self.last_result = Some(BetRecord {
                actual: obs.number(),
                actual_column: actual,
                target: Some(target),
                outcome: if won { BetOutcome::Win } else { BetOutcome::Loss },
            });
            debug!(
                number = obs.number(),
                target = target.label(),
                step = self.step,
                bet,
                won,
                "resolved newest spin"
            );
        }

        if won {
            self.wins += 1;
            if !obs.is_simulation() {
                let gain = bet * PAYOUT_MULTIPLE - bet;
                self.profit += gain;
                self.bankroll += gain;
                self.last_win_amount = gain;
            }
            self.end_cycle(idx);
            self.consecutive_losses = 0;
            return;
        }

        if !obs.is_simulation() {
            self.profit -= bet;
            self.bankroll -= bet;
        }
        if self.config.is_last_step(self.step) {
            self.losses += 1;
            self.consecutive_losses += 1;
            self.end_cycle(idx);
        } else {
            self.step += 1;
        }
    }

    fn bet(&self) -> f64 {
        let mult = self
            .ladder
            .get(self.step)
            .or(self.ladder.last())
            .copied()
            .unwrap_or(1);
        self.config.min_bet * mult as f64
    }

    fn end_cycle(&mut self, idx: i64) {
        self.step = 0;
        self.target = None;
        self.switched = false;
        self.last_end_index = idx;
    }

    fn decide(&mut self, idx: i64, signal: Option<&Signal>, is_last: bool) {
        let spins_since_end = idx - self.last_end_index;
        let in_cooldown = spins_since_end < COOLDOWN_SPINS;
        let valid = signal.filter(|s| s.is_valid);

        match (self.target, valid) {
            (Some(current), Some(sig)) if sig.column != current => {
                // Applies to the next bet, never the one just settled.
                self.target = Some(sig.column);
                if is_last {
                    self.switched = true;
                    debug!(from = current.label(), to = sig.column.label(), "target switched");
                }
            }
            (None, Some(sig)) if !in_cooldown => {
                self.target = Some(sig.column);
                self.switched = false;
            }
            _ => {}
        }

        if is_last {
            self.cooldown_remaining = if self.step > 0 {
                0
            } else {
                (COOLDOWN_SPINS - spins_since_end).max(0) as usize
            };
        }
    }

    fn run<'h>(mut self, chronological: impl Iterator<Item = &'h Observation>, len: usize) -> Self {
        for (i, obs) in chronological.enumerate() {
            let idx = i as i64;
            let is_last = i + 1 == len;

            match self.target {
                Some(target) => self.resolve(idx, obs, target, is_last),
                None if is_last => {
                    self.last_result = Some(BetRecord {
                        actual: obs.number(),
                        actual_column: Column::of(obs.number()),
                        target: None,
                        outcome: BetOutcome::None,
                    });
                    self.switched = false;
                }
                None => {}
            }

            self.seen.push(obs.number());
            let newest_first: Vec<u8> = self.seen.iter().rev().copied().collect();
            let signal = generate_signal(&newest_first, 0);
            self.decide(idx, signal.as_ref(), is_last);
        }
        self
    }
}

/// Forces the displayed signal onto the active target while a progression is running.
///
/// Kept as-is when it already points at the target; otherwise replaced by a
/// STRONG, valid signal for the target.
pub fn reconcile_signal(
    signal: Option<Signal>,
    progression_step: usize,
    active_target: Option<Column>,
) -> Option<Signal> {
    let target = match active_target {
        Some(t) if progression_step > 0 => t,
        _ => return signal,
    };
    match signal {
        Some(s) if s.column == target => Some(s),
        _ => Some(Signal {
            column: target,
            confidence: RECONCILED_CONFIDENCE,
            triggers: vec![TRIGGER_ACTIVE_PROGRESSION],
            blocks: Vec::new(),
            is_valid: true,
            level: SignalLevel::Strong,
        }),
    }
}

/// Replays `history` (newest first) against `config` on the standard ladder.
pub fn recalculate(history: &[Observation], config: &BankrollConfig) -> SessionSnapshot {
    recalculate_with_ladder(history, config, &PROGRESSION)
}

/// Same replay with an explicit multiplier ladder. An empty ladder stakes one unit.
pub fn recalculate_with_ladder(
    history: &[Observation],
    config: &BankrollConfig,
    ladder: &[u32],
) -> SessionSnapshot {
    let len = history.len();
    let r = Replay::new(config, ladder, len).run(history.iter().rev(), len);

    let mut analysis = analyze_full_session(&numbers_of(history), r.consecutive_losses);
    analysis.signal = reconcile_signal(analysis.signal.take(), r.step, r.target);

    SessionSnapshot {
        wins: r.wins,
        losses: r.losses,
        profit: r.profit,
        current_bankroll: r.bankroll,
        progression_step: r.step,
        consecutive_losses: r.consecutive_losses,
        cooldown_remaining: r.cooldown_remaining,
        last_result: r.last_result,
        target_switched: r.switched,
        last_win_amount: r.last_win_amount,
        active_target: r.target,
        analysis,
    }
}

/// Entry point for collaborators; an unconfigured session yields nothing.
pub fn recalculate_session(
    history: &[Observation],
    config: Option<&BankrollConfig>,
) -> Option<SessionSnapshot> {
    config.map(|cfg| recalculate(history, cfg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::Spin;
    use chrono::{TimeZone, Utc};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn cfg(min_bet: f64, max_steps: usize) -> BankrollConfig {
        BankrollConfig {
            initial_bankroll: 100.0,
            entry_percentage: 10.0,
            min_bet,
            current_bankroll: 100.0,
            max_steps,
        }
    }

    fn history(oldest_first: &[u8], simulation: bool) -> Vec<Observation> {
        oldest_first
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                let at = Utc.timestamp_opt(1_700_000_000 + i as i64, 0).unwrap();
                Observation::new(Spin::new(n as i64).unwrap(), at, simulation)
            })
            .rev()
            .collect()
    }

    fn random_history(rng: &mut StdRng, len: usize) -> Vec<Observation> {
        let nums: Vec<u8> = (0..len)
            .map(|_| {
                // bias towards runs so progressions actually happen
                if rng.gen_bool(0.4) {
                    3 * rng.gen_range(1..=12u8)
                } else {
                    rng.gen_range(0..=36u8)
                }
            })
            .collect();
        let sim_prefix = rng.gen_range(0..=len / 3);
        // oldest entries sit at the end of a newest-first list
        let live = len - sim_prefix;
        history(&nums, false)
            .into_iter()
            .enumerate()
            .map(|(i, o)| if i < live { o } else { Observation::simulated(o.spin(), o.timestamp()) })
            .collect()
    }

    #[test]
    fn unconfigured_session_is_a_noop() {
        assert!(recalculate_session(&history(&[1, 2, 3], false), None).is_none());
    }

    #[test]
    fn empty_history() {
        let s = recalculate(&[], &cfg(1.0, 10));
        assert_eq!(s.wins, 0);
        assert_eq!(s.progression_step, 0);
        assert_eq!(s.cooldown_remaining, 0);
        assert!(s.last_result.is_none());
        assert!(s.signal().is_none());
        assert_eq!(s.current_bankroll, 100.0);
    }

    #[test]
    fn repeated_hits_set_a_target() {
        let s = recalculate(&history(&[12, 12, 12, 5, 5], false), &cfg(1.0, 2));
        assert_eq!(s.active_target, Some(Column::Three));
        assert_eq!(s.signal().map(|sig| sig.column), Some(Column::Three));
        assert_eq!(s.progression_step, 0);
        assert_eq!(s.wins + s.losses, 0);
        let rec = s.last_result.unwrap();
        assert_eq!(rec.outcome, BetOutcome::None);
        assert_eq!(rec.target, None);
    }

    #[test]
    fn loss_then_win_recovers() {
        // target C3 after five C3 spins, then a C2 loss at step 0 and a C3 win at step 1
        let h = history(&[3, 6, 9, 12, 15, 5, 36], false);
        let s = recalculate_with_ladder(&h, &cfg(1.0, 2), &[1, 2]);
        assert_eq!(s.wins, 1);
        assert_eq!(s.losses, 0);
        assert_eq!(s.progression_step, 0);
        assert_eq!(s.consecutive_losses, 0);
        assert!((s.profit - 3.0).abs() < 1e-9, "-1 then +2*2, got {}", s.profit);
        assert!((s.current_bankroll - 103.0).abs() < 1e-9);
        assert!((s.last_win_amount - 4.0).abs() < 1e-9);
        assert_eq!(s.active_target, None);
        assert_eq!(s.cooldown_remaining, 3);
        let rec = s.last_result.unwrap();
        assert_eq!(rec.outcome, BetOutcome::Win);
        assert_eq!(rec.target, Some(Column::Three));
        assert_eq!(rec.actual_column, Column::Three);

        // standard ladder stakes 1x at N2 as well
        let s = recalculate(&h, &cfg(1.0, 2));
        assert!((s.profit - 1.0).abs() < 1e-9, "-1 then +2*1, got {}", s.profit);
    }

    #[test]
    fn mid_progression_keeps_target() {
        let s = recalculate(&history(&[3, 6, 9, 12, 15, 5], false), &cfg(1.0, 2));
        assert_eq!(s.progression_step, 1);
        assert_eq!(s.active_target, Some(Column::Three));
        assert_eq!(s.cooldown_remaining, 0);
        assert!((s.profit + 1.0).abs() < 1e-9);
        assert_eq!(s.last_result.unwrap().outcome, BetOutcome::Loss);
        assert_eq!(s.next_bet(&cfg(1.0, 2)), 1.0);
    }

    #[test]
    fn bust_at_max_step() {
        let s = recalculate(&history(&[3, 6, 9, 12, 15, 5, 2], false), &cfg(1.0, 2));
        assert_eq!(s.wins, 0);
        assert_eq!(s.losses, 1);
        assert_eq!(s.consecutive_losses, 1);
        assert_eq!(s.progression_step, 0);
        assert_eq!(s.active_target, None);
        assert!((s.profit + 2.0).abs() < 1e-9, "1 at N1 + 1 at N2, got {}", s.profit);
        assert_eq!(s.cooldown_remaining, 3);
        assert!(s.analysis.checks.progression_safe);
        assert_eq!(s.last_result.unwrap().outcome, BetOutcome::Loss);
    }

    #[test]
    fn cooldown_counts_down_then_allows_entry() {
        let cfg = cfg(1.0, 2);
        // bust lands on index 6
        let mut nums = vec![3u8, 6, 9, 12, 15, 5, 2];
        let s = recalculate(&history(&nums, false), &cfg);
        assert_eq!(s.cooldown_remaining, 3);

        for (extra, expected) in [(27u8, 2usize), (30, 1), (33, 0)] {
            nums.push(extra);
            let s = recalculate(&history(&nums, false), &cfg);
            assert_eq!(s.cooldown_remaining, expected, "after {extra}");
            assert_eq!(s.progression_step, 0);
            if expected > 0 {
                assert_eq!(s.active_target, None, "no entry during cooldown");
            } else {
                assert_eq!(s.active_target, Some(Column::Three), "entry once cooldown is over");
            }
        }
    }

    #[test]
    fn switches_target_mid_progression() {
        // C3 run sets the target, then three C1 spins lose and move the signal to C1
        let s = recalculate(&history(&[3, 6, 9, 12, 15, 1, 4, 7], false), &cfg(1.0, 10));
        assert_eq!(s.progression_step, 3);
        assert_eq!(s.active_target, Some(Column::One));
        assert!(s.target_switched);
        let rec = s.last_result.unwrap();
        assert_eq!(rec.target, Some(Column::Three), "bet was settled on the old target");
        assert_eq!(rec.outcome, BetOutcome::Loss);
        assert!((s.profit + 4.0).abs() < 1e-9, "1 + 1 + 2 lost, got {}", s.profit);
        assert_eq!(s.signal().map(|sig| sig.column), Some(Column::One));
    }

    #[test]
    fn simulation_spins_never_move_money() {
        let s = recalculate(&history(&[3, 6, 9, 12, 15, 5, 36], true), &cfg(1.0, 2));
        assert_eq!(s.wins, 1);
        assert_eq!(s.profit, 0.0);
        assert_eq!(s.current_bankroll, 100.0);
        assert_eq!(s.last_win_amount, 0.0);
    }

    #[test]
    fn reconcile_overrides_only_during_progression() {
        let other = Signal {
            column: Column::One,
            confidence: 70,
            triggers: vec!["x"],
            blocks: vec![],
            is_valid: true,
            level: SignalLevel::Good,
        };
        let forced = reconcile_signal(Some(other.clone()), 2, Some(Column::Three)).unwrap();
        assert_eq!(forced.column, Column::Three);
        assert_eq!(forced.confidence, RECONCILED_CONFIDENCE);
        assert_eq!(forced.triggers, vec![TRIGGER_ACTIVE_PROGRESSION]);
        assert_eq!(forced.level, SignalLevel::Strong);
        assert!(forced.is_valid);

        let absent = reconcile_signal(None, 1, Some(Column::Two)).unwrap();
        assert_eq!(absent.column, Column::Two);

        let agreeing = reconcile_signal(Some(other.clone()), 1, Some(Column::One)).unwrap();
        assert_eq!(agreeing, other);

        assert_eq!(reconcile_signal(Some(other.clone()), 0, Some(Column::Three)), Some(other));
        assert_eq!(reconcile_signal(None, 0, Some(Column::Three)), None);
    }

    #[test]
    fn random_sessions_hold_invariants() {
        for seed in 0..40u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let max_steps = rng.gen_range(1..=10usize);
            let cfg = cfg(0.5, max_steps);
            let len = rng.gen_range(0..120usize);
            let h = random_history(&mut rng, len);

            let a = recalculate(&h, &cfg);
            let b = recalculate(&h, &cfg);
            assert_eq!(a, b, "seed {seed}: replay is deterministic");

            assert!(a.progression_step < max_steps, "seed {seed}: step in bounds");
            if a.progression_step > 0 {
                let sig = a.signal().expect("signal shown during progression");
                assert_eq!(Some(sig.column), a.active_target, "seed {seed}");
                assert_eq!(a.cooldown_remaining, 0);
            }
            assert!((a.current_bankroll - (cfg.initial_bankroll + a.profit)).abs() < 1e-9);

            let all_sim: Vec<Observation> = h
                .iter()
                .map(|o| Observation::simulated(o.spin(), o.timestamp()))
                .collect();
            let sim = recalculate(&all_sim, &cfg);
            assert_eq!(sim.profit, 0.0, "seed {seed}");
            assert_eq!(sim.current_bankroll, cfg.initial_bankroll);
            assert_eq!((sim.wins, sim.losses), (a.wins, a.losses), "seed {seed}");
        }
    }

    #[test]
    fn wins_pay_twice_the_stake() {
        for seed in 100..130u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let cfg = cfg(2.5, 10);
            let h = random_history(&mut rng, 80);
            // replay prefix by prefix and check every newly settled live win
            for cut in 1..=h.len() {
                let newest_first = &h[h.len() - cut..];
                let prev = recalculate(&newest_first[1..], &cfg);
                let next = recalculate(newest_first, &cfg);
                let newest = &newest_first[0];
                if next.wins > prev.wins && !newest.is_simulation() {
                    let expected = 2.0 * bet_for_step(cfg.min_bet, prev.progression_step);
                    assert!(
                        (next.profit - prev.profit - expected).abs() < 1e-9,
                        "seed {seed} cut {cut}"
                    );
                }
            }
        }
    }
}
