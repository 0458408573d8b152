//! Offline session replay
//!
//! Replays a recorded list of spins through the session engine and prints the
//! outcome. Spins are read oldest first from a text file (any separators), or
//! generated from a seeded RNG.
//!
//! Usage:
//!   replay --file spins.txt [--simulate-first N] [--summary-json] [--verbose]
//!   replay --random 500 --seed 7 [--summary-json]
//!
//! Bankroll comes from CT_BANKROLL / CT_ENTRY_PCT / CT_MAX_STEPS.

use anyhow::{Context, Result};
use chrono::{Duration, TimeZone, Utc};
use column_tracker::engine::{
    extract_spins, recalculate, BankrollConfig, Column, Observation, SessionSettings,
    SessionSnapshot, Signal, Spin,
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Nominal gap between replayed spins.
const SPIN_INTERVAL_SECS: i64 = 40;

#[derive(Debug, Default)]
struct Args {
    file: Option<PathBuf>,
    random: Option<usize>,
    seed: u64,
    simulate_first: usize,
    summary_json: bool,
    verbose: bool,
}

fn parse_args() -> Result<Option<Args>> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut out = Args::default();
    let mut i = 0;
    while i < args.len() {
        let value = |i: usize| -> Result<&String> {
            args.get(i + 1)
                .with_context(|| format!("{} needs a value", args[i]))
        };
        match args[i].as_str() {
            "--file" | "-f" => {
                out.file = Some(PathBuf::from(value(i)?));
                i += 1;
            }
            "--random" => {
                out.random = Some(value(i)?.parse().context("--random value")?);
                i += 1;
            }
            "--seed" => {
                out.seed = value(i)?.parse().context("--seed value")?;
                i += 1;
            }
            "--simulate-first" => {
                out.simulate_first = value(i)?.parse().context("--simulate-first value")?;
                i += 1;
            }
            "--summary-json" => out.summary_json = true,
            "--verbose" | "-v" => out.verbose = true,
            "--help" | "-h" => {
                eprintln!("Usage: replay (--file PATH | --random N [--seed S]) [--simulate-first N] [--summary-json] [--verbose]");
                eprintln!("\nSpins are read oldest first. Bankroll via CT_* environment variables.");
                return Ok(None);
            }
            other => anyhow::bail!("unknown flag: {other}"),
        }
        i += 1;
    }
    if out.file.is_none() && out.random.is_none() {
        anyhow::bail!("need --file PATH or --random N (see --help)");
    }
    Ok(Some(out))
}

fn load_spins(args: &Args) -> Result<Vec<Spin>> {
    if let Some(path) = &args.file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read spins from {}", path.display()))?;
        let spins = extract_spins(&text);
        if spins.is_empty() {
            anyhow::bail!("no spins 0-36 found in {}", path.display());
        }
        return Ok(spins);
    }
    let n = args.random.unwrap_or(0);
    let mut rng = StdRng::seed_from_u64(args.seed);
    (0..n)
        .map(|_| Spin::new(rng.gen_range(0..=36)).context("generated spin"))
        .collect()
}

/// Newest-first history from oldest-first spins; the first `simulate_first` are simulation entries.
fn build_history(spins: &[Spin], simulate_first: usize) -> Vec<Observation> {
    let start = Utc.timestamp_opt(0, 0).single().unwrap_or_else(Utc::now);
    spins
        .iter()
        .enumerate()
        .map(|(i, &spin)| {
            let at = start + Duration::seconds(i as i64 * SPIN_INTERVAL_SECS);
            Observation::new(spin, at, i < simulate_first)
        })
        .rev()
        .collect()
}

#[derive(Debug, Serialize)]
struct ReplaySummary {
    spins: usize,
    simulated: usize,
    min_bet: f64,
    max_steps: usize,
    wins: u32,
    losses: u32,
    win_rate: f64,
    profit: f64,
    final_bankroll: f64,
    progression_step: usize,
    consecutive_losses: u32,
    cooldown_remaining: usize,
    active_target: Option<Column>,
    signal: Option<Signal>,
}

impl ReplaySummary {
    fn new(cfg: &BankrollConfig, history: &[Observation], d: &SessionSnapshot) -> Self {
        let settled = d.wins + d.losses;
        Self {
            spins: history.len(),
            simulated: history.iter().filter(|o| o.is_simulation()).count(),
            min_bet: cfg.min_bet,
            max_steps: cfg.max_steps,
            wins: d.wins,
            losses: d.losses,
            win_rate: if settled == 0 {
                0.0
            } else {
                100.0 * d.wins as f64 / settled as f64
            },
            profit: d.profit,
            final_bankroll: d.current_bankroll,
            progression_step: d.progression_step,
            consecutive_losses: d.consecutive_losses,
            cooldown_remaining: d.cooldown_remaining,
            active_target: d.active_target,
            signal: d.signal().cloned(),
        }
    }

    fn print(&self) {
        println!();
        println!("{BOLD}SPINS:{RESET}     {} ({} simulated)", self.spins, self.simulated);
        println!("{BOLD}UNIT:{RESET}      {:.2} x {} steps", self.min_bet, self.max_steps);
        println!(
            "{BOLD}CYCLES:{RESET}    W {} / L {} ({:.1}% won)",
            self.wins, self.losses, self.win_rate
        );
        let color = if self.profit >= 0.0 { GREEN } else { RED };
        println!(
            "{BOLD}PROFIT:{RESET}    {color}{:+.2}{RESET}  bankroll {:.2}",
            self.profit, self.final_bankroll
        );
        println!(
            "{BOLD}NOW:{RESET}       step {}, cooldown {}, target {}",
            self.progression_step,
            self.cooldown_remaining,
            self.active_target.map_or("-", |c| c.label())
        );
        if let Some(sig) = &self.signal {
            println!(
                "{BOLD}SIGNAL:{RESET}    {} {} {}%  {}",
                sig.column.label(),
                sig.level.label(),
                sig.confidence,
                sig.triggers.join(", ")
            );
        }
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let Some(args) = parse_args()? else {
        return Ok(());
    };

    let cfg = SessionSettings::from_env()
        .bankroll_config()
        .context("bankroll setup (check CT_BANKROLL / CT_ENTRY_PCT)")?;
    let spins = load_spins(&args)?;
    let history = build_history(&spins, args.simulate_first);
    info!(spins = history.len(), min_bet = cfg.min_bet, max_steps = cfg.max_steps, "replaying");

    if args.verbose {
        // prefix by prefix, one line per spin
        for cut in 1..=history.len() {
            let prefix = &history[history.len() - cut..];
            let d = recalculate(prefix, &cfg);
            let newest = &prefix[0];
            let outcome = d
                .last_result
                .map_or_else(|| "-".to_string(), |r| format!("{:?}", r.outcome));
            eprintln!(
                "{:>5} {:>2} {:<2} {:<5} step={} target={} profit={:+.2}",
                cut,
                newest.number(),
                newest.column().label(),
                outcome,
                d.progression_step,
                d.active_target.map_or("-", |c| c.label()),
                d.profit
            );
        }
    }

    let snapshot = recalculate(&history, &cfg);
    let summary = ReplaySummary::new(&cfg, &history, &snapshot);

    if args.summary_json {
        println!("{}", serde_json::to_string(&summary).context("serialize summary")?);
    } else {
        summary.print();
    }
    Ok(())
}
