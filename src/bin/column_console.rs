//! Column Console
//!
//! Line-oriented driver for a live session. Type the spins as they come out.
//!
//! Commands:
//!   <n>                 record spin n (0-36)
//!   bulk <numbers...>   import past spins, newest first (e.g. pasted from the table display)
//!   undo | u            drop the newest spin
//!   status | s          print the current state
//!   reset               start over with the configured bankroll
//!   help | h            this text
//!   quit | q            leave
//!
//! Bankroll comes from CT_BANKROLL / CT_ENTRY_PCT / CT_MAX_STEPS (see .env).

use anyhow::{Context, Result};
use column_tracker::engine::{
    parse_bulk, parse_spin,
    progression::{is_recovery, step_label},
    BankrollConfig, Column, Notification, SessionEvent, SessionHolder, SessionSettings,
    SessionSnapshot,
};
use std::io::{self, BufRead, Write};

// =============================================================================
// ANSI COLORS
// =============================================================================

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

const STRIP_LEN: usize = 12;

enum Command<'a> {
    Spin(&'a str),
    Bulk(&'a str),
    Undo,
    Status,
    Reset,
    Help,
    Quit,
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    let (head, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    match head.to_ascii_lowercase().as_str() {
        "bulk" | "b" => Command::Bulk(rest),
        "undo" | "u" => Command::Undo,
        "status" | "s" => Command::Status,
        "reset" => Command::Reset,
        "help" | "h" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => Command::Spin(line),
    }
}

fn print_help() {
    println!("{DIM}  <n> spin | bulk <nums, newest first> | undo | status | reset | quit{RESET}");
}

fn print_setup(cfg: &BankrollConfig) {
    println!();
    println!("{CYAN}{BOLD}========================================================================{RESET}");
    println!("{CYAN}{BOLD}  COLUMN CONSOLE{RESET}");
    println!("{CYAN}{BOLD}========================================================================{RESET}");
    println!("{BOLD}BANKROLL:{RESET} {:.2}", cfg.initial_bankroll);
    println!("{BOLD}ENTRY:{RESET}    {:.0}%", cfg.entry_percentage);
    println!("{BOLD}UNIT:{RESET}     {:.2}", cfg.min_bet);
    println!(
        "{BOLD}LADDER:{RESET}   {} steps (last {}, full ladder exposure {:.2})",
        cfg.max_steps,
        step_label(cfg.max_steps.saturating_sub(1)),
        cfg.max_exposure()
    );
    println!();
    print_help();
}

fn column_color(col: Column) -> &'static str {
    match col {
        Column::None => GREEN,
        Column::One => RED,
        Column::Two => CYAN,
        Column::Three => YELLOW,
    }
}

fn print_notifications(notes: &[Notification]) {
    for n in notes {
        match n {
            Notification::Win { amount } => {
                println!("{GREEN}{BOLD}  >>> WIN  +{amount:.2}{RESET}");
            }
            Notification::Loss => {
                println!("{RED}{BOLD}  >>> LOSS  ladder exhausted, cooling down{RESET}");
            }
            Notification::SignalRaised {
                signal,
                step,
                is_switch,
            } => {
                let kind = if *is_switch { "SWITCH" } else { "ENTRY" };
                println!(
                    "{YELLOW}{BOLD}  >>> {kind} {} at {} ({} {}%){RESET}",
                    signal.column.label(),
                    step_label(*step),
                    signal.level.label(),
                    signal.confidence
                );
            }
        }
    }
}

fn print_status(holder: &SessionHolder) {
    let state = holder.state();
    let (Some(cfg), Some(d)) = (state.config.as_ref(), holder.snapshot()) else {
        println!("{YELLOW}session not configured{RESET}");
        return;
    };

    let strip: Vec<String> = state
        .history
        .iter()
        .take(STRIP_LEN)
        .map(|o| format!("{}{:>2}{RESET}", column_color(o.column()), o.number()))
        .collect();
    println!("{DIM}------------------------------------------------------------------------{RESET}");
    println!("{BOLD}LAST:{RESET} {}", strip.join(" "));

    let stats = &d.analysis.stats;
    println!(
        "{BOLD}COLS:{RESET} C1 {:>5.1}%  C2 {:>5.1}%  C3 {:>5.1}%  zeros(5) {}",
        stats.col1, stats.col2, stats.col3, stats.last5_zeros
    );

    print_phase(cfg, d);

    let checks = &d.analysis.checks;
    println!(
        "{BOLD}CHECK:{RESET} {}/10 on {}",
        checks.passed(),
        d.analysis.focus.label()
    );

    if let Some(rec) = d.last_result {
        println!(
            "{DIM}  last: {} ({}) vs {} -> {:?}{RESET}",
            rec.actual,
            rec.actual_column.label(),
            rec.target.map_or("-", |c| c.label()),
            rec.outcome
        );
    }

    let profit_color = if d.profit >= 0.0 { GREEN } else { RED };
    println!(
        "{BOLD}SCORE:{RESET} W {} / L {}  profit {profit_color}{:+.2}{RESET}  bankroll {:.2}",
        d.wins, d.losses, d.profit, d.current_bankroll
    );
}

fn print_phase(cfg: &BankrollConfig, d: &SessionSnapshot) {
    let step = d.progression_step;
    let bet = d.next_bet(cfg);
    let betting = d.signal().is_some_and(|s| s.is_valid) && d.cooldown_remaining == 0;

    if d.cooldown_remaining > 0 {
        println!(
            "{BOLD}STATE:{RESET} {DIM}waiting ({} spins of cooldown){RESET}",
            d.cooldown_remaining
        );
    } else if step > 0 {
        let phase = if is_recovery(step) { "RECOVERY" } else { "NORMAL" };
        let last = if cfg.is_last_step(step) { " (LAST TRY)" } else { "" };
        let color = if is_recovery(step) { RED } else { YELLOW };
        println!(
            "{BOLD}STATE:{RESET} {color}{phase} {}{last}{RESET}",
            step_label(step)
        );
    } else if betting {
        println!("{BOLD}STATE:{RESET} {GREEN}entry authorised{RESET}");
    } else {
        println!("{BOLD}STATE:{RESET} {DIM}analysing{RESET}");
    }

    match d.signal() {
        Some(sig) if betting || step > 0 => {
            let switched = if d.target_switched { "  [switched]" } else { "" };
            println!(
                "{BOLD}BET:{RESET}   {}{}{RESET} x {bet:.2}  {} {}%  {}{switched}",
                column_color(sig.column),
                sig.column.label(),
                sig.level.label(),
                sig.confidence,
                sig.triggers.join(", ")
            );
        }
        Some(sig) if !sig.is_valid => {
            println!("{BOLD}BET:{RESET}   {DIM}blocked: {}{RESET}", sig.blocks.join(", "));
        }
        _ => println!("{BOLD}BET:{RESET}   -"),
    }
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let settings = SessionSettings::from_env();
    let config = settings
        .bankroll_config()
        .context("bankroll setup (check CT_BANKROLL / CT_ENTRY_PCT)")?;
    print_setup(&config);

    let mut holder = SessionHolder::with_config(config.clone());
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{BOLD}> {RESET}");
        stdout.flush().context("flush stdout")?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line).context("read stdin")? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let notes = match parse_command(&line) {
            Command::Quit => break,
            Command::Help => {
                print_help();
                continue;
            }
            Command::Status => Vec::new(),
            Command::Undo => holder.undo(),
            Command::Reset => {
                holder.reset();
                holder.dispatch(SessionEvent::Configure(config.clone()));
                println!("{YELLOW}session reset{RESET}");
                Vec::new()
            }
            Command::Bulk(text) => match parse_bulk(text) {
                Ok(spins) => {
                    println!("{DIM}  imported {} spins{RESET}", spins.len());
                    holder.push_bulk(spins, settings.bulk_as_simulation)
                }
                Err(e) => {
                    println!("{RED}  {e}{RESET}");
                    continue;
                }
            },
            Command::Spin(text) => match parse_spin(text) {
                Ok(spin) => holder.push_spin(spin),
                Err(e) => {
                    println!("{RED}  {e}{RESET}");
                    continue;
                }
            },
        };

        print_notifications(&notes);
        print_status(&holder);
    }

    if let Some(d) = holder.snapshot() {
        println!();
        println!(
            "{BOLD}FINAL:{RESET} {} spins, W {} / L {}, profit {:+.2}",
            holder.state().history.len(),
            d.wins,
            d.losses,
            d.profit
        );
    }
    Ok(())
}
