// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! maki - runs and inspects compiled MAKI skin scripts.
//!
//! ## Commands
//!
//! - `inspect`: header and tables of a `.maki` file
//! - `disasm`: instruction listing
//! - `run`: drives a script with timer ticks and host events
//! - `classes`: the built-in class catalog
//! - `console`: interactive session over one script

mod inspect;
mod repl;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use maki_host::{Config, EventLoop, HostEvent, LoopStats, MemoryBridge, Session};
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "maki=info,maki_host=info,maki_interpreter=warn";

#[derive(Debug, Parser)]
#[command(name = "maki", version, about = "Runs and inspects compiled MAKI skin scripts")]
struct Cli {
    /// Configuration file (defaults to ./maki.toml, then the user config dir)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `maki_interpreter=debug`
    #[arg(long, global = true, value_name = "FILTER")]
    log: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the header, classes, methods, variables and bindings
    Inspect {
        /// Compiled script
        file: PathBuf,
    },
    /// Print the decoded instruction stream
    Disasm {
        /// Compiled script
        file: PathBuf,
    },
    /// Load a script, start it and run the event loop
    Run {
        /// Compiled script
        file: PathBuf,
        /// Number of timer ticks to run
        #[arg(long, default_value_t = 60)]
        ticks: u64,
        /// Host event to deliver, as TARGET:NAME[:ARG,...]
        #[arg(long = "event", value_name = "EVENT")]
        events: Vec<String>,
        /// TOML element tree for the host
        #[arg(long, value_name = "FILE")]
        layout: Option<PathBuf>,
        /// Advance the clock without waiting in real time
        #[arg(long)]
        fast: bool,
    },
    /// List the class catalog, or describe one class
    Classes {
        /// Class name
        name: Option<String>,
    },
    /// Interactive console over a running script
    Console {
        /// Compiled script
        file: PathBuf,
        /// TOML element tree for the host
        #[arg(long, value_name = "FILE")]
        layout: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(cli.log.as_deref(), config.log_filter.as_deref());

    match cli.command {
        Command::Inspect { file } => {
            let program = load_program(&file)?;
            inspect::print_program(&program);
        }
        Command::Disasm { file } => {
            let program = load_program(&file)?;
            inspect::print_disassembly(&program);
        }
        Command::Classes { name } => inspect::print_classes(name.as_deref())?,
        Command::Run {
            file,
            ticks,
            events,
            layout,
            fast,
        } => {
            let events = events
                .iter()
                .map(|e| e.parse::<HostEvent>())
                .collect::<Result<Vec<_>, _>>()?;
            let mut session = open_session(&file, layout.as_deref(), &config)?;
            let stats = if fast {
                run_fast(&mut session, &events, ticks, config.tick_interval_ms)
            } else {
                let mut event_loop = EventLoop::new(config.tick_interval());
                let handle = event_loop.handle();
                for event in events {
                    handle.send(event);
                }
                event_loop.run(&mut session, Some(ticks)).await
            };
            print_stats(&session, &stats);
            session.unload()?;
        }
        Command::Console { file, layout } => {
            let session = open_session(&file, layout.as_deref(), &config)?;
            let mut console = repl::Repl::new(session, &config)?;
            console.run()?;
        }
    }
    Ok(())
}

/// Sets up the global subscriber. `--log` wins over `RUST_LOG`, which wins
/// over the configured filter.
fn init_tracing(flag: Option<&str>, configured: Option<&str>) {
    let filter = match flag {
        Some(directives) => EnvFilter::new(directives),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(configured.unwrap_or(DEFAULT_FILTER))),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_program(path: &Path) -> anyhow::Result<maki_interpreter::Program> {
    let bytes = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    let program = maki_interpreter::load(&bytes)
        .with_context(|| format!("{} is not a valid program", path.display()))?;
    Ok(program)
}

fn open_session(file: &Path, layout: Option<&Path>, config: &Config) -> anyhow::Result<Session> {
    let session = Session::open(file, config)?;
    let Some(layout) = layout else {
        return Ok(session);
    };
    let text = std::fs::read_to_string(layout)
        .with_context(|| format!("cannot read layout {}", layout.display()))?;
    let bridge = MemoryBridge::from_layout(&text)?;
    debug!(layout = %layout.display(), elements = bridge.len(), "layout loaded");
    Ok(session.with_bridge(bridge))
}

/// Delivers `events`, then advances the clock `ticks` times without sleeping.
fn run_fast(session: &mut Session, events: &[HostEvent], ticks: u64, step_ms: u64) -> LoopStats {
    let mut stats = LoopStats::default();
    let mut record = |outcome: maki_host::Result<()>| {
        if let Err(e) = outcome {
            stats.faults += 1;
            eprintln!("{}: {}", "Fault".red().bold(), e);
        }
    };

    record(session.start());
    for event in events {
        record(session.dispatch(event).map(drop));
    }
    for _ in 0..ticks {
        record(session.advance(step_ms));
    }

    stats.events = events.len() as u64;
    stats.ticks = ticks;
    stats
}

fn print_stats(session: &Session, stats: &LoopStats) {
    println!(
        "{} {} ticks, {} events, {} faults, clock {}ms",
        "Done:".green().bold(),
        stats.ticks,
        stats.events,
        stats.faults,
        session.clock_ms()
    );
    println!(
        "      {} instances, {} host mutations",
        session.vm().model().len(),
        session.bridge().mutations().len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run() {
        let cli = Cli::try_parse_from([
            "maki",
            "--log",
            "debug",
            "run",
            "skin.maki",
            "--ticks",
            "5",
            "--event",
            "system:onQuit",
            "--event",
            "3:onLeftClick",
            "--fast",
        ])
        .unwrap();
        assert_eq!(cli.log.as_deref(), Some("debug"));
        match cli.command {
            Command::Run {
                file,
                ticks,
                events,
                layout,
                fast,
            } => {
                assert_eq!(file, PathBuf::from("skin.maki"));
                assert_eq!(ticks, 5);
                assert_eq!(events.len(), 2);
                assert!(layout.is_none());
                assert!(fast);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_run_defaults() {
        let cli = Cli::try_parse_from(["maki", "run", "skin.maki"]).unwrap();
        match cli.command {
            Command::Run { ticks, fast, .. } => {
                assert_eq!(ticks, 60);
                assert!(!fast);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["maki"]).is_err());
        let cli = Cli::try_parse_from(["maki", "classes", "Button"]).unwrap();
        assert!(matches!(cli.command, Command::Classes { name: Some(n) } if n == "Button"));
    }
}
