//! Command line front end.
//!
//! Usage:
//!   sokowahn solve <FILE>... [options]
//!
//! Options:
//!   --ticks <n>         Search ticks per cycle (default: 10000)
//!   --max-cycles <n>    Give up after this many cycles
//!   --merge-limit <n>   Largest state count of a merged room (default: 4096)
//!   --no-merge          Search on single-cell rooms
//!   --json              Print a JSON report instead of plain lines

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use sokowahn::{RoomNetwork, RoomSolver, SokoField, SolverConfig};

#[derive(Parser)]
#[command(name = "sokowahn")]
#[command(about = "Move-optimal Sokoban solver on a network of rooms")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one or more XSB level files
    Solve {
        /// Level files, one board per file
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Search ticks per cycle
        #[arg(long, default_value = "10000")]
        ticks: u64,

        /// Give up after this many cycles
        #[arg(long)]
        max_cycles: Option<u64>,

        /// Largest state count a merged room may reach
        #[arg(long, default_value = "4096")]
        merge_limit: u64,

        /// Skip room merging
        #[arg(long)]
        no_merge: bool,

        /// Print a JSON report
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveReport {
    file: String,
    solved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    moves: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pushes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    rooms: usize,
    states: u64,
    variants: u64,
    time_elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl SolveReport {
    fn failed(file: &Path, err: &anyhow::Error, elapsed_ms: u64) -> Self {
        SolveReport {
            file: file.display().to_string(),
            solved: false,
            moves: None,
            pushes: None,
            path: None,
            rooms: 0,
            states: 0,
            variants: 0,
            time_elapsed_ms: elapsed_ms,
            error: Some(format!("{:#}", err)),
        }
    }
}

fn solve_file(file: &Path, config: &SolverConfig) -> Result<SolveReport> {
    let start = Instant::now();
    let text = fs::read_to_string(file).with_context(|| format!("failed to read {}", file.display()))?;
    let field = SokoField::parse(&text).with_context(|| format!("invalid level in {}", file.display()))?;

    let mut network = RoomNetwork::new(field);
    network.init_rooms()?;
    if config.merge {
        network.merge_all(config.merge_limit)?;
    }

    let mut solver = RoomSolver::new(&network);
    let solution = solver.solve(config)?;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    info!(file = %file.display(), solved = solution.is_some(), elapsed_ms, hash = solver.hash_len(), "search finished");

    Ok(SolveReport {
        file: file.display().to_string(),
        solved: solution.is_some(),
        moves: solution.as_ref().map(|s| s.moves),
        pushes: solution.as_ref().map(|s| s.pushes),
        path: solution.map(|s| s.path),
        rooms: network.room_count(),
        states: network.total_states(),
        variants: network.total_variants(),
        time_elapsed_ms: elapsed_ms,
        error: None,
    })
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve { files, ticks, max_cycles, merge_limit, no_merge, json } => {
            let config = SolverConfig { ticks_per_cycle: ticks, max_cycles, merge_limit, merge: !no_merge };

            let reports: Vec<SolveReport> = files
                .par_iter()
                .map(|file| {
                    let start = Instant::now();
                    solve_file(file, &config).unwrap_or_else(|err| {
                        warn!(file = %file.display(), "{:#}", err);
                        SolveReport::failed(file, &err, start.elapsed().as_millis() as u64)
                    })
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    match (&report.path, report.moves, &report.error) {
                        (Some(path), Some(moves), _) => println!("{}: {} ({} moves)", report.file, path, moves),
                        (_, _, Some(err)) => println!("{}: error: {}", report.file, err),
                        _ => println!("{}: no solution", report.file),
                    }
                }
            }

            let all_solved = reports.iter().all(|r| r.solved);
            Ok(if all_solved { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
    }
}
