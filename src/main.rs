//! `modref` entry point.

mod cli;

use clap::Parser;
use cli::{Cli, Command};
use modref::report::{self, encode_captures, encode_memory};
use modref::{CaptureReport, MemoryReport};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> modref::Result<()> {
    match cli.command {
        Command::Memory { value } => emit(&MemoryReport::decode(value), cli.json),
        Command::Captures { value } => emit(&CaptureReport::decode(value), cli.json),
        Command::EncodeMemory { assignments } => {
            emit(&MemoryReport::new(encode_memory(&assignments)), cli.json)
        }
        Command::EncodeCaptures { other, ret } => {
            emit(&CaptureReport::new(encode_captures(other, ret)), cli.json)
        }
    }
}

fn emit<T: Serialize + std::fmt::Display>(report: &T, json: bool) -> modref::Result<()> {
    if json {
        println!("{}", report::to_json(report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
