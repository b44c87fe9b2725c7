//! Binary entry point for the `lz4bridge` command-line tool.
//!
//! Parses arguments with `clap`, installs the `tracing` subscriber according
//! to `-v`/`-q` (or `RUST_LOG`), and dispatches to [`lz4bridge::cli::run`].

use std::process::ExitCode;

use clap::Parser;
use lz4bridge::cli::{self, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli::init_logging(&cli);
    match cli::run::execute(&cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.display_level() >= 1 {
                eprintln!("lz4bridge: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}
