//! Command-line interface for the `lz4bridge` binary.
//!
//! | Submodule | Responsibility |
//! |-----------|----------------|
//! | [`args`]  | `clap` definitions: global verbosity flags and the `compress`, `decompress` and `hash` subcommands. |
//! | [`run`]   | Command execution over files or stdin/stdout, through the stream adapters and the hash boundary. |
//!
//! Typical call sequence: `Cli::parse` → `init_logging` → `run::execute`.

pub mod args;
pub mod run;

use tracing_subscriber::EnvFilter;

pub use args::{Cli, Command};

/// Maps the display level (see `config::DISPLAY_LEVEL_DEFAULT`) to a
/// `tracing` filter directive.
pub fn level_directive(display_level: i32) -> &'static str {
    match display_level {
        i32::MIN..=0 => "off",
        1 => "error",
        2 => "warn",
        3 => "info",
        4 => "debug",
        _ => "trace",
    }
}

/// Installs the stderr subscriber. `RUST_LOG` wins over `-v`/`-q`.
pub fn init_logging(cli: &Cli) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_directive(cli.display_level())));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
