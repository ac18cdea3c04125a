//! txi - transaction introspection for Cardano wallet signers.

use clap::Parser;
use colored::Colorize;
use std::process::ExitCode;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{Registry, fmt};

fn main() -> ExitCode {
    let args = txi::Args::parse();

    if args.no_color {
        colored::control::set_override(false);
    }

    init_logging(args.verbose, args.no_color);

    match txi::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "error".red(), e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` directives
/// override the level chosen by `-v`.
fn init_logging(verbose: u8, no_color: bool) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        );
    Registry::default().with(fmt_layer).init();
}
