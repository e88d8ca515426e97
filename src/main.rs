//! vtpl CLI entry point
//!
//! Parses arguments, installs the log subscriber, runs the command and
//! prints failures through [`user_friendly_error`].

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vtpl::cli;
use vtpl::core::user_friendly_error;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    // RUST_LOG wins over --verbose.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose() {
        EnvFilter::new("vtpl=debug")
    } else {
        EnvFilter::new("warn")
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
