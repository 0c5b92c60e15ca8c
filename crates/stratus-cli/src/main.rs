#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod commands;
mod config;

use std::process;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Cli, Command};

// Tracing target constants
pub const TRACING_TARGET_CONFIG: &str = "stratus_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "stratus_cli::command";

fn main() {
    let Err(error) = run() else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_COMMAND,
            error = %error,
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    init_tracing();
    cli.log();

    let output = match &cli.command {
        Command::Resolve(args) => commands::resolve(args)?,
        Command::Prefix { raw } => commands::prefix(raw),
        Command::StringToSign(args) => commands::string_to_sign(args)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Initializes tracing on stderr with environment-based filtering.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
