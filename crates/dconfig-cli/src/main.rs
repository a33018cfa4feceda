//! `dconfig` CLI: check and query dconfig files from the command line.
//!
//! ```sh
//! # Validate a file
//! dconfig check app.config
//!
//! # Print one value
//! dconfig get app.config program.londre[0]
//!
//! # Same, with parser debug events on stderr
//! dconfig -v get app.config limits.timeout
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dconfig_parser::{ConfigValue, Path};
use std::process;
use tracing::Level;

#[derive(Parser)]
#[command(name = "dconfig")]
#[command(about = "Check and query dconfig configuration files")]
#[command(version)]
struct Cli {
    /// Log more to stderr (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a config file for errors
    Check {
        /// Input config file
        path: String,
    },

    /// Print the value at a path such as `server.hosts[0]`
    Get {
        /// Input config file
        path: String,

        /// Dot-separated member names, each optionally followed by `[N]`
        query: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Check { path } => cmd_check(&path),
        Command::Get { path, query } => cmd_get(&path, &query),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

/// Read and parse a config file, rejecting truncated input.
fn load(path: &str) -> Result<ConfigValue> {
    let source =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    tracing::debug!(path, bytes = source.len(), "read config");

    let root = dconfig_parser::Parser::parse(&source)?;
    if root.is_none() {
        bail!("Config error: invalid config (input ended mid-statement)");
    }
    Ok(root)
}

fn cmd_check(path: &str) -> Result<()> {
    load(path)?;
    eprintln!("OK: {path}");
    Ok(())
}

fn cmd_get(path: &str, query: &str) -> Result<()> {
    let query: Path = query.parse()?;
    let root = load(path)?;

    match root.lookup(&query) {
        Some(value) => {
            println!("{}", render(value));
            Ok(())
        }
        None => bail!("no value at {query}"),
    }
}

/// Scalars print as their value; containers print as a short summary.
fn render(value: &ConfigValue) -> String {
    match value {
        ConfigValue::None => "none".to_string(),
        ConfigValue::Int(n) => n.to_string(),
        ConfigValue::Float(n) => format!("{n:?}"),
        ConfigValue::String(s) => s.clone(),
        ConfigValue::Object(members) => format!("object ({} members)", members.len()),
        ConfigValue::Array(items) => format!("array ({} elements)", items.len()),
    }
}
