// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! `MarketProbe` CLI - marketplace catalog scraping from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Search one page of the catalog
//! marketprobe search "denim jacket"
//!
//! # Three pages with extra filters, as JSON
//! marketprobe search "boots" --pages 3 --param order=newest_first --format json --pretty
//!
//! # Item details
//! marketprobe item 4821337
//!
//! # Check that a session can be negotiated
//! marketprobe session
//!
//! # Configuration
//! marketprobe config show
//! marketprobe config set host_url https://www.vinted.fr
//! ```

mod commands;
mod context;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use marketprobe_store::LogLevel;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use commands::{config, item, search, session};

// ============================================================================
// CLI Definition
// ============================================================================

/// `MarketProbe` CLI - resilient marketplace catalog access.
#[derive(Parser)]
#[command(name = "marketprobe")]
#[command(about = "Marketplace catalog scraping CLI")]
#[command(long_about = r#"
MarketProbe queries a marketplace catalog API through rotating client
identities, proxy routes and session tokens.

Identity and proxy lists are read from identities.json and proxies.json in
the configuration directory (see `marketprobe config path`).

Examples:
  marketprobe search "denim jacket"          # First page of results
  marketprobe search boots --pages 3         # Up to three pages
  marketprobe item 4821337                   # Item details
  marketprobe session                        # Negotiate a session
  marketprobe config show                    # Current settings
"#)]
#[command(version)]
#[command(author = "MarketProbe Contributors")]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Settings file to use instead of the default one.
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Marketplace host URL (overrides settings).
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Session token to use instead of negotiating one.
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Search the catalog.
    #[command(visible_alias = "s")]
    Search(search::SearchArgs),

    /// Show one item.
    #[command(visible_alias = "i")]
    Item(item::ItemArgs),

    /// Negotiate a session and show the credentials in use.
    Session,

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// General error.
    Error = 1,
    /// Nothing was found.
    NotFound = 2,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return;
    }

    let filter = if verbose {
        EnvFilter::new("marketprobe=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("marketprobe={level}")))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();

    let store = context::load_settings(&cli);
    setup_logging(cli.verbose, cli.quiet, store.get().log_level);

    let result = match &cli.command {
        Commands::Search(args) => search::run(args, &cli, &store),
        Commands::Item(args) => item::run(args, &cli, &store),
        Commands::Session => session::run(&cli, &store),
        Commands::Config(args) => config::run(args, &cli, store),
    };

    if let Err(e) = result {
        if !cli.quiet {
            eprintln!("Error: {e}");
        }
        let code = if e.is::<commands::NotFound>() {
            ExitCode::NotFound
        } else {
            ExitCode::Error
        };
        std::process::exit(code as i32);
    }

    Ok(())
}
