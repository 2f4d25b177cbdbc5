//! Config command - manage configuration.

use anyhow::Result;
use clap::{Args, Subcommand};
use marketprobe_store::{SettingsStore, default_config_dir};
use tracing::info;

use crate::output::JsonFormatter;
use crate::{Cli, OutputFormat};

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration.
    Show,

    /// Show configuration paths.
    Path,

    /// Write a settings file with the defaults.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Set one setting.
    Set {
        /// Setting name, e.g. `max_retries`.
        key: String,
        /// New value, as JSON or a bare string.
        value: String,
    },
}

/// Runs the config command.
pub fn run(args: &ConfigArgs, cli: &Cli, store: SettingsStore) -> Result<()> {
    match &args.action {
        ConfigAction::Show => show_config(cli, &store),
        ConfigAction::Path => show_paths(cli, &store),
        ConfigAction::Init { force } => init_config(*force, store),
        ConfigAction::Set { key, value } => set_value(key, value, store),
    }
}

fn show_config(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let settings = store.get();

    match cli.format {
        OutputFormat::Text => {
            println!("MarketProbe Configuration");
            println!("{}", "─".repeat(40));
            println!();
            println!("Host:               {}", settings.host_url);
            println!("Cookie prefix:      {}", settings.cookie_prefix);
            println!("Max payload:        {} KB", settings.max_payload_kb);
            println!("Max retries:        {}", settings.max_retries);
            println!("Bootstrap attempts: {}", settings.bootstrap_attempts);
            println!("Timeout:            {}s", settings.timeout_secs);
            println!("Backoff:            {:?}", settings.backoff);
            println!(
                "Cache:              {} entries, {}s",
                settings.cache_capacity, settings.cache_ttl_secs
            );
            if !settings.recovery_overrides.is_empty() {
                println!();
                println!("Recovery overrides:");
                for (status, recovery) in settings.recovery_overrides.rules() {
                    println!("  {status} → {recovery:?}");
                }
            }
            println!();
            println!("Built-in identities: {}", settings.builtin_identities);
            println!("Diagnostics:         {}", settings.diagnostics);
            println!("Log level:           {}", settings.log_level);
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(settings)?);
        }
    }

    Ok(())
}

fn show_paths(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let config_dir = default_config_dir();
    let settings = store.get();
    let identities = settings.identities_path();
    let proxies = settings.proxies_path();

    match cli.format {
        OutputFormat::Text => {
            println!("Configuration Paths");
            println!("{}", "─".repeat(40));
            println!();
            println!("Config dir:      {}", config_dir.display());
            println!("Settings file:   {}", store.path().display());
            println!("Identities file: {}", identities.display());
            println!("Proxies file:    {}", proxies.display());
        }
        OutputFormat::Json => {
            let paths = serde_json::json!({
                "config_dir": config_dir.display().to_string(),
                "settings_file": store.path().display().to_string(),
                "identities_file": identities.display().to_string(),
                "proxies_file": proxies.display().to_string(),
            });
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&paths)?);
        }
    }

    Ok(())
}

fn init_config(force: bool, mut store: SettingsStore) -> Result<()> {
    if store.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            store.path().display()
        );
    }

    store.update(|s| *s = marketprobe_store::Settings::default());
    store.save()?;
    info!(path = %store.path().display(), "Wrote default settings");
    println!("✓ Wrote {}", store.path().display());
    Ok(())
}

fn set_value(key: &str, value: &str, mut store: SettingsStore) -> Result<()> {
    store.set_value(key, value)?;
    store.save()?;
    println!("✓ {key} updated");
    Ok(())
}
