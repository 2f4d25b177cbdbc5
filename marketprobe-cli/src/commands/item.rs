//! Item command - single item details.

use anyhow::Result;
use clap::Args;
use marketprobe_catalog::SearchPaginator;
use marketprobe_store::SettingsStore;

use super::NotFound;
use super::search::parse_params;
use crate::context::build_client;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the item command.
#[derive(Args, Debug)]
pub struct ItemArgs {
    /// Item identifier.
    pub id: String,

    /// Extra query parameter as key=value (repeatable).
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
    pub params: Vec<String>,
}

/// Runs the item command.
pub fn run(args: &ItemArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    let params = parse_params(&args.params)?;
    let client = build_client(cli, store.get());
    let diag = client.config().diagnostics("item");
    let mut paginator = SearchPaginator::new(client, diag);

    let Some(item) = paginator.item(&args.id, Some(&params)) else {
        return Err(NotFound(format!("Item {}", args.id)).into());
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            print!("{}", formatter.format_item(&item));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&item)?);
        }
    }

    Ok(())
}
