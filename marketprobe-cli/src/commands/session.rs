//! Session command - negotiate a session and show the credentials in use.

use anyhow::Result;
use marketprobe_store::SettingsStore;

use super::NotFound;
use crate::context::build_client;
use crate::output::{JsonFormatter, SessionOutput, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the session command.
pub fn run(cli: &Cli, store: &SettingsStore) -> Result<()> {
    let client = build_client(cli, store.get());
    let output = SessionOutput::from_client(&client);

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            print!("{}", formatter.format_session(&output));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&output)?);
        }
    }

    if output.token.is_none() {
        return Err(NotFound("Session token".to_string()).into());
    }
    Ok(())
}
