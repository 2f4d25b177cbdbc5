//! Search command - paginated catalog search.

use anyhow::{Context, Result};
use clap::Args;
use marketprobe_catalog::SearchPaginator;
use marketprobe_core::Params;
use marketprobe_store::SettingsStore;
use serde_json::Value;
use tracing::info;

use crate::context::build_client;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the search command.
#[derive(Args, Debug, Default)]
pub struct SearchArgs {
    /// Free-text query.
    pub query: Option<String>,

    /// Maximum number of pages to fetch.
    #[arg(long, short = 'n', default_value_t = 1, allow_negative_numbers = true)]
    pub pages: i64,

    /// Extra query parameter as key=value (repeatable).
    ///
    /// Values are parsed as JSON when possible. Repeating a key collects
    /// its values into a list.
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Print at most this many items (text output only).
    #[arg(long)]
    pub show: Option<usize>,
}

/// Runs the search command.
pub fn run(args: &SearchArgs, cli: &Cli, store: &SettingsStore) -> Result<()> {
    let mut params = parse_params(&args.params)?;
    if let Some(query) = &args.query {
        params.set("search_text", query.as_str());
    }

    let client = build_client(cli, store.get());
    let diag = client.config().diagnostics("search");
    let mut paginator = SearchPaginator::new(client, diag);

    let result = paginator.search(&params, args.pages);
    info!(
        items = result.len(),
        pages = result.pages_fetched,
        stop = ?result.stop_reason,
        "Search finished"
    );

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            print!("{}", formatter.format_search(&result, args.show));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(&result)?);
        }
    }

    Ok(())
}

/// Parses `key=value` pairs into request parameters.
pub fn parse_params(pairs: &[String]) -> Result<Params> {
    let mut params = Params::new();

    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("Invalid parameter {pair:?}, expected KEY=VALUE"))?;
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("Invalid parameter {pair:?}, key is empty");
        }

        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        let merged = match params.remove(key) {
            None => value,
            Some(Value::Array(mut values)) => {
                values.push(value);
                Value::Array(values)
            }
            Some(previous) => Value::Array(vec![previous, value]),
        };
        params.set(key, merged);
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_parse_params_types() {
        let params = parse_params(&strings(&["order=newest_first", "price_to=50", "flag=true"])).unwrap();
        assert_eq!(params.get("order"), Some(&json!("newest_first")));
        assert_eq!(params.get("price_to"), Some(&json!(50)));
        assert_eq!(params.get("flag"), Some(&json!(true)));
    }

    #[test]
    fn test_repeated_keys_collect() {
        let params = parse_params(&strings(&["brand_ids=53", "brand_ids=14", "brand_ids=7"])).unwrap();
        assert_eq!(params.get("brand_ids"), Some(&json!([53, 14, 7])));
    }

    #[test]
    fn test_value_may_contain_equals() {
        let params = parse_params(&strings(&["q=a=b"])).unwrap();
        assert_eq!(params.get("q"), Some(&json!("a=b")));
    }

    #[test]
    fn test_invalid_pairs() {
        assert!(parse_params(&strings(&["novalue"])).is_err());
        assert!(parse_params(&strings(&["=x"])).is_err());
    }
}
