//! Catalog response parsing and item enrichment.

use marketprobe_core::error::json_kind;
use serde_json::Value;
use tracing::debug;

use crate::endpoints::FEEDBACK_SUFFIX;
use crate::error::CatalogError;

/// Returns the `items` list of a listing response.
pub fn page_items(response: &Value) -> Result<&[Value], CatalogError> {
    let items = response.get("items").ok_or(CatalogError::MissingItems)?;
    items
        .as_array()
        .map(Vec::as_slice)
        .ok_or(CatalogError::ItemsNotArray(json_kind(items)))
}

/// Returns the `item` record of a detail response.
pub fn detail_item(response: &Value) -> Result<&Value, CatalogError> {
    match response.get("item") {
        Some(Value::Null) | None => Err(CatalogError::MissingItem),
        Some(item) => Ok(item),
    }
}

/// One page after enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedPage {
    /// Items kept, in page order.
    pub items: Vec<Value>,
    /// Why the rest of the page was dropped, if it was.
    pub truncated: Option<CatalogError>,
}

/// Adds `user.feedback_url` to every item of a page.
///
/// Items that are not objects or have no seller pass through untouched.
/// The first item whose seller lacks a string `profile_url` ends the page:
/// it and every later item are dropped.
pub fn enrich_page(items: &[Value]) -> EnrichedPage {
    let mut kept = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let mut item = item.clone();
        if let Err(e) = enrich_item(&mut item, index) {
            debug!(index, dropped = items.len() - index, "Truncating page");
            return EnrichedPage {
                items: kept,
                truncated: Some(e),
            };
        }
        kept.push(item);
    }

    EnrichedPage {
        items: kept,
        truncated: None,
    }
}

fn enrich_item(item: &mut Value, index: usize) -> Result<(), CatalogError> {
    let Some(user) = item.as_object_mut().and_then(|o| o.get_mut("user")) else {
        return Ok(());
    };
    if user.is_null() {
        return Ok(());
    }

    let profile_url = user
        .get("profile_url")
        .and_then(Value::as_str)
        .ok_or(CatalogError::MissingProfileUrl { index })?;
    let feedback_url = format!("{profile_url}{FEEDBACK_SUFFIX}");

    if let Some(user) = user.as_object_mut() {
        user.insert("feedback_url".to_string(), Value::String(feedback_url));
    }
    Ok(())
}
