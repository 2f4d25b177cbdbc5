//! Text output formatting with colors.

use chrono::Local;
use marketprobe_core::{SearchResult, StopReason};
use serde_json::Value;

use super::json::SessionOutput;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats a search result, listing at most `show` items.
    pub fn format_search(&self, result: &SearchResult, show: Option<usize>) -> String {
        let mut lines = Vec::new();

        let fetched_at = result.fetched_at.with_timezone(&Local);
        lines.push(format!(
            "{} {}",
            self.bold(&format!("{} items", result.len())),
            self.dim(&format!(
                "({} pages, {})",
                result.pages_fetched,
                fetched_at.format("%H:%M:%S")
            ))
        ));
        lines.push(self.format_stop_reason(result.stop_reason));
        if result.dropped() > 0 {
            lines.push(self.yellow(&format!(
                "{} of {} items dropped",
                result.dropped(),
                result.raw_count
            )));
        }
        lines.push(String::new());

        let limit = show.unwrap_or(usize::MAX);
        for item in result.items.iter().take(limit) {
            lines.push(self.format_item_line(item));
        }
        if result.len() > limit {
            lines.push(self.dim(&format!("… {} more", result.len() - limit)));
        }

        lines.join("\n") + "\n"
    }

    /// Formats one item in detail.
    pub fn format_item(&self, item: &Value) -> String {
        let mut lines = vec![self.format_item_line(item)];

        if let Some(url) = item.get("url").and_then(Value::as_str) {
            lines.push(format!("  URL:      {url}"));
        }
        if let Some(user) = item.get("user").filter(|u| u.is_object()) {
            if let Some(login) = user.get("login").and_then(Value::as_str) {
                lines.push(format!("  Seller:   {login}"));
            }
            if let Some(feedback) = user.get("feedback_url").and_then(Value::as_str) {
                lines.push(format!("  Feedback: {feedback}"));
            }
        }

        lines.join("\n") + "\n"
    }

    /// Formats the credentials a client is using.
    pub fn format_session(&self, session: &SessionOutput) -> String {
        let mut lines = vec![self.bold(&session.host), "─".repeat(40)];

        let missing = self.dim("none");
        lines.push(format!(
            "Identity: {}",
            session.identity.as_deref().map_or_else(|| missing.clone(), str::to_string)
        ));
        lines.push(format!(
            "Proxy:    {}",
            session.proxy.as_deref().map_or_else(|| missing.clone(), str::to_string)
        ));
        let token = match &session.token {
            Some(token) => self.green(&format!("{}{token}", session.cookie_prefix)),
            None => self.red("not negotiated"),
        };
        lines.push(format!("Token:    {token}"));

        lines.join("\n") + "\n"
    }

    /// One-line item summary: id, title and price.
    fn format_item_line(&self, item: &Value) -> String {
        let id = match item.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => "?".to_string(),
        };
        let title = item
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("(untitled)");

        match item.get("price").and_then(format_price) {
            Some(price) => format!("{} {title} {}", self.dim(&id), self.cyan(&price)),
            None => format!("{} {title}", self.dim(&id)),
        }
    }

    fn format_stop_reason(&self, reason: StopReason) -> String {
        let text = match reason {
            StopReason::PageLimit => "Stopped at page limit",
            StopReason::LastPage => "Reached last page",
            StopReason::EmptyResponse => "Stopped on failed request",
            StopReason::MalformedResponse => "Stopped on malformed response",
        };
        if reason.is_clean() {
            self.dim(text)
        } else {
            self.red(text)
        }
    }

    // ========================================================================
    // Color helpers
    // ========================================================================

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Prices come either as a bare amount or as `{amount, currency_code}`.
fn format_price(price: &Value) -> Option<String> {
    match price {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => {
            let amount = match obj.get("amount")? {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            match obj.get("currency_code").and_then(Value::as_str) {
                Some(currency) => Some(format!("{amount} {currency}")),
                None => Some(amount),
            }
        }
        _ => None,
    }
}
