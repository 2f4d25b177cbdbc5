//! Output formatting for CLI.

mod json;
mod text;

pub use json::{JsonFormatter, SessionOutput};
pub use text::TextFormatter;
