//! Terminal output helpers
//!
//! Styled headers and aligned tables on a terminal, plain text when stdout
//! is piped so the output stays easy to post-process.

mod context;
mod output;

pub use context::UiContext;
pub use output::{header, key_value, print_json, print_mapping};
