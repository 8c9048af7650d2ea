//! Output functions for consistent CLI formatting

use super::context::UiContext;
use crate::cli::args::OutputFormat;
use crate::error::QueryResult;
use console::style;
use serde::Serialize;
use std::collections::BTreeMap;

/// Keys longer than this don't widen the table
const MAX_KEY_WIDTH: usize = 48;

/// Display a section header
pub fn header(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        println!("{}", style(title).cyan().bold());
    } else {
        println!("{}", title);
    }
}

/// Print an indented key-value pair
pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    if ctx.use_fancy_output() {
        println!("  {}: {}", style(key).dim(), value);
    } else {
        println!("  {}: {}", key, value);
    }
}

/// Pretty-print any serializable value as JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> QueryResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print a name -> value mapping in the requested format
pub fn print_mapping(
    ctx: &UiContext,
    title: &str,
    map: &BTreeMap<String, String>,
    format: OutputFormat,
) -> QueryResult<()> {
    match format {
        OutputFormat::Json => print_json(map)?,
        OutputFormat::Plain => {
            for (key, value) in map {
                println!("{}={}", key, value);
            }
        }
        OutputFormat::Table => {
            header(ctx, title);
            for line in table_lines(map) {
                println!("{}", line);
            }
            println!();
            println!("{} entries", map.len());
        }
    }
    Ok(())
}

fn table_lines(map: &BTreeMap<String, String>) -> Vec<String> {
    let width = map
        .keys()
        .map(|k| k.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_KEY_WIDTH);

    map.iter()
        .map(|(key, value)| format!("  {:<width$}  {}", key, value, width = width))
        .collect()
}
