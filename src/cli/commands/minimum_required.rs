//! Minimum-required command - print cmake_minimum_required() per directory

use super::Context;
use crate::cli::args::MappingArgs;
use crate::error::QueryResult;
use crate::ui::{self, UiContext};
use tracing::warn;

/// Execute the minimum-required command
pub async fn execute(args: MappingArgs, ctx: &Context) -> QueryResult<()> {
    let client = ctx.client(&args.source_dir)?;
    let minver = client.minimum_required().await?;

    if minver.is_empty() {
        warn!("No directory declares cmake_minimum_required()");
    }

    ui::print_mapping(
        &UiContext::detect(),
        "Minimum required CMake version",
        &minver,
        args.format,
    )
}
