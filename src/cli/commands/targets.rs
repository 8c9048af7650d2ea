//! Targets command - print every target's detail object

use super::Context;
use crate::cli::args::SourceArgs;
use crate::error::QueryResult;
use crate::ui;
use tracing::info;

/// Execute the targets command
pub async fn execute(args: SourceArgs, ctx: &Context) -> QueryResult<()> {
    let client = ctx.client(&args.source_dir)?;
    let targets = client.targets().await?;

    info!("{} target(s)", targets.len());
    ui::print_json(&targets)
}
