//! Object command - print any reply object as cmake wrote it

use super::Context;
use crate::cli::args::ObjectArgs;
use crate::error::QueryResult;
use crate::ui;

/// Execute the object command
pub async fn execute(args: ObjectArgs, ctx: &Context) -> QueryResult<()> {
    let client = ctx.client(&args.source_dir)?;
    let object = client.object(args.kind).await?;

    ui::print_json(&object)
}
