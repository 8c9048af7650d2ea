//! Codemodel command - print the raw code model

use super::Context;
use crate::cli::args::SourceArgs;
use crate::error::QueryResult;
use crate::fileapi::ObjectKind;
use crate::ui;

/// Execute the codemodel command
pub async fn execute(args: SourceArgs, ctx: &Context) -> QueryResult<()> {
    let client = ctx.client(&args.source_dir)?;
    // Untyped, so members cmake omitted are not filled in with defaults
    let codemodel = client.object(ObjectKind::CodeModel).await?;

    ui::print_json(&codemodel)
}
