//! Cache command - print cache variables

use super::Context;
use crate::cli::args::MappingArgs;
use crate::error::QueryResult;
use crate::ui::{self, UiContext};

/// Execute the cache command
pub async fn execute(args: MappingArgs, ctx: &Context) -> QueryResult<()> {
    let client = ctx.client(&args.source_dir)?;
    let cache = client.cache().await?;

    ui::print_mapping(&UiContext::detect(), "CMake cache", &cache, args.format)
}
