//! Status command - show cmake and file-api state without configuring

use super::Context;
use crate::cli::args::SourceArgs;
use crate::error::QueryResult;
use crate::fileapi::FileApiClient;
use crate::ui::{self, UiContext};
use console::{style, Emoji};

static CHECK: Emoji<'_, '_> = Emoji("✓ ", "[OK] ");
static CROSS: Emoji<'_, '_> = Emoji("✗ ", "[FAIL] ");
static WARN: Emoji<'_, '_> = Emoji("⚠ ", "[WARN] ");

/// Execute the status command
pub async fn execute(args: SourceArgs, ctx: &Context) -> QueryResult<()> {
    println!("{}", style("cmake-query status").bold().cyan());

    let client = ctx.client(&args.source_dir)?;

    println!();
    println!("{}", style("CMake:").bold());
    println!("  {} Executable: {}", CHECK, client.executable().display());
    match client.cmake_version().await {
        Ok(version) => println!("  {} Version: {}", CHECK, version),
        Err(e) => println!("  {} {} - {}", CROSS, style("Version check failed").red(), e),
    }

    println!();
    println!("{}", style("Directories:").bold());
    let ui_ctx = UiContext::detect();
    let dirs = [
        ("Source", client.source_dir()),
        ("Build", client.build_dir()),
        ("Query", client.query_dir()),
        ("Reply", client.reply_dir()),
    ];
    for (name, path) in dirs {
        ui::key_value(&ui_ctx, name, &path.display().to_string());
    }

    print_queries(&client).await?;
    print_reply(&client).await?;

    println!();
    println!("{}", style("Settings:").bold());
    println!(
        "  Regenerate: {}",
        if client.always_regenerate() {
            "always"
        } else {
            "when CMakeLists.txt changes"
        }
    );
    print!("{}", toml::to_string_pretty(&ctx.config.cmake)?);

    Ok(())
}

async fn print_queries(client: &FileApiClient) -> QueryResult<()> {
    println!();
    println!("{}", style("Registered queries:").bold());

    let kinds = client.registered_queries().await?;
    if kinds.is_empty() {
        println!("  {} none", WARN);
    }
    for kind in kinds {
        println!("  {} {}", CHECK, kind);
    }
    Ok(())
}

async fn print_reply(client: &FileApiClient) -> QueryResult<()> {
    println!();
    println!("{}", style("Latest reply:").bold());

    let Some(path) = client.latest_index_path().await? else {
        println!("  {} {} - run any query command", WARN, style("None yet").yellow());
        return Ok(());
    };

    match client.latest_index().await {
        Ok(file) => {
            println!("  {} Index: {}", CHECK, path.display());
            let cmake = &file.index.cmake;
            if !cmake.version.string.is_empty() {
                println!("  Written by cmake {}", cmake.version.string);
            }
            if !cmake.generator.name.is_empty() {
                println!(
                    "  Generator: {}{}",
                    cmake.generator.name,
                    if cmake.generator.multi_config {
                        " (multi-config)"
                    } else {
                        ""
                    }
                );
            }
            for kind in file.index.reply.keys() {
                println!("  Reply: {}", kind);
            }
        }
        Err(e) => println!("  {} {} - {}", CROSS, style("Unreadable index").red(), e),
    }
    Ok(())
}
