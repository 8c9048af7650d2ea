//! CLI argument definitions using clap derive

use crate::fileapi::ObjectKind;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// cmake-query - read CMake's file-based API
///
/// Registers file-api queries in the build directory, runs the cmake
/// configure step and prints what cmake reports back.
#[derive(Parser, Debug)]
#[command(name = "cmake-query")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "CMAKE_QUERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Build directory (defaults to <SOURCE_DIR>/build)
    #[arg(short = 'B', long, global = true)]
    pub build_dir: Option<PathBuf>,

    /// Reuse the last reply when it is newer than CMakeLists.txt
    #[arg(long, global = true)]
    pub reuse_reply: bool,

    /// Kill cmake after this many seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print cache variables
    Cache(MappingArgs),

    /// Print cmake_minimum_required(VERSION) of every source directory
    MinimumRequired(MappingArgs),

    /// Print the detail object of every target
    Targets(SourceArgs),

    /// Print the raw code model
    Codemodel(SourceArgs),

    /// Print the raw reply object of any supported kind
    Object(ObjectArgs),

    /// Show cmake and file-api state without configuring
    Status(SourceArgs),
}

/// Arguments shared by every command
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Top level source directory of the CMake project
    pub source_dir: PathBuf,
}

/// Arguments for commands that print a name -> value mapping
#[derive(Args, Debug)]
pub struct MappingArgs {
    /// Top level source directory of the CMake project
    pub source_dir: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the object command
#[derive(Args, Debug)]
pub struct ObjectArgs {
    /// Object kind (cache-v2, codemodel-v2, toolchains-v1, cmakeFiles-v1)
    #[arg(value_parser = parse_kind)]
    pub kind: ObjectKind,

    /// Top level source directory of the CMake project
    pub source_dir: PathBuf,
}

/// Output format for mappings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned two-column table
    Table,
    /// JSON object
    Json,
    /// NAME=VALUE, one per line
    Plain,
}

/// Parse an object kind name
fn parse_kind(s: &str) -> Result<ObjectKind, String> {
    s.parse().map_err(|e: crate::error::QueryError| e.to_string())
}
