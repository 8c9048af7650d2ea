//! CLI command implementations

pub mod cache;
pub mod codemodel;
pub mod minimum_required;
pub mod object;
pub mod status;
pub mod targets;

pub use cache::execute as cache;
pub use codemodel::execute as codemodel;
pub use minimum_required::execute as minimum_required;
pub use object::execute as object;
pub use status::execute as status;
pub use targets::execute as targets;

use crate::config::Config;
use crate::error::QueryResult;
use crate::fileapi::{ClientOptions, FileApiClient};
use std::path::{Path, PathBuf};

/// Settings shared by every command
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Loaded configuration with command-line overrides applied
    pub config: Config,
    /// Build directory from `--build-dir`
    pub build_dir: Option<PathBuf>,
}

impl Context {
    /// Open a file-api client for `source_dir`
    pub fn client(&self, source_dir: &Path) -> QueryResult<FileApiClient> {
        let options = ClientOptions::from_config(source_dir, &self.config.cmake)
            .with_build_dir(self.build_dir.clone());
        FileApiClient::new(options)
    }
}
