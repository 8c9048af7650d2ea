//! File-based API client
//!
//! Owns every path under `<build>/.cmake/api/v1` and every marker file
//! written there. Callers never touch the query or reply directories
//! directly.

use crate::config::schema::CmakeConfig;
use crate::error::{QueryError, QueryResult};
use crate::fileapi::kind::ObjectKind;
use crate::fileapi::reply::{CacheEntry, CacheReply, CodeModel, ReplyIndex, TargetFiles};
use crate::fileapi::runner::{CmakeRunner, ProcessRunner};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;
use tracing::{debug, info};

/// API root relative to the build directory
const API_DIR: &str = ".cmake/api/v1";

/// Options for constructing a [`FileApiClient`]
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Top-level source directory (must exist)
    pub source_dir: PathBuf,
    /// Build directory; defaults to `<source>/<build_dir_name>`
    pub build_dir: Option<PathBuf>,
    /// Build directory name used when `build_dir` is unset
    pub build_dir_name: String,
    /// cmake executable name or path; defaults to `cmake`
    pub executable: Option<PathBuf>,
    /// Generator passed as `-G`
    pub generator: Option<String>,
    /// Extra configure arguments
    pub extra_args: Vec<String>,
    /// Configure step timeout
    pub timeout: Option<Duration>,
    /// Re-run cmake before every read, even if the last reply is fresh
    pub always_regenerate: bool,
}

impl ClientOptions {
    /// Defaults for `source_dir`
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        Self::from_config(source_dir, &CmakeConfig::default())
    }

    /// Options for `source_dir` taken from the `[cmake]` config section
    pub fn from_config(source_dir: impl Into<PathBuf>, config: &CmakeConfig) -> Self {
        Self {
            source_dir: source_dir.into(),
            build_dir: None,
            build_dir_name: config.build_dir_name.clone(),
            executable: config.executable.clone(),
            generator: config.generator.clone(),
            extra_args: config.extra_args.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
            always_regenerate: config.always_regenerate,
        }
    }

    pub fn with_build_dir(mut self, build_dir: Option<PathBuf>) -> Self {
        self.build_dir = build_dir;
        self
    }

    pub fn with_always_regenerate(mut self, always: bool) -> Self {
        self.always_regenerate = always;
        self
    }
}

/// A parsed reply index together with where it was read from
#[derive(Debug, Clone)]
pub struct IndexFile {
    pub path: PathBuf,
    pub index: ReplyIndex,
}

/// Client for the CMake file-based API of one source/build directory pair
pub struct FileApiClient {
    runner: Box<dyn CmakeRunner>,
    source_dir: PathBuf,
    build_dir: PathBuf,
    api_dir: PathBuf,
    query_dir: PathBuf,
    reply_dir: PathBuf,
    always_regenerate: bool,
}

impl FileApiClient {
    /// Locate cmake on `PATH` and set up the query directory.
    ///
    /// Fails with [`QueryError::CmakeNotFound`] when cmake cannot be found
    /// and [`QueryError::SourceDirNotFound`] when the source directory does
    /// not exist. Nothing is run in either case.
    pub fn new(options: ClientOptions) -> QueryResult<Self> {
        let name = options
            .executable
            .clone()
            .unwrap_or_else(|| PathBuf::from("cmake"));
        let executable = which::which(&name).map_err(|e| QueryError::CmakeNotFound {
            name: name.display().to_string(),
            source: e,
        })?;
        debug!("Using cmake at {}", executable.display());

        let runner = ProcessRunner::new(executable)
            .with_generator(options.generator.clone())
            .with_extra_args(options.extra_args.clone())
            .with_timeout(options.timeout);

        Self::with_runner(options, Box::new(runner))
    }

    /// Set up a client that configures through `runner`
    pub fn with_runner(options: ClientOptions, runner: Box<dyn CmakeRunner>) -> QueryResult<Self> {
        let source_dir = resolve_source_dir(&options.source_dir)?;

        let build_dir = match options.build_dir {
            Some(ref dir) => std::path::absolute(expand_home(dir))
                .map_err(|e| QueryError::io(format!("resolving {}", dir.display()), e))?,
            None => source_dir.join(&options.build_dir_name),
        };

        let api_dir = build_dir.join(API_DIR);
        let query_dir = api_dir.join("query");
        let reply_dir = api_dir.join("reply");

        std::fs::create_dir_all(&query_dir)
            .map_err(|e| QueryError::io(format!("creating {}", query_dir.display()), e))?;

        debug!(
            "File API client: source={}, build={}",
            source_dir.display(),
            build_dir.display()
        );

        Ok(Self {
            runner,
            source_dir,
            build_dir,
            api_dir,
            query_dir,
            reply_dir,
            always_regenerate: options.always_regenerate,
        })
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    pub fn api_dir(&self) -> &Path {
        &self.api_dir
    }

    pub fn query_dir(&self) -> &Path {
        &self.query_dir
    }

    pub fn reply_dir(&self) -> &Path {
        &self.reply_dir
    }

    pub fn executable(&self) -> &Path {
        self.runner.executable()
    }

    pub fn always_regenerate(&self) -> bool {
        self.always_regenerate
    }

    /// The cmake version reported by the executable
    pub async fn cmake_version(&self) -> QueryResult<String> {
        self.runner.version().await
    }

    /// Ask cmake to include `kind` in the next reply.
    ///
    /// Creates an empty marker file; an existing marker is left alone.
    pub async fn register_query(&self, kind: ObjectKind) -> QueryResult<()> {
        let marker = self.query_dir.join(kind.query_name());

        if fs::try_exists(&marker).await.unwrap_or(false) {
            return Ok(());
        }

        fs::create_dir_all(&self.query_dir)
            .await
            .map_err(|e| QueryError::io(format!("creating {}", self.query_dir.display()), e))?;

        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&marker)
            .await
            .map_err(|e| QueryError::io(format!("creating query {}", marker.display()), e))?;

        debug!("Registered query {}", kind);
        Ok(())
    }

    /// Kinds that currently have a marker in the query directory
    pub async fn registered_queries(&self) -> QueryResult<Vec<ObjectKind>> {
        let mut kinds = Vec::new();
        for kind in ObjectKind::all() {
            if fs::try_exists(self.query_dir.join(kind.query_name()))
                .await
                .unwrap_or(false)
            {
                kinds.push(*kind);
            }
        }
        Ok(kinds)
    }

    /// Run the cmake configure step
    pub async fn generate(&self) -> QueryResult<()> {
        info!("Configuring {}", self.source_dir.display());
        self.runner.generate(&self.source_dir, &self.build_dir).await
    }

    /// Path of the newest `index-*.json`, if any reply has been written
    pub async fn latest_index_path(&self) -> QueryResult<Option<PathBuf>> {
        let mut entries = match fs::read_dir(&self.reply_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(QueryError::io(
                    format!("listing {}", self.reply_dir.display()),
                    e,
                ))
            }
        };

        let mut latest: Option<String> = None;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| QueryError::io(format!("listing {}", self.reply_dir.display()), e))?
        {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if !(name.starts_with("index-") && name.ends_with(".json")) {
                continue;
            }
            // Index names embed a timestamp, so the greatest name is the newest
            if latest.as_ref().map_or(true, |current| name > *current) {
                latest = Some(name);
            }
        }

        Ok(latest.map(|name| self.reply_dir.join(name)))
    }

    /// Read and parse the newest reply index.
    ///
    /// Fails with [`QueryError::NoReply`] if cmake has not written one.
    pub async fn latest_index(&self) -> QueryResult<IndexFile> {
        let path = self
            .latest_index_path()
            .await?
            .ok_or_else(|| QueryError::NoReply(self.reply_dir.clone()))?;

        debug!("Reading reply index {}", path.display());
        let index = read_json(&path).await?;
        Ok(IndexFile { path, index })
    }

    /// Parse a reply file given relative to the reply directory
    pub async fn read_reply_file(&self, relative: &str) -> QueryResult<serde_json::Value> {
        read_json(&self.reply_dir.join(relative)).await
    }

    /// Register `kind`, configure if needed, and return the index to read from
    async fn ensure_reply(&self, kind: ObjectKind) -> QueryResult<IndexFile> {
        self.register_query(kind).await?;

        if !self.always_regenerate {
            if let Some(index) = self.fresh_index(kind).await {
                debug!("Reusing reply {} for {}", index.path.display(), kind);
                return Ok(index);
            }
        }

        self.generate().await?;
        self.latest_index().await
    }

    /// The latest index, if it is newer than `CMakeLists.txt` and already
    /// answers `kind`. Any failure just means "not fresh".
    async fn fresh_index(&self, kind: ObjectKind) -> Option<IndexFile> {
        let path = self.latest_index_path().await.ok()??;

        let index_time = modified(&path).await?;
        let lists_time = modified(&self.source_dir.join("CMakeLists.txt")).await?;
        if index_time <= lists_time {
            debug!("Reply index is older than CMakeLists.txt");
            return None;
        }

        let index: ReplyIndex = read_json(&path).await.ok()?;
        index.has_object(kind).then_some(IndexFile { path, index })
    }

    /// Fetch and parse the reply object for `kind`
    async fn object_as<T: DeserializeOwned>(&self, kind: ObjectKind) -> QueryResult<T> {
        let IndexFile { path, index } = self.ensure_reply(kind).await?;
        let file = index.object_file(kind, &path)?;
        read_json(&self.reply_dir.join(file)).await
    }

    /// Raw reply object for any supported kind
    pub async fn object(&self, kind: ObjectKind) -> QueryResult<serde_json::Value> {
        self.object_as(kind).await
    }

    /// Full cache entries, including type and properties
    pub async fn cache_entries(&self) -> QueryResult<Vec<CacheEntry>> {
        let cache: CacheReply = self.object_as(ObjectKind::Cache).await?;
        Ok(cache.entries)
    }

    /// Cache variables as name -> value, values exactly as cmake reports them
    pub async fn cache(&self) -> QueryResult<BTreeMap<String, String>> {
        let cache: CacheReply = self.object_as(ObjectKind::Cache).await?;
        Ok(cache.into_map())
    }

    /// The code model
    pub async fn codemodel(&self) -> QueryResult<CodeModel> {
        self.object_as(ObjectKind::CodeModel).await
    }

    /// Target detail file paths of the first configuration, relative to
    /// the reply directory
    pub async fn target_json_files(&self) -> QueryResult<TargetFiles> {
        Ok(TargetFiles::new(self.codemodel().await?))
    }

    /// Parsed target detail objects, in code model order
    pub async fn targets(&self) -> QueryResult<Vec<serde_json::Value>> {
        let files = self.target_json_files().await?;
        let mut targets = Vec::with_capacity(files.len());
        for file in &files {
            targets.push(self.read_reply_file(file).await?);
        }
        Ok(targets)
    }

    /// Minimum required cmake version for each source directory
    pub async fn minimum_required(&self) -> QueryResult<BTreeMap<String, String>> {
        Ok(self.codemodel().await?.minimum_required())
    }
}

/// Canonicalize the source directory, rejecting anything that isn't one
fn resolve_source_dir(path: &Path) -> QueryResult<PathBuf> {
    let expanded = expand_home(path);
    match std::fs::canonicalize(&expanded) {
        Ok(dir) if dir.is_dir() => Ok(dir),
        Ok(_) => Err(QueryError::SourceDirNotFound(expanded)),
        Err(e) if e.kind() == IoErrorKind::NotFound => Err(QueryError::SourceDirNotFound(expanded)),
        Err(e) => Err(QueryError::io(
            format!("resolving {}", expanded.display()),
            e,
        )),
    }
}

/// Replace a leading `~` with the home directory
fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    }
}

async fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).await.ok()?.modified().ok()
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> QueryResult<T> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == IoErrorKind::NotFound => {
            return Err(QueryError::ReplyFileMissing(path.to_path_buf()))
        }
        Err(e) => return Err(QueryError::io(format!("reading {}", path.display()), e)),
    };

    serde_json::from_str(&content).map_err(|e| QueryError::malformed(path, e))
}
