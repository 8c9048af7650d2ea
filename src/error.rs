//! Error types for cmake-query
//!
//! All modules use `QueryResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cmake-query operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Coarse classification of a [`QueryError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The cmake executable could not be located
    Environment,
    /// The source directory is missing or unusable
    Path,
    /// The cmake configure step failed, timed out or could not be spawned
    Generation,
    /// The reply directory does not contain what the query asked for
    Protocol,
    /// Invalid configuration file or argument
    Config,
    /// Any other filesystem failure
    Io,
}

/// All errors that can occur in cmake-query
#[derive(Error, Debug)]
pub enum QueryError {
    // Environment errors
    #[error("CMake executable not found: {name}")]
    CmakeNotFound {
        name: String,
        #[source]
        source: which::Error,
    },

    #[error("CMake version check failed: {command}, exit code: {code}\n{output}")]
    VersionCheckFailed {
        command: String,
        code: i32,
        output: String,
    },

    // Path errors
    #[error("Source directory not found: {0}")]
    SourceDirNotFound(PathBuf),

    // Generation errors
    #[error("CMake generation failed: {command}, exit code: {code}\n{output}")]
    GenerationFailed {
        command: String,
        code: i32,
        output: String,
    },

    #[error("CMake generation timed out after {secs}s: {command}")]
    GenerationTimeout { command: String, secs: u64 },

    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // Protocol errors
    #[error("No file-api reply index found in {0}")]
    NoReply(PathBuf),

    #[error("Reply index {index} has no entry for {kind}")]
    ReplyKindMissing { kind: String, index: PathBuf },

    #[error("CMake rejected query {kind}: {message}")]
    ReplyError { kind: String, message: String },

    #[error("Reply file not found: {0}")]
    ReplyFileMissing(PathBuf),

    #[error("Malformed reply file {path}: {source}")]
    ReplyMalformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Unknown object kind: {0}")]
    UnknownKind(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl QueryError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a malformed reply error for `path`
    pub fn malformed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::ReplyMalformed {
            path: path.into(),
            source,
        }
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CmakeNotFound { .. } | Self::VersionCheckFailed { .. } => {
                ErrorKind::Environment
            }
            Self::SourceDirNotFound(_) => ErrorKind::Path,
            Self::GenerationFailed { .. }
            | Self::GenerationTimeout { .. }
            | Self::CommandFailed { .. } => ErrorKind::Generation,
            Self::NoReply(_)
            | Self::ReplyKindMissing { .. }
            | Self::ReplyError { .. }
            | Self::ReplyFileMissing(_)
            | Self::ReplyMalformed { .. } => ErrorKind::Protocol,
            Self::ConfigInvalid { .. } | Self::UnknownKind(_) => ErrorKind::Config,
            Self::Io { .. } | Self::Json(_) | Self::TomlSerialize(_) => ErrorKind::Io,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::CmakeNotFound { .. } => {
                Some("Install CMake 3.14+ or set cmake.executable in the config file")
            }
            Self::VersionCheckFailed { .. } => {
                Some("Check that cmake.executable points at a working CMake install")
            }
            Self::NoReply(_) | Self::ReplyKindMissing { .. } => {
                Some("CMake 3.14 or newer is required for the file-based API")
            }
            Self::GenerationTimeout { .. } => Some("Raise cmake.timeout_secs or pass --timeout"),
            Self::UnknownKind(_) => {
                Some("Supported kinds: cache-v2, codemodel-v2, toolchains-v1, cmakeFiles-v1")
            }
            _ => None,
        }
    }
}
