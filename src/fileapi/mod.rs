//! Client for the CMake file-based API
//!
//! A query is declared by dropping empty marker files into
//! `<build>/.cmake/api/v1/query/`. The next configure run makes cmake write
//! `reply/index-*.json` plus one JSON object per requested kind.
//!
//! See <https://cmake.org/cmake/help/latest/manual/cmake-file-api.7.html>.

mod client;
pub mod kind;
pub mod reply;
mod runner;

pub use client::{ClientOptions, FileApiClient, IndexFile};
pub use kind::ObjectKind;
pub use reply::{CacheEntry, CodeModel, ReplyIndex, TargetFiles};
pub use runner::{CmakeRunner, ProcessRunner};
