//! cmake-query - CMake file-based API client
//!
//! Declares file-api queries, runs the cmake configure step and reads the
//! cache, code model and target replies it produces.

pub mod cli;
pub mod config;
pub mod error;
pub mod fileapi;
pub mod ui;

pub use error::{ErrorKind, QueryError, QueryResult};
pub use fileapi::{ClientOptions, FileApiClient, ObjectKind};
