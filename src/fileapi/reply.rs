//! Reply models for the CMake file-based API
//!
//! Only the members this crate reads are typed. Everything else CMake
//! writes is kept in `extra` maps so objects print back out unchanged.

use crate::error::{QueryError, QueryResult};
use crate::fileapi::kind::ObjectKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Contents of a `reply/index-*.json` file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplyIndex {
    /// Information about the cmake that wrote the reply
    #[serde(default)]
    pub cmake: CmakeInfo,

    /// Request name to reply descriptor
    #[serde(default)]
    pub reply: BTreeMap<String, ReplyEntry>,
}

/// One member of the index `reply` map
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReplyEntry {
    /// A reply object written next to the index
    Object(ObjectRef),
    /// CMake did not understand the request
    Error { error: String },
    /// Client-stateful query replies and anything newer than this crate
    Other(Value),
}

/// Reference to a reply object file
#[derive(Debug, Clone, Deserialize)]
pub struct ObjectRef {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub version: ObjectVersion,
    /// Path relative to the reply directory
    #[serde(rename = "jsonFile")]
    pub json_file: String,
}

/// Major/minor version of a reply object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ObjectVersion {
    #[serde(default)]
    pub major: u32,
    #[serde(default)]
    pub minor: u32,
}

/// The index `cmake` member
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CmakeInfo {
    pub version: CmakeVersion,
    pub generator: GeneratorInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CmakeVersion {
    pub string: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeneratorInfo {
    pub name: String,
    #[serde(rename = "multiConfig")]
    pub multi_config: bool,
}

impl ReplyIndex {
    /// Resolve `kind` to its object file, relative to the reply directory.
    ///
    /// `index_path` is only used for error messages.
    pub fn object_file(&self, kind: ObjectKind, index_path: &Path) -> QueryResult<&str> {
        match self.reply.get(kind.query_name()) {
            Some(ReplyEntry::Object(object)) => Ok(object.json_file.as_str()),
            Some(ReplyEntry::Error { error }) => Err(QueryError::ReplyError {
                kind: kind.to_string(),
                message: error.clone(),
            }),
            Some(ReplyEntry::Other(_)) | None => Err(QueryError::ReplyKindMissing {
                kind: kind.to_string(),
                index: index_path.to_path_buf(),
            }),
        }
    }

    /// Whether the index holds a usable reply for `kind`
    pub fn has_object(&self, kind: ObjectKind) -> bool {
        matches!(self.reply.get(kind.query_name()), Some(ReplyEntry::Object(_)))
    }
}

/// A `cache-v2` reply object
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheReply {
    #[serde(default)]
    pub entries: Vec<CacheEntry>,
}

/// A single cache variable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub name: String,
    pub value: String,
    #[serde(rename = "type", default)]
    pub entry_type: String,
    #[serde(default)]
    pub properties: Vec<CacheProperty>,
}

/// A cache entry property such as `HELPSTRING` or `ADVANCED`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheProperty {
    pub name: String,
    pub value: String,
}

impl CacheReply {
    /// Project the entries to name -> value; later duplicates win
    pub fn into_map(self) -> BTreeMap<String, String> {
        self.entries
            .into_iter()
            .map(|entry| (entry.name, entry.value))
            .collect()
    }
}

/// A `codemodel-v2` reply object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeModel {
    #[serde(default)]
    pub paths: CodeModelPaths,
    #[serde(default)]
    pub configurations: Vec<Configuration>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Top-level source and build directories of the code model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeModelPaths {
    pub source: String,
    pub build: String,
}

/// One build configuration (`Debug`, `Release`, or `""` for single-config generators)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub directories: Vec<Directory>,
    #[serde(default)]
    pub targets: Vec<TargetRef>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A source directory that has a `CMakeLists.txt`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Directory {
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub build: String,
    #[serde(
        rename = "minimumCMakeVersion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub minimum_cmake_version: Option<MinimumVersion>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Version given to `cmake_minimum_required()`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MinimumVersion {
    pub string: String,
}

/// A target as listed in a configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
    /// Path of the target detail object, relative to the reply directory
    #[serde(rename = "jsonFile")]
    pub json_file: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CodeModel {
    /// Target detail files of the first configuration, in reply order
    pub fn target_json_files(&self) -> TargetFileIter<'_> {
        let targets = self
            .configurations
            .first()
            .map(|config| config.targets.as_slice())
            .unwrap_or_default();
        TargetFileIter {
            inner: targets.iter(),
        }
    }

    /// Minimum required CMake version for each source directory, across
    /// all configurations. Directories without one are left out.
    pub fn minimum_required(&self) -> BTreeMap<String, String> {
        self.configurations
            .iter()
            .flat_map(|config| &config.directories)
            .filter_map(|dir| {
                dir.minimum_cmake_version
                    .as_ref()
                    .map(|min| (dir.source.clone(), min.string.clone()))
            })
            .collect()
    }
}

/// Iterator over target detail file paths
#[derive(Debug, Clone)]
pub struct TargetFileIter<'a> {
    inner: std::slice::Iter<'a, TargetRef>,
}

impl<'a> Iterator for TargetFileIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|target| target.json_file.as_str())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for TargetFileIter<'_> {}

/// Target detail file paths of a code model
///
/// Owns the code model it was derived from and can be iterated any
/// number of times.
#[derive(Debug, Clone)]
pub struct TargetFiles {
    codemodel: CodeModel,
}

impl TargetFiles {
    pub fn new(codemodel: CodeModel) -> Self {
        Self { codemodel }
    }

    pub fn iter(&self) -> TargetFileIter<'_> {
        self.codemodel.target_json_files()
    }

    pub fn len(&self) -> usize {
        self.iter().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The code model the paths were taken from
    pub fn codemodel(&self) -> &CodeModel {
        &self.codemodel
    }
}

impl<'a> IntoIterator for &'a TargetFiles {
    type Item = &'a str;
    type IntoIter = TargetFileIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
