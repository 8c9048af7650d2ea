//! Object kinds understood by the CMake file-based API

use crate::error::QueryError;
use std::fmt;
use std::str::FromStr;

/// A request kind, named the way CMake expects it in the query directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    /// Cache variables (`cache-v2`)
    Cache,
    /// Configurations, directories and targets (`codemodel-v2`)
    CodeModel,
    /// Compilers per enabled language (`toolchains-v1`)
    Toolchains,
    /// Files CMake read while configuring (`cmakeFiles-v1`)
    CmakeFiles,
}

impl ObjectKind {
    /// Marker file name, also the key of the index `reply` map
    pub fn query_name(&self) -> &'static str {
        match self {
            Self::Cache => "cache-v2",
            Self::CodeModel => "codemodel-v2",
            Self::Toolchains => "toolchains-v1",
            Self::CmakeFiles => "cmakeFiles-v1",
        }
    }

    /// All kinds, in the order they are listed to users
    pub fn all() -> &'static [Self] {
        &[
            Self::Cache,
            Self::CodeModel,
            Self::Toolchains,
            Self::CmakeFiles,
        ]
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.query_name())
    }
}

impl FromStr for ObjectKind {
    type Err = QueryError;

    /// Accepts the full query name (`cache-v2`) or the bare kind (`cache`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .copied()
            .find(|kind| {
                let name = kind.query_name();
                let bare = name.rsplit_once('-').map_or(name, |(bare, _)| bare);
                wanted == name || wanted.eq_ignore_ascii_case(bare)
            })
            .ok_or_else(|| QueryError::UnknownKind(s.to_string()))
    }
}
