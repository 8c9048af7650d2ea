//! Configuration schema for cmake-query
//!
//! Configuration is stored at `~/.config/cmake-query/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// CMake invocation settings
    pub cmake: CmakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// CMake invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CmakeConfig {
    /// Explicit cmake executable (name looked up on PATH, or a path)
    pub executable: Option<PathBuf>,

    /// Generator passed as `-G<name>`
    pub generator: Option<String>,

    /// Extra arguments placed before `-S`/`-B`
    pub extra_args: Vec<String>,

    /// Kill cmake after this many seconds (unset = wait forever)
    pub timeout_secs: Option<u64>,

    /// Re-run cmake on every query, even when the last reply is fresh
    pub always_regenerate: bool,

    /// Build directory name under the source directory
    pub build_dir_name: String,
}

impl Default for CmakeConfig {
    fn default() -> Self {
        Self {
            executable: None,
            generator: None,
            extra_args: vec![],
            timeout_secs: None,
            always_regenerate: true,
            build_dir_name: "build".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[cmake]"));
        assert!(toml.contains("always_regenerate = true"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.cmake.always_regenerate);
        assert_eq!(config.cmake.build_dir_name, "build");
        assert_eq!(config.general.log_format, "text");
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [cmake]
            generator = "Ninja"
            extra_args = ["-DCMAKE_BUILD_TYPE=Release"]
            timeout_secs = 120
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cmake.generator.as_deref(), Some("Ninja"));
        assert_eq!(config.cmake.extra_args, vec!["-DCMAKE_BUILD_TYPE=Release"]);
        assert_eq!(config.cmake.timeout_secs, Some(120));
        assert!(config.cmake.always_regenerate); // default preserved
    }
}
