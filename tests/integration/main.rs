//! Integration tests for cmake-query

/// A temporary CMake project plus a config file pointing at a stand-in cmake
#[cfg(unix)]
mod fixture {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Parses -S/-B like cmake and writes a canned file-api reply
    const FAKE_CMAKE: &str = r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    --version) echo "cmake version 3.28.3"; exit 0 ;;
    -B*) build="${arg#-B}" ;;
  esac
done
echo "-- Configuring done"
echo "-- Generating done" >&2
reply="$build/.cmake/api/v1/reply"
mkdir -p "$reply"
cat > "$reply/cache-v2-0a1b.json" <<'JSON'
{"kind":"cache","version":{"major":2,"minor":0},"entries":[
 {"name":"CMAKE_GENERATOR","value":"Unix Makefiles","type":"INTERNAL","properties":[]},
 {"name":"hello_BINARY_DIR","value":"/tmp/hello/build","type":"STATIC","properties":[]}]}
JSON
cat > "$reply/codemodel-v2-2c3d.json" <<'JSON'
{"kind":"codemodel","version":{"major":2,"minor":6},
 "paths":{"source":"/tmp/hello","build":"/tmp/hello/build"},
 "configurations":[{"name":"",
  "directories":[{"source":".","build":".","minimumCMakeVersion":{"string":"3.14"}}],
  "targets":[{"name":"hello","id":"hello::@6890427a1f51a3e7e1df","jsonFile":"target-hello-4e5f.json"}]}]}
JSON
cat > "$reply/target-hello-4e5f.json" <<'JSON'
{"name":"hello","id":"hello::@6890427a1f51a3e7e1df","type":"UTILITY","paths":{"source":".","build":"."}}
JSON
cat > "$reply/index-2024-05-01T12-00-00-0000.json" <<'JSON'
{"cmake":{"version":{"string":"3.28.3"},"generator":{"name":"Unix Makefiles","multiConfig":false}},
 "objects":[],
 "reply":{
  "cache-v2":{"kind":"cache","version":{"major":2,"minor":0},"jsonFile":"cache-v2-0a1b.json"},
  "codemodel-v2":{"kind":"codemodel","version":{"major":2,"minor":6},"jsonFile":"codemodel-v2-2c3d.json"},
  "toolchains-v1":{"error":"unknown request kind 'toolchains'"}}}
JSON
"#;

    const FAILING_CMAKE: &str = r#"#!/bin/sh
case "$1" in
  --version) echo "cmake version 3.28.3"; exit 0 ;;
esac
echo "CMake Error at CMakeLists.txt:3 (add_executable): boom" >&2
exit 1
"#;

    pub struct Project {
        pub dir: TempDir,
        pub config: PathBuf,
    }

    impl Project {
        pub fn with_fake_cmake() -> Self {
            Self::new(FAKE_CMAKE)
        }

        pub fn with_failing_cmake() -> Self {
            Self::new(FAILING_CMAKE)
        }

        fn new(script: &str) -> Self {
            let dir = TempDir::new().unwrap();
            std::fs::write(
                dir.path().join("CMakeLists.txt"),
                "cmake_minimum_required(VERSION 3.14)\nproject(hello NONE)\nadd_custom_target(hello)\n",
            )
            .unwrap();

            let tools = dir.path().join("tools");
            std::fs::create_dir(&tools).unwrap();
            let exe = tools.join("cmake");
            std::fs::write(&exe, script).unwrap();
            std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

            let config = write_config(dir.path(), &exe);
            Self { dir, config }
        }

        pub fn path(&self) -> &Path {
            self.dir.path()
        }
    }

    pub fn write_config(dir: &Path, executable: &Path) -> PathBuf {
        let config = dir.join("cmake-query.toml");
        std::fs::write(
            &config,
            format!("[cmake]\nexecutable = \"{}\"\n", executable.display()),
        )
        .unwrap();
        config
    }
}

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn cmake_query() -> Command {
        cargo_bin_cmd!("cmake-query")
    }

    #[test]
    fn help_displays() {
        cmake_query()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("file-based API"));
    }

    #[test]
    fn version_displays() {
        cmake_query()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("cmake-query"));
    }

    #[test]
    fn source_dir_required() {
        cmake_query()
            .arg("cache")
            .assert()
            .failure()
            .stderr(predicate::str::contains("SOURCE_DIR"));
    }

    #[test]
    fn unknown_object_kind() {
        cmake_query()
            .args(["object", "bogus-v9", "."])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown object kind"));
    }

    #[test]
    fn invalid_config_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = temp.path().join("bad.toml");
        std::fs::write(&config, "[cmake\n").unwrap();

        cmake_query()
            .arg("--config")
            .arg(&config)
            .args(["cache", "."])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn missing_cmake() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = temp.path().join("config.toml");
        std::fs::write(
            &config,
            "[cmake]\nexecutable = \"cmake-query-no-such-cmake-binary\"\n",
        )
        .unwrap();

        cmake_query()
            .arg("--config")
            .arg(&config)
            .arg("cache")
            .arg(temp.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("CMake executable not found"))
            .stderr(predicate::str::contains("Hint:"));
    }
}

#[cfg(unix)]
mod fake_cmake_tests {
    use super::fixture::Project;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn cmake_query(project: &Project) -> Command {
        let mut cmd = cargo_bin_cmd!("cmake-query");
        cmd.arg("--config").arg(&project.config);
        cmd
    }

    #[test]
    fn missing_source_dir() {
        let project = Project::with_fake_cmake();
        let missing = project.path().join("does-not-exist");

        cmake_query(&project)
            .arg("cache")
            .arg(&missing)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Source directory not found"));

        assert!(!missing.exists());
    }

    #[test]
    fn cache_table() {
        let project = Project::with_fake_cmake();

        cmake_query(&project)
            .arg("cache")
            .arg(project.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("CMAKE_GENERATOR"))
            .stdout(predicate::str::contains("Unix Makefiles"))
            .stdout(predicate::str::contains("2 entries"))
            .stdout(predicate::str::contains("Configuring done").not())
            .stderr(predicate::str::contains("Configuring done"));

        let marker = project.path().join("build/.cmake/api/v1/query/cache-v2");
        assert!(marker.is_file());
    }

    #[test]
    fn cache_json() {
        let project = Project::with_fake_cmake();

        let output = cmake_query(&project)
            .args(["cache", "--format", "json"])
            .arg(project.path())
            .output()
            .unwrap();
        assert!(output.status.success());

        let cache: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(cache["CMAKE_GENERATOR"], "Unix Makefiles");
        assert_eq!(cache["hello_BINARY_DIR"], "/tmp/hello/build");
    }

    #[test]
    fn minimum_required_plain() {
        let project = Project::with_fake_cmake();

        cmake_query(&project)
            .args(["minimum-required", "--format", "plain"])
            .arg(project.path())
            .assert()
            .success()
            .stdout(predicate::eq(".=3.14\n"));
    }

    #[test]
    fn targets_prints_details() {
        let project = Project::with_fake_cmake();

        let output = cmake_query(&project)
            .arg("targets")
            .arg(project.path())
            .output()
            .unwrap();
        assert!(output.status.success());

        let targets: Vec<serde_json::Value> = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0]["name"], "hello");
        assert_eq!(targets[0]["type"], "UTILITY");
    }

    #[test]
    fn codemodel_prints_raw() {
        let project = Project::with_fake_cmake();

        let output = cmake_query(&project)
            .arg("codemodel")
            .arg(project.path())
            .output()
            .unwrap();
        assert!(output.status.success());

        let model: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(model["kind"], "codemodel");
        assert_eq!(model["configurations"][0]["targets"][0]["name"], "hello");

        // Nothing added or dropped relative to the file cmake wrote
        let written = std::fs::read(
            project
                .path()
                .join("build/.cmake/api/v1/reply/codemodel-v2-2c3d.json"),
        )
        .unwrap();
        let written: serde_json::Value = serde_json::from_slice(&written).unwrap();
        assert_eq!(model, written);
    }

    #[test]
    fn object_rejected_by_cmake() {
        let project = Project::with_fake_cmake();

        cmake_query(&project)
            .args(["object", "toolchains-v1"])
            .arg(project.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("CMake rejected query toolchains-v1"));
    }

    #[test]
    fn object_missing_from_reply() {
        let project = Project::with_fake_cmake();

        cmake_query(&project)
            .args(["object", "cmakeFiles-v1"])
            .arg(project.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("has no entry for cmakeFiles-v1"));
    }

    #[test]
    fn custom_build_dir() {
        let project = Project::with_fake_cmake();
        let out = tempfile::TempDir::new().unwrap();

        cmake_query(&project)
            .arg("-B")
            .arg(out.path())
            .args(["cache", "--format", "plain"])
            .arg(project.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("CMAKE_GENERATOR=Unix Makefiles"));

        assert!(out.path().join(".cmake/api/v1/reply").is_dir());
        assert!(!project.path().join("build").exists());
    }

    #[test]
    fn generation_failure() {
        let project = Project::with_failing_cmake();

        cmake_query(&project)
            .arg("cache")
            .arg(project.path())
            .assert()
            .failure()
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("CMake generation failed"))
            .stderr(predicate::str::contains("boom"));
    }

    #[test]
    fn status_without_reply() {
        let project = Project::with_fake_cmake();

        cmake_query(&project)
            .arg("status")
            .arg(project.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("3.28.3"))
            .stdout(predicate::str::contains("None yet"))
            .stdout(predicate::str::contains(format!(
                "  Build: {}",
                project.path().canonicalize().unwrap().join("build").display()
            )));

        assert!(!project.path().join("build/.cmake/api/v1/reply").exists());
    }

    #[test]
    fn status_after_query() {
        let project = Project::with_fake_cmake();

        cmake_query(&project)
            .arg("cache")
            .arg(project.path())
            .assert()
            .success();

        cmake_query(&project)
            .arg("status")
            .arg(project.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("cache-v2"))
            .stdout(predicate::str::contains("Unix Makefiles"));
    }
}

/// Runs against a real cmake; skipped when none is installed
mod real_cmake_tests {
    use cmake_query::{ClientOptions, FileApiClient};
    use tempfile::TempDir;

    fn hello_project() -> Option<TempDir> {
        // The default generator needs a build tool even for a language-less project
        let have_build_tool = which::which("make").is_ok() || which::which("ninja").is_ok();
        if which::which("cmake").is_err() || !have_build_tool {
            eprintln!("cmake or a build tool is not on PATH, skipping");
            return None;
        }

        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("CMakeLists.txt"),
            "cmake_minimum_required(VERSION 3.14)\nproject(hello NONE)\nadd_custom_target(hello)\n",
        )
        .unwrap();
        Some(dir)
    }

    #[tokio::test]
    async fn hello_end_to_end() {
        let Some(project) = hello_project() else {
            return;
        };
        let client = FileApiClient::new(ClientOptions::new(project.path())).unwrap();

        let cache = client.cache().await.unwrap();
        assert!(cache.contains_key("CMAKE_GENERATOR"));
        assert!(cache.contains_key("hello_BINARY_DIR"));

        let files = client.target_json_files().await.unwrap();
        let paths: Vec<_> = files.iter().collect();
        assert_eq!(paths.len(), 1);

        let target = client.read_reply_file(paths[0]).await.unwrap();
        assert_eq!(target["name"], "hello");

        let minver = client.minimum_required().await.unwrap();
        assert_eq!(minver.get("."), Some(&"3.14".to_string()));
    }
}
