//! Running the cmake configure step
//!
//! The client only talks to cmake through [`CmakeRunner`], so tests can
//! swap in a runner that writes canned replies.

use crate::error::{QueryError, QueryResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Split};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

/// Max number of output lines to include in generation error messages.
const ERROR_TAIL_LINES: usize = 50;

/// Abstract cmake invocation
#[async_trait]
pub trait CmakeRunner: Send + Sync {
    /// Configure `source_dir` into `build_dir`, returning once cmake exits
    async fn generate(&self, source_dir: &Path, build_dir: &Path) -> QueryResult<()>;

    /// Report the cmake version string (e.g. "3.28.3")
    async fn version(&self) -> QueryResult<String>;

    /// Path of the executable being run
    fn executable(&self) -> &Path;
}

/// Runs a real cmake executable as a child process
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    executable: PathBuf,
    generator: Option<String>,
    extra_args: Vec<String>,
    timeout: Option<Duration>,
}

impl ProcessRunner {
    /// Create a runner for an already resolved executable
    pub fn new(executable: PathBuf) -> Self {
        Self {
            executable,
            generator: None,
            extra_args: vec![],
            timeout: None,
        }
    }

    /// Pass `-G<generator>` on every run
    pub fn with_generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator;
        self
    }

    /// Extra arguments placed before `-S`/`-B`
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Kill cmake if it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full argument list for a configure run
    pub fn generate_args(&self, source_dir: &Path, build_dir: &Path) -> Vec<String> {
        let mut args = Vec::with_capacity(self.extra_args.len() + 3);

        if let Some(ref generator) = self.generator {
            args.push(format!("-G{}", generator));
        }
        args.extend(self.extra_args.iter().cloned());
        args.push(format!("-S{}", source_dir.display()));
        args.push(format!("-B{}", build_dir.display()));

        args
    }

    fn command_line(&self, args: &[String]) -> String {
        let mut line = self.executable.display().to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

#[async_trait]
impl CmakeRunner for ProcessRunner {
    async fn generate(&self, source_dir: &Path, build_dir: &Path) -> QueryResult<()> {
        let args = self.generate_args(source_dir, build_dir);
        let command = self.command_line(&args);
        info!("Running: {}", command);

        let mut child = Command::new(&self.executable)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| QueryError::command_failed(command.clone(), e))?;

        // cmake's own diagnostics go to our stderr so stdout stays parseable
        let echo = |line: String| eprintln!("{}", line);

        let (output, status) = match self.timeout {
            Some(limit) => {
                let outcome = tokio::time::timeout(limit, wait_with_output(&mut child, &echo)).await;
                match outcome {
                    Ok(done) => done,
                    Err(_) => {
                        warn!("cmake exceeded {}s, killing it", limit.as_secs());
                        if let Err(e) = child.kill().await {
                            debug!("Failed to kill cmake: {}", e);
                        }
                        return Err(QueryError::GenerationTimeout {
                            command,
                            secs: limit.as_secs(),
                        });
                    }
                }
            }
            None => wait_with_output(&mut child, &echo).await,
        };

        let status = status.map_err(|e| QueryError::command_failed(command.clone(), e))?;

        if status.success() {
            debug!("cmake finished ({} lines of output)", output.len());
            Ok(())
        } else {
            Err(QueryError::GenerationFailed {
                command,
                code: status.code().unwrap_or(-1),
                output: output_tail(&output),
            })
        }
    }

    async fn version(&self) -> QueryResult<String> {
        let command = format!("{} --version", self.executable.display());

        let output = Command::new(&self.executable)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| QueryError::command_failed(command.clone(), e))?;

        if !output.status.success() {
            return Err(QueryError::VersionCheckFailed {
                command,
                code: output.status.code().unwrap_or(-1),
                output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(parse_version(&String::from_utf8_lossy(&output.stdout)))
    }

    fn executable(&self) -> &Path {
        &self.executable
    }
}

/// Pull the version number out of `cmake --version` output.
///
/// Falls back to the whole first line for unexpected formats.
pub(crate) fn parse_version(stdout: &str) -> String {
    let first = stdout.lines().next().unwrap_or_default().trim();
    first
        .strip_prefix("cmake version ")
        .unwrap_or(first)
        .to_string()
}

/// Keep the last `ERROR_TAIL_LINES` lines of collected output.
pub(crate) fn output_tail(lines: &[String]) -> String {
    let start = lines.len().saturating_sub(ERROR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Stream a child's stdout and stderr line by line, then reap it.
///
/// Every line is handed to `on_output` as it arrives and also collected
/// for error reporting. Both pipes are drained to EOF; bytes that are not
/// valid UTF-8 are replaced rather than ending the stream.
async fn wait_with_output(
    child: &mut Child,
    on_output: &(dyn Fn(String) + Send + Sync),
) -> (Vec<String>, std::io::Result<ExitStatus>) {
    let mut stderr_reader = child.stderr.take().map(|s| BufReader::new(s).split(b'\n'));
    let mut stdout_reader = child.stdout.take().map(|s| BufReader::new(s).split(b'\n'));

    let mut all_output = Vec::new();
    let mut stderr_done = stderr_reader.is_none();
    let mut stdout_done = stdout_reader.is_none();

    while !stderr_done || !stdout_done {
        tokio::select! {
            line = next_line(&mut stderr_reader), if !stderr_done => {
                match line {
                    Some(line) => {
                        on_output(line.clone());
                        all_output.push(line);
                    }
                    None => stderr_done = true,
                }
            }
            line = next_line(&mut stdout_reader), if !stdout_done => {
                match line {
                    Some(line) => {
                        on_output(line.clone());
                        all_output.push(line);
                    }
                    None => stdout_done = true,
                }
            }
        }
    }

    let status = child.wait().await;
    (all_output, status)
}

async fn next_line<R>(reader: &mut Option<Split<BufReader<R>>>) -> Option<String>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let segments = reader.as_mut()?;
    match segments.next_segment().await {
        Ok(Some(mut bytes)) => {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            Some(String::from_utf8_lossy(&bytes).into_owned())
        }
        Ok(None) => None,
        Err(e) => {
            debug!("Failed to read cmake output: {}", e);
            None
        }
    }
}
