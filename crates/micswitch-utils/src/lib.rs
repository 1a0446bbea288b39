use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process;
use tracing::debug;

/// Error types for utilities
#[derive(Error, Debug)]
pub enum UtilError {
    #[error("Failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` timed out after {}ms", .timeout.as_millis())]
    Timeout { command: String, timeout: Duration },
}

/// Captured result of a finished child process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs external programs. Audio clients are written against this so that
/// tool output can be scripted in tests.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, UtilError>;
}

/// Runner that spawns real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, UtilError> {
        ProcessUtils::run_with_timeout(program, args, timeout).await
    }
}

/// Process utilities
pub struct ProcessUtils;

impl ProcessUtils {
    /// Execute a command, killing it if it has not exited within `timeout`.
    ///
    /// A non-zero exit status is not an error here; it is reported through
    /// [`CommandOutput::code`] and callers apply their own policy.
    pub async fn run_with_timeout(
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, UtilError> {
        let command = Self::display_command(program, args);
        debug!("Running `{}` (timeout {}ms)", command, timeout.as_millis());

        let child = process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        // Dropping the output future on timeout kills the child.
        let output = match tokio::time::timeout(timeout, child).await {
            Ok(result) => result.map_err(|source| UtilError::Spawn {
                command: command.clone(),
                source,
            })?,
            Err(_) => return Err(UtilError::Timeout { command, timeout }),
        };

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }

    /// Resolve a command on PATH using `which`.
    pub async fn which(command: &str) -> Option<String> {
        match process::Command::new("which")
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .await
        {
            Ok(output) if output.status.success() => {
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                (!path.is_empty()).then_some(path)
            }
            _ => None,
        }
    }

    /// Check if a command is available in PATH
    pub async fn command_exists(command: &str) -> bool {
        Self::which(command).await.is_some()
    }

    /// Return the first candidate that exists: paths containing a separator
    /// must be existing files, bare names are looked up on PATH.
    pub async fn find_executable(candidates: &[&str]) -> Option<String> {
        for candidate in candidates {
            if candidate.is_empty() {
                continue;
            }
            if candidate.contains('/') {
                if Path::new(candidate).is_file() {
                    return Some(candidate.to_string());
                }
            } else if let Some(path) = Self::which(candidate).await {
                return Some(path);
            }
        }
        None
    }

    fn display_command(program: &str, args: &[&str]) -> String {
        if args.is_empty() {
            program.to_string()
        } else {
            format!("{} {}", program, args.join(" "))
        }
    }
}

/// String utilities
pub struct StringUtils;

impl StringUtils {
    /// First `max_chars` characters of `s`, never splitting a character.
    pub fn truncate_chars(s: &str, max_chars: usize) -> String {
        s.chars().take(max_chars).collect()
    }

    /// Quote `s` for a POSIX shell. The result is always wrapped in single
    /// quotes; embedded single quotes become `'\''`.
    pub fn shell_quote(s: &str) -> String {
        let mut quoted = String::with_capacity(s.len() + 2);
        quoted.push('\'');
        for c in s.chars() {
            if c == '\'' {
                quoted.push_str("'\\''");
            } else {
                quoted.push(c);
            }
        }
        quoted.push('\'');
        quoted
    }
}
