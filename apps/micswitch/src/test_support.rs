// Scripted command runner for client tests
use async_trait::async_trait;
use micswitch_utils::{CommandOutput, CommandRunner, UtilError};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Reply {
    Exit {
        code: i32,
        stdout: String,
        stderr: String,
    },
    Timeout,
    Missing,
}

impl Reply {
    pub fn ok(stdout: &str) -> Self {
        Reply::Exit {
            code: 0,
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn fail(code: i32, stderr: &str) -> Self {
        Reply::Exit {
            code,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

/// Answers each command line with a canned [`Reply`] and records the
/// command lines and timeouts it was asked to run. Unknown commands exit 0
/// with no output.
#[derive(Default)]
pub struct ScriptedRunner {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<(String, Duration)>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, command: &str, reply: Reply) -> Self {
        self.replies.insert(command.to_string(), reply);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn timeout_of(&self, command: &str) -> Option<Duration> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(c, _)| c == command)
            .map(|(_, t)| *t)
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<CommandOutput, UtilError> {
        let command = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap().push((command.clone(), timeout));

        match self.replies.get(&command).cloned().unwrap_or_else(|| Reply::ok("")) {
            Reply::Exit { code, stdout, stderr } => Ok(CommandOutput {
                code: Some(code),
                stdout,
                stderr,
            }),
            Reply::Timeout => Err(UtilError::Timeout { command, timeout }),
            Reply::Missing => Err(UtilError::Spawn {
                command,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            }),
        }
    }
}
