// Ports - Interface definitions (contracts)

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Mkv2Ac3Result;

/// External executables driven by mkv2ac3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    MkvMerge,
    MkvInfo,
    MkvExtract,
    Ffmpeg,
}

impl Tool {
    /// Executable base name, without platform suffix
    pub fn name(&self) -> &'static str {
        match self {
            Tool::MkvMerge => "mkvmerge",
            Tool::MkvInfo => "mkvinfo",
            Tool::MkvExtract => "mkvextract",
            Tool::Ffmpeg => "ffmpeg",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Whether an invocation changes anything on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Inspection and probing; always executed
    ReadOnly,
    /// Creates or rewrites files; subject to dry-run and pause modes
    Writes,
}

/// One fully resolved tool command
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub tool: Tool,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub effect: Effect,
}

impl Invocation {
    pub fn new(tool: Tool, program: impl Into<PathBuf>, effect: Effect) -> Self {
        Self {
            tool,
            program: program.into(),
            args: Vec::new(),
            effect,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn is_mutating(&self) -> bool {
        self.effect == Effect::Writes
    }

    /// Shell-like rendering for logs; arguments with spaces are quoted
    pub fn command_line(&self) -> String {
        let mut rendered = vec![self.program.display().to_string()];
        rendered.extend(self.args.iter().map(|arg| {
            if arg.contains(char::is_whitespace) || arg.is_empty() {
                format!("\"{}\"", arg)
            } else {
                arg.clone()
            }
        }));
        rendered.join(" ")
    }
}

/// Captured result of a tool invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    /// Exit code; `None` when the process was killed by a signal
    pub status: Option<i32>,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    /// False when the command was only logged (dry run)
    pub executed: bool,
}

impl ToolOutput {
    /// Output of a command that was logged but not run
    pub fn not_executed() -> Self {
        Self {
            status: Some(0),
            executed: false,
            ..Default::default()
        }
    }

    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Last non-empty stderr line, falling back to stdout, for error messages
    pub fn last_message(&self) -> String {
        self.stderr
            .iter()
            .rev()
            .chain(self.stdout.iter().rev())
            .find(|line| !line.trim().is_empty())
            .map(|line| line.trim().to_string())
            .unwrap_or_else(|| match self.status {
                Some(code) => format!("exit status {}", code),
                None => "terminated by signal".to_string(),
            })
    }
}

/// Receives progress of a running tool
pub trait ProgressObserver: Send + Sync {
    /// Completion percentage, 0 to 100
    fn on_progress(&self, percent: u8);

    fn on_finish(&self, _elapsed: Duration) {}
}

/// Port for running external tools
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run an invocation to completion and capture its output.
    ///
    /// A non-zero exit is not an error here; callers judge the status.
    /// Errors mean the process could not be started at all.
    async fn run(&self, invocation: &Invocation) -> Mkv2Ac3Result<ToolOutput>;

    /// Run while reporting progress parsed from the tool's output
    async fn run_observed(
        &self,
        invocation: &Invocation,
        _observer: &dyn ProgressObserver,
    ) -> Mkv2Ac3Result<ToolOutput> {
        self.run(invocation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_quotes_spaces() {
        let invocation = Invocation::new(Tool::MkvMerge, "/usr/bin/mkvmerge", Effect::ReadOnly)
            .arg("-i")
            .arg("My Movie.mkv");
        assert_eq!(
            invocation.command_line(),
            "/usr/bin/mkvmerge -i \"My Movie.mkv\""
        );
    }

    #[test]
    fn test_last_message_prefers_stderr() {
        let output = ToolOutput {
            status: Some(2),
            stdout: vec!["progress".to_string()],
            stderr: vec!["Error: bad file".to_string(), "".to_string()],
            executed: true,
        };
        assert_eq!(output.last_message(), "Error: bad file");
        assert!(!output.success());
    }

    #[test]
    fn test_last_message_falls_back_to_status() {
        let output = ToolOutput {
            status: Some(1),
            executed: true,
            ..Default::default()
        };
        assert_eq!(output.last_message(), "exit status 1");
    }

    #[test]
    fn test_not_executed_counts_as_success() {
        let output = ToolOutput::not_executed();
        assert!(output.success());
        assert!(!output.executed);
    }
}
