//! Subprocess execution adapter
//!
//! Runs external tools with tokio, reading stdout and stderr concurrently
//! so neither pipe can fill up and stall the child. Output is split on both
//! `\r` and `\n` because progress meters rewrite the current line.

use std::process::Stdio;
use std::time::Instant;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, trace};

use crate::engine::progress::ProgressParser;
use crate::error::Mkv2Ac3Result;
use crate::ports::{Invocation, ProgressObserver, ToolOutput, ToolRunner};

/// How mutating invocations are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    #[default]
    Execute,
    /// Log mutating commands without running them
    DryRun,
    /// Log and wait for Enter before each mutating command
    Pause,
}

/// tokio-backed tool runner
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    mode: ExecutionMode,
}

impl ProcessRunner {
    pub fn new(mode: ExecutionMode) -> Self {
        Self { mode }
    }

    async fn execute(
        &self,
        invocation: &Invocation,
        observer: Option<&dyn ProgressObserver>,
    ) -> Mkv2Ac3Result<ToolOutput> {
        let command_line = invocation.command_line();

        if invocation.is_mutating() {
            match self.mode {
                ExecutionMode::DryRun => {
                    info!("[test] {}", command_line);
                    return Ok(ToolOutput::not_executed());
                }
                ExecutionMode::Pause => {
                    info!("{}", command_line);
                    wait_for_enter().await?;
                }
                ExecutionMode::Execute => debug!("{}", command_line),
            }
        } else {
            debug!("{}", command_line);
        }

        let started = Instant::now();
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let (stdout, stderr) = tokio::join!(
            collect_lines(stdout, observer),
            collect_lines(stderr, observer)
        );
        let status = child.wait().await?;

        if let Some(observer) = observer {
            observer.on_finish(started.elapsed());
        }

        debug!(
            "{} exited with {:?} after {:?}",
            invocation.tool,
            status.code(),
            started.elapsed()
        );

        Ok(ToolOutput {
            status: status.code(),
            stdout: stdout?,
            stderr: stderr?,
            executed: true,
        })
    }
}

#[async_trait]
impl ToolRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Mkv2Ac3Result<ToolOutput> {
        self.execute(invocation, None).await
    }

    async fn run_observed(
        &self,
        invocation: &Invocation,
        observer: &dyn ProgressObserver,
    ) -> Mkv2Ac3Result<ToolOutput> {
        self.execute(invocation, Some(observer)).await
    }
}

async fn wait_for_enter() -> std::io::Result<()> {
    eprintln!("Press Enter to run the command above...");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(())
}

/// Read a pipe to the end, splitting on `\r` and `\n` and dropping empty lines
async fn collect_lines<R>(
    reader: Option<R>,
    observer: Option<&dyn ProgressObserver>,
) -> std::io::Result<Vec<String>>
where
    R: AsyncRead + Unpin,
{
    let Some(mut reader) = reader else {
        return Ok(Vec::new());
    };

    let mut lines = Vec::new();
    let mut pending: Vec<u8> = Vec::new();
    let mut buffer = [0u8; 4096];
    let mut parser = ProgressParser::new();

    loop {
        let read = reader.read(&mut buffer).await?;
        if read == 0 {
            break;
        }

        for &byte in &buffer[..read] {
            if byte == b'\r' || byte == b'\n' {
                flush_line(&mut pending, &mut lines, &mut parser, observer);
            } else {
                pending.push(byte);
            }
        }
    }
    flush_line(&mut pending, &mut lines, &mut parser, observer);

    Ok(lines)
}

fn flush_line(
    pending: &mut Vec<u8>,
    lines: &mut Vec<String>,
    parser: &mut ProgressParser,
    observer: Option<&dyn ProgressObserver>,
) {
    if pending.is_empty() {
        return;
    }

    let line = String::from_utf8_lossy(pending).into_owned();
    pending.clear();

    if line.trim().is_empty() {
        return;
    }

    trace!("{}", line);
    if let Some(observer) = observer {
        if let Some(percent) = parser.feed(&line) {
            observer.on_progress(percent);
        }
    }
    lines.push(line);
}
