//! Shell command execution
//!
//! Every command runs through `sh -c`. Routing is decided per command:
//! silent discards output, otherwise it flows to the parent's own
//! stdout/stderr. When a tee sink is configured the child is piped and
//! two background tasks duplicate each chunk into the combined output
//! file (and onto the console unless silent).

use std::path::PathBuf;
use std::process::Stdio;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;
use tracing::warn;

use super::error::ProcessError;

/// Where a command's stdout/stderr goes
#[derive(Debug, Clone)]
pub struct OutputRouting {
    /// Discard process output instead of echoing it
    pub silent: bool,

    /// Combined output file receiving a copy of every chunk
    pub tee_path: Option<PathBuf>,
}

impl OutputRouting {
    pub fn new(silent: bool, tee_path: Option<PathBuf>) -> Self {
        Self { silent, tee_path }
    }
}

/// Run one shell command to completion under the given routing.
///
/// The tee sink is opened fresh for each command in create+append mode
/// and closed on return. If the open fails the command still runs; the
/// sink is dropped for this command with a warning.
pub async fn run_command(command: &str, routing: &OutputRouting) -> Result<(), ProcessError> {
    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(command);

    let sink = match &routing.tee_path {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path).await {
            Ok(file) => Some(file),
            Err(e) => {
                warn!(
                    "output capture disabled, cannot open '{}': {}",
                    path.display(),
                    e
                );
                None
            }
        },
        None => None,
    };

    match sink {
        Some(file) => run_teed(cmd, file, routing.silent).await,
        None => run_plain(cmd, routing.silent).await,
    }
}

async fn run_plain(mut cmd: Command, silent: bool) -> Result<(), ProcessError> {
    if silent {
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());
    } else {
        cmd.stdout(Stdio::inherit());
        cmd.stderr(Stdio::inherit());
    }

    let status = cmd.status().await.map_err(ProcessError::Spawn)?;
    check_status(status)
}

async fn run_teed(mut cmd: Command, file: File, silent: bool) -> Result<(), ProcessError> {
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(ProcessError::Spawn)?;

    let stdout = child.stdout.take().ok_or(ProcessError::Pipe("stdout"))?;
    let stderr = child.stderr.take().ok_or(ProcessError::Pipe("stderr"))?;

    // Both copy tasks append through clones of the same descriptor.
    let file_for_stderr = file.try_clone().await?;

    let echo_out = (!silent).then(tokio::io::stdout);
    let echo_err = (!silent).then(tokio::io::stderr);

    let out_task = tokio::spawn(tee_stream(stdout, file, echo_out));
    let err_task = tokio::spawn(tee_stream(stderr, file_for_stderr, echo_err));

    let status = child.wait().await?;

    // Drain both pipes before reporting the exit status.
    for (stream, handle) in [("stdout", out_task), ("stderr", err_task)] {
        match handle.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("output copy for {} failed: {}", stream, e),
            Err(e) => warn!("output copy task for {} aborted: {}", stream, e),
        }
    }

    check_status(status)
}

/// Copy chunks from a child pipe into the sink file, echoing each chunk
/// to the console writer when one is given.
async fn tee_stream<R, W>(mut reader: R, mut file: File, mut echo: Option<W>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).await?;
        if let Some(echo) = echo.as_mut() {
            echo.write_all(&buf[..n]).await?;
            echo.flush().await?;
        }
    }
    file.flush().await?;
    Ok(())
}

fn check_status(status: std::process::ExitStatus) -> Result<(), ProcessError> {
    if status.success() {
        Ok(())
    } else {
        match status.code() {
            Some(code) => Err(ProcessError::ExitStatus(code)),
            None => Err(ProcessError::Signal),
        }
    }
}
