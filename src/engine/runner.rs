use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Outcome of one bounded execution of a compiled artifact.
///
/// The runner only reports what the process did; interpreting a non-zero
/// exit code is the caller's business. That keeps it reusable for both the
/// single-run and the per-test-case submission path.
#[derive(Debug)]
pub enum RunOutcome {
    /// The process exited on its own before the deadline
    Completed {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    /// The deadline fired and the process was forcibly terminated
    TimedOut,
    /// The process was terminated by a signal before the deadline
    Killed,
}

/// Executes `artifact` under a wall-clock deadline, feeding it `stdin`.
///
/// The whole input payload is written up front and the input channel is then
/// closed, so a program that reads until end-of-input terminates instead of
/// blocking for the rest of the time limit. Both output streams are drained
/// concurrently while waiting, which keeps a chatty program from filling the
/// pipe buffers and deadlocking against us.
pub async fn run(artifact: &Path, stdin: &str, time_limit: Duration) -> Result<RunOutcome> {
    let mut command = Command::new(artifact);
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group, so the timeout kill reaches spawned descendants too
    #[cfg(unix)]
    command.process_group(0);

    let mut child = command
        .spawn()
        .with_context(|| format!("failed to spawn {}", artifact.display()))?;

    let writer = feed_stdin(&mut child, stdin);
    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    let status = match timeout(time_limit, child.wait()).await {
        Ok(status) => status.context("failed to wait for child process")?,
        Err(_) => {
            kill_process_tree(&mut child).await;
            writer.abort();
            return Ok(RunOutcome::TimedOut);
        }
    };

    let _ = writer.await;
    let stdout = stdout_reader.await.unwrap_or_default();
    let stderr = stderr_reader.await.unwrap_or_default();

    match status.code() {
        Some(exit_code) => Ok(RunOutcome::Completed {
            exit_code,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        }),
        // No exit code means a signal ended the process
        None => Ok(RunOutcome::Killed),
    }
}

/// Writes the full payload to the child's stdin, then drops the handle to
/// signal end-of-input. Write errors are ignored: a program that exits (or
/// is killed) without reading its input breaks the pipe, which is fine.
fn feed_stdin(child: &mut Child, payload: &str) -> JoinHandle<()> {
    let pipe = child.stdin.take();
    let payload = payload.to_owned();
    tokio::spawn(async move {
        if let Some(mut pipe) = pipe {
            let _ = pipe.write_all(payload.as_bytes()).await;
            let _ = pipe.shutdown().await;
        }
    })
}

/// Accumulates a child output stream until it closes.
fn drain<R>(stream: Option<R>) -> JoinHandle<Vec<u8>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut stream) = stream {
            let _ = stream.read_to_end(&mut buf).await;
        }
        buf
    })
}

/// Unconditionally terminates the child and, on Unix, its whole process
/// group. SIGKILL rather than a cooperative signal: a looping program is
/// assumed non-cooperative.
async fn kill_process_tree(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // The child is its own group leader, so -pid reaches descendants
        unsafe {
            libc::kill(-(pid as i32), libc::SIGKILL);
        }
    }

    if let Err(e) = child.kill().await {
        log::warn!("failed to kill timed-out process: {e}");
    }
}
