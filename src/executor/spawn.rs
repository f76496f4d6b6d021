//! Child process lifecycle: spawn, await under a wall-clock deadline,
//! capture bounded output, and force-kill on expiry.
//!
//! The wait is fully async; nothing here blocks a runtime thread. Output
//! is read concurrently with the wait so the child can never stall on a
//! full pipe, and bytes past the cap are read and dropped, not buffered.

use std::io;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::warn;

/// How long to wait for the child to be reaped after a deadline kill.
const KILL_GRACE: Duration = Duration::from_secs(2);

/// How long to keep draining pipes after the child has exited. A child
/// that leaked the pipe to a background grandchild would otherwise keep
/// the readers alive indefinitely.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

const READ_CHUNK: usize = 8 * 1024;

/// One captured stream, capped at the output ceiling.
#[derive(Debug, Default)]
pub(crate) struct CappedOutput {
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

/// Everything observed about one child process.
#[derive(Debug)]
pub(crate) struct ProcessCapture {
    pub stdout: CappedOutput,
    pub stderr: CappedOutput,
    /// Exit code when the process ran to completion; `None` when it was
    /// killed by the deadline (or died to a signal).
    pub exit_code: Option<i32>,
    pub timed_out: bool,
}

/// Spawn `command` and await it under `deadline`. On expiry the child is
/// killed and reaped under a short grace period; output captured up to
/// the kill point is preserved.
///
/// `Err` is returned only when the OS could not start the process at all.
pub(crate) async fn run_with_deadline(
    mut command: Command,
    deadline: Duration,
    max_output_bytes: usize,
) -> io::Result<ProcessCapture> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn()?;

    let stdout_sink = Arc::new(Mutex::new(CappedOutput::default()));
    let stderr_sink = Arc::new(Mutex::new(CappedOutput::default()));
    let stdout_task = tokio::spawn(drain_into(
        child.stdout.take(),
        max_output_bytes,
        Arc::clone(&stdout_sink),
    ));
    let stderr_task = tokio::spawn(drain_into(
        child.stderr.take(),
        max_output_bytes,
        Arc::clone(&stderr_sink),
    ));

    let (exit_code, timed_out) = tokio::select! {
        status = child.wait() => (status?.code(), false),
        _ = tokio::time::sleep(deadline) => {
            if let Err(e) = child.start_kill() {
                warn!("kill after deadline failed: {}", e);
            }
            match tokio::time::timeout(KILL_GRACE, child.wait()).await {
                Ok(Ok(status)) => (status.code(), true),
                Ok(Err(e)) => {
                    warn!("reaping timed-out child failed: {}", e);
                    (None, true)
                }
                Err(_) => {
                    warn!("timed-out child not reaped within {:?}", KILL_GRACE);
                    (None, true)
                }
            }
        }
    };

    let stdout = collect(stdout_task, &stdout_sink).await;
    let stderr = collect(stderr_task, &stderr_sink).await;

    Ok(ProcessCapture {
        stdout,
        stderr,
        exit_code,
        timed_out,
    })
}

/// Read a pipe to EOF, keeping at most `cap` bytes and discarding the
/// rest so the writer never blocks.
async fn drain_into<R>(pipe: Option<R>, cap: usize, sink: Arc<Mutex<CappedOutput>>)
where
    R: AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return;
    };
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let mut out = sink.lock().unwrap_or_else(|e| e.into_inner());
                let remaining = cap.saturating_sub(out.bytes.len());
                if remaining == 0 {
                    out.truncated = true;
                    continue;
                }
                let take = n.min(remaining);
                out.bytes.extend_from_slice(&chunk[..take]);
                if take < n {
                    out.truncated = true;
                }
            }
        }
    }
}

/// Wait briefly for a reader to hit EOF, then take whatever arrived.
async fn collect(task: JoinHandle<()>, sink: &Arc<Mutex<CappedOutput>>) -> CappedOutput {
    let aborter = task.abort_handle();
    if tokio::time::timeout(DRAIN_GRACE, task).await.is_err() {
        aborter.abort();
    }
    let mut guard = sink.lock().unwrap_or_else(|e| e.into_inner());
    std::mem::take(&mut *guard)
}
