use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::debug;

use super::language::{Language, find_in_path};
use super::outcome::{ExecutionRequest, ExecutionResult, FailureKind};
use super::spawn::{ProcessCapture, run_with_deadline};
use super::workspace::Workspace;
use crate::config::ExecutorConfig;

/// Runs one untrusted snippet per call inside a single-use workspace.
///
/// Stateless and cheap to clone; callers hold a reference and share it
/// across concurrent requests. Every call gets its own workspace and its
/// own child process, so calls never observe or interfere with one
/// another.
#[derive(Debug, Clone)]
pub struct CodeExecutor {
    pub(crate) workspace_root: PathBuf,
    pub(crate) deadline: Duration,
    pub(crate) max_output_bytes: usize,
    pub(crate) blocked_commands: Vec<String>,
}

impl CodeExecutor {
    /// Build an executor rooted at `workspace_root`, creating the root if
    /// needed. Root creation failure is the one error surfaced to the
    /// caller; everything after construction is reported inside
    /// `ExecutionResult`.
    pub fn new(workspace_root: impl Into<PathBuf>, config: &ExecutorConfig) -> Result<Self> {
        let workspace_root = workspace_root.into();
        std::fs::create_dir_all(&workspace_root).with_context(|| {
            format!(
                "failed to create workspace root {}",
                workspace_root.display()
            )
        })?;
        Ok(Self {
            workspace_root,
            deadline: Duration::from_secs(config.timeout_secs),
            max_output_bytes: config.max_output_bytes as usize,
            blocked_commands: config.blocked_commands.clone(),
        })
    }

    /// Override the wall-clock deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    /// Run one snippet to completion or forced termination.
    ///
    /// Never panics or returns an error for expected conditions; every
    /// outcome — unknown language, missing interpreter, timeout, non-zero
    /// exit, setup failure — is a tagged `ExecutionResult`. Exactly one
    /// process is spawned per call, and the workspace is removed before
    /// this returns, on every path.
    ///
    /// Isolation is workspace scoping plus time and output bounds only:
    /// there is no seccomp, namespace, or chroot containment here.
    /// Callers that need security isolation against a hostile snippet
    /// must add OS-level containment around this executor.
    pub async fn execute(&self, request: &ExecutionRequest) -> ExecutionResult {
        let started = Instant::now();

        // Unknown language: reject before any side effect.
        let Some(language) = Language::parse(&request.language) else {
            debug!(language = %request.language, "unsupported language");
            return ExecutionResult::failure(
                FailureKind::UnsupportedLanguage,
                Some(format!("unsupported language: {:?}", request.language)),
                started.elapsed(),
            );
        };
        let spec = language.spec();

        if spec.probe_before_spawn && find_in_path(spec.interpreter).is_none() {
            return ExecutionResult::failure(
                FailureKind::SpawnError,
                Some(format!(
                    "{} not found on PATH; install it to run {} snippets",
                    spec.interpreter, spec.name
                )),
                started.elapsed(),
            );
        }

        let workspace = match Workspace::create(&self.workspace_root, request.caller.as_deref()) {
            Ok(ws) => ws,
            Err(e) => {
                return ExecutionResult::failure(
                    FailureKind::Internal,
                    Some(format!("failed to create workspace: {}", e)),
                    started.elapsed(),
                );
            }
        };

        let filename = match &request.filename {
            Some(name) => name.clone(),
            None => format!("main{}", spec.extension),
        };
        let source_file =
            match workspace.write_source(&filename, &request.source_text, spec.needs_exec_bit) {
                Ok(path) => path,
                Err(e) => {
                    return ExecutionResult::failure(
                        FailureKind::Internal,
                        Some(format!("failed to write source file: {}", e)),
                        started.elapsed(),
                    );
                }
            };

        debug!(
            language = spec.key,
            workspace = %workspace.path().display(),
            "spawning {}",
            spec.interpreter
        );

        let mut command = Command::new(spec.interpreter);
        command.arg(&source_file).current_dir(workspace.path());

        match run_with_deadline(command, self.deadline, self.max_output_bytes).await {
            Ok(capture) => self.finish(capture, started.elapsed()),
            Err(e) => ExecutionResult::failure(
                FailureKind::SpawnError,
                Some(format!("failed to spawn {}: {}", spec.interpreter, e)),
                started.elapsed(),
            ),
        }
        // workspace dropped here: removed on success, failure, and timeout alike
    }

    pub(crate) fn finish(&self, capture: ProcessCapture, wall: Duration) -> ExecutionResult {
        let (failure_kind, diagnostic) = if capture.timed_out {
            (
                FailureKind::Timeout,
                Some(format!(
                    "execution exceeded the {}ms deadline and was killed",
                    self.deadline.as_millis()
                )),
            )
        } else {
            (FailureKind::None, None)
        };

        ExecutionResult {
            succeeded: !capture.timed_out && capture.exit_code == Some(0),
            stdout: String::from_utf8_lossy(&capture.stdout.bytes).into_owned(),
            stderr: String::from_utf8_lossy(&capture.stderr.bytes).into_owned(),
            exit_code: capture.exit_code,
            failure_kind,
            wall_time_seconds: wall.as_secs_f64(),
            diagnostic,
            stdout_truncated: capture.stdout.truncated,
            stderr_truncated: capture.stderr.truncated,
        }
    }
}
