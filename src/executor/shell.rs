//! Shell commands in a persistent per-caller directory.
//!
//! Unlike snippet execution, the working directory survives across calls
//! so a caller can build up files over a session. The same deadline and
//! output ceiling apply, plus a substring blocklist checked before any
//! process is spawned.

use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, warn};

use super::outcome::{ExecutionResult, FailureKind};
use super::runner::CodeExecutor;
use super::spawn::run_with_deadline;
use super::workspace::caller_dir;

impl CodeExecutor {
    /// Run `bash -c <command>` in the caller's persistent directory under
    /// the workspace root. Commands matching the blocklist are rejected
    /// with `FailureKind::Blocked` before any process exists.
    pub async fn run_command(&self, command: &str, caller: Option<&str>) -> ExecutionResult {
        let started = Instant::now();

        if let Some(pattern) = blocked_pattern(command, &self.blocked_commands) {
            warn!(pattern, "blocked shell command");
            return ExecutionResult::failure(
                FailureKind::Blocked,
                Some(format!("command blocked by policy: matches {:?}", pattern)),
                started.elapsed(),
            );
        }

        let dir = match caller_dir(&self.workspace_root, caller) {
            Ok(dir) => dir,
            Err(e) => {
                return ExecutionResult::failure(
                    FailureKind::Internal,
                    Some(format!("failed to create caller directory: {}", e)),
                    started.elapsed(),
                );
            }
        };

        debug!(dir = %dir.display(), "running shell command");

        let mut cmd = Command::new("bash");
        cmd.arg("-c").arg(command).current_dir(&dir);

        match run_with_deadline(cmd, self.deadline, self.max_output_bytes).await {
            Ok(capture) => self.finish(capture, started.elapsed()),
            Err(e) => ExecutionResult::failure(
                FailureKind::SpawnError,
                Some(format!("failed to spawn bash: {}", e)),
                started.elapsed(),
            ),
        }
    }
}

/// First blocklist entry the command matches, if any. Case-insensitive
/// substring match.
fn blocked_pattern<'a>(command: &str, blocklist: &'a [String]) -> Option<&'a str> {
    let lowered = command.to_lowercase();
    blocklist
        .iter()
        .find(|pattern| lowered.contains(pattern.to_lowercase().as_str()))
        .map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutorConfig;
    use tempfile::TempDir;

    fn executor(root: &TempDir) -> CodeExecutor {
        CodeExecutor::new(root.path(), &ExecutorConfig::default()).unwrap()
    }

    #[test]
    fn test_blocked_pattern_matching() {
        let blocklist = vec!["rm -rf".to_string(), "sudo".to_string()];
        assert_eq!(blocked_pattern("rm -rf /", &blocklist), Some("rm -rf"));
        assert_eq!(blocked_pattern("SUDO apt install", &blocklist), Some("sudo"));
        assert_eq!(blocked_pattern("echo hi", &blocklist), None);
    }

    #[tokio::test]
    async fn test_echo_in_caller_dir() {
        let root = TempDir::new().unwrap();
        let result = executor(&root).run_command("echo hi", Some("user-1")).await;
        assert!(result.succeeded);
        assert_eq!(result.stdout, "hi\n");
        assert_eq!(result.failure_kind, FailureKind::None);
    }

    #[tokio::test]
    async fn test_blocked_command_spawns_nothing() {
        let root = TempDir::new().unwrap();
        let result = executor(&root)
            .run_command("sudo rm -rf /", Some("user-1"))
            .await;
        assert!(!result.succeeded);
        assert_eq!(result.failure_kind, FailureKind::Blocked);
        assert!(result.diagnostic.is_some());
        // Rejected before the caller directory was even created.
        assert_eq!(std::fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_caller_dir_persists_across_commands() {
        let root = TempDir::new().unwrap();
        let ex = executor(&root);
        let write = ex
            .run_command("echo data > state.txt", Some("user-2"))
            .await;
        assert!(write.succeeded);
        let read = ex.run_command("cat state.txt", Some("user-2")).await;
        assert!(read.succeeded);
        assert_eq!(read.stdout, "data\n");
    }
}
