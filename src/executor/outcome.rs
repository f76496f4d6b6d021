use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One snippet to run. Built by callers (HTTP handlers, the CLI) from
/// untrusted input; `source_text` is never interpreted here except by
/// handing it, byte for byte, to the declared interpreter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// The program text, written to disk unmodified.
    pub source_text: String,

    /// Language tag as supplied by the caller (e.g. "python", "bash").
    /// Parsed against the dispatch table; unknown tags are rejected
    /// without side effects.
    pub language: String,

    /// Optional source file name. Sanitized to a single path component;
    /// defaults to `main` plus the language's extension.
    #[serde(default)]
    pub filename: Option<String>,

    /// Opaque caller identity, used only to namespace workspace
    /// directories. Not an authentication mechanism.
    #[serde(default)]
    pub caller: Option<String>,
}

impl ExecutionRequest {
    pub fn new(language: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            language: language.into(),
            filename: None,
            caller: None,
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }
}

/// Why an execution did not succeed.
///
/// A process that runs to completion with a non-zero exit code is a result
/// state, not a failure kind: it reports `succeeded = false` with
/// `failure_kind = None` and its output intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The process ran to completion (exit code may still be non-zero).
    None,
    /// Language tag not present in the dispatch table. No workspace was
    /// created and no process was spawned.
    UnsupportedLanguage,
    /// The deadline expired and the process was forcibly terminated.
    Timeout,
    /// The OS could not start the process (missing interpreter,
    /// permission denied). The OS error is in `diagnostic`.
    SpawnError,
    /// A shell command matched the blocked-command policy. No process
    /// was spawned.
    Blocked,
    /// Workspace setup or source materialization failed (disk full,
    /// permissions). Details in `diagnostic`.
    Internal,
}

impl FailureKind {
    pub fn is_failure(self) -> bool {
        self != FailureKind::None
    }
}

/// The outcome of a single execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// True iff the process ran to completion and exited 0.
    pub succeeded: bool,

    /// Captured stdout, capped at the configured ceiling.
    pub stdout: String,

    /// Captured stderr, capped at the configured ceiling.
    pub stderr: String,

    /// Exit code, verbatim, when the process ran to completion. `None`
    /// when it was killed (timeout) or never started.
    pub exit_code: Option<i32>,

    pub failure_kind: FailureKind,

    /// Wall-clock duration of the call.
    pub wall_time_seconds: f64,

    /// Human-readable detail for spawn/internal/blocked failures. Never
    /// fabricated stderr.
    #[serde(default)]
    pub diagnostic: Option<String>,

    /// True when stdout hit the output ceiling and bytes were dropped.
    #[serde(default)]
    pub stdout_truncated: bool,

    /// True when stderr hit the output ceiling and bytes were dropped.
    #[serde(default)]
    pub stderr_truncated: bool,
}

impl ExecutionResult {
    pub(crate) fn failure(kind: FailureKind, diagnostic: Option<String>, wall: Duration) -> Self {
        Self {
            succeeded: false,
            stdout: String::new(),
            stderr: String::new(),
            exit_code: None,
            failure_kind: kind,
            wall_time_seconds: wall.as_secs_f64(),
            diagnostic,
            stdout_truncated: false,
            stderr_truncated: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_builder() {
        let req = ExecutionRequest::new("python", "print('hi')")
            .with_filename("script.py")
            .with_caller("user-7");
        assert_eq!(req.language, "python");
        assert_eq!(req.filename.as_deref(), Some("script.py"));
        assert_eq!(req.caller.as_deref(), Some("user-7"));
    }

    #[test]
    fn test_failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::UnsupportedLanguage).unwrap();
        assert_eq!(json, "\"unsupported_language\"");
        let json = serde_json::to_string(&FailureKind::SpawnError).unwrap();
        assert_eq!(json, "\"spawn_error\"");
    }

    #[test]
    fn test_failure_constructor() {
        let result = ExecutionResult::failure(
            FailureKind::Timeout,
            Some("deadline exceeded".to_string()),
            Duration::from_millis(1500),
        );
        assert!(!result.succeeded);
        assert_eq!(result.failure_kind, FailureKind::Timeout);
        assert_eq!(result.exit_code, None);
        assert!((result.wall_time_seconds - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_result_roundtrips_through_json() {
        let result = ExecutionResult {
            succeeded: true,
            stdout: "hi\n".to_string(),
            stderr: String::new(),
            exit_code: Some(0),
            failure_kind: FailureKind::None,
            wall_time_seconds: 0.02,
            diagnostic: None,
            stdout_truncated: false,
            stderr_truncated: false,
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: ExecutionResult = serde_json::from_str(&json).unwrap();
        assert!(back.succeeded);
        assert_eq!(back.stdout, "hi\n");
        assert_eq!(back.exit_code, Some(0));
    }
}
