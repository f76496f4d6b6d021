//! Sandboxed snippet execution — one untrusted program per call, run to
//! completion or forced termination.
//!
//! Each call materializes the source in a single-use workspace directory,
//! spawns the matching interpreter with the workspace as cwd, awaits it
//! under a hard wall-clock deadline, captures size-capped stdout/stderr,
//! and removes the workspace on every exit path.
//!
//! Isolation is workspace scoping plus time and output bounds ONLY. There
//! is no seccomp, namespace, or chroot containment in this module; a
//! hostile snippet can read anything the host process can. Callers that
//! need security isolation must wrap the executor in OS-level containment.

pub mod language;
pub mod outcome;
pub mod runner;
mod shell;
mod spawn;
pub mod workspace;

pub use language::{Language, LanguageInfo, LanguageSpec, find_in_path, supported_languages};
pub use outcome::{ExecutionRequest, ExecutionResult, FailureKind};
pub use runner::CodeExecutor;
pub use workspace::Workspace;
