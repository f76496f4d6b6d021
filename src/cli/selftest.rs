use anyhow::Result;
use std::time::Duration;

use crate::config::Config;
use crate::executor::{CodeExecutor, ExecutionRequest, FailureKind};

/// Smoke tests against the real workspace root, in the spirit of a
/// post-install check. Exercises the spawn, deadline, and cap paths.
pub async fn run() -> Result<()> {
    let config = Config::load()?;
    let executor = CodeExecutor::new(config.workspace_root_path(), &config.executor)?;

    println!("Running executor smoke tests...");
    println!("  Workspace root: {}", config.workspace_root_path().display());
    println!();

    let mut passed = 0;
    let mut failed = 0;

    // Test 1: Bash snippet runs and echoes
    print!("  [1/5] Bash snippet echoes:          ");
    let result = executor
        .execute(&ExecutionRequest::new("bash", "echo smoke-ok"))
        .await;
    if result.succeeded && result.stdout.contains("smoke-ok") {
        println!("ok");
        passed += 1;
    } else {
        println!("FAIL ({:?})", result.failure_kind);
        failed += 1;
    }

    // Test 2: Exit code propagated
    print!("  [2/5] Exit code propagated:         ");
    let result = executor
        .execute(&ExecutionRequest::new("bash", "exit 7"))
        .await;
    if !result.succeeded && result.exit_code == Some(7) && result.failure_kind == FailureKind::None
    {
        println!("ok");
        passed += 1;
    } else {
        println!("FAIL (exit={:?}, kind={:?})", result.exit_code, result.failure_kind);
        failed += 1;
    }

    // Test 3: Deadline kill
    print!("  [3/5] Deadline kill:                ");
    let start = std::time::Instant::now();
    let result = executor
        .clone()
        .with_deadline(Duration::from_secs(2))
        .execute(&ExecutionRequest::new("bash", "sleep 30"))
        .await;
    if result.failure_kind == FailureKind::Timeout && start.elapsed() < Duration::from_secs(10) {
        println!("killed after {:.1}s (ok)", start.elapsed().as_secs_f64());
        passed += 1;
    } else {
        println!("FAIL ({:?})", result.failure_kind);
        failed += 1;
    }

    // Test 4: Output ceiling
    print!("  [4/5] Output ceiling:               ");
    let mut capped = config.executor.clone();
    capped.max_output_bytes = 4096;
    let small = CodeExecutor::new(config.workspace_root_path(), &capped)?;
    let result = small
        .execute(&ExecutionRequest::new(
            "bash",
            "head -c 1048576 /dev/zero | tr '\\0' 'a'",
        ))
        .await;
    if result.succeeded && result.stdout.len() == 4096 && result.stdout_truncated {
        println!("ok");
        passed += 1;
    } else {
        println!(
            "FAIL (len={}, truncated={})",
            result.stdout.len(),
            result.stdout_truncated
        );
        failed += 1;
    }

    // Test 5: Unknown language rejected
    print!("  [5/5] Unknown language rejected:    ");
    let result = executor
        .execute(&ExecutionRequest::new("ruby", "puts 'hi'"))
        .await;
    if result.failure_kind == FailureKind::UnsupportedLanguage {
        println!("ok");
        passed += 1;
    } else {
        println!("FAIL ({:?})", result.failure_kind);
        failed += 1;
    }

    println!();
    if failed == 0 {
        println!("All {} tests passed.", passed);
    } else {
        println!("{} passed, {} failed.", passed, failed);
    }

    Ok(())
}
