pub mod languages;
pub mod run;
pub mod selftest;
pub mod shell;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use crate::executor::ExecutionResult;

#[derive(Parser)]
#[command(
    name = "codebox",
    version,
    about = "Run untrusted code snippets in disposable workspaces with deadlines and output caps"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Execute a snippet from a file or inline source
    Run(run::RunArgs),

    /// Run a shell command in a persistent caller directory
    Shell(shell::ShellArgs),

    /// List registered languages and interpreter availability
    Languages,

    /// Smoke-test the executor on this machine
    Selftest,
}

/// Shared result rendering for `run` and `shell`.
pub(crate) fn print_result(result: &ExecutionResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    if !result.stdout.is_empty() {
        print!("{}", result.stdout);
    }
    if result.stdout_truncated {
        println!("[stdout truncated]");
    }
    if !result.stderr.is_empty() {
        eprint!("{}", result.stderr);
    }
    if result.stderr_truncated {
        eprintln!("[stderr truncated]");
    }

    if result.failure_kind.is_failure() {
        let detail = result
            .diagnostic
            .clone()
            .unwrap_or_else(|| format!("{:?}", result.failure_kind));
        bail!("execution failed: {}", detail);
    }

    if let Some(code) = result.exit_code
        && code != 0
    {
        eprintln!("exit code: {}", code);
    }

    Ok(())
}
