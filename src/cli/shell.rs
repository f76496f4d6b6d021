use anyhow::Result;
use clap::Args;
use std::time::Duration;

use super::print_result;
use crate::config::Config;
use crate::executor::CodeExecutor;

#[derive(Args)]
pub struct ShellArgs {
    /// Command line passed to `bash -c`
    pub command: String,

    /// Caller identity; commands from the same caller share a directory
    #[arg(long)]
    pub caller: Option<String>,

    /// Deadline override in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: ShellArgs) -> Result<()> {
    let config = Config::load()?;

    let mut executor = CodeExecutor::new(config.workspace_root_path(), &config.executor)?;
    if let Some(secs) = args.timeout_secs {
        executor = executor.with_deadline(Duration::from_secs(secs));
    }

    let result = executor
        .run_command(&args.command, args.caller.as_deref())
        .await;
    print_result(&result, args.json)
}
