use anyhow::{Context, Result, bail};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use super::print_result;
use crate::config::Config;
use crate::executor::{CodeExecutor, ExecutionRequest, Language};

#[derive(Args)]
pub struct RunArgs {
    /// Source file to execute (language inferred from the extension)
    pub file: Option<PathBuf>,

    /// Inline source text instead of a file
    #[arg(short = 'c', long = "code", conflicts_with = "file")]
    pub code: Option<String>,

    /// Language tag (python, javascript, bash)
    #[arg(short, long)]
    pub language: Option<String>,

    /// Deadline override in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Caller identity used to namespace the workspace
    #[arg(long)]
    pub caller: Option<String>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let config = Config::load()?;

    let (source_text, language) = match (&args.file, &args.code) {
        (Some(file), None) => {
            let source = std::fs::read_to_string(file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let language = match &args.language {
                Some(tag) => tag.clone(),
                None => {
                    let ext = file.extension().and_then(|e| e.to_str()).unwrap_or("");
                    match Language::for_extension(ext) {
                        Some(lang) => lang.spec().key.to_string(),
                        None => bail!(
                            "cannot infer a language from {}; pass --language",
                            file.display()
                        ),
                    }
                }
            };
            (source, language)
        }
        (None, Some(code)) => {
            let Some(language) = args.language.clone() else {
                bail!("--code requires --language");
            };
            (code.clone(), language)
        }
        _ => bail!("provide a source file or --code"),
    };

    let mut executor = CodeExecutor::new(config.workspace_root_path(), &config.executor)?;
    if let Some(secs) = args.timeout_secs {
        executor = executor.with_deadline(Duration::from_secs(secs));
    }

    let mut request = ExecutionRequest::new(language, source_text);
    if let Some(caller) = args.caller {
        request = request.with_caller(caller);
    }

    let result = executor.execute(&request).await;
    print_result(&result, args.json)
}
