//! XDG Base Directory compliant path resolution.
//!
//! Every directory is resolved through a two-level fallback:
//! 1. codebox-specific env var (CODEBOX_CONFIG_DIR, etc.)
//! 2. XDG platform default via `etcetera` (~/.config, ~/.local/share)
//!
//! All paths are absolute. Relative paths from env vars are ignored per
//! the XDG spec.

use anyhow::Result;
use std::path::PathBuf;

/// Resolved directory paths for the whole application.
///
/// Created once at startup and threaded through `Config`.
#[derive(Debug, Clone, Default)]
pub struct Paths {
    /// Config directory: config.toml lives here
    pub config_dir: PathBuf,

    /// Data directory root
    pub data_dir: PathBuf,

    /// Root under which per-execution workspaces are created.
    /// May be overridden independently via CODEBOX_WORKSPACE_ROOT.
    pub workspace_root: PathBuf,
}

impl Paths {
    /// Resolve all paths using real environment variables.
    pub fn resolve() -> Result<Self> {
        Self::resolve_with_env(|key| std::env::var(key))
    }

    /// Resolve paths with a custom env var lookup (for testing).
    pub fn resolve_with_env<F>(env_fn: F) -> Result<Self>
    where
        F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
    {
        use etcetera::BaseStrategy;

        let strategy = etcetera::choose_base_strategy()
            .map_err(|e| anyhow::anyhow!("failed to determine base directories: {}", e))?;

        let config_dir = env_or(&env_fn, "CODEBOX_CONFIG_DIR", || {
            strategy.config_dir().join("codebox")
        });

        let data_dir = env_or(&env_fn, "CODEBOX_DATA_DIR", || {
            strategy.data_dir().join("codebox")
        });

        let workspace_root = env_or(&env_fn, "CODEBOX_WORKSPACE_ROOT", || {
            data_dir.join("workspace")
        });

        Ok(Self {
            config_dir,
            data_dir,
            workspace_root,
        })
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.workspace_root)?;
        Ok(())
    }

    /// Config file: config_dir/config.toml
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }
}

/// Env var override if set and absolute, otherwise the default.
fn env_or<F, D>(env_fn: &F, key: &str, default: D) -> PathBuf
where
    F: Fn(&str) -> std::result::Result<String, std::env::VarError>,
    D: FnOnce() -> PathBuf,
{
    if let Ok(value) = env_fn(key) {
        let path = PathBuf::from(shellexpand::tilde(&value).to_string());
        if path.is_absolute() {
            return path;
        }
    }
    default()
}
