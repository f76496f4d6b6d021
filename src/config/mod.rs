use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::paths::Paths;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Resolved XDG-compliant paths (not serialized)
    #[serde(skip)]
    pub paths: Paths,

    #[serde(default)]
    pub executor: ExecutorConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Override for the workspace root directory. Defaults to the XDG
    /// data directory (data_dir/workspace) when unset.
    #[serde(default)]
    pub workspace_root: Option<String>,

    /// Kill an execution after this many seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum bytes captured from each of stdout and stderr (default: 1MB)
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: u64,

    /// Shell command substrings rejected before spawning
    #[serde(default = "default_blocked_commands")]
    pub blocked_commands: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_output_bytes() -> u64 {
    1_048_576 // 1MB
}
fn default_blocked_commands() -> Vec<String> {
    [
        "rm -rf",
        "sudo",
        "su ",
        "passwd",
        "chmod 777",
        "dd if=",
        "mkfs",
        "fdisk",
        "mount",
        "umount",
        "iptables",
        "ufw",
        "systemctl",
        "service ",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            workspace_root: None,
            timeout_secs: default_timeout_secs(),
            max_output_bytes: default_max_output_bytes(),
            blocked_commands: default_blocked_commands(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let paths = Paths::resolve()?;
        paths.ensure_dirs()?;
        let path = paths.config_file();

        if !path.exists() {
            // Create default config file on first run
            let config = Config {
                paths,
                ..Config::default()
            };
            config.save_with_template()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.paths = paths;

        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = self.paths.config_file();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;

        Ok(())
    }

    /// Save config with a helpful template (for first-time setup)
    pub fn save_with_template(&self) -> Result<()> {
        let path = self.paths.config_file();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(())
    }

    /// Effective workspace root: config override (tilde-expanded), else
    /// the resolved XDG default.
    pub fn workspace_root_path(&self) -> PathBuf {
        match &self.executor.workspace_root {
            Some(root) => PathBuf::from(shellexpand::tilde(root).to_string()),
            None => self.paths.workspace_root.clone(),
        }
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = r#"# codebox configuration
#
# Snippets run as subprocesses in single-use scratch directories under
# the workspace root, with a wall-clock deadline and an output ceiling.
# There is no OS-level containment; see the README before exposing this
# to untrusted users.

[executor]
# Root directory for execution workspaces.
# Default: $XDG_DATA_HOME/codebox/workspace
# workspace_root = "~/.local/share/codebox/workspace"

# Kill an execution after this many seconds.
timeout_secs = 30

# Maximum bytes captured from each of stdout and stderr.
max_output_bytes = 1048576

# Shell command substrings rejected before spawning.
# blocked_commands = ["rm -rf", "sudo"]

[logging]
# trace | debug | info | warn | error
level = "info"
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExecutorConfig::default();
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.max_output_bytes, 1_048_576);
        assert!(config.workspace_root.is_none());
        assert!(config.blocked_commands.iter().any(|p| p == "rm -rf"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [executor]
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.executor.timeout_secs, 5);
        assert_eq!(config.executor.max_output_bytes, 1_048_576);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_template_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.executor.timeout_secs, 30);
        assert_eq!(config.executor.max_output_bytes, 1_048_576);
    }

    #[test]
    fn test_workspace_root_override() {
        let mut config = Config::default();
        config.paths.workspace_root = PathBuf::from("/data/workspace");
        assert_eq!(
            config.workspace_root_path(),
            PathBuf::from("/data/workspace")
        );

        config.executor.workspace_root = Some("/srv/codebox".to_string());
        assert_eq!(config.workspace_root_path(), PathBuf::from("/srv/codebox"));
    }
}
