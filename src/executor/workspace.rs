use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

/// An ephemeral, single-use directory holding exactly one execution's
/// source file.
///
/// Created immediately before execution, owned exclusively by it, and
/// removed recursively when dropped — on every exit path. Never reused,
/// even by the same caller.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    /// Create a fresh workspace under `root`, optionally namespaced by a
    /// caller identity. Names are collision-resistant so many workspaces
    /// can coexist under one root.
    pub fn create(root: &Path, caller: Option<&str>) -> io::Result<Workspace> {
        let mut path = root.to_path_buf();
        if let Some(caller) = caller {
            path.push(sanitize_component(caller));
        }
        path.push(format!("exec_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&path)?;
        debug!(workspace = %path.display(), "created workspace");
        Ok(Workspace { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the source file byte-for-byte (no re-encoding, no line-ending
    /// translation) and return its path. With `executable`, the file is
    /// also marked executable before any spawn.
    pub fn write_source(
        &self,
        filename: &str,
        source_text: &str,
        executable: bool,
    ) -> io::Result<PathBuf> {
        let file = self.path.join(sanitize_component(filename));
        std::fs::write(&file, source_text.as_bytes())?;

        #[cfg(unix)]
        if executable {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&file)?.permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&file, perms)?;
        }
        #[cfg(not(unix))]
        let _ = executable;

        Ok(file)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        // Cleanup failures don't affect the reported result; log and move on.
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            warn!(
                workspace = %self.path.display(),
                "failed to remove workspace: {}",
                e
            );
        }
    }
}

/// Persistent per-caller directory for shell commands. Created on first
/// use and intentionally not removed.
pub(crate) fn caller_dir(root: &Path, caller: Option<&str>) -> io::Result<PathBuf> {
    let dir = root.join(sanitize_component(caller.unwrap_or("anonymous")));
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Reduce an untrusted string to a single safe path component.
pub(crate) fn sanitize_component(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    // Leading/trailing dots could produce "." or ".." components.
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "anonymous".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_workspace_removed_on_drop() {
        let root = TempDir::new().unwrap();
        let path = {
            let ws = Workspace::create(root.path(), None).unwrap();
            assert!(ws.path().is_dir());
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_workspaces_never_collide() {
        let root = TempDir::new().unwrap();
        let a = Workspace::create(root.path(), Some("alice")).unwrap();
        let b = Workspace::create(root.path(), Some("alice")).unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_caller_namespacing() {
        let root = TempDir::new().unwrap();
        let ws = Workspace::create(root.path(), Some("user-42")).unwrap();
        assert!(ws.path().starts_with(root.path().join("user-42")));
    }

    #[test]
    fn test_source_written_verbatim() {
        let root = TempDir::new().unwrap();
        let ws = Workspace::create(root.path(), None).unwrap();
        // Mixed line endings must survive untouched.
        let source = "line1\r\nline2\nline3";
        let file = ws.write_source("main.py", source, false).unwrap();
        let bytes = std::fs::read(&file).unwrap();
        assert_eq!(bytes, source.as_bytes());
    }

    #[cfg(unix)]
    #[test]
    fn test_executable_bit_applied() {
        use std::os::unix::fs::PermissionsExt;
        let root = TempDir::new().unwrap();
        let ws = Workspace::create(root.path(), None).unwrap();
        let file = ws.write_source("main.sh", "echo hi", true).unwrap();
        let mode = std::fs::metadata(&file).unwrap().permissions().mode();
        assert_eq!(mode & 0o111, 0o111);
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("user-42"), "user-42");
        assert_eq!(sanitize_component("../../etc"), "_.._etc");
        assert_eq!(sanitize_component(".."), "anonymous");
        assert_eq!(sanitize_component("a b/c"), "a_b_c");
        assert_eq!(sanitize_component(""), "anonymous");
        assert_eq!(sanitize_component("main.py"), "main.py");
    }

    #[test]
    fn test_caller_dir_persists() {
        let root = TempDir::new().unwrap();
        let dir = caller_dir(root.path(), Some("user-1")).unwrap();
        assert!(dir.is_dir());
        // Second call reuses the same directory.
        let again = caller_dir(root.path(), Some("user-1")).unwrap();
        assert_eq!(dir, again);
    }
}
