use serde::Serialize;
use std::path::PathBuf;

/// A language the executor knows how to run.
///
/// Closed set; extending it is one `LanguageSpec` row plus a variant here,
/// never a new branch in the execution path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    Javascript,
    Bash,
}

/// Interpreter invocation details for one language.
#[derive(Debug, Clone)]
pub struct LanguageSpec {
    /// Display name ("Python").
    pub name: &'static str,

    /// Canonical request tag ("python").
    pub key: &'static str,

    /// Interpreter binary looked up on PATH.
    pub interpreter: &'static str,

    /// Source file extension, including the dot.
    pub extension: &'static str,

    /// Mark the source file executable before spawning.
    pub needs_exec_bit: bool,

    /// Look the interpreter up on PATH before spawning, so a missing
    /// binary yields an explicit diagnostic instead of a raw OS error.
    pub probe_before_spawn: bool,
}

static PYTHON: LanguageSpec = LanguageSpec {
    name: "Python",
    key: "python",
    interpreter: "python3",
    extension: ".py",
    needs_exec_bit: false,
    probe_before_spawn: false,
};

static JAVASCRIPT: LanguageSpec = LanguageSpec {
    name: "JavaScript",
    key: "javascript",
    interpreter: "node",
    extension: ".js",
    needs_exec_bit: false,
    probe_before_spawn: true,
};

static BASH: LanguageSpec = LanguageSpec {
    name: "Bash",
    key: "bash",
    interpreter: "bash",
    extension: ".sh",
    needs_exec_bit: true,
    probe_before_spawn: false,
};

impl Language {
    pub const ALL: [Language; 3] = [Language::Python, Language::Javascript, Language::Bash];

    /// Dispatch table lookup.
    pub fn spec(self) -> &'static LanguageSpec {
        match self {
            Language::Python => &PYTHON,
            Language::Javascript => &JAVASCRIPT,
            Language::Bash => &BASH,
        }
    }

    /// Parse a caller-supplied language tag. Case-insensitive; accepts
    /// the common "js" shorthand. Unknown tags are `None`.
    pub fn parse(tag: &str) -> Option<Language> {
        match tag.to_ascii_lowercase().as_str() {
            "python" => Some(Language::Python),
            "javascript" | "js" => Some(Language::Javascript),
            "bash" => Some(Language::Bash),
            _ => None,
        }
    }

    /// Language for a source file extension (without the dot), used by
    /// the CLI to infer the language from a file name.
    pub fn for_extension(ext: &str) -> Option<Language> {
        let dotted = format!(".{}", ext.to_ascii_lowercase());
        Language::ALL
            .into_iter()
            .find(|lang| lang.spec().extension == dotted)
    }
}

/// One row of the `languages` listing.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageInfo {
    pub name: &'static str,
    pub key: &'static str,
    pub extension: &'static str,
    pub available: bool,
}

/// All registered languages with interpreter availability, probed on PATH.
pub fn supported_languages() -> Vec<LanguageInfo> {
    Language::ALL
        .into_iter()
        .map(|lang| {
            let spec = lang.spec();
            LanguageInfo {
                name: spec.name,
                key: spec.key,
                extension: spec.extension,
                available: find_in_path(spec.interpreter).is_some(),
            }
        })
        .collect()
}

/// Locate a binary on PATH.
pub fn find_in_path(binary: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        assert_eq!(Language::parse("python"), Some(Language::Python));
        assert_eq!(Language::parse("PYTHON"), Some(Language::Python));
        assert_eq!(Language::parse("js"), Some(Language::Javascript));
        assert_eq!(Language::parse("javascript"), Some(Language::Javascript));
        assert_eq!(Language::parse("bash"), Some(Language::Bash));
        assert_eq!(Language::parse("ruby"), None);
        assert_eq!(Language::parse(""), None);
    }

    #[test]
    fn test_for_extension() {
        assert_eq!(Language::for_extension("py"), Some(Language::Python));
        assert_eq!(Language::for_extension("JS"), Some(Language::Javascript));
        assert_eq!(Language::for_extension("sh"), Some(Language::Bash));
        assert_eq!(Language::for_extension("rb"), None);
    }

    #[test]
    fn test_table_is_well_formed() {
        for lang in Language::ALL {
            let spec = lang.spec();
            assert!(spec.extension.starts_with('.'));
            assert!(!spec.interpreter.is_empty());
            assert_eq!(Language::parse(spec.key), Some(lang));
        }
    }

    #[test]
    fn test_listing_covers_all_languages() {
        let listing = supported_languages();
        assert_eq!(listing.len(), Language::ALL.len());
    }

    #[cfg(unix)]
    #[test]
    fn test_find_in_path_locates_sh() {
        // sh is guaranteed on any POSIX system
        assert!(find_in_path("sh").is_some());
        assert!(find_in_path("definitely-not-a-real-binary-name").is_none());
    }
}
