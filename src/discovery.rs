//! IDL source discovery
//!
//! Finds candidate `.idl` files under a root directory, applying the
//! exclusion rules from [`DiscoveryConfig`].

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Files known not to parse.
const DEFAULT_EXCLUDED_NAMES: &[&str] = &["InjectedScriptHost.idl", "InspectorInstrumentation.idl"];

/// Paths containing "test" hold test fixtures, not shipped interfaces.
const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["*test*"];

/// Errors for discovery
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Glob pattern error: {0}")]
    GlobError(#[from] globset::Error),
}

/// Discovery settings (`[discovery]` in the config file).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Required file-name suffix.
    pub suffix: String,

    /// File names to skip wherever they appear.
    pub exclude_names: Vec<String>,

    /// Glob patterns matched against the whole path. `*` also matches `/`.
    pub exclude_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            suffix: ".idl".to_string(),
            exclude_names: DEFAULT_EXCLUDED_NAMES.iter().map(|s| s.to_string()).collect(),
            exclude_patterns: DEFAULT_EXCLUDE_PATTERNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Compiled candidate-file predicate.
#[derive(Debug, Clone)]
pub struct IdlFileFilter {
    suffix: String,
    exclude_names: Vec<String>,
    exclude_set: GlobSet,
}

impl IdlFileFilter {
    pub fn new(config: &DiscoveryConfig) -> Result<Self, DiscoveryError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.exclude_patterns {
            if !pattern.is_empty() {
                builder.add(Glob::new(pattern)?);
            }
        }

        Ok(Self {
            suffix: config.suffix.clone(),
            exclude_names: config.exclude_names.clone(),
            exclude_set: builder.build()?,
        })
    }

    pub fn has_suffix(&self, path: &Path) -> bool {
        path.to_string_lossy().ends_with(&self.suffix)
    }

    /// Check if a path is excluded by name or pattern
    pub fn is_excluded(&self, path: &Path) -> bool {
        let name_excluded = path
            .file_name()
            .map(|n| self.exclude_names.iter().any(|x| n.to_string_lossy() == x.as_str()))
            .unwrap_or(false);
        name_excluded || self.exclude_set.is_match(path.to_string_lossy().as_ref())
    }

    /// Suffix matches and no exclusion applies.
    pub fn is_candidate(&self, path: &Path) -> bool {
        self.has_suffix(path) && !self.is_excluded(path)
    }
}

/// Files to process for `path`.
///
/// A path with the IDL suffix is used as given, without exclusion checks.
/// Anything else is walked recursively in file-name order.
pub fn target_files(path: &Path, filter: &IdlFileFilter) -> Result<Vec<PathBuf>, DiscoveryError> {
    if filter.has_suffix(path) && !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path)
        .follow_links(false)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
    {
        let entry = entry.map_err(|source| DiscoveryError::Walk {
            path: path.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if filter.is_candidate(entry.path()) {
            files.push(entry.path().to_path_buf());
        } else {
            tracing::trace!(path = %entry.path().display(), "skipping file");
        }
    }

    tracing::debug!(root = %path.display(), files = files.len(), "discovered IDL files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn default_filter() -> IdlFileFilter {
        IdlFileFilter::new(&DiscoveryConfig::default()).unwrap()
    }

    #[test]
    fn test_default_excludes_test_paths() {
        let filter = default_filter();
        assert!(filter.is_excluded(Path::new("Source/core/testing/Internals.idl")));
        assert!(filter.is_excluded(Path::new("/src/web_tests/fast/dom/Foo.idl")));
        assert!(!filter.is_excluded(Path::new("Source/core/dom/Node.idl")));
    }

    #[test]
    fn test_default_excludes_known_bad_names() {
        let filter = default_filter();
        assert!(filter.is_excluded(Path::new("inspector/InjectedScriptHost.idl")));
        assert!(filter.is_excluded(Path::new("InspectorInstrumentation.idl")));
    }

    #[test]
    fn test_suffix_required() {
        let filter = default_filter();
        assert!(filter.is_candidate(Path::new("dom/Node.idl")));
        assert!(!filter.is_candidate(Path::new("dom/Node.h")));
        assert!(!filter.is_candidate(Path::new("dom/idl")));
    }

    #[test]
    fn test_custom_patterns_replace_defaults() {
        let config = DiscoveryConfig {
            exclude_patterns: vec!["**/inspector/**".to_string()],
            ..Default::default()
        };
        let filter = IdlFileFilter::new(&config).unwrap();
        assert!(!filter.is_excluded(Path::new("core/testing/Internals.idl")));
        assert!(filter.is_excluded(Path::new("core/inspector/Foo.idl")));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let config = DiscoveryConfig {
            exclude_patterns: vec!["[unclosed".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            IdlFileFilter::new(&config),
            Err(DiscoveryError::GlobError(_))
        ));
    }

    #[test]
    fn test_target_files_walks_sorted() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("Source");
        fs::create_dir_all(root.join("dom")).unwrap();
        fs::create_dir_all(root.join("css")).unwrap();
        fs::write(root.join("dom/Node.idl"), "").unwrap();
        fs::write(root.join("dom/Element.idl"), "").unwrap();
        fs::write(root.join("css/CSSRule.idl"), "").unwrap();
        fs::write(root.join("css/README"), "").unwrap();
        fs::write(root.join("dom/InjectedScriptHost.idl"), "").unwrap();

        let files = target_files(&root, &default_filter()).unwrap();
        let rel: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(&root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["css/CSSRule.idl", "dom/Element.idl", "dom/Node.idl"]);
    }

    #[test]
    fn test_single_file_is_used_as_given() {
        let filter = default_filter();
        let files = target_files(Path::new("fixtures/test/Foo.idl"), &filter).unwrap();
        assert_eq!(files, vec![PathBuf::from("fixtures/test/Foo.idl")]);
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let err = target_files(Path::new("/definitely/not/here"), &default_filter()).unwrap_err();
        assert!(matches!(err, DiscoveryError::Walk { .. }));
    }
}
