//! External preprocessor invocation
//!
//! Legacy WebKit IDL files carry C preprocessor conditionals, so they are run
//! through a C preprocessor before parsing.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Default preprocessor for the WebKit dialect.
pub const DEFAULT_COMMAND: &[&str] = &["gcc", "-E", "-P", "-x", "c++"];

/// Errors from running the preprocessor
#[derive(Debug, thiserror::Error)]
pub enum PreprocessError {
    #[error("Failed to spawn preprocessor '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Preprocessor exited with {status} for {path}: {stderr}")]
    Failed {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("Preprocessor command is empty")]
    EmptyCommand,
}

/// Preprocessor settings (`[preprocess]` in the config file).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Run the preprocessor. Unset means "only for the WebKit dialect".
    pub enabled: Option<bool>,

    /// Program and arguments; the file path is appended last.
    pub command: Option<Vec<String>>,
}

/// A configured preprocessor command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessor {
    command: Vec<String>,
}

impl Preprocessor {
    pub fn new(command: Vec<String>) -> Result<Self, PreprocessError> {
        if command.is_empty() || command[0].is_empty() {
            return Err(PreprocessError::EmptyCommand);
        }
        Ok(Self { command })
    }

    /// `gcc -E -P -x c++`
    pub fn gcc() -> Self {
        Self {
            command: DEFAULT_COMMAND.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// Run on `path` and return the preprocessed text.
    pub fn run(&self, path: &Path) -> Result<String, PreprocessError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or(PreprocessError::EmptyCommand)?;

        tracing::debug!(program = %program, path = %path.display(), "running preprocessor");
        let output = Command::new(program)
            .args(args)
            .arg(path)
            .output()
            .map_err(|source| PreprocessError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(PreprocessError::Failed {
                path: path.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_command_rejected() {
        assert!(matches!(
            Preprocessor::new(vec![]),
            Err(PreprocessError::EmptyCommand)
        ));
        assert!(matches!(
            Preprocessor::new(vec![String::new()]),
            Err(PreprocessError::EmptyCommand)
        ));
    }

    #[test]
    fn test_gcc_default() {
        assert_eq!(Preprocessor::gcc().command(), ["gcc", "-E", "-P", "-x", "c++"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_captures_stdout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Foo.idl");
        fs::write(&path, "interface Foo {};\n").unwrap();

        let pp = Preprocessor::new(vec!["cat".to_string()]).unwrap();
        assert_eq!(pp.run(&path).unwrap(), "interface Foo {};\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_nonzero_exit_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.idl");

        let pp = Preprocessor::new(vec!["cat".to_string()]).unwrap();
        let err = pp.run(&missing).unwrap_err();
        assert!(matches!(err, PreprocessError::Failed { .. }));
    }

    #[test]
    fn test_spawn_failure_is_an_error() {
        let pp = Preprocessor::new(vec!["definitely-not-a-real-preprocessor".to_string()]).unwrap();
        let err = pp.run(Path::new("Foo.idl")).unwrap_err();
        assert!(matches!(err, PreprocessError::Spawn { .. }));
    }
}
