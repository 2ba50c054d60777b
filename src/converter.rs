//! IDL tree to merged-JSON conversion
//!
//! Drives one run end to end: discover files, read or preprocess each one,
//! parse it with the dialect's parser, register everything it declares, then
//! merge and (for WebKit) apply `[InterfaceName]` aliases.

use idl_parser::{Dialect, DialectParser, IdlParser, ParseErrors};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, ConverterConfig};
use crate::discovery::{target_files, DiscoveryError};
use crate::merger::{InterfaceMerger, MergeWarning, MergedInterfaceSet};
use crate::preprocess::{PreprocessError, Preprocessor};
use crate::rewrite::{rewrite_names, NameMap};

/// A source file that failed to parse. Aborts the run.
#[derive(Debug, thiserror::Error)]
#[error("{}: {errors}", path.display())]
pub struct ParseFailure {
    pub path: PathBuf,
    pub errors: ParseErrors,
}

/// Fatal conversion errors
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Syntax error in {0}")]
    Parse(#[from] ParseFailure),

    #[error(transparent)]
    Preprocess(#[from] PreprocessError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub dialect: Dialect,
    pub files_processed: usize,
    pub interfaces: MergedInterfaceSet,
    /// Merge warnings followed by rewrite warnings.
    pub warnings: Vec<MergeWarning>,
}

impl Conversion {
    /// Pretty JSON object keyed by interface name.
    pub fn to_json(&self) -> Result<String, ConvertError> {
        Ok(self.interfaces.to_json()?)
    }
}

/// Accumulates the definitions of one run.
pub struct Converter {
    parser: Box<dyn IdlParser>,
    merger: InterfaceMerger,
    preprocessor: Option<Preprocessor>,
    rewrite_names: bool,
    files_processed: usize,
}

impl Converter {
    /// Converter using the built-in parser for `dialect`.
    pub fn new(dialect: Dialect, config: &ConverterConfig) -> Result<Self, ConfigError> {
        Self::with_parser(Box::new(DialectParser::new(dialect)), config)
    }

    /// Converter using a caller-supplied parser.
    pub fn with_parser(parser: Box<dyn IdlParser>, config: &ConverterConfig) -> Result<Self, ConfigError> {
        let dialect = parser.dialect();
        Ok(Self {
            preprocessor: config.preprocessor(dialect)?,
            rewrite_names: config.rewrites_names(dialect),
            parser,
            merger: InterfaceMerger::new(),
            files_processed: 0,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.parser.dialect()
    }

    /// Read, parse and register one file.
    pub fn process_idl_file(&mut self, path: &Path) -> Result<(), ConvertError> {
        let source = match self.preprocessor {
            Some(ref pp) => pp.run(path)?,
            None => fs::read_to_string(path).map_err(|source| ConvertError::Io {
                path: path.to_path_buf(),
                source,
            })?,
        };
        self.process_source(path, &source)
    }

    /// Parse and register already-loaded source text.
    pub fn process_source(&mut self, path: &Path, source: &str) -> Result<(), ConvertError> {
        let parsed = self
            .parser
            .parse_text(path, source)
            .map_err(|errors| ParseFailure {
                path: path.to_path_buf(),
                errors,
            })?;

        for definition in parsed.interfaces {
            self.merger.register(definition);
        }
        for relation in parsed.implements {
            self.merger
                .register_implements(relation.left_interface, relation.right_interface);
        }
        if !parsed.other_definitions.is_empty() {
            tracing::trace!(
                path = %path.display(),
                count = parsed.other_definitions.len(),
                "ignoring non-interface definitions"
            );
        }

        self.files_processed += 1;
        Ok(())
    }

    /// Merge everything registered so far and apply name aliases.
    pub fn finish(mut self) -> Conversion {
        let mut interfaces = self.merger.merge();
        let mut warnings = self.merger.take_warnings();

        if self.rewrite_names {
            let map = NameMap::from_interfaces(&interfaces);
            let (rewritten, rewrite_warnings) = rewrite_names(interfaces, &map);
            interfaces = rewritten;
            warnings.extend(rewrite_warnings);
        }

        tracing::info!(
            dialect = %self.parser.dialect(),
            files = self.files_processed,
            interfaces = interfaces.len(),
            warnings = warnings.len(),
            "conversion finished"
        );

        Conversion {
            dialect: self.parser.dialect(),
            files_processed: self.files_processed,
            interfaces,
            warnings,
        }
    }
}

/// WebKit when the absolute form of `path` contains `marker`, Blink otherwise.
///
/// The absolute form is lexical: relative paths are joined onto the current
/// directory and symlinks are not resolved.
pub fn detect_dialect(path: &Path, marker: &str) -> Dialect {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    if !marker.is_empty() && absolute.to_string_lossy().contains(marker) {
        Dialect::WebKit
    } else {
        Dialect::Blink
    }
}

/// The configured dialect, or the detected one under `auto`.
pub fn resolve_dialect(path: &Path, config: &ConverterConfig) -> Dialect {
    config
        .dialect
        .forced()
        .unwrap_or_else(|| detect_dialect(path, &config.webkit_path_marker))
}

/// Convert a file or directory tree.
pub fn convert_path(path: &Path, config: &ConverterConfig) -> Result<Conversion, ConvertError> {
    let dialect = resolve_dialect(path, config);
    let filter = config.file_filter()?;
    let files = target_files(path, &filter)?;
    tracing::debug!(path = %path.display(), %dialect, files = files.len(), "starting conversion");

    let mut converter = Converter::new(dialect, config)?;
    for file in &files {
        converter.process_idl_file(file)?;
    }
    Ok(converter.finish())
}
