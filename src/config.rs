//! Converter configuration (`--config FILE`)
//!
//! Every setting has a default, so an empty file (or no file at all) gives
//! the stock behavior: dialect detected from the path, `.idl` discovery with
//! the usual exclusions, and `gcc -E -P -x c++` for WebKit sources.

use idl_parser::Dialect;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use crate::discovery::{DiscoveryConfig, IdlFileFilter};
use crate::preprocess::{PreprocessConfig, Preprocessor};

/// Path fragment that marks a WebKit source tree.
pub const DEFAULT_WEBKIT_PATH_MARKER: &str = "WebCore";

/// Error types for config operations
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Dialect selection: forced, or detected from the input path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialectChoice {
    #[default]
    Auto,
    Blink,
    WebKit,
}

impl DialectChoice {
    /// The forced dialect, if any.
    pub fn forced(self) -> Option<Dialect> {
        match self {
            DialectChoice::Auto => None,
            DialectChoice::Blink => Some(Dialect::Blink),
            DialectChoice::WebKit => Some(Dialect::WebKit),
        }
    }
}

impl fmt::Display for DialectChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialectChoice::Auto => write!(f, "auto"),
            DialectChoice::Blink => write!(f, "blink"),
            DialectChoice::WebKit => write!(f, "webkit"),
        }
    }
}

impl FromStr for DialectChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(DialectChoice::Auto),
            "blink" => Ok(DialectChoice::Blink),
            "webkit" => Ok(DialectChoice::WebKit),
            other => Err(format!(
                "unknown dialect '{}' (expected auto, blink or webkit)",
                other
            )),
        }
    }
}

/// Top-level converter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConverterConfig {
    pub dialect: DialectChoice,

    /// Substring of the absolute input path that selects WebKit under `auto`.
    pub webkit_path_marker: String,

    /// Force the `[InterfaceName]` rewrite on or off. Unset follows the dialect.
    pub rewrite_interface_names: Option<bool>,

    pub discovery: DiscoveryConfig,

    pub preprocess: PreprocessConfig,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            dialect: DialectChoice::Auto,
            webkit_path_marker: DEFAULT_WEBKIT_PATH_MARKER.to_string(),
            rewrite_interface_names: None,
            discovery: DiscoveryConfig::default(),
            preprocess: PreprocessConfig::default(),
        }
    }
}

impl ConverterConfig {
    /// Load config from a file path
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_str(&contents)
    }

    /// Parse config from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, ConfigError> {
        let config: ConverterConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.discovery.suffix.is_empty() {
            return Err(ConfigError::ValidationError(
                "'discovery.suffix' cannot be empty".to_string(),
            ));
        }

        if self.dialect == DialectChoice::Auto && self.webkit_path_marker.is_empty() {
            return Err(ConfigError::ValidationError(
                "'webkit_path_marker' cannot be empty when dialect is 'auto'".to_string(),
            ));
        }

        if let Some(ref command) = self.preprocess.command {
            if command.first().map_or(true, |p| p.is_empty()) {
                return Err(ConfigError::ValidationError(
                    "'preprocess.command' must name a program".to_string(),
                ));
            }
        }

        self.file_filter()?;
        Ok(())
    }

    /// Compile the discovery rules.
    pub fn file_filter(&self) -> Result<IdlFileFilter, ConfigError> {
        IdlFileFilter::new(&self.discovery)
            .map_err(|e| ConfigError::ValidationError(format!("Invalid exclude pattern: {}", e)))
    }

    /// Preprocessor to use for `dialect`, if any.
    pub fn preprocessor(&self, dialect: Dialect) -> Result<Option<Preprocessor>, ConfigError> {
        let enabled = self
            .preprocess
            .enabled
            .unwrap_or(dialect == Dialect::WebKit);
        if !enabled {
            return Ok(None);
        }

        match self.preprocess.command {
            Some(ref command) => Preprocessor::new(command.clone())
                .map(Some)
                .map_err(|e| ConfigError::ValidationError(e.to_string())),
            None => Ok(Some(Preprocessor::gcc())),
        }
    }

    /// Whether the `[InterfaceName]` rewrite runs for `dialect`.
    pub fn rewrites_names(&self, dialect: Dialect) -> bool {
        self.rewrite_interface_names
            .unwrap_or_else(|| dialect.rewrites_interface_names())
    }
}
