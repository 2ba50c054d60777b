//! Grammar dialects.
//!
//! The legacy WebKit dialect (r147502-era IDL) is the current grammar plus a
//! fixed set of old productions. Each production is a flag here so the
//! parser stays a single recursive-descent implementation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Words that are reserved in the legacy dialect.
pub const LEGACY_KEYWORDS: &[&str] = &["char", "in", "int", "raises", "signed"];

/// Supported IDL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Current Blink Web IDL.
    #[default]
    Blink,
    /// Old WebKit IDL.
    WebKit,
}

impl Dialect {
    pub fn features(self) -> DialectFeatures {
        match self {
            Dialect::Blink => DialectFeatures::default(),
            Dialect::WebKit => DialectFeatures {
                in_arguments: true,
                raises_clauses: true,
                attribute_accessor_suffixes: true,
                interface_ext_attrs_after_keyword: true,
                multiple_inheritance: true,
                legacy_ext_attr_values: true,
                legacy_integer_types: true,
                modules: true,
                exceptions: true,
                reserved_words: LEGACY_KEYWORDS,
            },
        }
    }

    /// Whether the interface-name alias rewrite applies after merging.
    pub fn rewrites_interface_names(self) -> bool {
        matches!(self, Dialect::WebKit)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Blink => write!(f, "blink"),
            Dialect::WebKit => write!(f, "webkit"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blink" => Ok(Dialect::Blink),
            "webkit" => Ok(Dialect::WebKit),
            other => Err(format!("unknown dialect: {}", other)),
        }
    }
}

/// Productions enabled on top of the base grammar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DialectFeatures {
    /// `in` before an argument.
    pub in_arguments: bool,
    /// `raises(A, B)` after an operation.
    pub raises_clauses: bool,
    /// `getter raises(...)` / `setter raises(...)` after an attribute name.
    pub attribute_accessor_suffixes: bool,
    /// `interface [ExtAttrs] Name` and `attribute [ExtAttrs] Type name`.
    pub interface_ext_attrs_after_keyword: bool,
    /// `interface A : B, C`.
    pub multiple_inheritance: bool,
    /// `[Name=1]`, `[Name=A&B|C]`, `[Name=]`, `[Name=unsigned char]`.
    pub legacy_ext_attr_values: bool,
    /// `int`, `unsigned int`, `signed char`, `unsigned char`.
    pub legacy_integer_types: bool,
    /// `module name { ... };`
    pub modules: bool,
    /// `exception Name { ... };`
    pub exceptions: bool,
    /// Words that cannot be used as identifiers.
    pub reserved_words: &'static [&'static str],
}

impl DialectFeatures {
    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved_words.contains(&word)
    }
}
