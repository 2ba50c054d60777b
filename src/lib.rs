//! IDL diff - Web IDL interface merging
//!
//! Reads a tree of Web IDL files (Blink or legacy WebKit dialect), folds
//! partial interfaces and `implements` directives into their primary
//! interfaces, and emits one JSON object keyed by interface name.

pub mod config;
pub mod converter;
pub mod discovery;
pub mod merger;
pub mod preprocess;
pub mod rewrite;

pub use config::{ConfigError, ConverterConfig, DialectChoice};
pub use converter::{convert_path, detect_dialect, Conversion, ConvertError, Converter, ParseFailure};
pub use merger::{InterfaceMerger, MergeWarning, MergedInterfaceSet};
pub use rewrite::{rewrite_names, NameMap};

pub use idl_definitions as definitions;
pub use idl_parser::{Dialect, IdlParser};
