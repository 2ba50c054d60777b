//! Dialect-aware Web IDL parser.
//!
//! Turns IDL source text into [`ParsedFile`] values holding interface
//! definitions and implements directives. A file with any syntax error is
//! rejected as a whole; no partial results are returned.

mod dialect;
mod error;
mod lexer;
mod parser;

pub use dialect::{Dialect, DialectFeatures, LEGACY_KEYWORDS};
pub use error::{ParseError, ParseErrors};
pub use lexer::{tokenize, Token, TokenKind};
pub use parser::{OtherDefinition, ParsedFile};

use std::path::Path;

/// Source of parsed definitions for one file.
///
/// The merge pipeline only depends on this trait, so the grammar
/// implementation can be swapped without touching merge logic.
pub trait IdlParser {
    /// Dialect this parser accepts.
    fn dialect(&self) -> Dialect;

    /// Parse one file's contents. `path` is used for diagnostics only.
    fn parse_text(&self, path: &Path, source: &str) -> Result<ParsedFile, ParseErrors>;
}

/// The built-in recursive-descent parser, configured by dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialectParser {
    dialect: Dialect,
}

impl DialectParser {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }
}

impl IdlParser for DialectParser {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn parse_text(&self, path: &Path, source: &str) -> Result<ParsedFile, ParseErrors> {
        let result = parse(source, self.dialect);
        match &result {
            Ok(file) => tracing::debug!(
                path = %path.display(),
                dialect = %self.dialect,
                interfaces = file.interfaces.len(),
                implements = file.implements.len(),
                "parsed IDL file"
            ),
            Err(errors) => tracing::debug!(
                path = %path.display(),
                dialect = %self.dialect,
                errors = errors.count(),
                "IDL file has syntax errors"
            ),
        }
        result
    }
}

/// Parse `source` with the given dialect.
pub fn parse(source: &str, dialect: Dialect) -> Result<ParsedFile, ParseErrors> {
    let tokens = tokenize(source).map_err(|errors| ParseErrors { errors })?;
    parser::Parser::new(source, tokens, dialect.features())
        .parse()
        .map_err(|errors| ParseErrors { errors })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reports_lexer_errors() {
        let err = parse("interface Foo { attribute long a; }; #", Dialect::Blink).unwrap_err();
        assert_eq!(err.count(), 1);
        assert!(err.errors[0].message.contains("unexpected character"));
    }

    #[test]
    fn test_dialect_parser_trait() {
        let parser = DialectParser::new(Dialect::WebKit);
        assert_eq!(parser.dialect(), Dialect::WebKit);
        let file = parser
            .parse_text(Path::new("Foo.idl"), "interface Foo { void f(in long x) raises(E); };")
            .unwrap();
        assert_eq!(file.interfaces[0].operations[0].arguments[0].name, "x");
    }

    #[test]
    fn test_empty_source_is_valid() {
        let file = parse("// nothing here\n", Dialect::Blink).unwrap();
        assert!(file.interfaces.is_empty());
        assert!(file.implements.is_empty());
    }
}
