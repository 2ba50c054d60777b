//! Syntax error types.

use std::fmt;

/// A single syntax error with its source position (1-based).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}, column {column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// Every syntax error found in one file. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors {
    pub errors: Vec<ParseError>,
}

impl ParseErrors {
    pub fn count(&self) -> usize {
        self.errors.len()
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} syntax error(s)", self.errors.len())?;
        if let Some(first) = self.errors.first() {
            write!(f, ", first at {}", first)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let errors = ParseErrors {
            errors: vec![
                ParseError::new(3, 7, "expected ';'"),
                ParseError::new(9, 1, "unexpected token"),
            ],
        };
        assert_eq!(errors.count(), 2);
        assert_eq!(
            errors.to_string(),
            "2 syntax error(s), first at line 3, column 7: expected ';'"
        );
    }
}
