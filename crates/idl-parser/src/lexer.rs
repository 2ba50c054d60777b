//! IDL tokenizer.
//!
//! Splits source text into identifiers, numeric and string literals and
//! punctuation. Keywords are not distinguished here; the parser matches
//! identifiers contextually against the active dialect.

use regex_lite::Regex;
use std::sync::OnceLock;

use crate::error::ParseError;

/// Token classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Integer,
    Float,
    String,
    /// `...`
    Ellipsis,
    /// Single punctuation character.
    Punct(char),
    Eof,
}

/// A token with its source span (byte offsets) and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn is_ident(&self, word: &str) -> bool {
        self.kind == TokenKind::Identifier && self.text == word
    }

    pub fn is_punct(&self, c: char) -> bool {
        self.kind == TokenKind::Punct(c)
    }
}

const PUNCTUATION: &[char] = &[
    '(', ')', '{', '}', '[', ']', '<', '>', ';', ':', ',', '=', '?', '&', '|', '.', '-', '*',
];

fn float_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-?(([0-9]+\.[0-9]*|[0-9]*\.[0-9]+)([Ee][+-]?[0-9]+)?|[0-9]+[Ee][+-]?[0-9]+)")
            .expect("float pattern is valid")
    })
}

fn integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-?([1-9][0-9]*|0[Xx][0-9A-Fa-f]+|0[0-7]*)").expect("integer pattern is valid")
    })
}

fn identifier_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^_?[A-Za-z][0-9A-Z_a-z-]*").expect("identifier pattern is valid"))
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn advance(&mut self, len: usize) {
        let consumed = &self.source[self.pos..self.pos + len];
        for c in consumed.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += len;
    }

    /// Skip whitespace and comments. Returns an error for an unterminated
    /// block comment.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            let rest = self.rest();
            let trimmed = rest.trim_start();
            if trimmed.len() != rest.len() {
                self.advance(rest.len() - trimmed.len());
                continue;
            }
            if rest.starts_with("//") {
                let len = rest.find('\n').unwrap_or(rest.len());
                self.advance(len);
                continue;
            }
            if rest.starts_with("/*") {
                let (line, column) = (self.line, self.column);
                match rest[2..].find("*/") {
                    Some(end) => {
                        self.advance(end + 4);
                        continue;
                    }
                    None => {
                        self.advance(rest.len());
                        return Err(ParseError::new(line, column, "unterminated comment"));
                    }
                }
            }
            return Ok(());
        }
    }

    fn token(&mut self, kind: TokenKind, len: usize) -> Token {
        let token = Token {
            kind,
            text: self.source[self.pos..self.pos + len].to_string(),
            start: self.pos,
            end: self.pos + len,
            line: self.line,
            column: self.column,
        };
        self.advance(len);
        token
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_trivia()?;
        let rest = self.rest();
        if rest.is_empty() {
            return Ok(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                start: self.pos,
                end: self.pos,
                line: self.line,
                column: self.column,
            });
        }

        // Floats first so that "1.5" is not split into "1" and ".5".
        if let Some(m) = float_re().find(rest) {
            return Ok(self.token(TokenKind::Float, m.end()));
        }
        if let Some(m) = integer_re().find(rest) {
            return Ok(self.token(TokenKind::Integer, m.end()));
        }
        if let Some(m) = identifier_re().find(rest) {
            return Ok(self.token(TokenKind::Identifier, m.end()));
        }
        if rest.starts_with('"') {
            return match rest[1..].find('"') {
                Some(end) => Ok(self.token(TokenKind::String, end + 2)),
                None => {
                    let err = ParseError::new(self.line, self.column, "unterminated string literal");
                    self.advance(rest.len());
                    Err(err)
                }
            };
        }
        if rest.starts_with("...") {
            return Ok(self.token(TokenKind::Ellipsis, 3));
        }

        let c = rest.chars().next().unwrap_or('\0');
        if PUNCTUATION.contains(&c) {
            return Ok(self.token(TokenKind::Punct(c), 1));
        }

        let err = ParseError::new(self.line, self.column, format!("unexpected character '{}'", c));
        self.advance(c.len_utf8());
        Err(err)
    }
}

/// Tokenize `source`. The returned vector always ends with an `Eof` token.
///
/// Lexing continues past bad characters so that every error in the file is
/// reported at once.
pub fn tokenize(source: &str) -> Result<Vec<Token>, Vec<ParseError>> {
    let mut lexer = Lexer {
        source,
        pos: 0,
        line: 1,
        column: 1,
    };
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    loop {
        match lexer.next_token() {
            Ok(token) => {
                let done = token.kind == TokenKind::Eof;
                tokens.push(token);
                if done {
                    break;
                }
            }
            Err(e) => errors.push(e),
        }
    }

    if errors.is_empty() {
        Ok(tokens)
    } else {
        Err(errors)
    }
}
