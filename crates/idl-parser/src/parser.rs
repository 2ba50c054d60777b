//! Recursive-descent IDL parser.
//!
//! Produces interface definitions and implements directives. Dictionaries,
//! enums, typedefs and callback functions are recognized and recorded by
//! name only. On a syntax error the parser records it, skips to the end of
//! the enclosing top-level definition and keeps going, so one pass reports
//! every broken definition in a file.

use idl_definitions::{
    Argument, Attribute, Constant, ExtendedAttributes, IdlType, ImplementsRelation,
    InterfaceDefinition, Operation,
};
use serde::{Deserialize, Serialize};

use crate::dialect::DialectFeatures;
use crate::error::ParseError;
use crate::lexer::{Token, TokenKind};

type PResult<T> = Result<T, ParseError>;

/// Keywords that introduce special operations.
const SPECIAL_KEYWORDS: &[&str] = &["getter", "setter", "deleter", "legacycaller", "creator"];

/// Members that are recognized but carry nothing the merge cares about.
const SKIPPED_MEMBER_KEYWORDS: &[&str] = &["serializer", "iterable", "legacyiterable", "maplike", "setlike"];

/// A non-interface definition, recorded so callers can report what was seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherDefinition {
    /// "dictionary", "partial dictionary", "enum", "typedef" or "callback".
    pub kind: String,
    pub name: String,
}

/// Everything one source file declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedFile {
    /// Interfaces (primary and partial) in source order.
    pub interfaces: Vec<InterfaceDefinition>,
    /// `A implements B;` directives in source order.
    pub implements: Vec<ImplementsRelation>,
    pub other_definitions: Vec<OtherDefinition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InterfaceKind {
    Primary,
    Partial,
    Callback,
    Exception,
}

/// What one interface body member parses to.
enum InterfaceMember {
    Attribute(Attribute),
    Constant(Constant),
    Operation(Operation),
}

pub(crate) struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    features: DialectFeatures,
    file: ParsedFile,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    /// `tokens` must end with an `Eof` token.
    pub(crate) fn new(source: &'a str, tokens: Vec<Token>, features: DialectFeatures) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            features,
            file: ParsedFile::default(),
            errors: Vec::new(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<ParsedFile, Vec<ParseError>> {
        self.parse_definitions(false);
        if self.errors.is_empty() {
            Ok(self.file)
        } else {
            Err(self.errors)
        }
    }

    // ------------------------------------------------------------------
    // Token helpers
    // ------------------------------------------------------------------

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + offset).min(last)]
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn bump(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn at_ident(&self, word: &str) -> bool {
        self.peek().is_ident(word)
    }

    fn at_punct(&self, c: char) -> bool {
        self.peek().is_punct(c)
    }

    fn eat_ident(&mut self, word: &str) -> bool {
        if self.at_ident(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.at_punct(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let token = self.peek();
        let found = if token.kind == TokenKind::Eof {
            "end of file".to_string()
        } else {
            format!("'{}'", token.text)
        };
        ParseError::new(
            token.line,
            token.column,
            format!("expected {}, found {}", expected, found),
        )
    }

    fn expect_punct(&mut self, c: char) -> PResult<()> {
        if self.eat_punct(c) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", c)))
        }
    }

    fn expect_word(&mut self, word: &str) -> PResult<()> {
        if self.eat_ident(word) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{}'", word)))
        }
    }

    /// Any identifier, reserved or not (extended attribute names).
    fn expect_any_ident(&mut self) -> PResult<String> {
        if self.peek().kind == TokenKind::Identifier {
            Ok(self.bump().text)
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    /// An identifier usable as a definition or member name.
    fn expect_name(&mut self) -> PResult<String> {
        let token = self.peek();
        if token.kind == TokenKind::Identifier && !self.features.is_reserved(&token.text) {
            Ok(self.bump().text)
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    /// Source text covered by tokens `[from, to)`.
    fn raw_text(&self, from: usize, to: usize) -> String {
        if from >= to {
            return String::new();
        }
        self.source[self.tokens[from].start..self.tokens[to - 1].end].to_string()
    }

    /// Consume tokens up to (not including) a stop character at nesting depth
    /// zero and return their source text, which may be empty.
    fn collect_until(&mut self, stops: &[char]) -> PResult<String> {
        let start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.peek().kind {
                TokenKind::Eof => {
                    let expected: Vec<String> = stops.iter().map(|c| format!("'{}'", c)).collect();
                    return Err(self.unexpected(&expected.join(" or ")));
                }
                TokenKind::Punct(c) if depth == 0 && stops.contains(&c) => break,
                TokenKind::Punct('(' | '[' | '{') => depth += 1,
                TokenKind::Punct(')' | ']' | '}') => {
                    if depth == 0 {
                        break;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.pos += 1;
        }
        Ok(self.raw_text(start, self.pos))
    }

    /// Skip a balanced `open ... close` group, starting at `open`.
    fn skip_balanced(&mut self, open: char, close: char) -> PResult<()> {
        self.expect_punct(open)?;
        let mut depth = 1usize;
        while depth > 0 {
            let token = self.bump();
            match token.kind {
                TokenKind::Eof => return Err(self.unexpected(&format!("'{}'", close))),
                TokenKind::Punct(c) if c == open => depth += 1,
                TokenKind::Punct(c) if c == close => depth -= 1,
                _ => {}
            }
        }
        Ok(())
    }

    /// Rewind to `start` and skip past the end of the definition there.
    fn recover(&mut self, start: usize) {
        self.pos = start;
        let mut depth = 0i32;
        loop {
            let token = self.bump();
            match token.kind {
                TokenKind::Eof => break,
                TokenKind::Punct('{') => depth += 1,
                TokenKind::Punct('}') => depth -= 1,
                TokenKind::Punct(';') if depth <= 0 => break,
                _ => {}
            }
        }
    }

    // ------------------------------------------------------------------
    // Definitions
    // ------------------------------------------------------------------

    fn parse_definitions(&mut self, nested: bool) {
        loop {
            if self.at_eof() || (nested && self.at_punct('}')) {
                break;
            }
            let start = self.pos;
            if let Err(e) = self.parse_definition() {
                self.errors.push(e);
                self.recover(start);
            }
        }
    }

    fn parse_definition(&mut self) -> PResult<()> {
        let ext = self.parse_ext_attrs_opt()?;
        if self.peek().kind != TokenKind::Identifier {
            return Err(self.unexpected("definition"));
        }
        let keyword = self.peek().text.clone();

        match keyword.as_str() {
            "partial" => {
                self.bump();
                if self.at_ident("interface") {
                    let iface = self.parse_interface(ext, InterfaceKind::Partial)?;
                    self.file.interfaces.push(iface);
                } else if self.at_ident("dictionary") {
                    self.parse_dictionary("partial dictionary")?;
                } else {
                    return Err(self.unexpected("'interface' or 'dictionary'"));
                }
            }
            "callback" => {
                self.bump();
                if self.at_ident("interface") {
                    let iface = self.parse_interface(ext, InterfaceKind::Callback)?;
                    self.file.interfaces.push(iface);
                } else {
                    self.parse_callback_function()?;
                }
            }
            "interface" => {
                let iface = self.parse_interface(ext, InterfaceKind::Primary)?;
                self.file.interfaces.push(iface);
            }
            "exception" if self.features.exceptions => {
                let iface = self.parse_interface(ext, InterfaceKind::Exception)?;
                self.file.interfaces.push(iface);
            }
            "dictionary" => self.parse_dictionary("dictionary")?,
            "enum" => self.parse_enum()?,
            "typedef" => self.parse_typedef()?,
            "module" if self.features.modules => self.parse_module()?,
            _ if self.peek_at(1).is_ident("implements") => self.parse_implements()?,
            _ => return Err(self.unexpected("definition")),
        }
        Ok(())
    }

    fn parse_interface(&mut self, ext: ExtendedAttributes, kind: InterfaceKind) -> PResult<InterfaceDefinition> {
        // `interface` or `exception`
        self.bump();

        let mut extended_attributes = ext;
        if self.features.interface_ext_attrs_after_keyword && self.at_punct('[') {
            extended_attributes.extend(self.parse_ext_attrs()?);
        }

        let name = self.expect_name()?;
        let mut parents = Vec::new();
        if self.eat_punct(':') {
            parents.push(self.expect_name()?);
            if self.features.multiple_inheritance {
                while self.eat_punct(',') {
                    parents.push(self.expect_name()?);
                }
            }
        }

        let mut iface = InterfaceDefinition {
            name,
            is_partial: kind == InterfaceKind::Partial,
            is_callback: kind == InterfaceKind::Callback,
            is_exception: kind == InterfaceKind::Exception,
            parent: parents.first().cloned(),
            extra_parents: parents.into_iter().skip(1).collect(),
            extended_attributes,
            ..Default::default()
        };

        self.expect_punct('{')?;
        while !self.at_punct('}') {
            if self.at_eof() {
                return Err(self.unexpected("'}'"));
            }
            self.parse_interface_member(&mut iface)?;
        }
        self.expect_punct('}')?;
        self.expect_punct(';')?;
        Ok(iface)
    }

    fn parse_interface_member(&mut self, iface: &mut InterfaceDefinition) -> PResult<()> {
        let ext = self.parse_ext_attrs_opt()?;
        if self.peek().kind != TokenKind::Identifier && !self.at_punct('(') {
            return Err(self.unexpected("interface member"));
        }
        let keyword = self.peek().text.clone();

        let member = match keyword.as_str() {
            "const" => InterfaceMember::Constant(self.parse_const(ext)?),
            w if SKIPPED_MEMBER_KEYWORDS.contains(&w) => {
                self.skip_member()?;
                return Ok(());
            }
            "readonly" if self.peek_at(1).is_ident("maplike") || self.peek_at(1).is_ident("setlike") => {
                self.skip_member()?;
                return Ok(());
            }
            "stringifier" => {
                self.bump();
                if self.eat_punct(';') {
                    InterfaceMember::Operation(Operation {
                        idl_type: None,
                        specials: vec!["stringifier".to_string()],
                        extended_attributes: ext,
                        ..Default::default()
                    })
                } else if self.at_attribute() {
                    let mut attr = self.parse_attribute(ext)?;
                    attr.is_stringifier = true;
                    InterfaceMember::Attribute(attr)
                } else {
                    self.parse_operation(ext, vec!["stringifier".to_string()], false, iface.is_exception)?
                }
            }
            "static" => {
                self.bump();
                if self.at_attribute() {
                    let mut attr = self.parse_attribute(ext)?;
                    attr.is_static = true;
                    InterfaceMember::Attribute(attr)
                } else {
                    self.parse_operation(ext, Vec::new(), true, false)?
                }
            }
            "inherit" | "readonly" | "attribute" => InterfaceMember::Attribute(self.parse_attribute(ext)?),
            w if SPECIAL_KEYWORDS.contains(&w) => {
                let mut specials = Vec::new();
                while SPECIAL_KEYWORDS.iter().any(|k| self.at_ident(k)) {
                    specials.push(self.bump().text);
                }
                self.parse_operation(ext, specials, false, false)?
            }
            _ => self.parse_operation(ext, Vec::new(), false, iface.is_exception)?,
        };

        match member {
            InterfaceMember::Attribute(attr) => iface.attributes.push(attr),
            InterfaceMember::Constant(constant) => iface.constants.push(constant),
            InterfaceMember::Operation(op) => iface.operations.push(op),
        }
        Ok(())
    }

    fn at_attribute(&self) -> bool {
        self.at_ident("attribute") || self.at_ident("readonly") || self.at_ident("inherit")
    }

    fn skip_member(&mut self) -> PResult<()> {
        self.collect_until(&[';'])?;
        self.expect_punct(';')
    }

    fn parse_const(&mut self, ext: ExtendedAttributes) -> PResult<Constant> {
        self.expect_word("const")?;
        let idl_type = self.parse_type()?;
        let name = self.expect_name()?;
        self.expect_punct('=')?;
        let value = self.collect_until(&[';'])?;
        if value.is_empty() {
            return Err(self.unexpected("constant value"));
        }
        self.expect_punct(';')?;
        Ok(Constant {
            name,
            idl_type,
            value,
            extended_attributes: ext,
        })
    }

    fn parse_attribute(&mut self, ext: ExtendedAttributes) -> PResult<Attribute> {
        let mut attr = Attribute {
            extended_attributes: ext,
            ..Default::default()
        };
        attr.is_inherit = self.eat_ident("inherit");
        attr.is_read_only = self.eat_ident("readonly");
        self.expect_word("attribute")?;

        if self.features.interface_ext_attrs_after_keyword && self.at_punct('[') {
            attr.extended_attributes.extend(self.parse_ext_attrs()?);
        }

        attr.idl_type = self.parse_type()?;
        attr.name = self.expect_name()?;
        if self.features.attribute_accessor_suffixes {
            self.parse_accessor_suffix()?;
        }
        self.expect_punct(';')?;
        Ok(attr)
    }

    /// `getter raises(E)`, `setter raises(E)`, or both joined by a comma.
    fn parse_accessor_suffix(&mut self) -> PResult<()> {
        for _ in 0..2 {
            if !(self.at_ident("getter") || self.at_ident("setter")) {
                break;
            }
            self.bump();
            self.parse_raises_opt()?;
            if !self.eat_punct(',') {
                break;
            }
        }
        Ok(())
    }

    fn parse_raises_opt(&mut self) -> PResult<()> {
        if !(self.features.raises_clauses && self.eat_ident("raises")) {
            return Ok(());
        }
        self.expect_punct('(')?;
        if !self.at_punct(')') {
            self.expect_any_ident()?;
            while self.eat_punct(',') {
                self.expect_any_ident()?;
            }
        }
        self.expect_punct(')')
    }

    /// Regular or special operation. Inside a legacy exception, `Type name;`
    /// declares a read-only field and is returned as an attribute.
    fn parse_operation(
        &mut self,
        ext: ExtendedAttributes,
        specials: Vec<String>,
        is_static: bool,
        in_exception: bool,
    ) -> PResult<InterfaceMember> {
        let return_type = self.parse_type()?;
        let name = if self.peek().kind == TokenKind::Identifier {
            self.expect_name()?
        } else {
            String::new()
        };

        if in_exception && specials.is_empty() && !name.is_empty() && self.eat_punct(';') {
            return Ok(InterfaceMember::Attribute(Attribute {
                name,
                idl_type: return_type,
                is_read_only: true,
                extended_attributes: ext,
                ..Default::default()
            }));
        }

        self.expect_punct('(')?;
        let arguments = self.parse_arguments()?;
        self.expect_punct(')')?;
        self.parse_raises_opt()?;
        self.expect_punct(';')?;

        Ok(InterfaceMember::Operation(Operation {
            name,
            idl_type: Some(return_type),
            arguments,
            specials,
            is_static,
            extended_attributes: ext,
        }))
    }

    fn parse_arguments(&mut self) -> PResult<Vec<Argument>> {
        let mut arguments = Vec::new();
        if self.at_punct(')') {
            return Ok(arguments);
        }
        loop {
            arguments.push(self.parse_argument()?);
            if !self.eat_punct(',') {
                break;
            }
        }
        Ok(arguments)
    }

    fn parse_argument(&mut self) -> PResult<Argument> {
        let mut ext = self.parse_ext_attrs_opt()?;
        if self.features.in_arguments && self.eat_ident("in") {
            ext.extend(self.parse_ext_attrs_opt()?);
        }

        let mut arg = Argument {
            extended_attributes: ext,
            ..Default::default()
        };
        arg.is_optional = self.eat_ident("optional");
        arg.idl_type = self.parse_type()?;
        if !arg.is_optional && self.peek().kind == TokenKind::Ellipsis {
            self.bump();
            arg.is_variadic = true;
        }
        arg.name = self.expect_name()?;

        if arg.is_optional && self.eat_punct('=') {
            let value = self.collect_until(&[',', ')'])?;
            if value.is_empty() {
                return Err(self.unexpected("default value"));
            }
            arg.default_value = Some(value);
        }
        Ok(arg)
    }

    fn parse_callback_function(&mut self) -> PResult<()> {
        let name = self.expect_name()?;
        self.expect_punct('=')?;
        self.parse_type()?;
        self.expect_punct('(')?;
        self.parse_arguments()?;
        self.expect_punct(')')?;
        self.expect_punct(';')?;
        self.record_other("callback", name);
        Ok(())
    }

    fn parse_dictionary(&mut self, kind: &str) -> PResult<()> {
        self.expect_word("dictionary")?;
        let name = self.expect_name()?;
        if self.eat_punct(':') {
            self.expect_name()?;
        }
        self.skip_balanced('{', '}')?;
        self.expect_punct(';')?;
        self.record_other(kind, name);
        Ok(())
    }

    fn parse_enum(&mut self) -> PResult<()> {
        self.expect_word("enum")?;
        let name = self.expect_name()?;
        self.skip_balanced('{', '}')?;
        self.expect_punct(';')?;
        self.record_other("enum", name);
        Ok(())
    }

    fn parse_typedef(&mut self) -> PResult<()> {
        self.expect_word("typedef")?;
        self.parse_ext_attrs_opt()?;
        self.parse_type()?;
        let name = self.expect_name()?;
        self.expect_punct(';')?;
        self.record_other("typedef", name);
        Ok(())
    }

    fn parse_implements(&mut self) -> PResult<()> {
        let left = self.expect_name()?;
        self.expect_word("implements")?;
        let right = self.expect_name()?;
        self.expect_punct(';')?;
        self.file.implements.push(ImplementsRelation::new(left, right));
        Ok(())
    }

    fn parse_module(&mut self) -> PResult<()> {
        self.expect_word("module")?;
        self.expect_name()?;
        self.expect_punct('{')?;
        self.parse_definitions(true);
        self.expect_punct('}')?;
        self.eat_punct(';');
        Ok(())
    }

    fn record_other(&mut self, kind: &str, name: String) {
        self.file.other_definitions.push(OtherDefinition {
            kind: kind.to_string(),
            name,
        });
    }

    // ------------------------------------------------------------------
    // Types
    // ------------------------------------------------------------------

    fn parse_type(&mut self) -> PResult<IdlType> {
        let mut ty = if self.eat_punct('(') {
            let mut members = vec![self.parse_type()?];
            while self.eat_ident("or") {
                members.push(self.parse_type()?);
            }
            if members.len() < 2 {
                return Err(self.unexpected("'or'"));
            }
            self.expect_punct(')')?;
            IdlType::union(members)
        } else {
            self.parse_single_type()?
        };

        loop {
            if self.eat_punct('?') {
                ty.is_nullable = true;
            } else if self.at_punct('[') && self.peek_at(1).is_punct(']') {
                self.pos += 2;
                ty.is_array = true;
            } else {
                break;
            }
        }
        Ok(ty)
    }

    fn parse_single_type(&mut self) -> PResult<IdlType> {
        if self.peek().kind != TokenKind::Identifier {
            return Err(self.unexpected("type"));
        }
        let word = self.bump().text;
        let legacy = self.features.legacy_integer_types;

        let base_type = match word.as_str() {
            "unsigned" => {
                if self.at_ident("short") {
                    self.bump();
                    "unsigned short".to_string()
                } else if self.eat_ident("long") {
                    if self.eat_ident("long") {
                        "unsigned long long".to_string()
                    } else {
                        "unsigned long".to_string()
                    }
                } else if legacy && (self.at_ident("int") || self.at_ident("char")) {
                    format!("unsigned {}", self.bump().text)
                } else {
                    return Err(self.unexpected("integer type after 'unsigned'"));
                }
            }
            "signed" if legacy => {
                if self.at_ident("char") || self.at_ident("short") || self.at_ident("int") {
                    format!("signed {}", self.bump().text)
                } else if self.eat_ident("long") {
                    if self.eat_ident("long") {
                        "signed long long".to_string()
                    } else {
                        "signed long".to_string()
                    }
                } else {
                    return Err(self.unexpected("integer type after 'signed'"));
                }
            }
            "unrestricted" => {
                if self.at_ident("float") || self.at_ident("double") {
                    format!("unrestricted {}", self.bump().text)
                } else {
                    return Err(self.unexpected("'float' or 'double'"));
                }
            }
            "long" => {
                if self.eat_ident("long") {
                    "long long".to_string()
                } else {
                    "long".to_string()
                }
            }
            "sequence" | "FrozenArray" | "Promise" if self.at_punct('<') => {
                self.bump();
                let inner = self.parse_type()?;
                self.expect_punct('>')?;
                return Ok(IdlType::generic(word, vec![inner]));
            }
            "record" if self.at_punct('<') => {
                self.bump();
                let key = self.parse_type()?;
                self.expect_punct(',')?;
                let value = self.parse_type()?;
                self.expect_punct('>')?;
                return Ok(IdlType::generic(word, vec![key, value]));
            }
            _ => word,
        };
        Ok(IdlType::named(base_type))
    }

    // ------------------------------------------------------------------
    // Extended attributes
    // ------------------------------------------------------------------

    fn parse_ext_attrs_opt(&mut self) -> PResult<ExtendedAttributes> {
        if self.at_punct('[') {
            self.parse_ext_attrs()
        } else {
            Ok(ExtendedAttributes::new())
        }
    }

    fn parse_ext_attrs(&mut self) -> PResult<ExtendedAttributes> {
        self.expect_punct('[')?;
        let mut attrs = ExtendedAttributes::new();
        loop {
            let name = self.expect_any_ident()?;
            let value = self.parse_ext_attr_value()?;
            attrs.insert(name, value);
            if !self.eat_punct(',') {
                break;
            }
        }
        self.expect_punct(']')?;
        Ok(attrs)
    }

    fn parse_ext_attr_value(&mut self) -> PResult<Option<String>> {
        if self.at_punct('(') {
            let start = self.pos;
            self.skip_balanced('(', ')')?;
            return Ok(Some(self.raw_text(start, self.pos)));
        }
        if !self.eat_punct('=') {
            return Ok(None);
        }

        let legacy = self.features.legacy_ext_attr_values;
        let start = self.pos;
        let token = self.peek().clone();
        match token.kind {
            TokenKind::Punct('(') => self.skip_balanced('(', ')')?,
            TokenKind::String => {
                self.bump();
                return Ok(Some(token.text.trim_matches('"').to_string()));
            }
            TokenKind::Integer if legacy => {
                self.bump();
            }
            TokenKind::Identifier => {
                self.bump();
                if self.at_punct('(') {
                    self.skip_balanced('(', ')')?;
                } else if legacy {
                    if (token.text == "unsigned" || token.text == "signed") && self.peek().kind == TokenKind::Identifier {
                        self.bump();
                    }
                    while self.eat_punct('&') || self.eat_punct('|') {
                        self.expect_any_ident()?;
                    }
                }
            }
            TokenKind::Punct(',') | TokenKind::Punct(']') if legacy => {
                return Ok(Some(String::new()));
            }
            _ => return Err(self.unexpected("extended attribute value")),
        }
        Ok(Some(self.raw_text(start, self.pos)))
    }
}
