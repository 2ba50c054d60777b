//! Interface members: attributes, constants, operations and their arguments.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::IdlType;

/// Extended attributes keyed by name. `[Foo]` has no value, `[Foo=Bar]`
/// has `Some("Bar")`.
pub type ExtendedAttributes = BTreeMap<String, Option<String>>;

/// `attribute` member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub idl_type: IdlType,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_read_only: bool,
    #[serde(default)]
    pub is_inherit: bool,
    #[serde(default)]
    pub is_stringifier: bool,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

/// `const` member.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Constant {
    pub name: String,
    pub idl_type: IdlType,
    /// Literal value as written in source.
    pub value: String,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

/// Operation argument.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub idl_type: IdlType,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_variadic: bool,
    /// Default value literal, if any.
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

/// Regular or special operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Operation {
    /// Empty for anonymous special operations.
    pub name: String,
    /// Return type. None only for the bare `stringifier;` member.
    pub idl_type: Option<IdlType>,
    #[serde(default)]
    pub arguments: Vec<Argument>,
    /// Special keywords in source order (getter, setter, deleter, ...).
    #[serde(default)]
    pub specials: Vec<String>,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

impl Attribute {
    pub fn new(name: impl Into<String>, idl_type: IdlType) -> Self {
        Self {
            name: name.into(),
            idl_type,
            ..Default::default()
        }
    }
}

impl Constant {
    pub fn new(name: impl Into<String>, idl_type: IdlType, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            idl_type,
            value: value.into(),
            ..Default::default()
        }
    }
}

impl Argument {
    pub fn new(name: impl Into<String>, idl_type: IdlType) -> Self {
        Self {
            name: name.into(),
            idl_type,
            ..Default::default()
        }
    }
}

impl Operation {
    pub fn new(name: impl Into<String>, return_type: IdlType, arguments: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            idl_type: Some(return_type),
            arguments,
            ..Default::default()
        }
    }
}

impl Attribute {
    pub fn map_types<F: Fn(IdlType) -> IdlType>(mut self, f: &F) -> Self {
        self.idl_type = f(self.idl_type);
        self
    }
}

impl Constant {
    pub fn map_types<F: Fn(IdlType) -> IdlType>(mut self, f: &F) -> Self {
        self.idl_type = f(self.idl_type);
        self
    }
}

impl Argument {
    pub fn map_types<F: Fn(IdlType) -> IdlType>(mut self, f: &F) -> Self {
        self.idl_type = f(self.idl_type);
        self
    }
}

impl Operation {
    /// Maps the return type and every argument type.
    pub fn map_types<F: Fn(IdlType) -> IdlType>(mut self, f: &F) -> Self {
        self.idl_type = self.idl_type.map(f);
        self.arguments = self.arguments.into_iter().map(|arg| arg.map_types(f)).collect();
        self
    }
}

/// Any member that carries a type reference.
///
/// The set of kinds is closed; code that needs to touch every type in an
/// interface matches on this instead of dispatching through a visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Attribute(Attribute),
    Constant(Constant),
    Operation(Operation),
    Argument(Argument),
}

impl Member {
    /// Apply `f` to every type reference held directly or through arguments.
    pub fn map_types<F>(self, f: &F) -> Self
    where
        F: Fn(IdlType) -> IdlType,
    {
        match self {
            Member::Attribute(a) => Member::Attribute(a.map_types(f)),
            Member::Constant(c) => Member::Constant(c.map_types(f)),
            Member::Operation(op) => Member::Operation(op.map_types(f)),
            Member::Argument(arg) => Member::Argument(arg.map_types(f)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rename_foo(t: IdlType) -> IdlType {
        if t.base_type == "Foo" {
            IdlType { base_type: "Bar".to_string(), ..t }
        } else {
            t
        }
    }

    #[test]
    fn test_map_types_attribute() {
        let member = Member::Attribute(Attribute::new("self", IdlType::named("Foo").nullable()));
        match member.map_types(&rename_foo) {
            Member::Attribute(a) => {
                assert_eq!(a.idl_type.base_type, "Bar");
                assert!(a.idl_type.is_nullable);
            }
            other => panic!("unexpected member: {:?}", other),
        }
    }

    #[test]
    fn test_map_types_operation_covers_arguments() {
        let op = Operation::new(
            "adopt",
            IdlType::named("Foo"),
            vec![Argument::new("node", IdlType::named("Foo")), Argument::new("n", IdlType::named("long"))],
        );
        match Member::Operation(op).map_types(&rename_foo) {
            Member::Operation(op) => {
                assert_eq!(op.idl_type.unwrap().base_type, "Bar");
                assert_eq!(op.arguments[0].idl_type.base_type, "Bar");
                assert_eq!(op.arguments[1].idl_type.base_type, "long");
            }
            other => panic!("unexpected member: {:?}", other),
        }
    }

    #[test]
    fn test_stringifier_operation_has_no_type() {
        let op = Operation {
            specials: vec!["stringifier".to_string()],
            ..Default::default()
        };
        match Member::Operation(op).map_types(&rename_foo) {
            Member::Operation(op) => assert!(op.idl_type.is_none()),
            other => panic!("unexpected member: {:?}", other),
        }
    }
}
