//! Type references carried by typed members.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::UNION_BASE_TYPE;

/// A type reference as written in IDL source.
///
/// Generic types (`sequence<T>`, `Promise<T>`, `record<K, V>`) keep their
/// parameters in `type_args`; unions use the base type `union`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdlType {
    /// Base type name (e.g., "DOMString", "unsigned long", "Node").
    pub base_type: String,

    /// Type parameters, in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_args: Vec<IdlType>,

    /// Trailing `?`.
    #[serde(default)]
    pub is_nullable: bool,

    /// Legacy `T[]` array suffix.
    #[serde(default)]
    pub is_array: bool,
}

impl IdlType {
    /// Create a plain, non-nullable type.
    pub fn named(base_type: impl Into<String>) -> Self {
        Self {
            base_type: base_type.into(),
            ..Default::default()
        }
    }

    /// Create a generic type such as `sequence<T>`.
    pub fn generic(base_type: impl Into<String>, type_args: Vec<IdlType>) -> Self {
        Self {
            base_type: base_type.into(),
            type_args,
            ..Default::default()
        }
    }

    /// Create a union type.
    pub fn union(members: Vec<IdlType>) -> Self {
        Self::generic(UNION_BASE_TYPE, members)
    }

    /// Mark this type nullable.
    pub fn nullable(mut self) -> Self {
        self.is_nullable = true;
        self
    }

    pub fn is_union(&self) -> bool {
        self.base_type == UNION_BASE_TYPE
    }
}

impl fmt::Display for IdlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_union() {
            write!(f, "(")?;
            for (i, member) in self.type_args.iter().enumerate() {
                if i > 0 {
                    write!(f, " or ")?;
                }
                write!(f, "{}", member)?;
            }
            write!(f, ")")?;
        } else {
            write!(f, "{}", self.base_type)?;
            if !self.type_args.is_empty() {
                write!(f, "<")?;
                for (i, arg) in self.type_args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ">")?;
            }
        }
        if self.is_array {
            write!(f, "[]")?;
        }
        if self.is_nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_simple() {
        assert_eq!(IdlType::named("DOMString").to_string(), "DOMString");
        assert_eq!(IdlType::named("Node").nullable().to_string(), "Node?");
    }

    #[test]
    fn test_display_generic_and_union() {
        let seq = IdlType::generic("sequence", vec![IdlType::named("long")]);
        assert_eq!(seq.to_string(), "sequence<long>");

        let union = IdlType::union(vec![IdlType::named("Node"), IdlType::named("DOMString")]).nullable();
        assert_eq!(union.to_string(), "(Node or DOMString)?");
    }

    #[test]
    fn test_serialization_omits_empty_type_args() {
        let json = serde_json::to_string(&IdlType::named("long")).unwrap();
        assert!(!json.contains("type_args"));
        assert!(json.contains("\"base_type\":\"long\""));
    }
}
