//! Interface definitions and implements directives.

use serde::{Deserialize, Serialize};

use crate::member::{Attribute, Constant, ExtendedAttributes, Operation};
use crate::INTERFACE_NAME_ATTRIBUTE;

/// One `interface` (or legacy `exception`) definition as parsed.
///
/// Partial definitions share a name with their primary but stay distinct
/// values until merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterfaceDefinition {
    pub name: String,

    #[serde(default)]
    pub is_partial: bool,

    #[serde(default)]
    pub is_callback: bool,

    /// Legacy `exception` definition.
    #[serde(default)]
    pub is_exception: bool,

    /// Inherited interface.
    #[serde(default)]
    pub parent: Option<String>,

    /// Additional parents from legacy multiple inheritance.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_parents: Vec<String>,

    #[serde(default)]
    pub attributes: Vec<Attribute>,

    #[serde(default)]
    pub constants: Vec<Constant>,

    #[serde(default)]
    pub operations: Vec<Operation>,

    #[serde(default)]
    pub extended_attributes: ExtendedAttributes,
}

impl InterfaceDefinition {
    /// Create an empty primary interface.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create an empty partial interface.
    pub fn partial(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_partial: true,
            ..Default::default()
        }
    }

    /// Append another definition's members after this one's, category by
    /// category. Nothing is deduplicated or reordered.
    pub fn append_members(&mut self, other: &InterfaceDefinition) {
        self.attributes.extend(other.attributes.iter().cloned());
        self.constants.extend(other.constants.iter().cloned());
        self.operations.extend(other.operations.iter().cloned());
    }

    /// Alias declared through `[InterfaceName=...]`, if any.
    pub fn interface_name_alias(&self) -> Option<&str> {
        self.extended_attributes
            .get(INTERFACE_NAME_ATTRIBUTE)
            .and_then(|v| v.as_deref())
            .filter(|v| !v.is_empty())
    }

    pub fn member_count(&self) -> usize {
        self.attributes.len() + self.constants.len() + self.operations.len()
    }
}

/// `Left implements Right;`: Left gains the members of Right.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImplementsRelation {
    pub left_interface: String,
    pub right_interface: String,
}

impl ImplementsRelation {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left_interface: left.into(),
            right_interface: right.into(),
        }
    }
}
