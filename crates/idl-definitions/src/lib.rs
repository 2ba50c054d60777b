//! IDL Definition Types
//!
//! Defines the structures the parser produces and the merger consumes:
//! interfaces, their members, and the type references those members carry.

pub mod interface;
pub mod member;
pub mod types;

pub use interface::{ImplementsRelation, InterfaceDefinition};
pub use member::{Argument, Attribute, Constant, ExtendedAttributes, Member, Operation};
pub use types::IdlType;

/// Extended attribute that renames an interface in the legacy WebKit dialect.
pub const INTERFACE_NAME_ATTRIBUTE: &str = "InterfaceName";

/// Base type used for union types; members live in `type_args`.
pub const UNION_BASE_TYPE: &str = "union";
