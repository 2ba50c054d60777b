//! Interface-name alias rewriting.
//!
//! The legacy WebKit dialect lets an interface declare its exposed name with
//! `[InterfaceName=Alias]`. After merging, such interfaces are re-keyed
//! under the alias, and every typed member anywhere in the set whose
//! declared type names the old interface is pointed at the alias.

use idl_definitions::{IdlType, InterfaceDefinition, Member};
use std::collections::BTreeMap;

use crate::merger::{MergeWarning, MergedInterfaceSet};

/// Old interface name to alias.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameMap {
    names: BTreeMap<String, String>,
}

impl NameMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every `[InterfaceName=...]` alias in the set.
    pub fn from_interfaces(set: &MergedInterfaceSet) -> Self {
        let mut map = Self::new();
        for (name, interface) in set.iter() {
            if let Some(alias) = interface.interface_name_alias() {
                if alias != name {
                    map.insert(name, alias);
                }
            }
        }
        map
    }

    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.names.insert(from.into(), to.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Rewrite `ty` and every nested type argument through `map`.
pub fn rewrite_type(map: &NameMap, ty: IdlType) -> IdlType {
    let base_type = match map.get(&ty.base_type) {
        Some(alias) => alias.to_string(),
        None => ty.base_type,
    };
    IdlType {
        base_type,
        type_args: ty.type_args.into_iter().map(|t| rewrite_type(map, t)).collect(),
        ..ty
    }
}

/// Rewrite every type reference a member carries.
pub fn rewrite_member(map: &NameMap, member: Member) -> Member {
    member.map_types(&|ty| rewrite_type(map, ty))
}

/// Rename one interface (if mapped) and rewrite all of its typed members.
pub fn rewrite_interface(map: &NameMap, interface: InterfaceDefinition) -> InterfaceDefinition {
    let rewrite = |ty: IdlType| rewrite_type(map, ty);
    let name = map.get(&interface.name).map(str::to_string).unwrap_or(interface.name);
    InterfaceDefinition {
        name,
        attributes: interface.attributes.into_iter().map(|a| a.map_types(&rewrite)).collect(),
        constants: interface.constants.into_iter().map(|c| c.map_types(&rewrite)).collect(),
        operations: interface.operations.into_iter().map(|o| o.map_types(&rewrite)).collect(),
        ..interface
    }
}

/// Apply `map` to a merged set. Runs strictly after merging.
///
/// Returns the re-keyed set plus a `DuplicatePrimary` warning for each alias
/// that lands on a key already taken. A renamed interface wins over an
/// untouched one; between two renamed ones, the later key wins.
pub fn rewrite_names(set: MergedInterfaceSet, map: &NameMap) -> (MergedInterfaceSet, Vec<MergeWarning>) {
    if map.is_empty() {
        return (set, Vec::new());
    }

    let mut warnings = Vec::new();
    let mut renamed = BTreeMap::new();
    let mut untouched = BTreeMap::new();
    for (key, interface) in set {
        let renames = map.get(&key).is_some();
        let interface = rewrite_interface(map, interface);
        if !renames {
            untouched.insert(key, interface);
            continue;
        }
        let alias = interface.name.clone();
        if renamed.insert(alias.clone(), interface).is_some() {
            tracing::warn!(name = %alias, from = %key, "two interfaces share an alias");
            warnings.push(MergeWarning::DuplicatePrimary { name: alias });
        }
    }

    let mut result = MergedInterfaceSet::new();
    for (key, interface) in untouched {
        result.insert(key, interface);
    }
    for (key, interface) in renamed {
        if result.insert(key.clone(), interface).is_some() {
            tracing::warn!(name = %key, "interface alias collides with an existing interface");
            warnings.push(MergeWarning::DuplicatePrimary { name: key });
        }
    }

    tracing::debug!(aliases = map.len(), "rewrote interface names");
    (result, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use idl_definitions::{Argument, Attribute, Constant, Operation};

    fn aliased(name: &str, alias: &str) -> InterfaceDefinition {
        let mut iface = InterfaceDefinition::new(name);
        iface
            .extended_attributes
            .insert("InterfaceName".to_string(), Some(alias.to_string()));
        iface
    }

    fn set_of(interfaces: Vec<InterfaceDefinition>) -> MergedInterfaceSet {
        let mut set = MergedInterfaceSet::new();
        for iface in interfaces {
            set.insert(iface.name.clone(), iface);
        }
        set
    }

    #[test]
    fn test_rename_key_and_self_typed_attribute() {
        let mut foo = aliased("Foo", "Bar");
        foo.attributes.push(Attribute::new("self", IdlType::named("Foo")));
        let set = set_of(vec![foo]);

        let map = NameMap::from_interfaces(&set);
        let (result, warnings) = rewrite_names(set, &map);

        assert!(warnings.is_empty());
        assert!(!result.contains("Foo"));
        let bar = result.get("Bar").unwrap();
        assert_eq!(bar.name, "Bar");
        assert_eq!(bar.attributes[0].idl_type.base_type, "Bar");
    }

    #[test]
    fn test_rewrites_references_in_other_interfaces() {
        let css = aliased("DOMWindowCSS", "CSS");
        let mut window = InterfaceDefinition::new("Window");
        window
            .attributes
            .push(Attribute::new("CSS", IdlType::named("DOMWindowCSS").nullable()));
        window.constants.push(Constant::new("K", IdlType::named("DOMWindowCSS"), "0"));
        window.operations.push(Operation::new(
            "get",
            IdlType::generic("sequence", vec![IdlType::named("DOMWindowCSS")]),
            vec![Argument::new("css", IdlType::named("DOMWindowCSS"))],
        ));
        let set = set_of(vec![css, window]);

        let map = NameMap::from_interfaces(&set);
        let (result, _) = rewrite_names(set, &map);

        let names: Vec<&str> = result.names().collect();
        assert_eq!(names, vec!["CSS", "Window"]);

        let window = result.get("Window").unwrap();
        assert_eq!(window.attributes[0].idl_type.base_type, "CSS");
        assert!(window.attributes[0].idl_type.is_nullable);
        assert_eq!(window.constants[0].idl_type.base_type, "CSS");
        let op = &window.operations[0];
        assert_eq!(op.idl_type.as_ref().unwrap().to_string(), "sequence<CSS>");
        assert_eq!(op.arguments[0].idl_type.base_type, "CSS");
    }

    #[test]
    fn test_only_exact_matches_are_rewritten() {
        let mut map = NameMap::new();
        map.insert("Foo", "Bar");
        let ty = rewrite_type(&map, IdlType::named("FooList"));
        assert_eq!(ty.base_type, "FooList");
    }

    #[test]
    fn test_rewrite_member_argument() {
        let mut map = NameMap::new();
        map.insert("Foo", "Bar");
        let member = rewrite_member(&map, Member::Argument(Argument::new("x", IdlType::named("Foo"))));
        assert_eq!(member, Member::Argument(Argument::new("x", IdlType::named("Bar"))));
    }

    #[test]
    fn test_alias_collision_warns_and_alias_wins() {
        let mut existing = InterfaceDefinition::new("Bar");
        existing.attributes.push(Attribute::new("old", IdlType::named("long")));
        let mut foo = aliased("Foo", "Bar");
        foo.attributes.push(Attribute::new("new", IdlType::named("long")));
        let set = set_of(vec![existing, foo]);

        let map = NameMap::from_interfaces(&set);
        let (result, warnings) = rewrite_names(set, &map);

        assert_eq!(result.len(), 1);
        assert_eq!(result.get("Bar").unwrap().attributes[0].name, "new");
        assert_eq!(
            warnings,
            vec![MergeWarning::DuplicatePrimary {
                name: "Bar".to_string()
            }]
        );
    }

    #[test]
    fn test_two_interfaces_sharing_an_alias_warn() {
        let mut first = aliased("Foo1", "Bar");
        first.attributes.push(Attribute::new("one", IdlType::named("long")));
        let mut second = aliased("Foo2", "Bar");
        second.attributes.push(Attribute::new("two", IdlType::named("long")));
        let set = set_of(vec![first, second]);

        let map = NameMap::from_interfaces(&set);
        let (result, warnings) = rewrite_names(set, &map);

        let names: Vec<&str> = result.names().collect();
        assert_eq!(names, vec!["Bar"]);
        assert_eq!(result.get("Bar").unwrap().attributes[0].name, "two");
        assert_eq!(
            warnings,
            vec![MergeWarning::DuplicatePrimary {
                name: "Bar".to_string()
            }]
        );
    }

    #[test]
    fn test_shared_alias_and_existing_key_warn_for_each() {
        let existing = InterfaceDefinition::new("Bar");
        let set = set_of(vec![existing, aliased("Foo1", "Bar"), aliased("Foo2", "Bar")]);

        let map = NameMap::from_interfaces(&set);
        let (result, warnings) = rewrite_names(set, &map);

        assert_eq!(result.len(), 1);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.code() == "DUPLICATE_PRIMARY"));
    }

    #[test]
    fn test_empty_map_is_identity() {
        let mut foo = InterfaceDefinition::new("Foo");
        foo.attributes.push(Attribute::new("a", IdlType::named("Foo")));
        let set = set_of(vec![foo]);
        let map = NameMap::from_interfaces(&set);
        assert!(map.is_empty());

        let (result, warnings) = rewrite_names(set.clone(), &map);
        assert_eq!(result, set);
        assert!(warnings.is_empty());
    }
}
