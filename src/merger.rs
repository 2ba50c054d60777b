//! Partial and implements merging.
//!
//! Collects interface definitions from every input file of a run and folds
//! partial interfaces and `implements` directives into their primary
//! interfaces. Inconsistencies never abort the run; they are recorded as
//! [`MergeWarning`]s.

use idl_definitions::InterfaceDefinition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Non-fatal merge diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MergeWarning {
    /// A partial interface has no primary definition. Its members are dropped.
    #[error("partial interface {name} is found but no primary definition found; ignoring it")]
    DanglingPartial { name: String },

    /// An implements directive names an interface that was never defined.
    #[error("{left} implements {right}, but cannot find {right}")]
    DanglingImplements { left: String, right: String },

    /// A primary interface was defined more than once; the later one wins.
    #[error("interface {name} is defined more than once; using the last definition")]
    DuplicatePrimary { name: String },
}

impl MergeWarning {
    /// Machine-readable code, stable for automation.
    pub fn code(&self) -> &'static str {
        match self {
            MergeWarning::DanglingPartial { .. } => "DANGLING_PARTIAL",
            MergeWarning::DanglingImplements { .. } => "DANGLING_IMPLEMENTS",
            MergeWarning::DuplicatePrimary { .. } => "DUPLICATE_PRIMARY",
        }
    }
}

/// Interface name to merged definition, sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MergedInterfaceSet {
    interfaces: BTreeMap<String, InterfaceDefinition>,
}

impl MergedInterfaceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&InterfaceDefinition> {
        self.interfaces.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.interfaces.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.interfaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    /// Interface names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.interfaces.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InterfaceDefinition)> {
        self.interfaces.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Insert under `key`, returning the definition it replaced.
    pub fn insert(&mut self, key: String, definition: InterfaceDefinition) -> Option<InterfaceDefinition> {
        self.interfaces.insert(key, definition)
    }

    /// Pretty-printed JSON with sorted keys.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.interfaces)
    }
}

impl IntoIterator for MergedInterfaceSet {
    type Item = (String, InterfaceDefinition);
    type IntoIter = std::collections::btree_map::IntoIter<String, InterfaceDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.interfaces.into_iter()
    }
}

/// Accumulates definitions for one run and merges them.
///
/// Call order is `register*`, `register_implements*`, then `merge()` once.
#[derive(Debug, Default)]
pub struct InterfaceMerger {
    primary: BTreeMap<String, InterfaceDefinition>,
    /// Every partial, in registration order.
    partials: Vec<InterfaceDefinition>,
    implements: BTreeMap<String, Vec<String>>,
    warnings: Vec<MergeWarning>,
}

impl InterfaceMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a parsed definition in the primary or partial bucket.
    pub fn register(&mut self, definition: InterfaceDefinition) {
        if definition.is_partial {
            self.partials.push(definition);
            return;
        }
        let name = definition.name.clone();
        if self.primary.insert(name.clone(), definition).is_some() {
            self.warn(MergeWarning::DuplicatePrimary { name });
        }
    }

    /// Record `left implements right`. Validation waits for `merge()`, since
    /// `right` may be defined in a file that has not been read yet.
    pub fn register_implements(&mut self, left: impl Into<String>, right: impl Into<String>) {
        self.implements.entry(left.into()).or_default().push(right.into());
    }

    /// Run both merge phases and return the merged primaries.
    ///
    /// Partials are applied first, in registration order. Implements
    /// directives are applied second; donors are read as they stand after
    /// the partial phase. The primary bucket is updated in place, so a second
    /// call appends everything again.
    pub fn merge(&mut self) -> MergedInterfaceSet {
        self.merge_partials();
        self.merge_implements();

        tracing::info!(
            interfaces = self.primary.len(),
            partials = self.partials.len(),
            warnings = self.warnings.len(),
            "merged interface definitions"
        );

        MergedInterfaceSet {
            interfaces: self.primary.clone(),
        }
    }

    fn merge_partials(&mut self) {
        let mut dangling = Vec::new();
        for partial in &self.partials {
            match self.primary.get_mut(&partial.name) {
                Some(interface) => interface.append_members(partial),
                None => dangling.push(MergeWarning::DanglingPartial {
                    name: partial.name.clone(),
                }),
            }
        }
        for warning in dangling {
            self.warn(warning);
        }
    }

    fn merge_implements(&mut self) {
        let donors = self.primary.clone();
        let mut dangling = Vec::new();

        for (left, interface) in self.primary.iter_mut() {
            let Some(rights) = self.implements.get(left) else {
                continue;
            };
            for right in rights {
                match donors.get(right) {
                    Some(donor) => interface.append_members(donor),
                    None => dangling.push(MergeWarning::DanglingImplements {
                        left: left.clone(),
                        right: right.clone(),
                    }),
                }
            }
        }
        for warning in dangling {
            self.warn(warning);
        }
    }

    fn warn(&mut self, warning: MergeWarning) {
        tracing::warn!(code = warning.code(), "{}", warning);
        self.warnings.push(warning);
    }

    /// Diagnostics recorded so far, in emission order.
    pub fn warnings(&self) -> &[MergeWarning] {
        &self.warnings
    }

    pub fn take_warnings(&mut self) -> Vec<MergeWarning> {
        std::mem::take(&mut self.warnings)
    }
}
