// ── Settings model and diff-merge ──
//
// Desired AP state lives in a two-level tree: top-level scalar settings
// (region, 11ax toggle) plus one section per radio interface. The merge
// operation is the reconciliation core: it rejects unknown keys, writes
// only values that actually differ, and reports whether anything
// changed so callers can skip the (slow, disruptive) GUI push entirely
// on no-op updates.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ApError;

/// A single scalar setting value.
///
/// AP GUIs mix numeric channels, string modes, and on/off toggles;
/// equality is type-strict, so drivers must store and update settings
/// with consistent types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Int(i64),
    Str(String),
    Bool(bool),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(b) => write!(f, "{}", i64::from(*b)),
        }
    }
}

impl From<i64> for SettingValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for SettingValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_owned())
    }
}

impl From<String> for SettingValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<bool> for SettingValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl SettingValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Bool(b) => Some(i64::from(*b)),
            Self::Str(_) => None,
        }
    }
}

/// A node in the settings tree: either a leaf value or a nested section
/// (one per radio interface).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingNode {
    Value(SettingValue),
    Section(SettingsTree),
}

/// Outcome of a merge: did anything change, and did any changed key
/// contain "status" (radio on/off toggles need an extra GUI page visit
/// on some models).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub changed: bool,
    pub status_toggled: bool,
}

// ── Settings tree ───────────────────────────────────────────────────

/// Ordered settings tree keyed by setting name.
///
/// The schema is fixed at construction: merging never creates new keys,
/// so a typo in an update surfaces as [`ApError::InvalidSettingsKey`]
/// instead of silently growing the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsTree(BTreeMap<String, SettingNode>);

impl SettingsTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or overwrite a leaf value. Construction-time only; runtime
    /// mutation goes through [`SettingsTree::merge_from`].
    pub fn insert_value(&mut self, key: impl Into<String>, value: impl Into<SettingValue>) {
        self.0
            .insert(key.into(), SettingNode::Value(value.into()));
    }

    /// Insert or overwrite a nested section.
    pub fn insert_section(&mut self, key: impl Into<String>, section: SettingsTree) {
        self.0.insert(key.into(), SettingNode::Section(section));
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&SettingNode> {
        self.0.get(key)
    }

    /// A top-level leaf value.
    pub fn value(&self, key: &str) -> Option<&SettingValue> {
        match self.0.get(key) {
            Some(SettingNode::Value(v)) => Some(v),
            _ => None,
        }
    }

    /// A nested section (e.g. one interface's settings).
    pub fn section(&self, key: &str) -> Option<&SettingsTree> {
        match self.0.get(key) {
            Some(SettingNode::Section(s)) => Some(s),
            _ => None,
        }
    }

    pub fn section_mut(&mut self, key: &str) -> Option<&mut SettingsTree> {
        match self.0.get_mut(key) {
            Some(SettingNode::Section(s)) => Some(s),
            _ => None,
        }
    }

    /// A leaf value inside a named section.
    pub fn section_value(&self, section: &str, key: &str) -> Option<&SettingValue> {
        self.section(section)?.value(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingNode)> {
        self.0.iter()
    }

    /// Recursively merge `updates` into this tree.
    ///
    /// Every key in `updates` must already exist here with the same shape
    /// (leaf vs. section). Values equal to the current ones are skipped;
    /// only real differences are written and reported. Any changed leaf
    /// whose key contains `"status"` sets `status_toggled` -- the flag
    /// propagates to the top level regardless of nesting depth.
    pub fn merge_from(&mut self, updates: &SettingsTree) -> Result<MergeOutcome, ApError> {
        let mut outcome = MergeOutcome::default();
        // Merge into a scratch copy so a rejected key leaves the tree
        // untouched.
        let mut scratch = self.clone();
        merge_into(&mut scratch, updates, &mut outcome)?;
        *self = scratch;
        Ok(outcome)
    }
}

fn merge_into(
    current: &mut SettingsTree,
    updates: &SettingsTree,
    outcome: &mut MergeOutcome,
) -> Result<(), ApError> {
    for (key, update) in &updates.0 {
        let Some(existing) = current.0.get_mut(key) else {
            return Err(ApError::InvalidSettingsKey { key: key.clone() });
        };
        match (existing, update) {
            (SettingNode::Section(cur), SettingNode::Section(upd)) => {
                merge_into(cur, upd, outcome)?;
            }
            (SettingNode::Value(cur), SettingNode::Value(upd)) => {
                if cur != upd {
                    *cur = upd.clone();
                    outcome.changed = true;
                    if key.contains("status") {
                        outcome.status_toggled = true;
                    }
                }
            }
            // Leaf vs. section shape mismatch is a schema violation,
            // same as an unknown key.
            _ => {
                return Err(ApError::InvalidSettingsKey { key: key.clone() });
            }
        }
    }
    Ok(())
}

// ── Update builder ──────────────────────────────────────────────────

/// A pending settings update: a tree argument plus named single-key
/// assignments, mirroring "dict plus keyword arguments" call sites.
///
/// Collapsing the two forms detects keys passed twice, which always
/// indicates a caller bug even when the values agree.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    tree: SettingsTree,
    named: Vec<(String, SettingNode)>,
}

impl SettingsUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_tree(tree: SettingsTree) -> Self {
        Self {
            tree,
            named: Vec::new(),
        }
    }

    /// Add a named top-level value assignment.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.named
            .push((key.into(), SettingNode::Value(value.into())));
        self
    }

    /// Add a named section assignment.
    pub fn set_section(mut self, key: impl Into<String>, section: SettingsTree) -> Self {
        self.named.push((key.into(), SettingNode::Section(section)));
        self
    }

    /// Shorthand for updating one setting of one interface.
    pub fn interface_value(
        interface: &str,
        key: impl Into<String>,
        value: impl Into<SettingValue>,
    ) -> Self {
        let mut section = SettingsTree::new();
        section.insert_value(key, value);
        Self::new().set_section(interface, section)
    }

    /// Collapse into a single update tree, rejecting duplicate keys.
    pub fn into_tree(self) -> Result<SettingsTree, ApError> {
        let mut tree = self.tree;
        let mut duplicates = Vec::new();
        for (key, node) in self.named {
            if tree.0.contains_key(&key) {
                duplicates.push(key);
            } else {
                tree.0.insert(key, node);
            }
        }
        if duplicates.is_empty() {
            Ok(tree)
        } else {
            Err(ApError::DuplicateSettingsKeys { keys: duplicates })
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────
