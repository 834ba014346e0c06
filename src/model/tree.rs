//! Output tree nodes.

use std::collections::BTreeMap;

use serde::Serialize;

/// An attribute value on a tree node: verbatim text, or a coerced amount.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Verbatim source text (also the degraded form when coercion fails).
    Text(String),
    /// Parsed numeric amount, rounded to two decimal places.
    Number(f64),
}

impl AttrValue {
    /// The text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            AttrValue::Number(_) => None,
        }
    }

    /// The numeric content, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttrValue::Text(_) => None,
            AttrValue::Number(n) => Some(*n),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Number(n)
    }
}

/// A node in the reconstructed hierarchy.
///
/// Each node exclusively owns its children; the roots of one logical table
/// form an ordered list in source order, never re-sorted. Construction is
/// append-only, so the parent/child relation is a strict forest.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode {
    /// Item name.
    pub name: String,

    /// Depth in the output tree. Roots keep their classified level; children
    /// always satisfy `child.level == parent.level + 1`.
    pub level: u8,

    /// Verbatim serial text, when the source row had one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no: Option<String>,

    /// Schema field values.
    pub attributes: BTreeMap<String, AttrValue>,

    /// Child nodes, in source order.
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    /// Create a leaf node.
    pub fn new(name: impl Into<String>, level: u8) -> Self {
        Self {
            name: name.into(),
            level,
            no: None,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree, including self.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }

    /// Depth-first traversal over the subtree.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a TreeNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
