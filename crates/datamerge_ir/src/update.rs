//! Resolved property edits

use crate::property::PropertyKey;
use crate::value::Value;
use datamerge_scene::NodeId;

/// One property edit aimed at one element of one copy
///
/// Built while resolving a normalized record against a freshly cloned
/// subtree and consumed in the same merge.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyUpdate {
    /// Element being edited
    pub target: NodeId,
    /// Name the element was matched by
    pub element_name: String,
    pub property: PropertyKey,
    pub value: Value,
}

impl PropertyUpdate {
    pub fn new(target: NodeId, element_name: impl Into<String>, property: &str, value: Value) -> Self {
        Self {
            target,
            element_name: element_name.into(),
            property: PropertyKey::parse(property),
            value,
        }
    }
}
