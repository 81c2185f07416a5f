//! Content values the coordinator can track.

use serde_json::Value;

/// A full-document snapshot handed to the coordinator.
///
/// Snapshots are compared by value. `is_blank` decides whether a draft counts
/// as empty when blank drafts are configured to be skipped.
pub trait DraftContent: Clone + PartialEq + Send + Sync + 'static {
    /// Whether this snapshot carries no meaningful content.
    fn is_blank(&self) -> bool;
}

impl DraftContent for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

/// Serialized rich-text documents (`{"type": "doc", "content": [...]}` trees).
///
/// A node is blank when it has no text and all of its children are blank.
/// Objects without a `type` key are treated as data and never blank unless empty.
impl DraftContent for Value {
    fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(text) => text.trim().is_empty(),
            Value::Array(items) => items.iter().all(DraftContent::is_blank),
            Value::Object(map) => {
                if map.is_empty() {
                    return true;
                }
                if !map.contains_key("type") {
                    return false;
                }
                let text_blank = map.get("text").map_or(true, DraftContent::is_blank);
                let children_blank = map.get("content").map_or(true, DraftContent::is_blank);
                text_blank && children_blank
            }
            Value::Bool(_) | Value::Number(_) => false,
        }
    }
}
