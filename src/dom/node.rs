//! Node types: NodeId, NodeData, and the attribute names the runtime reads.

use std::collections::BTreeMap;

use slotmap::new_key_type;

new_key_type! {
    /// Unique identifier for a DOM node. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Attribute carrying a component instance's identity.
pub const IDENTITY_ATTR: &str = "uuid";

/// Attribute marking an element as a resolvable view slot.
pub const SLOT_MARKER_ATTR: &str = "type";

/// Value of [`SLOT_MARKER_ATTR`] on view slot roots.
pub const SLOT_MARKER: &str = "RouteView";

/// Tag used for text nodes.
pub const TEXT_TAG: &str = "#text";

/// Data associated with a single DOM node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Element tag (e.g. "div"), or [`TEXT_TAG`] for text nodes.
    pub tag: String,
    /// Attributes, kept sorted so serialisation is deterministic.
    pub attributes: BTreeMap<String, String>,
    /// Text content. Only set on text nodes.
    pub text: Option<String>,
}

impl NodeData {
    /// Create an element node with no attributes.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            text: None,
        }
    }

    /// Create a text node.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            tag: TEXT_TAG.to_owned(),
            attributes: BTreeMap::new(),
            text: Some(content.into()),
        }
    }

    /// Set an attribute (builder).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Look up an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// The component identity carried by this node, if any.
    pub fn identity(&self) -> Option<&str> {
        self.attr(IDENTITY_ATTR)
    }

    /// Whether this node is the root of a view slot.
    pub fn is_view_slot(&self) -> bool {
        self.attr(SLOT_MARKER_ATTR) == Some(SLOT_MARKER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_has_no_attributes() {
        let data = NodeData::new("div");
        assert_eq!(data.tag, "div");
        assert!(data.attributes.is_empty());
        assert_eq!(data.text, None);
    }

    #[test]
    fn text_node() {
        let data = NodeData::text("hello");
        assert_eq!(data.tag, TEXT_TAG);
        assert_eq!(data.text.as_deref(), Some("hello"));
    }

    #[test]
    fn with_attr_overwrites() {
        let data = NodeData::new("a").with_attr("href", "/x").with_attr("href", "/y");
        assert_eq!(data.attr("href"), Some("/y"));
        assert_eq!(data.attributes.len(), 1);
    }

    #[test]
    fn identity_reads_uuid_attribute() {
        let data = NodeData::new("div").with_attr(IDENTITY_ATTR, "RouteView-1");
        assert_eq!(data.identity(), Some("RouteView-1"));
        assert_eq!(NodeData::new("div").identity(), None);
    }

    #[test]
    fn view_slot_marker() {
        let slot = NodeData::new("div").with_attr(SLOT_MARKER_ATTR, SLOT_MARKER);
        assert!(slot.is_view_slot());
        let other = NodeData::new("input").with_attr(SLOT_MARKER_ATTR, "text");
        assert!(!other.is_view_slot());
    }

    #[test]
    fn node_id_is_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<NodeId>();
    }
}
