//! Tree operations: insert, remove, attribute edits, walk, mutation log.

use std::collections::{BTreeMap, HashMap, VecDeque};

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId, IDENTITY_ATTR};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// A structural change to the tree.
///
/// The log only records child-list changes; attribute edits keep the identity
/// index current but are not reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Inserted(NodeId),
    Removed(NodeId),
}

/// The live document, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
/// Nodes carrying an identity attribute are indexed so components can locate
/// their root without scanning.
pub struct Dom {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    root: Option<NodeId>,
    identities: HashMap<String, NodeId>,
    mutations: Vec<Mutation>,
}

impl Dom {
    /// Create an empty DOM.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
            identities: HashMap::new(),
            mutations: Vec::new(),
        }
    }

    /// Insert a root-level node (no parent).
    ///
    /// If no root has been set yet, this node becomes the root.
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.alloc(data);
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Insert a node as the last child of `parent`.
    ///
    /// Returns `None` if `parent` does not exist.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> Option<NodeId> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        let id = self.alloc(data);
        self.parent.insert(id, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            siblings.push(id);
        }
        Some(id)
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let identity = data.identity().map(str::to_owned);
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if let Some(identity) = identity {
            self.identities.insert(identity, id);
        }
        self.mutations.push(Mutation::Inserted(id));
        id
    }

    /// Remove a node and all its descendants.
    ///
    /// Returns the `NodeData` for the removed node, or `None` if it didn't exist.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        if let Some(parent_id) = self.parent.remove(id) {
            if let Some(siblings) = self.children.get_mut(parent_id) {
                siblings.retain(|&child| child != id);
            }
        }

        if self.root == Some(id) {
            self.root = None;
        }

        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed_root_data = None;

        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            self.parent.remove(current);
            if let Some(data) = self.nodes.remove(current) {
                self.unindex(current, &data);
                self.mutations.push(Mutation::Removed(current));
                if current == id {
                    removed_root_data = Some(data);
                }
            }
        }

        removed_root_data
    }

    /// Remove every child of `id` (and their subtrees), keeping `id` itself.
    pub fn clear_children(&mut self, id: NodeId) {
        let kids = self.children(id).to_vec();
        for child in kids {
            self.remove(child);
        }
    }

    /// Set a single attribute on a node. Returns `false` if the node is gone.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> bool {
        let mut attributes = match self.nodes.get(id) {
            Some(data) => data.attributes.clone(),
            None => return false,
        };
        attributes.insert(name.to_owned(), value.into());
        self.replace_attributes(id, attributes)
    }

    /// Replace all attributes of a node, keeping the identity index in sync.
    pub fn replace_attributes(&mut self, id: NodeId, attributes: BTreeMap<String, String>) -> bool {
        let Some(data) = self.nodes.get_mut(id) else {
            return false;
        };
        let old = std::mem::replace(&mut data.attributes, attributes);
        let new_identity = data.identity().map(str::to_owned);

        if let Some(old_identity) = old.get(IDENTITY_ATTR) {
            if self.identities.get(old_identity) == Some(&id) {
                self.identities.remove(old_identity);
            }
        }
        if let Some(identity) = new_identity {
            self.identities.insert(identity, id);
        }
        true
    }

    /// Change an element's tag in place. Text nodes and missing nodes are
    /// left alone and report `false`.
    pub fn set_tag(&mut self, id: NodeId, tag: &str) -> bool {
        match self.nodes.get_mut(id) {
            Some(data) if data.text.is_none() => {
                if data.tag != tag {
                    data.tag = tag.to_owned();
                }
                true
            }
            _ => false,
        }
    }

    fn unindex(&mut self, id: NodeId, data: &NodeData) {
        if let Some(identity) = data.identity() {
            if self.identities.get(identity) == Some(&id) {
                self.identities.remove(identity);
            }
        }
    }

    /// The node currently carrying `identity`, if it is in the document.
    pub fn find_by_identity(&self, identity: &str) -> Option<NodeId> {
        self.identities.get(identity).copied()
    }

    /// Drain the mutation log.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    /// Whether any mutation has been recorded since the last drain.
    pub fn has_mutations(&self) -> bool {
        !self.mutations.is_empty()
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no children
    /// or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// The current root node, if set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes in the DOM.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the DOM is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the DOM contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start` (document order).
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a small test tree:
    /// ```text
    ///       body
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (Dom, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut dom = Dom::new();
        let root = dom.insert(NodeData::new("body"));
        let a = dom
            .insert_child(root, NodeData::new("div").with_attr(IDENTITY_ATTR, "A-1"))
            .unwrap();
        let b = dom.insert_child(root, NodeData::new("nav")).unwrap();
        let c = dom
            .insert_child(a, NodeData::new("div").with_attr(IDENTITY_ATTR, "C-1"))
            .unwrap();
        let d = dom.insert_child(a, NodeData::text("hi")).unwrap();
        (dom, root, a, b, c, d)
    }

    #[test]
    fn insert_sets_root() {
        let mut dom = Dom::new();
        let id = dom.insert(NodeData::new("body"));
        assert_eq!(dom.root(), Some(id));
        let _second = dom.insert(NodeData::new("other"));
        assert_eq!(dom.root(), Some(id));
    }

    #[test]
    fn insert_child_of_missing_parent() {
        let mut dom = Dom::new();
        let id = dom.insert(NodeData::new("body"));
        dom.remove(id);
        assert!(dom.insert_child(id, NodeData::new("div")).is_none());
    }

    #[test]
    fn children_and_parents() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.children(root), &[a, b]);
        assert_eq!(dom.children(a), &[c, d]);
        assert_eq!(dom.parent(c), Some(a));
        assert_eq!(dom.parent(root), None);
    }

    #[test]
    fn identity_index_tracks_inserts() {
        let (dom, _root, a, _b, c, _d) = build_tree();
        assert_eq!(dom.find_by_identity("A-1"), Some(a));
        assert_eq!(dom.find_by_identity("C-1"), Some(c));
        assert_eq!(dom.find_by_identity("missing"), None);
    }

    #[test]
    fn remove_subtree_unindexes_descendants() {
        let (mut dom, root, a, b, c, d) = build_tree();
        dom.remove(a);
        assert!(!dom.contains(a));
        assert!(!dom.contains(c));
        assert!(!dom.contains(d));
        assert_eq!(dom.children(root), &[b]);
        assert_eq!(dom.find_by_identity("A-1"), None);
        assert_eq!(dom.find_by_identity("C-1"), None);
        assert_eq!(dom.len(), 2);
    }

    #[test]
    fn remove_root_clears_root() {
        let (mut dom, root, ..) = build_tree();
        dom.remove(root);
        assert!(dom.is_empty());
        assert_eq!(dom.root(), None);
    }

    #[test]
    fn remove_stale_id_is_none() {
        let mut dom = Dom::new();
        let id = dom.insert(NodeData::new("x"));
        dom.remove(id);
        assert!(dom.remove(id).is_none());
    }

    #[test]
    fn clear_children_keeps_parent() {
        let (mut dom, _root, a, _b, c, d) = build_tree();
        dom.clear_children(a);
        assert!(dom.contains(a));
        assert!(!dom.contains(c));
        assert!(!dom.contains(d));
        assert!(dom.children(a).is_empty());
    }

    #[test]
    fn mutation_log_records_inserts_and_removals() {
        let (mut dom, _root, a, _b, c, d) = build_tree();
        assert_eq!(dom.take_mutations().len(), 5);
        assert!(!dom.has_mutations());

        dom.remove(a);
        let log = dom.take_mutations();
        assert_eq!(
            log,
            vec![Mutation::Removed(a), Mutation::Removed(c), Mutation::Removed(d)]
        );
    }

    #[test]
    fn attribute_edits_reindex_without_logging() {
        let (mut dom, _root, a, b, ..) = build_tree();
        dom.take_mutations();

        assert!(dom.set_attribute(b, IDENTITY_ATTR, "B-1"));
        assert_eq!(dom.find_by_identity("B-1"), Some(b));

        let mut attrs = BTreeMap::new();
        attrs.insert("class".to_owned(), "plain".to_owned());
        assert!(dom.replace_attributes(a, attrs));
        assert_eq!(dom.find_by_identity("A-1"), None);
        assert_eq!(dom.get(a).unwrap().attr("class"), Some("plain"));

        assert!(!dom.has_mutations());
    }

    #[test]
    fn set_tag_keeps_node_and_identity() {
        let (mut dom, _root, a, _b, c, d) = build_tree();
        dom.take_mutations();

        assert!(dom.set_tag(a, "section"));
        assert_eq!(dom.get(a).unwrap().tag, "section");
        assert_eq!(dom.find_by_identity("A-1"), Some(a));
        assert_eq!(dom.children(a), &[c, d]);
        assert!(!dom.set_tag(d, "p"));
        assert!(!dom.has_mutations());
    }

    #[test]
    fn walk_is_document_order() {
        let (dom, root, a, b, c, d) = build_tree();
        assert_eq!(dom.walk_depth_first(root), vec![root, a, c, d, b]);
        assert_eq!(dom.walk_depth_first(a), vec![a, c, d]);
    }

    #[test]
    fn default_impl() {
        let dom = Dom::default();
        assert!(dom.is_empty());
        assert_eq!(dom.root(), None);
    }
}
