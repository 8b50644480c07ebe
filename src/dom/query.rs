//! DOM queries: first match within a subtree, view slots, markup.

use std::collections::VecDeque;

use super::node::{NodeData, NodeId};
use super::tree::Dom;

impl Dom {
    /// Find the shallowest node below `start` that matches `predicate`.
    ///
    /// The search is breadth-first and unbounded in depth. `start` itself is
    /// never returned.
    pub fn query_first_within(
        &self,
        start: NodeId,
        predicate: impl Fn(&NodeData) -> bool,
    ) -> Option<NodeId> {
        let mut queue: VecDeque<NodeId> = self.children(start).iter().copied().collect();
        while let Some(current) = queue.pop_front() {
            if let Some(data) = self.nodes.get(current) {
                if predicate(data) {
                    return Some(current);
                }
                queue.extend(self.children(current).iter().copied());
            }
        }
        None
    }

    /// The nearest view slot element below `start`.
    pub fn find_view_slot(&self, start: NodeId) -> Option<NodeId> {
        self.query_first_within(start, NodeData::is_view_slot)
    }

    /// Serialise the subtree at `start` as HTML-like markup.
    ///
    /// Attributes named in `skip_attrs` are left out, which keeps snapshots
    /// free of generated identities.
    pub fn to_markup(&self, start: NodeId, skip_attrs: &[&str]) -> String {
        let mut out = String::new();
        self.write_markup(start, skip_attrs, &mut out);
        out
    }

    fn write_markup(&self, id: NodeId, skip_attrs: &[&str], out: &mut String) {
        let Some(data) = self.nodes.get(id) else {
            return;
        };
        if let Some(text) = &data.text {
            out.push_str(text);
            return;
        }
        out.push('<');
        out.push_str(&data.tag);
        for (name, value) in &data.attributes {
            if skip_attrs.contains(&name.as_str()) {
                continue;
            }
            out.push_str(&format!(" {name}=\"{value}\""));
        }
        out.push('>');
        for &child in self.children(id) {
            self.write_markup(child, skip_attrs, out);
        }
        out.push_str("</");
        out.push_str(&data.tag);
        out.push('>');
    }
}
