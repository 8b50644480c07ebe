//! Snapshot helpers.
//!
//! Turn the live document into plain strings for assertions. Generated
//! identities are left out so the output is stable between runs.

use crate::component::Identity;
use crate::dom::{Dom, IDENTITY_ATTR};
use crate::router::RouteStore;

/// Markup of the whole document without identity attributes.
pub fn render_markup(dom: &Dom) -> String {
    match dom.root() {
        Some(root) => dom.to_markup(root, &[IDENTITY_ATTR]),
        None => String::new(),
    }
}

/// Identities of every view slot, in document order.
pub fn view_slots(dom: &Dom) -> Vec<Identity> {
    let Some(root) = dom.root() else {
        return Vec::new();
    };
    dom.walk_depth_first(root)
        .into_iter()
        .filter_map(|id| dom.get(id))
        .filter(|data| data.is_view_slot())
        .filter_map(|data| data.identity().map(Identity::from))
        .collect()
}

/// Paths of the routes claimed by view slots, in document order.
///
/// Unclaimed slots are skipped, so a fully resolved nested location reads
/// like its segments: `["/contacts", "/1", "/tacos"]`.
pub fn claimed_paths(dom: &Dom, store: &RouteStore) -> Vec<String> {
    view_slots(dom)
        .iter()
        .filter_map(|slot| store.claim_for(slot))
        .map(|route| route.path().to_owned())
        .collect()
}
