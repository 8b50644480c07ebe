//! Path segment matching and the view-slot resolution scan.

use super::route::Route;
use super::store::Claims;
use crate::component::Identity;
use crate::dom::{Dom, NodeId};

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

/// Drop the first segment: `"/contacts/1/tacos"` → `"1/tacos"`.
pub fn get_next_segment(path: &str) -> String {
    segments(path).skip(1).collect::<Vec<_>>().join("/")
}

/// Whether `route` matches the first segment of `path`.
///
/// A path without segments is the root and matches a route declared as `/`.
pub fn path_matches_route(path: &str, route: &Route) -> bool {
    let segment = segments(path).next().unwrap_or("/");
    route.path() == segment || route.path() == format!("/{segment}")
}

/// Collect claims for the view slots below `root`.
///
/// Finds the nearest slot inside `root`, claims it for the first route whose
/// path matches, then continues inside that slot with the matched route's
/// children and the rest of the path. Stops at the first level without a slot
/// or without a match.
pub fn resolve_view_slots(dom: &Dom, routes: &[Route], path: &str, root: NodeId, claims: &mut Claims) {
    let Some(slot) = dom.find_view_slot(root) else {
        return;
    };
    let Some(identity) = dom.get(slot).and_then(|data| data.identity()) else {
        return;
    };

    if let Some(route) = routes.iter().find(|route| path_matches_route(path, route)) {
        claims.insert(Identity::from(identity), route.clone());
        resolve_view_slots(dom, route.children(), &get_next_segment(path), slot, claims);
    }
}
