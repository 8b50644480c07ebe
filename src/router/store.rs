//! The route store: configured routes, current location and view-slot claims.

use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;

use super::route::Route;
use crate::component::Identity;
use crate::reactive::{ReadStore, Store};

/// View-slot identity → route currently resolved for that slot.
pub type Claims = HashMap<Identity, Route>;

/// Everything the router and view slots share.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteState {
    pub routes: Rc<[Route]>,
    pub location: String,
    pub claims: Claims,
}

/// Shared reactive route state.
///
/// One store is created per app and handed to the router and every view slot.
/// Writers go through the methods below; readers subscribe to
/// [`readonly_state`](RouteStore::readonly_state).
#[derive(Debug, Clone)]
pub struct RouteStore {
    state: Store<RouteState>,
    router_installed: Rc<Cell<bool>>,
    scan_requested: Rc<Cell<bool>>,
}

impl RouteStore {
    pub fn new(initial_location: &str) -> Self {
        Self {
            state: Store::new(RouteState {
                location: initial_location.to_owned(),
                ..RouteState::default()
            }),
            router_installed: Rc::new(Cell::new(false)),
            scan_requested: Rc::new(Cell::new(false)),
        }
    }

    pub fn readonly_state(&self) -> ReadStore<RouteState> {
        self.state.readonly()
    }

    pub fn location(&self) -> String {
        self.state.with(|state| state.location.clone())
    }

    pub fn claim_for(&self, slot: &Identity) -> Option<Route> {
        self.state.with(|state| state.claims.get(slot).cloned())
    }

    /// Move to `path`, dropping every claim. No-op when already there.
    pub(crate) fn set_location(&self, path: &str) {
        if self.state.with(|state| state.location == path) {
            return;
        }
        self.state.update(|state| {
            state.claims.clear();
            state.location = path.to_owned();
        });
    }

    /// Replace the route tree wholesale.
    pub fn configure_routes(&self, routes: Vec<Route>) {
        self.state.update(|state| state.routes = routes.into());
    }

    /// Upsert one claim, leaving the others alone.
    pub fn claim_route_for_view_slot(&self, slot: Identity, route: Route) {
        self.state.update(|state| {
            state.claims.insert(slot, route);
        });
    }

    /// Swap in a complete claims map in one mutation. No-op when equal.
    pub(crate) fn replace_claims(&self, claims: Claims) {
        if self.state.with(|state| state.claims == claims) {
            return;
        }
        self.state.update(|state| state.claims = claims);
    }

    /// Reserve this store for the first router. Returns `false` if taken.
    pub(crate) fn try_install_router(&self) -> bool {
        !self.router_installed.replace(true)
    }

    /// Flag raised whenever a resolution scan is due.
    pub(crate) fn scan_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.scan_requested)
    }

    pub(crate) fn request_scan(&self) {
        self.scan_requested.set(true);
    }

    /// Clear and return the scan flag.
    pub(crate) fn take_scan_request(&self) -> bool {
        self.scan_requested.replace(false)
    }
}
