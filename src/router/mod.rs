//! Nested, claim-based routing.
//!
//! The [`Router`] matches the current location against the route tree one
//! segment per level. Each level is a [`RouteView`] slot somewhere in the DOM;
//! a scan walks from the document root to the nearest slot, claims it for the
//! matching route, then continues inside that slot with the route's children.
//! Claims are collected for the whole tree first and written to the
//! [`RouteStore`] in one mutation, so slots never observe a half-resolved
//! state.

pub mod resolve;
pub mod route;
pub mod store;
pub mod view;

use std::cell::Cell;
use std::rc::{Rc, Weak};

pub use resolve::{get_next_segment, path_matches_route, resolve_view_slots};
pub use route::{validate_routes, Route, RouteError};
pub use store::{Claims, RouteState, RouteStore};
pub use view::{RouteView, RouteViewState};

use crate::dom::Dom;
use crate::history::{pathname, SharedHistory};
use crate::reactive::Subscription;
use crate::scheduler::{Debouncer, Scheduler};
use crate::template::Template;

struct RouterInner {
    store: RouteStore,
    history: SharedHistory,
    debounce: Debouncer,
    handles_navigation: bool,
    scans: Cell<usize>,
    _watch: Option<Subscription>,
}

/// Cheap handle to the app's router.
#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

/// Non-owning router handle held by view slots.
#[derive(Clone)]
pub(crate) struct WeakRouter(Weak<RouterInner>);

impl WeakRouter {
    pub(crate) fn upgrade(&self) -> Option<Router> {
        self.0.upgrade().map(|inner| Router { inner })
    }
}

impl Router {
    /// Create a router over `store`.
    ///
    /// The first router built for a store configures `routes`, owns
    /// back/forward handling and requests a scan whenever the location or the
    /// route tree changes. Routers built afterwards for the same store leave
    /// all of that untouched.
    pub fn new(store: RouteStore, history: SharedHistory, scheduler: Scheduler, routes: Vec<Route>) -> Self {
        let handles_navigation = store.try_install_router();
        let watch = if handles_navigation {
            configure(&store, routes);
            let flag = store.scan_flag();
            Some(store.readonly_state().watch(
                |state: &RouteState| (state.location.clone(), Rc::clone(&state.routes)),
                move |_| flag.set(true),
            ))
        } else {
            tracing::debug!("route store already has a router; configuration ignored");
            None
        };

        Self {
            inner: Rc::new(RouterInner {
                store,
                history,
                debounce: Debouncer::new(scheduler),
                handles_navigation,
                scans: Cell::new(0),
                _watch: watch,
            }),
        }
    }

    /// Replace the route tree. Only the navigation-owning router may do this.
    ///
    /// Useful when routes embed [`view`](Router::view) templates and so can
    /// only be built once the router exists.
    pub fn set_routes(&self, routes: Vec<Route>) {
        if !self.inner.handles_navigation {
            tracing::debug!("router does not own its store; routes ignored");
            return;
        }
        configure(&self.inner.store, routes);
    }

    pub fn store(&self) -> &RouteStore {
        &self.inner.store
    }

    /// Whether this router owns navigation for its store.
    pub fn handles_navigation(&self) -> bool {
        self.inner.handles_navigation
    }

    /// Navigate to `path`, adding a history entry.
    pub fn push(&self, path: &str) {
        tracing::debug!(path, "push");
        self.inner.history.borrow_mut().push_state(path);
        self.sync_location();
    }

    /// Navigate to `path`, overwriting the current history entry.
    pub fn replace(&self, path: &str) {
        tracing::debug!(path, "replace");
        self.inner.history.borrow_mut().replace_state(path);
        self.sync_location();
    }

    /// React to back/forward navigation. Ignored by routers that do not own
    /// navigation; returns whether the event was handled.
    pub fn handle_pop_state(&self) -> bool {
        if !self.inner.handles_navigation {
            return false;
        }
        tracing::debug!(path = self.inner.history.borrow().current_path(), "pop state");
        self.sync_location();
        true
    }

    fn sync_location(&self) {
        let path = pathname(self.inner.history.borrow().current_path()).to_owned();
        self.inner.store.set_location(&path);
    }

    /// Ask for a full scan once the current burst of calls is over.
    ///
    /// Calls made before the scheduler's next turn collapse into one scan.
    pub fn notify_view_slot_ready(&self) {
        let store = self.inner.store.clone();
        self.inner.debounce.call(move || store.request_scan());
    }

    /// Clear and return the pending scan request.
    pub fn take_resolve_request(&self) -> bool {
        self.inner.store.take_scan_request()
    }

    /// Resolve every view slot in `dom` against the stored location and apply
    /// the resulting claims in one store mutation.
    pub fn resolve(&self, dom: &Dom) {
        let Some(root) = dom.root() else {
            return;
        };
        let (routes, location) = self
            .inner
            .store
            .readonly_state()
            .with(|state| (Rc::clone(&state.routes), state.location.clone()));

        let mut claims = Claims::new();
        resolve_view_slots(dom, &routes, &location, root, &mut claims);

        let scans = self.inner.scans.get() + 1;
        self.inner.scans.set(scans);
        tracing::debug!(location = %location, claims = claims.len(), scans, "resolved view slots");
        self.inner.store.replace_claims(claims);
    }

    /// Number of resolution scans run so far.
    pub fn scans(&self) -> usize {
        self.inner.scans.get()
    }

    /// A template that mounts a new [`RouteView`] bound to this router.
    pub fn view(&self) -> Template {
        let router = WeakRouter(Rc::downgrade(&self.inner));
        Template::component(move || RouteView::new(router.clone()))
    }
}

fn configure(store: &RouteStore, routes: Vec<Route>) {
    if let Err(err) = validate_routes(&routes) {
        tracing::warn!(%err, "ambiguous route tree; the first declared route wins");
    }
    store.configure_routes(routes);
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("handles_navigation", &self.inner.handles_navigation)
            .field("scans", &self.inner.scans.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Registry;
    use crate::dom::NodeData;
    use crate::history::MemoryHistory;
    use crate::template::Element;

    struct Fixture {
        dom: Dom,
        body: crate::dom::NodeId,
        registry: Registry,
        scheduler: Scheduler,
        router: Router,
    }

    impl Fixture {
        fn new(routes: Vec<Route>) -> Self {
            let mut dom = Dom::new();
            let body = dom.insert(NodeData::new("body"));
            let scheduler = Scheduler::new();
            let router = Router::new(
                RouteStore::new("/"),
                MemoryHistory::shared("/"),
                scheduler.clone(),
                routes,
            );
            Self {
                dom,
                body,
                registry: Registry::new(),
                scheduler,
                router,
            }
        }

        fn settle(&mut self) {
            loop {
                if self.router.take_resolve_request() {
                    self.router.resolve(&self.dom);
                }
                for key in self.registry.take_invalidated() {
                    self.registry.rerender(&mut self.dom, key);
                }
                if !self.dom.has_mutations() {
                    break;
                }
                self.dom.take_mutations();
                self.registry.observe(&self.dom);
            }
        }
    }

    fn menu() -> Vec<Route> {
        vec![
            Route::new("/", "home"),
            Route::new("/menu", Element::new("h1").with_child("Menu")),
        ]
    }

    #[test]
    fn construction_requests_a_scan() {
        let router = Router::new(
            RouteStore::new("/"),
            MemoryHistory::shared("/"),
            Scheduler::new(),
            menu(),
        );
        assert!(router.take_resolve_request());
        assert!(!router.take_resolve_request());
        assert_eq!(router.store().readonly_state().with(|s| s.routes.len()), 2);
    }

    #[test]
    fn second_router_is_ignored() {
        let store = RouteStore::new("/");
        let history = MemoryHistory::shared("/");
        let first = Router::new(store.clone(), history.clone(), Scheduler::new(), menu());
        let second = Router::new(store.clone(), history, Scheduler::new(), vec![Route::new("/x", "x")]);

        assert!(first.handles_navigation());
        assert!(!second.handles_navigation());
        assert!(!second.handle_pop_state());
        let paths: Vec<String> = store
            .readonly_state()
            .with(|s| s.routes.iter().map(|r| r.path().to_owned()).collect());
        assert_eq!(paths, vec!["/", "/menu"]);

        second.set_routes(vec![Route::new("/y", "y")]);
        assert_eq!(store.readonly_state().with(|s| s.routes.len()), 2);
    }

    #[test]
    fn set_routes_requests_a_scan() {
        let router = Router::new(RouteStore::new("/"), MemoryHistory::shared("/"), Scheduler::new(), Vec::new());
        router.take_resolve_request();
        router.set_routes(menu());
        assert!(router.take_resolve_request());
    }

    #[test]
    fn push_updates_history_and_location() {
        let history = MemoryHistory::shared("/");
        let router = Router::new(RouteStore::new("/"), history.clone(), Scheduler::new(), menu());
        router.take_resolve_request();

        router.push("/menu?item=3");
        assert_eq!(router.store().location(), "/menu");
        assert_eq!(history.borrow().current_path(), "/menu");
        assert!(router.take_resolve_request());

        router.push("/menu");
        assert!(!router.take_resolve_request());
    }

    #[test]
    fn pop_state_follows_history() {
        let history = MemoryHistory::shared("/");
        let router = Router::new(RouteStore::new("/"), history.clone(), Scheduler::new(), menu());
        router.push("/menu");
        history.borrow_mut().go(-1);
        assert!(router.handle_pop_state());
        assert_eq!(router.store().location(), "/");
    }

    #[test]
    fn replace_keeps_history_length() {
        let history = Rc::new(std::cell::RefCell::new(MemoryHistory::new("/")));
        let shared: SharedHistory = history.clone();
        let router = Router::new(RouteStore::new("/"), shared, Scheduler::new(), menu());
        router.replace("/menu");
        assert_eq!(history.borrow().len(), 1);
        assert_eq!(router.store().location(), "/menu");
    }

    #[test]
    fn slot_ready_bursts_collapse_into_one_scan() {
        let scheduler = Scheduler::new();
        let router = Router::new(RouteStore::new("/"), MemoryHistory::shared("/"), scheduler.clone(), menu());
        router.take_resolve_request();

        router.notify_view_slot_ready();
        router.notify_view_slot_ready();
        router.notify_view_slot_ready();
        assert_eq!(scheduler.pending(), 1);
        assert!(!router.take_resolve_request());

        while scheduler.run_next() {}
        assert!(router.take_resolve_request());
    }

    #[test]
    fn route_view_follows_its_claim() {
        let mut fx = Fixture::new(menu());
        let view = fx.router.view();
        fx.registry.mount_template(&mut fx.dom, &view, fx.body);
        fx.settle();
        while fx.scheduler.run_next() {
            fx.settle();
        }
        assert_eq!(fx.dom.to_markup(fx.body, &["uuid"]), r#"<body><div type="RouteView">home</div></body>"#);

        fx.router.push("/menu");
        fx.settle();
        assert_eq!(
            fx.dom.to_markup(fx.body, &["uuid"]),
            r#"<body><div type="RouteView"><h1>Menu</h1></div></body>"#
        );

        fx.router.push("/nowhere");
        fx.settle();
        assert_eq!(fx.dom.to_markup(fx.body, &["uuid"]), r#"<body><div type="RouteView"></div></body>"#);
        assert!(fx.router.scans() >= 3);
    }

    #[test]
    fn dropped_router_leaves_views_inert() {
        let mut fx = Fixture::new(menu());
        let view = fx.router.view();
        let store = fx.router.store().clone();
        fx.router = Router::new(store, MemoryHistory::shared("/"), fx.scheduler.clone(), Vec::new());
        fx.registry.mount_template(&mut fx.dom, &view, fx.body);
        fx.dom.take_mutations();
        fx.registry.observe(&fx.dom);
        assert_eq!(fx.scheduler.pending(), 0);
    }
}
