//! App struct: wiring, settle loop, host events.
//!
//! [`App`] owns the DOM, the component registry, the router and the
//! scheduler, and drives them to a quiet state after every change. Hosts feed
//! it navigation through [`HostEvent`]s, either one at a time with
//! [`App::handle_event`] or from a channel with [`App::run`].

use thiserror::Error;
use tokio::sync::mpsc;

use crate::component::{Component, Identity, LifecycleEvent, Props, Registry};
use crate::dom::{Dom, NodeData, NodeId};
use crate::history::{MemoryHistory, SharedHistory};
use crate::router::{Route, RouteStore, Router};
use crate::scheduler::Scheduler;
use crate::template::Template;

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Location the history starts at.
    pub initial_path: String,
    /// Upper bound on resolve/re-render/observe passes in one settle.
    pub max_settle_passes: usize,
    /// Report every component instantiation as a lifecycle event.
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            initial_path: "/".to_owned(),
            max_settle_passes: 64,
            debug: false,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial path (builder).
    pub fn with_initial_path(mut self, path: impl Into<String>) -> Self {
        self.initial_path = path.into();
        self
    }

    /// Set the settle pass limit (builder).
    pub fn with_max_settle_passes(mut self, passes: usize) -> Self {
        self.max_settle_passes = passes;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

// ---------------------------------------------------------------------------
// Events and errors
// ---------------------------------------------------------------------------

/// Something the host environment reports to the app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// Navigate to a path, adding a history entry.
    Push(String),
    /// Navigate to a path, replacing the current entry.
    Replace(String),
    /// The user pressed back.
    Back,
    /// The user pressed forward.
    Forward,
    /// The history moved on its own; re-read the current path.
    PopState,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// Rendering kept producing DOM changes.
    #[error("app did not settle within {passes} passes")]
    Unsettled { passes: usize },
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The application runtime.
pub struct App {
    pub dom: Dom,
    pub registry: Registry,
    pub router: Router,
    pub scheduler: Scheduler,
    pub history: SharedHistory,
    pub config: AppConfig,
    body: NodeId,
    events: Vec<LifecycleEvent>,
    running: bool,
}

impl App {
    /// Build an app with an in-memory history at `config.initial_path`.
    pub fn new(config: AppConfig, routes: Vec<Route>) -> Self {
        let history = MemoryHistory::shared(&config.initial_path);
        Self::with_history(config, routes, history)
    }

    /// Build an app over a host-provided history.
    pub fn with_history(config: AppConfig, routes: Vec<Route>, history: SharedHistory) -> Self {
        let mut dom = Dom::new();
        let body = dom.insert(NodeData::new("body"));
        dom.take_mutations();

        let scheduler = Scheduler::new();
        let store = RouteStore::new(history.borrow().current_path());
        let router = Router::new(store, history.clone(), scheduler.clone(), routes);
        let mut registry = Registry::new();
        registry.set_debug(config.debug);

        Self {
            dom,
            registry,
            router,
            scheduler,
            history,
            config,
            body,
            events: Vec::new(),
            running: true,
        }
    }

    pub fn store(&self) -> &RouteStore {
        self.router.store()
    }

    /// The document root every mount goes under.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Register `component` and render it into the document.
    pub fn mount<C: Component>(&mut self, component: C) -> Identity {
        let identity = self.registry.add(component);
        self.registry.attach(&mut self.dom, &identity, self.body);
        identity
    }

    /// Define a component under a tag name (see [`Registry::define`]).
    pub fn define<C: Component>(
        &mut self,
        token: &str,
        build: impl Fn(&Props) -> C + 'static,
    ) -> bool {
        self.registry.define(token, build)
    }

    /// Render a template into the document.
    pub fn mount_template(&mut self, template: &Template) {
        self.registry.mount_template(&mut self.dom, template, self.body);
    }

    /// Render a registered component into the document again.
    pub fn attach(&mut self, identity: &Identity) -> bool {
        self.registry.attach(&mut self.dom, identity, self.body)
    }

    /// Take a component's element out of the document.
    pub fn detach(&mut self, identity: &Identity) -> bool {
        match self.dom.find_by_identity(identity.as_str()) {
            Some(node) => self.dom.remove(node).is_some(),
            None => false,
        }
    }

    /// Run resolve, re-render and observe passes until nothing changes.
    pub fn settle(&mut self) -> Result<(), RuntimeError> {
        for _ in 0..self.config.max_settle_passes {
            if self.router.take_resolve_request() {
                self.router.resolve(&self.dom);
            }
            for key in self.registry.take_invalidated() {
                self.registry.rerender(&mut self.dom, key);
            }

            let mutations = self.dom.take_mutations();
            if mutations.is_empty() {
                return Ok(());
            }
            tracing::trace!(count = mutations.len(), "observing dom mutations");
            self.registry.observe(&self.dom);
            self.collect_lifecycle();
        }
        Err(RuntimeError::Unsettled {
            passes: self.config.max_settle_passes,
        })
    }

    fn collect_lifecycle(&mut self) {
        for event in self.registry.drain_events() {
            match &event {
                LifecycleEvent::Instantiated { identity } => tracing::trace!(%identity, "instantiated"),
                LifecycleEvent::Mount { identity } => tracing::trace!(%identity, "mount"),
                LifecycleEvent::Unmount { identity } => tracing::trace!(%identity, "unmount"),
                LifecycleEvent::Update { identity } => tracing::trace!(%identity, "update"),
            }
            self.events.push(event);
        }
    }

    /// Run one scheduled task, then settle. Returns whether a task ran.
    pub fn run_turn(&mut self) -> Result<bool, RuntimeError> {
        let ran = self.scheduler.run_next();
        self.settle()?;
        Ok(ran)
    }

    /// Settle, then run turns until the scheduler is empty.
    pub fn run_until_idle(&mut self) -> Result<(), RuntimeError> {
        self.settle()?;
        while self.run_turn()? {}
        Ok(())
    }

    /// Apply a host event and run until idle.
    pub fn handle_event(&mut self, event: HostEvent) -> Result<(), RuntimeError> {
        match event {
            HostEvent::Push(path) => self.router.push(&path),
            HostEvent::Replace(path) => self.router.replace(&path),
            HostEvent::Back => self.go(-1),
            HostEvent::Forward => self.go(1),
            HostEvent::PopState => {
                self.router.handle_pop_state();
            }
            HostEvent::Quit => {
                self.running = false;
                return Ok(());
            }
        }
        self.run_until_idle()
    }

    fn go(&mut self, delta: isize) {
        let moved = self.history.borrow_mut().go(delta);
        if moved {
            self.router.handle_pop_state();
        }
    }

    /// Process host events from `events` until `Quit` or until every sender
    /// is dropped.
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<HostEvent>) -> Result<(), RuntimeError> {
        self.run_until_idle()?;
        while self.running {
            let Some(event) = events.recv().await else {
                break;
            };
            self.handle_event(event)?;
            tokio::task::yield_now().await;
        }
        Ok(())
    }

    /// Drain the lifecycle events observed since the last call.
    pub fn take_lifecycle_events(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn should_quit(&self) -> bool {
        !self.running
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentBase;
    use crate::dom::IDENTITY_ATTR;

    struct Label {
        base: ComponentBase<&'static str>,
    }

    impl Label {
        fn new(text: &'static str) -> Self {
            Self {
                base: ComponentBase::new("Label", text),
            }
        }
    }

    impl Component for Label {
        type State = &'static str;

        fn base(&self) -> &ComponentBase<&'static str> {
            &self.base
        }

        fn render(&self) -> Template {
            self.base.root("span").with_child(self.base.state().get()).into()
        }
    }

    /// Re-renders itself on every mutation it sees.
    struct Runaway {
        base: ComponentBase<u32>,
    }

    impl Component for Runaway {
        type State = u32;

        fn base(&self) -> &ComponentBase<u32> {
            &self.base
        }

        fn render(&self) -> Template {
            self.base
                .root("b")
                .with_child(self.base.state().get().to_string())
                .into()
        }

        fn on_dom_mutation(&mut self) {
            self.base.state().update(|n| *n += 1);
        }
    }

    fn menu() -> Vec<Route> {
        vec![Route::new("/", "home"), Route::new("/menu", "menu")]
    }

    // ── Construction ─────────────────────────────────────────────────

    #[test]
    fn new_app_starts_at_initial_path() {
        let app = App::new(AppConfig::new().with_initial_path("/menu"), menu());
        assert_eq!(app.store().location(), "/menu");
        assert_eq!(app.history.borrow().current_path(), "/menu");
        assert!(!app.should_quit());
    }

    #[test]
    fn mount_and_detach_fire_lifecycle() {
        let mut app = App::new(AppConfig::new(), menu());
        let id = app.mount(Label::new("hi"));
        app.settle().unwrap();
        assert!(app.registry.is_mounted(&id));
        assert_eq!(
            app.take_lifecycle_events(),
            vec![LifecycleEvent::Mount { identity: id.clone() }]
        );

        assert!(app.detach(&id));
        app.settle().unwrap();
        assert!(!app.registry.is_mounted(&id));
        assert!(!app.detach(&id));

        assert!(app.attach(&id));
        app.settle().unwrap();
        let kinds: Vec<bool> = app
            .take_lifecycle_events()
            .iter()
            .map(|event| matches!(event, LifecycleEvent::Mount { .. }))
            .collect();
        assert_eq!(kinds, vec![false, true]);
    }

    #[test]
    fn attach_while_present_keeps_one_element() {
        let mut app = App::new(AppConfig::new(), menu());
        let id = app.mount(Label::new("once"));
        assert!(!app.attach(&id));
        app.settle().unwrap();
        assert_eq!(app.dom.children(app.body()).len(), 1);
        app.take_lifecycle_events();

        assert!(app.detach(&id));
        app.settle().unwrap();
        assert!(!app.registry.is_mounted(&id));
        assert_eq!(app.dom.find_by_identity(id.as_str()), None);
        assert_eq!(
            app.take_lifecycle_events(),
            vec![LifecycleEvent::Unmount { identity: id }]
        );
    }

    #[test]
    fn debug_config_reports_instantiation() {
        let mut app = App::new(AppConfig::new().with_debug(true), menu());
        let id = app.mount(Label::new("traced"));
        app.settle().unwrap();
        assert_eq!(
            app.take_lifecycle_events(),
            vec![
                LifecycleEvent::Instantiated { identity: id.clone() },
                LifecycleEvent::Mount { identity: id },
            ]
        );
    }

    #[test]
    fn state_change_rerenders_in_place() {
        let mut app = App::new(AppConfig::new(), menu());
        let label = Label::new("before");
        let state = label.base.state().clone();
        let id = app.mount(label);
        app.settle().unwrap();
        let node = app.dom.find_by_identity(id.as_str()).unwrap();

        state.set("after");
        app.settle().unwrap();
        assert_eq!(app.dom.find_by_identity(id.as_str()), Some(node));
        assert_eq!(app.dom.to_markup(node, &[IDENTITY_ATTR]), "<span>after</span>");
    }

    #[test]
    fn runaway_render_is_reported() {
        let mut app = App::new(AppConfig::new().with_max_settle_passes(8), menu());
        app.mount(Runaway {
            base: ComponentBase::new("Runaway", 0),
        });
        assert_eq!(app.settle(), Err(RuntimeError::Unsettled { passes: 8 }));
    }

    // ── Host events ──────────────────────────────────────────────────

    #[test]
    fn navigation_events_move_location() {
        let mut app = App::new(AppConfig::new(), menu());
        app.handle_event(HostEvent::Push("/menu".into())).unwrap();
        assert_eq!(app.store().location(), "/menu");

        app.handle_event(HostEvent::Back).unwrap();
        assert_eq!(app.store().location(), "/");

        app.handle_event(HostEvent::Back).unwrap();
        assert_eq!(app.store().location(), "/");

        app.handle_event(HostEvent::Forward).unwrap();
        assert_eq!(app.store().location(), "/menu");

        app.handle_event(HostEvent::Replace("/".into())).unwrap();
        app.handle_event(HostEvent::Back).unwrap();
        assert_eq!(app.store().location(), "/");
    }

    #[test]
    fn pop_state_reads_history() {
        let mut app = App::new(AppConfig::new(), menu());
        app.history.borrow_mut().push_state("/menu");
        app.handle_event(HostEvent::PopState).unwrap();
        assert_eq!(app.store().location(), "/menu");
    }

    #[test]
    fn quit_stops_the_app() {
        let mut app = App::new(AppConfig::new(), menu());
        app.handle_event(HostEvent::Quit).unwrap();
        assert!(app.should_quit());
    }

    #[test]
    fn run_until_idle_drains_scheduler() {
        let mut app = App::new(AppConfig::new(), menu());
        app.scheduler.schedule(|| {});
        app.scheduler.schedule(|| {});
        app.run_until_idle().unwrap();
        assert!(app.scheduler.is_idle());
        assert!(!app.run_turn().unwrap());
    }

    #[tokio::test]
    async fn run_returns_when_channel_closes() {
        let mut app = App::new(AppConfig::new(), menu());
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(HostEvent::Push("/menu".into())).unwrap();
        drop(tx);

        let outcome = tokio::time::timeout(std::time::Duration::from_secs(1), app.run(rx)).await;
        assert!(matches!(outcome, Ok(Ok(()))));
        assert_eq!(app.store().location(), "/menu");
        assert!(!app.should_quit());
    }

    // ── AppConfig builder ────────────────────────────────────────────

    #[test]
    fn app_config_defaults() {
        let config = AppConfig::new();
        assert_eq!(config.initial_path, "/");
        assert_eq!(config.max_settle_passes, 64);
        assert!(!config.debug);
    }

    #[test]
    fn app_config_builder() {
        let config = AppConfig::new()
            .with_initial_path("/contacts")
            .with_max_settle_passes(4)
            .with_debug(true);
        assert_eq!(config.initial_path, "/contacts");
        assert_eq!(config.max_settle_passes, 4);
        assert!(config.debug);
    }
}
