//! Pilot: programmatic navigation of a headless App.
//!
//! The `Pilot` wraps an [`App`](crate::app::App) and provides methods to
//! navigate, press back/forward, and inspect which routes were claimed by which
//! view slots.

use crate::app::{App, AppConfig, HostEvent, RuntimeError};
use crate::component::{Component, Props};
use crate::router::{Route, Router};
use crate::template::Template;

// ---------------------------------------------------------------------------
// Pilot
// ---------------------------------------------------------------------------

/// A headless app driver for testing.
///
/// # Examples
///
/// ```ignore
/// use routeview::router::Route;
/// use routeview::testing::Pilot;
///
/// let mut pilot = Pilot::new(vec![Route::new("/", "home")]).with_layout(|router| router.view());
/// pilot.start()?;
/// assert_eq!(pilot.claimed_paths(), vec!["/"]);
/// ```
pub struct Pilot {
    app: App,
}

impl Pilot {
    /// Create an app at `/` with the given route tree.
    pub fn new(routes: Vec<Route>) -> Self {
        Self::with_config(AppConfig::default(), routes)
    }

    pub fn with_config(config: AppConfig, routes: Vec<Route>) -> Self {
        Self {
            app: App::new(config, routes),
        }
    }

    /// Install a route tree built from the app's router, for routes whose
    /// elements embed [`Router::view`].
    pub fn with_routes(self, routes: impl FnOnce(&Router) -> Vec<Route>) -> Self {
        self.app.router.set_routes(routes(&self.app.router));
        self
    }

    /// Define a component under a tag name before anything is mounted.
    pub fn with_component<C: Component>(
        mut self,
        token: &str,
        build: impl Fn(&Props) -> C + 'static,
    ) -> Self {
        self.app.define(token, build);
        self
    }

    /// Mount the template `layout` builds from the app's router.
    pub fn with_layout(mut self, layout: impl FnOnce(&Router) -> Template) -> Self {
        let template = layout(&self.app.router);
        self.app.mount_template(&template);
        self
    }

    // ── Navigation ───────────────────────────────────────────────────

    /// Run the app until idle after construction.
    pub fn start(&mut self) -> Result<(), RuntimeError> {
        self.app.run_until_idle()
    }

    pub fn navigate(&mut self, path: &str) -> Result<(), RuntimeError> {
        self.app.handle_event(HostEvent::Push(path.to_owned()))
    }

    pub fn back(&mut self) -> Result<(), RuntimeError> {
        self.app.handle_event(HostEvent::Back)
    }

    pub fn forward(&mut self) -> Result<(), RuntimeError> {
        self.app.handle_event(HostEvent::Forward)
    }

    /// Settle without running scheduled tasks.
    pub fn settle(&mut self) -> Result<(), RuntimeError> {
        self.app.settle()
    }

    /// Run one scheduled task and settle.
    pub fn turn(&mut self) -> Result<bool, RuntimeError> {
        self.app.run_turn()
    }

    // ── Query ────────────────────────────────────────────────────────

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn router(&self) -> &Router {
        &self.app.router
    }

    pub fn location(&self) -> String {
        self.app.store().location()
    }

    /// Route paths claimed by view slots, outermost first.
    pub fn claimed_paths(&self) -> Vec<String> {
        super::snapshot::claimed_paths(&self.app.dom, self.app.store())
    }

    /// Document markup without identities.
    pub fn markup(&self) -> String {
        super::snapshot::render_markup(&self.app.dom)
    }

    pub fn is_running(&self) -> bool {
        !self.app.should_quit()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
