//! The view slot component.

use super::store::RouteState;
use super::WeakRouter;
use crate::component::{Component, ComponentBase};
use crate::dom::{SLOT_MARKER, SLOT_MARKER_ATTR};
use crate::reactive::Subscription;
use crate::template::Template;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteViewState {
    /// Element of the route claimed for this slot, if any.
    pub current_element: Option<Template>,
}

/// Placeholder that displays whatever route has claimed it.
///
/// Created through [`Router::view`](super::Router::view). While mounted it
/// follows its own entry in the claims map and asks the router for a scan so
/// that slots nested inside it get resolved.
pub struct RouteView {
    base: ComponentBase<RouteViewState>,
    router: WeakRouter,
    claim_watch: Option<Subscription>,
}

impl RouteView {
    pub(crate) fn new(router: WeakRouter) -> Self {
        Self {
            base: ComponentBase::new("RouteView", RouteViewState::default()),
            router,
            claim_watch: None,
        }
    }

    pub fn current_element(&self) -> Option<Template> {
        self.base.state().with(|state| state.current_element.clone())
    }
}

impl Component for RouteView {
    type State = RouteViewState;

    fn base(&self) -> &ComponentBase<RouteViewState> {
        &self.base
    }

    fn render(&self) -> Template {
        self.base
            .root("div")
            .with_attr(SLOT_MARKER_ATTR, SLOT_MARKER)
            .with_child(self.current_element())
            .into()
    }

    fn on_mount(&mut self) {
        let Some(router) = self.router.upgrade() else {
            return;
        };
        let slot = self.base.identity().clone();
        let state = self.base.state().clone();
        self.claim_watch = Some(router.store().readonly_state().watch(
            move |routes: &RouteState| routes.claims.get(&slot).map(|route| route.element().clone()),
            move |element: &Option<Template>| {
                state.update(|state| state.current_element = element.clone());
            },
        ));
        router.notify_view_slot_ready();
    }

    fn on_unmount(&mut self) {
        self.claim_watch = None;
    }
}
