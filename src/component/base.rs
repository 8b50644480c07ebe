//! Component trait, identity, and the state-carrying base every component embeds.
//!
//! A component supplies a [`ComponentBase`] (identity plus reactive state) and a
//! `render` that produces a template whose root carries the identity. The
//! runtime locates the component in the DOM through that attribute; a component
//! that never renders it is simply never mounted.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

use crate::reactive::{Store, Subscription};
use crate::template::{Element, Template};

/// Process-unique identity of a component instance.
///
/// Rendered into the component's root element as the `uuid` attribute.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(Rc<str>);

impl Identity {
    /// Allocate a fresh identity of the form `{kind}-{uuid}`.
    pub fn generate(kind: &str) -> Self {
        Self(format!("{kind}-{}", Uuid::new_v4().simple()).into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.0)
    }
}

/// Wraps an identity read back from a DOM attribute.
impl From<&str> for Identity {
    fn from(value: &str) -> Self {
        Self(value.into())
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Host element attributes handed to a component defined under a tag name.
pub type Props = BTreeMap<String, String>;

/// Identity plus reactive state. Embedded by every component.
pub struct ComponentBase<S: 'static> {
    identity: Identity,
    state: Store<S>,
}

impl<S: Clone + 'static> ComponentBase<S> {
    /// `kind` prefixes the generated identity (usually the component's type name).
    pub fn new(kind: &str, initial: S) -> Self {
        Self {
            identity: Identity::generate(kind),
            state: Store::new(initial),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The component's state. Mutating it schedules a re-render.
    pub fn state(&self) -> &Store<S> {
        &self.state
    }

    /// Root element tagged with this component's identity.
    pub fn root(&self, tag: &str) -> Element {
        Element::identified(tag, &self.identity)
    }
}

impl<S: fmt::Debug + 'static> fmt::Debug for ComponentBase<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentBase")
            .field("identity", &self.identity)
            .field("state", &self.state)
            .finish()
    }
}

/// A stateful UI unit managed by the runtime.
///
/// Lifecycle callbacks default to no-ops; override the ones you need.
pub trait Component: 'static {
    type State: Clone + 'static;

    fn base(&self) -> &ComponentBase<Self::State>;

    /// Produce this component's content. The root element must carry the
    /// identity (see [`ComponentBase::root`]).
    fn render(&self) -> Template;

    /// Called once the identity-tagged element appears in the document.
    fn on_mount(&mut self) {}

    /// Called once the element has left the document after being mounted.
    fn on_unmount(&mut self) {}

    /// Called for every batch of DOM mutations, mounted or not.
    fn on_dom_mutation(&mut self) {}
}

/// Object-safe view of a [`Component`] used by the registry.
pub(crate) trait AnyComponent {
    fn identity(&self) -> &Identity;
    fn watch_state(&self, invalidate: Box<dyn Fn()>) -> Subscription;
    fn render(&self) -> Template;
    fn on_mount(&mut self);
    fn on_unmount(&mut self);
    fn on_dom_mutation(&mut self);
}

impl<C: Component> AnyComponent for C {
    fn identity(&self) -> &Identity {
        self.base().identity()
    }

    fn watch_state(&self, invalidate: Box<dyn Fn()>) -> Subscription {
        self.base().state().subscribe(move |_| invalidate())
    }

    fn render(&self) -> Template {
        Component::render(self)
    }

    fn on_mount(&mut self) {
        Component::on_mount(self);
    }

    fn on_unmount(&mut self) {
        Component::on_unmount(self);
    }

    fn on_dom_mutation(&mut self) {
        Component::on_dom_mutation(self);
    }
}
