//! Component registry: an arena of component records keyed by identity.
//!
//! The registry mounts templates into the [`Dom`], keeps one record per live
//! component, and turns the DOM's insert/remove notifications into lifecycle
//! callbacks. Components created by a template (transient) are released once
//! they leave the document; components added directly stay registered and can
//! be attached again.
//!
//! Components can also be defined under a tag name. A template element with
//! that tag mounts a new instance built from the element's attributes.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use slotmap::{new_key_type, SlotMap};

use super::base::{AnyComponent, Component, Identity, Props};
use super::lifecycle::{LifecycleEvent, LifecycleTracker};
use crate::dom::{Dom, NodeData, NodeId};
use crate::reactive::Subscription;
use crate::template::{Element, Template};

new_key_type! {
    /// Arena key of a component record.
    pub struct ComponentKey;
}

type Definition = Rc<dyn Fn(&Props) -> Box<dyn AnyComponent>>;

struct Record {
    component: Box<dyn AnyComponent>,
    identity: Identity,
    dom_ref: Option<NodeId>,
    transient: bool,
    rendered: bool,
    last_render: Option<Template>,
    _state_watch: Subscription,
}

/// Arena of component records.
pub struct Registry {
    records: SlotMap<ComponentKey, Record>,
    by_identity: HashMap<Identity, ComponentKey>,
    definitions: HashMap<String, Definition>,
    invalidated: Rc<RefCell<Vec<ComponentKey>>>,
    tracker: LifecycleTracker,
    debug: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            records: SlotMap::with_key(),
            by_identity: HashMap::new(),
            definitions: HashMap::new(),
            invalidated: Rc::new(RefCell::new(Vec::new())),
            tracker: LifecycleTracker::new(),
            debug: false,
        }
    }

    /// Record an `Instantiated` event for every new component.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Define a component under a tag name.
    ///
    /// Template elements with tag `token` mount a fresh instance built from the
    /// element's attributes in its place; the element's own children are not
    /// mounted. A token can be defined once; later definitions are ignored and
    /// return `false`.
    pub fn define<C: Component>(
        &mut self,
        token: &str,
        build: impl Fn(&Props) -> C + 'static,
    ) -> bool {
        if self.definitions.contains_key(token) {
            tracing::debug!(token, "component tag already defined; ignored");
            return false;
        }
        let definition: Definition =
            Rc::new(move |props: &Props| Box::new(build(props)) as Box<dyn AnyComponent>);
        self.definitions.insert(token.to_owned(), definition);
        true
    }

    pub fn is_defined(&self, token: &str) -> bool {
        self.definitions.contains_key(token)
    }

    // Component roots carry an identity and are never looked up, so a
    // component may render its own tag.
    fn definition_for(&self, element: &Element) -> Option<Definition> {
        if element.identity().is_some() {
            return None;
        }
        self.definitions.get(element.tag()).cloned()
    }

    /// Register a component that outlives its presence in the DOM.
    pub fn add<C: Component>(&mut self, component: C) -> Identity {
        let key = self.register(Box::new(component), false);
        self.records[key].identity.clone()
    }

    fn register(&mut self, component: Box<dyn AnyComponent>, transient: bool) -> ComponentKey {
        let identity = component.identity().clone();
        let queue = Rc::clone(&self.invalidated);
        let key = self.records.insert_with_key(|key| {
            let state_watch = component.watch_state(Box::new(move || queue.borrow_mut().push(key)));
            Record {
                component,
                identity: identity.clone(),
                dom_ref: None,
                transient,
                rendered: false,
                last_render: None,
                _state_watch: state_watch,
            }
        });
        if self.debug {
            tracing::debug!(%identity, transient, "component instantiated");
            self.tracker.instantiated(&identity);
        }
        self.by_identity.insert(identity, key);
        key
    }

    /// Render a registered component as the last child of `parent`.
    ///
    /// Returns `false` if the identity is unknown or an element carrying it is
    /// already in the document.
    pub fn attach(&mut self, dom: &mut Dom, identity: &Identity, parent: NodeId) -> bool {
        let Some(key) = self.by_identity.get(identity).copied() else {
            return false;
        };
        if dom.find_by_identity(identity.as_str()).is_some() {
            tracing::debug!(%identity, "component already in the document; attach ignored");
            return false;
        }
        self.render_into(dom, key, parent)
    }

    fn render_into(&mut self, dom: &mut Dom, key: ComponentKey, parent: NodeId) -> bool {
        let Some(record) = self.records.get_mut(key) else {
            return false;
        };
        let template = record.component.render();
        record.rendered = true;
        record.last_render = Some(template.clone());
        self.mount_template(dom, &template, parent);
        true
    }

    /// Build `template` under `parent`, instantiating any components it names.
    pub fn mount_template(&mut self, dom: &mut Dom, template: &Template, parent: NodeId) {
        match template {
            Template::Empty => {}
            Template::Text(text) => {
                dom.insert_child(parent, NodeData::text(&**text));
            }
            Template::Element(element) => {
                if let Some(definition) = self.definition_for(element) {
                    let key = self.register(definition(element.attributes()), true);
                    self.render_into(dom, key, parent);
                    return;
                }
                let data = NodeData {
                    tag: element.tag().to_owned(),
                    attributes: element.attributes().clone(),
                    text: None,
                };
                if let Some(node) = dom.insert_child(parent, data) {
                    for child in element.children() {
                        self.mount_template(dom, child, node);
                    }
                }
            }
            Template::Fragment(items) => {
                for item in items.iter() {
                    self.mount_template(dom, item, parent);
                }
            }
            Template::Component(factory) => {
                let key = self.register(factory.build(), true);
                self.render_into(dom, key, parent);
            }
        }
    }

    /// Drain the keys whose state changed since the last call, deduplicated.
    pub fn take_invalidated(&mut self) -> Vec<ComponentKey> {
        let mut seen = HashSet::new();
        self.invalidated
            .borrow_mut()
            .drain(..)
            .filter(|key| seen.insert(*key))
            .collect()
    }

    /// Re-render a component in place.
    ///
    /// The identity-carrying root node is kept; its tag and attributes are
    /// replaced and its children rebuilt. Skipped when the component is not in the document
    /// or its output equals the last mounted template.
    pub fn rerender(&mut self, dom: &mut Dom, key: ComponentKey) {
        let Some(record) = self.records.get_mut(key) else {
            return;
        };
        let Some(node) = dom.find_by_identity(record.identity.as_str()) else {
            return;
        };
        let template = record.component.render();
        if record.last_render.as_ref() == Some(&template) {
            return;
        }
        let Some(element) = template.as_element() else {
            tracing::warn!(identity = %record.identity, "re-render produced no root element; skipped");
            return;
        };
        if element.identity() != Some(record.identity.as_str()) {
            tracing::warn!(identity = %record.identity, "re-render root lost its identity; skipped");
            return;
        }

        record.last_render = Some(template.clone());
        record.dom_ref = Some(node);
        let identity = record.identity.clone();

        dom.set_tag(node, element.tag());
        dom.replace_attributes(node, element.attributes().clone());
        dom.clear_children(node);
        for child in element.children() {
            self.mount_template(dom, child, node);
        }
        self.tracker.update(key, &identity);
    }

    /// Run lifecycle detection for one batch of DOM mutations.
    ///
    /// For every record: mount if its identity is newly present, always report
    /// the mutation, unmount if it was mounted and is now gone.
    pub fn observe(&mut self, dom: &Dom) {
        let keys: Vec<ComponentKey> = self.records.keys().collect();
        let mut released = Vec::new();

        for key in keys {
            let Some(record) = self.records.get_mut(key) else {
                continue;
            };
            let found = dom.find_by_identity(record.identity.as_str());
            record.dom_ref = found;

            if found.is_some() && self.tracker.mount(key, &record.identity) {
                record.component.on_mount();
            }

            record.component.on_dom_mutation();

            if found.is_none() {
                if self.tracker.unmount(key, &record.identity) {
                    record.component.on_unmount();
                    if record.transient {
                        released.push(key);
                    }
                } else if record.transient && record.rendered {
                    // Removed before it was ever seen, or never tagged.
                    released.push(key);
                }
            }
        }

        for key in released {
            self.release(key);
        }
    }

    fn release(&mut self, key: ComponentKey) {
        if let Some(record) = self.records.remove(key) {
            self.by_identity.remove(&record.identity);
            self.tracker.forget(key);
            tracing::trace!(identity = %record.identity, "released transient component");
        }
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.by_identity.contains_key(identity)
    }

    pub fn is_mounted(&self, identity: &Identity) -> bool {
        self.by_identity
            .get(identity)
            .is_some_and(|&key| self.tracker.is_mounted(key))
    }

    /// The node last seen carrying this component's identity.
    pub fn dom_ref(&self, identity: &Identity) -> Option<NodeId> {
        let key = self.by_identity.get(identity)?;
        self.records.get(*key)?.dom_ref
    }

    /// Drain lifecycle events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<LifecycleEvent> {
        self.tracker.drain()
    }

    pub fn mounted_count(&self) -> usize {
        self.tracker.mounted_count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
