//! Templates: cheap, clonable descriptions of content to mount into the DOM.
//!
//! A [`Template`] is what components render and what routes display. It is
//! deliberately small: elements with attributes, text, fragments, and component
//! factories. Mounting a component template builds a fresh instance each time.
//!
//! Equality is what the runtime uses to skip redundant re-renders: text
//! compares by value, elements structurally, component factories by pointer.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::component::base::{AnyComponent, Component, Identity};
use crate::dom::IDENTITY_ATTR;

/// Builds a new component instance each time a template is mounted.
#[derive(Clone)]
pub struct ComponentFactory(Rc<dyn Fn() -> Box<dyn AnyComponent>>);

impl ComponentFactory {
    pub fn new<C: Component>(factory: impl Fn() -> C + 'static) -> Self {
        Self(Rc::new(move || Box::new(factory()) as Box<dyn AnyComponent>))
    }

    pub(crate) fn build(&self) -> Box<dyn AnyComponent> {
        (self.0)()
    }
}

impl PartialEq for ComponentFactory {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ComponentFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ComponentFactory(..)")
    }
}

/// Renderable content.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Template {
    /// Renders nothing.
    #[default]
    Empty,
    Text(Rc<str>),
    Element(Rc<Element>),
    Fragment(Rc<[Template]>),
    Component(ComponentFactory),
}

impl Template {
    pub fn text(content: impl Into<Rc<str>>) -> Self {
        Template::Text(content.into())
    }

    /// A template that instantiates a new component from `factory` on every mount.
    pub fn component<C: Component>(factory: impl Fn() -> C + 'static) -> Self {
        Template::Component(ComponentFactory::new(factory))
    }

    pub fn fragment(items: impl IntoIterator<Item = impl Into<Template>>) -> Self {
        Template::Fragment(items.into_iter().map(Into::<Template>::into).collect())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Template::Empty)
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Template::Element(element) => Some(element),
            _ => None,
        }
    }
}

impl From<Element> for Template {
    fn from(element: Element) -> Self {
        Template::Element(Rc::new(element))
    }
}

impl From<&str> for Template {
    fn from(text: &str) -> Self {
        Template::text(text)
    }
}

impl From<String> for Template {
    fn from(text: String) -> Self {
        Template::text(text)
    }
}

impl From<Option<Template>> for Template {
    fn from(template: Option<Template>) -> Self {
        template.unwrap_or_default()
    }
}

/// An element with attributes and child templates.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attributes: BTreeMap<String, String>,
    children: Vec<Template>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// An element carrying a component identity. Use this for component roots.
    pub fn identified(tag: impl Into<String>, identity: &Identity) -> Self {
        Self::new(tag).with_attr(IDENTITY_ATTR, identity.as_str())
    }

    /// Set an attribute (builder).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Append a child (builder).
    pub fn with_child(mut self, child: impl Into<Template>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Append several children (builder).
    pub fn with_children(mut self, children: impl IntoIterator<Item = impl Into<Template>>) -> Self {
        self.children.extend(children.into_iter().map(Into::<Template>::into));
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    pub fn children(&self) -> &[Template] {
        &self.children
    }

    pub fn identity(&self) -> Option<&str> {
        self.attributes.get(IDENTITY_ATTR).map(String::as_str)
    }
}
