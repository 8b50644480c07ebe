//! Components: identity, state, lifecycle, and the registry that owns them.

pub mod base;
pub mod lifecycle;
pub mod registry;

pub use base::{Component, ComponentBase, Identity, Props};
pub use lifecycle::{LifecycleEvent, LifecycleTracker};
pub use registry::{ComponentKey, Registry};
