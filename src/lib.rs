//! # routeview
//!
//! A single-threaded client-side UI runtime: components with DOM-observed
//! lifecycles, a reactive shared-state store, and a nested router that resolves
//! URL segments into view slots anywhere in the rendered tree.
//!
//! ## Core Systems
//!
//! - **[`dom`]**: Slotmap-backed DOM arena with an identity index and mutation log
//! - **[`reactive`]**: Stores with explicit subscription lists and selector watches
//! - **[`component`]**: Component trait, identities, lifecycle registry
//! - **[`template`]**: Renderable templates and component factories
//! - **[`router`]**: Route tree, route store, resolution scan, `RouteView` slots
//! - **[`history`]**: Navigation boundary and in-memory history
//! - **[`scheduler`]**: Turn-based task queue and debouncing
//! - **[`app`]**: Application struct tying everything together
//! - **[`testing`]**: Headless pilot and snapshot helpers

// Foundation
pub mod dom;
pub mod reactive;
pub mod scheduler;

// Components
pub mod component;
pub mod template;

// Routing
pub mod history;
pub mod router;

// Application
pub mod app;
pub mod testing;

pub use app::{App, AppConfig, HostEvent, RuntimeError};
pub use component::{Component, ComponentBase, Identity, Props};
pub use router::{Route, RouteStore, RouteView, Router};
pub use template::{Element, Template};
