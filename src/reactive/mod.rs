//! Reactive state: stores with explicit subscription lists.
//!
//! - [`Store`]: shared mutable state; mutators notify listeners synchronously.
//! - [`Store::watch`]: re-run a callback when a selected value changes.
//! - [`ReadStore`]: read-only handle for consumers that must not mutate.

pub mod store;

pub use store::{ListenerId, ReadStore, Store, Subscription};
