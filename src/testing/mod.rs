//! Headless testing support: Pilot, snapshot helpers.
//!
//! Use the [`Pilot`] to drive an [`App`](crate::app::App) through navigation
//! and inspect which routes landed in which view slots. Use
//! [`render_markup`] to capture the document for snapshot-style assertions.

pub mod pilot;
pub mod snapshot;

pub use pilot::Pilot;
pub use snapshot::{claimed_paths, render_markup, view_slots};
