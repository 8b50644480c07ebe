//! DOM arena: slotmap-backed document with an identity index and mutation log.

pub mod node;
pub mod tree;
pub mod query;

pub use node::{NodeData, NodeId, IDENTITY_ATTR, SLOT_MARKER, SLOT_MARKER_ATTR};
pub use tree::{Dom, Mutation};
