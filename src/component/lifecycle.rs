//! Component lifecycle: mount state and the event log.
//!
//! The `LifecycleTracker` is the single source of truth for which components
//! are mounted. Transitions are idempotent: mounting a mounted component or
//! unmounting an unmounted one records nothing and reports `false`, which is
//! what keeps callbacks from firing twice. Events accumulate until drained.

use std::collections::HashSet;

use super::base::Identity;
use super::registry::ComponentKey;

/// Something that happened to a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// A component instance was created. Only recorded in debug mode.
    Instantiated { identity: Identity },
    /// The component's element appeared in the document.
    Mount { identity: Identity },
    /// The component's element left the document.
    Unmount { identity: Identity },
    /// The component was re-rendered in place.
    Update { identity: Identity },
}

impl LifecycleEvent {
    pub fn identity(&self) -> &Identity {
        match self {
            LifecycleEvent::Instantiated { identity }
            | LifecycleEvent::Mount { identity }
            | LifecycleEvent::Unmount { identity }
            | LifecycleEvent::Update { identity } => identity,
        }
    }
}

/// Tracks mounted components and accumulates lifecycle events.
#[derive(Debug, Default)]
pub struct LifecycleTracker {
    mounted: HashSet<ComponentKey>,
    pending: Vec<LifecycleEvent>,
}

impl LifecycleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instantiated(&mut self, identity: &Identity) {
        self.pending.push(LifecycleEvent::Instantiated {
            identity: identity.clone(),
        });
    }

    /// Mark `key` mounted. Returns `true` on a false→true transition.
    pub fn mount(&mut self, key: ComponentKey, identity: &Identity) -> bool {
        let changed = self.mounted.insert(key);
        if changed {
            self.pending.push(LifecycleEvent::Mount {
                identity: identity.clone(),
            });
        }
        changed
    }

    /// Mark `key` unmounted. Returns `true` on a true→false transition.
    pub fn unmount(&mut self, key: ComponentKey, identity: &Identity) -> bool {
        let changed = self.mounted.remove(&key);
        if changed {
            self.pending.push(LifecycleEvent::Unmount {
                identity: identity.clone(),
            });
        }
        changed
    }

    /// Record a re-render. Ignored for components that are not mounted.
    pub fn update(&mut self, key: ComponentKey, identity: &Identity) {
        if self.mounted.contains(&key) {
            self.pending.push(LifecycleEvent::Update {
                identity: identity.clone(),
            });
        }
    }

    /// Drop all state for a released component without recording an event.
    pub fn forget(&mut self, key: ComponentKey) {
        self.mounted.remove(&key);
    }

    pub fn is_mounted(&self, key: ComponentKey) -> bool {
        self.mounted.contains(&key)
    }

    pub fn mounted_count(&self) -> usize {
        self.mounted.len()
    }

    /// Drain and return all pending events, oldest first.
    pub fn drain(&mut self) -> Vec<LifecycleEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
