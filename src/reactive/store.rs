//! Store<S>: shared mutable state with explicit subscription lists.
//!
//! A store owns one value. Mutators change it and then notify every listener
//! synchronously, within the same call. Single-threaded (`Rc`/`RefCell`).
//!
//! A mutation made *while* listeners are being notified (a listener writing
//! back into the store it observes) does not recurse. It is applied
//! immediately and recorded, and the outer notification loop runs another
//! pass once the current one finishes. Each pass clones the value once and
//! re-clones only after such a write, so listeners later in a pass already
//! see the newer value.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Identifies a listener inside a store.
    pub struct ListenerId;
}

/// Upper bound on follow-up notification passes triggered by listeners that
/// keep writing to the store they observe.
const MAX_NOTIFY_PASSES: usize = 100;

type Listener<S> = Rc<RefCell<dyn FnMut(&S)>>;

struct Inner<S> {
    state: RefCell<S>,
    listeners: RefCell<SlotMap<ListenerId, Listener<S>>>,
    notifying: Cell<bool>,
    dirty: Cell<bool>,
    version: Cell<u64>,
}

/// Reactive state container. Cloning yields another handle to the same state.
pub struct Store<S: 'static> {
    inner: Rc<Inner<S>>,
}

impl<S: 'static> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: fmt::Debug + 'static> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.inner.state.borrow())
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}

impl<S: Clone + 'static> Store<S> {
    pub fn new(initial: S) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(initial),
                listeners: RefCell::new(SlotMap::with_key()),
                notifying: Cell::new(false),
                dirty: Cell::new(false),
                version: Cell::new(0),
            }),
        }
    }

    /// Clone the current value.
    pub fn get(&self) -> S {
        self.inner.state.borrow().clone()
    }

    /// Read by reference without cloning.
    ///
    /// The closure must not mutate this store.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.state.borrow())
    }

    /// Mutate the value in place and notify listeners.
    pub fn update(&self, f: impl FnOnce(&mut S)) {
        f(&mut self.inner.state.borrow_mut());
        self.inner.version.set(self.inner.version.get().wrapping_add(1));
        self.notify();
    }

    /// Overwrite the value and notify listeners.
    pub fn set(&self, value: S) {
        self.update(|state| *state = value);
    }

    /// Register a listener called after every mutation.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped.
    pub fn subscribe(&self, listener: impl FnMut(&S) + 'static) -> Subscription {
        let listener: Listener<S> = Rc::new(RefCell::new(listener));
        let id = self.inner.listeners.borrow_mut().insert(listener);
        let weak: Weak<Inner<S>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.listeners.borrow_mut().remove(id);
            }
        })
    }

    /// Watch a derived value.
    ///
    /// `callback` runs once immediately with the current selection, then again
    /// whenever a mutation changes what `selector` returns (by `PartialEq`).
    pub fn watch<T, Sel, F>(&self, selector: Sel, mut callback: F) -> Subscription
    where
        T: PartialEq + 'static,
        Sel: Fn(&S) -> T + 'static,
        F: FnMut(&T) + 'static,
    {
        let initial = self.with(|state| selector(state));
        callback(&initial);
        let mut last = initial;
        self.subscribe(move |state| {
            let next = selector(state);
            if next != last {
                last = next;
                callback(&last);
            }
        })
    }

    /// A handle that can observe but not mutate this store.
    pub fn readonly(&self) -> ReadStore<S> {
        ReadStore {
            store: self.clone(),
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn notify(&self) {
        if self.inner.notifying.get() {
            self.inner.dirty.set(true);
            return;
        }
        self.inner.notifying.set(true);

        let mut passes = 0;
        loop {
            self.inner.dirty.set(false);
            let listeners: Vec<(ListenerId, Listener<S>)> = self
                .inner
                .listeners
                .borrow()
                .iter()
                .map(|(id, listener)| (id, Rc::clone(listener)))
                .collect();

            let mut version = self.inner.version.get();
            let mut snapshot = self.get();
            for (id, listener) in listeners {
                // Unsubscribed by an earlier listener in this pass.
                if !self.inner.listeners.borrow().contains_key(id) {
                    continue;
                }
                if self.inner.version.get() != version {
                    version = self.inner.version.get();
                    snapshot = self.get();
                }
                if let Ok(mut listener) = listener.try_borrow_mut() {
                    listener(&snapshot);
                }
            }

            passes += 1;
            if !self.inner.dirty.get() {
                break;
            }
            if passes >= MAX_NOTIFY_PASSES {
                tracing::warn!(passes, "store listeners kept mutating; dropping further notifications");
                self.inner.dirty.set(false);
                break;
            }
        }

        self.inner.notifying.set(false);
    }
}

/// Read-only view over a [`Store`].
pub struct ReadStore<S: 'static> {
    store: Store<S>,
}

impl<S: 'static> Clone for ReadStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: fmt::Debug + 'static> fmt::Debug for ReadStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ReadStore").field(&self.store).finish()
    }
}

impl<S: Clone + 'static> ReadStore<S> {
    pub fn get(&self) -> S {
        self.store.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        self.store.with(f)
    }

    pub fn subscribe(&self, listener: impl FnMut(&S) + 'static) -> Subscription {
        self.store.subscribe(listener)
    }

    pub fn watch<T, Sel, F>(&self, selector: Sel, callback: F) -> Subscription
    where
        T: PartialEq + 'static,
        Sel: Fn(&S) -> T + 'static,
        F: FnMut(&T) + 'static,
    {
        self.store.watch(selector, callback)
    }
}

/// Keeps a listener registered. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unsubscribe now.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
