//! Browser history boundary.
//!
//! The router only needs the current pathname and the ability to push or
//! replace entries. [`MemoryHistory`] keeps the entry stack in memory, which is
//! what headless hosts and tests use. Back/forward (`go`) models the user
//! pressing the browser buttons; the host reports the result as a pop-state
//! event.

use std::cell::RefCell;
use std::rc::Rc;

/// The navigation surface the router consumes.
pub trait History {
    /// Current pathname, without query string or fragment.
    fn current_path(&self) -> &str;

    /// Add an entry and make it current, discarding forward entries.
    fn push_state(&mut self, url: &str);

    /// Overwrite the current entry.
    fn replace_state(&mut self, url: &str);

    /// Move through the entry stack. Returns `false` when out of range.
    fn go(&mut self, delta: isize) -> bool;
}

/// Shared handle to the history the app navigates.
pub type SharedHistory = Rc<RefCell<dyn History>>;

/// Extract the pathname from a URL-ish string: strips `?query` and `#fragment`,
/// and treats an empty path as `/`.
pub fn pathname(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = &url[..end];
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

/// In-memory history stack.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<String>,
    index: usize,
}

impl MemoryHistory {
    pub fn new(initial: &str) -> Self {
        Self {
            entries: vec![pathname(initial).to_owned()],
            index: 0,
        }
    }

    /// Wrap in the shared handle the router expects.
    pub fn shared(initial: &str) -> SharedHistory {
        Rc::new(RefCell::new(Self::new(initial)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn current_path(&self) -> &str {
        &self.entries[self.index]
    }

    fn push_state(&mut self, url: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(pathname(url).to_owned());
        self.index = self.entries.len() - 1;
    }

    fn replace_state(&mut self, url: &str) {
        self.entries[self.index] = pathname(url).to_owned();
    }

    fn go(&mut self, delta: isize) -> bool {
        match self.index.checked_add_signed(delta) {
            Some(target) if target < self.entries.len() => {
                self.index = target;
                true
            }
            _ => false,
        }
    }
}
