//! Shared state handles
//!
//! [`State<T>`] is the primary API for component state that must outlive a
//! single render pass. Handles are cheap to clone; every clone observes the
//! same value.
//!
//! ```ignore
//! use tessel_core::state::State;
//!
//! let open = State::new(false);
//!
//! // Read the current value
//! let is_open = open.get();
//!
//! // Update the value (no rebuild requested)
//! open.set(true);
//!
//! // Update the value AND request a rebuild from the host
//! open.set_rebuild(false);
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Shared dirty flag for triggering UI rebuilds
pub type DirtyFlag = Arc<AtomicBool>;

struct Cell<T> {
    value: T,
    version: u64,
}

/// A shared state value with direct get/set methods
///
/// Every write bumps a version counter so observers can cheaply detect
/// changes between frames.
pub struct State<T> {
    cell: Arc<RwLock<Cell<T>>>,
    dirty_flag: DirtyFlag,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            cell: Arc::clone(&self.cell),
            dirty_flag: Arc::clone(&self.dirty_flag),
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cell = self.cell.read().unwrap();
        f.debug_struct("State")
            .field("value", &cell.value)
            .field("version", &cell.version)
            .finish()
    }
}

impl<T: Clone + Send + Sync + 'static> State<T> {
    /// Create a new State with its own dirty flag
    pub fn new(value: T) -> Self {
        Self::with_dirty_flag(value, Arc::new(AtomicBool::new(false)))
    }

    /// Create a new State that reports rebuild requests to a shared flag
    pub fn with_dirty_flag(value: T, dirty_flag: DirtyFlag) -> Self {
        Self {
            cell: Arc::new(RwLock::new(Cell { value, version: 0 })),
            dirty_flag,
        }
    }

    /// Get the current value
    pub fn get(&self) -> T {
        self.cell.read().unwrap().value.clone()
    }

    /// Read the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.cell.read().unwrap().value)
    }

    /// Set a new value
    ///
    /// This updates the value without requesting a tree rebuild.
    pub fn set(&self, value: T) {
        let mut cell = self.cell.write().unwrap();
        cell.value = value;
        cell.version += 1;
    }

    /// Set a new value AND request a UI tree rebuild
    pub fn set_rebuild(&self, value: T) {
        self.set(value);
        self.dirty_flag.store(true, Ordering::SeqCst);
    }

    /// Update the value using a function
    pub fn update(&self, f: impl FnOnce(T) -> T) {
        let mut cell = self.cell.write().unwrap();
        let next = f(cell.value.clone());
        cell.value = next;
        cell.version += 1;
    }

    /// Number of writes since creation
    pub fn version(&self) -> u64 {
        self.cell.read().unwrap().version
    }

    /// The flag raised by `set_rebuild`
    pub fn dirty_flag(&self) -> DirtyFlag {
        Arc::clone(&self.dirty_flag)
    }

    /// Consume a pending rebuild request
    pub fn take_dirty(&self) -> bool {
        self.dirty_flag.swap(false, Ordering::SeqCst)
    }
}

impl<T: Clone + PartialEq + Send + Sync + 'static> State<T> {
    /// Set and request a rebuild only if the value differs
    ///
    /// The comparison and the write happen under one lock. Returns true if
    /// the value changed.
    pub fn set_rebuild_if_changed(&self, value: T) -> bool {
        let mut cell = self.cell.write().unwrap();
        if cell.value == value {
            return false;
        }
        cell.value = value;
        cell.version += 1;
        self.dirty_flag.store(true, Ordering::SeqCst);
        true
    }
}

impl<T: Clone + Default + Send + Sync + 'static> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
