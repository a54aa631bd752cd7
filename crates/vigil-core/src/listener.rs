//! Ordered, duplicate-free listener registries.
//!
//! A [`ListenerRegistry<L>`] holds `Rc<L>` observers, usually with `L` a
//! listener trait object such as `dyn RollupStateListener`. Registration
//! order is notification order. Identity is the allocation, so registering
//! the same `Rc` twice keeps a single entry.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use vigil_core::ListenerRegistry;
//!
//! trait Tick {
//!     fn tick(&self);
//! }
//!
//! struct Counter(Cell<u32>);
//!
//! impl Tick for Counter {
//!     fn tick(&self) {
//!         self.0.set(self.0.get() + 1);
//!     }
//! }
//!
//! let registry = ListenerRegistry::<dyn Tick>::new();
//! let counter = Rc::new(Counter(Cell::new(0)));
//!
//! assert!(registry.add(counter.clone()));
//! assert!(!registry.add(counter.clone())); // duplicate, ignored
//!
//! registry.for_each(|listener| listener.tick());
//! assert_eq!(counter.0.get(), 1);
//!
//! assert!(registry.remove(&counter));
//! assert!(registry.is_empty());
//! ```
//!
//! # Thread confinement
//!
//! Registries are `!Send + !Sync`. Every operation, reads included, also
//! asserts its [`DispatchGuard`] and panics when called from another thread.
//!
//! # Panicking listeners
//!
//! [`for_each`](ListenerRegistry::for_each) isolates each listener: if one
//! panics, the rest are still called, and the first panic is resumed once
//! the round is over.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use crate::thread_check::DispatchGuard;

/// Compares allocations, ignoring vtables.
#[inline]
fn same_listener<A: ?Sized, B: ?Sized>(a: &Rc<A>, b: &Rc<B>) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// An ordered set of listeners confined to the dispatch thread.
pub struct ListenerRegistry<L: ?Sized> {
    guard: DispatchGuard,
    listeners: RefCell<Vec<Rc<L>>>,
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> ListenerRegistry<L> {
    /// Create an empty registry bound to the dispatch thread.
    pub fn new() -> Self {
        Self::with_guard(DispatchGuard::dispatch_thread())
    }

    /// Create an empty registry bound to an explicit guard.
    pub fn with_guard(guard: DispatchGuard) -> Self {
        Self {
            guard,
            listeners: RefCell::new(Vec::new()),
        }
    }

    /// The guard this registry checks on every access.
    pub fn guard(&self) -> DispatchGuard {
        self.guard
    }

    /// Append a listener.
    ///
    /// Returns `false`, leaving the registry untouched, if this exact
    /// listener is already registered.
    #[track_caller]
    pub fn add(&self, listener: Rc<L>) -> bool {
        self.guard.assert_access();
        let mut listeners = self.listeners.borrow_mut();
        if listeners.iter().any(|l| same_listener(l, &listener)) {
            tracing::trace!(target: "vigil_core::listener", "duplicate listener ignored");
            return false;
        }
        listeners.push(listener);
        tracing::trace!(target: "vigil_core::listener", count = listeners.len(), "listener added");
        true
    }

    /// Remove a listener by identity.
    ///
    /// Accepts the listener's own `Rc` (`Rc<Recorder>`) as well as the
    /// registered trait object. Returns `false` if it was not registered.
    #[track_caller]
    pub fn remove<T: ?Sized>(&self, listener: &Rc<T>) -> bool {
        self.guard.assert_access();
        let mut listeners = self.listeners.borrow_mut();
        match listeners.iter().position(|l| same_listener(l, listener)) {
            Some(index) => {
                listeners.remove(index);
                tracing::trace!(target: "vigil_core::listener", count = listeners.len(), "listener removed");
                true
            }
            None => false,
        }
    }

    /// Check whether a listener is registered.
    #[track_caller]
    pub fn contains<T: ?Sized>(&self, listener: &Rc<T>) -> bool {
        self.guard.assert_access();
        self.listeners.borrow().iter().any(|l| same_listener(l, listener))
    }

    /// Check whether no listeners are registered.
    #[track_caller]
    pub fn is_empty(&self) -> bool {
        self.guard.assert_access();
        self.listeners.borrow().is_empty()
    }

    /// Get the number of registered listeners.
    #[track_caller]
    pub fn len(&self) -> usize {
        self.guard.assert_access();
        self.listeners.borrow().len()
    }

    /// Remove every listener.
    #[track_caller]
    pub fn clear(&self) {
        self.guard.assert_access();
        self.listeners.borrow_mut().clear();
    }

    /// Copy of the current listeners, in notification order.
    #[track_caller]
    pub fn snapshot(&self) -> Vec<Rc<L>> {
        self.guard.assert_access();
        self.listeners.borrow().clone()
    }

    /// Call `callback` once per listener, in registration order.
    ///
    /// The listener list is snapshotted first: listeners added or removed
    /// from inside a callback take effect from the next round.
    ///
    /// # Panics
    ///
    /// Panics off the dispatch thread. If a callback panics, the remaining
    /// listeners are still called and the first panic is then resumed.
    #[track_caller]
    pub fn for_each<F>(&self, mut callback: F)
    where
        F: FnMut(&L),
    {
        let snapshot = self.snapshot();
        let mut first_panic: Option<Box<dyn Any + Send>> = None;

        for (index, listener) in snapshot.iter().enumerate() {
            tracing::trace!(target: "vigil_core::listener", index, "notifying listener");
            let result = panic::catch_unwind(AssertUnwindSafe(|| callback(&**listener)));
            if let Err(payload) = result {
                tracing::warn!(
                    target: "vigil_core::listener",
                    index,
                    "listener panicked; notifying the remaining listeners first"
                );
                if first_panic.is_none() {
                    first_panic = Some(payload);
                }
            }
        }

        if let Some(payload) = first_panic {
            panic::resume_unwind(payload);
        }
    }
}

impl<L: ?Sized> fmt::Debug for ListenerRegistry<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("guard", &self.guard)
            .field("len", &self.listeners.borrow().len())
            .finish()
    }
}

static_assertions::assert_not_impl_any!(ListenerRegistry<dyn Fn()>: Send, Sync);
