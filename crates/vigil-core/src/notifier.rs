//! Change notification for plain (non-vetoable) properties.
//!
//! A [`ChangeNotifier<L>`] pairs a [`ListenerRegistry<L>`] with the rule
//! that listeners only ever observe committed state: the host updates its
//! value first and notifies second, so a listener reading the property back
//! sees the new value. [`ChangeNotifier::update`] does both steps in order.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use vigil_core::{ChangeNotifier, Property};
//!
//! trait GaugeListener {
//!     fn value_changed(&self, gauge: &Gauge, previous: &i32) {}
//! }
//!
//! struct Gauge {
//!     value: Property<i32>,
//!     listeners: ChangeNotifier<dyn GaugeListener>,
//! }
//!
//! impl Gauge {
//!     fn set_value(&self, value: i32) {
//!         self.listeners.update(self, &self.value, value, |l, g, previous| {
//!             l.value_changed(g, previous)
//!         });
//!     }
//! }
//!
//! struct Printer;
//! impl GaugeListener for Printer {
//!     fn value_changed(&self, gauge: &Gauge, previous: &i32) {
//!         assert_eq!((gauge.value.get(), *previous), (10, 0));
//!     }
//! }
//!
//! let gauge = Gauge { value: Property::new(0), listeners: ChangeNotifier::new() };
//! gauge.listeners.listeners().add(Rc::new(Printer));
//! gauge.set_value(10);
//! ```

use std::cell::Cell;
use std::fmt;

use crate::listener::ListenerRegistry;
use crate::property::Property;
use crate::thread_check::DispatchGuard;
use crate::transition::PropertyTransition;

/// Fires "changed" callbacks to a registry of listeners.
pub struct ChangeNotifier<L: ?Sized> {
    listeners: ListenerRegistry<L>,
    blocked: Cell<bool>,
}

impl<L: ?Sized> Default for ChangeNotifier<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> ChangeNotifier<L> {
    /// Create a notifier bound to the dispatch thread.
    pub fn new() -> Self {
        Self::with_guard(DispatchGuard::dispatch_thread())
    }

    /// Create a notifier bound to an explicit guard.
    pub fn with_guard(guard: DispatchGuard) -> Self {
        Self {
            listeners: ListenerRegistry::with_guard(guard),
            blocked: Cell::new(false),
        }
    }

    /// The registry listeners are added to and removed from.
    pub fn listeners(&self) -> &ListenerRegistry<L> {
        &self.listeners
    }

    /// Suppress notifications temporarily.
    ///
    /// While blocked, [`notify`](Self::notify) does nothing. Values still
    /// change; this is for silent batch updates.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.set(blocked);
    }

    /// Check if notifications are currently suppressed.
    pub fn is_blocked(&self) -> bool {
        self.blocked.get()
    }

    /// Call `callback` for every listener, in registration order.
    ///
    /// Used directly for events that are not value changes, such as a
    /// button press.
    #[track_caller]
    pub fn notify<F>(&self, callback: F)
    where
        F: FnMut(&L),
    {
        if self.is_blocked() {
            tracing::trace!(target: "vigil_core::notify", "notifier blocked, skipping");
            return;
        }
        self.listeners.for_each(callback);
    }

    /// Notify listeners of a committed transition.
    ///
    /// The owner must already hold the candidate value.
    #[track_caller]
    pub fn notify_changed<O: ?Sized, T>(
        &self,
        transition: &PropertyTransition<'_, O, T>,
        changed: fn(&L, &O, &T),
    ) {
        let owner = transition.owner();
        let previous = transition.previous();
        self.notify(|listener| changed(listener, owner, previous));
    }

    /// Store `value` in `property` and, if it changed, notify listeners with
    /// the previous value.
    ///
    /// Returns `true` if the value changed.
    #[track_caller]
    pub fn update<O: ?Sized, T>(
        &self,
        owner: &O,
        property: &Property<T>,
        value: T,
        changed: fn(&L, &O, &T),
    ) -> bool
    where
        T: Clone + PartialEq,
    {
        let current = property.get();
        let Some(transition) = PropertyTransition::new(owner, current, value) else {
            return false;
        };
        property.set_silent(transition.candidate().clone());
        tracing::debug!(target: "vigil_core::notify", "property changed");
        self.notify_changed(&transition, changed);
        true
    }
}

impl<L: ?Sized> fmt::Debug for ChangeNotifier<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners)
            .field("blocked", &self.blocked.get())
            .finish()
    }
}
