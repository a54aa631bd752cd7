//! Core systems for vigil.
//!
//! This crate provides the listener machinery that vigil's widgets are built
//! on:
//!
//! - **Dispatch thread**: all listener state is confined to one thread
//! - **Listener registries**: ordered, duplicate-free, identity-compared
//! - **Change notification**: listeners only ever see committed state
//! - **Vetoable transitions**: preview / commit / veto for cancelable changes
//! - **Dispatch queue**: worker threads hand results back to the dispatch thread
//!
//! # Change notification
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use vigil_core::{ChangeNotifier, Property};
//!
//! trait CounterListener {
//!     fn count_changed(&self, counter: &Counter, previous: &u32);
//! }
//!
//! struct Counter {
//!     count: Property<u32>,
//!     listeners: ChangeNotifier<dyn CounterListener>,
//! }
//!
//! impl Counter {
//!     fn increment(&self) {
//!         let next = self.count.get() + 1;
//!         self.listeners.update(self, &self.count, next, |l, c, previous| {
//!             l.count_changed(c, previous)
//!         });
//!     }
//! }
//!
//! struct Tally(Cell<u32>);
//! impl CounterListener for Tally {
//!     fn count_changed(&self, counter: &Counter, _previous: &u32) {
//!         self.0.set(counter.count.get());
//!     }
//! }
//!
//! let counter = Counter { count: Property::new(0), listeners: ChangeNotifier::new() };
//! let tally = Rc::new(Tally(Cell::new(0)));
//! counter.listeners.listeners().add(tally.clone());
//!
//! counter.increment();
//! counter.increment();
//! assert_eq!(tally.0.get(), 2);
//! ```
//!
//! See [`veto`] for the vetoable protocol and [`dispatch`] for handing work
//! back from worker threads.

mod config;
pub mod dispatch;
mod error;
pub mod listener;
pub mod logging;
pub mod notifier;
mod property;
pub mod thread_check;
mod transition;
pub mod veto;

pub use config::{DispatchConfig, DispatchConfigBuilder, DEFAULT_BATCH_SIZE};
pub use dispatch::{DispatchQueue, DispatchSender, spawn_task};
pub use error::{Result, VigilError, WrongThreadError};
pub use listener::ListenerRegistry;
pub use notifier::ChangeNotifier;
pub use property::Property;
pub use thread_check::{
    DispatchGuard, are_thread_checks_enabled, designate_dispatch_thread, is_dispatch_thread,
    set_thread_checks_enabled,
};
pub use transition::{PropertyTransition, TransitionOutcome, Vote};
pub use veto::{TransitionPhases, VetoableTransitionCoordinator};
