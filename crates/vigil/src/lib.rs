//! Vigil - observable widget state with vetoable transitions.
//!
//! This is the main crate. It re-exports the listener, notification and
//! dispatch machinery from `vigil-core` and adds the widget models built on
//! top of it.
//!
//! All widget state lives on the dispatch thread. Widgets are `!Send`, and
//! every listener registry additionally checks the calling thread at run
//! time. Work done elsewhere reaches the widgets by posting to a
//! [`DispatchQueue`].
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use vigil::prelude::*;
//!
//! struct Locked;
//!
//! impl RollupStateListener for Locked {
//!     fn preview_expanded_change(&self, _rollup: &Rollup) -> Vote {
//!         Vote::Deny
//!     }
//! }
//!
//! let rollup = Rollup::new().with_heading("Advanced");
//! rollup.rollup_state_listeners().listeners().add(Rc::new(Locked));
//!
//! let outcome = rollup.set_expanded(true).unwrap();
//! assert_eq!(outcome, TransitionOutcome::Vetoed(Vote::Deny));
//! assert!(!rollup.is_expanded());
//! ```

pub use vigil_core::*;

pub mod prelude;
pub mod widgets;
