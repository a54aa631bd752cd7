//! The preview / commit / veto protocol for cancelable transitions.
//!
//! Selection changes and closing surfaces let listeners refuse a change
//! before it happens. Every attempt runs the same state machine:
//!
//! 1. **Preview**: every listener is asked, in registration order, and
//!    answers with a [`Vote`]. All listeners are asked even after a deny;
//!    the tally is fixed at the first deny.
//! 2. **Commit** (all approved): the host applies the new value, then
//!    every listener's "changed" callback runs with the previous value.
//! 3. **Vetoed** (any denied): every listener's "vetoed" callback runs
//!    with the tallied vote as the reason; the host is left untouched.
//!
//! A vetoed attempt is not retried. The next setter call starts over at
//! preview.
//!
//! # Binding a listener trait
//!
//! [`TransitionPhases`] maps the three phases onto a listener trait's own
//! callback names:
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use vigil_core::{Property, TransitionOutcome, TransitionPhases, VetoableTransitionCoordinator, Vote};
//!
//! trait DoorListener {
//!     fn preview_open_change(&self, _door: &Door, _open: bool) -> Vote { Vote::Approve }
//!     fn open_change_vetoed(&self, _door: &Door, _reason: Vote) {}
//!     fn open_changed(&self, _door: &Door) {}
//! }
//!
//! struct Door {
//!     open: Property<bool>,
//!     listeners: VetoableTransitionCoordinator<dyn DoorListener>,
//! }
//!
//! impl Door {
//!     const OPEN: TransitionPhases<dyn DoorListener, Door, bool> = TransitionPhases {
//!         preview: |l, door, open| l.preview_open_change(door, *open),
//!         changed: |l, door, _| l.open_changed(door),
//!         vetoed: |l, door, reason| l.open_change_vetoed(door, reason),
//!     };
//!
//!     fn set_open(&self, open: bool) -> TransitionOutcome {
//!         self.listeners.attempt_change(self, self.open.get(), open, &Self::OPEN, |open| {
//!             self.open.set_silent(open)
//!         })
//!     }
//! }
//!
//! struct Lock;
//! impl DoorListener for Lock {
//!     fn preview_open_change(&self, _door: &Door, open: bool) -> Vote {
//!         if open { Vote::Deny } else { Vote::Approve }
//!     }
//! }
//!
//! let door = Door { open: Property::new(false), listeners: VetoableTransitionCoordinator::new() };
//! door.listeners.listeners().add(Rc::new(Lock));
//!
//! assert_eq!(door.set_open(true), TransitionOutcome::Vetoed(Vote::Deny));
//! assert!(!door.open.get());
//! assert_eq!(door.set_open(false), TransitionOutcome::Unchanged);
//! ```

use std::fmt;

use crate::listener::ListenerRegistry;
use crate::thread_check::DispatchGuard;
use crate::transition::{PropertyTransition, TransitionOutcome, Vote};

/// Binds the three protocol phases to a listener trait's callbacks.
///
/// `preview` receives the candidate value, `changed` the previous value.
pub struct TransitionPhases<L: ?Sized, O: ?Sized, T> {
    /// Ask one listener for its vote on the candidate value.
    pub preview: fn(&L, &O, &T) -> Vote,
    /// Tell one listener the change was committed.
    pub changed: fn(&L, &O, &T),
    /// Tell one listener the change was vetoed, and why.
    pub vetoed: fn(&L, &O, Vote),
}

impl<L: ?Sized, O: ?Sized, T> Clone for TransitionPhases<L, O, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L: ?Sized, O: ?Sized, T> Copy for TransitionPhases<L, O, T> {}

impl<L: ?Sized, O: ?Sized, T> fmt::Debug for TransitionPhases<L, O, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionPhases").finish_non_exhaustive()
    }
}

/// Runs vetoable transitions against a registry of listeners.
pub struct VetoableTransitionCoordinator<L: ?Sized> {
    listeners: ListenerRegistry<L>,
}

impl<L: ?Sized> Default for VetoableTransitionCoordinator<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> VetoableTransitionCoordinator<L> {
    /// Create a coordinator bound to the dispatch thread.
    pub fn new() -> Self {
        Self::with_guard(DispatchGuard::dispatch_thread())
    }

    /// Create a coordinator bound to an explicit guard.
    pub fn with_guard(guard: DispatchGuard) -> Self {
        Self {
            listeners: ListenerRegistry::with_guard(guard),
        }
    }

    /// The registry listeners are added to and removed from.
    pub fn listeners(&self) -> &ListenerRegistry<L> {
        &self.listeners
    }

    /// Collect every listener's vote on `candidate`.
    ///
    /// Every listener is consulted; one deny fixes the result.
    #[track_caller]
    pub fn preview<O: ?Sized, T>(
        &self,
        phases: &TransitionPhases<L, O, T>,
        owner: &O,
        candidate: &T,
    ) -> Vote {
        let mut vote = Vote::Approve;
        self.listeners.for_each(|listener| {
            let ballot = (phases.preview)(listener, owner, candidate);
            if vote.is_approved() && !ballot.is_approved() {
                tracing::trace!(target: "vigil_core::veto", "listener denied transition");
            }
            vote = vote.tally(ballot);
        });
        vote
    }

    /// Tell every listener the change was committed.
    #[track_caller]
    pub fn commit<O: ?Sized, T>(&self, phases: &TransitionPhases<L, O, T>, owner: &O, previous: &T) {
        self.listeners
            .for_each(|listener| (phases.changed)(listener, owner, previous));
    }

    /// Tell every listener the change was vetoed.
    #[track_caller]
    pub fn veto<O: ?Sized, T>(&self, phases: &TransitionPhases<L, O, T>, owner: &O, reason: Vote) {
        self.listeners
            .for_each(|listener| (phases.vetoed)(listener, owner, reason));
    }

    /// Run one full attempt for `transition`.
    ///
    /// On approval `apply` receives the candidate and must install it
    /// before this returns to the commit phase; on denial `apply` is never
    /// called.
    #[track_caller]
    pub fn attempt<O: ?Sized, T, F>(
        &self,
        transition: PropertyTransition<'_, O, T>,
        phases: &TransitionPhases<L, O, T>,
        apply: F,
    ) -> TransitionOutcome
    where
        F: FnOnce(T),
    {
        let _span = tracing::debug_span!("vigil::transition").entered();
        let vote = self.preview(phases, transition.owner(), transition.candidate());
        let (owner, previous, candidate) = transition.into_parts();

        if vote.is_approved() {
            apply(candidate);
            self.commit(phases, owner, &previous);
            tracing::debug!(target: "vigil_core::veto", "transition committed");
            TransitionOutcome::Committed
        } else {
            self.veto(phases, owner, vote);
            tracing::debug!(target: "vigil_core::veto", %vote, "transition vetoed");
            TransitionOutcome::Vetoed(vote)
        }
    }

    /// Run an attempt from `current` to `candidate`, unless they are equal.
    ///
    /// Equal values return [`TransitionOutcome::Unchanged`] without calling
    /// any listener.
    #[track_caller]
    pub fn attempt_change<O: ?Sized, T, F>(
        &self,
        owner: &O,
        current: T,
        candidate: T,
        phases: &TransitionPhases<L, O, T>,
        apply: F,
    ) -> TransitionOutcome
    where
        T: PartialEq,
        F: FnOnce(T),
    {
        match PropertyTransition::new(owner, current, candidate) {
            Some(transition) => self.attempt(transition, phases, apply),
            None => TransitionOutcome::Unchanged,
        }
    }
}

impl<L: ?Sized> fmt::Debug for VetoableTransitionCoordinator<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VetoableTransitionCoordinator")
            .field("listeners", &self.listeners)
            .finish()
    }
}
