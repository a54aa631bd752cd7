//! A collapsible section with a heading.
//!
//! Expanding and collapsing is vetoable: [`RollupStateListener`]s preview
//! the change and any of them can deny it.

use std::fmt;

use vigil_core::{
    ChangeNotifier, Property, Result, TransitionOutcome, TransitionPhases,
    VetoableTransitionCoordinator, VigilError, Vote,
};

/// Receives plain property changes from a [`Rollup`].
pub trait RollupListener {
    /// The heading changed.
    fn heading_changed(&self, _rollup: &Rollup, _previous: &Option<String>) {}
    /// The collapsible flag changed.
    fn collapsible_changed(&self, _rollup: &Rollup) {}
}

/// Takes part in expanding and collapsing a [`Rollup`].
pub trait RollupStateListener {
    /// Vote on toggling the expanded flag. The rollup still holds its
    /// current value.
    fn preview_expanded_change(&self, _rollup: &Rollup) -> Vote {
        Vote::Approve
    }
    /// A listener denied the change.
    fn expanded_change_vetoed(&self, _rollup: &Rollup, _reason: Vote) {}
    /// The expanded flag was toggled.
    fn expanded_changed(&self, _rollup: &Rollup) {}
}

/// A heading plus content that can be expanded or collapsed.
pub struct Rollup {
    heading: Property<Option<String>>,
    collapsible: Property<bool>,
    expanded: Property<bool>,
    rollup_listeners: ChangeNotifier<dyn RollupListener>,
    state_listeners: VetoableTransitionCoordinator<dyn RollupStateListener>,
}

impl Rollup {
    const EXPANDED: TransitionPhases<dyn RollupStateListener, Rollup, bool> = TransitionPhases {
        preview: |l, rollup, _| l.preview_expanded_change(rollup),
        changed: |l, rollup, _| l.expanded_changed(rollup),
        vetoed: |l, rollup, reason| l.expanded_change_vetoed(rollup, reason),
    };

    /// Create a collapsed, collapsible rollup with no heading.
    pub fn new() -> Self {
        Self {
            heading: Property::new(None),
            collapsible: Property::new(true),
            expanded: Property::new(false),
            rollup_listeners: ChangeNotifier::new(),
            state_listeners: VetoableTransitionCoordinator::new(),
        }
    }

    /// Set the heading using builder pattern.
    pub fn with_heading(self, heading: impl Into<String>) -> Self {
        self.heading.set_silent(Some(heading.into()));
        self
    }

    /// The heading text.
    pub fn heading(&self) -> Option<String> {
        self.heading.get()
    }

    /// Set the heading text.
    pub fn set_heading(&self, heading: Option<String>) {
        self.rollup_listeners
            .update(self, &self.heading, heading, |l, rollup, previous| {
                l.heading_changed(rollup, previous)
            });
    }

    /// Check if the rollup may be collapsed.
    pub fn is_collapsible(&self) -> bool {
        self.collapsible.get()
    }

    /// Allow or forbid collapsing.
    pub fn set_collapsible(&self, collapsible: bool) {
        self.rollup_listeners
            .update(self, &self.collapsible, collapsible, |l, rollup, _| {
                l.collapsible_changed(rollup)
            });
    }

    /// Check if the content is shown.
    pub fn is_expanded(&self) -> bool {
        self.expanded.get()
    }

    /// Expand or collapse, subject to veto.
    ///
    /// # Errors
    ///
    /// [`VigilError::InvalidState`] when collapsing a rollup that is not
    /// collapsible.
    pub fn set_expanded(&self, expanded: bool) -> Result<TransitionOutcome> {
        if !expanded && !self.is_collapsible() {
            return Err(VigilError::invalid_state("rollup is not collapsible"));
        }
        let outcome = self.state_listeners.attempt_change(
            self,
            self.is_expanded(),
            expanded,
            &Self::EXPANDED,
            |expanded| self.expanded.set_silent(expanded),
        );
        tracing::debug!(target: "vigil::widget", expanded, ?outcome, "rollup expansion");
        Ok(outcome)
    }

    /// Listeners for heading and collapsible changes.
    pub fn rollup_listeners(&self) -> &ChangeNotifier<dyn RollupListener> {
        &self.rollup_listeners
    }

    /// Listeners that preview and observe expansion.
    pub fn rollup_state_listeners(&self) -> &VetoableTransitionCoordinator<dyn RollupStateListener> {
        &self.state_listeners
    }
}

impl Default for Rollup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Rollup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rollup")
            .field("heading", &self.heading())
            .field("collapsible", &self.is_collapsible())
            .field("expanded", &self.is_expanded())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Gate {
        vote: Vote,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl RollupStateListener for Gate {
        fn preview_expanded_change(&self, rollup: &Rollup) -> Vote {
            self.log
                .borrow_mut()
                .push(format!("preview:{}", rollup.is_expanded()));
            self.vote
        }
        fn expanded_change_vetoed(&self, _rollup: &Rollup, reason: Vote) {
            self.log.borrow_mut().push(format!("vetoed:{reason}"));
        }
        fn expanded_changed(&self, rollup: &Rollup) {
            self.log
                .borrow_mut()
                .push(format!("changed:{}", rollup.is_expanded()));
        }
    }

    fn gate(rollup: &Rollup, vote: Vote, log: &Rc<RefCell<Vec<String>>>) {
        rollup.rollup_state_listeners().listeners().add(Rc::new(Gate {
            vote,
            log: log.clone(),
        }));
    }

    #[test]
    fn test_approved_expansion() {
        let rollup = Rollup::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        gate(&rollup, Vote::Approve, &log);

        assert_eq!(rollup.set_expanded(true).unwrap(), TransitionOutcome::Committed);
        assert!(rollup.is_expanded());
        assert_eq!(*log.borrow(), vec!["preview:false", "changed:true"]);
    }

    #[test]
    fn test_denied_expansion_leaves_state() {
        let rollup = Rollup::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        gate(&rollup, Vote::Approve, &log);
        gate(&rollup, Vote::Deny, &log);

        assert_eq!(
            rollup.set_expanded(true).unwrap(),
            TransitionOutcome::Vetoed(Vote::Deny)
        );
        assert!(!rollup.is_expanded());
        assert_eq!(
            *log.borrow(),
            vec!["preview:false", "preview:false", "vetoed:deny", "vetoed:deny"]
        );
    }

    #[test]
    fn test_collapse_requires_collapsible() {
        let rollup = Rollup::new();
        assert!(rollup.set_expanded(true).unwrap().is_committed());
        rollup.set_collapsible(false);

        assert!(matches!(rollup.set_expanded(false), Err(VigilError::InvalidState(_))));
        assert!(rollup.is_expanded());

        rollup.set_collapsible(true);
        assert!(rollup.set_expanded(false).unwrap().is_committed());
    }

    #[test]
    fn test_unchanged_expansion_asks_nobody() {
        let rollup = Rollup::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        gate(&rollup, Vote::Deny, &log);

        assert_eq!(rollup.set_expanded(false).unwrap(), TransitionOutcome::Unchanged);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_heading_notifies_with_previous() {
        struct Headings(RefCell<Vec<Option<String>>>);
        impl RollupListener for Headings {
            fn heading_changed(&self, _rollup: &Rollup, previous: &Option<String>) {
                self.0.borrow_mut().push(previous.clone());
            }
        }

        let rollup = Rollup::new().with_heading("Advanced");
        let headings = Rc::new(Headings(RefCell::new(Vec::new())));
        rollup.rollup_listeners().listeners().add(headings.clone());

        rollup.set_heading(Some("Details".to_string()));
        rollup.set_heading(Some("Details".to_string()));

        assert_eq!(rollup.heading().as_deref(), Some("Details"));
        assert_eq!(*headings.0.borrow(), vec![Some("Advanced".to_string())]);
    }
}
