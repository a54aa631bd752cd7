//! Votes, property transitions and their outcomes.

use std::fmt;

/// The answer a listener gives when previewing a vetoable transition.
///
/// A single [`Vote::Deny`] overrides any number of approvals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Vote {
    /// Let the transition proceed.
    #[default]
    Approve,
    /// Abandon the transition.
    Deny,
}

impl Vote {
    /// Combine two votes. Deny wins.
    ///
    /// ```
    /// use vigil_core::Vote;
    ///
    /// assert_eq!(Vote::Approve.tally(Vote::Approve), Vote::Approve);
    /// assert_eq!(Vote::Approve.tally(Vote::Deny), Vote::Deny);
    /// assert_eq!(Vote::Deny.tally(Vote::Approve), Vote::Deny);
    /// ```
    #[must_use]
    pub fn tally(self, other: Vote) -> Vote {
        match (self, other) {
            (Vote::Approve, Vote::Approve) => Vote::Approve,
            _ => Vote::Deny,
        }
    }

    /// Returns `true` for [`Vote::Approve`].
    pub fn is_approved(self) -> bool {
        matches!(self, Vote::Approve)
    }
}

impl From<bool> for Vote {
    fn from(approve: bool) -> Self {
        if approve { Vote::Approve } else { Vote::Deny }
    }
}

impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Vote::Approve => f.write_str("approve"),
            Vote::Deny => f.write_str("deny"),
        }
    }
}

/// A candidate change of one property on one host.
///
/// A transition only exists when the candidate differs from the previous
/// value; [`PropertyTransition::new`] returns `None` otherwise, which is how
/// no-op sets skip preview and notification entirely.
pub struct PropertyTransition<'a, O: ?Sized, T> {
    owner: &'a O,
    previous: T,
    candidate: T,
}

impl<'a, O: ?Sized, T: PartialEq> PropertyTransition<'a, O, T> {
    /// Create a transition, or `None` if `candidate == previous`.
    pub fn new(owner: &'a O, previous: T, candidate: T) -> Option<Self> {
        if previous == candidate {
            None
        } else {
            Some(Self {
                owner,
                previous,
                candidate,
            })
        }
    }
}

impl<'a, O: ?Sized, T> PropertyTransition<'a, O, T> {
    /// The host whose property is changing.
    pub fn owner(&self) -> &'a O {
        self.owner
    }

    /// The value before the transition.
    pub fn previous(&self) -> &T {
        &self.previous
    }

    /// The value the transition would install.
    pub fn candidate(&self) -> &T {
        &self.candidate
    }

    /// Split into `(owner, previous, candidate)`.
    pub fn into_parts(self) -> (&'a O, T, T) {
        (self.owner, self.previous, self.candidate)
    }
}

impl<O: ?Sized, T: fmt::Debug> fmt::Debug for PropertyTransition<'_, O, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyTransition")
            .field("previous", &self.previous)
            .field("candidate", &self.candidate)
            .finish_non_exhaustive()
    }
}

/// What happened to a requested change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionOutcome {
    /// The candidate equalled the current value, or the host was already in
    /// the requested state. Nothing was previewed or notified.
    Unchanged,
    /// Every listener approved and the new value is visible.
    Committed,
    /// At least one listener denied; the host is unchanged.
    Vetoed(Vote),
}

impl TransitionOutcome {
    /// Returns `true` if the change was committed.
    pub fn is_committed(&self) -> bool {
        matches!(self, TransitionOutcome::Committed)
    }

    /// Returns `true` if the change was vetoed.
    pub fn is_vetoed(&self) -> bool {
        matches!(self, TransitionOutcome::Vetoed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deny_overrides_approve() {
        let votes = [Vote::Approve, Vote::Deny, Vote::Approve];
        let result = votes.iter().fold(Vote::Approve, |acc, &v| acc.tally(v));
        assert_eq!(result, Vote::Deny);
        assert!(!result.is_approved());
    }

    #[test]
    fn test_vote_default_and_from_bool() {
        assert_eq!(Vote::default(), Vote::Approve);
        assert_eq!(Vote::from(false), Vote::Deny);
        assert_eq!(Vote::Deny.to_string(), "deny");
    }

    #[test]
    fn test_equal_values_make_no_transition() {
        let owner = ();
        assert!(PropertyTransition::new(&owner, 3, 3).is_none());

        let transition = PropertyTransition::new(&owner, 3, 4).unwrap();
        assert_eq!(*transition.previous(), 3);
        assert_eq!(*transition.candidate(), 4);

        let (_, previous, candidate) = transition.into_parts();
        assert_eq!((previous, candidate), (3, 4));
    }

    #[test]
    fn test_outcome_predicates() {
        assert!(TransitionOutcome::Committed.is_committed());
        assert!(TransitionOutcome::Vetoed(Vote::Deny).is_vetoed());
        assert!(!TransitionOutcome::Unchanged.is_committed());
        assert!(!TransitionOutcome::Unchanged.is_vetoed());
    }
}
