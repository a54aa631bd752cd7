//! Mutual exclusion between toggle buttons.
//!
//! A [`ButtonGroup`] keeps at most one of its member buttons selected.
//! Membership is driven from the button side with
//! [`Button::set_button_group`]; [`ButtonGroup::add`] and
//! [`ButtonGroup::remove`] are shorthands for it.
//!
//! # Example
//!
//! ```
//! use vigil::widgets::{Button, ButtonGroup};
//!
//! let group = ButtonGroup::new();
//! let small = Button::radio_button();
//! let large = Button::radio_button();
//! group.add(&small).unwrap();
//! group.add(&large).unwrap();
//!
//! small.press().unwrap();
//! large.press().unwrap();
//! assert!(!small.is_selected());
//! assert!(large.is_selected());
//! assert!(group.is_selection(&large));
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use vigil_core::{ChangeNotifier, Result, VigilError};

use super::button::Button;

/// Receives membership and selection changes from a [`ButtonGroup`].
pub trait ButtonGroupListener {
    /// `button` joined the group.
    fn button_added(&self, _group: &ButtonGroup, _button: &Button) {}
    /// `button` left the group.
    fn button_removed(&self, _group: &ButtonGroup, _button: &Button) {}
    /// The selection moved away from `previous`.
    fn selection_changed(&self, _group: &ButtonGroup, _previous: Option<&Rc<Button>>) {}
}

/// A non-visual coordinator that keeps one member button selected.
///
/// The group holds its members weakly; the buttons own the group.
pub struct ButtonGroup {
    this: Weak<ButtonGroup>,
    buttons: RefCell<Vec<Weak<Button>>>,
    selection: RefCell<Option<Weak<Button>>>,
    listeners: ChangeNotifier<dyn ButtonGroupListener>,
}

impl ButtonGroup {
    /// Create an empty group.
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            buttons: RefCell::new(Vec::new()),
            selection: RefCell::new(None),
            listeners: ChangeNotifier::new(),
        })
    }

    // =========================================================================
    // Membership
    // =========================================================================

    /// Add `button` to this group.
    ///
    /// # Errors
    ///
    /// Whatever [`Button::set_button_group`] returns for `button`.
    pub fn add(&self, button: &Rc<Button>) -> Result<()> {
        let group = self
            .this
            .upgrade()
            .ok_or_else(|| VigilError::invalid_state("button group is being dropped"))?;
        button.set_button_group(Some(group))
    }

    /// Remove `button` from this group.
    ///
    /// # Errors
    ///
    /// [`VigilError::InvalidArgument`] if `button` is not a member.
    pub fn remove(&self, button: &Rc<Button>) -> Result<()> {
        if !self.contains(button) {
            return Err(VigilError::invalid_argument("button is not a member of this group"));
        }
        button.set_button_group(None)
    }

    /// Check if `button` is a member.
    pub fn contains(&self, button: &Rc<Button>) -> bool {
        self.buttons
            .borrow()
            .iter()
            .any(|member| std::ptr::eq(member.as_ptr(), Rc::as_ptr(button)))
    }

    /// The live members, in the order they joined.
    pub fn buttons(&self) -> Vec<Rc<Button>> {
        self.buttons
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }

    /// Number of live members.
    pub fn len(&self) -> usize {
        self.buttons
            .borrow()
            .iter()
            .filter(|member| member.strong_count() > 0)
            .count()
    }

    /// Check if the group has no live members.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record `button` as a member.
    ///
    /// A selected newcomer becomes the selection if the group has none;
    /// otherwise it is deselected.
    pub(crate) fn attach(&self, button: &Rc<Button>) -> Result<()> {
        {
            let mut buttons = self.buttons.borrow_mut();
            buttons.retain(|member| member.strong_count() > 0);
            buttons.push(Rc::downgrade(button));
        }
        tracing::trace!(target: "vigil::widget", members = self.len(), "button joined group");
        self.listeners.notify(|l| l.button_added(self, button));

        if button.is_selected() {
            if self.selection().is_none() {
                self.replace_selection(Some(button));
            } else {
                button.set_selected(false)?;
            }
        }
        Ok(())
    }

    pub(crate) fn detach(&self, button: &Rc<Button>) {
        self.buttons
            .borrow_mut()
            .retain(|member| !std::ptr::eq(member.as_ptr(), Rc::as_ptr(button)));
        if self.is_selection(button) {
            self.replace_selection(None);
        }
        self.listeners.notify(|l| l.button_removed(self, button));
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// The selected member, if any.
    pub fn selection(&self) -> Option<Rc<Button>> {
        self.selection.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Check if `button` is the selected member.
    pub fn is_selection(&self, button: &Rc<Button>) -> bool {
        self.selection
            .borrow()
            .as_ref()
            .is_some_and(|selected| std::ptr::eq(selected.as_ptr(), Rc::as_ptr(button)))
    }

    /// Select `selection`, deselecting the previous selection. `None`
    /// clears the selection.
    ///
    /// # Errors
    ///
    /// [`VigilError::InvalidArgument`] if `selection` is not a member.
    pub fn set_selection(&self, selection: Option<&Rc<Button>>) -> Result<()> {
        if let Some(button) = selection
            && !self.contains(button)
        {
            return Err(VigilError::invalid_argument("button is not a member of this group"));
        }

        let unchanged = match selection {
            Some(button) => self.is_selection(button),
            None => self.selection.borrow().is_none(),
        };
        if unchanged {
            return Ok(());
        }

        let previous = self.replace_selection_silently(selection);
        if let Some(previous) = &previous {
            previous.set_selected(false)?;
        }
        if let Some(button) = selection {
            button.set_selected(true)?;
        }
        self.listeners
            .notify(|l| l.selection_changed(self, previous.as_ref()));
        Ok(())
    }

    fn replace_selection_silently(&self, selection: Option<&Rc<Button>>) -> Option<Rc<Button>> {
        self.selection
            .replace(selection.map(Rc::downgrade))
            .and_then(|previous| previous.upgrade())
    }

    /// Move the selection without touching the buttons' states.
    fn replace_selection(&self, selection: Option<&Rc<Button>>) {
        let previous = self.replace_selection_silently(selection);
        self.listeners
            .notify(|l| l.selection_changed(self, previous.as_ref()));
    }

    /// Listeners for membership and selection changes.
    pub fn button_group_listeners(&self) -> &ChangeNotifier<dyn ButtonGroupListener> {
        &self.listeners
    }
}

impl fmt::Debug for ButtonGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonGroup")
            .field("len", &self.len())
            .field("has_selection", &self.selection().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::ButtonState;

    #[derive(Default)]
    struct Journal(RefCell<Vec<String>>);

    impl ButtonGroupListener for Journal {
        fn button_added(&self, group: &ButtonGroup, _button: &Button) {
            self.0.borrow_mut().push(format!("added:{}", group.len()));
        }
        fn button_removed(&self, group: &ButtonGroup, _button: &Button) {
            self.0.borrow_mut().push(format!("removed:{}", group.len()));
        }
        fn selection_changed(&self, group: &ButtonGroup, previous: Option<&Rc<Button>>) {
            let label = |b: Option<Rc<Button>>| b.and_then(|b| b.button_data()).unwrap_or_default();
            self.0.borrow_mut().push(format!(
                "selection:{}->{}",
                label(previous.cloned()),
                label(group.selection())
            ));
        }
    }

    fn radio(label: &str) -> Rc<Button> {
        let button = Button::radio_button();
        button.set_button_data(Some(label.to_string()));
        button
    }

    #[test]
    fn test_membership() {
        let group = ButtonGroup::new();
        let journal = Rc::new(Journal::default());
        group.button_group_listeners().listeners().add(journal.clone());

        let a = radio("a");
        let b = radio("b");
        group.add(&a).unwrap();
        group.add(&b).unwrap();
        assert_eq!(group.len(), 2);
        assert!(group.contains(&a));
        assert!(Rc::ptr_eq(&a.button_group().unwrap(), &group));

        group.remove(&a).unwrap();
        assert!(!group.contains(&a));
        assert!(a.button_group().is_none());
        assert!(matches!(group.remove(&a), Err(VigilError::InvalidArgument(_))));

        assert_eq!(
            *journal.0.borrow(),
            vec!["added:1", "added:2", "removed:1"]
        );
    }

    #[test]
    fn test_selection_is_exclusive() {
        let group = ButtonGroup::new();
        let a = radio("a");
        let b = radio("b");
        group.add(&a).unwrap();
        group.add(&b).unwrap();
        let journal = Rc::new(Journal::default());
        group.button_group_listeners().listeners().add(journal.clone());

        group.set_selection(Some(&a)).unwrap();
        assert_eq!(a.state(), ButtonState::Selected);

        b.set_selected(true).unwrap();
        assert_eq!(a.state(), ButtonState::Unselected);
        assert!(group.is_selection(&b));

        group.set_selection(None).unwrap();
        assert_eq!(b.state(), ButtonState::Unselected);
        assert!(group.selection().is_none());

        assert_eq!(
            *journal.0.borrow(),
            vec!["selection:->a", "selection:a->b", "selection:b->"]
        );
    }

    #[test]
    fn test_press_in_group_always_selects() {
        let group = ButtonGroup::new();
        let a = radio("a");
        group.add(&a).unwrap();

        a.press().unwrap();
        a.press().unwrap();
        assert!(a.is_selected());
    }

    #[test]
    fn test_selecting_non_member_fails() {
        let group = ButtonGroup::new();
        let stranger = radio("x");
        assert!(matches!(
            group.set_selection(Some(&stranger)),
            Err(VigilError::InvalidArgument(_))
        ));
        assert!(!stranger.is_selected());
    }

    #[test]
    fn test_removing_selected_member_clears_selection() {
        let group = ButtonGroup::new();
        let a = radio("a");
        group.add(&a).unwrap();
        a.press().unwrap();

        a.set_button_group(None).unwrap();
        assert!(group.selection().is_none());
        assert!(a.is_selected());
    }

    #[test]
    fn test_dropped_members_are_skipped() {
        let group = ButtonGroup::new();
        let a = radio("a");
        {
            let b = radio("b");
            group.add(&b).unwrap();
        }
        group.add(&a).unwrap();

        assert_eq!(group.len(), 1);
        assert_eq!(group.buttons().len(), 1);
    }

    #[test]
    fn test_moving_between_groups() {
        let first = ButtonGroup::new();
        let second = ButtonGroup::new();
        let a = radio("a");

        first.add(&a).unwrap();
        second.add(&a).unwrap();

        assert!(first.is_empty());
        assert!(second.contains(&a));
    }

    #[test]
    fn test_selected_newcomer_keeps_one_selection() {
        let group = ButtonGroup::new();
        let journal = Rc::new(Journal::default());
        group.button_group_listeners().listeners().add(journal.clone());

        // A selected button joining an empty-handed group becomes its selection.
        let a = radio("a");
        a.set_selected(true).unwrap();
        group.add(&a).unwrap();
        assert!(group.is_selection(&a));

        // A second selected button is deselected on the way in.
        let b = radio("b");
        b.set_selected(true).unwrap();
        group.add(&b).unwrap();
        assert!(a.is_selected());
        assert!(!b.is_selected());
        assert!(group.is_selection(&a));

        assert_eq!(
            *journal.0.borrow(),
            vec!["added:1", "selection:->a", "added:2"]
        );
    }

    #[test]
    fn test_moving_selected_button_between_groups() {
        let left = ButtonGroup::new();
        let right = ButtonGroup::new();
        let a = radio("a");
        let b = radio("b");
        left.add(&a).unwrap();
        right.add(&b).unwrap();
        a.set_selected(true).unwrap();
        b.set_selected(true).unwrap();

        a.set_button_group(Some(right.clone())).unwrap();

        assert!(left.selection().is_none());
        assert!(right.is_selection(&b));
        assert!(!a.is_selected());
        let selected = right.buttons().iter().filter(|m| m.is_selected()).count();
        assert_eq!(selected, 1);
    }
}
