//! Commands that a button performs when pressed.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use vigil::widgets::{Action, Button};
//!
//! let saves = Rc::new(Cell::new(0));
//! let counter = saves.clone();
//! let save = Rc::new(
//!     Action::new(move |_source| counter.set(counter.get() + 1)).with_description("Save"),
//! );
//!
//! let button = Button::push_button();
//! button.set_action(Some(save.clone()));
//! button.press().unwrap();
//! assert_eq!(saves.get(), 1);
//!
//! // Disabled actions are skipped.
//! save.set_enabled(false);
//! button.press().unwrap();
//! assert_eq!(saves.get(), 1);
//! ```

use std::fmt;

use vigil_core::{ChangeNotifier, Property};

use super::button::Button;

/// Receives notifications about an [`Action`].
pub trait ActionListener {
    /// The action was enabled or disabled.
    fn enabled_changed(&self, _action: &Action) {}
}

/// A command that can be attached to one or more buttons.
pub struct Action {
    description: Option<String>,
    enabled: Property<bool>,
    perform: Box<dyn Fn(&Button)>,
    listeners: ChangeNotifier<dyn ActionListener>,
}

impl Action {
    /// Create an enabled action that runs `perform` with the pressed button.
    pub fn new(perform: impl Fn(&Button) + 'static) -> Self {
        Self {
            description: None,
            enabled: Property::new(true),
            perform: Box::new(perform),
            listeners: ChangeNotifier::new(),
        }
    }

    /// Set a human-readable description using builder pattern.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The action's description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Check if the action will run when performed.
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Enable or disable the action.
    pub fn set_enabled(&self, enabled: bool) {
        self.listeners
            .update(self, &self.enabled, enabled, |l, action, _| {
                l.enabled_changed(action)
            });
    }

    /// Run the action for `source`. Does nothing while disabled.
    pub fn perform(&self, source: &Button) {
        if self.is_enabled() {
            tracing::trace!(target: "vigil::widget", description = ?self.description, "performing action");
            (self.perform)(source);
        }
    }

    /// Listeners notified when the enabled flag changes.
    pub fn action_listeners(&self) -> &ChangeNotifier<dyn ActionListener> {
        &self.listeners
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("description", &self.description)
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}
