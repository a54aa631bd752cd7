//! Push buttons, checkboxes and radio buttons.
//!
//! All three are a [`Button`] with a different [`ButtonKind`]. The kind fixes
//! which configuration a button accepts:
//!
//! | kind     | toggle       | button group | tri-state |
//! |----------|--------------|--------------|-----------|
//! | push     | configurable | when toggle  | when toggle |
//! | checkbox | always       | never        | configurable |
//! | radio    | always       | configurable | never     |
//!
//! Changing a fixed setting fails with
//! [`VigilError::UnsupportedConfiguration`].
//!
//! # Example
//!
//! ```
//! use vigil::widgets::{Button, ButtonState};
//!
//! let checkbox = Button::checkbox();
//! checkbox.set_tri_state(true).unwrap();
//!
//! checkbox.press().unwrap();
//! assert_eq!(checkbox.state(), ButtonState::Mixed);
//! checkbox.press().unwrap();
//! assert_eq!(checkbox.state(), ButtonState::Selected);
//! checkbox.press().unwrap();
//! assert_eq!(checkbox.state(), ButtonState::Unselected);
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::{Arc, OnceLock};

use vigil_core::{ChangeNotifier, Property, Result, VigilError};

use super::action::{Action, ActionListener};
use super::button_group::ButtonGroup;

// ============================================================================
// State and kind
// ============================================================================

/// The selection state of a toggle button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ButtonState {
    /// The button is selected (checked).
    Selected,
    /// The button is not selected.
    #[default]
    Unselected,
    /// Neither selected nor unselected. Only reachable on tri-state buttons.
    Mixed,
}

impl ButtonState {
    /// The state a tri-state button moves to when pressed.
    ///
    /// `Unselected → Mixed → Selected → Unselected`.
    pub fn next_tri_state(self) -> Self {
        match self {
            ButtonState::Unselected => ButtonState::Mixed,
            ButtonState::Mixed => ButtonState::Selected,
            ButtonState::Selected => ButtonState::Unselected,
        }
    }

    /// The state a two-state toggle button moves to when pressed.
    pub fn toggled(self) -> Self {
        match self {
            ButtonState::Selected => ButtonState::Unselected,
            ButtonState::Unselected | ButtonState::Mixed => ButtonState::Selected,
        }
    }
}

impl From<bool> for ButtonState {
    fn from(selected: bool) -> Self {
        if selected {
            ButtonState::Selected
        } else {
            ButtonState::Unselected
        }
    }
}

/// The flavour of a [`Button`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonKind {
    /// A push button. Optionally a toggle button.
    Push,
    /// A checkbox. Always a toggle button; never grouped.
    Checkbox,
    /// A radio button. Always a toggle button; never tri-state.
    Radio,
}

/// Whether a setting can change after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// The setting may be changed freely.
    Configurable,
    /// The setting is permanently this value.
    Fixed(bool),
}

impl Capability {
    fn initial(self) -> bool {
        match self {
            Capability::Configurable => false,
            Capability::Fixed(value) => value,
        }
    }

    fn allows(self, value: bool) -> bool {
        match self {
            Capability::Configurable => true,
            Capability::Fixed(fixed) => fixed == value,
        }
    }
}

/// The settings a [`ButtonKind`] fixes at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonCapabilities {
    /// Toggle-button mode.
    pub toggle: Capability,
    /// Membership in a [`ButtonGroup`].
    pub group: Capability,
    /// Tri-state mode.
    pub tri_state: Capability,
}

impl ButtonKind {
    /// The capabilities of this kind.
    pub const fn capabilities(self) -> ButtonCapabilities {
        match self {
            ButtonKind::Push => ButtonCapabilities {
                toggle: Capability::Configurable,
                group: Capability::Configurable,
                tri_state: Capability::Configurable,
            },
            ButtonKind::Checkbox => ButtonCapabilities {
                toggle: Capability::Fixed(true),
                group: Capability::Fixed(false),
                tri_state: Capability::Configurable,
            },
            ButtonKind::Radio => ButtonCapabilities {
                toggle: Capability::Fixed(true),
                group: Capability::Configurable,
                tri_state: Capability::Fixed(false),
            },
        }
    }

    fn name(self) -> &'static str {
        match self {
            ButtonKind::Push => "push buttons",
            ButtonKind::Checkbox => "checkboxes",
            ButtonKind::Radio => "radio buttons",
        }
    }

    fn index(self) -> usize {
        match self {
            ButtonKind::Push => 0,
            ButtonKind::Checkbox => 1,
            ButtonKind::Radio => 2,
        }
    }
}

// ============================================================================
// Data renderers
// ============================================================================

/// Turns a button's data and state into display text.
///
/// Renderers are immutable and shared between buttons.
pub trait DataRenderer: Send + Sync + fmt::Debug {
    /// Render `button`.
    fn render(&self, button: &Button) -> String;
}

/// The default renderer for each [`ButtonKind`].
#[derive(Debug)]
struct DefaultRenderer(ButtonKind);

impl DataRenderer for DefaultRenderer {
    fn render(&self, button: &Button) -> String {
        let text = button.button_data().unwrap_or_default();
        let indicator = match (self.0, button.state()) {
            (ButtonKind::Push, _) => return text,
            (ButtonKind::Checkbox, ButtonState::Selected) => "[x]",
            (ButtonKind::Checkbox, ButtonState::Unselected) => "[ ]",
            (ButtonKind::Checkbox, ButtonState::Mixed) => "[-]",
            (ButtonKind::Radio, ButtonState::Selected) => "(*)",
            (ButtonKind::Radio, _) => "( )",
        };
        if text.is_empty() {
            indicator.to_string()
        } else {
            format!("{indicator} {text}")
        }
    }
}

static DEFAULT_RENDERERS: [OnceLock<Arc<dyn DataRenderer>>; 3] = [const { OnceLock::new() }; 3];

/// The shared default renderer for `kind`, built on first use.
pub fn default_data_renderer(kind: ButtonKind) -> Arc<dyn DataRenderer> {
    DEFAULT_RENDERERS[kind.index()]
        .get_or_init(|| Arc::new(DefaultRenderer(kind)))
        .clone()
}

// ============================================================================
// Listeners
// ============================================================================

/// Receives configuration changes from a [`Button`].
pub trait ButtonListener {
    /// The button data changed.
    fn button_data_changed(&self, _button: &Button, _previous: &Option<String>) {}
    /// The data renderer was replaced.
    fn data_renderer_changed(&self, _button: &Button, _previous: &Arc<dyn DataRenderer>) {}
    /// The button was enabled or disabled.
    fn enabled_changed(&self, _button: &Button) {}
    /// The action was replaced.
    fn action_changed(&self, _button: &Button, _previous: Option<&Rc<Action>>) {}
    /// Toggle-button mode was switched on or off.
    fn toggle_button_changed(&self, _button: &Button) {}
    /// Tri-state mode was switched on or off.
    fn tri_state_changed(&self, _button: &Button) {}
    /// The button joined or left a group.
    fn button_group_changed(&self, _button: &Button, _previous: Option<&Rc<ButtonGroup>>) {}
}

/// Receives selection-state changes from a [`Button`].
pub trait ButtonStateListener {
    /// The state changed from `previous`. The button already holds the new
    /// state.
    fn state_changed(&self, _button: &Button, _previous: ButtonState) {}
}

/// Receives presses from a [`Button`].
pub trait ButtonPressListener {
    /// The button was pressed.
    fn button_pressed(&self, _button: &Button) {}
}

// ============================================================================
// Button
// ============================================================================

/// A push button, checkbox or radio button.
///
/// Buttons are always held in an `Rc` so that a [`ButtonGroup`] can refer
/// back to them.
pub struct Button {
    this: Weak<Button>,
    kind: ButtonKind,
    button_data: Property<Option<String>>,
    data_renderer: RefCell<Arc<dyn DataRenderer>>,
    action: RefCell<Option<Rc<Action>>>,
    action_sync: Rc<ActionSync>,
    enabled: Property<bool>,
    toggle_button: Property<bool>,
    tri_state: Property<bool>,
    button_group: RefCell<Option<Rc<ButtonGroup>>>,
    state: Property<ButtonState>,
    button_listeners: ChangeNotifier<dyn ButtonListener>,
    state_listeners: ChangeNotifier<dyn ButtonStateListener>,
    press_listeners: ChangeNotifier<dyn ButtonPressListener>,
}

impl Button {
    /// Create a button of `kind` using the kind's default renderer.
    pub fn new(kind: ButtonKind) -> Rc<Self> {
        Self::with_data_renderer(kind, default_data_renderer(kind))
    }

    /// Create a button of `kind` with an explicit renderer.
    pub fn with_data_renderer(kind: ButtonKind, renderer: Arc<dyn DataRenderer>) -> Rc<Self> {
        let capabilities = kind.capabilities();
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            kind,
            button_data: Property::new(None),
            data_renderer: RefCell::new(renderer),
            action: RefCell::new(None),
            action_sync: Rc::new(ActionSync(this.clone())),
            enabled: Property::new(true),
            toggle_button: Property::new(capabilities.toggle.initial()),
            tri_state: Property::new(capabilities.tri_state.initial()),
            button_group: RefCell::new(None),
            state: Property::new(ButtonState::Unselected),
            button_listeners: ChangeNotifier::new(),
            state_listeners: ChangeNotifier::new(),
            press_listeners: ChangeNotifier::new(),
        })
    }

    /// Create a push button.
    pub fn push_button() -> Rc<Self> {
        Self::new(ButtonKind::Push)
    }

    /// Create a checkbox.
    pub fn checkbox() -> Rc<Self> {
        Self::new(ButtonKind::Checkbox)
    }

    /// Create a radio button.
    pub fn radio_button() -> Rc<Self> {
        Self::new(ButtonKind::Radio)
    }

    /// The kind this button was created as.
    pub fn kind(&self) -> ButtonKind {
        self.kind
    }

    // =========================================================================
    // Button data and rendering
    // =========================================================================

    /// The button's data, typically its label.
    pub fn button_data(&self) -> Option<String> {
        self.button_data.get()
    }

    /// Set the button's data.
    pub fn set_button_data(&self, data: Option<String>) {
        self.button_listeners
            .update(self, &self.button_data, data, |l, button, previous| {
                l.button_data_changed(button, previous)
            });
    }

    /// The renderer that turns this button into display text.
    pub fn data_renderer(&self) -> Arc<dyn DataRenderer> {
        self.data_renderer.borrow().clone()
    }

    /// Replace the data renderer. Renderers are compared by identity.
    pub fn set_data_renderer(&self, renderer: Arc<dyn DataRenderer>) {
        if Arc::ptr_eq(&*self.data_renderer.borrow(), &renderer) {
            return;
        }
        let previous = self.data_renderer.replace(renderer);
        self.button_listeners
            .notify(|l| l.data_renderer_changed(self, &previous));
    }

    /// Render the button with its current renderer.
    pub fn rendered_text(&self) -> String {
        self.data_renderer().render(self)
    }

    // =========================================================================
    // Action
    // =========================================================================

    /// The action performed when the button is pressed.
    pub fn action(&self) -> Option<Rc<Action>> {
        self.action.borrow().clone()
    }

    /// Replace the action. Actions are compared by identity.
    ///
    /// While an action is attached the button follows its enabled flag.
    pub fn set_action(&self, action: Option<Rc<Action>>) {
        let unchanged = match (&*self.action.borrow(), &action) {
            (Some(current), Some(candidate)) => Rc::ptr_eq(current, candidate),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        let previous = self.action.replace(action.clone());
        if let Some(previous) = &previous {
            previous.action_listeners().listeners().remove(&self.action_sync);
        }
        if let Some(action) = &action {
            action
                .action_listeners()
                .listeners()
                .add(self.action_sync.clone());
            self.store_enabled(action.is_enabled());
        }
        self.button_listeners
            .notify(|l| l.action_changed(self, previous.as_ref()));
    }

    // =========================================================================
    // Enabled
    // =========================================================================

    /// Check if the button is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Enable or disable the button.
    ///
    /// # Errors
    ///
    /// [`VigilError::InvalidArgument`] if the button has an action whose
    /// enabled flag differs from `enabled`. Enable or disable the action
    /// instead.
    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        if let Some(action) = self.action()
            && action.is_enabled() != enabled
        {
            return Err(VigilError::invalid_argument(
                "button and action enabled states are not consistent",
            ));
        }
        self.store_enabled(enabled);
        Ok(())
    }

    fn store_enabled(&self, enabled: bool) {
        self.button_listeners
            .update(self, &self.enabled, enabled, |l, button, _| l.enabled_changed(button));
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Check if the button holds a selection state.
    pub fn is_toggle_button(&self) -> bool {
        self.toggle_button.get()
    }

    /// Switch toggle-button mode.
    ///
    /// Leaving toggle mode first deselects the button, removes it from its
    /// group and clears tri-state mode.
    ///
    /// # Errors
    ///
    /// [`VigilError::UnsupportedConfiguration`] for checkboxes and radio
    /// buttons, which are always toggle buttons.
    pub fn set_toggle_button(&self, toggle: bool) -> Result<()> {
        if !self.kind.capabilities().toggle.allows(toggle) {
            return Err(VigilError::unsupported(format!(
                "{} are always toggle buttons",
                self.kind.name()
            )));
        }
        if self.is_toggle_button() == toggle {
            return Ok(());
        }
        if !toggle {
            self.set_state(ButtonState::Unselected)?;
            self.set_button_group(None)?;
            self.set_tri_state(false)?;
        }
        self.button_listeners
            .update(self, &self.toggle_button, toggle, |l, button, _| {
                l.toggle_button_changed(button)
            });
        Ok(())
    }

    /// Check if pressing cycles through [`ButtonState::Mixed`].
    pub fn is_tri_state(&self) -> bool {
        self.tri_state.get()
    }

    /// Switch tri-state mode.
    ///
    /// # Errors
    ///
    /// - [`VigilError::UnsupportedConfiguration`] for radio buttons.
    /// - [`VigilError::InvalidState`] if the button is not a toggle button,
    ///   or if enabling while the button belongs to a group.
    pub fn set_tri_state(&self, tri_state: bool) -> Result<()> {
        if !self.kind.capabilities().tri_state.allows(tri_state) {
            return Err(VigilError::unsupported(format!(
                "{} can't be tri-state",
                self.kind.name()
            )));
        }
        if !self.is_toggle_button() {
            return Err(VigilError::invalid_state("button is not in toggle mode"));
        }
        if tri_state && self.button_group.borrow().is_some() {
            return Err(VigilError::invalid_state("toggle button is a member of a group"));
        }
        self.button_listeners
            .update(self, &self.tri_state, tri_state, |l, button, _| {
                l.tri_state_changed(button)
            });
        Ok(())
    }

    /// The group this button belongs to.
    pub fn button_group(&self) -> Option<Rc<ButtonGroup>> {
        self.button_group.borrow().clone()
    }

    /// Join `group`, leaving any previous group. `None` leaves the current
    /// group.
    ///
    /// # Errors
    ///
    /// - [`VigilError::UnsupportedConfiguration`] for checkboxes.
    /// - [`VigilError::InvalidState`] if the button is not a toggle button,
    ///   or if joining while tri-state.
    pub fn set_button_group(&self, group: Option<Rc<ButtonGroup>>) -> Result<()> {
        if !self.kind.capabilities().group.allows(group.is_some()) {
            return Err(VigilError::unsupported(format!(
                "{} can't be added to a button group",
                self.kind.name()
            )));
        }
        if !self.is_toggle_button() {
            return Err(VigilError::invalid_state("button is not in toggle mode"));
        }
        if group.is_some() && self.is_tri_state() {
            return Err(VigilError::invalid_state("toggle button is tri-state"));
        }

        let unchanged = match (&*self.button_group.borrow(), &group) {
            (Some(current), Some(candidate)) => Rc::ptr_eq(current, candidate),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return Ok(());
        }

        let previous = self.button_group.replace(group.clone());
        if let Some(this) = self.this.upgrade() {
            if let Some(previous) = &previous {
                previous.detach(&this);
            }
            if let Some(group) = &group {
                group.attach(&this)?;
            }
        }
        self.button_listeners
            .notify(|l| l.button_group_changed(self, previous.as_ref()));
        Ok(())
    }

    // =========================================================================
    // State
    // =========================================================================

    /// The current selection state.
    pub fn state(&self) -> ButtonState {
        self.state.get()
    }

    /// Check if the state is [`ButtonState::Selected`].
    pub fn is_selected(&self) -> bool {
        self.state() == ButtonState::Selected
    }

    /// Shorthand for [`set_state`](Self::set_state) with `Selected` or
    /// `Unselected`.
    pub fn set_selected(&self, selected: bool) -> Result<()> {
        self.set_state(selected.into())
    }

    /// Set the selection state.
    ///
    /// Grouped buttons keep the group's selection in step: selecting makes
    /// this button the group's selection, deselecting the current selection
    /// clears it.
    ///
    /// # Errors
    ///
    /// - [`VigilError::InvalidState`] if the button is not a toggle button.
    /// - [`VigilError::InvalidArgument`] for `Mixed` on a button that is
    ///   not tri-state.
    pub fn set_state(&self, state: ButtonState) -> Result<()> {
        if !self.is_toggle_button() {
            return Err(VigilError::invalid_state("button is not in toggle mode"));
        }
        if state == ButtonState::Mixed && !self.is_tri_state() {
            return Err(VigilError::invalid_argument("button is not tri-state"));
        }

        let Some(previous) = self.state.replace(state) else {
            return Ok(());
        };
        tracing::debug!(target: "vigil::widget", kind = ?self.kind, ?previous, ?state, "button state changed");

        if let (Some(group), Some(this)) = (self.button_group(), self.this.upgrade()) {
            if state == ButtonState::Selected {
                group.set_selection(Some(&this))?;
            } else if group.is_selection(&this) {
                group.set_selection(None)?;
            }
        }

        self.state_listeners
            .notify(|l| l.state_changed(self, previous));
        Ok(())
    }

    // =========================================================================
    // Press
    // =========================================================================

    /// Press the button.
    ///
    /// Toggle buttons first advance their state: grouped buttons always
    /// select, tri-state buttons cycle `Unselected → Mixed → Selected`, and
    /// other toggle buttons flip. Then press listeners run, then the action
    /// (if any, and enabled) is performed.
    pub fn press(&self) -> Result<()> {
        if self.is_toggle_button() {
            let current = self.state();
            let next = if self.button_group.borrow().is_some() {
                ButtonState::Selected
            } else if self.is_tri_state() {
                current.next_tri_state()
            } else {
                current.toggled()
            };
            self.set_state(next)?;
        }

        self.press_listeners.notify(|l| l.button_pressed(self));

        if let Some(action) = self.action() {
            action.perform(self);
        }
        Ok(())
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Listeners for configuration changes.
    pub fn button_listeners(&self) -> &ChangeNotifier<dyn ButtonListener> {
        &self.button_listeners
    }

    /// Listeners for state changes.
    pub fn button_state_listeners(&self) -> &ChangeNotifier<dyn ButtonStateListener> {
        &self.state_listeners
    }

    /// Listeners for presses.
    pub fn button_press_listeners(&self) -> &ChangeNotifier<dyn ButtonPressListener> {
        &self.press_listeners
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("kind", &self.kind)
            .field("button_data", &self.button_data())
            .field("enabled", &self.is_enabled())
            .field("toggle_button", &self.is_toggle_button())
            .field("tri_state", &self.is_tri_state())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

/// Follows the enabled flag of a button's action.
struct ActionSync(Weak<Button>);

impl ActionListener for ActionSync {
    fn enabled_changed(&self, action: &Action) {
        if let Some(button) = self.0.upgrade() {
            button.store_enabled(action.is_enabled());
        }
    }
}

static_assertions::assert_not_impl_any!(Button: Send, Sync);
