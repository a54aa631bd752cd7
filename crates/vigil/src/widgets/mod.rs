//! Widget state models.
//!
//! Every widget here keeps its own observable state and talks to two kinds
//! of listeners: plain change listeners, and state listeners that may veto
//! a transition before it happens.
//!
//! - [`Button`]: push buttons, checkboxes and radio buttons
//! - [`ButtonGroup`]: mutually exclusive selection across toggle buttons
//! - [`Action`]: shared behavior invoked by pressing a button
//! - [`Rollup`]: a collapsible section with a vetoable expanded state
//! - [`TabPane`]: a tab list with a vetoable selected index
//! - [`Window`], [`Dialog`], [`Sheet`], [`Popup`]: surfaces with a vetoable
//!   open/close lifecycle

mod action;
mod button;
mod button_group;
mod dialog;
mod popup;
mod rollup;
mod sheet;
mod tab_pane;
mod window;

pub use action::{Action, ActionListener};
pub use button::{
    Button, ButtonCapabilities, ButtonKind, ButtonListener, ButtonPressListener, ButtonState,
    ButtonStateListener, Capability, DataRenderer, default_data_renderer,
};
pub use button_group::{ButtonGroup, ButtonGroupListener};
pub use dialog::{Dialog, DialogCloseCallback, DialogListener, DialogStateListener};
pub use popup::{Popup, PopupStateListener};
pub use rollup::{Rollup, RollupListener, RollupStateListener};
pub use sheet::{Sheet, SheetCloseCallback, SheetStateListener};
pub use tab_pane::{TabPane, TabPaneListener, TabPaneSelectionListener};
pub use window::{Surface, Window, WindowListener, WindowStateListener};
