//! Prelude module for Vigil.
//!
//! Re-exports the most commonly used types:
//!
//! ```ignore
//! use vigil::prelude::*;
//! ```

// ============================================================================
// Errors
// ============================================================================

pub use crate::{Result, VigilError};

// ============================================================================
// Listeners and Transitions
// ============================================================================

pub use crate::{
    ChangeNotifier, ListenerRegistry, Property, TransitionOutcome, TransitionPhases,
    VetoableTransitionCoordinator, Vote,
};

// ============================================================================
// Dispatch Thread
// ============================================================================

pub use crate::{DispatchConfig, DispatchGuard, DispatchQueue, DispatchSender};

// ============================================================================
// Widgets
// ============================================================================

pub use crate::widgets::{
    Action, Button, ButtonGroup, ButtonKind, ButtonState, Dialog, Popup, Rollup, Sheet, TabPane,
    Window,
};

pub use crate::widgets::{
    ActionListener, ButtonGroupListener, ButtonListener, ButtonPressListener,
    ButtonStateListener, DialogListener, DialogStateListener, PopupStateListener, RollupListener,
    RollupStateListener, SheetStateListener, Surface, TabPaneListener, TabPaneSelectionListener,
    WindowListener, WindowStateListener,
};
