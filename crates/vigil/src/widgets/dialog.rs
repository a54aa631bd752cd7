//! Dialogs: windows that close with a result.
//!
//! Closing a dialog asks its [`DialogStateListener`]s first, then runs the
//! window's own close protocol. Only when both approve is the result
//! recorded and the close callback given to [`Dialog::open`] invoked.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use vigil::widgets::{Dialog, Window};
//!
//! let main = Window::new();
//! main.open().unwrap();
//!
//! let confirmed = Rc::new(Cell::new(None));
//! let sink = confirmed.clone();
//! let dialog = Dialog::new(true);
//! dialog
//!     .open(Some(main.clone()), Some(Box::new(move |dialog: &Dialog, _modal: bool| {
//!         sink.set(Some(dialog.result()));
//!     })))
//!     .unwrap();
//!
//! dialog.close(true);
//! assert_eq!(confirmed.get(), Some(true));
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use vigil_core::{
    ChangeNotifier, Property, Result, TransitionOutcome, TransitionPhases,
    VetoableTransitionCoordinator, VigilError, Vote,
};

use super::window::{Surface, Window, close_wrapped};

/// One-shot callback run after a dialog closes, with its modal flag.
pub type DialogCloseCallback = Box<dyn FnOnce(&Dialog, bool)>;

/// Receives plain property changes from a [`Dialog`].
pub trait DialogListener {
    /// The modal flag changed.
    fn modal_changed(&self, _dialog: &Dialog) {}
}

/// Takes part in closing a [`Dialog`].
pub trait DialogStateListener {
    /// Vote on closing with `result`.
    fn preview_dialog_close(&self, _dialog: &Dialog, _result: bool) -> Vote {
        Vote::Approve
    }
    /// A listener denied the close.
    fn dialog_close_vetoed(&self, _dialog: &Dialog, _reason: Vote) {}
    /// The dialog closed. [`Dialog::result`] holds the result.
    fn dialog_closed(&self, _dialog: &Dialog, _modal: bool) {}
}

/// A window that is closed with a boolean result.
pub struct Dialog {
    this: Weak<Dialog>,
    window: Rc<Window>,
    modal: Property<bool>,
    result: Cell<bool>,
    closing: Cell<bool>,
    close_callback: RefCell<Option<DialogCloseCallback>>,
    dialog_listeners: ChangeNotifier<dyn DialogListener>,
    state_listeners: VetoableTransitionCoordinator<dyn DialogStateListener>,
}

impl Dialog {
    const CLOSE: TransitionPhases<dyn DialogStateListener, Dialog, bool> = TransitionPhases {
        preview: |l, dialog, result| l.preview_dialog_close(dialog, *result),
        changed: |l, dialog, _| l.dialog_closed(dialog, dialog.is_modal()),
        vetoed: |l, dialog, reason| l.dialog_close_vetoed(dialog, reason),
    };

    /// Create a closed dialog.
    pub fn new(modal: bool) -> Rc<Self> {
        Self::with_window(Window::new(), modal)
    }

    /// Create a closed dialog with a title.
    pub fn with_title(title: impl Into<String>, modal: bool) -> Rc<Self> {
        Self::with_window(Window::with_title(title), modal)
    }

    fn with_window(window: Rc<Window>, modal: bool) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            window,
            modal: Property::new(modal),
            result: Cell::new(false),
            closing: Cell::new(false),
            close_callback: RefCell::new(None),
            dialog_listeners: ChangeNotifier::new(),
            state_listeners: VetoableTransitionCoordinator::new(),
        })
    }

    /// The window backing this dialog.
    pub fn window(&self) -> &Rc<Window> {
        &self.window
    }

    /// Check if the dialog is modal over its owner.
    pub fn is_modal(&self) -> bool {
        self.modal.get()
    }

    /// Set the modal flag. Takes effect the next time the dialog opens.
    pub fn set_modal(&self, modal: bool) {
        self.dialog_listeners
            .update(self, &self.modal, modal, |l, dialog, _| l.modal_changed(dialog));
    }

    /// The result the dialog was last closed with.
    pub fn result(&self) -> bool {
        self.result.get()
    }

    /// Check if a close is in progress.
    pub fn is_closing(&self) -> bool {
        self.closing.get() || self.window.is_closing()
    }

    /// Open the dialog over `owner`.
    ///
    /// The result is reset to `false`. `on_close` runs once, after the
    /// dialog's listeners have seen it close.
    ///
    /// # Errors
    ///
    /// - [`VigilError::InvalidArgument`] if the dialog is modal and has no
    ///   owner, or if the owner is not open.
    /// - [`VigilError::InvalidState`] if already open over another owner.
    pub fn open(
        &self,
        owner: Option<Rc<Window>>,
        on_close: Option<DialogCloseCallback>,
    ) -> Result<TransitionOutcome> {
        if self.is_modal() && owner.is_none() {
            return Err(VigilError::invalid_argument("modal dialogs must have an owner"));
        }
        if let Some(owner) = &owner {
            self.window.check_reowning(owner)?;
        }

        let surface: Weak<dyn Surface> = self.this.clone();
        self.window.set_owner_of(owner, surface);
        *self.close_callback.borrow_mut() = on_close;
        self.result.set(false);
        self.window.open()
    }

    /// Close the dialog with `result`, subject to veto by the dialog's
    /// listeners and then the window's.
    pub fn close(&self, result: bool) -> TransitionOutcome {
        let outcome = close_wrapped(
            self,
            &self.window,
            &self.closing,
            &self.state_listeners,
            &Self::CLOSE,
            result,
            || self.result.set(result),
        );

        if outcome.is_committed() {
            tracing::debug!(target: "vigil::widget", result, modal = self.is_modal(), "dialog closed");
            let callback = self.close_callback.borrow_mut().take();
            if let Some(callback) = callback {
                callback(self, self.is_modal());
            }
        }
        outcome
    }

    /// Listeners for modal changes.
    pub fn dialog_listeners(&self) -> &ChangeNotifier<dyn DialogListener> {
        &self.dialog_listeners
    }

    /// Listeners that preview and observe closing.
    pub fn dialog_state_listeners(
        &self,
    ) -> &VetoableTransitionCoordinator<dyn DialogStateListener> {
        &self.state_listeners
    }
}

impl Surface for Dialog {
    fn window(&self) -> &Window {
        &self.window
    }

    fn close_surface(&self) -> TransitionOutcome {
        self.close(false)
    }
}

impl fmt::Debug for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialog")
            .field("window", &self.window)
            .field("modal", &self.is_modal())
            .field("result", &self.result())
            .finish_non_exhaustive()
    }
}
