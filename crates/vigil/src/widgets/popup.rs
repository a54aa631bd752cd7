//! Transient popup windows.
//!
//! Closing a popup is vetoable. The `immediate` flag tells listeners whether
//! the close may be deferred (for example to run a fade-out first) or must
//! happen now; owners closing their popups always ask for `immediate`.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use vigil_core::{Result, TransitionOutcome, TransitionPhases, VetoableTransitionCoordinator, Vote};

use super::window::{Surface, Window, close_wrapped};

/// Takes part in closing a [`Popup`].
pub trait PopupStateListener {
    /// Vote on closing. A deferred close may be denied and retried later
    /// with `immediate` set.
    fn preview_popup_close(&self, _popup: &Popup, _immediate: bool) -> Vote {
        Vote::Approve
    }
    /// A listener denied the close.
    fn popup_close_vetoed(&self, _popup: &Popup, _reason: Vote) {}
    /// The popup closed.
    fn popup_closed(&self, _popup: &Popup) {}
}

/// A transient window, usually owned by the window it pops up over.
pub struct Popup {
    this: Weak<Popup>,
    window: Rc<Window>,
    closing: Cell<bool>,
    state_listeners: VetoableTransitionCoordinator<dyn PopupStateListener>,
}

impl Popup {
    const CLOSE: TransitionPhases<dyn PopupStateListener, Popup, bool> = TransitionPhases {
        preview: |l, popup, immediate| l.preview_popup_close(popup, *immediate),
        changed: |l, popup, _| l.popup_closed(popup),
        vetoed: |l, popup, reason| l.popup_close_vetoed(popup, reason),
    };

    /// Create a closed popup.
    pub fn new() -> Rc<Self> {
        let window = Window::new();
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            window,
            closing: Cell::new(false),
            state_listeners: VetoableTransitionCoordinator::new(),
        })
    }

    /// The window backing this popup.
    pub fn window(&self) -> &Rc<Window> {
        &self.window
    }

    /// Open the popup, optionally over `owner`.
    ///
    /// # Errors
    ///
    /// - [`VigilError::InvalidState`](vigil_core::VigilError::InvalidState)
    ///   if already open over another owner.
    /// - Whatever [`Window::open`] returns.
    pub fn open(&self, owner: Option<Rc<Window>>) -> Result<TransitionOutcome> {
        if let Some(owner) = &owner {
            self.window.check_reowning(owner)?;
        }
        let surface: Weak<dyn Surface> = self.this.clone();
        self.window.set_owner_of(owner, surface);
        self.window.open()
    }

    /// Close the popup, subject to veto.
    pub fn close(&self, immediate: bool) -> TransitionOutcome {
        let outcome = close_wrapped(
            self,
            &self.window,
            &self.closing,
            &self.state_listeners,
            &Self::CLOSE,
            immediate,
            || {},
        );
        tracing::trace!(target: "vigil::widget", immediate, ?outcome, "popup close");
        outcome
    }

    /// Listeners that preview and observe closing.
    pub fn popup_state_listeners(&self) -> &VetoableTransitionCoordinator<dyn PopupStateListener> {
        &self.state_listeners
    }
}

impl Surface for Popup {
    fn window(&self) -> &Window {
        &self.window
    }

    fn close_surface(&self) -> TransitionOutcome {
        self.close(true)
    }
}

impl fmt::Debug for Popup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Popup")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Defers non-immediate closes, like a skin running a fade-out.
    #[derive(Default)]
    struct Fader(RefCell<Vec<String>>);

    impl PopupStateListener for Fader {
        fn preview_popup_close(&self, _popup: &Popup, immediate: bool) -> Vote {
            self.0.borrow_mut().push(format!("preview:{immediate}"));
            immediate.into()
        }
        fn popup_close_vetoed(&self, _popup: &Popup, reason: Vote) {
            self.0.borrow_mut().push(format!("vetoed:{reason}"));
        }
        fn popup_closed(&self, popup: &Popup) {
            self.0
                .borrow_mut()
                .push(format!("closed:{}", popup.window().is_closed()));
        }
    }

    #[test]
    fn test_deferred_then_immediate_close() {
        let popup = Popup::new();
        let fader = Rc::new(Fader::default());
        popup.popup_state_listeners().listeners().add(fader.clone());
        popup.open(None).unwrap();

        assert!(popup.close(false).is_vetoed());
        assert!(popup.window().is_open());
        assert!(popup.close(true).is_committed());
        assert_eq!(popup.close(true), TransitionOutcome::Unchanged);

        assert_eq!(
            *fader.0.borrow(),
            vec!["preview:false", "vetoed:deny", "preview:true", "closed:true"]
        );
    }

    #[test]
    fn test_owner_closes_popup_immediately() {
        let owner = Window::new();
        owner.open().unwrap();
        let popup = Popup::new();
        let fader = Rc::new(Fader::default());
        popup.popup_state_listeners().listeners().add(fader.clone());
        popup.open(Some(owner.clone())).unwrap();

        assert!(owner.close().is_committed());
        assert!(popup.window().is_closed());
        assert_eq!(*fader.0.borrow(), vec!["preview:true", "closed:true"]);
    }
}
