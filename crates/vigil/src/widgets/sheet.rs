//! Sheets: task-modal panels attached to an owner window.
//!
//! A sheet behaves like a modal [`Dialog`](super::Dialog) that must always
//! have an owner.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use vigil_core::{Result, TransitionOutcome, TransitionPhases, VetoableTransitionCoordinator, Vote};

use super::window::{Surface, Window, close_wrapped};

/// One-shot callback run after a sheet closes.
pub type SheetCloseCallback = Box<dyn FnOnce(&Sheet)>;

/// Takes part in closing a [`Sheet`].
pub trait SheetStateListener {
    /// Vote on closing with `result`.
    fn preview_sheet_close(&self, _sheet: &Sheet, _result: bool) -> Vote {
        Vote::Approve
    }
    /// A listener denied the close.
    fn sheet_close_vetoed(&self, _sheet: &Sheet, _reason: Vote) {}
    /// The sheet closed. [`Sheet::result`] holds the result.
    fn sheet_closed(&self, _sheet: &Sheet) {}
}

/// A panel that blocks its owner window until closed with a result.
pub struct Sheet {
    this: Weak<Sheet>,
    window: Rc<Window>,
    result: Cell<bool>,
    closing: Cell<bool>,
    close_callback: RefCell<Option<SheetCloseCallback>>,
    state_listeners: VetoableTransitionCoordinator<dyn SheetStateListener>,
}

impl Sheet {
    const CLOSE: TransitionPhases<dyn SheetStateListener, Sheet, bool> = TransitionPhases {
        preview: |l, sheet, result| l.preview_sheet_close(sheet, *result),
        changed: |l, sheet, _| l.sheet_closed(sheet),
        vetoed: |l, sheet, reason| l.sheet_close_vetoed(sheet, reason),
    };

    /// Create a closed sheet.
    pub fn new() -> Rc<Self> {
        let window = Window::new();
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            window,
            result: Cell::new(false),
            closing: Cell::new(false),
            close_callback: RefCell::new(None),
            state_listeners: VetoableTransitionCoordinator::new(),
        })
    }

    /// The window backing this sheet.
    pub fn window(&self) -> &Rc<Window> {
        &self.window
    }

    /// The result the sheet was last closed with.
    pub fn result(&self) -> bool {
        self.result.get()
    }

    /// Open the sheet over `owner`, resetting the result.
    ///
    /// # Errors
    ///
    /// - [`VigilError::InvalidArgument`](vigil_core::VigilError::InvalidArgument)
    ///   if the owner is not open.
    /// - [`VigilError::InvalidState`](vigil_core::VigilError::InvalidState)
    ///   if already open over another owner.
    pub fn open(
        &self,
        owner: Rc<Window>,
        on_close: Option<SheetCloseCallback>,
    ) -> Result<TransitionOutcome> {
        self.window.check_reowning(&owner)?;
        let surface: Weak<dyn Surface> = self.this.clone();
        self.window.set_owner_of(Some(owner), surface);
        *self.close_callback.borrow_mut() = on_close;
        self.result.set(false);
        self.window.open()
    }

    /// Close the sheet with `result`, subject to veto.
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
            tracing::debug!(target: "vigil::widget", result, "sheet closed");
            let callback = self.close_callback.borrow_mut().take();
            if let Some(callback) = callback {
                callback(self);
            }
        }
        outcome
    }

    /// Listeners that preview and observe closing.
    pub fn sheet_state_listeners(&self) -> &VetoableTransitionCoordinator<dyn SheetStateListener> {
        &self.state_listeners
    }
}

impl Surface for Sheet {
    fn window(&self) -> &Window {
        &self.window
    }

    fn close_surface(&self) -> TransitionOutcome {
        self.close(false)
    }
}

impl fmt::Debug for Sheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sheet")
            .field("window", &self.window)
            .field("result", &self.result())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_core::VigilError;

    struct Guard {
        allow: Cell<bool>,
        log: RefCell<Vec<String>>,
    }

    impl SheetStateListener for Guard {
        fn preview_sheet_close(&self, _sheet: &Sheet, result: bool) -> Vote {
            self.log.borrow_mut().push(format!("preview:{result}"));
            self.allow.get().into()
        }
        fn sheet_close_vetoed(&self, _sheet: &Sheet, reason: Vote) {
            self.log.borrow_mut().push(format!("vetoed:{reason}"));
        }
        fn sheet_closed(&self, sheet: &Sheet) {
            self.log.borrow_mut().push(format!("closed:{}", sheet.result()));
        }
    }

    #[test]
    fn test_sheet_requires_open_owner() {
        let sheet = Sheet::new();
        assert!(matches!(
            sheet.open(Window::new(), None),
            Err(VigilError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_unsaved_changes_veto() {
        let owner = Window::new();
        owner.open().unwrap();
        let sheet = Sheet::new();
        let guard = Rc::new(Guard {
            allow: Cell::new(false),
            log: RefCell::new(Vec::new()),
        });
        sheet.sheet_state_listeners().listeners().add(guard.clone());

        let closed = Rc::new(Cell::new(false));
        let flag = closed.clone();
        sheet
            .open(owner.clone(), Some(Box::new(move |_sheet: &Sheet| flag.set(true))))
            .unwrap();

        assert!(sheet.close(true).is_vetoed());
        assert!(sheet.window().is_open());
        assert!(!closed.get());

        guard.allow.set(true);
        assert!(sheet.close(true).is_committed());
        assert!(closed.get());
        assert_eq!(
            *guard.log.borrow(),
            vec!["preview:true", "vetoed:deny", "preview:true", "closed:true"]
        );
    }

    #[test]
    fn test_owner_close_closes_sheet() {
        let owner = Window::new();
        owner.open().unwrap();
        let sheet = Sheet::new();
        sheet.open(owner.clone(), None).unwrap();

        assert!(owner.close().is_committed());
        assert!(sheet.window().is_closed());
        assert!(!sheet.result());
    }
}
