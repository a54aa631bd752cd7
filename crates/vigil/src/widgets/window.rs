//! Top-level windows and the ownership between them.
//!
//! A window is "open" as a pure state flag; no display exists here. Opening
//! and closing are vetoable through [`WindowStateListener`]s. Closing an
//! owner first closes every surface it owns, through that surface's own
//! close protocol, so an owned [`Dialog`](super::Dialog) still asks its
//! dialog listeners.
//!
//! # Example
//!
//! ```
//! use vigil::widgets::Window;
//!
//! let main = Window::new();
//! main.open().unwrap();
//!
//! let palette = Window::new();
//! palette.open_owned(main.clone()).unwrap();
//!
//! main.close();
//! assert!(palette.is_closed());
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use vigil_core::{
    ChangeNotifier, Property, Result, TransitionOutcome, TransitionPhases,
    VetoableTransitionCoordinator, VigilError, Vote,
};

/// Anything backed by a [`Window`] that can be asked to close.
///
/// Owners close what they own through this trait, so wrappers such as
/// dialogs run their own protocol first.
pub trait Surface {
    /// The window backing this surface.
    fn window(&self) -> &Window;

    /// Ask the surface to close.
    fn close_surface(&self) -> TransitionOutcome;
}

/// Receives plain property changes from a [`Window`].
pub trait WindowListener {
    /// The title changed.
    fn title_changed(&self, _window: &Window, _previous: &Option<String>) {}
    /// The owner changed.
    fn owner_changed(&self, _window: &Window, _previous: Option<&Rc<Window>>) {}
}

/// Takes part in opening and closing a [`Window`].
pub trait WindowStateListener {
    /// Vote on opening the window.
    fn preview_window_open(&self, _window: &Window) -> Vote {
        Vote::Approve
    }
    /// A listener denied opening.
    fn window_open_vetoed(&self, _window: &Window, _reason: Vote) {}
    /// The window opened.
    fn window_opened(&self, _window: &Window) {}
    /// Vote on closing the window.
    fn preview_window_close(&self, _window: &Window) -> Vote {
        Vote::Approve
    }
    /// A listener denied closing.
    fn window_close_vetoed(&self, _window: &Window, _reason: Vote) {}
    /// The window closed. Owned surfaces have already been asked to close.
    fn window_closed(&self, _window: &Window) {}
}

/// A top-level window.
pub struct Window {
    this: Weak<Window>,
    title: Property<Option<String>>,
    open: Property<bool>,
    opening: Cell<bool>,
    closing: Cell<bool>,
    owner: RefCell<Option<Rc<Window>>>,
    owned: RefCell<Vec<Weak<dyn Surface>>>,
    window_listeners: ChangeNotifier<dyn WindowListener>,
    state_listeners: VetoableTransitionCoordinator<dyn WindowStateListener>,
}

impl Window {
    const OPEN: TransitionPhases<dyn WindowStateListener, Window, bool> = TransitionPhases {
        preview: |l, window, _| l.preview_window_open(window),
        changed: |l, window, _| l.window_opened(window),
        vetoed: |l, window, reason| l.window_open_vetoed(window, reason),
    };

    const CLOSE: TransitionPhases<dyn WindowStateListener, Window, bool> = TransitionPhases {
        preview: |l, window, _| l.preview_window_close(window),
        changed: |l, window, _| l.window_closed(window),
        vetoed: |l, window, reason| l.window_close_vetoed(window, reason),
    };

    /// Create a closed window with no title and no owner.
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            title: Property::new(None),
            open: Property::new(false),
            opening: Cell::new(false),
            closing: Cell::new(false),
            owner: RefCell::new(None),
            owned: RefCell::new(Vec::new()),
            window_listeners: ChangeNotifier::new(),
            state_listeners: VetoableTransitionCoordinator::new(),
        })
    }

    /// Create a closed window with a title.
    pub fn with_title(title: impl Into<String>) -> Rc<Self> {
        let window = Self::new();
        window.title.set_silent(Some(title.into()));
        window
    }

    // =========================================================================
    // Title
    // =========================================================================

    /// The window title.
    pub fn title(&self) -> Option<String> {
        self.title.get()
    }

    /// Set the window title.
    pub fn set_title(&self, title: Option<String>) {
        self.window_listeners
            .update(self, &self.title, title, |l, window, previous| {
                l.title_changed(window, previous)
            });
    }

    // =========================================================================
    // Ownership
    // =========================================================================

    /// The owning window, if any.
    pub fn owner(&self) -> Option<Rc<Window>> {
        self.owner.borrow().clone()
    }

    /// Make this window owned by `owner`, or by nobody.
    pub fn set_owner(&self, owner: Option<Rc<Window>>) {
        let surface: Weak<dyn Surface> = self.this.clone();
        self.set_owner_of(owner, surface);
    }

    /// Change the owner, registering `surface` as the thing the new owner
    /// closes. Wrappers pass themselves so their close protocol runs.
    pub(crate) fn set_owner_of(&self, owner: Option<Rc<Window>>, surface: Weak<dyn Surface>) {
        let unchanged = match (&*self.owner.borrow(), &owner) {
            (Some(current), Some(candidate)) => Rc::ptr_eq(current, candidate),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }

        let previous = self.owner.replace(owner.clone());
        if let Some(previous) = &previous {
            previous.disown(&surface);
        }
        if let Some(owner) = &owner {
            let mut owned = owner.owned.borrow_mut();
            owned.retain(|surface| surface.strong_count() > 0);
            owned.push(surface);
        }
        self.window_listeners
            .notify(|l| l.owner_changed(self, previous.as_ref()));
    }

    fn disown(&self, surface: &Weak<dyn Surface>) {
        self.owned
            .borrow_mut()
            .retain(|owned| !std::ptr::addr_eq(owned.as_ptr(), surface.as_ptr()));
    }

    /// The live surfaces this window owns.
    pub fn owned_surfaces(&self) -> Vec<Rc<dyn Surface>> {
        self.owned.borrow().iter().filter_map(Weak::upgrade).collect()
    }

    /// Check if `window` is owned by this window, directly or transitively.
    pub fn is_owner_of(&self, window: &Window) -> bool {
        let mut owner = window.owner();
        while let Some(current) = owner {
            if std::ptr::eq(Rc::as_ptr(&current), self) {
                return true;
            }
            owner = current.owner();
        }
        false
    }

    // =========================================================================
    // Open / close
    // =========================================================================

    /// Check if the window is open.
    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// Check if the window is closed.
    pub fn is_closed(&self) -> bool {
        !self.is_open()
    }

    /// Check if an open is in progress.
    pub fn is_opening(&self) -> bool {
        self.opening.get()
    }

    /// Check if a close is in progress.
    pub fn is_closing(&self) -> bool {
        self.closing.get()
    }

    /// Open the window, subject to veto.
    ///
    /// Opening an open window is [`TransitionOutcome::Unchanged`].
    ///
    /// # Errors
    ///
    /// [`VigilError::InvalidArgument`] if the window has an owner that is
    /// not open.
    pub fn open(&self) -> Result<TransitionOutcome> {
        if let Some(owner) = self.owner()
            && !owner.is_open()
        {
            return Err(VigilError::invalid_argument("owner is not open"));
        }
        if self.is_open() || self.is_opening() {
            return Ok(TransitionOutcome::Unchanged);
        }

        let _opening = ClearOnDrop(&self.opening);
        let outcome = self
            .state_listeners
            .attempt_change(self, false, true, &Self::OPEN, |open| {
                self.opening.set(true);
                self.open.set_silent(open);
            });
        tracing::debug!(target: "vigil::widget", title = ?self.title(), ?outcome, "window open");
        Ok(outcome)
    }

    /// Set the owner and open the window.
    ///
    /// # Errors
    ///
    /// - [`VigilError::InvalidState`] if the window is already open with a
    ///   different owner.
    /// - Whatever [`open`](Self::open) returns.
    pub fn open_owned(&self, owner: Rc<Window>) -> Result<TransitionOutcome> {
        self.check_reowning(&owner)?;
        self.set_owner(Some(owner));
        self.open()
    }

    pub(crate) fn check_reowning(&self, owner: &Rc<Window>) -> Result<()> {
        if self.is_open()
            && !self
                .owner()
                .is_some_and(|current| Rc::ptr_eq(&current, owner))
        {
            return Err(VigilError::invalid_state(
                "window is already open with a different owner",
            ));
        }
        Ok(())
    }

    /// Close the window, subject to veto.
    ///
    /// Every owned surface is asked to close first. Closing a closed window,
    /// or one already closing, is [`TransitionOutcome::Unchanged`].
    pub fn close(&self) -> TransitionOutcome {
        if self.is_closed() || self.is_closing() {
            return TransitionOutcome::Unchanged;
        }

        let closing = ClearOnDrop(&self.closing);
        let outcome = self
            .state_listeners
            .attempt_change(self, true, false, &Self::CLOSE, |open| {
                self.closing.set(true);
                for surface in self.owned_surfaces() {
                    let owned = surface.close_surface();
                    if !owned.is_committed() {
                        tracing::debug!(target: "vigil::widget", outcome = ?owned, "owned surface stayed open");
                    }
                }
                self.open.set_silent(open);
            });
        drop(closing);
        tracing::debug!(target: "vigil::widget", title = ?self.title(), ?outcome, "window close");
        outcome
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    /// Listeners for title and owner changes.
    pub fn window_listeners(&self) -> &ChangeNotifier<dyn WindowListener> {
        &self.window_listeners
    }

    /// Listeners that preview and observe opening and closing.
    pub fn window_state_listeners(
        &self,
    ) -> &VetoableTransitionCoordinator<dyn WindowStateListener> {
        &self.state_listeners
    }
}

/// Close `window` on behalf of a wrapping surface.
///
/// The wrapper's listeners preview first with `argument`; on approval the
/// window's own close protocol runs, and only if the window actually closed
/// does `on_closed` run followed by the wrapper's commit phase. `closing`
/// is the wrapper's re-entrancy flag.
pub(crate) fn close_wrapped<L: ?Sized, O>(
    owner: &O,
    window: &Window,
    closing: &Cell<bool>,
    listeners: &VetoableTransitionCoordinator<L>,
    phases: &TransitionPhases<L, O, bool>,
    argument: bool,
    on_closed: impl FnOnce(),
) -> TransitionOutcome {
    if window.is_closed() || closing.get() {
        return TransitionOutcome::Unchanged;
    }

    let in_progress = ClearOnDrop(closing);
    closing.set(true);
    let vote = listeners.preview(phases, owner, &argument);
    if !vote.is_approved() {
        drop(in_progress);
        listeners.veto(phases, owner, vote);
        return TransitionOutcome::Vetoed(vote);
    }

    let outcome = window.close();
    drop(in_progress);
    if window.is_closed() {
        on_closed();
        listeners.commit(phases, owner, &argument);
        TransitionOutcome::Committed
    } else {
        outcome
    }
}

/// Clears an in-progress flag when dropped, including during unwinding.
struct ClearOnDrop<'a>(&'a Cell<bool>);

impl Drop for ClearOnDrop<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl Surface for Window {
    fn window(&self) -> &Window {
        self
    }

    fn close_surface(&self) -> TransitionOutcome {
        self.close()
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("title", &self.title())
            .field("open", &self.is_open())
            .field("has_owner", &self.owner.borrow().is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Events {
        log: RefCell<Vec<String>>,
        deny_close: Cell<bool>,
    }

    impl WindowStateListener for Events {
        fn preview_window_open(&self, _window: &Window) -> Vote {
            self.log.borrow_mut().push("preview_open".into());
            Vote::Approve
        }
        fn window_opened(&self, window: &Window) {
            self.log
                .borrow_mut()
                .push(format!("opened:{}", window.is_open()));
        }
        fn preview_window_close(&self, _window: &Window) -> Vote {
            self.log.borrow_mut().push("preview_close".into());
            (!self.deny_close.get()).into()
        }
        fn window_close_vetoed(&self, _window: &Window, reason: Vote) {
            self.log.borrow_mut().push(format!("close_vetoed:{reason}"));
        }
        fn window_closed(&self, window: &Window) {
            self.log
                .borrow_mut()
                .push(format!("closed:{}", window.is_open()));
        }
    }

    fn observed(window: &Window) -> Rc<Events> {
        let events = Rc::new(Events::default());
        window.window_state_listeners().listeners().add(events.clone());
        events
    }

    #[test]
    fn test_open_and_close() {
        let window = Window::new();
        let events = observed(&window);

        assert!(window.open().unwrap().is_committed());
        assert_eq!(window.open().unwrap(), TransitionOutcome::Unchanged);
        assert!(window.close().is_committed());
        assert_eq!(window.close(), TransitionOutcome::Unchanged);

        assert_eq!(
            *events.log.borrow(),
            vec!["preview_open", "opened:true", "preview_close", "closed:false"]
        );
    }

    #[test]
    fn test_close_veto_keeps_window_open() {
        let window = Window::new();
        let events = observed(&window);
        window.open().unwrap();
        events.deny_close.set(true);

        assert_eq!(window.close(), TransitionOutcome::Vetoed(Vote::Deny));
        assert!(window.is_open());
        assert!(!window.is_closing());
        assert_eq!(events.log.borrow().last().map(String::as_str), Some("close_vetoed:deny"));
    }

    #[test]
    fn test_owned_windows_close_first() {
        let owner = Window::with_title("main");
        owner.open().unwrap();
        let child = Window::with_title("child");
        child.open_owned(owner.clone()).unwrap();

        struct Closed(Rc<RefCell<Vec<String>>>);
        impl WindowStateListener for Closed {
            fn window_closed(&self, window: &Window) {
                self.0.borrow_mut().push(window.title().unwrap_or_default());
            }
        }

        let order = Rc::new(RefCell::new(Vec::new()));
        for window in [&owner, &child] {
            window
                .window_state_listeners()
                .listeners()
                .add(Rc::new(Closed(order.clone())));
        }

        assert!(owner.close().is_committed());
        assert!(child.is_closed());
        assert_eq!(*order.borrow(), vec!["child", "main"]);
    }

    #[test]
    fn test_owner_must_be_open() {
        let owner = Window::new();
        let child = Window::new();
        assert!(matches!(
            child.open_owned(owner.clone()),
            Err(VigilError::InvalidArgument(_))
        ));
        assert!(child.is_closed());
    }

    #[test]
    fn test_reopening_with_different_owner_fails() {
        let a = Window::new();
        let b = Window::new();
        a.open().unwrap();
        b.open().unwrap();

        let child = Window::new();
        child.open_owned(a.clone()).unwrap();
        assert!(matches!(
            child.open_owned(b.clone()),
            Err(VigilError::InvalidState(_))
        ));
        assert_eq!(child.open_owned(a.clone()).unwrap(), TransitionOutcome::Unchanged);
    }

    #[test]
    fn test_ownership_tracking() {
        let a = Window::new();
        let b = Window::new();
        let child = Window::new();
        let grandchild = Window::new();

        child.set_owner(Some(a.clone()));
        grandchild.set_owner(Some(child.clone()));
        assert!(a.is_owner_of(&grandchild));
        assert_eq!(a.owned_surfaces().len(), 1);

        child.set_owner(Some(b.clone()));
        assert!(a.owned_surfaces().is_empty());
        assert!(b.is_owner_of(&child));
        assert!(!a.is_owner_of(&grandchild));
    }

    #[test]
    fn test_title_listener() {
        struct Titles(RefCell<Vec<Option<String>>>);
        impl WindowListener for Titles {
            fn title_changed(&self, _window: &Window, previous: &Option<String>) {
                self.0.borrow_mut().push(previous.clone());
            }
        }

        let window = Window::with_title("Untitled");
        let titles = Rc::new(Titles(RefCell::new(Vec::new())));
        window.window_listeners().listeners().add(titles.clone());

        window.set_title(Some("Report.txt".to_string()));
        window.set_title(Some("Report.txt".to_string()));
        assert_eq!(*titles.0.borrow(), vec![Some("Untitled".to_string())]);
    }

    #[test]
    fn test_panicking_close_listener_does_not_wedge_window() {
        use std::panic::{AssertUnwindSafe, catch_unwind};

        struct Faulty;
        impl WindowStateListener for Faulty {
            fn window_closed(&self, _window: &Window) {
                panic!("listener failure");
            }
        }

        let window = Window::new();
        window.open().unwrap();
        let faulty = Rc::new(Faulty);
        window.window_state_listeners().listeners().add(faulty.clone());

        assert!(catch_unwind(AssertUnwindSafe(|| window.close())).is_err());
        assert!(window.is_closed());
        assert!(!window.is_closing());

        window.window_state_listeners().listeners().remove(&faulty);
        assert!(window.open().unwrap().is_committed());
        assert!(window.close().is_committed());
    }

    #[test]
    fn test_dropped_owned_surfaces_are_pruned() {
        let owner = Window::new();
        for _ in 0..3 {
            let child = Window::new();
            child.set_owner(Some(owner.clone()));
        }
        assert_eq!(owner.owned.borrow().len(), 1);

        let kept = Window::new();
        kept.set_owner(Some(owner.clone()));
        assert_eq!(owner.owned.borrow().len(), 1);
        assert_eq!(owner.owned_surfaces().len(), 1);
    }
}
