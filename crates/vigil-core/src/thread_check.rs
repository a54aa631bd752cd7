//! Dispatch-thread confinement for listener state.
//!
//! All listener registration, iteration and property mutation happens on a
//! single logical thread, the *dispatch thread*. Registries hold `Rc`s and
//! `RefCell`s, so the compiler already refuses to move them to another
//! thread. [`DispatchGuard`] covers what the type system cannot: a registry
//! that was *built* on the wrong thread.
//!
//! # Usage
//!
//! Designate the dispatch thread once at startup:
//!
//! ```
//! use vigil_core::thread_check::{designate_dispatch_thread, is_dispatch_thread};
//!
//! designate_dispatch_thread();
//! assert!(is_dispatch_thread());
//! ```
//!
//! Until a thread is designated, [`DispatchGuard::dispatch_thread`] binds to
//! the calling thread, so early initialisation and unit tests work without
//! any setup.
//!
//! # Checks
//!
//! - [`DispatchGuard::check_access`] returns a [`WrongThreadError`] that the
//!   caller can act on (typically by posting to a
//!   [`DispatchSender`](crate::DispatchSender) instead).
//! - [`DispatchGuard::assert_access`] panics. Registries use this one: an
//!   off-thread access is a programming error, not a recoverable condition.
//!
//! Checks can be switched off process-wide with
//! [`set_thread_checks_enabled`] or through
//! [`DispatchConfig`](crate::DispatchConfig).

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::ThreadId;

use crate::config::DispatchConfig;
use crate::error::WrongThreadError;

/// Global storage for the dispatch thread ID.
static DISPATCH_THREAD_ID: OnceLock<ThreadId> = OnceLock::new();

/// Flag to enable/disable runtime thread checks globally.
static THREAD_CHECKS_ENABLED: AtomicBool = AtomicBool::new(true);

/// Designate the calling thread as the dispatch thread.
///
/// Call this once, from the UI thread, at application startup. Calling it
/// again from the same thread is a no-op.
///
/// # Panics
///
/// Panics if a different thread has already been designated.
pub fn designate_dispatch_thread() {
    let current = std::thread::current();
    if DISPATCH_THREAD_ID.set(current.id()).is_err() {
        if DISPATCH_THREAD_ID.get() != Some(&current.id()) {
            panic!(
                "designate_dispatch_thread() called from a different thread than the \
                 original. The dispatch thread can only be designated once."
            );
        }
        return;
    }

    let config = DispatchConfig::current();
    if let Some(expected) = config.thread_name.as_deref()
        && current.name() != Some(expected)
    {
        tracing::warn!(
            target: "vigil_core::thread",
            expected,
            actual = current.name().unwrap_or("<unnamed>"),
            "dispatch thread name does not match configuration"
        );
    }
    tracing::debug!(target: "vigil_core::thread", thread = ?current.id(), "dispatch thread designated");
}

/// Get the dispatch thread ID if one has been designated.
#[inline]
pub fn dispatch_thread_id() -> Option<ThreadId> {
    DISPATCH_THREAD_ID.get().copied()
}

/// Check if the current thread is the dispatch thread.
///
/// Returns `true` when no thread has been designated yet.
#[inline]
pub fn is_dispatch_thread() -> bool {
    match DISPATCH_THREAD_ID.get() {
        Some(&id) => std::thread::current().id() == id,
        None => true,
    }
}

/// Enable or disable runtime thread checks.
///
/// Checks are enabled by default in every build profile.
pub fn set_thread_checks_enabled(enabled: bool) {
    THREAD_CHECKS_ENABLED.store(enabled, Ordering::SeqCst);
}

/// Check if runtime thread checks are currently enabled.
#[inline]
pub fn are_thread_checks_enabled() -> bool {
    THREAD_CHECKS_ENABLED.load(Ordering::Relaxed)
}

/// Panics if the current thread is not the dispatch thread.
///
/// ```
/// use vigil_core::assert_dispatch_thread;
///
/// fn refresh() {
///     assert_dispatch_thread!("refresh must run on the dispatch thread");
/// }
/// refresh();
/// ```
#[macro_export]
macro_rules! assert_dispatch_thread {
    () => {
        $crate::thread_check::DispatchGuard::dispatch_thread().assert_access()
    };
    ($msg:expr) => {
        if let Err(err) = $crate::thread_check::DispatchGuard::dispatch_thread().check_access() {
            $crate::thread_check::panic_wrong_thread(&err, $msg, file!(), line!());
        }
    };
}

/// Debug-only variant of [`assert_dispatch_thread!`].
#[macro_export]
macro_rules! debug_assert_dispatch_thread {
    () => {
        #[cfg(debug_assertions)]
        $crate::assert_dispatch_thread!()
    };
    ($msg:expr) => {
        #[cfg(debug_assertions)]
        $crate::assert_dispatch_thread!($msg)
    };
}

#[cold]
#[inline(never)]
#[doc(hidden)]
pub fn panic_wrong_thread(err: &WrongThreadError, msg: &str, file: &str, line: u32) -> ! {
    panic!(
        "\n\
        ══════════════════════════════════════════════════════════════════════\n\
        DISPATCH THREAD VIOLATION\n\
        ══════════════════════════════════════════════════════════════════════\n\
        \n\
        {msg}\n\
        {err}\n\
        \n\
        Location: {file}:{line}\n\
        \n\
        Listener registration, notification and widget state changes must\n\
        happen on the dispatch thread. From a worker thread, post the work\n\
        through a DispatchSender, or use spawn_task() to deliver results.\n\
        ══════════════════════════════════════════════════════════════════════"
    )
}

/// Confines access to the thread it was bound to.
///
/// A guard is `Copy + Send`: it can be handed to another thread, where
/// [`check_access`](Self::check_access) will then fail.
///
/// # Example
///
/// ```
/// use vigil_core::DispatchGuard;
///
/// let guard = DispatchGuard::current();
/// assert!(guard.check_access().is_ok());
///
/// let denied = std::thread::spawn(move || guard.check_access().is_err())
///     .join()
///     .unwrap();
/// assert!(denied);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchGuard {
    thread_id: ThreadId,
}

impl Default for DispatchGuard {
    fn default() -> Self {
        Self::dispatch_thread()
    }
}

impl DispatchGuard {
    /// Bind a guard to the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// Bind a guard to the designated dispatch thread.
    ///
    /// Falls back to the current thread when none has been designated.
    pub fn dispatch_thread() -> Self {
        Self {
            thread_id: dispatch_thread_id().unwrap_or_else(|| std::thread::current().id()),
        }
    }

    /// The thread this guard confines access to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the current thread is the guarded one.
    #[inline]
    pub fn is_dispatch_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Verify the current thread may access guarded state.
    ///
    /// Always succeeds while thread checks are disabled.
    pub fn check_access(&self) -> Result<(), WrongThreadError> {
        if !are_thread_checks_enabled() || self.is_dispatch_thread() {
            Ok(())
        } else {
            Err(WrongThreadError::from_current(self.thread_id))
        }
    }

    /// Verify the current thread may access guarded state.
    ///
    /// # Panics
    ///
    /// Panics with the [`WrongThreadError`] message when called from any
    /// other thread.
    #[track_caller]
    pub fn assert_access(&self) {
        if let Err(err) = self.check_access() {
            let location = std::panic::Location::caller();
            panic_wrong_thread(
                &err,
                "guarded state accessed off the dispatch thread",
                location.file(),
                location.line(),
            );
        }
    }
}

static_assertions::assert_impl_all!(DispatchGuard: Send, Sync, Copy);

#[cfg(test)]
mod tests {
    use super::*;

    // Designation is process-wide and permanent, so it is exercised in the
    // `designation` integration test rather than here.

    #[test]
    fn test_guard_same_thread() {
        let guard = DispatchGuard::current();
        assert!(guard.is_dispatch_thread());
        assert!(guard.check_access().is_ok());
        guard.assert_access();
    }

    #[test]
    fn test_guard_check_access_from_other_thread() {
        let guard = DispatchGuard::current();
        let expected = guard.thread_id();

        let result = std::thread::spawn(move || guard.check_access())
            .join()
            .unwrap();

        let err = result.unwrap_err();
        assert_eq!(err.expected, expected);
        assert_ne!(err.actual, expected);
    }

    #[test]
    fn test_guard_assert_access_panics_on_other_thread() {
        let guard = DispatchGuard::current();

        let result = std::thread::spawn(move || {
            guard.assert_access();
        })
        .join();

        assert!(result.is_err(), "expected dispatch thread violation");
    }

    #[test]
    fn test_guard_fails_every_time() {
        let guard = DispatchGuard::current();

        let failures = std::thread::spawn(move || {
            (0..10).filter(|_| guard.check_access().is_err()).count()
        })
        .join()
        .unwrap();

        assert_eq!(failures, 10);
    }

    #[test]
    fn test_assert_macro_on_current_thread() {
        // Without a designated thread (or when designated here) this passes.
        if dispatch_thread_id().is_none() {
            assert_dispatch_thread!();
            assert_dispatch_thread!("custom message");
            debug_assert_dispatch_thread!();
        }
    }

    #[test]
    fn test_guard_copy() {
        let a = DispatchGuard::current();
        let b = a;
        assert_eq!(a, b);
        assert_eq!(a.thread_id(), b.thread_id());
    }
}
