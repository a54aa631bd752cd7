//! Cross-thread hand-off onto the dispatch thread.
//!
//! Worker threads must never touch listener registries. Instead they post a
//! callback through a [`DispatchSender`]; the dispatch thread runs posted
//! callbacks, in submission order, when it drains its [`DispatchQueue`].
//!
//! ```
//! use vigil_core::{DispatchQueue, spawn_task};
//!
//! let queue = DispatchQueue::new();
//! let sender = queue.sender();
//!
//! let handle = spawn_task(&sender, || 6 * 7, |answer| {
//!     // Runs on the dispatch thread, inside process_all().
//!     assert_eq!(answer, 42);
//! })
//! .unwrap();
//! handle.join().unwrap();
//!
//! assert_eq!(queue.process_all(), 1);
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::config::DispatchConfig;
use crate::error::{Result, VigilError};
use crate::thread_check::DispatchGuard;

/// A boxed callback posted to the dispatch thread.
type Callback = Box<dyn FnOnce() + Send + 'static>;

/// The dispatch thread's end of the queue.
///
/// A queue is bound to the thread that created it (or to an explicit
/// guard) and cannot be moved to another thread.
pub struct DispatchQueue {
    guard: DispatchGuard,
    sender: Sender<Callback>,
    receiver: Receiver<Callback>,
    batch_size: usize,
    _not_send: PhantomData<Rc<()>>,
}

/// The posting end of a [`DispatchQueue`]. Cheap to clone, `Send + Sync`.
#[derive(Clone)]
pub struct DispatchSender {
    sender: Sender<Callback>,
}

impl Default for DispatchQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchQueue {
    /// Create a queue using the process-wide [`DispatchConfig`].
    pub fn new() -> Self {
        Self::with_config(&DispatchConfig::current())
    }

    /// Create a queue with an explicit configuration.
    pub fn with_config(config: &DispatchConfig) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            guard: DispatchGuard::dispatch_thread(),
            sender,
            receiver,
            batch_size: config.batch_size,
            _not_send: PhantomData,
        }
    }

    /// Bind the queue to an explicit guard instead of the dispatch thread.
    pub fn with_guard(mut self, guard: DispatchGuard) -> Self {
        self.guard = guard;
        self
    }

    /// A sender that worker threads can post through.
    pub fn sender(&self) -> DispatchSender {
        DispatchSender {
            sender: self.sender.clone(),
        }
    }

    /// Number of callbacks waiting to run.
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Check if any callbacks are waiting.
    pub fn has_pending(&self) -> bool {
        !self.receiver.is_empty()
    }

    /// Callbacks run per [`process_pending`](Self::process_pending) call.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Set the batch size. `0` means no limit.
    pub fn set_batch_size(&mut self, size: usize) {
        self.batch_size = size;
    }

    /// Run up to one batch of pending callbacks, oldest first.
    ///
    /// Callbacks posted while the batch runs wait for the next call.
    /// Returns the number of callbacks run.
    ///
    /// # Panics
    ///
    /// Panics off the dispatch thread.
    #[track_caller]
    pub fn process_pending(&self) -> usize {
        let available = self.receiver.len();
        let limit = match self.batch_size {
            0 => available,
            size => available.min(size),
        };
        self.run(limit)
    }

    /// Run every callback that was pending when the call started.
    ///
    /// # Panics
    ///
    /// Panics off the dispatch thread.
    #[track_caller]
    pub fn process_all(&self) -> usize {
        self.run(self.receiver.len())
    }

    #[track_caller]
    fn run(&self, limit: usize) -> usize {
        self.guard.assert_access();
        let _span = tracing::debug_span!("vigil::dispatch").entered();

        let mut processed = 0;
        while processed < limit {
            match self.receiver.try_recv() {
                Ok(callback) => {
                    callback();
                    processed += 1;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        if processed > 0 {
            tracing::debug!(target: "vigil_core::dispatch", processed, remaining = self.receiver.len(), "drained dispatch queue");
        }
        processed
    }
}

impl fmt::Debug for DispatchQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchQueue")
            .field("guard", &self.guard)
            .field("pending", &self.receiver.len())
            .field("batch_size", &self.batch_size)
            .finish()
    }
}

impl DispatchSender {
    /// Post a callback to run later on the dispatch thread.
    ///
    /// Callbacks from one sender run in the order they were posted.
    ///
    /// # Errors
    ///
    /// Returns [`VigilError::QueueClosed`] if the queue has been dropped.
    pub fn post<F>(&self, callback: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender
            .send(Box::new(callback))
            .map_err(|_| VigilError::QueueClosed)?;
        tracing::trace!(target: "vigil_core::dispatch", "callback posted");
        Ok(())
    }
}

impl fmt::Debug for DispatchSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchSender")
            .field("pending", &self.sender.len())
            .finish()
    }
}

/// Run `work` on a new worker thread and deliver its result to
/// `on_complete` on the dispatch thread.
///
/// `on_complete` runs when the dispatch thread next drains its queue. If
/// the queue is gone by the time `work` finishes, the result is dropped and
/// a warning is logged.
///
/// # Errors
///
/// Returns the OS error if the worker thread cannot be spawned.
pub fn spawn_task<T, W, C>(
    sender: &DispatchSender,
    work: W,
    on_complete: C,
) -> std::io::Result<JoinHandle<()>>
where
    T: Send + 'static,
    W: FnOnce() -> T + Send + 'static,
    C: FnOnce(T) + Send + 'static,
{
    let sender = sender.clone();
    std::thread::Builder::new()
        .name("vigil-task".to_string())
        .spawn(move || {
            let result = work();
            if sender.post(move || on_complete(result)).is_err() {
                tracing::warn!(
                    target: "vigil_core::dispatch",
                    "dispatch queue dropped before task completed; discarding result"
                );
            }
        })
}

static_assertions::assert_not_impl_any!(DispatchQueue: Send, Sync);
static_assertions::assert_impl_all!(DispatchSender: Send, Sync, Clone);
