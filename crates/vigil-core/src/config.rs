//! Process-wide dispatch configuration.
//!
//! The configuration is installed once at startup, normally right before
//! [`designate_dispatch_thread`](crate::thread_check::designate_dispatch_thread)
//! is called from the UI thread:
//!
//! ```
//! use vigil_core::DispatchConfig;
//!
//! DispatchConfig::builder()
//!     .thread_name("main")
//!     .batch_size(32)
//!     .build()
//!     .install();
//!
//! assert_eq!(DispatchConfig::current().batch_size, 32);
//! ```

use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::thread_check::set_thread_checks_enabled;

/// Default number of posted callbacks run per [`DispatchQueue::process_pending`] call.
///
/// [`DispatchQueue::process_pending`]: crate::DispatchQueue::process_pending
pub const DEFAULT_BATCH_SIZE: usize = 64;

static GLOBAL_CONFIG: OnceLock<RwLock<DispatchConfig>> = OnceLock::new();

fn global() -> &'static RwLock<DispatchConfig> {
    GLOBAL_CONFIG.get_or_init(|| RwLock::new(DispatchConfig::default()))
}

/// Configuration for the dispatch thread and its callback queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Whether registries verify the calling thread at runtime.
    pub thread_checks: bool,
    /// Expected name of the dispatch thread. Only used for diagnostics.
    pub thread_name: Option<String>,
    /// Callbacks run per drain of the dispatch queue. `0` drains everything.
    pub batch_size: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            thread_checks: true,
            thread_name: None,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl DispatchConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> DispatchConfigBuilder {
        DispatchConfigBuilder::default()
    }

    /// Make this the process-wide configuration.
    ///
    /// Queues created afterwards pick up the batch size; the thread-check
    /// flag takes effect immediately for every registry.
    pub fn install(self) {
        set_thread_checks_enabled(self.thread_checks);
        tracing::debug!(
            target: "vigil_core::dispatch",
            thread_checks = self.thread_checks,
            batch_size = self.batch_size,
            "installed dispatch configuration"
        );
        *global().write() = self;
    }

    /// A copy of the process-wide configuration.
    pub fn current() -> Self {
        global().read().clone()
    }
}

/// Builder for [`DispatchConfig`].
#[derive(Debug, Default)]
pub struct DispatchConfigBuilder {
    config: DispatchConfig,
}

impl DispatchConfigBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable runtime thread checks.
    pub fn thread_checks(mut self, enabled: bool) -> Self {
        self.config.thread_checks = enabled;
        self
    }

    /// Set the expected dispatch-thread name.
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.thread_name = Some(name.into());
        self
    }

    /// Set the queue batch size.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Finish building.
    pub fn build(self) -> DispatchConfig {
        self.config
    }
}
