//! Tracing targets and span names.
//!
//! Vigil is instrumented with the `tracing` crate and never installs a
//! subscriber itself. To see its logs, install one in your application:
//!
//! ```ignore
//! use tracing_subscriber::EnvFilter;
//!
//! tracing_subscriber::fmt()
//!     .with_env_filter(EnvFilter::new("vigil_core::veto=debug,vigil::widget=debug"))
//!     .init();
//! ```
//!
//! Listener panics are reported at `warn` on [`targets::LISTENER`]; a
//! mismatched dispatch thread name is reported at `warn` on
//! [`targets::THREAD`]. Everything else is `debug` or `trace`.

/// Span names, for filtering traces to one subsystem.
pub mod span_names {
    /// One vetoable transition: preview, then commit or veto.
    pub const TRANSITION: &str = "vigil::transition";
    /// One drain of the dispatch queue.
    pub const DISPATCH: &str = "vigil::dispatch";
}

/// Target names for log filtering.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "vigil_core";
    /// Dispatch thread designation and access checks.
    pub const THREAD: &str = "vigil_core::thread";
    /// Listener registration and fan-out.
    pub const LISTENER: &str = "vigil_core::listener";
    /// Plain change notification.
    pub const NOTIFY: &str = "vigil_core::notify";
    /// Vetoable transitions.
    pub const VETO: &str = "vigil_core::veto";
    /// Cross-thread dispatch queue.
    pub const DISPATCH: &str = "vigil_core::dispatch";
    /// Widget state changes.
    pub const WIDGET: &str = "vigil::widget";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_nest_under_crate() {
        for target in [
            targets::THREAD,
            targets::LISTENER,
            targets::NOTIFY,
            targets::VETO,
            targets::DISPATCH,
        ] {
            assert!(target.starts_with(targets::CORE));
        }
    }

    #[test]
    fn test_spans_visible_to_subscriber() {
        use parking_lot::Mutex;
        use std::sync::Arc;
        use tracing_subscriber::layer::SubscriberExt;

        #[derive(Clone, Default)]
        struct Names(Arc<Mutex<Vec<String>>>);

        impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Names {
            fn on_new_span(
                &self,
                attrs: &tracing::span::Attributes<'_>,
                _id: &tracing::span::Id,
                _ctx: tracing_subscriber::layer::Context<'_, S>,
            ) {
                self.0.lock().push(attrs.metadata().name().to_string());
            }
        }

        let names = Names::default();
        let subscriber = tracing_subscriber::registry().with(names.clone());
        tracing::subscriber::with_default(subscriber, || {
            let queue = crate::DispatchQueue::new();
            queue.sender().post(|| {}).unwrap();
            queue.process_all();
        });

        assert!(names.0.lock().iter().any(|n| n == span_names::DISPATCH));
    }
}
