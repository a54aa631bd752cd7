//! Widget log events as seen by a `tracing` subscriber.

use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing_subscriber::layer::{Context, SubscriberExt};
use vigil::prelude::*;

/// Collects `(target, message)` for every event.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<(String, String)>>>);

impl Captured {
    fn messages(&self, target: &str) -> Vec<String> {
        self.0
            .lock()
            .iter()
            .filter(|(t, _)| t == target)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

struct Message(String);

impl Visit for Message {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = format!("{value:?}");
        }
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Captured {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let mut message = Message(String::new());
        event.record(&mut message);
        self.0
            .lock()
            .push((event.metadata().target().to_string(), message.0));
    }
}

/// Refuses to close with a `false` result.
struct KeepOpen;

impl DialogStateListener for KeepOpen {
    fn preview_dialog_close(&self, _dialog: &Dialog, result: bool) -> Vote {
        result.into()
    }
}

#[test]
fn test_owner_close_logs_owned_surface_that_stayed_open() {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::registry().with(captured.clone());

    tracing::subscriber::with_default(subscriber, || {
        let owner = Window::with_title("main");
        owner.open().unwrap();
        let dialog = Dialog::new(false);
        dialog.dialog_state_listeners().listeners().add(Rc::new(KeepOpen));
        dialog.open(Some(owner.clone()), None).unwrap();

        assert!(owner.close().is_committed());
        assert!(owner.is_closed());
        assert!(dialog.window().is_open());
    });

    let widget = captured.messages("vigil::widget");
    assert!(widget.iter().any(|m| m == "owned surface stayed open"));
    assert!(widget.iter().any(|m| m == "window open"));
}

#[test]
fn test_dialog_close_logged_under_widget_target() {
    let captured = Captured::default();
    let subscriber = tracing_subscriber::registry().with(captured.clone());

    tracing::subscriber::with_default(subscriber, || {
        let dialog = Dialog::new(false);
        dialog.open(None, None).unwrap();
        assert!(dialog.close(true).is_committed());
    });

    let widget = captured.messages("vigil::widget");
    assert!(widget.iter().any(|m| m == "dialog closed"));
    assert!(widget.iter().all(|m| m != "owned surface stayed open"));
}
