//! Widgets built off the dispatch thread refuse listener changes.
//!
//! Designation is process-wide, so this lives in its own binary.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use vigil::designate_dispatch_thread;
use vigil::widgets::{Rollup, RollupStateListener};

struct Quiet;
impl RollupStateListener for Quiet {}

#[test]
fn listener_changes_off_thread_always_panic() {
    designate_dispatch_thread();

    let panics = std::thread::spawn(|| {
        let rollup = Rollup::new();
        let listener: Rc<dyn RollupStateListener> = Rc::new(Quiet);
        (0..3)
            .filter(|_| {
                catch_unwind(AssertUnwindSafe(|| {
                    rollup.rollup_state_listeners().listeners().add(listener.clone())
                }))
                .is_err()
            })
            .count()
    })
    .join()
    .unwrap();

    assert_eq!(panics, 3);

    let rollup = Rollup::new();
    assert!(rollup.rollup_state_listeners().listeners().add(Rc::new(Quiet)));
}
