//! The thread-check switch is process-wide, so it gets its own binary.

use vigil_core::{DispatchConfig, DispatchGuard, are_thread_checks_enabled};

#[test]
fn disabled_checks_let_any_thread_through() {
    assert!(are_thread_checks_enabled());
    let guard = DispatchGuard::current();

    DispatchConfig::builder().thread_checks(false).batch_size(8).build().install();
    assert!(!are_thread_checks_enabled());
    assert_eq!(DispatchConfig::current().batch_size, 8);

    let allowed = std::thread::spawn(move || guard.check_access().is_ok())
        .join()
        .unwrap();
    assert!(allowed);

    DispatchConfig::default().install();
    assert!(are_thread_checks_enabled());

    let denied = std::thread::spawn(move || guard.check_access().is_err())
        .join()
        .unwrap();
    assert!(denied);
}
