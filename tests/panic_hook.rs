//! Panic hook integration test
//!
//! Kept in its own test binary: the panic hook is process-global.

use std::panic;
use std::sync::Arc;

use logcount::metrics::{install_panic_hook, EventHook, LevelCounterStore};
use logcount::SeverityLevel;

#[test]
fn test_panics_are_counted() {
    let store = Arc::new(LevelCounterStore::default());
    install_panic_hook(EventHook::new(store.clone()));

    let result = panic::catch_unwind(|| {
        panic!("boom");
    });
    assert!(result.is_err());

    let result = panic::catch_unwind(|| "not a number".parse::<u32>().unwrap());
    assert!(result.is_err());

    assert_eq!(store.snapshot(SeverityLevel::Panic), Some(2));
    assert_eq!(store.snapshot(SeverityLevel::Error), Some(0));
}
