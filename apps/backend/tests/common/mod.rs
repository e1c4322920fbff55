#![allow(dead_code)]

// tests/common/mod.rs
use std::time::Duration;

use achi_backend::store::Subscription;
use futures_util::StreamExt;
use serde_json::Value;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Next payload on `sub` parsed as JSON, or `None` if nothing arrives in time.
pub async fn next_event(sub: &mut Subscription, timeout: Duration) -> Option<Value> {
    let payload = tokio::time::timeout(timeout, sub.next()).await.ok()??;
    Some(serde_json::from_str(&payload).expect("event payload should be JSON"))
}

/// Assert that nothing is published on `sub` for a short while.
pub async fn assert_quiet(sub: &mut Subscription) {
    if let Ok(Some(payload)) = tokio::time::timeout(Duration::from_millis(100), sub.next()).await {
        panic!("expected no event, got {payload}");
    }
}
