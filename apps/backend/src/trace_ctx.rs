//! Task-local trace id for the request being served.
//!
//! `TraceSpan` scopes each request future with the id `RequestTrace`
//! assigned, so error rendering can stamp `x-trace-id` without threading
//! the request through the service layer.

use std::cell::RefCell;

use tokio::task_local;

/// Reported when no request scope is active.
pub const UNKNOWN_TRACE_ID: &str = "unknown";

/// Trace id stored in request extensions by `RequestTrace`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceId(pub String);

task_local! {
    static TRACE_ID: RefCell<Option<String>>;
}

/// The current request's trace id, or `"unknown"` outside a request scope.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(|cell| cell.borrow().clone())
        .ok()
        .flatten()
        .unwrap_or_else(|| UNKNOWN_TRACE_ID.to_string())
}

pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    TRACE_ID.scope(RefCell::new(Some(trace_id)), future).await
}
