use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::{CommitOutcome, CoordinationStore, Snapshot, WriteSet};
use crate::error::AppError;

/// Attempts per lobby operation before giving up with `TXN_CONFLICT`.
pub const MAX_TXN_ATTEMPTS: u32 = 5;

const BACKOFF_MIN_MS: u64 = 5;
const BACKOFF_MAX_MS: u64 = 25;

/// What a transaction body wants done with its snapshot.
///
/// `writes` commit atomically; `outcome` is returned once they have. An
/// `Err` outcome with writes still commits them (used to clear dangling
/// references) and then surfaces the error.
#[derive(Debug)]
pub struct TxnPlan<T> {
    pub writes: WriteSet,
    pub outcome: Result<T, AppError>,
}

impl<T> TxnPlan<T> {
    pub fn commit(writes: WriteSet, value: T) -> Self {
        Self {
            writes,
            outcome: Ok(value),
        }
    }

    /// Nothing to write; return `value` as read.
    pub fn read_only(value: T) -> Self {
        Self::commit(WriteSet::new(), value)
    }

    /// Commit `writes`, then fail with `err`.
    pub fn heal(writes: WriteSet, err: impl Into<AppError>) -> Self {
        Self {
            writes,
            outcome: Err(err.into()),
        }
    }
}

/// Run `body` against a snapshot of `keys` and commit its plan, retrying
/// from a fresh snapshot whenever a watched key changed underneath.
///
/// `body` must be pure: it is re-run from scratch on every attempt and
/// only its returned plan has effects. An `Err` from `body` aborts without
/// writing or retrying.
pub async fn run_with_retry<T, F>(
    store: &dyn CoordinationStore,
    keys: &[String],
    max_attempts: u32,
    cancel: &CancellationToken,
    mut body: F,
) -> Result<T, AppError>
where
    F: FnMut(&Snapshot) -> Result<TxnPlan<T>, AppError>,
{
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        let snapshot = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            read = store.read(keys) => read?,
        };

        let plan = body(&snapshot)?;
        if plan.writes.is_empty() {
            return plan.outcome;
        }

        let committed = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(AppError::Cancelled),
            res = store.commit(&snapshot, plan.writes) => res?,
        };

        match committed {
            CommitOutcome::Committed => return plan.outcome,
            CommitOutcome::Conflict => {
                debug!(attempt, max_attempts, ?keys, "optimistic commit conflicted");
                if attempt < max_attempts {
                    backoff(attempt, cancel).await?;
                }
            }
        }
    }

    warn!(max_attempts, ?keys, "optimistic transaction exhausted its retries");
    Err(AppError::txn_conflict(max_attempts))
}

async fn backoff(attempt: u32, cancel: &CancellationToken) -> Result<(), AppError> {
    let delay_ms = rand::rng().random_range(BACKOFF_MIN_MS..=BACKOFF_MAX_MS) * u64::from(attempt);
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        _ = tokio::time::sleep(Duration::from_millis(delay_ms)) => Ok(()),
    }
}
