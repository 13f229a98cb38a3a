//! Deadlines and concurrent fan-out over datastore queries

use std::{future::Future, time::Duration};

use futures::future::{BoxFuture, join_all};
use primitives::QueryError;
use tokio::time::timeout;
use tracing::{error, warn};

/// One named query of a fan-out.
pub type Branch<'a, T> = (&'static str, BoxFuture<'a, eyre::Result<T>>);

/// Run a query under a deadline, turning its failure into a [`QueryError`].
pub async fn with_deadline<T, F>(
    operation: &'static str,
    deadline: Duration,
    fut: F,
) -> Result<T, QueryError>
where
    F: Future<Output = eyre::Result<T>>,
{
    match timeout(deadline, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            error!(operation, error = %e, "Query failed");
            Err(QueryError::infrastructure(operation, e))
        }
        Err(_) => {
            error!(operation, deadline_ms = deadline.as_millis(), "Query timed out");
            Err(QueryError::Timeout { operation, after: deadline })
        }
    }
}

/// Run every branch concurrently and wait for all of them under one shared
/// deadline.
///
/// Failed branches are logged and dropped. The call fails only when every
/// branch failed, or when the deadline cancels the whole set.
pub async fn fan_out<'a, T>(
    metric: &'static str,
    branches: Vec<Branch<'a, T>>,
    deadline: Duration,
) -> Result<Vec<T>, QueryError> {
    let (names, futures): (Vec<_>, Vec<_>) = branches.into_iter().unzip();
    let Ok(results) = timeout(deadline, join_all(futures)).await else {
        error!(metric, deadline_ms = deadline.as_millis(), "Stats fan-out timed out");
        return Err(QueryError::Timeout { operation: metric, after: deadline });
    };

    let mut survivors = Vec::with_capacity(results.len());
    let mut last_error = None;
    for (branch, result) in names.into_iter().zip(results) {
        match result {
            Ok(value) => survivors.push(value),
            Err(e) => {
                warn!(metric, branch, error = %e, "Stats branch failed");
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if survivors.is_empty() => {
            error!(metric, "All stats branches failed");
            Err(QueryError::infrastructure(metric, e.wrap_err("all branches failed")))
        }
        _ => Ok(survivors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    fn ok(value: u64) -> BoxFuture<'static, eyre::Result<u64>> {
        async move { Ok(value) }.boxed()
    }

    fn failing() -> BoxFuture<'static, eyre::Result<u64>> {
        async { Err(eyre::eyre!("store unreachable")) }.boxed()
    }

    #[tokio::test]
    async fn keeps_surviving_branches() {
        let branches = vec![("a", ok(1)), ("b", failing()), ("c", ok(3))];
        let values = fan_out("test", branches, Duration::from_secs(1)).await.unwrap();
        assert_eq!(values, vec![1, 3]);
    }

    #[tokio::test]
    async fn fails_when_every_branch_fails() {
        let branches = vec![("a", failing()), ("b", failing())];
        let err = fan_out("test", branches, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, QueryError::Infrastructure { operation: "test", .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn shared_deadline_cancels_all_branches() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(1)
        }
        .boxed();
        let branches = vec![("fast", ok(1)), ("slow", slow)];
        let err = fan_out("test", branches, Duration::from_millis(20)).await.unwrap_err();
        assert!(matches!(err, QueryError::Timeout { .. }));
    }

    #[tokio::test]
    async fn deadline_maps_query_errors() {
        let err = with_deadline("get", Duration::from_secs(1), failing()).await.unwrap_err();
        assert!(matches!(err, QueryError::Infrastructure { operation: "get", .. }));

        let value = with_deadline("get", Duration::from_secs(1), ok(7)).await.unwrap();
        assert_eq!(value, 7);
    }
}
