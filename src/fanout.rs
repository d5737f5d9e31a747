// Ordered concurrent mapping.
// Runs one task per item with its own timeout and reassembles results by index.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::error::{ProxyError, Result};

/// Map every item concurrently, returning one outcome per item in input order.
///
/// Each task runs on the runtime's worker pool under its own `timeout`; a
/// slow or failing item only affects its own slot. Workers report
/// `(index, outcome)` through a channel drained by the caller, which is the
/// only writer of the output slots. Dropping the returned future aborts
/// every in-flight task.
pub async fn map_ordered<S, D, F, Fut>(items: Vec<S>, timeout: Duration, map: F) -> Vec<Result<D>>
where
    D: Send + 'static,
    F: Fn(S) -> Fut,
    Fut: Future<Output = Result<D>> + Send + 'static,
{
    let count = items.len();
    let (tx, mut rx) = mpsc::channel::<(usize, Result<D>)>(count.max(1));
    let mut workers = JoinSet::new();

    for (index, item) in items.into_iter().enumerate() {
        let tx = tx.clone();
        let task = map(item);
        workers.spawn(async move {
            let outcome = match tokio::time::timeout(timeout, task).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ProxyError::Timeout(timeout)),
            };
            let _ = tx.send((index, outcome)).await;
        });
    }
    drop(tx);

    let mut slots: Vec<Option<Result<D>>> = (0..count).map(|_| None).collect();
    while let Some((index, outcome)) = rx.recv().await {
        slots[index] = Some(outcome);
    }

    while let Some(joined) = workers.join_next().await {
        if let Err(e) = joined {
            tracing::error!(error = %e, "fan-out worker aborted");
        }
    }

    slots
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| Err(ProxyError::Other("worker exited without a result".to_string()))))
        .collect()
}
