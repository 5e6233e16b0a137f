//! # Bounded Worker Pool
//! Fans a list of work items out to at most `concurrency` Tokio tasks over a
//! shared queue. A single item's failure is logged and skipped; it never
//! stops the worker that hit it or its siblings.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex};

use metrics::counter;

/// Minimum fan-out regardless of configuration.
pub const MIN_CONCURRENCY: usize = 2;

/// Runs `op` over every item with at most `min(concurrency, items.len())`
/// concurrent workers. Results come back in the original item order; failed
/// items are simply absent.
pub async fn run<T, F, Fut>(items: Vec<String>, concurrency: usize, op: F) -> Vec<T>
where
    T: Send + 'static,
    F: Fn(String) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
{
    let worker_count = concurrency.max(MIN_CONCURRENCY).min(items.len());
    let queue: Arc<Mutex<VecDeque<(usize, String)>>> =
        Arc::new(Mutex::new(items.into_iter().enumerate().collect()));
    let results: Arc<Mutex<Vec<(usize, T)>>> = Arc::new(Mutex::new(Vec::new()));

    let mut workers = Vec::with_capacity(worker_count);
    for _ in 0..worker_count {
        let queue = queue.clone();
        let results = results.clone();
        let op = op.clone();
        workers.push(tokio::spawn(async move {
            loop {
                // Atomic pop; the guard must not be held across the await below.
                let next = queue.lock().expect("pool queue mutex poisoned").pop_front();
                let Some((idx, item)) = next else { break };
                match op(item.clone()).await {
                    Ok(value) => {
                        results
                            .lock()
                            .expect("pool results mutex poisoned")
                            .push((idx, value));
                    }
                    Err(e) => {
                        counter!("pool_item_failures_total").increment(1);
                        tracing::warn!(target: "pool", error = ?e, item, "work item failed, skipping");
                    }
                }
            }
        }));
    }

    for w in workers {
        // A panicked worker only loses the items it had claimed.
        let _ = w.await;
    }

    let mut collected = Arc::try_unwrap(results)
        .map(|m| m.into_inner().expect("pool results mutex poisoned"))
        .unwrap_or_default();
    collected.sort_by_key(|(idx, _)| *idx);
    collected.into_iter().map(|(_, v)| v).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn processes_every_item_exactly_once() {
        let items: Vec<String> = (0..25).map(|i| i.to_string()).collect();
        let seen = Arc::new(AtomicUsize::new(0));
        let seen2 = seen.clone();

        let out = run(items, 4, move |item| {
            let seen = seen2.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(item.parse::<usize>().unwrap())
            }
        })
        .await;

        assert_eq!(seen.load(Ordering::SeqCst), 25);
        assert_eq!(out, (0..25).collect::<Vec<_>>(), "results keep input order");
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_batch() {
        let items: Vec<String> = (0..10).map(|i| i.to_string()).collect();
        let out = run(items, 3, |item| async move {
            if item == "4" {
                anyhow::bail!("boom");
            }
            Ok(item)
        })
        .await;

        assert_eq!(out.len(), 9);
        assert!(!out.contains(&"4".to_string()));
    }

    #[tokio::test]
    async fn empty_input_yields_empty_output() {
        let out = run(Vec::new(), 6, |item| async move { Ok(item) }).await;
        assert!(out.is_empty());
    }
}
