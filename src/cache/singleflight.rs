/// Single-flight load group
///
/// Deduplicates concurrent loads per key. The first caller for a key spawns
/// the load task and registers a shareable result channel; every caller
/// arriving while that load is outstanding awaits the same channel and
/// receives the same result. The entry is removed when the load completes,
/// before the result is sent, so a caller either finds a channel that will
/// deliver data or starts a fresh load. Distinct keys never block each other.
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures::channel::oneshot;
use futures::future::{FutureExt, Shared};

use crate::errors::{AppError, AppResult};

type LoadChannel = Shared<oneshot::Receiver<AppResult<String>>>;

#[derive(Debug, Default)]
pub(crate) struct FlightGroup {
    in_flight: Arc<Mutex<HashMap<String, LoadChannel>>>,
}

impl FlightGroup {
    /// Run `load` for `key`, coalescing with any load already in flight.
    pub(crate) async fn run<F, Fut>(&self, key: &str, load: F) -> AppResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<String>> + Send + 'static,
    {
        let channel = {
            let mut in_flight = self.in_flight.lock().unwrap();
            if let Some(channel) = in_flight.get(key) {
                channel.clone()
            } else {
                let channel = self.spawn_load(key.to_string(), load());
                in_flight.insert(key.to_string(), channel.clone());
                channel
            }
        };

        match channel.await {
            Ok(result) => result,
            // The sender is dropped without a result only if the load task panicked.
            Err(_canceled) => Err(AppError::Internal("cache load task dropped".to_string())),
        }
    }

    fn spawn_load<Fut>(&self, key: String, load: Fut) -> LoadChannel
    where
        Fut: Future<Output = AppResult<String>> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let in_flight = Arc::clone(&self.in_flight);
        tokio::spawn(async move {
            let result = load.await;
            // Evict first: late arrivals either see this channel with its
            // result already sent, or no channel at all.
            in_flight.lock().unwrap().remove(&key);
            let _ = sender.send(result);
        });
        receiver.shared()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{self, Duration};

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_load() {
        let group = FlightGroup::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let load = |calls: Arc<AtomicUsize>| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                time::sleep(Duration::from_millis(50)).await;
                Ok("value".to_string())
            }
        };

        let (a, b, c) = futures::join!(
            group.run("k", load(calls.clone())),
            group.run("k", load(calls.clone())),
            group.run("k", load(calls.clone())),
        );

        assert_eq!(a.unwrap(), "value");
        assert_eq!(b.unwrap(), "value");
        assert_eq!(c.unwrap(), "value");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_keys_run_independently() {
        let group = FlightGroup::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let load = |calls: Arc<AtomicUsize>, value: &'static str| {
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                time::sleep(Duration::from_millis(10)).await;
                Ok(value.to_string())
            }
        };

        let (a, b) = futures::join!(
            group.run("a", load(calls.clone(), "a-value")),
            group.run("b", load(calls.clone(), "b-value")),
        );

        assert_eq!(a.unwrap(), "a-value");
        assert_eq!(b.unwrap(), "b-value");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_broadcast_to_all_waiters() {
        let group = FlightGroup::default();

        let load = || async {
            time::sleep(Duration::from_millis(10)).await;
            Err(AppError::Database("query failed".to_string()))
        };

        let (a, b) = futures::join!(group.run("k", load), group.run("k", load));
        assert!(matches!(a, Err(AppError::Database(_))));
        assert!(matches!(b, Err(AppError::Database(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_call_after_completion_loads_fresh() {
        let group = FlightGroup::default();
        let calls = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let calls = calls.clone();
            let value = group
                .run("k", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("value".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value, "value");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
