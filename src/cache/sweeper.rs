/// Background TTL sweep
///
/// Expired entries are already deleted lazily when observed by `get`/`has`;
/// the sweeper bounds memory for entries nobody reads again. The interval is
/// a tunable, not part of correctness - it only affects how long an expired
/// entry can occupy memory unobserved.
use std::fmt::Display;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::cache::BoundedCache;
use crate::logger::{self, LogTag};

/// Handle to a running sweeper task. Cancelling stops the loop; the task
/// exits at the next tick or immediately if it is waiting.
pub struct SweeperHandle {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawn the periodic sweep task for a shared cache.
pub fn spawn_sweeper<K, V>(
    cache: Arc<BoundedCache<K, V>>,
    interval: Duration,
) -> SweeperHandle
where
    K: Clone + Eq + Hash + Display + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let token = CancellationToken::new();
    let child_token = token.clone();

    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; skip it so the first real
        // sweep happens one interval after startup.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = child_token.cancelled() => {
                    logger::debug(LogTag::Cache, "Sweeper stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = cache.sweep();
                    if removed > 0 {
                        logger::debug(
                            LogTag::Cache,
                            &format!("Sweep removed {} expired entries", removed),
                        );
                    }
                }
            }
        }
    });

    SweeperHandle { token, handle }
}
