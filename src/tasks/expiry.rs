//! Expiry Task
//!
//! Background task that fires a cache's expiry deadline on wall-clock time.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::Expiring;

/// Spawns a task that reaps expired entries from `cache` as they fall due.
///
/// Rather than polling, the task sleeps until the cache's armed deadline. It
/// installs a waker in the cache's scheduler so that a deadline armed earlier
/// than the one it is sleeping on (first insert into an empty cache, say)
/// cuts the sleep short. With nothing armed it sleeps until woken.
///
/// # Returns
/// A JoinHandle for the spawned task, to be aborted during shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(Mutex::new(TtlCache::<String, String>::with_ttl(ttl)));
/// let expiry_handle = spawn_expiry_task(cache.clone());
/// // Later, during shutdown:
/// expiry_handle.abort();
/// ```
pub fn spawn_expiry_task<C>(cache: Arc<Mutex<C>>) -> JoinHandle<()>
where
    C: Expiring + Send + 'static,
{
    let waker = Arc::new(Notify::new());

    tokio::spawn(async move {
        cache.lock().await.scheduler_mut().set_waker(waker.clone());
        info!("Starting expiry task");

        loop {
            let wait = {
                let mut guard = cache.lock().await;
                let reaped = guard.tick();
                if reaped > 0 {
                    info!("Expiry: reaped {} entries", reaped);
                }
                let now = guard.now_ms();
                guard
                    .next_deadline()
                    .map(|deadline| Duration::from_millis(deadline.saturating_sub(now)))
            };

            match wait {
                Some(wait) => {
                    debug!("Expiry: next deadline in {:?}", wait);
                    tokio::select! {
                        _ = tokio::time::sleep(wait) => {}
                        _ = waker.notified() => debug!("Expiry: woken for a sooner deadline"),
                    }
                }
                None => {
                    debug!("Expiry: idle until a deadline is armed");
                    waker.notified().await;
                }
            }
        }
    })
}
