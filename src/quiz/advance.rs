use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;

struct Pending {
    id: u64,
    handle: JoinHandle<()>,
}

/// Deferred "show the next question" calls, at most one pending per key.
///
/// A timer drops its own entry once it has run, so only chats with an advance
/// in flight are tracked.
pub struct AdvanceTimers<K> {
    pending: Arc<Mutex<HashMap<K, Pending>>>,
    next_id: Mutex<u64>,
}

impl<K: Eq + Hash> Default for AdvanceTimers<K> {
    fn default() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: Mutex::new(0),
        }
    }
}

impl<K: Eq + Hash + Clone + Send + 'static> AdvanceTimers<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` once after `delay`, replacing whatever was pending for `key`.
    pub fn schedule<F>(&self, key: K, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = {
            let mut next_id = self.next_id.lock();
            *next_id += 1;
            *next_id
        };

        // Held until the entry is in place, so a finished timer always finds it
        let mut pending = self.pending.lock();

        let registry = self.pending.clone();
        let own_key = key.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;

            let mut pending = registry.lock();
            if pending.get(&own_key).is_some_and(|entry| entry.id == id) {
                pending.remove(&own_key);
            }
        });

        if let Some(previous) = pending.insert(key, Pending { id, handle }) {
            previous.handle.abort();
        }
    }

    /// Returns whether a timer was still pending.
    pub fn cancel(&self, key: &K) -> bool {
        match self.pending.lock().remove(key) {
            Some(entry) => {
                let was_pending = !entry.handle.is_finished();
                entry.handle.abort();
                was_pending
            }
            None => false,
        }
    }

    #[cfg(test)]
    fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_task(counter: &Arc<AtomicUsize>) -> impl Future<Output = ()> + Send + 'static {
        let counter = counter.clone();
        async move {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_the_delay() {
        let timers = AdvanceTimers::new();
        let fired = Arc::new(AtomicUsize::new(0));

        timers.schedule(1, Duration::from_millis(800), counting_task(&fired));

        tokio::time::sleep(Duration::from_millis(799)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(timers.pending_len(), 0);
        assert!(!timers.cancel(&1));
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_the_pending_timer() {
        let timers = AdvanceTimers::new();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        timers.schedule("chat", Duration::from_millis(800), counting_task(&first));
        tokio::time::sleep(Duration::from_millis(400)).await;
        timers.schedule("chat", Duration::from_millis(800), counting_task(&second));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(timers.pending_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fired_timers_do_not_accumulate() {
        let timers = AdvanceTimers::new();
        let fired = Arc::new(AtomicUsize::new(0));

        for chat in 0..50 {
            timers.schedule(chat, Duration::from_millis(800), counting_task(&fired));
        }
        assert_eq!(timers.pending_len(), 50);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 50);
        assert_eq!(timers.pending_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_a_pending_timer() {
        let timers = AdvanceTimers::new();
        let fired = Arc::new(AtomicUsize::new(0));

        timers.schedule(7, Duration::from_millis(800), counting_task(&fired));
        assert!(timers.cancel(&7));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!timers.cancel(&7));
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_independent() {
        let timers = AdvanceTimers::new();
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));

        timers.schedule(1, Duration::from_millis(800), counting_task(&a));
        timers.schedule(2, Duration::from_millis(800), counting_task(&b));
        timers.cancel(&1);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }
}
