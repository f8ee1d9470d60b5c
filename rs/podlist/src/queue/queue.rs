use parking_lot::Mutex;
use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use super::RateLimiter;

struct State<T> {
    queue: VecDeque<T>,
    // items waiting to be processed, queued or not
    dirty: HashSet<T>,
    // items handed out by `get` and not yet `done`
    processing: HashSet<T>,
    // delayed items and the earliest time each one is due
    waiting: HashMap<T, Instant>,
    shutting_down: bool,
}

struct Inner<T> {
    state: Mutex<State<T>>,
    notify: Notify,
    rate_limiter: Box<dyn RateLimiter<T>>,
}

/// Deduplicating, rate limited FIFO of keys.
///
/// An item added while it is already queued is dropped. An item added while
/// it is being processed is queued again once `done` is called for it, so one
/// item is never processed concurrently.
pub struct WorkQueue<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> WorkQueue<T>
where
    T: Eq + Hash + Clone + Send + Sync + 'static,
{
    pub fn new(rate_limiter: impl RateLimiter<T> + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    queue: VecDeque::new(),
                    dirty: HashSet::new(),
                    processing: HashSet::new(),
                    waiting: HashMap::new(),
                    shutting_down: false,
                }),
                notify: Notify::new(),
                rate_limiter: Box::new(rate_limiter),
            }),
        }
    }

    pub fn add(&self, item: T) {
        let mut state = self.inner.state.lock();
        if state.shutting_down || state.dirty.contains(&item) {
            return;
        }
        state.dirty.insert(item.clone());
        if state.processing.contains(&item) {
            return;
        }
        state.queue.push_back(item);
        drop(state);
        self.inner.notify.notify_one();
    }

    /// Waits for the next item and marks it as being processed. Returns
    /// `None` once the queue is shut down and drained.
    pub async fn get(&self) -> Option<T> {
        loop {
            let notified = self.inner.notify.notified();
            {
                let mut state = self.inner.state.lock();
                if let Some(item) = state.queue.pop_front() {
                    state.dirty.remove(&item);
                    state.processing.insert(item.clone());
                    return Some(item);
                }
                if state.shutting_down {
                    return None;
                }
            }
            notified.await;
        }
    }

    /// Marks `item` as processed.
    pub fn done(&self, item: &T) {
        let mut state = self.inner.state.lock();
        if !state.processing.remove(item) {
            return;
        }
        if state.dirty.contains(item) {
            state.queue.push_back(item.clone());
            drop(state);
            self.inner.notify.notify_one();
        }
    }

    /// Adds `item` once `delay` has passed. Delayed adds of the same item
    /// coalesce: only the earliest pending one fires.
    pub fn add_after(&self, item: T, delay: Duration) {
        if delay.is_zero() {
            self.add(item);
            return;
        }
        let ready_at = Instant::now() + delay;
        {
            let mut state = self.inner.state.lock();
            if state.shutting_down {
                return;
            }
            if state.waiting.get(&item).is_some_and(|due| *due <= ready_at) {
                return;
            }
            state.waiting.insert(item.clone(), ready_at);
        }

        let queue = self.clone();
        tokio::spawn(async move {
            sleep_until(ready_at).await;
            let due = {
                let mut state = queue.inner.state.lock();
                if state.waiting.get(&item) == Some(&ready_at) {
                    state.waiting.remove(&item);
                    true
                } else {
                    false
                }
            };
            if due {
                queue.add(item);
            }
        });
    }

    pub fn add_rate_limited(&self, item: T) {
        let delay = self.inner.rate_limiter.when(&item);
        self.add_after(item, delay);
    }

    pub fn forget(&self, item: &T) {
        self.inner.rate_limiter.forget(item);
    }

    pub fn num_requeues(&self, item: &T) -> u32 {
        self.inner.rate_limiter.num_requeues(item)
    }

    /// Number of items waiting to be handed out.
    pub fn len(&self) -> usize {
        self.inner.state.lock().queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_shutting_down(&self) -> bool {
        self.inner.state.lock().shutting_down
    }

    /// Closes the queue and wakes every waiting `get`. Returns `false` if the
    /// queue was already shut down.
    pub fn shutdown(&self) -> bool {
        let mut state = self.inner.state.lock();
        if state.shutting_down {
            return false;
        }
        state.shutting_down = true;
        state.waiting.clear();
        debug!("Shutting down work queue with {} pending items", state.queue.len());
        drop(state);
        self.inner.notify.notify_waiters();
        true
    }

    /// Shuts the queue down when the returned guard goes out of scope.
    pub fn shutdown_guard(&self) -> ShutdownGuard<T> {
        ShutdownGuard {
            queue: self.clone(),
        }
    }
}

#[must_use = "the queue is shut down as soon as the guard is dropped"]
pub struct ShutdownGuard<T>
where
    T: Eq + Hash + Clone + Send + Sync + 'static,
{
    queue: WorkQueue<T>,
}

impl<T> Drop for ShutdownGuard<T>
where
    T: Eq + Hash + Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.queue.shutdown();
    }
}
