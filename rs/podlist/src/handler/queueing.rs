use clap::ValueEnum;
use kube::Resource;
use std::fmt;
use tracing::{info, warn};

use crate::key::{object_key, ObjectKey};
use crate::queue::WorkQueue;

use super::{DispatchError, ErrorSink, ResourceEventHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Added,
    Updated,
    Deleted,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Added => "Added",
            Self::Updated => "Updated",
            Self::Deleted => "Deleted",
        };
        write!(f, "{}", name)
    }
}

/// Which side of an update the queued key is derived from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum UpdateKeySource {
    /// The object state before the update
    #[default]
    Old,
    /// The object state after the update
    New,
}

/// Turns mirror changes into identity keys on the work queue.
pub struct QueueingHandler {
    queue: WorkQueue<ObjectKey>,
    update_key: UpdateKeySource,
    errors: ErrorSink,
}

impl QueueingHandler {
    pub fn new(queue: WorkQueue<ObjectKey>, update_key: UpdateKeySource, errors: ErrorSink) -> Self {
        Self {
            queue,
            update_key,
            errors,
        }
    }

    fn dispatch<K: Resource>(&self, action: Action, obj: &K) {
        match object_key(obj) {
            Ok(key) => {
                self.queue.add(key.clone());
                info!("{action}:{key}");
            }
            Err(source) => {
                if self.errors.send(DispatchError { action, source }).is_err() {
                    warn!("Error sink closed, dropped {action} event without a key");
                }
            }
        }
    }
}

impl<K: Resource> ResourceEventHandler<K> for QueueingHandler {
    fn on_add(&self, obj: &K) {
        self.dispatch(Action::Added, obj);
    }

    fn on_update(&self, old: &K, new: &K) {
        let obj = match self.update_key {
            UpdateKeySource::Old => old,
            UpdateKeySource::New => new,
        };
        self.dispatch(Action::Updated, obj);
    }

    fn on_delete(&self, obj: &K) {
        self.dispatch(Action::Deleted, obj);
    }
}
