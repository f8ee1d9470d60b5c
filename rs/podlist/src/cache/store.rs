use futures::FutureExt;
use kube::runtime::reflector::{self, ObjectRef};
use kube::Resource;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::key::{object_key, ObjectKey};

use super::{CacheError, SyncState};

/// Read handle to the local mirror, a reflector store plus the informer's
/// startup state.
///
/// Cloning produces another handle to the same objects.
pub struct Store<K>
where
    K: Resource + Clone + 'static,
    K::DynamicType: Eq + Hash + Clone,
{
    reader: reflector::Store<K>,
    started: Arc<AtomicBool>,
}

impl<K> Clone for Store<K>
where
    K: Resource + Clone + 'static,
    K::DynamicType: Eq + Hash + Clone,
{
    fn clone(&self) -> Self {
        Self {
            reader: self.reader.clone(),
            started: Arc::clone(&self.started),
        }
    }
}

impl<K> Store<K>
where
    K: Resource + Clone + 'static,
    K::DynamicType: Eq + Hash + Clone + Default,
{
    pub(super) fn new(reader: reflector::Store<K>, started: Arc<AtomicBool>) -> Self {
        Self { reader, started }
    }

    pub fn get(&self, key: &ObjectKey) -> Option<Arc<K>> {
        let obj_ref = match key.split() {
            (Some(namespace), name) => ObjectRef::new(name).within(namespace),
            (None, name) => ObjectRef::new(name),
        };
        self.reader.get(&obj_ref)
    }

    /// Snapshot of every cached object, ordered by key.
    pub fn state(&self) -> Vec<Arc<K>> {
        let mut entries: Vec<(ObjectKey, Arc<K>)> = self
            .reader
            .state()
            .into_iter()
            .filter_map(|obj| object_key(obj.as_ref()).ok().map(|key| (key, obj)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, obj)| obj).collect()
    }

    pub fn len(&self) -> usize {
        self.reader.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reader.is_empty()
    }

    pub fn sync_state(&self) -> SyncState {
        if self.has_synced() {
            SyncState::Synchronized
        } else if self.started.load(Ordering::SeqCst) {
            SyncState::Synchronizing
        } else {
            SyncState::Unsynchronized
        }
    }

    pub fn has_synced(&self) -> bool {
        matches!(self.reader.wait_until_ready().now_or_never(), Some(Ok(())))
    }

    /// Waits until the initial list has been applied. There is no timeout,
    /// this only fails if the informer is dropped before it synchronized.
    pub async fn wait_for_sync(&self) -> Result<(), CacheError> {
        self.reader
            .wait_until_ready()
            .await
            .map_err(|_| CacheError::InformerStopped)
    }
}
