use kube::core::Selector;
use kube::Resource;
use std::hash::Hash;
use std::sync::Arc;

use crate::key::ObjectKey;
use crate::selector::matches_resource;

use super::{CacheError, Store};

/// Read-only, label filtered queries over the local mirror.
///
/// Every query fails until the mirror has synchronized once.
pub struct Lister<K>
where
    K: Resource + Clone + 'static,
    K::DynamicType: Eq + Hash + Clone,
{
    store: Store<K>,
}

impl<K> Clone for Lister<K>
where
    K: Resource + Clone + 'static,
    K::DynamicType: Eq + Hash + Clone,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<K> Lister<K>
where
    K: Resource + Clone + 'static,
    K::DynamicType: Eq + Hash + Clone + Default,
{
    pub fn new(store: Store<K>) -> Self {
        Self { store }
    }

    pub async fn wait_for_sync(&self) -> Result<(), CacheError> {
        self.store.wait_for_sync().await
    }

    /// All objects matching `selector`, ordered by key.
    pub fn list(&self, selector: &Selector) -> Result<Vec<Arc<K>>, CacheError> {
        self.ensure_synced()?;
        Ok(self
            .store
            .state()
            .into_iter()
            .filter(|obj| matches_resource(selector, obj.as_ref()))
            .collect())
    }

    pub fn list_namespaced(
        &self,
        namespace: &str,
        selector: &Selector,
    ) -> Result<Vec<Arc<K>>, CacheError> {
        Ok(self
            .list(selector)?
            .into_iter()
            .filter(|obj| obj.meta().namespace.as_deref() == Some(namespace))
            .collect())
    }

    pub fn get(&self, key: &ObjectKey) -> Result<Option<Arc<K>>, CacheError> {
        self.ensure_synced()?;
        Ok(self.store.get(key))
    }

    fn ensure_synced(&self) -> Result<(), CacheError> {
        if self.store.has_synced() {
            Ok(())
        } else {
            Err(CacheError::NotSynced)
        }
    }
}
