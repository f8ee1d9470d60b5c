use futures::{pin_mut, Stream, StreamExt};
use kube::runtime::reflector::{self, ObjectRef};
use kube::runtime::watcher::{self, watcher, Event as WatcherEvent};
use kube::runtime::WatchStreamExt;
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::handler::ResourceEventHandler;
use crate::key::{object_key, ObjectKey};

use super::{Lister, Store};

/// Keeps a reflector store in step with a watch stream and notifies the
/// registered handlers of every change.
pub struct Informer<K>
where
    K: Resource + Clone + 'static,
    K::DynamicType: Eq + Hash + Clone,
{
    reader: reflector::Store<K>,
    writer: reflector::store::Writer<K>,
    started: Arc<AtomicBool>,
    handlers: Vec<Box<dyn ResourceEventHandler<K>>>,
    resync_period: Option<Duration>,
}

impl<K> Informer<K>
where
    K: Resource + Clone + Send + Sync + 'static,
    K::DynamicType: Eq + Hash + Clone + Default,
{
    /// `resync_period` re-delivers every cached object as an update; `None`
    /// disables it.
    pub fn new(resync_period: Option<Duration>) -> Self {
        let (reader, writer) = reflector::store();
        Self {
            reader,
            writer,
            started: Arc::new(AtomicBool::new(false)),
            handlers: vec![],
            resync_period,
        }
    }

    /// Handlers are called in registration order.
    pub fn add_event_handler(&mut self, handler: impl ResourceEventHandler<K> + 'static) {
        self.handlers.push(Box::new(handler));
    }

    pub fn store(&self) -> Store<K> {
        Store::new(self.reader.clone(), Arc::clone(&self.started))
    }

    pub fn lister(&self) -> Lister<K> {
        Lister::new(self.store())
    }

    pub fn apply(&mut self, event: WatcherEvent<K>) {
        match event {
            WatcherEvent::Init => {
                debug!("Relist started");
                self.started.store(true, Ordering::SeqCst);
                self.writer.apply_watcher_event(&WatcherEvent::Init);
            }
            WatcherEvent::InitApply(obj) => match object_key(&obj) {
                Ok(_) => self.writer.apply_watcher_event(&WatcherEvent::InitApply(obj)),
                Err(e) => warn!("Skipping listed object: {e}"),
            },
            WatcherEvent::InitDone => {
                let first_sync = !self.store().has_synced();
                let previous = keyed(self.reader.state());
                self.writer.apply_watcher_event(&WatcherEvent::InitDone);
                self.notify_relist(previous);
                if first_sync {
                    info!("Cache synchronized with {} objects", self.reader.len());
                }
            }
            WatcherEvent::Apply(obj) => {
                if let Err(e) = object_key(&obj) {
                    warn!("Skipping applied object: {e}");
                    return;
                }
                let obj_ref = ObjectRef::from_obj(&obj);
                let old = self.reader.get(&obj_ref);
                self.writer.apply_watcher_event(&WatcherEvent::Apply(obj));
                let Some(new) = self.reader.get(&obj_ref) else {
                    return;
                };
                match old {
                    Some(old) => self.notify_update(&old, &new),
                    None => self.notify_add(&new),
                }
            }
            WatcherEvent::Delete(obj) => {
                if let Err(e) = object_key(&obj) {
                    warn!("Skipping deleted object: {e}");
                    return;
                }
                let last = self
                    .reader
                    .get(&ObjectRef::from_obj(&obj))
                    .unwrap_or_else(|| Arc::new(obj.clone()));
                self.writer.apply_watcher_event(&WatcherEvent::Delete(obj));
                self.notify_delete(&last);
            }
        }
    }

    /// Re-delivers every cached object to the handlers as an update with
    /// identical old and new state.
    pub fn resync(&self) {
        let objects = keyed(self.reader.state());
        debug!("Resyncing {} objects", objects.len());
        for obj in objects.values() {
            self.notify_update(obj, obj);
        }
    }

    /// Drains `stream` into the store until it ends.
    pub async fn run<S>(mut self, stream: S)
    where
        S: Stream<Item = Result<WatcherEvent<K>, watcher::Error>>,
    {
        pin_mut!(stream);
        self.started.store(true, Ordering::SeqCst);
        let store = self.store();
        let mut resync = self.resync_period.map(|period| {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

        loop {
            let synced = store.has_synced();
            tokio::select! {
                event = stream.next() => match event {
                    Some(Ok(event)) => self.apply(event),
                    Some(Err(err)) => log_watch_error(&err),
                    None => {
                        warn!("Watch stream ended");
                        break;
                    }
                },
                _ = tick(&mut resync), if synced => self.resync(),
            }
        }
    }

    /// Runs the informer on its own task against a watch of `api`.
    pub fn spawn(self, api: Api<K>, config: watcher::Config) -> JoinHandle<()>
    where
        K: DeserializeOwned + Debug,
        K::DynamicType: Send + Sync,
    {
        let stream = watcher(api, config).default_backoff();
        tokio::spawn(self.run(stream))
    }

    // Diffs the store against its contents before the relist was swapped in
    fn notify_relist(&self, mut previous: BTreeMap<ObjectKey, Arc<K>>) {
        for (key, obj) in keyed(self.reader.state()) {
            match previous.remove(&key) {
                Some(old) => self.notify_update(&old, &obj),
                None => self.notify_add(&obj),
            }
        }

        // gone while the watch was down
        for obj in previous.values() {
            self.notify_delete(obj);
        }
    }

    fn notify_add(&self, obj: &K) {
        for handler in &self.handlers {
            handler.on_add(obj);
        }
    }

    fn notify_update(&self, old: &K, new: &K) {
        for handler in &self.handlers {
            handler.on_update(old, new);
        }
    }

    fn notify_delete(&self, obj: &K) {
        for handler in &self.handlers {
            handler.on_delete(obj);
        }
    }
}

fn keyed<K: Resource>(objects: Vec<Arc<K>>) -> BTreeMap<ObjectKey, Arc<K>> {
    objects
        .into_iter()
        .filter_map(|obj| object_key(obj.as_ref()).ok().map(|key| (key, obj)))
        .collect()
}

async fn tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

fn log_watch_error(err: &watcher::Error) {
    match err {
        watcher::Error::WatchError(res)
        | watcher::Error::InitialListFailed(kube::Error::Api(res))
            if res.code == 403 =>
        {
            warn!(
                "Watch forbidden: {}. Check if RBAC contains [\"list\", \"watch\"] permissions.",
                res.message
            )
        }
        _ => error!("Error: watcher: {err}"),
    }
}
