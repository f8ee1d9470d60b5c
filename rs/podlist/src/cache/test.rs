#[cfg(test)]
mod integration_tests {
    use futures::stream::{self, StreamExt};
    use k8s_openapi::api::core::v1::Pod;
    use kube::core::Selector;
    use kube::runtime::watcher::{self, Event};
    use kube::ResourceExt;
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::timeout;

    use crate::cache::{CacheError, Informer, SyncState};
    use crate::handler::{error_channel, QueueingHandler, ResourceEventHandler, UpdateKeySource};
    use crate::key::ObjectKey;
    use crate::queue::{default_controller_rate_limiter, WorkQueue};
    use crate::selector::parse_selector;

    fn pod(namespace: &str, name: &str, app: &str) -> Pod {
        serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Pod",
            "metadata": {
                "name": name,
                "namespace": namespace,
                "labels": { "app": app },
            },
        }))
        .unwrap()
    }

    fn phase(mut pod: Pod, phase: &str) -> Pod {
        pod.status = Some(serde_json::from_value(json!({ "phase": phase })).unwrap());
        pod
    }

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Recorder {
        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    impl ResourceEventHandler<Pod> for Recorder {
        fn on_add(&self, obj: &Pod) {
            self.0.lock().unwrap().push(format!("add {}", obj.name_any()));
        }

        fn on_update(&self, old: &Pod, new: &Pod) {
            let phase = |pod: &Pod| {
                pod.status
                    .as_ref()
                    .and_then(|status| status.phase.clone())
                    .unwrap_or_default()
            };
            self.0.lock().unwrap().push(format!(
                "update {} {}->{}",
                new.name_any(),
                phase(old),
                phase(new)
            ));
        }

        fn on_delete(&self, obj: &Pod) {
            self.0.lock().unwrap().push(format!("delete {}", obj.name_any()));
        }
    }

    fn initial_sync(informer: &mut Informer<Pod>, pods: Vec<Pod>) {
        informer.apply(Event::Init);
        for pod in pods {
            informer.apply(Event::InitApply(pod));
        }
        informer.apply(Event::InitDone);
    }

    #[test]
    fn test_sync_state_transitions() {
        let mut informer = Informer::<Pod>::new(None);
        let store = informer.store();
        assert_eq!(store.sync_state(), SyncState::Unsynchronized);

        informer.apply(Event::Init);
        assert_eq!(store.sync_state(), SyncState::Synchronizing);

        informer.apply(Event::InitApply(pod("default", "web", "web")));
        assert_eq!(store.sync_state(), SyncState::Synchronizing);
        // buffered until the list is complete
        assert!(store.is_empty());

        informer.apply(Event::InitDone);
        assert_eq!(store.sync_state(), SyncState::Synchronized);
        assert_eq!(store.len(), 1);

        // relists never move the state back
        informer.apply(Event::Init);
        assert_eq!(store.sync_state(), SyncState::Synchronized);
    }

    #[test]
    fn test_initial_sync_notifies_adds() {
        let recorder = Recorder::default();
        let mut informer = Informer::<Pod>::new(None);
        informer.add_event_handler(recorder.clone());

        initial_sync(
            &mut informer,
            vec![pod("default", "b", "web"), pod("default", "a", "web")],
        );
        assert_eq!(recorder.take(), vec!["add a", "add b"]);
    }

    #[test]
    fn test_apply_and_delete_events() {
        let recorder = Recorder::default();
        let mut informer = Informer::<Pod>::new(None);
        informer.add_event_handler(recorder.clone());
        let store = informer.store();
        initial_sync(&mut informer, vec![]);

        informer.apply(Event::Apply(phase(pod("default", "web", "web"), "Pending")));
        informer.apply(Event::Apply(phase(pod("default", "web", "web"), "Running")));
        let key = ObjectKey::new(Some("default"), "web").unwrap();
        let cached = store.get(&key).unwrap();
        assert_eq!(
            cached.status.as_ref().and_then(|s| s.phase.as_deref()),
            Some("Running")
        );

        // the delete notification carries the last known state
        informer.apply(Event::Delete(pod("default", "web", "web")));
        assert!(store.get(&key).is_none());

        assert_eq!(
            recorder.take(),
            vec!["add web", "update web Pending->Running", "delete web"]
        );
    }

    #[test]
    fn test_store_lookup_by_key() {
        let mut informer = Informer::<Pod>::new(None);
        let store = informer.store();
        let mut unscoped = pod("default", "static", "web");
        unscoped.metadata.namespace = None;
        initial_sync(
            &mut informer,
            vec![pod("default", "web", "web"), pod("staging", "web", "db"), unscoped],
        );

        let staging = store
            .get(&"staging/web".parse::<ObjectKey>().unwrap())
            .unwrap();
        assert_eq!(staging.labels().get("app").map(String::as_str), Some("db"));
        assert!(store.get(&"static".parse::<ObjectKey>().unwrap()).is_some());
        assert!(store.get(&"other/web".parse::<ObjectKey>().unwrap()).is_none());

        // snapshots are ordered by key, cluster scoped objects have no prefix
        let keys: Vec<String> = store
            .state()
            .iter()
            .map(|pod| crate::key::object_key(pod.as_ref()).unwrap().to_string())
            .collect();
        assert_eq!(keys, vec!["default/web", "staging/web", "static"]);

        // other handles see the same objects
        let other = store.clone();
        informer.apply(Event::Delete(pod("staging", "web", "db")));
        assert_eq!(other.len(), 2);
    }

    #[test]
    fn test_delete_of_unknown_object_notifies_event_state() {
        let recorder = Recorder::default();
        let mut informer = Informer::<Pod>::new(None);
        informer.add_event_handler(recorder.clone());
        initial_sync(&mut informer, vec![]);

        informer.apply(Event::Delete(phase(pod("default", "web", "web"), "Failed")));
        assert_eq!(recorder.take(), vec!["delete web"]);
        assert!(informer.store().is_empty());
    }

    #[test]
    fn test_relist_replays_changes() {
        let recorder = Recorder::default();
        let mut informer = Informer::<Pod>::new(None);
        informer.add_event_handler(recorder.clone());
        initial_sync(
            &mut informer,
            vec![
                phase(pod("default", "kept", "web"), "Pending"),
                pod("default", "gone", "web"),
            ],
        );
        recorder.take();

        initial_sync(
            &mut informer,
            vec![
                phase(pod("default", "kept", "web"), "Running"),
                pod("default", "new", "web"),
            ],
        );
        assert_eq!(
            recorder.take(),
            vec!["update kept Pending->Running", "add new", "delete gone"]
        );
    }

    #[test]
    fn test_unkeyable_objects_are_skipped() {
        let recorder = Recorder::default();
        let mut informer = Informer::<Pod>::new(None);
        informer.add_event_handler(recorder.clone());
        let store = informer.store();

        let mut nameless = pod("default", "web", "web");
        nameless.metadata.name = None;
        initial_sync(&mut informer, vec![nameless.clone()]);
        informer.apply(Event::Apply(nameless.clone()));
        informer.apply(Event::Delete(nameless));

        assert!(store.is_empty());
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_resync_redelivers_cached_objects() {
        let recorder = Recorder::default();
        let mut informer = Informer::<Pod>::new(None);
        informer.add_event_handler(recorder.clone());
        initial_sync(
            &mut informer,
            vec![phase(pod("default", "web", "web"), "Running")],
        );
        recorder.take();

        informer.resync();
        assert_eq!(recorder.take(), vec!["update web Running->Running"]);
    }

    #[test]
    fn test_lister_requires_sync() {
        let mut informer = Informer::<Pod>::new(None);
        let lister = informer.lister();
        let key = ObjectKey::new(Some("default"), "web").unwrap();

        assert_eq!(lister.list(&Selector::default()), Err(CacheError::NotSynced));
        assert_eq!(lister.get(&key), Err(CacheError::NotSynced));

        informer.apply(Event::Init);
        informer.apply(Event::InitApply(pod("default", "web", "web")));
        assert_eq!(lister.list(&Selector::default()), Err(CacheError::NotSynced));

        informer.apply(Event::InitDone);
        assert!(lister.get(&key).unwrap().is_some());
    }

    #[test]
    fn test_list_everything_returns_mirror() {
        let mut informer = Informer::<Pod>::new(None);
        let lister = informer.lister();
        let store = informer.store();
        initial_sync(
            &mut informer,
            vec![
                pod("default", "web-1", "web"),
                pod("default", "db-1", "db"),
                pod("kube-system", "dns", "dns"),
            ],
        );
        informer.apply(Event::Apply(pod("default", "web-2", "web")));
        informer.apply(Event::Delete(pod("default", "db-1", "db")));

        let names: Vec<String> = lister
            .list(&Selector::default())
            .unwrap()
            .iter()
            .map(|pod| pod.name_any())
            .collect();
        assert_eq!(names, vec!["web-1", "web-2", "dns"]);
        assert_eq!(names.len(), store.len());
    }

    #[test]
    fn test_list_with_selector() {
        let mut informer = Informer::<Pod>::new(None);
        let lister = informer.lister();
        initial_sync(
            &mut informer,
            vec![
                pod("default", "web-1", "web"),
                pod("default", "db-1", "db"),
                pod("staging", "web-1", "web"),
            ],
        );

        let selector = parse_selector("app=web").unwrap();
        let keys: Vec<String> = lister
            .list(&selector)
            .unwrap()
            .iter()
            .map(|pod| format!("{}/{}", pod.namespace().unwrap(), pod.name_any()))
            .collect();
        assert_eq!(keys, vec!["default/web-1", "staging/web-1"]);

        let namespaced = lister.list_namespaced("staging", &selector).unwrap();
        assert_eq!(namespaced.len(), 1);
    }

    #[tokio::test]
    async fn test_wait_for_sync_blocks_until_synchronized() {
        let mut informer = Informer::<Pod>::new(None);
        let lister = informer.lister();
        informer.apply(Event::Init);

        assert!(timeout(Duration::from_millis(50), lister.wait_for_sync())
            .await
            .is_err());

        informer.apply(Event::InitDone);
        timeout(Duration::from_secs(1), lister.wait_for_sync())
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_for_sync_fails_when_informer_is_dropped() {
        let informer = Informer::<Pod>::new(None);
        let store = informer.store();
        drop(informer);
        assert_eq!(store.wait_for_sync().await, Err(CacheError::InformerStopped));
    }

    #[tokio::test]
    async fn test_run_dispatches_keys_to_queue() {
        let queue = WorkQueue::new(default_controller_rate_limiter());
        let (sink, mut errors) = error_channel();
        let mut informer = Informer::<Pod>::new(None);
        informer.add_event_handler(QueueingHandler::new(
            queue.clone(),
            UpdateKeySource::Old,
            sink,
        ));
        let lister = informer.lister();

        let mut nameless = pod("default", "web", "web");
        nameless.metadata.name = None;
        let events: Vec<Result<Event<Pod>, watcher::Error>> = vec![
            Ok(Event::Init),
            Ok(Event::InitApply(pod("default", "web", "web"))),
            Ok(Event::InitApply(pod("default", "db", "db"))),
            Ok(Event::InitDone),
            Ok(Event::Apply(pod("default", "web", "web"))),
            Ok(Event::Delete(pod("default", "db", "db"))),
            Ok(Event::Apply(nameless)),
        ];
        informer.run(stream::iter(events)).await;

        lister.wait_for_sync().await.unwrap();
        assert_eq!(lister.list(&Selector::default()).unwrap().len(), 1);

        // web added then updated, db added then deleted: coalesced to two keys
        let mut keys = vec![];
        while let Some(key) = timeout(Duration::from_millis(50), queue.get())
            .await
            .ok()
            .flatten()
        {
            queue.done(&key);
            keys.push(key.to_string());
        }
        assert_eq!(keys, vec!["default/db", "default/web"]);
        // unkeyable objects never reach the handler
        assert!(errors.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_run_resyncs_periodically() {
        let recorder = Recorder::default();
        let mut informer = Informer::<Pod>::new(Some(Duration::from_millis(20)));
        informer.add_event_handler(recorder.clone());
        let store = informer.store();

        let events: Vec<Result<Event<Pod>, watcher::Error>> = vec![
            Ok(Event::Init),
            Ok(Event::InitApply(pod("default", "web", "web"))),
            Ok(Event::InitDone),
        ];
        let handle = tokio::spawn(informer.run(stream::iter(events).chain(stream::pending())));

        store.wait_for_sync().await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        let recorded = recorder.take();
        assert_eq!(recorded[0], "add web");
        assert!(recorded[1..].iter().all(|r| r == "update web ->"));
        assert!(recorded.len() >= 2, "expected at least one resync: {recorded:?}");
    }
}
