use kube::core::{Selector, SelectorExt};
use kube::Resource;
use std::collections::BTreeMap;

/// Whether the labels of `obj` satisfy `selector`. Objects without labels
/// are matched against an empty label set.
pub fn matches_resource<K: Resource>(selector: &Selector, obj: &K) -> bool {
    if selector.selects_all() {
        return true;
    }
    match &obj.meta().labels {
        Some(labels) => selector.matches(labels),
        None => selector.matches(&BTreeMap::new()),
    }
}
