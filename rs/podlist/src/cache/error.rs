use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache has not completed its initial synchronization")]
    NotSynced,
    #[error("informer stopped before the cache was synchronized")]
    InformerStopped,
}
