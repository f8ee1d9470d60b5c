use shared::tracing::TracingSetupError;

use crate::cache::CacheError;
use crate::kubeapi::KubeApiError;

#[derive(Debug, thiserror::Error)]
pub enum PodListError {
    #[error("Tracing setup error: {0}")]
    TracingSetup(#[from] TracingSetupError),
    #[error("Kubernetes API error: {0}")]
    KubeApi(#[from] KubeApiError),
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}
