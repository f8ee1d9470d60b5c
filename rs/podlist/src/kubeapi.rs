use kube::config::{KubeConfigOptions, Kubeconfig, KubeconfigError};
use kube::{Client, Config};
use shared::env::{home_dir, EnvError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::constant::{KUBECONFIG_DIR, KUBECONFIG_FILE};

#[derive(Debug, Error)]
pub enum KubeApiError {
    #[error("Kubeconfig error: {0}")]
    Kubeconfig(#[from] KubeconfigError),
    #[error("Kubernetes client error: {0}")]
    Client(#[from] kube::Error),
    #[error("Environment error: {0}")]
    Env(#[from] EnvError),
}

pub fn default_kubeconfig_path() -> Result<PathBuf, EnvError> {
    Ok(home_dir()?.join(KUBECONFIG_DIR).join(KUBECONFIG_FILE))
}

/// Reads `path` if given. Otherwise every file listed in `KUBECONFIG` is
/// merged, and without that variable `~/.kube/config` is read.
pub fn read_kubeconfig(path: Option<&Path>) -> Result<Kubeconfig, KubeApiError> {
    if let Some(path) = path {
        debug!("Reading kubeconfig {}", path.display());
        return Ok(Kubeconfig::read_from(path)?);
    }
    if let Some(kubeconfig) = Kubeconfig::from_env()? {
        debug!("Read kubeconfig from KUBECONFIG");
        return Ok(kubeconfig);
    }
    let path = default_kubeconfig_path()?;
    debug!("Reading kubeconfig {}", path.display());
    Ok(Kubeconfig::read_from(path)?)
}

/// Resolves the current context of the kubeconfig found by [`read_kubeconfig`].
pub async fn load_config(path: Option<&Path>) -> Result<Config, KubeApiError> {
    let kubeconfig = read_kubeconfig(path)?;
    let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
    debug!("Loaded kubeconfig for {}", config.cluster_url);
    Ok(config)
}

pub async fn create_client(path: Option<&Path>) -> Result<Client, KubeApiError> {
    let config = load_config(path).await?;
    Ok(Client::try_from(config)?)
}
