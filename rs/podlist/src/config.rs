use clap::Parser;
use kube::core::Selector;
use std::path::PathBuf;
use std::time::Duration;

use crate::constant::DEFAULT_RESYNC_PERIOD_SECS;
use crate::handler::UpdateKeySource;
use crate::selector::parse_selector;

/// List the Pods of a cluster from a watch-backed local cache.
#[derive(Debug, Parser)]
#[command(name = "podlist", version)]
pub struct Args {
    /// Kubeconfig file. Without it the KUBECONFIG list is merged, then
    /// ~/.kube/config is read
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Only watch Pods of this namespace
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Label selector applied to the listing
    #[arg(short = 'l', long, default_value = "", value_parser = parse_selector)]
    pub selector: Selector,

    /// Seconds between resyncs of the cache, 0 disables resyncing
    #[arg(long, default_value_t = DEFAULT_RESYNC_PERIOD_SECS)]
    pub resync_period: u64,

    /// Object an update event derives its queue key from
    #[arg(long, value_enum, default_value_t = UpdateKeySource::Old)]
    pub update_key: UpdateKeySource,
}

impl Args {
    pub fn resync_period(&self) -> Option<Duration> {
        match self.resync_period {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}
