use std::time::Duration;

pub const KUBECONFIG_DIR: &str = ".kube";
pub const KUBECONFIG_FILE: &str = "config";

// Informer resync, matches the shared informer factory default of the cluster tooling
pub const DEFAULT_RESYNC_PERIOD_SECS: u64 = 30;

// Per-item exponential failure backoff
pub const FAILURE_BASE_DELAY: Duration = Duration::from_millis(5);
pub const FAILURE_MAX_DELAY: Duration = Duration::from_secs(1000);

// Overall token bucket
pub const BUCKET_QPS: f64 = 10.0;
pub const BUCKET_BURST: u32 = 100;
