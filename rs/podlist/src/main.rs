use clap::Parser;
use k8s_openapi::api::core::v1::Pod;
use kube::runtime::watcher;
use kube::{Api, ResourceExt};
use podlist::{
    cache::Informer,
    config::Args,
    error::PodListError,
    handler::{error_channel, log_dispatch_errors, QueueingHandler},
    kubeapi::create_client,
    queue::{default_controller_rate_limiter, WorkQueue},
};
use shared::tracing::setup_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), PodListError> {
    setup_tracing()?;
    let args = Args::parse();

    let client = create_client(args.kubeconfig.as_deref()).await?;
    let api: Api<Pod> = match &args.namespace {
        Some(namespace) => Api::namespaced(client, namespace),
        None => Api::all(client),
    };

    // Nothing drains the queue, it only collects keys until exit
    let queue = WorkQueue::new(default_controller_rate_limiter());
    let _queue_guard = queue.shutdown_guard();

    let (error_sink, errors) = error_channel();
    tokio::spawn(log_dispatch_errors(errors));

    let mut informer = Informer::<Pod>::new(args.resync_period());
    informer.add_event_handler(QueueingHandler::new(queue.clone(), args.update_key, error_sink));
    let lister = informer.lister();
    let informer_handle = informer.spawn(api, watcher::Config::default());

    info!("Waiting for the Pod cache to synchronize");
    lister.wait_for_sync().await?;

    let pods = lister.list(&args.selector)?;
    for (i, pod) in pods.iter().enumerate() {
        println!("[Pod Name {i}] {}", pod.name_any());
    }

    informer_handle.abort();
    info!("Listed {} pods, {} keys left in the queue", pods.len(), queue.len());
    Ok(())
}
