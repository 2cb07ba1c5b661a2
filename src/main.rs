use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};

use kubecatalog_k8s::KubeClient;
use kubecatalog_mapper::{CONNECTOR_VERSION, LX_VERSION, map_cluster};
use kubecatalog_storage::{LDIF_FILE_NAME, StorageBackend};

mod config;
mod log_capture;

use config::{Args, Settings};
use log_capture::LogCapture;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Run the connector
    let result = run_connector(args).await;

    // Handle any errors
    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run_connector(args: Args) -> Result<()> {
    let settings = Settings::load(args)?;

    let capture = LogCapture::new();
    log_capture::init(settings.verbose, capture.clone());

    info!("----------Start----------");
    info!("Connector version: {}", CONNECTOR_VERSION);
    info!("Integration version: {}", LX_VERSION);
    info!("Target workspace: {}", settings.identity.lx_workspace);
    info!(
        "Target Kubernetes cluster name: {}",
        settings.identity.cluster_name
    );

    // Fail before talking to the API server
    settings.identity.validate()?;
    let backend = settings.backend()?;

    let kube_client = KubeClient::new().await?;
    info!("Namespace blacklist: {:?}", settings.blacklisted_namespaces);

    let snapshot = kube_client
        .snapshot(&settings.blacklisted_namespaces)
        .await?;
    let ldif = map_cluster(&settings.identity, &snapshot)?;

    debug!("Marshal ldif");
    let document = ldif.to_json()?;

    upload(&backend, &document, &capture).await
}

async fn upload(
    backend: &impl StorageBackend,
    document: &[u8],
    capture: &LogCapture,
) -> Result<()> {
    info!("Upload {} to {}", LDIF_FILE_NAME, backend.describe());
    info!("-----------End-----------");
    backend.upload(document, &capture.contents()).await?;
    Ok(())
}
