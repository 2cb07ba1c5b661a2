use anyhow::{Context, Result};
use k8s_openapi::api::apps::v1::{Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{Node, Pod};
use kube::Api;
use kube::api::ListParams;
use tracing::debug;

use kubecatalog_types::{
    ClusterSnapshot, NodeRecord, NodeSystemInfo, PodRecord, Quantity, WorkloadKind,
    WorkloadRecord,
};

/// Kubernetes client wrapper
pub struct KubeClient {
    client: kube::Client,
}

impl KubeClient {
    /// Create a new KubeClient, preferring the in-cluster service account
    /// and falling back to the local kubeconfig
    pub async fn new() -> Result<Self> {
        let config = kube::Config::infer()
            .await
            .context("Failed to load kube config. Running in Kubernetes?")?;
        debug!("Kubernetes master from config: {}", config.cluster_url);

        let client = kube::Client::try_from(config).context("Failed to create client")?;
        Ok(Self { client })
    }

    /// Fetch everything the mapper needs, skipping blacklisted namespaces
    pub async fn snapshot(&self, blacklisted_namespaces: &[String]) -> Result<ClusterSnapshot> {
        let selector = blacklist_field_selector(blacklisted_namespaces);
        let params = ListParams::default().fields(&selector);

        debug!("Get deployment list...");
        let mut workloads = self.get_deployments(&params).await?;
        debug!("Get statefulset list...");
        workloads.extend(self.get_statefulsets(&params).await?);
        debug!("Get pod list...");
        let pods = self.get_pods(&params).await?;
        debug!("Listing nodes...");
        let nodes = self.get_nodes().await?;

        debug!(
            nodes = nodes.len(),
            workloads = workloads.len(),
            pods = pods.len(),
            "Cluster snapshot done."
        );

        Ok(ClusterSnapshot {
            nodes,
            workloads,
            pods,
        })
    }

    /// Fetch all worker nodes
    pub async fn get_nodes(&self) -> Result<Vec<NodeRecord>> {
        let nodes: Api<Node> = Api::all(self.client.clone());
        let list = nodes
            .list(&ListParams::default())
            .await
            .context("Failed to list nodes")?;

        Ok(list.items.into_iter().map(node_to_record).collect())
    }

    /// Fetch deployments in all namespaces matching the field selector
    pub async fn get_deployments(&self, params: &ListParams) -> Result<Vec<WorkloadRecord>> {
        let deployments: Api<Deployment> = Api::all(self.client.clone());
        let list = deployments
            .list(params)
            .await
            .context("Failed to list deployments")?;

        Ok(list.items.into_iter().map(deployment_to_record).collect())
    }

    /// Fetch statefulsets in all namespaces matching the field selector
    pub async fn get_statefulsets(&self, params: &ListParams) -> Result<Vec<WorkloadRecord>> {
        let statefulsets: Api<StatefulSet> = Api::all(self.client.clone());
        let list = statefulsets
            .list(params)
            .await
            .context("Failed to list statefulsets")?;

        Ok(list.items.into_iter().map(statefulset_to_record).collect())
    }

    /// Fetch pods in all namespaces matching the field selector
    pub async fn get_pods(&self, params: &ListParams) -> Result<Vec<PodRecord>> {
        let pods: Api<Pod> = Api::all(self.client.clone());
        let list = pods.list(params).await.context("Failed to list pods")?;

        Ok(list.items.into_iter().map(pod_to_record).collect())
    }
}

/// Field selector excluding every blacklisted namespace
///
/// Blank entries are ignored; no entries means no filtering.
pub fn blacklist_field_selector(namespaces: &[String]) -> String {
    namespaces
        .iter()
        .map(|ns| ns.trim())
        .filter(|ns| !ns.is_empty())
        .map(|ns| format!("metadata.namespace!={}", ns))
        .collect::<Vec<_>>()
        .join(",")
}

/// Convert a k8s Node to NodeRecord
fn node_to_record(node: Node) -> NodeRecord {
    let mut record = NodeRecord::new(node.metadata.name.unwrap_or_default());
    record.labels = node.metadata.labels.unwrap_or_default();
    record.created_at = node.metadata.creation_timestamp.map(|t| t.0);

    if let Some(status) = node.status {
        if let Some(info) = status.node_info {
            record.info = NodeSystemInfo {
                architecture: info.architecture,
                container_runtime_version: info.container_runtime_version,
                kernel_version: info.kernel_version,
                kubelet_version: info.kubelet_version,
                operating_system: info.operating_system,
                os_image: info.os_image,
            };
        }

        if let Some(capacity) = status.capacity {
            if let Some(memory) = capacity.get("memory") {
                record.memory_capacity = Quantity::new(memory.0.clone());
            }
            if let Some(cpu) = capacity.get("cpu") {
                record.cpu_capacity = Quantity::new(cpu.0.clone());
            }
        }
    }

    record
}

/// Convert a k8s Deployment to WorkloadRecord
fn deployment_to_record(deploy: Deployment) -> WorkloadRecord {
    let mut record = WorkloadRecord::new(
        WorkloadKind::Deployment,
        deploy.metadata.name.unwrap_or_default(),
        deploy.metadata.namespace.unwrap_or_default(),
    );
    record.labels = deploy.metadata.labels.unwrap_or_default();

    if let Some(spec) = deploy.spec {
        record.replicas = spec.replicas.unwrap_or(0);
        record.selector = spec.selector.match_labels.unwrap_or_default();
    }

    if let Some(status) = deploy.status {
        record.ready_replicas = status.ready_replicas.unwrap_or(0);
    }

    record
}

/// Convert a k8s StatefulSet to WorkloadRecord
fn statefulset_to_record(sts: StatefulSet) -> WorkloadRecord {
    let mut record = WorkloadRecord::new(
        WorkloadKind::StatefulSet,
        sts.metadata.name.unwrap_or_default(),
        sts.metadata.namespace.unwrap_or_default(),
    );
    record.labels = sts.metadata.labels.unwrap_or_default();

    if let Some(spec) = sts.spec {
        record.replicas = spec.replicas.unwrap_or(0);
        record.selector = spec.selector.match_labels.unwrap_or_default();
    }

    if let Some(status) = sts.status {
        record.ready_replicas = status.ready_replicas.unwrap_or(0);
    }

    record
}

/// Convert a k8s Pod to PodRecord
fn pod_to_record(pod: Pod) -> PodRecord {
    let mut record = PodRecord::new(
        pod.metadata.name.unwrap_or_default(),
        pod.metadata.namespace.unwrap_or_default(),
    );
    record.labels = pod.metadata.labels.unwrap_or_default();
    record.node_name = pod.spec.and_then(|s| s.node_name).unwrap_or_default();
    record
}
