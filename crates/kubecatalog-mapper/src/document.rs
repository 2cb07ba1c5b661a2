use kubecatalog_types::{ClusterSnapshot, NodeRecord, WorkloadKind};
use serde::Serialize;
use tracing::debug;

use crate::error::{IdentityField, MapperError, Result};
use crate::nodes::aggregate_nodes;
use crate::objects::{ClusterData, KubernetesObject, ObjectData};
use crate::workloads::map_workloads;

pub const CONNECTOR_TYPE: &str = "kubecatalog-connector";
pub const CONNECTOR_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const LX_VERSION: &str = "1.0.0";
pub const DESCRIPTION: &str = "Map Kubernetes objects to catalog fact sheets";

/// Who produced the document and where it goes
#[derive(Clone, Debug, Default)]
pub struct DocumentIdentity {
    pub connector_id: String,
    pub cluster_name: String,
    pub lx_workspace: String,
}

impl DocumentIdentity {
    pub fn new(
        connector_id: impl Into<String>,
        cluster_name: impl Into<String>,
        lx_workspace: impl Into<String>,
    ) -> Self {
        Self {
            connector_id: connector_id.into(),
            cluster_name: cluster_name.into(),
            lx_workspace: lx_workspace.into(),
        }
    }

    /// Fails on the first empty field
    pub fn validate(&self) -> Result<()> {
        let fields = [
            (IdentityField::ConnectorId, &self.connector_id),
            (IdentityField::ClusterName, &self.cluster_name),
            (IdentityField::LxWorkspace, &self.lx_workspace),
        ];
        match fields.into_iter().find(|(_, value)| value.is_empty()) {
            Some((field, _)) => Err(MapperError::MissingIdentity(field)),
            None => Ok(()),
        }
    }
}

/// The cluster document handed to the storage backend
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ldif {
    pub connector_type: String,
    pub connector_id: String,
    pub connector_version: String,
    pub lx_version: String,
    pub lx_workspace: String,
    pub description: String,
    pub content: Vec<KubernetesObject>,
}

impl Ldif {
    /// JSON encoding of the document
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Map the node collection to the cluster-level object
pub fn map_nodes(cluster_name: &str, nodes: &[NodeRecord]) -> Result<KubernetesObject> {
    Ok(KubernetesObject {
        id: cluster_name.to_string(),
        object_type: "cluster".to_string(),
        data: ObjectData::Cluster(ClusterData {
            cluster_name: cluster_name.to_string(),
            nodes: aggregate_nodes(nodes)?,
        }),
    })
}

/// Combine the cluster object and the workload objects, cluster first
pub fn assemble(
    identity: &DocumentIdentity,
    cluster: KubernetesObject,
    workloads: Vec<KubernetesObject>,
) -> Result<Ldif> {
    identity.validate()?;

    let mut content = Vec::with_capacity(workloads.len() + 1);
    content.push(cluster);
    content.extend(workloads);

    Ok(Ldif {
        connector_type: CONNECTOR_TYPE.to_string(),
        connector_id: identity.connector_id.clone(),
        connector_version: CONNECTOR_VERSION.to_string(),
        lx_version: LX_VERSION.to_string(),
        lx_workspace: identity.lx_workspace.clone(),
        description: DESCRIPTION.to_string(),
        content,
    })
}

/// Build the whole document from a snapshot
///
/// Deployments come before statefulsets, each group in snapshot order.
pub fn map_cluster(identity: &DocumentIdentity, snapshot: &ClusterSnapshot) -> Result<Ldif> {
    identity.validate()?;
    let cluster_name = identity.cluster_name.as_str();

    debug!("Map nodes to Kubernetes object");
    let cluster = map_nodes(cluster_name, &snapshot.nodes)?;

    debug!("Map deployments to Kubernetes objects");
    let mut workloads = map_workloads(
        cluster_name,
        snapshot.workloads_of(WorkloadKind::Deployment),
        &snapshot.nodes,
        &snapshot.pods,
    );

    debug!("Map statefulsets to Kubernetes objects");
    workloads.extend(map_workloads(
        cluster_name,
        snapshot.workloads_of(WorkloadKind::StatefulSet),
        &snapshot.nodes,
        &snapshot.pods,
    ));

    assemble(identity, cluster, workloads)
}
