use std::collections::BTreeMap;

use serde::Serialize;

use crate::nodes::NodeAggregate;

/// One entry of the document content list
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KubernetesObject {
    pub id: String,
    #[serde(rename = "type")]
    pub object_type: String,
    pub data: ObjectData,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ObjectData {
    Cluster(ClusterData),
    Workload(WorkloadData),
}

/// Cluster-level data; the node summary is absent for a cluster without nodes
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterData {
    pub cluster_name: String,
    #[serde(flatten)]
    pub nodes: Option<NodeAggregate>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadData {
    pub cluster_name: String,
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    pub replicas: i32,
    pub ready_replicas: i32,
    /// Names of the nodes running at least one of the workload's pods
    pub nodes: Vec<String>,
}

impl KubernetesObject {
    pub fn as_workload(&self) -> Option<&WorkloadData> {
        match &self.data {
            ObjectData::Workload(data) => Some(data),
            ObjectData::Cluster(_) => None,
        }
    }

    pub fn as_cluster(&self) -> Option<&ClusterData> {
        match &self.data {
            ObjectData::Cluster(data) => Some(data),
            ObjectData::Workload(_) => None,
        }
    }
}
