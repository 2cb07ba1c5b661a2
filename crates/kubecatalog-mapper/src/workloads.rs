use kubecatalog_types::{NodeRecord, PodRecord, WorkloadRecord};
use tracing::debug;

use crate::objects::{KubernetesObject, ObjectData, WorkloadData};
use crate::selector::node_names_for_selector;
use crate::set::OrderedStringSet;

/// Map workloads to catalog objects, keeping input order
pub fn map_workloads<'a>(
    cluster_name: &str,
    workloads: impl IntoIterator<Item = &'a WorkloadRecord>,
    nodes: &[NodeRecord],
    pods: &[PodRecord],
) -> Vec<KubernetesObject> {
    workloads
        .into_iter()
        .map(|workload| map_workload(cluster_name, workload, nodes, pods))
        .collect()
}

/// Map a single workload together with the nodes its pods run on
pub fn map_workload(
    cluster_name: &str,
    workload: &WorkloadRecord,
    nodes: &[NodeRecord],
    pods: &[PodRecord],
) -> KubernetesObject {
    let node_names = running_nodes(workload, nodes, pods);
    debug!(
        kind = workload.kind.as_str(),
        namespace = %workload.namespace,
        name = %workload.name,
        nodes = node_names.len(),
        "mapped workload"
    );

    KubernetesObject {
        id: format!("{}_{}", workload.namespace, workload.name),
        object_type: workload.kind.as_str().to_string(),
        data: ObjectData::Workload(WorkloadData {
            cluster_name: cluster_name.to_string(),
            name: workload.name.clone(),
            namespace: workload.namespace.clone(),
            labels: workload.labels.clone(),
            replicas: workload.replicas,
            ready_replicas: workload.ready_replicas,
            nodes: node_names,
        }),
    }
}

/// Names of known nodes hosting the workload's pods, in node list order
fn running_nodes(workload: &WorkloadRecord, nodes: &[NodeRecord], pods: &[PodRecord]) -> Vec<String> {
    let matched = node_names_for_selector(&workload.selector, pods);
    let scheduled: OrderedStringSet = matched
        .items()
        .iter()
        .map(String::as_str)
        .filter(|name| !name.is_empty())
        .collect();

    nodes
        .iter()
        .filter(|node| scheduled.contains(&node.name))
        .map(|node| node.name.clone())
        .collect()
}
