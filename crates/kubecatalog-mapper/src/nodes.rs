use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use kubecatalog_types::{NodeRecord, Quantity, QuantityError};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::{CapacityResource, MapperError, Result};
use crate::set::OrderedStringSet;

const ZONE_LABELS: [&str; 2] = [
    "failure-domain.beta.kubernetes.io/zone",
    "topology.kubernetes.io/zone",
];
const REGION_LABELS: [&str; 2] = [
    "failure-domain.beta.kubernetes.io/region",
    "topology.kubernetes.io/region",
];
const INSTANCE_TYPE_LABELS: [&str; 2] = [
    "beta.kubernetes.io/instance-type",
    "node.kubernetes.io/instance-type",
];

const BYTES_PER_GIB: f64 = (1u64 << 30) as f64;

/// Summary of all nodes of a cluster
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeAggregate {
    pub number_nodes: usize,
    pub availability_zones: Vec<String>,
    /// Region of the first node only
    pub data_center: String,
    pub node_types: Vec<String>,
    #[serde(rename = "memoryCapacityGB")]
    pub memory_capacity_gb: f64,
    pub cpu_capacity: i64,
    pub architecture: Vec<String>,
    pub container_runtime_version: Vec<String>,
    pub kernel_version: Vec<String>,
    pub kubelet_version: Vec<String>,
    pub operating_system: Vec<String>,
    pub os_image: Vec<String>,
    pub labels: BTreeMap<String, Vec<String>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_timestamp"
    )]
    pub first_created_node: Option<DateTime<Utc>>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_timestamp"
    )]
    pub last_created_node: Option<DateTime<Utc>>,
}

/// Reduce a node collection to a single summary
///
/// Returns `None` for an empty collection. A node whose capacity is not an
/// exact integer aborts the whole aggregation.
pub fn aggregate_nodes(nodes: &[NodeRecord]) -> Result<Option<NodeAggregate>> {
    let Some(first) = nodes.first() else {
        return Ok(None);
    };

    let mut availability_zones = OrderedStringSet::new();
    let mut node_types = OrderedStringSet::new();
    let mut architecture = OrderedStringSet::new();
    let mut container_runtime_version = OrderedStringSet::new();
    let mut kernel_version = OrderedStringSet::new();
    let mut kubelet_version = OrderedStringSet::new();
    let mut operating_system = OrderedStringSet::new();
    let mut os_image = OrderedStringSet::new();
    let mut labels: BTreeMap<&str, OrderedStringSet> = BTreeMap::new();
    let mut memory_capacity_gb = 0.0;
    let mut cpu_capacity: i64 = 0;
    let mut first_created_node = first.created_at;
    let mut last_created_node = first.created_at;

    for node in nodes {
        availability_zones.add(well_known_label(node, &ZONE_LABELS));
        node_types.add(well_known_label(node, &INSTANCE_TYPE_LABELS));
        architecture.add(&node.info.architecture);
        container_runtime_version.add(&node.info.container_runtime_version);
        kernel_version.add(&node.info.kernel_version);
        kubelet_version.add(&node.info.kubelet_version);
        operating_system.add(&node.info.operating_system);
        os_image.add(&node.info.os_image);

        for (key, value) in &node.labels {
            labels.entry(key.as_str()).or_default().add(value);
        }

        // Converted per node before summing; the rounding error is accepted
        let memory_bytes = capacity(node, &node.memory_capacity, CapacityResource::Memory)?;
        memory_capacity_gb += memory_bytes as f64 / BYTES_PER_GIB;

        let cores = capacity(node, &node.cpu_capacity, CapacityResource::Cpu)?;
        cpu_capacity = cpu_capacity
            .checked_add(cores)
            .ok_or_else(|| MapperError::CapacityConversion {
                node: node.name.clone(),
                resource: CapacityResource::Cpu,
                source: QuantityError::Overflow(node.cpu_capacity.to_string()),
            })?;

        if let Some(created_at) = node.created_at {
            first_created_node = Some(first_created_node.map_or(created_at, |t| t.min(created_at)));
            last_created_node = Some(last_created_node.map_or(created_at, |t| t.max(created_at)));
        }
    }

    debug!(
        nodes = nodes.len(),
        cpu_capacity, memory_capacity_gb, "aggregated node capacity"
    );

    Ok(Some(NodeAggregate {
        number_nodes: nodes.len(),
        availability_zones: availability_zones.into_items(),
        data_center: well_known_label(first, &REGION_LABELS).to_string(),
        node_types: node_types.into_items(),
        memory_capacity_gb,
        cpu_capacity,
        architecture: architecture.into_items(),
        container_runtime_version: container_runtime_version.into_items(),
        kernel_version: kernel_version.into_items(),
        kubelet_version: kubelet_version.into_items(),
        operating_system: operating_system.into_items(),
        os_image: os_image.into_items(),
        labels: labels
            .into_iter()
            .map(|(key, values)| (key.to_string(), values.into_items()))
            .collect(),
        first_created_node,
        last_created_node,
    }))
}

/// First of the given label keys present on the node, or the empty string
fn well_known_label<'a>(node: &'a NodeRecord, keys: &[&str]) -> &'a str {
    keys.iter()
        .find_map(|key| node.labels.get(*key))
        .map(String::as_str)
        .unwrap_or_default()
}

fn capacity(node: &NodeRecord, quantity: &Quantity, resource: CapacityResource) -> Result<i64> {
    quantity
        .as_i64()
        .map_err(|source| MapperError::CapacityConversion {
            node: node.name.clone(),
            resource,
            source,
        })
}

/// RFC 3339 in UTC with whole seconds, e.g. `2021-03-04T05:06:07Z`
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn serialize_timestamp<S: Serializer>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match value {
        Some(timestamp) => serializer.serialize_str(&format_timestamp(timestamp)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn node(name: &str, memory: &str, cpu: &str, created: (i32, u32, u32)) -> NodeRecord {
        let mut node = NodeRecord::new(name.to_string());
        node.memory_capacity = Quantity::from(memory);
        node.cpu_capacity = Quantity::from(cpu);
        node.created_at = Some(Utc.with_ymd_and_hms(created.0, created.1, created.2, 0, 0, 0).unwrap());
        node.info.architecture = "amd64".to_string();
        node.info.kubelet_version = "v1.29.1".to_string();
        node.info.operating_system = "linux".to_string();
        node
    }

    fn with_labels(mut node: NodeRecord, labels: &[(&str, &str)]) -> NodeRecord {
        for (k, v) in labels {
            node.labels.insert(k.to_string(), v.to_string());
        }
        node
    }

    #[test]
    fn test_empty_collection_is_empty_aggregate() {
        assert!(aggregate_nodes(&[]).unwrap().is_none());
    }

    #[test]
    fn test_counts_and_capacity_sums() {
        let nodes = vec![
            node("node-a", "1Gi", "4", (2021, 1, 1)),
            node("node-b", "1073741824", "8", (2021, 1, 2)),
        ];
        let aggregate = aggregate_nodes(&nodes).unwrap().unwrap();

        assert_eq!(aggregate.number_nodes, 2);
        assert_eq!(aggregate.cpu_capacity, 12);
        assert!((aggregate.memory_capacity_gb - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_categorical_fields_are_distinct_in_first_seen_order() {
        let nodes = vec![
            with_labels(
                node("node-a", "1Gi", "2", (2021, 1, 1)),
                &[
                    ("failure-domain.beta.kubernetes.io/zone", "eu-west-1b"),
                    ("beta.kubernetes.io/instance-type", "m5.large"),
                    ("failure-domain.beta.kubernetes.io/region", "eu-west-1"),
                ],
            ),
            with_labels(
                node("node-b", "1Gi", "2", (2021, 1, 1)),
                &[
                    ("failure-domain.beta.kubernetes.io/zone", "eu-west-1a"),
                    ("beta.kubernetes.io/instance-type", "m5.large"),
                    ("failure-domain.beta.kubernetes.io/region", "us-east-1"),
                ],
            ),
            with_labels(
                node("node-c", "1Gi", "2", (2021, 1, 1)),
                &[("topology.kubernetes.io/zone", "eu-west-1b")],
            ),
        ];
        let aggregate = aggregate_nodes(&nodes).unwrap().unwrap();

        assert_eq!(aggregate.availability_zones, vec!["eu-west-1b", "eu-west-1a"]);
        assert_eq!(aggregate.node_types, vec!["m5.large", ""]);
        assert_eq!(aggregate.architecture, vec!["amd64"]);
        assert_eq!(aggregate.kubelet_version, vec!["v1.29.1"]);
        assert_eq!(aggregate.data_center, "eu-west-1");
    }

    #[test]
    fn test_labels_collect_distinct_values_per_key() {
        let nodes = vec![
            with_labels(node("node-a", "1Gi", "2", (2021, 1, 1)), &[("pool", "blue"), ("gpu", "no")]),
            with_labels(node("node-b", "1Gi", "2", (2021, 1, 1)), &[("pool", "green")]),
            with_labels(node("node-c", "1Gi", "2", (2021, 1, 1)), &[("pool", "blue")]),
        ];
        let aggregate = aggregate_nodes(&nodes).unwrap().unwrap();

        assert_eq!(aggregate.labels["pool"], vec!["blue", "green"]);
        assert_eq!(aggregate.labels["gpu"], vec!["no"]);
        assert_eq!(aggregate.labels.len(), 2);
    }

    #[test]
    fn test_creation_timestamps_bound_every_node() {
        let nodes = vec![
            node("node-a", "1Gi", "2", (2021, 3, 1)),
            node("node-b", "1Gi", "2", (2020, 6, 15)),
            node("node-c", "1Gi", "2", (2022, 1, 9)),
        ];
        let aggregate = aggregate_nodes(&nodes).unwrap().unwrap();
        let first = aggregate.first_created_node.unwrap();
        let last = aggregate.last_created_node.unwrap();

        for n in &nodes {
            let created = n.created_at.unwrap();
            assert!(first <= created && created <= last);
        }
        assert_eq!(format_timestamp(&first), "2020-06-15T00:00:00Z");
        assert_eq!(format_timestamp(&last), "2022-01-09T00:00:00Z");
    }

    #[test]
    fn test_fractional_cpu_aborts_aggregation() {
        let nodes = vec![
            node("node-a", "1Gi", "4", (2021, 1, 1)),
            node("node-b", "1Gi", "500m", (2021, 1, 1)),
        ];
        let err = aggregate_nodes(&nodes).unwrap_err();
        assert!(matches!(
            err,
            MapperError::CapacityConversion {
                resource: CapacityResource::Cpu,
                source: QuantityError::NotInteger(_),
                ..
            }
        ));
    }

    #[test]
    fn test_oversized_memory_aborts_aggregation() {
        let nodes = vec![node("node-a", "100Ei", "4", (2021, 1, 1))];
        let err = aggregate_nodes(&nodes).unwrap_err();
        match err {
            MapperError::CapacityConversion { node, resource, .. } => {
                assert_eq!(node, "node-a");
                assert_eq!(resource, CapacityResource::Memory);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_serialized_field_names() {
        let nodes = vec![node("node-a", "1Gi", "4", (2021, 3, 4))];
        let aggregate = aggregate_nodes(&nodes).unwrap().unwrap();
        let json = serde_json::to_value(&aggregate).unwrap();

        assert_eq!(json["numberNodes"], 1);
        assert_eq!(json["cpuCapacity"], 4);
        assert_eq!(json["memoryCapacityGB"], 1.0);
        assert_eq!(json["firstCreatedNode"], "2021-03-04T00:00:00Z");
        assert_eq!(json["containerRuntimeVersion"], serde_json::json!([""]));
        assert!(json.get("osImage").is_some());
    }
}
