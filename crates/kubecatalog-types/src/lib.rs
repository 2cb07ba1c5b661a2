//! Shared types for kubecatalog
//!
//! This crate contains the plain resource records handed from the cluster
//! reader to the mapper, decoupled from the Kubernetes API object types.

mod quantity;

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

pub use quantity::{Quantity, QuantityError};

// ============================================================================
// Node Records
// ============================================================================

/// Status information reported by the kubelet of a node
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeSystemInfo {
    pub architecture: String,
    pub container_runtime_version: String,
    pub kernel_version: String,
    pub kubelet_version: String,
    pub operating_system: String,
    pub os_image: String,
}

/// Node information
#[derive(Clone, Debug)]
pub struct NodeRecord {
    pub name: String,
    pub labels: BTreeMap<String, String>,
    pub info: NodeSystemInfo,
    pub memory_capacity: Quantity,
    pub cpu_capacity: Quantity,
    pub created_at: Option<DateTime<Utc>>,
}

impl NodeRecord {
    pub fn new(name: String) -> Self {
        Self {
            name,
            labels: BTreeMap::new(),
            info: NodeSystemInfo::default(),
            memory_capacity: Quantity::default(),
            cpu_capacity: Quantity::default(),
            created_at: None,
        }
    }
}

// ============================================================================
// Workload Records
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    Deployment,
    StatefulSet,
}

impl WorkloadKind {
    /// Object type name used in the catalog document
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deployment => "deployment",
            Self::StatefulSet => "statefulSet",
        }
    }
}

/// Deployment or statefulset information
#[derive(Clone, Debug)]
pub struct WorkloadRecord {
    pub kind: WorkloadKind,
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
    pub ready_replicas: i32,
    pub labels: BTreeMap<String, String>,
    /// `matchLabels` of the pod selector
    pub selector: BTreeMap<String, String>,
}

impl WorkloadRecord {
    pub fn new(kind: WorkloadKind, name: String, namespace: String) -> Self {
        Self {
            kind,
            name,
            namespace,
            replicas: 0,
            ready_replicas: 0,
            labels: BTreeMap::new(),
            selector: BTreeMap::new(),
        }
    }
}

// ============================================================================
// Pod Records
// ============================================================================

/// Pod information
#[derive(Clone, Debug)]
pub struct PodRecord {
    pub name: String,
    pub namespace: String,
    pub labels: BTreeMap<String, String>,
    /// Empty while the pod is not scheduled
    pub node_name: String,
}

impl PodRecord {
    pub fn new(name: String, namespace: String) -> Self {
        Self {
            name,
            namespace,
            labels: BTreeMap::new(),
            node_name: String::new(),
        }
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// Point-in-time view of the resources the mapper works on
#[derive(Clone, Debug, Default)]
pub struct ClusterSnapshot {
    pub nodes: Vec<NodeRecord>,
    pub workloads: Vec<WorkloadRecord>,
    pub pods: Vec<PodRecord>,
}

impl ClusterSnapshot {
    /// Workloads of one kind, in snapshot order
    pub fn workloads_of(&self, kind: WorkloadKind) -> impl Iterator<Item = &WorkloadRecord> {
        self.workloads.iter().filter(move |w| w.kind == kind)
    }
}
