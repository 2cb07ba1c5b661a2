//! Aggregation and mapping engine for kubecatalog
//!
//! Turns node, workload and pod records into the deduplicated summary
//! objects of a cluster document. Everything here is synchronous and works
//! on already-fetched snapshots.

mod document;
mod error;
mod nodes;
mod objects;
mod selector;
mod set;
mod workloads;

pub use document::{
    CONNECTOR_TYPE, CONNECTOR_VERSION, DESCRIPTION, DocumentIdentity, LX_VERSION, Ldif, assemble,
    map_cluster, map_nodes,
};
pub use error::{CapacityResource, IdentityField, MapperError, Result};
pub use nodes::{NodeAggregate, aggregate_nodes, format_timestamp};
pub use objects::{ClusterData, KubernetesObject, ObjectData, WorkloadData};
pub use selector::{matches_selector, matching_pods, node_names_for_selector};
pub use set::OrderedStringSet;
pub use workloads::{map_workload, map_workloads};

// Re-export types used in our public API
pub use kubecatalog_types::{ClusterSnapshot, NodeRecord, PodRecord, WorkloadKind, WorkloadRecord};
