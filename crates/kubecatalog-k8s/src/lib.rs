//! Kubernetes cluster reader for kubecatalog
//!
//! This crate lists nodes, deployments, statefulsets and pods and converts
//! them into the records the mapper works on.

mod client;

pub use client::{KubeClient, blacklist_field_selector};

// Re-export types that are used in our public API
pub use kubecatalog_types::{ClusterSnapshot, NodeRecord, PodRecord, WorkloadKind, WorkloadRecord};
