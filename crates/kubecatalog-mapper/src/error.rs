use std::fmt;

use kubecatalog_types::QuantityError;
use thiserror::Error;

/// Node capacity that failed to convert
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapacityResource {
    Memory,
    Cpu,
}

impl fmt::Display for CapacityResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Cpu => f.write_str("cpu"),
        }
    }
}

/// Envelope identity fields the document cannot be built without
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentityField {
    ConnectorId,
    ClusterName,
    LxWorkspace,
}

impl fmt::Display for IdentityField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectorId => f.write_str("connector id"),
            Self::ClusterName => f.write_str("cluster name"),
            Self::LxWorkspace => f.write_str("workspace"),
        }
    }
}

#[derive(Debug, Error)]
pub enum MapperError {
    #[error("failed to convert {resource} capacity of node '{node}' to an integer")]
    CapacityConversion {
        node: String,
        resource: CapacityResource,
        #[source]
        source: QuantityError,
    },

    #[error("{0} must be set")]
    MissingIdentity(IdentityField),

    #[error("failed to serialize document")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MapperError>;
