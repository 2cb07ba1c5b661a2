//! Storage backends for kubecatalog
//!
//! A backend receives the encoded cluster document together with the debug
//! log of the run and persists both under fixed artifact names.

mod azure;
mod local;

use std::fmt;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

pub use azure::{AzureBlobBackend, AzureBlobOptions};
pub use local::LocalFileBackend;

/// Artifact name of the cluster document
pub const LDIF_FILE_NAME: &str = "kubernetes-ldif.json";

/// Artifact name of the debug log
pub const LOG_FILE_NAME: &str = "kubecatalog-connector.log";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to upload blob '{name}'")]
    Blob {
        name: String,
        #[source]
        source: object_store::Error,
    },

    #[error("{0} must be set for the azureblob storage backend")]
    MissingSetting(&'static str),
}

/// Destination for the produced artifacts
pub trait StorageBackend {
    /// Human readable target, used in log output
    fn describe(&self) -> String;

    /// Persist the document and the debug log
    fn upload(
        &self,
        document: &[u8],
        log: &[u8],
    ) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Which backend a run writes to
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    File,
    AzureBlob,
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "file" => Ok(Self::File),
            "azureblob" => Ok(Self::AzureBlob),
            other => Err(format!(
                "unknown storage backend '{}' (expected file or azureblob)",
                other
            )),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::AzureBlob => f.write_str("azureblob"),
        }
    }
}

/// The configured backend
pub enum Backend {
    LocalFile(LocalFileBackend),
    AzureBlob(AzureBlobBackend),
}

impl Backend {
    pub fn new(
        kind: BackendKind,
        azure: &AzureBlobOptions,
        local_path: &Path,
    ) -> Result<Self, StorageError> {
        match kind {
            BackendKind::File => Ok(Self::LocalFile(LocalFileBackend::new(local_path))),
            BackendKind::AzureBlob => Ok(Self::AzureBlob(AzureBlobBackend::new(azure)?)),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::LocalFile(_) => BackendKind::File,
            Self::AzureBlob(_) => BackendKind::AzureBlob,
        }
    }
}

impl StorageBackend for Backend {
    fn describe(&self) -> String {
        match self {
            Self::LocalFile(backend) => backend.describe(),
            Self::AzureBlob(backend) => backend.describe(),
        }
    }

    async fn upload(&self, document: &[u8], log: &[u8]) -> Result<(), StorageError> {
        match self {
            Self::LocalFile(backend) => backend.upload(document, log).await,
            Self::AzureBlob(backend) => backend.upload(document, log).await,
        }
    }
}
