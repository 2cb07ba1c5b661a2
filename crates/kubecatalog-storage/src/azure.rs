use object_store::azure::{MicrosoftAzure, MicrosoftAzureBuilder};
use object_store::path::Path as BlobPath;
use object_store::{ObjectStore, PutPayload};
use tracing::debug;

use crate::{LDIF_FILE_NAME, LOG_FILE_NAME, StorageBackend, StorageError};

/// Storage account credentials and target container
#[derive(Clone, Debug, Default)]
pub struct AzureBlobOptions {
    pub account_name: String,
    pub account_key: String,
    pub container: String,
}

/// Uploads the artifacts as blobs into an Azure storage container
pub struct AzureBlobBackend {
    store: MicrosoftAzure,
    account_name: String,
    container: String,
}

impl AzureBlobBackend {
    pub fn new(options: &AzureBlobOptions) -> Result<Self, StorageError> {
        let required = [
            ("azure-account-name", &options.account_name),
            ("azure-account-key", &options.account_key),
            ("azure-container", &options.container),
        ];
        if let Some((setting, _)) = required.into_iter().find(|(_, value)| value.is_empty()) {
            return Err(StorageError::MissingSetting(setting));
        }

        let store = MicrosoftAzureBuilder::new()
            .with_account(&options.account_name)
            .with_access_key(&options.account_key)
            .with_container_name(&options.container)
            .build()
            .map_err(|source| StorageError::Blob {
                name: options.container.clone(),
                source,
            })?;

        Ok(Self {
            store,
            account_name: options.account_name.clone(),
            container: options.container.clone(),
        })
    }

    async fn put(&self, name: &str, content: &[u8]) -> Result<(), StorageError> {
        self.store
            .put(&BlobPath::from(name), PutPayload::from(content.to_vec()))
            .await
            .map_err(|source| StorageError::Blob {
                name: name.to_string(),
                source,
            })?;
        debug!("uploaded {} bytes to blob {}", content.len(), name);
        Ok(())
    }
}

impl StorageBackend for AzureBlobBackend {
    fn describe(&self) -> String {
        format!("azureblob://{}/{}", self.account_name, self.container)
    }

    async fn upload(&self, document: &[u8], log: &[u8]) -> Result<(), StorageError> {
        self.put(LDIF_FILE_NAME, document).await?;
        self.put(LOG_FILE_NAME, log).await
    }
}
