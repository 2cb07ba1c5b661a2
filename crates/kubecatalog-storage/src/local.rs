use std::path::PathBuf;

use tokio::fs;
use tracing::debug;

use crate::{LDIF_FILE_NAME, LOG_FILE_NAME, StorageBackend, StorageError};

/// Writes the artifacts into a local directory
#[derive(Clone, Debug)]
pub struct LocalFileBackend {
    path: PathBuf,
}

impl LocalFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn write(&self, name: &str, content: &[u8]) -> Result<(), StorageError> {
        let path = self.path.join(name);
        fs::write(&path, content).await.map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })?;
        debug!("wrote {} bytes to {}", content.len(), path.display());
        Ok(())
    }
}

impl StorageBackend for LocalFileBackend {
    fn describe(&self) -> String {
        format!("file://{}", self.path.display())
    }

    async fn upload(&self, document: &[u8], log: &[u8]) -> Result<(), StorageError> {
        fs::create_dir_all(&self.path).await.map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.write(LDIF_FILE_NAME, document).await?;
        self.write(LOG_FILE_NAME, log).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upload_writes_both_artifacts() {
        let dir = TempDir::new().unwrap();
        let backend = LocalFileBackend::new(dir.path());

        backend
            .upload(b"{\"content\":[]}", b"log line\n")
            .await
            .unwrap();

        assert_eq!(
            std_fs::read(dir.path().join(LDIF_FILE_NAME)).unwrap(),
            b"{\"content\":[]}"
        );
        assert_eq!(std_fs::read(dir.path().join(LOG_FILE_NAME)).unwrap(), b"log line\n");
    }

    #[tokio::test]
    async fn test_upload_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("nested").join("out");
        let backend = LocalFileBackend::new(&target);

        backend.upload(b"{}", b"").await.unwrap();
        assert!(target.join(LDIF_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_upload_reports_failing_path() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std_fs::write(&blocker, b"x").unwrap();
        let backend = LocalFileBackend::new(&blocker);

        match backend.upload(b"{}", b"").await {
            Err(StorageError::Io { path, .. }) => assert_eq!(path, blocker),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(()) => panic!("upload into a regular file should fail"),
        }
    }
}
