//! Run settings
//!
//! Values come from command line flags, their environment variable
//! counterparts (`CLUSTERNAME`, `CONNECTOR_ID`, ...) and an optional TOML
//! file. Flags and environment win over the file. Boolean environment values
//! accept the usual spellings (`1`, `true`, `yes`, `on`, and their negatives).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::BoolishValueParser;
use serde::Deserialize;

use kubecatalog_mapper::DocumentIdentity;
use kubecatalog_storage::{AzureBlobOptions, Backend, BackendKind, StorageError};

/// kubecatalog - Inventory a Kubernetes cluster into a catalog document
#[derive(Parser, Debug, Default)]
#[command(name = "kubecatalog")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Unique name of the Kubernetes cluster
    #[arg(long, env = "CLUSTERNAME")]
    pub clustername: Option<String>,

    /// Unique id of this connector instance
    #[arg(long, env = "CONNECTOR_ID")]
    pub connector_id: Option<String>,

    /// Name of the workspace the data is sent to
    #[arg(long, env = "LX_WORKSPACE")]
    pub lx_workspace: Option<String>,

    /// Namespaces that are not scanned
    #[arg(long, env = "BLACKLIST_NAMESPACES", value_delimiter = ',')]
    pub blacklist_namespaces: Option<Vec<String>>,

    /// Where the document and log are stored: file or azureblob
    #[arg(long, env = "STORAGE_BACKEND", value_name = "BACKEND")]
    pub storage_backend: Option<BackendKind>,

    /// Directory the document and log are written to (file backend)
    #[arg(long, env = "LOCAL_FILE_PATH")]
    pub local_file_path: Option<PathBuf>,

    /// Storage account name (azureblob backend)
    #[arg(long, env = "AZURE_ACCOUNT_NAME")]
    pub azure_account_name: Option<String>,

    /// Storage account key (azureblob backend)
    #[arg(long, env = "AZURE_ACCOUNT_KEY", hide_env_values = true)]
    pub azure_account_key: Option<String>,

    /// Blob container (azureblob backend)
    #[arg(long, env = "AZURE_CONTAINER")]
    pub azure_container: Option<String>,

    /// Verbose log output
    #[arg(
        long,
        env = "VERBOSE",
        num_args = 0..=1,
        default_missing_value = "true",
        value_parser = BoolishValueParser::new()
    )]
    pub verbose: Option<bool>,

    /// TOML file with default settings
    #[arg(long, env = "KUBECATALOG_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Settings file, keys mirror the flag names in snake_case
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileSettings {
    pub clustername: Option<String>,
    pub connector_id: Option<String>,
    pub lx_workspace: Option<String>,
    pub blacklist_namespaces: Option<Vec<String>>,
    pub storage_backend: Option<BackendKind>,
    pub local_file_path: Option<PathBuf>,
    pub azure_account_name: Option<String>,
    pub azure_account_key: Option<String>,
    pub azure_container: Option<String>,
    pub verbose: Option<bool>,
}

impl FileSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }
}

/// Resolved settings of one run
#[derive(Debug)]
pub struct Settings {
    pub identity: DocumentIdentity,
    pub blacklisted_namespaces: Vec<String>,
    pub storage_backend: BackendKind,
    pub local_file_path: PathBuf,
    pub azure: AzureBlobOptions,
    pub verbose: bool,
}

impl Settings {
    /// Read the settings file named by the arguments, if any, and merge
    pub fn load(args: Args) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileSettings::load(path)?,
            None => FileSettings::default(),
        };
        Ok(Self::merge(args, file))
    }

    pub fn merge(args: Args, file: FileSettings) -> Self {
        Self {
            identity: DocumentIdentity::new(
                args.connector_id.or(file.connector_id).unwrap_or_default(),
                args.clustername.or(file.clustername).unwrap_or_default(),
                args.lx_workspace.or(file.lx_workspace).unwrap_or_default(),
            ),
            blacklisted_namespaces: args
                .blacklist_namespaces
                .or(file.blacklist_namespaces)
                .unwrap_or_default(),
            storage_backend: args
                .storage_backend
                .or(file.storage_backend)
                .unwrap_or_default(),
            local_file_path: args
                .local_file_path
                .or(file.local_file_path)
                .unwrap_or_else(|| PathBuf::from(".")),
            azure: AzureBlobOptions {
                account_name: args
                    .azure_account_name
                    .or(file.azure_account_name)
                    .unwrap_or_default(),
                account_key: args
                    .azure_account_key
                    .or(file.azure_account_key)
                    .unwrap_or_default(),
                container: args
                    .azure_container
                    .or(file.azure_container)
                    .unwrap_or_default(),
            },
            verbose: args.verbose.or(file.verbose).unwrap_or(false),
        }
    }

    /// Construct the configured storage backend
    pub fn backend(&self) -> Result<Backend, StorageError> {
        Backend::new(self.storage_backend, &self.azure, &self.local_file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kubecatalog_storage::StorageBackend;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from([
            "kubecatalog",
            "--clustername",
            "prod",
            "--connector-id",
            "c-1",
            "--lx-workspace",
            "acme",
            "--blacklist-namespaces",
            "kube-system,monitoring",
            "--verbose",
        ])
        .unwrap();
        let settings = Settings::merge(args, FileSettings::default());

        assert_eq!(settings.identity.cluster_name, "prod");
        assert_eq!(settings.identity.connector_id, "c-1");
        assert_eq!(settings.identity.lx_workspace, "acme");
        assert_eq!(settings.blacklisted_namespaces, vec!["kube-system", "monitoring"]);
        assert_eq!(settings.local_file_path, PathBuf::from("."));
        assert_eq!(settings.storage_backend, BackendKind::File);
        assert!(settings.verbose);
    }

    #[test]
    fn test_verbose_accepts_numeric_env_value() {
        // SAFETY: the other tests here pass verbose explicitly or skip parsing
        unsafe { std::env::set_var("VERBOSE", "1") };
        let parsed = Args::try_parse_from(["kubecatalog"]);
        unsafe { std::env::remove_var("VERBOSE") };

        assert_eq!(parsed.unwrap().verbose, Some(true));
    }

    #[test]
    fn test_verbose_flag_can_disable_file_setting() {
        let args = Args::try_parse_from(["kubecatalog", "--verbose=false"]).unwrap();
        let file = FileSettings {
            verbose: Some(true),
            ..Default::default()
        };
        assert!(!Settings::merge(args, file).verbose);

        let file = FileSettings {
            verbose: Some(true),
            ..Default::default()
        };
        assert!(Settings::merge(Args::default(), file).verbose);
    }

    #[test]
    fn test_select_azure_blob_backend() {
        let args = Args::try_parse_from([
            "kubecatalog",
            "--storage-backend",
            "azureblob",
            "--azure-account-name",
            "catalogstore",
            "--azure-account-key",
            "dGVzdC1rZXk=",
        ])
        .unwrap();
        let file = FileSettings {
            azure_container: Some("ldif".to_string()),
            ..Default::default()
        };
        let settings = Settings::merge(args, file);

        assert_eq!(settings.storage_backend, BackendKind::AzureBlob);
        assert_eq!(settings.azure.container, "ldif");
        let backend = settings.backend().unwrap();
        assert_eq!(backend.kind(), BackendKind::AzureBlob);
        assert_eq!(backend.describe(), "azureblob://catalogstore/ldif");
    }

    #[test]
    fn test_azure_backend_without_account_is_rejected() {
        let file = FileSettings {
            storage_backend: Some(BackendKind::AzureBlob),
            ..Default::default()
        };
        let settings = Settings::merge(Args::default(), file);
        assert!(matches!(
            settings.backend(),
            Err(StorageError::MissingSetting("azure-account-name"))
        ));
    }

    #[test]
    fn test_unknown_storage_backend_is_rejected() {
        assert!(Args::try_parse_from(["kubecatalog", "--storage-backend", "s3"]).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let args = Args {
            clustername: Some("from-flag".to_string()),
            ..Default::default()
        };
        let file = FileSettings {
            clustername: Some("from-file".to_string()),
            lx_workspace: Some("acme".to_string()),
            local_file_path: Some(PathBuf::from("/tmp/out")),
            verbose: Some(true),
            ..Default::default()
        };
        let settings = Settings::merge(args, file);

        assert_eq!(settings.identity.cluster_name, "from-flag");
        assert_eq!(settings.identity.lx_workspace, "acme");
        assert_eq!(settings.identity.connector_id, "");
        assert_eq!(settings.local_file_path, PathBuf::from("/tmp/out"));
        assert!(settings.verbose);
    }

    #[test]
    fn test_load_settings_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
clustername = "prod"
connector_id = "c-1"
lx_workspace = "acme"
blacklist_namespaces = ["kube-system"]
storage_backend = "azureblob"
azure_account_name = "catalogstore"
"#
        )
        .unwrap();

        let args = Args {
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let settings = Settings::load(args).unwrap();

        assert_eq!(settings.identity.connector_id, "c-1");
        assert_eq!(settings.blacklisted_namespaces, vec!["kube-system"]);
        assert_eq!(settings.storage_backend, BackendKind::AzureBlob);
        assert_eq!(settings.azure.account_name, "catalogstore");
        assert!(!settings.verbose);
    }

    #[test]
    fn test_unknown_file_keys_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "cluster = \"typo\"").unwrap();
        assert!(FileSettings::load(file.path()).is_err());
    }
}
