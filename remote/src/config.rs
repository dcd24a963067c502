//! Tool configuration.
//!
//! Settings for the SSH connection and the local catalog, stored as YAML.
//! Every field has a default, so a partial file (or none at all) is valid.
//!
//! # Example YAML
//!
//! ```yaml
//! host:
//!   host: as400.example.com
//!   port: 22
//!   user: QPGMR
//!   key: ~/.ssh/id_rsa
//!   password_env: AS400_PASS
//!   timeout_ms: 60000
//! catalog:
//!   db_path: data/svp_dict.sqlite
//!   prefix: svp_
//!   source_file: QFUENTES
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use svp_dict_core::DEFAULT_SOURCE_FILE;

use crate::error::Result;

/// Default SSH port.
pub const DEFAULT_PORT: u16 = 22;

/// Default per-command timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 60_000;

/// Default catalog database location.
pub const DEFAULT_DB_PATH: &str = "data/svp_dict.sqlite";

/// Default catalog table prefix.
pub const DEFAULT_PREFIX: &str = "svp_";

/// SSH connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Remote host name or address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// SSH port.
    pub port: u16,
    /// Remote user profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Private key passed to `ssh -i`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<PathBuf>,
    /// Name of the environment variable holding the password. When set,
    /// `sshpass -e` supplies it to `ssh`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,
    /// Per-command timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: DEFAULT_PORT,
            user: None,
            key: None,
            password_env: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

/// Local catalog settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// Table name prefix.
    pub prefix: String,
    /// Source physical file holding service program sources.
    pub source_file: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            prefix: DEFAULT_PREFIX.to_string(),
            source_file: DEFAULT_SOURCE_FILE.to_string(),
        }
    }
}

/// Top-level configuration, usually loaded from `svp-dict.yml`.
///
/// # Examples
///
/// ```
/// use svp_dict_remote::DictConfig;
///
/// let config: DictConfig = serde_yaml::from_str("host: { host: as400, user: QPGMR }").unwrap();
/// assert_eq!(config.host.port, 22);
/// assert_eq!(config.catalog.prefix, "svp_");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DictConfig {
    pub host: HostConfig,
    pub catalog: CatalogConfig,
}

impl DictConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RemoteError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::RemoteError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Loads the file if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RemoteError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::RemoteError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
host:
  host: as400.example.com
  port: 2222
  user: QPGMR
  key: /home/dev/.ssh/id_ed25519
  password_env: AS400_PASS
  timeout_ms: 5000
catalog:
  db_path: /var/lib/svp/dict.sqlite
  prefix: prod_
  source_file: QRPGLESRC
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: DictConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.host.host.as_deref(), Some("as400.example.com"));
        assert_eq!(config.host.port, 2222);
        assert_eq!(config.host.user.as_deref(), Some("QPGMR"));
        assert_eq!(
            config.host.key.as_deref(),
            Some(Path::new("/home/dev/.ssh/id_ed25519"))
        );
        assert_eq!(config.host.password_env.as_deref(), Some("AS400_PASS"));
        assert_eq!(config.host.timeout_ms, 5000);
        assert_eq!(config.catalog.db_path, PathBuf::from("/var/lib/svp/dict.sqlite"));
        assert_eq!(config.catalog.prefix, "prod_");
        assert_eq!(config.catalog.source_file, "QRPGLESRC");
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: DictConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, DictConfig::default());
        assert_eq!(config.host.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(config.catalog.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.catalog.source_file, "QFUENTES");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config: DictConfig = serde_yaml::from_str("catalog:\n  prefix: t_\n").unwrap();
        assert_eq!(config.catalog.prefix, "t_");
        assert_eq!(config.catalog.source_file, "QFUENTES");
        assert_eq!(config.host, HostConfig::default());
    }

    #[test]
    fn test_unset_options_are_not_serialized() {
        let yaml = serde_yaml::to_string(&DictConfig::default()).unwrap();
        assert!(!yaml.contains("password_env"));
        assert!(yaml.contains("timeout_ms: 60000"));
    }
}
