use crate::error::{ProvisionError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Key naming the icgc-get executable.
pub const CLIENT_LOCATION: &str = "client";
/// Key naming the icgc-get client's own configuration file.
pub const CONFIG_FILE_LOCATION: &str = "config-file-location";
pub const DEFAULT_CLIENT: &str = "/usr/bin/icgc-get";
/// Table that holds this plugin's settings in a host configuration file.
pub const PLUGIN_SECTION: &str = "dockstore-file-icgc-get-plugin";

/// Flat key/value settings handed to the provisioner by its host.
///
/// Unknown keys are carried along and ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProvisionerConfig {
    values: HashMap<String, String>,
}

impl ProvisionerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.values.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Load the plugin section of a TOML configuration file.
    ///
    /// Returns `Ok(None)` when the file has no plugin section.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Option<Self>> {
        let document: toml::Table = toml::from_str(content)?;

        let section = match document.get(PLUGIN_SECTION) {
            Some(toml::Value::Table(section)) => section,
            Some(_) => {
                return Err(ProvisionError::config_error(format!(
                    "[{PLUGIN_SECTION}] must be a table"
                )))
            }
            None => return Ok(None),
        };

        let mut config = Self::new();
        for (key, value) in section {
            let value = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                toml::Value::Datetime(d) => d.to_string(),
                toml::Value::Array(_) | toml::Value::Table(_) => {
                    return Err(ProvisionError::config_error(format!(
                        "'{key}' in [{PLUGIN_SECTION}] must be a plain value"
                    )))
                }
            };
            config.set(key.clone(), value);
        }

        Ok(Some(config))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ProvisionerConfig {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Client executable and client config file, resolved for a single request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedClient {
    pub client_path: String,
    pub config_path: String,
}

impl ResolvedClient {
    /// Resolve the client and its config file from the host settings.
    ///
    /// A missing or empty map is a hard error. Supplied values are used
    /// verbatim; absent keys fall back to the defaults.
    pub fn resolve(config: Option<&ProvisionerConfig>) -> Result<Self> {
        let config = match config {
            Some(config) if !config.is_empty() => config,
            _ => {
                tracing::error!("You are missing a dockstore config file");
                return Err(ProvisionError::MissingConfiguration);
            }
        };

        let client_path = match config.get(CLIENT_LOCATION) {
            Some(client) => client.to_string(),
            None => DEFAULT_CLIENT.to_string(),
        };

        let config_path = match config.get(CONFIG_FILE_LOCATION) {
            Some(location) => location.to_string(),
            None => default_client_config()?.to_string_lossy().to_string(),
        };

        tracing::debug!(client = %client_path, config = %config_path, "Resolved icgc-get client");

        Ok(Self {
            client_path,
            config_path,
        })
    }
}

/// `<home>/.icgc-get/config.yaml`
pub fn default_client_config() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".icgc-get").join("config.yaml"))
        .ok_or(ProvisionError::HomeDirectoryNotFound)
}
