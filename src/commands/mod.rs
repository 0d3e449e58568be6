pub mod doctor;
pub mod download;
pub mod schemes;
pub mod upload;

use crate::core::config::{ProvisionerConfig, CLIENT_LOCATION, CONFIG_FILE_LOCATION};
use crate::error::Result;
use std::path::Path;

/// Assemble provisioner settings from an optional config file plus
/// command-line overrides. Overrides win over file values.
pub fn load_configuration(
    config_file: Option<&Path>,
    client: Option<&str>,
    client_config: Option<&str>,
) -> Result<Option<ProvisionerConfig>> {
    let mut config = match config_file {
        Some(path) => ProvisionerConfig::load(path)?,
        None => None,
    };

    if client.is_some() || client_config.is_some() {
        let config = config.get_or_insert_with(ProvisionerConfig::new);
        if let Some(client) = client {
            config.set(CLIENT_LOCATION, client);
        }
        if let Some(client_config) = client_config {
            config.set(CONFIG_FILE_LOCATION, client_config);
        }
    }

    Ok(config)
}
