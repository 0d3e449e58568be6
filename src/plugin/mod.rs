pub mod icgc_get;

use crate::core::config::ProvisionerConfig;
use crate::error::Result;
use std::collections::BTreeSet;
use std::path::Path;

pub use icgc_get::{DownloadReport, IcgcGetProvision};

/// The contract a host provisioning framework drives.
///
/// The host hands over configuration once, routes every source URI whose
/// scheme is in `schemes_handled` to `download_from`, and must never call
/// `upload_to` on a download-only provisioner.
pub trait ProvisionInterface {
    fn set_configuration(&mut self, config: ProvisionerConfig);

    fn schemes_handled(&self) -> BTreeSet<String>;

    /// Whether `uri` starts with `<scheme>://` for a handled scheme.
    fn handles(&self, uri: &str) -> bool {
        uri.split_once("://")
            .map(|(scheme, _)| self.schemes_handled().contains(scheme))
            .unwrap_or(false)
    }

    /// Fetch `source_path` into `destination`, which names the final file.
    fn download_from(&self, source_path: &str, destination: &Path) -> Result<bool>;

    fn upload_to(&self, destination_path: &str, source_file: &Path, metadata: Option<&str>)
        -> Result<bool>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RuntimeMode {
    Development,
    #[default]
    Deployment,
}

/// Plugin wrapper a host loads; hands out the provisioning extension.
#[derive(Debug, Clone, Default)]
pub struct IcgcGetPlugin {
    runtime_mode: RuntimeMode,
}

impl IcgcGetPlugin {
    pub fn new(runtime_mode: RuntimeMode) -> Self {
        Self { runtime_mode }
    }

    pub fn runtime_mode(&self) -> RuntimeMode {
        self.runtime_mode
    }

    pub fn start(&self) {
        if self.runtime_mode == RuntimeMode::Development {
            tracing::info!("ICGCGETPLUGIN DEVELOPMENT MODE");
        }
        tracing::debug!(mode = ?self.runtime_mode, "IcgcGetPlugin.start()");
    }

    pub fn stop(&self) {
        tracing::info!("IcgcGetPlugin.stop()");
    }

    pub fn extension(&self) -> IcgcGetProvision {
        IcgcGetProvision::new()
    }
}
