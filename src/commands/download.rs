use crate::core::config::ProvisionerConfig;
use crate::core::scheme::ProvisionRequest;
use crate::error::Result;
use crate::plugin::{IcgcGetProvision, ProvisionInterface};
use std::path::Path;
use std::time::Duration;

pub struct DownloadOptions {
    pub timeout: Option<Duration>,
    pub strict: bool,
    pub json: bool,
}

/// Returns whether the download counts as successful under the chosen mode.
pub fn download(
    source: &str,
    destination: &Path,
    config: Option<ProvisionerConfig>,
    options: &DownloadOptions,
) -> Result<bool> {
    let mut provision = IcgcGetProvision::new().with_strict_status(options.strict);
    if let Some(config) = config {
        provision.set_configuration(config);
    }
    if let Some(timeout) = options.timeout {
        provision = provision.with_timeout(timeout);
    }

    if !provision.handles(source) {
        println!("⚠️  {source} is not an icgc-get:// URI, passing it on anyway");
    }

    if !options.json {
        println!("Downloading {source} to {}", destination.display());
    }

    let report = provision.provision(&ProvisionRequest::new(source, destination))?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.relocated {
        println!("✅ Downloaded to {}", destination.display());
    } else if report.result.succeeded() {
        println!("⚠️  icgc-get finished but left no file in {}", report.staging_dir.display());
    } else {
        println!("❌ icgc-get reported a problem:");
        println!("{}", report.result.stderr.trim_end());
    }

    Ok(!options.strict || report.relocated)
}
