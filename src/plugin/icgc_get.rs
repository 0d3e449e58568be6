//! icgc-get provisioning: resolve the client, run it into a staging
//! directory next to the destination, then copy the payload out.

use super::ProvisionInterface;
use crate::core::config::{ProvisionerConfig, ResolvedClient};
use crate::core::invoker::{ClientCommand, CommandResult};
use crate::core::relocate;
use crate::core::scheme::{ProvisionRequest, SCHEME};
use crate::core::staging;
use crate::error::{ProvisionError, Result};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Download-only provisioner for `icgc-get://<object-id>` URIs.
///
/// Configuration is resolved afresh for every request, so one instance can
/// serve several threads. Requests whose destinations share a parent
/// directory share the `tmp` staging directory and must not overlap.
#[derive(Debug, Clone, Default)]
pub struct IcgcGetProvision {
    config: Option<ProvisionerConfig>,
    timeout: Option<Duration>,
    strict_status: bool,
}

/// Everything one download did.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadReport {
    pub object_id: Option<String>,
    pub staging_dir: PathBuf,
    pub command: ClientCommand,
    pub result: CommandResult,
    pub relocated: bool,
}

impl DownloadReport {
    pub fn succeeded(&self) -> bool {
        self.result.succeeded() && self.relocated
    }
}

impl IcgcGetProvision {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_configuration(mut self, config: ProvisionerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Kill the client if it runs longer than `timeout`. Unlimited by default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Make `download_from` report client errors and missing payloads
    /// instead of always answering `true`.
    pub fn with_strict_status(mut self, strict: bool) -> Self {
        self.strict_status = strict;
        self
    }

    pub fn configuration(&self) -> Option<&ProvisionerConfig> {
        self.config.as_ref()
    }

    pub fn is_strict(&self) -> bool {
        self.strict_status
    }

    /// Run one download and report every step's outcome.
    pub fn provision(&self, request: &ProvisionRequest) -> Result<DownloadReport> {
        let client = ResolvedClient::resolve(self.config.as_ref())?;

        let object_id = request.object_id();
        if object_id.is_none() {
            tracing::warn!(source = %request.source_uri, "Source has no icgc-get:// prefix");
        }

        let staging_dir = staging::staging_dir_for(request.destination())?;
        staging::create_staging_dir(&staging_dir);

        let command = ClientCommand::download(&client, object_id, &staging_dir);
        let result = command.run(self.timeout)?;

        if !result.succeeded() {
            tracing::error!(source = %request.source_uri, "Could not download file.");

            if self.strict_status {
                return Err(match result.failure {
                    Some(failure) => failure.into_error(command.command_line()),
                    None => ProvisionError::ExternalToolReportedError {
                        stderr: result.stderr,
                    },
                });
            }
        }

        let relocated = relocate::relocate(&staging_dir, request.destination())?;

        Ok(DownloadReport {
            object_id: object_id.map(str::to_string),
            staging_dir,
            command,
            result,
            relocated,
        })
    }
}

impl ProvisionInterface for IcgcGetProvision {
    fn set_configuration(&mut self, config: ProvisionerConfig) {
        self.config = Some(config);
    }

    fn schemes_handled(&self) -> BTreeSet<String> {
        BTreeSet::from([SCHEME.to_string()])
    }

    /// In the default mode this answers `true` whenever nothing fatal
    /// happened, even if the client complained or no file was copied.
    fn download_from(&self, source_path: &str, destination: &Path) -> Result<bool> {
        let report = self.provision(&ProvisionRequest::new(source_path, destination))?;

        if self.strict_status {
            Ok(report.relocated)
        } else {
            Ok(true)
        }
    }

    fn upload_to(
        &self,
        _destination_path: &str,
        _source_file: &Path,
        _metadata: Option<&str>,
    ) -> Result<bool> {
        Err(ProvisionError::unsupported("upload"))
    }
}
