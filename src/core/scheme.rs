use serde::Serialize;
use std::path::{Path, PathBuf};

pub const SCHEME: &str = "icgc-get";
pub const SCHEME_PREFIX: &str = "icgc-get://";

/// Strip the `icgc-get://` prefix off a source URI.
///
/// URIs without the prefix yield `None`; they are passed through rather
/// than rejected.
pub fn object_id(source_uri: &str) -> Option<&str> {
    source_uri.strip_prefix(SCHEME_PREFIX)
}

/// One download: where the object comes from and where it has to end up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionRequest {
    pub source_uri: String,
    pub destination: PathBuf,
}

impl ProvisionRequest {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(source_uri: S, destination: P) -> Self {
        Self {
            source_uri: source_uri.into(),
            destination: destination.into(),
        }
    }

    pub fn object_id(&self) -> Option<&str> {
        object_id(&self.source_uri)
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}
