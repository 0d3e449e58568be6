//! ICGC Get provisioning plugin
//!
//! Fetches `icgc-get://<object-id>` sources by running the external
//! `icgc-get` client and copying its download to the requested destination.

pub mod commands;
pub mod core;
pub mod error;
pub mod plugin;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use crate::core::config::{ProvisionerConfig, ResolvedClient};
pub use crate::core::scheme::ProvisionRequest;
pub use crate::error::{ProvisionError, Result};
pub use crate::plugin::{IcgcGetPlugin, IcgcGetProvision, ProvisionInterface, RuntimeMode};
