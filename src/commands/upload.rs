use crate::error::Result;
use crate::plugin::{IcgcGetProvision, ProvisionInterface};
use std::path::Path;

pub fn upload(destination: &str, source: &Path, metadata: Option<&str>) -> Result<()> {
    IcgcGetProvision::new().upload_to(destination, source, metadata)?;
    Ok(())
}
