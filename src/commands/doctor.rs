use crate::core::config::{ProvisionerConfig, ResolvedClient};
use crate::error::Result;
use crate::utils::fs;
use std::path::{Path, PathBuf};

/// Where the client would be launched from, if it can be found at all.
pub fn locate_client(client_path: &str) -> Option<PathBuf> {
    let path = Path::new(client_path);
    if path.components().count() > 1 {
        return fs::is_executable(path).then(|| path.to_path_buf());
    }
    which::which(client_path).ok()
}

pub fn check_environment(config: Option<ProvisionerConfig>) -> Result<()> {
    println!("🔍 ICGC Get Provision - Environment Check");
    println!();

    let client = ResolvedClient::resolve(config.as_ref())?;
    let mut issues_found = 0;

    println!("🔧 icgc-get client:");
    println!("  configured: {}", client.client_path);
    match locate_client(&client.client_path) {
        Some(path) => println!("    ✅ found at {}", path.display()),
        None => {
            println!("    ❌ not found or not executable");
            issues_found += 1;
        }
    }

    println!();
    println!("📄 icgc-get configuration:");
    println!("  configured: {}", client.config_path);
    if Path::new(&client.config_path).is_file() {
        println!("    ✅ exists");
    } else {
        println!("    ❌ missing");
        issues_found += 1;
    }

    println!();
    if issues_found == 0 {
        println!("🎉 Environment looks good! No issues found.");
    } else {
        println!("⚠️  Found {issues_found} issue(s) that need attention.");
        println!();
        println!("💡 Set 'client' and 'config-file-location' under [dockstore-file-icgc-get-plugin]");
        println!("   in your config file, or pass --client / --client-config.");
    }

    Ok(())
}
