use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use icgc_get_provision::commands::{self, download::DownloadOptions};
use icgc_get_provision::plugin::{IcgcGetPlugin, RuntimeMode};

#[derive(Parser)]
#[clap(name = "icgc-get-provision")]
#[clap(about = "Provision icgc-get:// objects through the icgc-get client")]
#[clap(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Enable debug logging
    #[clap(short, long, global = true)]
    verbose: bool,
    /// Run the plugin in development mode
    #[clap(long, global = true)]
    dev: bool,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download an icgc-get:// object to a local file
    Download {
        /// Source URI (e.g., icgc-get://FI509397)
        source: String,
        /// Destination file, including the file name
        destination: PathBuf,
        #[clap(flatten)]
        config: ConfigArgs,
        /// Kill icgc-get after this many seconds
        #[clap(long)]
        timeout: Option<u64>,
        /// Fail when icgc-get reports an error or leaves no file behind
        #[clap(long)]
        strict: bool,
        /// Print the download report as JSON
        #[clap(long)]
        json: bool,
    },
    /// Upload a file (not supported by icgc-get)
    Upload {
        /// Destination URI
        destination: String,
        /// Local file to upload
        source: PathBuf,
        /// Metadata to attach
        #[clap(long)]
        metadata: Option<String>,
    },
    /// List the URI schemes this plugin handles
    Schemes,
    /// Check that the icgc-get client and its configuration can be found
    Doctor {
        #[clap(flatten)]
        config: ConfigArgs,
    },
}

#[derive(clap::Args)]
struct ConfigArgs {
    /// TOML file with a [dockstore-file-icgc-get-plugin] section
    #[clap(long)]
    config_file: Option<PathBuf>,
    /// Path to the icgc-get executable
    #[clap(long)]
    client: Option<String>,
    /// Path to icgc-get's own config.yaml
    #[clap(long)]
    client_config: Option<String>,
}

impl ConfigArgs {
    fn load(&self) -> Result<Option<icgc_get_provision::ProvisionerConfig>> {
        commands::load_configuration(
            self.config_file.as_deref(),
            self.client.as_deref(),
            self.client_config.as_deref(),
        )
        .map_err(|e| anyhow::anyhow!(e))
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("icgc_get_provision={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mode = if cli.dev {
        RuntimeMode::Development
    } else {
        RuntimeMode::Deployment
    };
    let plugin = IcgcGetPlugin::new(mode);
    plugin.start();

    let result = match cli.command {
        Commands::Download {
            source,
            destination,
            config,
            timeout,
            strict,
            json,
        } => config.load().and_then(|config| {
            let options = DownloadOptions {
                timeout: timeout.map(Duration::from_secs),
                strict,
                json,
            };
            let ok = commands::download::download(&source, &destination, config, &options)
                .map_err(|e| anyhow::anyhow!(e))?;
            if !ok {
                anyhow::bail!("no file was downloaded for {source}");
            }
            Ok(())
        }),
        Commands::Upload {
            destination,
            source,
            metadata,
        } => commands::upload::upload(&destination, &source, metadata.as_deref())
            .map_err(|e| anyhow::anyhow!(e)),
        Commands::Schemes => {
            commands::schemes::list_schemes();
            Ok(())
        }
        Commands::Doctor { config } => config.load().and_then(|config| {
            commands::doctor::check_environment(config).map_err(|e| anyhow::anyhow!(e))
        }),
    };

    plugin.stop();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}
