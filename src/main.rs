use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use population_geometry::config::{AppConfig, ServiceMode};
use population_geometry::{pipeline, server};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config.toml";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the geometry endpoints over HTTP
    Serve {
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
        /// Overrides `server.mode`
        #[arg(short, long, value_enum)]
        mode: Option<ServiceMode>,
        /// Overrides `server.port`
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Compute the combined summary once and print it as JSON
    Compute {
        /// JSON array of {lat, lon, population} objects
        #[arg(long)]
        coords: String,
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config, mode, port } => {
            let mut app_config = load_config(config.as_deref())?;
            if let Some(mode) = mode {
                app_config.server.mode = mode;
            }
            if let Some(port) = port {
                app_config.server.port = port;
            }
            server::start_server(app_config).await?;
        }
        Commands::Compute { coords, config } => {
            let app_config = load_config(config.as_deref())?;
            let response = pipeline::calculate(Some(&coords), &app_config.geometry).map_err(|e| match e.details() {
                Some(details) => anyhow!("{} ({})", e, details),
                None => anyhow!(e),
            })?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

/// An explicit path must exist; the default `config.toml` is optional.
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from_file(path),
        None => {
            let default = Path::new(DEFAULT_CONFIG);
            if default.exists() {
                AppConfig::load_from_file(default)
            } else {
                tracing::info!("No {} found, using defaults", DEFAULT_CONFIG);
                Ok(AppConfig::default())
            }
        }
    }
}
