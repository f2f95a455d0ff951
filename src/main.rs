//! namerd: a control plane for name resolution.
//!
//! # Architecture Overview
//!
//! ```text
//!   config file ──▶ config::load ──▶ Document ──▶ compose ──▶ ServiceInstance
//!                        │                          │
//!                        ▼                          ├─ telemetry (global sinks)
//!                    registry                       ├─ dtab store
//!               (kind → decoder)                    ├─ namer table (disjoint prefixes)
//!                                                   ├─ interfaces (http control API)
//!                                                   └─ admin server
//! ```
//!
//! `--validate` stops after the non-constructing checks and exits.

use std::path::PathBuf;

use clap::Parser;

use namerd::config;
use namerd::lifecycle::{signals, Shutdown};
use namerd::observability::logging::{self, LogFormat};
use namerd::registry::{self, Registry};

#[derive(Parser)]
#[command(name = "namerd", version)]
#[command(about = "Name resolution control plane", long_about = None)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension)
    config: PathBuf,

    /// Check the configuration and exit without starting servers
    #[arg(long)]
    validate: bool,

    /// Log output format: pretty or json
    #[arg(long, default_value = "pretty")]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.log_format);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "namerd starting");

    let registry = registry::install(Registry::load(registry::builtin())?)?;
    let document = config::load_config_with(&cli.config, registry)?;
    tracing::info!(
        config = %cli.config.display(),
        namers = document.namers.len(),
        interfaces = document.interfaces.len(),
        storage = %document.storage.kind,
        "Configuration loaded"
    );

    if cli.validate {
        document.check()?;
        println!("{}: configuration is valid", cli.config.display());
        return Ok(());
    }

    let instance = document.compose()?;
    let shutdown = Shutdown::new();
    signals::shutdown_on_signal(shutdown.clone());

    instance.run(&shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
