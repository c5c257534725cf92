//! ObjectSchema registry service.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────────┐
//!                  │                 OBJECTSCHEMA REGISTRY                │
//!                  │                                                      │
//!   Client Request │  ┌──────────┐   ┌──────────┐   ┌──────────────────┐  │
//!   ───────────────┼─▶│   http   │──▶│ resource │──▶│ params → search  │  │
//!                  │  │ server   │   │ handlers │   └────────┬─────────┘  │
//!                  │  └──────────┘   └──────────┘            │            │
//!                  │                                         ▼            │
//!                  │                                 ┌──────────────┐     │
//!                  │                                 │    store     │     │
//!                  │                                 │ (async trait)│     │
//!                  │                                 └──────┬───────┘     │
//!                  │                                        ▼             │
//!   Client Response│  ┌──────────┐   ┌───────────────────────────────┐    │
//!   ◀──────────────┼──│ envelope │◀──│ projection + hypermedia links │    │
//!                  │  └──────────┘   └───────────────────────────────┘    │
//!                  │                                                      │
//!                  │  config · observability · lifecycle                  │
//!                  └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use objectschema_registry::config::validation::validate_config;
use objectschema_registry::config::{load_config, ConfigError, ServiceConfig};
use objectschema_registry::lifecycle::{self, signals, Shutdown};
use objectschema_registry::observability::logging;

#[derive(Parser)]
#[command(name = "objectschema-registry")]
#[command(about = "Hypermedia REST registry of ObjectSchemas", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

fn resolve_config(args: &Args) -> Result<ServiceConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.listener.bind_address = bind.clone();
        validate_config(&config).map_err(ConfigError::Validation)?;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = resolve_config(&args)?;

    logging::init_tracing(&config.observability.log_level);
    tracing::info!("objectschema-registry v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        default_limit = config.resource.default_limit,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    lifecycle::start(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
