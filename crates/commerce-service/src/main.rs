//! Main entry point for the SA Commerce service.
//!
//! This binary wires the order and support-ticket services to a storage
//! backend chosen in configuration and serves them over HTTP.

use clap::Parser;
use commerce_config::Config;
use commerce_order::OrderService;
use commerce_storage::{StorageFactory, StorageInterface, StorageService};
use commerce_support::TicketService;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod server;

/// Command-line arguments for the commerce service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,
}

/// Main entry point for the commerce service.
///
/// This function:
/// 1. Parses command-line arguments
/// 2. Initializes logging infrastructure
/// 3. Loads configuration from file
/// 4. Builds the storage backend and domain services
/// 5. Serves the HTTP API until interrupted
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	// Initialize tracing with env filter
	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	fmt()
		.with_env_filter(env_filter)
		.with_target(true)
		.init();

	let config_path = args.config.to_string_lossy();
	let config = Config::from_file(&config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.service.id);

	let backend = build_storage(&config)?;
	let storage = Arc::new(StorageService::new(backend));

	let orders = Arc::new(OrderService::new(
		Arc::clone(&storage),
		config.order.max_claim_attempts,
	));
	let tickets = Arc::new(TicketService::new(Arc::clone(&storage)));

	let state = server::AppState {
		orders,
		tickets,
		default_page_size: config.order.default_page_size,
	};

	match &config.api {
		Some(api) if api.enabled => {
			server::start_server(api.clone(), state).await?;
		},
		_ => {
			tracing::warn!("API server disabled in configuration, nothing to serve");
		},
	}

	tracing::info!("Stopped commerce service");
	Ok(())
}

/// Resolves the storage backend named in configuration.
///
/// Each backend validates its own configuration table inside its
/// factory, so a misconfigured backend fails here, before the server
/// starts taking requests.
fn build_storage(config: &Config) -> Result<Box<dyn StorageInterface>, Box<dyn std::error::Error>> {
	let factories: HashMap<&str, StorageFactory> =
		commerce_storage::get_all_implementations().into_iter().collect();

	let backend_name = config.storage.backend.as_str();
	let factory = factories
		.get(backend_name)
		.ok_or_else(|| format!("Unknown storage backend: {}", backend_name))?;

	let backend_config = config
		.storage
		.implementations
		.get(backend_name)
		.cloned()
		.unwrap_or_else(|| toml::Value::Table(toml::Table::new()));

	tracing::info!("Using {} storage backend", backend_name);
	Ok(factory(&backend_config)?)
}
