mod api;
mod cache;
mod config;
mod ledger;
mod reconcile;
mod utils;

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::cache::{CacheError, CacheStore, MemoryCacheStore, PostgresCacheStore};
use crate::config::{CacheBackend, Config, ConfigError};
use crate::ledger::{ContractClient, ContractClientConfig, JsonRpcClient, LedgerError, SignerIdentity};
use crate::reconcile::ReconciliationService;

/// Upper bound on retrying the initial database connection
const DATABASE_CONNECT_BUDGET: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
enum StartupError {
	#[error("Configuration error: {0}")]
	Config(#[from] ConfigError),

	#[error("Ledger error: {0}")]
	Ledger(#[from] LedgerError),

	#[error("Cache error: {0}")]
	Cache(#[from] CacheError),

	#[error("Server error: {0}")]
	Server(#[from] std::io::Error),
}

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,sqlx=warn")),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.init();

	info!("Starting contract value sync service");

	if let Err(e) = run().await {
		error!("Service stopped: {}", e);
		std::process::exit(1);
	}
}

async fn run() -> Result<(), StartupError> {
	let config = Config::from_env()?;
	info!("Loaded configuration: {:?}", config);

	let signer = SignerIdentity::from_hex(config.signer_private_key())?;
	let rpc = JsonRpcClient::new(config.node_url.clone())?;
	info!("Using ledger node at {}", rpc.url());

	let ledger = ContractClient::new(
		rpc,
		signer,
		ContractClientConfig {
			contract: config.contract_address,
			receipt_poll_interval: config.receipt_poll_interval,
			gas_limit: config.gas_limit,
		},
	);
	info!(
		"Created contract client for {} signing as {}",
		config.contract_address,
		ledger.signer_address()
	);

	let cache: Arc<dyn CacheStore> = match &config.cache_backend {
		CacheBackend::Postgres { database_url } => {
			Arc::new(PostgresCacheStore::connect(database_url, DATABASE_CONNECT_BUDGET).await?)
		}
		CacheBackend::Memory => {
			warn!("Using in-memory cache; the cached value is lost on restart");
			Arc::new(MemoryCacheStore::new())
		}
	};
	cache.initialize().await?;
	info!("Cache store initialized");

	let service = ReconciliationService::new(Arc::new(ledger), cache, config.deadlines);
	let app = api::router(Arc::new(service));

	let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
	info!("Listening on {}", config.listen_addr);

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await?;

	info!("Server stopped");
	Ok(())
}

async fn shutdown_signal() {
	let ctrl_c = async {
		if let Err(e) = tokio::signal::ctrl_c().await {
			error!("Failed to listen for Ctrl+C: {}", e);
			std::future::pending::<()>().await;
		}
	};

	#[cfg(unix)]
	let terminate = async {
		match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
			Ok(mut signal) => {
				signal.recv().await;
			}
			Err(e) => {
				error!("Failed to listen for SIGTERM: {}", e);
				std::future::pending::<()>().await;
			}
		}
	};

	#[cfg(not(unix))]
	let terminate = std::future::pending::<()>();

	tokio::select! {
		_ = ctrl_c => {},
		_ = terminate => {},
	}

	info!("Shutdown signal received, draining requests");
}
