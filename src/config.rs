//!
//! Service configuration.
//!
//! Settings come from the process environment, optionally seeded from a `.env` file.
//! Parsing itself works over any lookup function so it can be exercised without touching
//! the real environment.

use crate::ledger::Address;
use crate::reconcile::Deadlines;

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_LISTEN_PORT: u16 = 8080;
pub const DEFAULT_RECEIPT_POLL_INTERVAL_MS: u64 = 1_000;
/// Upper bound for any per-operation time budget
pub const MAX_TIMEOUT_SECS: u64 = 3_600;
/// Upper bound for the receipt poll interval
pub const MAX_RECEIPT_POLL_INTERVAL_MS: u64 = 60_000;

/// Error types for configuration loading
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
	#[error("Missing environment variable {0}")]
	Missing(&'static str),

	#[error("Invalid value for {name}: {reason}")]
	Invalid { name: &'static str, reason: String },
}

/// Where the cached value is kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheBackend {
	Postgres { database_url: String },
	Memory,
}

#[derive(Clone)]
pub struct Config {
	pub node_url: String,
	pub contract_address: Address,
	signer_private_key: String,
	pub cache_backend: CacheBackend,
	pub listen_addr: SocketAddr,
	pub deadlines: Deadlines,
	pub receipt_poll_interval: Duration,
	/// Fixed gas limit for `set` transactions; estimated per transaction when unset
	pub gas_limit: Option<u64>,
}

impl Config {
	/// Load from `.env` (if present) and the process environment.
	pub fn from_env() -> Result<Self, ConfigError> {
		dotenvy::dotenv().ok();
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
		let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

		let node_url = require("BESU_NODE_URL")?;
		let contract_address = parse(&get, "CONTRACT_ADDRESS")?.ok_or(ConfigError::Missing("CONTRACT_ADDRESS"))?;
		let signer_private_key = require("SIGNER_PRIVATE_KEY")?;

		let cache_backend = match get("CACHE_BACKEND").as_deref() {
			None | Some("postgres") => CacheBackend::Postgres {
				database_url: require("DATABASE_URL")?,
			},
			Some("memory") => CacheBackend::Memory,
			Some(other) => {
				return Err(ConfigError::Invalid {
					name: "CACHE_BACKEND",
					reason: format!("expected `postgres` or `memory`, got `{}`", other),
				});
			}
		};

		let listen_addr = parse(&get, "LISTEN_ADDR")?
			.unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_LISTEN_PORT)));

		let defaults = Deadlines::default();
		let deadlines = Deadlines {
			read: seconds(&get, "READ_TIMEOUT_SECS", defaults.read)?,
			write: seconds(&get, "WRITE_TIMEOUT_SECS", defaults.write)?,
			sync: seconds(&get, "SYNC_TIMEOUT_SECS", defaults.sync)?,
			check: seconds(&get, "CHECK_TIMEOUT_SECS", defaults.check)?,
		};

		let receipt_poll_interval = Duration::from_millis(bounded(
			"RECEIPT_POLL_INTERVAL_MS",
			parse(&get, "RECEIPT_POLL_INTERVAL_MS")?.unwrap_or(DEFAULT_RECEIPT_POLL_INTERVAL_MS),
			MAX_RECEIPT_POLL_INTERVAL_MS,
		)?);

		let gas_limit = parse(&get, "GAS_LIMIT")?;

		Ok(Self {
			node_url,
			contract_address,
			signer_private_key,
			cache_backend,
			listen_addr,
			deadlines,
			receipt_poll_interval,
			gas_limit,
		})
	}

	pub fn signer_private_key(&self) -> &str {
		&self.signer_private_key
	}
}

impl fmt::Debug for Config {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Config")
			.field("node_url", &self.node_url)
			.field("contract_address", &self.contract_address.to_string())
			.field("signer_private_key", &"<redacted>")
			.field("cache_backend", &self.cache_backend)
			.field("listen_addr", &self.listen_addr)
			.field("deadlines", &self.deadlines)
			.field("receipt_poll_interval", &self.receipt_poll_interval)
			.field("gas_limit", &self.gas_limit)
			.finish()
	}
}

fn parse<T, G>(get: &G, name: &'static str) -> Result<Option<T>, ConfigError>
where
	T: FromStr,
	T::Err: fmt::Display,
	G: Fn(&str) -> Option<String>,
{
	get(name)
		.map(|raw| {
			raw.parse::<T>().map_err(|e| ConfigError::Invalid {
				name,
				reason: e.to_string(),
			})
		})
		.transpose()
}

fn seconds<G>(get: &G, name: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
	G: Fn(&str) -> Option<String>,
{
	match parse::<u64, G>(get, name)? {
		Some(secs) => Ok(Duration::from_secs(bounded(name, secs, MAX_TIMEOUT_SECS)?)),
		None => Ok(default),
	}
}

/// Accept values in `1..=max`.
fn bounded(name: &'static str, value: u64, max: u64) -> Result<u64, ConfigError> {
	if value == 0 || value > max {
		return Err(ConfigError::Invalid {
			name,
			reason: format!("must be between 1 and {}, got {}", max, value),
		});
	}
	Ok(value)
}
