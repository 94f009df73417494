//! Reconciliation service
//!
//! Coordinates the ledger client and the cache store. The two never talk to each other;
//! every flow goes through this service:
//!
//! - `query_current`: read the contract value from the ledger.
//! - `apply_change`: validate a decimal input, write it to the ledger and wait for the receipt.
//! - `synchronize`: copy the ledger value into the cache.
//! - `verify_consistency`: read both sides and compare them, without repairing anything.
//!
//! Each operation runs under its own deadline, fixed when the call starts.

use crate::cache::{CacheError, CacheStore};
use crate::ledger::{LedgerClient, LedgerError, LedgerValue, TransactionRecord};

use chrono::{DateTime, Utc};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, timeout_at};
use tracing::{error, info, warn};

/// Error types for reconciliation operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
	#[error("Invalid input: {0}")]
	InvalidInput(String),

	#[error("Ledger error: {0}")]
	Ledger(LedgerError),

	#[error("Cache error: {0}")]
	Cache(#[from] CacheError),

	#[error("Deadline exceeded while waiting for {0}")]
	DeadlineExceeded(&'static str),
}

impl From<LedgerError> for ServiceError {
	fn from(err: LedgerError) -> Self {
		match err {
			LedgerError::DeadlineExceeded(operation) => ServiceError::DeadlineExceeded(operation),
			other => ServiceError::Ledger(other),
		}
	}
}

/// Per-operation time budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
	pub read: Duration,
	pub write: Duration,
	pub sync: Duration,
	pub check: Duration,
}

impl Default for Deadlines {
	fn default() -> Self {
		Self {
			read: Duration::from_secs(5),
			write: Duration::from_secs(30),
			sync: Duration::from_secs(10),
			check: Duration::from_secs(10),
		}
	}
}

/// Outcome of comparing the ledger value with the cached one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsistencyReport {
	pub equal: bool,
	pub ledger_value: LedgerValue,
	pub cached_value: LedgerValue,
	pub cached_at: DateTime<Utc>,
}

pub struct ReconciliationService {
	ledger: Arc<dyn LedgerClient>,
	cache: Arc<dyn CacheStore>,
	deadlines: Deadlines,
	/// Serializes `synchronize` so the last read ledger value is the last one cached.
	sync_lease: Mutex<()>,
}

impl ReconciliationService {
	pub fn new(ledger: Arc<dyn LedgerClient>, cache: Arc<dyn CacheStore>, deadlines: Deadlines) -> Self {
		Self {
			ledger,
			cache,
			deadlines,
			sync_lease: Mutex::new(()),
		}
	}

	/// Run a cache call under `deadline`.
	async fn cached<T>(
		deadline: Instant,
		operation: &'static str,
		fut: impl Future<Output = Result<T, CacheError>>,
	) -> Result<T, ServiceError> {
		match timeout_at(deadline, fut).await {
			Ok(result) => Ok(result?),
			Err(_) => Err(ServiceError::DeadlineExceeded(operation)),
		}
	}

	/// Read the current contract value from the ledger.
	pub async fn query_current(&self) -> Result<LedgerValue, ServiceError> {
		let deadline = Instant::now() + self.deadlines.read;
		let value = self.ledger.read_value(deadline).await?;
		info!("Current ledger value: {}", value);
		Ok(value)
	}

	/// Set the contract value from decimal text and wait for the transaction to be mined.
	///
	/// Input is validated before anything is sent to the node.
	pub async fn apply_change(&self, input: &str) -> Result<TransactionRecord, ServiceError> {
		let value = input
			.parse::<LedgerValue>()
			.map_err(|e| ServiceError::InvalidInput(e.to_string()))?;

		let deadline = Instant::now() + self.deadlines.write;
		info!("Setting ledger value to {}", value);

		match self.ledger.write_value(&value, deadline).await {
			Ok(record) => {
				info!("Ledger value set to {} by {}", value, record.hash);
				Ok(record)
			}
			Err(e) => {
				error!("Failed to set ledger value to {}: {}", value, e);
				Err(e.into())
			}
		}
	}

	/// Copy the current ledger value into the cache.
	///
	/// When the cache write fails the error is returned and the cache keeps its previous value.
	pub async fn synchronize(&self) -> Result<LedgerValue, ServiceError> {
		let deadline = Instant::now() + self.deadlines.sync;
		let _lease = timeout_at(deadline, self.sync_lease.lock())
			.await
			.map_err(|_| ServiceError::DeadlineExceeded("sync lease"))?;

		let value = self.ledger.read_value(deadline).await?;

		if let Err(e) = Self::cached(deadline, "cache write", self.cache.put(&value)).await {
			error!("Failed to cache ledger value {}: {}", value, e);
			return Err(e);
		}

		info!("Cache synchronized with ledger value {}", value);
		Ok(value)
	}

	/// Compare the ledger value with the cached one. Never writes to either side.
	pub async fn verify_consistency(&self) -> Result<ConsistencyReport, ServiceError> {
		let deadline = Instant::now() + self.deadlines.check;

		let (ledger_value, cached) = futures::join!(
			self.ledger.read_value(deadline),
			Self::cached(deadline, "cache read", self.cache.get()),
		);
		let ledger_value = ledger_value?;
		let cached = cached?;

		let report = ConsistencyReport {
			equal: ledger_value == cached.value,
			ledger_value,
			cached_value: cached.value,
			cached_at: cached.updated_at,
		};

		if report.equal {
			info!("Cache is consistent with ledger value {}", report.ledger_value);
		} else {
			warn!(
				"Cache value {} (written {}) differs from ledger value {}",
				report.cached_value, report.cached_at, report.ledger_value
			);
		}
		Ok(report)
	}
}
