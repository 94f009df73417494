//! Cache store module
//!
//! Holds the last contract value observed on the ledger together with the time it was
//! written. The store keeps exactly one row; callers never address it by key.
//!
//! - `postgres`: PostgreSQL-backed store used in deployments.
//! - `memory`: In-process store for local runs and tests.

/// In-process cache store
pub mod memory;
/// PostgreSQL cache store
pub mod postgres;

pub use memory::MemoryCacheStore;
pub use postgres::PostgresCacheStore;

use crate::ledger::LedgerValue;

use chrono::{DateTime, Utc};

/// Error types for cache store operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
	#[error("Storage error: {0}")]
	Storage(String),

	#[error("Cached value not found")]
	NotFound,

	#[error("Decode error: {0}")]
	Decode(String),
}

/// The cached contract value and when it was last written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedValue {
	pub value: LedgerValue,
	pub updated_at: DateTime<Utc>,
}

/// Persistence for the single cached contract value
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
	/// Create the backing storage if missing and seed the value `0`. Safe to call repeatedly;
	/// an existing value is left untouched.
	async fn initialize(&self) -> Result<(), CacheError>;

	/// Overwrite the cached value and stamp it with the current time.
	async fn put(&self, value: &LedgerValue) -> Result<(), CacheError>;

	async fn get(&self) -> Result<CachedValue, CacheError>;
}
