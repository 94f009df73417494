use super::{CacheError, CacheStore, CachedValue};
use crate::ledger::LedgerValue;

use chrono::Utc;
use std::sync::Mutex;
use tracing::debug;

/// Cache store kept in process memory. Starts uninitialized, like an empty database.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
	row: Mutex<Option<CachedValue>>,
}

impl MemoryCacheStore {
	pub fn new() -> Self {
		Self::default()
	}

	fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<CachedValue>>, CacheError> {
		self.row
			.lock()
			.map_err(|_| CacheError::Storage("memory cache lock poisoned".to_string()))
	}
}

#[async_trait::async_trait]
impl CacheStore for MemoryCacheStore {
	async fn initialize(&self) -> Result<(), CacheError> {
		let mut row = self.slot()?;
		if row.is_none() {
			*row = Some(CachedValue {
				value: LedgerValue::zero(),
				updated_at: Utc::now(),
			});
			debug!("Seeded in-memory cache with 0");
		}
		Ok(())
	}

	async fn put(&self, value: &LedgerValue) -> Result<(), CacheError> {
		*self.slot()? = Some(CachedValue {
			value: value.clone(),
			updated_at: Utc::now(),
		});
		Ok(())
	}

	async fn get(&self) -> Result<CachedValue, CacheError> {
		self.slot()?.clone().ok_or(CacheError::NotFound)
	}
}
