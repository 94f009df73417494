//!
//! PostgreSQL cache store.
//!
//! The value lives in row `id = 1` of the `contract_value` table as decimal text, so
//! values wider than any native integer column survive untouched.

use super::{CacheError, CacheStore, CachedValue};
use crate::ledger::LedgerValue;

use backoff::{ExponentialBackoff, future::retry};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::{debug, info, warn};

const CREATE_TABLE: &str = r#"
	CREATE TABLE IF NOT EXISTS contract_value (
		id SERIAL PRIMARY KEY,
		value TEXT NOT NULL,
		last_updated_at TIMESTAMPTZ DEFAULT NOW()
	)
"#;

const SEED_ROW: &str = r#"
	INSERT INTO contract_value (id, value) VALUES (1, '0')
	ON CONFLICT (id) DO NOTHING
"#;

const UPSERT_VALUE: &str = r#"
	INSERT INTO contract_value (id, value, last_updated_at) VALUES (1, $1, NOW())
	ON CONFLICT (id) DO UPDATE SET value = EXCLUDED.value, last_updated_at = EXCLUDED.last_updated_at
"#;

const SELECT_VALUE: &str = "SELECT value, last_updated_at FROM contract_value WHERE id = 1";

/// Cache store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PostgresCacheStore {
	pool: PgPool,
}

impl PostgresCacheStore {
	/// Connect to `database_url`, retrying with exponential backoff for at most `max_elapsed`.
	pub async fn connect(database_url: &str, max_elapsed: Duration) -> Result<Self, CacheError> {
		let policy = ExponentialBackoff {
			max_elapsed_time: Some(max_elapsed),
			..ExponentialBackoff::default()
		};

		let pool = retry(policy, || async {
			PgPoolOptions::new()
				.max_connections(5)
				.acquire_timeout(Duration::from_secs(5))
				.connect(database_url)
				.await
				.map_err(|e| {
					warn!("Database connection attempt failed: {}", e);
					backoff::Error::transient(e)
				})
		})
		.await
		.map_err(|e| CacheError::Storage(format!("failed to connect to database: {}", e)))?;

		info!("Connected to database");
		Ok(Self { pool })
	}
}

/// SQLSTATE 42P01: the table has not been created yet.
fn is_undefined_table(err: &sqlx::Error) -> bool {
	matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("42P01"))
}

fn storage(context: &str, err: sqlx::Error) -> CacheError {
	CacheError::Storage(format!("{}: {}", context, err))
}

#[async_trait::async_trait]
impl CacheStore for PostgresCacheStore {
	async fn initialize(&self) -> Result<(), CacheError> {
		sqlx::query(CREATE_TABLE)
			.execute(&self.pool)
			.await
			.map_err(|e| storage("failed to create contract_value table", e))?;

		let seeded = sqlx::query(SEED_ROW)
			.execute(&self.pool)
			.await
			.map_err(|e| storage("failed to seed contract_value row", e))?;

		if seeded.rows_affected() > 0 {
			info!("Seeded contract_value with 0");
		} else {
			debug!("contract_value already initialized");
		}
		Ok(())
	}

	async fn put(&self, value: &LedgerValue) -> Result<(), CacheError> {
		sqlx::query(UPSERT_VALUE)
			.bind(value.to_string())
			.execute(&self.pool)
			.await
			.map_err(|e| storage("failed to update cached value", e))?;

		debug!("Cached value {}", value);
		Ok(())
	}

	async fn get(&self) -> Result<CachedValue, CacheError> {
		let row: Option<(String, Option<DateTime<Utc>>)> = sqlx::query_as(SELECT_VALUE)
			.fetch_optional(&self.pool)
			.await
			.map_err(|e| {
				if is_undefined_table(&e) {
					CacheError::NotFound
				} else {
					storage("failed to read cached value", e)
				}
			})?;

		let (raw, updated_at) = row.ok_or(CacheError::NotFound)?;
		let value = raw
			.parse::<LedgerValue>()
			.map_err(|e| CacheError::Decode(format!("stored value {:?}: {}", raw, e)))?;
		let updated_at =
			updated_at.ok_or_else(|| CacheError::Decode("stored value has no timestamp".to_string()))?;

		Ok(CachedValue { value, updated_at })
	}
}
