//! HTTP API
//!
//! Exposes the reconciliation operations as JSON endpoints:
//!
//! - `GET /get`: current ledger value
//! - `POST /set?value=N`: set the ledger value and wait for the receipt
//! - `POST /sync`: copy the ledger value into the cache
//! - `GET /check`: compare the ledger value with the cached one

use crate::ledger::{ConfirmationError, LedgerError, TransactionStatus};
use crate::reconcile::{ReconciliationService, ServiceError};

use axum::{
	Json, Router,
	extract::{Query, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

type AppState = Arc<ReconciliationService>;

#[derive(Debug, Serialize)]
pub struct ValueResponse {
	pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SetResponse {
	pub tx_hash: String,
	pub block_number: u64,
	pub receipt_status: u64,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
	pub are_values_equal: bool,
	pub blockchain_value: String,
	pub database_value: String,
	pub database_updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SetParams {
	value: Option<String>,
}

impl IntoResponse for ServiceError {
	fn into_response(self) -> Response {
		let status = match &self {
			ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
			ServiceError::Ledger(LedgerError::Confirmation(ConfirmationError::Indeterminate { tx_hash })) => {
				return (
					StatusCode::GATEWAY_TIMEOUT,
					Json(json!({
						"error": self.to_string(),
						"tx_hash": tx_hash.to_string(),
						"timestamp": Utc::now(),
					})),
				)
					.into_response();
			}
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};

		if status.is_server_error() {
			warn!("Request failed: {}", self);
		}

		(
			status,
			Json(json!({
				"error": self.to_string(),
				"timestamp": Utc::now(),
			})),
		)
			.into_response()
	}
}

pub fn router(service: AppState) -> Router {
	Router::new()
		.route("/get", get(get_value))
		.route("/set", post(set_value))
		.route("/sync", post(sync_value))
		.route("/check", get(check_consistency))
		.with_state(service)
}

async fn get_value(State(service): State<AppState>) -> Result<Json<ValueResponse>, ServiceError> {
	let value = service.query_current().await?;
	Ok(Json(ValueResponse {
		value: value.to_string(),
	}))
}

async fn set_value(
	State(service): State<AppState>,
	Query(params): Query<SetParams>,
) -> Result<Json<SetResponse>, ServiceError> {
	let input = params
		.value
		.ok_or_else(|| ServiceError::InvalidInput("missing `value` query parameter".to_string()))?;

	let record = service.apply_change(&input).await?;
	match record.status {
		TransactionStatus::Confirmed {
			block_number,
			receipt_status,
		} => Ok(Json(SetResponse {
			tx_hash: record.hash.to_string(),
			block_number,
			receipt_status,
		})),
		_ => Err(LedgerError::from(ConfirmationError::Indeterminate { tx_hash: record.hash }).into()),
	}
}

async fn sync_value(State(service): State<AppState>) -> Result<Json<ValueResponse>, ServiceError> {
	let value = service.synchronize().await?;
	Ok(Json(ValueResponse {
		value: value.to_string(),
	}))
}

async fn check_consistency(State(service): State<AppState>) -> Result<Json<CheckResponse>, ServiceError> {
	let report = service.verify_consistency().await?;
	Ok(Json(CheckResponse {
		are_values_equal: report.equal,
		blockchain_value: report.ledger_value.to_string(),
		database_value: report.cached_value.to_string(),
		database_updated_at: report.cached_at,
	}))
}
