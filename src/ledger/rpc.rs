//!
//! JSON-RPC 2.0 client for the ledger node.
//!
//! A thin wrapper over `reqwest` that posts a request envelope, checks the HTTP status
//! and splits the response into a typed `result` or the node's `error` object. Timeouts
//! are left to callers, which bound every request with their own deadline.

use super::types::LedgerError;

use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Error types for a single JSON-RPC exchange
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
	#[error("HTTP error: {0}")]
	Transport(#[from] reqwest::Error),

	#[error("HTTP status {0}")]
	Status(reqwest::StatusCode),

	#[error("RPC error {code}: {message}")]
	Node { code: i64, message: String },

	#[error("Malformed response: {0}")]
	Decode(String),
}

impl RpcError {
	/// True when the request never reached the node.
	pub fn is_connect(&self) -> bool {
		matches!(self, RpcError::Transport(e) if e.is_connect())
	}
}

impl From<RpcError> for LedgerError {
	fn from(err: RpcError) -> Self {
		match err {
			RpcError::Transport(e) => LedgerError::Connection(e.to_string()),
			RpcError::Status(status) => LedgerError::Connection(format!("node answered HTTP {}", status)),
			RpcError::Node { code, message } => LedgerError::Node { code, message },
			RpcError::Decode(message) => LedgerError::Decode(message),
		}
	}
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
	code: i64,
	message: String,
}

#[derive(Debug, Deserialize)]
struct Envelope {
	#[serde(default)]
	result: Value,
	error: Option<ErrorObject>,
}

/// JSON-RPC client bound to one node URL
pub struct JsonRpcClient {
	http_client: Client,
	url: String,
	next_id: AtomicU64,
}

impl JsonRpcClient {
	pub fn new(url: String) -> Result<Self, LedgerError> {
		let http_client = Client::builder()
			.build()
			.map_err(|e| LedgerError::Connection(format!("failed to create HTTP client: {}", e)))?;

		Ok(Self {
			http_client,
			url,
			next_id: AtomicU64::new(1),
		})
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	/// Execute one JSON-RPC call and deserialize its `result`.
	///
	/// A `null` result deserializes into `Option::None` when `T` is an `Option`.
	pub async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
		let id = self.next_id.fetch_add(1, Ordering::Relaxed);
		let request_body = json!({
			"jsonrpc": "2.0",
			"id": id,
			"method": method,
			"params": params,
		});

		debug!("RPC -> {} (id {})", method, id);

		let response = self
			.http_client
			.post(&self.url)
			.json(&request_body)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(RpcError::Status(response.status()));
		}

		let envelope: Envelope = response
			.json()
			.await
			.map_err(|e| RpcError::Decode(format!("{} response is not JSON-RPC: {}", method, e)))?;

		if let Some(error) = envelope.error {
			return Err(RpcError::Node {
				code: error.code,
				message: error.message,
			});
		}

		serde_json::from_value(envelope.result)
			.map_err(|e| RpcError::Decode(format!("unexpected {} result: {}", method, e)))
	}
}
