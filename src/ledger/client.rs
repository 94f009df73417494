//!
//! Contract client for the storage contract deployed on the ledger.
//!
//! Reads go through `eth_call`; writes are built, signed locally and submitted with
//! `eth_sendRawTransaction`, then confirmed by polling for the receipt. Every call is
//! bounded by a caller-supplied deadline. Nothing is retried: a failed read or a
//! rejected submission is returned as is, and a confirmation that does not finish in
//! time is reported as indeterminate rather than failed.

use super::abi;
use super::rpc::{JsonRpcClient, RpcError};
use super::signer::{LegacyTransaction, SignerIdentity};
use super::types::{
	Address, ConfirmationError, LedgerError, LedgerValue, TransactionRecord, TransactionStatus,
	TxHash,
};
use crate::utils::{decode_hex_data, encode_hex_data, parse_quantity};

use serde::Deserialize;
use serde_json::json;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};

/// Operations against the single bound contract.
#[async_trait::async_trait]
pub trait LedgerClient: Send + Sync {
	/// Read the contract's current value.
	async fn read_value(&self, deadline: Instant) -> Result<LedgerValue, LedgerError>;

	/// Set the contract's value and wait until the transaction is mined or `deadline` passes.
	async fn write_value(
		&self,
		value: &LedgerValue,
		deadline: Instant,
	) -> Result<TransactionRecord, LedgerError>;
}

/// Settings for the contract client that are not part of the signer identity.
#[derive(Debug, Clone)]
pub struct ContractClientConfig {
	pub contract: Address,
	/// Interval between `eth_getTransactionReceipt` polls.
	pub receipt_poll_interval: Duration,
	/// Fixed gas limit; `None` asks the node with `eth_estimateGas`.
	pub gas_limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Receipt {
	transaction_hash: String,
	block_number: Option<String>,
	status: Option<String>,
}

/// JSON-RPC backed [`LedgerClient`].
pub struct ContractClient {
	rpc: JsonRpcClient,
	signer: SignerIdentity,
	config: ContractClientConfig,
	/// Held from nonce lookup until submission so concurrent writes get distinct nonces.
	submit_lock: Mutex<()>,
}

impl ContractClient {
	pub fn new(rpc: JsonRpcClient, signer: SignerIdentity, config: ContractClientConfig) -> Self {
		Self {
			rpc,
			signer,
			config,
			submit_lock: Mutex::new(()),
		}
	}

	pub fn signer_address(&self) -> Address {
		self.signer.address()
	}

	/// Run a pre-submission RPC under the deadline. Nothing has been sent yet, so
	/// expiry is a plain deadline error.
	async fn bounded<T>(
		&self,
		deadline: Instant,
		operation: &'static str,
		fut: impl Future<Output = Result<T, RpcError>>,
	) -> Result<T, LedgerError> {
		match timeout_at(deadline, fut).await {
			Ok(result) => result.map_err(LedgerError::from),
			Err(_) => Err(LedgerError::DeadlineExceeded(operation)),
		}
	}

	async fn quantity(&self, deadline: Instant, method: &'static str, params: serde_json::Value) -> Result<u128, LedgerError> {
		let raw: String = self.bounded(deadline, method, self.rpc.request(method, params)).await?;
		parse_quantity(&raw).map_err(|e| LedgerError::Decode(format!("{}: {}", method, e)))
	}

	async fn build_transaction(
		&self,
		value: &LedgerValue,
		deadline: Instant,
	) -> Result<(LegacyTransaction, u64), LedgerError> {
		let data = abi::encode_set(value).map_err(|e| LedgerError::Submission(e.to_string()))?;
		let from = self.signer.address().to_string();
		let to = self.config.contract.to_string();

		let chain_id = self.quantity(deadline, "eth_chainId", json!([])).await?;
		let chain_id = u64::try_from(chain_id)
			.map_err(|_| LedgerError::Decode(format!("chain id {} out of range", chain_id)))?;

		let nonce = self
			.quantity(deadline, "eth_getTransactionCount", json!([from, "pending"]))
			.await?;
		let nonce = u64::try_from(nonce)
			.map_err(|_| LedgerError::Decode(format!("nonce {} out of range", nonce)))?;

		let gas_price = self.quantity(deadline, "eth_gasPrice", json!([])).await?;

		let gas_limit = match self.config.gas_limit {
			Some(limit) => limit,
			None => {
				let call = json!({"from": from, "to": to, "data": encode_hex_data(&data)});
				let estimate = match self.quantity(deadline, "eth_estimateGas", json!([call])).await {
					Ok(estimate) => estimate,
					// the node would reject the call itself
					Err(LedgerError::Node { code, message }) => {
						return Err(LedgerError::Submission(format!(
							"gas estimation failed ({}): {}",
							code, message
						)));
					}
					Err(e) => return Err(e),
				};
				u64::try_from(estimate)
					.map_err(|_| LedgerError::Decode(format!("gas estimate {} out of range", estimate)))?
			}
		};

		debug!(
			"Built set transaction: chain_id={}, nonce={}, gas_price={}, gas_limit={}",
			chain_id, nonce, gas_price, gas_limit
		);

		let tx = LegacyTransaction {
			nonce,
			gas_price,
			gas_limit,
			to: self.config.contract,
			value: 0,
			data,
		};
		Ok((tx, chain_id))
	}

	/// Submit a signed transaction. Once the request may have reached the node, any
	/// failure other than an explicit rejection leaves the outcome unknown.
	async fn submit(&self, raw: &[u8], local_hash: TxHash, deadline: Instant) -> Result<TransactionRecord, LedgerError> {
		let send = self
			.rpc
			.request::<String>("eth_sendRawTransaction", json!([encode_hex_data(raw)]));

		let indeterminate = ConfirmationError::Indeterminate { tx_hash: local_hash };
		match timeout_at(deadline, send).await {
			Ok(Ok(node_hash)) => match node_hash.parse::<TxHash>() {
				Ok(hash) if hash != local_hash => {
					warn!(
						"Node reported hash {} for transaction computed as {}, tracking the node's",
						hash, local_hash
					);
					Ok(TransactionRecord::submitted(hash))
				}
				Ok(_) => Ok(TransactionRecord::submitted(local_hash)),
				Err(e) => {
					warn!("Node returned unparseable transaction hash {}: {}", node_hash, e);
					Ok(TransactionRecord::submitted(local_hash))
				}
			},
			Ok(Err(RpcError::Node { code, message })) => {
				Err(LedgerError::Submission(format!("node rejected transaction ({}): {}", code, message)))
			}
			Ok(Err(e)) if e.is_connect() => Err(LedgerError::Connection(e.to_string())),
			Ok(Err(e)) => {
				warn!("Submission of {} failed in flight: {}", local_hash, e);
				Err(indeterminate.into())
			}
			Err(_) => {
				warn!("Deadline passed while submitting {}", local_hash);
				Err(indeterminate.into())
			}
		}
	}

	/// Poll for the receipt until it shows up or the deadline passes.
	async fn wait_for_confirmation(&self, mut record: TransactionRecord, deadline: Instant) -> TransactionRecord {
		let hash = record.hash.to_string();

		loop {
			let poll = self
				.rpc
				.request::<Option<Receipt>>("eth_getTransactionReceipt", json!([hash]));

			match timeout_at(deadline, poll).await {
				Ok(Ok(Some(receipt))) => match Self::receipt_status(&receipt) {
					Ok(status) => {
						record.settle(status);
						return record;
					}
					Err(e) => warn!("Ignoring malformed receipt for {}: {}", hash, e),
				},
				Ok(Ok(None)) => debug!("Transaction {} not yet mined", hash),
				Ok(Err(e)) => warn!("Receipt retrieval for {} failed: {}", hash, e),
				Err(_) => break,
			}

			match Instant::now().checked_add(self.config.receipt_poll_interval) {
				Some(next_poll) if next_poll < deadline => tokio::time::sleep_until(next_poll).await,
				_ => {
					tokio::time::sleep_until(deadline).await;
					break;
				}
			}
		}

		record.settle(TransactionStatus::Indeterminate);
		record
	}

	fn receipt_field(name: &str, raw: Option<&str>) -> Result<u64, String> {
		let raw = raw.ok_or_else(|| format!("receipt without {}", name))?;
		let value = parse_quantity(raw).map_err(|e| format!("receipt {}: {}", name, e))?;
		u64::try_from(value).map_err(|_| format!("receipt {} {} out of range", name, raw))
	}

	fn receipt_status(receipt: &Receipt) -> Result<TransactionStatus, String> {
		let block_number = Self::receipt_field("blockNumber", receipt.block_number.as_deref())?;
		let receipt_status = Self::receipt_field("status", receipt.status.as_deref())?;

		debug!(
			"Receipt for {}: block {}, status {}",
			receipt.transaction_hash, block_number, receipt_status
		);

		if receipt_status == 1 {
			Ok(TransactionStatus::Confirmed {
				block_number,
				receipt_status,
			})
		} else {
			Ok(TransactionStatus::Failed {
				block_number,
				receipt_status,
			})
		}
	}
}

#[async_trait::async_trait]
impl LedgerClient for ContractClient {
	async fn read_value(&self, deadline: Instant) -> Result<LedgerValue, LedgerError> {
		let call = json!({
			"to": self.config.contract.to_string(),
			"data": encode_hex_data(&abi::encode_get()),
		});

		let output: String = self
			.bounded(deadline, "eth_call", self.rpc.request("eth_call", json!([call, "latest"])))
			.await?;

		let bytes = decode_hex_data(&output)
			.map_err(|e| LedgerError::Decode(format!("eth_call returned invalid hex: {}", e)))?;
		let value = abi::decode_get(&bytes).map_err(|e| LedgerError::Decode(e.to_string()))?;

		debug!("Read contract value {}", value);
		Ok(value)
	}

	async fn write_value(
		&self,
		value: &LedgerValue,
		deadline: Instant,
	) -> Result<TransactionRecord, LedgerError> {
		let record = {
			let _guard = match timeout_at(deadline, self.submit_lock.lock()).await {
				Ok(guard) => guard,
				Err(_) => return Err(LedgerError::DeadlineExceeded("submission slot")),
			};

			let (tx, chain_id) = self.build_transaction(value, deadline).await?;
			let signed = self.signer.sign(&tx, chain_id)?;
			self.submit(&signed.raw, signed.hash, deadline).await?
		};

		info!(
			"Transaction sent, waiting for it to be mined: tx={}, from={}",
			record.hash,
			self.signer.address()
		);

		let record = self.wait_for_confirmation(record, deadline).await;
		match record.status {
			TransactionStatus::Confirmed { receipt_status, block_number } => info!(
				"Transaction {} mined in block {} with receipt status {}",
				record.hash, block_number, receipt_status
			),
			TransactionStatus::Failed { receipt_status, block_number } => warn!(
				"Transaction {} mined in block {} but failed with receipt status {}",
				record.hash, block_number, receipt_status
			),
			_ => warn!("Transaction {} not confirmed before the deadline", record.hash),
		}

		Ok(record.into_result()?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::Value;
	use wiremock::matchers::{body_partial_json, method};
	use wiremock::{Mock, MockServer, ResponseTemplate};

	const CONTRACT: &str = "0x42699a7612a82f1d9c36148af9c77354759b210b";
	const SIGNER_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
	const NODE_HASH: &str = "0x5c504ed432cb51138bcf09aa5e8a410dd4a1e204ef84bfed1be16dfba1b22060";

	fn client_for(url: String, gas_limit: Option<u64>) -> ContractClient {
		ContractClient::new(
			JsonRpcClient::new(url).unwrap(),
			SignerIdentity::from_hex(SIGNER_KEY).unwrap(),
			ContractClientConfig {
				contract: CONTRACT.parse().unwrap(),
				receipt_poll_interval: Duration::from_millis(10),
				gas_limit,
			},
		)
	}

	fn word_hex(value: &LedgerValue) -> String {
		encode_hex_data(&value.to_word().unwrap())
	}

	async fn mock_result(server: &MockServer, rpc_method: &str, result: Value) {
		Mock::given(method("POST"))
			.and(body_partial_json(json!({"method": rpc_method})))
			.respond_with(
				ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": result})),
			)
			.mount(server)
			.await;
	}

	async fn mock_error(server: &MockServer, rpc_method: &str, message: &str) {
		Mock::given(method("POST"))
			.and(body_partial_json(json!({"method": rpc_method})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"jsonrpc": "2.0",
				"id": 1,
				"error": {"code": -32000, "message": message}
			})))
			.mount(server)
			.await;
	}

	async fn mock_transaction_setup(server: &MockServer) {
		mock_result(server, "eth_chainId", json!("0x539")).await;
		mock_result(server, "eth_getTransactionCount", json!("0x3")).await;
		mock_result(server, "eth_gasPrice", json!("0x0")).await;
		mock_result(server, "eth_estimateGas", json!("0x6b5c")).await;
	}

	fn soon(millis: u64) -> Instant {
		Instant::now() + Duration::from_millis(millis)
	}

	#[tokio::test]
	async fn read_value_decodes_the_returned_word() {
		let server = MockServer::start().await;
		let value: LedgerValue = "1267650600228229401496703205376".parse().unwrap();
		Mock::given(method("POST"))
			.and(body_partial_json(json!({
				"method": "eth_call",
				"params": [{"to": CONTRACT, "data": "0x6d4ce63c"}, "latest"]
			})))
			.respond_with(
				ResponseTemplate::new(200).set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": word_hex(&value)})),
			)
			.mount(&server)
			.await;

		let client = client_for(server.uri(), None);
		assert_eq!(client.read_value(soon(2_000)).await.unwrap(), value);
	}

	#[tokio::test]
	async fn read_value_rejects_empty_output() {
		let server = MockServer::start().await;
		mock_result(&server, "eth_call", json!("0x")).await;

		let client = client_for(server.uri(), None);
		let err = client.read_value(soon(2_000)).await.unwrap_err();
		assert!(matches!(err, LedgerError::Decode(_)), "{err:?}");
	}

	#[tokio::test]
	async fn read_value_respects_the_deadline() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(
				ResponseTemplate::new(200)
					.set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": word_hex(&LedgerValue::zero())}))
					.set_delay(Duration::from_secs(5)),
			)
			.mount(&server)
			.await;

		let client = client_for(server.uri(), None);
		let err = client.read_value(soon(100)).await.unwrap_err();
		assert!(matches!(err, LedgerError::DeadlineExceeded("eth_call")), "{err:?}");
	}

	#[tokio::test]
	async fn read_value_reports_unreachable_node() {
		let client = client_for("http://127.0.0.1:1".to_string(), None);
		let err = client.read_value(soon(2_000)).await.unwrap_err();
		assert!(matches!(err, LedgerError::Connection(_)), "{err:?}");
	}

	#[tokio::test]
	async fn write_value_waits_for_a_successful_receipt() {
		let server = MockServer::start().await;
		mock_transaction_setup(&server).await;
		mock_result(&server, "eth_sendRawTransaction", json!(NODE_HASH)).await;
		mock_result(
			&server,
			"eth_getTransactionReceipt",
			json!({"transactionHash": NODE_HASH, "blockNumber": "0x10", "status": "0x1"}),
		)
		.await;

		let client = client_for(server.uri(), None);
		let record = client
			.write_value(&LedgerValue::from(42u64), soon(5_000))
			.await
			.unwrap();

		assert_eq!(record.hash.to_string(), NODE_HASH);
		assert_eq!(
			record.status,
			TransactionStatus::Confirmed {
				block_number: 16,
				receipt_status: 1
			}
		);
	}

	#[tokio::test]
	async fn write_value_reports_a_mined_failure() {
		let server = MockServer::start().await;
		mock_transaction_setup(&server).await;
		mock_result(&server, "eth_sendRawTransaction", json!(NODE_HASH)).await;
		mock_result(
			&server,
			"eth_getTransactionReceipt",
			json!({"transactionHash": NODE_HASH, "blockNumber": "0x11", "status": "0x0"}),
		)
		.await;

		let client = client_for(server.uri(), None);
		let err = client
			.write_value(&LedgerValue::from(7u64), soon(5_000))
			.await
			.unwrap_err();

		match err {
			LedgerError::Confirmation(ConfirmationError::Failed {
				tx_hash,
				block_number,
				receipt_status,
			}) => {
				assert_eq!(tx_hash.to_string(), NODE_HASH);
				assert_eq!(block_number, 17);
				assert_eq!(receipt_status, 0);
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn write_value_is_indeterminate_when_no_receipt_arrives() {
		let server = MockServer::start().await;
		mock_transaction_setup(&server).await;
		mock_result(&server, "eth_sendRawTransaction", json!(NODE_HASH)).await;
		mock_result(&server, "eth_getTransactionReceipt", Value::Null).await;

		let client = client_for(server.uri(), None);
		let err = client
			.write_value(&LedgerValue::from(7u64), soon(300))
			.await
			.unwrap_err();

		match err {
			LedgerError::Confirmation(ConfirmationError::Indeterminate { tx_hash }) => {
				assert_eq!(tx_hash.to_string(), NODE_HASH);
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn write_value_surfaces_node_rejection() {
		let server = MockServer::start().await;
		mock_transaction_setup(&server).await;
		mock_error(&server, "eth_sendRawTransaction", "nonce too low").await;
		Mock::given(method("POST"))
			.and(body_partial_json(json!({"method": "eth_getTransactionReceipt"})))
			.respond_with(ResponseTemplate::new(200))
			.expect(0)
			.mount(&server)
			.await;

		let client = client_for(server.uri(), None);
		let err = client
			.write_value(&LedgerValue::from(7u64), soon(5_000))
			.await
			.unwrap_err();
		assert!(
			matches!(&err, LedgerError::Submission(message) if message.contains("nonce too low")),
			"{err:?}"
		);
	}

	/// Hash of the raw transaction the mock node received.
	async fn submitted_hash(server: &MockServer) -> TxHash {
		let requests = server.received_requests().await.unwrap();
		let raw = requests
			.iter()
			.filter_map(|request| serde_json::from_slice::<Value>(&request.body).ok())
			.find(|body| body["method"] == "eth_sendRawTransaction")
			.and_then(|body| body["params"][0].as_str().map(str::to_string))
			.unwrap();
		TxHash(abi::keccak256(&decode_hex_data(&raw).unwrap()))
	}

	#[tokio::test]
	async fn unreachable_node_on_submission_is_a_connection_error() {
		let client = client_for("http://127.0.0.1:1".to_string(), None);
		let err = client
			.submit(&[0xc0], TxHash([9u8; 32]), soon(2_000))
			.await
			.unwrap_err();
		assert!(matches!(err, LedgerError::Connection(_)), "{err:?}");
	}

	#[tokio::test]
	async fn gateway_failure_after_sending_is_indeterminate() {
		let server = MockServer::start().await;
		mock_transaction_setup(&server).await;
		Mock::given(method("POST"))
			.and(body_partial_json(json!({"method": "eth_sendRawTransaction"})))
			.respond_with(ResponseTemplate::new(502))
			.mount(&server)
			.await;

		let client = client_for(server.uri(), None);
		let err = client
			.write_value(&LedgerValue::from(7u64), soon(5_000))
			.await
			.unwrap_err();

		match err {
			LedgerError::Confirmation(ConfirmationError::Indeterminate { tx_hash }) => {
				assert_eq!(tx_hash, submitted_hash(&server).await);
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn deadline_during_submission_is_indeterminate() {
		let server = MockServer::start().await;
		mock_transaction_setup(&server).await;
		Mock::given(method("POST"))
			.and(body_partial_json(json!({"method": "eth_sendRawTransaction"})))
			.respond_with(
				ResponseTemplate::new(200)
					.set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": NODE_HASH}))
					.set_delay(Duration::from_secs(5)),
			)
			.mount(&server)
			.await;

		let client = client_for(server.uri(), None);
		let err = client
			.write_value(&LedgerValue::from(7u64), soon(500))
			.await
			.unwrap_err();

		match err {
			LedgerError::Confirmation(ConfirmationError::Indeterminate { tx_hash }) => {
				assert_eq!(tx_hash, submitted_hash(&server).await);
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[tokio::test]
	async fn node_reported_hash_is_tracked_when_it_differs() {
		let server = MockServer::start().await;
		mock_transaction_setup(&server).await;
		mock_result(&server, "eth_sendRawTransaction", json!(NODE_HASH)).await;
		Mock::given(method("POST"))
			.and(body_partial_json(json!({
				"method": "eth_getTransactionReceipt",
				"params": [NODE_HASH]
			})))
			.respond_with(ResponseTemplate::new(200).set_body_json(json!({
				"jsonrpc": "2.0",
				"id": 1,
				"result": {"transactionHash": NODE_HASH, "blockNumber": "0x2", "status": "0x1"}
			})))
			.mount(&server)
			.await;

		let client = client_for(server.uri(), None);
		let record = client
			.write_value(&LedgerValue::from(3u64), soon(5_000))
			.await
			.unwrap();

		let local = submitted_hash(&server).await;
		assert_ne!(local.to_string(), NODE_HASH);
		assert_eq!(record.hash.to_string(), NODE_HASH);
		assert_eq!(
			record.status,
			TransactionStatus::Confirmed {
				block_number: 2,
				receipt_status: 1
			}
		);
	}

	#[test]
	fn receipt_fields_must_fit_in_u64() {
		let receipt = Receipt {
			transaction_hash: NODE_HASH.to_string(),
			block_number: Some("0x10000000000000000".to_string()),
			status: Some("0x1".to_string()),
		};
		assert!(ContractClient::receipt_status(&receipt).is_err());

		let receipt = Receipt {
			transaction_hash: NODE_HASH.to_string(),
			block_number: Some("0xffffffffffffffff".to_string()),
			status: Some("0x0".to_string()),
		};
		assert_eq!(
			ContractClient::receipt_status(&receipt),
			Ok(TransactionStatus::Failed {
				block_number: u64::MAX,
				receipt_status: 0
			})
		);

		let receipt = Receipt {
			transaction_hash: NODE_HASH.to_string(),
			block_number: Some("0x1".to_string()),
			status: None,
		};
		assert!(ContractClient::receipt_status(&receipt).is_err());
	}

	#[tokio::test]
	async fn failed_gas_estimate_stops_before_submission() {
		let server = MockServer::start().await;
		mock_result(&server, "eth_chainId", json!("0x539")).await;
		mock_result(&server, "eth_getTransactionCount", json!("0x0")).await;
		mock_result(&server, "eth_gasPrice", json!("0x0")).await;
		mock_error(&server, "eth_estimateGas", "execution reverted").await;
		Mock::given(method("POST"))
			.and(body_partial_json(json!({"method": "eth_sendRawTransaction"})))
			.respond_with(ResponseTemplate::new(200))
			.expect(0)
			.mount(&server)
			.await;

		let client = client_for(server.uri(), None);
		let err = client
			.write_value(&LedgerValue::from(7u64), soon(5_000))
			.await
			.unwrap_err();
		assert!(matches!(err, LedgerError::Submission(_)), "{err:?}");
	}

	#[tokio::test]
	async fn configured_gas_limit_skips_estimation() {
		let server = MockServer::start().await;
		mock_result(&server, "eth_chainId", json!("0x539")).await;
		mock_result(&server, "eth_getTransactionCount", json!("0x0")).await;
		mock_result(&server, "eth_gasPrice", json!("0x0")).await;
		Mock::given(method("POST"))
			.and(body_partial_json(json!({"method": "eth_estimateGas"})))
			.respond_with(ResponseTemplate::new(200))
			.expect(0)
			.mount(&server)
			.await;
		mock_result(&server, "eth_sendRawTransaction", json!(NODE_HASH)).await;
		mock_result(
			&server,
			"eth_getTransactionReceipt",
			json!({"transactionHash": NODE_HASH, "blockNumber": "0x1", "status": "0x1"}),
		)
		.await;

		let client = client_for(server.uri(), Some(100_000));
		let record = client
			.write_value(&LedgerValue::from(1u64), soon(5_000))
			.await
			.unwrap();
		assert!(record.status.is_terminal());
	}

	#[tokio::test]
	async fn setup_deadline_is_not_indeterminate() {
		let server = MockServer::start().await;
		Mock::given(method("POST"))
			.respond_with(
				ResponseTemplate::new(200)
					.set_body_json(json!({"jsonrpc": "2.0", "id": 1, "result": "0x539"}))
					.set_delay(Duration::from_secs(5)),
			)
			.mount(&server)
			.await;

		let client = client_for(server.uri(), None);
		let err = client
			.write_value(&LedgerValue::from(1u64), soon(100))
			.await
			.unwrap_err();
		assert!(matches!(err, LedgerError::DeadlineExceeded("eth_chainId")), "{err:?}");
	}
}
