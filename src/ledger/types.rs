//! Types shared by the ledger client: the contract value, addresses, transaction
//! hashes, transaction records and the ledger error taxonomy.

use num_bigint::BigUint;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Width of an ABI word in bytes.
pub const WORD_LEN: usize = 32;

/// Errors raised while interpreting a value as a [`LedgerValue`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValueError {
	#[error("value is empty")]
	Empty,

	#[error("value {0:?} is not a non-negative decimal integer")]
	NotDecimal(String),

	#[error("value needs {bits} bits, contract slot holds at most 256")]
	TooWide { bits: u64 },

	#[error("expected a 32-byte word, got {0} bytes")]
	BadWord(usize),
}

/// The contract's authoritative value: an arbitrary-precision non-negative integer.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedgerValue(BigUint);

impl LedgerValue {
	pub const MAX_BITS: u64 = (WORD_LEN * 8) as u64;

	pub fn zero() -> Self {
		Self(BigUint::default())
	}

	/// Encode as a big-endian, left-padded ABI word.
	pub fn to_word(&self) -> Result<[u8; WORD_LEN], ValueError> {
		let bits = self.0.bits();
		if bits > Self::MAX_BITS {
			return Err(ValueError::TooWide { bits });
		}
		let bytes = self.0.to_bytes_be();
		let mut word = [0u8; WORD_LEN];
		word[WORD_LEN - bytes.len()..].copy_from_slice(&bytes);
		Ok(word)
	}

	/// Decode a single ABI word.
	pub fn from_word(bytes: &[u8]) -> Result<Self, ValueError> {
		if bytes.len() != WORD_LEN {
			return Err(ValueError::BadWord(bytes.len()));
		}
		Ok(Self(BigUint::from_bytes_be(bytes)))
	}
}

impl FromStr for LedgerValue {
	type Err = ValueError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.is_empty() {
			return Err(ValueError::Empty);
		}
		if !s.bytes().all(|b| b.is_ascii_digit()) {
			return Err(ValueError::NotDecimal(s.to_string()));
		}
		let value = BigUint::parse_bytes(s.as_bytes(), 10)
			.ok_or_else(|| ValueError::NotDecimal(s.to_string()))?;
		let bits = value.bits();
		if bits > Self::MAX_BITS {
			return Err(ValueError::TooWide { bits });
		}
		Ok(Self(value))
	}
}

impl fmt::Display for LedgerValue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<BigUint> for LedgerValue {
	fn from(value: BigUint) -> Self {
		Self(value)
	}
}

impl From<u64> for LedgerValue {
	fn from(value: u64) -> Self {
		Self(BigUint::from(value))
	}
}

impl From<u128> for LedgerValue {
	fn from(value: u128) -> Self {
		Self(BigUint::from(value))
	}
}

impl Serialize for LedgerValue {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// Errors raised while parsing fixed-width hex identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HexIdError {
	#[error("invalid hex: {0}")]
	InvalidHex(String),

	#[error("expected {expected} bytes, got {actual}")]
	WrongLength { expected: usize, actual: usize },
}

fn parse_fixed<const N: usize>(s: &str) -> Result<[u8; N], HexIdError> {
	let bytes = crate::utils::decode_hex_data(s).map_err(|e| HexIdError::InvalidHex(e.to_string()))?;
	bytes.as_slice().try_into().map_err(|_| HexIdError::WrongLength {
		expected: N,
		actual: bytes.len(),
	})
}

/// A 20-byte account or contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub [u8; 20]);

impl FromStr for Address {
	type Err = HexIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse_fixed::<20>(s).map(Self)
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(self.0))
	}
}

/// A 32-byte transaction hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TxHash(pub [u8; 32]);

impl FromStr for TxHash {
	type Err = HexIdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		parse_fixed::<32>(s).map(Self)
	}
}

impl fmt::Display for TxHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x{}", hex::encode(self.0))
	}
}

impl Serialize for TxHash {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

/// Lifecycle of a submitted transaction.
///
/// `Pending` is the only non-terminal state. `Indeterminate` means the confirmation
/// deadline passed before the node reported an outcome; the transaction may still be
/// mined later and must not be resubmitted blindly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransactionStatus {
	Pending,
	Confirmed { block_number: u64, receipt_status: u64 },
	Failed { block_number: u64, receipt_status: u64 },
	Indeterminate,
}

impl TransactionStatus {
	pub fn is_terminal(&self) -> bool {
		!matches!(self, TransactionStatus::Pending)
	}
}

/// A submitted state change and its confirmation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransactionRecord {
	pub hash: TxHash,
	#[serde(flatten)]
	pub status: TransactionStatus,
}

impl TransactionRecord {
	pub fn submitted(hash: TxHash) -> Self {
		Self {
			hash,
			status: TransactionStatus::Pending,
		}
	}

	/// Move a pending record to a terminal status. Terminal records are left untouched.
	pub fn settle(&mut self, status: TransactionStatus) {
		if !self.status.is_terminal() {
			self.status = status;
		}
	}

	/// Turn a settled record into the caller-facing result.
	pub fn into_result(self) -> Result<Self, ConfirmationError> {
		match self.status {
			TransactionStatus::Confirmed { .. } => Ok(self),
			TransactionStatus::Failed {
				block_number,
				receipt_status,
			} => Err(ConfirmationError::Failed {
				tx_hash: self.hash,
				block_number,
				receipt_status,
			}),
			TransactionStatus::Pending | TransactionStatus::Indeterminate => {
				Err(ConfirmationError::Indeterminate { tx_hash: self.hash })
			}
		}
	}
}

/// Outcome of a confirmation wait that did not end in success.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfirmationError {
	#[error("transaction {tx_hash} outcome is unknown: no receipt before the deadline")]
	Indeterminate { tx_hash: TxHash },

	#[error("transaction {tx_hash} was mined in block {block_number} but failed (status {receipt_status})")]
	Failed {
		tx_hash: TxHash,
		block_number: u64,
		receipt_status: u64,
	},
}

/// Error types for ledger reads and writes
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
	#[error("Connection error: {0}")]
	Connection(String),

	#[error("Deadline exceeded while waiting for {0}")]
	DeadlineExceeded(&'static str),

	#[error("Node error {code}: {message}")]
	Node { code: i64, message: String },

	#[error("Decode error: {0}")]
	Decode(String),

	#[error("Signing error: {0}")]
	Signing(String),

	#[error("Submission rejected: {0}")]
	Submission(String),

	#[error("Confirmation error: {0}")]
	Confirmation(#[from] ConfirmationError),
}
