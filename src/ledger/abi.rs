//! ABI codec for the storage contract's `get()` and `set(uint256)` functions.

use super::types::{LedgerValue, ValueError, WORD_LEN};
use sha3::{Digest, Keccak256};

pub const GET_SIGNATURE: &str = "get()";
pub const SET_SIGNATURE: &str = "set(uint256)";

pub fn keccak256(data: &[u8]) -> [u8; 32] {
	Keccak256::digest(data).into()
}

/// First four bytes of the Keccak-256 hash of a function signature.
pub fn selector(signature: &str) -> [u8; 4] {
	let hash = keccak256(signature.as_bytes());
	[hash[0], hash[1], hash[2], hash[3]]
}

/// Calldata for `get()`.
pub fn encode_get() -> Vec<u8> {
	selector(GET_SIGNATURE).to_vec()
}

/// Calldata for `set(uint256)`.
pub fn encode_set(value: &LedgerValue) -> Result<Vec<u8>, ValueError> {
	let word = value.to_word()?;
	let mut data = Vec::with_capacity(4 + WORD_LEN);
	data.extend_from_slice(&selector(SET_SIGNATURE));
	data.extend_from_slice(&word);
	Ok(data)
}

/// Decode the single `uint256` returned by `get()`.
pub fn decode_get(output: &[u8]) -> Result<LedgerValue, ValueError> {
	LedgerValue::from_word(output)
}
