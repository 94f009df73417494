//!
//! Signer identity and EIP-155 legacy transaction signing.
//!
//! The signer is built once from the configured private key and handed to the ledger
//! client at construction. It is never mutated and never serialized; its `Debug`
//! output shows only the derived address.

use super::abi::keccak256;
use super::rlp;
use super::types::{Address, LedgerError, TxHash};

use k256::ecdsa::{RecoveryId, Signature, SigningKey};
use std::fmt;

/// An unsigned legacy (type 0) transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyTransaction {
	pub nonce: u64,
	pub gas_price: u128,
	pub gas_limit: u64,
	pub to: Address,
	pub value: u128,
	pub data: Vec<u8>,
}

impl LegacyTransaction {
	fn rlp_fields(&self) -> Vec<Vec<u8>> {
		vec![
			rlp::encode_uint(self.nonce as u128),
			rlp::encode_uint(self.gas_price),
			rlp::encode_uint(self.gas_limit as u128),
			rlp::encode_bytes(&self.to.0),
			rlp::encode_uint(self.value),
			rlp::encode_bytes(&self.data),
		]
	}

	/// RLP payload hashed for signing: the six fields followed by `chain_id, 0, 0`.
	pub fn signing_payload(&self, chain_id: u64) -> Vec<u8> {
		let mut fields = self.rlp_fields();
		fields.push(rlp::encode_uint(chain_id as u128));
		fields.push(rlp::encode_uint(0));
		fields.push(rlp::encode_uint(0));
		rlp::encode_list(&fields)
	}

	pub fn signing_hash(&self, chain_id: u64) -> [u8; 32] {
		keccak256(&self.signing_payload(chain_id))
	}
}

/// A signed transaction ready for `eth_sendRawTransaction`.
#[derive(Debug, Clone)]
pub struct SignedTransaction {
	pub raw: Vec<u8>,
	pub hash: TxHash,
}

/// Private key material and its derived address.
pub struct SignerIdentity {
	key: SigningKey,
	address: Address,
}

impl SignerIdentity {
	/// Load a signer from a hex private key, with or without `0x`.
	pub fn from_hex(private_key: &str) -> Result<Self, LedgerError> {
		let bytes = crate::utils::decode_hex_data(private_key.trim())
			.map_err(|e| LedgerError::Signing(format!("private key is not valid hex: {}", e)))?;
		let key = SigningKey::from_slice(&bytes)
			.map_err(|_| LedgerError::Signing("private key is not a valid secp256k1 scalar".to_string()))?;
		let address = derive_address(&key);
		Ok(Self { key, address })
	}

	pub fn address(&self) -> Address {
		self.address
	}

	/// Sign `tx` for `chain_id`, producing the raw encoding and its hash.
	pub fn sign(&self, tx: &LegacyTransaction, chain_id: u64) -> Result<SignedTransaction, LedgerError> {
		let (signature, recovery_id) = self.sign_hash(&tx.signing_hash(chain_id))?;
		let v = chain_id as u128 * 2 + 35 + recovery_id.to_byte() as u128;

		let sig_bytes = signature.to_bytes();
		let (r, s) = sig_bytes.split_at(32);

		let mut fields = tx.rlp_fields();
		fields.push(rlp::encode_uint(v));
		fields.push(rlp::encode_uint_bytes(r));
		fields.push(rlp::encode_uint_bytes(s));
		let raw = rlp::encode_list(&fields);
		let hash = TxHash(keccak256(&raw));

		Ok(SignedTransaction { raw, hash })
	}

	fn sign_hash(&self, hash: &[u8; 32]) -> Result<(Signature, RecoveryId), LedgerError> {
		self.key
			.sign_prehash_recoverable(hash)
			.map_err(|e| LedgerError::Signing(format!("failed to sign transaction: {}", e)))
	}
}

impl fmt::Debug for SignerIdentity {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SignerIdentity")
			.field("address", &self.address.to_string())
			.finish_non_exhaustive()
	}
}

fn derive_address(key: &SigningKey) -> Address {
	let point = key.verifying_key().to_encoded_point(false);
	let hash = keccak256(&point.as_bytes()[1..]);
	let mut address = [0u8; 20];
	address.copy_from_slice(&hash[12..]);
	Address(address)
}
