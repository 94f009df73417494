//! Ledger integration module
//!
//! This module provides everything needed to talk to the storage contract on an
//! Ethereum-compatible node over JSON-RPC:
//!
//! - `types`: Contract value, address and transaction hash types, plus the ledger error enum.
//! - `abi`: Encoding of the contract's `get()` and `set(uint256)` calls.
//! - `rlp`: Minimal RLP encoder used for legacy transaction signing.
//! - `signer`: Signer identity and EIP-155 transaction signing.
//! - `rpc`: JSON-RPC transport over HTTP.
//! - `client`: The [`LedgerClient`] trait and its JSON-RPC implementation.

/// Contract call encoding
pub mod abi;
/// Read, write and confirm against the bound contract
pub mod client;
/// Recursive length prefix encoding
mod rlp;
/// JSON-RPC transport
pub mod rpc;
/// Transaction signing
pub mod signer;
/// Ledger value and transaction types
pub mod types;

pub use client::{ContractClient, ContractClientConfig, LedgerClient};
pub use rpc::JsonRpcClient;
pub use signer::SignerIdentity;
pub use types::*;
