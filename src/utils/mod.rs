//!
//! Utility module for the sync service.
//!
//! Re-exports JSON-RPC quantity and hex helpers used by the ledger client.
/// Hex quantity and data helpers
pub mod quantity;

pub use quantity::{decode_hex_data, encode_hex_data, parse_quantity};
