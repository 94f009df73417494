use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
	#[error("missing 0x prefix: {0}")]
	MissingPrefix(String),

	#[error("invalid hex quantity {0}")]
	Invalid(String),
}

/// Parse a JSON-RPC hex quantity such as `0x1a` into an integer.
pub fn parse_quantity(raw: &str) -> Result<u128, QuantityError> {
	let digits = raw
		.strip_prefix("0x")
		.ok_or_else(|| QuantityError::MissingPrefix(raw.to_string()))?;
	if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
		return Err(QuantityError::Invalid(raw.to_string()));
	}
	u128::from_str_radix(digits, 16).map_err(|_| QuantityError::Invalid(raw.to_string()))
}

/// Decode `0x`-prefixed (or bare) hex data.
pub fn decode_hex_data(raw: &str) -> Result<Vec<u8>, hex::FromHexError> {
	hex::decode(raw.strip_prefix("0x").unwrap_or(raw))
}

pub fn encode_hex_data(bytes: &[u8]) -> String {
	format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_quantities() {
		assert_eq!(parse_quantity("0x0"), Ok(0));
		assert_eq!(parse_quantity("0x539"), Ok(1337));
		assert_eq!(
			parse_quantity("539"),
			Err(QuantityError::MissingPrefix("539".to_string()))
		);
		assert_eq!(parse_quantity("0x"), Err(QuantityError::Invalid("0x".to_string())));
		assert_eq!(parse_quantity("0xzz"), Err(QuantityError::Invalid("0xzz".to_string())));
		assert_eq!(parse_quantity("0x+1"), Err(QuantityError::Invalid("0x+1".to_string())));
		assert_eq!(parse_quantity("0x-1"), Err(QuantityError::Invalid("0x-1".to_string())));
		assert_eq!(parse_quantity("0xAbC"), Ok(0xabc));
	}

	#[test]
	fn hex_data_accepts_optional_prefix() {
		assert_eq!(decode_hex_data("0x0102").unwrap(), vec![1, 2]);
		assert_eq!(decode_hex_data("0102").unwrap(), vec![1, 2]);
		assert_eq!(encode_hex_data(&[0xab, 0x01]), "0xab01");
	}
}
