//! Minimal RLP encoder, enough to serialize legacy transactions.

/// Encode a byte string.
pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
	if bytes.len() == 1 && bytes[0] < 0x80 {
		return bytes.to_vec();
	}
	let mut out = length_prefix(0x80, bytes.len());
	out.extend_from_slice(bytes);
	out
}

/// Encode an unsigned integer as its minimal big-endian byte string.
pub fn encode_uint(value: u128) -> Vec<u8> {
	encode_bytes(trim_leading_zeros(&value.to_be_bytes()))
}

/// Encode a big-endian integer given as raw bytes (for example a signature scalar).
pub fn encode_uint_bytes(bytes: &[u8]) -> Vec<u8> {
	encode_bytes(trim_leading_zeros(bytes))
}

/// Encode a list of already-encoded items.
pub fn encode_list(items: &[Vec<u8>]) -> Vec<u8> {
	let payload_len = items.iter().map(Vec::len).sum();
	let mut out = length_prefix(0xc0, payload_len);
	for item in items {
		out.extend_from_slice(item);
	}
	out
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
	let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
	&bytes[first..]
}

fn length_prefix(offset: u8, len: usize) -> Vec<u8> {
	if len <= 55 {
		return vec![offset + len as u8];
	}
	let len_bytes = trim_leading_zeros(&len.to_be_bytes()).to_vec();
	let mut out = Vec::with_capacity(1 + len_bytes.len() + len);
	out.push(offset + 55 + len_bytes.len() as u8);
	out.extend_from_slice(&len_bytes);
	out
}
