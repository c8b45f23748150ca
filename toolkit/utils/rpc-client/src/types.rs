//! Shared value types and the number normalization used by every query.

use bigdecimal::{BigDecimal, num_bigint::BigInt};
use serde::{Deserialize, Deserializer};

/// Balances and other quantities that can exceed 64 bits.
pub type Balance = BigDecimal;

/// Parses a node quantity: `0x`-prefixed hex or a plain decimal string.
pub fn parse_quantity(raw: &str) -> Result<Balance, String> {
	let raw = raw.trim();
	let value = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
		Some("") => Some(BigInt::from(0u8)),
		Some(hex) => BigInt::parse_bytes(hex.as_bytes(), 16),
		None => BigInt::parse_bytes(raw.as_bytes(), 10),
	};
	value
		.map(|v| BigDecimal::new(v, 0))
		.ok_or_else(|| format!("'{raw}' is not a valid quantity"))
}

pub fn parse_hex_u64(raw: &str) -> Result<u64, String> {
	let hex = raw.strip_prefix("0x").unwrap_or(raw);
	if hex.is_empty() {
		return Ok(0);
	}
	u64::from_str_radix(hex, 16).map_err(|e| format!("'{raw}' is not a valid hex number: {e}"))
}

pub fn balance_from_u128(value: u128) -> Balance {
	BigDecimal::new(BigInt::from(value), 0)
}

pub fn deserialize_hex_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
	let raw = String::deserialize(deserializer)?;
	parse_hex_u64(&raw).map_err(serde::de::Error::custom)
}

pub fn deserialize_opt_hex_u64<'de, D: Deserializer<'de>>(
	deserializer: D,
) -> Result<Option<u64>, D::Error> {
	Option::<String>::deserialize(deserializer)?
		.map(|raw| parse_hex_u64(&raw).map_err(serde::de::Error::custom))
		.transpose()
}

pub fn deserialize_quantity<'de, D: Deserializer<'de>>(
	deserializer: D,
) -> Result<Balance, D::Error> {
	let raw = String::deserialize(deserializer)?;
	parse_quantity(&raw).map_err(serde::de::Error::custom)
}

/// A block identified by both its number and hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockRef {
	pub number: u64,
	pub hash: String,
}

/// `0x` followed by 64 hex characters.
pub fn is_block_hash(hash: &str) -> bool {
	hash.len() == 66
		&& hash.starts_with("0x")
		&& hash[2..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	#[test]
	fn parses_hex_and_decimal_quantities() {
		assert_eq!(parse_quantity("0x0").unwrap(), BigDecimal::from(0));
		assert_eq!(parse_quantity("0x").unwrap(), BigDecimal::from(0));
		assert_eq!(parse_quantity("0x200000000000000000").unwrap(), {
			BigDecimal::from_str("590295810358705651712").unwrap()
		});
		assert_eq!(
			parse_quantity("340282366920938463463364607431768211455").unwrap(),
			balance_from_u128(u128::MAX)
		);
	}

	#[test]
	fn rejects_garbage_quantities() {
		assert!(parse_quantity("0xzz").is_err());
		assert!(parse_quantity("twelve").is_err());
	}

	#[test]
	fn hex_numbers() {
		assert_eq!(parse_hex_u64("0x1a").unwrap(), 26);
		assert_eq!(parse_hex_u64("0x").unwrap(), 0);
		assert!(parse_hex_u64("0xfffffffffffffffff").is_err());
	}

	#[test]
	fn block_hash_shape() {
		assert!(is_block_hash(&format!("0x{}", "ab".repeat(32))));
		assert!(!is_block_hash("0x1234"));
		assert!(!is_block_hash(&format!("0x{}", "zz".repeat(32))));
	}
}
