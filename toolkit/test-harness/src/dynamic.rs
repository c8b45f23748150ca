//! Conversions between plain Rust values and the dynamic values subxt encodes against chain
//! metadata.

use crate::error::HarnessError;
use subxt::ext::scale_value::{Primitive, Value, ValueDef};

pub fn account(account: &[u8; 32]) -> Value {
	Value::from_bytes(account)
}

/// `MultiAddress::Id`, the lookup source of the Ice runtimes.
pub fn multi_address(account: &[u8; 32]) -> Value {
	Value::unnamed_variant("Id", [Value::from_bytes(account)])
}

pub fn option(value: Option<Value>) -> Value {
	match value {
		Some(value) => Value::unnamed_variant("Some", [value]),
		None => Value::unnamed_variant("None", []),
	}
}

pub fn weight(ref_time: u64, proof_size: u64) -> Value {
	Value::named_composite([
		("ref_time", Value::u128(ref_time as u128)),
		("proof_size", Value::u128(proof_size as u128)),
	])
}

/// Narrows a decoded integer to the width the caller stores it in, failing where a cast
/// would truncate.
pub fn narrow<N: TryFrom<u128>>(what: &'static str, value: u128) -> Result<N, HarnessError> {
	N::try_from(value).map_err(|_| HarnessError::decode(what, format!("{value} is out of range")))
}

/// Flattens a decoded byte array, hash or account (possibly wrapped in newtypes) to its bytes.
pub fn to_bytes<T>(value: &Value<T>) -> Option<Vec<u8>> {
	let mut bytes = Vec::new();
	collect_bytes(value, &mut bytes).then_some(bytes)
}

fn collect_bytes<T>(value: &Value<T>, out: &mut Vec<u8>) -> bool {
	match &value.value {
		ValueDef::Composite(composite) => composite.values().all(|v| collect_bytes(v, out)),
		ValueDef::Primitive(Primitive::U128(n)) => u8::try_from(*n).map(|b| out.push(b)).is_ok(),
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn flattens_newtype_wrapped_hashes() {
		let hash = Value::unnamed_composite([Value::from_bytes([7u8; 32])]);
		assert_eq!(to_bytes(&hash), Some(vec![7u8; 32]));
	}

	#[test]
	fn narrowing_keeps_values_that_fit() {
		assert_eq!(narrow::<u64>("System.Account", 7).unwrap(), 7);
		assert_eq!(narrow::<u32>("ActiveConfig", u32::MAX as u128).unwrap(), u32::MAX);
	}

	#[test]
	fn narrowing_refuses_to_truncate() {
		let err = narrow::<u32>("ActiveConfig", u32::MAX as u128 + 1).unwrap_err();
		assert_eq!(err.to_string(), "Could not decode ActiveConfig: 4294967296 is out of range");
		assert!(narrow::<u64>("System.Account", u128::MAX).is_err());
	}

	#[test]
	fn refuses_non_byte_values() {
		assert_eq!(to_bytes(&Value::u128(256)), None);
		assert_eq!(to_bytes(&Value::string("0x00")), None);
	}
}
