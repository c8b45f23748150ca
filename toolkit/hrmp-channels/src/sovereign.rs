//! Accounts derived from identifiers by padding a fixed prefix with zeros, like the relay
//! chain does for parachains and pallets.

fn padded(parts: &[&[u8]]) -> [u8; 32] {
	let mut account = [0u8; 32];
	let bytes: Vec<u8> = parts.concat();
	let len = bytes.len().min(32);
	account[..len].copy_from_slice(&bytes[..len]);
	account
}

/// Account of a parachain on its relay chain: `"para" ++ u32_le(para_id)` padded with zeros.
pub fn sovereign_account(para_id: u32) -> [u8; 32] {
	padded(&[b"para", &para_id.to_le_bytes()])
}

/// Account of a pallet: `"modl" ++ id` padded with zeros and truncated to 32 bytes.
pub fn module_account(id: &str) -> [u8; 32] {
	padded(&[b"modl", id.as_bytes()])
}

#[cfg(test)]
mod tests {
	use super::*;
	use hex_literal::hex;
	use ice_test_harness::wallet::to_ss58;
	use pretty_assertions::assert_eq;

	#[test]
	fn parachain_sovereign_accounts() {
		assert_eq!(
			sovereign_account(2000),
			hex!("70617261d0070000000000000000000000000000000000000000000000000000")
		);
		assert_eq!(
			to_ss58(&sovereign_account(2000), 42),
			"5Ec4AhPUwPeyTFyuhGuBbD224mY85LKLMSqSSo33JYWCazU4"
		);
	}

	#[test]
	fn module_accounts_are_truncated() {
		assert_eq!(
			module_account("py/trsry"),
			hex!("6d6f646c70792f74727372790000000000000000000000000000000000000000")
		);
		let long = module_account(&"x".repeat(40));
		assert_eq!(&long[..4], b"modl");
		assert_eq!(&long[4..], &[b'x'; 28]);
	}
}
