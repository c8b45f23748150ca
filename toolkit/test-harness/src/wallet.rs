//! Substrate (sr25519) and EVM (secp256k1) accounts used by the suites.

use crate::error::HarnessError;
use alloy::{primitives::Address, signers::local::PrivateKeySigner};
use sp_core::crypto::{AccountId32, Ss58AddressFormat, Ss58Codec};
use std::str::FromStr;
use subxt_signer::{SecretUri, sr25519::Keypair};

pub const ALICE_URI: &str = "//Alice";

/// An sr25519 keypair together with its address on a given chain.
#[derive(Clone)]
pub struct Wallet {
	keypair: Keypair,
	address: String,
}

impl Wallet {
	pub fn from_uri(uri: &str, ss58_prefix: u16) -> Result<Self, HarnessError> {
		let secret_uri = SecretUri::from_str(uri).map_err(|e| HarnessError::Wallet(e.to_string()))?;
		let keypair =
			Keypair::from_uri(&secret_uri).map_err(|e| HarnessError::Wallet(e.to_string()))?;
		let address = to_ss58(&keypair.public_key().0, ss58_prefix);
		Ok(Self { keypair, address })
	}

	pub fn keypair(&self) -> &Keypair {
		&self.keypair
	}

	pub fn account(&self) -> [u8; 32] {
		self.keypair.public_key().0
	}

	/// SS58 address with the chain prefix.
	pub fn address(&self) -> &str {
		&self.address
	}
}

impl std::fmt::Debug for Wallet {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Wallet").field("address", &self.address).finish()
	}
}

pub fn to_ss58(account: &[u8; 32], ss58_prefix: u16) -> String {
	AccountId32::from(*account).to_ss58check_with_version(Ss58AddressFormat::custom(ss58_prefix))
}

/// Decodes an SS58 address regardless of its prefix.
pub fn from_ss58(address: &str) -> Result<[u8; 32], HarnessError> {
	let (account, _format) = AccountId32::from_ss58check_with_version(address)
		.map_err(|e| HarnessError::Wallet(format!("'{address}' is not a valid address: {e:?}")))?;
	Ok(account.into())
}

/// A secp256k1 key for the EVM side of the chain.
#[derive(Clone, Debug)]
pub struct EvmWallet {
	signer: PrivateKeySigner,
}

impl EvmWallet {
	pub fn from_private_key(key: &str) -> Result<Self, HarnessError> {
		let signer = PrivateKeySigner::from_str(key)
			.map_err(|e| HarnessError::Wallet(format!("Invalid EVM private key: {e}")))?;
		Ok(Self { signer })
	}

	pub fn address(&self) -> Address {
		self.signer.address()
	}

	pub fn signer(&self) -> &PrivateKeySigner {
		&self.signer
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::constants::{GENESIS_ACCOUNT, GENESIS_ACCOUNT_PRIVATE_KEY};
	use hex_literal::hex;
	use pretty_assertions::assert_eq;

	const ALICE_PUBLIC: [u8; 32] =
		hex!("d43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d");

	#[test]
	fn alice_on_a_custom_prefix() {
		let wallet = Wallet::from_uri(ALICE_URI, 2208).unwrap();
		assert_eq!(wallet.account(), ALICE_PUBLIC);
		assert_eq!(wallet.address().len(), 49);
		assert_eq!(from_ss58(wallet.address()).unwrap(), ALICE_PUBLIC);
	}

	#[test]
	fn generic_prefix_matches_the_well_known_address() {
		assert_eq!(to_ss58(&ALICE_PUBLIC, 42), "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY");
	}

	#[test]
	fn garbage_addresses_are_rejected() {
		assert!(from_ss58("npNUJVfr8T7Px").is_err());
	}

	#[test]
	fn genesis_evm_wallet() {
		let wallet = EvmWallet::from_private_key(GENESIS_ACCOUNT_PRIVATE_KEY).unwrap();
		assert_eq!(wallet.address().to_string().to_lowercase(), GENESIS_ACCOUNT);
	}
}
