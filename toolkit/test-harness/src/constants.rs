//! Genesis state and runtime constants of the development chain.

pub const GENESIS_ACCOUNT: &str = "0x8efcaf2c4ebbf88bf07f3bb44a2869c4c675ad7a";
pub const GENESIS_ACCOUNT_PRIVATE_KEY: &str =
	"0x3e2400cd858aa8d07c0c923e307fc1259ee5a8932d05f92f55be5d4589082542";
/// `2^128 - 1`
pub const GENESIS_ACCOUNT_BALANCE: u128 = u128::MAX;

/// Address of the first contract created by [GENESIS_ACCOUNT].
pub const FIRST_CONTRACT_ADDRESS: &str = "0xc2bf5f29a4384b1ab0c063e1c666f02121b6084a";

pub const CHAIN_ID: u64 = 554;
pub const EXISTENTIAL_DEPOSIT: u128 = 10_000_000_000_000_000;
pub const BLOCK_GAS_LIMIT: u64 = 60_000_000;
/// Above this the node refuses `eth_call` and `eth_estimateGas`.
pub const EXTRINSIC_GAS_LIMIT: u64 = 65_000_000;

pub const RUNTIME_SPEC_NAME: &str = "frost-testnet";
pub const RUNTIME_SPEC_VERSION: u32 = 1;

/// One ICZ in its smallest unit.
pub const ICZ: u128 = 1_000_000_000_000_000_000;
