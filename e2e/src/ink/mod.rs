//! Suites for ink! contracts on a development node. They need funded end user wallets, so
//! `END_USER_WALLET_1_URI` and `END_USER_WALLET_2_URI` must be set.

mod code_hash;
mod deposit;
mod events;
mod flipper;
mod gas;
mod nonce;
mod size;

use anyhow::Context;
use hex_literal::hex;
use ice_test_harness::{
	TestContext, Wallet,
	constants::ICZ,
	ink::{ContractHandle, DEFAULT_GAS_LIMIT, TxOptions},
};
use pretty_assertions::assert_eq;

pub(crate) const DEPLOY_STORAGE_LIMIT: u128 = 10 * ICZ;
pub(crate) const END_USER_FUNDS: u128 = 1_000 * ICZ;
pub(crate) const ACCUMULATOR_CODE_HASH: [u8; 32] =
	hex!("e0d83c067d9abf593a8089ef1f21fc30fafb02a8dd67a862f8ca47eb158735b9");
/// SS58 addresses of the development chain.
pub(crate) const ADDRESS_LEN: usize = 49;

pub(crate) fn deploy_options(context: &TestContext) -> TxOptions {
	TxOptions::default()
		.with_gas(DEFAULT_GAS_LIMIT)
		.with_storage_deposit_limit(DEPLOY_STORAGE_LIMIT)
		.with_timeout(context.tx_timeout())
}

/// Options of calls and dry runs: default gas and no storage deposit limit.
pub(crate) fn call_options(context: &TestContext) -> TxOptions {
	TxOptions::default().with_timeout(context.tx_timeout())
}

pub(crate) fn end_user(context: &TestContext, index: usize) -> anyhow::Result<&Wallet> {
	context
		.end_users
		.get(index)
		.with_context(|| format!("END_USER_WALLET_{}_URI is not set", index + 1))
}

/// The contract got a regular address and was created in the latest block.
pub(crate) async fn assert_deployed_in_last_block(
	context: &TestContext,
	handle: &ContractHandle,
) -> anyhow::Result<()> {
	let last = context.connection.last_block().await?;
	assert_eq!(handle.address.len(), ADDRESS_LEN);
	assert_eq!(handle.block_number, last.number);
	Ok(())
}
