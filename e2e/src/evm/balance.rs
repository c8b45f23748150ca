use super::{address, send_as_genesis};
use alloy::{network::TransactionBuilder, primitives::U256, rpc::types::TransactionRequest};
use anyhow::Context;
use bigdecimal::ToPrimitive;
use ice_rpc_client::{
	eth::{BlockTag, EthRpc},
	types::balance_from_u128,
};
use ice_test_harness::{
	ChainTarget, TestContext,
	constants::{EXISTENTIAL_DEPOSIT, GENESIS_ACCOUNT, GENESIS_ACCOUNT_BALANCE},
	describe_with_context,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

/// More than the existential deposit, so the receiving account gets created.
const VALUE: u128 = 0x200000000000000000;
const GAS_LIMIT: u64 = 0x100000;
const TRANSFER_GAS: u128 = 21_000;

async fn transfer_from_genesis(context: &TestContext, to: &str) -> anyhow::Result<u128> {
	let gas_price = context.eth().gas_price().await?;
	let gas_price = gas_price.to_u128().context("gas price does not fit in u128")?;
	let tx = TransactionRequest::default()
		.with_to(address(to)?)
		.with_value(U256::from(VALUE))
		.with_gas_price(gas_price)
		.with_gas_limit(GAS_LIMIT);
	let receipt = send_as_genesis(context, tx).await?;
	assert_eq!(receipt.status, Some(1), "transfer {} failed", receipt.transaction_hash);
	Ok(gas_price)
}

async fn balance_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	const TEST_ACCOUNT: &str = "0x4ebaae1dce71f2536d502ab2a0d4dce7fc740140";
	let eth = context.eth();

	log::info!("🌟 genesis balance is setup correctly");
	let genesis = eth.balance(GENESIS_ACCOUNT, BlockTag::Latest).await?;
	assert_eq!(genesis, balance_from_u128(GENESIS_ACCOUNT_BALANCE));

	log::info!("🌟 balance to be updated after transfer");
	let gas_price = transfer_from_genesis(&context, TEST_ACCOUNT).await?;
	let expected_genesis = GENESIS_ACCOUNT_BALANCE - TRANSFER_GAS * gas_price - VALUE;
	assert_eq!(
		eth.balance(GENESIS_ACCOUNT, BlockTag::Latest).await?,
		balance_from_u128(expected_genesis)
	);
	assert_eq!(
		eth.balance(TEST_ACCOUNT, BlockTag::Latest).await?,
		balance_from_u128(VALUE - EXISTENTIAL_DEPOSIT)
	);
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn balance() -> anyhow::Result<()> {
	describe_with_context("Ice RPC (Balance)", ChainTarget::Local, balance_steps).await
}

async fn nonce_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	const TEST_ACCOUNT: &str = "0x1111111111111111111111111111111111111111";
	let eth = context.eth();

	log::info!("🌟 get nonce");
	assert_eq!(eth.transaction_count(GENESIS_ACCOUNT, BlockTag::Earliest).await?, 0);

	transfer_from_genesis(&context, TEST_ACCOUNT).await?;

	assert_eq!(eth.transaction_count(GENESIS_ACCOUNT, BlockTag::Latest).await?, 1);
	assert_eq!(eth.transaction_count(GENESIS_ACCOUNT, BlockTag::Earliest).await?, 0);
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn nonce() -> anyhow::Result<()> {
	describe_with_context("Ice RPC (Nonce)", ChainTarget::Local, nonce_steps).await
}
