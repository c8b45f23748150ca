use super::wait_for_block_after;
use ice_rpc_client::{
	RawRpc,
	eth::{BlockTag, EthRpc},
	rpc_params,
	substrate::SubstrateRpc,
	types::parse_hex_u64,
};
use ice_test_harness::{
	ChainTarget, TestContext,
	constants::{CHAIN_ID, RUNTIME_SPEC_NAME, RUNTIME_SPEC_VERSION},
	describe_with_context,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

async fn constant_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let eth = context.eth();

	log::info!("🌟 should have 0 hashrate");
	let hashrate: String = eth.request("eth_hashrate", rpc_params![]).await?;
	assert_eq!(parse_hex_u64(&hashrate).map_err(anyhow::Error::msg)?, 0);

	log::info!("🌟 should have chainId");
	assert_eq!(eth.chain_id().await?, CHAIN_ID);

	log::info!("🌟 should have no account");
	let accounts: Vec<String> = eth.request("eth_accounts", rpc_params![]).await?;
	assert_eq!(accounts, Vec::<String>::new());

	log::info!("🌟 should run the {RUNTIME_SPEC_NAME} runtime");
	let version = eth.runtime_version().await?;
	assert_eq!(version.spec_name, RUNTIME_SPEC_NAME);
	assert_eq!(version.spec_version, RUNTIME_SPEC_VERSION);
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn rpc_constants() -> anyhow::Result<()> {
	describe_with_context("Ice RPC (Constant)", ChainTarget::Local, constant_steps).await
}

async fn fee_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let eth = context.eth();

	log::info!("🌟 should return error on non-existent blocks");
	let err = eth.fee_history(0, BlockTag::Number(1), &[]).await.unwrap_err();
	assert_eq!(err.call_message(), Some("Error getting header at BlockId::Number(1)"));

	log::info!("🌟 max priority fee should default to zero on genesis");
	assert_eq!(eth.max_priority_fee_per_gas().await?, "0x0");

	log::info!("🌟 max priority fee should default to zero on empty blocks");
	let latest = eth.block_by_tag(BlockTag::Latest).await?.and_then(|b| b.number).unwrap_or(0);
	wait_for_block_after(&context, latest).await?;
	assert_eq!(eth.max_priority_fee_per_gas().await?, "0x0");
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn fees() -> anyhow::Result<()> {
	describe_with_context("Ice RPC (Fee History)", ChainTarget::Local, fee_steps).await
}

async fn block_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let eth = context.eth();

	log::info!("🌟 `earliest` returns genesis");
	let earliest = eth.block_by_tag(BlockTag::Earliest).await?;
	assert_eq!(earliest.and_then(|b| b.number), Some(0));

	log::info!("🌟 should calculate a valid intermediate state root hash");
	let Some(block) = eth.block_by_tag(BlockTag::Latest).await? else {
		anyhow::bail!("node returned no latest block");
	};
	assert_eq!(block.state_root.len(), 66, "state root is 0x prefixed");

	log::info!("🌟 hash should be unique between blocks");
	wait_for_block_after(&context, block.number.unwrap_or(0)).await?;
	let Some(another) = eth.block_by_tag(BlockTag::Latest).await? else {
		anyhow::bail!("node returned no latest block");
	};
	assert_ne!(block.state_root, another.state_root);
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn blocks() -> anyhow::Result<()> {
	describe_with_context("Ice RPC (Blocks)", ChainTarget::Local, block_steps).await
}
