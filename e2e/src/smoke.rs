use ice_rpc_client::{substrate::SubstrateRpc, types::is_block_hash};
use ice_test_harness::{TestContext, describe};
use std::sync::Arc;

async fn smoke_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	log::info!("🌟 should report the last block");
	let last = context.connection.last_block().await?;
	assert!(is_block_hash(&last.hash), "{} is not a block hash", last.hash);

	let chain = context.eth().system_chain().await?;
	log::info!("Connected to {chain} at block #{}", last.number);
	Ok(())
}

/// Targets `ICE_CHAIN` when set, so it doubles as a connectivity check of live networks.
#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn smoke() -> anyhow::Result<()> {
	describe("Ice node smoke", smoke_steps).await
}
