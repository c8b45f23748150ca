use super::{assert_deployed_in_last_block, call_options, end_user};
use crate::assets::FLIPPER;
use ice_test_harness::{
	ChainTarget, TestContext, TxParams, describe_with_context,
	constants::ICZ,
	ink::{self, Args, ContractHandle, InkContract, TxOptions},
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const GAS_LIMIT: u64 = 1_000_000_000_000;

async fn flip_state(
	context: &TestContext,
	flipper: &InkContract,
	handle: &ContractHandle,
) -> anyhow::Result<bool> {
	let get = flipper.message_call("get", Args::new())?;
	let sender = end_user(context, 0)?.account();
	let options = call_options(context).with_gas(GAS_LIMIT);
	let dry_run = ink::query(&context.connection, handle, &get, &sender, &options).await?;
	Ok(dry_run.decode::<bool>()?)
}

async fn flipper_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let flipper = FLIPPER.load(&context.config)?;

	log::info!("🌟 Uploading a simple contract should give contract address and blockHash");
	let options = TxOptions::default()
		.with_gas(GAS_LIMIT)
		.with_storage_deposit_limit(10 * ICZ)
		.with_timeout(context.tx_timeout());
	let new = flipper.constructor_call("new", Args::new().push(false))?;
	let handle =
		ink::deploy(&context.connection, &flipper, &new, &options, &context.keyring).await?;
	assert_deployed_in_last_block(&context, &handle).await?;

	log::info!("🌟 Querying read method on simple contract should yield valid result");
	assert!(!flip_state(&context, &flipper, &handle).await?);

	log::info!("🌟 Calling a write-contract method should update the simple contract's state");
	let flip = flipper.message_call("flip", Args::new())?;
	ink::write(&context.connection, &handle, &flip, &options, &context.keyring, TxParams::default())
		.await?;
	assert_eq!(flip_state(&context, &flipper, &handle).await?, true);
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn read_and_write() -> anyhow::Result<()> {
	describe_with_context("Ice ink! (Flipper)", ChainTarget::Local, flipper_steps).await
}
