use super::ADDRESS_LEN;
use crate::assets::{LARGE_INVALID, LARGE_VALID};
use ice_test_harness::{
	ChainTarget, TestContext,
	constants::ICZ,
	describe_with_context,
	ink::{self, Args, TxOptions},
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const MAX_GAS_LIMIT: u64 = 1_200_000_000_000;

async fn size_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let options = TxOptions::default()
		.with_gas(MAX_GAS_LIMIT)
		.with_storage_deposit_limit(10 * ICZ)
		.with_timeout(context.tx_timeout());
	let args = || Args::new().push(1u32);

	log::info!("🌟 should reject code above the size limit");
	let invalid = LARGE_INVALID.load(&context.config)?;
	let new = invalid.constructor_call("new", args())?;
	let err = ink::deploy(&context.connection, &invalid, &new, &options, &context.keyring)
		.await
		.unwrap_err();
	assert_eq!(err.dispatch_name(), Some("CodeTooLarge"), "{err}");

	log::info!("🌟 should deploy code right below the size limit");
	let valid = LARGE_VALID.load(&context.config)?;
	let new = valid.constructor_call("new", args())?;
	let handle = ink::deploy(&context.connection, &valid, &new, &options, &context.keyring).await?;
	assert_eq!(handle.address.len(), ADDRESS_LEN);
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn contract_size() -> anyhow::Result<()> {
	describe_with_context("Ice ink! (Contract size)", ChainTarget::Local, size_steps).await
}
