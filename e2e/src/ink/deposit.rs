use super::{END_USER_FUNDS, end_user};
use crate::assets::ACCUMULATOR;
use ice_test_harness::{
	ChainTarget, TestContext,
	constants::ICZ,
	describe_with_context,
	ink::{self, Args, TxOptions},
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

/// Reserved from the first account uploading the accumulator code.
const DEPLOYER_RESERVE: u128 = 4_825_600_000_000_000_000;
/// Reserved on every accumulator instance.
const CTX_RESERVE: u128 = 2_006_100_000_000_000_000;
const DEPLOY_GAS_LIMIT: u64 = 600_000_000_000;
const MIN_DEPLOY_STORAGE_LIMIT: u128 = 2 * ICZ;

async fn deposit_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	context.fund_end_user_wallets(END_USER_FUNDS).await?;
	let accumulator = ACCUMULATOR.load(&context.config)?;
	let new = accumulator.constructor_call("new", Args::new().push(0i32))?;
	let options = TxOptions::default()
		.with_gas(DEPLOY_GAS_LIMIT)
		.with_storage_deposit_limit(10 * ICZ)
		.with_timeout(context.tx_timeout());

	log::info!("🌟 should fail deploying with too low storage deposit limit");
	let first = end_user(&context, 0)?;
	let too_low = options.with_storage_deposit_limit(MIN_DEPLOY_STORAGE_LIMIT);
	let err = ink::deploy(&context.connection, &accumulator, &new, &too_low, first)
		.await
		.unwrap_err();
	assert_eq!(err.dispatch_name(), Some("StorageDepositLimitExhausted"), "{err}");

	log::info!("🌟 should reserve code and contract deposits on the first deploy");
	let handle = ink::deploy(&context.connection, &accumulator, &new, &options, first).await?;
	let deployer = context.connection.account_info(&first.account()).await?;
	let contract = context.connection.account_info(&handle.account()?).await?;
	assert_eq!(deployer.reserved, DEPLOYER_RESERVE);
	assert_eq!(contract.reserved, CTX_RESERVE);

	log::info!("🌟 should only reserve the contract deposit when the code is already stored");
	let second = end_user(&context, 1)?;
	let handle = ink::deploy(&context.connection, &accumulator, &new, &options, second).await?;
	let deployer = context.connection.account_info(&second.account()).await?;
	let contract = context.connection.account_info(&handle.account()?).await?;
	assert_eq!(deployer.reserved, 0);
	assert_eq!(contract.reserved, CTX_RESERVE);
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn storage_deposit() -> anyhow::Result<()> {
	describe_with_context("Ice ink! (Storage deposit)", ChainTarget::Local, deposit_steps).await
}
