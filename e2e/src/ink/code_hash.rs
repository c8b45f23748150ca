use super::{
	ACCUMULATOR_CODE_HASH, END_USER_FUNDS, assert_deployed_in_last_block, call_options,
	deploy_options, end_user,
};
use crate::assets::{ACCUMULATOR, ADDER};
use ice_test_harness::{
	ChainTarget, TestContext, TxParams, describe_with_context,
	ink::{self, Args},
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

/// Upper bound of what the caller may keep on top of the refunded deposit.
const MAX_RESIDUE: i128 = 20_000_000_000_000_000;
/// Ceiling of the fee paid for `tear_down`, 0.05 ICZ.
const TERMINATE_TX_FEE: i128 = 50_000_000_000_000_000;

fn adder_args() -> Args {
	Args::new().push(0i32).push(1u32).push(ACCUMULATOR_CODE_HASH)
}

async fn code_hash_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	context.fund_end_user_wallets(END_USER_FUNDS).await?;
	let options = deploy_options(&context);
	let accumulator = ACCUMULATOR.load(&context.config)?;
	let adder = ADDER.load(&context.config)?;
	let new_adder = adder.constructor_call("new", adder_args())?;

	log::info!(
		"🌟 Instantiating adder contract before accumulator code hash is available on-chain should fail"
	);
	let err = ink::deploy(&context.connection, &adder, &new_adder, &options, &context.keyring)
		.await
		.unwrap_err();
	assert_eq!(err.dispatch_name(), Some("ContractTrapped"), "{err}");

	log::info!(
		"🌟 Instantiating adder contract after accumulator code hash is available on-chain should succeed"
	);
	let new_accumulator = accumulator.constructor_call("new", Args::new().push(0i32))?;
	let handle =
		ink::deploy(&context.connection, &accumulator, &new_accumulator, &options, &context.keyring)
			.await?;
	let expected_hash = format!("0x{}", hex::encode(ACCUMULATOR_CODE_HASH));
	assert_eq!(handle.code_hash.as_deref(), Some(expected_hash.as_str()));

	let deployer = end_user(&context, 0)?;
	let adder_handle =
		ink::deploy(&context.connection, &adder, &new_adder, &options, deployer).await?;
	assert_deployed_in_last_block(&context, &adder_handle).await?;

	log::info!("🌟 Whoever removes the contract code hash should be refunded the contract deposit");
	let caller = end_user(&context, 1)?;
	let initial = context.connection.account_info(&caller.account()).await?.free;
	let deposit = context.connection.account_info(&adder_handle.account()?).await?.reserved;
	let tear_down = adder.message_call("tear_down", Args::new())?;
	ink::write(
		&context.connection,
		&adder_handle,
		&tear_down,
		&call_options(&context),
		caller,
		TxParams::default(),
	)
	.await?;
	let last = context.connection.account_info(&caller.account()).await?.free;

	let residue = last as i128 - initial as i128 + TERMINATE_TX_FEE - deposit as i128;
	assert!(
		(0..=MAX_RESIDUE).contains(&residue),
		"contract deposit of {deposit} not properly refunded, residue {residue}"
	);
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn code_hash() -> anyhow::Result<()> {
	describe_with_context("Ice ink! (Code hash)", ChainTarget::Local, code_hash_steps).await
}
