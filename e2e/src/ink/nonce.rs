use super::{ACCUMULATOR_CODE_HASH, END_USER_FUNDS, call_options, deploy_options, end_user};
use crate::assets::{ACCUMULATOR, ADDER};
use ice_rpc_client::substrate::SubstrateRpc;
use ice_test_harness::{
	ChainTarget, TestContext, TxParams, describe_with_context,
	ink::{self, Args, ContractHandle, InkContract},
	submit_to_pool,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const HIGHER_TIP: u128 = 10_000_000_000;

struct Deployed {
	accumulator: InkContract,
	accumulator_handle: ContractHandle,
	adder: InkContract,
	adder_handle: ContractHandle,
}

async fn deploy_contracts(context: &TestContext) -> anyhow::Result<Deployed> {
	context.fund_end_user_wallets(END_USER_FUNDS).await?;
	let deployer = end_user(context, 0)?;
	let options = deploy_options(context);

	let accumulator = ACCUMULATOR.load(&context.config)?;
	let new = accumulator.constructor_call("new", Args::new().push(0i32))?;
	let accumulator_handle =
		ink::deploy(&context.connection, &accumulator, &new, &options, deployer).await?;

	let adder = ADDER.load(&context.config)?;
	let args = Args::new().push(0i32).push(1u32).push(ACCUMULATOR_CODE_HASH);
	let new = adder.constructor_call("new", args)?;
	let adder_handle = ink::deploy(&context.connection, &adder, &new, &options, deployer).await?;
	Ok(Deployed { accumulator, accumulator_handle, adder, adder_handle })
}

async fn accumulated(context: &TestContext, deployed: &Deployed) -> anyhow::Result<i32> {
	let get = deployed.accumulator.message_call("get", Args::new())?;
	let sender = end_user(context, 1)?.account();
	let dry_run = ink::query(
		&context.connection,
		&deployed.accumulator_handle,
		&get,
		&sender,
		&call_options(context),
	)
	.await?;
	Ok(dry_run.decode::<i32>()?)
}

async fn nonce_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let deployed = deploy_contracts(&context).await?;
	let user = end_user(&context, 1)?;
	let options = call_options(&context);
	let inc = |by: i32| deployed.accumulator.message_call("inc", Args::new().push(by));

	log::info!("🌟 User nonce should update after it makes a write call on a contract");
	let handle = &deployed.accumulator_handle;
	ink::write(&context.connection, handle, &inc(1)?, &options, user, TxParams::default()).await?;
	assert_eq!(context.eth().account_next_index(user.address()).await?, 1);

	log::info!("🌟 User nonce should update on a multi-call transaction but not the contract nonce");
	let adder_inc = deployed.adder.message_call("inc", Args::new().push(1i32))?;
	ink::write(
		&context.connection,
		&deployed.adder_handle,
		&adder_inc,
		&options,
		user,
		TxParams::default(),
	)
	.await?;
	assert_eq!(context.eth().account_next_index(&deployed.adder_handle.address).await?, 0);
	assert_eq!(context.eth().account_next_index(user.address()).await?, 2);

	log::info!("🌟 Transaction with same nonce but higher tip should replace original transaction");
	let nonce = context.eth().account_next_index(user.address()).await?;
	let replaced = ink::call_payload(handle, &inc(1)?, &options)?;
	submit_to_pool(&context.connection, user, &replaced, TxParams::with_nonce(nonce)).await?;
	let params = TxParams { nonce: Some(nonce), tip: HIGHER_TIP };
	ink::write(&context.connection, handle, &inc(120)?, &options, user, params).await?;
	assert_eq!(accumulated(&context, &deployed).await?, 121);

	log::info!("🌟 Transaction with lower nonce should be given priority");
	let nonce = context.eth().account_next_index(user.address()).await?;
	let future = ink::call_payload(handle, &inc(1)?, &options)?;
	submit_to_pool(&context.connection, user, &future, TxParams::with_nonce(nonce + 2)).await?;
	ink::write(&context.connection, handle, &inc(120)?, &options, user, TxParams::with_nonce(nonce))
		.await?;
	assert_eq!(accumulated(&context, &deployed).await?, 241);
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn nonce_ordering() -> anyhow::Result<()> {
	describe_with_context("Ice ink! (Nonce)", ChainTarget::Local, nonce_steps).await
}
