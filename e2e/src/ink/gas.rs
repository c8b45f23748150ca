use super::{ACCUMULATOR_CODE_HASH, END_USER_FUNDS, DEPLOY_STORAGE_LIMIT, end_user};
use crate::assets::{ACCUMULATOR, ADDER};
use ice_test_harness::{
	ChainTarget, TestContext, TxParams, describe_with_context,
	constants::ICZ,
	ink::{self, Args, TxOptions, Weight},
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const GAS_LIMIT: u64 = 100_000_000_000;
/// Above what a single block allows.
const MAX_GAS_LIMIT: u64 = 1_299_000_000_000;

const ACCUMULATOR_INC_GAS: Weight = Weight { ref_time: 4_006_871_040, proof_size: 131_072 };
const ADDER_INC_GAS: Weight = Weight { ref_time: 5_397_669_461, proof_size: 153_804 };
const ADDER_DEPOSIT_GAS: Weight = Weight { ref_time: 4_006_871_040, proof_size: 131_072 };

async fn gas_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	context.fund_end_user_wallets(END_USER_FUNDS).await?;
	let deployer = end_user(&context, 0)?;
	let deploy_options = TxOptions::default()
		.with_gas(GAS_LIMIT)
		.with_storage_deposit_limit(DEPLOY_STORAGE_LIMIT)
		.with_timeout(context.tx_timeout());
	let query_options = TxOptions::default().with_gas(GAS_LIMIT);

	log::info!("🌟 Estimated gas for deploying accumulator contract should be accurate");
	let accumulator = ACCUMULATOR.load(&context.config)?;
	let new = accumulator.constructor_call("new", Args::new().push(0i32))?;
	let accumulator_handle =
		ink::deploy(&context.connection, &accumulator, &new, &deploy_options, deployer).await?;

	log::info!("🌟 Estimated gas for deploying adder contract should be accurate");
	let adder = ADDER.load(&context.config)?;
	let new =
		adder.constructor_call("new", Args::new().push(0i32).push(1u32).push(ACCUMULATOR_CODE_HASH))?;
	let adder_handle =
		ink::deploy(&context.connection, &adder, &new, &deploy_options, deployer).await?;

	log::info!("🌟 Estimate gas limit for simple transaction");
	let inc = accumulator.message_call("inc", Args::new().push(1i32))?;
	let dry_run = ink::query(
		&context.connection,
		&accumulator_handle,
		&inc,
		&context.keyring.account(),
		&query_options,
	)
	.await?;
	assert_eq!(dry_run.gas_required, ACCUMULATOR_INC_GAS);

	log::info!("🌟 Estimate gas limit for multicall transaction");
	let inc = adder.message_call("inc", Args::new().push(1i32))?;
	let dry_run =
		ink::query(&context.connection, &adder_handle, &inc, &deployer.account(), &query_options)
			.await?;
	assert_eq!(dry_run.gas_required, ADDER_INC_GAS);

	log::info!("🌟 Estimate gas limit for payable transaction");
	let receive_funds = adder.message_call("receive_funds", Args::new())?;
	let dry_run = ink::query(
		&context.connection,
		&adder_handle,
		&receive_funds,
		&deployer.account(),
		&query_options.with_value(ICZ),
	)
	.await?;
	assert_eq!(dry_run.gas_required, ADDER_DEPOSIT_GAS);

	log::info!("🌟 Tx exceeding block gas limit should fail");
	let expensive = adder.message_call("expensive_func", Args::new())?;
	let options = TxOptions::default().with_gas(MAX_GAS_LIMIT).with_timeout(context.tx_timeout());
	let err = ink::write(
		&context.connection,
		&adder_handle,
		&expensive,
		&options,
		&context.keyring,
		TxParams::default(),
	)
	.await
	.unwrap_err();
	assert!(err.to_string().contains("OutOfGas"), "Should fail due to exceeding gas limit: {err}");
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn gas() -> anyhow::Result<()> {
	describe_with_context(
		"Estimate gas for deploying and calling write methods on contract",
		ChainTarget::Local,
		gas_steps,
	)
	.await
}
