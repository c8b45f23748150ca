//! Deploy and check flows around a runtime upgrade of a live network. The deploy suites run
//! before the upgrade and persist what they deployed under [HANDLES_DIR], the check suites
//! run after it and expect the contract state to be intact.
//!
//! They target `ICE_CHAIN` and need the deployer secrets of that network.

use crate::assets::{EvmArtifact, FLIPPER, NETWORK_UPGRADE, SETTER_GETTER, STATE_CHECK};
use alloy::{
	dyn_abi::DynSolValue,
	primitives::{Address, U256},
};
use anyhow::Context;
use ice_test_harness::{
	Chain, EvmWallet, Secrets, TestContext, TxParams, describe,
	constants::ICZ,
	evm::{EvmClient, EvmContract},
	ink::{self, Args, ContractHandle, TxOptions},
};
use parity_scale_codec::Decode;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, sync::Arc};

const HANDLES_DIR: &str = "upgrade-handles";
const STATE_CHECK_HANDLE: &str = "state-check-ctx.json";
const NETWORK_UPGRADE_HANDLE: &str = "network-upgrade-ctx.json";

const DEPLOY_GAS_LIMIT: u64 = 1_000_000_000_000;
const QUERY_GAS_LIMIT: u64 = 10_000_000_000_000;
const DEPLOY_STORAGE_LIMIT: u128 = 40 * ICZ;
const STATE_MSG: &str = "SNOW";
const STATE_VALUE: u8 = 100;
const UPGRADE_NUMBER: u64 = 20;
const UPGRADE_MESSAGE: &str = "SNOW Network";

fn handle_path(name: &str) -> anyhow::Result<PathBuf> {
	std::fs::create_dir_all(HANDLES_DIR)?;
	Ok(PathBuf::from(HANDLES_DIR).join(name))
}

#[derive(Debug, PartialEq, Eq, Decode)]
struct TestStruct {
	val: u8,
	name: String,
}

/// What `state_check::get` returns.
#[derive(Debug, PartialEq, Eq, Decode)]
struct MigrationState {
	msg: String,
	hash: [u8; 32],
	value: u8,
	structure: TestStruct,
}

async fn deploy_state_check_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let deployer = context.ink_deployer()?;
	let contract = STATE_CHECK.load(&context.config)?;
	let new = contract.constructor_call("new", Args::new().push(STATE_MSG).push(STATE_VALUE))?;
	let options = TxOptions::default()
		.with_gas(DEPLOY_GAS_LIMIT)
		.with_storage_deposit_limit(DEPLOY_STORAGE_LIMIT)
		.with_timeout(context.tx_timeout());

	log::info!("🌟 Deploying the state check contract to {}", context.target.chain());
	let handle = ink::deploy(&context.connection, &contract, &new, &options, deployer).await?;
	let path = handle_path(STATE_CHECK_HANDLE)?;
	handle.save(&path)?;
	log::info!("State check contract {} saved to {}", handle.address, path.display());
	Ok(())
}

#[tokio::test]
#[ignore = "needs ICE_CHAIN and INK_CTX_DEPLOYER_URI"]
async fn deploy_state_check() -> anyhow::Result<()> {
	describe("Deploy the ink! state check contract", deploy_state_check_steps).await
}

/// `STATE_CHECK_CTX_ADDRESS` first, then what [deploy_state_check] saved, then the contract
/// known for the chain.
fn state_check_handle(context: &TestContext) -> anyhow::Result<ContractHandle> {
	let metadata_path = context.config.asset(STATE_CHECK.metadata);
	let address = match &context.secrets.state_check_ctx_address {
		Some(address) => address.clone(),
		None => match handle_path(STATE_CHECK_HANDLE)? {
			saved if saved.exists() => return Ok(ContractHandle::load(saved)?),
			_ => context
				.connection
				.params()
				.upgrade_ctx_address
				.context("STATE_CHECK_CTX_ADDRESS is not set")?
				.to_string(),
		},
	};
	Ok(ContractHandle {
		address,
		code_hash: None,
		block_hash: String::new(),
		block_number: 0,
		metadata_path,
	})
}

async fn check_state_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let contract = STATE_CHECK.load(&context.config)?;
	let handle = state_check_handle(&context)?;

	log::info!("🌟 Ensure the contract state is intact");
	let get = contract.message_call("get", Args::new())?;
	let options = TxOptions::default().with_gas(QUERY_GAS_LIMIT);
	let dry_run =
		ink::query(&context.connection, &handle, &get, &context.keyring.account(), &options).await?;
	let expected = MigrationState {
		msg: STATE_MSG.to_string(),
		hash: [STATE_VALUE; 32],
		value: STATE_VALUE,
		structure: TestStruct { val: STATE_VALUE, name: STATE_MSG.to_string() },
	};
	assert_eq!(dry_run.decode::<MigrationState>()?, expected, "Invalid contract state");
	Ok(())
}

#[tokio::test]
#[ignore = "needs ICE_CHAIN and a deployed state check contract"]
async fn check_state() -> anyhow::Result<()> {
	describe("Tests for contracts after network upgrade", check_state_steps).await
}

async fn ink_deploy_and_write_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let deployer = context.ink_deployer()?;
	let flipper = FLIPPER.load(&context.config)?;
	let options = TxOptions::default()
		.with_storage_deposit_limit(DEPLOY_STORAGE_LIMIT)
		.with_timeout(context.tx_timeout());

	log::info!("🌟 Successfully upload contract to {} network", context.target.chain());
	let new = flipper.constructor_call("new", Args::new().push(false))?;
	let handle = ink::deploy(&context.connection, &flipper, &new, &options, deployer).await?;
	let last = context.connection.last_block().await?;
	assert_eq!(handle.address.len(), crate::ink::ADDRESS_LEN);
	assert_eq!(handle.block_number, last.number);

	log::info!("🌟 Successfully perform write operations on the contract");
	let flip = flipper.message_call("flip", Args::new())?;
	ink::write(&context.connection, &handle, &flip, &options, deployer, TxParams::default())
		.await?;
	let get = flipper.message_call("get", Args::new())?;
	let options = TxOptions::default();
	let dry_run =
		ink::query(&context.connection, &handle, &get, &deployer.account(), &options).await?;
	assert!(dry_run.decode::<bool>()?, "Write method did not execute expectedly");
	Ok(())
}

#[tokio::test]
#[ignore = "needs ICE_CHAIN and INK_CTX_DEPLOYER_URI"]
async fn ink_deploy_and_write() -> anyhow::Result<()> {
	describe("Tests for ink! contracts after network upgrade", ink_deploy_and_write_steps).await
}

async fn evm_deploy_and_write_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let client = EvmClient::connect(&context.eth_url, context.evm_deployer()?.clone()).await?;
	let artifact = EvmArtifact::load(&context.config, SETTER_GETTER)?;

	log::info!("🌟 Deploy SetterGetter contract successfully");
	let contract = client.deploy(artifact.abi, &artifact.bytecode, &[]).await?;

	log::info!("🌟 Ensure the write method can be called in the contract");
	let three = DynSolValue::Uint(U256::from(3), 256);
	client.send(&contract, "store", &[three.clone()]).await?;
	assert_eq!(client.call(&contract, "retrieve", &[]).await?, vec![three]);
	Ok(())
}

#[tokio::test]
#[ignore = "needs ICE_CHAIN and EVM_CTX_DEPLOYER_KEY"]
async fn evm_deploy_and_write() -> anyhow::Result<()> {
	describe("Tests for deploying and calling write method on a contract", evm_deploy_and_write_steps)
		.await
}

#[derive(Debug, Serialize, Deserialize)]
struct EvmHandle {
	address: Address,
}

/// Snow is deployed to with the mainnet key, every other network with the EVM deployer.
fn network_upgrade_deployer(context: &TestContext) -> anyhow::Result<EvmWallet> {
	match context.target.chain() {
		Chain::Snow => {
			let key = Secrets::require(&context.secrets.mainnet_deployer_key, "MAINNET_DEPLOYER_KEY")?;
			Ok(EvmWallet::from_private_key(key)?)
		},
		_ => Ok(context.evm_deployer()?.clone()),
	}
}

async fn deploy_network_upgrade_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let client = EvmClient::connect(&context.eth_url, network_upgrade_deployer(&context)?).await?;
	let artifact = EvmArtifact::load(&context.config, NETWORK_UPGRADE)?;
	let args = [
		DynSolValue::Uint(U256::from(UPGRADE_NUMBER), 256),
		DynSolValue::String(UPGRADE_MESSAGE.to_string()),
	];

	log::info!("🌟 Deploying NetworkUpgrade to {}", context.target.chain());
	let contract = client.deploy(artifact.abi, &artifact.bytecode, &args).await?;
	let path = handle_path(NETWORK_UPGRADE_HANDLE)?;
	std::fs::write(&path, serde_json::to_string_pretty(&EvmHandle { address: contract.address })?)?;
	log::info!("NetworkUpgrade contract {} saved to {}", contract.address, path.display());
	Ok(())
}

#[tokio::test]
#[ignore = "needs ICE_CHAIN and an EVM deployer key"]
async fn deploy_network_upgrade() -> anyhow::Result<()> {
	describe("Deploy the NetworkUpgrade contract", deploy_network_upgrade_steps).await
}

async fn check_network_upgrade_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let path = handle_path(NETWORK_UPGRADE_HANDLE)?;
	let json = std::fs::read_to_string(&path)
		.with_context(|| format!("reading {}, run deploy_network_upgrade first", path.display()))?;
	let handle: EvmHandle = serde_json::from_str(&json)?;
	let artifact = EvmArtifact::load(&context.config, NETWORK_UPGRADE)?;
	let contract = EvmContract::at(handle.address, artifact.abi);
	let client = EvmClient::connect(&context.eth_url, network_upgrade_deployer(&context)?).await?;

	log::info!("🌟 Ensure the contract state is intact");
	let number = |n: u64| DynSolValue::Uint(U256::from(n), 256);
	let message = DynSolValue::String(UPGRADE_MESSAGE.to_string());
	let expected = vec![
		number(UPGRADE_NUMBER),
		message.clone(),
		DynSolValue::Tuple(vec![number(UPGRADE_NUMBER), message]),
		DynSolValue::Array(vec![number(UPGRADE_NUMBER), number(2 * UPGRADE_NUMBER)]),
	];
	assert_eq!(client.call(&contract, "get", &[]).await?, expected);
	Ok(())
}

#[tokio::test]
#[ignore = "needs ICE_CHAIN and a deployed NetworkUpgrade contract"]
async fn check_network_upgrade() -> anyhow::Result<()> {
	describe("Tests for checking existing contracts storage", check_network_upgrade_steps).await
}
