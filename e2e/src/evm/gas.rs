use super::{address, genesis_client, hex_data, sign_as_genesis};
use crate::assets::{EvmArtifact, MULTI_CONTRACT, STORAGE, TEST};
use alloy::{
	dyn_abi::{DynSolValue, JsonAbiExt},
	network::TransactionBuilder,
	primitives::{U256, b256},
	rpc::types::TransactionRequest,
};
use ice_rpc_client::eth::{BlockTag, CallRequest, EthRpc};
use ice_test_harness::{
	ChainTarget, TestContext,
	constants::{BLOCK_GAS_LIMIT, EXTRINSIC_GAS_LIMIT, FIRST_CONTRACT_ADDRESS, GENESIS_ACCOUNT},
	describe_with_context,
	evm::EvmContract,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

/// `eth_estimateGas` of deploying the `Test` contract.
const CREATE_GAS_ESTIMATE: u64 = 193_580;
/// `eth_estimateGas` of `Test.multiply(3)`.
const MULTIPLY_GAS_ESTIMATE: u64 = 22_331;
const GAS_TOO_HIGH: &str = "provided gas limit is too high (can be up to 10x the block gas limit)";

fn create_request(test: &EvmArtifact) -> CallRequest {
	CallRequest {
		from: Some(GENESIS_ACCOUNT.to_string()),
		data: Some(hex_data(&test.bytecode)),
		..Default::default()
	}
}

/// Ratio of the gas a transaction used to what the node estimated for it.
fn assert_estimate_close(used: u64, estimated: u64) {
	let ratio = used as f64 / estimated as f64;
	assert!((0.9..=1.1).contains(&ratio), "used {used} gas, estimated {estimated}");
}

async fn gas_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let eth = context.eth();
	let test = EvmArtifact::load(&context.config, TEST)?;

	log::info!("🌟 eth_estimateGas for contract creation");
	assert_eq!(eth.estimate_gas(&create_request(&test)).await?, CREATE_GAS_ESTIMATE);

	log::info!("🌟 eth_estimateGas for contract call");
	let first = EvmContract::at(address(FIRST_CONTRACT_ADDRESS)?, test.abi.clone());
	let three = DynSolValue::Uint(U256::from(3), 256);
	let input = first.function("multiply", 1)?.abi_encode_input(&[three])?;
	let request = CallRequest {
		from: Some(GENESIS_ACCOUNT.to_string()),
		to: Some(FIRST_CONTRACT_ADDRESS.to_string()),
		data: Some(hex_data(&input)),
		gas_price: Some("0x1D1A94A2000".to_string()),
		..Default::default()
	};
	assert_eq!(eth.estimate_gas(&request).await?, MULTIPLY_GAS_ESTIMATE);

	log::info!("🌟 tx gas limit larger EXTRINSIC_GAS_LIMIT");
	let tx = TransactionRequest::default()
		.with_deploy_code(test.bytecode.clone())
		.with_gas_limit(EXTRINSIC_GAS_LIMIT + 1)
		.with_gas_price(0x3B9ACA00);
	let raw = sign_as_genesis(&context, tx).await?;
	let err = eth.send_raw_transaction(&raw).await.unwrap_err();
	assert_eq!(err.call_message(), Some("exceeds block gas limit"));

	log::info!("🌟 eth_call contract estimate_gas comparable to real gas consumed");
	let client = genesis_client(&context).await?;
	let storage = EvmArtifact::load(&context.config, STORAGE)?;
	let storage = client.deploy(storage.abi, &storage.bytecode, &[]).await?;
	let value = DynSolValue::FixedBytes(
		b256!("2000000000000000000000000000000000000000000000000000000000000000"),
		32,
	);
	let args = [value.clone(), value];
	let estimated = client.estimate_gas(&storage, "setStorage", &args).await?;
	let receipt = client.send(&storage, "setStorage", &args).await?;
	assert_estimate_close(receipt.gas_used, estimated);

	log::info!("🌟 eth_estimateGas compared to real gas used for MultiContractCall");
	let multi = EvmArtifact::load(&context.config, MULTI_CONTRACT)?;
	let multi = client
		.deploy(multi.abi, &multi.bytecode, &[DynSolValue::Address(storage.address)])
		.await?;
	let estimated = client.estimate_gas(&multi, "setStorage", &[]).await?;
	let receipt = client.send(&multi, "setStorage", &[]).await?;
	assert_estimate_close(receipt.gas_used, estimated);
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn gas() -> anyhow::Result<()> {
	describe_with_context("Ice RPC (Gas)", ChainTarget::Local, gas_steps).await
}

async fn execution_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let eth = context.eth();
	let test = EvmArtifact::load(&context.config, TEST)?;
	let deployed = hex_data(&test.deployed_bytecode);

	for gas in [BLOCK_GAS_LIMIT, BLOCK_GAS_LIMIT * 10] {
		log::info!("🌟 should call and estimateGas with gas limit {gas}");
		let request = create_request(&test).with_gas(gas);
		assert_eq!(eth.call(&request, BlockTag::Latest).await?, deployed);
		assert_eq!(eth.estimate_gas(&request).await?, CREATE_GAS_ESTIMATE);
	}

	log::info!("🌟 shouldn't call with gas limit up higher than 10x block gas limit");
	let request = create_request(&test).with_gas(BLOCK_GAS_LIMIT * 10 + 1);
	let err = eth.call(&request, BlockTag::Latest).await.unwrap_err();
	assert_eq!(err.call_message(), Some(GAS_TOO_HIGH));

	log::info!("🌟 shouldn't estimateGas with gas limit up higher than 10x block gas limit");
	let request = create_request(&test).with_gas(BLOCK_GAS_LIMIT * 20 + 1);
	let err = eth.estimate_gas(&request).await.unwrap_err();
	assert_eq!(err.call_message(), Some(GAS_TOO_HIGH));
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn rpc_execution() -> anyhow::Result<()> {
	describe_with_context("Ice RPC (RPC execution)", ChainTarget::Local, execution_steps).await
}
