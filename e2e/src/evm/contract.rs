use super::{genesis_client, hex_data};
use crate::assets::{EXPLICIT_REVERT_REASON, EvmArtifact, STORAGE, TEST};
use alloy::{
	dyn_abi::DynSolValue,
	json_abi::JsonAbi,
	network::TransactionBuilder,
	primitives::{B256, U256, b256},
	providers::Provider,
	rpc::types::TransactionRequest,
};
use ice_rpc_client::eth::{BlockTag, CallRequest, EthRpc};
use ice_test_harness::{
	ChainTarget, HarnessError, TestContext,
	constants::BLOCK_GAS_LIMIT,
	describe_with_context,
	evm::{EvmClient, EvmContract},
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

async fn contract_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let eth = context.eth();
	let test = EvmArtifact::load(&context.config, TEST)?;
	let deployed = hex_data(&test.deployed_bytecode);
	let client = genesis_client(&context).await?;

	log::info!("🌟 contract creation should return transaction hash");
	let nonce = client.provider().get_transaction_count(client.address()).await?;
	let address = client.address().create(nonce);
	let tx = TransactionRequest::default()
		.with_from(client.address())
		.with_deploy_code(test.bytecode.clone());
	let pending = client.provider().send_transaction(tx).await?;
	log::info!("Contract creation submitted in {}", pending.tx_hash());
	assert_eq!(eth.get_code(&address.to_string()).await?, "0x");
	let receipt = pending.get_receipt().await?;
	assert_eq!(receipt.contract_address, Some(address));
	assert_eq!(eth.get_code(&address.to_string()).await?, deployed);

	log::info!("🌟 eth_call contract create should return code");
	let create = CallRequest { data: Some(hex_data(&test.bytecode)), ..Default::default() };
	assert_eq!(eth.call(&create, BlockTag::Latest).await?, deployed);

	log::info!("🌟 eth_call at missing block returns error");
	let err = eth.call(&create, BlockTag::Number(999_999)).await.unwrap_err();
	assert!(err.to_string().contains("header not found"), "unexpected error: {err}");
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn contract() -> anyhow::Result<()> {
	describe_with_context("Ice RPC (Contract)", ChainTarget::Local, contract_steps).await
}

async fn revert_reason_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let client = genesis_client(&context).await?;
	let artifact = EvmArtifact::load(&context.config, EXPLICIT_REVERT_REASON)?;
	let contract = client.deploy(artifact.abi, &artifact.bytecode, &[]).await?;

	log::info!("🌟 should fail with revert reason");
	let thirty = DynSolValue::Uint(U256::from(30), 256);
	let err = client.call(&contract, "max10", &[thirty]).await.unwrap_err();
	assert!(matches!(err, HarnessError::ContractReverted(_)), "unexpected error: {err}");
	assert!(
		err.to_string().contains(
			"VM Exception while processing transaction: revert Value must not be greater than 10."
		),
		"unexpected error: {err}"
	);
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn revert_reason() -> anyhow::Result<()> {
	describe_with_context("Ice RPC (Revert Reason)", ChainTarget::Local, revert_reason_steps).await
}

fn uint(value: u64) -> DynSolValue {
	DynSolValue::Uint(U256::from(value), 256)
}

/// `Test.multiply` declared with other inputs than the deployed contract has.
async fn call_mismatched_multiply(
	client: &EvmClient,
	test: &EvmContract,
	signature: &str,
	args: &[DynSolValue],
) -> anyhow::Result<HarnessError> {
	let abi = JsonAbi::parse([signature])?;
	let mock = EvmContract::at(test.address, abi);
	match client.call(&mock, "multiply", args).await {
		Ok(output) => anyhow::bail!("{signature} unexpectedly returned {output:?}"),
		Err(err) => Ok(err),
	}
}

async fn contract_methods_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let eth = context.eth();
	let client = genesis_client(&context).await?;
	let artifact = EvmArtifact::load(&context.config, TEST)?;
	let test = client.deploy(artifact.abi, &artifact.bytecode, &[]).await?;

	log::info!("🌟 should return contract method result");
	assert_eq!(client.call(&test, "multiply", &[uint(3)]).await?, vec![uint(21)]);

	log::info!("🌟 should get correct environmental block number");
	let height = client.call(&test, "currentBlock", &[]).await?;
	let number = eth.block_by_tag(BlockTag::Latest).await?.and_then(|b| b.number).unwrap_or(0);
	assert_eq!(height, vec![uint(number)]);

	log::info!("🌟 should get correct environmental block hash");
	let hash = client.call(&test, "blockHash", &[uint(number.saturating_sub(1))]).await?;
	assert_ne!(hash, vec![DynSolValue::FixedBytes(B256::ZERO, 32)]);

	log::info!("🌟 should get correct environmental block gaslimit");
	assert_eq!(client.call(&test, "gasLimit", &[]).await?, vec![uint(BLOCK_GAS_LIMIT)]);

	for (case, signature, args) in [
		("missing", "function multiply() returns (uint256)", vec![]),
		(
			"too many",
			"function multiply(uint256 a, uint256 b) returns (uint256)",
			vec![uint(3), uint(4)],
		),
		(
			"invalid",
			"function multiply(address a) returns (uint256)",
			vec![DynSolValue::Address(super::address("0x0123456789012345678901234567890123456789")?)],
		),
	] {
		log::info!("🌟 should fail for {case} parameters");
		let err = call_mismatched_multiply(&client, &test, signature, &args).await?;
		assert!(matches!(err, HarnessError::ContractReverted(_)), "unexpected error: {err}");
	}
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn contract_methods() -> anyhow::Result<()> {
	describe_with_context("Ice RPC (Contract Methods)", ChainTarget::Local, contract_methods_steps)
		.await
}

/// ERC-1967 implementation slot.
const IMPLEMENTATION_SLOT: B256 =
	b256!("360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc");

async fn contract_storage_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let eth = context.eth();
	let client = genesis_client(&context).await?;
	let artifact = EvmArtifact::load(&context.config, STORAGE)?;
	let storage = client.deploy(artifact.abi, &artifact.bytecode, &[]).await?;
	let address = storage.address.to_string();
	let slot = DynSolValue::FixedBytes(IMPLEMENTATION_SLOT, 32);
	let slot_hex = IMPLEMENTATION_SLOT.to_string();

	log::info!("🌟 eth_getStorageAt");
	let empty = DynSolValue::FixedBytes(B256::ZERO, 32);
	assert_eq!(client.call(&storage, "getStorage", &[slot.clone()]).await?, vec![empty]);
	assert_eq!(eth.storage_at(&address, &slot_hex, BlockTag::Latest).await?, B256::ZERO.to_string());

	let value = b256!("0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef");
	client
		.send(&storage, "setStorage", &[slot.clone(), DynSolValue::FixedBytes(value, 32)])
		.await?;
	assert_eq!(eth.storage_at(&address, &slot_hex, BlockTag::Latest).await?, value.to_string());
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn contract_storage() -> anyhow::Result<()> {
	describe_with_context("Ice RPC (Contract storage)", ChainTarget::Local, contract_storage_steps)
		.await
}
