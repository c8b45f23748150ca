//! Precompiles of the EVM runtime: the standard Ethereum ones and the ERC-20 view over
//! `pallet-assets`.

use super::{genesis_client, genesis_wallet, hex_data};
use crate::assets::{EC_RECOVER_TESTS, EvmArtifact, IERC20, IERC20_PLUS};
use alloy::{
	dyn_abi::{DynSolValue, JsonAbiExt},
	network::TransactionBuilder,
	primitives::{Address, Bytes, U256, address, eip191_hash_message},
	rpc::types::TransactionRequest,
	signers::SignerSync,
};
use anyhow::Context;
use ice_rpc_client::eth::{BlockTag, CallRequest, EthRpc};
use ice_test_harness::{
	ChainTarget, TestContext,
	constants::GENESIS_ACCOUNT,
	describe_with_context,
	evm::{EvmClient, EvmContract, load_abi},
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

/// ERC-20 address of the asset with id 1, created at genesis of the development chain.
const TEST_ASSET: Address = address!("ffffffff00000000000000000000000000000001");
const TEST_ASSET_SUPPLY: u64 = 100;
const RECEIVER: Address = address!("e735008ea5683238c3daf2736a456538818f0a80");
const BURN_MINT_GAS_LIMIT: u64 = 5_000_000;

const EC_RECOVER: &str = "0x0000000000000000000000000000000000000001";
const IDENTITY: &str = "0x0000000000000000000000000000000000000004";
const SIGNED_MESSAGE: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Tubulum fuisse, qua illum, cuius is condemnatus est rogatione, P. Eaedem res maneant alio modo.";

fn uint(values: &[DynSolValue]) -> anyhow::Result<U256> {
	values
		.first()
		.and_then(DynSolValue::as_uint)
		.map(|(value, _)| value)
		.with_context(|| format!("expected an unsigned integer, got {values:?}"))
}

fn string(value: &str) -> Vec<DynSolValue> {
	vec![DynSolValue::String(value.to_string())]
}

/// Sends a mutating asset call with a fixed gas limit instead of an estimated one.
async fn send_with_gas_limit(
	client: &EvmClient,
	contract: &EvmContract,
	name: &str,
	args: &[DynSolValue],
) -> anyhow::Result<()> {
	let input = contract.function(name, args.len())?.abi_encode_input(args)?;
	let tx = TransactionRequest::default()
		.with_to(contract.address)
		.with_input(Bytes::from(input))
		.with_gas_limit(BURN_MINT_GAS_LIMIT);
	client.send_request(tx).await?;
	Ok(())
}

async fn assets_erc20_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let client = genesis_client(&context).await?;
	let interface = |name: &str| load_abi(context.config.asset(format!("evm/{name}.json")));
	let erc20 = EvmContract::at(TEST_ASSET, interface(IERC20)?);
	let erc20_plus = EvmContract::at(TEST_ASSET, interface(IERC20_PLUS)?);

	log::info!("🌟 should return total supply");
	assert_eq!(uint(&client.call(&erc20, "totalSupply", &[]).await?)?, U256::from(TEST_ASSET_SUPPLY));

	log::info!("🌟 should return name");
	assert_eq!(client.call(&erc20, "name", &[]).await?, string("Test Token"));

	log::info!("🌟 should return decimals");
	assert_eq!(uint(&client.call(&erc20, "decimals", &[]).await?)?, U256::from(10));

	log::info!("🌟 should return symbol");
	assert_eq!(client.call(&erc20, "symbol", &[]).await?, string("TICZ"));

	log::info!("🌟 should be able to transfer token");
	let receiver = [DynSolValue::Address(RECEIVER)];
	let before = uint(&client.call(&erc20, "balanceOf", &receiver).await?)?;
	let ten = DynSolValue::Uint(U256::from(10), 256);
	client.send(&erc20, "transfer", &[receiver[0].clone(), ten]).await?;
	let after = uint(&client.call(&erc20, "balanceOf", &receiver).await?)?;
	assert_eq!(after, before + U256::from(10));

	log::info!("🌟 should return minbalance");
	assert_eq!(uint(&client.call(&erc20_plus, "minimumBalance", &[]).await?)?, U256::from(1));

	let genesis = DynSolValue::Address(client.address());
	let one = DynSolValue::Uint(U256::from(1), 256);
	for (name, minted) in [("burn", false), ("mint", true)] {
		log::info!("🌟 should {name} token");
		let before = uint(&client.call(&erc20_plus, "totalSupply", &[]).await?)?;
		send_with_gas_limit(&client, &erc20_plus, name, &[genesis.clone(), one.clone()]).await?;
		let after = uint(&client.call(&erc20_plus, "totalSupply", &[]).await?)?;
		let expected = if minted { before + U256::from(1) } else { before - U256::from(1) };
		assert_eq!(after, expected, "total supply after {name}");
	}
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn assets_erc20() -> anyhow::Result<()> {
	describe_with_context("Ice RPC (AssetsERC20)", ChainTarget::Local, assets_erc20_steps).await
}

/// Input of the ecrecover precompile: message hash, `v` padded to a word, then `r` and `s`.
fn ec_recover_input(hash: &[u8], signature: &[u8; 65]) -> Vec<u8> {
	let (rs, v) = signature.split_at(64);
	let mut input = hash.to_vec();
	input.extend([0u8; 31]);
	input.extend(v);
	input.extend(rs);
	input
}

async fn precompile_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let eth = context.eth();
	let client = genesis_client(&context).await?;
	let artifact = EvmArtifact::load(&context.config, EC_RECOVER_TESTS)?;
	let contract = client.deploy(artifact.abi, &artifact.bytecode, &[]).await?;

	log::info!("🌟 should perform ecrecover");
	let signature = genesis_wallet()?.signer().sign_message_sync(SIGNED_MESSAGE.as_bytes())?;
	let hash = eip191_hash_message(SIGNED_MESSAGE);
	let input = ec_recover_input(hash.as_slice(), &signature.as_bytes());
	client.call(&contract, "ecrecover", &[DynSolValue::Bytes(input.clone())]).await?;
	let direct = CallRequest {
		from: Some(GENESIS_ACCOUNT.to_string()),
		to: Some(EC_RECOVER.to_string()),
		data: Some(hex_data(&input)),
		..Default::default()
	};
	let recovered = eth.call(&direct, BlockTag::Latest).await?;
	let expected = format!("0x{}{}", "0".repeat(24), GENESIS_ACCOUNT.trim_start_matches("0x"));
	assert_eq!(recovered, expected);

	log::info!("🌟 should perform identity directly");
	let message = "0x1234567890";
	let identity = CallRequest {
		from: Some(GENESIS_ACCOUNT.to_string()),
		to: Some(IDENTITY.to_string()),
		data: Some(message.to_string()),
		..Default::default()
	};
	assert_eq!(eth.call(&identity, BlockTag::Latest).await?, message);
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn precompiles() -> anyhow::Result<()> {
	describe_with_context("Ice RPC (Precompile)", ChainTarget::Local, precompile_steps).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn ec_recover_input_puts_v_before_r_and_s() {
		let mut signature = [0u8; 65];
		signature[..32].fill(0xaa);
		signature[32..64].fill(0xbb);
		signature[64] = 28;
		let input = ec_recover_input(&[0x11; 32], &signature);
		let mut expected = vec![0x11; 32];
		expected.extend([0; 31]);
		expected.push(28);
		expected.extend([0xaa; 32]);
		expected.extend([0xbb; 32]);
		assert_eq!(input, expected);
	}
}
