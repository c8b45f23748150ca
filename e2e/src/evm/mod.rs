//! Suites for the Ethereum compatibility layer, run against a fresh development node so that
//! the genesis account starts with its full balance and a zero nonce.

mod balance;
mod contract;
mod gas;
mod precompiles;
mod rpc;

use alloy::{
	eips::eip2718::Encodable2718,
	network::{EthereumWallet, TransactionBuilder},
	primitives::Address,
	rpc::types::TransactionRequest,
};
use ice_rpc_client::eth::{BlockTag, EthRpc, TransactionReceipt};
use ice_test_harness::{
	EvmWallet, HarnessError, TestContext,
	constants::{CHAIN_ID, GENESIS_ACCOUNT_PRIVATE_KEY},
	evm::EvmClient,
	wait::FixedDelayRetries,
};

pub(crate) fn genesis_wallet() -> anyhow::Result<EvmWallet> {
	Ok(EvmWallet::from_private_key(GENESIS_ACCOUNT_PRIVATE_KEY)?)
}

pub(crate) async fn genesis_client(context: &TestContext) -> anyhow::Result<EvmClient> {
	Ok(EvmClient::connect(&context.eth_url, genesis_wallet()?).await?)
}

/// Signs `tx` with the genesis key at its next nonce, ready for `eth_sendRawTransaction`.
pub(crate) async fn sign_as_genesis(
	context: &TestContext,
	tx: TransactionRequest,
) -> anyhow::Result<Vec<u8>> {
	let wallet = genesis_wallet()?;
	let from = wallet.address().to_string();
	let nonce = context.eth().transaction_count(&from, BlockTag::Latest).await?;
	let envelope = tx
		.with_from(wallet.address())
		.with_nonce(nonce)
		.with_chain_id(CHAIN_ID)
		.build(&EthereumWallet::from(wallet.signer().clone()))
		.await
		.map_err(|e| anyhow::anyhow!("signing transaction failed: {e}"))?;
	Ok(envelope.encoded_2718())
}

/// Sends a transaction signed by the genesis key and waits for its receipt.
pub(crate) async fn send_as_genesis(
	context: &TestContext,
	tx: TransactionRequest,
) -> anyhow::Result<TransactionReceipt> {
	let raw = sign_as_genesis(context, tx).await?;
	let hash = context.eth().send_raw_transaction(&raw).await?;
	log::debug!("Sent transaction {hash}");
	Ok(FixedDelayRetries::one_minute().wait_for_receipt(context.eth(), &hash).await?)
}

pub(crate) fn hex_data(bytes: &[u8]) -> String {
	format!("0x{}", hex::encode(bytes))
}

pub(crate) fn address(raw: &str) -> anyhow::Result<Address> {
	Ok(raw.parse()?)
}

/// Waits until the node has sealed a block after `number`.
pub(crate) async fn wait_for_block_after(context: &TestContext, number: u64) -> anyhow::Result<()> {
	FixedDelayRetries::one_minute()
		.wait_until(&format!("a block after #{number}"), || async move {
			let latest = context.eth().block_by_tag(BlockTag::Latest).await?;
			Ok::<_, HarnessError>(latest.and_then(|block| block.number).is_some_and(|n| n > number))
		})
		.await?;
	Ok(())
}
