use bigdecimal::BigDecimal;
use ice_rpc_client::{
	client_for_url,
	eth::{BlockTag, CallRequest, EthRpc},
	types::balance_from_u128,
};
use jsonrpsee::types::ErrorObject;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::str::FromStr;

mod server;

const GENESIS_ACCOUNT: &str = "0x8efcaf2c4ebbf88bf07f3bb44a2869c4c675ad7a";

#[tokio::test]
async fn chain_id_is_decoded_from_hex() {
	let address = server::for_single_test("eth_chainId", |_| Ok(json!("0x22a"))).await.unwrap();
	let client = client_for_url(&format!("http://{address}")).await.unwrap();

	assert_eq!(client.chain_id().await.unwrap(), 554);
}

#[tokio::test]
async fn balance_is_normalized_into_a_decimal() {
	let address = server::for_single_test("eth_getBalance", |params| {
		let (account, tag): (String, String) = params.parse()?;
		assert_eq!(account, GENESIS_ACCOUNT);
		assert_eq!(tag, "latest");
		Ok(json!("0xffffffffffffffffffffffffffffffff"))
	})
	.await
	.unwrap();
	let client = client_for_url(&format!("http://{address}")).await.unwrap();

	let balance = client.balance(GENESIS_ACCOUNT, BlockTag::Latest).await.unwrap();

	assert_eq!(balance, balance_from_u128(u128::MAX));
	assert_eq!(
		balance,
		BigDecimal::from_str("340282366920938463463364607431768211455").unwrap()
	);
}

#[tokio::test]
async fn nonce_at_an_old_block() {
	let address = server::for_single_test("eth_getTransactionCount", |params| {
		let (_, tag): (String, String) = params.parse()?;
		Ok(if tag == "earliest" { json!("0x0") } else { json!("0x1") })
	})
	.await
	.unwrap();
	let client = client_for_url(&format!("http://{address}")).await.unwrap();

	assert_eq!(client.transaction_count(GENESIS_ACCOUNT, BlockTag::Earliest).await.unwrap(), 0);
	assert_eq!(client.transaction_count(GENESIS_ACCOUNT, BlockTag::Latest).await.unwrap(), 1);
}

#[tokio::test]
async fn storage_is_read_at_a_slot_and_tag() {
	let slot = "0x360894a13ba1a3210667c828492db98dca3e2076cc3735a920a3ca505d382bbc";
	let address = server::for_single_test("eth_getStorageAt", move |params| {
		let (contract, requested, tag): (String, String, String) = params.parse()?;
		assert_eq!(contract, "0xc2bf5f29a4384b1ab0c063e1c666f02121b6084a");
		assert_eq!(requested, slot);
		assert_eq!(tag, "latest");
		Ok(json!("0x0000000000000000000000000000000000000000000000000000000000000000"))
	})
	.await
	.unwrap();
	let client = client_for_url(&format!("http://{address}")).await.unwrap();

	let word = client
		.storage_at("0xc2bf5f29a4384b1ab0c063e1c666f02121b6084a", slot, BlockTag::Latest)
		.await
		.unwrap();

	assert_eq!(word, format!("0x{}", "0".repeat(64)));
}

#[tokio::test]
async fn fee_history_passes_hex_block_count_and_percentiles() {
	let address = server::for_single_test("eth_feeHistory", |params| {
		let (count, newest, percentiles): (String, String, Vec<f64>) = params.parse()?;
		assert_eq!(count, "0x2");
		assert_eq!(newest, "latest");
		assert_eq!(percentiles, vec![20.0, 50.0]);
		Ok(json!({
			"oldestBlock": "0x1",
			"baseFeePerGas": ["0x3b9aca00", "0x3b9aca00", "0x3b9aca00"],
			"gasUsedRatio": [0.0, 0.5],
			"reward": [["0x0", "0x0"], ["0x0", "0x1"]]
		}))
	})
	.await
	.unwrap();
	let client = client_for_url(&format!("http://{address}")).await.unwrap();

	let history = client.fee_history(2, BlockTag::Latest, &[20.0, 50.0]).await.unwrap();

	assert_eq!(history.oldest_block, 1);
	assert_eq!(history.base_fee_per_gas.len(), 3);
	assert_eq!(history.gas_used_ratio, vec![0.0, 0.5]);
	assert_eq!(history.reward.map(|r| r.len()), Some(2));
}

#[tokio::test]
async fn fee_history_of_future_block_reports_node_message() {
	let address = server::for_single_test("eth_feeHistory", |_| {
		Err(ErrorObject::owned(-32603, "Error getting header at BlockId::Number(10)", None::<()>))
	})
	.await
	.unwrap();
	let client = client_for_url(&format!("http://{address}")).await.unwrap();

	let err = client.fee_history(1, BlockTag::Number(10), &[]).await.unwrap_err();

	assert_eq!(err.call_message(), Some("Error getting header at BlockId::Number(10)"));
}

#[tokio::test]
async fn excessive_gas_is_rejected_for_estimate_gas() {
	let address = server::for_single_test("eth_estimateGas", |params| {
		let request: Value = params.one()?;
		assert_eq!(request["gas"], json!("0x3dfd241"));
		Err(ErrorObject::owned(-32603, "gas limit reached", None::<()>))
	})
	.await
	.unwrap();
	let client = client_for_url(&format!("http://{address}")).await.unwrap();
	let request = CallRequest { to: Some(GENESIS_ACCOUNT.to_string()), ..Default::default() }
		.with_gas(65_000_001);

	let err = client.estimate_gas(&request).await.unwrap_err();

	assert_eq!(err.call_message(), Some("gas limit reached"));
}

#[tokio::test]
async fn latest_block_and_missing_block() {
	let address = server::for_single_test("eth_getBlockByNumber", |params| {
		let (tag, full): (String, bool) = params.parse()?;
		assert!(!full);
		if tag == "latest" {
			Ok(json!({
				"number": "0x5",
				"hash": "0x1d59ff54b1eb26b013ce3cb5fc9dab3705b415a67127a003c3e61eb445bb8df2",
				"parentHash": "0x6d1f5a4f2b6bb8a8b2fd4f4c77be6f5a1d6c66f0e1c5d8c1df9a1c2a4b6c8e0f",
				"stateRoot": "0x0b5f3d1c8aa4c7d1f0d7a7e4fd3b55d3c3a7f31a3f6f0e8d4cf01a2b3c4d5e6f",
				"gasLimit": "0x3938700",
				"gasUsed": "0x0",
				"transactions": []
			}))
		} else {
			Ok(Value::Null)
		}
	})
	.await
	.unwrap();
	let client = client_for_url(&format!("http://{address}")).await.unwrap();

	let latest = client.block_by_tag(BlockTag::Latest).await.unwrap().unwrap();
	assert_eq!(latest.number, Some(5));
	assert_eq!(latest.gas_limit, 60_000_000);
	assert_eq!(client.block_by_tag(BlockTag::Number(1000)).await.unwrap(), None);
}

#[tokio::test]
async fn create_and_finalize_block_asks_for_finalization() {
	let address = server::for_single_test("engine_createBlock", |params| {
		let (create_empty, finalize, parent): (bool, bool, Option<String>) = params.parse()?;
		assert!(create_empty);
		assert!(finalize);
		assert_eq!(parent, None);
		Ok(json!({
			"hash": "0x1d59ff54b1eb26b013ce3cb5fc9dab3705b415a67127a003c3e61eb445bb8df2",
			"aux": { "header_only": false, "clear_justification_requests": false }
		}))
	})
	.await
	.unwrap();
	let client = client_for_url(&format!("http://{address}")).await.unwrap();

	let block = client.create_and_finalize_block().await.unwrap();

	assert_eq!(
		block.hash,
		"0x1d59ff54b1eb26b013ce3cb5fc9dab3705b415a67127a003c3e61eb445bb8df2"
	);
}

#[tokio::test]
async fn raw_transactions_are_sent_hex_encoded() {
	let address = server::for_single_test("eth_sendRawTransaction", |params| {
		let raw: String = params.one()?;
		assert_eq!(raw, "0xf86b01");
		Ok(json!("0xabc123"))
	})
	.await
	.unwrap();
	let client = client_for_url(&format!("http://{address}")).await.unwrap();

	assert_eq!(client.send_raw_transaction(&[0xf8, 0x6b, 0x01]).await.unwrap(), "0xabc123");
}
