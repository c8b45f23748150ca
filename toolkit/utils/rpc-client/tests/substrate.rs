use ice_rpc_client::{
	RpcError, client_for_url,
	substrate::{RuntimeVersion, SubstrateRpc},
	types::{BlockRef, is_block_hash},
};
use jsonrpsee::types::{ErrorCode, ErrorObject};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

mod server;

const BEST_HASH: &str = "0x3a4e9c1c6f2f1bd0ad7a2bbcce5ab2c4f39f5e3ff1a3ac07d19fc4ee5ab1c42d";

fn header_response() -> Value {
	json!({
		"parentHash": "0x6d1f5a4f2b6bb8a8b2fd4f4c77be6f5a1d6c66f0e1c5d8c1df9a1c2a4b6c8e0f",
		"number": "0x1b",
		"stateRoot": "0x0b5f3d1c8aa4c7d1f0d7a7e4fd3b55d3c3a7f31a3f6f0e8d4cf01a2b3c4d5e6f",
		"extrinsicsRoot": "0x03170a2e7597b7b7e3d84c05391d139a62b157e78786d8c082f29dcf4c111314",
		"digest": { "logs": [] }
	})
}

#[tokio::test]
async fn last_block_combines_best_header_and_its_hash() {
	let address = server::for_methods(vec![
		("chain_getHeader", server::handler(|_| Ok(header_response()))),
		(
			"chain_getBlockHash",
			server::handler(|params| {
				let number: u64 = params.one()?;
				assert_eq!(number, 27);
				Ok(json!(BEST_HASH))
			}),
		),
	])
	.await
	.unwrap();
	let client = client_for_url(&format!("http://{address}")).await.unwrap();

	let last_block = client.last_block().await.unwrap();

	assert_eq!(last_block, BlockRef { number: 27, hash: BEST_HASH.to_string() });
	assert!(is_block_hash(&last_block.hash));
}

#[tokio::test]
async fn last_block_fails_when_the_hash_is_unknown() {
	let address = server::for_methods(vec![
		("chain_getHeader", server::handler(|_| Ok(header_response()))),
		("chain_getBlockHash", server::handler(|_| Ok(Value::Null))),
	])
	.await
	.unwrap();
	let client = client_for_url(&format!("http://{address}")).await.unwrap();

	let err = client.last_block().await.unwrap_err();

	assert!(err.to_string().contains("Error fetching last block metadata"));
}

#[tokio::test]
async fn account_next_index_over_websocket() {
	let address = server::for_single_test("system_accountNextIndex", |params| {
		let address: String = params.one()?;
		if address == "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY" {
			Ok(json!(4))
		} else {
			Err(ErrorObject::owned(ErrorCode::InvalidParams.code(), "unknown account", None::<()>))
		}
	})
	.await
	.unwrap();
	let client = client_for_url(&format!("ws://{address}")).await.unwrap();

	let nonce = client
		.account_next_index("5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY")
		.await
		.unwrap();

	assert_eq!(nonce, 4);
}

#[tokio::test]
async fn state_call_hex_encodes_the_payload() {
	let address = server::for_single_test("state_call", |params| {
		let (method, data): (String, String) = params.parse()?;
		assert_eq!(method, "ContractsApi_call");
		assert_eq!(data, "0x0102ff");
		Ok(json!("0xc0ffee"))
	})
	.await
	.unwrap();
	let client = client_for_url(&format!("http://{address}")).await.unwrap();

	let result = client.state_call("ContractsApi_call", &[1, 2, 255]).await.unwrap();

	assert_eq!(result, vec![0xc0, 0xff, 0xee]);
}

#[tokio::test]
async fn runtime_version_ignores_the_api_list() {
	let address = server::for_single_test("state_getRuntimeVersion", |_| {
		Ok(json!({
			"specName": "frost-testnet",
			"implName": "frost-testnet",
			"authoringVersion": 1,
			"specVersion": 1,
			"implVersion": 1,
			"apis": [["0xdf6acb689907609b", 4]],
			"transactionVersion": 2,
			"stateVersion": 1
		}))
	})
	.await
	.unwrap();
	let client = client_for_url(&format!("http://{address}")).await.unwrap();

	let version = client.runtime_version().await.unwrap();

	assert_eq!(
		version,
		RuntimeVersion {
			spec_name: "frost-testnet".to_string(),
			impl_name: "frost-testnet".to_string(),
			spec_version: 1,
			impl_version: 1,
			transaction_version: 2,
		}
	);
}

#[tokio::test]
async fn node_errors_keep_their_message() {
	let address = server::for_single_test("system_chain", |_| {
		Err(ErrorObject::owned(-32603, "Chain is syncing", None::<()>))
	})
	.await
	.unwrap();
	let client = client_for_url(&format!("http://{address}")).await.unwrap();

	let err = client.system_chain().await.unwrap_err();

	assert_eq!(
		err,
		RpcError::Call {
			method: "system_chain".to_string(),
			code: -32603,
			message: "Chain is syncing".to_string()
		}
	);
}

#[tokio::test]
async fn unreachable_node_is_a_transport_error() {
	let client = client_for_url("http://127.0.0.1:1").await.unwrap();

	let err = client.block_hash_at(3).await.unwrap_err();

	assert!(matches!(err, RpcError::Transport { .. }));
	assert!(
		err.to_string()
			.starts_with("Failed to send custom request (chain_getBlockHash (3)): ")
	);
}
