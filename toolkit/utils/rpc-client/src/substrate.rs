//! Queries served by the Substrate side of the node (`chain_*`, `system_*`, `state_*`).

use crate::{
	RawRpc, RpcError, rpc_params,
	types::{BlockRef, deserialize_hex_u64},
};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Header {
	pub parent_hash: String,
	#[serde(deserialize_with = "deserialize_hex_u64")]
	pub number: u64,
	pub state_root: String,
	pub extrinsics_root: String,
}

/// What `state_getRuntimeVersion` reports, minus the API list.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeVersion {
	pub spec_name: String,
	pub impl_name: String,
	pub spec_version: u32,
	pub impl_version: u32,
	pub transaction_version: u32,
}

pub trait SubstrateRpc {
	#[allow(async_fn_in_trait)]
	async fn system_chain(&self) -> Result<String, RpcError>;

	#[allow(async_fn_in_trait)]
	async fn runtime_version(&self) -> Result<RuntimeVersion, RpcError>;

	#[allow(async_fn_in_trait)]
	/// Next nonce of `address`, taking the transaction pool into account.
	async fn account_next_index(&self, address: &str) -> Result<u64, RpcError>;

	#[allow(async_fn_in_trait)]
	async fn block_hash_at(&self, number: u64) -> Result<Option<String>, RpcError>;

	#[allow(async_fn_in_trait)]
	/// Header of the current best block.
	async fn best_header(&self) -> Result<Header, RpcError>;

	#[allow(async_fn_in_trait)]
	/// Number and hash of the current best block.
	async fn last_block(&self) -> Result<BlockRef, RpcError>;

	#[allow(async_fn_in_trait)]
	/// Calls a runtime API function with SCALE encoded `data` at the best block.
	async fn state_call(&self, method: &str, data: &[u8]) -> Result<Vec<u8>, RpcError>;
}

impl<T: RawRpc> SubstrateRpc for T {
	async fn system_chain(&self) -> Result<String, RpcError> {
		self.request("system_chain", rpc_params![]).await
	}

	async fn runtime_version(&self) -> Result<RuntimeVersion, RpcError> {
		self.request("state_getRuntimeVersion", rpc_params![]).await
	}

	async fn account_next_index(&self, address: &str) -> Result<u64, RpcError> {
		self.request("system_accountNextIndex", rpc_params![address]).await
	}

	async fn block_hash_at(&self, number: u64) -> Result<Option<String>, RpcError> {
		self.request("chain_getBlockHash", rpc_params![number]).await
	}

	async fn best_header(&self) -> Result<Header, RpcError> {
		self.request("chain_getHeader", rpc_params![]).await
	}

	async fn last_block(&self) -> Result<BlockRef, RpcError> {
		let header = self.best_header().await?;
		let hash = self.block_hash_at(header.number).await?.ok_or_else(|| {
			RpcError::response("chain_getBlockHash", "Error fetching last block metadata")
		})?;
		Ok(BlockRef { number: header.number, hash })
	}

	async fn state_call(&self, method: &str, data: &[u8]) -> Result<Vec<u8>, RpcError> {
		let encoded = format!("0x{}", hex::encode(data));
		let response: String = self.request("state_call", rpc_params![method, encoded]).await?;
		hex::decode(response.trim_start_matches("0x"))
			.map_err(|e| RpcError::response("state_call", e))
	}
}
