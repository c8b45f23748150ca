//! Queries served by the Ethereum compatibility layer (`eth_*`) and the manual seal
//! endpoint (`engine_createBlock`).

use crate::{
	RawRpc, RpcError, rpc_params,
	types::{Balance, deserialize_hex_u64, deserialize_opt_hex_u64, deserialize_quantity},
};
use serde::{Deserialize, Serialize, Serializer};

/// Block selector accepted by the `eth_*` methods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockTag {
	Earliest,
	Latest,
	Pending,
	Number(u64),
}

impl Serialize for BlockTag {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			BlockTag::Earliest => serializer.serialize_str("earliest"),
			BlockTag::Latest => serializer.serialize_str("latest"),
			BlockTag::Pending => serializer.serialize_str("pending"),
			BlockTag::Number(n) => serializer.serialize_str(&format!("{n:#x}")),
		}
	}
}

/// Call object of `eth_call` and `eth_estimateGas`. Quantities are pre-encoded hex strings.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub from: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub to: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gas: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub gas_price: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<String>,
}

impl CallRequest {
	pub fn with_gas(self, gas: u64) -> Self {
		Self { gas: Some(format!("{gas:#x}")), ..self }
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EthBlock {
	#[serde(default, deserialize_with = "deserialize_opt_hex_u64")]
	pub number: Option<u64>,
	pub hash: Option<String>,
	pub parent_hash: String,
	pub state_root: String,
	#[serde(deserialize_with = "deserialize_hex_u64")]
	pub gas_limit: u64,
	#[serde(deserialize_with = "deserialize_hex_u64")]
	pub gas_used: u64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeeHistory {
	#[serde(deserialize_with = "deserialize_hex_u64")]
	pub oldest_block: u64,
	pub base_fee_per_gas: Vec<String>,
	pub gas_used_ratio: Vec<f64>,
	#[serde(default)]
	pub reward: Option<Vec<Vec<String>>>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
	pub transaction_hash: String,
	pub block_hash: Option<String>,
	#[serde(default, deserialize_with = "deserialize_opt_hex_u64")]
	pub block_number: Option<u64>,
	pub contract_address: Option<String>,
	#[serde(deserialize_with = "deserialize_hex_u64")]
	pub gas_used: u64,
	#[serde(deserialize_with = "deserialize_hex_u64")]
	pub cumulative_gas_used: u64,
	#[serde(default, deserialize_with = "deserialize_opt_hex_u64")]
	pub status: Option<u64>,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CreatedBlock {
	pub hash: String,
}

pub trait EthRpc {
	#[allow(async_fn_in_trait)]
	async fn chain_id(&self) -> Result<u64, RpcError>;

	#[allow(async_fn_in_trait)]
	async fn balance(&self, address: &str, tag: BlockTag) -> Result<Balance, RpcError>;

	#[allow(async_fn_in_trait)]
	async fn transaction_count(&self, address: &str, tag: BlockTag) -> Result<u64, RpcError>;

	#[allow(async_fn_in_trait)]
	async fn gas_price(&self) -> Result<Balance, RpcError>;

	#[allow(async_fn_in_trait)]
	async fn block_by_tag(&self, tag: BlockTag) -> Result<Option<EthBlock>, RpcError>;

	#[allow(async_fn_in_trait)]
	async fn fee_history(
		&self,
		block_count: u64,
		newest: BlockTag,
		reward_percentiles: &[f64],
	) -> Result<FeeHistory, RpcError>;

	#[allow(async_fn_in_trait)]
	async fn max_priority_fee_per_gas(&self) -> Result<String, RpcError>;

	#[allow(async_fn_in_trait)]
	async fn get_code(&self, address: &str) -> Result<String, RpcError>;

	#[allow(async_fn_in_trait)]
	/// Raw 32 byte word stored at `slot` of `address`, `0x` prefixed.
	async fn storage_at(&self, address: &str, slot: &str, tag: BlockTag)
	-> Result<String, RpcError>;

	#[allow(async_fn_in_trait)]
	/// Returns the transaction hash.
	async fn send_raw_transaction(&self, raw: &[u8]) -> Result<String, RpcError>;

	#[allow(async_fn_in_trait)]
	async fn call(&self, request: &CallRequest, tag: BlockTag) -> Result<String, RpcError>;

	#[allow(async_fn_in_trait)]
	async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, RpcError>;

	#[allow(async_fn_in_trait)]
	async fn transaction_receipt(&self, hash: &str)
	-> Result<Option<TransactionReceipt>, RpcError>;

	#[allow(async_fn_in_trait)]
	/// Seals a block on a manual seal node. Pending transactions get included.
	async fn create_block(&self, finalize: bool) -> Result<CreatedBlock, RpcError>;

	#[allow(async_fn_in_trait)]
	async fn create_and_finalize_block(&self) -> Result<CreatedBlock, RpcError> {
		self.create_block(true).await
	}
}

impl<T: RawRpc> EthRpc for T {
	async fn chain_id(&self) -> Result<u64, RpcError> {
		let raw: String = self.request("eth_chainId", rpc_params![]).await?;
		crate::types::parse_hex_u64(&raw).map_err(|e| RpcError::response("eth_chainId", e))
	}

	async fn balance(&self, address: &str, tag: BlockTag) -> Result<Balance, RpcError> {
		let raw: String = self.request("eth_getBalance", rpc_params![address, tag]).await?;
		crate::types::parse_quantity(&raw).map_err(|e| RpcError::response("eth_getBalance", e))
	}

	async fn transaction_count(&self, address: &str, tag: BlockTag) -> Result<u64, RpcError> {
		let raw: String =
			self.request("eth_getTransactionCount", rpc_params![address, tag]).await?;
		crate::types::parse_hex_u64(&raw)
			.map_err(|e| RpcError::response("eth_getTransactionCount", e))
	}

	async fn gas_price(&self) -> Result<Balance, RpcError> {
		#[derive(Deserialize)]
		struct Quantity(#[serde(deserialize_with = "deserialize_quantity")] Balance);
		let Quantity(price): Quantity = self.request("eth_gasPrice", rpc_params![]).await?;
		Ok(price)
	}

	async fn block_by_tag(&self, tag: BlockTag) -> Result<Option<EthBlock>, RpcError> {
		self.request("eth_getBlockByNumber", rpc_params![tag, false]).await
	}

	async fn fee_history(
		&self,
		block_count: u64,
		newest: BlockTag,
		reward_percentiles: &[f64],
	) -> Result<FeeHistory, RpcError> {
		let block_count = format!("{block_count:#x}");
		self.request("eth_feeHistory", rpc_params![block_count, newest, reward_percentiles])
			.await
	}

	async fn max_priority_fee_per_gas(&self) -> Result<String, RpcError> {
		self.request("eth_maxPriorityFeePerGas", rpc_params![]).await
	}

	async fn get_code(&self, address: &str) -> Result<String, RpcError> {
		self.request("eth_getCode", rpc_params![address]).await
	}

	async fn storage_at(
		&self,
		address: &str,
		slot: &str,
		tag: BlockTag,
	) -> Result<String, RpcError> {
		self.request("eth_getStorageAt", rpc_params![address, slot, tag]).await
	}

	async fn send_raw_transaction(&self, raw: &[u8]) -> Result<String, RpcError> {
		let raw = format!("0x{}", hex::encode(raw));
		self.request("eth_sendRawTransaction", rpc_params![raw]).await
	}

	async fn call(&self, request: &CallRequest, tag: BlockTag) -> Result<String, RpcError> {
		self.request("eth_call", rpc_params![request, tag]).await
	}

	async fn estimate_gas(&self, request: &CallRequest) -> Result<u64, RpcError> {
		let raw: String = self.request("eth_estimateGas", rpc_params![request]).await?;
		crate::types::parse_hex_u64(&raw).map_err(|e| RpcError::response("eth_estimateGas", e))
	}

	async fn transaction_receipt(
		&self,
		hash: &str,
	) -> Result<Option<TransactionReceipt>, RpcError> {
		self.request("eth_getTransactionReceipt", rpc_params![hash]).await
	}

	async fn create_block(&self, finalize: bool) -> Result<CreatedBlock, RpcError> {
		self.request("engine_createBlock", rpc_params![true, finalize, Option::<String>::None])
			.await
	}
}
