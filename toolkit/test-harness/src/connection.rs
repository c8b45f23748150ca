use crate::{chain::ChainParams, dynamic, error::HarnessError, wallet::to_ss58};
use ice_rpc_client::{RpcClient, client_for_url, substrate::SubstrateRpc, types::BlockRef};
use subxt::{OnlineClient, PolkadotConfig, ext::scale_value::At, utils::H256};

pub type IceClient = OnlineClient<PolkadotConfig>;

/// Free and reserved balance of an account, with its nonce.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountInfo {
	pub nonce: u64,
	pub free: u128,
	pub reserved: u128,
}

/// An open connection to one node: raw JSON-RPC for queries, subxt for extrinsics and storage.
pub struct ChainConnection {
	url: String,
	params: ChainParams,
	rpc: RpcClient,
	api: IceClient,
}

impl ChainConnection {
	pub async fn connect(url: &str, params: ChainParams) -> Result<Self, HarnessError> {
		let rpc = client_for_url(url).await.map_err(HarnessError::Config)?;
		let api = if url.starts_with("ws://") || url.starts_with("http://") {
			IceClient::from_insecure_url(url).await?
		} else {
			IceClient::from_url(url).await?
		};
		log::info!("Connected to {url}");
		Ok(Self { url: url.to_string(), params, rpc, api })
	}

	pub fn url(&self) -> &str {
		&self.url
	}

	pub fn rpc(&self) -> &RpcClient {
		&self.rpc
	}

	pub fn api(&self) -> &IceClient {
		&self.api
	}

	pub fn chain_id(&self) -> u64 {
		self.params.chain_id
	}

	pub fn ss58_prefix(&self) -> u16 {
		self.params.ss58_prefix
	}

	pub fn params(&self) -> &ChainParams {
		&self.params
	}

	pub fn address_of(&self, account: &[u8; 32]) -> String {
		to_ss58(account, self.params.ss58_prefix)
	}

	pub async fn account_info(&self, account: &[u8; 32]) -> Result<AccountInfo, HarnessError> {
		let query = subxt::dynamic::storage("System", "Account", vec![dynamic::account(account)]);
		let value = self.api.storage().at_latest().await?.fetch_or_default(&query).await?;
		let value = value.to_value().map_err(subxt::Error::from)?;
		let field = |path: [&str; 2]| {
			path.iter()
				.try_fold(&value, |v, key| v.at(*key))
				.and_then(|v| v.as_u128())
				.ok_or_else(|| HarnessError::decode("System.Account", format!("missing {path:?}")))
		};
		let nonce = value
			.at("nonce")
			.and_then(|v| v.as_u128())
			.ok_or_else(|| HarnessError::decode("System.Account", "missing nonce"))?;
		Ok(AccountInfo {
			nonce: dynamic::narrow("System.Account nonce", nonce)?,
			free: field(["data", "free"])?,
			reserved: field(["data", "reserved"])?,
		})
	}

	pub async fn last_block(&self) -> Result<BlockRef, HarnessError> {
		Ok(self.rpc.last_block().await?)
	}

	pub async fn block_number(&self, hash: H256) -> Result<u64, HarnessError> {
		Ok(self.api.blocks().at(hash).await?.number().into())
	}
}

pub fn hash_to_hex(hash: &H256) -> String {
	format!("0x{}", hex::encode(hash.0))
}
