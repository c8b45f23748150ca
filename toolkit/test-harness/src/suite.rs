//! Runs a group of steps against a freshly spawned development node or a live network.

use crate::{
	chain::ChainTarget,
	config::{HarnessConfig, Secrets},
	connection::ChainConnection,
	error::HarnessError,
	submit::{TxOutcome, fund_wallets},
	wallet::{ALICE_URI, EvmWallet, Wallet},
};
use ice_node_runner::{NodeProcess, WarmUp};
use ice_rpc_client::{RpcClient, client_for_url, eth::EthRpc};
use std::{future::Future, sync::Arc, time::Duration};

/// Everything a step needs, built once per suite and shared by all of its steps.
pub struct TestContext {
	pub config: HarnessConfig,
	pub secrets: Secrets,
	pub target: ChainTarget,
	pub connection: ChainConnection,
	/// Endpoint the EVM clients of the suite connect to.
	pub eth_url: String,
	/// `//Alice`, funded on development chains.
	pub keyring: Wallet,
	pub end_users: Vec<Wallet>,
	pub ink_deployer: Option<Wallet>,
	pub evm_deployer: Option<EvmWallet>,
}

impl TestContext {
	async fn build(
		config: HarnessConfig,
		secrets: Secrets,
		target: ChainTarget,
		ws_url: &str,
		eth_url: String,
	) -> Result<Self, HarnessError> {
		let params = target.chain().params();
		let connection = ChainConnection::connect(ws_url, params.clone()).await?;
		let wallet = |uri: &str| Wallet::from_uri(uri, params.ss58_prefix);
		let end_users = secrets
			.end_user_wallet_uris
			.iter()
			.map(|uri| wallet(uri.expose()))
			.collect::<Result<Vec<_>, _>>()?;
		let ink_deployer =
			secrets.ink_ctx_deployer_uri.as_ref().map(|uri| wallet(uri.expose())).transpose()?;
		let evm_deployer = secrets
			.evm_ctx_deployer_key
			.as_ref()
			.map(|key| EvmWallet::from_private_key(key.expose()))
			.transpose()?;
		Ok(Self {
			keyring: wallet(ALICE_URI)?,
			config,
			secrets,
			target,
			connection,
			eth_url,
			end_users,
			ink_deployer,
			evm_deployer,
		})
	}

	pub fn eth(&self) -> &RpcClient {
		self.connection.rpc()
	}

	pub fn tx_timeout(&self) -> Duration {
		self.config.tx_timeout()
	}

	pub fn ink_deployer(&self) -> Result<&Wallet, HarnessError> {
		self.ink_deployer
			.as_ref()
			.ok_or_else(|| HarnessError::Config("INK_CTX_DEPLOYER_URI is not set".to_string()))
	}

	pub fn evm_deployer(&self) -> Result<&EvmWallet, HarnessError> {
		self.evm_deployer
			.as_ref()
			.ok_or_else(|| HarnessError::Config("EVM_CTX_DEPLOYER_KEY is not set".to_string()))
	}

	/// Sends `amount` from `//Alice` to every end user wallet.
	pub async fn fund_end_user_wallets(&self, amount: u128) -> Result<Vec<TxOutcome>, HarnessError> {
		fund_wallets(&self.connection, &self.keyring, &self.end_users, amount, self.tx_timeout())
			.await
	}
}

/// Reads the target from `ICE_CHAIN` and runs the steps against it.
pub async fn describe<F, Fut, T, E>(title: &str, steps: F) -> Result<T, E>
where
	F: FnOnce(Arc<TestContext>) -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: From<HarnessError>,
{
	let target = HarnessConfig::from_env()?.target();
	describe_with_context(title, target, steps).await
}

/// Spawns a node when `target` is [ChainTarget::Local], builds the [TestContext] and runs
/// `steps`. The node is stopped whatever the steps return.
pub async fn describe_with_context<F, Fut, T, E>(
	title: &str,
	target: ChainTarget,
	steps: F,
) -> Result<T, E>
where
	F: FnOnce(Arc<TestContext>) -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: From<HarnessError>,
{
	let _ = env_logger::builder().is_test(true).try_init();
	log::info!("👉 {title}");
	let config = HarnessConfig::from_env()?;
	let secrets = Secrets::from_env()?;

	let (mut node, context) = match target {
		ChainTarget::Local => {
			let options = config.node_options();
			let node = NodeProcess::start_or_exit(&options, Some(warm_up(options.http_url()))).await;
			let context =
				TestContext::build(config, secrets, target, &options.ws_url(), options.http_url())
					.await;
			(Some(node), context)
		},
		ChainTarget::Network(chain) => {
			let endpoint = chain.params().rpc_endpoint;
			let context =
				TestContext::build(config, secrets, target, endpoint, endpoint.to_string()).await;
			(None, context)
		},
	};

	let result = match context {
		Ok(context) => steps(Arc::new(context)).await,
		Err(e) => {
			log::error!("Initializing '{title}' failed: {e}");
			Err(e.into())
		},
	};

	if let Some(node) = node.as_mut() {
		node.stop().await;
	}
	log::info!("Finished '{title}'");
	result
}

/// The node answers RPC only some time after printing the readiness marker.
fn warm_up(url: String) -> WarmUp {
	Box::pin(async move {
		let client = client_for_url(&url).await?;
		let chain_id = client.chain_id().await.map_err(|e| e.to_string())?;
		log::debug!("Node at {url} reports chain id {chain_id}");
		Ok(())
	})
}
