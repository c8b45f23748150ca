//! Harness settings read from the environment.
//!
//! `ICE_`-prefixed variables tune the harness itself (`ICE_LOG`, `ICE_BUILD`,
//! `ICE_BINARY_PATH`, `ICE_CHAIN`, `ICE_SPAWNING_TIME_MS`, `ICE_TX_TIMEOUT_MS`,
//! `ICE_ASSETS_DIR`). Wallet
//! secrets are plain variables, see [Secrets].

use crate::{
	chain::{Chain, ChainTarget},
	error::HarnessError,
};
use figment::{
	Figment,
	providers::{Env, Serialized},
};
use ice_node_runner::NodeOptions;
use serde::{Deserialize, Serialize};
use std::{
	collections::BTreeMap,
	fmt::{Debug, Formatter},
	path::PathBuf,
	time::Duration,
};

pub const NODE_BINARY_NAME: &str = "ice-node";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarnessConfig {
	/// Node log level. When set, node output is also echoed.
	pub log: Option<String>,
	/// Cargo profile the node was built with, used to locate the binary.
	pub build: String,
	pub binary_path: Option<PathBuf>,
	/// Network to run against. A development node is spawned when unset.
	#[serde(serialize_with = "serialize_chain")]
	pub chain: Option<Chain>,
	pub spawning_time_ms: u64,
	pub tx_timeout_ms: u64,
	/// Compiled contracts used by the suites.
	pub assets_dir: PathBuf,
}

impl Default for HarnessConfig {
	fn default() -> Self {
		Self {
			log: None,
			build: "release".to_string(),
			binary_path: None,
			chain: None,
			spawning_time_ms: 60_000,
			tx_timeout_ms: 30_000,
			assets_dir: PathBuf::from("assets"),
		}
	}
}

fn serialize_chain<S: serde::Serializer>(chain: &Option<Chain>, s: S) -> Result<S::Ok, S::Error> {
	match chain {
		Some(chain) => s.serialize_some(chain.name()),
		None => s.serialize_none(),
	}
}

impl HarnessConfig {
	pub fn from_env() -> Result<Self, HarnessError> {
		Figment::new()
			.merge(Serialized::defaults(HarnessConfig::default()))
			.merge(Env::prefixed("ICE_"))
			.extract()
			.map_err(|e| HarnessError::Config(e.to_string()))
	}

	pub fn target(&self) -> ChainTarget {
		match self.chain {
			Some(chain) => ChainTarget::Network(chain),
			None => ChainTarget::Local,
		}
	}

	pub fn node_binary(&self) -> PathBuf {
		self.binary_path
			.clone()
			.unwrap_or_else(|| PathBuf::from(format!("../target/{}/{NODE_BINARY_NAME}", self.build)))
	}

	pub fn node_options(&self) -> NodeOptions {
		NodeOptions {
			log_level: self.log.clone().unwrap_or_else(|| "info".to_string()),
			display_logs: self.log.is_some(),
			..NodeOptions::new(self.node_binary())
		}
		.with_spawning_time(Duration::from_millis(self.spawning_time_ms))
	}

	pub fn tx_timeout(&self) -> Duration {
		Duration::from_millis(self.tx_timeout_ms)
	}

	pub fn asset(&self, relative: impl AsRef<std::path::Path>) -> PathBuf {
		self.assets_dir.join(relative)
	}
}

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SecretString(pub String);

impl Debug for SecretString {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "***")
	}
}

impl SecretString {
	pub fn expose(&self) -> &str {
		&self.0
	}
}

/// Wallet secrets and addresses of pre-deployed contracts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Secrets {
	/// `END_USER_WALLET_1_URI`, `END_USER_WALLET_2_URI`, ... up to the first gap.
	#[serde(skip)]
	pub end_user_wallet_uris: Vec<SecretString>,
	pub ink_ctx_deployer_uri: Option<SecretString>,
	pub mainnet_wallet_uri: Option<SecretString>,
	pub evm_ctx_deployer_key: Option<SecretString>,
	pub mainnet_deployer_key: Option<SecretString>,
	pub state_check_ctx_address: Option<String>,
}

impl Secrets {
	pub fn from_env() -> Result<Self, HarnessError> {
		let mut secrets: Secrets = Figment::new()
			.merge(Env::raw().only(&[
				"INK_CTX_DEPLOYER_URI",
				"MAINNET_WALLET_URI",
				"EVM_CTX_DEPLOYER_KEY",
				"MAINNET_DEPLOYER_KEY",
				"STATE_CHECK_CTX_ADDRESS",
			]))
			.extract()
			.map_err(|e| HarnessError::Config(e.to_string()))?;

		let end_users: BTreeMap<String, SecretString> = Figment::new()
			.merge(Env::raw().filter(|key| key.starts_with("END_USER_WALLET_")))
			.extract()
			.map_err(|e| HarnessError::Config(e.to_string()))?;
		secrets.end_user_wallet_uris = (1..)
			.map_while(|n| end_users.get(&format!("end_user_wallet_{n}_uri")).cloned())
			.collect();
		Ok(secrets)
	}

	pub fn require<'a>(
		value: &'a Option<SecretString>,
		name: &str,
	) -> Result<&'a str, HarnessError> {
		value
			.as_ref()
			.map(SecretString::expose)
			.ok_or_else(|| HarnessError::Config(format!("{name} is not set")))
	}
}
