//! Networks the suites know how to reach.

use serde::Deserialize;
use std::{fmt, str::FromStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Chain {
	Snow,
	Arctic,
	SnowStaging,
	Local,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChainParams {
	pub rpc_endpoint: &'static str,
	pub chain_id: u64,
	pub ss58_prefix: u16,
	/// Contract deployed before the last runtime upgrade, checked by the state suites.
	pub upgrade_ctx_address: Option<&'static str>,
}

impl Chain {
	pub const ALL: [Chain; 4] = [Chain::Snow, Chain::Arctic, Chain::SnowStaging, Chain::Local];

	pub fn params(&self) -> ChainParams {
		match self {
			Chain::Snow => ChainParams {
				rpc_endpoint: "wss://snow-rpc.icenetwork.io",
				chain_id: 552,
				ss58_prefix: 2207,
				upgrade_ctx_address: None,
			},
			Chain::Arctic => ChainParams {
				rpc_endpoint: "wss://arctic-rpc.icenetwork.io:9944",
				chain_id: 553,
				ss58_prefix: 2208,
				upgrade_ctx_address: Some("npNUJVfr8T7PxKGoQG6DeDCVHUyUTdYkGKwaiHgABo8TVnCZs"),
			},
			Chain::SnowStaging => ChainParams {
				rpc_endpoint: "wss://snow-staging-rpc.web3labs.com:9944",
				chain_id: 552,
				ss58_prefix: 2207,
				upgrade_ctx_address: Some("ni429HgCgHJPdAaougukUc5a2kxxFrVpbMNNojf3YGL4u5WUc"),
			},
			Chain::Local => ChainParams {
				rpc_endpoint: "ws://localhost:9944",
				chain_id: 554,
				ss58_prefix: 2208,
				upgrade_ctx_address: None,
			},
		}
	}

	pub fn name(&self) -> &'static str {
		match self {
			Chain::Snow => "snow",
			Chain::Arctic => "arctic",
			Chain::SnowStaging => "snow_staging",
			Chain::Local => "local",
		}
	}
}

impl fmt::Display for Chain {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Chain {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Chain::ALL.into_iter().find(|chain| chain.name() == s).ok_or_else(|| {
			"Supported chains are 'snow', 'arctic', 'snow_staging' and 'local'.".to_string()
		})
	}
}

impl TryFrom<String> for Chain {
	type Error = String;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

/// Where a suite runs: a freshly spawned development node, or an already running network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainTarget {
	Local,
	Network(Chain),
}

impl ChainTarget {
	pub fn chain(&self) -> Chain {
		match self {
			ChainTarget::Local => Chain::Local,
			ChainTarget::Network(chain) => *chain,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn parses_exactly_the_known_chains() {
		assert_eq!("snow".parse::<Chain>(), Ok(Chain::Snow));
		assert_eq!("arctic".parse::<Chain>(), Ok(Chain::Arctic));
		assert_eq!("snow_staging".parse::<Chain>(), Ok(Chain::SnowStaging));
		assert_eq!("local".parse::<Chain>(), Ok(Chain::Local));
		for unknown in ["Snow", "frost", "", "snow-staging"] {
			assert_eq!(
				unknown.parse::<Chain>(),
				Err("Supported chains are 'snow', 'arctic', 'snow_staging' and 'local'.".to_string())
			);
		}
	}

	#[test]
	fn display_round_trips_through_parse() {
		for chain in Chain::ALL {
			assert_eq!(chain.to_string().parse::<Chain>(), Ok(chain));
		}
	}

	#[test]
	fn local_chain_parameters() {
		let params = Chain::Local.params();
		assert_eq!(params.rpc_endpoint, "ws://localhost:9944");
		assert_eq!(params.chain_id, 554);
		assert_eq!(params.ss58_prefix, 2208);
		assert_eq!(ChainTarget::Local.chain(), Chain::Local);
	}
}
