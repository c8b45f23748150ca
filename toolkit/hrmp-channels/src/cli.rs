use crate::channels::Plan;
use ice_test_harness::wait::FixedDelayRetries;
use log4rs::{
	append::{console::ConsoleAppender, file::FileAppender},
	config::Appender,
};
use std::{collections::BTreeMap, str::FromStr, time::Duration};

/// Funds the sovereign accounts of the given parachains on the relay chain and opens HRMP
/// channels between them in both directions.
#[derive(Clone, Debug, clap::Parser)]
#[command(author, version, about, long_about = None)]
pub struct OpenChannelsCmd {
	/// WebSocket endpoint of the relay chain
	#[arg(long, default_value = "ws://127.0.0.1:9955")]
	pub relay_url: String,
	/// Parachain endpoint as `<para id>=<url>`, once per parachain
	#[arg(
		long = "para",
		value_name = "ID=URL",
		default_values = [
			"3015=ws://127.0.0.1:9944",
			"2001=ws://127.0.0.1:9944",
			"2000=ws://127.0.0.1:9988",
		]
	)]
	pub parachains: Vec<ParaEndpoint>,
	/// Pair of parachains to connect as `<para id>:<para id>`
	#[arg(long = "channel", value_name = "A:B", default_values = ["3015:2000", "2001:2000"])]
	pub channels: Vec<ChannelPair>,
	/// Amount sent to every sovereign account on the relay chain
	#[arg(long, default_value_t = 9_000_000_000_000_000)]
	pub funding_amount: u128,
	/// Secret URI of the relay account that funds the sovereign accounts
	#[arg(long, default_value = "//Charlie")]
	pub funder_uri: String,
	/// Secret URI of the parachains' sudo key
	#[arg(long, env = "PARA_CHAIN_SUDO_KEY", default_value = "//Alice")]
	pub sudo_uri: String,
	/// How long to wait for every extrinsic to be included
	#[arg(long, default_value_t = 60)]
	pub tx_timeout_secs: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParaEndpoint {
	pub id: u32,
	pub url: String,
}

impl FromStr for ParaEndpoint {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (id, url) = s.split_once('=').ok_or_else(|| format!("'{s}' is not <para id>=<url>"))?;
		Ok(Self { id: parse_para_id(id)?, url: url.trim().to_string() })
	}
}

fn parse_para_id(id: &str) -> Result<u32, String> {
	id.trim().parse().map_err(|e| format!("invalid para id '{id}': {e}"))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelPair(pub u32, pub u32);

impl FromStr for ChannelPair {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (a, b) = s.split_once(':').ok_or_else(|| format!("'{s}' is not <para id>:<para id>"))?;
		Ok(Self(parse_para_id(a)?, parse_para_id(b)?))
	}
}

impl OpenChannelsCmd {
	pub fn plan(&self) -> Plan {
		Plan {
			relay_url: self.relay_url.clone(),
			parachains: self
				.parachains
				.iter()
				.map(|endpoint| (endpoint.id, endpoint.url.clone()))
				.collect::<BTreeMap<_, _>>(),
			channels: self.channels.iter().map(|pair| (pair.0, pair.1)).collect(),
			funding_amount: self.funding_amount,
			funder_uri: self.funder_uri.clone(),
			sudo_uri: self.sudo_uri.clone(),
			tx_timeout: Duration::from_secs(self.tx_timeout_secs),
			retries: FixedDelayRetries::one_minute(),
		}
	}
}

pub fn setup_logging() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
	let stdout = ConsoleAppender::builder().build();
	let rpc_log = FileAppender::builder().build("ice_rpc_client.log")?;

	let log_config = log4rs::config::Config::builder()
		.appender(Appender::builder().build("stdout", Box::new(stdout)))
		.appender(Appender::builder().build("rpc-log", Box::new(rpc_log)))
		.logger(
			log4rs::config::Logger::builder()
				.appender("rpc-log")
				.additive(false)
				.build("ice_rpc_client::jsonrpsee", log::LevelFilter::Debug),
		)
		.build(log4rs::config::Root::builder().appender("stdout").build(log::LevelFilter::Info))?;

	log4rs::init_config(log_config)?;

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::Parser;
	use pretty_assertions::assert_eq;

	#[test]
	fn defaults_describe_the_local_testnet() {
		let cmd = OpenChannelsCmd::try_parse_from(["ice-hrmp-channels"]).unwrap();
		let plan = cmd.plan();

		assert_eq!(plan.parachains.len(), 3);
		assert_eq!(plan.parachains[&2000], "ws://127.0.0.1:9988");
		assert_eq!(plan.channels, vec![(3015, 2000), (2001, 2000)]);
		assert_eq!(plan.funding_amount, 9_000_000_000_000_000);
	}

	#[test]
	fn explicit_endpoints_and_channels() {
		let cmd = OpenChannelsCmd::try_parse_from([
			"ice-hrmp-channels",
			"--para",
			"2000=ws://relay-para:9944",
			"--para",
			"2001=ws://other:9944",
			"--channel",
			"2000:2001",
			"--sudo-uri",
			"//Bob",
		])
		.unwrap();

		let plan = cmd.plan();

		assert_eq!(plan.parachains.len(), 2);
		assert_eq!(plan.channels, vec![(2000, 2001)]);
		assert_eq!(plan.sudo_uri, "//Bob");
	}

	#[test]
	fn malformed_values_are_rejected() {
		assert_eq!(
			"2000".parse::<ChannelPair>(),
			Err("'2000' is not <para id>:<para id>".to_string())
		);
		assert!("x=ws://a".parse::<ParaEndpoint>().is_err());
		assert_eq!(
			"3015 = ws://a".parse::<ParaEndpoint>(),
			Ok(ParaEndpoint { id: 3015, url: "ws://a".to_string() })
		);
	}
}
