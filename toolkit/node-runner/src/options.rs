use std::{path::PathBuf, time::Duration};

pub const DEFAULT_P2P_PORT: u16 = 19931;
pub const DEFAULT_RPC_PORT: u16 = 9933;
pub const DEFAULT_WS_PORT: u16 = 9944;
/// Time a node is given to come up. Readiness waits two seconds less than that.
pub const DEFAULT_SPAWNING_TIME: Duration = Duration::from_millis(60_000);
pub const DEFAULT_READY_MARKER: &str = "finalized #0";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeOptions {
	pub binary: PathBuf,
	pub p2p_port: u16,
	pub rpc_port: u16,
	pub ws_port: u16,
	pub log_level: String,
	/// Echo node output through the `ice_node` log target.
	pub display_logs: bool,
	pub startup_timeout: Duration,
	/// Node output line that signals readiness.
	pub ready_marker: String,
}

impl NodeOptions {
	pub fn new(binary: impl Into<PathBuf>) -> Self {
		Self {
			binary: binary.into(),
			p2p_port: DEFAULT_P2P_PORT,
			rpc_port: DEFAULT_RPC_PORT,
			ws_port: DEFAULT_WS_PORT,
			log_level: "info".to_string(),
			display_logs: false,
			startup_timeout: startup_timeout(DEFAULT_SPAWNING_TIME),
			ready_marker: DEFAULT_READY_MARKER.to_string(),
		}
	}

	pub fn with_spawning_time(self, spawning_time: Duration) -> Self {
		Self { startup_timeout: startup_timeout(spawning_time), ..self }
	}

	pub fn args(&self) -> Vec<String> {
		vec![
			"--dev".to_string(),
			// manual sealing authors blocks only on a validator
			"--validator".to_string(),
			"--execution=Native".to_string(),
			"--no-telemetry".to_string(),
			"--no-prometheus".to_string(),
			"--no-grandpa".to_string(),
			"--force-authoring".to_string(),
			format!("-l{}", self.log_level),
			format!("--port={}", self.p2p_port),
			format!("--rpc-port={}", self.rpc_port),
			format!("--ws-port={}", self.ws_port),
			"--tmp".to_string(),
		]
	}

	/// The full command, as reported when the node fails to start.
	pub fn command_line(&self) -> String {
		format!("{} {}", self.binary.display(), self.args().join(" "))
	}

	pub fn http_url(&self) -> String {
		format!("http://127.0.0.1:{}", self.rpc_port)
	}

	pub fn ws_url(&self) -> String {
		format!("ws://127.0.0.1:{}", self.ws_port)
	}
}

fn startup_timeout(spawning_time: Duration) -> Duration {
	spawning_time.saturating_sub(Duration::from_secs(2))
}

#[cfg(test)]
mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	#[test]
	fn renders_the_dev_node_flags() {
		let options = NodeOptions { log_level: "warn".to_string(), ..NodeOptions::new("ice-node") };
		assert_eq!(
			options.command_line(),
			"ice-node --dev --validator --execution=Native --no-telemetry --no-prometheus \
			 --no-grandpa --force-authoring -lwarn --port=19931 --rpc-port=9933 --ws-port=9944 --tmp"
		);
	}

	#[test]
	fn readiness_waits_two_seconds_less_than_spawning_time() {
		assert_eq!(NodeOptions::new("ice-node").startup_timeout, Duration::from_secs(58));
		let options = NodeOptions::new("ice-node").with_spawning_time(Duration::from_secs(1));
		assert_eq!(options.startup_timeout, Duration::ZERO);
	}

	#[test]
	fn urls_use_configured_ports() {
		let options = NodeOptions { rpc_port: 1234, ..NodeOptions::new("ice-node") };
		assert_eq!(options.http_url(), "http://127.0.0.1:1234");
		assert_eq!(options.ws_url(), "ws://127.0.0.1:9944");
	}
}
