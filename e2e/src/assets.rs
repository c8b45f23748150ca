use alloy::{json_abi::JsonAbi, primitives::Bytes};
use anyhow::Context;
use ice_test_harness::{HarnessConfig, ink::InkContract};
use serde::Deserialize;

/// Compiler output of a Solidity contract, as found under `evm/` in the assets directory.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmArtifact {
	pub abi: JsonAbi,
	pub bytecode: Bytes,
	pub deployed_bytecode: Bytes,
}

impl EvmArtifact {
	pub fn load(config: &HarnessConfig, name: &str) -> anyhow::Result<Self> {
		let path = config.asset(format!("evm/{name}.json"));
		let json = std::fs::read_to_string(&path)
			.with_context(|| format!("reading EVM artifact {}", path.display()))?;
		serde_json::from_str(&json).with_context(|| format!("parsing {}", path.display()))
	}
}

pub const TEST: &str = "Test";
pub const EXPLICIT_REVERT_REASON: &str = "ExplicitRevertReason";
pub const STORAGE: &str = "Storage";
pub const MULTI_CONTRACT: &str = "MultiContractExample";
pub const SETTER_GETTER: &str = "SetterGetter";
pub const NETWORK_UPGRADE: &str = "NetworkUpgrade";
pub const EC_RECOVER_TESTS: &str = "ECRecoverTests";
/// Interfaces of the assets precompile, ABI only.
pub const IERC20: &str = "IERC20";
pub const IERC20_PLUS: &str = "IERC20Plus";

/// Metadata and code of an ink! contract, relative to the assets directory.
#[derive(Clone, Copy, Debug)]
pub struct InkAsset {
	pub metadata: &'static str,
	pub wasm: &'static str,
}

impl InkAsset {
	pub fn load(&self, config: &HarnessConfig) -> anyhow::Result<InkContract> {
		let wasm = config.asset(self.wasm);
		InkContract::load(config.asset(self.metadata), Some(wasm.as_path()))
			.with_context(|| format!("loading ink! contract {}", self.metadata))
	}
}

pub const FLIPPER: InkAsset =
	InkAsset { metadata: "simpleCtx/flipper.contract", wasm: "simpleCtx/flipper.wasm" };

pub const ACCUMULATOR: InkAsset = InkAsset {
	metadata: "multiCallCtx/accumulator/accumulator.contract",
	wasm: "multiCallCtx/accumulator/accumulator.wasm",
};

pub const ADDER: InkAsset = InkAsset {
	metadata: "multiCallCtx/adder/adder.contract",
	wasm: "multiCallCtx/adder/adder.wasm",
};

/// Just below the code size limit of the runtime.
pub const LARGE_VALID: InkAsset = InkAsset {
	metadata: "largeCtx/valid/snow_rewards.contract",
	wasm: "largeCtx/valid/snow_rewards.wasm",
};

pub const LARGE_INVALID: InkAsset = InkAsset {
	metadata: "largeCtx/invalid/snow_rewards.contract",
	wasm: "largeCtx/invalid/snow_rewards.wasm",
};

pub const STATE_CHECK: InkAsset = InkAsset {
	metadata: "stateCheckCtx/state_check.contract",
	wasm: "stateCheckCtx/state_check.wasm",
};
