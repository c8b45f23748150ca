//! The subset of ink! contract metadata the harness needs: constructors and messages with
//! their selectors and arguments, plus the embedded code blob of `.contract` bundles.

use crate::error::HarnessError;
use parity_scale_codec::Encode;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ContractMetadata {
	#[serde(default)]
	pub source: Option<Source>,
	#[serde(default)]
	pub contract: Option<ContractInfo>,
	pub spec: ContractSpec,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Source {
	pub hash: Option<String>,
	/// Hex encoded code, present in `.contract` bundles only.
	pub wasm: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ContractInfo {
	pub name: String,
	pub version: Option<String>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ContractSpec {
	pub constructors: Vec<CallSpec>,
	pub messages: Vec<CallSpec>,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CallSpec {
	pub label: String,
	pub selector: String,
	#[serde(default)]
	pub args: Vec<ArgSpec>,
	#[serde(default)]
	pub mutates: bool,
	#[serde(default)]
	pub payable: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ArgSpec {
	pub label: String,
}

impl ContractMetadata {
	/// Accepts both the current layout and the older one nested under `"V3"`.
	pub fn from_json(json: &str) -> Result<Self, HarnessError> {
		let value: serde_json::Value =
			serde_json::from_str(json).map_err(|e| HarnessError::decode("contract metadata", e))?;
		let value = match value.get("V3") {
			Some(v3) => {
				let mut v3 = v3.clone();
				if let (Some(target), Some(source)) = (v3.as_object_mut(), value.get("source")) {
					target.entry("source").or_insert_with(|| source.clone());
				}
				v3
			},
			None => value,
		};
		serde_json::from_value(value).map_err(|e| HarnessError::decode("contract metadata", e))
	}
}

impl CallSpec {
	pub fn selector_bytes(&self) -> Result<[u8; 4], HarnessError> {
		let bytes = hex::decode(self.selector.trim_start_matches("0x"))
			.map_err(|e| HarnessError::decode("selector", e))?;
		bytes
			.try_into()
			.map_err(|_| HarnessError::decode("selector", format!("'{}' is not 4 bytes", self.selector)))
	}
}

/// SCALE encoded arguments of a constructor or message, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Args(Vec<Vec<u8>>);

impl Args {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push<T: Encode>(mut self, value: T) -> Self {
		self.0.push(value.encode());
		self
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Selector followed by the encoded arguments, ready to be sent as `data`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallData {
	pub label: String,
	bytes: Vec<u8>,
}

impl CallData {
	pub fn new(label: &str, selector: [u8; 4], args: Args) -> Self {
		let mut bytes = selector.to_vec();
		args.0.into_iter().for_each(|arg| bytes.extend(arg));
		Self { label: label.to_string(), bytes }
	}

	pub fn bytes(&self) -> &[u8] {
		&self.bytes
	}
}

/// A contract loaded from disk: metadata plus code.
#[derive(Clone, Debug)]
pub struct InkContract {
	pub metadata: ContractMetadata,
	pub code: Vec<u8>,
	pub metadata_path: PathBuf,
}

impl InkContract {
	/// Loads the metadata and the code. `wasm_path` may be omitted for `.contract` bundles.
	pub fn load(metadata_path: impl AsRef<Path>, wasm_path: Option<&Path>) -> Result<Self, HarnessError> {
		let metadata_path = metadata_path.as_ref().to_path_buf();
		let metadata = ContractMetadata::from_json(&std::fs::read_to_string(&metadata_path)?)?;
		let code = match wasm_path {
			Some(path) => std::fs::read(path)?,
			None => {
				let wasm = metadata.source.as_ref().and_then(|s| s.wasm.as_ref()).ok_or_else(|| {
					HarnessError::decode(
						"contract bundle",
						format!("{} has no embedded code", metadata_path.display()),
					)
				})?;
				hex::decode(wasm.trim_start_matches("0x"))
					.map_err(|e| HarnessError::decode("contract code", e))?
			},
		};
		Ok(Self { metadata, code, metadata_path })
	}

	pub fn name(&self) -> &str {
		self.metadata.contract.as_ref().map(|c| c.name.as_str()).unwrap_or("contract")
	}

	pub fn constructor_call(&self, label: &str, args: Args) -> Result<CallData, HarnessError> {
		call_data(&self.metadata.spec.constructors, "constructor", label, args)
	}

	pub fn message_call(&self, label: &str, args: Args) -> Result<CallData, HarnessError> {
		call_data(&self.metadata.spec.messages, "message", label, args)
	}

	pub fn message(&self, label: &str) -> Option<&CallSpec> {
		self.metadata.spec.messages.iter().find(|m| m.label == label)
	}
}

fn call_data(
	specs: &[CallSpec],
	kind: &str,
	label: &str,
	args: Args,
) -> Result<CallData, HarnessError> {
	let spec = specs
		.iter()
		.find(|spec| spec.label == label)
		.ok_or_else(|| HarnessError::Contract(format!("{kind} '{label}' doesn't exist")))?;
	if spec.args.len() != args.len() {
		return Err(HarnessError::Contract(format!(
			"{kind} '{label}' expects {} arguments, got {}",
			spec.args.len(),
			args.len()
		)));
	}
	Ok(CallData::new(label, spec.selector_bytes()?, args))
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use pretty_assertions::assert_eq;

	pub(crate) const FLIPPER: &str = r#"{
		"source": { "hash": "0x01", "language": "ink! 4.2.0", "compiler": "rustc 1.69.0", "wasm": "0x0061736d01000000" },
		"contract": { "name": "flipper", "version": "4.2.0", "authors": ["Ice Network"] },
		"spec": {
			"constructors": [
				{ "label": "new", "selector": "0x9bae9d5e", "payable": false,
				  "args": [ { "label": "init_value", "type": { "displayName": ["bool"], "type": 0 } } ] },
				{ "label": "default", "selector": "0xed4b9d1b", "payable": false, "args": [] }
			],
			"messages": [
				{ "label": "flip", "selector": "0x633aa551", "mutates": true, "payable": false, "args": [] },
				{ "label": "get", "selector": "0x2f865bd9", "mutates": false, "payable": false, "args": [] }
			],
			"events": []
		},
		"version": "4"
	}"#;

	#[test]
	fn encodes_selector_and_arguments() {
		let metadata = ContractMetadata::from_json(FLIPPER).unwrap();
		let contract = InkContract { metadata, code: vec![], metadata_path: PathBuf::new() };

		let call = contract.constructor_call("new", Args::new().push(true)).unwrap();

		assert_eq!(call.bytes(), &[0x9b, 0xae, 0x9d, 0x5e, 0x01]);
		assert!(contract.message("flip").unwrap().mutates);
	}

	#[test]
	fn argument_count_is_checked() {
		let metadata = ContractMetadata::from_json(FLIPPER).unwrap();
		let contract = InkContract { metadata, code: vec![], metadata_path: PathBuf::new() };

		let err = contract.message_call("get", Args::new().push(1u32)).unwrap_err();
		assert_eq!(err.to_string(), "Contract error: message 'get' expects 0 arguments, got 1");
		let err = contract.message_call("transfer", Args::new()).unwrap_err();
		assert_eq!(err.to_string(), "Contract error: message 'transfer' doesn't exist");
	}

	#[test]
	fn reads_embedded_code_of_a_bundle() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("flipper.contract");
		std::fs::write(&path, FLIPPER).unwrap();

		let contract = InkContract::load(&path, None).unwrap();

		assert_eq!(contract.name(), "flipper");
		assert_eq!(contract.code, vec![0x00, 0x61, 0x73, 0x6d, 0x01, 0x00, 0x00, 0x00]);
	}

	#[test]
	fn older_layout_nested_under_v3() {
		let json = r#"{ "source": { "hash": "0x02" }, "V3": { "spec": { "constructors": [], "messages": [
			{ "label": "inc", "selector": "0x1d32619f", "mutates": true, "args": [ { "label": "by" } ] }
		] } } }"#;

		let metadata = ContractMetadata::from_json(json).unwrap();

		assert_eq!(metadata.spec.messages[0].selector_bytes().unwrap(), [0x1d, 0x32, 0x61, 0x9f]);
		assert_eq!(metadata.source.and_then(|s| s.hash), Some("0x02".to_string()));
	}
}
