//! Deploying and calling ink! contracts through the `Contracts` pallet.

pub mod exec_result;
pub mod metadata;

pub use exec_result::{StorageDeposit, Weight};
pub use metadata::{Args, CallData, InkContract};

use crate::{
	connection::ChainConnection,
	dynamic,
	error::HarnessError,
	submit::{TxOutcome, TxParams, section_name, submit},
	wallet::{Wallet, from_ss58},
};
use exec_result::{CallRequest, ContractExecResult, ExecReturnValue, LangError};
use ice_rpc_client::substrate::SubstrateRpc;
use parity_scale_codec::Decode;
use serde::{Deserialize, Serialize};
use sp_runtime::{DispatchError, ModuleError};
use std::{
	fmt::Debug,
	path::{Path, PathBuf},
	time::Duration,
};
use subxt::{
	ext::scale_value::{At, Value},
	tx::DynamicPayload,
};

pub const DEFAULT_GAS_LIMIT: u64 = 100_000_000_000;
pub const DEFAULT_TX_TIMEOUT: Duration = Duration::from_secs(30);

/// Limits attached to a contract instantiation, call or dry run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxOptions {
	pub gas_limit: Weight,
	/// Unlimited when unset.
	pub storage_deposit_limit: Option<u128>,
	pub value: u128,
	pub timeout: Duration,
}

impl Default for TxOptions {
	fn default() -> Self {
		Self {
			gas_limit: Weight::uniform(DEFAULT_GAS_LIMIT),
			storage_deposit_limit: None,
			value: 0,
			timeout: DEFAULT_TX_TIMEOUT,
		}
	}
}

impl TxOptions {
	pub fn with_gas(self, gas_limit: u64) -> Self {
		Self { gas_limit: Weight::uniform(gas_limit), ..self }
	}

	pub fn with_storage_deposit_limit(self, limit: u128) -> Self {
		Self { storage_deposit_limit: Some(limit), ..self }
	}

	pub fn with_value(self, value: u128) -> Self {
		Self { value, ..self }
	}

	pub fn with_timeout(self, timeout: Duration) -> Self {
		Self { timeout, ..self }
	}

	fn gas_limit_value(&self) -> Value {
		dynamic::weight(self.gas_limit.ref_time, self.gas_limit.proof_size)
	}

	fn storage_deposit_limit_value(&self) -> Value {
		dynamic::option(self.storage_deposit_limit.map(Value::u128))
	}
}

/// A deployed contract. Can be written to disk so that a later run, possibly after a runtime
/// upgrade, finds the same contract again.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractHandle {
	pub address: String,
	pub code_hash: Option<String>,
	pub block_hash: String,
	pub block_number: u64,
	pub metadata_path: PathBuf,
}

impl ContractHandle {
	pub fn account(&self) -> Result<[u8; 32], HarnessError> {
		from_ss58(&self.address)
	}

	pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HarnessError> {
		let json = serde_json::to_string_pretty(self)
			.map_err(|e| HarnessError::decode("contract handle", e))?;
		std::fs::write(path, json)?;
		Ok(())
	}

	pub fn load(path: impl AsRef<Path>) -> Result<Self, HarnessError> {
		let json = std::fs::read_to_string(path)?;
		serde_json::from_str(&json).map_err(|e| HarnessError::decode("contract handle", e))
	}
}

pub async fn deploy(
	connection: &ChainConnection,
	contract: &InkContract,
	constructor: &CallData,
	options: &TxOptions,
	signer: &Wallet,
) -> Result<ContractHandle, HarnessError> {
	let salt: [u8; 32] = rand::random();
	let call = subxt::dynamic::tx(
		"Contracts",
		"instantiate_with_code",
		vec![
			Value::u128(options.value),
			options.gas_limit_value(),
			options.storage_deposit_limit_value(),
			Value::from_bytes(&contract.code),
			Value::from_bytes(constructor.bytes()),
			Value::from_bytes(salt),
		],
	);
	log::info!(
		"Deploying {} with constructor '{}' from {}",
		contract.name(),
		constructor.label,
		signer.address()
	);
	let outcome = submit(connection, signer, &call, TxParams::default(), options.timeout).await?;

	let instantiated = outcome.find("Contracts", "Instantiated").next().ok_or_else(|| {
		HarnessError::Contract(format!("no Contracts.Instantiated event in block {}", outcome.block_hash))
	})?;
	let (_deployer, account) = <([u8; 32], [u8; 32])>::decode(&mut &instantiated.fields[..])
		.map_err(|e| HarnessError::decode("Contracts.Instantiated", e))?;
	let code_hash = match outcome.find("Contracts", "CodeStored").next() {
		Some(stored) => {
			let hash = <[u8; 32]>::decode(&mut &stored.fields[..])
				.map_err(|e| HarnessError::decode("Contracts.CodeStored", e))?;
			Some(format!("0x{}", hex::encode(hash)))
		},
		None => code_hash(connection, &account).await?,
	};

	let handle = ContractHandle {
		address: connection.address_of(&account),
		code_hash,
		block_hash: outcome.block_hash,
		block_number: outcome.block_number,
		metadata_path: contract.metadata_path.clone(),
	};
	log::info!("{} deployed at {} in block #{}", contract.name(), handle.address, handle.block_number);
	Ok(handle)
}

/// Result of a dry run: what the call would cost and what it returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DryRun {
	pub gas_consumed: Weight,
	pub gas_required: Weight,
	pub storage_deposit: StorageDeposit,
	/// Message output with the ink! dispatcher result already stripped.
	pub output: Vec<u8>,
}

impl DryRun {
	pub fn decode<T: Decode>(&self) -> Result<T, HarnessError> {
		T::decode(&mut &self.output[..]).map_err(|e| HarnessError::decode("contract output", e))
	}

	/// For messages returning `Result<T, E>`: an `Err` becomes [HarnessError::Contract].
	pub fn decode_result<T: Decode, E: Decode + Debug>(&self) -> Result<T, HarnessError> {
		self.decode::<Result<T, E>>()?
			.map_err(|e| HarnessError::Contract(format!("{e:?}")))
	}
}

/// Executes a message without submitting a transaction, through `ContractsApi_call`.
pub async fn query(
	connection: &ChainConnection,
	handle: &ContractHandle,
	message: &CallData,
	sender: &[u8; 32],
	options: &TxOptions,
) -> Result<DryRun, HarnessError> {
	let request = CallRequest {
		origin: *sender,
		dest: handle.account()?,
		value: options.value,
		gas_limit: Some(options.gas_limit),
		storage_deposit_limit: options.storage_deposit_limit,
		input_data: message.bytes().to_vec(),
	};
	let bytes = connection
		.rpc()
		.state_call("ContractsApi_call", &parity_scale_codec::Encode::encode(&request))
		.await?;
	let result = ContractExecResult::decode_prefix(&bytes)
		.map_err(|e| HarnessError::decode("ContractsApi_call result", e))?;
	log::debug!(
		"Dry run of '{}' on {}: gas required {:?}",
		message.label,
		handle.address,
		result.gas_required
	);
	into_dry_run(result, |err| module_error(connection, err))
}

fn into_dry_run(
	result: ContractExecResult,
	resolve: impl Fn(ModuleError) -> HarnessError,
) -> Result<DryRun, HarnessError> {
	let ExecReturnValue { flags, data } = match result.result {
		Ok(value) => value,
		Err(DispatchError::Module(err)) => return Err(resolve(err)),
		Err(other) => return Err(HarnessError::DispatchOther(format!("{other:?}"))),
	};
	if flags & ExecReturnValue::REVERT != 0 {
		let reason = if result.debug_message.is_empty() {
			format!("0x{}", hex::encode(&data))
		} else {
			String::from_utf8_lossy(&result.debug_message).into_owned()
		};
		return Err(HarnessError::ContractReverted(reason));
	}
	let output = match data.split_first() {
		Some((0, output)) => output.to_vec(),
		Some(_) => {
			let err = LangError::decode(&mut &data[1..])
				.map_err(|e| HarnessError::decode("ink! LangError", e))?;
			return Err(HarnessError::Contract(format!("{err:?}")));
		},
		None => return Err(HarnessError::decode("contract output", "empty output")),
	};
	Ok(DryRun {
		gas_consumed: result.gas_consumed,
		gas_required: result.gas_required,
		storage_deposit: result.storage_deposit,
		output,
	})
}

fn module_error(connection: &ChainConnection, err: ModuleError) -> HarnessError {
	let metadata = connection.api().metadata();
	let variant = metadata.pallet_by_index(err.index).and_then(|pallet| {
		let variant = pallet.error_variant_by_index(err.error[0])?;
		Some((pallet.name().to_string(), variant.clone()))
	});
	match variant {
		Some((pallet, variant)) => HarnessError::Dispatch {
			section: section_name(&pallet),
			name: variant.name,
			docs: variant.docs.join(" "),
		},
		None => HarnessError::DispatchOther(format!("{err:?}")),
	}
}

/// `Contracts.call` carrying `message`, for callers that submit it themselves.
pub fn call_payload(
	handle: &ContractHandle,
	message: &CallData,
	options: &TxOptions,
) -> Result<DynamicPayload, HarnessError> {
	Ok(subxt::dynamic::tx(
		"Contracts",
		"call",
		vec![
			dynamic::multi_address(&handle.account()?),
			Value::u128(options.value),
			options.gas_limit_value(),
			options.storage_deposit_limit_value(),
			Value::from_bytes(message.bytes()),
		],
	))
}

/// Submits a message as a `Contracts.call` extrinsic.
pub async fn write(
	connection: &ChainConnection,
	handle: &ContractHandle,
	message: &CallData,
	options: &TxOptions,
	signer: &Wallet,
	params: TxParams,
) -> Result<TxOutcome, HarnessError> {
	let call = call_payload(handle, message, options)?;
	log::debug!("Calling '{}' on {} from {}", message.label, handle.address, signer.address());
	submit(connection, signer, &call, params, options.timeout).await
}

/// Code hash of a deployed contract, `None` when nothing lives at the address.
pub async fn code_hash(
	connection: &ChainConnection,
	account: &[u8; 32],
) -> Result<Option<String>, HarnessError> {
	let query =
		subxt::dynamic::storage("Contracts", "ContractInfoOf", vec![dynamic::account(account)]);
	let Some(info) = connection.api().storage().at_latest().await?.fetch(&query).await? else {
		return Ok(None);
	};
	let info = info.to_value().map_err(subxt::Error::from)?;
	let hash = info
		.at("code_hash")
		.and_then(dynamic::to_bytes)
		.ok_or_else(|| HarnessError::decode("Contracts.ContractInfoOf", "missing code_hash"))?;
	Ok(Some(format!("0x{}", hex::encode(hash))))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContractEvent {
	pub contract: [u8; 32],
	pub data: Vec<u8>,
}

/// Payloads of every `Contracts.ContractEmitted` event of a transaction.
pub fn contract_events(outcome: &TxOutcome) -> Result<Vec<ContractEvent>, HarnessError> {
	outcome
		.find("Contracts", "ContractEmitted")
		.map(|event| {
			let (contract, data) = <([u8; 32], Vec<u8>)>::decode(&mut &event.fields[..])
				.map_err(|e| HarnessError::decode("Contracts.ContractEmitted", e))?;
			Ok(ContractEvent { contract, data })
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::submit::TxEvent;
	use parity_scale_codec::Encode;
	use pretty_assertions::assert_eq;

	fn exec_result(result: Result<ExecReturnValue, DispatchError>) -> ContractExecResult {
		ContractExecResult {
			gas_consumed: Weight::uniform(10),
			gas_required: Weight::uniform(20),
			storage_deposit: StorageDeposit::Charge(0),
			debug_message: vec![],
			result,
		}
	}

	fn unresolved(err: ModuleError) -> HarnessError {
		HarnessError::DispatchOther(format!("{err:?}"))
	}

	#[test]
	fn dry_run_output_strips_the_dispatcher_result() {
		let value = ExecReturnValue { flags: 0, data: vec![0, 121, 0, 0, 0] };

		let dry_run = into_dry_run(exec_result(Ok(value)), unresolved).unwrap();

		assert_eq!(dry_run.decode::<u32>().unwrap(), 121);
		assert_eq!(dry_run.gas_required, Weight::uniform(20));
	}

	#[test]
	fn reverted_call() {
		let value = ExecReturnValue { flags: 1, data: vec![0, 1] };

		let err = into_dry_run(exec_result(Ok(value)), unresolved).unwrap_err();

		assert_eq!(err.to_string(), "Contract reverted: 0x0001");
	}

	#[test]
	fn unreadable_input_is_a_contract_error() {
		let value = ExecReturnValue { flags: 0, data: vec![1, 1] };

		let err = into_dry_run(exec_result(Ok(value)), unresolved).unwrap_err();

		assert_eq!(err.to_string(), "Contract error: CouldNotReadInput");
	}

	#[test]
	fn module_errors_are_resolved() {
		let module = ModuleError { index: 40, error: [11, 0, 0, 0], message: None };
		let resolve = |err: ModuleError| {
			assert_eq!(err.index, 40);
			HarnessError::Dispatch {
				section: "contracts".to_string(),
				name: "ContractTrapped".to_string(),
				docs: "Contract trapped during execution.".to_string(),
			}
		};

		let err =
			into_dry_run(exec_result(Err(DispatchError::Module(module))), resolve).unwrap_err();

		assert_eq!(err.dispatch_name(), Some("ContractTrapped"));
	}

	#[test]
	fn message_errors_are_contract_errors() {
		let output: Result<u32, u8> = Err(3);
		let dry_run = DryRun {
			gas_consumed: Weight::default(),
			gas_required: Weight::default(),
			storage_deposit: StorageDeposit::Refund(0),
			output: output.encode(),
		};

		let err = dry_run.decode_result::<u32, u8>().unwrap_err();

		assert_eq!(err.to_string(), "Contract error: 3");
	}

	#[test]
	fn emitted_events_are_decoded() {
		let emitted = TxEvent {
			pallet: "Contracts".to_string(),
			variant: "ContractEmitted".to_string(),
			fields: ([5u8; 32], vec![0u8, 1]).encode(),
		};
		let other = TxEvent {
			pallet: "Balances".to_string(),
			variant: "Withdraw".to_string(),
			fields: vec![],
		};
		let outcome = TxOutcome {
			block_hash: format!("0x{}", "ab".repeat(32)),
			block_number: 3,
			events: vec![other, emitted],
		};

		let events = contract_events(&outcome).unwrap();

		assert_eq!(events, vec![ContractEvent { contract: [5u8; 32], data: vec![0, 1] }]);
	}

	#[test]
	fn handles_survive_a_round_trip_through_disk() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("state_check.json");
		let handle = ContractHandle {
			address: "npNUJVfr8T7PxKGoQG6DeDCVHUyUTdYkGKwaiHgABo8TVnCZs".to_string(),
			code_hash: None,
			block_hash: format!("0x{}", "00".repeat(32)),
			block_number: 12,
			metadata_path: PathBuf::from("assets/stateCheckCtx/state_check.json"),
		};

		handle.save(&path).unwrap();

		assert_eq!(ContractHandle::load(&path).unwrap(), handle);
	}

	#[test]
	fn options_builders() {
		let options = TxOptions::default().with_gas(1_000).with_storage_deposit_limit(5).with_value(1);
		assert_eq!(options.gas_limit, Weight { ref_time: 1_000, proof_size: 1_000 });
		assert_eq!(options.storage_deposit_limit, Some(5));
		assert_eq!(options.value, 1);
	}
}
