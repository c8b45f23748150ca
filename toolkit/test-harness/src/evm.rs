//! Solidity contracts and plain value transfers on the EVM side of the chain, through an alloy
//! provider that signs locally.

use crate::{error::HarnessError, wallet::EvmWallet};
use alloy::{
	dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt},
	json_abi::{Function, JsonAbi},
	network::{EthereumWallet, TransactionBuilder},
	primitives::{Address, Bytes, U256},
	providers::{DynProvider, Provider, ProviderBuilder},
	rpc::types::{TransactionReceipt, TransactionRequest},
};
use std::{fmt::Display, path::Path};

/// A deployed Solidity contract.
#[derive(Clone, Debug)]
pub struct EvmContract {
	pub address: Address,
	pub abi: JsonAbi,
}

impl EvmContract {
	pub fn at(address: Address, abi: JsonAbi) -> Self {
		Self { address, abi }
	}

	/// The function named `name` taking `arg_count` arguments.
	pub fn function(&self, name: &str, arg_count: usize) -> Result<&Function, HarnessError> {
		self.abi
			.function(name)
			.and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == arg_count))
			.ok_or_else(|| {
				HarnessError::Contract(format!("function '{name}' with {arg_count} arguments doesn't exist"))
			})
	}
}

/// Reads a Solidity ABI from a JSON file, either a bare ABI array or a compiler artifact
/// carrying it under `"abi"`.
pub fn load_abi(path: impl AsRef<Path>) -> Result<JsonAbi, HarnessError> {
	let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)
		.map_err(|e| HarnessError::decode("contract ABI", e))?;
	let abi = match json.get("abi") {
		Some(abi) => abi.clone(),
		None => json,
	};
	serde_json::from_value(abi).map_err(|e| HarnessError::decode("contract ABI", e))
}

pub struct EvmClient {
	provider: DynProvider,
	wallet: EvmWallet,
}

impl EvmClient {
	pub async fn connect(url: &str, wallet: EvmWallet) -> Result<Self, HarnessError> {
		let provider = ProviderBuilder::new()
			.wallet(EthereumWallet::from(wallet.signer().clone()))
			.connect(url)
			.await
			.map_err(evm_error)?
			.erased();
		Ok(Self { provider, wallet })
	}

	pub fn provider(&self) -> &DynProvider {
		&self.provider
	}

	pub fn address(&self) -> Address {
		self.wallet.address()
	}

	pub async fn deploy(
		&self,
		abi: JsonAbi,
		bytecode: &[u8],
		constructor_args: &[DynSolValue],
	) -> Result<EvmContract, HarnessError> {
		let mut code = bytecode.to_vec();
		match abi.constructor() {
			Some(constructor) => {
				code.extend(constructor.abi_encode_input(constructor_args).map_err(abi_error)?)
			},
			None if !constructor_args.is_empty() => {
				return Err(HarnessError::Contract(
					"contract has no constructor but arguments were given".to_string(),
				));
			},
			None => {},
		}
		let tx = TransactionRequest::default().with_deploy_code(code);
		let receipt = self.send_request(tx).await?;
		let address = receipt.contract_address.ok_or_else(|| {
			HarnessError::Evm(format!(
				"receipt of transaction {} carries no contract address",
				receipt.transaction_hash
			))
		})?;
		log::info!("EVM contract deployed at {address} by {}", self.address());
		Ok(EvmContract::at(address, abi))
	}

	/// Read-only `eth_call`, decoded with the function's outputs.
	pub async fn call(
		&self,
		contract: &EvmContract,
		name: &str,
		args: &[DynSolValue],
	) -> Result<Vec<DynSolValue>, HarnessError> {
		let function = contract.function(name, args.len())?;
		let tx = self.call_request(contract, function, args)?;
		let output = self.provider.call(tx).await.map_err(evm_error)?;
		function.abi_decode_output(&output).map_err(abi_error)
	}

	/// Sends a mutating call and waits for its receipt.
	pub async fn send(
		&self,
		contract: &EvmContract,
		name: &str,
		args: &[DynSolValue],
	) -> Result<TransactionReceipt, HarnessError> {
		let function = contract.function(name, args.len())?;
		let tx = self.call_request(contract, function, args)?;
		self.send_request(tx).await
	}

	pub async fn estimate_gas(
		&self,
		contract: &EvmContract,
		name: &str,
		args: &[DynSolValue],
	) -> Result<u64, HarnessError> {
		let function = contract.function(name, args.len())?;
		let tx = self.call_request(contract, function, args)?;
		self.provider.estimate_gas(tx).await.map_err(evm_error)
	}

	pub async fn balance(&self, address: Address) -> Result<U256, HarnessError> {
		self.provider.get_balance(address).await.map_err(evm_error)
	}

	pub async fn transfer(&self, to: Address, value: U256) -> Result<TransactionReceipt, HarnessError> {
		let tx = TransactionRequest::default().with_to(to).with_value(value);
		self.send_request(tx).await
	}

	pub async fn send_request(
		&self,
		tx: TransactionRequest,
	) -> Result<TransactionReceipt, HarnessError> {
		let tx = tx.with_from(self.address());
		let pending = self.provider.send_transaction(tx).await.map_err(evm_error)?;
		let receipt = pending.get_receipt().await.map_err(evm_error)?;
		log::debug!(
			"EVM transaction {} included in block {:?}, gas used {}",
			receipt.transaction_hash,
			receipt.block_number,
			receipt.gas_used
		);
		if !receipt.status() {
			return Err(HarnessError::ContractReverted(format!(
				"transaction {} failed",
				receipt.transaction_hash
			)));
		}
		Ok(receipt)
	}

	fn call_request(
		&self,
		contract: &EvmContract,
		function: &Function,
		args: &[DynSolValue],
	) -> Result<TransactionRequest, HarnessError> {
		let input = function.abi_encode_input(args).map_err(abi_error)?;
		Ok(TransactionRequest::default()
			.with_from(self.address())
			.with_to(contract.address)
			.with_input(Bytes::from(input)))
	}
}

fn abi_error(err: impl Display) -> HarnessError {
	HarnessError::Contract(format!("ABI encoding failed: {err}"))
}

/// Errors whose message carries a revert reason become [HarnessError::ContractReverted].
fn evm_error(err: impl Display) -> HarnessError {
	let message = err.to_string();
	if message.contains("revert") {
		HarnessError::ContractReverted(message)
	} else {
		HarnessError::Evm(message)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::primitives::address;
	use pretty_assertions::assert_eq;

	const STORAGE_ABI: &str = r#"[
		{ "type": "constructor", "inputs": [ { "name": "initial", "type": "uint256", "internalType": "uint256" } ], "stateMutability": "nonpayable" },
		{ "type": "function", "name": "store", "inputs": [ { "name": "num", "type": "uint256", "internalType": "uint256" } ], "outputs": [], "stateMutability": "nonpayable" },
		{ "type": "function", "name": "retrieve", "inputs": [], "outputs": [ { "name": "", "type": "uint256", "internalType": "uint256" } ], "stateMutability": "view" }
	]"#;

	fn storage() -> EvmContract {
		let abi: JsonAbi = serde_json::from_str(STORAGE_ABI).unwrap();
		EvmContract::at(address!("c2bf5f29a4384b1ab0c063e1c666f02121b6084a"), abi)
	}

	#[test]
	fn functions_are_found_by_name_and_arity() {
		let contract = storage();

		assert_eq!(contract.function("store", 1).unwrap().selector().to_string(), "0x6057361d");
		let err = contract.function("store", 2).unwrap_err();
		assert_eq!(
			err.to_string(),
			"Contract error: function 'store' with 2 arguments doesn't exist"
		);
	}

	#[test]
	fn outputs_are_decoded_with_the_abi() {
		let contract = storage();
		let retrieve = contract.function("retrieve", 0).unwrap();

		let output = retrieve.abi_decode_output(&U256::from(42).to_be_bytes::<32>()).unwrap();

		assert_eq!(output, vec![DynSolValue::Uint(U256::from(42), 256)]);
	}

	#[test]
	fn abi_is_read_from_compiler_artifacts() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("Storage.json");
		std::fs::write(&path, format!(r#"{{ "contractName": "Storage", "abi": {STORAGE_ABI} }}"#))
			.unwrap();

		let abi = load_abi(&path).unwrap();

		assert!(abi.constructor().is_some());
		assert_eq!(abi.functions().count(), 2);
	}

	#[test]
	fn revert_reasons_are_recognized() {
		assert!(matches!(
			evm_error("server returned an error response: error code 3: execution reverted: Ownable: caller is not the owner"),
			HarnessError::ContractReverted(_)
		));
		assert!(matches!(evm_error("connection refused"), HarnessError::Evm(_)));
	}
}
