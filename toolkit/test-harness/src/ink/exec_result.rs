//! SCALE layout of the `ContractsApi_call` runtime API: its input and its result.

use parity_scale_codec::{Decode, Encode};
use sp_runtime::DispatchError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Weight {
	#[codec(compact)]
	pub ref_time: u64,
	#[codec(compact)]
	pub proof_size: u64,
}

impl Weight {
	/// The same limit for execution time and proof size.
	pub fn uniform(limit: u64) -> Self {
		Self { ref_time: limit, proof_size: limit }
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Decode)]
pub enum StorageDeposit {
	Refund(u128),
	Charge(u128),
}

impl StorageDeposit {
	pub fn charge(&self) -> u128 {
		match self {
			StorageDeposit::Charge(amount) => *amount,
			StorageDeposit::Refund(_) => 0,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct ExecReturnValue {
	pub flags: u32,
	pub data: Vec<u8>,
}

impl ExecReturnValue {
	pub const REVERT: u32 = 1;

	pub fn did_revert(&self) -> bool {
		self.flags & Self::REVERT != 0
	}
}

/// Leading fields of `ContractResult`. Newer runtimes append collected events, which are
/// not decoded.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub struct ContractExecResult {
	pub gas_consumed: Weight,
	pub gas_required: Weight,
	pub storage_deposit: StorageDeposit,
	pub debug_message: Vec<u8>,
	pub result: Result<ExecReturnValue, DispatchError>,
}

impl ContractExecResult {
	pub fn decode_prefix(bytes: &[u8]) -> Result<Self, parity_scale_codec::Error> {
		Self::decode(&mut &bytes[..])
	}
}

/// Arguments of `ContractsApi_call`, in order.
#[derive(Clone, Debug, PartialEq, Eq, Encode)]
pub struct CallRequest {
	pub origin: [u8; 32],
	pub dest: [u8; 32],
	pub value: u128,
	pub gas_limit: Option<Weight>,
	pub storage_deposit_limit: Option<u128>,
	pub input_data: Vec<u8>,
}

/// Error of the ink! message dispatcher, wrapped around every message result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Decode)]
pub enum LangError {
	#[codec(index = 1)]
	CouldNotReadInput,
}
