use ice_rpc_client::RpcError;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
	#[error("Invalid configuration: {0}")]
	Config(String),
	#[error("Invalid wallet: {0}")]
	Wallet(String),
	#[error(transparent)]
	Rpc(#[from] RpcError),
	#[error(transparent)]
	Subxt(Box<subxt::Error>),
	/// A module error raised while dispatching an extrinsic, resolved against chain metadata.
	#[error("{section}.{name}: {docs}")]
	Dispatch { section: String, name: String, docs: String },
	/// A dispatch error that does not belong to a pallet, like `BadOrigin`.
	#[error("Dispatch error: {0}")]
	DispatchOther(String),
	#[error("Transaction rejected: {0}")]
	TxRejected(String),
	#[error("Timed out after {0} ms waiting for the transaction to be included")]
	Timeout(u128),
	/// The contract call returned an application level error.
	#[error("Contract error: {0}")]
	Contract(String),
	#[error("Contract reverted: {0}")]
	ContractReverted(String),
	#[error("Could not decode {what}: {message}")]
	Decode { what: &'static str, message: String },
	#[error("EVM request failed: {0}")]
	Evm(String),
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl HarnessError {
	pub(crate) fn decode(what: &'static str, message: impl ToString) -> Self {
		HarnessError::Decode { what, message: message.to_string() }
	}

	/// Name of the dispatch error, when the failure was one.
	pub fn dispatch_name(&self) -> Option<&str> {
		match self {
			HarnessError::Dispatch { name, .. } => Some(name),
			_ => None,
		}
	}
}

impl From<subxt::Error> for HarnessError {
	fn from(err: subxt::Error) -> Self {
		HarnessError::Subxt(Box::new(err))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn dispatch_errors_render_section_name_and_docs() {
		let err = HarnessError::Dispatch {
			section: "contracts".to_string(),
			name: "StorageDepositLimitExhausted".to_string(),
			docs: "More storage was created than allowed by the storage deposit limit.".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"contracts.StorageDepositLimitExhausted: More storage was created than allowed by the storage deposit limit."
		);
		assert_eq!(err.dispatch_name(), Some("StorageDepositLimitExhausted"));
	}
}
