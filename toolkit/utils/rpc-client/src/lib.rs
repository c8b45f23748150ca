//! This crate provides a small high-level API over the JSON-RPC interface of an Ice node.
//!
//! [RawRpc] is the single primitive: send a method with positional parameters and decode
//! the result. The [substrate::SubstrateRpc] and [eth::EthRpc] traits are implemented for
//! every [RawRpc] and cover the queries the end-to-end suites rely on.

pub mod eth;
pub mod jsonrpsee;
pub mod substrate;
pub mod types;

use ::jsonrpsee::core::{params::ArrayParams, traits::ToRpcParams};
use serde::de::DeserializeOwned;

pub use crate::jsonrpsee::{RpcClient, client_for_url};
pub use types::Balance;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RpcError {
	#[error("Couldn't construct parameters: '{0}'")]
	Parameters(String),
	/// The request never got a JSON-RPC answer (connection refused, closed socket, timeout).
	#[error("Failed to send custom request ({method} ({params})): {message}")]
	Transport { method: String, params: String, message: String },
	/// The node answered with a JSON-RPC error object.
	#[error("{message}")]
	Call { method: String, code: i32, message: String },
	#[error("Could not parse response of {method}: '{message}'")]
	Response { method: String, message: String },
}

impl RpcError {
	/// Error message reported by the node, if the node answered at all.
	pub fn call_message(&self) -> Option<&str> {
		match self {
			RpcError::Call { message, .. } => Some(message),
			_ => None,
		}
	}

	pub(crate) fn response(method: &str, message: impl ToString) -> Self {
		RpcError::Response { method: method.to_string(), message: message.to_string() }
	}
}

pub trait RawRpc {
	#[allow(async_fn_in_trait)]
	async fn request<T: DeserializeOwned>(
		&self,
		method: &str,
		params: RpcParams,
	) -> Result<T, RpcError>;
}

/// Positional JSON-RPC parameters.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RpcParams(Vec<serde_json::Value>);

impl RpcParams {
	pub fn empty() -> Self {
		Self(Vec::new())
	}

	pub fn push<T: serde::Serialize>(mut self, value: T) -> Result<Self, RpcError> {
		let value =
			serde_json::to_value(value).map_err(|e| RpcError::Parameters(e.to_string()))?;
		self.0.push(value);
		Ok(self)
	}

	pub fn values(&self) -> &[serde_json::Value] {
		&self.0
	}
}

impl From<Vec<serde_json::Value>> for RpcParams {
	fn from(values: Vec<serde_json::Value>) -> Self {
		Self(values)
	}
}

/// Renders parameters the way they appear in transport error messages: comma separated.
impl std::fmt::Display for RpcParams {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let rendered: Vec<String> = self
			.0
			.iter()
			.map(|v| match v {
				serde_json::Value::String(s) => s.clone(),
				v => v.to_string(),
			})
			.collect();
		write!(f, "{}", rendered.join(","))
	}
}

impl ToRpcParams for RpcParams {
	fn to_rpc_params(self) -> Result<Option<Box<serde_json::value::RawValue>>, serde_json::Error> {
		let mut array_params = ArrayParams::new();
		self.0.into_iter().try_for_each(|v| array_params.insert(v))?;
		array_params.to_rpc_params()
	}
}

/// Builds [RpcParams] from a list of serializable expressions.
#[macro_export]
macro_rules! rpc_params {
	($($param:expr),* $(,)?) => {
		{
			let params = $crate::RpcParams::empty();
			$(
				let params = params.push($param);
				let params = match params {
					Ok(params) => params,
					Err(e) => return Err(e.into()),
				};
			)*
			params
		}
	};
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn params_display_joins_values_with_commas() {
		let params = RpcParams::from(vec![json!("0xabc"), json!(1), json!(true), json!(null)]);
		assert_eq!(params.to_string(), "0xabc,1,true,null");
	}

	#[test]
	fn transport_error_embeds_method_and_params() {
		let err = RpcError::Transport {
			method: "eth_getBalance".to_string(),
			params: RpcParams::from(vec![json!("0x01"), json!("latest")]).to_string(),
			message: "connection refused".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"Failed to send custom request (eth_getBalance (0x01,latest)): connection refused"
		);
	}

	#[test]
	fn call_error_displays_node_message() {
		let err = RpcError::Call {
			method: "eth_feeHistory".to_string(),
			code: -32603,
			message: "Error getting header at BlockId::Number(1)".to_string(),
		};
		assert_eq!(err.to_string(), "Error getting header at BlockId::Number(1)");
		assert_eq!(err.call_message(), Some("Error getting header at BlockId::Number(1)"));
	}

	#[test]
	fn rpc_params_macro_serializes_each_argument() {
		fn build() -> Result<RpcParams, RpcError> {
			Ok(rpc_params!["0x0", 1u64, Vec::<u8>::new()])
		}
		let params = build().unwrap();
		assert_eq!(params.values(), &[json!("0x0"), json!(1), json!([])]);
	}
}
