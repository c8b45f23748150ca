//! [RawRpc] implementation with jsonrpsee, for both HTTP and WebSocket transports.

use crate::{RawRpc, RpcError, RpcParams};
use jsonrpsee::{
	core::{ClientError, client::ClientT},
	http_client::{HttpClient, HttpClientBuilder},
	ws_client::{WsClient, WsClientBuilder},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Either transport, chosen by the URL scheme in [client_for_url].
pub enum RpcClient {
	Http(HttpClient),
	Ws(WsClient),
}

/// Connects to `url`. `ws://` and `wss://` give a WebSocket client, anything else HTTP.
pub async fn client_for_url(url: &str) -> Result<RpcClient, String> {
	if url.starts_with("ws://") || url.starts_with("wss://") {
		let client = WsClientBuilder::default()
			.request_timeout(REQUEST_TIMEOUT)
			.build(url)
			.await
			.map_err(|e| format!("Couldn't create WebSocket client for {url}: {e}"))?;
		Ok(RpcClient::Ws(client))
	} else {
		let client = HttpClientBuilder::default()
			.request_timeout(REQUEST_TIMEOUT)
			.build(url)
			.map_err(|e| format!("Couldn't create HTTP client for {url}: {e}"))?;
		Ok(RpcClient::Http(client))
	}
}

fn request_to_json(method: &str, params: &RpcParams) -> String {
	json!({
		"method": method,
		"params": params.values(),
	})
	.to_string()
}

fn response_to_json(resp: &Result<serde_json::Value, ClientError>) -> String {
	match &resp {
		Ok(resp) => resp.to_string(),
		Err(ClientError::Call(err)) => {
			serde_json::to_string(&err).unwrap_or_else(|_| err.message().to_string())
		},
		Err(err) => err.to_string(),
	}
}

fn to_rpc_error(method: &str, params: &RpcParams, e: ClientError) -> RpcError {
	match e {
		ClientError::Call(err) => RpcError::Call {
			method: method.to_string(),
			code: err.code(),
			message: err.message().to_string(),
		},
		ClientError::ParseError(e) => RpcError::response(method, e),
		e => RpcError::Transport {
			method: method.to_string(),
			params: params.to_string(),
			message: e.to_string(),
		},
	}
}

async fn request_with<C: ClientT + Sync, T: DeserializeOwned>(
	client: &C,
	method: &str,
	params: RpcParams,
) -> Result<T, RpcError> {
	log::debug!("request: {}", request_to_json(method, &params));
	let response = ClientT::request::<serde_json::Value, _>(client, method, params.clone()).await;
	log::debug!("response: {}", response_to_json(&response));

	let value = response.map_err(|e| to_rpc_error(method, &params, e))?;
	serde_json::from_value(value).map_err(|e| RpcError::response(method, e))
}

impl RawRpc for HttpClient {
	async fn request<T: DeserializeOwned>(
		&self,
		method: &str,
		params: RpcParams,
	) -> Result<T, RpcError> {
		request_with(self, method, params).await
	}
}

impl RawRpc for WsClient {
	async fn request<T: DeserializeOwned>(
		&self,
		method: &str,
		params: RpcParams,
	) -> Result<T, RpcError> {
		request_with(self, method, params).await
	}
}

impl RawRpc for RpcClient {
	async fn request<T: DeserializeOwned>(
		&self,
		method: &str,
		params: RpcParams,
	) -> Result<T, RpcError> {
		match self {
			RpcClient::Http(client) => request_with(client, method, params).await,
			RpcClient::Ws(client) => request_with(client, method, params).await,
		}
	}
}
