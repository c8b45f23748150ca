use jsonrpsee::{
	Extensions, RpcModule,
	server::Server,
	types::{ErrorObjectOwned, Params},
};
use serde_json::Value;
use std::{net::SocketAddr, sync::Arc};

type Handler = Arc<dyn Fn(Params) -> Result<Value, ErrorObjectOwned> + Send + Sync>;

pub async fn for_single_test<F>(method: &'static str, handler: F) -> anyhow::Result<SocketAddr>
where
	F: Fn(Params) -> Result<Value, ErrorObjectOwned> + Send + Sync + 'static,
{
	for_methods(vec![(method, Arc::new(handler))]).await
}

pub async fn for_methods(methods: Vec<(&'static str, Handler)>) -> anyhow::Result<SocketAddr> {
	let server = Server::builder().build("127.0.0.1:0".parse::<SocketAddr>()?).await?;
	let mut module = RpcModule::new(());
	for (method, handler) in methods {
		module.register_method(method, move |params: Params, _ctx: &(), _e: &Extensions| {
			handler(params)
		})?;
	}
	let addr = server.local_addr()?;
	let handle = server.start(module);
	// It will stop when test main exists.
	tokio::spawn(handle.stopped());
	Ok(addr)
}

pub fn handler<F>(f: F) -> Handler
where
	F: Fn(Params) -> Result<Value, ErrorObjectOwned> + Send + Sync + 'static,
{
	Arc::new(f)
}
