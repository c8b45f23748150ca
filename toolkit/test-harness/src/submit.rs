//! Signing, submitting and watching extrinsics.
//!
//! A transaction counts as done on the first `InBestBlock` or `InFinalizedBlock` status.
//! `Error`, `Invalid` and `Dropped` end the wait with [HarnessError::TxRejected]. One timeout
//! bounds the whole wait, from the first status to the dispatch outcome and its events.

use crate::{
	connection::{ChainConnection, hash_to_hex},
	dynamic,
	error::HarnessError,
	nonce::NonceSequence,
	wallet::Wallet,
};
use futures::future::try_join_all;
use std::time::Duration;
use subxt::{
	PolkadotConfig,
	config::polkadot::PolkadotExtrinsicParamsBuilder,
	error::DispatchError,
	ext::scale_value::Value,
	tx::{Payload, TxStatus},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TxParams {
	/// Chain assigned when unset.
	pub nonce: Option<u64>,
	pub tip: u128,
}

impl TxParams {
	pub fn with_nonce(nonce: u64) -> Self {
		Self { nonce: Some(nonce), tip: 0 }
	}
}

/// An event emitted by an extrinsic, with its fields still SCALE encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxEvent {
	pub pallet: String,
	pub variant: String,
	pub fields: Vec<u8>,
}

impl TxEvent {
	pub fn is(&self, pallet: &str, variant: &str) -> bool {
		self.pallet == pallet && self.variant == variant
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOutcome {
	pub block_hash: String,
	pub block_number: u64,
	pub events: Vec<TxEvent>,
}

impl TxOutcome {
	pub fn find(&self, pallet: &str, variant: &str) -> impl Iterator<Item = &TxEvent> {
		self.events.iter().filter(move |e| e.is(pallet, variant))
	}
}

pub async fn submit<Call: Payload>(
	connection: &ChainConnection,
	signer: &Wallet,
	call: &Call,
	params: TxParams,
	timeout: Duration,
) -> Result<TxOutcome, HarnessError> {
	let mut builder = PolkadotExtrinsicParamsBuilder::<PolkadotConfig>::new().tip(params.tip);
	if let Some(nonce) = params.nonce {
		builder = builder.nonce(nonce);
	}
	let mut progress = connection
		.api()
		.tx()
		.sign_and_submit_then_watch(call, signer.keypair(), builder.build())
		.await
		.map_err(dispatch_error)?;
	log::debug!(
		"Submitted extrinsic {} from {}",
		hash_to_hex(&progress.extrinsic_hash()),
		signer.address()
	);

	let included = async {
		let in_block = loop {
			let Some(status) = progress.next().await else {
				return Err(HarnessError::TxRejected("transaction status stream ended".to_string()));
			};
			match status? {
				TxStatus::InBestBlock(in_block) | TxStatus::InFinalizedBlock(in_block) => {
					break in_block;
				},
				TxStatus::Error { message }
				| TxStatus::Invalid { message }
				| TxStatus::Dropped { message } => return Err(HarnessError::TxRejected(message)),
				_ => continue,
			}
		};
		let block_hash = in_block.block_hash();
		let events = in_block.wait_for_success().await.map_err(dispatch_error)?;
		let events = events
			.iter()
			.map(|event| {
				let event = event?;
				Ok(TxEvent {
					pallet: event.pallet_name().to_string(),
					variant: event.variant_name().to_string(),
					fields: event.field_bytes().to_vec(),
				})
			})
			.collect::<Result<Vec<_>, subxt::Error>>()?;
		Ok::<_, HarnessError>((block_hash, events))
	};
	let (block_hash, events) = bounded(timeout, included).await?;
	let block_number = connection.block_number(block_hash).await?;
	log::debug!("Extrinsic included in block #{block_number} ({})", hash_to_hex(&block_hash));
	Ok(TxOutcome { block_hash: hash_to_hex(&block_hash), block_number, events })
}

/// Fails with [HarnessError::Timeout] when `wait` does not finish within `timeout`.
async fn bounded<T>(
	timeout: Duration,
	wait: impl Future<Output = Result<T, HarnessError>>,
) -> Result<T, HarnessError> {
	tokio::time::timeout(timeout, wait)
		.await
		.map_err(|_| HarnessError::Timeout(timeout.as_millis()))?
}

/// Hands the extrinsic to the node's pool without watching it. Returns the extrinsic hash.
pub async fn submit_to_pool<Call: Payload>(
	connection: &ChainConnection,
	signer: &Wallet,
	call: &Call,
	params: TxParams,
) -> Result<String, HarnessError> {
	let mut builder = PolkadotExtrinsicParamsBuilder::<PolkadotConfig>::new().tip(params.tip);
	if let Some(nonce) = params.nonce {
		builder = builder.nonce(nonce);
	}
	let hash = connection
		.api()
		.tx()
		.sign_and_submit(call, signer.keypair(), builder.build())
		.await
		.map_err(dispatch_error)?;
	log::debug!("Extrinsic {} from {} is in the pool", hash_to_hex(&hash), signer.address());
	Ok(hash_to_hex(&hash))
}

/// Resolves a failed dispatch against the chain metadata.
pub(crate) fn dispatch_error(err: subxt::Error) -> HarnessError {
	match err {
		subxt::Error::Runtime(DispatchError::Module(module_error)) => {
			match module_error.details() {
				Ok(details) => HarnessError::Dispatch {
					section: section_name(details.pallet.name()),
					name: details.variant.name.clone(),
					docs: details.variant.docs.join(" "),
				},
				Err(_) => HarnessError::DispatchOther(module_error.to_string()),
			}
		},
		subxt::Error::Runtime(other) => HarnessError::DispatchOther(format!("{other:?}")),
		other => other.into(),
	}
}

/// Pallet names as they appear in error messages: `Contracts` becomes `contracts`.
pub(crate) fn section_name(pallet: &str) -> String {
	let mut chars = pallet.chars();
	match chars.next() {
		Some(first) => first.to_lowercase().chain(chars).collect(),
		None => String::new(),
	}
}

pub async fn transfer(
	connection: &ChainConnection,
	signer: &Wallet,
	dest: [u8; 32],
	amount: u128,
	params: TxParams,
	timeout: Duration,
) -> Result<TxOutcome, HarnessError> {
	let call = subxt::dynamic::tx(
		"Balances",
		"transfer",
		vec![dynamic::multi_address(&dest), Value::u128(amount)],
	);
	submit(connection, signer, &call, params, timeout).await
}

/// Sends `amount` to every wallet at once, with nonces pre-assigned from the funder's sequence.
pub async fn fund_wallets(
	connection: &ChainConnection,
	funder: &Wallet,
	wallets: &[Wallet],
	amount: u128,
	timeout: Duration,
) -> Result<Vec<TxOutcome>, HarnessError> {
	let nonces = NonceSequence::for_account(connection.rpc(), funder.address()).await?;
	log::info!("Funding {} wallets with {amount} each from {}", wallets.len(), funder.address());
	let transfers = wallets.iter().map(|wallet| {
		let params = TxParams::with_nonce(nonces.next());
		transfer(connection, funder, wallet.account(), amount, params, timeout)
	});
	try_join_all(transfers).await.inspect_err(|e| {
		log::error!("Error transferring funds to end user wallets: {e}");
	})
}
