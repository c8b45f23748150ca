use crate::{sovereign::sovereign_account, xcm};
use futures::future::try_join_all;
use ice_rpc_client::types::BlockRef;
use ice_test_harness::{
	ChainConnection, ChainParams, HarnessError, NonceSequence, TxOutcome, TxParams, Wallet,
	dynamic, submit, transfer,
	wait::FixedDelayRetries,
};
use std::{collections::BTreeMap, time::Duration};
use subxt::ext::scale_value::{At, Value};

/// Parameters of relay chains and of parachains that are not Ice chains.
pub const SUBSTRATE_PARAMS: ChainParams = ChainParams {
	rpc_endpoint: "ws://127.0.0.1:9955",
	chain_id: 0,
	ss58_prefix: 42,
	upgrade_ctx_address: None,
};

/// Channel limits the relay chain accepts, from `Configuration.ActiveConfig`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelLimits {
	pub max_capacity: u32,
	pub max_message_size: u32,
}

pub async fn channel_limits(relay: &ChainConnection) -> Result<ChannelLimits, HarnessError> {
	let query = subxt::dynamic::storage("Configuration", "ActiveConfig", Vec::<Value>::new());
	let config = relay.api().storage().at_latest().await?.fetch_or_default(&query).await?;
	let config = config.to_value().map_err(subxt::Error::from)?;
	let field = |name: &str| {
		config
			.at(name)
			.and_then(|v| v.as_u128())
			.ok_or_else(|| HarnessError::Config(format!("relay configuration has no {name}")))
			.and_then(|v| dynamic::narrow("Configuration.ActiveConfig", v))
	};
	Ok(ChannelLimits {
		max_capacity: field("hrmp_channel_max_capacity")?,
		max_message_size: field("hrmp_channel_max_message_size")?,
	})
}

fn para_id(id: u32) -> Value {
	Value::unnamed_composite([Value::u128(id as u128)])
}

/// `HrmpChannelId`, the key of one direction between two parachains.
fn channel_id(sender: u32, recipient: u32) -> Value {
	Value::named_composite([("sender", para_id(sender)), ("recipient", para_id(recipient))])
}

/// Whether the relay holds a request from `sender` to open a channel to `recipient` that
/// nobody accepted yet.
pub async fn open_request_pending(
	relay: &ChainConnection,
	sender: u32,
	recipient: u32,
) -> Result<bool, HarnessError> {
	let query = subxt::dynamic::storage(
		"Hrmp",
		"HrmpOpenChannelRequests",
		vec![channel_id(sender, recipient)],
	);
	let request = relay.api().storage().at_latest().await?.fetch(&query).await?;
	Ok(request.is_some())
}

/// Encodes `relay_call` with the relay's metadata and has `para` send it to the relay inside
/// a sudo wrapped XCM Transact.
async fn transact_on_relay(
	relay: &ChainConnection,
	para: &ChainConnection,
	sudo: &Wallet,
	relay_call: subxt::tx::DynamicPayload,
	refund_account: &[u8; 32],
	timeout: Duration,
) -> Result<TxOutcome, HarnessError> {
	let encoded = relay.api().tx().call_data(&relay_call)?;
	log::debug!(
		"Encoded {}.{} request: 0x{}",
		relay_call.pallet_name(),
		relay_call.call_name(),
		hex::encode(&encoded)
	);
	let message = xcm::transact_message(&encoded, refund_account);
	let call = subxt::dynamic::tx("Sudo", "sudo", vec![xcm::send_to_parent(message)]);
	let nonce = NonceSequence::for_account(para.rpc(), sudo.address()).await?;
	submit(para, sudo, &call, TxParams::with_nonce(nonce.next()), timeout).await
}

/// Asks the relay to open a channel from `sender` to `recipient`, submitted on the sender's
/// parachain `para`.
pub async fn open(
	relay: &ChainConnection,
	para: &ChainConnection,
	sudo: &Wallet,
	sender: u32,
	recipient: u32,
	timeout: Duration,
) -> Result<TxOutcome, HarnessError> {
	let limits = channel_limits(relay).await?;
	log::info!("Opening channel {sender} -> {recipient} with {limits:?}");
	let call = subxt::dynamic::tx(
		"Hrmp",
		"hrmp_init_open_channel",
		vec![
			para_id(recipient),
			Value::u128(limits.max_capacity as u128),
			Value::u128(limits.max_message_size as u128),
		],
	);
	transact_on_relay(relay, para, sudo, call, &sovereign_account(sender), timeout).await
}

/// Accepts the channel `sender` asked to open, submitted on the recipient's parachain `para`.
/// Returns `None` when the relay has no pending request for this channel.
pub async fn accept(
	relay: &ChainConnection,
	para: &ChainConnection,
	sudo: &Wallet,
	sender: u32,
	recipient: u32,
	timeout: Duration,
) -> Result<Option<TxOutcome>, HarnessError> {
	if !open_request_pending(relay, sender, recipient).await? {
		log::info!("No open request {sender} -> {recipient} to accept");
		return Ok(None);
	}
	let call = subxt::dynamic::tx("Hrmp", "hrmp_accept_open_channel", vec![para_id(sender)]);
	let outcome =
		transact_on_relay(relay, para, sudo, call, &sovereign_account(recipient), timeout).await?;
	log::info!("Accepted channel {sender} -> {recipient} in block #{}", outcome.block_number);
	Ok(Some(outcome))
}

/// Sends `amount` to the sovereign account of every parachain, with nonces handed out from
/// the funder's sequence.
pub async fn fund_sovereign_accounts(
	relay: &ChainConnection,
	funder: &Wallet,
	para_ids: &[u32],
	amount: u128,
	timeout: Duration,
) -> Result<Vec<TxOutcome>, HarnessError> {
	let nonces = NonceSequence::for_account(relay.rpc(), funder.address()).await?;
	let transfers = para_ids.iter().map(|id| {
		let account = sovereign_account(*id);
		log::info!("Fund address {} {amount}", relay.address_of(&account));
		transfer(relay, funder, account, amount, TxParams::with_nonce(nonces.next()), timeout)
	});
	try_join_all(transfers).await
}

/// What [run] does: which parachains exist, where to reach them and which pairs to connect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plan {
	pub relay_url: String,
	pub parachains: BTreeMap<u32, String>,
	/// Each pair gets a channel in both directions.
	pub channels: Vec<(u32, u32)>,
	pub funding_amount: u128,
	pub funder_uri: String,
	pub sudo_uri: String,
	pub tx_timeout: Duration,
	pub retries: FixedDelayRetries,
}

impl Plan {
	fn url(&self, para_id: u32) -> Result<&str, HarnessError> {
		self.parachains.get(&para_id).map(String::as_str).ok_or_else(|| no_endpoint(para_id))
	}

	/// Every channel to open, in order: the reverse of a pair only after the pair itself.
	pub fn directions(&self) -> Vec<(u32, u32)> {
		self.channels.iter().flat_map(|&(a, b)| [(a, b), (b, a)]).collect()
	}

	pub fn validate(&self) -> Result<(), HarnessError> {
		for (a, b) in &self.channels {
			if a == b {
				let message = format!("channel {a} -> {b} connects a chain to itself");
				return Err(HarnessError::Config(message));
			}
			self.url(*a)?;
			self.url(*b)?;
		}
		Ok(())
	}
}

fn no_endpoint(para_id: u32) -> HarnessError {
	HarnessError::Config(format!("no endpoint given for parachain {para_id}"))
}

/// Funds the sovereign accounts, then opens and accepts every channel of the plan in order.
pub async fn run(plan: &Plan) -> Result<(), HarnessError> {
	plan.validate()?;
	let relay = ChainConnection::connect(&plan.relay_url, SUBSTRATE_PARAMS).await?;
	let last: BlockRef = relay.last_block().await?;
	log::info!("Relay chain at block #{}", last.number);

	let funder = Wallet::from_uri(&plan.funder_uri, SUBSTRATE_PARAMS.ss58_prefix)?;
	let para_ids: Vec<u32> = plan.parachains.keys().copied().collect();
	fund_sovereign_accounts(&relay, &funder, &para_ids, plan.funding_amount, plan.tx_timeout)
		.await?;

	let mut connections = BTreeMap::new();
	for (id, url) in &plan.parachains {
		connections.insert(*id, ChainConnection::connect(url, SUBSTRATE_PARAMS).await?);
	}
	let para = |id: u32| connections.get(&id).ok_or_else(|| no_endpoint(id));

	let sudo = Wallet::from_uri(&plan.sudo_uri, SUBSTRATE_PARAMS.ss58_prefix)?;
	let relay = &relay;
	for (sender, recipient) in plan.directions() {
		open(relay, para(sender)?, &sudo, sender, recipient, plan.tx_timeout).await?;
		plan.retries
			.wait_until(&format!("open request {sender} -> {recipient}"), || async move {
				open_request_pending(relay, sender, recipient).await
			})
			.await?;
		accept(relay, para(recipient)?, &sudo, sender, recipient, plan.tx_timeout).await?;
	}
	log::info!("Opened {} channels", plan.directions().len());
	Ok(())
}
