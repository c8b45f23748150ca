use super::{call_options, deploy_options};
use crate::assets::FLIPPER;
use ice_test_harness::{
	ChainTarget, TestContext, TxParams, describe_with_context,
	ink::{self, Args},
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

async fn event_steps(context: Arc<TestContext>) -> anyhow::Result<()> {
	let flipper = FLIPPER.load(&context.config)?;
	let new = flipper.constructor_call("new", Args::new().push(false))?;
	let handle =
		ink::deploy(&context.connection, &flipper, &new, &deploy_options(&context), &context.keyring)
			.await?;

	log::info!("🌟 should emit the flipped value");
	let flip = flipper.message_call("flip", Args::new())?;
	let outcome = ink::write(
		&context.connection,
		&handle,
		&flip,
		&call_options(&context),
		&context.keyring,
		TxParams::default(),
	)
	.await?;
	let events = ink::contract_events(&outcome)?;
	assert_eq!(events.len(), 1, "{events:?}");
	assert_eq!(events[0].contract, handle.account()?);
	// Flipped { value: true } behind the event index.
	assert_eq!(events[0].data, vec![0x00, 0x01]);
	Ok(())
}

#[tokio::test]
#[ignore = "spawns an ice-node"]
async fn contract_events() -> anyhow::Result<()> {
	describe_with_context("Ice ink! (Events)", ChainTarget::Local, event_steps).await
}
