//! The XCM V2 program a parachain sends to its relay chain to have a call dispatched there with
//! the parachain's sovereign account as origin.

use subxt::ext::scale_value::Value;

/// Paid for execution on the relay chain; the surplus is refunded.
pub const XCM_FEE: u128 = 2_500_000_000_000_000;
pub const TRANSACT_WEIGHT: u64 = 20_000_000_000;

/// `MultiLocation { parents, interior: Here }`
fn here(parents: u8) -> Value {
	Value::named_composite([
		("parents", Value::u128(parents as u128)),
		("interior", Value::unnamed_variant("Here", [])),
	])
}

fn native_asset_id() -> Value {
	Value::unnamed_variant("Concrete", [here(0)])
}

fn native_asset(amount: u128) -> Value {
	Value::named_composite([
		("id", native_asset_id()),
		("fun", Value::unnamed_variant("Fungible", [Value::u128(amount)])),
	])
}

/// `VersionedMultiLocation::V1` of the relay chain, as seen from a parachain.
pub fn parent() -> Value {
	Value::unnamed_variant("V1", [here(1)])
}

/// WithdrawAsset, BuyExecution, Transact, RefundSurplus and DepositAsset back to
/// `refund_account`.
pub fn transact_message(encoded_call: &[u8], refund_account: &[u8; 32]) -> Value {
	let withdraw = Value::unnamed_variant(
		"WithdrawAsset",
		[Value::unnamed_composite([Value::unnamed_composite([native_asset(XCM_FEE)])])],
	);
	let buy_execution = Value::named_variant(
		"BuyExecution",
		[
			("fees", native_asset(XCM_FEE)),
			("weight_limit", Value::unnamed_variant("Unlimited", [])),
		],
	);
	let transact = Value::named_variant(
		"Transact",
		[
			("origin_type", Value::unnamed_variant("Native", [])),
			("require_weight_at_most", Value::u128(TRANSACT_WEIGHT as u128)),
			("call", Value::named_composite([("encoded", Value::from_bytes(encoded_call))])),
		],
	);
	let refund = Value::unnamed_variant("RefundSurplus", []);
	let all_native = Value::unnamed_variant(
		"Wild",
		[Value::named_variant(
			"AllOf",
			[("id", native_asset_id()), ("fun", Value::unnamed_variant("Fungible", []))],
		)],
	);
	let beneficiary = Value::named_composite([
		("parents", Value::u128(0)),
		(
			"interior",
			Value::unnamed_variant(
				"X1",
				[Value::named_variant(
					"AccountId32",
					[
						("network", Value::unnamed_variant("Any", [])),
						("id", Value::from_bytes(refund_account)),
					],
				)],
			),
		),
	]);
	let deposit = Value::named_variant(
		"DepositAsset",
		[
			("assets", all_native),
			("max_assets", Value::u128(1)),
			("beneficiary", beneficiary),
		],
	);

	Value::unnamed_variant(
		"V2",
		[Value::unnamed_composite([Value::unnamed_composite([
			withdraw,
			buy_execution,
			transact,
			refund,
			deposit,
		])])],
	)
}

/// `PolkadotXcm.send(parent, message)` as a runtime call, ready to be wrapped in `Sudo.sudo`.
pub fn send_to_parent(message: Value) -> Value {
	Value::unnamed_variant(
		"PolkadotXcm",
		[Value::named_variant("send", [("dest", parent()), ("message", message)])],
	)
}
