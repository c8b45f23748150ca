use crate::error::HarnessError;
use ice_rpc_client::eth::{EthRpc, TransactionReceipt};
use std::{future::Future, time::Duration};
use tokio_retry::{Retry, strategy::FixedInterval};

/// Polling with a fixed delay and a fixed number of retries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedDelayRetries {
	delay: Duration,
	retries: usize,
}

impl FixedDelayRetries {
	pub fn new(delay: Duration, retries: usize) -> Self {
		Self { delay, retries }
	}

	/// Every 500 ms for one minute.
	pub fn one_minute() -> Self {
		Self { delay: Duration::from_millis(500), retries: 119 }
	}

	/// Polls `condition` until it returns `Ok(true)`. Errors of the condition count as a failed
	/// attempt; the last one is returned once the retries are exhausted.
	pub async fn wait_until<F, Fut>(&self, what: &str, condition: F) -> Result<(), HarnessError>
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = Result<bool, HarnessError>>,
	{
		let mut condition = condition;
		let strategy = FixedInterval::new(self.delay).take(self.retries);
		Retry::spawn(strategy, || {
			let attempt = condition();
			async move {
				match attempt.await {
					Ok(true) => Ok(()),
					Ok(false) => Err(None),
					Err(e) => Err(Some(e)),
				}
			}
		})
		.await
		.map_err(|last| {
			let err = last.unwrap_or_else(|| HarnessError::Timeout(self.timeout().as_millis()));
			log::warn!("Gave up waiting for {what}: {err}");
			err
		})
	}

	/// Polls `eth_getTransactionReceipt` until the node knows the transaction.
	pub async fn wait_for_receipt<C: EthRpc>(
		&self,
		client: &C,
		tx_hash: &str,
	) -> Result<TransactionReceipt, HarnessError> {
		let strategy = FixedInterval::new(self.delay).take(self.retries);
		Retry::spawn(strategy, || async {
			log::debug!("Probing for receipt of transaction '{tx_hash}'");
			match client.transaction_receipt(tx_hash).await {
				Ok(Some(receipt)) => Ok(receipt),
				Ok(None) => Err(None),
				Err(e) => Err(Some(HarnessError::from(e))),
			}
		})
		.await
		.map_err(|last| {
			last.unwrap_or_else(|| {
				HarnessError::Evm(format!(
					"Retries for the receipt of transaction '{tx_hash}' exceeded the limit"
				))
			})
		})
	}

	fn timeout(&self) -> Duration {
		self.delay * (self.retries as u32 + 1)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ice_rpc_client::{RawRpc, RpcError, RpcParams};
	use serde::de::DeserializeOwned;
	use serde_json::{Value, json};
	use std::cell::{Cell, RefCell};

	struct MockReceipts {
		responses: RefCell<Vec<Result<Value, RpcError>>>,
	}

	impl RawRpc for MockReceipts {
		async fn request<T: DeserializeOwned>(
			&self,
			method: &str,
			_params: RpcParams,
		) -> Result<T, RpcError> {
			assert_eq!(method, "eth_getTransactionReceipt");
			let response = self.responses.borrow_mut().pop().unwrap()?;
			Ok(serde_json::from_value(response).unwrap())
		}
	}

	fn receipt() -> Value {
		json!({
			"transactionHash": "0x07",
			"blockHash": "0x08",
			"blockNumber": "0x2",
			"contractAddress": "0xc2bf5f29a4384b1ab0c063e1c666f02121b6084a",
			"gasUsed": "0x5208",
			"cumulativeGasUsed": "0x5208",
			"status": "0x1"
		})
	}

	fn retries() -> FixedDelayRetries {
		FixedDelayRetries::new(Duration::from_millis(1), 3)
	}

	#[tokio::test]
	async fn receipt_in_2nd_attempt() {
		let mock = MockReceipts { responses: RefCell::new(vec![Ok(receipt()), Ok(Value::Null)]) };

		let receipt = retries().wait_for_receipt(&mock, "0x07").await.unwrap();

		assert_eq!(receipt.gas_used, 21000);
		assert_eq!(receipt.block_number, Some(2));
	}

	#[tokio::test]
	async fn receipt_never_shows_up() {
		let mock = MockReceipts {
			responses: RefCell::new(vec![Ok(Value::Null), Ok(Value::Null), Ok(Value::Null)]),
		};

		let err = FixedDelayRetries::new(Duration::from_millis(1), 2)
			.wait_for_receipt(&mock, "0x07")
			.await
			.unwrap_err();

		assert_eq!(
			err.to_string(),
			"EVM request failed: Retries for the receipt of transaction '0x07' exceeded the limit"
		);
	}

	#[tokio::test]
	async fn last_rpc_error_is_kept() {
		let mock = MockReceipts {
			responses: RefCell::new(vec![Err(RpcError::Call {
				method: "eth_getTransactionReceipt".to_string(),
				code: -32603,
				message: "unknown transaction".to_string(),
			})]),
		};

		let err = FixedDelayRetries::new(Duration::from_millis(1), 0)
			.wait_for_receipt(&mock, "0x07")
			.await
			.unwrap_err();

		assert!(matches!(err, HarnessError::Rpc(RpcError::Call { code: -32603, .. })));
	}

	#[tokio::test]
	async fn waits_until_the_condition_holds() {
		let calls = Cell::new(0);

		retries()
			.wait_until("third call", || {
				calls.set(calls.get() + 1);
				let done = calls.get() == 3;
				async move { Ok(done) }
			})
			.await
			.unwrap();

		assert_eq!(calls.get(), 3);
	}

	#[tokio::test]
	async fn condition_that_never_holds_times_out() {
		let err = FixedDelayRetries::new(Duration::from_millis(1), 1)
			.wait_until("nothing", || async { Ok(false) })
			.await
			.unwrap_err();

		assert!(matches!(err, HarnessError::Timeout(2)));
	}
}
