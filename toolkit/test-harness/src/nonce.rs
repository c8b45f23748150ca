use crate::error::HarnessError;
use ice_rpc_client::substrate::SubstrateRpc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out consecutive nonces for one sender, so several of its transactions can be in
/// flight at once.
#[derive(Debug)]
pub struct NonceSequence {
	next: AtomicU64,
}

impl NonceSequence {
	pub fn starting_at(nonce: u64) -> Self {
		Self { next: AtomicU64::new(nonce) }
	}

	/// Seeds the sequence with the chain's next index for `address`, pool included.
	pub async fn for_account<C: SubstrateRpc>(
		client: &C,
		address: &str,
	) -> Result<Self, HarnessError> {
		let nonce = client.account_next_index(address).await?;
		log::debug!("Nonce sequence for {address} starts at {nonce}");
		Ok(Self::starting_at(nonce))
	}

	pub fn next(&self) -> u64 {
		self.next.fetch_add(1, Ordering::SeqCst)
	}

	pub fn peek(&self) -> u64 {
		self.next.load(Ordering::SeqCst)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ice_rpc_client::{RawRpc, RpcError, RpcParams};
	use serde::de::DeserializeOwned;
	use std::{collections::HashSet, sync::Arc};

	#[test]
	fn hands_out_increasing_nonces() {
		let nonces = NonceSequence::starting_at(7);
		assert_eq!((nonces.next(), nonces.next(), nonces.next()), (7, 8, 9));
		assert_eq!(nonces.peek(), 10);
	}

	#[test]
	fn never_repeats_under_concurrent_use() {
		let nonces = Arc::new(NonceSequence::starting_at(0));
		let handles: Vec<_> = (0..8)
			.map(|_| {
				let nonces = nonces.clone();
				std::thread::spawn(move || (0..100).map(|_| nonces.next()).collect::<Vec<_>>())
			})
			.collect();
		let all: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
		let unique: HashSet<u64> = all.iter().copied().collect();
		assert_eq!(all.len(), 800);
		assert_eq!(unique.len(), 800);
		assert_eq!(nonces.peek(), 800);
	}

	struct NextIndex(u64);

	impl RawRpc for NextIndex {
		async fn request<T: DeserializeOwned>(
			&self,
			method: &str,
			params: RpcParams,
		) -> Result<T, RpcError> {
			assert_eq!(method, "system_accountNextIndex");
			assert_eq!(params.to_string(), "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY");
			Ok(serde_json::from_value(serde_json::json!(self.0)).unwrap())
		}
	}

	#[tokio::test]
	async fn seeded_from_the_chain() {
		let nonces =
			NonceSequence::for_account(&NextIndex(3), "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY")
				.await
				.unwrap();
		assert_eq!(nonces.next(), 3);
	}
}
