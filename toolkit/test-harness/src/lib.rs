//! Building blocks of the Ice end-to-end suites.

/// Networks the suites can run against
pub mod chain;
pub mod config;
/// Connection to a node over JSON-RPC and subxt
pub mod connection;
pub mod constants;
pub mod dynamic;
pub mod error;
/// Solidity contracts and transfers through alloy
pub mod evm;
/// ink! contracts through the `Contracts` pallet
pub mod ink;
pub mod nonce;
/// Signing and watching extrinsics
pub mod submit;
pub mod suite;
/// Polling with fixed delays
pub mod wait;
pub mod wallet;

pub use chain::{Chain, ChainParams, ChainTarget};
pub use config::{HarnessConfig, SecretString, Secrets};
pub use connection::{AccountInfo, ChainConnection};
pub use error::HarnessError;
pub use nonce::NonceSequence;
pub use submit::{TxEvent, TxOutcome, TxParams, fund_wallets, submit, submit_to_pool, transfer};
pub use suite::{TestContext, describe, describe_with_context};
pub use wallet::{EvmWallet, Wallet};
