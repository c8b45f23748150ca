//! Opens HRMP channels between parachains of a local relay chain test network.
//!
//! Parachains cannot call the relay's `Hrmp` pallet directly: each request is encoded with the
//! relay's metadata and sent by the parachain's sudo key as an XCM `Transact`, executed on the
//! relay with the parachain's sovereign account as origin. That account pays for the
//! execution, which is why the run starts by funding it.

pub mod channels;
pub mod cli;
pub mod sovereign;
pub mod xcm;
