//! End-to-end suites of the Ice node.
//!
//! Every suite spawns a development node (`ICE_BINARY_PATH`, or `../target/$ICE_BUILD/ice-node`)
//! unless `ICE_CHAIN` names a live network, so they are ignored by default. Run them one at a
//! time, since every suite binds the same ports:
//!
//! `cargo test -p ice-e2e -- --ignored --test-threads=1`
//!
//! Compiled contracts are read from `ICE_ASSETS_DIR` (`e2e/assets` by default), laid out like
//! the contract build output: `evm/<Name>.json` artifacts and `<ctx>/<name>.contract` bundles.
//! Steps of a suite run in order and later steps rely on the state earlier ones left behind.

#![cfg(test)]

mod assets;
mod evm;
mod ink;
mod smoke;
mod upgrade;
