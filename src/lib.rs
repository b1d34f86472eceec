//! Custodial multi-chain token faucet.
//!
//! The faucet dispenses native tokens and USDC from custodial hot wallets
//! across several EVM chains and Solana. Signing and broadcast are delegated
//! to an external custody service; this crate resolves chain facts, builds
//! chain-specific transfer payloads, merges balances from the custody service
//! and raw JSON-RPC endpoints, and tracks transaction finality.

pub mod api;
pub mod app;
pub mod domain;
pub mod infra;
pub mod registry;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
