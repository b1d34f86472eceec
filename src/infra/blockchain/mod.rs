//! Chain access: raw JSON-RPC transport plus payload construction for the
//! EVM and Solana families.

pub mod evm;
pub mod rpc;
pub mod solana;

pub use rpc::{HttpRpcClient, RpcClientConfig};
