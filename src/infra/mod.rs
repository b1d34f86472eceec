//! Infrastructure adapters: custody, chain RPC, identity, and storage.

pub mod auth;
pub mod blockchain;
pub mod custody;
pub mod database;
