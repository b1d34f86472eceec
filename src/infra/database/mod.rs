//! Durable storage for the withdrawal mirror.

pub mod postgres;

pub use postgres::{PostgresConfig, PostgresStore};
