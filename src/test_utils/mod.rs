//! Shared test doubles, compiled for unit tests and behind the `test-utils`
//! feature for integration tests.

pub mod mocks;

pub use mocks::{MockChainRpc, MockCustodyClient, MockWithdrawalStore, RecordedSubmission};
