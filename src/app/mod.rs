//! Application layer: service orchestration and shared state.

pub mod service;
pub mod state;

pub use service::{FaucetService, PollOptions};
pub use state::AppState;
