//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::app::service::FaucetService;
use crate::infra::auth::IdentityVerifier;

/// Handler state. Cloning is cheap; everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<FaucetService>,
    /// Absent when no identity provider is configured; the API then runs open
    pub verifier: Option<Arc<IdentityVerifier>>,
}

impl AppState {
    #[must_use]
    pub fn new(service: Arc<FaucetService>, verifier: Option<Arc<IdentityVerifier>>) -> Self {
        Self { service, verifier }
    }
}
