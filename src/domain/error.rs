//! Error taxonomy for the faucet service.

use thiserror::Error;

/// Top-level application error
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Custody service error: {0}")]
    Custody(#[from] CustodyError),

    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Not supported: {0}")]
    NotSupported(String),
}

/// Client input errors, rejected before any outbound call
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid chain: {0}")]
    InvalidChain(String),

    #[error("Invalid network mode '{mode}' for chain '{chain}'")]
    InvalidNetworkMode { chain: String, mode: String },

    #[error("Token '{token}' is not supported on {chain} ({mode})")]
    UnsupportedToken {
        token: String,
        chain: String,
        mode: String,
    },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Insufficient balance: available {available}, requested {requested}")]
    InsufficientBalance {
        available: String,
        requested: String,
    },

    #[error("{0}")]
    Multiple(String),
}

/// Errors from the custody/signing service
#[derive(Debug, Error)]
pub enum CustodyError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Wallet not provisioned: {0}")]
    MissingWallet(String),
}

/// Errors from raw chain RPC endpoints
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("RPC error {code}: {message}")]
    Envelope { code: i64, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

/// Errors from the durable withdrawal store
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Configuration errors raised at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages_are_user_facing() {
        let err = ValidationError::InvalidChain("dogechain".to_string());
        assert_eq!(err.to_string(), "Invalid chain: dogechain");

        let err = ValidationError::InsufficientBalance {
            available: "2".to_string(),
            requested: "2.5".to_string(),
        };
        assert!(err.to_string().contains("available 2"));
        assert!(err.to_string().contains("requested 2.5"));
    }

    #[test]
    fn test_nested_errors_wrap_into_app_error() {
        let err: AppError = ValidationError::InvalidAmount("0".to_string()).into();
        assert!(matches!(err, AppError::Validation(_)));

        let err: AppError = RpcError::Envelope {
            code: -32000,
            message: "execution reverted".to_string(),
        }
        .into();
        assert!(err.to_string().contains("-32000"));
    }
}
