//! Domain types with validation support.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Chain family, determining address format and payload construction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChainFamily {
    Ethereum,
    Solana,
}

impl ChainFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ethereum => "ethereum",
            Self::Solana => "solana",
        }
    }
}

impl std::fmt::Display for ChainFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Network mode selecting between production and test networks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    Mainnet,
    #[default]
    Testnet,
}

impl NetworkMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Testnet => "testnet",
        }
    }
}

impl std::str::FromStr for NetworkMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mainnet" => Ok(Self::Mainnet),
            "testnet" => Ok(Self::Testnet),
            _ => Err(format!("Invalid network mode: {}", s)),
        }
    }
}

impl std::fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Requested token type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    #[default]
    Native,
    Usdc,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Native => "native",
            Self::Usdc => "usdc",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Custody-reported transaction status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Accepted by the custody service, not yet broadcast
    #[default]
    Pending,
    /// Broadcast to the network, awaiting confirmation
    Broadcasted,
    /// Confirmed on chain
    Confirmed,
    /// Finalized on chain
    Finalized,
    /// Reverted during execution
    ExecutionReverted,
    /// Failed before or during broadcast
    Failed,
    /// Replaced by another transaction
    Replaced,
    /// Upstream provider reported an error
    ProviderError,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Broadcasted => "broadcasted",
            Self::Confirmed => "confirmed",
            Self::Finalized => "finalized",
            Self::ExecutionReverted => "execution_reverted",
            Self::Failed => "failed",
            Self::Replaced => "replaced",
            Self::ProviderError => "provider_error",
        }
    }

    /// True once the status can no longer change; polling must stop here.
    #[must_use]
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Confirmed
                | Self::Finalized
                | Self::ExecutionReverted
                | Self::Failed
                | Self::Replaced
                | Self::ProviderError
        )
    }

    /// True iff the transfer landed on chain successfully.
    #[must_use]
    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Finalized)
    }
}

impl std::str::FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "broadcasted" => Ok(Self::Broadcasted),
            "confirmed" => Ok(Self::Confirmed),
            "finalized" => Ok(Self::Finalized),
            "execution_reverted" => Ok(Self::ExecutionReverted),
            "failed" => Ok(Self::Failed),
            "replaced" => Ok(Self::Replaced),
            "provider_error" => Ok(Self::ProviderError),
            _ => Err(format!("Invalid transaction status: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One balance query result, normalized across custody and RPC sources
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct BalanceEntry {
    /// Chain balance key (custody network alias or registry chain key)
    #[schema(example = "base_sepolia")]
    pub chain: String,
    /// Asset key, lowercase symbol
    #[schema(example = "eth")]
    pub asset: String,
    /// Raw integer value as a decimal string (avoids precision loss)
    #[schema(example = "1500000000000000000")]
    pub raw_value: String,
    /// Decimal count of the raw value
    pub raw_value_decimals: u8,
    /// Human-readable values keyed by symbol
    pub display_values: HashMap<String, String>,
}

/// Custody wallet identity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct WalletInfo {
    pub id: String,
    pub address: String,
}

/// Balances and wallet identity for one chain family
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FamilyBalances {
    pub wallet: WalletInfo,
    pub balances: Vec<BalanceEntry>,
}

/// Full balance response spanning both wallet families
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BalanceData {
    pub evm: FamilyBalances,
    pub solana: FamilyBalances,
}

/// User-submitted transfer intent
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferIntent {
    /// Recipient address (0x-hex for EVM chains, Base58 for Solana)
    #[validate(length(min = 1, message = "Wallet address is required"))]
    #[schema(example = "0x1234567890abcdef1234567890abcdef12345678")]
    pub wallet_address: String,
    /// Requested amount in chain-native units
    #[validate(range(min = 0.000000001, message = "Amount must be greater than 0"))]
    #[schema(example = 0.01)]
    pub amount: f64,
    /// Registry chain key
    #[validate(length(min = 1, message = "Chain is required"))]
    #[schema(example = "base")]
    pub chain: String,
    /// Network mode (defaults to testnet)
    #[serde(default)]
    pub network_mode: NetworkMode,
    /// Token type (defaults to the chain's native token)
    #[serde(default)]
    pub token: TokenKind,
}

/// Outcome of a dispatched transfer; finality is tracked separately
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    pub success: bool,
    /// Custody-assigned transaction identifier, used for status polling
    pub transaction_id: String,
    pub chain: String,
    /// Transaction hash, null until broadcast
    pub hash: Option<String>,
    pub explorer_url: Option<String>,
    pub amount: f64,
    pub to: String,
}

/// Custody-owned transaction record, read-only for this service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct TransactionRecord {
    pub id: String,
    /// CAIP-2 chain namespace the transaction was submitted on
    pub caip2: String,
    /// Creation time in epoch milliseconds
    pub created_at: i64,
    pub status: TransactionStatus,
    pub transaction_hash: Option<String>,
    #[serde(default)]
    pub wallet_id: Option<String>,
    #[serde(default)]
    pub sponsored: Option<bool>,
}

/// Transaction status response for the polling endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatusResponse {
    pub id: String,
    pub status: TransactionStatus,
    pub hash: Option<String>,
    pub explorer_url: Option<String>,
    pub is_final: bool,
    pub caip2: String,
    pub created_at: i64,
}

/// EVM transaction payload handed to the custody service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvmTransactionRequest {
    pub to: String,
    /// Hex-prefixed big integer value in the smallest unit
    pub value: String,
    /// ABI-encoded call data for contract calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

/// Custody acknowledgement of a submitted transfer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustodySubmission {
    pub transaction_id: String,
    pub hash: Option<String>,
}

/// New withdrawal row mirrored into the durable store at dispatch time
#[derive(Debug, Clone, PartialEq)]
pub struct NewWithdrawal {
    pub transaction_id: String,
    pub user_id: Option<String>,
    pub chain_key: String,
    pub network_mode: NetworkMode,
    pub token: TokenKind,
    pub recipient: String,
    pub amount: f64,
    pub status: TransactionStatus,
}

/// Health status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Some systems degraded but functional
    Degraded,
    /// Critical systems unavailable
    Unhealthy,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Overall system status
    pub status: HealthStatus,
    /// Durable store health
    pub database: HealthStatus,
    /// Custody service health
    pub custody: HealthStatus,
    /// Current server timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Application version
    #[schema(example = "0.1.0")]
    pub version: String,
}

impl HealthResponse {
    #[must_use]
    pub fn new(database: HealthStatus, custody: HealthStatus) -> Self {
        let status = match (&database, &custody) {
            (HealthStatus::Healthy, HealthStatus::Healthy) => HealthStatus::Healthy,
            (HealthStatus::Unhealthy, _) | (_, HealthStatus::Unhealthy) => HealthStatus::Unhealthy,
            _ => HealthStatus::Degraded,
        };
        Self {
            status,
            database,
            custody,
            timestamp: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error response structure
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
}

/// Error detail structure
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Error type identifier
    #[schema(example = "validation_error")]
    pub r#type: String,
    /// Human-readable error message
    #[schema(example = "Invalid chain: dogechain")]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_transaction_status_display_and_parsing() {
        let statuses = vec![
            (TransactionStatus::Pending, "pending"),
            (TransactionStatus::Broadcasted, "broadcasted"),
            (TransactionStatus::Confirmed, "confirmed"),
            (TransactionStatus::Finalized, "finalized"),
            (TransactionStatus::ExecutionReverted, "execution_reverted"),
            (TransactionStatus::Failed, "failed"),
            (TransactionStatus::Replaced, "replaced"),
            (TransactionStatus::ProviderError, "provider_error"),
        ];

        for (status, string) in statuses {
            assert_eq!(status.as_str(), string);
            assert_eq!(status.to_string(), string);
            assert_eq!(TransactionStatus::from_str(string).unwrap(), status);
        }

        assert!(TransactionStatus::from_str("invalid").is_err());
    }

    #[test]
    fn test_transaction_status_finality() {
        assert!(TransactionStatus::Confirmed.is_final());
        assert!(TransactionStatus::Finalized.is_final());
        assert!(TransactionStatus::ExecutionReverted.is_final());
        assert!(TransactionStatus::Failed.is_final());
        assert!(TransactionStatus::Replaced.is_final());
        assert!(TransactionStatus::ProviderError.is_final());

        assert!(!TransactionStatus::Pending.is_final());
        assert!(!TransactionStatus::Broadcasted.is_final());
    }

    #[test]
    fn test_transaction_status_success_classification() {
        assert!(TransactionStatus::Confirmed.is_successful());
        assert!(TransactionStatus::Finalized.is_successful());
        assert!(!TransactionStatus::Failed.is_successful());
        assert!(!TransactionStatus::ExecutionReverted.is_successful());
        assert!(!TransactionStatus::Broadcasted.is_successful());
    }

    #[test]
    fn test_transfer_intent_validation() {
        let intent = TransferIntent {
            wallet_address: "0x1234567890abcdef1234567890abcdef12345678".to_string(),
            amount: 0.5,
            chain: "base".to_string(),
            network_mode: NetworkMode::Testnet,
            token: TokenKind::Native,
        };
        assert!(intent.validate().is_ok());

        let mut bad = intent.clone();
        bad.amount = 0.0;
        assert!(bad.validate().is_err());

        let mut bad = intent.clone();
        bad.wallet_address = String::new();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_transfer_intent_defaults_from_json() {
        let intent: TransferIntent = serde_json::from_str(
            r#"{"walletAddress": "0xabc", "amount": 1.0, "chain": "ethereum"}"#,
        )
        .unwrap();
        assert_eq!(intent.network_mode, NetworkMode::Testnet);
        assert_eq!(intent.token, TokenKind::Native);
    }

    #[test]
    fn test_transaction_record_deserialization() {
        let json = r#"{
            "id": "tx_123",
            "caip2": "eip155:84532",
            "created_at": 1735000000000,
            "status": "broadcasted",
            "transaction_hash": "0xdeadbeef",
            "wallet_id": "w_1",
            "sponsored": true
        }"#;
        let record: TransactionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, TransactionStatus::Broadcasted);
        assert_eq!(record.sponsored, Some(true));
        assert_eq!(record.transaction_hash.as_deref(), Some("0xdeadbeef"));
    }
}
