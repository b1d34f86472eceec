//! Domain layer containing core business types, traits, and error definitions.

pub mod error;
pub mod traits;
pub mod types;
pub mod units;

pub use error::{
    AppError, ConfigError, CustodyError, DatabaseError, RpcError, ValidationError,
};
pub use traits::{ChainRpc, CustodyClient, WithdrawalStore};
pub use types::{
    BalanceData, BalanceEntry, ChainFamily, CustodySubmission, ErrorDetail, ErrorResponse,
    EvmTransactionRequest, FamilyBalances, HealthResponse, HealthStatus, NetworkMode,
    NewWithdrawal, TokenKind, TransactionRecord, TransactionStatus, TransactionStatusResponse,
    TransferIntent, TransferResult, WalletInfo,
};
