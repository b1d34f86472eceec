//! Domain traits defining contracts for external systems.

use async_trait::async_trait;

use super::error::AppError;
use super::types::{
    BalanceEntry, ChainFamily, CustodySubmission, EvmTransactionRequest, NewWithdrawal,
    TransactionRecord, TransactionStatus, WalletInfo,
};

/// Custody/signing service: holds the faucet's private keys and performs
/// signing and broadcast on its behalf.
#[async_trait]
pub trait CustodyClient: Send + Sync {
    /// Check custody API connectivity
    async fn health_check(&self) -> Result<(), AppError>;

    /// Fetch the faucet wallet identity for a chain family
    async fn get_wallet(&self, family: ChainFamily) -> Result<WalletInfo, AppError>;

    /// Bulk balance lookup for one wallet family across the given custody
    /// network aliases and asset symbols, in a single call.
    async fn fetch_balances(
        &self,
        family: ChainFamily,
        chains: &[String],
        assets: &[String],
    ) -> Result<Vec<BalanceEntry>, AppError>;

    /// Submit an EVM transaction (native value or contract call) on the given
    /// CAIP-2 network. `sponsor` asks the custody service to cover gas.
    async fn send_evm_transaction(
        &self,
        caip2: &str,
        transaction: &EvmTransactionRequest,
        sponsor: bool,
    ) -> Result<CustodySubmission, AppError>;

    /// Hand a serialized, unsigned Solana transaction (base64) to the custody
    /// service, which injects a real recent blockhash, signs, and broadcasts.
    async fn sign_and_send_solana(
        &self,
        caip2: &str,
        transaction_base64: &str,
        sponsor: bool,
    ) -> Result<CustodySubmission, AppError>;

    /// Point-in-time read of a custody transaction record by id
    async fn get_transaction(&self, transaction_id: &str) -> Result<TransactionRecord, AppError>;
}

/// Raw JSON-RPC access for chains the custody service cannot query, plus
/// Solana account existence checks for associated-token-account bookkeeping.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// Native balance via `eth_getBalance`, returned as a decimal integer string
    async fn native_balance(&self, rpc_url: &str, address: &str) -> Result<String, AppError>;

    /// ERC-20 balance via `eth_call` to `balanceOf(address)`, returned as a
    /// decimal integer string
    async fn erc20_balance(
        &self,
        rpc_url: &str,
        contract: &str,
        address: &str,
    ) -> Result<String, AppError>;

    /// Whether a Solana account exists (via `getAccountInfo`)
    async fn account_exists(&self, rpc_url: &str, account: &str) -> Result<bool, AppError>;
}

/// Durable withdrawal mirror. Writes are best-effort from the caller's point
/// of view; the service logs and continues when they fail.
#[async_trait]
pub trait WithdrawalStore: Send + Sync {
    /// Check store connectivity
    async fn health_check(&self) -> Result<(), AppError>;

    /// Record a newly dispatched withdrawal
    async fn record_withdrawal(&self, withdrawal: &NewWithdrawal) -> Result<(), AppError>;

    /// Mirror the latest observed status for a transaction id
    async fn update_status(
        &self,
        transaction_id: &str,
        status: TransactionStatus,
    ) -> Result<(), AppError>;
}
