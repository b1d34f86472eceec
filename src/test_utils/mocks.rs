//! In-memory mocks for the domain traits.
//!
//! All state lives behind locks and atomics so a mock can be shared through
//! an `Arc` and inspected after the code under test has run.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;

use crate::domain::error::{AppError, CustodyError, DatabaseError, RpcError};
use crate::domain::traits::{ChainRpc, CustodyClient, WithdrawalStore};
use crate::domain::types::{
    BalanceEntry, ChainFamily, CustodySubmission, EvmTransactionRequest, NewWithdrawal,
    TransactionRecord, TransactionStatus, WalletInfo,
};

/// Valid faucet wallet addresses used by default
pub const MOCK_EVM_ADDRESS: &str = "0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0";
pub const MOCK_SOLANA_ADDRESS: &str = "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T";

/// One submission captured by [`MockCustodyClient`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedSubmission {
    Evm {
        caip2: String,
        transaction: EvmTransactionRequest,
        sponsor: bool,
    },
    Solana {
        caip2: String,
        transaction_base64: String,
        sponsor: bool,
    },
}

/// Custody client mock with scripted balances and status sequences
pub struct MockCustodyClient {
    balances: Mutex<Vec<BalanceEntry>>,
    submissions: Mutex<Vec<RecordedSubmission>>,
    /// Per-transaction status scripts; the last record repeats once drained
    transactions: Mutex<HashMap<String, VecDeque<TransactionRecord>>>,
    next_id: AtomicU64,
    healthy: AtomicBool,
    fail_transfers: AtomicBool,
}

impl Default for MockCustodyClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCustodyClient {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(Vec::new()),
            submissions: Mutex::new(Vec::new()),
            transactions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            healthy: AtomicBool::new(true),
            fail_transfers: AtomicBool::new(false),
        }
    }

    pub fn with_balance(self, chain: &str, asset: &str, raw_value: &str, decimals: u8) -> Self {
        self.balances.lock().unwrap().push(BalanceEntry {
            chain: chain.to_string(),
            asset: asset.to_string(),
            raw_value: raw_value.to_string(),
            raw_value_decimals: decimals,
            display_values: HashMap::new(),
        });
        self
    }

    /// Script the sequence of records `get_transaction` returns for an id
    pub fn script_transaction(&self, records: Vec<TransactionRecord>) {
        if let Some(first) = records.first() {
            self.transactions
                .lock()
                .unwrap()
                .insert(first.id.clone(), records.into_iter().collect());
        }
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn fail_transfers(&self) {
        self.fail_transfers.store(true, Ordering::SeqCst);
    }

    pub fn submissions(&self) -> Vec<RecordedSubmission> {
        self.submissions.lock().unwrap().clone()
    }

    fn ensure_healthy(&self) -> Result<(), AppError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CustodyError::Connection("mock custody down".to_string()).into())
        }
    }

    fn next_submission(&self) -> CustodySubmission {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        CustodySubmission {
            transaction_id: format!("tx_mock_{}", n),
            hash: Some(format!("0xhash{}", n)),
        }
    }
}

#[async_trait]
impl CustodyClient for MockCustodyClient {
    async fn health_check(&self) -> Result<(), AppError> {
        self.ensure_healthy()
    }

    async fn get_wallet(&self, family: ChainFamily) -> Result<WalletInfo, AppError> {
        self.ensure_healthy()?;
        let (id, address) = match family {
            ChainFamily::Ethereum => ("wallet_evm", MOCK_EVM_ADDRESS),
            ChainFamily::Solana => ("wallet_solana", MOCK_SOLANA_ADDRESS),
        };
        Ok(WalletInfo {
            id: id.to_string(),
            address: address.to_string(),
        })
    }

    async fn fetch_balances(
        &self,
        _family: ChainFamily,
        chains: &[String],
        assets: &[String],
    ) -> Result<Vec<BalanceEntry>, AppError> {
        self.ensure_healthy()?;
        Ok(self
            .balances
            .lock()
            .unwrap()
            .iter()
            .filter(|e| chains.contains(&e.chain) && assets.contains(&e.asset))
            .cloned()
            .collect())
    }

    async fn send_evm_transaction(
        &self,
        caip2: &str,
        transaction: &EvmTransactionRequest,
        sponsor: bool,
    ) -> Result<CustodySubmission, AppError> {
        self.ensure_healthy()?;
        if self.fail_transfers.load(Ordering::SeqCst) {
            return Err(CustodyError::Api {
                status: 500,
                message: "mock transfer failure".to_string(),
            }
            .into());
        }
        self.submissions
            .lock()
            .unwrap()
            .push(RecordedSubmission::Evm {
                caip2: caip2.to_string(),
                transaction: transaction.clone(),
                sponsor,
            });
        Ok(self.next_submission())
    }

    async fn sign_and_send_solana(
        &self,
        caip2: &str,
        transaction_base64: &str,
        sponsor: bool,
    ) -> Result<CustodySubmission, AppError> {
        self.ensure_healthy()?;
        if self.fail_transfers.load(Ordering::SeqCst) {
            return Err(CustodyError::Api {
                status: 500,
                message: "mock transfer failure".to_string(),
            }
            .into());
        }
        self.submissions
            .lock()
            .unwrap()
            .push(RecordedSubmission::Solana {
                caip2: caip2.to_string(),
                transaction_base64: transaction_base64.to_string(),
                sponsor,
            });
        Ok(self.next_submission())
    }

    async fn get_transaction(&self, transaction_id: &str) -> Result<TransactionRecord, AppError> {
        self.ensure_healthy()?;
        let mut transactions = self.transactions.lock().unwrap();
        let Some(sequence) = transactions.get_mut(transaction_id) else {
            return Err(CustodyError::Api {
                status: 404,
                message: format!("unknown transaction {}", transaction_id),
            }
            .into());
        };
        let record = if sequence.len() > 1 {
            sequence.pop_front().unwrap()
        } else {
            sequence.front().cloned().unwrap()
        };
        Ok(record)
    }
}

/// Chain RPC mock keyed by endpoint URL
#[derive(Default)]
pub struct MockChainRpc {
    native_balances: Mutex<HashMap<String, String>>,
    erc20_balances: Mutex<HashMap<(String, String), String>>,
    existing_accounts: Mutex<HashSet<String>>,
    failing_urls: Mutex<HashSet<String>>,
}

impl MockChainRpc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_native_balance(&self, rpc_url: &str, raw: &str) {
        self.native_balances
            .lock()
            .unwrap()
            .insert(rpc_url.to_string(), raw.to_string());
    }

    pub fn set_erc20_balance(&self, rpc_url: &str, contract: &str, raw: &str) {
        self.erc20_balances
            .lock()
            .unwrap()
            .insert((rpc_url.to_string(), contract.to_string()), raw.to_string());
    }

    pub fn add_existing_account(&self, account: &str) {
        self.existing_accounts
            .lock()
            .unwrap()
            .insert(account.to_string());
    }

    pub fn fail_url(&self, rpc_url: &str) {
        self.failing_urls
            .lock()
            .unwrap()
            .insert(rpc_url.to_string());
    }

    fn ensure_reachable(&self, rpc_url: &str) -> Result<(), AppError> {
        if self.failing_urls.lock().unwrap().contains(rpc_url) {
            return Err(RpcError::Connection(format!("mock endpoint {} down", rpc_url)).into());
        }
        Ok(())
    }
}

#[async_trait]
impl ChainRpc for MockChainRpc {
    async fn native_balance(&self, rpc_url: &str, _address: &str) -> Result<String, AppError> {
        self.ensure_reachable(rpc_url)?;
        Ok(self
            .native_balances
            .lock()
            .unwrap()
            .get(rpc_url)
            .cloned()
            .unwrap_or_else(|| "0".to_string()))
    }

    async fn erc20_balance(
        &self,
        rpc_url: &str,
        contract: &str,
        _address: &str,
    ) -> Result<String, AppError> {
        self.ensure_reachable(rpc_url)?;
        Ok(self
            .erc20_balances
            .lock()
            .unwrap()
            .get(&(rpc_url.to_string(), contract.to_string()))
            .cloned()
            .unwrap_or_else(|| "0".to_string()))
    }

    async fn account_exists(&self, rpc_url: &str, account: &str) -> Result<bool, AppError> {
        self.ensure_reachable(rpc_url)?;
        Ok(self.existing_accounts.lock().unwrap().contains(account))
    }
}

/// Withdrawal store mock capturing rows and status updates
#[derive(Default)]
pub struct MockWithdrawalStore {
    rows: Mutex<Vec<NewWithdrawal>>,
    status_updates: Mutex<Vec<(String, TransactionStatus)>>,
    fail_writes: AtomicBool,
    unhealthy: AtomicBool,
}

impl MockWithdrawalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self) {
        self.fail_writes.store(true, Ordering::SeqCst);
    }

    pub fn set_unhealthy(&self) {
        self.unhealthy.store(true, Ordering::SeqCst);
    }

    pub fn rows(&self) -> Vec<NewWithdrawal> {
        self.rows.lock().unwrap().clone()
    }

    pub fn status_updates(&self) -> Vec<(String, TransactionStatus)> {
        self.status_updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl WithdrawalStore for MockWithdrawalStore {
    async fn health_check(&self) -> Result<(), AppError> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(DatabaseError::Connection("mock store down".to_string()).into());
        }
        Ok(())
    }

    async fn record_withdrawal(&self, withdrawal: &NewWithdrawal) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DatabaseError::Query("mock write failure".to_string()).into());
        }
        self.rows.lock().unwrap().push(withdrawal.clone());
        Ok(())
    }

    async fn update_status(
        &self,
        transaction_id: &str,
        status: TransactionStatus,
    ) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DatabaseError::Query("mock write failure".to_string()).into());
        }
        self.status_updates
            .lock()
            .unwrap()
            .push((transaction_id.to_string(), status));
        Ok(())
    }
}
