//! Faucet orchestration: balance aggregation, transfer dispatch, and
//! transaction status tracking.
//!
//! All chain and custody access goes through the domain traits so every path
//! here is testable against mocks. The custody service is the source of truth
//! for transaction state; the withdrawal store is a best-effort mirror whose
//! failures never fail a user request.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};
use validator::Validate;

use crate::domain::error::{AppError, ValidationError};
use crate::domain::traits::{ChainRpc, CustodyClient, WithdrawalStore};
use crate::domain::types::{
    BalanceData, BalanceEntry, ChainFamily, CustodySubmission, EvmTransactionRequest,
    FamilyBalances, HealthResponse, HealthStatus, NetworkMode, NewWithdrawal, TokenKind,
    TransactionRecord, TransactionStatus, TransactionStatusResponse, TransferIntent,
    TransferResult,
};
use crate::domain::units::{format_units, parse_units, to_hex_quantity};
use crate::infra::blockchain::{evm, solana};
use crate::registry::{self, ChainDescriptor, NetworkConfig};

/// Polling bounds for [`FaucetService::poll_until_final`]
#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            max_attempts: 60,
            interval: Duration::from_secs(2),
        }
    }
}

/// Core faucet service
pub struct FaucetService {
    custody: Arc<dyn CustodyClient>,
    rpc: Arc<dyn ChainRpc>,
    store: Arc<dyn WithdrawalStore>,
}

impl FaucetService {
    pub fn new(
        custody: Arc<dyn CustodyClient>,
        rpc: Arc<dyn ChainRpc>,
        store: Arc<dyn WithdrawalStore>,
    ) -> Self {
        Self { custody, rpc, store }
    }

    /// Aggregate faucet balances across both wallet families and every
    /// registered network in both modes.
    ///
    /// Custody failures propagate; without them there is nothing meaningful
    /// to show. Raw-RPC failures degrade: the affected chain is dropped from
    /// the response and logged, everything else is returned.
    #[instrument(skip(self))]
    pub async fn fetch_balances(&self) -> Result<BalanceData, AppError> {
        let mut evm_chains: Vec<String> = Vec::new();
        let mut solana_chains: Vec<String> = Vec::new();
        for mode in [NetworkMode::Testnet, NetworkMode::Mainnet] {
            let aliases = registry::custody_aliases_by_family(mode);
            evm_chains.extend(aliases.evm.iter().map(|a| a.to_string()));
            solana_chains.extend(aliases.solana.iter().map(|a| a.to_string()));
        }
        let evm_assets = registry::custody_assets_by_family(ChainFamily::Ethereum);
        let solana_assets = registry::custody_assets_by_family(ChainFamily::Solana);

        let (evm_wallet, solana_wallet) = tokio::try_join!(
            self.custody.get_wallet(ChainFamily::Ethereum),
            self.custody.get_wallet(ChainFamily::Solana),
        )?;
        let (mut evm_balances, solana_balances) = tokio::try_join!(
            self.custody
                .fetch_balances(ChainFamily::Ethereum, &evm_chains, &evm_assets),
            self.custody
                .fetch_balances(ChainFamily::Solana, &solana_chains, &solana_assets),
        )?;

        evm_balances.extend(self.rpc_balances(&evm_wallet.address).await);

        Ok(BalanceData {
            evm: FamilyBalances {
                wallet: evm_wallet,
                balances: evm_balances,
            },
            solana: FamilyBalances {
                wallet: solana_wallet,
                balances: solana_balances,
            },
        })
    }

    /// Balances for chains outside custody coverage, queried over raw RPC.
    /// Per-chain failures are logged and dropped.
    async fn rpc_balances(&self, wallet_address: &str) -> Vec<BalanceEntry> {
        let chains: Vec<registry::RpcChain> = [NetworkMode::Testnet, NetworkMode::Mainnet]
            .into_iter()
            .flat_map(registry::rpc_only_chains)
            .collect();

        let lookups = chains.iter().map(|chain| async move {
            let mut entries = Vec::with_capacity(2);
            match self.rpc.native_balance(&chain.rpc_url, wallet_address).await {
                Ok(raw) => entries.push(balance_entry(
                    &chain.balance_key,
                    &chain.symbol,
                    &raw,
                    chain.decimals,
                )),
                Err(e) => {
                    warn!(chain = %chain.balance_key, error = %e, "Skipping RPC native balance")
                }
            }
            if let Some(contract) = &chain.stablecoin_address {
                match self
                    .rpc
                    .erc20_balance(&chain.rpc_url, contract, wallet_address)
                    .await
                {
                    Ok(raw) => entries.push(balance_entry(
                        &chain.balance_key,
                        "usdc",
                        &raw,
                        chain.stablecoin_decimals,
                    )),
                    Err(e) => {
                        warn!(chain = %chain.balance_key, error = %e, "Skipping RPC token balance")
                    }
                }
            }
            entries
        });

        futures::future::join_all(lookups)
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    /// Validate and dispatch a transfer through the custody service.
    ///
    /// Validation order is fixed: chain, network mode, token support, address
    /// format, amount, then balance. The first failure is returned; no
    /// outbound call happens before the local checks pass.
    #[instrument(skip(self, intent), fields(chain = %intent.chain, token = %intent.token))]
    pub async fn submit_transfer(
        &self,
        intent: &TransferIntent,
        user_id: Option<String>,
    ) -> Result<TransferResult, AppError> {
        intent
            .validate()
            .map_err(|e| ValidationError::Multiple(validation_message(&e)))?;

        let descriptor = registry::chain(&intent.chain)
            .ok_or_else(|| ValidationError::InvalidChain(intent.chain.clone()))?;
        let network = descriptor.network(intent.network_mode).ok_or_else(|| {
            ValidationError::InvalidNetworkMode {
                chain: intent.chain.clone(),
                mode: intent.network_mode.to_string(),
            }
        })?;
        if intent.token == TokenKind::Usdc
            && registry::stablecoin_address(&intent.chain, intent.network_mode).is_none()
        {
            return Err(ValidationError::UnsupportedToken {
                token: intent.token.to_string(),
                chain: intent.chain.clone(),
                mode: intent.network_mode.to_string(),
            }
            .into());
        }

        let address_ok = match descriptor.family {
            ChainFamily::Ethereum => evm::is_valid_address(&intent.wallet_address),
            ChainFamily::Solana => solana::is_valid_address(&intent.wallet_address),
        };
        if !address_ok {
            return Err(ValidationError::InvalidAddress(intent.wallet_address.clone()).into());
        }

        let decimals = match intent.token {
            TokenKind::Native => descriptor.native.decimals,
            TokenKind::Usdc => descriptor.stablecoin.map_or(6, |s| s.decimals),
        };
        let requested = format_decimal(intent.amount);
        let requested_raw = parse_units(&requested, decimals)?;
        if requested_raw == 0 {
            return Err(ValidationError::InvalidAmount(requested).into());
        }

        let available_raw = self
            .available_balance(descriptor, network, intent.network_mode, intent.token)
            .await?;
        if available_raw < requested_raw {
            return Err(ValidationError::InsufficientBalance {
                available: format_units(&available_raw.to_string(), decimals)?,
                requested,
            }
            .into());
        }

        let submission = match descriptor.family {
            ChainFamily::Ethereum => {
                self.dispatch_evm(network, intent, requested_raw).await?
            }
            ChainFamily::Solana => self.dispatch_solana(descriptor, network, intent).await?,
        };

        info!(
            transaction_id = %submission.transaction_id,
            chain = %intent.chain,
            "Transfer dispatched"
        );

        let withdrawal = NewWithdrawal {
            transaction_id: submission.transaction_id.clone(),
            user_id,
            chain_key: intent.chain.clone(),
            network_mode: intent.network_mode,
            token: intent.token,
            recipient: intent.wallet_address.clone(),
            amount: intent.amount,
            status: TransactionStatus::Pending,
        };
        if let Err(e) = self.store.record_withdrawal(&withdrawal).await {
            warn!(error = %e, "Failed to record withdrawal");
        }

        let explorer_url = submission
            .hash
            .as_deref()
            .and_then(|h| registry::explorer_url(&intent.chain, intent.network_mode, h));
        Ok(TransferResult {
            success: true,
            transaction_id: submission.transaction_id,
            chain: intent.chain.clone(),
            hash: submission.hash,
            explorer_url,
            amount: intent.amount,
            to: intent.wallet_address.clone(),
        })
    }

    /// Faucet balance for one chain/mode/token, in smallest units
    async fn available_balance(
        &self,
        descriptor: &ChainDescriptor,
        network: &NetworkConfig,
        mode: NetworkMode,
        token: TokenKind,
    ) -> Result<u128, AppError> {
        let raw = match network.endpoint.custody_alias() {
            Some(alias) => {
                let asset = match token {
                    TokenKind::Usdc => "usdc".to_string(),
                    TokenKind::Native => descriptor.native.symbol.to_lowercase(),
                };
                let entries = self
                    .custody
                    .fetch_balances(
                        descriptor.family,
                        &[alias.to_string()],
                        std::slice::from_ref(&asset),
                    )
                    .await?;
                entries
                    .iter()
                    .find(|e| e.chain == alias && e.asset == asset)
                    .map_or_else(|| "0".to_string(), |e| e.raw_value.clone())
            }
            None => {
                let url = network.endpoint.rpc_url().ok_or_else(|| {
                    AppError::Internal(format!("{} has no reachable endpoint", descriptor.key))
                })?;
                let wallet = self.custody.get_wallet(descriptor.family).await?;
                match token {
                    TokenKind::Native => self.rpc.native_balance(url, &wallet.address).await?,
                    TokenKind::Usdc => {
                        let contract = registry::stablecoin_address(descriptor.key, mode)
                            .ok_or_else(|| {
                                AppError::Internal(format!(
                                    "{} stablecoin vanished",
                                    descriptor.key
                                ))
                            })?;
                        self.rpc.erc20_balance(url, contract, &wallet.address).await?
                    }
                }
            }
        };
        raw.parse()
            .map_err(|_| AppError::Internal(format!("Unparseable balance: {}", raw)))
    }

    async fn dispatch_evm(
        &self,
        network: &NetworkConfig,
        intent: &TransferIntent,
        raw_amount: u128,
    ) -> Result<CustodySubmission, AppError> {
        let transaction = match intent.token {
            TokenKind::Native => EvmTransactionRequest {
                to: intent.wallet_address.clone(),
                value: to_hex_quantity(raw_amount),
                data: None,
            },
            TokenKind::Usdc => {
                let contract = registry::stablecoin_address(
                    &intent.chain,
                    intent.network_mode,
                )
                .ok_or_else(|| {
                    AppError::Internal(format!("{} stablecoin vanished", intent.chain))
                })?;
                EvmTransactionRequest {
                    to: contract.to_string(),
                    value: "0x0".to_string(),
                    data: Some(evm::erc20_transfer_calldata(
                        &intent.wallet_address,
                        raw_amount,
                    )?),
                }
            }
        };
        self.custody
            .send_evm_transaction(network.caip2, &transaction, network.gas_sponsorship)
            .await
    }

    async fn dispatch_solana(
        &self,
        descriptor: &ChainDescriptor,
        network: &NetworkConfig,
        intent: &TransferIntent,
    ) -> Result<CustodySubmission, AppError> {
        let wallet = self.custody.get_wallet(ChainFamily::Solana).await?;
        let from = solana::parse_pubkey(&wallet.address)?;
        let to = solana::parse_pubkey(&intent.wallet_address)?;

        let encoded = match intent.token {
            TokenKind::Native => solana::build_native_transfer(
                &from,
                &to,
                solana::sol_to_lamports(intent.amount),
            )?,
            TokenKind::Usdc => {
                let mint_address =
                    registry::stablecoin_address(descriptor.key, intent.network_mode)
                        .ok_or_else(|| {
                            AppError::Internal(format!("{} stablecoin vanished", descriptor.key))
                        })?;
                let mint = solana::parse_pubkey(mint_address)?;
                let decimals = descriptor.stablecoin.map_or(6, |s| s.decimals);
                let destination_ata = solana::derive_associated_token_account(&to, &mint);

                // Unknown existence defaults to creating; the instruction is
                // idempotent so a spurious create cannot fail the transfer.
                let create_recipient_ata = match network.endpoint.rpc_url() {
                    Some(url) => match self.rpc.account_exists(url, &destination_ata.to_string()).await
                    {
                        Ok(exists) => !exists,
                        Err(e) => {
                            warn!(error = %e, "ATA existence check failed, creating idempotently");
                            true
                        }
                    },
                    None => true,
                };

                solana::build_token_transfer(
                    &from,
                    &to,
                    &mint,
                    solana::to_token_amount(intent.amount, decimals),
                    decimals,
                    create_recipient_ata,
                )?
            }
        };

        self.custody
            .sign_and_send_solana(network.caip2, &encoded, network.gas_sponsorship)
            .await
    }

    /// Point-in-time transaction status, mirrored best-effort into the store
    #[instrument(skip(self))]
    pub async fn transaction_status(
        &self,
        transaction_id: &str,
    ) -> Result<TransactionStatusResponse, AppError> {
        let record = self.custody.get_transaction(transaction_id).await?;

        if let Err(e) = self.store.update_status(&record.id, record.status).await {
            warn!(transaction_id = %record.id, error = %e, "Failed to mirror status");
        }

        let explorer_url = record
            .transaction_hash
            .as_deref()
            .and_then(|h| registry::explorer_url_by_caip2(&record.caip2, h));
        Ok(TransactionStatusResponse {
            id: record.id,
            status: record.status,
            hash: record.transaction_hash,
            explorer_url,
            is_final: record.status.is_final(),
            caip2: record.caip2,
            created_at: record.created_at,
        })
    }

    /// Poll the custody record until it reaches a final status or the attempt
    /// budget runs out. The last observed record is returned either way;
    /// callers decide what a still-pending record means. One fetch always
    /// runs, even with `max_attempts` of zero.
    #[instrument(skip(self, options))]
    pub async fn poll_until_final(
        &self,
        transaction_id: &str,
        options: PollOptions,
    ) -> Result<TransactionRecord, AppError> {
        let mut record = self.custody.get_transaction(transaction_id).await?;
        for _ in 1..options.max_attempts {
            if record.status.is_final() {
                break;
            }
            tokio::time::sleep(options.interval).await;
            record = self.custody.get_transaction(transaction_id).await?;
        }
        Ok(record)
    }

    /// Probe the store and the custody service concurrently
    pub async fn health_check(&self) -> HealthResponse {
        let (database, custody) =
            tokio::join!(self.store.health_check(), self.custody.health_check());
        HealthResponse::new(probe_status(database), probe_status(custody))
    }
}

fn probe_status(result: Result<(), AppError>) -> HealthStatus {
    match result {
        Ok(()) => HealthStatus::Healthy,
        Err(e) => {
            warn!(error = %e, "Health probe failed");
            HealthStatus::Unhealthy
        }
    }
}

fn balance_entry(chain: &str, asset: &str, raw: &str, decimals: u8) -> BalanceEntry {
    let display = format_units(raw, decimals).unwrap_or_else(|_| "0".to_string());
    BalanceEntry {
        chain: chain.to_string(),
        asset: asset.to_string(),
        raw_value: raw.to_string(),
        raw_value_decimals: decimals,
        display_values: std::iter::once((asset.to_string(), display)).collect(),
    }
}

/// Render an f64 amount as a plain decimal string. `Display` prints the
/// shortest digits that round-trip and never uses exponent form, so the
/// rendered value is the amount the caller sent, not a rounded neighbor.
fn format_decimal(amount: f64) -> String {
    amount.to_string()
}

fn validation_message(errors: &validator::ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .filter_map(|e| e.message.as_ref().map(std::string::ToString::to_string))
        .collect();
    messages.sort();
    if messages.is_empty() {
        "Invalid request".to_string()
    } else {
        messages.join(", ")
    }
}
