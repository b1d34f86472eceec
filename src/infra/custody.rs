//! HTTP client for the custody service.
//!
//! The custody service owns the faucet's keys. This client never sees key
//! material; it submits transaction payloads and reads back custody-owned
//! transaction records. Authentication is HTTP basic with the application id
//! and secret, plus an application id header.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, instrument};

use crate::domain::error::{AppError, CustodyError};
use crate::domain::traits::CustodyClient;
use crate::domain::types::{
    BalanceEntry, ChainFamily, CustodySubmission, EvmTransactionRequest, TransactionRecord,
    WalletInfo,
};

/// Configuration for the custody HTTP client
#[derive(Debug, Clone)]
pub struct CustodyConfig {
    pub base_url: String,
    pub app_id: String,
    pub app_secret: SecretString,
    /// Wallet id holding the EVM faucet funds
    pub evm_wallet_id: String,
    /// Wallet id holding the Solana faucet funds
    pub solana_wallet_id: String,
    pub timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct BalancesEnvelope {
    balances: Vec<BalanceEntry>,
}

#[derive(Debug, Serialize)]
struct RpcSubmission<'a> {
    method: &'static str,
    caip2: &'a str,
    sponsor: bool,
    params: serde_json::Value,
}

/// Reqwest-backed custody client
pub struct HttpCustodyClient {
    config: CustodyConfig,
    http: Client,
}

impl HttpCustodyClient {
    pub fn new(config: CustodyConfig) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CustodyError::Connection(e.to_string()))?;
        Ok(Self { config, http })
    }

    fn wallet_id(&self, family: ChainFamily) -> Result<&str, CustodyError> {
        let id = match family {
            ChainFamily::Ethereum => &self.config.evm_wallet_id,
            ChainFamily::Solana => &self.config.solana_wallet_id,
        };
        if id.is_empty() {
            return Err(CustodyError::MissingWallet(family.to_string()));
        }
        Ok(id)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.config.base_url, path))
            .basic_auth(
                &self.config.app_id,
                Some(self.config.app_secret.expose_secret()),
            )
            .header("x-app-id", &self.config.app_id)
    }

    async fn read_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CustodyError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CustodyError::Api {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| CustodyError::Decode(e.to_string()))
    }

    async fn submit_rpc(
        &self,
        wallet_id: &str,
        submission: &RpcSubmission<'_>,
    ) -> Result<CustodySubmission, CustodyError> {
        let response = self
            .request(
                reqwest::Method::POST,
                &format!("/v1/wallets/{}/rpc", wallet_id),
            )
            .json(submission)
            .send()
            .await
            .map_err(map_transport_error)?;
        Self::read_response(response).await
    }
}

fn map_transport_error(e: reqwest::Error) -> CustodyError {
    if e.is_timeout() {
        CustodyError::Timeout(e.to_string())
    } else {
        CustodyError::Connection(e.to_string())
    }
}

#[async_trait]
impl CustodyClient for HttpCustodyClient {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        let response = self
            .request(reqwest::Method::GET, "/v1/health")
            .send()
            .await
            .map_err(map_transport_error)?;
        if !response.status().is_success() {
            return Err(CustodyError::Api {
                status: response.status().as_u16(),
                message: "health check failed".to_string(),
            }
            .into());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_wallet(&self, family: ChainFamily) -> Result<WalletInfo, AppError> {
        let wallet_id = self.wallet_id(family)?;
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/v1/wallets/{}", wallet_id),
            )
            .send()
            .await
            .map_err(map_transport_error)?;
        Ok(Self::read_response(response).await?)
    }

    #[instrument(skip(self, chains, assets))]
    async fn fetch_balances(
        &self,
        family: ChainFamily,
        chains: &[String],
        assets: &[String],
    ) -> Result<Vec<BalanceEntry>, AppError> {
        let wallet_id = self.wallet_id(family)?;
        let query: Vec<(&str, &str)> = chains
            .iter()
            .map(|c| ("chain", c.as_str()))
            .chain(assets.iter().map(|a| ("asset", a.as_str())))
            .collect();

        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/v1/wallets/{}/balance", wallet_id),
            )
            .query(&query)
            .send()
            .await
            .map_err(map_transport_error)?;

        let envelope: BalancesEnvelope = Self::read_response(response).await?;
        debug!(family = %family, entries = envelope.balances.len(), "Fetched custody balances");
        Ok(envelope.balances)
    }

    #[instrument(skip(self, transaction))]
    async fn send_evm_transaction(
        &self,
        caip2: &str,
        transaction: &EvmTransactionRequest,
        sponsor: bool,
    ) -> Result<CustodySubmission, AppError> {
        let wallet_id = self.wallet_id(ChainFamily::Ethereum)?.to_string();
        let submission = RpcSubmission {
            method: "eth_sendTransaction",
            caip2,
            sponsor,
            params: json!({ "transaction": transaction }),
        };
        Ok(self.submit_rpc(&wallet_id, &submission).await?)
    }

    #[instrument(skip(self, transaction_base64))]
    async fn sign_and_send_solana(
        &self,
        caip2: &str,
        transaction_base64: &str,
        sponsor: bool,
    ) -> Result<CustodySubmission, AppError> {
        let wallet_id = self.wallet_id(ChainFamily::Solana)?.to_string();
        let submission = RpcSubmission {
            method: "signAndSendTransaction",
            caip2,
            sponsor,
            params: json!({
                "transaction": transaction_base64,
                "encoding": "base64",
            }),
        };
        Ok(self.submit_rpc(&wallet_id, &submission).await?)
    }

    #[instrument(skip(self))]
    async fn get_transaction(&self, transaction_id: &str) -> Result<TransactionRecord, AppError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/v1/transactions/{}", transaction_id),
            )
            .send()
            .await
            .map_err(map_transport_error)?;
        Ok(Self::read_response(response).await?)
    }
}
