//! HTTP JSON-RPC transport for chains outside custody coverage.
//!
//! One client serves every endpoint; the URL is passed per call because the
//! registry, not the client, decides which network a query targets.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::error::{AppError, RpcError};
use crate::domain::traits::ChainRpc;
use crate::domain::units::hex_to_decimal;
use crate::infra::blockchain::evm;

/// Configuration for the JSON-RPC HTTP client
#[derive(Debug, Clone)]
pub struct RpcClientConfig {
    pub timeout: Duration,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
        }
    }
}

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcErrorEnvelope>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorEnvelope {
    code: i64,
    message: String,
}

/// `getAccountInfo` result; `value` is null for non-existent accounts
#[derive(Debug, Deserialize)]
struct AccountInfoResult {
    value: Option<serde_json::Value>,
}

/// Reqwest-backed JSON-RPC client
pub struct HttpRpcClient {
    http: reqwest::Client,
}

impl HttpRpcClient {
    pub fn new(config: RpcClientConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RpcError::Connection(e.to_string()))?;
        Ok(Self { http })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        rpc_url: &str,
        method: &str,
        params: serde_json::Value,
    ) -> Result<T, RpcError> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method,
            params,
        };

        let response = self
            .http
            .post(rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Connection(format!(
                "{} returned HTTP {}",
                rpc_url, status
            )));
        }

        let envelope: JsonRpcResponse<T> = response
            .json()
            .await
            .map_err(|e| RpcError::Decode(e.to_string()))?;

        if let Some(error) = envelope.error {
            return Err(RpcError::Envelope {
                code: error.code,
                message: error.message,
            });
        }

        envelope
            .result
            .ok_or_else(|| RpcError::Decode(format!("{} response missing result", method)))
    }
}

fn map_transport_error(e: reqwest::Error) -> RpcError {
    if e.is_timeout() {
        RpcError::Timeout(e.to_string())
    } else {
        RpcError::Connection(e.to_string())
    }
}

#[async_trait]
impl ChainRpc for HttpRpcClient {
    #[instrument(skip(self))]
    async fn native_balance(&self, rpc_url: &str, address: &str) -> Result<String, AppError> {
        let hex: String = self
            .call(
                rpc_url,
                "eth_getBalance",
                serde_json::json!([address, "latest"]),
            )
            .await?;
        Ok(hex_to_decimal(&hex)?)
    }

    #[instrument(skip(self))]
    async fn erc20_balance(
        &self,
        rpc_url: &str,
        contract: &str,
        address: &str,
    ) -> Result<String, AppError> {
        let data = evm::erc20_balance_of_calldata(address)?;
        let hex: String = self
            .call(
                rpc_url,
                "eth_call",
                serde_json::json!([{ "to": contract, "data": data }, "latest"]),
            )
            .await?;
        Ok(hex_to_decimal(&hex)?)
    }

    #[instrument(skip(self))]
    async fn account_exists(&self, rpc_url: &str, account: &str) -> Result<bool, AppError> {
        let info: AccountInfoResult = self
            .call(
                rpc_url,
                "getAccountInfo",
                serde_json::json!([account, { "encoding": "base64" }]),
            )
            .await?;
        Ok(info.value.is_some())
    }
}
