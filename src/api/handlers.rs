//! HTTP request handlers with OpenAPI documentation.

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;
use utoipa::OpenApi;

use crate::app::AppState;
use crate::domain::{
    AppError, BalanceData, CustodyError, DatabaseError, ErrorDetail, ErrorResponse, HealthResponse,
    HealthStatus, RpcError, TransactionStatusResponse, TransferIntent, TransferResult,
};
use crate::infra::auth::VerifiedIdentity;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Multi-Chain Faucet API",
        version = "0.1.0",
        description = "Custodial token faucet for EVM chains and Solana",
        license(name = "MIT")
    ),
    paths(
        get_balances_handler,
        submit_transfer_handler,
        get_transaction_status_handler,
        health_check_handler,
        liveness_handler,
        readiness_handler,
    ),
    components(
        schemas(
            BalanceData,
            crate::domain::FamilyBalances,
            crate::domain::BalanceEntry,
            crate::domain::WalletInfo,
            TransferIntent,
            TransferResult,
            TransactionStatusResponse,
            crate::domain::TransactionStatus,
            crate::domain::NetworkMode,
            crate::domain::TokenKind,
            HealthResponse,
            HealthStatus,
            ErrorResponse,
            ErrorDetail,
        )
    ),
    tags(
        (name = "faucet", description = "Balance, transfer, and status endpoints"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Faucet balances across all registered chains
///
/// Returns the custody wallet identity and balances for both wallet families.
/// Chains outside custody coverage are queried over raw RPC; a chain whose
/// RPC endpoint is down is omitted from the response rather than failing it.
#[utoipa::path(
    get,
    path = "/api/faucet/balance",
    tag = "faucet",
    responses(
        (status = 200, description = "Aggregated faucet balances", body = BalanceData),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 502, description = "Custody service unavailable", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_balances_handler(
    State(state): State<AppState>,
) -> Result<Json<BalanceData>, AppError> {
    let balances = state.service.fetch_balances().await?;
    Ok(Json(balances))
}

/// Dispatch a token transfer
///
/// Validates the request against the chain registry, checks the faucet's own
/// balance, and submits the transfer through the custody service.
///
/// **Response indicates dispatch, not confirmation.** Poll
/// `GET /api/faucet/transaction/{id}` until `isFinal` is true.
#[utoipa::path(
    post,
    path = "/api/faucet/transfer",
    tag = "faucet",
    request_body = TransferIntent,
    responses(
        (status = 200, description = "Transfer dispatched", body = TransferResult),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 502, description = "Custody service unavailable", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn submit_transfer_handler(
    State(state): State<AppState>,
    identity: Option<Extension<VerifiedIdentity>>,
    Json(payload): Json<TransferIntent>,
) -> Result<Json<TransferResult>, AppError> {
    let user_id = identity.map(|Extension(i)| i.user_id);
    let result = state.service.submit_transfer(&payload, user_id).await?;
    Ok(Json(result))
}

/// Transaction status by custody transaction id
#[utoipa::path(
    get,
    path = "/api/faucet/transaction/{id}",
    tag = "faucet",
    params(
        ("id" = String, Path, description = "Custody transaction id")
    ),
    responses(
        (status = 200, description = "Current transaction status", body = TransactionStatusResponse),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorResponse),
        (status = 404, description = "Unknown transaction id", body = ErrorResponse)
    ),
    security(("bearer" = []))
)]
pub async fn get_transaction_status_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TransactionStatusResponse>, AppError> {
    let status = state.service.transaction_status(&id).await?;
    Ok(Json(status))
}

/// Detailed health check
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Health status", body = HealthResponse),
        (status = 503, description = "Critical dependency unavailable", body = HealthResponse)
    )
)]
pub async fn health_check_handler(State(state): State<AppState>) -> impl IntoResponse {
    let health = state.service.health_check().await;
    let status = match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(health))
}

/// Kubernetes liveness probe
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "health",
    responses(
        (status = 200, description = "Application is alive")
    )
)]
pub async fn liveness_handler() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    responses(
        (status = 200, description = "Application is ready to serve traffic"),
        (status = 503, description = "Application is not ready")
    )
)]
pub async fn readiness_handler(State(state): State<AppState>) -> StatusCode {
    let health = state.service.health_check().await;
    match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_type) = match &self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, "authentication_error"),
            AppError::Custody(custody_err) => match custody_err {
                CustodyError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "custody_timeout"),
                CustodyError::MissingWallet(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "custody_error")
                }
                _ => (StatusCode::BAD_GATEWAY, "custody_error"),
            },
            AppError::Rpc(rpc_err) => match rpc_err {
                RpcError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "rpc_timeout"),
                _ => (StatusCode::BAD_GATEWAY, "rpc_error"),
            },
            AppError::Database(db_err) => match db_err {
                DatabaseError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                DatabaseError::Connection(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "database_error")
                }
                _ => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            },
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "configuration_error"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            AppError::NotSupported(_) => (StatusCode::NOT_IMPLEMENTED, "not_supported"),
        };

        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                r#type: error_type.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}
