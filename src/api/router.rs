//! Router assembly and bearer authentication middleware.

use axum::{
    Router,
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::handlers::{
    ApiDoc, get_balances_handler, get_transaction_status_handler, health_check_handler,
    liveness_handler, readiness_handler, submit_transfer_handler,
};
use crate::app::AppState;
use crate::domain::AppError;

/// Verify the bearer token and stash the caller identity in request
/// extensions. When no verifier is configured the request passes through
/// unauthenticated.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(verifier) = &state.verifier else {
        return Ok(next.run(request).await);
    };

    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Authentication("Missing bearer token".to_string()))?;

    let identity = verifier.verify(token).await?;
    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    let faucet = Router::new()
        .route("/balance", get(get_balances_handler))
        .route("/transfer", post(submit_transfer_handler))
        .route("/transaction/{id}", get(get_transaction_status_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    Router::new()
        .nest("/api/faucet", faucet)
        .route("/health", get(health_check_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
