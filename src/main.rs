//! Application entry point.

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::SecretString;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use multichain_faucet::api::create_router;
use multichain_faucet::app::{AppState, FaucetService};
use multichain_faucet::infra::auth::{AuthConfig, IdentityVerifier};
use multichain_faucet::infra::blockchain::{HttpRpcClient, RpcClientConfig};
use multichain_faucet::infra::custody::{CustodyConfig, HttpCustodyClient};
use multichain_faucet::infra::database::{PostgresConfig, PostgresStore};

/// Application configuration
struct Config {
    database_url: String,
    custody: CustodyConfig,
    /// Identity provider settings; absent means the API runs open
    auth: Option<AuthConfig>,
    host: String,
    port: u16,
}

impl Config {
    fn from_env() -> Result<Self> {
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL not set")?;

        let custody = CustodyConfig {
            base_url: env::var("CUSTODY_BASE_URL")
                .unwrap_or_else(|_| "https://api.privy.io".to_string()),
            app_id: env::var("CUSTODY_APP_ID").context("CUSTODY_APP_ID not set")?,
            app_secret: SecretString::from(
                env::var("CUSTODY_APP_SECRET").context("CUSTODY_APP_SECRET not set")?,
            ),
            evm_wallet_id: env::var("CUSTODY_EVM_WALLET_ID")
                .context("CUSTODY_EVM_WALLET_ID not set")?,
            solana_wallet_id: env::var("CUSTODY_SOLANA_WALLET_ID")
                .context("CUSTODY_SOLANA_WALLET_ID not set")?,
            timeout: Duration::from_secs(
                env::var("CUSTODY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
        };

        // All three auth settings must be present to enable verification
        let auth = match (
            env::var("AUTH_JWKS_URL").ok().filter(|v| !v.is_empty()),
            env::var("AUTH_ISSUER").ok().filter(|v| !v.is_empty()),
            env::var("AUTH_AUDIENCE").ok().filter(|v| !v.is_empty()),
        ) {
            (Some(jwks_url), Some(issuer), Some(audience)) => Some(AuthConfig {
                jwks_url,
                issuer,
                audience,
                cache_ttl: Duration::from_secs(
                    env::var("AUTH_JWKS_CACHE_TTL_SECS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(600),
                ),
            }),
            _ => None,
        };

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        Ok(Self {
            database_url,
            custody,
            auth,
            host,
            port,
        })
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug,sqlx=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    info!("🏗️  Multi-Chain Faucet v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;

    info!("📦 Initializing infrastructure...");

    let store_config = PostgresConfig {
        database_url: SecretString::from(config.database_url.clone()),
        ..Default::default()
    };
    let store = PostgresStore::new(&store_config).await?;
    store.run_migrations().await?;
    info!("   ✓ Database connected and migrations applied");

    let custody = HttpCustodyClient::new(config.custody)?;
    info!("   ✓ Custody client created");

    let rpc = HttpRpcClient::new(RpcClientConfig::default())?;
    info!("   ✓ Chain RPC client created");

    let verifier = match config.auth {
        Some(auth_config) => {
            let verifier = IdentityVerifier::new(auth_config)?;
            info!("   ✓ Identity verification enabled");
            Some(Arc::new(verifier))
        }
        None => {
            warn!("   ⚠ Identity verification disabled (AUTH_* not configured)");
            None
        }
    };

    let service = Arc::new(FaucetService::new(
        Arc::new(custody),
        Arc::new(rpc),
        Arc::new(store),
    ));
    let app_state = AppState::new(service, verifier);

    let router = create_router(app_state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🚀 Server starting on http://{}", addr);
    info!("📖 Swagger UI available at http://{}/docs", addr);
    info!("📄 OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
