//! PostgreSQL-backed withdrawal store.
//!
//! The store is an audit mirror of custody-owned state. The custody service
//! remains the source of truth for transaction status; rows here exist so the
//! faucet has its own queryable history even if the custody account changes.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument};

use crate::domain::error::{AppError, DatabaseError};
use crate::domain::traits::WithdrawalStore;
use crate::domain::types::{NewWithdrawal, TransactionStatus};

/// Configuration for the PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: SecretString,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: SecretString::from("postgres://localhost/faucet"),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// PostgreSQL withdrawal store
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect and build the pool. Does not run migrations; call
    /// [`Self::run_migrations`] explicitly during startup.
    pub async fn new(config: &PostgresConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(config.database_url.expose_secret())
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;
        info!("Database migrations applied");
        Ok(())
    }
}

fn map_sqlx_error(e: sqlx::Error) -> DatabaseError {
    match e {
        sqlx::Error::RowNotFound => DatabaseError::NotFound(e.to_string()),
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => DatabaseError::Connection(e.to_string()),
        other => DatabaseError::Query(other.to_string()),
    }
}

#[async_trait]
impl WithdrawalStore for PostgresStore {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    #[instrument(skip(self, withdrawal), fields(transaction_id = %withdrawal.transaction_id))]
    async fn record_withdrawal(&self, withdrawal: &NewWithdrawal) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO withdrawals
                (transaction_id, user_id, chain_key, network_mode, token, recipient, amount, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (transaction_id) DO NOTHING
            "#,
        )
        .bind(&withdrawal.transaction_id)
        .bind(&withdrawal.user_id)
        .bind(&withdrawal.chain_key)
        .bind(withdrawal.network_mode.as_str())
        .bind(withdrawal.token.as_str())
        .bind(&withdrawal.recipient)
        .bind(withdrawal.amount)
        .bind(withdrawal.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        transaction_id: &str,
        status: TransactionStatus,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE withdrawals SET status = $2, updated_at = now() WHERE transaction_id = $1",
        )
        .bind(transaction_id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(transaction_id.to_string()).into());
        }
        Ok(())
    }
}
