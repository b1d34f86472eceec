//! Bearer-token identity verification against the identity provider's JWKS.
//!
//! Keys are fetched lazily and cached with a TTL; an unknown `kid` forces a
//! refresh so provider key rotation is picked up without a restart. When no
//! verifier is configured the API runs open, which is the expected setup for
//! local development.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use crate::domain::error::AppError;

/// Configuration for the identity verifier
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwks_url: String,
    pub issuer: String,
    pub audience: String,
    pub cache_ttl: Duration,
}

/// Verified caller identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kty: String,
    kid: String,
    #[serde(default)]
    x: Option<String>,
    #[serde(default)]
    y: Option<String>,
    #[serde(default)]
    n: Option<String>,
    #[serde(default)]
    e: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: Instant,
}

/// JWKS-backed bearer token verifier
pub struct IdentityVerifier {
    config: AuthConfig,
    http: reqwest::Client,
    cache: RwLock<Option<CachedKeys>>,
}

impl IdentityVerifier {
    pub fn new(config: AuthConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            config,
            http,
            cache: RwLock::new(None),
        })
    }

    /// Verify a bearer token and extract the caller's stable user id.
    #[instrument(skip(self, token))]
    pub async fn verify(&self, token: &str) -> Result<VerifiedIdentity, AppError> {
        let header = decode_header(token)
            .map_err(|e| AppError::Authentication(format!("Malformed token: {}", e)))?;
        let kid = header
            .kid
            .ok_or_else(|| AppError::Authentication("Token missing key id".to_string()))?;
        if !SUPPORTED_ALGORITHMS.contains(&header.alg) {
            return Err(AppError::Authentication(format!(
                "Unsupported algorithm: {:?}",
                header.alg
            )));
        }

        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(header.alg);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);

        let data = decode::<Claims>(token, &key, &validation)
            .map_err(|e| AppError::Authentication(format!("Token rejected: {}", e)))?;

        Ok(VerifiedIdentity {
            user_id: strip_did_prefix(&data.claims.sub).to_string(),
        })
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, AppError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.fetched_at.elapsed() < self.config.cache_ttl {
                    if let Some(key) = cached.keys.get(kid) {
                        return Ok(key.clone());
                    }
                }
            }
        }

        // Stale cache or unknown kid: refetch under the write lock
        let mut cache = self.cache.write().await;
        let keys = self.fetch_keys().await?;
        let key = keys.get(kid).cloned();
        *cache = Some(CachedKeys {
            keys,
            fetched_at: Instant::now(),
        });

        key.ok_or_else(|| AppError::Authentication(format!("Unknown signing key: {}", kid)))
    }

    async fn fetch_keys(&self) -> Result<HashMap<String, DecodingKey>, AppError> {
        let document: JwksDocument = self
            .http
            .get(&self.config.jwks_url)
            .send()
            .await
            .map_err(|e| AppError::Authentication(format!("JWKS fetch failed: {}", e)))?
            .json()
            .await
            .map_err(|e| AppError::Authentication(format!("JWKS decode failed: {}", e)))?;

        let mut keys = HashMap::new();
        for jwk in document.keys {
            match build_decoding_key(&jwk) {
                Ok(key) => {
                    keys.insert(jwk.kid, key);
                }
                Err(e) => warn!(kid = %jwk.kid, error = %e, "Skipping unusable JWK"),
            }
        }
        debug!(count = keys.len(), "Refreshed JWKS cache");
        Ok(keys)
    }
}

fn build_decoding_key(jwk: &Jwk) -> Result<DecodingKey, String> {
    match jwk.kty.as_str() {
        "EC" => {
            let x = jwk.x.as_deref().ok_or("EC key missing x")?;
            let y = jwk.y.as_deref().ok_or("EC key missing y")?;
            DecodingKey::from_ec_components(x, y).map_err(|e| e.to_string())
        }
        "RSA" => {
            let n = jwk.n.as_deref().ok_or("RSA key missing n")?;
            let e = jwk.e.as_deref().ok_or("RSA key missing e")?;
            DecodingKey::from_rsa_components(n, e).map_err(|e| e.to_string())
        }
        other => Err(format!("unsupported key type {}", other)),
    }
}

/// Identity providers issue DID-form subjects (`did:privy:abc123`); the
/// stored user id is the final segment.
fn strip_did_prefix(sub: &str) -> &str {
    if sub.starts_with("did:") {
        sub.rsplit(':').next().unwrap_or(sub)
    } else {
        sub
    }
}

/// Algorithms accepted from the identity provider
pub const SUPPORTED_ALGORITHMS: &[Algorithm] = &[Algorithm::ES256, Algorithm::RS256];
