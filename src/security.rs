use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::EMAIL_FINGERPRINT_LEN;
use crate::error::{AppError, Result};

// =============================================================================
// Log Redaction
// =============================================================================

/// Short, stable SHA-256 fingerprint of an email address for log lines.
///
/// Lets operators correlate requests for one account without writing the
/// address itself to the logs.
pub fn email_fingerprint(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(EMAIL_FINGERPRINT_LEN);
    digest
}

// =============================================================================
// Password Hashing
// =============================================================================

/// Hash a plaintext password with bcrypt.
///
/// Runs on the blocking pool; bcrypt is CPU-bound.
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_owned();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

/// Compare a plaintext password against a stored bcrypt hash
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let matches =
        tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash)).await??;
    Ok(matches)
}

// =============================================================================
// Session Tokens
// =============================================================================

/// Token payload: `{userId, email, iat, exp}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub email: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Issues and validates HS256 bearer tokens
#[derive(Clone)]
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl SessionIssuer {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Issue a token for a user, valid from now for the configured lifetime
    pub fn issue(&self, user_id: i64, email: &str) -> Result<String> {
        self.issue_at(user_id, email, Utc::now().timestamp())
    }

    /// Issue a token as if it had been created at `issued_at`
    pub fn issue_at(&self, user_id: i64, email: &str, issued_at: i64) -> Result<String> {
        let claims = Claims {
            user_id,
            email: email.to_string(),
            iat: issued_at,
            exp: issued_at + self.ttl.num_seconds(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate signature and expiry. No leeway is granted past `exp`.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::warn!("Rejected session token: {}", e);
                AppError::InvalidToken
            })
    }
}
