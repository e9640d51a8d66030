//! Access-token validation for the timer API.
//!
//! The academy's identity service mints HS256-signed JWTs; this crate
//! verifies them and reads the [`Claims`] payload. Token generation lives
//! here too, for the integration tests and local tooling, not because the
//! timer issues tokens.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use studyflow_core::types::DbId;
use uuid::Uuid;

/// Claims carried by every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject: the student's database id.
    pub sub: DbId,
    /// Academy (tenant) scope, when the token is tenant-bound.
    pub tenant_id: Option<DbId>,
    /// Caller role (`"student"`, `"teacher"`, `"admin"`).
    pub role: String,
    /// Expiry, seconds since the UNIX epoch.
    pub exp: i64,
    /// Issue time, seconds since the UNIX epoch.
    pub iat: i64,
    /// Token id (UUID v4), for audit trails.
    pub jti: String,
}

impl Claims {
    fn new(student_id: DbId, tenant_id: Option<DbId>, role: &str, ttl_mins: i64) -> Self {
        let iat = chrono::Utc::now().timestamp();
        Self {
            sub: student_id,
            tenant_id,
            role: role.to_string(),
            exp: iat + ttl_mins * 60,
            iat,
            jti: Uuid::new_v4().to_string(),
        }
    }
}

/// Signing and verification settings.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the identity service.
    pub secret: String,
    /// Access token lifetime in minutes.
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// Read JWT settings from the environment.
    ///
    /// | Env Var                  | Required | Default |
    /// |--------------------------|----------|---------|
    /// | `JWT_SECRET`             | **yes**  | --      |
    /// | `JWT_ACCESS_EXPIRY_MINS` | no       | `15`    |
    ///
    /// # Panics
    ///
    /// Panics when `JWT_SECRET` is missing or empty; the server must not
    /// come up unable to verify anything.
    pub fn from_env() -> Self {
        let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET must be set");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let expiry: i64 = std::env::var("JWT_ACCESS_EXPIRY_MINS")
            .map(|raw| {
                raw.parse()
                    .expect("JWT_ACCESS_EXPIRY_MINS must be an integer")
            })
            .unwrap_or(15);

        Self {
            secret,
            access_token_expiry_mins: expiry,
        }
    }
}

/// Mint an HS256 access token for a student.
pub fn generate_access_token(
    student_id: DbId,
    tenant_id: Option<DbId>,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims::new(student_id, tenant_id, role, config.access_token_expiry_mins);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Verify a token's signature and expiry, returning its [`Claims`].
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    // HS256 with `exp` checking (60s leeway) is the `Validation` default.
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}
