//! JWT issuance.
//!
//! ## Token Shape
//! ```text
//! header   { "alg": "HS256", "typ": "JWT" }
//! payload  {
//!   "sub":  user id,
//!   "name": username,
//!   "role": role,
//!   "iss":  issuer,          ┐ same configured value
//!   "aud":  issuer,          ┘
//!   "iat":  issued at (unix seconds),
//!   "exp":  iat + lifetime,
//!   "jti":  UUID v4
//! }
//! ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use stockroom_core::{ClaimSet, TokenError, TokenIssuer};

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};

/// Signed JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user id)
    pub sub: String,

    /// Username
    pub name: String,

    pub role: String,

    pub iss: String,

    pub aud: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// HS256 token issuer.
///
/// Constructs without a secret so that a misconfigured process still starts;
/// every `issue` then fails with [`TokenError::MissingSecret`].
#[derive(Clone)]
pub struct JwtIssuer {
    secret: Option<Vec<u8>>,
    issuer: String,
}

impl JwtIssuer {
    pub fn new(secret: Option<&str>, issuer: impl Into<String>) -> Self {
        JwtIssuer {
            secret: secret
                .filter(|s| !s.is_empty())
                .map(|s| s.as_bytes().to_vec()),
            issuer: issuer.into(),
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        JwtIssuer::new(config.jwt_secret.as_deref(), config.jwt_issuer.clone())
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Verifies signature, expiry, issuer and audience, and returns the
    /// claims.
    pub fn validate(&self, token: &str) -> ServiceResult<JwtClaims> {
        let secret = self.secret.as_deref().ok_or(TokenError::MissingSecret)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.issuer]);

        decode::<JwtClaims>(token, &DecodingKey::from_secret(secret), &validation)
            .map(|data| data.claims)
            .map_err(|_| ServiceError::Authentication)
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, claims: &ClaimSet, valid_for: Duration) -> Result<String, TokenError> {
        let secret = self.secret.as_deref().ok_or(TokenError::MissingSecret)?;

        let now = Utc::now();
        let exp = now + valid_for;

        let claims = JwtClaims {
            sub: claims.subject.clone(),
            name: claims.username.clone(),
            role: claims.role.clone(),
            iss: self.issuer.clone(),
            aud: self.issuer.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

impl fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtIssuer")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("issuer", &self.issuer)
            .finish()
    }
}
