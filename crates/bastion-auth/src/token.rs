//! HS256 JWT issuance and verification.
//!
//! Tokens carry exactly two claims: `sub` (the user id) and `exp` (Unix
//! seconds). Access and refresh tokens are the same shape and differ only
//! in signing key and lifetime, so each scope gets its own
//! [`TokenManager`].
//!
//! Verification is ordered: structure first (three base64url segments,
//! JSON object header and payload), then algorithm and signature, then
//! claims, then expiry. Each stage maps to its own [`AuthError`] variant.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bastion_core::clock::Clock;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AuthError;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims recovered from a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user id as a string).
    pub sub: String,
    /// Expiration time.
    pub exp: DateTime<Utc>,
}

#[derive(Serialize)]
struct EncodedClaims<'a> {
    sub: &'a str,
    exp: i64,
}

/// Signs tokens for one key scope.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    expiry: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(clock: Arc<dyn Clock>, secret: &[u8], expiry: Duration) -> Self {
        Self {
            key: EncodingKey::from_secret(secret),
            expiry,
            clock,
        }
    }

    /// Issue a token for `subject` expiring `expiry` from now.
    pub fn create(&self, subject: &str) -> Result<String, AuthError> {
        let exp = self
            .clock
            .now()
            .checked_add_signed(self.expiry)
            .ok_or_else(|| AuthError::Crypto("token expiry out of range".into()))?;
        let claims = EncodedClaims {
            sub: subject,
            exp: exp.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.key)
            .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
    }
}

/// Verifies tokens for one key scope.
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    pub fn new(clock: Arc<dyn Clock>, secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            clock,
        }
    }

    /// Verify `token` and return its claims.
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        // jsonwebtoken checks the signature before it decodes the payload,
        // so structure is checked on its own first.
        decode_unverified(token)?;
        check_signature_encoding(token)?;

        let payload = jsonwebtoken::decode::<Map<String, Value>>(
            token,
            &self.key,
            &claims_validation(Validation::new(ALGORITHM)),
        )
        .map(|data| data.claims)
        .map_err(decode_error)?;

        let claims = Claims {
            sub: subject_claim(&payload)?,
            exp: expiration_claim(&payload)?,
        };

        if self.clock.now() > claims.exp {
            return Err(AuthError::TokenInvalid("token has expired".into()));
        }

        Ok(claims)
    }
}

/// Issuer and verifier sharing one secret and lifetime.
#[derive(Clone)]
pub struct TokenManager {
    issuer: TokenIssuer,
    verifier: TokenVerifier,
}

impl TokenManager {
    pub fn new(clock: Arc<dyn Clock>, secret: &[u8], expiry: Duration) -> Self {
        Self {
            issuer: TokenIssuer::new(clock.clone(), secret, expiry),
            verifier: TokenVerifier::new(clock, secret),
        }
    }

    pub fn create(&self, subject: &str) -> Result<String, AuthError> {
        self.issuer.create(subject)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        self.verifier.validate(token)
    }
}

/// Read the `exp` claim without checking the signature.
///
/// Only for deriving cookie lifetimes. Never trust the result for
/// authorization.
pub fn expiration_time(token: &str) -> Result<DateTime<Utc>, AuthError> {
    let payload = decode_unverified(token)?;
    expiration_claim(&payload)
}

/// Expiry is checked against the injected clock and claim shapes are
/// checked by hand, so the library only verifies structure and signature.
fn claims_validation(mut validation: Validation) -> Validation {
    validation.required_spec_claims.clear();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation
}

fn decode_unverified(token: &str) -> Result<Map<String, Value>, AuthError> {
    let mut validation = Validation::new(ALGORITHM);
    validation.insecure_disable_signature_validation();

    jsonwebtoken::decode::<Map<String, Value>>(
        token,
        &DecodingKey::from_secret(&[]),
        &claims_validation(validation),
    )
    .map(|data| data.claims)
    .map_err(|e| AuthError::TokenMalformed(e.to_string()))
}

/// HMAC verification compares encoded signatures, so a signature segment
/// that is not base64url would otherwise surface as a mismatch.
fn check_signature_encoding(token: &str) -> Result<(), AuthError> {
    let signature = token.rsplit('.').next().unwrap_or_default();
    URL_SAFE_NO_PAD
        .decode(signature)
        .map(|_| ())
        .map_err(|e| AuthError::TokenMalformed(format!("signature segment: {e}")))
}

fn decode_error(err: JwtError) -> AuthError {
    match err.kind() {
        ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
            AuthError::TokenMalformed(err.to_string())
        }
        _ => AuthError::TokenInvalid(err.to_string()),
    }
}

fn subject_claim(payload: &Map<String, Value>) -> Result<String, AuthError> {
    payload
        .get("sub")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| AuthError::TokenInvalidClaims("sub must be a string".into()))
}

fn expiration_claim(payload: &Map<String, Value>) -> Result<DateTime<Utc>, AuthError> {
    let invalid = || AuthError::TokenInvalidClaims("exp must be a Unix timestamp".into());

    let Some(Value::Number(number)) = payload.get("exp") else {
        return Err(invalid());
    };
    let secs = match number.as_i64() {
        Some(secs) => secs,
        None => number.as_f64().filter(|f| f.is_finite()).ok_or_else(invalid)?.floor() as i64,
    };
    DateTime::from_timestamp(secs, 0).ok_or_else(invalid)
}
