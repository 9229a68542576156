//! Authentication configuration.

use chrono::Duration;

/// Longest token lifetime the server accepts from configuration (one year).
pub const MAX_TOKEN_LIFETIME_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration for the authentication and token services.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC secret for access tokens.
    pub access_token_secret: Vec<u8>,
    /// HMAC secret for refresh tokens. Must differ from the access secret.
    pub refresh_token_secret: Vec<u8>,
    /// Access token lifetime in seconds (default: 300 = 5 minutes).
    pub access_token_lifetime_secs: u64,
    /// Refresh token lifetime in seconds (default: 1800 = 30 minutes).
    pub refresh_token_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_token_secret: Vec::new(),
            refresh_token_secret: Vec::new(),
            access_token_lifetime_secs: 300,
            refresh_token_lifetime_secs: 1800,
            pepper: None,
        }
    }
}

impl AuthConfig {
    pub fn access_token_lifetime(&self) -> Duration {
        lifetime(self.access_token_lifetime_secs)
    }

    pub fn refresh_token_lifetime(&self) -> Duration {
        lifetime(self.refresh_token_lifetime_secs)
    }
}

/// Values past what a [`Duration`] can hold saturate; issuing then fails
/// instead of wrapping into the past.
fn lifetime(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or(Duration::MAX)
}
