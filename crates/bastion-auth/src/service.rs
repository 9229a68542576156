//! Authentication service: credential check and token issuance.

use std::sync::Arc;

use bastion_core::clock::Clock;
use bastion_core::error::{BastionError, BastionResult};
use bastion_core::models::user::User;
use bastion_core::repository::UserRepository;
use bastion_core::validation::{FieldRules, Rule};
use tracing::{debug, info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password::PasswordHasher;
use crate::token::{Claims, TokenManager};

const EMAIL: FieldRules = FieldRules::new("email", &[Rule::MinLength(1), Rule::MaxLength(50)]);
const PASSWORD: FieldRules =
    FieldRules::new("password", &[Rule::MinLength(1), Rule::MaxLength(100)]);

/// Hashed once per service and verified against when the email is unknown,
/// so both failure paths pay for one Argon2 verification.
const DUMMY_PASSWORD: &str = "bastion-unknown-account";

/// Input for [`AuthService::authenticate`].
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Successful authentication result.
#[derive(Debug, Clone)]
pub struct Authentication {
    /// The authenticated user, without password hash.
    pub user: User,
    /// Short-lived access token.
    pub access_token: String,
    /// Longer-lived refresh token, signed with a separate key.
    pub refresh_token: String,
}

/// Authentication service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    user_repo: U,
    hasher: Arc<dyn PasswordHasher>,
    access_tokens: TokenManager,
    refresh_tokens: TokenManager,
    dummy_hash: Option<String>,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(
        user_repo: U,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
        config: &AuthConfig,
    ) -> Self {
        let access_tokens = TokenManager::new(
            clock.clone(),
            &config.access_token_secret,
            config.access_token_lifetime(),
        );
        let refresh_tokens = TokenManager::new(
            clock,
            &config.refresh_token_secret,
            config.refresh_token_lifetime(),
        );
        let dummy_hash = hasher
            .hash(DUMMY_PASSWORD)
            .inspect_err(|e| warn!(error = %e, "Failed to prepare unknown-account hash"))
            .ok();
        Self {
            user_repo,
            hasher,
            access_tokens,
            refresh_tokens,
            dummy_hash,
        }
    }

    /// Check email + password and issue an access/refresh token pair.
    ///
    /// Unknown email, wrong password, an unreadable stored hash and a
    /// non-active account all fail with the same
    /// [`AuthError::InvalidCredentials`]. The account status is only looked
    /// at once the password has verified.
    pub async fn authenticate(&self, credentials: Credentials) -> BastionResult<Authentication> {
        EMAIL.validate(&credentials.email)?;
        PASSWORD.validate(&credentials.password)?;

        let user = match self.user_repo.get_by_email(&credentials.email).await {
            Ok(user) => user,
            Err(BastionError::NotFound { .. }) => {
                if let Some(dummy_hash) = &self.dummy_hash {
                    let _ = self.hasher.verify(&credentials.password, dummy_hash);
                }
                debug!("Authentication failed: unknown email");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        match self.hasher.verify(&credentials.password, &user.password_hash) {
            Ok(true) => {}
            Ok(false) => {
                debug!(user_id = %user.id, "Authentication failed: password mismatch");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "Authentication failed: stored hash unusable");
                return Err(AuthError::InvalidCredentials.into());
            }
        }

        if !user.is_active() {
            debug!(user_id = %user.id, status = user.status.as_str(), "Authentication failed: account not active");
            return Err(AuthError::InvalidCredentials.into());
        }

        let subject = user.id.to_string();
        let access_token = self.access_tokens.create(&subject)?;
        let refresh_token = self.refresh_tokens.create(&subject)?;

        info!(user_id = %user.id, "User authenticated");

        Ok(Authentication {
            user: user.without_password_hash(),
            access_token,
            refresh_token,
        })
    }

    /// Verify an access token. Stateless; no repository lookup.
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.access_tokens.validate(token)
    }

    /// Verify a refresh token. Stateless; no repository lookup.
    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.refresh_tokens.validate(token)
    }
}
