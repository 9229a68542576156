//! User self-registration.

use std::sync::Arc;

use bastion_core::clock::{Clock, IdGenerator};
use bastion_core::error::BastionResult;
use bastion_core::models::user::{User, UserStatus};
use bastion_core::repository::UserRepository;
use bastion_core::validation::{FieldRules, Rule};
use tracing::info;
use uuid::Uuid;

use crate::password::PasswordHasher;

const DISPLAY_NAME: FieldRules = FieldRules::new(
    "display_name",
    &[Rule::MinLength(2), Rule::MaxLength(50), Rule::Charset(&['_', '-'])],
);

const EMAIL: FieldRules = FieldRules::new("email", &[Rule::MinLength(2), Rule::MaxLength(50)]);

const PASSWORD: FieldRules = FieldRules::new(
    "password",
    &[
        Rule::MinLength(2),
        Rule::MaxLength(55),
        Rule::MinDigits(1),
        Rule::MinSpecialChars(1),
    ],
);

/// Input for [`RegistrationService::register`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub organization_id: Uuid,
    pub display_name: String,
    pub email: String,
    pub password: String,
}

/// Creates new users from a validated registration request.
pub struct RegistrationService<U: UserRepository> {
    user_repo: U,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
}

impl<U: UserRepository> RegistrationService<U> {
    pub fn new(
        user_repo: U,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            user_repo,
            hasher,
            clock,
            ids,
        }
    }

    /// Validate, hash, persist. The returned user has no password hash.
    ///
    /// Nothing reaches the repository unless every field passes.
    pub async fn register(&self, registration: Registration) -> BastionResult<User> {
        DISPLAY_NAME.validate(&registration.display_name)?;
        EMAIL.validate(&registration.email)?;
        PASSWORD.validate(&registration.password)?;

        let password_hash = self.hasher.hash(&registration.password)?;

        let now = self.clock.now();
        let user = User {
            id: self.ids.generate(),
            organization_id: registration.organization_id,
            display_name: registration.display_name,
            email: registration.email,
            password_hash,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            organization: None,
        };

        let user = self.user_repo.create(user).await?;
        info!(user_id = %user.id, organization_id = %user.organization_id, "User registered");

        Ok(user.without_password_hash())
    }
}
