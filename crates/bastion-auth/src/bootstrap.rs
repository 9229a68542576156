//! Startup reconciliation of the system organization and system user.
//!
//! [`Bootstrapper::setup`] makes the store match configuration: missing
//! entities are created, drifted fields are rewritten, matching entities
//! are left alone. Both entities are handled in one transaction, so a
//! failure on the user leaves the organization untouched too.
//!
//! Drift is detected with ordered [`FieldRule`] tables. Every rule is
//! evaluated against the stored entity before any of them is applied, and
//! the repository update carries exactly the fields that differed.

use std::fmt::Display;
use std::sync::Arc;

use bastion_core::clock::Clock;
use bastion_core::error::{BastionError, BastionResult};
use bastion_core::models::organization::{Organization, OrganizationField};
use bastion_core::models::user::{User, UserField, UserStatus};
use bastion_core::repository::{
    OrganizationRepository, Repositories, TransactionRunner, UserRepository,
};
use bastion_core::validation::{FieldRules, Rule, require_non_nil};
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::password::PasswordHasher;

/// Display name given to the system user.
pub const SYSTEM_USER_DISPLAY_NAME: &str = "system";

const ORGANIZATION_LEGAL_NAME: FieldRules =
    FieldRules::new("system_organization.legal_name", &[Rule::Required]);
const USER_EMAIL: FieldRules = FieldRules::new("system_user.email", &[Rule::Required]);
const USER_PASSWORD: FieldRules = FieldRules::new("system_user.password", &[Rule::Required]);

/// Desired state of the system organization.
#[derive(Debug, Clone)]
pub struct SystemOrganizationConfig {
    pub id: Uuid,
    pub legal_name: String,
}

/// Desired state of the system user. `password` is plaintext.
#[derive(Clone)]
pub struct SystemUserConfig {
    pub id: Uuid,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for SystemUserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemUserConfig")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One entry of a drift table: how to detect that field `field` of the
/// stored entity `E` differs from the desired state `D`, and how to fix it.
pub struct FieldRule<E, D, F> {
    pub field: F,
    pub differs: fn(&E, &D) -> bool,
    pub apply: fn(&mut E, &D) -> BastionResult<()>,
}

/// Evaluate every rule against `entity`, then apply the differing ones.
///
/// Returns the changed fields in table order; empty means no drift.
fn reconcile_fields<E, D, F: Copy>(
    entity: &mut E,
    desired: &D,
    rules: &[FieldRule<E, D, F>],
) -> BastionResult<Vec<F>> {
    let differing: Vec<&FieldRule<E, D, F>> = rules
        .iter()
        .filter(|rule| (rule.differs)(entity, desired))
        .collect();

    for rule in &differing {
        (rule.apply)(entity, desired)?;
    }

    Ok(differing.iter().map(|rule| rule.field).collect())
}

fn field_names<F: Display>(fields: &[F]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn organization_rules() -> [FieldRule<Organization, SystemOrganizationConfig, OrganizationField>; 1]
{
    [FieldRule {
        field: OrganizationField::LegalName,
        differs: |org, desired| org.legal_name != desired.legal_name,
        apply: |org, desired| {
            org.legal_name = desired.legal_name.clone();
            Ok(())
        },
    }]
}

/// What the system user should look like once reconciled.
struct DesiredUser<'a> {
    organization_id: Uuid,
    email: &'a str,
    password: &'a str,
    hasher: &'a dyn PasswordHasher,
}

fn user_rules<'a>() -> [FieldRule<User, DesiredUser<'a>, UserField>; 4] {
    [
        FieldRule {
            field: UserField::OrganizationId,
            differs: |user, desired| user.organization_id != desired.organization_id,
            apply: |user, desired| {
                user.organization_id = desired.organization_id;
                Ok(())
            },
        },
        FieldRule {
            field: UserField::DisplayName,
            differs: |user, _| user.display_name != SYSTEM_USER_DISPLAY_NAME,
            apply: |user, _| {
                user.display_name = SYSTEM_USER_DISPLAY_NAME.into();
                Ok(())
            },
        },
        FieldRule {
            field: UserField::Email,
            differs: |user, desired| user.email != desired.email,
            apply: |user, desired| {
                user.email = desired.email.into();
                Ok(())
            },
        },
        FieldRule {
            field: UserField::Password,
            // A stored hash that cannot be verified counts as drift.
            differs: |user, desired| {
                !matches!(
                    desired.hasher.verify(desired.password, &user.password_hash),
                    Ok(true)
                )
            },
            apply: |user, desired| {
                user.password_hash = desired.hasher.hash(desired.password)?;
                Ok(())
            },
        },
    ]
}

/// Reconciles the system organization and system user at startup.
pub struct Bootstrapper<R: TransactionRunner> {
    runner: R,
    hasher: Arc<dyn PasswordHasher>,
    clock: Arc<dyn Clock>,
    organization: SystemOrganizationConfig,
    user: SystemUserConfig,
}

impl<R: TransactionRunner> Bootstrapper<R> {
    pub fn new(
        runner: R,
        hasher: Arc<dyn PasswordHasher>,
        clock: Arc<dyn Clock>,
        organization: SystemOrganizationConfig,
        user: SystemUserConfig,
    ) -> Self {
        Self {
            runner,
            hasher,
            clock,
            organization,
            user,
        }
    }

    /// Bring the system organization and user in line with configuration.
    ///
    /// Configuration is validated before any repository access. Running
    /// twice with the same configuration writes nothing the second time.
    pub async fn setup(&self) -> BastionResult<()> {
        self.validate()?;

        self.runner
            .begin_op(move |repos| async move {
                let now = self.clock.now();
                let organization = self
                    .reconcile_organization(repos.organizations(), now)
                    .await?;
                self.reconcile_user(repos.users(), organization.id, now)
                    .await?;
                Ok(())
            })
            .await
    }

    fn validate(&self) -> BastionResult<()> {
        require_non_nil("system_organization.id", self.organization.id)?;
        ORGANIZATION_LEGAL_NAME.validate(&self.organization.legal_name)?;
        require_non_nil("system_user.id", self.user.id)?;
        USER_EMAIL.validate(&self.user.email)?;
        USER_PASSWORD.validate(&self.user.password)?;
        Ok(())
    }

    async fn reconcile_organization<O: OrganizationRepository>(
        &self,
        repo: &O,
        now: DateTime<Utc>,
    ) -> BastionResult<Organization> {
        let desired = &self.organization;

        let mut organization = match repo.get(desired.id).await {
            Ok(organization) => organization,
            Err(BastionError::NotFound { .. }) => {
                let organization = repo
                    .create(Organization {
                        id: desired.id,
                        legal_name: desired.legal_name.clone(),
                        created_at: now,
                        updated_at: now,
                    })
                    .await?;
                info!(organization_id = %organization.id, "System organization created");
                return Ok(organization);
            }
            Err(e) => return Err(e),
        };

        let changed = reconcile_fields(&mut organization, desired, &organization_rules())?;
        if changed.is_empty() {
            info!(organization_id = %organization.id, "System organization unchanged");
            return Ok(organization);
        }

        organization.updated_at = now;
        let organization = repo.update(&organization, &changed).await?;
        info!(
            organization_id = %organization.id,
            fields = %field_names(&changed),
            "System organization updated"
        );
        Ok(organization)
    }

    async fn reconcile_user<U: UserRepository>(
        &self,
        repo: &U,
        organization_id: Uuid,
        now: DateTime<Utc>,
    ) -> BastionResult<()> {
        let config = &self.user;

        let mut user = match repo.get(config.id).await {
            Ok(user) => user,
            Err(BastionError::NotFound { .. }) => {
                let user = repo
                    .create(User {
                        id: config.id,
                        organization_id,
                        display_name: SYSTEM_USER_DISPLAY_NAME.into(),
                        email: config.email.clone(),
                        password_hash: self.hasher.hash(&config.password)?,
                        status: UserStatus::Active,
                        created_at: now,
                        updated_at: now,
                        deleted_at: None,
                        organization: None,
                    })
                    .await?;
                info!(user_id = %user.id, organization_id = %organization_id, "System user created");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let desired = DesiredUser {
            organization_id,
            email: &config.email,
            password: &config.password,
            hasher: self.hasher.as_ref(),
        };
        let changed = reconcile_fields(&mut user, &desired, &user_rules())?;
        if changed.is_empty() {
            info!(user_id = %user.id, "System user unchanged");
            return Ok(());
        }

        user.updated_at = now;
        repo.update(&user, &changed).await?;
        info!(user_id = %user.id, fields = %field_names(&changed), "System user updated");
        Ok(())
    }
}
