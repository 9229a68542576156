//! User domain model.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::organization::Organization;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
    Deleted,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Inactive => "inactive",
            UserStatus::Deleted => "deleted",
        }
    }
}

/// A user who uses or operates the system.
///
/// The same type is used by the pipelines and by storage. At the wire
/// edge (`serde`) the password hash and the resolved organization are
/// never written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub display_name: String,
    pub email: String,
    /// Argon2id PHC string. Empty once the user has left the
    /// registration/authentication boundary.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
    /// Primary organization, when a caller has resolved it. Shared, not owned.
    #[serde(skip)]
    pub organization: Option<Arc<Organization>>,
}

impl User {
    /// Returns the user with the password hash cleared.
    pub fn without_password_hash(mut self) -> Self {
        self.password_hash.clear();
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// Updatable user attributes.
///
/// `id` and `created_at` are read-only and therefore not listed; every
/// update also writes `updated_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserField {
    OrganizationId,
    DisplayName,
    Email,
    Password,
    Status,
}

impl UserField {
    pub const ALL: [UserField; 5] = [
        UserField::OrganizationId,
        UserField::DisplayName,
        UserField::Email,
        UserField::Password,
        UserField::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserField::OrganizationId => "organization_id",
            UserField::DisplayName => "display_name",
            UserField::Email => "email",
            UserField::Password => "password",
            UserField::Status => "status",
        }
    }
}

impl std::fmt::Display for UserField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
