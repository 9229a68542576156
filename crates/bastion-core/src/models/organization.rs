//! Organization domain model.
//!
//! An organization is the owning group of a set of users. The system
//! organization maintained by the bootstrap reconciler is one of these.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An organized group of users, e.g. a registered company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    /// Official name of the organization, e.g. the registered company name.
    pub legal_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Updatable organization attributes.
///
/// `id` and `created_at` are read-only and therefore not listed; every
/// update also writes `updated_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrganizationField {
    LegalName,
}

impl OrganizationField {
    pub const ALL: [OrganizationField; 1] = [OrganizationField::LegalName];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrganizationField::LegalName => "legal_name",
        }
    }
}

impl std::fmt::Display for OrganizationField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
