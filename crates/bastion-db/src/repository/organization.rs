//! In-memory implementation of [`OrganizationRepository`].
//!
//! Unique constraints: `id` and `legal_name`.

use std::cmp::Ordering;

use bastion_core::error::BastionResult;
use bastion_core::models::organization::{Organization, OrganizationField};
use bastion_core::repository::{
    OrganizationCondition, OrganizationOrderField, OrganizationRepository, PaginatedResult,
    Pagination, Sort,
};
use uuid::Uuid;

use super::paginate;
use crate::error::DbError;
use crate::store::SharedTables;

const ENTITY: &str = "organization";

/// In-memory implementation of the Organization repository.
#[derive(Clone)]
pub struct MemoryOrganizationRepository {
    tables: SharedTables,
}

impl MemoryOrganizationRepository {
    pub(crate) fn new(tables: SharedTables) -> Self {
        Self { tables }
    }
}

fn matches(org: &Organization, condition: &OrganizationCondition) -> bool {
    match condition {
        OrganizationCondition::LegalName {
            value,
            wildcard: false,
        } => org.legal_name == *value,
        OrganizationCondition::LegalName {
            value,
            wildcard: true,
        } => org
            .legal_name
            .to_lowercase()
            .contains(&value.to_lowercase()),
    }
}

fn compare(a: &Organization, b: &Organization, field: OrganizationOrderField) -> Ordering {
    match field {
        OrganizationOrderField::Id => a.id.cmp(&b.id),
        OrganizationOrderField::LegalName => a.legal_name.cmp(&b.legal_name),
        OrganizationOrderField::CreatedAt => a.created_at.cmp(&b.created_at),
        OrganizationOrderField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

impl OrganizationRepository for MemoryOrganizationRepository {
    async fn get(&self, id: Uuid) -> BastionResult<Organization> {
        let tables = self.tables.lock().await;
        tables
            .organizations
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found(ENTITY, id).into())
    }

    async fn create(&self, organization: Organization) -> BastionResult<Organization> {
        let mut tables = self.tables.lock().await;

        if tables.organizations.contains_key(&organization.id) {
            return Err(DbError::conflict(ENTITY, "id").into());
        }
        if tables
            .organizations
            .values()
            .any(|o| o.legal_name == organization.legal_name)
        {
            return Err(DbError::conflict(ENTITY, "legal_name").into());
        }

        tables
            .organizations
            .insert(organization.id, organization.clone());
        Ok(organization)
    }

    async fn update(
        &self,
        organization: &Organization,
        fields: &[OrganizationField],
    ) -> BastionResult<Organization> {
        if fields.is_empty() {
            return Err(DbError::NoFieldsToUpdate {
                entity: ENTITY.into(),
            }
            .into());
        }

        let mut tables = self.tables.lock().await;

        if fields.contains(&OrganizationField::LegalName)
            && tables
                .organizations
                .values()
                .any(|o| o.id != organization.id && o.legal_name == organization.legal_name)
        {
            return Err(DbError::conflict(ENTITY, "legal_name").into());
        }

        let stored = tables
            .organizations
            .get_mut(&organization.id)
            .ok_or_else(|| DbError::not_found(ENTITY, organization.id))?;

        for field in fields {
            match field {
                OrganizationField::LegalName => {
                    stored.legal_name = organization.legal_name.clone();
                }
            }
        }
        stored.updated_at = organization.updated_at;

        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> BastionResult<()> {
        let mut tables = self.tables.lock().await;
        tables
            .organizations
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DbError::not_found(ENTITY, id).into())
    }

    async fn list(
        &self,
        pagination: Pagination,
        order_by: &[Sort<OrganizationOrderField>],
        conditions: &[OrganizationCondition],
    ) -> BastionResult<PaginatedResult<Organization>> {
        let tables = self.tables.lock().await;
        let items: Vec<Organization> = tables
            .organizations
            .values()
            .filter(|o| conditions.iter().all(|c| matches(o, c)))
            .cloned()
            .collect();

        Ok(paginate(items, &pagination, order_by, compare))
    }
}
