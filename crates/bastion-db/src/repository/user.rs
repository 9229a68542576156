//! In-memory implementation of [`UserRepository`].
//!
//! Unique constraints: `id` and `email`. Deletes are soft: the record
//! stays, with status `Deleted` and `deleted_at` stamped from the clock.

use std::cmp::Ordering;
use std::sync::Arc;

use bastion_core::clock::Clock;
use bastion_core::error::BastionResult;
use bastion_core::models::user::{User, UserField, UserStatus};
use bastion_core::repository::{
    PaginatedResult, Pagination, Sort, UserCondition, UserOrderField, UserRepository,
};
use uuid::Uuid;

use super::paginate;
use crate::error::DbError;
use crate::store::SharedTables;

const ENTITY: &str = "user";

/// In-memory implementation of the User repository.
#[derive(Clone)]
pub struct MemoryUserRepository {
    tables: SharedTables,
    clock: Arc<dyn Clock>,
}

impl MemoryUserRepository {
    pub(crate) fn new(tables: SharedTables, clock: Arc<dyn Clock>) -> Self {
        Self { tables, clock }
    }
}

fn matches(user: &User, condition: &UserCondition) -> bool {
    match condition {
        UserCondition::OrganizationId(id) => user.organization_id == *id,
        UserCondition::Email(email) => user.email == *email,
        UserCondition::Status(status) => user.status == *status,
    }
}

fn compare(a: &User, b: &User, field: UserOrderField) -> Ordering {
    match field {
        UserOrderField::Id => a.id.cmp(&b.id),
        UserOrderField::OrganizationId => a.organization_id.cmp(&b.organization_id),
        UserOrderField::DisplayName => a.display_name.cmp(&b.display_name),
        UserOrderField::Email => a.email.cmp(&b.email),
        UserOrderField::CreatedAt => a.created_at.cmp(&b.created_at),
        UserOrderField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
    }
}

impl UserRepository for MemoryUserRepository {
    async fn get(&self, id: Uuid) -> BastionResult<User> {
        let tables = self.tables.lock().await;
        tables
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found(ENTITY, id).into())
    }

    async fn get_by_email(&self, email: &str) -> BastionResult<User> {
        let tables = self.tables.lock().await;
        tables
            .users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or_else(|| DbError::not_found(ENTITY, format!("email={email}")).into())
    }

    async fn create(&self, user: User) -> BastionResult<User> {
        let mut tables = self.tables.lock().await;

        if tables.users.contains_key(&user.id) {
            return Err(DbError::conflict(ENTITY, "id").into());
        }
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(DbError::conflict(ENTITY, "email").into());
        }
        if tables
            .users
            .values()
            .any(|u| u.display_name == user.display_name)
        {
            return Err(DbError::conflict(ENTITY, "display_name").into());
        }

        let user = User {
            organization: None,
            ..user
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User, fields: &[UserField]) -> BastionResult<User> {
        if fields.is_empty() {
            return Err(DbError::NoFieldsToUpdate {
                entity: ENTITY.into(),
            }
            .into());
        }

        let mut tables = self.tables.lock().await;

        if fields.contains(&UserField::Email)
            && tables
                .users
                .values()
                .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(DbError::conflict(ENTITY, "email").into());
        }
        if fields.contains(&UserField::DisplayName)
            && tables
                .users
                .values()
                .any(|u| u.id != user.id && u.display_name == user.display_name)
        {
            return Err(DbError::conflict(ENTITY, "display_name").into());
        }

        let stored = tables
            .users
            .get_mut(&user.id)
            .ok_or_else(|| DbError::not_found(ENTITY, user.id))?;

        for field in fields {
            match field {
                UserField::OrganizationId => stored.organization_id = user.organization_id,
                UserField::DisplayName => stored.display_name = user.display_name.clone(),
                UserField::Email => stored.email = user.email.clone(),
                UserField::Password => stored.password_hash = user.password_hash.clone(),
                UserField::Status => stored.status = user.status,
            }
        }
        stored.updated_at = user.updated_at;

        Ok(stored.clone())
    }

    async fn delete(&self, id: Uuid) -> BastionResult<()> {
        let now = self.clock.now();
        let mut tables = self.tables.lock().await;

        let stored = tables
            .users
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found(ENTITY, id))?;
        stored.status = UserStatus::Deleted;
        stored.deleted_at = Some(now);
        stored.updated_at = now;

        Ok(())
    }

    async fn list(
        &self,
        pagination: Pagination,
        order_by: &[Sort<UserOrderField>],
        conditions: &[UserCondition],
    ) -> BastionResult<PaginatedResult<User>> {
        let tables = self.tables.lock().await;
        let items: Vec<User> = tables
            .users
            .values()
            .filter(|u| conditions.iter().all(|c| matches(u, c)))
            .cloned()
            .collect();

        Ok(paginate(items, &pagination, order_by, compare))
    }
}
