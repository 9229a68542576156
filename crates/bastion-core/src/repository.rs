//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Updates are field-scoped: the
//! caller passes the full entity plus the [`UserField`]s or
//! [`OrganizationField`]s that should be written. Implementations must
//! surface a missing entity as [`BastionError::NotFound`] and a unique
//! constraint violation as [`BastionError::Conflict`] naming the field.
//!
//! [`BastionError::NotFound`]: crate::error::BastionError::NotFound
//! [`BastionError::Conflict`]: crate::error::BastionError::Conflict

use uuid::Uuid;

use crate::error::BastionResult;
use crate::models::{
    organization::{Organization, OrganizationField},
    user::{User, UserField, UserStatus},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One ordering key; list queries take a slice, most significant first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F> Sort<F> {
    pub fn asc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: F) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserOrderField {
    Id,
    OrganizationId,
    DisplayName,
    Email,
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizationOrderField {
    Id,
    LegalName,
    CreatedAt,
    UpdatedAt,
}

/// Filters for [`UserRepository::list`]. Multiple conditions are ANDed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCondition {
    OrganizationId(Uuid),
    Email(String),
    Status(UserStatus),
}

/// Filters for [`OrganizationRepository::list`]. Multiple conditions are ANDed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrganizationCondition {
    /// Exact match, or case-insensitive substring match when `wildcard`.
    LegalName { value: String, wildcard: bool },
}

// ---------------------------------------------------------------------------
// Entity repositories
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn get(&self, id: Uuid) -> impl Future<Output = BastionResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = BastionResult<User>> + Send;
    fn create(&self, user: User) -> impl Future<Output = BastionResult<User>> + Send;
    /// Write `fields` (plus `updated_at`) from `user` onto the stored record.
    fn update(
        &self,
        user: &User,
        fields: &[UserField],
    ) -> impl Future<Output = BastionResult<User>> + Send;
    /// Soft-delete: sets status to `Deleted` and stamps `deleted_at`.
    fn delete(&self, id: Uuid) -> impl Future<Output = BastionResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
        order_by: &[Sort<UserOrderField>],
        conditions: &[UserCondition],
    ) -> impl Future<Output = BastionResult<PaginatedResult<User>>> + Send;
}

pub trait OrganizationRepository: Send + Sync {
    fn get(&self, id: Uuid) -> impl Future<Output = BastionResult<Organization>> + Send;
    fn create(
        &self,
        organization: Organization,
    ) -> impl Future<Output = BastionResult<Organization>> + Send;
    /// Write `fields` (plus `updated_at`) from `organization` onto the stored record.
    fn update(
        &self,
        organization: &Organization,
        fields: &[OrganizationField],
    ) -> impl Future<Output = BastionResult<Organization>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = BastionResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
        order_by: &[Sort<OrganizationOrderField>],
        conditions: &[OrganizationCondition],
    ) -> impl Future<Output = BastionResult<PaginatedResult<Organization>>> + Send;
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Repository handles that all belong to the same unit of work.
pub trait Repositories: Send + Sync {
    type Users: UserRepository;
    type Organizations: OrganizationRepository;

    fn users(&self) -> &Self::Users;
    fn organizations(&self) -> &Self::Organizations;
}

/// Runs an operation against repositories bound to a single transaction.
///
/// The transaction commits when `op` returns `Ok` and rolls back when it
/// returns `Err`. Dropping the returned future before it completes also
/// rolls back. Implementations provide at least read-committed isolation
/// so that two concurrent operations cannot both observe an entity as
/// missing and both create it.
pub trait TransactionRunner: Send + Sync {
    type Repos: Repositories;

    fn begin_op<T, F, Fut>(&self, op: F) -> impl Future<Output = BastionResult<T>> + Send
    where
        T: Send,
        F: FnOnce(Self::Repos) -> Fut + Send,
        Fut: Future<Output = BastionResult<T>> + Send;
}
