//! The in-memory store and its transaction runner.
//!
//! All committed state lives behind one async mutex. Auto-commit handles
//! lock it per call. A transaction holds the lock for its whole duration
//! and works on a staged copy, which replaces the committed state only
//! when the operation returns `Ok`. Transactions are therefore fully
//! serialized, and a transaction that fails or is dropped midway leaves
//! nothing behind.
//!
//! Auto-commit handles must not be used from inside [`MemoryStore::begin_op`];
//! they would wait on the lock the transaction is holding.

use std::collections::BTreeMap;
use std::sync::Arc;

use bastion_core::clock::{Clock, SystemClock};
use bastion_core::error::BastionResult;
use bastion_core::models::{organization::Organization, user::User};
use bastion_core::repository::{Repositories, TransactionRunner};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::repository::{MemoryOrganizationRepository, MemoryUserRepository};

#[derive(Debug, Clone, Default)]
pub(crate) struct Tables {
    pub(crate) users: BTreeMap<Uuid, User>,
    pub(crate) organizations: BTreeMap<Uuid, Organization>,
}

pub(crate) type SharedTables = Arc<Mutex<Tables>>;

/// In-memory store.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct MemoryStore {
    tables: SharedTables,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Empty store stamping soft deletes with the wall clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Empty store stamping soft deletes with `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: Arc::new(Mutex::new(Tables::default())),
            clock,
        }
    }

    /// Auto-commit repositories: every call is its own transaction.
    pub fn repositories(&self) -> MemoryRepositories {
        MemoryRepositories::bound(self.tables.clone(), self.clock.clone())
    }

    pub fn users(&self) -> MemoryUserRepository {
        MemoryUserRepository::new(self.tables.clone(), self.clock.clone())
    }

    pub fn organizations(&self) -> MemoryOrganizationRepository {
        MemoryOrganizationRepository::new(self.tables.clone())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// User and organization repositories sharing one set of tables.
#[derive(Clone)]
pub struct MemoryRepositories {
    users: MemoryUserRepository,
    organizations: MemoryOrganizationRepository,
}

impl MemoryRepositories {
    fn bound(tables: SharedTables, clock: Arc<dyn Clock>) -> Self {
        Self {
            users: MemoryUserRepository::new(tables.clone(), clock),
            organizations: MemoryOrganizationRepository::new(tables),
        }
    }
}

impl Repositories for MemoryRepositories {
    type Users = MemoryUserRepository;
    type Organizations = MemoryOrganizationRepository;

    fn users(&self) -> &MemoryUserRepository {
        &self.users
    }

    fn organizations(&self) -> &MemoryOrganizationRepository {
        &self.organizations
    }
}

impl TransactionRunner for MemoryStore {
    type Repos = MemoryRepositories;

    async fn begin_op<T, F, Fut>(&self, op: F) -> BastionResult<T>
    where
        T: Send,
        F: FnOnce(Self::Repos) -> Fut + Send,
        Fut: Future<Output = BastionResult<T>> + Send,
    {
        let mut committed = self.tables.lock().await;
        let staged: SharedTables = Arc::new(Mutex::new(committed.clone()));
        let repos = MemoryRepositories::bound(staged.clone(), self.clock.clone());

        match op(repos).await {
            Ok(value) => {
                let mut staged = staged.lock().await;
                *committed = std::mem::take(&mut *staged);
                debug!("Transaction committed");
                Ok(value)
            }
            Err(err) => {
                debug!(error = %err, "Transaction rolled back");
                Err(err)
            }
        }
    }
}
