//! Bastion DB: in-memory transactional store and repository
//! implementations.
//!
//! This crate provides:
//! - The store and its transaction runner ([`MemoryStore`])
//! - Repository implementations for the `bastion-core` traits
//!   ([`repository`])
//! - Error types ([`DbError`])

mod error;
pub mod repository;
mod store;

pub use error::DbError;
pub use store::{MemoryRepositories, MemoryStore};
