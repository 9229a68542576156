//! Domain models for Bastion.
//!
//! One type per entity, shared by the pipelines and by storage.

pub mod organization;
pub mod user;
