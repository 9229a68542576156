//! Bastion Core: domain models, error taxonomy, repository traits and
//! the clock/identifier abstractions shared by every other crate.

pub mod clock;
pub mod error;
pub mod models;
pub mod repository;
pub mod validation;

pub use clock::{Clock, IdGenerator, RandomIdGenerator, SystemClock};
pub use error::{BastionError, BastionResult};
