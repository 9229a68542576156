//! Time and identifier sources.
//!
//! Every pipeline reads the current time and generates identifiers
//! through these traits so tests can pin both. Plain closures implement
//! them, e.g. `Arc::new(move || fixed_time) as Arc<dyn Clock>`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of the current time, always in UTC.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Source of fresh, unique identifiers.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> Uuid;
}

impl<F> IdGenerator for F
where
    F: Fn() -> Uuid + Send + Sync,
{
    fn generate(&self) -> Uuid {
        self()
    }
}

/// Random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> Uuid {
        Uuid::new_v4()
    }
}
