//! In-memory repository implementations.

mod organization;
mod user;

pub use organization::MemoryOrganizationRepository;
pub use user::MemoryUserRepository;

use std::cmp::Ordering;

use bastion_core::repository::{PaginatedResult, Pagination, Sort, SortDirection};

/// Stable multi-key sort followed by offset/limit.
fn paginate<T, F: Copy>(
    mut items: Vec<T>,
    pagination: &Pagination,
    order_by: &[Sort<F>],
    compare: impl Fn(&T, &T, F) -> Ordering,
) -> PaginatedResult<T> {
    items.sort_by(|a, b| {
        order_by.iter().fold(Ordering::Equal, |acc, sort| {
            acc.then_with(|| {
                let ordering = compare(a, b, sort.field);
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            })
        })
    });

    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(pagination.offset as usize)
        .take(pagination.limit as usize)
        .collect();

    PaginatedResult {
        items,
        total,
        offset: pagination.offset,
        limit: pagination.limit,
    }
}
