//! Result ordering and pagination.

use std::cmp::Ordering;

use resfind_core::{Resource, SortBy};

/// The sort mode actually applied to a search.
///
/// When the caller supplied a location, `Relevance` is silently promoted to
/// `Distance`. Existing clients depend on this; an explicit
/// "distance-if-available" mode would be the cleaner contract.
#[must_use]
pub fn effective_sort(requested: SortBy, has_location: bool) -> SortBy {
    match requested {
        SortBy::Relevance if has_location => SortBy::Distance,
        other => other,
    }
}

/// Sorts in place. All modes are stable.
///
/// - `Distance`: ascending; unknown distances trail, keeping upstream order.
/// - `Name`: case-folded comparison, ties broken by the exact name.
/// - `Relevance`: upstream order, untouched.
pub fn sort_resources(resources: &mut [Resource], sort_by: SortBy) {
    match sort_by {
        SortBy::Relevance => {}
        SortBy::Distance => resources.sort_by(|a, b| by_distance(a.distance_miles, b.distance_miles)),
        SortBy::Name => resources.sort_by(|a, b| by_name(&a.name, &b.name)),
    }
}

fn by_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-insensitive, then lowercase before uppercase for names that differ
/// only in case, matching the usual locale collation order.
fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Applies `offset` then `limit` to an already sorted list.
#[must_use]
pub fn paginate(resources: Vec<Resource>, offset: usize, limit: Option<usize>) -> Vec<Resource> {
    let iter = resources.into_iter().skip(offset);
    match limit {
        Some(limit) => iter.take(limit).collect(),
        None => iter.collect(),
    }
}
