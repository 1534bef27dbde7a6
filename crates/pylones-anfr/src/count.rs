//! Scalar counts derived from a [`FetchResult`].
//!
//! Both counters map a failed fetch to [`Count::Unavailable`], whose value is
//! zero. Callers that need to tell "the API said zero" from "the API never
//! answered" inspect the variant; the default report does not.

use std::collections::HashSet;

use pylones_core::Count;

use crate::types::FetchResult;

/// The API-reported total hit count, regardless of how many records the page
/// actually carried.
#[must_use]
pub fn count_hits(result: &FetchResult) -> Count {
    match result {
        FetchResult::Success { total_hits, .. } => Count::Known(*total_hits),
        FetchResult::Failure { .. } => Count::Unavailable,
    }
}

/// Number of distinct tower identifiers among the returned records.
///
/// Records without a `sup_id` are skipped.
#[must_use]
pub fn count_unique_towers(result: &FetchResult) -> Count {
    match result {
        FetchResult::Success { records, .. } => {
            let towers: HashSet<String> = records.iter().filter_map(|r| r.tower_id()).collect();
            Count::Known(u64::try_from(towers.len()).unwrap_or(u64::MAX))
        }
        FetchResult::Failure { .. } => Count::Unavailable,
    }
}
