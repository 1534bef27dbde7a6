use futures::stream::{self, StreamExt};
use pylones_anfr::{count_hits, count_unique_towers, FetchResult, SearchQuery};
use pylones_core::{AggregatedRow, Catalog, Count, Location};

use super::CensusContext;

/// How a fetched result turns into a count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Tally {
    Hits,
    UniqueTowers,
}

impl Tally {
    fn apply(self, result: &FetchResult) -> Count {
        match self {
            Tally::Hits => count_hits(result),
            Tally::UniqueTowers => count_unique_towers(result),
        }
    }
}

/// One sub-query of a row and the derived slot it fills.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlannedQuery<'a> {
    pub slot: usize,
    pub query: SearchQuery<'a>,
    pub tally: Tally,
}

/// Sub-queries for `location`, in issue order: per operator its tower query
/// then one antenna query per generation, and finally the all-operator tower
/// query.
///
/// Per-operator tower queries only carry the operator refinement when
/// `operator_towers` is set; otherwise they count every operator's towers.
pub(crate) fn plan_row<'a>(
    catalog: &'a Catalog,
    location: &'a Location,
    radius: u32,
    operator_towers: bool,
) -> Vec<PlannedQuery<'a>> {
    let lat = location.latitude.as_str();
    let lon = location.longitude.as_str();
    let mut plan = Vec::with_capacity(catalog.derived_len());

    for (op_idx, op) in catalog.operators().iter().enumerate() {
        plan.push(PlannedQuery {
            slot: catalog.operator_tower_slot(op_idx),
            query: if operator_towers {
                SearchQuery::operator_towers(lat, lon, radius, op)
            } else {
                SearchQuery::towers(lat, lon, radius, Some(op.as_str()))
            },
            tally: Tally::UniqueTowers,
        });
        for (gen_idx, generation) in catalog.generations().iter().enumerate() {
            plan.push(PlannedQuery {
                slot: catalog.antenna_slot(op_idx, gen_idx),
                query: SearchQuery::antennas(lat, lon, radius, op, generation),
                tally: Tally::Hits,
            });
        }
    }

    plan.push(PlannedQuery {
        slot: catalog.all_towers_slot(),
        query: SearchQuery::towers(lat, lon, radius, None),
        tally: Tally::UniqueTowers,
    });
    plan
}

/// Run every sub-query for `location` and merge the counts into one row.
///
/// Never fails: a sub-query whose fetch fails leaves its slot unavailable.
/// Sub-queries run `ctx.row_concurrency` at a time, sequentially by default.
pub(crate) async fn process_row(
    ctx: &CensusContext,
    location: &Location,
    radius: u32,
) -> AggregatedRow {
    let plan = plan_row(&ctx.catalog, location, radius, ctx.tower_operator_filter);
    let client = &ctx.client;

    let counts: Vec<(usize, Count)> = stream::iter(plan)
        .map(|planned| async move {
            let result = client.search(&planned.query).await;
            let count = planned.tally.apply(&result);
            tracing::debug!(
                city = %location.name,
                operator = planned.query.operator.unwrap_or("*"),
                generation = planned.query.generation.unwrap_or("-"),
                tally = ?planned.tally,
                count = ?count,
                "sub-query counted"
            );
            (planned.slot, count)
        })
        .buffered(ctx.row_concurrency.max(1))
        .collect()
        .await;

    let mut row = AggregatedRow::for_location(location, ctx.catalog.derived_len());
    for (slot, count) in counts {
        row.set(slot, count);
    }

    tracing::info!(
        city = %location.name,
        density = %location.density,
        radius,
        unavailable = row.unavailable_count(),
        "row processed"
    );
    row
}

#[cfg(test)]
#[path = "row_test.rs"]
mod tests;
