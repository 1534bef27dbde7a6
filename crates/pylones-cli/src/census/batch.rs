use std::io::Write;

use futures::stream::{self, StreamExt};
use pylones_core::AggregatedRow;

use super::{process_row, CensusContext};
use crate::input::InputTable;
use crate::output::ReportWriter;

/// What one radius pass produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct BatchSummary {
    pub rows: usize,
    /// Derived counts whose fetch failed on every attempt.
    pub unavailable_counts: usize,
    pub rows_with_unavailable: usize,
}

impl BatchSummary {
    fn record(&mut self, row: &AggregatedRow) {
        let unavailable = row.unavailable_count();
        self.rows += 1;
        self.unavailable_counts += unavailable;
        if unavailable > 0 {
            self.rows_with_unavailable += 1;
        }
    }
}

/// Process every row of `table` for `radius` and write the report.
///
/// The header (input columns, then the catalog's derived columns) is written
/// first. Rows are processed `ctx.workers` at a time and written by this
/// function alone, as they complete, or in input order when
/// `ctx.preserve_order` is set.
///
/// # Errors
///
/// Returns an error only if writing to `writer` fails.
pub(crate) async fn run_batch<W: Write>(
    ctx: &CensusContext,
    table: &InputTable,
    radius: u32,
    writer: &mut ReportWriter<W>,
) -> anyhow::Result<BatchSummary> {
    let mut header = table.headers.clone();
    header.extend(ctx.catalog.derived_columns());
    writer.write_header(&header)?;

    let workers = ctx.workers.max(1);
    let rows = stream::iter(&table.locations).map(|location| process_row(ctx, location, radius));
    let mut completed = if ctx.preserve_order {
        rows.buffered(workers).boxed_local()
    } else {
        rows.buffer_unordered(workers).boxed_local()
    };

    let mut summary = BatchSummary::default();
    while let Some(row) = completed.next().await {
        writer.write_row(&row)?;
        summary.record(&row);
        tracing::debug!(
            radius,
            written = writer.rows_written(),
            total = table.locations.len(),
            "report row written"
        );
    }
    writer.flush()?;

    Ok(summary)
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;
