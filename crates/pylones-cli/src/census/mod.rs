//! Antenna and tower census over an input table.
//!
//! For each configured radius the driver runs one batch pass: every input
//! location is expanded into its operator/generation queries by
//! [`row::process_row`], rows are fanned out over a bounded pool by
//! [`batch::run_batch`], and the results land in one report file per radius.
//! Fetch failures degrade to unavailable counts; only I/O on the report files
//! can abort a run.

mod batch;
mod row;

use std::path::PathBuf;

use pylones_anfr::{AnfrClient, RetryPolicy};
use pylones_core::{AppConfig, Catalog};

use crate::input::InputTable;
use crate::output::ReportWriter;

pub(crate) use batch::{run_batch, BatchSummary};
pub(crate) use row::{plan_row, process_row};

/// Everything a radius pass needs besides the input rows.
#[derive(Debug, Clone)]
pub(crate) struct CensusContext {
    pub client: AnfrClient,
    pub catalog: Catalog,
    /// Rows processed concurrently.
    pub workers: usize,
    /// Sub-queries of one row in flight at once; 1 keeps them sequential.
    pub row_concurrency: usize,
    pub preserve_order: bool,
    /// Send the operator refinement on per-operator tower queries.
    pub tower_operator_filter: bool,
}

impl CensusContext {
    pub(crate) fn new(client: AnfrClient, catalog: Catalog) -> Self {
        Self {
            client,
            catalog,
            workers: 5,
            row_concurrency: 1,
            preserve_order: false,
            tower_operator_filter: false,
        }
    }

    /// Build the context, including the HTTP client, from configuration.
    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let retry = RetryPolicy::new(config.max_attempts, config.backoff);
        let client = AnfrClient::with_base_url(
            &config.api_base_url,
            &config.dataset,
            config.request_timeout_secs,
            &config.user_agent,
            retry,
        )
        .map_err(|e| anyhow::anyhow!("failed to build ANFR client: {e}"))?;

        let mut ctx = Self::new(client, config.catalog.clone());
        ctx.workers = config.workers.max(1);
        ctx.row_concurrency = config.row_concurrency.max(1);
        ctx.preserve_order = config.preserve_order;
        ctx.tower_operator_filter = config.tower_operator_filter;
        Ok(ctx)
    }

    /// Number of API requests issued for one row.
    pub(crate) fn queries_per_row(&self) -> usize {
        let operators = self.catalog.operators().len();
        1 + operators * (1 + self.catalog.generations().len())
    }
}

/// Run one pass per radius, writing each report to `output_path(radius)`.
///
/// # Errors
///
/// Returns an error if a report file cannot be created or written. Fetch
/// failures never surface here.
pub(crate) async fn run_census<P>(
    ctx: &CensusContext,
    table: &InputTable,
    radii: &[u32],
    strict: bool,
    output_path: P,
) -> anyhow::Result<Vec<(PathBuf, BatchSummary)>>
where
    P: Fn(u32) -> PathBuf,
{
    let mut reports = Vec::with_capacity(radii.len());

    for &radius in radii {
        let path = output_path(radius);
        tracing::info!(
            radius,
            rows = table.locations.len(),
            output = %path.display(),
            "processing radius"
        );

        let mut writer = ReportWriter::create(&path, strict)?;
        let summary = run_batch(ctx, table, radius, &mut writer).await?;

        if summary.unavailable_counts > 0 {
            tracing::warn!(
                radius,
                unavailable = summary.unavailable_counts,
                rows_affected = summary.rows_with_unavailable,
                "some counts could not be fetched and were written as {}",
                if strict { "NA" } else { "0" }
            );
        }
        tracing::info!(radius, rows = summary.rows, "radius complete");

        reports.push((path, summary));
    }

    tracing::info!(passes = reports.len(), "census complete for every radius");
    Ok(reports)
}

/// Print what a run would do without sending any request.
pub(crate) fn describe_plan(config: &AppConfig, ctx: &CensusContext, table: &InputTable) {
    let per_row = ctx.queries_per_row();
    println!(
        "dry-run: {} row(s) from {}, {} queries per row, {} worker(s)",
        table.locations.len(),
        config.input_path.display(),
        per_row,
        ctx.workers
    );
    for &radius in &config.radii {
        println!(
            "  radius {radius:>6} m -> {} ({} requests)",
            config.output_path(radius).display(),
            per_row * table.locations.len()
        );
    }
    if let (Some(location), Some(&radius)) = (table.locations.first(), config.radii.first()) {
        println!("  first row ({}) queries:", location.name);
        for planned in plan_row(&ctx.catalog, location, radius, ctx.tower_operator_filter) {
            println!("    {}", ctx.client.search_url(&planned.query));
        }
    }
}

#[cfg(test)]
#[path = "census_test.rs"]
mod tests;
