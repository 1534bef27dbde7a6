mod census;
mod input;
mod output;

#[cfg(test)]
mod test_support;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use pylones_anfr::{build_search_url, QueryMode, SearchQuery};
use pylones_core::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "pylones")]
#[command(about = "Count cellular antennas and towers around municipalities from ANFR open data")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the census once per configured radius (default command).
    Run(RunArgs),
    /// Print the search URL for a single query.
    Url(UrlArgs),
}

#[derive(Debug, Default, Args, PartialEq, Eq)]
struct RunArgs {
    /// Input table (`;`-delimited). Overrides `PYLONES_INPUT_PATH`.
    #[arg(long)]
    input: Option<PathBuf>,
    /// Directory receiving one report per radius.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Search radius in metres; repeat for several passes.
    #[arg(long = "radius")]
    radii: Vec<u32>,
    /// Rows processed concurrently.
    #[arg(long)]
    workers: Option<usize>,
    /// Write `NA` instead of `0` for counts that could not be fetched.
    #[arg(long)]
    strict: bool,
    /// Write report rows in input order.
    #[arg(long)]
    preserve_order: bool,
    /// Restrict `PYLONES <operator>` counts to that operator's towers.
    #[arg(long)]
    tower_operator_filter: bool,
    /// Print the planned passes and first-row URLs without querying.
    #[arg(long)]
    dry_run: bool,
}

impl RunArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(input) = &self.input {
            config.input_path.clone_from(input);
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir.clone_from(dir);
        }
        if !self.radii.is_empty() {
            config.radii.clone_from(&self.radii);
        }
        if let Some(workers) = self.workers {
            config.workers = workers.max(1);
        }
        config.strict |= self.strict;
        config.preserve_order |= self.preserve_order;
        config.tower_operator_filter |= self.tower_operator_filter;
    }
}

#[derive(Debug, Args, PartialEq, Eq)]
struct UrlArgs {
    #[arg(long, allow_hyphen_values = true)]
    lat: String,
    #[arg(long, allow_hyphen_values = true)]
    lon: String,
    #[arg(long)]
    radius: u32,
    #[arg(long)]
    operator: Option<String>,
    #[arg(long)]
    generation: Option<String>,
    /// Build a tower facet query instead of an antenna count query.
    #[arg(long)]
    towers: bool,
    /// Keep `--operator` on a tower query.
    #[arg(long, requires = "towers")]
    tower_operator_filter: bool,
}

impl UrlArgs {
    fn query(&self) -> SearchQuery<'_> {
        if let (true, Some(op)) = (self.tower_operator_filter, self.operator.as_deref()) {
            return SearchQuery::operator_towers(&self.lat, &self.lon, self.radius, op);
        }
        SearchQuery {
            latitude: &self.lat,
            longitude: &self.lon,
            radius: self.radius,
            operator: self.operator.as_deref(),
            generation: self.generation.as_deref(),
            mode: if self.towers {
                QueryMode::TowerFacet
            } else {
                QueryMode::AntennaCount
            },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let mut config = pylones_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Url(args)) => {
            println!(
                "{}",
                build_search_url(&config.api_base_url, &config.dataset, &args.query())
            );
            Ok(())
        }
        Some(Commands::Run(args)) => {
            args.apply(&mut config);
            run(&config, args.dry_run).await
        }
        None => run(&config, false).await,
    }
}

async fn run(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    tracing::debug!(?config, "configuration loaded");
    let table = input::read_input(&config.input_path)?;
    let ctx = census::CensusContext::from_config(config)?;

    if dry_run {
        census::describe_plan(config, &ctx, &table);
        return Ok(());
    }

    tracing::info!(
        rows = table.locations.len(),
        radii = ?config.radii,
        workers = ctx.workers,
        max_attempts = config.max_attempts,
        backoff = %config.backoff,
        "starting census"
    );

    let reports = census::run_census(&ctx, &table, &config.radii, config.strict, |radius| {
        config.output_path(radius)
    })
    .await?;

    for (path, summary) in &reports {
        println!(
            "  \u{2713} {:<30} {:>5} rows  ({} unavailable counts)",
            path.display(),
            summary.rows,
            summary.unavailable_counts
        );
    }
    Ok(())
}
