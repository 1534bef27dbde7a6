use std::path::PathBuf;

use crate::catalog::Catalog;

/// Delay strategy applied between two fetch attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Retry immediately.
    None,
    /// Sleep `delay_ms` before every retry.
    Fixed { delay_ms: u64 },
    /// Sleep `base_ms * 2^(retry - 1)` with ±25 % jitter, capped at 60 s.
    Exponential { base_ms: u64 },
}

impl std::fmt::Display for Backoff {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backoff::None => write!(f, "none"),
            Backoff::Fixed { delay_ms } => write!(f, "fixed({delay_ms}ms)"),
            Backoff::Exponential { base_ms } => write!(f, "exponential({base_ms}ms)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub output_prefix: String,
    pub radii: Vec<u32>,
    pub api_base_url: String,
    pub dataset: String,
    pub workers: usize,
    pub row_concurrency: usize,
    pub max_attempts: u32,
    pub backoff: Backoff,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub catalog: Catalog,
    pub strict: bool,
    pub preserve_order: bool,
    /// Restrict each per-operator tower count to that operator's antennas.
    pub tower_operator_filter: bool,
    pub log_level: String,
}

impl AppConfig {
    /// Output file for one radius pass, e.g. `./sortie_1500.csv`.
    #[must_use]
    pub fn output_path(&self, radius: u32) -> PathBuf {
        self.output_dir
            .join(format!("{}_{radius}.csv", self.output_prefix))
    }
}
