use std::path::PathBuf;

use crate::app_config::{AppConfig, Backoff};
use crate::catalog::Catalog;
use crate::ConfigError;

const DEFAULT_API_BASE_URL: &str = "https://data.anfr.fr/d4c/api/records/1.0/search/";
const DEFAULT_DATASET: &str = "observatoire_2g_3g_4g";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a variable holds an invalid value.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; decoupling the lookup keeps parsing testable
/// with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .trim()
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let value = or_default(var, default)
            .trim()
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value == 0 {
            return Err(invalid(var, "must be at least 1".to_string()));
        }
        Ok(value)
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_flag(&or_default(var, default)).ok_or_else(|| {
            invalid(var, "expected one of true/false/1/0/yes/no".to_string())
        })
    };

    let input_path = PathBuf::from(or_default("PYLONES_INPUT_PATH", "entree.csv"));
    let output_dir = PathBuf::from(or_default("PYLONES_OUTPUT_DIR", "."));
    let output_prefix = or_default("PYLONES_OUTPUT_PREFIX", "sortie");
    let radii = parse_radii(&or_default("PYLONES_RADII", "1500,2500,5000"))
        .map_err(|reason| invalid("PYLONES_RADII", reason))?;

    let api_base_url = or_default("PYLONES_API_BASE_URL", DEFAULT_API_BASE_URL);
    let dataset = or_default("PYLONES_DATASET", DEFAULT_DATASET);

    let workers = parse_positive_usize("PYLONES_WORKERS", "5")?;
    let row_concurrency = parse_positive_usize("PYLONES_ROW_CONCURRENCY", "1")?;

    let max_attempts = parse_u32("PYLONES_MAX_ATTEMPTS", "3")?;
    if max_attempts == 0 {
        return Err(invalid(
            "PYLONES_MAX_ATTEMPTS",
            "must be at least 1".to_string(),
        ));
    }
    let retry_delay_ms = parse_u64("PYLONES_RETRY_DELAY_MS", "0")?;
    let backoff = parse_backoff(&or_default("PYLONES_RETRY_BACKOFF", "none"), retry_delay_ms)
        .map_err(|reason| invalid("PYLONES_RETRY_BACKOFF", reason))?;

    let request_timeout_secs = parse_u64("PYLONES_REQUEST_TIMEOUT_SECS", "60")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "PYLONES_REQUEST_TIMEOUT_SECS",
            "must be at least 1".to_string(),
        ));
    }
    let user_agent = or_default("PYLONES_USER_AGENT", "pylones/0.1 (antenna-census)");

    let catalog = match (lookup("PYLONES_OPERATORS"), lookup("PYLONES_GENERATIONS")) {
        (Err(_), Err(_)) => Catalog::default(),
        (operators, generations) => {
            let defaults = Catalog::default();
            let operators = operators
                .map(|raw| split_list(&raw))
                .unwrap_or_else(|_| defaults.operators().to_vec());
            let generations = generations
                .map(|raw| split_list(&raw))
                .unwrap_or_else(|_| defaults.generations().to_vec());
            Catalog::new(operators, generations)?
        }
    };

    let strict = parse_bool("PYLONES_STRICT", "false")?;
    let preserve_order = parse_bool("PYLONES_PRESERVE_ORDER", "false")?;
    let tower_operator_filter = parse_bool("PYLONES_TOWER_OPERATOR_FILTER", "false")?;
    let log_level = or_default("PYLONES_LOG_LEVEL", "info");

    Ok(AppConfig {
        input_path,
        output_dir,
        output_prefix,
        radii,
        api_base_url,
        dataset,
        workers,
        row_concurrency,
        max_attempts,
        backoff,
        request_timeout_secs,
        user_agent,
        catalog,
        strict,
        preserve_order,
        tower_operator_filter,
        log_level,
    })
}

/// Parse a comma-separated list of radii in metres.
fn parse_radii(raw: &str) -> Result<Vec<u32>, String> {
    let radii = split_list(raw)
        .iter()
        .map(|r| {
            r.parse::<u32>()
                .map_err(|e| format!("invalid radius '{r}': {e}"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if radii.is_empty() {
        return Err("at least one radius is required".to_string());
    }
    if radii.contains(&0) {
        return Err("radius must be greater than zero".to_string());
    }
    Ok(radii)
}

/// Parse a backoff strategy name. `delay_ms` feeds both `fixed` and
/// `exponential`.
fn parse_backoff(raw: &str, delay_ms: u64) -> Result<Backoff, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "none" => Ok(Backoff::None),
        "fixed" => Ok(Backoff::Fixed { delay_ms }),
        "exponential" => Ok(Backoff::Exponential { base_ms: delay_ms }),
        other => Err(format!(
            "unknown backoff '{other}'; expected none, fixed or exponential"
        )),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" | "" => Some(false),
        _ => None,
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
