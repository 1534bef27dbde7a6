pub mod app_config;
pub mod catalog;
pub mod config;
pub mod location;

pub use app_config::{AppConfig, Backoff};
pub use catalog::{Catalog, ALL_OPERATORS_TOWER_COLUMN, TOWER_COLUMN_PREFIX};
pub use config::{load_app_config, load_app_config_from_env};
pub use location::{
    AggregatedRow, Count, Location, COLUMN_CITY, COLUMN_DENSITY, COLUMN_LATITUDE,
    COLUMN_LONGITUDE, REQUIRED_COLUMNS,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("invalid operator/generation catalog: {0}")]
    InvalidCatalog(String),
}
