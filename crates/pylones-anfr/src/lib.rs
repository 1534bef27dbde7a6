pub mod client;
pub mod count;
pub mod error;
pub mod query;
pub mod retry;
pub mod types;

pub use client::AnfrClient;
pub use count::{count_hits, count_unique_towers};
pub use error::AnfrError;
pub use query::{build_search_url, QueryMode, SearchQuery};
pub use retry::RetryPolicy;
pub use types::{ApiRecord, FetchResult, RecordEnvelope, TOWER_ID_FIELD};
