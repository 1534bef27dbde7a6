use serde::Deserialize;

/// Record field carrying the tower (support) identifier.
pub const TOWER_ID_FIELD: &str = "sup_id";

/// JSON envelope returned by `records/1.0/search`.
///
/// Only the fields read by the counters are modelled; facet groups and
/// parameters echoed by the API are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct RecordEnvelope {
    pub nhits: u64,
    #[serde(default)]
    pub records: Vec<ApiRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiRecord {
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl ApiRecord {
    /// The record's tower identifier, if present.
    ///
    /// The API serves `sup_id` as a number; string identifiers are accepted
    /// too so both compare by their textual form.
    #[must_use]
    pub fn tower_id(&self) -> Option<String> {
        match self.fields.get(TOWER_ID_FIELD)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Outcome of a fetch after every attempt has been spent.
#[derive(Debug, Clone)]
pub enum FetchResult {
    Success {
        records: Vec<ApiRecord>,
        total_hits: u64,
    },
    Failure {
        reason: String,
    },
}

impl FetchResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success { .. })
    }
}

impl From<RecordEnvelope> for FetchResult {
    fn from(envelope: RecordEnvelope) -> Self {
        FetchResult::Success {
            records: envelope.records,
            total_hits: envelope.nhits,
        }
    }
}
