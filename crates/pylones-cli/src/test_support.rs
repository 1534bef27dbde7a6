//! Fixtures shared by the census tests: a context wired to a wiremock
//! server, canned ANFR responses, and report parsing.

use pylones_anfr::{AnfrClient, RetryPolicy};
use pylones_core::{Catalog, Location};
use serde_json::json;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::census::CensusContext;
use crate::input::InputTable;

pub(crate) const HEADERS: &[&str] = &["VILLE", "LATITUDE", "LONGITUDE", "DENSITÉ", "INSEE"];

pub(crate) fn test_client(server: &MockServer) -> AnfrClient {
    AnfrClient::with_base_url(
        &format!("{}/search/", server.uri()),
        "observatoire_2g_3g_4g",
        5,
        "pylones-test/0.1",
        RetryPolicy::default(),
    )
    .expect("client construction should not fail")
}

pub(crate) fn test_context(server: &MockServer) -> CensusContext {
    CensusContext::new(test_client(server), Catalog::default())
}

pub(crate) fn location(name: &str, lat: &str, lon: &str) -> Location {
    Location {
        name: name.to_string(),
        latitude: lat.to_string(),
        longitude: lon.to_string(),
        density: "dense".to_string(),
        fields: vec![
            name.to_string(),
            lat.to_string(),
            lon.to_string(),
            "dense".to_string(),
            format!("{name}-code"),
        ],
    }
}

pub(crate) fn table(locations: Vec<Location>) -> InputTable {
    InputTable {
        headers: HEADERS.iter().map(|h| (*h).to_string()).collect(),
        locations,
    }
}

/// Body returned for tower facet queries: `ids` as records, with duplicates
/// kept.
pub(crate) fn towers_body(ids: &[u64]) -> serde_json::Value {
    let records: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| json!({"fields": {"sup_id": id}}))
        .collect();
    json!({"nhits": ids.len(), "records": records})
}

/// Mounts a catch-all: tower facet queries get `tower_ids`, every other query
/// reports `antenna_hits`. Mount more specific mocks before calling this.
pub(crate) async fn mount_defaults(server: &MockServer, antenna_hits: u64, tower_ids: &[u64]) {
    Mock::given(method("GET"))
        .and(query_param("facet", "sup_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(towers_body(tower_ids)))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"nhits": antenna_hits, "records": []})),
        )
        .mount(server)
        .await;
}

/// Parses a `;`-delimited report, header included, into rows of cells.
pub(crate) fn parse_report(bytes: &[u8]) -> Vec<Vec<String>> {
    csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_reader(bytes)
        .records()
        .map(|r| {
            r.expect("report row should parse")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}
