//! Search URL construction for the ANFR `records/1.0/search` endpoint.
//!
//! The endpoint expects its distance filter and repeated status filter in a
//! literal form: spaces as `%20` (never `+`) and commas unescaped. Parameters
//! are therefore encoded with a query-string set that keeps commas literal,
//! and the geo filter is appended verbatim after the encoded block.

use std::fmt::Write as _;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Page size requested from the API. Only the first page is ever read.
pub const PAGE_SIZE: u32 = 1000;

/// Antenna statuses counted as deployed.
pub const STATUS_FILTER: &[&str] = &["En service", "Techniquement opérationnel"];

const LANG: &str = "fr";

/// Unreserved query characters, plus `,` which the API needs literal.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b',');

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Antenna records; the total hit count is what matters.
    AntennaCount,
    /// Facet on the tower identifier; distinct `sup_id` values are counted.
    /// Operator and generation filters are ignored.
    TowerFacet,
    /// Tower facet restricted to the query's operator.
    OperatorTowerFacet,
}

/// One search against the record API. Fully determines the request URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchQuery<'a> {
    pub latitude: &'a str,
    pub longitude: &'a str,
    pub radius: u32,
    pub operator: Option<&'a str>,
    pub generation: Option<&'a str>,
    pub mode: QueryMode,
}

impl<'a> SearchQuery<'a> {
    /// Antenna count for one operator and generation.
    #[must_use]
    pub fn antennas(
        latitude: &'a str,
        longitude: &'a str,
        radius: u32,
        operator: &'a str,
        generation: &'a str,
    ) -> Self {
        Self {
            latitude,
            longitude,
            radius,
            operator: Some(operator),
            generation: Some(generation),
            mode: QueryMode::AntennaCount,
        }
    }

    /// Tower facet query. `operator` is carried for logging but never sent;
    /// use [`SearchQuery::operator_towers`] to filter on it.
    #[must_use]
    pub fn towers(
        latitude: &'a str,
        longitude: &'a str,
        radius: u32,
        operator: Option<&'a str>,
    ) -> Self {
        Self {
            latitude,
            longitude,
            radius,
            operator,
            generation: None,
            mode: QueryMode::TowerFacet,
        }
    }

    /// Tower facet query filtered to one operator.
    #[must_use]
    pub fn operator_towers(
        latitude: &'a str,
        longitude: &'a str,
        radius: u32,
        operator: &'a str,
    ) -> Self {
        Self {
            operator: Some(operator),
            mode: QueryMode::OperatorTowerFacet,
            ..Self::towers(latitude, longitude, radius, None)
        }
    }
}

/// Builds the full search URL for `query` against `base_url`.
///
/// Tower modes request `facet=sup_id` and never filter on generation. Plain
/// tower mode drops the operator too, so every tower query counts all
/// operators. Coordinates are not validated: whatever text the location
/// carries ends up in the geo filter.
#[must_use]
pub fn build_search_url(base_url: &str, dataset: &str, query: &SearchQuery<'_>) -> String {
    let rows = PAGE_SIZE.to_string();
    let mut params: Vec<(&str, &str)> = vec![("rows", &rows), ("dataset", dataset)];
    params.extend(STATUS_FILTER.iter().map(|s| ("refine.statut", *s)));
    params.push(("lang", LANG));

    match query.mode {
        QueryMode::TowerFacet => {
            params.push(("facet", crate::types::TOWER_ID_FIELD));
        }
        QueryMode::OperatorTowerFacet => {
            params.push(("facet", crate::types::TOWER_ID_FIELD));
            if let Some(op) = query.operator {
                params.push(("refine.adm_lb_nom", op));
            }
        }
        QueryMode::AntennaCount => {
            if let Some(op) = query.operator {
                params.push(("refine.adm_lb_nom", op));
            }
            if let Some(generation) = query.generation {
                params.push(("refine.generation", generation));
            }
        }
    }

    let mut url = String::with_capacity(256);
    url.push_str(base_url);
    url.push('?');
    for (i, (key, value)) in params.iter().enumerate() {
        if i > 0 {
            url.push('&');
        }
        let _ = write!(
            url,
            "{}={}",
            utf8_percent_encode(key, QUERY_VALUE),
            utf8_percent_encode(value, QUERY_VALUE)
        );
    }
    let _ = write!(
        url,
        "&geofilter.distance={},{},{}",
        query.latitude, query.longitude, query.radius
    );
    url
}
