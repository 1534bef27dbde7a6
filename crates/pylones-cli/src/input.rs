//! `;`-delimited input table reader.
//!
//! Rejects a table missing any of the required columns, and any row whose
//! field count differs from the header, before a single query is sent.

use std::io::Read;
use std::path::Path;

use anyhow::Context;
use pylones_core::{Location, COLUMN_CITY, COLUMN_DENSITY, COLUMN_LATITUDE, COLUMN_LONGITUDE};

pub(crate) const DELIMITER: u8 = b';';

/// Input header and its rows, read once and reused by every radius pass.
#[derive(Debug, Clone)]
pub(crate) struct InputTable {
    pub headers: Vec<String>,
    pub locations: Vec<Location>,
}

/// Read the input table at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or fails [`read_input_from`].
pub(crate) fn read_input(path: &Path) -> anyhow::Result<InputTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open input file {}", path.display()))?;
    read_input_from(file).with_context(|| format!("invalid input file {}", path.display()))
}

/// Read an input table from any reader.
///
/// # Errors
///
/// Returns an error if the header lacks a required column or a row is
/// malformed (wrong field count, invalid UTF-8).
pub(crate) fn read_input_from<R: Read>(reader: R) -> anyhow::Result<InputTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .context("failed to read input header")?
        .iter()
        .map(str::to_string)
        .collect();

    let column = |name: &str| -> anyhow::Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| anyhow::anyhow!("input is missing required column '{name}'"))
    };
    let city_idx = column(COLUMN_CITY)?;
    let lat_idx = column(COLUMN_LATITUDE)?;
    let lon_idx = column(COLUMN_LONGITUDE)?;
    let density_idx = column(COLUMN_DENSITY)?;

    let mut locations = Vec::new();
    for (i, record) in reader.records().enumerate() {
        // Line 1 is the header.
        let record = record.with_context(|| format!("malformed input row at line {}", i + 2))?;
        let fields: Vec<String> = record.iter().map(str::to_string).collect();
        locations.push(Location {
            name: fields[city_idx].clone(),
            latitude: fields[lat_idx].trim().to_string(),
            longitude: fields[lon_idx].trim().to_string(),
            density: fields[density_idx].clone(),
            fields,
        });
    }

    tracing::debug!(
        rows = locations.len(),
        columns = headers.len(),
        "input table loaded"
    );

    Ok(InputTable { headers, locations })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "VILLE;CODE;LATITUDE;LONGITUDE;DENSITÉ\n\
                          PARIS;75056;48.8566;2.3522;dense\n\
                          LYON;69123; 45.7640 ;4.8357;intermédiaire\n";

    #[test]
    fn reads_rows_and_keeps_column_order() {
        let table = read_input_from(SAMPLE.as_bytes()).unwrap();
        assert_eq!(
            table.headers,
            vec!["VILLE", "CODE", "LATITUDE", "LONGITUDE", "DENSITÉ"]
        );
        assert_eq!(table.locations.len(), 2);
        let paris = &table.locations[0];
        assert_eq!(paris.name, "PARIS");
        assert_eq!(paris.latitude, "48.8566");
        assert_eq!(paris.longitude, "2.3522");
        assert_eq!(paris.density, "dense");
        assert_eq!(paris.fields, vec!["PARIS", "75056", "48.8566", "2.3522", "dense"]);
    }

    #[test]
    fn coordinates_are_trimmed_but_fields_are_verbatim() {
        let table = read_input_from(SAMPLE.as_bytes()).unwrap();
        let lyon = &table.locations[1];
        assert_eq!(lyon.latitude, "45.7640");
        assert_eq!(lyon.fields[2], " 45.7640 ");
        assert_eq!(lyon.density, "intermédiaire");
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let input = "VILLE;LATITUDE;LONGITUDE\nPARIS;48.8;2.3\n";
        let err = read_input_from(input.as_bytes()).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("DENSITÉ"), "error should name the column, got: {msg}");
    }

    #[test]
    fn row_with_wrong_field_count_is_rejected() {
        let input = "VILLE;LATITUDE;LONGITUDE;DENSITÉ\nPARIS;48.8;2.3;dense\nLYON;45.7\n";
        let err = read_input_from(input.as_bytes()).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("line 3"), "error should carry the line, got: {msg}");
    }

    #[test]
    fn header_only_table_has_no_rows() {
        let table = read_input_from("VILLE;LATITUDE;LONGITUDE;DENSITÉ\n".as_bytes()).unwrap();
        assert!(table.locations.is_empty());
        assert_eq!(table.headers.len(), 4);
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = read_input(Path::new("/nonexistent/entree.csv")).unwrap_err();
        assert!(format!("{err}").contains("/nonexistent/entree.csv"));
    }
}
