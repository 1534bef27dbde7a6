/// Input column holding the municipality name.
pub const COLUMN_CITY: &str = "VILLE";
pub const COLUMN_LATITUDE: &str = "LATITUDE";
pub const COLUMN_LONGITUDE: &str = "LONGITUDE";
/// Density class; passed through untouched.
pub const COLUMN_DENSITY: &str = "DENSITÉ";

/// Columns every input table must carry.
pub const REQUIRED_COLUMNS: &[&str] = &[
    COLUMN_CITY,
    COLUMN_LATITUDE,
    COLUMN_LONGITUDE,
    COLUMN_DENSITY,
];

/// Marker written for unavailable counts in strict mode.
const UNAVAILABLE_MARKER: &str = "NA";

/// One input row.
///
/// `latitude` and `longitude` keep the verbatim input text: they are only
/// ever spliced into the geo filter, never parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: String,
    pub latitude: String,
    pub longitude: String,
    pub density: String,
    /// Every input value, in input column order.
    pub fields: Vec<String>,
}

/// A derived count.
///
/// `Unavailable` marks a count whose fetch failed after every attempt. It is
/// worth zero: by default it renders exactly like `Known(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Known(u64),
    Unavailable,
}

impl Count {
    /// Numeric value, with `Unavailable` collapsed to `0`.
    #[must_use]
    pub fn value(self) -> u64 {
        match self {
            Count::Known(n) => n,
            Count::Unavailable => 0,
        }
    }

    #[must_use]
    pub fn is_unavailable(self) -> bool {
        matches!(self, Count::Unavailable)
    }

    /// Output cell text. `strict` renders `Unavailable` as `NA` instead of `0`.
    #[must_use]
    pub fn render(self, strict: bool) -> String {
        match self {
            Count::Unavailable if strict => UNAVAILABLE_MARKER.to_string(),
            other => other.value().to_string(),
        }
    }
}

/// A location's input fields followed by its derived counts, addressed by
/// [`Catalog`](crate::Catalog) slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedRow {
    fields: Vec<String>,
    counts: Vec<Count>,
}

impl AggregatedRow {
    /// Starts a row for `location` with `derived_len` slots, all unavailable
    /// until set.
    #[must_use]
    pub fn for_location(location: &Location, derived_len: usize) -> Self {
        Self {
            fields: location.fields.clone(),
            counts: vec![Count::Unavailable; derived_len],
        }
    }

    /// Stores `count` in `slot`. Out-of-range slots are ignored.
    pub fn set(&mut self, slot: usize, count: Count) {
        if let Some(cell) = self.counts.get_mut(slot) {
            *cell = count;
        }
    }

    #[must_use]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    #[must_use]
    pub fn counts(&self) -> &[Count] {
        &self.counts
    }

    #[must_use]
    pub fn unavailable_count(&self) -> usize {
        self.counts.iter().filter(|c| c.is_unavailable()).count()
    }

    /// Flattens the row into output cells: input fields, then counts.
    #[must_use]
    pub fn to_record(&self, strict: bool) -> Vec<String> {
        self.fields
            .iter()
            .cloned()
            .chain(self.counts.iter().map(|c| c.render(strict)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> Location {
        Location {
            name: "PARIS".to_string(),
            latitude: "48.8566".to_string(),
            longitude: "2.3522".to_string(),
            density: "dense".to_string(),
            fields: vec![
                "PARIS".to_string(),
                "48.8566".to_string(),
                "2.3522".to_string(),
                "dense".to_string(),
                "75".to_string(),
            ],
        }
    }

    #[test]
    fn unavailable_collapses_to_zero_by_default() {
        assert_eq!(Count::Unavailable.value(), 0);
        assert_eq!(Count::Unavailable.render(false), "0");
        assert_eq!(Count::Known(0).render(false), "0");
    }

    #[test]
    fn strict_render_marks_unavailable() {
        assert_eq!(Count::Unavailable.render(true), "NA");
        assert_eq!(Count::Known(0).render(true), "0");
        assert_eq!(Count::Known(42).render(true), "42");
    }

    #[test]
    fn new_row_starts_fully_unavailable() {
        let row = AggregatedRow::for_location(&paris(), 3);
        assert_eq!(row.counts(), &[Count::Unavailable; 3]);
        assert_eq!(row.unavailable_count(), 3);
    }

    #[test]
    fn record_is_fields_then_counts() {
        let mut row = AggregatedRow::for_location(&paris(), 3);
        row.set(0, Count::Known(12));
        row.set(2, Count::Known(3));
        assert_eq!(
            row.to_record(false),
            vec!["PARIS", "48.8566", "2.3522", "dense", "75", "12", "0", "3"]
        );
        assert_eq!(row.unavailable_count(), 1);
        assert_eq!(row.to_record(true)[6], "NA");
    }

    #[test]
    fn set_ignores_out_of_range_slot() {
        let mut row = AggregatedRow::for_location(&paris(), 1);
        row.set(5, Count::Known(1));
        assert_eq!(row.counts(), &[Count::Unavailable]);
    }
}
