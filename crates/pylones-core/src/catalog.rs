//! Operator and generation enumerations, and the derived column layout they
//! imply.
//!
//! A [`Catalog`] drives both the query fan-out of a row and the order of the
//! derived output columns. Derived counts are addressed by slot index:
//!
//! | slots                         | column                          |
//! |-------------------------------|---------------------------------|
//! | `0 .. O×G`                    | `"{operator} {generation}"`     |
//! | `O×G .. O×G + O`              | `"PYLONES {operator}"`          |
//! | `O×G + O`                     | `"PYLONES TOUS OPERATEURS"`     |

use std::collections::HashSet;

use crate::ConfigError;

/// Prefix of the per-operator unique tower columns.
pub const TOWER_COLUMN_PREFIX: &str = "PYLONES";

/// Column holding the unique tower count across every operator.
pub const ALL_OPERATORS_TOWER_COLUMN: &str = "PYLONES TOUS OPERATEURS";

const DEFAULT_OPERATORS: &[&str] = &["ORANGE", "SFR", "BOUYGUES TELECOM", "FREE MOBILE"];
const DEFAULT_GENERATIONS: &[&str] = &["2G", "3G", "4G", "5G"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    operators: Vec<String>,
    generations: Vec<String>,
}

impl Catalog {
    /// Builds a catalog from ordered operator and generation names.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCatalog`] if either list is empty or
    /// contains a blank or duplicated entry.
    pub fn new(operators: Vec<String>, generations: Vec<String>) -> Result<Self, ConfigError> {
        validate_names("operator", &operators)?;
        validate_names("generation", &generations)?;
        Ok(Self {
            operators,
            generations,
        })
    }

    #[must_use]
    pub fn operators(&self) -> &[String] {
        &self.operators
    }

    #[must_use]
    pub fn generations(&self) -> &[String] {
        &self.generations
    }

    /// Number of derived numeric fields per output row: `O×G + O + 1`.
    #[must_use]
    pub fn derived_len(&self) -> usize {
        self.operators.len() * self.generations.len() + self.operators.len() + 1
    }

    #[must_use]
    pub fn antenna_slot(&self, operator_idx: usize, generation_idx: usize) -> usize {
        operator_idx * self.generations.len() + generation_idx
    }

    #[must_use]
    pub fn operator_tower_slot(&self, operator_idx: usize) -> usize {
        self.operators.len() * self.generations.len() + operator_idx
    }

    #[must_use]
    pub fn all_towers_slot(&self) -> usize {
        self.derived_len() - 1
    }

    /// Derived column names in output order.
    #[must_use]
    pub fn derived_columns(&self) -> Vec<String> {
        let mut columns = Vec::with_capacity(self.derived_len());
        for op in &self.operators {
            for generation in &self.generations {
                columns.push(format!("{op} {generation}"));
            }
        }
        for op in &self.operators {
            columns.push(format!("{TOWER_COLUMN_PREFIX} {op}"));
        }
        columns.push(ALL_OPERATORS_TOWER_COLUMN.to_string());
        columns
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            operators: DEFAULT_OPERATORS.iter().map(|s| (*s).to_string()).collect(),
            generations: DEFAULT_GENERATIONS.iter().map(|s| (*s).to_string()).collect(),
        }
    }
}

fn validate_names(kind: &str, names: &[String]) -> Result<(), ConfigError> {
    if names.is_empty() {
        return Err(ConfigError::InvalidCatalog(format!(
            "at least one {kind} is required"
        )));
    }
    let mut seen = HashSet::new();
    for name in names {
        if name.trim().is_empty() {
            return Err(ConfigError::InvalidCatalog(format!(
                "{kind} names must be non-empty"
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(ConfigError::InvalidCatalog(format!(
                "duplicate {kind} '{name}'"
            )));
        }
    }
    Ok(())
}
