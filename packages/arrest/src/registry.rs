//! Compile-time registry of the default offense table.
//!
//! The table is embedded via `include_str!` from `data/offenses.toml`.

use crate::OffenseTable;

/// Number of fragments in the bundled table. Enforced by a test.
#[cfg(test)]
const EXPECTED_OFFENSE_COUNT: usize = 45;

/// Embedded default offense table.
const OFFENSES_TOML: &str = include_str!("../data/offenses.toml");

/// Returns the bundled law-code offense table.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse. Since it is a compile-time
/// constant, a failure indicates a development error and is caught
/// during CI.
#[must_use]
pub fn bundled() -> OffenseTable {
    OffenseTable::from_toml(OFFENSES_TOML)
        .unwrap_or_else(|e| panic!("Failed to load bundled offense table: {e}"))
}
