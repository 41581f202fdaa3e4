#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Arrest record normalization and offense classification.
//!
//! Turns raw export rows into [`ArrestRecord`]s: the date is parsed and
//! split into year and quarter, missing coordinates become the "no
//! location" sentinel, and the law code is mapped to an offense category
//! through an [`OffenseTable`].
//!
//! [`ArrestRecord`]: arrest_trends_arrest_models::ArrestRecord

pub mod offense;
pub mod record;
pub mod registry;

use thiserror::Error;

pub use offense::OffenseTable;
pub use record::{normalize_row, normalize_rows, parse_arrest_date};

/// Errors that can occur while normalizing arrest data.
#[derive(Debug, Error)]
pub enum ArrestError {
    /// TOML parsing failed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// An arrest date was not in `MM/DD/YYYY` form.
    #[error("Arrest {arrest_key} has invalid date '{value}'")]
    InvalidDate {
        /// Key of the offending arrest.
        arrest_key: String,
        /// The raw date string.
        value: String,
    },

    /// An offense table lists the same code fragment twice.
    #[error("Offense code '{code}' is defined more than once")]
    DuplicateCode {
        /// The repeated fragment.
        code: String,
    },
}
