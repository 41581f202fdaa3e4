#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! End-to-end arrest trend pipeline.
//!
//! Normalized arrest records are labeled with one zone per configured zone
//! type, grouped into per-zone counts, completed into dense quarterly and
//! yearly series, and written out as CSV row streams. File handling is
//! left to the caller: every writer takes any [`std::io::Write`].

pub mod config;
pub mod label;
pub mod output;
pub mod report;
pub mod series;

use arrest_trends_arrest::ArrestError;
use arrest_trends_neighborhood::NeighborhoodError;
use arrest_trends_series::SeriesError;
use arrest_trends_spatial::SpatialError;
use thiserror::Error;

pub use config::PipelineConfig;
pub use label::{LabeledRecord, label_records, merge_year};
pub use output::{write_labeled_records, write_neighborhood_metrics, write_series};
pub use report::{OffenseShare, offense_shares};
pub use series::{SeriesTable, build_all_series, build_series};

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Boundary loading failed.
    #[error("Spatial error: {0}")]
    Spatial(#[from] SpatialError),

    /// Neighborhood grouping or aggregation failed.
    #[error("Neighborhood error: {0}")]
    Neighborhood(#[from] NeighborhoodError),

    /// Record normalization failed.
    #[error("Arrest data error: {0}")]
    Arrest(#[from] ArrestError),

    /// Series completion or change computation failed.
    #[error("Series error: {0}")]
    Series(#[from] SeriesError),

    /// CSV output failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration TOML failed to parse.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The configuration is internally inconsistent.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Description of what went wrong.
        message: String,
    },

    /// A record resolved to a zip code with no neighborhood.
    #[error("Arrest {arrest_key} resolved to zip {zip}, which has no neighborhood")]
    UnknownZip {
        /// Key of the offending arrest.
        arrest_key: String,
        /// The resolved zip code.
        zip: String,
    },
}
