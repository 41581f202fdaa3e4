#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dense per-zone time series.
//!
//! Labeled periods are grouped into sparse `(zone, period) -> count`
//! observations, completed into a gap-free grid with explicit zeros up to
//! the data cutoff, and annotated with period-over-period percent change.

pub mod change;
pub mod complete;
pub mod group;
pub mod snapshot;

use arrest_trends_series_models::{Granularity, PeriodKey};
use thiserror::Error;

pub use change::{ChangeCalculator, percent_change};
pub use complete::{CompletedSeries, PeriodRange, SeriesCompleter};
pub use group::count_by_zone;
pub use snapshot::{PeriodSnapshot, SnapshotRow};

/// Errors that can occur while building series.
#[derive(Debug, Error)]
pub enum SeriesError {
    /// A period had no predecessor in a series that should be dense.
    #[error("Zone '{zone}' has no count for {missing}, the period before {period}")]
    MissingPredecessor {
        /// Zone name.
        zone: String,
        /// Period whose change was being computed.
        period: PeriodKey,
        /// The absent predecessor.
        missing: PeriodKey,
    },

    /// A period's granularity differed from the series'.
    #[error("Expected a {expected} period, found {period}")]
    GranularityMismatch {
        /// Granularity of the series.
        expected: Granularity,
        /// The offending period.
        period: PeriodKey,
    },
}
