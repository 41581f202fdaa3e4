#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood layer derived from zip codes.
//!
//! Neighborhoods are a static many-to-one grouping of zip codes. This crate
//! loads and validates that grouping, unions zip polygons into neighborhood
//! polygons, and aggregates per-zip census metrics into per-neighborhood
//! metrics. The default grouping is embedded at compile time, following
//! the same registry pattern as the other reference tables.

pub mod aggregate;
pub mod mapping;
pub mod polygon;
pub mod registry;
pub mod zip;

use thiserror::Error;

pub use mapping::ZipNeighborhoodMap;

/// Errors that can occur during neighborhood operations.
#[derive(Debug, Error)]
pub enum NeighborhoodError {
    /// TOML parsing failed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A zip code could not be normalized to five digits.
    #[error("Malformed zip code '{zip}'")]
    MalformedZip {
        /// The raw value.
        zip: String,
    },

    /// A zip code is absent from the lookup it was expected in.
    #[error("Unknown zip code '{zip}'")]
    UnknownZip {
        /// The normalized zip code.
        zip: String,
    },

    /// The grouping assigns a zip code or a name more than once.
    #[error("Inconsistent neighborhood mapping: {message}")]
    InconsistentMapping {
        /// Description of what went wrong.
        message: String,
    },
}
