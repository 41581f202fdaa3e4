#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Administrative zone types, coordinates, and resolution labels.
//!
//! Every arrest record is attributed to one zone per [`ZoneType`]. The
//! outcome of that attribution is a [`ZoneLabel`], which is either a
//! resolved zone name or the explicit [`ZoneLabel::Unresolved`] marker.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A category of administrative partition.
///
/// The string form (via [`Display`](std::fmt::Display) / [`std::str::FromStr`])
/// is the zone-type id used by the boundary source to tag its polygons.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum ZoneType {
    /// Community district
    #[serde(rename = "cd")]
    #[strum(serialize = "cd")]
    CommunityDistrict,
    /// Police precinct
    #[serde(rename = "pp")]
    #[strum(serialize = "pp")]
    PolicePrecinct,
    /// City council district
    #[serde(rename = "cc")]
    #[strum(serialize = "cc")]
    CityCouncilDistrict,
    /// U.S. congressional district
    #[serde(rename = "nycongress")]
    #[strum(serialize = "nycongress")]
    CongressionalDistrict,
    /// ZIP code tabulation area
    #[serde(rename = "zipcode")]
    #[strum(serialize = "zipcode")]
    Zipcode,
    /// State assembly district
    #[serde(rename = "sa")]
    #[strum(serialize = "sa")]
    StateAssemblyDistrict,
    /// State senate district
    #[serde(rename = "ss")]
    #[strum(serialize = "ss")]
    StateSenateDistrict,
    /// Neighborhood, derived from a many-to-one grouping of zip codes
    #[serde(rename = "neighborhood")]
    #[strum(serialize = "neighborhood")]
    Neighborhood,
}

impl ZoneType {
    /// Column name used for this zone type in labeled record output.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::CommunityDistrict => "Community_District",
            Self::PolicePrecinct => "Police_Precinct",
            Self::CityCouncilDistrict => "City_Council_District",
            Self::CongressionalDistrict => "Congressional_District",
            Self::Zipcode => "Zipcode",
            Self::StateAssemblyDistrict => "State_Assembly_District",
            Self::StateSenateDistrict => "State_Senate_District",
            Self::Neighborhood => "Neighborhood",
        }
    }

    /// Whether labels for this zone type are derived from another zone
    /// type rather than resolved against polygons.
    #[must_use]
    pub const fn is_derived(self) -> bool {
        matches!(self, Self::Neighborhood)
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::CommunityDistrict,
            Self::PolicePrecinct,
            Self::CityCouncilDistrict,
            Self::CongressionalDistrict,
            Self::Zipcode,
            Self::StateAssemblyDistrict,
            Self::StateSenateDistrict,
            Self::Neighborhood,
        ]
    }
}

/// A planar `(longitude, latitude)` coordinate.
///
/// A longitude of exactly `0.0` is the sentinel for "no location recorded";
/// it never denotes a real position in the covered area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Longitude (x).
    pub lng: f64,
    /// Latitude (y).
    pub lat: f64,
}

impl Coordinate {
    /// Creates a coordinate from longitude and latitude.
    #[must_use]
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// The "no location recorded" sentinel.
    #[must_use]
    pub const fn missing() -> Self {
        Self { lng: 0.0, lat: 0.0 }
    }

    /// Builds a coordinate from optional source fields, filling absent
    /// values with `0.0`.
    #[must_use]
    pub fn from_optional(lng: Option<f64>, lat: Option<f64>) -> Self {
        Self {
            lng: lng.unwrap_or(0.0),
            lat: lat.unwrap_or(0.0),
        }
    }

    /// Whether this is the "no location recorded" sentinel.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_missing(&self) -> bool {
        self.lng == 0.0
    }
}

/// The outcome of attributing a record to a zone of one type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum ZoneLabel {
    /// The record belongs to the named zone.
    Resolved(String),
    /// No zone could be determined (no location, or no polygons).
    Unresolved,
}

impl ZoneLabel {
    /// Returns the zone name if resolved.
    #[must_use]
    pub fn as_resolved(&self) -> Option<&str> {
        match self {
            Self::Resolved(name) => Some(name),
            Self::Unresolved => None,
        }
    }

    /// Whether a zone was determined.
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl From<Option<String>> for ZoneLabel {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Unresolved, Self::Resolved)
    }
}

impl From<ZoneLabel> for Option<String> {
    fn from(value: ZoneLabel) -> Self {
        match value {
            ZoneLabel::Resolved(name) => Some(name),
            ZoneLabel::Unresolved => None,
        }
    }
}

impl std::fmt::Display for ZoneLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Resolved(name) => f.write_str(name),
            Self::Unresolved => Ok(()),
        }
    }
}

/// A hard-mapped correction for a known-erroneous source coordinate.
///
/// When a record's coordinate equals `(lng, lat)` exactly, it resolves to
/// `zone` for `zone_type` regardless of polygon geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateOverride {
    /// Longitude to match exactly.
    pub lng: f64,
    /// Latitude to match exactly.
    pub lat: f64,
    /// Zone type the correction applies to.
    pub zone_type: ZoneType,
    /// Zone name to assign.
    pub zone: String,
}

impl CoordinateOverride {
    /// Whether this override applies to `coordinate` under `zone_type`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn matches(&self, zone_type: ZoneType, coordinate: &Coordinate) -> bool {
        self.zone_type == zone_type && self.lng == coordinate.lng && self.lat == coordinate.lat
    }

    /// Corrections for coordinates known to be mis-entered upstream.
    ///
    /// A large number of Williamsburg arrests are recorded at a single
    /// placeholder coordinate that falls outside every zip polygon.
    #[must_use]
    pub fn known_corrections() -> Vec<Self> {
        vec![Self {
            lng: -73.950_348,
            lat: 40.706_283,
            zone_type: ZoneType::Zipcode,
            zone: "11211".to_string(),
        }]
    }
}
