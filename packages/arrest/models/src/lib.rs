#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Arrest record types and the offense table schema.
//!
//! [`RawArrestRow`] mirrors the columns of the historic arrest export and
//! deserializes straight from a CSV reader. [`ArrestRecord`] is the
//! normalized form every downstream stage works with.

use arrest_trends_zone_models::Coordinate;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Offense category for codes that match no table entry.
pub const OTHER_OFFENSE: &str = "Other";

/// One row of the arrest export, as published.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArrestRow {
    /// Unique arrest identifier.
    #[serde(rename = "ARREST_KEY")]
    pub arrest_key: String,
    /// Arrest date as `MM/DD/YYYY`.
    #[serde(rename = "ARREST_DATE")]
    pub arrest_date: String,
    /// Penal law code (e.g. `"PL 1552500"`).
    #[serde(rename = "LAW_CODE", default)]
    pub law_code: Option<String>,
    /// Latitude, absent when no location was recorded.
    #[serde(rename = "Latitude", default)]
    pub latitude: Option<f64>,
    /// Longitude, absent when no location was recorded.
    #[serde(rename = "Longitude", default)]
    pub longitude: Option<f64>,
    /// Internal classification description.
    #[serde(rename = "PD_DESC", default)]
    pub pd_desc: Option<String>,
    /// Offense description.
    #[serde(rename = "OFNS_DESC", default)]
    pub ofns_desc: Option<String>,
    /// Level of offense: felony, misdemeanor, violation.
    #[serde(rename = "LAW_CAT_CD", default)]
    pub law_cat_cd: Option<String>,
    /// Borough code.
    #[serde(rename = "ARREST_BORO", default)]
    pub arrest_boro: Option<String>,
    /// Precinct where the arrest occurred.
    #[serde(rename = "ARREST_PRECINCT", default)]
    pub arrest_precinct: Option<String>,
    /// Perpetrator age group.
    #[serde(rename = "AGE_GROUP", default)]
    pub age_group: Option<String>,
    /// Perpetrator sex.
    #[serde(rename = "PERP_SEX", default)]
    pub perp_sex: Option<String>,
    /// Perpetrator race.
    #[serde(rename = "PERP_RACE", default)]
    pub perp_race: Option<String>,
}

/// Descriptive columns carried through unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrestDetails {
    /// Internal classification description.
    pub pd_desc: Option<String>,
    /// Offense description.
    pub ofns_desc: Option<String>,
    /// Level of offense.
    pub law_cat_cd: Option<String>,
    /// Borough code.
    pub arrest_boro: Option<String>,
    /// Precinct where the arrest occurred.
    pub arrest_precinct: Option<String>,
    /// Perpetrator age group.
    pub age_group: Option<String>,
    /// Perpetrator sex.
    pub perp_sex: Option<String>,
    /// Perpetrator race.
    pub perp_race: Option<String>,
}

/// A normalized arrest record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrestRecord {
    /// Unique arrest identifier.
    pub arrest_key: String,
    /// Arrest date.
    pub date: NaiveDate,
    /// Calendar year of `date`.
    pub year: i32,
    /// Zero-based quarter of `date` (January–March is 0).
    pub quarter: u8,
    /// Arrest location; the sentinel when none was recorded.
    pub location: Coordinate,
    /// Penal law code, if recorded.
    pub law_code: Option<String>,
    /// Offense category derived from the law code.
    pub offense: String,
    /// Passthrough columns.
    pub details: ArrestDetails,
}

/// One `[[offense]]` entry: a law-code fragment and its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffenseDefinition {
    /// Fragment matched as a substring of the law code.
    pub code: String,
    /// Offense category assigned on match.
    pub category: String,
}

/// Top-level layout of an offense table TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OffenseTableFile {
    /// `[[offense]]` tables, in precedence order for equal-length matches.
    #[serde(rename = "offense")]
    pub offenses: Vec<OffenseDefinition>,
}
