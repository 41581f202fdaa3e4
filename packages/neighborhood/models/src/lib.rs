#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Neighborhood grouping schema and census metric types.
//!
//! Defines the TOML schema for the zip-code-to-neighborhood grouping and
//! the per-zip / per-neighborhood metric rows produced by aggregation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Total population metric. Always summed across zips.
pub const POPULATION: &str = "Population";
/// Median worker earnings (population-weighted mean).
pub const MEDIAN_WORKER_EARNINGS: &str = "Economy: Median worker earnings";
/// Percent of population below the poverty level (population-weighted mean).
pub const PERCENT_BELOW_POVERTY: &str = "Economy: Percent below poverty level";
/// Unemployment rate (population-weighted mean).
pub const UNEMPLOYMENT_RATE: &str = "Economy: Unemployment rate";

/// Count metrics summed across a neighborhood's zips.
pub const SUMMED_METRICS: &[&str] = &[
    "Race: White",
    "Race: Black or African American",
    "Race: American Indian and Alaska Native",
    "Race: Asian",
    "Race: Native Hawaiian and Other Pacific Islander",
    "Race: Other",
    "Race: Two or more",
    "Ethnicity: Hispanic or Latino",
    "Ethnicity: Not Hispanic or Latino",
    "Immigration: Native-born",
    "Immigration: Native-born – in the US",
    "Immigration: Native-born – in Puerto Rico, US islands, or abroad to US parents",
    "Immigration: Foreign-born",
    "Immigration: Foreign-born – Naturalized citizen",
    "Immigration: Foreign-born: Not US citizen",
    "Immigration: Foreign-born – Europe",
    "Immigration: Foreign-born – Asia",
    "Immigration: Foreign-born – Africa",
    "Immigration: Foreign-born – Oceania",
    "Immigration: Foreign-born – Latin America",
    "Immigration: Foreign-born – North America",
    "Language: Population 5+ years",
    "Language: English only",
    "Language: Not English",
    "Language: Not English – Speaks English 'less than well'",
    "Language: Spanish",
    "Language: Spanish – Speaks English 'less than well'",
    "Language: Other Indo-European",
    "Language: Other Indo-European – Speaks English 'less than well'",
    "Language: Asian and Pacific Islander",
    "Language: Asian and Pacific Islander – Speaks English 'less than well'",
    "Language: Other",
    "Language: Other – Speaks English 'less than well'",
];

/// One neighborhood in the grouping file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborhoodDefinition {
    /// Neighborhood name (e.g. "Northeast Bronx").
    pub name: String,
    /// Constituent zip codes. Short codes are zero-padded on load.
    pub zips: Vec<String>,
    /// Areas with no residential baseline (parks, airports). Their arrest
    /// counts are zeroed in completed series by default.
    #[serde(default)]
    pub no_baseline: bool,
}

/// Top-level layout of a neighborhood grouping TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborhoodFile {
    /// `[[neighborhood]]` tables.
    #[serde(rename = "neighborhood")]
    pub neighborhoods: Vec<NeighborhoodDefinition>,
}

/// How a metric combines across a neighborhood's zips.
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
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MetricKind {
    /// Summed over zips with a population figure.
    Population,
    /// Summed over zips, missing values counted as zero.
    Summed,
    /// Population-weighted mean with the unweighted-mean gap fill.
    Mean,
}

/// Which metrics to aggregate and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSchema {
    /// Name of the population metric.
    pub population: String,
    /// Metrics aggregated as population-weighted means.
    pub mean: Vec<String>,
    /// Metrics aggregated as sums.
    pub summed: Vec<String>,
}

impl Default for MetricSchema {
    fn default() -> Self {
        Self {
            population: POPULATION.to_string(),
            mean: vec![
                MEDIAN_WORKER_EARNINGS.to_string(),
                PERCENT_BELOW_POVERTY.to_string(),
                UNEMPLOYMENT_RATE.to_string(),
            ],
            summed: SUMMED_METRICS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl MetricSchema {
    /// How `metric` is aggregated, or `None` if the schema doesn't track it.
    #[must_use]
    pub fn kind(&self, metric: &str) -> Option<MetricKind> {
        if metric == self.population {
            Some(MetricKind::Population)
        } else if self.mean.iter().any(|m| m == metric) {
            Some(MetricKind::Mean)
        } else if self.summed.iter().any(|m| m == metric) {
            Some(MetricKind::Summed)
        } else {
            None
        }
    }

    /// All tracked metrics in output order: population, means, sums.
    pub fn metrics(&self) -> impl Iterator<Item = (&str, MetricKind)> {
        std::iter::once((self.population.as_str(), MetricKind::Population))
            .chain(self.mean.iter().map(|m| (m.as_str(), MetricKind::Mean)))
            .chain(self.summed.iter().map(|m| (m.as_str(), MetricKind::Summed)))
    }
}

/// Census metrics for one zip code in one year.
///
/// A metric absent from `values` (or stored as NaN) is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZipMetricRow {
    /// Zip code.
    pub zip: String,
    /// Survey year.
    pub year: i32,
    /// Metric name -> value.
    pub values: BTreeMap<String, f64>,
}

impl ZipMetricRow {
    /// Creates an empty row.
    #[must_use]
    pub fn new(zip: impl Into<String>, year: i32) -> Self {
        Self {
            zip: zip.into(),
            year,
            values: BTreeMap::new(),
        }
    }

    /// Sets a metric value.
    #[must_use]
    pub fn with(mut self, metric: impl Into<String>, value: f64) -> Self {
        self.values.insert(metric.into(), value);
        self
    }

    /// Returns a metric value, treating NaN as missing.
    #[must_use]
    pub fn get(&self, metric: &str) -> Option<f64> {
        self.values.get(metric).copied().filter(|v| !v.is_nan())
    }
}

/// One aggregated metric value for a neighborhood in a year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodMetric {
    /// Neighborhood name.
    pub neighborhood: String,
    /// Survey year.
    pub year: i32,
    /// Metric name.
    pub metric: String,
    /// Aggregated value.
    pub value: f64,
}
