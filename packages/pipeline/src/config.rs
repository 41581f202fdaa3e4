//! Pipeline configuration.
//!
//! ```toml
//! zone_types = ["pp", "zipcode", "neighborhood"]
//! series_start_year = 2006
//!
//! [cutoff]
//! year = 2023
//! quarter = 1
//!
//! [[overrides]]
//! lng = -73.950348
//! lat = 40.706283
//! zone_type = "zipcode"
//! zone = "11211"
//! ```
//!
//! Every field except `cutoff` is optional. Overrides default to the known
//! coordinate corrections and excluded zones default to the bundled
//! grouping's `no_baseline` neighborhoods.

use std::collections::BTreeSet;

use arrest_trends_series_models::{Cutoff, Granularity, PeriodKey, QUARTERS_PER_YEAR};
use arrest_trends_zone_models::{CoordinateOverride, ZoneType};
use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// Settings for one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Zone types to label and build series for.
    #[serde(default = "default_zone_types")]
    pub zone_types: Vec<ZoneType>,
    /// Latest period with data.
    pub cutoff: Cutoff,
    /// First year of every series. Defaults to the earliest observed year.
    #[serde(default)]
    pub series_start_year: Option<i32>,
    /// Coordinate corrections applied before geometry.
    #[serde(default = "CoordinateOverride::known_corrections")]
    pub overrides: Vec<CoordinateOverride>,
    /// Neighborhoods whose counts are zeroed in completed series.
    #[serde(default = "default_excluded_zones")]
    pub excluded_zones: Vec<String>,
}

fn default_zone_types() -> Vec<ZoneType> {
    ZoneType::all().to_vec()
}

fn default_excluded_zones() -> Vec<String> {
    arrest_trends_neighborhood::registry::bundled().excluded_zones()
}

impl PipelineConfig {
    /// A configuration with every default and the given cutoff.
    #[must_use]
    pub fn new(cutoff: Cutoff) -> Self {
        Self {
            zone_types: default_zone_types(),
            cutoff,
            series_start_year: None,
            overrides: CoordinateOverride::known_corrections(),
            excluded_zones: default_excluded_zones(),
        }
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or fails
    /// [`Self::validate`].
    pub fn from_toml(content: &str) -> Result<Self, PipelineError> {
        let config: Self = toml::de::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if the cutoff quarter is
    /// out of range, a zone type repeats, or the series starts after the
    /// cutoff.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if let Some(quarter) = self.cutoff.quarter
            && quarter >= QUARTERS_PER_YEAR
        {
            return Err(PipelineError::InvalidConfig {
                message: format!("cutoff quarter {quarter} is not in 0..=3"),
            });
        }

        let mut seen = BTreeSet::new();
        for zone_type in &self.zone_types {
            if !seen.insert(zone_type) {
                return Err(PipelineError::InvalidConfig {
                    message: format!("zone type '{zone_type}' is listed twice"),
                });
            }
        }

        if let Some(start) = self.series_start_year
            && start > self.cutoff.year
        {
            return Err(PipelineError::InvalidConfig {
                message: format!(
                    "series start {start} is after the {} cutoff",
                    self.cutoff.year
                ),
            });
        }

        Ok(())
    }

    /// Configured series start at `granularity`, if any.
    #[must_use]
    pub fn series_start(&self, granularity: Granularity) -> Option<PeriodKey> {
        self.series_start_year
            .map(|year| PeriodKey::start_of_year(year, granularity))
    }

    /// Zones to zero in series of `zone_type`. Exclusions name
    /// neighborhoods, so other zone types have none.
    #[must_use]
    pub fn excluded_zones_for(&self, zone_type: ZoneType) -> &[String] {
        if zone_type == ZoneType::Neighborhood {
            &self.excluded_zones
        } else {
            &[]
        }
    }

    /// Zone types that must be resolved against polygons: every
    /// configured non-derived type, plus zip codes when neighborhoods are
    /// requested.
    #[must_use]
    pub fn resolved_zone_types(&self) -> Vec<ZoneType> {
        let mut resolved: BTreeSet<ZoneType> = self
            .zone_types
            .iter()
            .copied()
            .filter(|zone_type| !zone_type.is_derived())
            .collect();
        if self.zone_types.contains(&ZoneType::Neighborhood) {
            resolved.insert(ZoneType::Zipcode);
        }
        resolved.into_iter().collect()
    }
}
