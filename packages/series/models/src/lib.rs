#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Reporting periods and per-zone series types.
//!
//! Quarters are zero-based throughout: quarter 0 is January–March and
//! quarter 3 is October–December.

use arrest_trends_zone_models::ZoneType;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Number of quarters in a year.
pub const QUARTERS_PER_YEAR: u8 = 4;

/// Time resolution of a series.
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
pub enum Granularity {
    /// One period per calendar quarter.
    Quarterly,
    /// One period per calendar year.
    Yearly,
}

impl Granularity {
    /// Both granularities, quarterly first.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Quarterly, Self::Yearly]
    }
}

/// A reporting interval.
///
/// Ordered chronologically within a granularity. Comparing a quarter with
/// a year is well-defined but meaningless; series never mix the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodKey {
    /// A calendar quarter, `quarter` in `0..=3`.
    Quarter {
        /// Calendar year.
        year: i32,
        /// Zero-based quarter.
        quarter: u8,
    },
    /// A calendar year.
    Year {
        /// Calendar year.
        year: i32,
    },
}

impl PeriodKey {
    /// A quarterly period. `quarter` must be in `0..=3`.
    #[must_use]
    pub const fn quarterly(year: i32, quarter: u8) -> Self {
        Self::Quarter { year, quarter }
    }

    /// A yearly period.
    #[must_use]
    pub const fn yearly(year: i32) -> Self {
        Self::Year { year }
    }

    /// The first period of `year` at `granularity`.
    #[must_use]
    pub const fn start_of_year(year: i32, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Quarterly => Self::quarterly(year, 0),
            Granularity::Yearly => Self::yearly(year),
        }
    }

    /// The last period of `year` at `granularity`.
    #[must_use]
    pub const fn end_of_year(year: i32, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Quarterly => Self::quarterly(year, QUARTERS_PER_YEAR - 1),
            Granularity::Yearly => Self::yearly(year),
        }
    }

    /// Calendar year of the period.
    #[must_use]
    pub const fn year(self) -> i32 {
        match self {
            Self::Quarter { year, .. } | Self::Year { year } => year,
        }
    }

    /// Zero-based quarter, `None` for yearly periods.
    #[must_use]
    pub const fn quarter(self) -> Option<u8> {
        match self {
            Self::Quarter { quarter, .. } => Some(quarter),
            Self::Year { .. } => None,
        }
    }

    /// Granularity of the period.
    #[must_use]
    pub const fn granularity(self) -> Granularity {
        match self {
            Self::Quarter { .. } => Granularity::Quarterly,
            Self::Year { .. } => Granularity::Yearly,
        }
    }

    /// The immediately preceding period. Quarter 0 wraps to quarter 3 of
    /// the previous year.
    #[must_use]
    pub const fn previous(self) -> Self {
        match self {
            Self::Quarter { year, quarter: 0 } => Self::quarterly(year - 1, QUARTERS_PER_YEAR - 1),
            Self::Quarter { year, quarter } => Self::quarterly(year, quarter - 1),
            Self::Year { year } => Self::yearly(year - 1),
        }
    }

    /// The immediately following period. Quarter 3 wraps to quarter 0 of
    /// the next year.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Quarter { year, quarter } if quarter + 1 >= QUARTERS_PER_YEAR => {
                Self::quarterly(year + 1, 0)
            }
            Self::Quarter { year, quarter } => Self::quarterly(year, quarter + 1),
            Self::Year { year } => Self::yearly(year + 1),
        }
    }
}

impl std::fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quarter { year, quarter } => write!(f, "{year} Q{quarter}"),
            Self::Year { year } => write!(f, "{year}"),
        }
    }
}

/// The latest period for which data is available.
///
/// Periods strictly after the cutoff are never synthesized. A cutoff with
/// no quarter covers the whole year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cutoff {
    /// Latest year with data.
    pub year: i32,
    /// Latest zero-based quarter with data in `year`.
    #[serde(default)]
    pub quarter: Option<u8>,
}

impl Cutoff {
    /// A cutoff at quarter `quarter` of `year`.
    #[must_use]
    pub const fn new(year: i32, quarter: u8) -> Self {
        Self {
            year,
            quarter: Some(quarter),
        }
    }

    /// A cutoff at the end of `year`.
    #[must_use]
    pub const fn end_of_year(year: i32) -> Self {
        Self {
            year,
            quarter: None,
        }
    }

    /// Whether `period` is at or before the cutoff. Yearly periods compare
    /// by year only.
    #[must_use]
    pub fn includes(&self, period: PeriodKey) -> bool {
        period <= self.last_period(period.granularity())
    }

    /// The last included period at `granularity`.
    #[must_use]
    pub const fn last_period(&self, granularity: Granularity) -> PeriodKey {
        match (granularity, self.quarter) {
            (Granularity::Quarterly, Some(quarter)) => PeriodKey::quarterly(self.year, quarter),
            _ => PeriodKey::end_of_year(self.year, granularity),
        }
    }

    /// The most recent year with all four quarters available.
    #[must_use]
    pub const fn latest_full_year(&self) -> i32 {
        match self.quarter {
            Some(quarter) if quarter + 1 < QUARTERS_PER_YEAR => self.year - 1,
            _ => self.year,
        }
    }
}

/// A count for one zone in one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Zone name.
    pub zone: String,
    /// Reporting period.
    pub period: PeriodKey,
    /// Number of arrests.
    pub count: u64,
}

impl Observation {
    /// Creates an observation.
    #[must_use]
    pub fn new(zone: impl Into<String>, period: PeriodKey, count: u64) -> Self {
        Self {
            zone: zone.into(),
            period,
            count,
        }
    }
}

/// One row of a completed zone series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSeriesPoint {
    /// Zone name.
    pub zone: String,
    /// Zone type the series belongs to.
    pub zone_type: ZoneType,
    /// Reporting period.
    pub period: PeriodKey,
    /// Number of arrests.
    pub count: u64,
    /// Percent change from the previous period; `None` at the series start.
    ///
    /// A rise from zero is reported as `100.0`, the same value as a
    /// genuine doubling.
    pub change: Option<f64>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn quarter_wraps_backwards_across_years() {
        assert_eq!(PeriodKey::quarterly(2020, 0).previous(), PeriodKey::quarterly(2019, 3));
        assert_eq!(PeriodKey::quarterly(2020, 2).previous(), PeriodKey::quarterly(2020, 1));
        assert_eq!(PeriodKey::yearly(2020).previous(), PeriodKey::yearly(2019));
    }

    #[test]
    fn quarter_wraps_forwards_across_years() {
        assert_eq!(PeriodKey::quarterly(2019, 3).next(), PeriodKey::quarterly(2020, 0));
        assert_eq!(PeriodKey::quarterly(2019, 1).next(), PeriodKey::quarterly(2019, 2));
        assert_eq!(PeriodKey::yearly(2019).next(), PeriodKey::yearly(2020));
    }

    #[test]
    fn next_and_previous_are_inverse() {
        let mut period = PeriodKey::quarterly(2018, 0);
        for _ in 0..12 {
            assert_eq!(period.next().previous(), period);
            assert!(period < period.next());
            period = period.next();
        }
        assert_eq!(period, PeriodKey::quarterly(2021, 0));
    }

    #[test]
    fn periods_order_chronologically() {
        let mut periods = vec![
            PeriodKey::quarterly(2021, 0),
            PeriodKey::quarterly(2020, 3),
            PeriodKey::quarterly(2020, 1),
        ];
        periods.sort();
        assert_eq!(
            periods,
            vec![
                PeriodKey::quarterly(2020, 1),
                PeriodKey::quarterly(2020, 3),
                PeriodKey::quarterly(2021, 0),
            ]
        );
    }

    #[test]
    fn cutoff_includes_periods_up_to_quarter() {
        let cutoff = Cutoff::new(2022, 1);
        assert!(cutoff.includes(PeriodKey::quarterly(2021, 3)));
        assert!(cutoff.includes(PeriodKey::quarterly(2022, 1)));
        assert!(!cutoff.includes(PeriodKey::quarterly(2022, 2)));
        assert!(!cutoff.includes(PeriodKey::quarterly(2023, 0)));
    }

    #[test]
    fn yearly_cutoff_compares_by_year() {
        let cutoff = Cutoff::new(2022, 1);
        assert!(cutoff.includes(PeriodKey::yearly(2022)));
        assert!(!cutoff.includes(PeriodKey::yearly(2023)));
        assert!(Cutoff::end_of_year(2022).includes(PeriodKey::quarterly(2022, 3)));
    }

    #[test]
    fn latest_full_year_needs_fourth_quarter() {
        assert_eq!(Cutoff::new(2022, 3).latest_full_year(), 2022);
        assert_eq!(Cutoff::new(2022, 2).latest_full_year(), 2021);
        assert_eq!(Cutoff::new(2022, 0).latest_full_year(), 2021);
        assert_eq!(Cutoff::end_of_year(2022).latest_full_year(), 2022);
    }

    #[test]
    fn granularity_ids_roundtrip() {
        for granularity in Granularity::all() {
            let id = granularity.to_string();
            assert_eq!(Granularity::from_str(&id).unwrap(), *granularity);
        }
        assert_eq!(Granularity::Quarterly.as_ref(), "quarterly");
    }

    #[test]
    fn displays_periods() {
        assert_eq!(PeriodKey::quarterly(2020, 2).to_string(), "2020 Q2");
        assert_eq!(PeriodKey::yearly(2020).to_string(), "2020");
    }
}
