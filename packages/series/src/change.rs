//! Period-over-period percent change.

use std::collections::BTreeMap;

use arrest_trends_series_models::{Observation, PeriodKey, ZoneSeriesPoint};
use arrest_trends_zone_models::ZoneType;

use crate::SeriesError;

/// Value reported when a count rises from zero.
///
/// This is a marker for "appeared from nothing", not a computed
/// percentage; it is indistinguishable from a genuine doubling.
pub const FROM_ZERO_CHANGE: f64 = 100.0;

/// Percent change from `old` to `new`.
///
/// * `0 -> 0` is `0.0`
/// * `0 -> n` is [`FROM_ZERO_CHANGE`]
/// * otherwise `(new - old) / old * 100`
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn percent_change(old: u64, new: u64) -> f64 {
    match (old, new) {
        (0, 0) => 0.0,
        (0, _) => FROM_ZERO_CHANGE,
        _ => (new as f64 - old as f64) / old as f64 * 100.0,
    }
}

/// Attaches percent change to a dense series.
#[derive(Debug, Clone, Copy)]
pub struct ChangeCalculator {
    zone_type: ZoneType,
    series_start: PeriodKey,
}

impl ChangeCalculator {
    /// Creates a calculator for series of `zone_type` beginning at
    /// `series_start`.
    #[must_use]
    pub const fn new(zone_type: ZoneType, series_start: PeriodKey) -> Self {
        Self {
            zone_type,
            series_start,
        }
    }

    /// The first period of every series.
    #[must_use]
    pub const fn series_start(&self) -> PeriodKey {
        self.series_start
    }

    /// Computes change for every observation.
    ///
    /// Periods at or before the series start have no change. Every later
    /// period is compared with the immediately preceding period of the
    /// same zone. Output is sorted by `(zone, period)`.
    ///
    /// # Errors
    ///
    /// * [`SeriesError::GranularityMismatch`] if a period's granularity
    ///   differs from the series start's
    /// * [`SeriesError::MissingPredecessor`] if a preceding period is
    ///   absent, which means the input was not dense
    pub fn compute(&self, dense: &[Observation]) -> Result<Vec<ZoneSeriesPoint>, SeriesError> {
        let granularity = self.series_start.granularity();
        let mut counts: BTreeMap<(&str, PeriodKey), u64> = BTreeMap::new();
        for observation in dense {
            if observation.period.granularity() != granularity {
                return Err(SeriesError::GranularityMismatch {
                    expected: granularity,
                    period: observation.period,
                });
            }
            counts.insert((observation.zone.as_str(), observation.period), observation.count);
        }

        let mut points = Vec::with_capacity(counts.len());
        for (&(zone, period), &count) in &counts {
            let change = if period <= self.series_start {
                None
            } else {
                let previous = period.previous();
                let Some(&old) = counts.get(&(zone, previous)) else {
                    return Err(SeriesError::MissingPredecessor {
                        zone: zone.to_string(),
                        period,
                        missing: previous,
                    });
                };
                Some(percent_change(old, count))
            };

            points.push(ZoneSeriesPoint {
                zone: zone.to_string(),
                zone_type: self.zone_type,
                period,
                count,
                change,
            });
        }

        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use arrest_trends_series_models::{Cutoff, Granularity};

    use super::*;
    use crate::SeriesCompleter;

    fn q(year: i32, quarter: u8) -> PeriodKey {
        PeriodKey::quarterly(year, quarter)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= f64::EPSILON * a.abs().max(b.abs()).max(1.0) * 4.0
    }

    #[test]
    fn drop_to_zero_is_minus_one_hundred() {
        let calculator = ChangeCalculator::new(ZoneType::PolicePrecinct, q(2020, 0));
        let points = calculator
            .compute(&[Observation::new("90", q(2020, 0), 50), Observation::new("90", q(2020, 1), 0)])
            .unwrap();

        assert_eq!(points[0].change, None);
        assert!(close(points[1].change.unwrap(), -100.0));
    }

    #[test]
    fn rise_from_zero_is_sentinel() {
        let calculator = ChangeCalculator::new(ZoneType::PolicePrecinct, q(2020, 0));
        let points = calculator
            .compute(&[Observation::new("90", q(2020, 0), 0), Observation::new("90", q(2020, 1), 5)])
            .unwrap();

        assert!(close(points[1].change.unwrap(), FROM_ZERO_CHANGE));
    }

    #[test]
    fn formula_cases() {
        assert!(close(percent_change(0, 0), 0.0));
        assert!(close(percent_change(0, 3), 100.0));
        assert!(close(percent_change(4, 6), 50.0));
        assert!(close(percent_change(8, 2), -75.0));
        assert!(close(percent_change(5, 5), 0.0));
    }

    #[test]
    fn change_wraps_across_year_boundary() {
        let calculator = ChangeCalculator::new(ZoneType::Zipcode, q(2019, 3));
        let points = calculator
            .compute(&[Observation::new("11211", q(2019, 3), 10), Observation::new("11211", q(2020, 0), 15)])
            .unwrap();

        assert_eq!(points[1].period, q(2020, 0));
        assert!(close(points[1].change.unwrap(), 50.0));
    }

    #[test]
    fn missing_predecessor_is_an_error() {
        let calculator = ChangeCalculator::new(ZoneType::Zipcode, q(2020, 0));
        let result = calculator.compute(&[
            Observation::new("11211", q(2020, 0), 1),
            Observation::new("11211", q(2020, 2), 1),
        ]);

        assert!(matches!(
            result,
            Err(SeriesError::MissingPredecessor { period, missing, .. })
                if period == q(2020, 2) && missing == q(2020, 1)
        ));
    }

    #[test]
    fn rejects_mixed_granularity() {
        let calculator = ChangeCalculator::new(ZoneType::Zipcode, PeriodKey::yearly(2020));
        let result = calculator.compute(&[Observation::new("11211", q(2020, 0), 1)]);
        assert!(matches!(result, Err(SeriesError::GranularityMismatch { .. })));
    }

    #[test]
    fn only_first_entry_of_each_zone_lacks_change() {
        let completer = SeriesCompleter::new(Granularity::Quarterly, Cutoff::new(2021, 2));
        let dense = completer
            .complete(vec![
                Observation::new("a", q(2019, 1), 3),
                Observation::new("a", q(2021, 2), 8),
                Observation::new("b", q(2020, 0), 0),
                Observation::new("c", q(2019, 3), 2),
            ])
            .unwrap();
        let start = dense.range().unwrap().start();

        let points = ChangeCalculator::new(ZoneType::Zipcode, start)
            .compute(dense.observations())
            .unwrap();

        for zone in ["a", "b", "c"] {
            let zone_points: Vec<_> = points.iter().filter(|p| p.zone == zone).collect();
            assert_eq!(zone_points.len(), 11);
            assert!(zone_points[0].change.is_none(), "{zone} first entry has a change");
            assert!(
                zone_points[1..].iter().all(|p| p.change.is_some()),
                "{zone} has a gap in its change series"
            );
        }
    }

    #[test]
    fn yearly_series() {
        let calculator = ChangeCalculator::new(ZoneType::CityCouncilDistrict, PeriodKey::yearly(2006));
        let points = calculator
            .compute(&[
                Observation::new("33", PeriodKey::yearly(2006), 200),
                Observation::new("33", PeriodKey::yearly(2007), 150),
            ])
            .unwrap();

        assert_eq!(points[0].change, None);
        assert!(close(points[1].change.unwrap(), -25.0));
        assert_eq!(points[1].zone_type, ZoneType::CityCouncilDistrict);
    }
}
