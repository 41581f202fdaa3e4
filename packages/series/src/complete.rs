//! Completion of sparse per-zone counts into a dense grid.

use std::collections::{BTreeMap, BTreeSet};

use arrest_trends_series_models::{Cutoff, Granularity, Observation, PeriodKey};

use crate::SeriesError;

/// An inclusive, contiguous run of periods of one granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodRange {
    start: PeriodKey,
    end: PeriodKey,
}

impl PeriodRange {
    /// A range from `start` to `end`, both inclusive. Empty when `end`
    /// precedes `start`.
    #[must_use]
    pub const fn new(start: PeriodKey, end: PeriodKey) -> Self {
        Self { start, end }
    }

    /// First period.
    #[must_use]
    pub const fn start(&self) -> PeriodKey {
        self.start
    }

    /// Last period.
    #[must_use]
    pub const fn end(&self) -> PeriodKey {
        self.end
    }

    /// Whether `period` falls within the range.
    #[must_use]
    pub fn contains(&self, period: PeriodKey) -> bool {
        self.start <= period && period <= self.end
    }

    /// Every period in the range, in order.
    pub fn periods(&self) -> impl Iterator<Item = PeriodKey> {
        let end = self.end;
        std::iter::successors(Some(self.start).filter(|p| *p <= end), move |p| {
            Some(p.next()).filter(|n| *n <= end)
        })
    }

    /// Number of periods in the range.
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods().count()
    }

    /// Whether the range holds no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Output of [`SeriesCompleter::complete`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletedSeries {
    range: Option<PeriodRange>,
    observations: Vec<Observation>,
}

impl CompletedSeries {
    /// The period range every zone covers; `None` when there was nothing
    /// to complete.
    #[must_use]
    pub const fn range(&self) -> Option<PeriodRange> {
        self.range
    }

    /// Dense observations sorted by `(zone, period)`.
    #[must_use]
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Consumes the series, returning its observations.
    #[must_use]
    pub fn into_observations(self) -> Vec<Observation> {
        self.observations
    }
}

/// Fills every `(zone, period)` gap with an explicit zero.
#[derive(Debug, Clone)]
pub struct SeriesCompleter {
    granularity: Granularity,
    cutoff: Cutoff,
    excluded: BTreeSet<String>,
}

impl SeriesCompleter {
    /// Creates a completer with no excluded zones.
    #[must_use]
    pub const fn new(granularity: Granularity, cutoff: Cutoff) -> Self {
        Self {
            granularity,
            cutoff,
            excluded: BTreeSet::new(),
        }
    }

    /// Zones whose counts are forced to zero in every period.
    #[must_use]
    pub fn with_excluded_zones<S: Into<String>>(mut self, zones: impl IntoIterator<Item = S>) -> Self {
        self.excluded.extend(zones.into_iter().map(Into::into));
        self
    }

    /// Series granularity.
    #[must_use]
    pub const fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Data cutoff.
    #[must_use]
    pub const fn cutoff(&self) -> Cutoff {
        self.cutoff
    }

    /// Completes `observations` into a dense grid.
    ///
    /// The range runs from the first period of the earliest observed year
    /// to the last period of the latest observed year, truncated at the
    /// cutoff. Every zone with at least one observation gets exactly one
    /// entry per period in that range. Duplicate `(zone, period)`
    /// observations are summed and observations after the cutoff are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SeriesError::GranularityMismatch`] if an observation's
    /// period has a different granularity from the completer.
    pub fn complete(
        &self,
        observations: impl IntoIterator<Item = Observation>,
    ) -> Result<CompletedSeries, SeriesError> {
        let mut counts: BTreeMap<String, BTreeMap<PeriodKey, u64>> = BTreeMap::new();
        let mut dropped = 0_usize;

        for observation in observations {
            if observation.period.granularity() != self.granularity {
                return Err(SeriesError::GranularityMismatch {
                    expected: self.granularity,
                    period: observation.period,
                });
            }
            if !self.cutoff.includes(observation.period) {
                dropped += 1;
                continue;
            }
            *counts
                .entry(observation.zone)
                .or_default()
                .entry(observation.period)
                .or_default() += observation.count;
        }

        if dropped > 0 {
            log::warn!(
                "Dropped {dropped} {} observations after the {} cutoff",
                self.granularity,
                self.cutoff.last_period(self.granularity)
            );
        }

        let years = counts.values().flat_map(|periods| periods.keys().map(|p| p.year()));
        let (Some(first), Some(last)) = (years.clone().min(), years.max()) else {
            return Ok(CompletedSeries::default());
        };

        let range = PeriodRange::new(
            PeriodKey::start_of_year(first, self.granularity),
            PeriodKey::end_of_year(last, self.granularity).min(self.cutoff.last_period(self.granularity)),
        );

        let mut dense = Vec::with_capacity(counts.len() * range.len());
        for (zone, periods) in counts {
            let excluded = self.excluded.contains(&zone);
            for period in range.periods() {
                let count = if excluded {
                    0
                } else {
                    periods.get(&period).copied().unwrap_or(0)
                };
                dense.push(Observation::new(zone.clone(), period, count));
            }
        }

        log::info!(
            "Completed {} series: {} rows from {} to {}",
            self.granularity,
            dense.len(),
            range.start(),
            range.end()
        );

        Ok(CompletedSeries {
            range: Some(range),
            observations: dense,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(year: i32, quarter: u8) -> PeriodKey {
        PeriodKey::quarterly(year, quarter)
    }

    fn counts(series: &CompletedSeries, zone: &str) -> Vec<(PeriodKey, u64)> {
        series
            .observations()
            .iter()
            .filter(|o| o.zone == zone)
            .map(|o| (o.period, o.count))
            .collect()
    }

    #[test]
    fn fills_missing_quarters_with_zero() {
        let completer = SeriesCompleter::new(Granularity::Quarterly, Cutoff::new(2020, 3));
        let series = completer
            .complete(vec![
                Observation::new("90", q(2020, 0), 7),
                Observation::new("90", q(2020, 2), 3),
            ])
            .unwrap();

        assert_eq!(
            counts(&series, "90"),
            vec![(q(2020, 0), 7), (q(2020, 1), 0), (q(2020, 2), 3), (q(2020, 3), 0)]
        );
    }

    #[test]
    fn every_zone_covers_the_whole_range() {
        let completer = SeriesCompleter::new(Granularity::Quarterly, Cutoff::new(2021, 1));
        let series = completer
            .complete(vec![
                Observation::new("a", q(2019, 2), 1),
                Observation::new("b", q(2021, 1), 4),
                Observation::new("c", q(2020, 3), 2),
            ])
            .unwrap();

        let range = series.range().unwrap();
        assert_eq!(range.start(), q(2019, 0));
        assert_eq!(range.end(), q(2021, 1));
        assert_eq!(range.len(), 10);

        for zone in ["a", "b", "c"] {
            let periods: Vec<_> = counts(&series, zone).into_iter().map(|(p, _)| p).collect();
            let expected: Vec<_> = range.periods().collect();
            assert_eq!(periods, expected, "zone {zone} is not dense");
        }
        assert_eq!(series.observations().len(), 30);
    }

    #[test]
    fn nothing_is_synthesized_after_cutoff() {
        let cutoff = Cutoff::new(2022, 1);
        let completer = SeriesCompleter::new(Granularity::Quarterly, cutoff);
        let series = completer
            .complete(vec![
                Observation::new("a", q(2022, 0), 5),
                Observation::new("a", q(2022, 3), 9),
            ])
            .unwrap();

        assert!(series.observations().iter().all(|o| cutoff.includes(o.period)));
        assert_eq!(counts(&series, "a"), vec![(q(2022, 0), 5), (q(2022, 1), 0)]);
    }

    #[test]
    fn yearly_series_truncates_by_year() {
        let completer = SeriesCompleter::new(Granularity::Yearly, Cutoff::new(2021, 0));
        let series = completer
            .complete(vec![
                Observation::new("a", PeriodKey::yearly(2018), 1),
                Observation::new("a", PeriodKey::yearly(2021), 2),
                Observation::new("a", PeriodKey::yearly(2022), 3),
            ])
            .unwrap();

        assert_eq!(
            counts(&series, "a"),
            vec![
                (PeriodKey::yearly(2018), 1),
                (PeriodKey::yearly(2019), 0),
                (PeriodKey::yearly(2020), 0),
                (PeriodKey::yearly(2021), 2),
            ]
        );
    }

    #[test]
    fn excluded_zones_are_zeroed() {
        let completer = SeriesCompleter::new(Granularity::Quarterly, Cutoff::new(2020, 1))
            .with_excluded_zones(["Central Park"]);
        let series = completer
            .complete(vec![
                Observation::new("Central Park", q(2020, 0), 12),
                Observation::new("Greenpoint", q(2020, 1), 4),
            ])
            .unwrap();

        assert_eq!(counts(&series, "Central Park"), vec![(q(2020, 0), 0), (q(2020, 1), 0)]);
        assert_eq!(counts(&series, "Greenpoint"), vec![(q(2020, 0), 0), (q(2020, 1), 4)]);
    }

    #[test]
    fn duplicate_observations_are_summed() {
        let completer = SeriesCompleter::new(Granularity::Quarterly, Cutoff::new(2020, 0));
        let series = completer
            .complete(vec![
                Observation::new("a", q(2020, 0), 2),
                Observation::new("a", q(2020, 0), 3),
            ])
            .unwrap();

        assert_eq!(counts(&series, "a"), vec![(q(2020, 0), 5)]);
    }

    #[test]
    fn empty_input_completes_to_nothing() {
        let completer = SeriesCompleter::new(Granularity::Yearly, Cutoff::new(2020, 3));
        let series = completer.complete(Vec::new()).unwrap();
        assert!(series.range().is_none());
        assert!(series.observations().is_empty());
    }

    #[test]
    fn rejects_mixed_granularity() {
        let completer = SeriesCompleter::new(Granularity::Yearly, Cutoff::new(2020, 3));
        let result = completer.complete(vec![Observation::new("a", q(2020, 0), 1)]);
        assert!(matches!(
            result,
            Err(SeriesError::GranularityMismatch {
                expected: Granularity::Yearly,
                ..
            })
        ));
    }

    #[test]
    fn output_is_sorted_by_zone_then_period() {
        let completer = SeriesCompleter::new(Granularity::Quarterly, Cutoff::new(2020, 3));
        let series = completer
            .complete(vec![
                Observation::new("b", q(2020, 3), 1),
                Observation::new("a", q(2020, 1), 1),
            ])
            .unwrap();

        let keys: Vec<_> = series
            .observations()
            .iter()
            .map(|o| (o.zone.clone(), o.period))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }
}
