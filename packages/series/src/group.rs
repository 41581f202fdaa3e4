//! Grouping of labeled periods into per-zone counts.

use std::collections::BTreeMap;

use arrest_trends_series_models::{Observation, PeriodKey};
use arrest_trends_zone_models::ZoneLabel;

/// Counts records per `(zone, period)`.
///
/// Unresolved labels are skipped; they belong to no zone and never appear
/// as a zero-count zone. Output is sorted by `(zone, period)`.
pub fn count_by_zone<'a>(labels: impl IntoIterator<Item = (&'a ZoneLabel, PeriodKey)>) -> Vec<Observation> {
    let mut counts: BTreeMap<(&str, PeriodKey), u64> = BTreeMap::new();
    let mut unresolved = 0_u64;

    for (label, period) in labels {
        match label.as_resolved() {
            Some(zone) => *counts.entry((zone, period)).or_default() += 1,
            None => unresolved += 1,
        }
    }

    if unresolved > 0 {
        log::debug!("Skipped {unresolved} unresolved records while grouping");
    }

    counts
        .into_iter()
        .map(|((zone, period), count)| Observation::new(zone, period, count))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(name: &str) -> ZoneLabel {
        ZoneLabel::Resolved(name.to_string())
    }

    #[test]
    fn counts_per_zone_and_period() {
        let q0 = PeriodKey::quarterly(2020, 0);
        let q1 = PeriodKey::quarterly(2020, 1);
        let labels = [
            (resolved("b"), q0),
            (resolved("a"), q1),
            (resolved("a"), q0),
            (resolved("a"), q1),
        ];
        let observations = count_by_zone(labels.iter().map(|(label, period)| (label, *period)));

        assert_eq!(
            observations,
            vec![
                Observation::new("a", q0, 1),
                Observation::new("a", q1, 2),
                Observation::new("b", q0, 1),
            ]
        );
    }

    #[test]
    fn unresolved_labels_are_excluded() {
        let year = PeriodKey::yearly(2020);
        let labels = [(ZoneLabel::Unresolved, year), (resolved("a"), year), (ZoneLabel::Unresolved, year)];
        let observations = count_by_zone(labels.iter().map(|(label, period)| (label, *period)));

        assert_eq!(observations, vec![Observation::new("a", year, 1)]);
    }
}
