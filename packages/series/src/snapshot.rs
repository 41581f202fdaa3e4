//! Cross-zone view of a single period: counts, change, rates and ranks.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use arrest_trends_series_models::{PeriodKey, ZoneSeriesPoint};

/// One zone's figures for the snapshot period.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    /// Zone name.
    pub zone: String,
    /// Arrests in the period.
    pub count: u64,
    /// Percent change from the previous period.
    pub change: Option<f64>,
    /// Arrests per 100 residents; `0.0` when the population is unknown
    /// or zero.
    pub per_hundred: f64,
    /// 1-based rank by count, highest first.
    pub count_rank: usize,
    /// 1-based rank by change, highest first. Zones with no change rank
    /// last.
    pub change_rank: usize,
    /// 1-based rank by arrests per 100 residents, highest first.
    pub rate_rank: usize,
}

/// Every zone's figures for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSnapshot {
    /// The period described.
    pub period: PeriodKey,
    /// Rows sorted by zone name.
    pub rows: Vec<SnapshotRow>,
}

impl PeriodSnapshot {
    /// Builds the snapshot for `period`.
    ///
    /// `populations` maps zone name to resident population. Ranks are
    /// descending; equal values keep zone-name order.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn for_period(
        series: &[ZoneSeriesPoint],
        period: PeriodKey,
        populations: &BTreeMap<String, f64>,
    ) -> Self {
        let mut rows: Vec<SnapshotRow> = series
            .iter()
            .filter(|point| point.period == period)
            .map(|point| {
                let per_hundred = populations
                    .get(&point.zone)
                    .copied()
                    .filter(|population| *population > 0.0)
                    .map_or(0.0, |population| point.count as f64 / population * 100.0);
                SnapshotRow {
                    zone: point.zone.clone(),
                    count: point.count,
                    change: point.change,
                    per_hundred,
                    count_rank: 0,
                    change_rank: 0,
                    rate_rank: 0,
                }
            })
            .collect();
        rows.sort_by(|a, b| a.zone.cmp(&b.zone));

        assign_ranks(&mut rows, |a, b| b.count.cmp(&a.count), |row, rank| row.count_rank = rank);
        assign_ranks(
            &mut rows,
            |a, b| match (a.change, b.change) {
                (Some(a), Some(b)) => b.total_cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            |row, rank| row.change_rank = rank,
        );
        assign_ranks(
            &mut rows,
            |a, b| b.per_hundred.total_cmp(&a.per_hundred),
            |row, rank| row.rate_rank = rank,
        );

        Self { period, rows }
    }

    /// Row for `zone`, if it has one.
    #[must_use]
    pub fn row(&self, zone: &str) -> Option<&SnapshotRow> {
        self.rows.iter().find(|row| row.zone == zone)
    }

    /// Rows ordered by count rank.
    #[must_use]
    pub fn by_count(&self) -> Vec<&SnapshotRow> {
        let mut rows: Vec<_> = self.rows.iter().collect();
        rows.sort_by_key(|row| row.count_rank);
        rows
    }
}

/// Ranks `rows` by `compare` (stable over the current order) and stores
/// each 1-based rank with `set`.
fn assign_ranks(
    rows: &mut [SnapshotRow],
    compare: impl Fn(&SnapshotRow, &SnapshotRow) -> Ordering,
    set: impl Fn(&mut SnapshotRow, usize),
) {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| compare(&rows[a], &rows[b]));
    for (rank, index) in order.into_iter().enumerate() {
        set(&mut rows[index], rank + 1);
    }
}
