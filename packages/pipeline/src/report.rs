//! Summary figures over labeled records.

use std::collections::BTreeMap;

use arrest_trends_arrest_models::ArrestRecord;

/// How often one offense category occurs.
#[derive(Debug, Clone, PartialEq)]
pub struct OffenseShare {
    /// Offense category.
    pub offense: String,
    /// Records in the category.
    pub count: u64,
    /// Share of all records, `0.0..=100.0`.
    pub percent: f64,
}

/// The `limit` most common offense categories among `records`, most
/// common first. Equal counts are ordered by name.
///
/// Percentages are of every record, not just the returned categories.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn offense_shares<'a>(
    records: impl IntoIterator<Item = &'a ArrestRecord>,
    limit: usize,
) -> Vec<OffenseShare> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    let mut total = 0_u64;
    for record in records {
        *counts.entry(record.offense.as_str()).or_default() += 1;
        total += 1;
    }

    let mut ranked: Vec<(&str, u64)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    ranked
        .into_iter()
        .take(limit)
        .map(|(offense, count)| OffenseShare {
            offense: offense.to_string(),
            count,
            percent: count as f64 / total as f64 * 100.0,
        })
        .collect()
}
