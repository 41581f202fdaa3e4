//! Aggregation of per-zip census metrics into per-neighborhood metrics.
//!
//! Population and count metrics are summed. Rate and median metrics are
//! population-weighted means: each zip contributes `pop / total_pop *
//! value`. A zip that has a population but is missing the metric is
//! filled with the unweighted mean of the metric over the neighborhood's
//! other zips, weighted by that zip's population. A zip with no
//! population figure contributes nothing to a mean.

use std::collections::BTreeMap;

use arrest_trends_neighborhood_models::{
    MetricKind, MetricSchema, NeighborhoodMetric, ZipMetricRow,
};

use crate::{NeighborhoodError, ZipNeighborhoodMap, zip::normalize_zip};

/// Aggregates one year of zip rows into neighborhood metrics.
///
/// Rows are matched to neighborhoods by normalized zip; zips with no row
/// are treated as missing every metric. Rows for zips outside the mapping
/// are ignored. Output is grouped by neighborhood (definition order) with
/// metrics in schema order.
///
/// # Errors
///
/// Returns [`NeighborhoodError::MalformedZip`] if a row's zip can't be
/// normalized.
pub fn aggregate_metrics(
    rows: &[ZipMetricRow],
    year: i32,
    map: &ZipNeighborhoodMap,
    schema: &MetricSchema,
) -> Result<Vec<NeighborhoodMetric>, NeighborhoodError> {
    let mut by_zip: BTreeMap<String, &ZipMetricRow> = BTreeMap::new();
    for row in rows.iter().filter(|r| r.year == year) {
        let zip = normalize_zip(&row.zip)?;
        if by_zip.insert(zip, row).is_some() {
            log::warn!("Duplicate census row for zip {} in {year}; keeping the last", row.zip);
        }
    }

    let mut metrics = Vec::new();

    for neighborhood in map.neighborhoods() {
        let zip_rows: Vec<Option<&ZipMetricRow>> = neighborhood
            .zips
            .iter()
            .map(|zip| by_zip.get(zip).copied())
            .collect();

        let populations: Vec<Option<f64>> = zip_rows
            .iter()
            .map(|row| row.and_then(|r| r.get(&schema.population)))
            .collect();
        let total_population: f64 = populations.iter().flatten().sum();

        for (metric, kind) in schema.metrics() {
            let values: Vec<Option<f64>> = zip_rows
                .iter()
                .map(|row| row.and_then(|r| r.get(metric)))
                .collect();

            let value = match kind {
                MetricKind::Population => total_population,
                MetricKind::Summed => values.iter().flatten().sum(),
                MetricKind::Mean => weighted_mean(&populations, &values, total_population),
            };

            metrics.push(NeighborhoodMetric {
                neighborhood: neighborhood.name.clone(),
                year,
                metric: metric.to_string(),
                value,
            });
        }
    }

    Ok(metrics)
}

/// Aggregates every year present in `rows`.
///
/// Output is ordered by `(neighborhood, year, metric)`.
///
/// # Errors
///
/// Returns the first error from [`aggregate_metrics`].
pub fn aggregate_years(
    rows: &[ZipMetricRow],
    map: &ZipNeighborhoodMap,
    schema: &MetricSchema,
) -> Result<Vec<NeighborhoodMetric>, NeighborhoodError> {
    let mut years: Vec<i32> = rows.iter().map(|r| r.year).collect();
    years.sort_unstable();
    years.dedup();

    let mut metrics = Vec::new();
    for year in years {
        metrics.extend(aggregate_metrics(rows, year, map, schema)?);
    }

    metrics.sort_by(|a, b| {
        a.neighborhood
            .cmp(&b.neighborhood)
            .then(a.year.cmp(&b.year))
            .then_with(|| a.metric.cmp(&b.metric))
    });

    log::info!("Aggregated {} neighborhood metric rows", metrics.len());

    Ok(metrics)
}

/// Population-weighted mean with the unweighted-mean gap fill.
///
/// Zero total population yields `0.0`.
fn weighted_mean(populations: &[Option<f64>], values: &[Option<f64>], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }

    let present: Vec<f64> = values.iter().flatten().copied().collect();
    #[allow(clippy::cast_precision_loss)]
    let fill = (!present.is_empty()).then(|| present.iter().sum::<f64>() / present.len() as f64);

    populations
        .iter()
        .zip(values)
        .filter_map(|(population, value)| {
            let weight = (*population)? / total;
            value.or(fill).map(|v| weight * v)
        })
        .sum()
}
