//! CSV row streams for series tables, labeled records and neighborhood
//! metrics.

use std::collections::BTreeMap;
use std::io::Write;

use arrest_trends_arrest::record::ARREST_DATE_FORMAT;
use arrest_trends_neighborhood_models::{MetricSchema, NeighborhoodMetric};
use arrest_trends_zone_models::ZoneType;

use crate::{LabeledRecord, PipelineError, SeriesTable};

/// Header of [`write_series`] output.
pub const SERIES_HEADER: [&str; 6] = ["zone", "zone_type", "year", "quarter", "count", "change"];

/// Source columns carried through [`write_labeled_records`] ahead of the
/// zone columns.
const RECORD_COLUMNS: [&str; 13] = [
    "ARREST_KEY",
    "ARREST_DATE",
    "PD_DESC",
    "OFNS_DESC",
    "LAW_CODE",
    "LAW_CAT_CD",
    "ARREST_BORO",
    "ARREST_PRECINCT",
    "AGE_GROUP",
    "PERP_SEX",
    "PERP_RACE",
    "Latitude",
    "Longitude",
];

/// Writes one row per series point.
///
/// Yearly rows leave `quarter` blank and rows with no change leave
/// `change` blank.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] or [`PipelineError::Io`] if writing
/// fails.
pub fn write_series<W: Write>(writer: W, table: &SeriesTable) -> Result<(), PipelineError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(SERIES_HEADER)?;

    for point in &table.points {
        csv.write_record([
            point.zone.clone(),
            point.zone_type.to_string(),
            point.period.year().to_string(),
            point.period.quarter().map(|q| q.to_string()).unwrap_or_default(),
            point.count.to_string(),
            point.change.map(|c| c.to_string()).unwrap_or_default(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Writes labeled records with their source columns, one column per zone
/// type and the derived offense and period columns.
///
/// Missing locations and unresolved labels are written blank.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] or [`PipelineError::Io`] if writing
/// fails.
pub fn write_labeled_records<W: Write>(
    writer: W,
    records: &[LabeledRecord],
    zone_types: &[ZoneType],
) -> Result<(), PipelineError> {
    let mut csv = csv::Writer::from_writer(writer);

    let header: Vec<&str> = RECORD_COLUMNS
        .into_iter()
        .chain(zone_types.iter().map(|zone_type| zone_type.column_name()))
        .chain(["Offense", "ARREST_YEAR", "ARREST_QUARTER"])
        .collect();
    csv.write_record(&header)?;

    for labeled in records {
        let record = &labeled.record;
        let details = &record.details;
        let (lat, lng) = if record.location.is_missing() {
            (String::new(), String::new())
        } else {
            (record.location.lat.to_string(), record.location.lng.to_string())
        };

        let mut row: Vec<String> = vec![
            record.arrest_key.clone(),
            record.date.format(ARREST_DATE_FORMAT).to_string(),
            details.pd_desc.clone().unwrap_or_default(),
            details.ofns_desc.clone().unwrap_or_default(),
            record.law_code.clone().unwrap_or_default(),
            details.law_cat_cd.clone().unwrap_or_default(),
            details.arrest_boro.clone().unwrap_or_default(),
            details.arrest_precinct.clone().unwrap_or_default(),
            details.age_group.clone().unwrap_or_default(),
            details.perp_sex.clone().unwrap_or_default(),
            details.perp_race.clone().unwrap_or_default(),
            lat,
            lng,
        ];
        row.extend(zone_types.iter().map(|&zone_type| labeled.label(zone_type).to_string()));
        row.push(record.offense.clone());
        row.push(record.year.to_string());
        row.push(record.quarter.to_string());

        csv.write_record(&row)?;
    }

    csv.flush()?;
    log::info!("Wrote {} labeled records", records.len());
    Ok(())
}

/// Writes neighborhood metrics wide: one row per `(neighborhood, year)`
/// with one column per schema metric, in schema order.
///
/// Metrics absent for a row are written blank.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] or [`PipelineError::Io`] if writing
/// fails.
pub fn write_neighborhood_metrics<W: Write>(
    writer: W,
    metrics: &[NeighborhoodMetric],
    schema: &MetricSchema,
) -> Result<(), PipelineError> {
    let mut rows: BTreeMap<(&str, i32), BTreeMap<&str, f64>> = BTreeMap::new();
    for metric in metrics {
        rows.entry((metric.neighborhood.as_str(), metric.year))
            .or_default()
            .insert(metric.metric.as_str(), metric.value);
    }

    let columns: Vec<&str> = schema.metrics().map(|(name, _)| name).collect();

    let mut csv = csv::Writer::from_writer(writer);
    let header: Vec<&str> = ["Neighborhood", "Year"]
        .into_iter()
        .chain(columns.iter().copied())
        .collect();
    csv.write_record(&header)?;

    for ((neighborhood, year), values) in &rows {
        let mut row = vec![(*neighborhood).to_string(), year.to_string()];
        row.extend(
            columns
                .iter()
                .map(|column| values.get(column).map(ToString::to_string).unwrap_or_default()),
        );
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(())
}
