//! Zone labeling of arrest records.

use std::collections::BTreeMap;

use arrest_trends_arrest_models::ArrestRecord;
use arrest_trends_neighborhood::{NeighborhoodError, ZipNeighborhoodMap};
use arrest_trends_series_models::{Granularity, PeriodKey};
use arrest_trends_spatial::{ResolutionMethod, ZonePolygonSet, ZoneResolver};
use arrest_trends_zone_models::{ZoneLabel, ZoneType};

use crate::{PipelineConfig, PipelineError};

static UNRESOLVED: ZoneLabel = ZoneLabel::Unresolved;

/// An arrest record with one zone label per configured zone type.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRecord {
    /// The normalized record.
    pub record: ArrestRecord,
    /// Zone label per zone type.
    pub labels: BTreeMap<ZoneType, ZoneLabel>,
}

impl LabeledRecord {
    /// Label for `zone_type`; unresolved if the type wasn't labeled.
    #[must_use]
    pub fn label(&self, zone_type: ZoneType) -> &ZoneLabel {
        self.labels.get(&zone_type).unwrap_or(&UNRESOLVED)
    }

    /// The record's reporting period at `granularity`.
    #[must_use]
    pub const fn period(&self, granularity: Granularity) -> PeriodKey {
        match granularity {
            Granularity::Quarterly => PeriodKey::quarterly(self.record.year, self.record.quarter),
            Granularity::Yearly => PeriodKey::yearly(self.record.year),
        }
    }
}

/// Labels every record with one zone per configured zone type.
///
/// Polygon-backed zone types go through a [`ZoneResolver`] each. The
/// neighborhood label is derived from the zip code label: an unresolved
/// zip gives an unresolved neighborhood.
///
/// # Errors
///
/// * [`PipelineError::UnknownZip`] if a record resolves to a zip code
///   that no neighborhood lists
/// * [`PipelineError::Neighborhood`] if a resolved zip name is malformed
pub fn label_records(
    records: Vec<ArrestRecord>,
    polygons: &ZonePolygonSet,
    neighborhoods: &ZipNeighborhoodMap,
    config: &PipelineConfig,
) -> Result<Vec<LabeledRecord>, PipelineError> {
    let resolvers: Vec<ZoneResolver<'_>> = config
        .resolved_zone_types()
        .into_iter()
        .map(|zone_type| ZoneResolver::new(polygons, zone_type, &config.overrides))
        .collect();
    let derive_neighborhood = config.zone_types.contains(&ZoneType::Neighborhood);

    let mut tallies: BTreeMap<(ZoneType, ResolutionMethod), usize> = BTreeMap::new();
    let mut labeled = Vec::with_capacity(records.len());

    for record in records {
        let mut labels = BTreeMap::new();

        for resolver in &resolvers {
            let resolution = resolver.resolve_with_method(&record.location);
            *tallies
                .entry((resolver.zone_type(), resolution.method))
                .or_default() += 1;
            labels.insert(resolver.zone_type(), resolution.label);
        }

        if derive_neighborhood {
            let zip = labels.get(&ZoneType::Zipcode).unwrap_or(&UNRESOLVED);
            let neighborhood = neighborhood_label(zip, neighborhoods, &record.arrest_key)?;
            labels.insert(ZoneType::Neighborhood, neighborhood);
        }

        labels.retain(|zone_type, _| config.zone_types.contains(zone_type));
        labeled.push(LabeledRecord { record, labels });
    }

    for ((zone_type, method), count) in &tallies {
        log::debug!("'{zone_type}': {count} records labeled by {method:?}");
    }
    log::info!(
        "Labeled {} records across {} zone types",
        labeled.len(),
        config.zone_types.len()
    );

    Ok(labeled)
}

/// Neighborhood for a zip code label.
fn neighborhood_label(
    zip: &ZoneLabel,
    neighborhoods: &ZipNeighborhoodMap,
    arrest_key: &str,
) -> Result<ZoneLabel, PipelineError> {
    let Some(zip) = zip.as_resolved() else {
        return Ok(ZoneLabel::Unresolved);
    };

    match neighborhoods.neighborhood_for(zip) {
        Ok(name) => Ok(ZoneLabel::Resolved(name.to_string())),
        Err(NeighborhoodError::UnknownZip { zip }) => Err(PipelineError::UnknownZip {
            arrest_key: arrest_key.to_string(),
            zip,
        }),
        Err(e) => Err(e.into()),
    }
}

/// Replaces every existing record from `year` with `incoming`.
///
/// The year-to-date export always contains the whole current year, so a
/// refresh drops the stale copy rather than appending to it.
#[must_use]
pub fn merge_year(
    existing: Vec<LabeledRecord>,
    incoming: Vec<LabeledRecord>,
    year: i32,
) -> Vec<LabeledRecord> {
    let before = existing.len();
    let added = incoming.len();

    let mut merged = incoming;
    merged.extend(existing.into_iter().filter(|r| r.record.year != year));
    let replaced = before + added - merged.len();

    log::info!(
        "Replaced {replaced} {year} records with {added}; {} records total",
        merged.len()
    );

    merged
}
