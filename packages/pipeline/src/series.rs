//! Per-zone series tables.

use arrest_trends_series::{ChangeCalculator, PeriodRange, SeriesCompleter, count_by_zone};
use arrest_trends_series_models::{Granularity, ZoneSeriesPoint};
use arrest_trends_zone_models::ZoneType;

use crate::{LabeledRecord, PipelineConfig, PipelineError};

/// A completed series for one zone type at one granularity.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTable {
    /// Zone type of every row.
    pub zone_type: ZoneType,
    /// Period granularity of every row.
    pub granularity: Granularity,
    /// Periods covered by every zone; `None` for an empty table.
    pub range: Option<PeriodRange>,
    /// Rows sorted by `(zone, period)`.
    pub points: Vec<ZoneSeriesPoint>,
}

impl SeriesTable {
    /// Rows for one zone, in period order.
    pub fn zone<'a>(&'a self, zone: &'a str) -> impl Iterator<Item = &'a ZoneSeriesPoint> {
        self.points.iter().filter(move |point| point.zone == zone)
    }
}

/// Groups, completes and annotates the series for one zone type.
///
/// The series starts at the configured start year, or at the first
/// completed period when none is configured. Completed periods before a
/// configured start are dropped, so only each zone's first row lacks a
/// change.
///
/// # Errors
///
/// Returns [`PipelineError::Series`] if completion or change computation
/// fails.
pub fn build_series(
    labeled: &[LabeledRecord],
    zone_type: ZoneType,
    granularity: Granularity,
    config: &PipelineConfig,
) -> Result<SeriesTable, PipelineError> {
    let observations = count_by_zone(
        labeled
            .iter()
            .map(|record| (record.label(zone_type), record.period(granularity))),
    );

    let completed = SeriesCompleter::new(granularity, config.cutoff)
        .with_excluded_zones(config.excluded_zones_for(zone_type).iter().cloned())
        .complete(observations)?;

    let Some(range) = completed.range() else {
        log::warn!("No resolved '{zone_type}' records; {granularity} series is empty");
        return Ok(SeriesTable {
            zone_type,
            granularity,
            range: None,
            points: Vec::new(),
        });
    };

    let series_start = config.series_start(granularity).unwrap_or_else(|| range.start());
    let mut observations = completed.into_observations();
    let range = if series_start > range.start() {
        observations.retain(|observation| observation.period >= series_start);
        log::debug!("Trimmed {granularity} '{zone_type}' series to start at {series_start}");
        PeriodRange::new(series_start, range.end())
    } else {
        range
    };
    let points = ChangeCalculator::new(zone_type, series_start).compute(&observations)?;

    log::info!(
        "Built {granularity} '{zone_type}' series: {} rows",
        points.len()
    );

    Ok(SeriesTable {
        zone_type,
        granularity,
        range: Some(range).filter(|range| !range.is_empty()),
        points,
    })
}

/// Builds quarterly and yearly series for every configured zone type.
///
/// # Errors
///
/// Returns the first error from [`build_series`].
pub fn build_all_series(
    labeled: &[LabeledRecord],
    config: &PipelineConfig,
) -> Result<Vec<SeriesTable>, PipelineError> {
    let mut tables = Vec::with_capacity(config.zone_types.len() * Granularity::all().len());
    for &zone_type in &config.zone_types {
        for &granularity in Granularity::all() {
            tables.push(build_series(labeled, zone_type, granularity, config)?);
        }
    }
    Ok(tables)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use arrest_trends_arrest::{OffenseTable, normalize_row};
    use arrest_trends_arrest_models::RawArrestRow;
    use arrest_trends_series::SeriesError;
    use arrest_trends_series_models::{Cutoff, PeriodKey};
    use arrest_trends_zone_models::ZoneLabel;

    use super::*;

    fn labeled(date: &str, labels: &[(ZoneType, Option<&str>)]) -> LabeledRecord {
        let raw = RawArrestRow {
            arrest_key: date.to_string(),
            arrest_date: date.to_string(),
            ..RawArrestRow::default()
        };
        LabeledRecord {
            record: normalize_row(raw, &OffenseTable::default()).unwrap(),
            labels: labels
                .iter()
                .map(|(zone_type, name)| (*zone_type, ZoneLabel::from(name.map(ToString::to_string))))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn config(cutoff: Cutoff) -> PipelineConfig {
        let mut config = PipelineConfig::new(cutoff);
        config.zone_types = vec![ZoneType::PolicePrecinct, ZoneType::Neighborhood];
        config
    }

    #[test]
    fn quarterly_series_is_dense_with_change() {
        let records = vec![
            labeled("01/10/2020", &[(ZoneType::PolicePrecinct, Some("90"))]),
            labeled("02/10/2020", &[(ZoneType::PolicePrecinct, Some("90"))]),
            labeled("08/10/2020", &[(ZoneType::PolicePrecinct, Some("90"))]),
            labeled("08/11/2020", &[(ZoneType::PolicePrecinct, None)]),
        ];
        let table = build_series(
            &records,
            ZoneType::PolicePrecinct,
            Granularity::Quarterly,
            &config(Cutoff::new(2020, 3)),
        )
        .unwrap();

        let rows: Vec<_> = table.zone("90").map(|p| (p.period, p.count, p.change)).collect();
        assert_eq!(
            rows,
            vec![
                (PeriodKey::quarterly(2020, 0), 2, None),
                (PeriodKey::quarterly(2020, 1), 0, Some(-100.0)),
                (PeriodKey::quarterly(2020, 2), 1, Some(100.0)),
                (PeriodKey::quarterly(2020, 3), 0, Some(-100.0)),
            ]
        );
        assert_eq!(table.points.len(), 4, "unresolved records form no zone");
    }

    #[test]
    fn excluded_neighborhoods_are_zeroed() {
        let records = vec![
            labeled("03/01/2021", &[(ZoneType::Neighborhood, Some("Central Park"))]),
            labeled("03/02/2021", &[(ZoneType::Neighborhood, Some("Greenpoint"))]),
        ];
        let table = build_series(
            &records,
            ZoneType::Neighborhood,
            Granularity::Yearly,
            &config(Cutoff::new(2021, 1)),
        )
        .unwrap();

        let park: Vec<_> = table.zone("Central Park").map(|p| p.count).collect();
        let greenpoint: Vec<_> = table.zone("Greenpoint").map(|p| p.count).collect();
        assert_eq!(park, vec![0]);
        assert_eq!(greenpoint, vec![1]);
    }

    #[test]
    fn configured_start_must_be_covered() {
        let mut config = config(Cutoff::new(2021, 3));
        config.series_start_year = Some(2019);
        let records = vec![labeled("03/01/2021", &[(ZoneType::PolicePrecinct, Some("90"))])];

        let result = build_series(&records, ZoneType::PolicePrecinct, Granularity::Yearly, &config);
        assert!(matches!(
            result,
            Err(PipelineError::Series(SeriesError::MissingPredecessor { .. }))
        ));
    }

    #[test]
    fn later_configured_start_trims_earlier_periods() {
        let mut config = config(Cutoff::new(2021, 3));
        config.series_start_year = Some(2021);
        config.validate().unwrap();
        let records = vec![
            labeled("01/01/2020", &[(ZoneType::PolicePrecinct, Some("90"))]),
            labeled("01/01/2021", &[(ZoneType::PolicePrecinct, Some("90"))]),
        ];

        let yearly =
            build_series(&records, ZoneType::PolicePrecinct, Granularity::Yearly, &config).unwrap();
        let rows: Vec<_> = yearly.zone("90").map(|p| (p.period, p.count, p.change)).collect();
        assert_eq!(rows, vec![(PeriodKey::yearly(2021), 1, None)]);
        assert_eq!(yearly.range.unwrap().start(), PeriodKey::yearly(2021));

        let quarterly =
            build_series(&records, ZoneType::PolicePrecinct, Granularity::Quarterly, &config)
                .unwrap();
        let points: Vec<_> = quarterly.zone("90").collect();
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].period, PeriodKey::quarterly(2021, 0));
        assert_eq!(
            points.iter().filter(|p| p.change.is_none()).count(),
            1,
            "only the first row of a zone lacks a change"
        );
    }

    #[test]
    fn empty_input_gives_empty_tables() {
        let tables = build_all_series(&[], &config(Cutoff::new(2021, 3))).unwrap();
        assert_eq!(tables.len(), 4);
        assert!(tables.iter().all(|t| t.points.is_empty() && t.range.is_none()));
        assert_eq!(tables[0].zone_type, ZoneType::PolicePrecinct);
        assert_eq!(tables[0].granularity, Granularity::Quarterly);
        assert_eq!(tables[3].zone_type, ZoneType::Neighborhood);
        assert_eq!(tables[3].granularity, Granularity::Yearly);
    }
}
