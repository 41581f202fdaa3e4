//! Raw export row normalization.

use arrest_trends_arrest_models::{ArrestDetails, ArrestRecord, RawArrestRow};
use arrest_trends_zone_models::Coordinate;
use chrono::{Datelike as _, NaiveDate};

use crate::{ArrestError, OffenseTable};

/// Date format of the `ARREST_DATE` column.
pub const ARREST_DATE_FORMAT: &str = "%m/%d/%Y";

/// Parses an `MM/DD/YYYY` arrest date.
///
/// Returns `None` if the string is not a valid date in that format.
#[must_use]
pub fn parse_arrest_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ARREST_DATE_FORMAT).ok()
}

/// Zero-based quarter of a date: January–March is 0, October–December 3.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn quarter_of(date: NaiveDate) -> u8 {
    (date.month0() / 3) as u8
}

/// Normalizes one export row.
///
/// Absent coordinates are filled with `0.0`, which makes the record
/// unlocated. A blank law code is treated as missing.
///
/// # Errors
///
/// Returns [`ArrestError::InvalidDate`] if `ARREST_DATE` doesn't parse.
pub fn normalize_row(row: RawArrestRow, offenses: &OffenseTable) -> Result<ArrestRecord, ArrestError> {
    let Some(date) = parse_arrest_date(&row.arrest_date) else {
        return Err(ArrestError::InvalidDate {
            arrest_key: row.arrest_key,
            value: row.arrest_date,
        });
    };

    let law_code = row
        .law_code
        .map(|code| code.trim().to_string())
        .filter(|code| !code.is_empty());
    let offense = offenses.classify(law_code.as_deref()).to_string();

    Ok(ArrestRecord {
        arrest_key: row.arrest_key,
        date,
        year: date.year(),
        quarter: quarter_of(date),
        location: Coordinate::from_optional(row.longitude, row.latitude),
        law_code,
        offense,
        details: ArrestDetails {
            pd_desc: row.pd_desc,
            ofns_desc: row.ofns_desc,
            law_cat_cd: row.law_cat_cd,
            arrest_boro: row.arrest_boro,
            arrest_precinct: row.arrest_precinct,
            age_group: row.age_group,
            perp_sex: row.perp_sex,
            perp_race: row.perp_race,
        },
    })
}

/// Normalizes a batch of export rows, stopping at the first bad row.
///
/// # Errors
///
/// Returns the first error from [`normalize_row`].
pub fn normalize_rows(
    rows: impl IntoIterator<Item = RawArrestRow>,
    offenses: &OffenseTable,
) -> Result<Vec<ArrestRecord>, ArrestError> {
    let records = rows
        .into_iter()
        .map(|row| normalize_row(row, offenses))
        .collect::<Result<Vec<_>, _>>()?;

    let unlocated = records.iter().filter(|r| r.location.is_missing()).count();
    log::info!(
        "Normalized {} arrest records ({unlocated} without a location)",
        records.len()
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offenses() -> OffenseTable {
        OffenseTable::from_toml(
            r#"
            [[offense]]
            code = "PL 120"
            category = "Assault"
            "#,
        )
        .unwrap()
    }

    fn row(key: &str, date: &str) -> RawArrestRow {
        RawArrestRow {
            arrest_key: key.to_string(),
            arrest_date: date.to_string(),
            ..RawArrestRow::default()
        }
    }

    #[test]
    fn parses_export_dates() {
        assert_eq!(
            parse_arrest_date("12/31/2017"),
            NaiveDate::from_ymd_opt(2017, 12, 31)
        );
        assert_eq!(parse_arrest_date("01/02/2018"), NaiveDate::from_ymd_opt(2018, 1, 2));
        assert_eq!(parse_arrest_date("2018-01-02"), None);
        assert_eq!(parse_arrest_date("13/01/2018"), None);
    }

    #[test]
    fn quarters_are_zero_based() {
        let quarter = |m| quarter_of(NaiveDate::from_ymd_opt(2020, m, 1).unwrap());
        assert_eq!(quarter(1), 0);
        assert_eq!(quarter(3), 0);
        assert_eq!(quarter(4), 1);
        assert_eq!(quarter(9), 2);
        assert_eq!(quarter(10), 3);
        assert_eq!(quarter(12), 3);
    }

    #[test]
    fn normalizes_located_row() {
        let raw = RawArrestRow {
            law_code: Some("PL 1200500".to_string()),
            latitude: Some(40.7),
            longitude: Some(-73.9),
            perp_sex: Some("M".to_string()),
            ..row("1", "05/17/2021")
        };
        let record = normalize_row(raw, &offenses()).unwrap();

        assert_eq!(record.year, 2021);
        assert_eq!(record.quarter, 1);
        assert_eq!(record.location, Coordinate::new(-73.9, 40.7));
        assert_eq!(record.offense, "Assault");
        assert_eq!(record.details.perp_sex.as_deref(), Some("M"));
    }

    #[test]
    fn missing_location_and_code() {
        let raw = RawArrestRow {
            law_code: Some("  ".to_string()),
            latitude: Some(40.7),
            ..row("2", "11/30/2019")
        };
        let record = normalize_row(raw, &offenses()).unwrap();

        assert!(record.location.is_missing());
        assert_eq!(record.law_code, None);
        assert_eq!(record.offense, "Other");
    }

    #[test]
    fn invalid_date_is_an_error() {
        let result = normalize_rows(vec![row("1", "01/01/2020"), row("3", "yesterday")], &offenses());
        assert!(matches!(
            result,
            Err(ArrestError::InvalidDate { arrest_key, .. }) if arrest_key == "3"
        ));
    }
}
