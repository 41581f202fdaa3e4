//! Compile-time registry of the default neighborhood grouping.
//!
//! The grouping is embedded via `include_str!` from
//! `data/neighborhoods.toml`. Callers with their own grouping build a
//! [`ZipNeighborhoodMap`] with [`ZipNeighborhoodMap::from_toml`] instead.

use crate::ZipNeighborhoodMap;

/// Number of neighborhoods in the bundled grouping. Enforced by a test.
#[cfg(test)]
const EXPECTED_NEIGHBORHOOD_COUNT: usize = 45;

/// Embedded default grouping.
const NEIGHBORHOODS_TOML: &str = include_str!("../data/neighborhoods.toml");

/// Returns the bundled zip-to-neighborhood mapping.
///
/// # Panics
///
/// Panics if the embedded TOML fails to parse or is inconsistent. Since
/// it is a compile-time constant, a failure indicates a development error
/// and is caught during CI.
#[must_use]
pub fn bundled() -> ZipNeighborhoodMap {
    ZipNeighborhoodMap::from_toml(NEIGHBORHOODS_TOML)
        .unwrap_or_else(|e| panic!("Failed to load bundled neighborhood grouping: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn loads_all_neighborhoods() {
        let map = bundled();
        assert_eq!(
            map.len(),
            EXPECTED_NEIGHBORHOOD_COUNT,
            "Expected {EXPECTED_NEIGHBORHOOD_COUNT} neighborhoods, found {}. \
             Update EXPECTED_NEIGHBORHOOD_COUNT after adding/removing neighborhoods.",
            map.len()
        );
    }

    #[test]
    fn neighborhood_names_are_unique() {
        let map = bundled();
        let mut seen = BTreeSet::new();
        for neighborhood in map.neighborhoods() {
            assert!(
                seen.insert(&neighborhood.name),
                "Duplicate neighborhood name: {}",
                neighborhood.name
            );
        }
    }

    #[test]
    fn every_neighborhood_has_zips() {
        for neighborhood in bundled().neighborhoods() {
            assert!(
                !neighborhood.zips.is_empty(),
                "Neighborhood '{}' has no zip codes",
                neighborhood.name
            );
        }
    }

    #[test]
    fn no_baseline_neighborhoods_are_parks_and_airports() {
        let excluded: BTreeSet<String> = bundled().excluded_zones().into_iter().collect();
        let expected: BTreeSet<String> = ["Central Park", "Laguardia Airport", "JFK Airport"]
            .into_iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(excluded, expected);
    }

    #[test]
    fn known_zips_resolve() {
        let map = bundled();
        assert_eq!(map.neighborhood_for("11211").unwrap(), "Greenpoint");
        assert_eq!(map.neighborhood_for("10466").unwrap(), "Northeast Bronx");
        assert_eq!(map.neighborhood_for("83").unwrap(), "Central Park");
    }

    #[test]
    fn grouping_round_trips() {
        let map = bundled();
        let inverse = map.inverse();
        let mut zip_count = 0;
        for neighborhood in map.neighborhoods() {
            let mut zips: Vec<&str> = neighborhood.zips.iter().map(String::as_str).collect();
            zips.sort_unstable();
            assert_eq!(
                inverse[neighborhood.name.as_str()],
                zips,
                "Round trip mismatch for '{}'",
                neighborhood.name
            );
            zip_count += zips.len();
        }
        assert_eq!(zip_count, map.zips().count());
    }
}
