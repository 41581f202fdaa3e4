//! Neighborhood boundaries built by unioning zip code polygons.

use arrest_trends_spatial::{ZonePartition, ZonePolygon};
use geo::{BooleanOps, MultiPolygon};

use crate::{NeighborhoodError, ZipNeighborhoodMap, zip::normalize_zip};

/// Unions the polygons of `zips` from the zip code partition.
///
/// Both the requested zips and the partition's zone names are normalized
/// before matching, so `"83"` finds a polygon named `"00083"` and the
/// other way round. Every polygon carrying a matching name is included.
///
/// # Errors
///
/// * [`NeighborhoodError::MalformedZip`] if a zip can't be normalized
/// * [`NeighborhoodError::UnknownZip`] if a zip has no polygon
pub fn build_neighborhood_polygon(
    zips: &[String],
    zip_partition: &ZonePartition,
) -> Result<MultiPolygon<f64>, NeighborhoodError> {
    let entries = zip_partition.entries();
    let mut union = MultiPolygon::<f64>(Vec::new());

    for raw in zips {
        let zip = normalize_zip(raw)?;
        let mut found = false;

        for entry in entries
            .iter()
            .filter(|e| normalize_zip(e.name()).is_ok_and(|name| name == zip))
        {
            union = if union.0.is_empty() {
                entry.polygon().clone()
            } else {
                union.union(entry.polygon())
            };
            found = true;
        }

        if !found {
            return Err(NeighborhoodError::UnknownZip { zip });
        }
    }

    Ok(union)
}

/// Builds one unioned polygon per neighborhood, in definition order.
///
/// The result can be installed as the neighborhood partition of a
/// `ZonePolygonSet`.
///
/// # Errors
///
/// Returns the first error from [`build_neighborhood_polygon`].
pub fn build_neighborhood_polygons(
    map: &ZipNeighborhoodMap,
    zip_partition: &ZonePartition,
) -> Result<Vec<ZonePolygon>, NeighborhoodError> {
    let polygons = map
        .neighborhoods()
        .map(|neighborhood| {
            build_neighborhood_polygon(&neighborhood.zips, zip_partition)
                .map(|polygon| ZonePolygon::new(neighborhood.name.clone(), polygon))
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::info!("Built {} neighborhood polygons", polygons.len());

    Ok(polygons)
}
