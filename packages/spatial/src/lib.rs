#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory zone polygons and point-to-zone resolution.
//!
//! Polygons are grouped into partitions by zone-type id (e.g. `"zipcode"`,
//! `"pp"`). Each partition is backed by an R-tree used purely as a
//! candidate filter; which polygon wins is decided by the ordered rules in
//! [`resolver::ZoneResolver`], so results are identical to scanning every
//! polygon in encounter order.

pub mod partition;
pub mod resolver;

use std::collections::BTreeMap;

use arrest_trends_zone_models::ZoneType;
use geo::MultiPolygon;
use geojson::GeoJson;
use thiserror::Error;

pub use partition::ZonePartition;
pub use resolver::{Resolution, ResolutionMethod, ZoneResolver};

/// Feature property holding the zone-type id in boundary `GeoJSON`.
pub const BOUNDARY_TYPE_PROPERTY: &str = "id";

/// Feature property holding the zone name in boundary `GeoJSON`.
pub const BOUNDARY_NAME_PROPERTY: &str = "nameCol";

/// Errors that can occur while building zone polygon sets.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// `GeoJSON` parsing failed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// The document was valid `GeoJSON` but not a `FeatureCollection`.
    #[error("Expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    /// A feature lacked a required property.
    #[error("Feature {index} is missing property '{property}'")]
    MissingProperty {
        /// Position of the feature in the collection.
        index: usize,
        /// Name of the missing property.
        property: String,
    },

    /// A feature's geometry was absent or not polygonal.
    #[error("Zone '{name}' has no polygonal geometry")]
    UnsupportedGeometry {
        /// Zone name of the offending feature.
        name: String,
    },
}

/// A named zone boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonePolygon {
    /// Zone name (e.g. `"11211"`, `"90"`).
    pub name: String,
    /// Zone geometry.
    pub polygon: MultiPolygon<f64>,
}

impl ZonePolygon {
    /// Creates a zone polygon from any polygonal geometry.
    #[must_use]
    pub fn new(name: impl Into<String>, polygon: impl Into<MultiPolygon<f64>>) -> Self {
        Self {
            name: name.into(),
            polygon: polygon.into(),
        }
    }

    /// Parses a zone polygon from a `GeoJSON` geometry string.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the string is not valid `GeoJSON` or the
    /// geometry is not a `Polygon`/`MultiPolygon`.
    pub fn from_geojson(name: impl Into<String>, geojson_str: &str) -> Result<Self, SpatialError> {
        let name = name.into();
        let geojson: GeoJson = geojson_str.parse()?;
        let polygon = match geojson {
            GeoJson::Geometry(geom) => geometry_to_multipolygon(geom),
            _ => None,
        };

        let Some(polygon) = polygon else {
            return Err(SpatialError::UnsupportedGeometry { name });
        };

        Ok(Self { name, polygon })
    }
}

/// Immutable zone polygons partitioned by zone-type id.
///
/// Constructed once and shared by reference across all resolvers.
#[derive(Debug, Default)]
pub struct ZonePolygonSet {
    partitions: BTreeMap<String, ZonePartition>,
}

impl ZonePolygonSet {
    /// Builds a set from `(zone_type_id, polygon)` pairs.
    ///
    /// Encounter order within each partition is preserved and used for
    /// resolution tie-breaks.
    #[must_use]
    pub fn new(polygons: impl IntoIterator<Item = (String, ZonePolygon)>) -> Self {
        let mut grouped: BTreeMap<String, Vec<ZonePolygon>> = BTreeMap::new();
        for (zone_type_id, polygon) in polygons {
            grouped.entry(zone_type_id).or_default().push(polygon);
        }

        let partitions = grouped
            .into_iter()
            .map(|(zone_type_id, polygons)| {
                let partition = ZonePartition::new(polygons);
                log::info!(
                    "Loaded {} '{zone_type_id}' polygons into spatial index",
                    partition.len()
                );
                (zone_type_id, partition)
            })
            .collect();

        Self { partitions }
    }

    /// Parses a boundary `FeatureCollection` where each feature carries its
    /// zone-type id in `type_property` and its zone name in `name_property`.
    ///
    /// Numeric names are rendered as their decimal string.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the document is not a `FeatureCollection`,
    /// a feature lacks either property, or a geometry is not polygonal.
    pub fn from_feature_collection(
        geojson_str: &str,
        type_property: &str,
        name_property: &str,
    ) -> Result<Self, SpatialError> {
        let GeoJson::FeatureCollection(collection) = geojson_str.parse::<GeoJson>()? else {
            return Err(SpatialError::NotFeatureCollection);
        };

        let mut polygons = Vec::with_capacity(collection.features.len());
        for (index, feature) in collection.features.into_iter().enumerate() {
            let property = |key: &str| {
                feature
                    .properties
                    .as_ref()
                    .and_then(|props| props.get(key))
                    .and_then(property_to_string)
                    .ok_or_else(|| SpatialError::MissingProperty {
                        index,
                        property: key.to_string(),
                    })
            };
            let zone_type_id = property(type_property)?;
            let name = property(name_property)?;

            let polygon = feature
                .geometry
                .and_then(geometry_to_multipolygon)
                .ok_or_else(|| SpatialError::UnsupportedGeometry { name: name.clone() })?;

            polygons.push((zone_type_id, ZonePolygon { name, polygon }));
        }

        Ok(Self::new(polygons))
    }

    /// Adds (or replaces) a partition, e.g. a derived neighborhood layer.
    #[must_use]
    pub fn with_partition(mut self, zone_type_id: impl Into<String>, polygons: Vec<ZonePolygon>) -> Self {
        let zone_type_id = zone_type_id.into();
        let partition = ZonePartition::new(polygons);
        log::info!(
            "Loaded {} '{zone_type_id}' polygons into spatial index",
            partition.len()
        );
        self.partitions.insert(zone_type_id, partition);
        self
    }

    /// Returns the partition for a zone type, if any polygons were loaded.
    #[must_use]
    pub fn partition(&self, zone_type: ZoneType) -> Option<&ZonePartition> {
        self.partition_by_id(zone_type.as_ref())
    }

    /// Returns the partition for a raw zone-type id.
    #[must_use]
    pub fn partition_by_id(&self, zone_type_id: &str) -> Option<&ZonePartition> {
        self.partitions.get(zone_type_id)
    }

    /// Zone-type ids with at least one polygon.
    pub fn zone_type_ids(&self) -> impl Iterator<Item = &str> {
        self.partitions.keys().map(String::as_str)
    }
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn geometry_to_multipolygon(geom: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geom.try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

fn property_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "id": "zipcode", "nameCol": "11211" },
                "geometry": { "type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]] }
            },
            {
                "type": "Feature",
                "properties": { "id": "pp", "nameCol": 90 },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [[[[0,0],[1,0],[1,1],[0,1],[0,0]]], [[[5,5],[6,5],[6,6],[5,6],[5,5]]]]
                }
            },
            {
                "type": "Feature",
                "properties": { "id": "zipcode", "nameCol": "11222" },
                "geometry": { "type": "Polygon", "coordinates": [[[2,0],[4,0],[4,2],[2,2],[2,0]]] }
            }
        ]
    }"#;

    #[test]
    fn partitions_feature_collection_by_type() {
        let set =
            ZonePolygonSet::from_feature_collection(BOUNDS, BOUNDARY_TYPE_PROPERTY, BOUNDARY_NAME_PROPERTY)
                .unwrap();

        let ids: Vec<_> = set.zone_type_ids().collect();
        assert_eq!(ids, vec!["pp", "zipcode"]);

        let zips = set.partition(ZoneType::Zipcode).unwrap();
        let names: Vec<_> = zips.entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["11211", "11222"], "encounter order preserved");

        let precincts = set.partition(ZoneType::PolicePrecinct).unwrap();
        assert_eq!(precincts.entries()[0].name(), "90");
        assert_eq!(precincts.entries()[0].polygon().0.len(), 2);

        assert!(set.partition(ZoneType::StateSenateDistrict).is_none());
    }

    #[test]
    fn rejects_feature_without_name() {
        let doc = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "id": "zipcode" },
                "geometry": { "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]] }
            }]
        }"#;
        let err = ZonePolygonSet::from_feature_collection(doc, "id", "nameCol").unwrap_err();
        assert!(matches!(err, SpatialError::MissingProperty { index: 0, .. }));
    }

    #[test]
    fn rejects_non_polygon_geometry() {
        let doc = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "id": "zipcode", "nameCol": "10001" },
                "geometry": { "type": "Point", "coordinates": [0, 0] }
            }]
        }"#;
        let err = ZonePolygonSet::from_feature_collection(doc, "id", "nameCol").unwrap_err();
        assert!(matches!(err, SpatialError::UnsupportedGeometry { name } if name == "10001"));
    }

    #[test]
    fn rejects_bare_geometry_document() {
        let doc = r#"{ "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]] }"#;
        let err = ZonePolygonSet::from_feature_collection(doc, "id", "nameCol").unwrap_err();
        assert!(matches!(err, SpatialError::NotFeatureCollection));
    }

    #[test]
    fn parses_single_geometry_string() {
        let zone = ZonePolygon::from_geojson(
            "10001",
            r#"{ "type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]] }"#,
        )
        .unwrap();
        assert_eq!(zone.name, "10001");
        assert_eq!(zone.polygon.0.len(), 1);

        assert!(ZonePolygon::from_geojson("x", r#"{ "type": "Point", "coordinates": [0, 0] }"#).is_err());
    }

    #[test]
    fn with_partition_adds_derived_layer() {
        let square = geo::Rect::new((0.0, 0.0), (1.0, 1.0)).to_polygon();
        let set = ZonePolygonSet::default()
            .with_partition(ZoneType::Neighborhood.to_string(), vec![ZonePolygon::new("Greenpoint", square)]);
        assert_eq!(set.partition(ZoneType::Neighborhood).unwrap().len(), 1);
    }
}
