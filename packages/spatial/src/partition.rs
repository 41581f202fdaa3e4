//! A single zone-type partition backed by an R-tree.
//!
//! The tree only narrows the set of polygons worth testing. Every query
//! re-applies the exact geometric predicate and breaks ties by the
//! polygon's encounter ordinal, so answers never depend on tree layout.

use geo::{BoundingRect, Contains, Distance, Euclidean, MultiPolygon, Point};
use rstar::{AABB, RTree, RTreeObject};

use crate::ZonePolygon;

/// Half-width (in degrees) of the first window tried by
/// [`ZonePartition::nearest`]. Doubled until the answer is provably exact.
const INITIAL_SEARCH_RADIUS: f64 = 0.005;

/// A zone polygon stored in the R-tree with its metadata.
#[derive(Debug)]
pub struct PartitionEntry {
    ordinal: usize,
    name: String,
    envelope: AABB<[f64; 2]>,
    polygon: MultiPolygon<f64>,
}

impl PartitionEntry {
    /// Position of this polygon in the partition's input order.
    #[must_use]
    pub const fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Zone name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zone geometry.
    #[must_use]
    pub const fn polygon(&self) -> &MultiPolygon<f64> {
        &self.polygon
    }
}

impl RTreeObject for PartitionEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

#[derive(Debug, Clone, Copy)]
struct Bounds {
    min_x: f64,
    min_y: f64,
    max_x: f64,
    max_y: f64,
}

impl Bounds {
    fn include(self, envelope: &AABB<[f64; 2]>) -> Self {
        let [lx, ly] = envelope.lower();
        let [ux, uy] = envelope.upper();
        Self {
            min_x: self.min_x.min(lx),
            min_y: self.min_y.min(ly),
            max_x: self.max_x.max(ux),
            max_y: self.max_y.max(uy),
        }
    }

    /// Smallest half-width of a square window centred on `(x, y)` that
    /// covers every polygon envelope.
    fn reach(&self, x: f64, y: f64) -> f64 {
        (x - self.min_x)
            .abs()
            .max((self.max_x - x).abs())
            .max((y - self.min_y).abs())
            .max((self.max_y - y).abs())
    }
}

/// Polygons of one zone type.
#[derive(Debug)]
pub struct ZonePartition {
    tree: RTree<PartitionEntry>,
    bounds: Option<Bounds>,
}

impl ZonePartition {
    /// Builds the partition, assigning ordinals in input order.
    ///
    /// Polygons with no rings are skipped.
    #[must_use]
    pub fn new(polygons: Vec<ZonePolygon>) -> Self {
        let mut entries = Vec::with_capacity(polygons.len());
        let mut bounds: Option<Bounds> = None;

        for ZonePolygon { name, polygon } in polygons {
            let Some(envelope) = compute_envelope(&polygon) else {
                log::warn!("Skipping zone {name}: empty geometry");
                continue;
            };

            bounds = Some(bounds.map_or_else(
                || Bounds {
                    min_x: envelope.lower()[0],
                    min_y: envelope.lower()[1],
                    max_x: envelope.upper()[0],
                    max_y: envelope.upper()[1],
                },
                |b| b.include(&envelope),
            ));

            entries.push(PartitionEntry {
                ordinal: entries.len(),
                name,
                envelope,
                polygon,
            });
        }

        Self {
            tree: RTree::bulk_load(entries),
            bounds,
        }
    }

    /// Number of polygons in the partition.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Whether the partition holds no polygons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// All polygons in encounter order.
    #[must_use]
    pub fn entries(&self) -> Vec<&PartitionEntry> {
        let mut entries: Vec<_> = self.tree.iter().collect();
        entries.sort_by_key(|e| e.ordinal);
        entries
    }

    /// First polygon (by encounter order) with the given name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PartitionEntry> {
        self.tree
            .iter()
            .filter(|e| e.name == name)
            .min_by_key(|e| e.ordinal)
    }

    /// Polygons whose interior contains `point`, in encounter order.
    ///
    /// Points on a boundary are not contained.
    #[must_use]
    pub fn containing(&self, point: &Point<f64>) -> Vec<&PartitionEntry> {
        let query_env = AABB::from_point([point.x(), point.y()]);

        let mut matches: Vec<_> = self
            .tree
            .locate_in_envelope_intersecting(&query_env)
            .filter(|entry| entry.polygon.contains(point))
            .collect();
        matches.sort_by_key(|e| e.ordinal);
        matches
    }

    /// The polygon closest to `point` and its distance.
    ///
    /// Ties go to the earliest polygon in encounter order. Returns `None`
    /// only for an empty partition.
    #[must_use]
    pub fn nearest(&self, point: &Point<f64>) -> Option<(&PartitionEntry, f64)> {
        let bounds = self.bounds?;
        let (x, y) = (point.x(), point.y());

        if x.is_finite() && y.is_finite() {
            let reach = bounds.reach(x, y);
            let mut radius = INITIAL_SEARCH_RADIUS;

            // Any polygon within `radius` of the point has an envelope that
            // intersects the window, so a best distance <= radius is final.
            while radius < reach {
                let window = AABB::from_corners([x - radius, y - radius], [x + radius, y + radius]);
                if let Some((entry, distance)) =
                    closest(self.tree.locate_in_envelope_intersecting(&window), point)
                {
                    if distance <= radius {
                        return Some((entry, distance));
                    }
                }
                radius *= 2.0;
            }
        }

        closest(self.tree.iter(), point)
    }
}

/// Distance from `point` to the nearest ring (exterior or hole) of any
/// member polygon. Equal to the point-to-region distance for points outside
/// the region.
#[must_use]
pub fn boundary_distance(polygon: &MultiPolygon<f64>, point: &Point<f64>) -> f64 {
    polygon
        .0
        .iter()
        .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
        .map(|ring| Euclidean.distance(point, ring))
        .fold(f64::INFINITY, f64::min)
}

/// Distance from `point` to the exterior ring of the member polygon that
/// contains it; how deep the point sits inside the zone.
///
/// Falls back to the nearest exterior of any member if none contains it.
#[must_use]
pub fn exterior_distance(polygon: &MultiPolygon<f64>, point: &Point<f64>) -> f64 {
    let containing = polygon
        .0
        .iter()
        .filter(|p| p.contains(point))
        .map(|p| Euclidean.distance(point, p.exterior()))
        .fold(f64::INFINITY, f64::min);

    if containing.is_finite() {
        return containing;
    }

    polygon
        .0
        .iter()
        .map(|p| Euclidean.distance(point, p.exterior()))
        .fold(f64::INFINITY, f64::min)
}

#[allow(clippy::float_cmp)]
fn closest<'a>(
    entries: impl Iterator<Item = &'a PartitionEntry>,
    point: &Point<f64>,
) -> Option<(&'a PartitionEntry, f64)> {
    let mut best: Option<(&PartitionEntry, f64)> = None;

    for entry in entries {
        let distance = boundary_distance(&entry.polygon, point);
        let better = best.is_none_or(|(current, best_distance)| {
            distance < best_distance
                || (distance == best_distance && entry.ordinal < current.ordinal)
        });
        if better {
            best = Some((entry, distance));
        }
    }

    best
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    mp.bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}
