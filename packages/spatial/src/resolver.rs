//! Point-to-zone resolution for a single zone type.
//!
//! Resolution order:
//!
//! 1. The "no location" sentinel resolves to [`ZoneLabel::Unresolved`].
//! 2. A matching [`CoordinateOverride`] wins regardless of geometry.
//! 3. Exactly one containing polygon wins.
//! 4. No containing polygon: the nearest polygon wins (the point sits just
//!    outside a boundary).
//! 5. Several containing polygons: the one whose exterior ring is farthest
//!    from the point wins (overlapping or duplicated boundary data).
//!
//! Ties in 4 and 5 go to the earliest polygon in encounter order.

use arrest_trends_zone_models::{Coordinate, CoordinateOverride, ZoneLabel, ZoneType};
use geo::Point;

use crate::partition::{PartitionEntry, exterior_distance};
use crate::{ZonePartition, ZonePolygonSet};

/// Which rule produced a [`Resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResolutionMethod {
    /// The record has no location.
    NoLocation,
    /// A coordinate override matched.
    Override,
    /// Exactly one polygon contained the point.
    Contained,
    /// No polygon contained the point; the nearest was chosen.
    Nearest,
    /// Several polygons contained the point; the deepest was chosen.
    Deepest,
    /// The partition has no polygons.
    EmptyPartition,
}

/// A resolved label plus the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The zone label.
    pub label: ZoneLabel,
    /// How the label was determined.
    pub method: ResolutionMethod,
}

impl Resolution {
    fn resolved(name: &str, method: ResolutionMethod) -> Self {
        Self {
            label: ZoneLabel::Resolved(name.to_string()),
            method,
        }
    }

    const fn unresolved(method: ResolutionMethod) -> Self {
        Self {
            label: ZoneLabel::Unresolved,
            method,
        }
    }
}

/// Classifies points against the polygons of one zone type.
///
/// Pure and read-only: a resolver can be shared freely and called once per
/// record.
#[derive(Debug)]
pub struct ZoneResolver<'a> {
    zone_type: ZoneType,
    partition: Option<&'a ZonePartition>,
    overrides: Vec<&'a CoordinateOverride>,
}

impl<'a> ZoneResolver<'a> {
    /// Creates a resolver for `zone_type` over `polygons`.
    ///
    /// Overrides for other zone types are ignored. A zone type with no
    /// loaded polygons resolves every located point to
    /// [`ZoneLabel::Unresolved`].
    #[must_use]
    pub fn new(
        polygons: &'a ZonePolygonSet,
        zone_type: ZoneType,
        overrides: &'a [CoordinateOverride],
    ) -> Self {
        let partition = polygons.partition(zone_type);
        if partition.is_none() {
            log::warn!("No '{zone_type}' polygons loaded; all points will be unresolved");
        }
        Self::with_partition(zone_type, partition, overrides)
    }

    /// Creates a resolver over an explicit partition.
    #[must_use]
    pub fn with_partition(
        zone_type: ZoneType,
        partition: Option<&'a ZonePartition>,
        overrides: &'a [CoordinateOverride],
    ) -> Self {
        Self {
            zone_type,
            partition,
            overrides: overrides
                .iter()
                .filter(|o| o.zone_type == zone_type)
                .collect(),
        }
    }

    /// The zone type this resolver labels.
    #[must_use]
    pub const fn zone_type(&self) -> ZoneType {
        self.zone_type
    }

    /// Resolves `location` to a zone label.
    #[must_use]
    pub fn resolve(&self, location: &Coordinate) -> ZoneLabel {
        self.resolve_with_method(location).label
    }

    /// Resolves `location`, also reporting which rule applied.
    #[must_use]
    pub fn resolve_with_method(&self, location: &Coordinate) -> Resolution {
        if location.is_missing() {
            return Resolution::unresolved(ResolutionMethod::NoLocation);
        }

        if let Some(fix) = self.overrides.iter().find(|o| o.matches(self.zone_type, location)) {
            log::debug!(
                "Override: ({}, {}) -> {} {}",
                location.lng,
                location.lat,
                self.zone_type,
                fix.zone
            );
            return Resolution::resolved(&fix.zone, ResolutionMethod::Override);
        }

        let Some(partition) = self.partition.filter(|p| !p.is_empty()) else {
            return Resolution::unresolved(ResolutionMethod::EmptyPartition);
        };

        let point = Point::new(location.lng, location.lat);
        let candidates = partition.containing(&point);

        match candidates.as_slice() {
            [only] => Resolution::resolved(only.name(), ResolutionMethod::Contained),
            [] => match partition.nearest(&point) {
                Some((entry, distance)) => {
                    log::debug!(
                        "({}, {}) outside all {} zones; nearest is {} at {distance}",
                        location.lng,
                        location.lat,
                        self.zone_type,
                        entry.name()
                    );
                    Resolution::resolved(entry.name(), ResolutionMethod::Nearest)
                }
                None => Resolution::unresolved(ResolutionMethod::EmptyPartition),
            },
            many => {
                let entry = deepest(many, &point);
                log::debug!(
                    "({}, {}) inside {} {} zones; deepest is {}",
                    location.lng,
                    location.lat,
                    many.len(),
                    self.zone_type,
                    entry.name()
                );
                Resolution::resolved(entry.name(), ResolutionMethod::Deepest)
            }
        }
    }
}

/// Picks the candidate whose exterior is farthest from `point`.
///
/// `candidates` must be non-empty and in encounter order; the first
/// candidate reaching the maximum wins.
fn deepest<'e>(candidates: &[&'e PartitionEntry], point: &Point<f64>) -> &'e PartitionEntry {
    let mut best = candidates[0];
    let mut best_depth = exterior_distance(best.polygon(), point);

    for &entry in &candidates[1..] {
        let depth = exterior_distance(entry.polygon(), point);
        if depth > best_depth {
            best = entry;
            best_depth = depth;
        }
    }

    best
}
