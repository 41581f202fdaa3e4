//! Many-to-one zip code to neighborhood mapping.

use std::collections::{BTreeMap, BTreeSet};

use arrest_trends_neighborhood_models::{NeighborhoodDefinition, NeighborhoodFile};

use crate::{NeighborhoodError, zip::normalize_zip};

/// Validated zip code to neighborhood grouping.
///
/// Every zip belongs to exactly one neighborhood and every neighborhood
/// lists its zips in definition order, so the forward and inverse lookups
/// round-trip. Zip codes are stored in canonical 5-digit form.
#[derive(Debug, Clone, Default)]
pub struct ZipNeighborhoodMap {
    neighborhoods: Vec<NeighborhoodDefinition>,
    by_zip: BTreeMap<String, usize>,
}

impl ZipNeighborhoodMap {
    /// Builds a mapping from neighborhood definitions.
    ///
    /// # Errors
    ///
    /// * [`NeighborhoodError::MalformedZip`] if a zip can't be normalized
    /// * [`NeighborhoodError::InconsistentMapping`] if a neighborhood name
    ///   repeats or a zip is listed more than once
    pub fn from_definitions(
        definitions: Vec<NeighborhoodDefinition>,
    ) -> Result<Self, NeighborhoodError> {
        let mut names = BTreeSet::new();
        let mut by_zip = BTreeMap::new();
        let mut neighborhoods = Vec::with_capacity(definitions.len());

        for (index, definition) in definitions.into_iter().enumerate() {
            if !names.insert(definition.name.clone()) {
                return Err(NeighborhoodError::InconsistentMapping {
                    message: format!("neighborhood '{}' is defined twice", definition.name),
                });
            }

            let mut zips = Vec::with_capacity(definition.zips.len());
            for raw in &definition.zips {
                let zip = normalize_zip(raw)?;
                if let Some(existing) = by_zip.insert(zip.clone(), index) {
                    let owner: &NeighborhoodDefinition =
                        neighborhoods.get(existing).unwrap_or(&definition);
                    return Err(NeighborhoodError::InconsistentMapping {
                        message: format!(
                            "zip {zip} is listed under both '{}' and '{}'",
                            owner.name, definition.name
                        ),
                    });
                }
                zips.push(zip);
            }

            neighborhoods.push(NeighborhoodDefinition {
                zips,
                ..definition
            });
        }

        Ok(Self {
            neighborhoods,
            by_zip,
        })
    }

    /// Parses a `[[neighborhood]]` TOML document and builds the mapping.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or the grouping is
    /// inconsistent (see [`Self::from_definitions`]).
    pub fn from_toml(content: &str) -> Result<Self, NeighborhoodError> {
        let file: NeighborhoodFile = toml::de::from_str(content)?;
        Self::from_definitions(file.neighborhoods)
    }

    /// Number of neighborhoods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.neighborhoods.len()
    }

    /// Whether the mapping defines no neighborhoods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neighborhoods.is_empty()
    }

    /// Neighborhood containing `zip`. The zip is normalized first.
    ///
    /// # Errors
    ///
    /// * [`NeighborhoodError::MalformedZip`] if the zip can't be normalized
    /// * [`NeighborhoodError::UnknownZip`] if no neighborhood lists it
    pub fn neighborhood_for(&self, zip: &str) -> Result<&str, NeighborhoodError> {
        let zip = normalize_zip(zip)?;
        self.by_zip
            .get(&zip)
            .map(|&index| self.neighborhoods[index].name.as_str())
            .ok_or(NeighborhoodError::UnknownZip { zip })
    }

    /// Normalized zips of a neighborhood, in definition order.
    #[must_use]
    pub fn zips_for(&self, neighborhood: &str) -> Option<&[String]> {
        self.neighborhoods
            .iter()
            .find(|n| n.name == neighborhood)
            .map(|n| n.zips.as_slice())
    }

    /// All neighborhoods in definition order.
    pub fn neighborhoods(&self) -> impl Iterator<Item = &NeighborhoodDefinition> {
        self.neighborhoods.iter()
    }

    /// Every `(zip, neighborhood)` pair, ordered by zip.
    pub fn zips(&self) -> impl Iterator<Item = (&str, &str)> {
        self.by_zip
            .iter()
            .map(|(zip, &index)| (zip.as_str(), self.neighborhoods[index].name.as_str()))
    }

    /// Names of neighborhoods flagged `no_baseline`.
    #[must_use]
    pub fn excluded_zones(&self) -> Vec<String> {
        self.neighborhoods
            .iter()
            .filter(|n| n.no_baseline)
            .map(|n| n.name.clone())
            .collect()
    }

    /// Inverts the zip lookup: neighborhood -> sorted zips.
    #[must_use]
    pub fn inverse(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut inverse: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (zip, neighborhood) in self.zips() {
            inverse.entry(neighborhood).or_default().push(zip);
        }
        inverse
    }
}
