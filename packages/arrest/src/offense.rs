//! Law-code to offense category classification.

use std::collections::BTreeSet;

use arrest_trends_arrest_models::{OTHER_OFFENSE, OffenseDefinition, OffenseTableFile};

use crate::ArrestError;

/// Ordered law-code fragment table.
///
/// A code is classified by the longest fragment it contains, so
/// `"PL 1552510"` (petit larceny) wins over `"PL 155"` (larceny) for the
/// same code. Fragments of equal length are tried in table order.
#[derive(Debug, Clone, Default)]
pub struct OffenseTable {
    entries: Vec<OffenseDefinition>,
}

impl OffenseTable {
    /// Builds a table from definitions in precedence order.
    ///
    /// # Errors
    ///
    /// Returns [`ArrestError::DuplicateCode`] if a fragment repeats.
    pub fn new(entries: Vec<OffenseDefinition>) -> Result<Self, ArrestError> {
        let mut seen = BTreeSet::new();
        for entry in &entries {
            if !seen.insert(entry.code.as_str()) {
                return Err(ArrestError::DuplicateCode {
                    code: entry.code.clone(),
                });
            }
        }

        Ok(Self { entries })
    }

    /// Parses an `[[offense]]` TOML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid or a fragment repeats.
    pub fn from_toml(content: &str) -> Result<Self, ArrestError> {
        let file: OffenseTableFile = toml::de::from_str(content)?;
        Self::new(file.offenses)
    }

    /// Number of fragments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no fragments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All fragments in table order.
    #[must_use]
    pub fn entries(&self) -> &[OffenseDefinition] {
        &self.entries
    }

    /// Offense category for a law code.
    ///
    /// Returns `"Other"` for a missing or blank code and for a code that
    /// contains no fragment.
    #[must_use]
    pub fn classify(&self, law_code: Option<&str>) -> &str {
        let Some(code) = law_code.map(str::trim).filter(|c| !c.is_empty()) else {
            return OTHER_OFFENSE;
        };

        let mut best: Option<&OffenseDefinition> = None;
        for entry in &self.entries {
            if !code.contains(entry.code.as_str()) {
                continue;
            }
            if best.is_none_or(|b| entry.code.len() > b.code.len()) {
                best = Some(entry);
            }
        }

        best.map_or(OTHER_OFFENSE, |entry| entry.category.as_str())
    }
}
