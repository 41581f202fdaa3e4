//! Zip code normalization.
//!
//! Source tables store zip codes as integers in places, which drops leading
//! zeros (`00083` becomes `83`) and sometimes adds a float suffix
//! (`11211.0`). Every lookup goes through [`normalize_zip`] first.

use crate::NeighborhoodError;

/// Canonical zip code width.
pub const ZIP_WIDTH: usize = 5;

/// Normalizes a zip code to its canonical 5-digit form.
///
/// Trims whitespace, strips a trailing `.0`, and left-pads with zeros.
///
/// # Errors
///
/// Returns [`NeighborhoodError::MalformedZip`] if the value is empty,
/// contains non-digits, or is longer than five digits.
pub fn normalize_zip(raw: &str) -> Result<String, NeighborhoodError> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_suffix(".0").unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > ZIP_WIDTH || !digits.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(NeighborhoodError::MalformedZip {
            zip: raw.to_string(),
        });
    }

    Ok(format!("{digits:0>ZIP_WIDTH$}"))
}
