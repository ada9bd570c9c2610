//! Parsing of raw user input into a `MeasurementInput`.

use crate::{Error, MeasurementInput, Result};

impl MeasurementInput {
    /// Parse name, weight and height as typed by the user.
    ///
    /// The name is trimmed and must not be empty. Numbers accept either a
    /// decimal point or a decimal comma (`1,75`).
    pub fn parse(name: &str, weight: &str, height: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("name must not be empty".into()));
        }

        let weight_kg = parse_positive("weight", weight)?;
        let height_m = parse_positive("height", height)?;

        Ok(Self {
            name: name.to_string(),
            weight_kg,
            height_m,
        })
    }
}

/// Parse a strictly positive, finite number
fn parse_positive(field: &str, raw: &str) -> Result<f64> {
    let normalized = raw.trim().replace(',', ".");
    let value: f64 = normalized.parse().map_err(|_| {
        Error::InvalidInput(format!("{} must be a number, got {:?}", field, raw.trim()))
    })?;

    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "{} must be a positive number, got {}",
            field, value
        )));
    }

    Ok(value)
}
