//! BMI engine: computation and classification.
//!
//! Category cutoffs:
//!
//! | Condition              | Category      |
//! |------------------------|---------------|
//! | bmi < 18.5             | Underweight   |
//! | 18.5 <= bmi < 24.9     | Normal weight |
//! | 24.9 <= bmi < 29.9     | Overweight    |
//! | bmi >= 29.9            | Obesity       |
//!
//! These are not the WHO 25.0/30.0 cutoffs. Existing logs were classified
//! with 24.9/29.9, so they are kept as-is.

use crate::{Assessment, Category, Error, Result};

pub const UNDERWEIGHT_BELOW: f64 = 18.5;
pub const NORMAL_BELOW: f64 = 24.9;
pub const OVERWEIGHT_BELOW: f64 = 29.9;

/// Compute BMI for a weight in kilograms and a height in metres.
///
/// Both values must be finite and strictly positive. The returned BMI is
/// not rounded; rounding is left to whoever displays it.
pub fn compute(weight_kg: f64, height_m: f64) -> Result<Assessment> {
    ensure_positive("weight", weight_kg)?;
    ensure_positive("height", height_m)?;

    let bmi = weight_kg / (height_m * height_m);
    if !bmi.is_finite() {
        return Err(Error::InvalidInput(format!(
            "{} kg / {} m does not give a finite BMI",
            weight_kg, height_m
        )));
    }
    let category = classify(bmi);

    tracing::debug!(
        "Computed BMI {:.4} ({}) for {} kg / {} m",
        bmi,
        category,
        weight_kg,
        height_m
    );

    Ok(Assessment {
        bmi,
        category,
        recommendation: category.recommendation(),
    })
}

/// Map a BMI value to its category (first matching interval wins)
pub fn classify(bmi: f64) -> Category {
    if bmi < UNDERWEIGHT_BELOW {
        Category::Underweight
    } else if bmi < NORMAL_BELOW {
        Category::NormalWeight
    } else if bmi < OVERWEIGHT_BELOW {
        Category::Overweight
    } else {
        Category::Obesity
    }
}

fn ensure_positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "{} must be a positive number, got {}",
            field, value
        )))
    }
}
