//! BMI computation.
//!
//! bmi = weight_kg / height_m², classified with [`Category::from_bmi`].
//! No rounding is applied here; display precision is the caller's concern.

use crate::{BmiReading, Category, Error, Result};

/// Compute BMI and category for a weight in kilograms and height in metres
///
/// Both inputs must be finite and strictly positive.
pub fn compute(weight_kg: f64, height_m: f64) -> Result<BmiReading> {
    validate_positive("weight_kg", weight_kg)?;
    validate_positive("height_m", height_m)?;

    let bmi = weight_kg / (height_m * height_m);
    if !bmi.is_finite() {
        // e.g. a subnormal height squaring to zero
        return Err(Error::InvalidInput(format!(
            "bmi is not finite for weight_kg={} height_m={}",
            weight_kg, height_m
        )));
    }

    Ok(BmiReading {
        bmi,
        category: Category::from_bmi(bmi),
    })
}

fn validate_positive(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::InvalidInput(format!(
            "{} must be a finite number, got {}",
            field, value
        )));
    }
    if value <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "{} must be positive, got {}",
            field, value
        )));
    }
    Ok(())
}
