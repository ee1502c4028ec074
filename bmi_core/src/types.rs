//! Core domain types for BMI tracking.
//!
//! - BMI categories and their thresholds
//! - Readings produced by the engine
//! - Persisted records and per-user summaries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Category
// ============================================================================

/// Lower bound of the Normal band
pub const NORMAL_MIN: f64 = 18.5;
/// Lower bound of the Overweight band
pub const OVERWEIGHT_MIN: f64 = 25.0;
/// Lower bound of the Obese band
pub const OBESE_MIN: f64 = 30.0;

/// Standard BMI classification band
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Category {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl Category {
    /// Classify a BMI value. Each band includes its lower bound.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < NORMAL_MIN {
            Category::Underweight
        } else if bmi < OVERWEIGHT_MIN {
            Category::Normal
        } else if bmi < OBESE_MIN {
            Category::Overweight
        } else {
            Category::Obese
        }
    }

    /// Label used in storage, CSV and display
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Underweight => "Underweight",
            Category::Normal => "Normal",
            Category::Overweight => "Overweight",
            Category::Obese => "Obese",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "Underweight" => Ok(Category::Underweight),
            "Normal" => Ok(Category::Normal),
            "Overweight" => Ok(Category::Overweight),
            "Obese" => Ok(Category::Obese),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown category label '{}'",
                other
            ))),
        }
    }
}

// ============================================================================
// Readings and Records
// ============================================================================

/// Result of a single BMI computation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BmiReading {
    pub bmi: f64,
    pub category: Category,
}

/// One persisted BMI measurement for a user
///
/// `bmi` and `category` are derived from `weight_kg` and `height_m` when the
/// record is created and are never recomputed on read.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BmiRecord {
    pub id: Uuid,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub weight_kg: f64,
    pub height_m: f64,
    pub bmi: f64,
    pub category: Category,
}

/// Mean/min/max over a user's BMI history
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct BmiSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}
