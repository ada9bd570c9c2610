//! Core domain types for the BMI tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Health categories and their recommendations
//! - Engine output (assessments)
//! - Persisted measurements and the series derived from them

use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// On-disk timestamp layout of the `data` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// Categories
// ============================================================================

/// Health category derived from a BMI value
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Underweight,
    NormalWeight,
    Overweight,
    Obesity,
}

impl Category {
    /// Human-readable label shown next to the BMI value
    pub fn label(&self) -> &'static str {
        match self {
            Category::Underweight => "Underweight",
            Category::NormalWeight => "Normal weight",
            Category::Overweight => "Overweight",
            Category::Obesity => "Obesity",
        }
    }

    /// Fixed guidance text for this category
    pub fn recommendation(&self) -> &'static str {
        match self {
            Category::Underweight => {
                "To gain mass, increase your protein intake and take up strength training."
            }
            Category::NormalWeight => {
                "Keep a balanced diet and moderate exercise to stay healthy."
            }
            Category::Overweight | Category::Obesity => {
                "Reduce your calorie intake and increase aerobic activity to lose weight."
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Engine output
// ============================================================================

/// Result of one BMI computation
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Assessment {
    pub bmi: f64,
    pub category: Category,
    pub recommendation: &'static str,
}

/// Validated values collected from the user for one calculation request
#[derive(Clone, Debug, PartialEq)]
pub struct MeasurementInput {
    pub name: String,
    pub weight_kg: f64,
    pub height_m: f64,
}

// ============================================================================
// Persisted records
// ============================================================================

/// A measurement about to be appended to the log
#[derive(Clone, Debug, PartialEq)]
pub struct NewMeasurement {
    pub person_name: String,
    pub weight_kg: f64,
    pub height_m: f64,
    pub bmi: f64,
    pub recorded_at: NaiveDateTime,
}

impl NewMeasurement {
    /// Build a record from the same assessment that is shown to the user,
    /// so the stored BMI always matches the displayed one.
    pub fn from_assessment(
        input: &MeasurementInput,
        assessment: &Assessment,
        recorded_at: NaiveDateTime,
    ) -> Self {
        Self {
            person_name: input.name.clone(),
            weight_kg: input.weight_kg,
            height_m: input.height_m,
            bmi: assessment.bmi,
            recorded_at: truncate_to_seconds(recorded_at),
        }
    }
}

/// A measurement read back from the log
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Measurement {
    pub id: i64,
    pub person_name: String,
    pub weight_kg: f64,
    pub height_m: f64,
    pub bmi: f64,
    #[serde(with = "timestamp_text")]
    pub recorded_at: NaiveDateTime,
}

/// One point of a person's BMI series
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    #[serde(with = "timestamp_text")]
    pub recorded_at: NaiveDateTime,
    pub bmi: f64,
}

impl From<&Measurement> for SeriesPoint {
    fn from(m: &Measurement) -> Self {
        SeriesPoint {
            recorded_at: m.recorded_at,
            bmi: m.bmi,
        }
    }
}

// ============================================================================
// Timestamps
// ============================================================================

/// Current local time at second precision
pub fn now_local() -> NaiveDateTime {
    truncate_to_seconds(Local::now().naive_local())
}

/// Drop sub-second precision
pub fn truncate_to_seconds(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_nanosecond(0).unwrap_or(ts)
}

/// Format a timestamp for the `data` column
pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a `data` column value
pub fn parse_timestamp(s: &str) -> crate::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| crate::Error::Persistence(format!("Invalid timestamp {:?}: {}", s, e)))
}

/// Serde adapter writing timestamps in the same layout as the `data` column
mod timestamp_text {
    use super::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
