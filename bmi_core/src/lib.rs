#![forbid(unsafe_code)]

//! Core domain model and persistence for the BMI tracker.
//!
//! This crate provides:
//! - Domain types (measurements, categories, series points)
//! - The BMI engine (computation and classification)
//! - The append-only measurement log (SQLite)
//! - Report and series export

pub mod types;
pub mod error;
pub mod engine;
pub mod input;
pub mod config;
pub mod logging;
pub mod store;
pub mod measurements;
pub mod report;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use engine::{classify, compute};
pub use store::Store;
pub use measurements::{MeasurementLog, SqliteMeasurementLog};
pub use report::Report;
pub use export::write_records_csv;
