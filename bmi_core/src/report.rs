//! One-page summary report export.
//!
//! Reports are plain text with a fixed layout and land in a per-person
//! folder: `<reports_dir>/<name>/report_<name>.txt`, where `<name>` is the
//! sanitized person name.

use crate::{Assessment, Category, Error, MeasurementInput, Result};
use chrono::NaiveDateTime;
use fs2::FileExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const TITLE: &str = "Health and Nutrition Report";

/// Everything printed on a report
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub name: String,
    pub weight_kg: f64,
    pub height_m: f64,
    pub bmi: f64,
    pub category: Category,
    pub recommendation: &'static str,
    pub generated_at: NaiveDateTime,
}

impl Report {
    pub fn new(
        input: &MeasurementInput,
        assessment: &Assessment,
        generated_at: NaiveDateTime,
    ) -> Self {
        Self {
            name: input.name.clone(),
            weight_kg: input.weight_kg,
            height_m: input.height_m,
            bmi: assessment.bmi,
            category: assessment.category,
            recommendation: assessment.recommendation,
            generated_at,
        }
    }

    /// Render the report body
    pub fn render(&self) -> String {
        let rule = "=".repeat(TITLE.len());
        let mut out = String::new();
        out.push_str(TITLE);
        out.push('\n');
        out.push_str(&rule);
        out.push_str("\n\n");
        out.push_str(&format!("Name: {}\n", self.name));
        out.push_str(&format!("Weight: {} kg\n", self.weight_kg));
        out.push_str(&format!("Height: {} m\n", self.height_m));
        out.push_str(&format!("BMI: {:.2}\n", self.bmi));
        out.push_str(&format!("Category: {}\n", self.category));
        out.push_str(&format!("Recommendation: {}\n", self.recommendation));
        out.push('\n');
        out.push_str(&format!(
            "Generated: {}\n",
            crate::types::format_timestamp(&self.generated_at)
        ));
        out
    }

    /// Destination of this report under `reports_dir`
    pub fn file_path(&self, reports_dir: &Path) -> Result<PathBuf> {
        let folder = sanitize_name(&self.name)?;
        let file_name = format!("report_{}.txt", folder);
        Ok(reports_dir.join(folder).join(file_name))
    }

    /// Write the report, replacing any previous one for the same person
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file in the target folder
    /// 2. Syncing to disk
    /// 3. Renaming over the destination
    pub fn write_to(&self, reports_dir: &Path) -> Result<PathBuf> {
        let path = self.file_path(reports_dir)?;
        let parent = path.parent().ok_or_else(|| {
            Error::Other(format!("report path {:?} has no parent", path))
        })?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(self.render().as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::info!("Wrote report for {:?} to {:?}", self.name, path);
        Ok(path)
    }
}

/// Turn a person name into a single safe path component.
///
/// Alphanumerics (any script), `-` and `_` are kept; everything else,
/// including separators, dots and whitespace, becomes `_`.
pub fn sanitize_name(name: &str) -> Result<String> {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.chars().all(|c| c == '_') {
        return Err(Error::InvalidInput(format!(
            "name {:?} cannot be used as a file name",
            name
        )));
    }

    Ok(cleaned)
}
