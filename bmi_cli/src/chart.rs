//! Text rendering of a BMI series.

use bmi_core::types::format_timestamp;
use bmi_core::{classify, SeriesPoint};

const BAR: char = '█';

/// Render one bar per point, scaled between the lowest and highest BMI.
pub fn render(name: &str, series: &[SeriesPoint], width: usize) -> String {
    let mut out = format!("BMI history for {}\n", name);

    if series.is_empty() {
        out.push_str("  (no measurements)\n");
        return out;
    }

    let width = width.max(1);
    let lo = series.iter().map(|p| p.bmi).fold(f64::INFINITY, f64::min);
    let hi = series.iter().map(|p| p.bmi).fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;

    for point in series {
        let len = if span <= f64::EPSILON {
            width
        } else {
            1 + ((point.bmi - lo) / span * (width - 1) as f64).round() as usize
        };
        let bar: String = std::iter::repeat(BAR).take(len).collect();
        out.push_str(&format!(
            "  {} │{:<width$} {:>6.2}  {}\n",
            format_timestamp(&point.recorded_at),
            bar,
            point.bmi,
            classify(point.bmi),
            width = width
        ));
    }

    if let (Some(first), Some(last)) = (series.first(), series.last()) {
        if series.len() > 1 {
            out.push_str(&format!(
                "  Change since {}: {:+.2}\n",
                format_timestamp(&first.recorded_at),
                last.bmi - first.bmi
            ));
        }
    }

    out
}
