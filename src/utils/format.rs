//! Formatting utilities for display values.

/// `87.5` -> `"87.5%"`, whole numbers without a fraction.
pub fn format_percentage(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}%", value)
    } else {
        format!("{:.1}%", value)
    }
}
