//! Unit conversion helpers for consistent formatting across the application

/// Bytes in one GiB (2^30).
pub const BYTES_PER_GIB: f64 = 1_073_741_824.0;

/// Scaling applied to every raw trend value before it is reduced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueScale {
    #[default]
    Identity,
    BytesToGib,
}

impl ValueScale {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            ValueScale::Identity => value,
            ValueScale::BytesToGib => bytes_to_gib(value),
        }
    }
}

/// Convert bytes to gibibytes
pub fn bytes_to_gib(bytes: f64) -> f64 {
    bytes / BYTES_PER_GIB
}

/// Format a metric value, `--` when absent
pub fn format_value(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "--".to_string())
}

/// Format bytes to human-readable format (B, KiB, MiB, GiB, TiB)
pub fn format_bytes(value: f64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut val = value;
    let mut unit = "B";
    for next in &UNITS {
        unit = next;
        if val.abs() < 1024.0 || *next == "TiB" {
            break;
        }
        val /= 1024.0;
    }
    if unit == "B" {
        format!("{val:.0}{unit}")
    } else {
        format!("{val:.1}{unit}")
    }
}
