//! Upload progress reporting.
//!
//! Emitted by the session after each acknowledged chunk; purely
//! observational, the caller never feeds it back.

/// Snapshot of how much of the file the server has acknowledged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReport {
    fraction: f64,
}

impl ProgressReport {
    /// Build from a fraction; clamped to [0.0, 1.0].
    pub fn new(fraction: f64) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
        }
    }

    /// Build from acknowledged and total byte counts.
    pub fn from_bytes(acknowledged: u64, total: u64) -> Self {
        if total == 0 {
            return Self { fraction: 1.0 };
        }
        Self::new(acknowledged as f64 / total as f64)
    }

    /// Fraction complete in [0.0, 1.0].
    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    /// Whole percentage, rounded to nearest.
    pub fn percent(&self) -> u32 {
        (self.fraction * 100.0).round() as u32
    }
}
