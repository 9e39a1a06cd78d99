//! Spatial-analysis tuning knobs.
//!
//! The thresholds below were calibrated against IFRS/AASB standard PDFs.
//! They are carried as a config struct rather than constants so a caller
//! processing a differently typeset corpus can retune them.

use serde::{Deserialize, Serialize};

/// Calibration parameters for the fragment-to-clause pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    /// Line merge radius: fragments whose `round(y / y_bucket)` agree are
    /// joined into one visual line.
    pub y_bucket: f32,
    /// Fraction of the page height scanned for repeated page furniture.
    pub footer_band: f32,
    /// Ratio of line gap to median line spacing above which a paragraph
    /// break (newline) is inserted instead of a space.
    pub paragraph_gap: f32,
    /// Height ratio below the page median under which a tiny line is
    /// treated as a superscript candidate.
    pub superscript_height: f32,
    /// Horizontal units per indent level, used both for break detection
    /// and for reconstructing leading indent.
    pub indent_step: f32,
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            y_bucket: 2.0,
            footer_band: 0.14,
            paragraph_gap: 1.55,
            superscript_height: 0.82,
            indent_step: 8.0,
        }
    }
}
