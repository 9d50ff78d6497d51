// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types.
//!
//! Compilation and playback never fail; these cover the data boundaries
//! (timeline transfer, configuration and catalog files).

use thiserror::Error;

/// Errors raised when encoding, decoding or validating a timeline
#[derive(Debug, Error)]
pub enum TimelineError {
    /// JSON encoding or decoding failed
    #[error("Timeline serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A segment carries a negative or non-finite duration
    #[error("Scene '{scene}' segment {index} has invalid duration {duration_ms} ms")]
    InvalidDuration {
        /// Scene name
        scene: String,
        /// Segment position within the scene
        index: usize,
        /// Offending duration
        duration_ms: f64,
    },

    /// A scene's segments add up to more than its budget
    #[error("Scene '{scene}' segments total {total_ms:.1} ms, over its {budget_ms:.1} ms budget")]
    BudgetExceeded {
        /// Scene name
        scene: String,
        /// Sum of segment durations
        total_ms: f64,
        /// Declared scene duration
        budget_ms: f64,
    },
}

/// Errors raised when loading, saving or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid RON for the config schema
    #[error("Config parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serializing the config failed
    #[error("Config serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// The file was written by a newer format
    #[error("Config version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest version this build reads
        supported: u32,
    },

    /// An option is outside its valid range
    #[error("Invalid option '{field}': {reason}")]
    Invalid {
        /// Option name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Errors raised when loading a scene catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Reading the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The RON catalog is malformed
    #[error("Catalog parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// The JSON catalog is malformed
    #[error("Catalog parse error: {0}")]
    Json(#[from] serde_json::Error),
}
