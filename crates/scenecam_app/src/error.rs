// SPDX-License-Identifier: MIT OR Apache-2.0
//! Host application errors.

use scenecam_timeline::{CatalogError, ConfigError, TimelineError};
use thiserror::Error;

/// Errors surfaced by the scenecam commands
#[derive(Debug, Error)]
pub enum AppError {
    /// Config file could not be used
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// Scene catalog could not be loaded
    #[error("catalog: {0}")]
    Catalog(#[from] CatalogError),

    /// Timeline could not be encoded or decoded
    #[error("timeline: {0}")]
    Timeline(#[from] TimelineError),

    /// File system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A requested scene is not in the catalog
    #[error("unknown scene: {0}")]
    UnknownScene(String),

    /// Nothing to compile
    #[error("the scene cycle is empty")]
    EmptyCycle,

    /// The playback worker is gone
    #[error("playback worker stopped: {0}")]
    Worker(String),
}

/// Result type for host commands
pub type AppResult<T> = Result<T, AppError>;
