//! Error types for DhakaSeis

use thiserror::Error;

/// Errors that can occur during site lookup and spectrum evaluation.
///
/// Every variant is a rejected individual call; none is transient.
#[derive(Debug, Error)]
pub enum SeismicError {
    #[error("Unknown location: {0}")]
    UnknownLocation(String),

    #[error("Unknown soil class: {0}")]
    UnknownSoilClass(String),

    #[error("Invalid soil profile: {0}")]
    InvalidSoilProfile(String),

    #[error("Cannot take the peak of an empty sequence")]
    EmptySequence,

    #[error("Invalid zone coefficient: {0} (must be positive and finite)")]
    InvalidZoneCoefficient(f64),

    #[error("Invalid period: {0} s (must be non-negative and finite)")]
    InvalidPeriod(f64),

    #[error("Invalid period grid: {0}")]
    InvalidPeriodGrid(String),

    #[error("Invalid building parameters: {0}")]
    InvalidBuilding(String),

    #[error("Invalid spectral acceleration: {0}")]
    InvalidPeak(f64),

    #[error("Invalid site table: {0}")]
    InvalidSiteTable(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),
}
