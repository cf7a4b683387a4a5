//! DhakaSeis - Simplified seismic design response spectrum for Bangladesh sites
//!
//! DhakaSeis turns a named location and soil class into a design response
//! spectrum and a traffic-light risk message through a deterministic chain:
//! site lookup → spectrum evaluation → peak reduction → risk classification
//! → report encoding.
//!
//! ## Modules
//!
//! - **Site Table**: Zone coefficients per location and soil profiles per class
//! - **Spectrum**: Three-branch elastic spectrum shape and its peak
//! - **Building**: Approximate fundamental period and detailing triage

pub mod assessment;
pub mod building;
pub mod error;
pub mod report;
pub mod risk;
pub mod site;
pub mod spectrum;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use assessment::{assess_site, AssessmentRequest, SiteAssessor};
pub use error::SeismicError;
pub use site::SiteTable;
pub use spectrum::{evaluate_spectrum, peak_acceleration, spectral_acceleration, PeriodGrid};
pub use types::{RiskTier, SoilProfile};

/// DhakaSeis version embedded in all reports
pub const SEIS_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for assessment reports
pub const PRODUCER_NAME: &str = "dhakaseis";
