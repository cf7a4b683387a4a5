//! Core types for DhakaSeis
//!
//! This module defines the data structures that flow through each stage of an
//! assessment: soil profiles, spectrum points, risk messages, building triage
//! and the serialized report.

use crate::error::SeismicError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Soil profile for one soil class.
///
/// Instances are only created through [`SoilProfile::new`] (deserialization is
/// routed through it as well), so every profile in memory satisfies
/// `S > 0` and `0 <= TB <= TC <= TD` with `TC > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSoilProfile")]
pub struct SoilProfile {
    s: f64,
    tb: f64,
    tc: f64,
    td: f64,
    description: String,
}

/// Unvalidated wire form of a soil profile
#[derive(Debug, Clone, Deserialize)]
struct RawSoilProfile {
    s: f64,
    tb: f64,
    tc: f64,
    td: f64,
    #[serde(default)]
    description: String,
}

impl TryFrom<RawSoilProfile> for SoilProfile {
    type Error = SeismicError;

    fn try_from(raw: RawSoilProfile) -> Result<Self, Self::Error> {
        SoilProfile::new(raw.s, raw.tb, raw.tc, raw.td, raw.description)
    }
}

impl SoilProfile {
    /// Create a validated soil profile
    ///
    /// # Arguments
    /// * `s` - Soil amplification factor (positive)
    /// * `tb`, `tc`, `td` - Corner periods in seconds, `0 <= tb <= tc <= td`
    /// * `description` - Free text shown to users
    pub fn new(
        s: f64,
        tb: f64,
        tc: f64,
        td: f64,
        description: impl Into<String>,
    ) -> Result<Self, SeismicError> {
        for (name, value) in [("S", s), ("TB", tb), ("TC", tc), ("TD", td)] {
            if !value.is_finite() {
                return Err(SeismicError::InvalidSoilProfile(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }

        if s <= 0.0 {
            return Err(SeismicError::InvalidSoilProfile(format!(
                "S must be positive, got {s}"
            )));
        }

        if tb < 0.0 {
            return Err(SeismicError::InvalidSoilProfile(format!(
                "TB must be non-negative, got {tb}"
            )));
        }

        if tb > tc || tc > td {
            return Err(SeismicError::InvalidSoilProfile(format!(
                "corner periods must satisfy TB <= TC <= TD, got TB={tb}, TC={tc}, TD={td}"
            )));
        }

        // TC is the decay numerator; a zero plateau end collapses the spectrum to Z*S at T=0
        if tc == 0.0 {
            return Err(SeismicError::InvalidSoilProfile(
                "TC must be positive".to_string(),
            ));
        }

        Ok(Self {
            s,
            tb,
            tc,
            td,
            description: description.into(),
        })
    }

    /// Soil amplification factor
    pub fn s(&self) -> f64 {
        self.s
    }

    /// Start of the plateau (s)
    pub fn tb(&self) -> f64 {
        self.tb
    }

    /// End of the plateau (s)
    pub fn tc(&self) -> f64 {
        self.tc
    }

    /// Start of the constant-displacement region (s); display only
    pub fn td(&self) -> f64 {
        self.td
    }

    /// Free-text explanation for display
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// Region of the spectrum a period falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumBranch {
    /// Linear ramp from `Z*S` at T=0 up to the plateau at TB
    Ramp,
    /// Constant `2.5*Z*S` between TB and TC
    Plateau,
    /// Hyperbolic decay beyond TC
    Decay,
}

impl SpectrumBranch {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpectrumBranch::Ramp => "ramp",
            SpectrumBranch::Plateau => "plateau",
            SpectrumBranch::Decay => "decay",
        }
    }
}

/// One evaluated point of the spectrum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumPoint {
    /// Structural period (s)
    pub period_s: f64,
    /// Spectral acceleration (g)
    pub sa_g: f64,
    /// Branch the period fell into
    pub branch: SpectrumBranch,
}

/// Risk tier derived from peak spectral acceleration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    /// Peak below 0.4 g
    Low,
    /// Peak in [0.4, 0.7) g
    Moderate,
    /// Peak at or above 0.7 g
    Extreme,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::Extreme => "extreme",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Traffic-light colour used to present a risk tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficLight {
    Green,
    Amber,
    Red,
}

/// User-facing risk message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMessage {
    pub tier: RiskTier,
    pub light: TrafficLight,
    pub headline: String,
    pub guidance: String,
}

/// Occupancy category of the building under assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyCategory {
    #[default]
    StandardResidential,
    /// Hospitals, schools and other post-disaster facilities
    Essential,
    HazardousStorage,
}

impl OccupancyCategory {
    pub fn label(&self) -> &'static str {
        match self {
            OccupancyCategory::StandardResidential => "Standard Residential",
            OccupancyCategory::Essential => "Essential (Hospital/School)",
            OccupancyCategory::HazardousStorage => "Hazardous Storage",
        }
    }
}

/// Lateral load-resisting system, used for the approximate period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralSystem {
    #[default]
    ConcreteMomentFrame,
    SteelMomentFrame,
    EccentricBracedSteel,
    Other,
}

/// Building parameters supplied with an assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingInput {
    /// Height above base (m)
    pub height_m: f64,
    #[serde(default)]
    pub occupancy: OccupancyCategory,
    #[serde(default)]
    pub system: StructuralSystem,
}

/// Outcome of the detailing check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdvisoryLevel {
    Ok,
    Warning,
}

/// Detailing advisory for a building
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailingAdvisory {
    pub level: AdvisoryLevel,
    pub message: String,
}

/// Building-specific part of an assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingTriage {
    pub input: BuildingInput,
    /// Approximate fundamental period (s)
    pub period_s: f64,
    /// Design spectral acceleration at the approximate period (g)
    pub design_sa_g: f64,
    pub branch: SpectrumBranch,
    pub advisory: DetailingAdvisory,
}

/// Full in-memory result of assessing one site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteAssessment {
    /// Canonical location name from the site table
    pub location: String,
    pub zone_coefficient: f64,
    /// Canonical soil class name from the site table
    pub soil_class: String,
    pub soil: SoilProfile,
    pub spectrum: Vec<SpectrumPoint>,
    pub peak: SpectrumPoint,
    pub risk: RiskMessage,
    pub building: Option<BuildingTriage>,
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Site section of a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSite {
    pub location: String,
    pub zone_coefficient: f64,
    pub soil_class: String,
    pub soil_factor: f64,
    pub tb_s: f64,
    pub tc_s: f64,
    pub td_s: f64,
    pub soil_description: String,
}

/// Spectrum section of a report, stored column-wise for plotting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSpectrum {
    pub periods_s: Vec<f64>,
    pub sa_g: Vec<f64>,
}

/// Peak section of a report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPeak {
    pub sa_g: f64,
    pub period_s: f64,
    pub branch: SpectrumBranch,
}

/// Complete assessment report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub site: ReportSite,
    pub spectrum: ReportSpectrum,
    pub peak: ReportPeak,
    pub risk: RiskMessage,
    pub building: Option<BuildingTriage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soil_profile_accepts_zero_tb() {
        let profile = SoilProfile::new(1.0, 0.0, 0.3, 1.2, "rock").unwrap();
        assert_eq!(profile.tb(), 0.0);
        assert_eq!(profile.description(), "rock");
    }

    #[test]
    fn test_soil_profile_rejects_unordered_corners() {
        let err = SoilProfile::new(1.15, 0.5, 0.45, 1.5, "").unwrap_err();
        assert!(matches!(err, SeismicError::InvalidSoilProfile(_)));

        let err = SoilProfile::new(1.15, 0.1, 0.45, 0.4, "").unwrap_err();
        assert!(matches!(err, SeismicError::InvalidSoilProfile(_)));
    }

    #[test]
    fn test_soil_profile_rejects_bad_values() {
        assert!(SoilProfile::new(0.0, 0.1, 0.45, 1.5, "").is_err());
        assert!(SoilProfile::new(-1.0, 0.1, 0.45, 1.5, "").is_err());
        assert!(SoilProfile::new(1.0, -0.1, 0.45, 1.5, "").is_err());
        assert!(SoilProfile::new(1.0, 0.0, 0.0, 0.0, "").is_err());
        assert!(SoilProfile::new(f64::NAN, 0.1, 0.45, 1.5, "").is_err());
        assert!(SoilProfile::new(1.0, 0.1, 0.45, f64::INFINITY, "").is_err());
    }

    #[test]
    fn test_soil_profile_deserialize_validates() {
        let ok: SoilProfile =
            serde_json::from_str(r#"{"s":1.15,"tb":0.1,"tc":0.45,"td":1.5}"#).unwrap();
        assert_eq!(ok.s(), 1.15);
        assert_eq!(ok.description(), "");

        let bad = serde_json::from_str::<SoilProfile>(r#"{"s":1.15,"tb":0.6,"tc":0.45,"td":1.5}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_enum_serialization() {
        assert_eq!(serde_json::to_string(&RiskTier::Moderate).unwrap(), "\"moderate\"");
        assert_eq!(
            serde_json::to_string(&OccupancyCategory::HazardousStorage).unwrap(),
            "\"hazardous_storage\""
        );
        assert_eq!(serde_json::to_string(&TrafficLight::Amber).unwrap(), "\"amber\"");
        assert_eq!(serde_json::to_string(&SpectrumBranch::Decay).unwrap(), "\"decay\"");
    }
}
