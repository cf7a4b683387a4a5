//! Assessment orchestration
//!
//! This module provides the public API for DhakaSeis.
//! It runs the full chain from a location and soil class to a site assessment.

use crate::error::SeismicError;
use crate::report::ReportEncoder;
use crate::risk::classify_peak;
use crate::site::SiteTable;
use crate::spectrum::{evaluate_point, evaluate_points, peak_point, PeriodGrid};
use crate::types::{BuildingInput, BuildingTriage, SiteAssessment};
use serde::{Deserialize, Serialize};
use tracing::info;

/// What to assess
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRequest {
    pub location: String,
    pub soil_class: String,
    #[serde(default)]
    pub building: Option<BuildingInput>,
}

impl AssessmentRequest {
    pub fn new(location: impl Into<String>, soil_class: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            soil_class: soil_class.into(),
            building: None,
        }
    }

    pub fn with_building(mut self, building: BuildingInput) -> Self {
        self.building = Some(building);
        self
    }
}

/// Assess a site against the built-in table and the default period grid.
///
/// # Arguments
/// * `location` - Location name, e.g. "Dhaka"
/// * `soil_class` - Soil class name, e.g. "SC"
///
/// # Example
/// ```ignore
/// let assessment = assess_site("Dhaka", "SC")?;
/// assert_eq!(assessment.risk.tier, RiskTier::Moderate);
/// ```
pub fn assess_site(location: &str, soil_class: &str) -> Result<SiteAssessment, SeismicError> {
    SiteAssessor::builtin().assess(&AssessmentRequest::new(location, soil_class))
}

/// Assess a site and encode the result as a JSON report
pub fn assess_site_json(location: &str, soil_class: &str) -> Result<String, SeismicError> {
    let assessment = assess_site(location, soil_class)?;
    ReportEncoder::new().encode_to_json(&assessment)
}

/// Runs assessments against one site table and period grid.
///
/// The assessor holds no mutable state; every call is independent.
#[derive(Debug, Clone)]
pub struct SiteAssessor {
    table: SiteTable,
    grid: PeriodGrid,
}

impl Default for SiteAssessor {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SiteAssessor {
    /// Create an assessor with a custom table and grid
    pub fn new(table: SiteTable, grid: PeriodGrid) -> Self {
        Self { table, grid }
    }

    /// Create an assessor over the built-in table and default grid
    pub fn builtin() -> Self {
        Self::new(SiteTable::builtin().clone(), PeriodGrid::default())
    }

    /// Replace the period grid
    pub fn with_grid(mut self, grid: PeriodGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn table(&self) -> &SiteTable {
        &self.table
    }

    pub fn grid(&self) -> &PeriodGrid {
        &self.grid
    }

    /// Assess one site.
    ///
    /// Stages:
    /// 1. SiteTable - Resolve zone coefficient and soil profile
    /// 2. Spectrum - Evaluate over the period grid and take the peak
    /// 3. Risk - Classify the peak into a traffic-light message
    /// 4. Building - Optional period estimate and detailing advisory
    pub fn assess(&self, request: &AssessmentRequest) -> Result<SiteAssessment, SeismicError> {
        // Stage 1: Resolve site parameters
        let (location, zone_coefficient) = self.table.resolve_location(&request.location)?;
        let (soil_class, soil) = self.table.resolve_soil(&request.soil_class)?;

        // Stage 2: Evaluate spectrum
        let periods = self.grid.periods()?;
        let spectrum = evaluate_points(zone_coefficient, soil, &periods)?;
        let peak = peak_point(&spectrum)?;

        // Stage 3: Classify
        let risk = classify_peak(peak.sa_g)?;

        // Stage 4: Building triage
        let building = match &request.building {
            Some(input) => {
                let period_s = input.approximate_period()?;
                let design = evaluate_point(zone_coefficient, soil, period_s)?;
                Some(BuildingTriage {
                    input: input.clone(),
                    period_s,
                    design_sa_g: design.sa_g,
                    branch: design.branch,
                    advisory: input.advisory()?,
                })
            }
            None => None,
        };

        info!(
            location,
            soil_class,
            peak_g = peak.sa_g,
            tier = risk.tier.as_str(),
            "site assessed"
        );

        Ok(SiteAssessment {
            location: location.to_string(),
            zone_coefficient,
            soil_class: soil_class.to_string(),
            soil: soil.clone(),
            spectrum,
            peak,
            risk,
            building,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{
        AdvisoryLevel, OccupancyCategory, RiskTier, SpectrumBranch, StructuralSystem,
    };

    #[test]
    fn test_assess_dhaka_sc() {
        let assessment = assess_site("Dhaka", "SC").unwrap();

        assert_eq!(assessment.location, "Dhaka");
        assert_eq!(assessment.soil_class, "SC");
        assert_eq!(assessment.zone_coefficient, 0.20);
        assert_eq!(assessment.spectrum.len(), 100);
        assert!((assessment.peak.sa_g - 0.575).abs() < 1e-9);
        assert_eq!(assessment.peak.branch, SpectrumBranch::Plateau);
        assert_eq!(assessment.risk.tier, RiskTier::Moderate);
        assert!(assessment.building.is_none());
    }

    #[test]
    fn test_assess_tiers_across_table() {
        // Khulna / SA: 0.12 * 1.0 * 2.5 = 0.3
        assert_eq!(assess_site("Khulna", "SA").unwrap().risk.tier, RiskTier::Low);
        // Sylhet / SD: 0.36 * 1.35 * 2.5 = 1.215
        assert_eq!(assess_site("Sylhet", "SD").unwrap().risk.tier, RiskTier::Extreme);
    }

    #[test]
    fn test_assess_unknown_inputs() {
        assert!(matches!(
            assess_site("Nowhere", "SC"),
            Err(SeismicError::UnknownLocation(_))
        ));
        assert!(matches!(
            assess_site("Dhaka", "SX"),
            Err(SeismicError::UnknownSoilClass(_))
        ));
    }

    #[test]
    fn test_assess_with_building() {
        let request = AssessmentRequest::new("dhaka", "sc").with_building(BuildingInput::new(
            25.0,
            OccupancyCategory::Essential,
            StructuralSystem::ConcreteMomentFrame,
        ));

        let assessment = SiteAssessor::builtin().assess(&request).unwrap();
        let building = assessment.building.unwrap();

        // T ≈ 0.84 s lies in the decay region of SC
        assert_eq!(building.branch, SpectrumBranch::Decay);
        let expected = 0.2 * 1.15 * 2.5 * (0.45 / building.period_s);
        assert!((building.design_sa_g - expected).abs() < 1e-12);
        assert_eq!(building.advisory.level, AdvisoryLevel::Warning);
    }

    #[test]
    fn test_assess_with_custom_grid() {
        let grid = PeriodGrid {
            start_s: 0.0,
            end_s: 2.0,
            samples: 5,
        };
        let assessor = SiteAssessor::builtin().with_grid(grid);
        let assessment = assessor.assess(&AssessmentRequest::new("Dhaka", "SC")).unwrap();

        let periods: Vec<f64> = assessment.spectrum.iter().map(|p| p.period_s).collect();
        assert_eq!(periods, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        // 0.5 s is already past TC, so the grid misses the plateau
        assert!(assessment.peak.sa_g < 0.575);
        assert_eq!(assessment.peak.period_s, 0.5);
    }

    #[test]
    fn test_assess_invalid_grid() {
        let grid = PeriodGrid {
            start_s: 0.0,
            end_s: 4.0,
            samples: 0,
        };
        let assessor = SiteAssessor::builtin().with_grid(grid);
        assert!(matches!(
            assessor.assess(&AssessmentRequest::new("Dhaka", "SC")),
            Err(SeismicError::InvalidPeriodGrid(_))
        ));
    }

    #[test]
    fn test_assess_site_json() {
        let json = assess_site_json("Dhaka", "SC").unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["site"]["location"], "Dhaka");
        assert_eq!(value["risk"]["tier"], "moderate");
    }
}
