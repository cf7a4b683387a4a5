//! Building triage
//!
//! Estimates a building's fundamental period from its height and flags
//! configurations that need special seismic detailing.
//!
//! ```text
//! T = Ct · h^m      (h in metres)
//! ```

use crate::error::SeismicError;
use crate::types::{
    AdvisoryLevel, BuildingInput, DetailingAdvisory, OccupancyCategory, StructuralSystem,
};

/// Height (m) above which essential facilities need special detailing
pub const ESSENTIAL_HEIGHT_LIMIT_M: f64 = 20.0;

impl StructuralSystem {
    /// Period coefficients `(Ct, m)`
    pub fn period_coefficients(&self) -> (f64, f64) {
        match self {
            StructuralSystem::ConcreteMomentFrame => (0.0466, 0.90),
            StructuralSystem::SteelMomentFrame => (0.0724, 0.80),
            StructuralSystem::EccentricBracedSteel => (0.0731, 0.75),
            StructuralSystem::Other => (0.0488, 0.75),
        }
    }
}

/// Approximate fundamental period (s) for a building of the given height
pub fn approximate_period(height_m: f64, system: StructuralSystem) -> Result<f64, SeismicError> {
    validate_height(height_m)?;
    let (ct, m) = system.period_coefficients();
    Ok(ct * height_m.powf(m))
}

/// Detailing advisory for a building height and occupancy
pub fn detailing_advisory(
    height_m: f64,
    occupancy: OccupancyCategory,
) -> Result<DetailingAdvisory, SeismicError> {
    validate_height(height_m)?;

    if height_m > ESSENTIAL_HEIGHT_LIMIT_M && occupancy == OccupancyCategory::Essential {
        Ok(DetailingAdvisory {
            level: AdvisoryLevel::Warning,
            message: format!(
                "Special seismic detailing required for essential facilities taller than {} m \
                 ({} m given).",
                ESSENTIAL_HEIGHT_LIMIT_M, height_m
            ),
        })
    } else {
        Ok(DetailingAdvisory {
            level: AdvisoryLevel::Ok,
            message: format!(
                "Height is within standard limits for {} occupancy.",
                occupancy.label()
            ),
        })
    }
}

impl BuildingInput {
    pub fn new(height_m: f64, occupancy: OccupancyCategory, system: StructuralSystem) -> Self {
        Self {
            height_m,
            occupancy,
            system,
        }
    }

    pub fn approximate_period(&self) -> Result<f64, SeismicError> {
        approximate_period(self.height_m, self.system)
    }

    pub fn advisory(&self) -> Result<DetailingAdvisory, SeismicError> {
        detailing_advisory(self.height_m, self.occupancy)
    }
}

fn validate_height(height_m: f64) -> Result<(), SeismicError> {
    if height_m.is_finite() && height_m >= 0.0 {
        Ok(())
    } else {
        Err(SeismicError::InvalidBuilding(format!(
            "height must be non-negative and finite, got {height_m}"
        )))
    }
}
