//! Risk classification
//!
//! Maps peak spectral acceleration to a three-tier traffic-light message.
//! Each tier is closed on its lower bound and open on its upper bound, so the
//! tiers partition `[0, ∞)`.

use crate::error::SeismicError;
use crate::types::{RiskMessage, RiskTier, TrafficLight};

/// Lower bound (g) of the moderate tier
pub const MODERATE_THRESHOLD_G: f64 = 0.4;

/// Lower bound (g) of the extreme tier
pub const EXTREME_THRESHOLD_G: f64 = 0.7;

impl RiskTier {
    /// Classify a peak spectral acceleration (g)
    pub fn classify(peak: f64) -> Result<Self, SeismicError> {
        if peak.is_nan() || peak < 0.0 {
            return Err(SeismicError::InvalidPeak(peak));
        }

        Ok(if peak < MODERATE_THRESHOLD_G {
            RiskTier::Low
        } else if peak < EXTREME_THRESHOLD_G {
            RiskTier::Moderate
        } else {
            RiskTier::Extreme
        })
    }

    pub fn light(&self) -> TrafficLight {
        match self {
            RiskTier::Low => TrafficLight::Green,
            RiskTier::Moderate => TrafficLight::Amber,
            RiskTier::Extreme => TrafficLight::Red,
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low seismic demand",
            RiskTier::Moderate => "Moderate to high seismic demand",
            RiskTier::Extreme => "Extreme seismic demand",
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            RiskTier::Low => {
                "Standard construction following the building code is expected to be adequate. \
                 Make sure the design and site supervision are done by a qualified engineer."
            }
            RiskTier::Moderate => {
                "Engineered design with ductile detailing is required. Avoid soft storeys such as \
                 open ground-floor parking, and get a structural assessment before adding floors."
            }
            RiskTier::Extreme => {
                "Special seismic design is essential. Have a structural engineer review the \
                 foundation and lateral system; soil improvement or a lighter structure may be \
                 needed."
            }
        }
    }

    /// Full user-facing message for this tier
    pub fn message(&self) -> RiskMessage {
        RiskMessage {
            tier: *self,
            light: self.light(),
            headline: self.headline().to_string(),
            guidance: self.guidance().to_string(),
        }
    }
}

/// Classify a peak and build its message in one step
pub fn classify_peak(peak: f64) -> Result<RiskMessage, SeismicError> {
    RiskTier::classify(peak).map(|tier| tier.message())
}
