//! Report encoding
//!
//! This module encodes site assessments into JSON reports for the
//! presentation layer. The spectrum is stored column-wise so it can be plotted
//! directly.

use crate::error::SeismicError;
use crate::types::{
    AssessmentReport, ReportPeak, ReportProducer, ReportSite, ReportSpectrum, SiteAssessment,
};
use crate::{PRODUCER_NAME, SEIS_VERSION};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for assessment reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Encode an assessment into a report stamped with the current time
    pub fn encode(&self, assessment: &SiteAssessment) -> AssessmentReport {
        self.encode_at(assessment, Utc::now())
    }

    /// Encode an assessment into a report stamped with `computed_at`
    pub fn encode_at(
        &self,
        assessment: &SiteAssessment,
        computed_at: DateTime<Utc>,
    ) -> AssessmentReport {
        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: SEIS_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let soil = &assessment.soil;
        let site = ReportSite {
            location: assessment.location.clone(),
            zone_coefficient: assessment.zone_coefficient,
            soil_class: assessment.soil_class.clone(),
            soil_factor: soil.s(),
            tb_s: soil.tb(),
            tc_s: soil.tc(),
            td_s: soil.td(),
            soil_description: soil.description().to_string(),
        };

        let spectrum = ReportSpectrum {
            periods_s: assessment.spectrum.iter().map(|p| p.period_s).collect(),
            sa_g: assessment.spectrum.iter().map(|p| p.sa_g).collect(),
        };

        let peak = ReportPeak {
            sa_g: assessment.peak.sa_g,
            period_s: assessment.peak.period_s,
            branch: assessment.peak.branch,
        };

        AssessmentReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            computed_at_utc: computed_at.to_rfc3339(),
            site,
            spectrum,
            peak,
            risk: assessment.risk.clone(),
            building: assessment.building.clone(),
        }
    }

    /// Encode to a compact JSON string
    pub fn encode_to_json(&self, assessment: &SiteAssessment) -> Result<String, SeismicError> {
        let report = self.encode(assessment);
        serde_json::to_string(&report).map_err(SeismicError::JsonError)
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json_pretty(
        &self,
        assessment: &SiteAssessment,
    ) -> Result<String, SeismicError> {
        let report = self.encode(assessment);
        serde_json::to_string_pretty(&report).map_err(SeismicError::JsonError)
    }
}
