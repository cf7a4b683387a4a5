//! Site parameter table
//!
//! This module holds the immutable lookup tables that feed the spectrum:
//! - Location name → zone coefficient (Z)
//! - Soil class → soil profile (S, TB, TC, TD)
//!
//! The built-in Bangladesh table is constructed once per process. Custom tables
//! can be loaded from JSON and go through the same validation.

use crate::error::SeismicError;
use crate::types::SoilProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

/// Built-in zone coefficients per location
const BUILTIN_ZONES: &[(&str, f64)] = &[
    ("Dhaka", 0.20),
    ("Chattogram", 0.28),
    ("Sylhet", 0.36),
    ("Mymensingh", 0.36),
    ("Rangpur", 0.28),
    ("Rajshahi", 0.15),
    ("Khulna", 0.12),
    ("Barishal", 0.12),
];

/// Built-in soil profiles: (class, S, TB, TC, TD, description)
const BUILTIN_SOILS: &[(&str, f64, f64, f64, f64, &str)] = &[
    (
        "SA",
        1.00,
        0.00,
        0.30,
        1.2,
        "Rock or very stiff ground. Shaking is not amplified much.",
    ),
    (
        "SB",
        1.20,
        0.00,
        0.40,
        1.5,
        "Very dense sand or stiff clay. Moderate amplification of short-period shaking.",
    ),
    (
        "SC",
        1.15,
        0.10,
        0.45,
        1.5,
        "Dense to medium-dense sand or stiff clay, typical of much of Dhaka.",
    ),
    (
        "SD",
        1.35,
        0.20,
        0.80,
        2.0,
        "Loose to medium sand or soft clay (filled land). Shaking is strongly amplified.",
    ),
];

static BUILTIN: OnceLock<SiteTable> = OnceLock::new();

/// Immutable mapping of locations and soil classes to their parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteTable {
    /// Zone coefficient per location
    locations: BTreeMap<String, f64>,
    /// Soil profile per soil class
    soils: BTreeMap<String, SoilProfile>,
}

impl Default for SiteTable {
    fn default() -> Self {
        Self::builtin().clone()
    }
}

impl SiteTable {
    /// Create a table from explicit maps, validating every entry
    pub fn new(
        locations: BTreeMap<String, f64>,
        soils: BTreeMap<String, SoilProfile>,
    ) -> Result<Self, SeismicError> {
        let table = Self { locations, soils };
        table.validate()?;
        Ok(table)
    }

    /// The built-in Bangladesh table, constructed on first use
    pub fn builtin() -> &'static SiteTable {
        BUILTIN.get_or_init(|| {
            let locations = BUILTIN_ZONES
                .iter()
                .map(|(name, z)| (name.to_string(), *z))
                .collect();

            let soils = BUILTIN_SOILS
                .iter()
                .map(|(name, s, tb, tc, td, description)| {
                    let profile = SoilProfile::new(*s, *tb, *tc, *td, *description)
                        .expect("built-in soil profiles are valid");
                    (name.to_string(), profile)
                })
                .collect();

            SiteTable { locations, soils }
        })
    }

    /// Load a table from JSON
    ///
    /// Expected shape:
    /// ```json
    /// {
    ///   "locations": { "Dhaka": 0.20 },
    ///   "soils": { "SC": { "s": 1.15, "tb": 0.10, "tc": 0.45, "td": 1.5, "description": "..." } }
    /// }
    /// ```
    pub fn from_json(json: &str) -> Result<Self, SeismicError> {
        let table: SiteTable = serde_json::from_str(json)?;
        table.validate()?;
        debug!(
            locations = table.locations.len(),
            soils = table.soils.len(),
            "loaded site table"
        );
        Ok(table)
    }

    /// Dump the table as pretty JSON
    pub fn to_json(&self) -> Result<String, SeismicError> {
        serde_json::to_string_pretty(self).map_err(SeismicError::JsonError)
    }

    /// Check table-level invariants (profiles are validated on construction)
    pub fn validate(&self) -> Result<(), SeismicError> {
        if self.locations.is_empty() {
            return Err(SeismicError::InvalidSiteTable(
                "no locations defined".to_string(),
            ));
        }

        if self.soils.is_empty() {
            return Err(SeismicError::InvalidSiteTable(
                "no soil classes defined".to_string(),
            ));
        }

        for (name, z) in &self.locations {
            if !z.is_finite() || *z <= 0.0 {
                return Err(SeismicError::InvalidSiteTable(format!(
                    "zone coefficient for {name} must be positive and finite, got {z}"
                )));
            }
        }

        Ok(())
    }

    /// Look up the zone coefficient for a location
    pub fn lookup_zone(&self, location: &str) -> Result<f64, SeismicError> {
        self.resolve_location(location).map(|(_, z)| z)
    }

    /// Look up the soil profile for a soil class
    pub fn lookup_soil(&self, soil_class: &str) -> Result<&SoilProfile, SeismicError> {
        self.resolve_soil(soil_class).map(|(_, profile)| profile)
    }

    /// Resolve a location to its canonical name and zone coefficient.
    ///
    /// Matching ignores ASCII case and surrounding whitespace.
    pub fn resolve_location(&self, location: &str) -> Result<(&str, f64), SeismicError> {
        let key = location.trim();
        let found = self
            .locations
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(name, z)| (name.as_str(), *z));

        match found {
            Some((name, z)) => {
                debug!(location = name, zone = z, "resolved location");
                Ok((name, z))
            }
            None => Err(SeismicError::UnknownLocation(location.to_string())),
        }
    }

    /// Resolve a soil class to its canonical name and profile
    pub fn resolve_soil(&self, soil_class: &str) -> Result<(&str, &SoilProfile), SeismicError> {
        let key = soil_class.trim();
        let found = self
            .soils
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(name, profile)| (name.as_str(), profile));

        match found {
            Some((name, profile)) => {
                debug!(soil_class = name, s = profile.s(), "resolved soil class");
                Ok((name, profile))
            }
            None => Err(SeismicError::UnknownSoilClass(soil_class.to_string())),
        }
    }

    /// Locations in sorted order
    pub fn locations(&self) -> impl Iterator<Item = (&str, f64)> {
        self.locations.iter().map(|(name, z)| (name.as_str(), *z))
    }

    /// Soil classes in sorted order
    pub fn soil_classes(&self) -> impl Iterator<Item = (&str, &SoilProfile)> {
        self.soils.iter().map(|(name, profile)| (name.as_str(), profile))
    }
}
