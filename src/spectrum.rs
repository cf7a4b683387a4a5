//! Design response spectrum
//!
//! This module evaluates the simplified normalized elastic spectrum:
//!
//! ```text
//! T <= TB        Sa = Z·S·(1 + 1.5·T/TB)      ramp
//! TB < T <= TC   Sa = Z·S·2.5                 plateau
//! T > TC         Sa = Z·S·2.5·TC/T            decay
//! ```
//!
//! When `TB = 0` the ramp is only reached at `T = 0`, where the ramp's value at
//! its origin (`Z·S`) is returned instead of dividing by zero.
//!
//! All functions are pure; identical inputs give bit-identical outputs.

use crate::error::SeismicError;
use crate::types::{SoilProfile, SpectrumBranch, SpectrumPoint};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Spectral amplification on the plateau
pub const PLATEAU_AMPLIFICATION: f64 = 2.5;

/// Ramp slope; `1 + RAMP_SLOPE` equals the plateau amplification at T = TB
pub const RAMP_SLOPE: f64 = 1.5;

/// Default number of samples in a period grid
pub const DEFAULT_GRID_SAMPLES: usize = 100;

/// Default upper bound of a period grid (s)
pub const DEFAULT_GRID_END_S: f64 = 4.0;

/// Evenly spaced period grid configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodGrid {
    /// First period (s)
    pub start_s: f64,
    /// Last period (s), included
    pub end_s: f64,
    /// Number of samples
    pub samples: usize,
}

impl Default for PeriodGrid {
    fn default() -> Self {
        Self {
            start_s: 0.0,
            end_s: DEFAULT_GRID_END_S,
            samples: DEFAULT_GRID_SAMPLES,
        }
    }
}

impl PeriodGrid {
    /// Materialize the grid
    pub fn periods(&self) -> Result<Vec<f64>, SeismicError> {
        period_grid(self.start_s, self.end_s, self.samples)
    }
}

/// Build `samples` evenly spaced periods over `[start, end]`, both ends included.
pub fn period_grid(start: f64, end: f64, samples: usize) -> Result<Vec<f64>, SeismicError> {
    if samples == 0 {
        return Err(SeismicError::InvalidPeriodGrid(
            "at least one sample is required".to_string(),
        ));
    }

    if !start.is_finite() || !end.is_finite() || start < 0.0 {
        return Err(SeismicError::InvalidPeriodGrid(format!(
            "bounds must be finite and non-negative, got [{start}, {end}]"
        )));
    }

    if end < start {
        return Err(SeismicError::InvalidPeriodGrid(format!(
            "end ({end}) is before start ({start})"
        )));
    }

    if samples == 1 {
        return Ok(vec![start]);
    }

    let last = samples - 1;
    let step = (end - start) / last as f64;
    let mut periods: Vec<f64> = (0..last).map(|i| start + step * i as f64).collect();
    periods.push(end);

    Ok(periods)
}

/// Pick the spectrum branch for a period
pub fn branch(profile: &SoilProfile, period: f64) -> SpectrumBranch {
    match (period <= profile.tb(), period <= profile.tc()) {
        (true, _) => SpectrumBranch::Ramp,
        (false, true) => SpectrumBranch::Plateau,
        (false, false) => SpectrumBranch::Decay,
    }
}

/// Evaluate one point of the spectrum, keeping the branch it came from
pub fn evaluate_point(
    zone_coefficient: f64,
    profile: &SoilProfile,
    period: f64,
) -> Result<SpectrumPoint, SeismicError> {
    validate_zone(zone_coefficient)?;
    validate_period(period)?;

    let zs = zone_coefficient * profile.s();
    let branch = branch(profile, period);

    let sa_g = match branch {
        SpectrumBranch::Ramp => {
            // TB = 0 leaves only T = 0 on the ramp
            let ratio = if profile.tb() > 0.0 {
                period / profile.tb()
            } else {
                0.0
            };
            zs * (1.0 + ratio * RAMP_SLOPE)
        }
        SpectrumBranch::Plateau => zs * PLATEAU_AMPLIFICATION,
        SpectrumBranch::Decay => zs * PLATEAU_AMPLIFICATION * (profile.tc() / period),
    };

    Ok(SpectrumPoint {
        period_s: period,
        sa_g,
        branch,
    })
}

/// Spectral acceleration (g) at a single period
pub fn spectral_acceleration(
    zone_coefficient: f64,
    profile: &SoilProfile,
    period: f64,
) -> Result<f64, SeismicError> {
    evaluate_point(zone_coefficient, profile, period).map(|p| p.sa_g)
}

/// Evaluate the spectrum over a period grid.
///
/// The output has the same length and order as `periods`.
pub fn evaluate_spectrum(
    zone_coefficient: f64,
    profile: &SoilProfile,
    periods: &[f64],
) -> Result<Vec<f64>, SeismicError> {
    evaluate_points(zone_coefficient, profile, periods)
        .map(|points| points.into_iter().map(|p| p.sa_g).collect())
}

/// Evaluate the spectrum over a period grid, keeping period and branch per point
pub fn evaluate_points(
    zone_coefficient: f64,
    profile: &SoilProfile,
    periods: &[f64],
) -> Result<Vec<SpectrumPoint>, SeismicError> {
    validate_zone(zone_coefficient)?;

    let points = periods
        .iter()
        .map(|&t| evaluate_point(zone_coefficient, profile, t))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        zone = zone_coefficient,
        samples = points.len(),
        "evaluated spectrum"
    );

    Ok(points)
}

/// Maximum of a spectral acceleration sequence.
///
/// Every entry must be finite; NaN or infinite values are rejected rather
/// than skipped.
pub fn peak_acceleration(sequence: &[f64]) -> Result<f64, SeismicError> {
    let (&first, rest) = sequence.split_first().ok_or(SeismicError::EmptySequence)?;
    validate_acceleration(first)?;

    rest.iter().try_fold(first, |peak, &sa| {
        validate_acceleration(sa)?;
        Ok(peak.max(sa))
    })
}

/// Peak point of an evaluated spectrum; ties resolve to the shortest period
pub fn peak_point(points: &[SpectrumPoint]) -> Result<SpectrumPoint, SeismicError> {
    let (&first, rest) = points.split_first().ok_or(SeismicError::EmptySequence)?;
    validate_acceleration(first.sa_g)?;

    rest.iter().try_fold(first, |best, p| {
        validate_acceleration(p.sa_g)?;
        Ok(if p.sa_g > best.sa_g { *p } else { best })
    })
}

fn validate_acceleration(sa: f64) -> Result<(), SeismicError> {
    if sa.is_finite() {
        Ok(())
    } else {
        Err(SeismicError::InvalidPeak(sa))
    }
}

fn validate_zone(zone_coefficient: f64) -> Result<(), SeismicError> {
    if zone_coefficient.is_finite() && zone_coefficient > 0.0 {
        Ok(())
    } else {
        Err(SeismicError::InvalidZoneCoefficient(zone_coefficient))
    }
}

fn validate_period(period: f64) -> Result<(), SeismicError> {
    if period.is_finite() && period >= 0.0 {
        Ok(())
    } else {
        Err(SeismicError::InvalidPeriod(period))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const TOL: f64 = 1e-9;

    fn soil_sc() -> SoilProfile {
        SoilProfile::new(1.15, 0.10, 0.45, 1.5, "SC").unwrap()
    }

    fn soil_zero_tb() -> SoilProfile {
        SoilProfile::new(1.0, 0.0, 0.30, 1.2, "SA").unwrap()
    }

    fn profiles() -> Vec<SoilProfile> {
        vec![
            soil_sc(),
            soil_zero_tb(),
            SoilProfile::new(1.35, 0.20, 0.80, 2.0, "SD").unwrap(),
            SoilProfile::new(1.2, 0.15, 0.15, 0.15, "degenerate plateau").unwrap(),
        ]
    }

    #[test]
    fn test_dhaka_sc_scenario() {
        let periods = [0.0, 0.10, 0.45, 1.0, 4.0];
        let sa = evaluate_spectrum(0.20, &soil_sc(), &periods).unwrap();

        let expected = [0.23, 0.575, 0.575, 0.25875, 0.0646875];
        assert_eq!(sa.len(), expected.len());
        for (got, want) in sa.iter().zip(expected) {
            assert!((got - want).abs() < TOL, "got {got}, want {want}");
        }

        let peak = peak_acceleration(&sa).unwrap();
        assert!((peak - 0.575).abs() < TOL);
    }

    #[test]
    fn test_continuity_at_tb() {
        for profile in profiles().iter().filter(|p| p.tb() > 0.0) {
            let z = 0.28;
            let at_tb = spectral_acceleration(z, profile, profile.tb()).unwrap();
            let plateau = z * profile.s() * PLATEAU_AMPLIFICATION;
            assert!((at_tb - plateau).abs() < TOL);
            assert_eq!(branch(profile, profile.tb()), SpectrumBranch::Ramp);
        }
    }

    #[test]
    fn test_continuity_at_tc() {
        let profile = soil_sc();
        let at_tc = spectral_acceleration(0.2, &profile, profile.tc()).unwrap();
        let just_after = spectral_acceleration(0.2, &profile, profile.tc() + 1e-12).unwrap();
        assert!((at_tc - just_after).abs() < 1e-9);
    }

    #[test]
    fn test_plateau_constancy() {
        let profile = SoilProfile::new(1.35, 0.20, 0.80, 2.0, "SD").unwrap();
        let z = 0.36;
        let plateau = z * profile.s() * PLATEAU_AMPLIFICATION;

        for t in [0.20, 0.25, 0.4, 0.6, 0.79, 0.80] {
            let sa = spectral_acceleration(z, &profile, t).unwrap();
            assert!((sa - plateau).abs() < TOL, "T={t}: {sa} != {plateau}");
        }
    }

    #[test]
    fn test_decay_monotonicity() {
        for profile in profiles() {
            let periods: Vec<f64> = (1..=200)
                .map(|i| profile.tc() + i as f64 * 0.02)
                .collect();
            let sa = evaluate_spectrum(0.2, &profile, &periods).unwrap();

            for pair in sa.windows(2) {
                assert!(pair[0] >= pair[1]);
            }
        }
    }

    #[test]
    fn test_linear_in_zone_coefficient() {
        let periods = PeriodGrid::default().periods().unwrap();
        for profile in profiles() {
            let z = 0.15;
            let base = evaluate_spectrum(z, &profile, &periods).unwrap();
            let doubled = evaluate_spectrum(2.0 * z, &profile, &periods).unwrap();

            for (a, b) in base.iter().zip(&doubled) {
                assert_eq!(*b, 2.0 * a);
            }
        }
    }

    #[test]
    fn test_peak_matches_manual_maximum() {
        let periods = PeriodGrid::default().periods().unwrap();
        let sa = evaluate_spectrum(0.2, &soil_sc(), &periods).unwrap();

        let mut manual = sa[0];
        for &v in &sa {
            if v > manual {
                manual = v;
            }
        }

        assert_eq!(peak_acceleration(&sa).unwrap(), manual);
    }

    #[test]
    fn test_peak_empty_sequence() {
        assert!(matches!(
            peak_acceleration(&[]),
            Err(SeismicError::EmptySequence)
        ));
        assert!(matches!(peak_point(&[]), Err(SeismicError::EmptySequence)));
    }

    #[test]
    fn test_peak_rejects_non_finite_values() {
        assert!(matches!(
            peak_acceleration(&[f64::NAN]),
            Err(SeismicError::InvalidPeak(v)) if v.is_nan()
        ));
        assert!(matches!(
            peak_acceleration(&[f64::NAN, 0.3]),
            Err(SeismicError::InvalidPeak(_))
        ));
        assert!(matches!(
            peak_acceleration(&[0.3, f64::NAN]),
            Err(SeismicError::InvalidPeak(_))
        ));
        assert!(matches!(
            peak_acceleration(&[0.2, f64::INFINITY]),
            Err(SeismicError::InvalidPeak(v)) if v == f64::INFINITY
        ));
        assert!(matches!(
            peak_acceleration(&[f64::NEG_INFINITY]),
            Err(SeismicError::InvalidPeak(_))
        ));
    }

    #[test]
    fn test_peak_point_rejects_non_finite_values() {
        let points = [
            SpectrumPoint {
                period_s: 0.0,
                sa_g: f64::NAN,
                branch: SpectrumBranch::Ramp,
            },
            SpectrumPoint {
                period_s: 0.2,
                sa_g: 0.3,
                branch: SpectrumBranch::Plateau,
            },
        ];
        assert!(matches!(
            peak_point(&points),
            Err(SeismicError::InvalidPeak(_))
        ));
    }

    #[test]
    fn test_peak_point_prefers_first_period() {
        let periods = [0.0, 0.1, 0.2, 0.45, 1.0];
        let points = evaluate_points(0.2, &soil_sc(), &periods).unwrap();
        let peak = peak_point(&points).unwrap();

        assert_eq!(peak.period_s, 0.1);
        assert_eq!(peak.branch, SpectrumBranch::Ramp);
        assert!((peak.sa_g - 0.575).abs() < TOL);
    }

    #[test]
    fn test_zero_tb_at_zero_period() {
        let profile = soil_zero_tb();
        let sa = spectral_acceleration(0.2, &profile, 0.0).unwrap();
        assert!(sa.is_finite());
        assert!((sa - 0.2).abs() < TOL);

        // Immediately after T = 0 the plateau applies
        let next = evaluate_point(0.2, &profile, 0.01).unwrap();
        assert_eq!(next.branch, SpectrumBranch::Plateau);
        assert!((next.sa_g - 0.5).abs() < TOL);
    }

    #[test]
    fn test_ramp_origin_is_zs_for_any_tb() {
        for profile in profiles() {
            let sa = spectral_acceleration(0.12, &profile, 0.0).unwrap();
            assert!((sa - 0.12 * profile.s()).abs() < TOL);
        }
    }

    #[test]
    fn test_preserves_length_and_order() {
        let periods = [3.0, 0.0, 0.3, 1.2, 0.05];
        let points = evaluate_points(0.2, &soil_sc(), &periods).unwrap();
        let got: Vec<f64> = points.iter().map(|p| p.period_s).collect();
        assert_eq!(got, periods.to_vec());
    }

    #[test]
    fn test_deterministic() {
        let periods = PeriodGrid::default().periods().unwrap();
        let a = evaluate_spectrum(0.2, &soil_sc(), &periods).unwrap();
        let b = evaluate_spectrum(0.2, &soil_sc(), &periods).unwrap();
        let a_bits: Vec<u64> = a.iter().map(|v| v.to_bits()).collect();
        let b_bits: Vec<u64> = b.iter().map(|v| v.to_bits()).collect();
        assert_eq!(a_bits, b_bits);
    }

    #[test]
    fn test_rejects_invalid_inputs() {
        let profile = soil_sc();
        assert!(matches!(
            spectral_acceleration(0.0, &profile, 1.0),
            Err(SeismicError::InvalidZoneCoefficient(_))
        ));
        assert!(matches!(
            spectral_acceleration(f64::NAN, &profile, 1.0),
            Err(SeismicError::InvalidZoneCoefficient(_))
        ));
        assert!(matches!(
            spectral_acceleration(0.2, &profile, -0.1),
            Err(SeismicError::InvalidPeriod(_))
        ));
        assert!(matches!(
            evaluate_spectrum(0.2, &profile, &[0.1, f64::INFINITY]),
            Err(SeismicError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn test_empty_grid_evaluates_to_empty() {
        let sa = evaluate_spectrum(0.2, &soil_sc(), &[]).unwrap();
        assert!(sa.is_empty());
    }

    #[test]
    fn test_default_period_grid() {
        let periods = PeriodGrid::default().periods().unwrap();
        assert_eq!(periods.len(), 100);
        assert_eq!(periods[0], 0.0);
        assert_eq!(periods[99], 4.0);
        for pair in periods.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_period_grid_edge_cases() {
        assert_eq!(period_grid(1.0, 2.0, 1).unwrap(), vec![1.0]);
        assert_eq!(period_grid(0.0, 1.0, 3).unwrap(), vec![0.0, 0.5, 1.0]);
        assert!(period_grid(0.0, 4.0, 0).is_err());
        assert!(period_grid(-1.0, 4.0, 10).is_err());
        assert!(period_grid(2.0, 1.0, 10).is_err());
        assert!(period_grid(0.0, f64::NAN, 10).is_err());
    }
}
