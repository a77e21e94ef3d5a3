//! One-rep-max estimation and the intensity/rep relationship.

use crate::rounding::{round2, round_to_increment};
use crate::types::normalize_tag;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest rep count accepted for an estimate.
pub const MAX_ESTIMATE_REPS: u32 = 30;

/// Formula used to turn a tested set into a 1RM
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OneRmMethod {
    Brzycki,
    Epley,
    #[default]
    Average,
    /// The athlete states a known max; no formula applied
    Manual,
}

impl FromStr for OneRmMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_tag(s).as_str() {
            "brzycki" => Ok(OneRmMethod::Brzycki),
            "epley" => Ok(OneRmMethod::Epley),
            "average" | "avg" => Ok(OneRmMethod::Average),
            "manual" => Ok(OneRmMethod::Manual),
            other => Err(Error::invalid(format!(
                "unknown 1RM method '{other}' (expected brzycki, epley, average, manual)"
            ))),
        }
    }
}

impl fmt::Display for OneRmMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OneRmMethod::Brzycki => "brzycki",
            OneRmMethod::Epley => "epley",
            OneRmMethod::Average => "average",
            OneRmMethod::Manual => "manual",
        };
        f.write_str(s)
    }
}

/// Brzycki: `w * 36 / (37 - r)`
///
/// Callers keep `reps` within [`MAX_ESTIMATE_REPS`], so the denominator
/// never reaches zero.
pub fn brzycki(weight: f64, reps: u32) -> f64 {
    if reps <= 1 {
        return weight;
    }
    weight * 36.0 / (37.0 - reps as f64)
}

/// Epley: `w * (1 + r / 30)`
pub fn epley(weight: f64, reps: u32) -> f64 {
    if reps <= 1 {
        return weight;
    }
    weight * (1.0 + reps as f64 / 30.0)
}

/// Estimate a one-rep max from a tested set
///
/// # Arguments
/// * `weight` - Load lifted in kilograms, must be positive
/// * `reps` - Repetitions completed, 1 to 30
/// * `method` - Formula choice
///
/// # Returns
/// Estimated 1RM rounded to 0.01 kg. A single rep always returns the weight.
pub fn estimate(weight: f64, reps: u32, method: OneRmMethod) -> Result<f64> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(Error::invalid(format!("weight must be positive, got {weight}")));
    }
    if reps == 0 || reps > MAX_ESTIMATE_REPS {
        return Err(Error::invalid(format!(
            "reps must be between 1 and {MAX_ESTIMATE_REPS}, got {reps}"
        )));
    }

    let raw = match method {
        OneRmMethod::Brzycki => brzycki(weight, reps),
        OneRmMethod::Epley => epley(weight, reps),
        OneRmMethod::Average => (brzycki(weight, reps) + epley(weight, reps)) / 2.0,
        OneRmMethod::Manual => weight,
    };

    tracing::debug!(weight, reps, %method, estimate = raw, "estimated 1RM");
    Ok(round2(raw))
}

/// Reps achievable at a given share of 1RM, as (reps, percent) pairs
const REP_INTENSITY_TABLE: [(u32, f64); 16] = [
    (1, 100.0),
    (2, 97.0),
    (3, 94.0),
    (4, 91.0),
    (5, 88.0),
    (6, 85.0),
    (7, 82.0),
    (8, 79.0),
    (9, 76.0),
    (10, 73.0),
    (11, 70.0),
    (12, 67.0),
    (14, 64.0),
    (16, 61.0),
    (18, 58.0),
    (20, 55.0),
];

/// Percentage of 1RM at which `reps` is a maximal set
///
/// Rep counts between table rows use the next lower row; counts past the
/// table use its last row.
pub fn reps_to_intensity(reps: u32) -> f64 {
    let reps = reps.max(1);
    REP_INTENSITY_TABLE
        .iter()
        .rev()
        .find(|(r, _)| *r <= reps)
        .map(|(_, pct)| *pct)
        .unwrap_or(100.0)
}

/// Maximal reps at a given percentage of 1RM
pub fn intensity_to_reps(percent: f64) -> u32 {
    REP_INTENSITY_TABLE
        .iter()
        .find(|(_, pct)| percent >= *pct)
        .map(|(reps, _)| *reps)
        .unwrap_or(20)
}

/// RPE from reps done versus reps possible, clamped to 1..=10
pub fn estimate_rpe(reps_done: u32, max_reps: u32) -> f64 {
    let in_reserve = max_reps as f64 - reps_done as f64;
    (10.0 - in_reserve).clamp(1.0, 10.0)
}

/// Working weight at `percent` of a max, rounded to the plate increment
pub fn working_weight(one_rm: f64, percent: f64, increment: f64) -> f64 {
    round_to_increment(one_rm * percent / 100.0, increment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_rep_returns_weight() {
        assert_eq!(estimate(100.0, 1, OneRmMethod::Epley).unwrap(), 100.0);
        assert_eq!(estimate(100.0, 1, OneRmMethod::Brzycki).unwrap(), 100.0);
        assert_eq!(estimate(100.0, 1, OneRmMethod::Average).unwrap(), 100.0);
    }

    #[test]
    fn test_formulas() {
        assert_eq!(estimate(100.0, 5, OneRmMethod::Brzycki).unwrap(), 112.5);
        assert_eq!(estimate(100.0, 6, OneRmMethod::Epley).unwrap(), 120.0);
        // (112.5 + 116.67) / 2
        assert_eq!(estimate(100.0, 5, OneRmMethod::Average).unwrap(), 114.58);
        assert_eq!(estimate(140.0, 8, OneRmMethod::Manual).unwrap(), 140.0);
    }

    #[test]
    fn test_estimates_never_below_tested_weight() {
        for reps in 1..=10 {
            for w in [20.0, 57.5, 100.0, 182.5, 300.0] {
                assert!(brzycki(w, reps) >= w);
                assert!(epley(w, reps) >= w);
                assert!(estimate(w, reps, OneRmMethod::Average).unwrap() >= w);
            }
        }
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            estimate(0.0, 5, OneRmMethod::Epley),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            estimate(-20.0, 5, OneRmMethod::Epley),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            estimate(100.0, 0, OneRmMethod::Epley),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            estimate(100.0, 31, OneRmMethod::Brzycki),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("Epley".parse::<OneRmMethod>().unwrap(), OneRmMethod::Epley);
        assert!("lombardi".parse::<OneRmMethod>().is_err());
    }

    #[test]
    fn test_rep_tables() {
        assert_eq!(reps_to_intensity(5), 88.0);
        assert_eq!(reps_to_intensity(13), 67.0);
        assert_eq!(reps_to_intensity(25), 55.0);
        assert_eq!(intensity_to_reps(85.0), 6);
        assert_eq!(intensity_to_reps(88.0), 5);
        assert_eq!(intensity_to_reps(86.0), 6);
        assert_eq!(intensity_to_reps(40.0), 20);
    }

    #[test]
    fn test_rpe_and_working_weight() {
        assert_eq!(estimate_rpe(8, 10), 8.0);
        assert_eq!(estimate_rpe(1, 20), 1.0);
        assert_eq!(estimate_rpe(10, 8), 10.0);
        assert_eq!(working_weight(150.0, 80.0, 2.5), 120.0);
        assert_eq!(working_weight(143.0, 75.0, 2.5), 107.5);
    }
}
