//! Load progression across the periodization skeleton.
//!
//! Every prescription is a pure function of the mesocycle targets, the
//! microcycle modifiers and the athlete's max:
//! - weight = round(max * phase intensity% * intensity modifier, increment)
//! - sets/reps, rest and RPE come from fixed intensity bands
//! - deload weeks override everything with a light 2 x 8-10 pattern
//!
//! Nothing here knows which exercises a day holds; assemblers decide that
//! and call into this module line by line.

use crate::maxes::MaxTable;
use crate::rounding::{round2, round_to_increment};
use crate::{
    ExperienceLevel, Macrocycle, Mesocycle, Microcycle, ProgressionEntry, RepRange,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Intensity bands
// ============================================================================

pub const DELOAD_SETS: u32 = 2;
pub const DELOAD_REPS: RepRange = RepRange::new(8, 10);
pub const DELOAD_REST_SECONDS: u32 = 90;
pub const DELOAD_RPE: f64 = 5.0;

/// Intensity multiplier for the secondary ("light") days of a split
pub const LIGHT_DAY_FACTOR: f64 = 0.85;

const MIN_WORKING_SETS: u32 = 2;
const ISOLATION_EXTRA_REPS: u32 = 2;

/// Base sets and reps for a share of 1RM
pub fn sets_reps_for_intensity(percent: f64) -> (u32, RepRange) {
    if percent >= 90.0 {
        (5, RepRange::new(1, 3))
    } else if percent >= 80.0 {
        (4, RepRange::new(4, 6))
    } else if percent >= 70.0 {
        (4, RepRange::new(6, 8))
    } else {
        (3, RepRange::new(8, 12))
    }
}

/// Rest between sets; heavier work rests longer
pub fn rest_for_intensity(percent: f64) -> u32 {
    match percent {
        p if p >= 90.0 => 300,
        p if p >= 85.0 => 240,
        p if p >= 80.0 => 180,
        p if p >= 70.0 => 120,
        _ => 90,
    }
}

/// Target RPE for a share of 1RM
pub fn rpe_for_intensity(percent: f64) -> f64 {
    match percent {
        p if p >= 95.0 => 9.5,
        p if p >= 90.0 => 9.0,
        p if p >= 85.0 => 8.5,
        p if p >= 80.0 => 8.0,
        p if p >= 75.0 => 7.5,
        p if p >= 70.0 => 7.0,
        _ => 6.5,
    }
}

// ============================================================================
// Per line prescription
// ============================================================================

/// How an assembler uses an exercise line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LineRole {
    /// Single-joint work: fewer sets, more reps
    pub isolation: bool,
    /// Secondary day of the week at [`LIGHT_DAY_FACTOR`]
    pub light_day: bool,
}

impl LineRole {
    pub const MAIN: LineRole = LineRole {
        isolation: false,
        light_day: false,
    };
    pub const LIGHT: LineRole = LineRole {
        isolation: false,
        light_day: true,
    };
    pub const ISOLATION: LineRole = LineRole {
        isolation: true,
        light_day: false,
    };
}

/// Compute one exercise's prescription for one week
///
/// `max_kg` of `None` (or a non-positive max) leaves the weight empty while
/// the intensity percentage is still prescribed.
pub fn prescribe(
    exercise_id: &str,
    max_kg: Option<f64>,
    meso: &Mesocycle,
    micro: &Microcycle,
    role: LineRole,
    increment: f64,
) -> ProgressionEntry {
    let day_factor = if role.light_day && !micro.is_deload {
        LIGHT_DAY_FACTOR
    } else {
        1.0
    };
    // Only the displayed percent is rounded; weights use the raw product
    let intensity = round2(meso.intensity_percent * micro.intensity_modifier * day_factor);

    let weight_kg = max_kg.filter(|m| m.is_finite() && *m > 0.0).map(|m| {
        let raw = m * meso.intensity_percent / 100.0 * micro.intensity_modifier * day_factor;
        round_to_increment(raw, increment)
    });

    let (sets, reps, rest_seconds, rpe) = if micro.is_deload {
        (DELOAD_SETS, DELOAD_REPS, DELOAD_REST_SECONDS, DELOAD_RPE)
    } else {
        let (base_sets, base_reps) = sets_reps_for_intensity(intensity);
        let scale = meso.volume_percent / 100.0 * micro.volume_modifier;
        let mut sets = ((base_sets as f64 * scale).round() as u32).max(MIN_WORKING_SETS);
        let mut reps = base_reps;
        if role.isolation {
            sets = sets.saturating_sub(1).max(MIN_WORKING_SETS);
            reps = reps.shifted(ISOLATION_EXTRA_REPS);
        }
        (
            sets,
            reps,
            rest_for_intensity(intensity),
            rpe_for_intensity(intensity),
        )
    };

    ProgressionEntry {
        exercise_id: exercise_id.to_string(),
        week: micro.week,
        sets,
        reps,
        weight_kg,
        intensity_percent: intensity,
        rest_seconds,
        rpe,
        is_deload: micro.is_deload,
    }
}

/// Prescriptions for one exercise across every week of the plan
pub fn progression_for(
    plan: &Macrocycle,
    exercise_id: &str,
    max_kg: Option<f64>,
    role: LineRole,
    increment: f64,
) -> Vec<ProgressionEntry> {
    plan.mesocycles
        .iter()
        .flat_map(|meso| {
            meso.microcycles
                .iter()
                .map(move |micro| prescribe(exercise_id, max_kg, meso, micro, role, increment))
        })
        .collect()
}

impl ProgressionEntry {
    /// Nominal reps times sets times weight; zero when no weight is known
    pub fn tonnage(&self) -> f64 {
        self.weight_kg
            .map(|w| w * (self.sets * self.reps.nominal()) as f64)
            .unwrap_or(0.0)
    }
}

/// Progression entries indexed by exercise, for tracked lifts
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ProgressionTable {
    pub entries: BTreeMap<String, Vec<ProgressionEntry>>,
}

impl ProgressionTable {
    /// Build entries for every exercise that has a max on file
    pub fn build(plan: &Macrocycle, maxes: &MaxTable, increment: f64) -> Self {
        let entries = maxes
            .iter()
            .map(|(exercise, max)| {
                (
                    exercise.to_string(),
                    progression_for(plan, exercise, Some(max), LineRole::MAIN, increment),
                )
            })
            .collect();
        Self { entries }
    }

    pub fn for_exercise(&self, exercise_id: &str) -> &[ProgressionEntry] {
        self.entries
            .get(exercise_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn for_week(&self, week: u32) -> Vec<&ProgressionEntry> {
        self.entries
            .values()
            .flat_map(|v| v.iter().filter(move |e| e.week == week))
            .collect()
    }

    pub fn weekly_tonnage(&self, week: u32) -> f64 {
        round2(self.for_week(week).iter().map(|e| e.tonnage()).sum())
    }
}

// ============================================================================
// INOL
// ============================================================================

/// Qualitative reading of an INOL score
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InolRating {
    TooLow,
    Optimal,
    High,
    TooHigh,
}

/// INOL of a single set: reps / (100 - intensity%)
///
/// Intensities at or above 100% are treated as 99% to keep the score finite.
pub fn inol(reps: u32, intensity_percent: f64) -> f64 {
    let gap = (100.0 - intensity_percent).max(1.0);
    reps as f64 / gap
}

/// INOL summed over `(sets, reps, intensity%)` groups of one workout
pub fn workout_inol(groups: &[(u32, u32, f64)]) -> f64 {
    round2(
        groups
            .iter()
            .map(|(sets, reps, pct)| *sets as f64 * inol(*reps, *pct))
            .sum(),
    )
}

/// Per-lift, per-workout rating bands
pub fn rate_inol(score: f64) -> InolRating {
    if score < 0.4 {
        InolRating::TooLow
    } else if score <= 1.0 {
        InolRating::Optimal
    } else if score <= 2.0 {
        InolRating::High
    } else {
        InolRating::TooHigh
    }
}

// ============================================================================
// Conditioning
// ============================================================================

/// Interval block for conditioning work
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConditioningPrescription {
    pub rounds: u32,
    pub work_seconds: u32,
    pub rest_seconds: u32,
}

impl ConditioningPrescription {
    pub fn total_seconds(&self) -> u32 {
        self.rounds * (self.work_seconds + self.rest_seconds)
    }

    pub fn describe(&self) -> String {
        format!(
            "{} rounds: {}s work / {}s rest",
            self.rounds, self.work_seconds, self.rest_seconds
        )
    }
}

const MAX_CONDITIONING_ROUNDS: u32 = 15;

/// Intervals by tier, one extra round every three weeks, halved on deloads
pub fn conditioning(level: ExperienceLevel, week: u32, is_deload: bool) -> ConditioningPrescription {
    let (work_seconds, rest_seconds, base_rounds) = match level {
        ExperienceLevel::Beginner => (20, 40, 6),
        ExperienceLevel::Intermediate => (30, 30, 8),
        ExperienceLevel::Advanced => (40, 20, 10),
    };
    let mut rounds = (base_rounds + week.saturating_sub(1) / 3).min(MAX_CONDITIONING_ROUNDS);
    if is_deload {
        rounds = (rounds / 2).max(1);
    }
    ConditioningPrescription {
        rounds,
        work_seconds,
        rest_seconds,
    }
}
