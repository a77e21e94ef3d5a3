//! Core domain types for the periodization engine.
//!
//! This module defines the fundamental types used throughout the system:
//! - Athlete profile and its tagged enums (goal, tier, equipment)
//! - Exercise taxonomy and the catalog container
//! - Periodization skeleton (macro/meso/microcycles)
//! - Progression entries and the generated program tree

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

/// Lowercases a tag and folds `-` and spaces into `_`.
pub(crate) fn normalize_tag(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == ' ' { '_' } else { c })
        .collect()
}

// ============================================================================
// Athlete Types
// ============================================================================

/// Training goal driving both the phase template and the assembler
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    Strength,
    Hypertrophy,
    FatLoss,
    Competition,
    Hybrid,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::Strength => "strength",
            Goal::Hypertrophy => "hypertrophy",
            Goal::FatLoss => "fat_loss",
            Goal::Competition => "competition",
            Goal::Hybrid => "hybrid",
        }
    }
}

impl FromStr for Goal {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_tag(s).as_str() {
            "strength" => Ok(Goal::Strength),
            "hypertrophy" => Ok(Goal::Hypertrophy),
            "fat_loss" | "fatloss" | "weight_loss" => Ok(Goal::FatLoss),
            "competition" | "powerlifting" => Ok(Goal::Competition),
            "hybrid" | "conditioning" => Ok(Goal::Hybrid),
            other => Err(Error::invalid(format!(
                "unknown goal '{other}' (expected strength, hypertrophy, fat_loss, competition, hybrid)"
            ))),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Experience tier of the athlete
#[derive(
    Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl FromStr for ExperienceLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_tag(s).as_str() {
            "beginner" | "novice" => Ok(ExperienceLevel::Beginner),
            "intermediate" => Ok(ExperienceLevel::Intermediate),
            "advanced" | "elite" => Ok(ExperienceLevel::Advanced),
            other => Err(Error::invalid(format!(
                "unknown experience level '{other}' (expected beginner, intermediate, advanced)"
            ))),
        }
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unspecified,
}

/// Equipment an exercise may require
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Equipment {
    Barbell,
    Dumbbell,
    Kettlebell,
    Machine,
    Cable,
    Bench,
    Rack,
    PullupBar,
    Bands,
    Rower,
    Bike,
    Sled,
}

impl Equipment {
    pub const ALL: [Equipment; 12] = [
        Equipment::Barbell,
        Equipment::Dumbbell,
        Equipment::Kettlebell,
        Equipment::Machine,
        Equipment::Cable,
        Equipment::Bench,
        Equipment::Rack,
        Equipment::PullupBar,
        Equipment::Bands,
        Equipment::Rower,
        Equipment::Bike,
        Equipment::Sled,
    ];

    /// The "full gym" assumption used when the declared equipment is too thin
    pub fn full_gym() -> BTreeSet<Equipment> {
        Self::ALL.iter().copied().collect()
    }

    pub fn is_free_weight(&self) -> bool {
        matches!(
            self,
            Equipment::Barbell | Equipment::Dumbbell | Equipment::Kettlebell
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Equipment::Barbell => "barbell",
            Equipment::Dumbbell => "dumbbell",
            Equipment::Kettlebell => "kettlebell",
            Equipment::Machine => "machine",
            Equipment::Cable => "cable",
            Equipment::Bench => "bench",
            Equipment::Rack => "rack",
            Equipment::PullupBar => "pullup_bar",
            Equipment::Bands => "bands",
            Equipment::Rower => "rower",
            Equipment::Bike => "bike",
            Equipment::Sled => "sled",
        }
    }
}

impl FromStr for Equipment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let tag = normalize_tag(s);
        Equipment::ALL
            .iter()
            .copied()
            .find(|e| e.as_str() == tag)
            .or(match tag.as_str() {
                "dumbbells" => Some(Equipment::Dumbbell),
                "kettlebells" => Some(Equipment::Kettlebell),
                "squat_rack" | "power_rack" => Some(Equipment::Rack),
                "pull_up_bar" | "pullup" => Some(Equipment::PullupBar),
                "machines" => Some(Equipment::Machine),
                _ => None,
            })
            .ok_or_else(|| Error::invalid(format!("unknown equipment '{tag}'")))
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable input to a generation call
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct AthleteProfile {
    pub goal: Goal,
    #[serde(default)]
    pub experience: ExperienceLevel,
    #[serde(default)]
    pub equipment: BTreeSet<Equipment>,
    pub sessions_per_week: u32,
    pub total_weeks: u32,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub body_weight_kg: Option<f64>,
    /// Contraindication tags (e.g. "shoulder", "lower_back")
    #[serde(default)]
    pub restrictions: Vec<String>,
}

impl AthleteProfile {
    pub fn new(goal: Goal, total_weeks: u32, sessions_per_week: u32) -> Self {
        Self {
            goal,
            experience: ExperienceLevel::default(),
            equipment: Equipment::full_gym(),
            sessions_per_week,
            total_weeks,
            gender: Gender::default(),
            age: None,
            body_weight_kg: None,
            restrictions: Vec::new(),
        }
    }

    /// Reject inputs the engine cannot plan for
    pub fn validate(&self) -> Result<()> {
        if self.total_weeks == 0 || self.total_weeks > MAX_PLAN_WEEKS {
            return Err(Error::invalid(format!(
                "total weeks must be between 1 and {MAX_PLAN_WEEKS}, got {}",
                self.total_weeks
            )));
        }
        if !(1..=7).contains(&self.sessions_per_week) {
            return Err(Error::invalid(format!(
                "sessions per week must be between 1 and 7, got {}",
                self.sessions_per_week
            )));
        }
        Ok(())
    }
}

/// Longest plan the engine will build (one year)
pub const MAX_PLAN_WEEKS: u32 = 52;

// ============================================================================
// Exercise Taxonomy
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    RearDelts,
    Biceps,
    Triceps,
    Quads,
    Hamstrings,
    Glutes,
    Calves,
    Core,
    FullBody,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    Push,
    Pull,
    Squat,
    Hinge,
    Lunge,
    Carry,
    Core,
    Conditioning,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Mechanics {
    Compound,
    Isolation,
}

/// A catalog exercise (e.g. "Bench Press")
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub primary_muscle: MuscleGroup,
    #[serde(default)]
    pub secondary_muscles: Vec<MuscleGroup>,
    pub movement: MovementType,
    pub mechanics: Mechanics,
    /// Every listed item must be available; empty means bodyweight
    #[serde(default)]
    pub equipment: Vec<Equipment>,
    pub difficulty: ExperienceLevel,
    #[serde(default = "default_true")]
    pub bilateral: bool,
    #[serde(default)]
    pub contraindications: Vec<String>,
}

fn default_true() -> bool {
    true
}

impl Exercise {
    pub fn is_compound(&self) -> bool {
        self.mechanics == Mechanics::Compound
    }

    pub fn uses_free_weight(&self) -> bool {
        self.equipment.iter().any(Equipment::is_free_weight)
    }

    pub fn fits_equipment(&self, available: &BTreeSet<Equipment>) -> bool {
        self.equipment.iter().all(|e| available.contains(e))
    }
}

/// Read-only exercise reference data injected into the selector
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub exercises: BTreeMap<String, Exercise>,
}

// ============================================================================
// Periodization Types
// ============================================================================

/// Physiological focus of a mesocycle
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PhaseTag {
    Hypertrophy,
    Strength,
    Power,
    Peaking,
    Deload,
}

impl PhaseTag {
    /// Target RPE for a normal week of this phase
    pub fn default_rpe(&self) -> f64 {
        match self {
            PhaseTag::Hypertrophy => 7.5,
            PhaseTag::Strength => 8.5,
            PhaseTag::Power => 8.0,
            PhaseTag::Peaking => 9.5,
            PhaseTag::Deload => 5.0,
        }
    }
}

impl fmt::Display for PhaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PhaseTag::Hypertrophy => "hypertrophy",
            PhaseTag::Strength => "strength",
            PhaseTag::Power => "power",
            PhaseTag::Peaking => "peaking",
            PhaseTag::Deload => "deload",
        };
        f.write_str(s)
    }
}

/// One week inside a mesocycle
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Microcycle {
    pub week: u32,
    pub is_deload: bool,
    pub volume_modifier: f64,
    pub intensity_modifier: f64,
}

/// A multi-week phase with its targets
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Mesocycle {
    pub name: String,
    pub phase: PhaseTag,
    pub start_week: u32,
    pub end_week: u32,
    pub volume_percent: f64,
    pub intensity_percent: f64,
    pub rpe: f64,
    pub microcycles: Vec<Microcycle>,
}

impl Mesocycle {
    pub fn weeks(&self) -> u32 {
        self.end_week + 1 - self.start_week
    }

    pub fn contains(&self, week: u32) -> bool {
        (self.start_week..=self.end_week).contains(&week)
    }
}

/// The full time skeleton of a plan
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Macrocycle {
    pub goal: Goal,
    pub total_weeks: u32,
    pub sessions_per_week: u32,
    pub deload_interval: u32,
    pub mesocycles: Vec<Mesocycle>,
    /// Advisory notes (short phases, uneven deload cadence)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

// ============================================================================
// Progression Types
// ============================================================================

/// Inclusive repetition range, rendered as "8-10" or "5"
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepRange {
    pub min: u32,
    pub max: u32,
}

impl RepRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub const fn exact(reps: u32) -> Self {
        Self {
            min: reps,
            max: reps,
        }
    }

    /// Nominal reps used for volume statistics (lower middle of the range)
    pub fn nominal(&self) -> u32 {
        (self.min + self.max) / 2
    }

    pub fn shifted(&self, by: u32) -> Self {
        Self::new(self.min + by, self.max + by)
    }
}

impl fmt::Display for RepRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.min == self.max {
            write!(f, "{}", self.min)
        } else {
            write!(f, "{}-{}", self.min, self.max)
        }
    }
}

impl FromStr for RepRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .map_err(|_| Error::invalid(format!("invalid rep range '{s}'")))
        };
        match s.split_once('-') {
            Some((lo, hi)) => {
                let (lo, hi) = (parse(lo)?, parse(hi)?);
                if lo == 0 || lo > hi {
                    return Err(Error::invalid(format!("invalid rep range '{s}'")));
                }
                Ok(RepRange::new(lo, hi))
            }
            None => {
                let reps = parse(s)?;
                if reps == 0 {
                    return Err(Error::invalid(format!("invalid rep range '{s}'")));
                }
                Ok(RepRange::exact(reps))
            }
        }
    }
}

/// Per exercise, per week load prescription derived from the skeleton
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgressionEntry {
    pub exercise_id: String,
    pub week: u32,
    pub sets: u32,
    pub reps: RepRange,
    /// None when the athlete has no recorded max for the exercise
    pub weight_kg: Option<f64>,
    pub intensity_percent: f64,
    pub rest_seconds: u32,
    pub rpe: f64,
    pub is_deload: bool,
}

// ============================================================================
// Generated Program Types
// ============================================================================

/// Named day split
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Split {
    FullBody,
    UpperLower,
    PushPullLegs,
}

impl FromStr for Split {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_tag(s).as_str() {
            "full_body" | "fullbody" => Ok(Split::FullBody),
            "upper_lower" => Ok(Split::UpperLower),
            "push_pull_legs" | "ppl" => Ok(Split::PushPullLegs),
            other => Err(Error::invalid(format!(
                "unknown split '{other}' (expected full_body, upper_lower, push_pull_legs)"
            ))),
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Split::FullBody => "full_body",
            Split::UpperLower => "upper_lower",
            Split::PushPullLegs => "push_pull_legs",
        };
        f.write_str(s)
    }
}

/// Kind of training day within a split
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DayType {
    FullBody,
    Upper,
    Lower,
    Push,
    Pull,
    Legs,
    Squat,
    Bench,
    Deadlift,
    Press,
    Intervals,
}

impl DayType {
    pub fn label(&self) -> &'static str {
        match self {
            DayType::FullBody => "Full Body",
            DayType::Upper => "Upper",
            DayType::Lower => "Lower",
            DayType::Push => "Push",
            DayType::Pull => "Pull",
            DayType::Legs => "Legs",
            DayType::Squat => "Squat",
            DayType::Bench => "Bench",
            DayType::Deadlift => "Deadlift",
            DayType::Press => "Overhead Press",
            DayType::Intervals => "Intervals",
        }
    }
}

/// Role of an exercise line inside a day
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Main,
    Accessory,
    Conditioning,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeneratedExercise {
    pub order: u32,
    pub exercise_id: String,
    pub name: String,
    pub kind: BlockKind,
    pub sets: u32,
    pub reps: RepRange,
    /// 0.0 when no max is on file; `percent_of_max` is still set
    pub weight_kg: f64,
    pub percent_of_max: f64,
    pub rest_seconds: u32,
    pub rpe: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl GeneratedExercise {
    pub fn has_absolute_load(&self) -> bool {
        self.weight_kg > 0.0
    }

    /// "100 kg" when a max is known, otherwise "72% of 1RM"
    pub fn load_label(&self) -> String {
        match self.kind {
            BlockKind::Conditioning => "conditioning".to_string(),
            _ if self.has_absolute_load() => format!("{:.1} kg", self.weight_kg),
            _ => format!("{:.0}% of 1RM", self.percent_of_max),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeneratedDay {
    pub day: u32,
    pub name: String,
    pub day_type: DayType,
    pub exercises: Vec<GeneratedExercise>,
    pub estimated_minutes: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeneratedWeek {
    pub week: u32,
    pub phase_name: String,
    pub phase: PhaseTag,
    pub is_deload: bool,
    pub intensity_modifier: f64,
    pub volume_modifier: f64,
    pub days: Vec<GeneratedDay>,
}

/// weeks -> days -> exercises
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeneratedProgram {
    pub goal: Goal,
    pub experience: ExperienceLevel,
    pub split_name: String,
    pub total_weeks: u32,
    pub days_per_week: u32,
    pub mesocycles: Vec<Mesocycle>,
    pub weeks: Vec<GeneratedWeek>,
    /// Data gaps and fallbacks met while assembling
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl GeneratedProgram {
    pub fn week(&self, week: u32) -> Option<&GeneratedWeek> {
        self.weeks.iter().find(|w| w.week == week)
    }

    pub fn exercises(&self) -> impl Iterator<Item = (&GeneratedWeek, &GeneratedDay, &GeneratedExercise)> {
        self.weeks.iter().flat_map(|w| {
            w.days
                .iter()
                .flat_map(move |d| d.exercises.iter().map(move |e| (w, d, e)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_parsing_rejects_unknown() {
        assert_eq!("Fat-Loss".parse::<Goal>().unwrap(), Goal::FatLoss);
        assert_eq!("strength".parse::<Goal>().unwrap(), Goal::Strength);
        let err = "bulking".parse::<Goal>().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_equipment_aliases() {
        assert_eq!("Dumbbells".parse::<Equipment>().unwrap(), Equipment::Dumbbell);
        assert_eq!("pull-up bar".parse::<Equipment>().unwrap(), Equipment::PullupBar);
        assert!("trampoline".parse::<Equipment>().is_err());
    }

    #[test]
    fn test_rep_range_display_and_parse() {
        assert_eq!(RepRange::new(8, 10).to_string(), "8-10");
        assert_eq!(RepRange::exact(5).to_string(), "5");
        assert_eq!("8-12".parse::<RepRange>().unwrap(), RepRange::new(8, 12));
        assert!("12-8".parse::<RepRange>().is_err());
        assert!("0".parse::<RepRange>().is_err());
        assert_eq!(RepRange::new(8, 12).nominal(), 10);
    }

    #[test]
    fn test_profile_validation() {
        assert!(AthleteProfile::new(Goal::Strength, 12, 4).validate().is_ok());
        assert!(AthleteProfile::new(Goal::Strength, 0, 4).validate().is_err());
        assert!(AthleteProfile::new(Goal::Strength, 12, 0).validate().is_err());
        assert!(AthleteProfile::new(Goal::Strength, 12, 8).validate().is_err());
        assert!(AthleteProfile::new(Goal::Strength, 53, 3).validate().is_err());
    }

    #[test]
    fn test_load_label() {
        let mut ex = GeneratedExercise {
            order: 1,
            exercise_id: "bench_press".into(),
            name: "Bench Press".into(),
            kind: BlockKind::Main,
            sets: 4,
            reps: RepRange::new(4, 6),
            weight_kg: 0.0,
            percent_of_max: 82.0,
            rest_seconds: 180,
            rpe: 8.0,
            notes: None,
        };
        assert_eq!(ex.load_label(), "82% of 1RM");
        ex.weight_kg = 82.5;
        assert_eq!(ex.load_label(), "82.5 kg");
    }
}
