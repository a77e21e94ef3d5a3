//! Program validation and descriptive statistics.
//!
//! Validation never changes a program. Errors mark output that is unusable
//! (no weeks, gaps, empty lines); warnings carry the data gaps and advisory
//! notes collected during generation plus a few plausibility checks.

use crate::balance::MovementBalance;
use crate::methodology::PlProgram;
use crate::template::LineKind;
use crate::rounding::round2;
use crate::{BlockKind, GeneratedProgram, GeneratedWeek};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Largest week-over-week volume increase accepted without a warning
pub const VOLUME_SPIKE_RATIO: f64 = 0.30;

/// Plausible weekly repetitions under load for a methodology program
pub const KPS_PER_WEEK_RANGE: (f64, f64) = (40.0, 150.0);

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Validation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl Validation {
    fn new(errors: Vec<String>, warnings: Vec<String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

// ============================================================================
// Generated programs
// ============================================================================

/// Sets x nominal reps of the lifting lines in a week
pub fn week_volume(week: &GeneratedWeek) -> u32 {
    week.days
        .iter()
        .flat_map(|d| d.exercises.iter())
        .filter(|e| e.kind != BlockKind::Conditioning)
        .map(|e| e.sets * e.reps.nominal())
        .sum()
}

pub fn validate_program(program: &GeneratedProgram) -> Validation {
    let mut errors = Vec::new();
    let mut warnings = program.warnings.clone();

    if program.weeks.is_empty() {
        errors.push("program has no weeks".to_string());
    }
    if let Some(first) = program.weeks.first() {
        if first.week != 1 {
            errors.push(format!("program starts at week {} instead of 1", first.week));
        }
    }
    for pair in program.weeks.windows(2) {
        if pair[1].week != pair[0].week + 1 {
            errors.push(format!(
                "week numbering jumps from {} to {}",
                pair[0].week, pair[1].week
            ));
        }
    }

    for week in &program.weeks {
        for day in &week.days {
            if day.exercises.is_empty() {
                errors.push(format!("week {} {} has no exercises", week.week, day.name));
            }
            for ex in day.exercises.iter().filter(|e| e.sets == 0) {
                errors.push(format!("week {} {}: {} has no sets", week.week, day.name, ex.name));
            }
        }
    }

    // Compare each loading week with the previous loading week
    let mut previous: Option<(u32, u32)> = None;
    for week in program.weeks.iter().filter(|w| !w.is_deload) {
        let volume = week_volume(week);
        if let Some((prev_week, prev_volume)) = previous {
            if prev_volume > 0 {
                let increase = volume as f64 / prev_volume as f64 - 1.0;
                if increase > VOLUME_SPIKE_RATIO {
                    warnings.push(format!(
                        "week {} volume is {:.0}% above week {}",
                        week.week,
                        increase * 100.0,
                        prev_week
                    ));
                }
            }
        }
        previous = Some((week.week, volume));
    }

    let validation = Validation::new(errors, warnings);
    tracing::debug!(
        errors = validation.errors.len(),
        warnings = validation.warnings.len(),
        "Validated program"
    );
    validation
}

/// [`validate_program`] plus the balance recommendations as warnings
pub fn validate_with_balance(program: &GeneratedProgram, balance: &MovementBalance) -> Validation {
    let mut validation = validate_program(program);
    validation.warnings.extend(
        balance
            .recommendations
            .iter()
            .map(|r| format!("movement balance: {r}")),
    );
    validation
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ProgramStats {
    pub total_weeks: u32,
    pub total_workouts: u32,
    pub total_sets: u32,
    /// Sets x nominal reps over lifting lines
    pub total_reps: u32,
    /// Only lines with an absolute load contribute
    pub tonnage_kg: f64,
    pub avg_sets_per_week: f64,
    pub avg_reps_per_week: f64,
    pub avg_tonnage_per_week: f64,
    pub avg_minutes_per_workout: f64,
    pub reps_by_exercise: BTreeMap<String, u32>,
}

impl ProgramStats {
    pub fn of(program: &GeneratedProgram) -> Self {
        let mut stats = ProgramStats {
            total_weeks: program.weeks.len() as u32,
            ..Default::default()
        };
        let mut minutes = 0u32;

        for week in &program.weeks {
            for day in &week.days {
                stats.total_workouts += 1;
                minutes += day.estimated_minutes;
                for ex in day.exercises.iter().filter(|e| e.kind != BlockKind::Conditioning) {
                    let reps = ex.sets * ex.reps.nominal();
                    stats.total_sets += ex.sets;
                    stats.total_reps += reps;
                    stats.tonnage_kg += ex.weight_kg * reps as f64;
                    *stats.reps_by_exercise.entry(ex.name.clone()).or_default() += reps;
                }
            }
        }

        stats.tonnage_kg = round2(stats.tonnage_kg);
        if stats.total_weeks > 0 {
            let weeks = stats.total_weeks as f64;
            stats.avg_sets_per_week = round2(stats.total_sets as f64 / weeks);
            stats.avg_reps_per_week = round2(stats.total_reps as f64 / weeks);
            stats.avg_tonnage_per_week = round2(stats.tonnage_kg / weeks);
        }
        if stats.total_workouts > 0 {
            stats.avg_minutes_per_workout = round2(minutes as f64 / stats.total_workouts as f64);
        }
        stats
    }
}

// ============================================================================
// Methodology programs
// ============================================================================

pub fn validate_pl_program(program: &PlProgram) -> Validation {
    let mut errors = Vec::new();
    let mut warnings = program.warnings.clone();
    let stats = PlStats::of(program);

    if program.weeks.is_empty() {
        errors.push("program has no weeks".to_string());
    }
    if !program
        .exercises()
        .any(|(_, _, ex)| ex.kind == LineKind::Competition)
    {
        errors.push("no competition lift in the program".to_string());
    }

    let (low, high) = KPS_PER_WEEK_RANGE;
    if stats.total_weeks > 0 {
        if stats.avg_reps_per_week < low {
            warnings.push(format!(
                "low volume: {:.0} lifts per week (expected {low:.0}-{high:.0})",
                stats.avg_reps_per_week
            ));
        } else if stats.avg_reps_per_week > high {
            warnings.push(format!(
                "high volume: {:.0} lifts per week, risk of overreaching",
                stats.avg_reps_per_week
            ));
        }
    }

    for (week, workout, ex) in program.exercises() {
        if ex.one_rm_kg <= 0.0 {
            continue;
        }
        if let Some(set) = ex.sets.iter().find(|s| s.weight_kg > ex.one_rm_kg) {
            warnings.push(format!(
                "week {} day {}: {} at {} kg exceeds the {} kg max",
                week.week, workout.day, ex.name, set.weight_kg, ex.one_rm_kg
            ));
        }
    }

    Validation::new(errors, warnings)
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PlStats {
    pub total_weeks: u32,
    pub total_workouts: u32,
    pub total_sets: u32,
    /// Repetitions under load ("KPS")
    pub total_reps: u32,
    pub tonnage_kg: f64,
    pub avg_reps_per_week: f64,
    pub avg_tonnage_per_week: f64,
    pub reps_by_exercise: BTreeMap<String, u32>,
}

impl PlStats {
    pub fn of(program: &PlProgram) -> Self {
        let total_weeks = program.weeks.len() as u32;
        let total_workouts = program.weeks.iter().map(|w| w.workouts.len() as u32).sum();
        let total_sets = program
            .weeks
            .iter()
            .flat_map(|w| w.workouts.iter())
            .map(|w| w.set_count())
            .sum();

        let (avg_reps_per_week, avg_tonnage_per_week) = if total_weeks > 0 {
            (
                round2(program.total_reps as f64 / total_weeks as f64),
                round2(program.tonnage_kg / total_weeks as f64),
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            total_weeks,
            total_workouts,
            total_sets,
            total_reps: program.total_reps,
            tonnage_kg: program.tonnage_kg,
            avg_reps_per_week,
            avg_tonnage_per_week,
            reps_by_exercise: program.reps_by_exercise.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::engine::generate;
    use crate::methodology::{resolve, AthleteMaxes, ResolveOptions};
    use crate::template::get_builtin_templates;
    use crate::{AthleteProfile, Goal, ProgramRequest};

    fn program() -> GeneratedProgram {
        let request = ProgramRequest::new(AthleteProfile::new(Goal::Hypertrophy, 6, 3));
        generate(get_default_catalog(), &request).unwrap().program
    }

    #[test]
    fn test_generated_program_is_valid() {
        let v = validate_program(&program());
        assert!(v.is_valid, "{:?}", v.errors);
    }

    #[test]
    fn test_structural_errors() {
        let mut p = program();
        p.weeks.remove(2);
        p.weeks[0].days[0].exercises[0].sets = 0;
        let v = validate_program(&p);
        assert!(!v.is_valid);
        assert!(v.errors.iter().any(|e| e.contains("jumps from 2 to 4")));
        assert!(v.errors.iter().any(|e| e.contains("has no sets")));

        p.weeks.clear();
        assert!(validate_program(&p).errors.iter().any(|e| e.contains("no weeks")));
    }

    #[test]
    fn test_volume_spike_warning() {
        let mut p = program();
        let week2 = p.weeks.iter_mut().find(|w| w.week == 2).unwrap();
        assert!(!week2.is_deload);
        for ex in week2.days.iter_mut().flat_map(|d| d.exercises.iter_mut()) {
            ex.sets *= 2;
        }
        let v = validate_program(&p);
        assert!(v.warnings.iter().any(|w| w.starts_with("week 2 volume")), "{:?}", v.warnings);
        assert!(v.is_valid);
    }

    #[test]
    fn test_balance_recommendations_become_warnings() {
        let p = program();
        let balance = MovementBalance {
            recommendations: vec!["add core work".to_string()],
            ..MovementBalance::default()
        };
        let v = validate_with_balance(&p, &balance);
        assert!(v.is_valid);
        assert!(v.warnings.contains(&"movement balance: add core work".to_string()));
        assert_eq!(v.warnings.len(), validate_program(&p).warnings.len() + 1);
    }

    #[test]
    fn test_program_stats() {
        let p = program();
        let stats = ProgramStats::of(&p);
        assert_eq!(stats.total_weeks, 6);
        assert_eq!(stats.total_workouts, 18);
        assert!(stats.total_sets > 0);
        // No maxes on file, so no absolute tonnage
        assert_eq!(stats.tonnage_kg, 0.0);
        assert!(stats.avg_minutes_per_workout > 10.0);
    }

    #[test]
    fn test_pl_validation_and_stats() {
        let program = resolve(
            get_builtin_templates(),
            "Russian Cycle",
            AthleteMaxes::new(150.0, 100.0, 180.0),
            ResolveOptions::default(),
        )
        .unwrap();
        let v = validate_pl_program(&program);
        assert!(v.is_valid, "{:?}", v.errors);

        let stats = PlStats::of(&program);
        assert_eq!(stats.total_weeks, 6);
        assert_eq!(stats.total_workouts, 18);
        assert_eq!(stats.total_reps, program.total_reps);
        assert!((stats.avg_reps_per_week - program.total_reps as f64 / 6.0).abs() < 0.01);
    }

    #[test]
    fn test_pl_without_competition_lift() {
        let mut program = resolve(
            get_builtin_templates(),
            "Russian Cycle",
            AthleteMaxes::new(150.0, 100.0, 180.0),
            ResolveOptions::default(),
        )
        .unwrap();
        for week in &mut program.weeks {
            for workout in &mut week.workouts {
                workout.exercises.retain(|e| e.kind != LineKind::Competition);
            }
        }
        program.recalculate();
        let v = validate_pl_program(&program);
        assert!(!v.is_valid);
        assert!(v.errors.iter().any(|e| e.contains("no competition lift")));
        assert!(program.total_reps > 0);
    }
}
