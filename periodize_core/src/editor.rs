//! Hand edits on a resolved methodology program.
//!
//! Every operation works on the sets in place, recomputes weights from the
//! line's max where a percentage changed, and then refreshes the program
//! statistics with [`PlProgram::recalculate`].

use crate::methodology::{PlExercise, PlProgram, PlSet, PlWorkout};
use crate::rounding::round_to_increment;
use crate::template::LineKind;
use crate::{Error, Result};

/// Largest factor accepted by [`scale_intensity`]
pub const MAX_INTENSITY_SCALE: f64 = 1.5;

/// Fields of a set to overwrite; None keeps the current value
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SetChange {
    pub percent: Option<f64>,
    pub reps: Option<u32>,
    pub sets: Option<u32>,
}

fn workout_mut(program: &mut PlProgram, week: u32, day: u32) -> Result<&mut PlWorkout> {
    let wk = program
        .weeks
        .iter_mut()
        .find(|w| w.week == week)
        .ok_or_else(|| Error::invalid(format!("program has no week {week}")))?;
    wk.workouts
        .iter_mut()
        .find(|w| w.day == day)
        .ok_or_else(|| Error::invalid(format!("week {week} has no day {day}")))
}

fn set_weight(one_rm: f64, percent: f64, increment: f64) -> f64 {
    if one_rm <= 0.0 {
        return 0.0;
    }
    round_to_increment(one_rm * percent / 100.0, increment)
}

/// Rename every line called `old` (case-insensitive) to `new`
///
/// With `new_one_rm` the weights are recomputed from each set's percentage.
/// Returns the number of lines changed.
pub fn replace_exercise(
    program: &mut PlProgram,
    old: &str,
    new: &str,
    new_one_rm: Option<f64>,
    increment: f64,
) -> Result<usize> {
    let new = new.trim();
    if new.is_empty() {
        return Err(Error::invalid("replacement exercise name must not be empty"));
    }
    if let Some(max) = new_one_rm {
        if !max.is_finite() || max <= 0.0 {
            return Err(Error::invalid(format!("max must be positive, got {max}")));
        }
    }

    let mut changed = 0;
    for week in &mut program.weeks {
        for workout in &mut week.workouts {
            for ex in workout
                .exercises
                .iter_mut()
                .filter(|e| e.name.eq_ignore_ascii_case(old.trim()))
            {
                ex.name = new.to_string();
                if let Some(max) = new_one_rm {
                    ex.one_rm_kg = max;
                    for set in &mut ex.sets {
                        set.weight_kg = set_weight(max, set.percent, increment);
                    }
                }
                changed += 1;
            }
        }
    }

    if changed == 0 {
        return Err(Error::invalid(format!("no exercise named '{old}' in the program")));
    }
    program.recalculate();
    tracing::info!(old, new, lines = changed, "Replaced exercise");
    Ok(changed)
}

/// Overwrite one set group of one exercise line
pub fn modify_set(
    program: &mut PlProgram,
    week: u32,
    day: u32,
    exercise: usize,
    set: usize,
    change: SetChange,
    increment: f64,
) -> Result<()> {
    if change.reps == Some(0) || change.sets == Some(0) {
        return Err(Error::invalid("reps and sets must be at least 1"));
    }
    if let Some(pct) = change.percent {
        if !pct.is_finite() || pct <= 0.0 {
            return Err(Error::invalid(format!("percent must be positive, got {pct}")));
        }
    }

    let workout = workout_mut(program, week, day)?;
    let ex = workout
        .exercises
        .get_mut(exercise)
        .ok_or_else(|| Error::invalid(format!("week {week} day {day} has no exercise {exercise}")))?;
    if set >= ex.sets.len() {
        return Err(Error::invalid(format!("{} has no set {set}", ex.name)));
    }
    let one_rm = ex.one_rm_kg;
    let target = &mut ex.sets[set];

    if let Some(pct) = change.percent {
        target.percent = pct;
        target.weight_kg = set_weight(one_rm, pct, increment);
    }
    if let Some(reps) = change.reps {
        target.reps = reps;
    }
    if let Some(sets) = change.sets {
        target.sets = sets;
    }

    program.recalculate();
    Ok(())
}

/// Append a new line to a workout
///
/// Weights are computed from `one_rm_kg` and each set's percentage.
#[allow(clippy::too_many_arguments)]
pub fn add_exercise(
    program: &mut PlProgram,
    week: u32,
    day: u32,
    name: &str,
    kind: LineKind,
    one_rm_kg: f64,
    sets: Vec<PlSet>,
    increment: f64,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid("exercise name must not be empty"));
    }
    if sets.is_empty() {
        return Err(Error::invalid(format!("{name} needs at least one set")));
    }
    if sets.iter().any(|s| s.reps == 0 || s.sets == 0) {
        return Err(Error::invalid("reps and sets must be at least 1"));
    }
    if !one_rm_kg.is_finite() || one_rm_kg < 0.0 {
        return Err(Error::invalid(format!("max must not be negative, got {one_rm_kg}")));
    }

    let sets = sets
        .into_iter()
        .map(|s| PlSet {
            weight_kg: set_weight(one_rm_kg, s.percent, increment),
            ..s
        })
        .collect();
    let workout = workout_mut(program, week, day)?;
    workout.exercises.push(PlExercise {
        name: name.trim().to_string(),
        kind,
        one_rm_kg,
        sets,
        total_reps: 0,
        tonnage_kg: 0.0,
        avg_percent: 0.0,
    });

    program.recalculate();
    Ok(())
}

/// Remove a line from a workout and return it
pub fn remove_exercise(program: &mut PlProgram, week: u32, day: u32, exercise: usize) -> Result<PlExercise> {
    let workout = workout_mut(program, week, day)?;
    if exercise >= workout.exercises.len() {
        return Err(Error::invalid(format!(
            "week {week} day {day} has no exercise {exercise}"
        )));
    }
    let removed = workout.exercises.remove(exercise);
    program.recalculate();
    Ok(removed)
}

/// Multiply every percentage by `factor` and recompute the weights
pub fn scale_intensity(program: &mut PlProgram, factor: f64, increment: f64) -> Result<()> {
    if !factor.is_finite() || factor <= 0.0 || factor > MAX_INTENSITY_SCALE {
        return Err(Error::invalid(format!(
            "intensity factor must be in (0, {MAX_INTENSITY_SCALE}], got {factor}"
        )));
    }

    for week in &mut program.weeks {
        for workout in &mut week.workouts {
            for ex in &mut workout.exercises {
                let one_rm = ex.one_rm_kg;
                for set in &mut ex.sets {
                    set.percent = (set.percent * factor * 100.0).round() / 100.0;
                    set.weight_kg = set_weight(one_rm, set.percent, increment);
                }
            }
        }
    }

    program.recalculate();
    tracing::info!(factor, "Scaled program intensity");
    Ok(())
}
