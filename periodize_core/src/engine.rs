//! Program generation engine.
//!
//! Ties the pieces together for one request:
//! - the periodization planner builds the week skeleton
//! - the goal's assembler lays out days and picks exercises
//! - the progression calculator fills in sets, reps and loads
//!
//! Long plans can be produced in batches. [`start_generation`] and
//! [`continue_generation`] work on a [`GenerationState`] snapshot and return
//! an updated copy; weeks already generated are never revised.

use crate::assembler::{assemble_weeks, push_unique, ProgramAssembler, ProgramRequest};
use crate::balance::MovementBalance;
use crate::fat_loss::FatLossAssembler;
use crate::hybrid::HybridAssembler;
use crate::hypertrophy::HypertrophyAssembler;
use crate::maxes::MaxTable;
use crate::periodization;
use crate::selector::Selector;
use crate::state::{GenerationState, GenerationStatus};
use crate::strength::StrengthAssembler;
use crate::validation::{self, Validation};
use crate::{Catalog, GeneratedProgram, Goal, Result};
use chrono::Utc;
use std::ops::RangeInclusive;

/// A full program together with its validation report
#[derive(Clone, Debug)]
pub struct GenerationOutcome {
    pub program: GeneratedProgram,
    pub validation: Validation,
    pub balance: MovementBalance,
}

/// Assembler strategy for a goal
pub fn assembler_for(goal: Goal) -> Box<dyn ProgramAssembler> {
    match goal {
        Goal::Strength | Goal::Competition => Box::new(StrengthAssembler),
        Goal::Hypertrophy => Box::new(HypertrophyAssembler),
        Goal::FatLoss => Box::new(FatLossAssembler),
        Goal::Hybrid => Box::new(HybridAssembler),
    }
}

/// Generate every week of the plan in one call
pub fn generate(catalog: &Catalog, request: &ProgramRequest) -> Result<GenerationOutcome> {
    let program = generate_weeks(catalog, request, 1..=request.profile.total_weeks)?;
    let balance = MovementBalance::of_program(catalog, &program);
    let validation = validation::validate_with_balance(&program, &balance);
    Ok(GenerationOutcome {
        program,
        validation,
        balance,
    })
}

/// Generate only the given weeks of the plan
///
/// The skeleton and day layout are rebuilt from the request, so two calls
/// with adjacent ranges produce the same program as one call over both.
pub fn generate_weeks(
    catalog: &Catalog,
    request: &ProgramRequest,
    weeks: RangeInclusive<u32>,
) -> Result<GeneratedProgram> {
    let profile = &request.profile;
    profile.validate()?;

    let skeleton = periodization::plan(
        profile.total_weeks,
        profile.sessions_per_week,
        profile.goal,
        request.settings.deload_interval,
    )?;

    let selector = Selector::new(catalog);
    let assembler = assembler_for(profile.goal);
    let mut warnings = skeleton.warnings.clone();
    let blueprint = assembler.blueprint(request, &selector, &mut warnings);
    let generated = assemble_weeks(&blueprint, &skeleton, request, weeks.clone(), &mut warnings)?;

    tracing::info!(
        goal = %profile.goal,
        assembler = assembler.name(),
        split = %blueprint.split_name,
        from = weeks.start(),
        to = weeks.end(),
        warnings = warnings.len(),
        "Generated program weeks"
    );

    Ok(GeneratedProgram {
        goal: profile.goal,
        experience: profile.experience,
        split_name: blueprint.split_name,
        total_weeks: profile.total_weeks,
        days_per_week: blueprint.days.len() as u32,
        mesocycles: skeleton.mesocycles,
        weeks: generated,
        warnings,
    })
}

// ============================================================================
// Batch generation
// ============================================================================

/// Create a state for `client` and generate its first batch
pub fn start_generation(
    catalog: &Catalog,
    request: ProgramRequest,
    client: &str,
    batch_size: u32,
) -> Result<GenerationState> {
    let state = GenerationState::new(client, request, batch_size)?;
    continue_generation(catalog, &state, None)
}

/// Generate the next batch of weeks
///
/// `updated_maxes` are merged into the running maxima and only affect the
/// weeks produced from now on. On failure the error is returned and the
/// input state is untouched, so the caller can retry or record the failure
/// with [`GenerationState::mark_failed`].
pub fn continue_generation(
    catalog: &Catalog,
    state: &GenerationState,
    updated_maxes: Option<&MaxTable>,
) -> Result<GenerationState> {
    let mut next = state.clone();
    if let Some(maxes) = updated_maxes {
        next.running_maxes.merge(maxes);
    }

    let Some(range) = next.next_batch_range() else {
        next.status = GenerationStatus::Completed;
        next.updated_at = Utc::now();
        return Ok(next);
    };

    let mut request = next.request.clone();
    request.maxes = next.running_maxes.clone();
    let batch = generate_weeks(catalog, &request, range.clone())?;

    match next.program.as_mut() {
        Some(program) => {
            program.weeks.extend(batch.weeks);
            for warning in batch.warnings {
                push_unique(&mut program.warnings, warning);
            }
        }
        None => next.program = Some(batch),
    }

    next.last_completed_week = *range.end();
    next.status = if next.is_complete() {
        GenerationStatus::Completed
    } else {
        GenerationStatus::InProgress
    };
    next.last_error = None;
    next.updated_at = Utc::now();

    tracing::info!(
        client = %next.client,
        from = range.start(),
        to = range.end(),
        total = next.total_weeks,
        "Generated batch"
    );

    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::{AthleteProfile, BlockKind, RepRange};

    fn strength_request() -> ProgramRequest {
        crate::logging::init_test();
        ProgramRequest::new(AthleteProfile::new(Goal::Strength, 12, 4))
            .with_maxes(MaxTable::new().with("Bench Press", 100.0))
    }

    #[test]
    fn test_strength_deload_weeks() {
        let outcome = generate(get_default_catalog(), &strength_request()).unwrap();
        let program = &outcome.program;
        assert_eq!(program.weeks.len(), 12);

        let deloads: Vec<u32> = program
            .weeks
            .iter()
            .filter(|w| w.is_deload)
            .map(|w| w.week)
            .collect();
        assert_eq!(deloads, vec![4, 8, 12]);

        for week in program.weeks.iter().filter(|w| w.is_deload) {
            for ex in week.days.iter().flat_map(|d| d.exercises.iter()) {
                assert_eq!(ex.sets, 2, "{} week {}", ex.name, week.week);
                assert_eq!(ex.reps, RepRange::new(8, 10));
            }
        }

        let bench = program
            .exercises()
            .find(|(w, _, e)| w.week == 1 && e.exercise_id == "bench_press")
            .map(|(_, _, e)| e)
            .unwrap();
        assert!(bench.weight_kg > 0.0);
        assert_eq!(bench.weight_kg % 2.5, 0.0);
    }

    #[test]
    fn test_no_maxes_gives_percentages_only() {
        let request = ProgramRequest::new(AthleteProfile::new(Goal::Hypertrophy, 8, 3));
        let outcome = generate(get_default_catalog(), &request).unwrap();

        for (_, _, ex) in outcome.program.exercises() {
            assert_eq!(ex.weight_kg, 0.0);
            if ex.kind != BlockKind::Conditioning {
                assert!(ex.percent_of_max > 0.0);
            }
        }
        assert!(!outcome.validation.warnings.is_empty());
        assert!(outcome.validation.is_valid);
    }

    #[test]
    fn test_every_goal_generates() {
        for goal in [
            Goal::Strength,
            Goal::Hypertrophy,
            Goal::FatLoss,
            Goal::Hybrid,
            Goal::Competition,
        ] {
            let request = ProgramRequest::new(AthleteProfile::new(goal, 10, 4));
            let outcome = generate(get_default_catalog(), &request).unwrap();
            assert_eq!(outcome.program.weeks.len(), 10, "{goal}");
            assert!(outcome.validation.errors.is_empty(), "{goal}: {:?}", outcome.validation.errors);
            assert_eq!(
                outcome.balance,
                MovementBalance::of_program(get_default_catalog(), &outcome.program)
            );
            for rec in &outcome.balance.recommendations {
                assert!(outcome.validation.warnings.contains(&format!("movement balance: {rec}")));
            }
        }
    }

    #[test]
    fn test_invalid_profile_is_rejected() {
        let request = ProgramRequest::new(AthleteProfile::new(Goal::Strength, 0, 4));
        assert!(generate(get_default_catalog(), &request).is_err());
    }

    #[test]
    fn test_batches_match_single_call() {
        let catalog = get_default_catalog();
        let request = strength_request();
        let whole = generate(catalog, &request).unwrap().program;

        let mut state = start_generation(catalog, request, "alice", 5).unwrap();
        assert_eq!(state.last_completed_week, 5);
        assert_eq!(state.status, GenerationStatus::InProgress);
        while !state.is_complete() {
            state = continue_generation(catalog, &state, None).unwrap();
        }
        assert_eq!(state.status, GenerationStatus::Completed);
        assert_eq!(state.program.unwrap().weeks, whole.weeks);
    }

    #[test]
    fn test_new_maxes_only_affect_later_weeks() {
        let catalog = get_default_catalog();
        let state = start_generation(catalog, strength_request(), "bob", 4).unwrap();
        let first = state.program.clone().unwrap();

        let heavier = MaxTable::new().with("bench_press", 120.0);
        let next = continue_generation(catalog, &state, Some(&heavier)).unwrap();
        let program = next.program.unwrap();

        // Frozen weeks are unchanged
        assert_eq!(&program.weeks[..4], &first.weeks[..]);

        let week1 = program.week(1).unwrap().days[1].exercises[0].weight_kg;
        let week5 = program.week(5).unwrap().days[1].exercises[0].weight_kg;
        assert!(week5 > week1);
        assert_eq!(next.running_maxes.get("bench_press"), Some(120.0));
        // The original request stays as submitted
        assert_eq!(next.request.maxes.get("bench_press"), Some(100.0));
    }

    #[test]
    fn test_continue_after_completion_is_a_noop() {
        let catalog = get_default_catalog();
        let state = start_generation(catalog, strength_request(), "carol", 12).unwrap();
        assert!(state.is_complete());
        let again = continue_generation(catalog, &state, None).unwrap();
        assert_eq!(again.program, state.program);
        assert_eq!(again.status, GenerationStatus::Completed);
    }
}
