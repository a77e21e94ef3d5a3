//! Shared machinery behind the per-goal program assemblers.
//!
//! An assembler only decides *which* exercises go on *which* day. It hands
//! back a [`Blueprint`] (the week-invariant day layout) and the functions
//! here expand that blueprint across the periodization skeleton, delegating
//! every set, rep and load to [`crate::progression`].
//!
//! Because the blueprint depends on the profile alone, rebuilding it for a
//! later batch yields the same exercises as the first batch.

use crate::config::GenerationSettings;
use crate::maxes::MaxTable;
use crate::progression::{self, LineRole};
use crate::selector::{SelectionCriteria, Selector, SlotPattern};
use crate::{
    AthleteProfile, BlockKind, DayType, Error, Exercise, GeneratedDay, GeneratedExercise,
    GeneratedWeek, Macrocycle, MovementType, RepRange, Result, Split,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::ops::RangeInclusive;

/// Everything a generation call needs besides the catalog
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgramRequest {
    pub profile: AthleteProfile,
    #[serde(default)]
    pub maxes: MaxTable,
    /// Overrides the goal's default split where the assembler supports it
    #[serde(default)]
    pub split: Option<Split>,
    #[serde(default = "default_true")]
    pub include_conditioning: bool,
    #[serde(default)]
    pub settings: GenerationSettings,
}

fn default_true() -> bool {
    true
}

impl ProgramRequest {
    pub fn new(profile: AthleteProfile) -> Self {
        Self {
            profile,
            maxes: MaxTable::default(),
            split: None,
            include_conditioning: true,
            settings: GenerationSettings::default(),
        }
    }

    pub fn with_maxes(mut self, maxes: MaxTable) -> Self {
        self.maxes = maxes;
        self
    }

    /// Selection criteria seeded from the athlete profile
    pub fn base_criteria(&self) -> SelectionCriteria {
        let mut criteria = SelectionCriteria::new(
            self.profile.equipment.clone(),
            self.profile.experience,
        );
        criteria.restrictions = self.profile.restrictions.clone();
        criteria
    }
}

// ============================================================================
// Blueprint
// ============================================================================

/// How a conditioning line is dosed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditioningStyle {
    /// Short metabolic finisher; dropped on deload weeks
    Finisher,
    /// Time-capped circuit station; halved on deload weeks
    Circuit,
    /// Dedicated interval work; halved on deload weeks
    Intervals,
}

/// One exercise slot of a day, fixed for the whole plan
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedLine {
    pub exercise_id: String,
    pub name: String,
    pub kind: BlockKind,
    pub role: LineRole,
    pub conditioning: Option<ConditioningStyle>,
}

impl PlannedLine {
    pub fn main(exercise: &Exercise) -> Self {
        Self::lift(exercise, BlockKind::Main, LineRole::MAIN)
    }

    pub fn light(exercise: &Exercise) -> Self {
        Self::lift(exercise, BlockKind::Main, LineRole::LIGHT)
    }

    /// Accessory line; single-joint work gets the isolation dosing
    pub fn accessory(exercise: &Exercise) -> Self {
        let role = if exercise.is_compound() {
            LineRole::MAIN
        } else {
            LineRole::ISOLATION
        };
        Self::lift(exercise, BlockKind::Accessory, role)
    }

    pub fn conditioning(exercise: &Exercise, style: ConditioningStyle) -> Self {
        Self {
            exercise_id: exercise.id.clone(),
            name: exercise.name.clone(),
            kind: BlockKind::Conditioning,
            role: LineRole::default(),
            conditioning: Some(style),
        }
    }

    fn lift(exercise: &Exercise, kind: BlockKind, role: LineRole) -> Self {
        Self {
            exercise_id: exercise.id.clone(),
            name: exercise.name.clone(),
            kind,
            role,
            conditioning: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DayPlan {
    pub day_type: DayType,
    pub name: String,
    pub lines: Vec<PlannedLine>,
}

/// Week-invariant day layout produced by an assembler
#[derive(Clone, Debug, PartialEq)]
pub struct Blueprint {
    pub split_name: String,
    pub days: Vec<DayPlan>,
}

/// Per-goal strategy: choose the split and the exercises for each day
pub trait ProgramAssembler {
    fn name(&self) -> &'static str;

    fn blueprint(
        &self,
        request: &ProgramRequest,
        selector: &Selector<'_>,
        warnings: &mut Vec<String>,
    ) -> Blueprint;
}

// ============================================================================
// Shared day builders
// ============================================================================

/// Day types of a named split for a number of sessions
pub fn split_days(split: Split, sessions: u32) -> Vec<DayType> {
    let cycle: &[DayType] = match split {
        Split::FullBody => &[DayType::FullBody],
        Split::UpperLower => &[DayType::Upper, DayType::Lower],
        Split::PushPullLegs => &[DayType::Push, DayType::Pull, DayType::Legs],
    };
    (0..sessions as usize)
        .map(|i| cycle[i % cycle.len()])
        .collect()
}

/// Name days "Upper A", "Upper B" when a type repeats within the week
pub fn day_names(days: &[DayType]) -> Vec<String> {
    let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
    for d in days {
        *counts.entry(d.label()).or_default() += 1;
    }
    let mut seen: BTreeMap<&'static str, usize> = BTreeMap::new();
    days.iter()
        .map(|d| {
            let label = d.label();
            if counts[label] > 1 {
                let n = seen.entry(label).or_default();
                let suffix = (b'A' + (*n % 26) as u8) as char;
                *n += 1;
                format!("{label} {suffix}")
            } else {
                label.to_string()
            }
        })
        .collect()
}

/// Fill each day from the selector's slot patterns
///
/// A repeated day type excludes the accessories of its previous occurrence,
/// which gives A/B variants while the first (main) pick stays the same.
pub fn selector_days(
    selector: &Selector<'_>,
    days: &[DayType],
    base: &SelectionCriteria,
    compound_bias: bool,
    warnings: &mut Vec<String>,
) -> Vec<DayPlan> {
    let names = day_names(days);
    let mut previous: HashMap<DayType, BTreeSet<String>> = HashMap::new();

    days.iter()
        .zip(names)
        .map(|(day_type, name)| {
            let mut criteria = base.clone();
            criteria.compound_bias = compound_bias;
            if let Some(prev) = previous.get(day_type) {
                criteria.exclude.extend(prev.iter().cloned());
            }

            let mut picks = selector.select_day(*day_type, &criteria, warnings);
            if picks.is_empty() {
                // Variation exhausted the catalog; fall back to the plain day
                let mut plain = base.clone();
                plain.compound_bias = compound_bias;
                picks = selector.select_day(*day_type, &plain, warnings);
            }

            let mut lines = Vec::with_capacity(picks.len());
            for (i, pick) in picks.iter().enumerate() {
                if i == 0 {
                    lines.push(PlannedLine::main(pick.exercise));
                } else {
                    lines.push(PlannedLine::accessory(pick.exercise));
                }
            }

            previous.insert(
                *day_type,
                picks.iter().skip(1).map(|p| p.exercise.id.clone()).collect(),
            );

            DayPlan {
                day_type: *day_type,
                name,
                lines,
            }
        })
        .collect()
}

/// Fill extra slots without repeating anything already on the day
pub fn accessories_for(
    selector: &Selector<'_>,
    slots: &[SlotPattern],
    base: &SelectionCriteria,
    used: &mut BTreeSet<String>,
    warnings: &mut Vec<String>,
) -> Vec<PlannedLine> {
    let base = selector.usable_equipment(base, warnings);
    slots
        .iter()
        .filter_map(|slot| {
            let mut criteria = base.clone().slot(slot);
            criteria.exclude.extend(used.iter().cloned());
            selector
                .select_with_fallback(&criteria, warnings)
                .map(|(ex, _)| {
                    used.insert(ex.id.clone());
                    PlannedLine::accessory(ex)
                })
        })
        .collect()
}

/// Pick conditioning movements, rotating through what the equipment allows
pub fn conditioning_picks<'a>(
    selector: &Selector<'a>,
    base: &SelectionCriteria,
    count: usize,
    rotation: &mut BTreeSet<String>,
    warnings: &mut Vec<String>,
) -> Vec<&'a Exercise> {
    let mut criteria = selector.usable_equipment(base, warnings);
    criteria.movement = Some(MovementType::Conditioning);
    criteria.primary_muscle = None;
    criteria.require_compound = false;

    let mut picks = Vec::with_capacity(count);
    for _ in 0..count {
        let mut c = criteria.clone();
        c.exclude.extend(rotation.iter().cloned());
        let pick = selector.select(&c).or_else(|| {
            // Every option used once; start the rotation over
            rotation.clear();
            let mut c = criteria.clone();
            c.exclude.extend(picks.iter().map(|e: &&Exercise| e.id.clone()));
            selector.select(&c)
        });
        match pick {
            Some(ex) => {
                rotation.insert(ex.id.clone());
                picks.push(ex);
            }
            None => break,
        }
    }
    if picks.is_empty() {
        push_unique(
            warnings,
            "No conditioning exercise fits the available equipment; conditioning omitted".into(),
        );
    }
    picks
}

/// Add a warning unless an identical one is already recorded
pub fn push_unique(warnings: &mut Vec<String>, msg: String) {
    if !warnings.contains(&msg) {
        warnings.push(msg);
    }
}

// ============================================================================
// Expansion across weeks
// ============================================================================

const WARMUP_MINUTES: u32 = 10;
const SECONDS_PER_SET: u32 = 40;

/// Expand a blueprint into concrete weeks
///
/// Weeks outside the skeleton are a caller bug and fail the call.
pub fn assemble_weeks(
    blueprint: &Blueprint,
    plan: &Macrocycle,
    request: &ProgramRequest,
    weeks: RangeInclusive<u32>,
    warnings: &mut Vec<String>,
) -> Result<Vec<GeneratedWeek>> {
    let settings = request.settings;
    let mut out = Vec::new();

    for week in weeks {
        let (meso, micro) = plan.microcycle(week).ok_or_else(|| {
            Error::invalid(format!(
                "week {week} is outside the {}-week plan",
                plan.total_weeks
            ))
        })?;

        let mut days = Vec::with_capacity(blueprint.days.len());
        for (idx, day) in blueprint.days.iter().enumerate() {
            let mut exercises = Vec::with_capacity(day.lines.len());
            for line in &day.lines {
                if line.conditioning == Some(ConditioningStyle::Finisher) && micro.is_deload {
                    continue;
                }
                let order = exercises.len() as u32 + 1;
                let exercise = match line.conditioning {
                    Some(style) => conditioning_line(line, style, order, request, week, micro.is_deload),
                    None => {
                        let max = request.maxes.get(&line.exercise_id);
                        if max.is_none() {
                            push_unique(
                                warnings,
                                format!("No 1RM for {}; showing % of 1RM only", line.name),
                            );
                        }
                        let entry = progression::prescribe(
                            &line.exercise_id,
                            max,
                            meso,
                            micro,
                            line.role,
                            settings.rounding_increment,
                        );
                        GeneratedExercise {
                            order,
                            exercise_id: line.exercise_id.clone(),
                            name: line.name.clone(),
                            kind: line.kind,
                            sets: entry.sets,
                            reps: entry.reps,
                            weight_kg: entry.weight_kg.unwrap_or(0.0),
                            percent_of_max: entry.intensity_percent,
                            rest_seconds: entry.rest_seconds,
                            rpe: entry.rpe,
                            notes: line.role.light_day.then(|| "light day".to_string()),
                        }
                    }
                };
                exercises.push(exercise);
            }

            let total_sets: u32 = exercises
                .iter()
                .filter(|e| e.kind != BlockKind::Conditioning)
                .map(|e| e.sets)
                .sum();
            if total_sets > settings.max_sets_per_day {
                push_unique(
                    warnings,
                    format!(
                        "{} has {} sets, above the {} sets-per-day ceiling",
                        day.name, total_sets, settings.max_sets_per_day
                    ),
                );
            }

            days.push(GeneratedDay {
                day: idx as u32 + 1,
                name: day.name.clone(),
                day_type: day.day_type,
                estimated_minutes: estimate_minutes(&exercises),
                exercises,
            });
        }

        out.push(GeneratedWeek {
            week,
            phase_name: meso.name.clone(),
            phase: meso.phase,
            is_deload: micro.is_deload,
            intensity_modifier: micro.intensity_modifier,
            volume_modifier: micro.volume_modifier,
            days,
        });
    }

    Ok(out)
}

fn conditioning_line(
    line: &PlannedLine,
    style: ConditioningStyle,
    order: u32,
    request: &ProgramRequest,
    week: u32,
    is_deload: bool,
) -> GeneratedExercise {
    let mut dose = progression::conditioning(request.profile.experience, week, is_deload);
    let notes = match style {
        ConditioningStyle::Finisher => {
            dose.rounds = (dose.rounds / 2).max(3);
            format!("finisher, {}", dose.describe())
        }
        ConditioningStyle::Circuit => {
            let cap = dose.total_seconds().div_ceil(60);
            format!("circuit station, {cap} min cap, {}", dose.describe())
        }
        ConditioningStyle::Intervals => format!("intervals, {}", dose.describe()),
    };
    GeneratedExercise {
        order,
        exercise_id: line.exercise_id.clone(),
        name: line.name.clone(),
        kind: BlockKind::Conditioning,
        sets: dose.rounds,
        reps: RepRange::exact(1),
        weight_kg: 0.0,
        percent_of_max: 0.0,
        rest_seconds: dose.rest_seconds,
        rpe: if is_deload { 5.0 } else { 8.0 },
        notes: Some(notes),
    }
}

/// Warm-up plus work and rest time for every set
pub fn estimate_minutes(exercises: &[GeneratedExercise]) -> u32 {
    let seconds: u32 = exercises
        .iter()
        .map(|e| match e.kind {
            BlockKind::Conditioning => e.sets * (SECONDS_PER_SET + e.rest_seconds),
            _ => e.sets * SECONDS_PER_SET + e.sets.saturating_sub(1) * e.rest_seconds,
        })
        .sum();
    WARMUP_MINUTES + seconds.div_ceil(60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::{periodization, Goal};

    #[test]
    fn test_split_days_cycle() {
        assert_eq!(
            split_days(Split::PushPullLegs, 5),
            vec![
                DayType::Push,
                DayType::Pull,
                DayType::Legs,
                DayType::Push,
                DayType::Pull
            ]
        );
        assert_eq!(split_days(Split::UpperLower, 3).len(), 3);
    }

    #[test]
    fn test_day_names_mark_variants() {
        let names = day_names(&[DayType::Upper, DayType::Lower, DayType::Upper, DayType::Lower]);
        assert_eq!(names, vec!["Upper A", "Lower A", "Upper B", "Lower B"]);
        assert_eq!(day_names(&[DayType::Push]), vec!["Push"]);
    }

    #[test]
    fn test_variants_share_main_lift() {
        let selector = Selector::new(get_default_catalog());
        let request = ProgramRequest::new(AthleteProfile::new(Goal::Hypertrophy, 8, 2));
        let mut warnings = Vec::new();
        let days = selector_days(
            &selector,
            &[DayType::FullBody, DayType::FullBody],
            &request.base_criteria(),
            false,
            &mut warnings,
        );
        assert_eq!(days[0].lines[0].exercise_id, days[1].lines[0].exercise_id);
        assert_ne!(days[0].lines[1].exercise_id, days[1].lines[1].exercise_id);
    }

    #[test]
    fn test_assemble_rejects_weeks_outside_plan() {
        let plan = periodization::plan(4, 2, Goal::Hypertrophy, 4).unwrap();
        let request = ProgramRequest::new(AthleteProfile::new(Goal::Hypertrophy, 4, 2));
        let blueprint = Blueprint {
            split_name: "full_body".into(),
            days: Vec::new(),
        };
        let mut warnings = Vec::new();
        assert!(assemble_weeks(&blueprint, &plan, &request, 1..=4, &mut warnings).is_ok());
        assert!(matches!(
            assemble_weeks(&blueprint, &plan, &request, 3..=5, &mut warnings),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_estimate_minutes() {
        let ex = GeneratedExercise {
            order: 1,
            exercise_id: "back_squat".into(),
            name: "Back Squat".into(),
            kind: BlockKind::Main,
            sets: 3,
            reps: RepRange::new(8, 12),
            weight_kg: 100.0,
            percent_of_max: 70.0,
            rest_seconds: 120,
            rpe: 7.0,
            notes: None,
        };
        // 3 x 40s work + 2 x 120s rest = 360s
        assert_eq!(estimate_minutes(&[ex]), 16);
    }
}
