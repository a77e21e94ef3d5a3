//! Methodology template engine.
//!
//! Resolves a [`MethodologyTemplate`] against an athlete's competition maxima:
//! every templated set gets a concrete weight, accessory maxima are derived
//! from the competition lifts, and the week is optionally filtered to one
//! discipline and remapped onto a different number of training days.
//! Resolution is a single pass and deterministic.

use crate::rounding::{round2, round_to_increment, DEFAULT_INCREMENT_KG};
use crate::template::{
    AthleteTier, LiftType, LineKind, MethodologyTemplate, TemplateCatalog, TemplateExercise,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Template used when no template matches the athlete's tier
pub const GENERAL_TEMPLATE: &str = "Sheiko 12 Weeks";

pub const MAX_DAYS_PER_WEEK: u32 = 6;

/// Competition maxima in kilograms; zero means unknown
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct AthleteMaxes {
    #[serde(default)]
    pub squat: f64,
    #[serde(default)]
    pub bench: f64,
    #[serde(default)]
    pub deadlift: f64,
    #[serde(default)]
    pub hip_thrust: f64,
}

impl AthleteMaxes {
    pub fn new(squat: f64, bench: f64, deadlift: f64) -> Self {
        Self {
            squat,
            bench,
            deadlift,
            hip_thrust: 0.0,
        }
    }

    /// Powerlifting total
    pub fn total(&self) -> f64 {
        self.squat + self.bench + self.deadlift
    }

    fn validate(&self) -> Result<()> {
        for (lift, value) in [
            ("squat", self.squat),
            ("bench", self.bench),
            ("deadlift", self.deadlift),
            ("hip thrust", self.hip_thrust),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::invalid(format!(
                    "{lift} max must be a non-negative number, got {value}"
                )));
            }
        }
        if self.total() + self.hip_thrust <= 0.0 {
            return Err(Error::invalid("at least one max must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ResolveOptions {
    /// Remap onto this many workouts per week; None keeps the template's layout
    pub days_per_week: Option<u32>,
    pub include_accessory: bool,
    pub lift_type: LiftType,
    pub rounding_increment: f64,
    /// Ceiling checked after merging workouts
    pub max_sets_per_day: u32,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            days_per_week: None,
            include_accessory: true,
            lift_type: LiftType::Powerlifting,
            rounding_increment: DEFAULT_INCREMENT_KG,
            max_sets_per_day: 30,
        }
    }
}

// ============================================================================
// Resolved Program
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlSet {
    pub percent: f64,
    pub reps: u32,
    pub sets: u32,
    pub weight_kg: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlExercise {
    pub name: String,
    pub kind: LineKind,
    /// Max the weights were resolved against (0 for bodyweight work)
    pub one_rm_kg: f64,
    pub sets: Vec<PlSet>,
    pub total_reps: u32,
    pub tonnage_kg: f64,
    /// Mean load as a percentage of `one_rm_kg`
    pub avg_percent: f64,
}

impl PlExercise {
    pub fn set_count(&self) -> u32 {
        self.sets.iter().map(|s| s.sets).sum()
    }

    fn recalculate(&mut self) {
        self.total_reps = self.sets.iter().map(|s| s.reps * s.sets).sum();
        let moved: f64 = self
            .sets
            .iter()
            .map(|s| s.weight_kg * (s.reps * s.sets) as f64)
            .sum();
        self.tonnage_kg = round2(moved);
        self.avg_percent = if self.total_reps > 0 && self.one_rm_kg > 0.0 {
            round2(moved / self.total_reps as f64 / self.one_rm_kg * 100.0)
        } else {
            0.0
        };
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlWorkout {
    pub day: u32,
    pub name: String,
    pub exercises: Vec<PlExercise>,
    pub total_reps: u32,
    pub tonnage_kg: f64,
}

impl PlWorkout {
    fn new(day: u32, name: String, exercises: Vec<PlExercise>) -> Self {
        let mut workout = Self {
            day,
            name,
            exercises,
            total_reps: 0,
            tonnage_kg: 0.0,
        };
        workout.recalculate();
        workout
    }

    pub fn set_count(&self) -> u32 {
        self.exercises.iter().map(PlExercise::set_count).sum()
    }

    fn recalculate(&mut self) {
        for ex in &mut self.exercises {
            ex.recalculate();
        }
        self.total_reps = self.exercises.iter().map(|e| e.total_reps).sum();
        self.tonnage_kg = round2(self.exercises.iter().map(|e| e.tonnage_kg).sum());
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlWeek {
    pub week: u32,
    pub phase: String,
    pub workouts: Vec<PlWorkout>,
    pub total_reps: u32,
    pub tonnage_kg: f64,
}

/// A template resolved against one athlete
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PlProgram {
    pub name: String,
    pub template: String,
    pub tier: AthleteTier,
    pub maxes: AthleteMaxes,
    pub weeks: Vec<PlWeek>,
    /// Total repetitions under load ("KPS")
    pub total_reps: u32,
    pub tonnage_kg: f64,
    pub reps_by_exercise: BTreeMap<String, u32>,
    /// Skipped lines and merge overflows found while resolving
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl PlProgram {
    /// Recompute every statistic bottom-up from the sets
    pub fn recalculate(&mut self) {
        self.reps_by_exercise.clear();
        for week in &mut self.weeks {
            for (idx, workout) in week.workouts.iter_mut().enumerate() {
                workout.day = idx as u32 + 1;
                workout.recalculate();
                for ex in &workout.exercises {
                    *self.reps_by_exercise.entry(ex.name.clone()).or_default() += ex.total_reps;
                }
            }
            week.total_reps = week.workouts.iter().map(|w| w.total_reps).sum();
            week.tonnage_kg = round2(week.workouts.iter().map(|w| w.tonnage_kg).sum());
        }
        self.total_reps = self.weeks.iter().map(|w| w.total_reps).sum();
        self.tonnage_kg = round2(self.weeks.iter().map(|w| w.tonnage_kg).sum());
    }

    pub fn week(&self, week: u32) -> Option<&PlWeek> {
        self.weeks.iter().find(|w| w.week == week)
    }

    pub fn exercises(&self) -> impl Iterator<Item = (&PlWeek, &PlWorkout, &PlExercise)> {
        self.weeks.iter().flat_map(|w| {
            w.workouts
                .iter()
                .flat_map(move |d| d.exercises.iter().map(move |e| (w, d, e)))
        })
    }
}

// ============================================================================
// Exercise Classification
// ============================================================================

/// Competition lift an exercise name refers to, if any
pub fn classify_exercise(name: &str) -> Option<LiftType> {
    let n = name.to_lowercase();
    if n.contains("hip thrust") || n.contains("glute bridge") {
        return Some(LiftType::HipThrust);
    }
    if n.contains("squat") {
        return Some(LiftType::Squat);
    }
    if n.contains("deadlift") || n.contains("rack pull") || n.contains("block pull") {
        return Some(LiftType::Deadlift);
    }
    if n.contains("bench press") && !n.contains("dumbbell") && !n.contains("incline") {
        return Some(LiftType::Bench);
    }
    None
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BodyRegion {
    Lower,
    Back,
    Upper,
    Core,
    Other,
}

fn body_region(name: &str) -> BodyRegion {
    let n = name.to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| n.contains(w));

    if any(&["squat", "leg", "lunge", "calf", "glute", "hip thrust"]) {
        BodyRegion::Lower
    } else if any(&[
        "deadlift", "pull", "row", "lat", "back", "hyperextension", "good morning", "chin",
    ]) {
        BodyRegion::Back
    } else if any(&[
        "press", "triceps", "curl", "biceps", "dip", "fly", "chest", "shoulder", "raise",
    ]) {
        BodyRegion::Upper
    } else if any(&["abs", "plank", "crunch", "core"]) {
        BodyRegion::Core
    } else {
        BodyRegion::Other
    }
}

/// Whether an exercise belongs in a program filtered to `lift_type`
///
/// Keeps the discipline's own lift plus the assistance work that carries
/// over to it; a deadlift program keeps squats as assistance.
pub fn fits_lift_type(name: &str, lift_type: LiftType) -> bool {
    let lift = classify_exercise(name);
    let region = body_region(name);
    match lift_type {
        LiftType::Powerlifting | LiftType::HipThrust => true,
        LiftType::Bench => {
            !matches!(
                lift,
                Some(LiftType::Squat | LiftType::Deadlift | LiftType::HipThrust)
            ) && region != BodyRegion::Lower
        }
        LiftType::Squat => {
            !matches!(lift, Some(LiftType::Bench | LiftType::Deadlift)) && region != BodyRegion::Upper
        }
        LiftType::Deadlift => lift != Some(LiftType::Bench) && region != BodyRegion::Upper,
    }
}

/// Estimated max for any template exercise, derived from the competition lifts
///
/// Returns 0 for bodyweight work or when the lift it derives from is unknown.
pub fn max_for_exercise(name: &str, maxes: &AthleteMaxes) -> f64 {
    let n = name.to_lowercase();
    let has = |w: &str| n.contains(w);
    let from = |max: f64, ratio: f64| if max > 0.0 { max * ratio } else { 0.0 };
    let either = |primary: f64, pr: f64, secondary: f64, sr: f64| {
        if primary > 0.0 {
            primary * pr
        } else {
            from(secondary, sr)
        }
    };

    if has("hip thrust") || has("glute bridge") {
        if maxes.hip_thrust <= 0.0 {
            return from(maxes.squat, 1.3);
        }
        let ratio = if has("pause") {
            0.85
        } else if has("deficit") || has("elevated") {
            0.8
        } else if has("band") {
            0.7
        } else if has("single") {
            0.5
        } else if has("glute bridge") {
            0.6
        } else {
            1.0
        };
        return maxes.hip_thrust * ratio;
    }

    if has("leg extension") {
        return from(maxes.squat, 0.3);
    }
    if has("leg curl") {
        return either(maxes.squat, 0.25, maxes.deadlift, 0.2);
    }
    if has("squat") {
        return if has("front") {
            either(maxes.squat, 0.8, maxes.deadlift, 0.55)
        } else {
            either(maxes.squat, 1.0, maxes.deadlift, 0.7)
        };
    }
    if has("pull-up") || has("pull up") || has("chin") {
        return from(maxes.bench, 0.35);
    }
    if has("pulldown") || (has("row") && !has("press")) || has("lat ") {
        return either(maxes.deadlift, 0.4, maxes.bench, 0.5);
    }
    if has("rack pull") || has("block pull") {
        return from(maxes.deadlift, 1.1);
    }
    if has("deadlift") {
        return if has("romanian") || has("stiff") {
            from(maxes.deadlift, 0.7)
        } else if has("knee") || has("deficit") {
            from(maxes.deadlift, 0.9)
        } else {
            maxes.deadlift
        };
    }
    if has("good morning") {
        return either(maxes.deadlift, 0.4, maxes.squat, 0.4);
    }
    if has("hyperextension") || has("back extension") {
        return from(maxes.deadlift, 0.3);
    }
    if has("triceps") || has("french") || has("skull") {
        return from(maxes.bench, 0.4);
    }
    if has("curl") || has("biceps") {
        return from(maxes.bench, 0.3);
    }
    if has("fly") {
        return from(maxes.bench, 0.25);
    }
    if has("pullover") {
        return from(maxes.bench, 0.4);
    }
    if has("dip") {
        return from(maxes.bench, 0.35);
    }
    if has("press") {
        let ratio = if has("close") || has("narrow") {
            0.85
        } else if has("board") {
            1.05
        } else if has("dumbbell") {
            0.45
        } else if has("incline") {
            0.75
        } else if has("overhead") || has("standing") || has("seated") || has("military") {
            0.65
        } else if has("bench") {
            1.0
        } else {
            0.7
        };
        return from(maxes.bench, ratio);
    }
    0.0
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve a named template for an athlete
pub fn resolve(
    catalog: &TemplateCatalog,
    name: &str,
    maxes: AthleteMaxes,
    options: ResolveOptions,
) -> Result<PlProgram> {
    let template = catalog.get(name)?;
    resolve_template(template, maxes, options)
}

/// Resolve an already loaded template
pub fn resolve_template(
    template: &MethodologyTemplate,
    maxes: AthleteMaxes,
    options: ResolveOptions,
) -> Result<PlProgram> {
    maxes.validate()?;
    if let Some(days) = options.days_per_week {
        if !(1..=MAX_DAYS_PER_WEEK).contains(&days) {
            return Err(Error::invalid(format!(
                "days per week must be between 1 and {MAX_DAYS_PER_WEEK}, got {days}"
            )));
        }
    }
    if !(options.rounding_increment.is_finite() && options.rounding_increment > 0.0) {
        return Err(Error::invalid(format!(
            "rounding increment must be positive, got {}",
            options.rounding_increment
        )));
    }

    let mut warnings = Vec::new();
    let mut weeks = Vec::with_capacity(template.weeks.len());

    for week in &template.weeks {
        let mut workouts = Vec::with_capacity(week.workouts.len());
        for workout in &week.workouts {
            let exercises: Vec<PlExercise> = workout
                .exercises
                .iter()
                .filter(|ex| options.include_accessory || ex.kind == LineKind::Competition)
                .filter(|ex| fits_lift_type(&ex.name, options.lift_type))
                .filter_map(|ex| {
                    let resolved = resolve_exercise(ex, &maxes, options.rounding_increment);
                    if resolved.is_none() {
                        let msg = format!(
                            "Week {} day {}: no max for {}; line skipped",
                            week.week, workout.day, ex.name
                        );
                        tracing::debug!("{}", msg);
                        warnings.push(msg);
                    }
                    resolved
                })
                .collect();
            if exercises.is_empty() {
                continue;
            }
            let name = workout
                .name
                .clone()
                .unwrap_or_else(|| format!("Day {}", workout.day));
            workouts.push(PlWorkout::new(workout.day, name, exercises));
        }

        if let Some(days) = options.days_per_week {
            if !workouts.is_empty() && workouts.len() != days as usize {
                workouts = remap_days(workouts, days as usize);
                for w in &workouts {
                    let sets = w.set_count();
                    if sets > options.max_sets_per_day {
                        warnings.push(format!(
                            "Week {} day {} has {} sets after fitting {} days, above the {} sets-per-day ceiling",
                            week.week, w.day, sets, days, options.max_sets_per_day
                        ));
                    }
                }
            }
        }

        if workouts.is_empty() {
            continue;
        }
        weeks.push(PlWeek {
            week: week.week,
            phase: week.phase.clone(),
            workouts,
            total_reps: 0,
            tonnage_kg: 0.0,
        });
    }

    let name = match options.lift_type {
        LiftType::Powerlifting => template.name.clone(),
        lift => format!("{} ({lift} only)", template.name),
    };

    let mut program = PlProgram {
        name,
        template: template.name.clone(),
        tier: template.tier,
        maxes,
        weeks,
        total_reps: 0,
        tonnage_kg: 0.0,
        reps_by_exercise: BTreeMap::new(),
        warnings,
    };
    program.recalculate();

    tracing::info!(
        template = %template.name,
        weeks = program.weeks.len(),
        kps = program.total_reps,
        tonnage_kg = program.tonnage_kg,
        "Resolved methodology template"
    );

    Ok(program)
}

/// None when the line needs a max the athlete does not have
fn resolve_exercise(ex: &TemplateExercise, maxes: &AthleteMaxes, increment: f64) -> Option<PlExercise> {
    let one_rm = max_for_exercise(&ex.name, maxes);
    let needs_max = ex.uses_percentages() || ex.uses_absolute_weights();
    if needs_max && one_rm <= 0.0 {
        return None;
    }

    let ratio = if ex.uses_absolute_weights() {
        let reference = ex.reference_max();
        if reference > 0.0 {
            one_rm / reference
        } else {
            1.0
        }
    } else {
        1.0
    };

    let sets = ex
        .sets
        .iter()
        .map(|set| {
            let (percent, weight_kg) = if set.percent() > 0.0 {
                let weight = round_to_increment(one_rm * set.percent() / 100.0, increment);
                (set.percent(), weight)
            } else if set.is_absolute() {
                let weight = round_to_increment(set.weight * ratio, increment);
                (round2(weight / one_rm * 100.0), weight)
            } else {
                (0.0, 0.0)
            };
            PlSet {
                percent,
                reps: set.reps,
                sets: set.set_count(),
                weight_kg,
            }
        })
        .collect();

    let mut resolved = PlExercise {
        name: ex.name.clone(),
        kind: ex.kind,
        one_rm_kg: round2(one_rm),
        sets,
        total_reps: 0,
        tonnage_kg: 0.0,
        avg_percent: 0.0,
    };
    resolved.recalculate();
    Some(resolved)
}

/// Spread a week's workouts evenly over `days`
///
/// Fewer days merge consecutive workouts; more days split the exercise list.
fn remap_days(workouts: Vec<PlWorkout>, days: usize) -> Vec<PlWorkout> {
    let groups: Vec<Vec<PlExercise>> = if workouts.len() > days {
        let n = workouts.len();
        let mut sources = workouts.into_iter();
        (0..days)
            .map(|i| {
                let take = (i + 1) * n / days - i * n / days;
                sources
                    .by_ref()
                    .take(take)
                    .flat_map(|w| w.exercises)
                    .collect()
            })
            .collect()
    } else {
        let exercises: Vec<PlExercise> = workouts.into_iter().flat_map(|w| w.exercises).collect();
        let n = exercises.len();
        let mut sources = exercises.into_iter();
        (0..days)
            .map(|i| {
                let take = (i + 1) * n / days - i * n / days;
                sources.by_ref().take(take).collect()
            })
            .collect()
    };

    groups
        .into_iter()
        .filter(|g| !g.is_empty())
        .enumerate()
        .map(|(i, exercises)| PlWorkout::new(i as u32 + 1, format!("Day {}", i + 1), exercises))
        .collect()
}

// ============================================================================
// Template Selection
// ============================================================================

/// Template name recommended for a tier and discipline
pub fn recommend(tier: AthleteTier, lift_type: LiftType) -> &'static str {
    match (tier, lift_type) {
        (AthleteTier::Novice, _) => "Russian Cycle",
        (AthleteTier::Intermediate, _) => "Sheiko 12 Weeks",
        (AthleteTier::Advanced, LiftType::Deadlift) => "Golovinsky Cycle 7",
        (AthleteTier::Advanced, LiftType::Squat | LiftType::Bench) => "Verkhoshansky Block",
        (AthleteTier::Advanced, _) => "Sheiko Pre-Competition 4 Weeks",
        (AthleteTier::Elite, _) => "Muravyev 16 Weeks",
    }
}

/// Pick a template from the athlete's total
///
/// Falls back to any template of the same tier, then to the general one.
pub fn auto_select<'a>(
    catalog: &'a TemplateCatalog,
    maxes: &AthleteMaxes,
    lift_type: LiftType,
) -> Result<&'a MethodologyTemplate> {
    let tier = AthleteTier::from_total(maxes.total());
    let recommended = recommend(tier, lift_type);

    let template = catalog
        .get(recommended)
        .ok()
        .or_else(|| catalog.for_tier(tier).into_iter().next())
        .map_or_else(|| catalog.get(GENERAL_TEMPLATE), Ok)?;

    tracing::info!(
        total = maxes.total(),
        %tier,
        template = %template.name,
        "Auto-selected template"
    );
    Ok(template)
}

/// Auto-select and resolve in one step
pub fn resolve_auto(
    catalog: &TemplateCatalog,
    maxes: AthleteMaxes,
    options: ResolveOptions,
) -> Result<PlProgram> {
    let template = auto_select(catalog, &maxes, options.lift_type)?;
    resolve_template(template, maxes, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::get_builtin_templates;

    fn maxes() -> AthleteMaxes {
        AthleteMaxes::new(150.0, 100.0, 180.0)
    }

    #[test]
    fn test_russian_cycle_end_to_end() {
        let program = resolve(
            get_builtin_templates(),
            "Russian Cycle",
            maxes(),
            ResolveOptions::default(),
        )
        .unwrap();

        assert_eq!(program.weeks.len(), 6);
        assert!(program.total_reps > 0);
        assert!(program.tonnage_kg > 0.0);
        for (_, _, ex) in program.exercises() {
            for set in &ex.sets {
                assert!(set.weight_kg <= ex.one_rm_kg, "{} {}", ex.name, set.weight_kg);
            }
        }

        let squat = &program.weeks[0].workouts[0].exercises[0];
        assert_eq!(squat.name, "Squat");
        assert_eq!(squat.sets[0].weight_kg, 120.0);
        assert_eq!(squat.total_reps, 12);
        assert_eq!(squat.tonnage_kg, 1440.0);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let a = resolve(get_builtin_templates(), "Sheiko 12 Weeks", maxes(), ResolveOptions::default())
            .unwrap();
        let b = resolve(get_builtin_templates(), "Sheiko 12 Weeks", maxes(), ResolveOptions::default())
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_template_and_bad_maxes() {
        assert!(matches!(
            resolve(get_builtin_templates(), "Nope", maxes(), ResolveOptions::default()),
            Err(Error::TemplateNotFound(_))
        ));
        assert!(matches!(
            resolve(
                get_builtin_templates(),
                "Russian Cycle",
                AthleteMaxes::new(-1.0, 100.0, 100.0),
                ResolveOptions::default()
            ),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_max_skips_lines() {
        let program = resolve(
            get_builtin_templates(),
            "Russian Cycle",
            AthleteMaxes::new(150.0, 100.0, 0.0),
            ResolveOptions::default(),
        )
        .unwrap();
        assert!(program
            .exercises()
            .all(|(_, _, e)| classify_exercise(&e.name) != Some(LiftType::Deadlift)));
        assert!(program.warnings.iter().any(|w| w.contains("Deadlift")));
        assert!(program.reps_by_exercise.contains_key("Squat"));
    }

    #[test]
    fn test_fraction_percentages() {
        let program = resolve(
            get_builtin_templates(),
            "Golovinsky Cycle 7",
            maxes(),
            ResolveOptions::default(),
        )
        .unwrap();
        let pull = &program.weeks[0].workouts[0].exercises[0];
        assert_eq!(pull.name, "Deadlift");
        assert_eq!(pull.sets[0].percent, 50.0);
        assert_eq!(pull.sets[0].weight_kg, 90.0);
    }

    #[test]
    fn test_absolute_weights_rescaled() {
        let program = resolve(
            get_builtin_templates(),
            "Sheiko Pre-Competition 4 Weeks",
            maxes(),
            ResolveOptions::default(),
        )
        .unwrap();
        let squat = &program.weeks[0].workouts[0].exercises[0];
        let top = squat.sets.last().unwrap();
        // Heaviest written set is assumed to be 90% of the reference max
        assert_eq!(top.weight_kg, 135.0);
        assert!((top.percent - 90.0).abs() < 0.01);
    }

    #[test]
    fn test_accessory_ratios() {
        let m = maxes();
        assert_eq!(max_for_exercise("Close-Grip Bench Press", &m), 85.0);
        assert!((max_for_exercise("Romanian Deadlift", &m) - 126.0).abs() < 1e-9);
        assert_eq!(max_for_exercise("Front Squat", &m), 120.0);
        assert_eq!(max_for_exercise("Bench Press", &m), 100.0);
        assert_eq!(max_for_exercise("Plank", &m), 0.0);
        // Squat derived from deadlift when unknown
        let no_squat = AthleteMaxes::new(0.0, 100.0, 200.0);
        assert_eq!(max_for_exercise("Squat", &no_squat), 140.0);
        assert!((max_for_exercise("Hip Thrust", &m) - 195.0).abs() < 1e-9);
    }

    #[test]
    fn test_lift_type_filter() {
        let options = ResolveOptions {
            lift_type: LiftType::Bench,
            ..ResolveOptions::default()
        };
        let program = resolve(get_builtin_templates(), "Sheiko 12 Weeks", maxes(), options).unwrap();
        assert!(program.name.contains("bench only"));
        for (_, _, ex) in program.exercises() {
            assert!(fits_lift_type(&ex.name, LiftType::Bench), "{}", ex.name);
            assert_ne!(classify_exercise(&ex.name), Some(LiftType::Squat));
        }

        assert!(fits_lift_type("Squat", LiftType::Deadlift));
        assert!(!fits_lift_type("Bench Press", LiftType::Deadlift));
    }

    #[test]
    fn test_without_accessories() {
        let options = ResolveOptions {
            include_accessory: false,
            ..ResolveOptions::default()
        };
        let program = resolve(get_builtin_templates(), "Sheiko 12 Weeks", maxes(), options).unwrap();
        assert!(program
            .exercises()
            .all(|(_, _, e)| e.kind == LineKind::Competition));
    }

    #[test]
    fn test_merge_days_keeps_volume() {
        let full = resolve(get_builtin_templates(), "Sheiko 12 Weeks", maxes(), ResolveOptions::default())
            .unwrap();
        let options = ResolveOptions {
            days_per_week: Some(2),
            max_sets_per_day: 20,
            ..ResolveOptions::default()
        };
        let merged = resolve(get_builtin_templates(), "Sheiko 12 Weeks", maxes(), options).unwrap();

        assert!(merged.weeks.iter().all(|w| w.workouts.len() == 2));
        assert_eq!(merged.total_reps, full.total_reps);
        assert_eq!(merged.weeks[0].workouts[1].day, 2);
        assert!(merged.warnings.iter().any(|w| w.contains("sets-per-day")));
    }

    #[test]
    fn test_split_days() {
        let options = ResolveOptions {
            days_per_week: Some(5),
            ..ResolveOptions::default()
        };
        let program = resolve(get_builtin_templates(), "Russian Cycle", maxes(), options).unwrap();
        assert!(program.weeks.iter().all(|w| w.workouts.len() == 5));

        let bad = ResolveOptions {
            days_per_week: Some(7),
            ..ResolveOptions::default()
        };
        assert!(resolve(get_builtin_templates(), "Russian Cycle", maxes(), bad).is_err());
    }

    #[test]
    fn test_auto_select_by_total() {
        let catalog = get_builtin_templates();
        // 400 kg total -> intermediate
        let intermediate = AthleteMaxes::new(140.0, 100.0, 160.0);
        let t = auto_select(catalog, &intermediate, LiftType::Powerlifting).unwrap();
        assert_eq!(t.tier, AthleteTier::Intermediate);
        assert_eq!(t.name, "Sheiko 12 Weeks");

        let novice = AthleteMaxes::new(100.0, 70.0, 120.0);
        assert_eq!(auto_select(catalog, &novice, LiftType::Powerlifting).unwrap().name, "Russian Cycle");

        let elite = AthleteMaxes::new(260.0, 170.0, 300.0);
        assert_eq!(auto_select(catalog, &elite, LiftType::Powerlifting).unwrap().tier, AthleteTier::Elite);
    }

    #[test]
    fn test_auto_select_falls_back_to_general() {
        let sheiko = get_builtin_templates().get(GENERAL_TEMPLATE).unwrap().clone();
        let catalog = TemplateCatalog::from_templates([sheiko]);
        let elite = AthleteMaxes::new(260.0, 170.0, 300.0);
        assert_eq!(
            auto_select(&catalog, &elite, LiftType::Powerlifting).unwrap().name,
            GENERAL_TEMPLATE
        );
        assert!(auto_select(&TemplateCatalog::default(), &elite, LiftType::Powerlifting).is_err());
    }
}
