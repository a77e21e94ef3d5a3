//! Movement pattern balance.
//!
//! Working sets are bucketed by pattern using the catalog entry behind each
//! line: push, pull, quad dominant, hip dominant, core, carry and
//! conditioning. Push/pull and quad/hip ratios are scored against fixed
//! bands, pressing and pulling are split into horizontal and vertical work,
//! and leg work into bilateral and unilateral. Deficits found this way can
//! be turned into corrective picks through the [`Selector`].

use crate::selector::{SelectionCriteria, Selector};
use crate::{BlockKind, Catalog, Exercise, GeneratedExercise, GeneratedProgram, GeneratedWeek, MovementType};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

// ============================================================================
// Bands
// ============================================================================

/// Ideal and acceptable ranges for a ratio
struct Band {
    ideal: (f64, f64),
    accept: (f64, f64),
}

const PUSH_PULL: Band = Band {
    ideal: (0.9, 1.1),
    accept: (0.75, 1.33),
};

const QUAD_HIP: Band = Band {
    ideal: (0.9, 1.2),
    accept: (0.7, 1.5),
};

/// Acceptable horizontal:vertical range for pressing and pulling
pub const PLANE_ACCEPT: (f64, f64) = (0.5, 2.0);

pub const MIN_CORE_SETS: u32 = 3;
const MIN_CORRECTIVE_SETS: u32 = 2;
/// Correctives suggested per week at most
pub const MAX_CORRECTIVES: usize = 3;
/// Weeks scoring at least this need no correctives
pub const WELL_BALANCED_SCORE: u32 = 90;

const VERTICAL_PUSH: &[&str] = &["overhead", "shoulder press", "military", "push press", "pike"];
const VERTICAL_PULL: &[&str] = &["pull-up", "pullup", "chin-up", "chinup", "pulldown"];
const UNILATERAL: &[&str] = &[
    "lunge",
    "split squat",
    "single",
    "one-arm",
    "one arm",
    "one-leg",
    "step-up",
];

// ============================================================================
// Classification
// ============================================================================

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    Push,
    Pull,
    QuadDominant,
    HipDominant,
    Core,
    Carry,
    Conditioning,
}

impl Pattern {
    pub fn of(movement: MovementType) -> Pattern {
        match movement {
            MovementType::Push => Pattern::Push,
            MovementType::Pull => Pattern::Pull,
            MovementType::Squat | MovementType::Lunge => Pattern::QuadDominant,
            MovementType::Hinge => Pattern::HipDominant,
            MovementType::Core => Pattern::Core,
            MovementType::Carry => Pattern::Carry,
            MovementType::Conditioning => Pattern::Conditioning,
        }
    }

    fn movements(self) -> &'static [MovementType] {
        match self {
            Pattern::Push => &[MovementType::Push],
            Pattern::Pull => &[MovementType::Pull],
            Pattern::QuadDominant => &[MovementType::Squat, MovementType::Lunge],
            Pattern::HipDominant => &[MovementType::Hinge],
            Pattern::Core => &[MovementType::Core],
            Pattern::Carry => &[MovementType::Carry],
            Pattern::Conditioning => &[MovementType::Conditioning],
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Plane {
    Horizontal,
    Vertical,
}

fn name_has(ex: &Exercise, keywords: &[&str]) -> bool {
    let name = ex.name.to_lowercase();
    keywords.iter().any(|k| name.contains(k))
}

/// Plane of a push or pull exercise; None for other patterns
pub fn plane_of(ex: &Exercise) -> Option<Plane> {
    let vertical = match Pattern::of(ex.movement) {
        Pattern::Push => name_has(ex, VERTICAL_PUSH),
        Pattern::Pull => name_has(ex, VERTICAL_PULL),
        _ => return None,
    };
    Some(if vertical {
        Plane::Vertical
    } else {
        Plane::Horizontal
    })
}

pub fn is_unilateral(ex: &Exercise) -> bool {
    !ex.bilateral || name_has(ex, UNILATERAL)
}

// ============================================================================
// Balance report
// ============================================================================

/// Where a ratio sits relative to its band; `Low`/`High` refer to the
/// first side of the pair (push of push:pull, quad of quad:hip)
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PairStatus {
    #[default]
    Empty,
    Balanced,
    SlightlyLow,
    SlightlyHigh,
    Low,
    High,
}

impl PairStatus {
    fn assess(first: u32, second: u32, band: &Band) -> PairStatus {
        if first == 0 && second == 0 {
            return PairStatus::Empty;
        }
        let Some(r) = ratio(first, second) else {
            return PairStatus::High;
        };
        if r < band.accept.0 {
            PairStatus::Low
        } else if r > band.accept.1 {
            PairStatus::High
        } else if r < band.ideal.0 {
            PairStatus::SlightlyLow
        } else if r > band.ideal.1 {
            PairStatus::SlightlyHigh
        } else {
            PairStatus::Balanced
        }
    }

    fn is_low(self) -> bool {
        matches!(self, PairStatus::Low | PairStatus::SlightlyLow)
    }

    fn is_high(self) -> bool {
        matches!(self, PairStatus::High | PairStatus::SlightlyHigh)
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Assessment {
    #[default]
    Excellent,
    Good,
    NeedsAttention,
    Imbalanced,
}

impl Assessment {
    fn from_score(score: u32) -> Self {
        match score {
            s if s >= 90 => Assessment::Excellent,
            s if s >= 75 => Assessment::Good,
            s if s >= 60 => Assessment::NeedsAttention,
            _ => Assessment::Imbalanced,
        }
    }
}

fn ratio(first: u32, second: u32) -> Option<f64> {
    (second > 0).then(|| first as f64 / second as f64)
}

fn describe(first: u32, second: u32) -> String {
    match ratio(first, second) {
        Some(r) => format!("{r:.2}:1"),
        None => format!("{first}:0"),
    }
}

/// Working sets per pattern with ratio assessments and a 0-100 score
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MovementBalance {
    pub push_sets: u32,
    pub pull_sets: u32,
    pub push_pull_ratio: Option<f64>,
    pub push_pull: PairStatus,

    pub quad_sets: u32,
    pub hip_sets: u32,
    pub quad_hip_ratio: Option<f64>,
    pub quad_hip: PairStatus,

    pub horizontal_push_sets: u32,
    pub vertical_push_sets: u32,
    pub horizontal_pull_sets: u32,
    pub vertical_pull_sets: u32,

    pub bilateral_leg_sets: u32,
    pub unilateral_leg_sets: u32,

    pub core_sets: u32,
    pub carry_sets: u32,
    pub conditioning_sets: u32,

    pub score: u32,
    pub assessment: Assessment,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl MovementBalance {
    /// Balance of a set of lines; ids missing from the catalog are ignored
    pub fn of<'a, I>(catalog: &Catalog, lines: I) -> Self
    where
        I: IntoIterator<Item = &'a GeneratedExercise>,
    {
        let mut balance = Self::default();
        for line in lines {
            if line.kind == BlockKind::Conditioning {
                balance.conditioning_sets += line.sets;
                continue;
            }
            match catalog.get(&line.exercise_id) {
                Some(ex) => balance.add(ex, line.sets),
                None => tracing::trace!(id = %line.exercise_id, "Line not in catalog"),
            }
        }
        balance.assess();
        balance
    }

    pub fn of_week(catalog: &Catalog, week: &GeneratedWeek) -> Self {
        Self::of(catalog, week.days.iter().flat_map(|d| d.exercises.iter()))
    }

    pub fn of_program(catalog: &Catalog, program: &GeneratedProgram) -> Self {
        Self::of(
            catalog,
            program
                .weeks
                .iter()
                .flat_map(|w| w.days.iter())
                .flat_map(|d| d.exercises.iter()),
        )
    }

    fn add(&mut self, ex: &Exercise, sets: u32) {
        match Pattern::of(ex.movement) {
            Pattern::Push => {
                self.push_sets += sets;
                match plane_of(ex) {
                    Some(Plane::Vertical) => self.vertical_push_sets += sets,
                    _ => self.horizontal_push_sets += sets,
                }
            }
            Pattern::Pull => {
                self.pull_sets += sets;
                match plane_of(ex) {
                    Some(Plane::Vertical) => self.vertical_pull_sets += sets,
                    _ => self.horizontal_pull_sets += sets,
                }
            }
            pattern @ (Pattern::QuadDominant | Pattern::HipDominant) => {
                if pattern == Pattern::QuadDominant {
                    self.quad_sets += sets;
                } else {
                    self.hip_sets += sets;
                }
                if is_unilateral(ex) {
                    self.unilateral_leg_sets += sets;
                } else {
                    self.bilateral_leg_sets += sets;
                }
            }
            Pattern::Core => self.core_sets += sets,
            Pattern::Carry => self.carry_sets += sets,
            Pattern::Conditioning => self.conditioning_sets += sets,
        }
    }

    fn leg_sets(&self) -> u32 {
        self.quad_sets + self.hip_sets
    }

    fn strength_sets(&self) -> u32 {
        self.push_sets + self.pull_sets + self.leg_sets()
    }

    fn assess(&mut self) {
        let mut score: i32 = 100;
        let mut recs = Vec::new();

        self.push_pull_ratio = ratio(self.push_sets, self.pull_sets);
        self.push_pull = PairStatus::assess(self.push_sets, self.pull_sets, &PUSH_PULL);
        let push_pull = describe(self.push_sets, self.pull_sets);
        match self.push_pull {
            PairStatus::Low => {
                score -= 15;
                recs.push(format!("add pressing work (push:pull {push_pull})"));
            }
            PairStatus::High => {
                score -= 15;
                recs.push(format!("add rows or pull-ups (push:pull {push_pull})"));
            }
            PairStatus::SlightlyLow | PairStatus::SlightlyHigh => score -= 5,
            PairStatus::Balanced | PairStatus::Empty => {}
        }

        self.quad_hip_ratio = ratio(self.quad_sets, self.hip_sets);
        self.quad_hip = PairStatus::assess(self.quad_sets, self.hip_sets, &QUAD_HIP);
        let quad_hip = describe(self.quad_sets, self.hip_sets);
        match self.quad_hip {
            PairStatus::Low => {
                score -= 15;
                recs.push(format!("add squats or lunges (quad:hip {quad_hip})"));
            }
            PairStatus::High => {
                score -= 15;
                recs.push(format!("add hinges or hip thrusts (quad:hip {quad_hip})"));
            }
            PairStatus::SlightlyLow | PairStatus::SlightlyHigh => score -= 5,
            PairStatus::Balanced | PairStatus::Empty => {}
        }

        if plane_excess(self.horizontal_push_sets, self.vertical_push_sets) {
            score -= 5;
            recs.push("add overhead pressing".to_string());
        }
        if plane_excess(self.horizontal_pull_sets, self.vertical_pull_sets) {
            score -= 5;
            recs.push("add vertical pulling".to_string());
        }
        if self.leg_sets() > 0 && self.unilateral_leg_sets == 0 {
            score -= 10;
            recs.push("add unilateral leg work (lunges, split squats)".to_string());
        }
        if self.strength_sets() > 0 && self.core_sets == 0 {
            score -= 5;
            recs.push("add core work".to_string());
        }

        self.score = score.max(0) as u32;
        self.assessment = Assessment::from_score(self.score);
        self.recommendations = recs;
    }

    /// Missing work, most urgent first
    pub fn deficits(&self) -> Vec<BalanceDeficit> {
        let mut deficits = Vec::new();

        if self.push_pull.is_low() {
            deficits.push(BalanceDeficit::new(
                Pattern::Push,
                self.pull_sets.saturating_sub(self.push_sets),
                if self.push_pull == PairStatus::Low { 10 } else { 8 },
            ));
        } else if self.push_pull.is_high() {
            deficits.push(BalanceDeficit::new(
                Pattern::Pull,
                self.push_sets.saturating_sub(self.pull_sets),
                if self.push_pull == PairStatus::High { 10 } else { 8 },
            ));
        }

        if self.quad_hip.is_low() {
            deficits.push(BalanceDeficit::new(
                Pattern::QuadDominant,
                self.hip_sets.saturating_sub(self.quad_sets),
                if self.quad_hip == PairStatus::Low { 10 } else { 8 },
            ));
        } else if self.quad_hip.is_high() {
            deficits.push(BalanceDeficit::new(
                Pattern::HipDominant,
                self.quad_sets.saturating_sub(self.hip_sets),
                if self.quad_hip == PairStatus::High { 10 } else { 8 },
            ));
        }

        for (pattern, horizontal, vertical) in [
            (Pattern::Push, self.horizontal_push_sets, self.vertical_push_sets),
            (Pattern::Pull, self.horizontal_pull_sets, self.vertical_pull_sets),
        ] {
            if plane_excess(horizontal, vertical) {
                let mut d = BalanceDeficit::new(pattern, horizontal.saturating_sub(vertical), 5);
                d.plane = Some(Plane::Vertical);
                deficits.push(d);
            } else if plane_excess(vertical, horizontal) && horizontal > 0 {
                let mut d = BalanceDeficit::new(pattern, vertical.saturating_sub(horizontal), 5);
                d.plane = Some(Plane::Horizontal);
                deficits.push(d);
            }
        }

        if self.leg_sets() > 0 && self.unilateral_leg_sets == 0 {
            let mut d = BalanceDeficit::new(Pattern::QuadDominant, self.leg_sets() / 4, 6);
            d.unilateral = true;
            deficits.push(d);
        }

        if self.strength_sets() > 0 && self.core_sets < MIN_CORE_SETS {
            deficits.push(BalanceDeficit {
                pattern: Pattern::Core,
                plane: None,
                unilateral: false,
                needed_sets: MIN_CORE_SETS - self.core_sets,
                priority: 4,
            });
        }

        // Stable, so equal priorities keep the order above
        deficits.sort_by_key(|d| Reverse(d.priority));
        deficits
    }
}

/// `first` exceeds the acceptable plane ratio against `second`
fn plane_excess(first: u32, second: u32) -> bool {
    first > 0 && ratio(first, second).map_or(true, |r| r > PLANE_ACCEPT.1)
}

// ============================================================================
// Deficits and correctives
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BalanceDeficit {
    pub pattern: Pattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plane: Option<Plane>,
    pub unilateral: bool,
    pub needed_sets: u32,
    /// 1-10, 10 is critical
    pub priority: u8,
}

impl BalanceDeficit {
    fn new(pattern: Pattern, needed_sets: u32, priority: u8) -> Self {
        Self {
            pattern,
            plane: None,
            unilateral: false,
            needed_sets: needed_sets.max(MIN_CORRECTIVE_SETS),
            priority,
        }
    }

    pub fn accepts(&self, ex: &Exercise) -> bool {
        if !self.pattern.movements().contains(&ex.movement) {
            return false;
        }
        if let Some(plane) = self.plane {
            if plane_of(ex) != Some(plane) {
                return false;
            }
        }
        !self.unilateral || is_unilateral(ex)
    }
}

/// Catalog exercises that address a deficit, best ranked first
///
/// `base` supplies equipment, difficulty, restrictions and exclusions; its
/// movement, muscle and compound fields are ignored.
pub fn corrective_candidates<'a>(
    selector: &Selector<'a>,
    deficit: &BalanceDeficit,
    base: &SelectionCriteria,
) -> Vec<&'a Exercise> {
    let mut criteria = base.clone();
    criteria.primary_muscle = None;
    criteria.require_compound = false;

    let mut found: Vec<&'a Exercise> = Vec::new();
    for movement in deficit.pattern.movements() {
        criteria.movement = Some(*movement);
        found.extend(
            selector
                .candidates(&criteria)
                .into_iter()
                .filter(|ex| deficit.accepts(ex)),
        );
    }
    found.sort_by(|a, b| {
        Selector::score(b, &criteria)
            .cmp(&Selector::score(a, &criteria))
            .then_with(|| a.id.cmp(&b.id))
    });
    found
}

/// A suggested addition for one deficit
#[derive(Clone, Debug)]
pub struct Corrective<'a> {
    pub exercise: &'a Exercise,
    pub deficit: BalanceDeficit,
}

/// Up to [`MAX_CORRECTIVES`] additions for a week, none when it already
/// scores [`WELL_BALANCED_SCORE`] or better
pub fn correctives_for_week<'a>(
    selector: &Selector<'a>,
    week: &GeneratedWeek,
    base: &SelectionCriteria,
) -> Vec<Corrective<'a>> {
    let balance = MovementBalance::of_week(selector.catalog(), week);
    if balance.score >= WELL_BALANCED_SCORE {
        return Vec::new();
    }

    let mut base = base.clone();
    base.exclude
        .extend(week.days.iter().flat_map(|d| d.exercises.iter()).map(|e| e.exercise_id.clone()));

    let mut picks = Vec::new();
    for deficit in balance.deficits() {
        if picks.len() >= MAX_CORRECTIVES {
            break;
        }
        if let Some(ex) = corrective_candidates(selector, &deficit, &base).first().copied() {
            base.exclude.insert(ex.id.clone());
            picks.push(Corrective {
                exercise: ex,
                deficit,
            });
        }
    }

    tracing::debug!(week = week.week, score = balance.score, picks = picks.len(), "Balance correctives");
    picks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::engine::generate;
    use crate::{AthleteProfile, Equipment, ExperienceLevel, Goal, ProgramRequest, RepRange};

    fn line(id: &str, sets: u32) -> GeneratedExercise {
        GeneratedExercise {
            order: 1,
            exercise_id: id.to_string(),
            name: id.to_string(),
            kind: BlockKind::Main,
            sets,
            reps: RepRange::new(8, 12),
            weight_kg: 0.0,
            percent_of_max: 70.0,
            rest_seconds: 90,
            rpe: 7.0,
            notes: None,
        }
    }

    fn balance(lines: &[(&str, u32)]) -> MovementBalance {
        let lines: Vec<_> = lines.iter().map(|(id, sets)| line(id, *sets)).collect();
        MovementBalance::of(get_default_catalog(), &lines)
    }

    fn week_of(lines: &[(&str, u32)]) -> GeneratedWeek {
        let request = ProgramRequest::new(AthleteProfile::new(Goal::Hypertrophy, 4, 3));
        let mut week = generate(get_default_catalog(), &request).unwrap().program.weeks[0].clone();
        week.days.truncate(1);
        week.days[0].exercises = lines.iter().map(|(id, sets)| line(id, *sets)).collect();
        week
    }

    fn base() -> SelectionCriteria {
        SelectionCriteria::new(Equipment::full_gym(), ExperienceLevel::Advanced)
    }

    #[test]
    fn test_balanced_week_scores_full() {
        let b = balance(&[
            ("bench_press", 3),
            ("overhead_press", 3),
            ("barbell_row", 3),
            ("pull_up", 3),
            ("back_squat", 3),
            ("walking_lunge", 3),
            ("romanian_deadlift", 3),
            ("hip_thrust", 3),
            ("plank", 3),
        ]);
        assert_eq!((b.push_sets, b.pull_sets), (6, 6));
        assert_eq!((b.quad_sets, b.hip_sets), (6, 6));
        assert_eq!((b.horizontal_push_sets, b.vertical_push_sets), (3, 3));
        assert_eq!((b.horizontal_pull_sets, b.vertical_pull_sets), (3, 3));
        assert_eq!(b.unilateral_leg_sets, 3);
        assert_eq!(b.push_pull, PairStatus::Balanced);
        assert_eq!(b.quad_hip, PairStatus::Balanced);
        assert_eq!(b.score, 100);
        assert_eq!(b.assessment, Assessment::Excellent);
        assert!(b.recommendations.is_empty(), "{:?}", b.recommendations);
        assert!(b.deficits().is_empty());
    }

    #[test]
    fn test_push_heavy_week() {
        let b = balance(&[("bench_press", 4), ("overhead_press", 4), ("pull_up", 2)]);
        assert_eq!(b.push_pull_ratio, Some(4.0));
        assert_eq!(b.push_pull, PairStatus::High);
        assert!(b.recommendations.iter().any(|r| r.contains("push:pull 4.00:1")));

        let deficits = b.deficits();
        assert_eq!(deficits[0].pattern, Pattern::Pull);
        assert_eq!(deficits[0].needed_sets, 6);
        assert_eq!(deficits[0].priority, 10);
    }

    #[test]
    fn test_missing_side_and_empty_pairs() {
        let b = balance(&[("back_squat", 4)]);
        assert_eq!(b.quad_hip_ratio, None);
        assert_eq!(b.quad_hip, PairStatus::High);
        assert_eq!(b.push_pull, PairStatus::Empty);
        // quad heavy, no unilateral, no core
        assert_eq!(b.score, 100 - 15 - 10 - 5);
        assert_eq!(b.assessment, Assessment::NeedsAttention);

        let deficits = b.deficits();
        assert_eq!(deficits[0].pattern, Pattern::HipDominant);
        assert!(deficits.iter().any(|d| d.unilateral && d.needed_sets == 2));
        assert!(deficits.iter().any(|d| d.pattern == Pattern::Core && d.needed_sets == 3));
    }

    #[test]
    fn test_conditioning_and_unknown_lines() {
        let mut lines = vec![line("burpee", 5), line("not_in_catalog", 4)];
        lines[0].kind = BlockKind::Conditioning;
        let b = MovementBalance::of(get_default_catalog(), &lines);
        assert_eq!(b.conditioning_sets, 5);
        assert_eq!(b.strength_sets(), 0);
        assert_eq!(b.score, 100);
    }

    #[test]
    fn test_vertical_pull_correctives() {
        let week = week_of(&[("barbell_row", 6), ("bench_press", 3), ("overhead_press", 3)]);
        let b = MovementBalance::of_week(get_default_catalog(), &week);
        let deficit = b
            .deficits()
            .into_iter()
            .find(|d| d.plane == Some(Plane::Vertical))
            .unwrap();
        assert_eq!(deficit.pattern, Pattern::Pull);

        let selector = Selector::new(get_default_catalog());
        let picks = corrective_candidates(&selector, &deficit, &base());
        assert!(!picks.is_empty());
        for ex in picks {
            assert_eq!(ex.movement, MovementType::Pull);
            assert_eq!(plane_of(ex), Some(Plane::Vertical), "{}", ex.name);
        }
    }

    #[test]
    fn test_correctives_for_week() {
        let week = week_of(&[("bench_press", 4), ("dumbbell_bench_press", 4), ("back_squat", 4)]);
        let selector = Selector::new(get_default_catalog());
        let picks = correctives_for_week(&selector, &week, &base());

        assert!(!picks.is_empty() && picks.len() <= MAX_CORRECTIVES);
        assert_eq!(picks[0].exercise.movement, MovementType::Pull);
        let mut ids: Vec<_> = picks.iter().map(|c| c.exercise.id.as_str()).collect();
        assert!(!ids.contains(&"bench_press") && !ids.contains(&"back_squat"));
        ids.dedup();
        assert_eq!(ids.len(), picks.len());
    }

    #[test]
    fn test_balanced_week_needs_no_correctives() {
        let week = week_of(&[
            ("bench_press", 3),
            ("overhead_press", 3),
            ("barbell_row", 3),
            ("pull_up", 3),
            ("back_squat", 3),
            ("walking_lunge", 3),
            ("romanian_deadlift", 3),
            ("hip_thrust", 3),
            ("plank", 3),
        ]);
        let selector = Selector::new(get_default_catalog());
        assert!(correctives_for_week(&selector, &week, &base()).is_empty());
    }

    #[test]
    fn test_generated_program_balance() {
        let request = ProgramRequest::new(AthleteProfile::new(Goal::Hypertrophy, 4, 4));
        let program = generate(get_default_catalog(), &request).unwrap().program;
        let b = MovementBalance::of_program(get_default_catalog(), &program);
        assert!(b.push_sets > 0 && b.pull_sets > 0);
        assert!(b.quad_sets + b.hip_sets > 0);
        assert!(b.score <= 100);
    }
}
