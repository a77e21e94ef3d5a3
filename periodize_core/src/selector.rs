//! Exercise selection for day-split slots.
//!
//! Filters the injected catalog by equipment, movement, muscle, difficulty
//! and contraindications, ranks what is left, and relaxes the criteria
//! step by step when a slot comes up empty. Selection never fails: the
//! last resort assumes a full gym and says so in the warnings.

use crate::types::normalize_tag;
use crate::{Catalog, DayType, Equipment, Exercise, ExperienceLevel, MovementType, MuscleGroup};
use std::collections::BTreeSet;

/// Filters for a single pick
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionCriteria {
    pub movement: Option<MovementType>,
    pub primary_muscle: Option<MuscleGroup>,
    pub equipment: BTreeSet<Equipment>,
    pub max_difficulty: ExperienceLevel,
    pub require_compound: bool,
    pub exclude: BTreeSet<String>,
    /// Athlete restriction tags matched against exercise contraindications
    pub restrictions: Vec<String>,
    /// Treat every slot as compound-required (relaxed like any other requirement)
    pub compound_bias: bool,
}

impl SelectionCriteria {
    pub fn new(equipment: BTreeSet<Equipment>, max_difficulty: ExperienceLevel) -> Self {
        Self {
            movement: None,
            primary_muscle: None,
            equipment,
            max_difficulty,
            require_compound: false,
            exclude: BTreeSet::new(),
            restrictions: Vec::new(),
            compound_bias: false,
        }
    }

    pub fn slot(mut self, slot: &SlotPattern) -> Self {
        self.movement = slot.movement;
        self.primary_muscle = Some(slot.muscle);
        self.require_compound = slot.compound || self.compound_bias;
        self
    }

    pub fn matches(&self, ex: &Exercise) -> bool {
        if let Some(movement) = self.movement {
            if ex.movement != movement {
                return false;
            }
        }
        if let Some(muscle) = self.primary_muscle {
            if ex.primary_muscle != muscle {
                return false;
            }
        }
        if !ex.fits_equipment(&self.equipment) {
            return false;
        }
        if ex.difficulty > self.max_difficulty {
            return false;
        }
        if self.require_compound && !ex.is_compound() {
            return false;
        }
        if self.exclude.contains(&ex.id) {
            return false;
        }
        !self.restrictions.iter().any(|r| {
            let r = normalize_tag(r);
            ex.contraindications.iter().any(|c| normalize_tag(c) == r)
        })
    }
}

/// Which criterion had to give way for a slot to be filled
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relaxation {
    Compound,
    Movement,
    FullGym,
}

#[derive(Clone, Debug)]
pub struct Selection<'a> {
    pub exercise: &'a Exercise,
    pub slot: SlotPattern,
    pub relaxed: Option<Relaxation>,
}

/// A movement slot in a day template
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotPattern {
    /// None lets any movement fill the slot (e.g. calves)
    pub movement: Option<MovementType>,
    pub muscle: MuscleGroup,
    pub compound: bool,
}

impl SlotPattern {
    pub const fn new(movement: MovementType, muscle: MuscleGroup, compound: bool) -> Self {
        Self {
            movement: Some(movement),
            muscle,
            compound,
        }
    }
}

const fn slot(movement: MovementType, muscle: MuscleGroup, compound: bool) -> SlotPattern {
    SlotPattern::new(movement, muscle, compound)
}

const PUSH_SLOTS: [SlotPattern; 4] = [
    slot(MovementType::Push, MuscleGroup::Chest, true),
    slot(MovementType::Push, MuscleGroup::Shoulders, true),
    slot(MovementType::Push, MuscleGroup::Chest, false),
    slot(MovementType::Push, MuscleGroup::Triceps, false),
];

const PULL_SLOTS: [SlotPattern; 4] = [
    slot(MovementType::Pull, MuscleGroup::Back, true),
    slot(MovementType::Pull, MuscleGroup::Back, true),
    slot(MovementType::Pull, MuscleGroup::RearDelts, false),
    slot(MovementType::Pull, MuscleGroup::Biceps, false),
];

const LEG_SLOTS: [SlotPattern; 6] = [
    slot(MovementType::Squat, MuscleGroup::Quads, true),
    slot(MovementType::Hinge, MuscleGroup::Hamstrings, true),
    slot(MovementType::Lunge, MuscleGroup::Glutes, true),
    slot(MovementType::Squat, MuscleGroup::Quads, false),
    slot(MovementType::Hinge, MuscleGroup::Hamstrings, false),
    SlotPattern {
        movement: None,
        muscle: MuscleGroup::Calves,
        compound: false,
    },
];

const UPPER_SLOTS: [SlotPattern; 6] = [
    slot(MovementType::Push, MuscleGroup::Chest, true),
    slot(MovementType::Pull, MuscleGroup::Back, true),
    slot(MovementType::Push, MuscleGroup::Shoulders, true),
    slot(MovementType::Pull, MuscleGroup::Back, false),
    slot(MovementType::Push, MuscleGroup::Triceps, false),
    slot(MovementType::Pull, MuscleGroup::Biceps, false),
];

const FULL_BODY_SLOTS: [SlotPattern; 6] = [
    slot(MovementType::Squat, MuscleGroup::Quads, true),
    slot(MovementType::Push, MuscleGroup::Chest, true),
    slot(MovementType::Pull, MuscleGroup::Back, true),
    slot(MovementType::Hinge, MuscleGroup::Hamstrings, true),
    slot(MovementType::Push, MuscleGroup::Shoulders, false),
    slot(MovementType::Core, MuscleGroup::Core, false),
];

/// Movement slots for a day type; strength and interval days reuse the
/// closest general pattern
pub fn day_patterns(day: DayType) -> &'static [SlotPattern] {
    match day {
        DayType::Push | DayType::Bench | DayType::Press => &PUSH_SLOTS,
        DayType::Pull => &PULL_SLOTS,
        DayType::Legs | DayType::Lower | DayType::Squat | DayType::Deadlift => &LEG_SLOTS,
        DayType::Upper => &UPPER_SLOTS,
        DayType::FullBody | DayType::Intervals => &FULL_BODY_SLOTS,
    }
}

/// Ranks and picks exercises from an injected catalog
pub struct Selector<'a> {
    catalog: &'a Catalog,
}

impl<'a> Selector<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn candidates(&self, criteria: &SelectionCriteria) -> Vec<&'a Exercise> {
        self.catalog.iter().filter(|e| criteria.matches(e)).collect()
    }

    /// Free weights +2, barbell +1, compound when required +3, bilateral +1
    pub fn score(ex: &Exercise, criteria: &SelectionCriteria) -> i32 {
        let mut score = 0;
        if ex.uses_free_weight() {
            score += 2;
        }
        if ex.equipment.contains(&Equipment::Barbell) {
            score += 1;
        }
        if criteria.require_compound && ex.is_compound() {
            score += 3;
        }
        if ex.bilateral {
            score += 1;
        }
        score
    }

    /// Best match, ties broken by id
    pub fn select(&self, criteria: &SelectionCriteria) -> Option<&'a Exercise> {
        // Catalog iteration is id-ordered, so the first of equal scores wins
        self.candidates(criteria)
            .into_iter()
            .fold(None, |best: Option<(&'a Exercise, i32)>, ex| {
                let score = Self::score(ex, criteria);
                match best {
                    Some((_, s)) if s >= score => best,
                    _ => Some((ex, score)),
                }
            })
            .map(|(ex, _)| ex)
    }

    /// Pick for a slot, relaxing compound, then movement, then equipment
    pub fn select_with_fallback(
        &self,
        criteria: &SelectionCriteria,
        warnings: &mut Vec<String>,
    ) -> Option<(&'a Exercise, Option<Relaxation>)> {
        if let Some(ex) = self.select(criteria) {
            return Some((ex, None));
        }

        let mut relaxed = criteria.clone();
        if relaxed.require_compound {
            relaxed.require_compound = false;
            if let Some(ex) = self.select(&relaxed) {
                tracing::debug!(exercise = %ex.id, "Relaxed compound requirement");
                return Some((ex, Some(Relaxation::Compound)));
            }
        }

        if relaxed.movement.is_some() {
            relaxed.movement = None;
            if let Some(ex) = self.select(&relaxed) {
                tracing::debug!(exercise = %ex.id, "Relaxed movement type");
                return Some((ex, Some(Relaxation::Movement)));
            }
        }

        let mut full_gym = criteria.clone();
        full_gym.equipment = Equipment::full_gym();
        let picked = self.select(&full_gym).or_else(|| {
            full_gym.require_compound = false;
            full_gym.movement = None;
            self.select(&full_gym)
        });

        match picked {
            Some(ex) => {
                warnings.push(format!(
                    "Not enough equipment for a {} slot; assuming a full gym for {}",
                    muscle_label(criteria.primary_muscle),
                    ex.name
                ));
                tracing::warn!(exercise = %ex.id, "Assumed full gym for slot");
                Some((ex, Some(Relaxation::FullGym)))
            }
            None => {
                warnings.push(format!(
                    "No exercise in the catalog fits the {} slot; slot skipped",
                    muscle_label(criteria.primary_muscle)
                ));
                None
            }
        }
    }

    /// Fill every slot of a day, never repeating an exercise within the day
    pub fn select_day(
        &self,
        day: DayType,
        base: &SelectionCriteria,
        warnings: &mut Vec<String>,
    ) -> Vec<Selection<'a>> {
        let base = self.usable_equipment(base, warnings);
        let mut used: BTreeSet<String> = BTreeSet::new();
        let mut picks = Vec::new();

        for slot in day_patterns(day) {
            let mut criteria = base.clone().slot(slot);
            criteria.exclude.extend(used.iter().cloned());

            if let Some((exercise, relaxed)) = self.select_with_fallback(&criteria, warnings) {
                used.insert(exercise.id.clone());
                picks.push(Selection {
                    exercise,
                    slot: *slot,
                    relaxed,
                });
            }
        }
        picks
    }

    /// An empty equipment list is read as "unknown" and becomes a full gym
    pub fn usable_equipment(
        &self,
        criteria: &SelectionCriteria,
        warnings: &mut Vec<String>,
    ) -> SelectionCriteria {
        let mut criteria = criteria.clone();
        if criteria.equipment.is_empty() {
            let msg = "No equipment listed; assuming a full gym".to_string();
            if !warnings.contains(&msg) {
                warnings.push(msg);
            }
            criteria.equipment = Equipment::full_gym();
        }
        criteria
    }
}

fn muscle_label(muscle: Option<MuscleGroup>) -> String {
    match muscle {
        Some(m) => format!("{:?}", m).to_lowercase(),
        None => "general".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;

    fn base(equipment: &[Equipment]) -> SelectionCriteria {
        SelectionCriteria::new(
            equipment.iter().copied().collect(),
            ExperienceLevel::Intermediate,
        )
    }

    #[test]
    fn test_classic_lifts_win_with_full_gym() {
        let selector = Selector::new(get_default_catalog());
        let mut warnings = Vec::new();
        let picks = selector.select_day(DayType::FullBody, &base(&Equipment::ALL), &mut warnings);
        let ids: Vec<&str> = picks.iter().map(|p| p.exercise.id.as_str()).collect();
        assert_eq!(ids[0], "back_squat");
        assert_eq!(ids[1], "bench_press");
        assert_eq!(ids[2], "barbell_row");
        assert_eq!(ids[3], "deadlift");
        assert!(warnings.is_empty(), "{warnings:?}");
    }

    #[test]
    fn test_no_duplicates_within_day() {
        let selector = Selector::new(get_default_catalog());
        for day in [
            DayType::Push,
            DayType::Pull,
            DayType::Legs,
            DayType::Upper,
            DayType::FullBody,
        ] {
            let mut warnings = Vec::new();
            let picks = selector.select_day(day, &base(&[Equipment::Dumbbell]), &mut warnings);
            let ids: BTreeSet<&str> = picks.iter().map(|p| p.exercise.id.as_str()).collect();
            assert_eq!(ids.len(), picks.len(), "{day:?} repeated an exercise");
            assert_eq!(picks.len(), day_patterns(day).len());
        }
    }

    #[test]
    fn test_equipment_respected() {
        let selector = Selector::new(get_default_catalog());
        let criteria = base(&[Equipment::Dumbbell, Equipment::Bench]);
        let mut warnings = Vec::new();
        for pick in selector.select_day(DayType::Push, &criteria, &mut warnings) {
            if pick.relaxed != Some(Relaxation::FullGym) {
                assert!(pick.exercise.fits_equipment(&criteria.equipment));
            }
        }
    }

    #[test]
    fn test_fallback_assumes_full_gym_with_warning() {
        let selector = Selector::new(get_default_catalog());
        // Bands only: no back exercise fits even after relaxing
        let mut criteria = base(&[Equipment::Bands]).slot(&PULL_SLOTS[0]);
        criteria.max_difficulty = ExperienceLevel::Beginner;
        let mut warnings = Vec::new();
        let (ex, relaxed) = selector
            .select_with_fallback(&criteria, &mut warnings)
            .unwrap();
        assert_eq!(relaxed, Some(Relaxation::FullGym));
        assert_eq!(ex.id, "barbell_row");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_empty_equipment_means_full_gym() {
        let selector = Selector::new(get_default_catalog());
        let mut warnings = Vec::new();
        let picks = selector.select_day(DayType::Legs, &base(&[]), &mut warnings);
        assert_eq!(picks[0].exercise.id, "back_squat");
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("full gym"));
    }

    #[test]
    fn test_restrictions_and_difficulty() {
        let selector = Selector::new(get_default_catalog());
        let mut criteria = base(&Equipment::ALL).slot(&PUSH_SLOTS[0]);
        criteria.restrictions = vec!["Shoulder".into()];
        let ex = selector.select(&criteria).unwrap();
        assert!(ex.contraindications.is_empty());

        let mut beginner = base(&Equipment::ALL).slot(&LEG_SLOTS[2]);
        beginner.max_difficulty = ExperienceLevel::Beginner;
        let ex = selector.select(&beginner).unwrap();
        assert_eq!(ex.difficulty, ExperienceLevel::Beginner);
    }

    #[test]
    fn test_scoring() {
        let catalog = get_default_catalog();
        let criteria = base(&Equipment::ALL).slot(&PUSH_SLOTS[0]);
        let bench = catalog.get("bench_press").unwrap();
        let push_up = catalog.get("push_up").unwrap();
        assert_eq!(Selector::score(bench, &criteria), 7);
        assert_eq!(Selector::score(push_up, &criteria), 4);
    }
}
