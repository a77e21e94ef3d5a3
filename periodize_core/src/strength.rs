//! Strength assembler: days built around the barbell competition lifts.
//!
//! Squat, bench press, deadlift and overhead press carry the heavy work;
//! from four sessions upward secondary days repeat a lift at the light-day
//! factor. Accessories come from the selector. The competition goal uses
//! the same layout.

use crate::assembler::{
    accessories_for, push_unique, Blueprint, DayPlan, PlannedLine, ProgramAssembler,
    ProgramRequest,
};
use crate::selector::{SelectionCriteria, Selector, SlotPattern};
use crate::{DayType, MovementType, MuscleGroup};
use std::collections::BTreeSet;

/// A main barbell lift
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MainLift {
    Squat,
    Bench,
    Deadlift,
    Press,
}

impl MainLift {
    pub fn exercise_id(&self) -> &'static str {
        match self {
            MainLift::Squat => "back_squat",
            MainLift::Bench => "bench_press",
            MainLift::Deadlift => "deadlift",
            MainLift::Press => "overhead_press",
        }
    }

    fn day_type(&self) -> DayType {
        match self {
            MainLift::Squat => DayType::Squat,
            MainLift::Bench => DayType::Bench,
            MainLift::Deadlift => DayType::Deadlift,
            MainLift::Press => DayType::Press,
        }
    }

    /// Slot used to find a substitute when the lift itself is unavailable
    fn slot(&self) -> SlotPattern {
        match self {
            MainLift::Squat => SlotPattern::new(MovementType::Squat, MuscleGroup::Quads, true),
            MainLift::Bench => SlotPattern::new(MovementType::Push, MuscleGroup::Chest, true),
            MainLift::Deadlift => {
                SlotPattern::new(MovementType::Hinge, MuscleGroup::Hamstrings, true)
            }
            MainLift::Press => SlotPattern::new(MovementType::Push, MuscleGroup::Shoulders, true),
        }
    }

    fn accessories(&self) -> [SlotPattern; 3] {
        use MovementType as M;
        use MuscleGroup as G;
        match self {
            MainLift::Squat => [
                SlotPattern::new(M::Lunge, G::Glutes, true),
                SlotPattern::new(M::Hinge, G::Hamstrings, false),
                SlotPattern::new(M::Core, G::Core, false),
            ],
            MainLift::Bench => [
                SlotPattern::new(M::Pull, G::Back, true),
                SlotPattern::new(M::Push, G::Triceps, false),
                SlotPattern::new(M::Pull, G::RearDelts, false),
            ],
            MainLift::Deadlift => [
                SlotPattern::new(M::Pull, G::Back, true),
                SlotPattern::new(M::Hinge, G::Glutes, false),
                SlotPattern::new(M::Core, G::Core, false),
            ],
            MainLift::Press => [
                SlotPattern::new(M::Pull, G::Back, true),
                SlotPattern::new(M::Push, G::Shoulders, false),
                SlotPattern::new(M::Pull, G::Biceps, false),
            ],
        }
    }
}

const ALL_LIFTS: [MainLift; 4] = [
    MainLift::Squat,
    MainLift::Bench,
    MainLift::Deadlift,
    MainLift::Press,
];

/// Lifts per day, with the light-day flag
pub fn strength_days(sessions: u32) -> Vec<Vec<(MainLift, bool)>> {
    use MainLift::*;
    match sessions {
        0 | 1 => vec![vec![(Squat, false), (Bench, false), (Deadlift, false)]],
        2 => vec![
            vec![(Squat, false), (Bench, false)],
            vec![(Deadlift, false), (Press, false)],
        ],
        n => [
            (Squat, false),
            (Bench, false),
            (Deadlift, false),
            (Bench, true),
            (Press, false),
            (Squat, true),
            (Deadlift, true),
        ]
        .into_iter()
        .take(n as usize)
        .map(|lift| vec![lift])
        .collect(),
    }
}

pub struct StrengthAssembler;

impl StrengthAssembler {
    fn resolve_lift<'a>(
        selector: &Selector<'a>,
        lift: MainLift,
        base: &SelectionCriteria,
        used: &BTreeSet<String>,
        warnings: &mut Vec<String>,
    ) -> Option<&'a crate::Exercise> {
        let mut criteria = base.clone().slot(&lift.slot());
        criteria.exclude.extend(used.iter().cloned());

        let catalog_lift = selector.catalog().get(lift.exercise_id());
        if let Some(ex) = catalog_lift {
            if criteria.matches(ex) {
                return Some(ex);
            }
        }

        let (sub, _) = selector.select_with_fallback(&criteria, warnings)?;
        push_unique(
            warnings,
            format!(
                "{} is not available with this equipment or these restrictions; using {}",
                catalog_lift.map_or(lift.exercise_id(), |ex| ex.name.as_str()),
                sub.name
            ),
        );
        Some(sub)
    }

    fn build_day(
        selector: &Selector<'_>,
        lifts: &[(MainLift, bool)],
        base: &SelectionCriteria,
        warnings: &mut Vec<String>,
    ) -> DayPlan {
        let mut used = BTreeSet::new();
        let mut lines = Vec::new();
        let mut names = Vec::new();

        for (lift, light) in lifts {
            if let Some(ex) = Self::resolve_lift(selector, *lift, base, &used, warnings) {
                used.insert(ex.id.clone());
                lines.push(if *light {
                    PlannedLine::light(ex)
                } else {
                    PlannedLine::main(ex)
                });
                names.push(if *light {
                    format!("{} (light)", ex.name)
                } else {
                    ex.name.clone()
                });
            }
        }

        // Main lifts never double as accessories
        let mut excluded = used.clone();
        excluded.extend(ALL_LIFTS.iter().map(|l| l.exercise_id().to_string()));

        // Full accessory work on a single heavy day, two per lift otherwise
        let per_lift = if lifts.len() == 1 && !lifts[0].1 { 3 } else { 2 };
        let slots: Vec<SlotPattern> = lifts
            .iter()
            .flat_map(|(lift, _)| lift.accessories().into_iter().take(per_lift))
            .collect();
        lines.extend(accessories_for(selector, &slots, base, &mut excluded, warnings));

        let day_type = match lifts {
            [(lift, _)] => lift.day_type(),
            [(first, _), ..] if lifts.len() == 2 => first.day_type(),
            _ => DayType::FullBody,
        };

        DayPlan {
            day_type,
            name: names.join(" + "),
            lines,
        }
    }
}

impl ProgramAssembler for StrengthAssembler {
    fn name(&self) -> &'static str {
        "strength"
    }

    fn blueprint(
        &self,
        request: &ProgramRequest,
        selector: &Selector<'_>,
        warnings: &mut Vec<String>,
    ) -> Blueprint {
        let sessions = request.profile.sessions_per_week;
        let base = selector.usable_equipment(&request.base_criteria(), warnings);
        let days = strength_days(sessions)
            .iter()
            .map(|lifts| Self::build_day(selector, lifts, &base, warnings))
            .collect();

        tracing::debug!(sessions, "Built strength days");

        Blueprint {
            split_name: format!("powerlifting_{sessions}_day"),
            days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::{AthleteProfile, BlockKind, Equipment, Goal};

    fn blueprint(request: &ProgramRequest) -> (Blueprint, Vec<String>) {
        let selector = Selector::new(get_default_catalog());
        let mut warnings = Vec::new();
        let bp = StrengthAssembler.blueprint(request, &selector, &mut warnings);
        (bp, warnings)
    }

    #[test]
    fn test_day_layouts() {
        assert_eq!(strength_days(1)[0].len(), 3);
        assert_eq!(strength_days(2).len(), 2);
        assert_eq!(strength_days(3).len(), 3);
        let four = strength_days(4);
        assert_eq!(four[3], vec![(MainLift::Bench, true)]);
        assert_eq!(strength_days(6)[5], vec![(MainLift::Squat, true)]);
        assert_eq!(strength_days(7).len(), 7);
    }

    #[test]
    fn test_main_lifts_lead_each_day() {
        let request = ProgramRequest::new(AthleteProfile::new(Goal::Strength, 12, 4));
        let (bp, warnings) = blueprint(&request);
        let firsts: Vec<&str> = bp.days.iter().map(|d| d.lines[0].exercise_id.as_str()).collect();
        assert_eq!(firsts, vec!["back_squat", "bench_press", "deadlift", "bench_press"]);
        assert!(bp.days[3].lines[0].role.light_day);
        assert_eq!(bp.days[3].name, "Bench Press (light)");
        assert!(warnings.is_empty(), "{warnings:?}");

        for day in &bp.days {
            assert_eq!(day.lines[0].kind, BlockKind::Main);
            let ids: BTreeSet<&str> = day.lines.iter().map(|l| l.exercise_id.as_str()).collect();
            assert_eq!(ids.len(), day.lines.len(), "duplicate on {}", day.name);
        }
    }

    #[test]
    fn test_substitute_without_barbell() {
        let mut profile = AthleteProfile::new(Goal::Strength, 8, 3);
        profile.equipment = [Equipment::Dumbbell, Equipment::Bench].into_iter().collect();
        let (bp, warnings) = blueprint(&ProgramRequest::new(profile));
        assert_eq!(bp.days[0].lines[0].exercise_id, "goblet_squat");
        assert_eq!(bp.days[1].lines[0].exercise_id, "dumbbell_bench_press");
        assert!(warnings.iter().any(|w| w.contains("Back Squat")));
    }
}
