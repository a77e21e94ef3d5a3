//! Fat-loss assembler: resistance days plus conditioning.
//!
//! Resistance days follow the hypertrophy split for the sessions left after
//! conditioning. With four or more sessions one day becomes a dedicated
//! interval day, and every resistance day ends with a metabolic finisher
//! (skipped on deload weeks).

use crate::assembler::{
    accessories_for, conditioning_picks, selector_days, split_days, Blueprint, ConditioningStyle, DayPlan,
    PlannedLine, ProgramAssembler, ProgramRequest,
};
use crate::hypertrophy::default_split;
use crate::selector::{Selector, SlotPattern};
use crate::{DayType, MovementType, MuscleGroup};
use std::collections::BTreeSet;

/// Sessions needed before one of them becomes an interval day
pub const MIN_SESSIONS_FOR_HIIT_DAY: u32 = 4;

pub struct FatLossAssembler;

impl ProgramAssembler for FatLossAssembler {
    fn name(&self) -> &'static str {
        "fat_loss"
    }

    fn blueprint(
        &self,
        request: &ProgramRequest,
        selector: &Selector<'_>,
        warnings: &mut Vec<String>,
    ) -> Blueprint {
        let sessions = request.profile.sessions_per_week;
        let hiit_day =
            request.include_conditioning && sessions >= MIN_SESSIONS_FOR_HIIT_DAY;
        let lifting_sessions = if hiit_day { sessions - 1 } else { sessions };

        let split = request
            .split
            .unwrap_or_else(|| default_split(lifting_sessions));
        let base = request.base_criteria();
        let mut days = selector_days(
            selector,
            &split_days(split, lifting_sessions),
            &base,
            false,
            warnings,
        );

        let mut rotation = BTreeSet::new();
        if request.include_conditioning {
            for day in days.iter_mut() {
                if let Some(ex) = conditioning_picks(selector, &base, 1, &mut rotation, warnings)
                    .into_iter()
                    .next()
                {
                    day.lines
                        .push(PlannedLine::conditioning(ex, ConditioningStyle::Finisher));
                }
            }
        }

        if hiit_day {
            let mut lines: Vec<PlannedLine> =
                conditioning_picks(selector, &base, 2, &mut rotation, warnings)
                    .into_iter()
                    .map(|ex| PlannedLine::conditioning(ex, ConditioningStyle::Intervals))
                    .collect();
            let core = SlotPattern::new(MovementType::Core, MuscleGroup::Core, false);
            let mut used: BTreeSet<String> = BTreeSet::new();
            lines.extend(accessories_for(selector, &[core], &base, &mut used, warnings));
            days.push(DayPlan {
                day_type: DayType::Intervals,
                name: "HIIT".to_string(),
                lines,
            });
        }

        tracing::debug!(%split, hiit_day, "Built fat-loss days");

        Blueprint {
            split_name: if hiit_day {
                format!("{split}+hiit")
            } else {
                split.to_string()
            },
            days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::{AthleteProfile, BlockKind, Goal};

    fn blueprint(sessions: u32, conditioning: bool) -> Blueprint {
        let mut request = ProgramRequest::new(AthleteProfile::new(Goal::FatLoss, 8, sessions));
        request.include_conditioning = conditioning;
        let selector = Selector::new(get_default_catalog());
        let mut warnings = Vec::new();
        FatLossAssembler.blueprint(&request, &selector, &mut warnings)
    }

    #[test]
    fn test_hiit_day_from_four_sessions() {
        let bp = blueprint(4, true);
        assert_eq!(bp.days.len(), 4);
        let last = bp.days.last().unwrap();
        assert_eq!(last.day_type, DayType::Intervals);
        assert!(last
            .lines
            .iter()
            .any(|l| l.conditioning == Some(ConditioningStyle::Intervals)));
        assert_eq!(bp.split_name, "full_body+hiit");

        let three = blueprint(3, true);
        assert!(three.days.iter().all(|d| d.day_type != DayType::Intervals));
    }

    #[test]
    fn test_finishers_on_lifting_days() {
        let bp = blueprint(3, true);
        for day in &bp.days {
            let last = day.lines.last().unwrap();
            assert_eq!(last.kind, BlockKind::Conditioning);
            assert_eq!(last.conditioning, Some(ConditioningStyle::Finisher));
        }
        // Finishers rotate between days
        let ids: BTreeSet<&str> = bp
            .days
            .iter()
            .map(|d| d.lines.last().unwrap().exercise_id.as_str())
            .collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_conditioning_can_be_disabled() {
        let bp = blueprint(5, false);
        assert_eq!(bp.days.len(), 5);
        assert!(bp
            .days
            .iter()
            .flat_map(|d| d.lines.iter())
            .all(|l| l.kind != BlockKind::Conditioning));
    }
}
