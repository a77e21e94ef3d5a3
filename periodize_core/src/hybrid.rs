//! Hybrid assembler: compound-biased strength work plus circuit stations.

use crate::assembler::{
    conditioning_picks, selector_days, split_days, Blueprint, ConditioningStyle, PlannedLine,
    ProgramAssembler, ProgramRequest,
};
use crate::selector::Selector;
use crate::Split;
use std::collections::BTreeSet;

/// Circuit stations appended to every day
pub const CIRCUIT_STATIONS: usize = 2;

pub struct HybridAssembler;

fn hybrid_split(sessions: u32) -> Split {
    if sessions <= 3 {
        Split::FullBody
    } else {
        Split::UpperLower
    }
}

impl ProgramAssembler for HybridAssembler {
    fn name(&self) -> &'static str {
        "hybrid"
    }

    fn blueprint(
        &self,
        request: &ProgramRequest,
        selector: &Selector<'_>,
        warnings: &mut Vec<String>,
    ) -> Blueprint {
        let sessions = request.profile.sessions_per_week;
        let split = request.split.unwrap_or_else(|| hybrid_split(sessions));
        let base = request.base_criteria();
        let mut days = selector_days(
            selector,
            &split_days(split, sessions),
            &base,
            true,
            warnings,
        );

        if request.include_conditioning {
            let mut rotation = BTreeSet::new();
            for day in days.iter_mut() {
                let picks =
                    conditioning_picks(selector, &base, CIRCUIT_STATIONS, &mut rotation, warnings);
                day.lines.extend(
                    picks
                        .into_iter()
                        .map(|ex| PlannedLine::conditioning(ex, ConditioningStyle::Circuit)),
                );
            }
        }

        Blueprint {
            split_name: format!("hybrid_{split}"),
            days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::{AthleteProfile, BlockKind, DayType, Goal};

    fn blueprint(sessions: u32) -> Blueprint {
        let request = ProgramRequest::new(AthleteProfile::new(Goal::Hybrid, 8, sessions));
        let selector = Selector::new(get_default_catalog());
        let mut warnings = Vec::new();
        HybridAssembler.blueprint(&request, &selector, &mut warnings)
    }

    #[test]
    fn test_split_by_sessions() {
        assert_eq!(blueprint(3).days[0].day_type, DayType::FullBody);
        let four = blueprint(4);
        assert_eq!(four.split_name, "hybrid_upper_lower");
        assert_eq!(four.days[1].day_type, DayType::Lower);
    }

    #[test]
    fn test_every_day_has_circuit_stations() {
        for day in &blueprint(4).days {
            let circuit: Vec<_> = day
                .lines
                .iter()
                .filter(|l| l.conditioning == Some(ConditioningStyle::Circuit))
                .collect();
            assert_eq!(circuit.len(), CIRCUIT_STATIONS, "{}", day.name);
            assert!(circuit.iter().all(|l| l.kind == BlockKind::Conditioning));
        }
    }

    #[test]
    fn test_strength_slots_prefer_compounds() {
        let bp = blueprint(2);
        let catalog = get_default_catalog();
        let strength: Vec<_> = bp.days[0]
            .lines
            .iter()
            .filter(|l| l.kind != BlockKind::Conditioning)
            .collect();
        let compound = strength
            .iter()
            .filter(|l| catalog.get(&l.exercise_id).is_some_and(|e| e.is_compound()))
            .count();
        assert!(compound * 2 > strength.len());
    }
}
