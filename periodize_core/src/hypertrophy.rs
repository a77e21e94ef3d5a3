//! Hypertrophy assembler: selector-filled days on a classic body-part split.

use crate::assembler::{selector_days, split_days, Blueprint, ProgramAssembler, ProgramRequest};
use crate::selector::Selector;
use crate::Split;

/// Split used when the request does not name one
pub fn default_split(sessions_per_week: u32) -> Split {
    match sessions_per_week {
        0..=3 => Split::FullBody,
        4 => Split::UpperLower,
        _ => Split::PushPullLegs,
    }
}

pub struct HypertrophyAssembler;

impl ProgramAssembler for HypertrophyAssembler {
    fn name(&self) -> &'static str {
        "hypertrophy"
    }

    fn blueprint(
        &self,
        request: &ProgramRequest,
        selector: &Selector<'_>,
        warnings: &mut Vec<String>,
    ) -> Blueprint {
        let sessions = request.profile.sessions_per_week;
        let split = request.split.unwrap_or_else(|| default_split(sessions));
        let days = split_days(split, sessions);

        tracing::debug!(%split, sessions, "Building hypertrophy days");

        Blueprint {
            split_name: split.to_string(),
            days: selector_days(selector, &days, &request.base_criteria(), false, warnings),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::{AthleteProfile, DayType, Goal};

    fn blueprint(sessions: u32, split: Option<Split>) -> Blueprint {
        let mut request = ProgramRequest::new(AthleteProfile::new(Goal::Hypertrophy, 8, sessions));
        request.split = split;
        let selector = Selector::new(get_default_catalog());
        let mut warnings = Vec::new();
        HypertrophyAssembler.blueprint(&request, &selector, &mut warnings)
    }

    #[test]
    fn test_default_splits() {
        assert_eq!(default_split(2), Split::FullBody);
        assert_eq!(default_split(4), Split::UpperLower);
        assert_eq!(default_split(6), Split::PushPullLegs);
        assert_eq!(blueprint(3, None).split_name, "full_body");
        assert_eq!(blueprint(5, None).days[2].day_type, DayType::Legs);
    }

    #[test]
    fn test_requested_split_wins() {
        let bp = blueprint(4, Some(Split::PushPullLegs));
        assert_eq!(bp.split_name, "push_pull_legs");
        assert_eq!(bp.days.len(), 4);
        assert_eq!(bp.days[3].day_type, DayType::Push);
    }

    #[test]
    fn test_one_line_per_slot() {
        let bp = blueprint(4, None);
        for day in &bp.days {
            assert_eq!(day.lines.len(), 6, "{}", day.name);
        }
    }
}
