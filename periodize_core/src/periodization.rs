//! Periodization planner: the macro/meso/microcycle skeleton.
//!
//! Given total weeks, sessions per week, goal and a deload interval, the
//! planner partitions the weeks across the goal's phase template, inserts
//! deload weeks on the cadence and ramps the weekly modifiers. It has no
//! inputs besides its arguments and no side effects besides logging.

use crate::{Error, Goal, Macrocycle, Mesocycle, Microcycle, PhaseTag, Result, MAX_PLAN_WEEKS};

/// Volume multiplier applied to every deload week.
pub const DELOAD_VOLUME_MODIFIER: f64 = 0.5;
/// Intensity multiplier applied to every deload week.
pub const DELOAD_INTENSITY_MODIFIER: f64 = 0.65;
/// Plans shorter than this get no deload at all.
pub const MIN_WEEKS_FOR_DELOAD: u32 = 4;
/// Default cadence (a deload every fourth week).
pub const DEFAULT_DELOAD_INTERVAL: u32 = 4;

const MIN_PHASE_WEEKS: u32 = 2;
const RAMP_INTENSITY: (f64, f64) = (0.94, 1.00);
const RAMP_VOLUME: (f64, f64) = (1.05, 0.95);

/// One phase of a goal template
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseSpec {
    pub name: &'static str,
    pub tag: PhaseTag,
    /// Share of the non-tail weeks
    pub share: f64,
    pub intensity_percent: f64,
    pub volume_percent: f64,
}

/// Ordered phases for a goal, optionally closed by a one-week deload tail
#[derive(Clone, Copy, Debug)]
pub struct GoalTemplate {
    pub phases: &'static [PhaseSpec],
    pub deload_tail: bool,
}

impl GoalTemplate {
    /// Weeks needed to give every phase its minimum length
    pub fn full_cycle_weeks(&self) -> u32 {
        self.phases.len() as u32 * MIN_PHASE_WEEKS + u32::from(self.deload_tail)
    }
}

const fn phase(
    name: &'static str,
    tag: PhaseTag,
    share: f64,
    intensity_percent: f64,
    volume_percent: f64,
) -> PhaseSpec {
    PhaseSpec {
        name,
        tag,
        share,
        intensity_percent,
        volume_percent,
    }
}

const STRENGTH_PHASES: [PhaseSpec; 3] = [
    phase("Accumulation", PhaseTag::Hypertrophy, 0.40, 70.0, 100.0),
    phase("Intensification", PhaseTag::Strength, 0.35, 82.0, 90.0),
    phase("Peaking", PhaseTag::Peaking, 0.25, 92.0, 60.0),
];

const HYPERTROPHY_PHASES: [PhaseSpec; 1] =
    [phase("Accumulation", PhaseTag::Hypertrophy, 1.0, 70.0, 100.0)];

const COMPETITION_PHASES: [PhaseSpec; 3] = [
    phase("Accumulation", PhaseTag::Hypertrophy, 0.50, 72.0, 100.0),
    phase("Transmutation", PhaseTag::Strength, 0.33, 82.0, 85.0),
    phase("Realization", PhaseTag::Peaking, 0.17, 92.0, 55.0),
];

const FAT_LOSS_PHASES: [PhaseSpec; 3] = [
    phase("Adaptation", PhaseTag::Hypertrophy, 0.20, 62.0, 100.0),
    phase("Metabolic", PhaseTag::Hypertrophy, 0.50, 67.0, 110.0),
    phase("Strength Retention", PhaseTag::Strength, 0.30, 75.0, 85.0),
];

const HYBRID_PHASES: [PhaseSpec; 3] = [
    phase("General", PhaseTag::Hypertrophy, 0.40, 68.0, 100.0),
    phase("Specific", PhaseTag::Strength, 0.35, 78.0, 90.0),
    phase("Power", PhaseTag::Power, 0.25, 85.0, 75.0),
];

const COLLAPSED_PHASES: [PhaseSpec; 1] =
    [phase("Intensification", PhaseTag::Strength, 1.0, 80.0, 90.0)];

/// Phase template keyed by goal
pub fn goal_template(goal: Goal) -> GoalTemplate {
    match goal {
        Goal::Strength => GoalTemplate {
            phases: &STRENGTH_PHASES,
            deload_tail: true,
        },
        Goal::Hypertrophy => GoalTemplate {
            phases: &HYPERTROPHY_PHASES,
            deload_tail: false,
        },
        Goal::Competition => GoalTemplate {
            phases: &COMPETITION_PHASES,
            deload_tail: true,
        },
        Goal::FatLoss => GoalTemplate {
            phases: &FAT_LOSS_PHASES,
            deload_tail: false,
        },
        Goal::Hybrid => GoalTemplate {
            phases: &HYBRID_PHASES,
            deload_tail: false,
        },
    }
}

/// Build the phase skeleton for a plan
///
/// Every week `1..=total_weeks` lands in exactly one microcycle of exactly
/// one mesocycle. Deloads fall on multiples of `deload_interval`, never on
/// the first week, and on the final week only when the template closes with
/// a deload tail or the plan is too short to place one anywhere else.
pub fn plan(
    total_weeks: u32,
    sessions_per_week: u32,
    goal: Goal,
    deload_interval: u32,
) -> Result<Macrocycle> {
    if total_weeks == 0 || total_weeks > MAX_PLAN_WEEKS {
        return Err(Error::invalid(format!(
            "total weeks must be between 1 and {MAX_PLAN_WEEKS}, got {total_weeks}"
        )));
    }
    if !(1..=7).contains(&sessions_per_week) {
        return Err(Error::invalid(format!(
            "sessions per week must be between 1 and 7, got {sessions_per_week}"
        )));
    }
    if deload_interval < 2 {
        return Err(Error::invalid(format!(
            "deload interval must be at least 2 weeks, got {deload_interval}"
        )));
    }

    let mut warnings = Vec::new();
    let template = goal_template(goal);
    let deloads_allowed = total_weeks >= MIN_WEEKS_FOR_DELOAD;

    let (phases, tail): (&[PhaseSpec], bool) = if total_weeks < template.full_cycle_weeks() {
        warnings.push(format!(
            "{total_weeks} weeks is shorter than a full {goal} cycle ({} weeks); using a single intensification block",
            template.full_cycle_weeks()
        ));
        (&COLLAPSED_PHASES, deloads_allowed)
    } else {
        (template.phases, template.deload_tail && deloads_allowed)
    };

    let body_weeks = total_weeks - u32::from(tail);
    let lengths = partition(body_weeks, phases);

    let deloads = deload_weeks(total_weeks, body_weeks, tail, deload_interval);
    if deloads_allowed && total_weeks % deload_interval != 0 {
        warnings.push(format!(
            "deload interval of {deload_interval} weeks does not divide {total_weeks} weeks evenly"
        ));
    }

    let mut mesocycles = Vec::with_capacity(phases.len() + 1);
    let mut start = 1;
    for (spec, weeks) in phases.iter().zip(&lengths) {
        let end = start + weeks - 1;
        if *weeks < MIN_PHASE_WEEKS && phases.len() > 1 {
            warnings.push(format!("phase '{}' spans only {weeks} week", spec.name));
        }
        mesocycles.push(build_mesocycle(spec, start, end, &deloads));
        start = end + 1;
    }

    if tail {
        let last = phases[phases.len() - 1];
        let mut meso = build_mesocycle(&last, total_weeks, total_weeks, &[total_weeks]);
        meso.name = "Deload".into();
        meso.phase = PhaseTag::Deload;
        meso.rpe = PhaseTag::Deload.default_rpe();
        mesocycles.push(meso);
    }

    tracing::info!(
        %goal,
        total_weeks,
        phases = mesocycles.len(),
        deloads = ?deloads,
        "Built periodization plan"
    );

    Ok(Macrocycle {
        goal,
        total_weeks,
        sessions_per_week,
        deload_interval,
        mesocycles,
        warnings,
    })
}

/// Split `body_weeks` across phases by share; the last phase takes the remainder
fn partition(body_weeks: u32, phases: &[PhaseSpec]) -> Vec<u32> {
    let n = phases.len();
    let mut lengths: Vec<u32> = phases
        .iter()
        .map(|p| ((body_weeks as f64 * p.share).floor() as u32).max(1))
        .collect();

    // Leave at least one week for the last phase
    loop {
        let head: u32 = lengths[..n - 1].iter().sum();
        if head < body_weeks {
            lengths[n - 1] = body_weeks - head;
            break;
        }
        match lengths[..n - 1]
            .iter_mut()
            .filter(|w| **w > 1)
            .max_by_key(|w| **w)
        {
            Some(largest) => *largest -= 1,
            None => {
                lengths[n - 1] = body_weeks.saturating_sub(head).max(1);
                break;
            }
        }
    }
    lengths
}

fn deload_weeks(total_weeks: u32, body_weeks: u32, tail: bool, interval: u32) -> Vec<u32> {
    if total_weeks < MIN_WEEKS_FOR_DELOAD {
        return Vec::new();
    }

    let mut weeks: Vec<u32> = (1..)
        .map(|k| k * interval)
        .take_while(|w| *w < total_weeks)
        .filter(|w| *w > 1 && *w <= body_weeks)
        // Avoid two deload weeks back to back before the tail
        .filter(|w| !(tail && *w + 1 == total_weeks))
        .collect();

    if tail {
        weeks.push(total_weeks);
    } else if weeks.is_empty() && total_weeks >= interval {
        // Too short to keep the deload off the final week
        weeks.push(total_weeks);
    }
    weeks
}

fn build_mesocycle(spec: &PhaseSpec, start: u32, end: u32, deloads: &[u32]) -> Mesocycle {
    let normal: Vec<u32> = (start..=end).filter(|w| !deloads.contains(w)).collect();
    let microcycles = (start..=end)
        .map(|week| {
            if deloads.contains(&week) {
                Microcycle {
                    week,
                    is_deload: true,
                    volume_modifier: DELOAD_VOLUME_MODIFIER,
                    intensity_modifier: DELOAD_INTENSITY_MODIFIER,
                }
            } else {
                let idx = normal.iter().position(|w| *w == week).unwrap_or(0);
                let t = if normal.len() > 1 {
                    idx as f64 / (normal.len() - 1) as f64
                } else {
                    1.0
                };
                Microcycle {
                    week,
                    is_deload: false,
                    volume_modifier: ramp(RAMP_VOLUME, t),
                    intensity_modifier: ramp(RAMP_INTENSITY, t),
                }
            }
        })
        .collect();

    Mesocycle {
        name: spec.name.to_string(),
        phase: spec.tag,
        start_week: start,
        end_week: end,
        volume_percent: spec.volume_percent,
        intensity_percent: spec.intensity_percent,
        rpe: spec.tag.default_rpe(),
        microcycles,
    }
}

fn ramp((from, to): (f64, f64), t: f64) -> f64 {
    ((from + (to - from) * t) * 1000.0).round() / 1000.0
}

impl Macrocycle {
    /// Mesocycle and microcycle for a week number
    pub fn microcycle(&self, week: u32) -> Option<(&Mesocycle, &Microcycle)> {
        self.mesocycles.iter().find_map(|meso| {
            meso.microcycles
                .iter()
                .find(|m| m.week == week)
                .map(|micro| (meso, micro))
        })
    }

    pub fn mesocycle_for(&self, week: u32) -> Option<&Mesocycle> {
        self.mesocycles.iter().find(|m| m.contains(week))
    }

    pub fn microcycles(&self) -> impl Iterator<Item = &Microcycle> {
        self.mesocycles.iter().flat_map(|m| m.microcycles.iter())
    }

    pub fn deload_weeks(&self) -> Vec<u32> {
        self.microcycles()
            .filter(|m| m.is_deload)
            .map(|m| m.week)
            .collect()
    }
}
