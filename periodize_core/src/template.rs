//! Methodology template catalog.
//!
//! Templates are declarative JSON documents: weeks of workouts, each
//! exercise a list of (percentage of max, reps, sets) tuples. The built-in
//! set is embedded at compile time; more can be loaded from a directory and
//! injected alongside them. Templates are reference data and are never
//! modified by resolution.

use crate::types::normalize_tag;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Target population of a template, bucketed by competition total
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AthleteTier {
    Novice,
    Intermediate,
    Advanced,
    Elite,
}

/// Upper bounds (kg, exclusive) of the novice, intermediate and advanced buckets
pub const TIER_THRESHOLDS_KG: [f64; 3] = [350.0, 500.0, 650.0];

impl AthleteTier {
    /// Bucket a squat + bench + deadlift total
    pub fn from_total(total_kg: f64) -> Self {
        match total_kg {
            t if t < TIER_THRESHOLDS_KG[0] => AthleteTier::Novice,
            t if t < TIER_THRESHOLDS_KG[1] => AthleteTier::Intermediate,
            t if t < TIER_THRESHOLDS_KG[2] => AthleteTier::Advanced,
            _ => AthleteTier::Elite,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AthleteTier::Novice => "novice",
            AthleteTier::Intermediate => "intermediate",
            AthleteTier::Advanced => "advanced",
            AthleteTier::Elite => "elite",
        }
    }
}

impl fmt::Display for AthleteTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AthleteTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_tag(s).as_str() {
            "novice" | "beginner" => Ok(AthleteTier::Novice),
            "intermediate" => Ok(AthleteTier::Intermediate),
            "advanced" => Ok(AthleteTier::Advanced),
            "elite" => Ok(AthleteTier::Elite),
            other => Err(Error::invalid(format!("unknown athlete tier '{other}'"))),
        }
    }
}

/// Discipline a program is filtered to
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LiftType {
    /// All three competition lifts
    #[default]
    Powerlifting,
    Squat,
    Bench,
    Deadlift,
    HipThrust,
}

impl LiftType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LiftType::Powerlifting => "powerlifting",
            LiftType::Squat => "squat",
            LiftType::Bench => "bench",
            LiftType::Deadlift => "deadlift",
            LiftType::HipThrust => "hip_thrust",
        }
    }
}

impl fmt::Display for LiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LiftType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_tag(s).as_str() {
            "powerlifting" | "full" | "all" => Ok(LiftType::Powerlifting),
            "squat" => Ok(LiftType::Squat),
            "bench" | "bench_press" => Ok(LiftType::Bench),
            "deadlift" => Ok(LiftType::Deadlift),
            "hip_thrust" | "hipthrust" => Ok(LiftType::HipThrust),
            other => Err(Error::invalid(format!(
                "unknown lift type '{other}' (expected powerlifting, squat, bench, deadlift, hip_thrust)"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Competition,
    #[default]
    Accessory,
}

impl LineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineKind::Competition => "competition",
            LineKind::Accessory => "accessory",
        }
    }
}

// ============================================================================
// Template Documents
// ============================================================================

/// One (percentage, reps, sets) tuple
///
/// Either `percent` of the athlete's max or an absolute `weight` written
/// for a reference athlete. Bodyweight work leaves both at zero.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TemplateSet {
    #[serde(default)]
    pub percent: f64,
    pub reps: u32,
    /// 0 in the source documents means a single set
    #[serde(default)]
    pub sets: u32,
    #[serde(default)]
    pub weight: f64,
}

impl TemplateSet {
    /// Percentage of max; values written as fractions (0.75) are scaled up
    pub fn percent(&self) -> f64 {
        if self.percent > 0.0 && self.percent < 1.0 {
            self.percent * 100.0
        } else {
            self.percent
        }
    }

    pub fn set_count(&self) -> u32 {
        self.sets.max(1)
    }

    pub fn is_absolute(&self) -> bool {
        self.percent <= 0.0 && self.weight > 0.0
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TemplateExercise {
    pub name: String,
    #[serde(default)]
    pub kind: LineKind,
    pub sets: Vec<TemplateSet>,
    /// Max of the athlete the absolute weights were written for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_max: Option<f64>,
}

/// Share of the reference max the heaviest written set is assumed to be
pub const ASSUMED_TOP_SET_FRACTION: f64 = 0.9;

impl TemplateExercise {
    pub fn uses_absolute_weights(&self) -> bool {
        self.sets.iter().any(TemplateSet::is_absolute)
    }

    pub fn uses_percentages(&self) -> bool {
        self.sets.iter().any(|s| s.percent() > 0.0)
    }

    /// Reference max for absolute weights; defaults to heaviest set / 0.9
    pub fn reference_max(&self) -> f64 {
        self.reference_max.unwrap_or_else(|| {
            let heaviest = self.sets.iter().map(|s| s.weight).fold(0.0, f64::max);
            heaviest / ASSUMED_TOP_SET_FRACTION
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TemplateWorkout {
    pub day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exercises: Vec<TemplateExercise>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TemplateWeek {
    pub week: u32,
    #[serde(default)]
    pub phase: String,
    pub workouts: Vec<TemplateWorkout>,
}

/// A named, codified methodology
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MethodologyTemplate {
    pub name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    pub tier: AthleteTier,
    #[serde(default)]
    pub lift_type: LiftType,
    pub days_per_week: u32,
    pub weeks: Vec<TemplateWeek>,
}

impl MethodologyTemplate {
    pub fn total_weeks(&self) -> u32 {
        self.weeks.len() as u32
    }

    /// Problems that make the template unusable; empty when valid
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("template has no name".to_string());
        }
        if self.weeks.is_empty() {
            errors.push(format!("{}: no weeks", self.name));
        }
        if self.days_per_week == 0 {
            errors.push(format!("{}: days_per_week must be at least 1", self.name));
        }

        for (idx, week) in self.weeks.iter().enumerate() {
            if week.week != idx as u32 + 1 {
                errors.push(format!(
                    "{}: week {} is out of order (expected {})",
                    self.name,
                    week.week,
                    idx + 1
                ));
            }
            for workout in &week.workouts {
                for ex in &workout.exercises {
                    if ex.sets.is_empty() {
                        errors.push(format!(
                            "{}: week {} day {}: {} has no sets",
                            self.name, week.week, workout.day, ex.name
                        ));
                    }
                    for set in &ex.sets {
                        if set.reps == 0 {
                            errors.push(format!(
                                "{}: week {} day {}: {} has a zero-rep set",
                                self.name, week.week, workout.day, ex.name
                            ));
                        }
                        if set.percent < 0.0 || set.weight < 0.0 {
                            errors.push(format!(
                                "{}: week {} day {}: {} has a negative load",
                                self.name, week.week, workout.day, ex.name
                            ));
                        }
                    }
                }
            }
        }

        errors
    }
}

// ============================================================================
// Catalog
// ============================================================================

const BUILTIN_TEMPLATES: [(&str, &str); 6] = [
    ("russian_cycle.json", include_str!("../templates/russian_cycle.json")),
    ("sheiko_12_weeks.json", include_str!("../templates/sheiko_12_weeks.json")),
    (
        "sheiko_pre_competition.json",
        include_str!("../templates/sheiko_pre_competition.json"),
    ),
    ("golovinsky_cycle_7.json", include_str!("../templates/golovinsky_cycle_7.json")),
    ("verkhoshansky_block.json", include_str!("../templates/verkhoshansky_block.json")),
    ("muravyev_16_weeks.json", include_str!("../templates/muravyev_16_weeks.json")),
];

/// Lazy-initialized built-in templates (parsed once)
static BUILTIN_CATALOG: Lazy<TemplateCatalog> = Lazy::new(build_builtin_templates);

/// Get a reference to the cached built-in templates
pub fn get_builtin_templates() -> &'static TemplateCatalog {
    &BUILTIN_CATALOG
}

/// Parse the embedded templates; a broken document is logged and skipped
pub fn build_builtin_templates() -> TemplateCatalog {
    let mut catalog = TemplateCatalog::default();
    for (file, contents) in BUILTIN_TEMPLATES {
        match parse_template(contents) {
            Ok(template) => {
                catalog.insert(template);
            }
            Err(e) => tracing::warn!("Skipping built-in template {}: {}", file, e),
        }
    }
    catalog
}

fn parse_template(contents: &str) -> Result<MethodologyTemplate> {
    let template: MethodologyTemplate = serde_json::from_str(contents)?;
    let errors = template.validate();
    if !errors.is_empty() {
        return Err(Error::Catalog(errors.join("; ")));
    }
    Ok(template)
}

/// Template lookup, keyed case-insensitively by name
#[derive(Clone, Debug, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<String, MethodologyTemplate>,
}

fn catalog_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl TemplateCatalog {
    pub fn from_templates(templates: impl IntoIterator<Item = MethodologyTemplate>) -> Self {
        let mut catalog = Self::default();
        for t in templates {
            catalog.insert(t);
        }
        catalog
    }

    /// Add or replace a template, returning the one it replaced
    pub fn insert(&mut self, template: MethodologyTemplate) -> Option<MethodologyTemplate> {
        self.templates.insert(catalog_key(&template.name), template)
    }

    /// Load every `*.json` in `dir`; unreadable or invalid files are skipped
    ///
    /// Returns the number of templates added.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
            .collect();
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let parsed = std::fs::read_to_string(&path)
                .map_err(Error::from)
                .and_then(|contents| parse_template(&contents));
            match parsed {
                Ok(template) => {
                    tracing::debug!("Loaded template {:?} from {:?}", template.name, path);
                    if self.insert(template).is_some() {
                        tracing::info!("Template from {:?} replaces an existing one", path);
                    }
                    loaded += 1;
                }
                Err(e) => tracing::warn!("Skipping template {:?}: {}", path, e),
            }
        }
        Ok(loaded)
    }

    pub fn get(&self, name: &str) -> Result<&MethodologyTemplate> {
        self.templates
            .get(&catalog_key(name))
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(&catalog_key(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MethodologyTemplate> {
        self.templates.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn for_tier(&self, tier: AthleteTier) -> Vec<&MethodologyTemplate> {
        self.iter().filter(|t| t.tier == tier).collect()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_parse_and_validate() {
        let catalog = get_builtin_templates();
        assert_eq!(catalog.len(), BUILTIN_TEMPLATES.len());
        for t in catalog.iter() {
            assert!(t.validate().is_empty(), "{}: {:?}", t.name, t.validate());
        }

        let russian = catalog.get("russian cycle").unwrap();
        assert_eq!(russian.total_weeks(), 6);
        assert_eq!(russian.tier, AthleteTier::Novice);
        assert_eq!(catalog.get("Muravyev 16 Weeks").unwrap().total_weeks(), 16);
        assert_eq!(catalog.get("Golovinsky Cycle 7").unwrap().lift_type, LiftType::Deadlift);
    }

    #[test]
    fn test_unknown_template() {
        assert!(matches!(
            get_builtin_templates().get("5/3/1"),
            Err(Error::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_fraction_percent_and_zero_sets() {
        let set = TemplateSet {
            percent: 0.75,
            reps: 3,
            sets: 0,
            weight: 0.0,
        };
        assert_eq!(set.percent(), 75.0);
        assert_eq!(set.set_count(), 1);

        let whole = TemplateSet {
            percent: 80.0,
            ..set
        };
        assert_eq!(whole.percent(), 80.0);
    }

    #[test]
    fn test_reference_max_defaults_to_heaviest_set() {
        let ex = TemplateExercise {
            name: "Squat".into(),
            kind: LineKind::Competition,
            sets: vec![
                TemplateSet { percent: 0.0, reps: 3, sets: 2, weight: 180.0 },
                TemplateSet { percent: 0.0, reps: 2, sets: 2, weight: 225.0 },
            ],
            reference_max: None,
        };
        assert!(ex.uses_absolute_weights());
        assert!((ex.reference_max() - 250.0).abs() < 1e-9);
    }

    #[test]
    fn test_tier_buckets() {
        assert_eq!(AthleteTier::from_total(349.0), AthleteTier::Novice);
        assert_eq!(AthleteTier::from_total(400.0), AthleteTier::Intermediate);
        assert_eq!(AthleteTier::from_total(500.0), AthleteTier::Advanced);
        assert_eq!(AthleteTier::from_total(650.0), AthleteTier::Elite);
    }

    #[test]
    fn test_load_dir_skips_broken_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut custom = get_builtin_templates().get("Russian Cycle").unwrap().clone();
        custom.name = "Club Cycle".into();
        std::fs::write(
            dir.path().join("club.json"),
            serde_json::to_string(&custom).unwrap(),
        )
        .unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("readme.txt"), "ignored").unwrap();

        let mut catalog = build_builtin_templates();
        let before = catalog.len();
        assert_eq!(catalog.load_dir(dir.path()).unwrap(), 1);
        assert_eq!(catalog.len(), before + 1);
        assert!(catalog.contains("club cycle"));
    }

    #[test]
    fn test_validate_reports_problems() {
        let mut t = get_builtin_templates().get("Russian Cycle").unwrap().clone();
        t.weeks[1].week = 5;
        t.weeks[0].workouts[0].exercises[0].sets[0].reps = 0;
        let errors = t.validate();
        assert_eq!(errors.len(), 2, "{errors:?}");
    }
}
