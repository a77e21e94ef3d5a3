//! Default exercise catalog.
//!
//! The built-in movements every assembler draws from. A custom catalog can
//! be loaded from JSON and injected instead; the engine never reaches for a
//! global registry on its own.

use crate::types::Equipment::*;
use crate::types::ExperienceLevel::{Advanced, Beginner, Intermediate};
use crate::types::Mechanics::{Compound, Isolation};
use crate::types::*;
use crate::types::{MovementType as M, MuscleGroup as G};
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use std::path::Path;

/// Cached default catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached default catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the default catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for testing and custom catalog creation.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

struct Def {
    id: &'static str,
    name: &'static str,
    primary: MuscleGroup,
    secondary: &'static [MuscleGroup],
    movement: MovementType,
    mechanics: Mechanics,
    equipment: &'static [Equipment],
    difficulty: ExperienceLevel,
    bilateral: bool,
    contraindications: &'static [&'static str],
}

#[allow(clippy::too_many_arguments)]
const fn def(
    id: &'static str,
    name: &'static str,
    primary: MuscleGroup,
    secondary: &'static [MuscleGroup],
    movement: MovementType,
    mechanics: Mechanics,
    equipment: &'static [Equipment],
    difficulty: ExperienceLevel,
) -> Def {
    Def {
        id,
        name,
        primary,
        secondary,
        movement,
        mechanics,
        equipment,
        difficulty,
        bilateral: true,
        contraindications: &[],
    }
}

impl Def {
    const fn unilateral(mut self) -> Self {
        self.bilateral = false;
        self
    }

    const fn avoid(mut self, tags: &'static [&'static str]) -> Self {
        self.contraindications = tags;
        self
    }

    fn build(&self) -> Exercise {
        Exercise {
            id: self.id.into(),
            name: self.name.into(),
            primary_muscle: self.primary,
            secondary_muscles: self.secondary.to_vec(),
            movement: self.movement,
            mechanics: self.mechanics,
            equipment: self.equipment.to_vec(),
            difficulty: self.difficulty,
            bilateral: self.bilateral,
            contraindications: self.contraindications.iter().map(|s| s.to_string()).collect(),
        }
    }
}

const DEFAULT_EXERCISES: &[Def] = &[
    // ====================================================================
    // Squat
    // ====================================================================
    def("back_squat", "Back Squat", G::Quads, &[G::Glutes, G::Hamstrings, G::Core], M::Squat, Compound, &[Barbell, Rack], Beginner)
        .avoid(&["knee", "lower_back"]),
    def("front_squat", "Front Squat", G::Quads, &[G::Glutes, G::Core], M::Squat, Compound, &[Barbell, Rack], Intermediate)
        .avoid(&["knee", "wrist"]),
    def("goblet_squat", "Goblet Squat", G::Quads, &[G::Glutes], M::Squat, Compound, &[Dumbbell], Beginner),
    def("leg_press", "Leg Press", G::Quads, &[G::Glutes], M::Squat, Compound, &[Machine], Beginner),
    def("bodyweight_squat", "Bodyweight Squat", G::Quads, &[G::Glutes], M::Squat, Compound, &[], Beginner),
    def("leg_extension", "Leg Extension", G::Quads, &[], M::Squat, Isolation, &[Machine], Beginner)
        .avoid(&["knee"]),
    def("standing_calf_raise", "Standing Calf Raise", G::Calves, &[], M::Squat, Isolation, &[Machine], Beginner),
    def("single_leg_calf_raise", "Single-Leg Calf Raise", G::Calves, &[], M::Squat, Isolation, &[], Beginner)
        .unilateral(),
    // ====================================================================
    // Hinge
    // ====================================================================
    def("deadlift", "Deadlift", G::Hamstrings, &[G::Glutes, G::Back, G::Core], M::Hinge, Compound, &[Barbell], Beginner)
        .avoid(&["lower_back"]),
    def("romanian_deadlift", "Romanian Deadlift", G::Hamstrings, &[G::Glutes, G::Back], M::Hinge, Compound, &[Barbell], Intermediate)
        .avoid(&["lower_back"]),
    def("dumbbell_romanian_deadlift", "Dumbbell Romanian Deadlift", G::Hamstrings, &[G::Glutes], M::Hinge, Compound, &[Dumbbell], Beginner),
    def("good_morning", "Good Morning", G::Hamstrings, &[G::Back], M::Hinge, Compound, &[Barbell, Rack], Advanced)
        .avoid(&["lower_back"]),
    def("hip_thrust", "Hip Thrust", G::Glutes, &[G::Hamstrings], M::Hinge, Compound, &[Barbell, Bench], Beginner),
    def("kettlebell_swing", "Kettlebell Swing", G::Glutes, &[G::Hamstrings, G::Core], M::Hinge, Compound, &[Kettlebell], Beginner)
        .avoid(&["lower_back"]),
    def("glute_bridge", "Glute Bridge", G::Glutes, &[G::Hamstrings], M::Hinge, Compound, &[], Beginner),
    def("lying_leg_curl", "Lying Leg Curl", G::Hamstrings, &[], M::Hinge, Isolation, &[Machine], Beginner),
    def("back_extension", "Back Extension", G::Hamstrings, &[G::Glutes, G::Back], M::Hinge, Isolation, &[], Beginner),
    // ====================================================================
    // Lunge
    // ====================================================================
    def("walking_lunge", "Walking Lunge", G::Glutes, &[G::Quads], M::Lunge, Compound, &[Dumbbell], Beginner)
        .unilateral()
        .avoid(&["knee"]),
    def("bulgarian_split_squat", "Bulgarian Split Squat", G::Glutes, &[G::Quads], M::Lunge, Compound, &[Dumbbell, Bench], Intermediate)
        .unilateral()
        .avoid(&["knee"]),
    def("reverse_lunge", "Reverse Lunge", G::Glutes, &[G::Quads], M::Lunge, Compound, &[], Beginner)
        .unilateral(),
    // ====================================================================
    // Push
    // ====================================================================
    def("bench_press", "Bench Press", G::Chest, &[G::Triceps, G::Shoulders], M::Push, Compound, &[Barbell, Bench], Beginner)
        .avoid(&["shoulder"]),
    def("incline_bench_press", "Incline Bench Press", G::Chest, &[G::Shoulders, G::Triceps], M::Push, Compound, &[Barbell, Bench], Intermediate)
        .avoid(&["shoulder"]),
    def("dumbbell_bench_press", "Dumbbell Bench Press", G::Chest, &[G::Triceps, G::Shoulders], M::Push, Compound, &[Dumbbell, Bench], Beginner),
    def("push_up", "Push-Up", G::Chest, &[G::Triceps, G::Core], M::Push, Compound, &[], Beginner),
    def("dumbbell_fly", "Dumbbell Fly", G::Chest, &[], M::Push, Isolation, &[Dumbbell, Bench], Beginner)
        .avoid(&["shoulder"]),
    def("cable_crossover", "Cable Crossover", G::Chest, &[], M::Push, Isolation, &[Cable], Intermediate),
    def("overhead_press", "Overhead Press", G::Shoulders, &[G::Triceps, G::Core], M::Push, Compound, &[Barbell, Rack], Beginner)
        .avoid(&["shoulder"]),
    def("dumbbell_shoulder_press", "Dumbbell Shoulder Press", G::Shoulders, &[G::Triceps], M::Push, Compound, &[Dumbbell], Beginner)
        .avoid(&["shoulder"]),
    def("pike_push_up", "Pike Push-Up", G::Shoulders, &[G::Triceps], M::Push, Compound, &[], Intermediate)
        .avoid(&["shoulder"]),
    def("lateral_raise", "Lateral Raise", G::Shoulders, &[], M::Push, Isolation, &[Dumbbell], Beginner),
    def("close_grip_bench_press", "Close-Grip Bench Press", G::Triceps, &[G::Chest], M::Push, Compound, &[Barbell, Bench], Intermediate),
    def("dips", "Parallel Bar Dip", G::Triceps, &[G::Chest, G::Shoulders], M::Push, Compound, &[], Intermediate)
        .avoid(&["shoulder"]),
    def("triceps_pushdown", "Triceps Pushdown", G::Triceps, &[], M::Push, Isolation, &[Cable], Beginner),
    def("overhead_triceps_extension", "Overhead Triceps Extension", G::Triceps, &[], M::Push, Isolation, &[Dumbbell], Beginner)
        .avoid(&["elbow"]),
    def("bench_dip", "Bench Dip", G::Triceps, &[], M::Push, Isolation, &[Bench], Beginner)
        .avoid(&["shoulder"]),
    // ====================================================================
    // Pull
    // ====================================================================
    def("barbell_row", "Barbell Row", G::Back, &[G::Biceps, G::RearDelts], M::Pull, Compound, &[Barbell], Beginner)
        .avoid(&["lower_back"]),
    def("pull_up", "Pull-Up", G::Back, &[G::Biceps], M::Pull, Compound, &[PullupBar], Intermediate),
    def("lat_pulldown", "Lat Pulldown", G::Back, &[G::Biceps], M::Pull, Compound, &[Cable], Beginner),
    def("dumbbell_row", "One-Arm Dumbbell Row", G::Back, &[G::Biceps], M::Pull, Compound, &[Dumbbell, Bench], Beginner)
        .unilateral(),
    def("seated_cable_row", "Seated Cable Row", G::Back, &[G::Biceps, G::RearDelts], M::Pull, Compound, &[Cable], Beginner),
    def("inverted_row", "Inverted Row", G::Back, &[G::Biceps, G::Core], M::Pull, Compound, &[Rack], Beginner),
    def("straight_arm_pulldown", "Straight-Arm Pulldown", G::Back, &[], M::Pull, Isolation, &[Cable], Intermediate),
    def("face_pull", "Face Pull", G::RearDelts, &[G::Back], M::Pull, Isolation, &[Cable], Beginner),
    def("reverse_fly", "Reverse Dumbbell Fly", G::RearDelts, &[], M::Pull, Isolation, &[Dumbbell], Beginner),
    def("band_pull_apart", "Band Pull-Apart", G::RearDelts, &[], M::Pull, Isolation, &[Bands], Beginner),
    def("barbell_curl", "Barbell Curl", G::Biceps, &[], M::Pull, Isolation, &[Barbell], Beginner)
        .avoid(&["elbow"]),
    def("dumbbell_curl", "Dumbbell Curl", G::Biceps, &[], M::Pull, Isolation, &[Dumbbell], Beginner),
    def("band_curl", "Band Curl", G::Biceps, &[], M::Pull, Isolation, &[Bands], Beginner),
    // ====================================================================
    // Core & carries
    // ====================================================================
    def("plank", "Plank", G::Core, &[], M::Core, Isolation, &[], Beginner),
    def("hanging_leg_raise", "Hanging Leg Raise", G::Core, &[], M::Core, Isolation, &[PullupBar], Intermediate),
    def("cable_crunch", "Cable Crunch", G::Core, &[], M::Core, Isolation, &[Cable], Beginner),
    def("farmers_walk", "Farmer's Walk", G::FullBody, &[G::Core], M::Carry, Compound, &[Dumbbell], Beginner),
    // ====================================================================
    // Conditioning
    // ====================================================================
    def("rowing_intervals", "Rowing Intervals", G::FullBody, &[G::Back], M::Conditioning, Compound, &[Rower], Beginner),
    def("bike_intervals", "Air Bike Intervals", G::FullBody, &[G::Quads], M::Conditioning, Compound, &[Bike], Beginner),
    def("sled_push", "Sled Push", G::Quads, &[G::Glutes], M::Conditioning, Compound, &[Sled], Intermediate),
    def("dumbbell_thruster", "Dumbbell Thruster", G::FullBody, &[G::Shoulders, G::Quads], M::Conditioning, Compound, &[Dumbbell], Intermediate),
    def("kettlebell_snatch", "Kettlebell Snatch", G::FullBody, &[G::Shoulders], M::Conditioning, Compound, &[Kettlebell], Advanced)
        .unilateral()
        .avoid(&["shoulder"]),
    def("burpee", "Burpee", G::FullBody, &[G::Chest, G::Quads], M::Conditioning, Compound, &[], Beginner),
    def("mountain_climber", "Mountain Climber", G::Core, &[G::Shoulders], M::Conditioning, Compound, &[], Beginner),
];

/// Internal function that actually builds the catalog
fn build_default_catalog_internal() -> Catalog {
    Catalog::from_exercises(DEFAULT_EXERCISES.iter().map(Def::build))
}

impl Catalog {
    /// Key exercises by id; a later duplicate replaces an earlier one
    pub fn from_exercises(exercises: impl IntoIterator<Item = Exercise>) -> Self {
        let exercises: BTreeMap<String, Exercise> = exercises
            .into_iter()
            .map(|e| (e.id.clone(), e))
            .collect();
        Self { exercises }
    }

    /// Load a catalog from a JSON array of exercises
    ///
    /// Unlike the default catalog this is validated on load, since the file
    /// is user data.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let exercises: Vec<Exercise> = serde_json::from_str(&contents)?;
        let catalog = Self::from_exercises(exercises);
        let errors = catalog.validate();
        if !errors.is_empty() {
            return Err(Error::Catalog(errors.join("; ")));
        }
        tracing::info!("Loaded {} exercises from {:?}", catalog.len(), path);
        Ok(catalog)
    }

    pub fn get(&self, id: &str) -> Option<&Exercise> {
        self.exercises.get(id)
    }

    pub fn len(&self) -> usize {
        self.exercises.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exercises.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exercise> {
        self.exercises.values()
    }

    pub fn by_muscle(&self, muscle: MuscleGroup) -> Vec<&Exercise> {
        self.iter().filter(|e| e.primary_muscle == muscle).collect()
    }

    pub fn by_equipment(&self, equipment: Equipment) -> Vec<&Exercise> {
        self.iter().filter(|e| e.equipment.contains(&equipment)).collect()
    }

    /// Validate catalog consistency
    ///
    /// Returns a list of validation errors (empty if valid)
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.exercises.is_empty() {
            errors.push("Catalog has no exercises".to_string());
            return errors;
        }

        for (key, ex) in &self.exercises {
            if key != &ex.id {
                errors.push(format!("Exercise key '{}' does not match id '{}'", key, ex.id));
            }
            if ex.id.trim().is_empty() {
                errors.push("Exercise with empty id".to_string());
            }
            if ex.name.trim().is_empty() {
                errors.push(format!("Exercise '{}' has an empty name", ex.id));
            }
            if ex.secondary_muscles.contains(&ex.primary_muscle) {
                errors.push(format!(
                    "Exercise '{}': primary muscle also listed as secondary",
                    ex.id
                ));
            }
        }

        // Every strength movement needs at least one option
        for movement in [
            MovementType::Push,
            MovementType::Pull,
            MovementType::Squat,
            MovementType::Hinge,
        ] {
            if !self.iter().any(|e| e.movement == movement) {
                errors.push(format!("Catalog has no {:?} exercises", movement));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_loads() {
        let catalog = build_default_catalog();
        assert!(catalog.len() >= 40);
        assert!(catalog.get("bench_press").is_some());
        assert!(catalog.get("back_squat").is_some());
        assert!(catalog.get("deadlift").is_some());
        assert!(catalog.get("overhead_press").is_some());
    }

    #[test]
    fn test_default_catalog_validates() {
        let catalog = get_default_catalog();
        let errors = catalog.validate();
        assert!(
            errors.is_empty(),
            "Default catalog has validation errors: {:?}",
            errors
        );
    }

    #[test]
    fn test_bodyweight_option_per_movement() {
        let catalog = get_default_catalog();
        for movement in [
            MovementType::Push,
            MovementType::Squat,
            MovementType::Hinge,
            MovementType::Lunge,
            MovementType::Core,
            MovementType::Conditioning,
        ] {
            assert!(
                catalog
                    .iter()
                    .any(|e| e.movement == movement && e.equipment.is_empty()),
                "no bodyweight {:?} exercise",
                movement
            );
        }
    }

    #[test]
    fn test_lookup_helpers() {
        let catalog = get_default_catalog();
        assert!(catalog
            .by_muscle(MuscleGroup::Biceps)
            .iter()
            .all(|e| e.movement == MovementType::Pull));
        assert!(catalog.by_equipment(Equipment::Rower).len() >= 1);
    }

    #[test]
    fn test_json_catalog_roundtrip_and_validation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.json");
        let exercises: Vec<&Exercise> = get_default_catalog().iter().take(10).collect();
        std::fs::write(&path, serde_json::to_string(&exercises).unwrap()).unwrap();
        let loaded = Catalog::from_json_file(&path).unwrap();
        assert_eq!(loaded.len(), 10);

        std::fs::write(&path, "[]").unwrap();
        assert!(matches!(
            Catalog::from_json_file(&path),
            Err(Error::Catalog(_))
        ));
    }
}
