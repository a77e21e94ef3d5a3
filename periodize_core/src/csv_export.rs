//! CSV export of generated and methodology programs.
//!
//! One row per exercise line. Files are written in full and synced before
//! returning; an existing file at the path is replaced.

use crate::methodology::PlProgram;
use crate::{GeneratedProgram, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A row of a generated program
#[derive(Debug, serde::Serialize)]
struct ProgramRow<'a> {
    week: u32,
    phase: &'a str,
    deload: bool,
    day: u32,
    day_name: &'a str,
    order: u32,
    exercise_id: &'a str,
    exercise: &'a str,
    kind: &'static str,
    sets: u32,
    reps: String,
    weight_kg: f64,
    percent_of_max: f64,
    rest_seconds: u32,
    rpe: f64,
    notes: Option<&'a str>,
}

/// A row of a methodology program; multi-set lines are joined as "70%x5x2;75%x4x2"
#[derive(Debug, serde::Serialize)]
struct PlRow<'a> {
    week: u32,
    phase: &'a str,
    day: u32,
    exercise: &'a str,
    kind: &'static str,
    one_rm_kg: f64,
    scheme: String,
    weights_kg: String,
    total_reps: u32,
    tonnage_kg: f64,
    avg_percent: f64,
}

pub fn write_program<W: Write>(program: &GeneratedProgram, out: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    let mut rows = 0;

    for (week, day, ex) in program.exercises() {
        writer.serialize(ProgramRow {
            week: week.week,
            phase: &week.phase_name,
            deload: week.is_deload,
            day: day.day,
            day_name: &day.name,
            order: ex.order,
            exercise_id: &ex.exercise_id,
            exercise: &ex.name,
            kind: match ex.kind {
                crate::BlockKind::Main => "main",
                crate::BlockKind::Accessory => "accessory",
                crate::BlockKind::Conditioning => "conditioning",
            },
            sets: ex.sets,
            reps: ex.reps.to_string(),
            weight_kg: ex.weight_kg,
            percent_of_max: ex.percent_of_max,
            rest_seconds: ex.rest_seconds,
            rpe: ex.rpe,
            notes: ex.notes.as_deref(),
        })?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}

pub fn write_pl_program<W: Write>(program: &PlProgram, out: W) -> Result<usize> {
    let mut writer = csv::Writer::from_writer(out);
    let mut rows = 0;

    for (week, workout, ex) in program.exercises() {
        let scheme = ex
            .sets
            .iter()
            .map(|s| format!("{}%x{}x{}", s.percent, s.reps, s.sets))
            .collect::<Vec<_>>()
            .join(";");
        let weights = ex
            .sets
            .iter()
            .map(|s| s.weight_kg.to_string())
            .collect::<Vec<_>>()
            .join(";");

        writer.serialize(PlRow {
            week: week.week,
            phase: &week.phase,
            day: workout.day,
            exercise: &ex.name,
            kind: ex.kind.as_str(),
            one_rm_kg: ex.one_rm_kg,
            scheme,
            weights_kg: weights,
            total_reps: ex.total_reps,
            tonnage_kg: ex.tonnage_kg,
            avg_percent: ex.avg_percent,
        })?;
        rows += 1;
    }

    writer.flush()?;
    Ok(rows)
}

fn write_file<F>(path: &Path, write: F) -> Result<usize>
where
    F: FnOnce(&mut File) -> Result<usize>,
{
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = File::create(path)?;
    let rows = write(&mut file)?;
    file.sync_all()?;

    tracing::info!("Wrote {} rows to {:?}", rows, path);
    Ok(rows)
}

pub fn export_program(program: &GeneratedProgram, path: &Path) -> Result<usize> {
    write_file(path, |file| write_program(program, file))
}

pub fn export_pl_program(program: &PlProgram, path: &Path) -> Result<usize> {
    write_file(path, |file| write_pl_program(program, file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::get_default_catalog;
    use crate::engine::generate;
    use crate::maxes::MaxTable;
    use crate::methodology::{resolve, AthleteMaxes, ResolveOptions};
    use crate::template::get_builtin_templates;
    use crate::{AthleteProfile, Goal, ProgramRequest};

    #[test]
    fn test_export_generated_program() {
        let request = ProgramRequest::new(AthleteProfile::new(Goal::Strength, 4, 3))
            .with_maxes(MaxTable::new().with("Squat", 140.0));
        let program = generate(get_default_catalog(), &request).unwrap().program;

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out/program.csv");
        let rows = export_program(&program, &path).unwrap();
        assert_eq!(rows, program.exercises().count());

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "week");
        assert!(headers.iter().any(|h| h == "weight_kg"));
        assert_eq!(reader.records().count(), rows);
    }

    #[test]
    fn test_export_replaces_existing_file() {
        let program = resolve(
            get_builtin_templates(),
            "Russian Cycle",
            AthleteMaxes::new(150.0, 100.0, 180.0),
            ResolveOptions::default(),
        )
        .unwrap();

        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("pl.csv");
        std::fs::write(&path, "stale\n").unwrap();

        let rows = export_pl_program(&program, &path).unwrap();
        assert_eq!(rows, program.exercises().count());

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(!contents.contains("stale"));
        assert!(contents.lines().nth(1).unwrap().contains("Squat"));
        assert!(contents.contains("%x"));
    }
}
