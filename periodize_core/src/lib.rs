#![forbid(unsafe_code)]

//! Core domain model and business logic for the periodize system.
//!
//! This crate provides:
//! - Domain types (profiles, catalog entries, cycles, generated programs)
//! - 1RM estimation, periodization and progression
//! - Exercise selection, movement balance and per-goal program assembly
//! - The methodology template engine and its editor
//! - Validation and statistics
//! - Persistence helpers (max log, generation state, CSV export)

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod rounding;
pub mod onerm;
pub mod maxes;
pub mod periodization;
pub mod progression;
pub mod catalog;
pub mod selector;
pub mod balance;
pub mod assembler;
pub mod hypertrophy;
pub mod strength;
pub mod fat_loss;
pub mod hybrid;
pub mod engine;
pub mod state;
pub mod template;
pub mod methodology;
pub mod editor;
pub mod validation;
pub mod csv_export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use assembler::ProgramRequest;
pub use balance::MovementBalance;
pub use catalog::{build_default_catalog, get_default_catalog};
pub use config::{Config, GenerationSettings};
pub use engine::{continue_generation, generate, start_generation, GenerationOutcome};
pub use maxes::{MaxEntry, MaxLog, MaxTable};
pub use methodology::{AthleteMaxes, PlProgram, ResolveOptions};
pub use onerm::OneRmMethod;
pub use state::{GenerationState, GenerationStatus};
pub use template::{get_builtin_templates, AthleteTier, LiftType, TemplateCatalog};
pub use validation::Validation;
