use clap::{Parser, Subcommand};
use periodize_core::methodology::{auto_select, resolve_template};
use periodize_core::balance;
use periodize_core::onerm;
use periodize_core::selector::Selector;
use periodize_core::state::{delete_state, list_states, load_client_state, state_path};
use periodize_core::template::build_builtin_templates;
use periodize_core::validation::{validate_pl_program, PlStats, ProgramStats};
use periodize_core::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "periodize")]
#[command(about = "Periodized training program generator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate a one-rep max from a tested set
    Estimate {
        #[arg(long)]
        weight: f64,

        #[arg(long)]
        reps: u32,

        /// brzycki, epley, average or manual (default from config)
        #[arg(long)]
        method: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show the phase skeleton for a plan
    Plan {
        #[arg(long)]
        goal: String,

        #[arg(long)]
        weeks: u32,

        /// Sessions per week
        #[arg(long)]
        days: u32,

        #[arg(long)]
        deload_interval: Option<u32>,

        #[arg(long)]
        json: bool,
    },

    /// Generate a full program, or start a batch generation with --client
    Generate {
        #[arg(long)]
        goal: String,

        #[arg(long)]
        weeks: u32,

        /// Sessions per week
        #[arg(long)]
        days: u32,

        /// Known max as NAME=KG, repeatable (overrides the max log)
        #[arg(long = "max", value_name = "NAME=KG")]
        maxes: Vec<String>,

        /// Available equipment (default from config)
        #[arg(long, value_delimiter = ',')]
        equipment: Vec<String>,

        /// full_body, upper_lower or push_pull_legs
        #[arg(long)]
        split: Option<String>,

        /// novice, intermediate or advanced
        #[arg(long)]
        level: Option<String>,

        /// Contraindication tags to avoid (e.g. shoulder)
        #[arg(long, value_delimiter = ',')]
        restrict: Vec<String>,

        #[arg(long)]
        no_conditioning: bool,

        /// Exercise catalog JSON to use instead of the built-in one
        #[arg(long)]
        catalog: Option<PathBuf>,

        #[arg(long)]
        json: bool,

        /// Also write the program as CSV
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Generate in batches and keep the state under this client name
        #[arg(long)]
        client: Option<String>,

        /// Weeks per batch (default from config)
        #[arg(long, requires = "client")]
        batch_size: Option<u32>,

        /// Replace an existing generation for the client
        #[arg(long, requires = "client")]
        force: bool,
    },

    /// Generate the next batch for a client
    Continue {
        #[arg(long)]
        client: String,

        /// Updated max as NAME=KG, repeatable; affects the new weeks only
        #[arg(long = "max", value_name = "NAME=KG")]
        maxes: Vec<String>,

        #[arg(long)]
        json: bool,
    },

    /// List batch generations
    States {
        /// Remove the state of this client
        #[arg(long)]
        delete: Option<String>,
    },

    /// List methodology templates
    Templates {
        /// Additional template directory (overrides config)
        #[arg(long)]
        templates_dir: Option<PathBuf>,
    },

    /// Resolve a methodology template against the athlete's maxes
    Template {
        /// Template name
        #[arg(long, conflicts_with = "auto", required_unless_present = "auto")]
        name: Option<String>,

        /// Pick the template from the squat + bench + deadlift total
        #[arg(long)]
        auto: bool,

        #[arg(long, default_value_t = 0.0)]
        squat: f64,

        #[arg(long, default_value_t = 0.0)]
        bench: f64,

        #[arg(long, default_value_t = 0.0)]
        deadlift: f64,

        #[arg(long, default_value_t = 0.0)]
        hip_thrust: f64,

        /// Redistribute workouts over this many days per week
        #[arg(long)]
        days: Option<u32>,

        #[arg(long)]
        no_accessory: bool,

        /// powerlifting, squat, bench, deadlift or hip_thrust
        #[arg(long, default_value = "powerlifting")]
        lift_type: String,

        /// Multiply every percentage, e.g. 0.95
        #[arg(long)]
        scale: Option<f64>,

        /// Additional template directory (overrides config)
        #[arg(long)]
        templates_dir: Option<PathBuf>,

        #[arg(long)]
        json: bool,

        /// Also write the program as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Record and list maxes
    Max {
        #[command(subcommand)]
        command: MaxCommands,
    },
}

#[derive(Subcommand)]
enum MaxCommands {
    /// Record a tested set; the 1RM is estimated from it
    Record {
        #[arg(long)]
        exercise: String,

        #[arg(long)]
        weight: f64,

        #[arg(long, default_value_t = 1)]
        reps: u32,

        #[arg(long)]
        method: Option<String>,
    },

    /// Show the current max per exercise
    List {
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    periodize_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    match cli.command {
        Commands::Estimate {
            weight,
            reps,
            method,
            json,
        } => cmd_estimate(weight, reps, method, json, &config),
        Commands::Plan {
            goal,
            weeks,
            days,
            deload_interval,
            json,
        } => cmd_plan(&goal, weeks, days, deload_interval, json, &config),
        Commands::Generate {
            goal,
            weeks,
            days,
            maxes,
            equipment,
            split,
            level,
            restrict,
            no_conditioning,
            catalog,
            json,
            csv,
            client,
            batch_size,
            force,
        } => {
            let request = build_request(
                &data_dir,
                &config,
                RequestArgs {
                    goal,
                    weeks,
                    days,
                    maxes,
                    equipment,
                    split,
                    level,
                    restrict,
                    no_conditioning,
                },
            )?;
            let catalog_file = catalog;
            let catalog = load_catalog(catalog_file.as_deref())?;
            match client {
                Some(client) => cmd_start_batches(
                    &data_dir,
                    &catalog,
                    catalog_file.as_deref(),
                    request,
                    &client,
                    batch_size.unwrap_or(config.generation.batch_size),
                    force,
                    json,
                ),
                None => cmd_generate(&catalog, &request, json, csv.as_deref()),
            }
        }
        Commands::Continue {
            client,
            maxes,
            json,
        } => cmd_continue(&data_dir, &client, &maxes, json),
        Commands::States { delete } => cmd_states(&data_dir, delete.as_deref()),
        Commands::Templates { templates_dir } => {
            let catalog = load_templates(templates_dir.as_deref(), &config)?;
            cmd_templates(&catalog)
        }
        Commands::Template {
            name,
            auto,
            squat,
            bench,
            deadlift,
            hip_thrust,
            days,
            no_accessory,
            lift_type,
            scale,
            templates_dir,
            json,
            csv,
        } => {
            let catalog = load_templates(templates_dir.as_deref(), &config)?;
            let maxes = AthleteMaxes {
                squat,
                bench,
                deadlift,
                hip_thrust,
            };
            let options = ResolveOptions {
                days_per_week: days,
                include_accessory: !no_accessory,
                lift_type: lift_type.parse()?,
                rounding_increment: config.generation.rounding_increment,
                max_sets_per_day: config.generation.max_sets_per_day,
            };
            let template = if auto {
                auto_select(&catalog, &maxes, options.lift_type)?
            } else {
                catalog.get(name.as_deref().unwrap_or_default())?
            };
            let mut program = resolve_template(template, maxes, options)?;
            if let Some(factor) = scale {
                periodize_core::editor::scale_intensity(
                    &mut program,
                    factor,
                    config.generation.rounding_increment,
                )?;
            }
            cmd_template(&program, json, csv.as_deref())
        }
        Commands::Max { command } => match command {
            MaxCommands::Record {
                exercise,
                weight,
                reps,
                method,
            } => cmd_max_record(&data_dir, &exercise, weight, reps, method, &config),
            MaxCommands::List { json } => cmd_max_list(&data_dir, json),
        },
    }
}

// ============================================================================
// Inputs
// ============================================================================

struct RequestArgs {
    goal: String,
    weeks: u32,
    days: u32,
    maxes: Vec<String>,
    equipment: Vec<String>,
    split: Option<String>,
    level: Option<String>,
    restrict: Vec<String>,
    no_conditioning: bool,
}

fn max_log(data_dir: &Path) -> MaxLog {
    MaxLog::new(data_dir.join("maxes.jsonl"))
}

/// Parse "Bench Press=100" into a name and a positive weight
fn parse_max_arg(arg: &str) -> Result<(String, f64)> {
    let (name, kg) = arg
        .rsplit_once('=')
        .ok_or_else(|| Error::InvalidInput(format!("expected NAME=KG, got '{arg}'")))?;
    let kg: f64 = kg
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("'{kg}' is not a weight")))?;
    if name.trim().is_empty() || !kg.is_finite() || kg <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "expected a name and a positive weight, got '{arg}'"
        )));
    }
    Ok((name.trim().to_string(), kg))
}

fn parse_max_args(args: &[String]) -> Result<MaxTable> {
    let mut table = MaxTable::new();
    for arg in args {
        let (name, kg) = parse_max_arg(arg)?;
        table.insert(&name, kg);
    }
    Ok(table)
}

fn build_request(data_dir: &Path, config: &Config, args: RequestArgs) -> Result<ProgramRequest> {
    let goal: Goal = args.goal.parse()?;
    let mut profile = AthleteProfile::new(goal, args.weeks, args.days);

    profile.equipment = if args.equipment.is_empty() {
        config.equipment_set()?
    } else {
        args.equipment
            .iter()
            .map(|e| e.parse::<Equipment>())
            .collect::<Result<BTreeSet<_>>>()?
    };
    if let Some(level) = &args.level {
        profile.experience = level.parse()?;
    }
    profile.restrictions = args.restrict;

    // The log supplies the current maxes; flags win over it
    let mut maxes = max_log(data_dir).table()?;
    maxes.merge(&parse_max_args(&args.maxes)?);

    let mut request = ProgramRequest::new(profile).with_maxes(maxes);
    request.split = args.split.as_deref().map(str::parse).transpose()?;
    request.include_conditioning = !args.no_conditioning;
    request.settings = config.settings();
    Ok(request)
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let catalog = match path {
        Some(path) => Catalog::from_json_file(path)?,
        None => get_default_catalog().clone(),
    };

    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Catalog("Invalid catalog".into()));
    }
    Ok(catalog)
}

fn load_templates(dir: Option<&Path>, config: &Config) -> Result<TemplateCatalog> {
    let mut catalog = build_builtin_templates();
    if let Some(dir) = dir.or(config.templates.extra_dir.as_deref()) {
        if dir.is_dir() {
            let loaded = catalog.load_dir(dir)?;
            tracing::info!("Loaded {} templates from {:?}", loaded, dir);
        } else {
            tracing::warn!("Template directory {:?} does not exist", dir);
        }
    }
    Ok(catalog)
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_estimate(weight: f64, reps: u32, method: Option<String>, json: bool, config: &Config) -> Result<()> {
    let method = match method {
        Some(m) => m.parse()?,
        None => config.generation.one_rm_method,
    };
    let one_rm = onerm::estimate(weight, reps, method)?;

    if json {
        let out = serde_json::json!({
            "weight_kg": weight,
            "reps": reps,
            "method": method,
            "one_rm_kg": one_rm,
            "brzycki_kg": onerm::brzycki(weight, reps),
            "epley_kg": onerm::epley(weight, reps),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Estimated 1RM ({}): {:.1} kg", method, one_rm);
    println!();
    println!("  %     reps   kg");
    for pct in [95.0, 90.0, 85.0, 80.0, 75.0, 70.0] {
        println!(
            "  {:<5} {:<6} {:.1}",
            pct,
            onerm::intensity_to_reps(pct),
            onerm::working_weight(one_rm, pct, config.generation.rounding_increment)
        );
    }
    Ok(())
}

fn cmd_plan(
    goal: &str,
    weeks: u32,
    days: u32,
    deload_interval: Option<u32>,
    json: bool,
    config: &Config,
) -> Result<()> {
    let goal: Goal = goal.parse()?;
    let cycle = periodization::plan(
        weeks,
        days,
        goal,
        deload_interval.unwrap_or(config.generation.deload_interval),
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&cycle)?);
        return Ok(());
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {} PLAN: {} weeks x {} days", goal.to_string().to_uppercase(), weeks, days);
    println!("╰─────────────────────────────────────────╯");
    for meso in &cycle.mesocycles {
        println!();
        println!(
            "  {} ({}), weeks {}-{}",
            meso.name, meso.phase, meso.start_week, meso.end_week
        );
        println!(
            "    volume {:.0}%  intensity {:.0}%  RPE {:.1}",
            meso.volume_percent, meso.intensity_percent, meso.rpe
        );
    }
    let deloads = cycle.deload_weeks();
    println!();
    if deloads.is_empty() {
        println!("  Deload weeks: none");
    } else {
        let list: Vec<String> = deloads.iter().map(u32::to_string).collect();
        println!("  Deload weeks: {}", list.join(", "));
    }
    print_warnings(&cycle.warnings);
    Ok(())
}

fn cmd_generate(catalog: &Catalog, request: &ProgramRequest, json: bool, csv: Option<&Path>) -> Result<()> {
    let outcome = generate(catalog, request)?;
    let stats = ProgramStats::of(&outcome.program);
    let selector = Selector::new(catalog);
    let correctives: Vec<String> = outcome
        .program
        .weeks
        .first()
        .map(|week| balance::correctives_for_week(&selector, week, &request.base_criteria()))
        .unwrap_or_default()
        .into_iter()
        .map(|c| c.exercise.name.clone())
        .collect();

    if let Some(path) = csv {
        periodize_core::csv_export::export_program(&outcome.program, path)?;
    }

    if json {
        let out = serde_json::json!({
            "program": &outcome.program,
            "validation": &outcome.validation,
            "stats": &stats,
            "balance": &outcome.balance,
            "correctives": &correctives,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        print_program(&outcome.program, 1);
        print_stats(&stats);
        print_balance(&outcome.balance, &correctives);
        print_warnings(&outcome.validation.warnings);
        if let Some(path) = csv {
            println!("  CSV: {}", path.display());
        }
    }

    if !outcome.validation.is_valid {
        for error in &outcome.validation.errors {
            eprintln!("  ✗ {}", error);
        }
        return Err(Error::InvalidInput("generated program failed validation".into()));
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_start_batches(
    data_dir: &Path,
    catalog: &Catalog,
    catalog_file: Option<&Path>,
    request: ProgramRequest,
    client: &str,
    batch_size: u32,
    force: bool,
    json: bool,
) -> Result<()> {
    // Another client's file is refused even with --force
    if load_client_state(data_dir, client)?.is_some() && !force {
        return Err(Error::State(format!(
            "a generation for '{client}' already exists; use 'continue' or --force"
        )));
    }

    let mut state = start_generation(catalog, request, client, batch_size)?;
    // Later batches must select from the same catalog as the frozen weeks
    state.catalog_path = match catalog_file {
        Some(file) => Some(std::fs::canonicalize(file)?),
        None => None,
    };
    state.save(&state_path(data_dir, client))?;
    report_batch(&state, 0, json)
}

fn cmd_continue(data_dir: &Path, client: &str, maxes: &[String], json: bool) -> Result<()> {
    let path = state_path(data_dir, client);
    let mut state = load_client_state(data_dir, client)?
        .ok_or_else(|| Error::State(format!("no generation found for '{client}'")))?;

    if state.is_complete() {
        println!("✓ Program for {} is already complete ({} weeks)", state.client, state.total_weeks);
        return Ok(());
    }

    let updates = parse_max_args(maxes)?;
    let updates = (!updates.is_empty()).then_some(&updates);
    let previous = state.last_completed_week;

    let catalog = load_catalog(state.catalog_path.as_deref())?;
    match continue_generation(&catalog, &state, updates) {
        Ok(next) => {
            next.save(&path)?;
            report_batch(&next, previous, json)
        }
        Err(e) => {
            state.mark_failed(&e);
            state.save(&path)?;
            Err(e)
        }
    }
}

fn report_batch(state: &GenerationState, previous: u32, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(state)?);
        return Ok(());
    }

    if let Some(program) = &state.program {
        print_program(program, previous + 1);
    }
    println!(
        "  Progress: week {} of {} ({:.0}%)",
        state.last_completed_week,
        state.total_weeks,
        state.progress() * 100.0
    );
    if state.is_complete() {
        println!("✓ Program for {} complete", state.client);
    } else {
        println!("  Next: periodize continue --client \"{}\"", state.client);
    }
    Ok(())
}

fn cmd_states(data_dir: &Path, delete: Option<&str>) -> Result<()> {
    if let Some(client) = delete {
        if delete_state(data_dir, client)? {
            println!("✓ Removed generation for {}", client);
        } else {
            println!("No generation found for {}", client);
        }
        return Ok(());
    }

    let states = list_states(data_dir)?;
    if states.is_empty() {
        println!("No generations in progress.");
        return Ok(());
    }

    for state in states {
        println!(
            "  {:<20} {:<12} week {:>2}/{:<2} {:?}  updated {}",
            state.client,
            state.request.profile.goal,
            state.last_completed_week,
            state.total_weeks,
            state.status,
            state.updated_at.format("%Y-%m-%d %H:%M"),
        );
        if let Some(err) = &state.last_error {
            println!("    last error: {}", err);
        }
    }
    Ok(())
}

fn cmd_templates(catalog: &TemplateCatalog) -> Result<()> {
    for template in catalog.iter() {
        println!(
            "  {:<32} {:<13} {:>2} weeks x {} days  {}",
            template.name,
            template.tier,
            template.total_weeks(),
            template.days_per_week,
            template.author
        );
    }
    Ok(())
}

fn cmd_template(program: &PlProgram, json: bool, csv: Option<&Path>) -> Result<()> {
    let validation = validate_pl_program(program);
    let stats = PlStats::of(program);

    if let Some(path) = csv {
        periodize_core::csv_export::export_pl_program(program, path)?;
    }

    if json {
        let out = serde_json::json!({
            "program": program,
            "validation": validation,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", program.name);
    println!("╰─────────────────────────────────────────╯");
    println!(
        "  Tier: {}  Total: {:.1} kg",
        program.tier,
        program.maxes.total()
    );

    for week in &program.weeks {
        println!();
        println!("  Week {} · {}", week.week, week.phase);
        for workout in &week.workouts {
            println!("    Day {} ({} lifts)", workout.day, workout.total_reps);
            for ex in &workout.exercises {
                let sets: Vec<String> = ex
                    .sets
                    .iter()
                    .map(|s| {
                        if s.weight_kg > 0.0 {
                            format!("{}x{}x{}", s.weight_kg, s.reps, s.sets)
                        } else {
                            format!("{}x{}", s.reps, s.sets)
                        }
                    })
                    .collect();
                println!("      {:<26} {}", ex.name, sets.join(", "));
            }
        }
    }

    println!();
    println!(
        "  Lifts: {}  Tonnage: {:.0} kg  Per week: {:.1} lifts",
        stats.total_reps, stats.tonnage_kg, stats.avg_reps_per_week
    );
    print_warnings(&validation.warnings);
    for error in &validation.errors {
        println!("  ✗ {}", error);
    }
    if let Some(path) = csv {
        println!("  CSV: {}", path.display());
    }
    Ok(())
}

fn cmd_max_record(
    data_dir: &Path,
    exercise: &str,
    weight: f64,
    reps: u32,
    method: Option<String>,
    config: &Config,
) -> Result<()> {
    let method = match method {
        Some(m) => m.parse()?,
        None => config.generation.one_rm_method,
    };
    let entry = MaxEntry::from_test(exercise, weight, reps, method)?;
    max_log(data_dir).append(&entry)?;

    println!(
        "✓ Recorded {}: {} kg x {} → 1RM {:.1} kg",
        entry.exercise, weight, reps, entry.estimated_1rm
    );
    Ok(())
}

fn cmd_max_list(data_dir: &Path, json: bool) -> Result<()> {
    let table = max_log(data_dir).table()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&table)?);
        return Ok(());
    }
    if table.is_empty() {
        println!("No maxes recorded.");
        return Ok(());
    }
    for (exercise, kg) in table.iter() {
        println!("  {:<24} {:.1} kg", exercise, kg);
    }
    Ok(())
}

// ============================================================================
// Display
// ============================================================================

fn print_program(program: &GeneratedProgram, from_week: u32) {
    println!("\n╭─────────────────────────────────────────╮");
    println!(
        "│  {} PROGRAM ({}, {} weeks)",
        program.goal.to_string().to_uppercase(),
        program.split_name,
        program.total_weeks
    );
    println!("╰─────────────────────────────────────────╯");

    for week in program.weeks.iter().filter(|w| w.week >= from_week) {
        println!();
        let deload = if week.is_deload { " (deload)" } else { "" };
        println!("  Week {} · {}{}", week.week, week.phase_name, deload);
        for day in &week.days {
            println!("    Day {}: {} (~{} min)", day.day, day.name, day.estimated_minutes);
            for ex in &day.exercises {
                println!(
                    "      {}. {:<28} {} x {:<6} {:<12} rest {}s",
                    ex.order,
                    ex.name,
                    ex.sets,
                    ex.reps.to_string(),
                    ex.load_label(),
                    ex.rest_seconds
                );
            }
        }
    }
    println!();
}

fn print_stats(stats: &ProgramStats) {
    println!(
        "  {} workouts, {} sets, {:.1} sets/week, ~{:.0} min/workout",
        stats.total_workouts, stats.total_sets, stats.avg_sets_per_week, stats.avg_minutes_per_workout
    );
    if stats.tonnage_kg > 0.0 {
        println!("  Tonnage: {:.0} kg", stats.tonnage_kg);
    }
}

fn print_balance(balance: &MovementBalance, correctives: &[String]) {
    println!(
        "  Balance: {}/100 ({:?}), push {} / pull {} sets, quad {} / hip {} sets",
        balance.score,
        balance.assessment,
        balance.push_sets,
        balance.pull_sets,
        balance.quad_sets,
        balance.hip_sets
    );
    if !correctives.is_empty() {
        println!("  Consider adding: {}", correctives.join(", "));
    }
}

fn print_warnings(warnings: &[String]) {
    if warnings.is_empty() {
        return;
    }
    println!();
    println!("  Warnings:");
    for warning in warnings {
        println!("  ⚠ {}", warning);
    }
}
