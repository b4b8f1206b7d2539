//! liftlog - Personal strength training planner

use anyhow::{Result, bail};
use chrono::{Local, NaiveDate};
use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};

use liftlog::db::{Database, GroupConfigEntry};
use liftlog::engine::planner::{GROUP_KEYS, days_since_last_session};
use liftlog::engine::{DayPlan, evaluate_unlocks, preview_week};
use liftlog::tui::App;

#[derive(Parser)]
#[command(name = "liftlog")]
#[command(author, version, about = "Strength training planner with progressive overload")]
struct Cli {
    /// Database file
    #[arg(long, env = "LIFTLOG_DB", default_value = "liftlog.db", global = true)]
    db: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the workout screen
    Tui,

    /// Show the plan for a day
    Plan {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Show the coming seven days
    Week,

    /// List working weights
    Loads,

    /// List past sessions
    History {
        /// Number of sessions to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Log body weight (lbs)
    Weight { weight: f64 },

    /// Log a bar hang (seconds)
    Hang { secs: u32 },

    /// Enable, disable or resize an exercise in a training group
    Group {
        /// Group key: upperA, upperB or lower
        #[arg(value_parser = PossibleValuesParser::new(GROUP_KEYS))]
        group: String,

        /// Exercise name (custom names are allowed)
        exercise: String,

        #[arg(long, conflicts_with = "enable")]
        disable: bool,

        #[arg(long)]
        enable: bool,

        #[arg(long)]
        sets: Option<u32>,

        /// Reps, or seconds for timed exercises
        #[arg(long)]
        reps: Option<u32>,
    },

    /// Edit profile details
    Profile {
        #[arg(long)]
        target: Option<f64>,

        #[arg(long)]
        age: Option<u32>,

        #[arg(long)]
        start_date: Option<NaiveDate>,
    },

    /// Edit settings
    Settings {
        #[arg(long)]
        rest_strength: Option<u32>,

        #[arg(long)]
        rest_easy: Option<u32>,

        /// Every N-th week is a deload week (0 disables)
        #[arg(long)]
        deload_weeks: Option<u32>,

        #[arg(long)]
        program_start: Option<NaiveDate>,
    },

    /// Show progress statistics
    Stats,

    /// Delete all data
    Reset {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut db = Database::open(&cli.db)?;
    let today = Local::now().date_naive();

    match cli.command {
        Some(Commands::Plan { date }) => {
            let plan = db.plan_for(date.unwrap_or(today), today);
            print_plan(&plan);
        }

        Some(Commands::Week) => {
            let snapshot = db.snapshot()?;
            for plan in preview_week(&snapshot.inputs(), today) {
                let names: Vec<&str> = plan.exercises.iter().map(|e| e.name()).collect();
                println!(
                    "{} | {:18} | {}",
                    plan.date.format("%a %m-%d"),
                    plan.mode.label(),
                    names.join(", ")
                );
            }
        }

        Some(Commands::Loads) => {
            let loads = db.get_loads()?;
            if loads.is_empty() {
                println!("No load records yet");
            }
            for (exercise, record) in &loads {
                println!(
                    "{:28} | {:>6.1} lb | fails: {}",
                    exercise, record.current_weight, record.consecutive_fail_count
                );
            }
        }

        Some(Commands::History { limit }) => {
            let sessions = db.get_sessions()?;
            println!("Recent sessions:");
            println!("{:-<60}", "");
            for s in sessions.iter().rev().take(limit) {
                let failed = s.items.iter().filter(|i| i.failed).count();
                println!(
                    "{} | {:18} | {} sets | {} missed",
                    s.date,
                    s.mode.label(),
                    s.items.len(),
                    failed
                );
            }
        }

        Some(Commands::Weight { weight }) => {
            let profile = db.log_weight(today, weight)?;
            println!("Logged: {:.1} lb", weight);
            if let Some(start) = profile.start_weight {
                println!("Change since start: {:+.1} lb", weight - start);
            }
        }

        Some(Commands::Hang { secs }) => {
            let profile = db.log_hang_time(secs)?;
            println!("Best hang: {}s", profile.best_hang_secs);
        }

        Some(Commands::Group { group, exercise, disable, enable, sets, reps }) => {
            let mut entry = db
                .get_group_config()?
                .get(&group)
                .and_then(|g| g.get(&exercise))
                .cloned()
                .unwrap_or_default();
            if disable {
                entry.enabled = false;
            } else if enable {
                entry.enabled = true;
            }
            entry.sets = sets.or(entry.sets);
            entry.reps = reps.or(entry.reps);
            db.set_group_entry(&group, &exercise, &entry)?;
            print_group_entry(&group, &exercise, &entry);
        }

        Some(Commands::Profile { target, age, start_date }) => {
            let mut profile = db.get_profile()?;
            profile.target_weight = target.or(profile.target_weight);
            profile.age = age.or(profile.age);
            profile.start_date = start_date.or(profile.start_date);
            db.save_profile(&profile)?;
            println!("{:#?}", profile);
        }

        Some(Commands::Settings { rest_strength, rest_easy, deload_weeks, program_start }) => {
            let mut settings = db.get_settings()?;
            settings.rest_secs_strength = rest_strength.unwrap_or(settings.rest_secs_strength);
            settings.rest_secs_easy = rest_easy.unwrap_or(settings.rest_secs_easy);
            settings.deload_interval_weeks = deload_weeks.unwrap_or(settings.deload_interval_weeks);
            settings.program_start = program_start.or(settings.program_start);
            db.save_settings(&settings)?;
            println!("{:#?}", settings);
        }

        Some(Commands::Stats) => {
            let snapshot = db.snapshot()?;
            let profile = &snapshot.profile;

            println!("Training Statistics");
            println!("{:-<40}", "");

            match (profile.start_weight, profile.current_weight) {
                (Some(start), Some(current)) => {
                    println!("Body weight: {:.1} lb (start {:.1}, {:+.1})", current, start, current - start);
                }
                _ => println!("Body weight: not logged"),
            }
            if let (Some(target), Some(current)) = (profile.target_weight, profile.current_weight) {
                println!("To target: {:.1} lb", current - target);
            }

            let unlocks = evaluate_unlocks(profile.current_weight, profile.best_hang_secs);
            println!("Best hang: {}s", profile.best_hang_secs);
            println!(
                "Unlocked: bar hang {}, assisted chin-up {}",
                if unlocks.hang_unlocked { "yes" } else { "no" },
                if unlocks.chin_unlocked { "yes" } else { "no" }
            );

            println!("Sessions: {}", snapshot.history.len());
            let week_ago = today - chrono::Duration::days(7);
            let recent = snapshot.history.iter().filter(|s| s.date > week_ago).count();
            println!("Last 7 days: {}", recent);
            if let Some(days) = days_since_last_session(&snapshot.history, today) {
                println!("Days since last session: {}", days);
            }
        }

        Some(Commands::Reset { yes }) => {
            if !yes {
                bail!("refusing to delete data without --yes");
            }
            db.factory_reset()?;
            println!("All data deleted");
        }

        Some(Commands::Tui) | None => {
            let mut app = App::new(db, today)?;
            app.run()?;
        }
    }

    Ok(())
}

fn print_plan(plan: &DayPlan) {
    println!("{} - {}", plan.date.format("%A %Y-%m-%d"), plan.mode.label());
    if plan.deload_week {
        println!("Deload week: one set less on strength work");
    }
    println!("{:-<60}", "");

    if plan.exercises.is_empty() {
        println!("Nothing planned, rest up");
        return;
    }

    for e in &plan.exercises {
        let weight = if e.suggested_weight > 0.0 {
            format!("{:.1} lb", e.suggested_weight)
        } else {
            "-".to_string()
        };
        println!(
            "{:28} | {:7} | {:>8} | {}",
            e.name(),
            e.spec.kind.describe(e.spec.sets),
            weight,
            e.spec.category.label()
        );
    }
}

fn print_group_entry(group: &str, exercise: &str, entry: &GroupConfigEntry) {
    println!(
        "{} / {}: {}{}{}",
        group,
        exercise,
        if entry.enabled { "enabled" } else { "disabled" },
        entry.sets.map(|s| format!(", {} sets", s)).unwrap_or_default(),
        entry.reps.map(|r| format!(", {} reps", r)).unwrap_or_default()
    );
}
