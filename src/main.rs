use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use shiftboard::commands::shift::FormArgs;
use shiftboard::commands::{self, RangeArgs};
use shiftboard::config;
use shiftboard::settings::Settings;
use shiftboard::timesheet::aggregate::SortKey;
use shiftboard::timesheet::models::Role;
use shiftboard::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "shiftboard")]
#[command(about = "Employee timesheets: shifts, daily notes and monthly summaries")]
#[command(version)]
struct Cli {
    #[arg(long, global = true, value_enum, default_value = "text", help = "Output format")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clock in/out and manage shift entries
    Shift(ShiftArgs),
    /// Daily notes and attachments
    Note(NoteArgs),
    /// Totals for a date range
    Summary {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, help = "Employee id (admins only; default: you)")]
        user: Option<String>,
    },
    /// Daily hours bar chart for a month
    Chart {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
        #[arg(long, help = "Employee id (admins only; default: you)")]
        user: Option<String>,
    },
    /// Per-employee stats for a month (admin)
    Leaderboard {
        #[command(flatten)]
        range: RangeArgs,
        #[arg(long, value_enum, default_value = "hours", help = "Sort column")]
        sort: SortKey,
        #[arg(long, help = "Sort ascending instead of descending")]
        asc: bool,
    },
    /// Manage employee profiles (admin)
    Employees(EmployeesArgs),
    /// Show your profile
    Profile,
    /// Show configuration
    Config(ConfigArgs),
}

#[derive(Args)]
struct ShiftArgs {
    #[command(subcommand)]
    action: ShiftAction,
}

#[derive(Subcommand)]
enum ShiftAction {
    /// Start a shift now
    Start,
    /// End the open shift now
    End,
    /// Show the open shift and its elapsed time
    Current {
        #[arg(long, help = "Keep updating the elapsed time every second")]
        watch: bool,
    },
    /// Add a shift manually (times are civil, HH:MM)
    Add {
        #[command(flatten)]
        form: FormArgs,
        #[arg(long, help = "Employee id (admins only; default: you)")]
        user: Option<String>,
    },
    /// Change an existing shift
    Edit {
        id: i64,
        #[command(flatten)]
        form: FormArgs,
    },
    /// Delete a shift
    Delete { id: i64 },
}

#[derive(Args)]
struct NoteArgs {
    #[command(subcommand)]
    action: NoteAction,
}

#[derive(Subcommand)]
enum NoteAction {
    Show {
        #[arg(long, help = "Date YYYY-MM-DD (default: today)")]
        date: Option<String>,
        #[arg(long, help = "Employee id (admins only; default: you)")]
        user: Option<String>,
    },
    /// Create or replace the note for a day
    Save {
        #[arg(long, help = "Date YYYY-MM-DD (default: today)")]
        date: Option<String>,
        #[arg(long)]
        text: Option<String>,
        #[arg(long, help = "File to attach, replacing any current attachment")]
        attach: Option<PathBuf>,
        #[arg(long, conflicts_with = "attach")]
        remove_attachment: bool,
    },
    Delete {
        #[arg(long, help = "Date YYYY-MM-DD (default: today)")]
        date: Option<String>,
    },
}

#[derive(Args)]
struct EmployeesArgs {
    #[command(subcommand)]
    action: EmployeesAction,
}

#[derive(Subcommand)]
enum EmployeesAction {
    List,
    /// Update name, avatar or role
    Set {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        avatar: Option<String>,
        #[arg(long, help = "admin or employee")]
        role: Option<Role>,
    },
}

#[derive(Parser)]
struct ConfigArgs {
    #[command(subcommand)]
    action: ConfigAction,
}

#[derive(Subcommand)]
enum ConfigAction {
    List,
    Get { key: String },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let config = config::load()?;
    let settings = Settings::from_config(&config, cli.format)?;

    match &cli.command {
        Commands::Shift(args) => match &args.action {
            ShiftAction::Start => commands::shift::start(&config, &settings)?,
            ShiftAction::End => commands::shift::end(&config, &settings)?,
            ShiftAction::Current { watch } => {
                commands::shift::current(&config, &settings, *watch)?
            }
            ShiftAction::Add { form, user } => {
                commands::shift::add(&config, &settings, form, user.as_deref())?
            }
            ShiftAction::Edit { id, form } => {
                commands::shift::edit(&config, &settings, *id, form)?
            }
            ShiftAction::Delete { id } => commands::shift::delete(&config, *id)?,
        },
        Commands::Note(args) => match &args.action {
            NoteAction::Show { date, user } => {
                commands::note::show(&config, &settings, date.as_deref(), user.as_deref())?
            }
            NoteAction::Save {
                date,
                text,
                attach,
                remove_attachment,
            } => commands::note::save(
                &config,
                &settings,
                date.as_deref(),
                text.as_deref(),
                attach.as_deref(),
                *remove_attachment,
            )?,
            NoteAction::Delete { date } => {
                commands::note::delete(&config, &settings, date.as_deref())?
            }
        },
        Commands::Summary { range, user } => {
            commands::summary::summary(&config, &settings, range, user.as_deref())?
        }
        Commands::Chart { year, month, user } => {
            commands::summary::chart(&config, &settings, *year, *month, user.as_deref())?
        }
        Commands::Leaderboard { range, sort, asc } => {
            commands::admin::leaderboard(&config, &settings, range, *sort, *asc)?
        }
        Commands::Employees(args) => match &args.action {
            EmployeesAction::List => commands::admin::list_employees(&config, &settings)?,
            EmployeesAction::Set {
                id,
                name,
                avatar,
                role,
            } => commands::admin::set_employee(
                &config,
                id,
                name.clone(),
                avatar.clone(),
                *role,
            )?,
        },
        Commands::Profile => commands::profile::show(&config, &settings)?,
        Commands::Config(args) => match &args.action {
            ConfigAction::List => commands::config::list(&config)?,
            ConfigAction::Get { key } => commands::config::get(key, &config)?,
        },
    }

    Ok(())
}
