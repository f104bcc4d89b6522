use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use caltable::cli::{handle_backup_command, handle_event_command, BackupCommands, EventCommands};
use caltable::config::{paths::CaltablePaths, settings::Settings};
use caltable::display::format_skipped;
use caltable::storage::EventStore;

#[derive(Parser)]
#[command(
    name = "caltable",
    author = "Kaylee Beyene",
    version,
    about = "Flat-file calendar with recurring events and backups",
    long_about = "caltable keeps calendar events in plain comma-separated tables. \
                  It expands recurring events, warns about overlapping events, \
                  and archives the tables into a single backup file."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Event management commands
    #[command(subcommand, alias = "ev")]
    Event(EventCommands),

    /// Backup and restore commands
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Show current configuration and paths
    Config,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("CALTABLE_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = CaltablePaths::new()?;
    paths.ensure_directories()?;
    let settings = Settings::load_or_create(&paths)?;

    let (store, report) = EventStore::open(paths.clone())?;
    if !report.skipped.is_empty() {
        eprintln!(
            "Warning: {} invalid row(s) were skipped while loading:",
            report.skipped.len()
        );
        eprint!("{}", format_skipped(&report.skipped));
    }

    match cli.command {
        Some(Commands::Event(cmd)) => {
            handle_event_command(&store, &settings, cmd)?;
        }
        Some(Commands::Backup(cmd)) => {
            handle_backup_command(&store, &settings, cmd)?;
        }
        Some(Commands::Config) => {
            println!("caltable Configuration");
            println!("======================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Backup directory: {}", paths.backup_dir().display());
            println!("Settings file:    {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            match settings.default_reminder_minutes {
                Some(minutes) => println!("  Default reminder:   {} minutes", minutes),
                None => println!("  Default reminder:   none"),
            }
            println!("  Pre-restore backup: {}", settings.pre_restore_backup);
            println!("  Conflict checks:    {}", settings.check_conflicts);
            println!();
            println!("Events loaded: {}", report.loaded);
        }
        None => {
            println!("caltable - flat-file calendar");
            println!();
            println!("Run 'caltable --help' for usage information.");
        }
    }

    Ok(())
}
