//! Backup CLI commands
//!
//! Implements CLI commands for backup management.

use clap::Subcommand;
use std::path::PathBuf;

use crate::backup::{restore_backup, validate_backup, BackupManager};
use crate::config::settings::Settings;
use crate::display::event::format_skipped;
use crate::error::{CaltableError, CaltableResult};
use crate::storage::EventStore;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Create a new backup
    Create {
        /// Where to write the archive (defaults to the backup directory)
        path: Option<PathBuf>,
    },

    /// List backups in the backup directory
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Restore from a backup
    Restore {
        /// Backup filename or path (use 'latest' for most recent)
        backup: String,

        /// Replace current events instead of merging into them
        #[arg(long)]
        overwrite: bool,

        /// Skip confirmation when overwriting
        #[arg(short, long)]
        force: bool,
    },

    /// Show information about a specific backup
    Info {
        /// Backup filename or path
        backup: String,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    store: &EventStore,
    settings: &Settings,
    cmd: BackupCommands,
) -> CaltableResult<()> {
    let manager = BackupManager::new(store.paths().clone());

    match cmd {
        BackupCommands::Create { path } => {
            let backup_path = match path {
                Some(path) => {
                    manager.create_backup(&path)?;
                    path
                }
                None => manager.create_default_backup()?,
            };
            println!("Backup created: {}", backup_path.display());
        }

        BackupCommands::List { verbose } => {
            let backups = manager.list_backups()?;

            if backups.is_empty() {
                println!("No backups found.");
                println!("Create one with: caltable backup create");
                return Ok(());
            }

            println!("Available Backups");
            println!("=================");
            println!();

            for (i, backup) in backups.iter().enumerate() {
                let age = chrono::Utc::now().signed_duration_since(backup.created_at);

                if verbose {
                    println!(
                        "{}. {}\n   Created: {}\n   Size: {}\n   Age: {}\n",
                        i + 1,
                        backup.filename,
                        backup.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        format_size(backup.size_bytes),
                        format_duration(age),
                    );
                } else {
                    println!(
                        "  {}. {} ({} ago, {})",
                        i + 1,
                        backup.filename,
                        format_duration(age),
                        format_size(backup.size_bytes),
                    );
                }
            }

            println!();
            println!("Total: {} backup(s)", backups.len());
        }

        BackupCommands::Restore {
            backup,
            overwrite,
            force,
        } => {
            let backup_path = resolve_backup_path(&manager, &backup)?;
            let validation = validate_backup(&backup_path)?;

            println!("File:   {}", backup_path.display());
            println!("Status: {}", validation.summary());
            println!();

            if overwrite && !force {
                println!("WARNING: This will replace ALL current events!");
                println!("To proceed, run again with --force flag:");
                println!("  caltable backup restore {} --overwrite --force", backup);
                return Ok(());
            }

            if settings.pre_restore_backup {
                let snapshot = manager.create_default_backup()?;
                println!("Pre-restore backup saved: {}", snapshot.display());
            }

            let report = restore_backup(&backup_path, overwrite, store)?;

            println!("{}", report.summary());
            for (from, to) in &report.merge.remapped {
                println!("  event #{} stored as #{}", from, to);
            }
            if !report.skipped.is_empty() {
                print!("{}", format_skipped(&report.skipped));
            }
        }

        BackupCommands::Info { backup } => {
            let backup_path = resolve_backup_path(&manager, &backup)?;
            let validation = validate_backup(&backup_path)?;
            let metadata = std::fs::metadata(&backup_path)?;

            println!("Backup Details");
            println!("==============");
            println!("File: {}", backup_path.display());
            println!("Size: {}", format_size(metadata.len()));
            println!();
            println!("Sections:");
            for (name, lines) in &validation.sections {
                println!("  {:16} {} line(s)", name, lines);
            }
            println!();
            println!("Status: {}", validation.summary());
        }
    }

    Ok(())
}

/// Resolve a backup identifier to a full path
fn resolve_backup_path(manager: &BackupManager, backup: &str) -> CaltableResult<PathBuf> {
    if backup.eq_ignore_ascii_case("latest") {
        return manager
            .latest_backup()?
            .map(|b| b.path)
            .ok_or_else(|| CaltableError::backup_not_found("latest"));
    }

    let path = manager.resolve(backup);
    if path.exists() {
        Ok(path)
    } else {
        Err(CaltableError::backup_not_found(backup))
    }
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }

    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }

    format!("{}d", hours / 24)
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
