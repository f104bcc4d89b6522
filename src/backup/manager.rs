//! Backup creation and housekeeping
//!
//! A backup copies the core event table and the recurrence table, verbatim
//! and in that order, into one sectioned archive. The metadata and reminder
//! tables are not part of it.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::info;

use super::archive::{BackupArchive, MISSING_FILE_LINE};
use crate::config::paths::{CaltablePaths, EVENTS_FILE, RECURRENCE_FILE};
use crate::error::{CaltableError, CaltableResult};
use crate::storage::file_io::{read_text, split_lines};

const BACKUP_PREFIX: &str = "backup-";
const BACKUP_EXTENSION: &str = "txt";

/// Metadata about a backup in the backup directory
#[derive(Debug, Clone)]
pub struct BackupInfo {
    /// Backup filename
    pub filename: String,
    /// Full path to backup
    pub path: PathBuf,
    /// When the backup was created, from its filename
    pub created_at: DateTime<Utc>,
    /// Size in bytes
    pub size_bytes: u64,
}

/// Creates backups and lists the ones in the backup directory
pub struct BackupManager {
    backup_dir: PathBuf,
    paths: CaltablePaths,
}

impl BackupManager {
    pub fn new(paths: CaltablePaths) -> Self {
        let backup_dir = paths.backup_dir();
        Self { backup_dir, paths }
    }

    /// Get backup directory path
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Snapshot the core and recurrence tables into an archive at `path`.
    ///
    /// Parent directories are created. A table file that doesn't exist is
    /// recorded as a single `# (file missing)` line.
    pub fn create_backup(&self, path: &Path) -> CaltableResult<BackupArchive> {
        let mut archive = BackupArchive::new();
        archive.push_lines(EVENTS_FILE, table_lines(&self.paths.events_file())?);
        archive.push_lines(RECURRENCE_FILE, table_lines(&self.paths.recurrence_file())?);

        archive.write(path)?;

        info!(path = %path.display(), "created backup");
        Ok(archive)
    }

    /// Create a backup at [`default_backup_path`](Self::default_backup_path)
    pub fn create_default_backup(&self) -> CaltableResult<PathBuf> {
        let path = self.default_backup_path();
        self.create_backup(&path)?;
        Ok(path)
    }

    /// `<backup_dir>/backup-YYYYMMDD-HHMMSS-mmm.txt` for the current time
    pub fn default_backup_path(&self) -> PathBuf {
        let now = Utc::now();
        let filename = format!(
            "{}{}-{:03}.{}",
            BACKUP_PREFIX,
            now.format("%Y%m%d-%H%M%S"),
            now.timestamp_subsec_millis(),
            BACKUP_EXTENSION
        );
        self.backup_dir.join(filename)
    }

    /// All backups in the backup directory, newest first
    pub fn list_backups(&self) -> CaltableResult<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();

        for entry in fs::read_dir(&self.backup_dir)
            .map_err(|e| CaltableError::Io(format!("Failed to read backup directory: {}", e)))?
        {
            let entry = entry
                .map_err(|e| CaltableError::Io(format!("Failed to read directory entry: {}", e)))?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == BACKUP_EXTENSION) {
                if let Some(info) = parse_backup_info(&path) {
                    backups.push(info);
                }
            }
        }

        backups.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(backups)
    }

    /// Get the most recent backup
    pub fn latest_backup(&self) -> CaltableResult<Option<BackupInfo>> {
        Ok(self.list_backups()?.into_iter().next())
    }

    /// Resolve a backup given as a path or as a filename in the backup directory
    pub fn resolve(&self, name: &str) -> PathBuf {
        let as_path = PathBuf::from(name);
        if as_path.exists() || as_path.components().count() > 1 {
            as_path
        } else {
            self.backup_dir.join(name)
        }
    }
}

/// Raw lines of a table file, or the missing-file marker
fn table_lines(path: &Path) -> CaltableResult<Vec<String>> {
    Ok(match read_text(path)? {
        Some(text) => split_lines(&text),
        None => vec![MISSING_FILE_LINE.to_string()],
    })
}

fn parse_backup_info(path: &Path) -> Option<BackupInfo> {
    let filename = path.file_name()?.to_string_lossy().to_string();

    let stamp = filename
        .strip_prefix(BACKUP_PREFIX)?
        .strip_suffix(BACKUP_EXTENSION)?
        .strip_suffix('.')?;
    let created_at = parse_backup_timestamp(stamp)?;

    let size_bytes = fs::metadata(path).ok()?.len();

    Some(BackupInfo {
        filename,
        path: path.to_path_buf(),
        created_at,
        size_bytes,
    })
}

/// Parse `YYYYMMDD-HHMMSS` with an optional `-mmm` millisecond part
fn parse_backup_timestamp(stamp: &str) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = stamp.split('-').collect();
    let (date_part, time_part, millis) = match parts.as_slice() {
        [date, time] => (*date, *time, 0),
        [date, time, millis] => (*date, *time, millis.parse().ok()?),
        _ => return None,
    };

    if date_part.len() != 8 || time_part.len() != 6 {
        return None;
    }

    let date = NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()?;
    let time = NaiveTime::parse_from_str(time_part, "%H%M%S").ok()?;
    let datetime = date.and_time(time) + chrono::Duration::milliseconds(millis);

    Some(DateTime::from_naive_utc_and_offset(datetime, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use std::fs;
    use tempfile::TempDir;

    fn create_test_manager() -> (BackupManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CaltablePaths::with_base_dir(temp_dir.path().to_path_buf());
        paths.ensure_directories().unwrap();
        (BackupManager::new(paths), temp_dir)
    }

    #[test]
    fn test_create_backup_copies_tables_verbatim() {
        let (manager, temp) = create_test_manager();
        let events = "eventId,title,description,startDateTime,endDateTime\n\
                      1,\"Notes\",\"line one\nline two\",2025-10-05T09:00:00,2025-10-05T10:00:00\n";
        fs::write(manager.paths.events_file(), events).unwrap();

        let path = temp.path().join("out").join("b.txt");
        manager.create_backup(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            format!(
                "--- event.csv ---\n{}--- recurrent.csv ---\n# (file missing)\n",
                events
            )
        );
    }

    #[test]
    fn test_create_backup_keeps_carriage_returns() {
        let (manager, temp) = create_test_manager();
        let events = "eventId,title,description,startDateTime,endDateTime\n\
                      1,Notes,\"dos\r\nstyle\",2025-10-05T09:00:00,2025-10-05T10:00:00\n";
        fs::write(manager.paths.events_file(), events).unwrap();

        let path = temp.path().join("crlf.txt");
        let archive = manager.create_backup(&path).unwrap();

        assert_eq!(BackupArchive::read(&path).unwrap(), archive);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"dos\r\nstyle\""));
    }

    #[test]
    fn test_default_backup_is_listed() {
        let (manager, _temp) = create_test_manager();
        assert!(manager.latest_backup().unwrap().is_none());

        let path = manager.create_default_backup().unwrap();
        assert!(path.starts_with(manager.backup_dir()));

        let latest = manager.latest_backup().unwrap().unwrap();
        assert_eq!(latest.path, path);
        assert!(latest.size_bytes > 0);
    }

    #[test]
    fn test_list_backups_newest_first() {
        let (manager, _temp) = create_test_manager();
        let dir = manager.backup_dir().to_path_buf();
        fs::write(dir.join("backup-20250101-090000.txt"), "").unwrap();
        fs::write(dir.join("backup-20251127-143022-456.txt"), "").unwrap();
        fs::write(dir.join("backup-20250601-120000.txt"), "").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();
        fs::write(dir.join("backup-20250601-120000.json"), "").unwrap();

        let names: Vec<_> = manager
            .list_backups()
            .unwrap()
            .into_iter()
            .map(|b| b.filename)
            .collect();
        assert_eq!(
            names,
            vec![
                "backup-20251127-143022-456.txt",
                "backup-20250601-120000.txt",
                "backup-20250101-090000.txt",
            ]
        );
    }

    #[test]
    fn test_empty_backup_dir() {
        let temp_dir = TempDir::new().unwrap();
        let manager =
            BackupManager::new(CaltablePaths::with_base_dir(temp_dir.path().join("absent")));
        assert!(manager.list_backups().unwrap().is_empty());
    }

    #[test]
    fn test_parse_backup_timestamp() {
        let ts = parse_backup_timestamp("20251127-143022").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2025, 11, 27));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (14, 30, 22));

        let ts = parse_backup_timestamp("20251127-143022-456").unwrap();
        assert_eq!(ts.timestamp_subsec_millis(), 456);

        assert!(parse_backup_timestamp("20251327-143022").is_none());
        assert!(parse_backup_timestamp("2025-11-27").is_none());
        assert!(parse_backup_timestamp("latest").is_none());
    }

    #[test]
    fn test_resolve() {
        let (manager, _temp) = create_test_manager();
        assert_eq!(
            manager.resolve("backup-20250101-090000.txt"),
            manager.backup_dir().join("backup-20250101-090000.txt")
        );
        assert_eq!(
            manager.resolve("elsewhere/b.txt"),
            PathBuf::from("elsewhere/b.txt")
        );
    }
}
