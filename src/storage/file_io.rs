//! File I/O utilities for the table files
//!
//! Each table file is replaced atomically (write to temp, then rename). There
//! is no atomicity across files: a failure between two tables leaves the
//! earlier ones written.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use crate::error::CaltableError;

/// Read a file's raw contents, returning `None` if it doesn't exist
pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Option<Vec<u8>>, CaltableError> {
    let path = path.as_ref();

    match fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CaltableError::Storage(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Read a text file, returning `None` if it doesn't exist.
/// Bytes that are not valid UTF-8 become U+FFFD.
pub fn read_text<P: AsRef<Path>>(path: P) -> Result<Option<String>, CaltableError> {
    Ok(read_bytes(path)?.map(|data| String::from_utf8_lossy(&data).into_owned()))
}

/// Split text into lines on `\n` only, so a `\r` inside a line survives
pub fn split_lines(text: &str) -> Vec<String> {
    text.split_terminator('\n').map(str::to_string).collect()
}

/// Write text to a file atomically (write to temp, then rename)
pub fn write_text_atomic<P: AsRef<Path>>(path: P, text: &str) -> Result<(), CaltableError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CaltableError::Storage(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Temp file in the same directory so the rename stays on one filesystem
    let temp_path = path.with_extension("csv.tmp");

    let file = File::create(&temp_path)
        .map_err(|e| CaltableError::Storage(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    writer
        .write_all(text.as_bytes())
        .map_err(|e| CaltableError::Storage(format!("Failed to write data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| CaltableError::Storage(format!("Failed to flush data: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| CaltableError::Storage(format!("Failed to sync data: {}", e)))?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        CaltableError::Storage(format!("Failed to rename temp file: {}", e))
    })?;

    Ok(())
}

/// Append lines to a file, creating it if absent. Each line gets a `\n`.
pub fn append_lines<P, S>(path: P, lines: &[S]) -> Result<(), CaltableError>
where
    P: AsRef<Path>,
    S: AsRef<str>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            CaltableError::Storage(format!("Failed to open {} for append: {}", path.display(), e))
        })?;

    let mut writer = BufWriter::new(file);
    for line in lines {
        writer.write_all(line.as_ref().as_bytes())?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    Ok(())
}

/// Join lines into file text, `\n`-terminated
pub fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(line.as_ref());
        text.push('\n');
    }
    text
}
