//! Sectioned backup archive format
//!
//! An archive is plain UTF-8 text. Each section starts with a marker line
//! `--- <name> ---` and holds the raw lines of one table file until the next
//! marker or the end of the file. Whitespace around a marker is ignored.
//! Lines before the first marker belong to no section and are dropped.

use std::fs;
use std::path::Path;

use crate::error::{CaltableError, CaltableResult};

/// Section body written for a table file that doesn't exist
pub const MISSING_FILE_LINE: &str = "# (file missing)";

const MARKER: &str = "---";

/// Marker line introducing the section `name`
pub fn marker_line(name: &str) -> String {
    format!("{} {} {}", MARKER, name, MARKER)
}

/// Section name if `line` is a marker line
pub fn parse_marker(line: &str) -> Option<&str> {
    let inner = line
        .trim()
        .strip_prefix(MARKER)?
        .strip_suffix(MARKER)?
        .trim();
    if inner.is_empty() {
        None
    } else {
        Some(inner)
    }
}

/// One named group of raw lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub lines: Vec<String>,
}

/// Sections in the order they first appear
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BackupArchive {
    sections: Vec<Section>,
}

impl BackupArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add lines under `name`. A name seen before gets the lines appended
    /// to its existing group.
    pub fn push_lines<I, S>(&mut self, name: &str, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines = lines.into_iter().map(Into::into);
        match self.sections.iter_mut().find(|s| s.name == name) {
            Some(section) => section.lines.extend(lines),
            None => self.sections.push(Section {
                name: name.to_string(),
                lines: lines.collect(),
            }),
        }
    }

    /// Lines of a section, if present
    pub fn section(&self, name: &str) -> Option<&[String]> {
        self.sections
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.lines.as_slice())
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Split archive text into sections
    pub fn parse(text: &str) -> Self {
        let mut archive = Self::new();
        let mut current: Option<String> = None;

        // Only '\n' ends a line; a '\r' belongs to the table's own bytes
        for line in text.split_terminator('\n') {
            if let Some(name) = parse_marker(line) {
                archive.push_lines(name, std::iter::empty::<String>());
                current = Some(name.to_string());
            } else if let Some(name) = &current {
                archive.push_lines(name, [line]);
            }
        }

        archive
    }

    /// Archive text, every line `\n`-terminated
    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push_str(&marker_line(&section.name));
            out.push('\n');
            for line in &section.lines {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }

    /// Read and parse an archive file
    pub fn read(path: &Path) -> CaltableResult<Self> {
        if !path.exists() {
            return Err(CaltableError::backup_not_found(path.display().to_string()));
        }
        let data = fs::read(path)
            .map_err(|e| CaltableError::Io(format!("Failed to read backup file: {}", e)))?;
        Ok(Self::parse(&String::from_utf8_lossy(&data)))
    }

    /// Write the archive, creating parent directories as needed
    pub fn write(&self, path: &Path) -> CaltableResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                CaltableError::Io(format!("Failed to create backup directory: {}", e))
            })?;
        }
        fs::write(path, self.render())
            .map_err(|e| CaltableError::Io(format!("Failed to write backup file: {}", e)))
    }
}
