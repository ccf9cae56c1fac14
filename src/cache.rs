// code-todos/src/cache.rs

//! Durable snapshot of the store: `priority|task|script|line`, one per line.

use chrono::Utc;
use std::{fs, io::Write, path::{Path, PathBuf}};
use tracing::{debug, warn};

use crate::{
    error::{Result, TodoError},
    record::{Priority, Record},
    textfile::{atomic_rewrite, read_text},
};

pub const DELIMITER: char = '|';
/// Stands in for `|` inside task text.
pub const ESCAPED_DELIMITER: &str = "(U+007C)";

pub fn escape_task(task: &str) -> String { task.replace(DELIMITER, ESCAPED_DELIMITER) }

pub fn unescape_task(task: &str) -> String { task.replace(ESCAPED_DELIMITER, "|") }

pub fn format_line(r: &Record) -> String {
    format!("{}|{}|{}|{}", r.priority.digit(), escape_task(&r.task), r.script.display(), r.line_number)
}

/// Parses one data line; malformed numbers fall back to Normal / line 0.
pub fn parse_line(line: &str) -> Record {
    let parts: Vec<&str> = line.split(DELIMITER).collect();
    if parts.len() < 4 {
        warn!(line, "cache line has {} of 4 fields; missing ones defaulted", parts.len());
    }
    let priority = parts[0].trim().parse::<i64>().map(Priority::from_number).unwrap_or_default();
    let task = parts.get(1).map(|t| unescape_task(t)).unwrap_or_default();
    let (script, line_number) = match parts.len() {
        0..=2 => (String::new(), 0),
        3 => (parts[2].to_string(), 0),
        n => (parts[2..n - 1].join("|"), parts[n - 1].trim().parse().unwrap_or(0)),
    };
    Record { priority, task, script: PathBuf::from(script), line_number }
}

fn is_ignorable(line: &str) -> bool { line.is_empty() || line == " " || line.starts_with('#') }

/// Missing cache file is an empty cache.
pub fn load(path: &Path) -> Result<Vec<Record>> {
    if !path.exists() {
        debug!(path = %path.display(), "no cache file yet");
        return Ok(Vec::new());
    }
    let text = read_text(path)?;
    Ok(text.lines().filter(|l| !is_ignorable(l)).map(parse_line).collect())
}

pub fn save(path: &Path, records: &[Record]) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| TodoError::io(dir, e))?;
    }
    atomic_rewrite(path, |w| {
        writeln!(w, "# code-todos cache: {} records, written {}", records.len(), Utc::now().to_rfc3339())?;
        for r in records { writeln!(w, "{}", format_line(r))?; }
        Ok(())
    })?;
    debug!(path = %path.display(), count = records.len(), "cache saved");
    Ok(())
}
