// code-todos/src/record.rs

use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf, str::FromStr};

/// Priority of an annotation. The discriminant is the digit written after the marker.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent = 1,
    #[default]
    Normal = 2,
    Minor = 3,
}

impl Priority {
    /// Anything outside 1..=3 falls back to `Normal`.
    pub fn from_number(n: i64) -> Self {
        match n {
            1 => Self::Urgent,
            3 => Self::Minor,
            _ => Self::Normal,
        }
    }

    pub fn from_digit(c: char) -> Self {
        c.to_digit(10).map(|d| Self::from_number(d as i64)).unwrap_or_default()
    }

    pub fn digit(self) -> u8 { self as u8 }

    pub fn label(self) -> &'static str {
        match self {
            Self::Urgent => "URGENT",
            Self::Normal => "NORMAL",
            Self::Minor => "MINOR",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.label()) }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "urgent" | "u" => Ok(Self::Urgent),
            "2" | "normal" | "n" => Ok(Self::Normal),
            "3" | "minor" | "m" => Ok(Self::Minor),
            other => Err(format!("unknown priority {other:?} (expected urgent|normal|minor or 1|2|3)")),
        }
    }
}

/// One annotation found in (or destined for) a source file.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Record {
    pub priority: Priority,
    pub task: String,
    /// Path relative to the project root.
    pub script: PathBuf,
    /// Zero-based.
    pub line_number: usize,
}

impl Record {
    pub fn new(priority: Priority, task: impl Into<String>, script: impl Into<PathBuf>, line_number: usize) -> Self {
        Self { priority, task: task.into(), script: script.into(), line_number }
    }

    pub fn is_at(&self, script: &std::path::Path, line_number: usize) -> bool {
        self.line_number == line_number && self.script == script
    }

    /// `Assets/Player.cs, line 12` (one-based, as editors show it).
    pub fn location(&self) -> String {
        format!("{}, line {}", self.script.display(), self.line_number + 1)
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.priority, self.task, self.location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_numbers_default_to_normal() {
        assert_eq!(Priority::from_number(1), Priority::Urgent);
        assert_eq!(Priority::from_number(3), Priority::Minor);
        assert_eq!(Priority::from_number(0), Priority::Normal);
        assert_eq!(Priority::from_number(-4), Priority::Normal);
        assert_eq!(Priority::from_digit('9'), Priority::Normal);
        assert_eq!(Priority::from_digit('x'), Priority::Normal);
    }

    #[test]
    fn urgent_orders_before_minor() {
        assert!(Priority::Urgent < Priority::Normal);
        assert!(Priority::Normal < Priority::Minor);
        assert_eq!(Priority::Minor.digit(), 3);
    }

    #[test]
    fn parses_names_and_digits() {
        assert_eq!("Urgent".parse::<Priority>(), Ok(Priority::Urgent));
        assert_eq!("3".parse::<Priority>(), Ok(Priority::Minor));
        assert!("later".parse::<Priority>().is_err());
    }

    #[test]
    fn location_is_one_based() {
        let r = Record::new(Priority::Normal, "fix jump", "Assets/Player.cs", 11);
        assert_eq!(r.location(), "Assets/Player.cs, line 12");
        assert_eq!(r.to_string(), "[NORMAL] fix jump (Assets/Player.cs, line 12)");
    }
}
