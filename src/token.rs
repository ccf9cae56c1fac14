// code-todos/src/token.rs

//! Textual shape of an annotation: `// QQQ2 refactor this`.
//!
//! The marker is followed by an optional priority digit and the task text.
//! Detection is a plain substring search, so the token may sit anywhere on
//! the line, after code or inside a longer comment.

use regex::Regex;

use crate::{error::{Result, TodoError}, record::Priority};

pub const DEFAULT_MARKER: &str = "QQQ";

/// Comment delimiter written in front of fresh tokens.
const COMMENT: &str = "//";

/// Priority and task parsed from one line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub priority: Priority,
    pub task: String,
    /// Byte offset of the marker within the line.
    pub column: usize,
}

#[derive(Clone, Debug)]
pub struct TokenGrammar {
    marker: String,
    pattern: Regex,
}

impl Default for TokenGrammar {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER).expect("default marker compiles")
    }
}

impl TokenGrammar {
    pub fn new(marker: &str) -> Result<Self> {
        if marker.is_empty() { return Err(TodoError::InvalidMarker); }
        let pattern = Regex::new(&format!(r"{}(\d)?[ \t]*(.*)$", regex::escape(marker)))
            .map_err(|_| TodoError::InvalidMarker)?;
        Ok(Self { marker: marker.to_string(), pattern })
    }

    pub fn marker(&self) -> &str { &self.marker }

    pub fn contains(&self, line: &str) -> bool { line.contains(&self.marker) }

    pub fn parse(&self, line: &str) -> Option<Token> {
        let caps = self.pattern.captures(line)?;
        let column = caps.get(0)?.start();
        let priority = caps.get(1)
            .and_then(|m| m.as_str().chars().next())
            .map(Priority::from_digit)
            .unwrap_or_default();
        let task = caps.get(2).map(|m| m.as_str().trim_end()).unwrap_or("").to_string();
        Some(Token { priority, task, column })
    }

    /// Removes the token and the whitespace/slashes in front of it.
    ///
    /// Returns `None` when nothing but the token (and its comment delimiter)
    /// was on the line, meaning the whole line should go. A line without the
    /// marker comes back unchanged.
    pub fn strip(&self, line: &str) -> Option<String> {
        let Some(found) = line.find(&self.marker) else { return Some(line.to_string()) };
        let bytes = line.as_bytes();
        // a marker in column 0 still has to leave index 0 in range for the walk
        let mut cut = found.max(1);
        let mut j = cut - 1;
        while is_strippable(bytes[j]) {
            if j == 0 { return None; }
            j -= 1;
            cut -= 1;
        }
        while !line.is_char_boundary(cut) { cut += 1; }
        Some(line[..cut].to_string())
    }

    /// `// QQQ2 task`
    pub fn format_comment(&self, priority: Priority, task: &str) -> String {
        format!("{COMMENT} {}{} {}", self.marker, priority.digit(), task)
    }

    /// Re-attaches a freshly formatted token to whatever `strip` left behind.
    pub fn attach(&self, residual: Option<&str>, priority: Priority, task: &str) -> String {
        let comment = self.format_comment(priority, task);
        match residual {
            Some(code) => format!("{code} {comment}"),
            None => comment,
        }
    }
}

fn is_strippable(b: u8) -> bool { matches!(b, b' ' | b'\t' | b'/') }
