// code-todos/src/surgery.rs

//! In-place edits of a single annotation line.
//!
//! Each operation reads the whole file, builds the modified copy in memory and
//! hands it to [`atomic_rewrite`], so a failure anywhere leaves the source
//! file exactly as it was.

use std::path::Path;
use tracing::debug;

use crate::{
    error::{Result, TodoError},
    record::Record,
    textfile::{SourceText, atomic_rewrite},
    token::TokenGrammar,
};

/// What `remove_annotation` did to the addressed line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    /// The token went away, the code or comment before it stayed.
    Stripped,
    /// Nothing else was on the line, so the line itself was deleted.
    LineDeleted,
}

pub struct SourceEditor<'a> {
    grammar: &'a TokenGrammar,
}

impl<'a> SourceEditor<'a> {
    pub fn new(grammar: &'a TokenGrammar) -> Self { Self { grammar } }

    pub fn remove_annotation(&self, file: &Path, line_number: usize) -> Result<Removal> {
        let mut text = SourceText::read(file)?;
        let line = self.token_line(&text, file, line_number)?;
        let removal = match self.grammar.strip(line) {
            Some(residual) => {
                text.replace(line_number, residual);
                Removal::Stripped
            }
            None => {
                text.remove(line_number);
                Removal::LineDeleted
            }
        };
        atomic_rewrite(file, |w| text.write_to(w))?;
        debug!(file = %file.display(), line = line_number, ?removal, "annotation removed");
        Ok(removal)
    }

    /// Rewrites the token on `old`'s line with `new`'s priority and task.
    /// The line number does not move.
    pub fn change_annotation(&self, file: &Path, old: &Record, new: &Record) -> Result<()> {
        let mut text = SourceText::read(file)?;
        let line = self.token_line(&text, file, old.line_number)?;
        let residual = self.grammar.strip(line);
        let replacement = self.grammar.attach(residual.as_deref(), new.priority, &new.task);
        text.replace(old.line_number, replacement);
        atomic_rewrite(file, |w| text.write_to(w))?;
        debug!(file = %file.display(), line = old.line_number, "annotation changed");
        Ok(())
    }

    /// Inserts a token line at `record.line_number`, padding the file with
    /// blank lines when that is past its end.
    pub fn add_annotation(&self, file: &Path, record: &Record) -> Result<()> {
        let mut text = SourceText::read(file)?;
        while text.len() < record.line_number { text.insert(text.len(), String::new()); }
        text.insert(record.line_number, self.grammar.format_comment(record.priority, &record.task));
        atomic_rewrite(file, |w| text.write_to(w))?;
        debug!(file = %file.display(), line = record.line_number, "annotation added");
        Ok(())
    }

    fn token_line<'t>(&self, text: &'t SourceText, file: &Path, line_number: usize) -> Result<&'t str> {
        let line = text.line(line_number).ok_or_else(|| TodoError::LineOutOfRange {
            path: file.to_path_buf(), line: line_number, len: text.len(),
        })?;
        if !self.grammar.contains(line) {
            return Err(TodoError::TokenMissing { path: file.to_path_buf(), line: line_number });
        }
        Ok(line)
    }
}
