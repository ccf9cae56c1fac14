// code-todos/src/store.rs

use serde::Serialize;
use std::path::Path;

use crate::record::Record;

/// The session's annotations, in display order.
#[derive(Default, Clone, Debug, Serialize)]
pub struct TodoStore {
    items: Vec<Record>,
}

impl TodoStore {
    pub fn new() -> Self { Self::default() }

    pub fn records(&self) -> &[Record] { &self.items }
    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn clear(&mut self) { self.items.clear(); }

    pub fn replace_all(&mut self, records: Vec<Record>) { self.items = records; }

    /// Stable: equal priorities keep their current relative order.
    pub fn sort_by_priority(&mut self) { self.items.sort_by_key(|r| r.priority); }

    pub fn add(&mut self, record: Record) { self.items.push(record); }

    pub fn find(&self, script: &Path, line_number: usize) -> Option<&Record> {
        self.items.iter().find(|r| r.is_at(script, line_number))
    }

    pub fn find_mut(&mut self, script: &Path, line_number: usize) -> Option<&mut Record> {
        self.items.iter_mut().find(|r| r.is_at(script, line_number))
    }

    pub fn remove(&mut self, script: &Path, line_number: usize) -> Option<Record> {
        let idx = self.items.iter().position(|r| r.is_at(script, line_number))?;
        Some(self.items.remove(idx))
    }

    /// Moves every record of `script` at or below `from` by `delta` lines,
    /// mirroring a line inserted (+1) or deleted (-1) in that file.
    pub fn shift_lines(&mut self, script: &Path, from: usize, delta: isize) {
        for r in self.items.iter_mut().filter(|r| r.script == script && r.line_number >= from) {
            r.line_number = r.line_number.saturating_add_signed(delta);
        }
    }
}
