// code-todos/src/scanner.rs

use serde::Serialize;
use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::{
    discovery::children,
    error::Result,
    exclude::ExclusionList,
    record::Record,
    textfile::{read_text, strip_bom},
    token::TokenGrammar,
};

/// Extensions scanned when the configuration names none.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "cs", "js", "boo", "shader", "cginc", "hlsl", "compute", "glsl",
    "c", "cc", "cpp", "h", "hpp", "rs", "go", "java", "kt", "ts", "lua", "py",
];

#[derive(Clone, Debug, Serialize)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ScanReport {
    /// In traversal order; the store sorts them.
    pub records: Vec<Record>,
    pub files_scanned: usize,
    pub skipped: Vec<Skipped>,
}

pub struct Scanner<'a> {
    grammar: &'a TokenGrammar,
    exclusions: &'a ExclusionList,
    /// Lowercase, without the dot. Empty means every file.
    extensions: Vec<String>,
}

impl<'a> Scanner<'a> {
    pub fn new(grammar: &'a TokenGrammar, exclusions: &'a ExclusionList) -> Self {
        Self { grammar, exclusions, extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect() }
    }

    pub fn with_extensions<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = exts.into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        self
    }

    /// Breadth-first walk of `source_dir`. Scripts are recorded relative to
    /// `project_root`. Unreadable entries are logged and reported, never fatal.
    pub fn scan(&self, project_root: &Path, source_dir: &Path) -> ScanReport {
        let mut report = ScanReport::default();
        let mut queue = VecDeque::from([source_dir.to_path_buf()]);
        while let Some(dir) = queue.pop_front() {
            for entry in children(&dir) {
                let entry = match entry {
                    Ok(e) => e,
                    Err(err) => {
                        let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| dir.clone());
                        warn!(path = %path.display(), error = %err, "skipping unreadable entry");
                        report.skipped.push(Skipped { path, reason: err.to_string() });
                        continue;
                    }
                };
                let path = entry.path();
                let rel = path.strip_prefix(project_root).unwrap_or(path);
                if self.exclusions.is_excluded(rel) {
                    debug!(path = %rel.display(), "excluded");
                    continue;
                }
                if entry.file_type().is_dir() {
                    queue.push_back(path.to_path_buf());
                    continue;
                }
                if !path.is_file() || !self.is_eligible(path) { continue; }
                match self.scan_file(path, rel) {
                    Ok(found) => {
                        report.files_scanned += 1;
                        report.records.extend(found);
                    }
                    Err(err) => {
                        warn!(path = %rel.display(), error = %err, "skipping file");
                        report.skipped.push(Skipped { path: rel.to_path_buf(), reason: err.to_string() });
                    }
                }
            }
        }
        info!(files = report.files_scanned, records = report.records.len(), skipped = report.skipped.len(), "scan finished");
        report
    }

    pub fn scan_file(&self, path: &Path, script: &Path) -> Result<Vec<Record>> {
        Ok(self.scan_text(&read_text(path)?, script))
    }

    pub fn scan_text(&self, text: &str, script: &Path) -> Vec<Record> {
        strip_bom(text).lines()
            .enumerate()
            .filter_map(|(i, line)| {
                self.grammar.parse(line).map(|t| Record {
                    priority: t.priority, task: t.task, script: script.to_path_buf(), line_number: i,
                })
            })
            .collect()
    }

    fn is_eligible(&self, path: &Path) -> bool {
        if self.extensions.is_empty() { return true; }
        path.extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .is_some_and(|e| self.extensions.iter().any(|x| *x == e))
    }
}
