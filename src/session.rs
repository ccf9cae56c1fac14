// code-todos/src/session.rs

//! One editing session over a project: the store plus everything needed to
//! keep it, the source files and the cache in step.

use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::{error, info, warn};

use crate::{
    cache,
    config::{Config, EditorConfig},
    discovery::find_folder,
    editor::EditorCommand,
    error::{Result, TodoError},
    exclude::ExclusionList,
    record::{Priority, Record},
    scanner::{Scanner, Skipped},
    store::TodoStore,
    surgery::{Removal, SourceEditor},
    token::TokenGrammar,
};

/// Used when no data folder exists under the source tree.
pub const FALLBACK_DATA_DIR: &str = ".codetodos";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectPaths {
    pub root: PathBuf,
    pub source_dir: PathBuf,
    pub data_dir: PathBuf,
    pub cache_file: PathBuf,
    pub exclude_file: PathBuf,
}

impl ProjectPaths {
    pub fn resolve(root: &Path, cfg: &Config) -> Self {
        let root = &normalize(root);
        let source_dir = match cfg.source_dir() {
            p if p == Path::new(".") || p.as_os_str().is_empty() => root.to_path_buf(),
            p => root.join(p),
        };
        let data_dir = Some(&source_dir)
            .filter(|d| d.is_dir())
            .and_then(|d| find_folder(d, cfg.data_folder()))
            .unwrap_or_else(|| root.join(FALLBACK_DATA_DIR));
        Self {
            root: root.to_path_buf(),
            cache_file: data_dir.join(cfg.cache_file()),
            exclude_file: data_dir.join(cfg.exclude_file()),
            source_dir,
            data_dir,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ScanSummary {
    pub files_scanned: usize,
    pub records: usize,
    pub skipped: Vec<Skipped>,
}

pub struct Session {
    paths: ProjectPaths,
    grammar: TokenGrammar,
    extensions: Vec<String>,
    exclusions: ExclusionList,
    editor: EditorConfig,
    store: TodoStore,
}

impl Session {
    /// Starts with an empty store; call `load_or_scan` or `refresh` to fill it.
    pub fn open(root: &Path, cfg: &Config) -> Result<Self> {
        let paths = ProjectPaths::resolve(root, cfg);
        let exclusions = ExclusionList::load(&paths.exclude_file)?;
        info!(root = %paths.root.display(), data = %paths.data_dir.display(), "session opened");
        Ok(Self {
            grammar: TokenGrammar::new(cfg.marker())?,
            extensions: cfg.extensions(),
            exclusions,
            editor: cfg.editor.clone(),
            store: TodoStore::new(),
            paths,
        })
    }

    pub fn paths(&self) -> &ProjectPaths { &self.paths }
    pub fn grammar(&self) -> &TokenGrammar { &self.grammar }
    pub fn store(&self) -> &TodoStore { &self.store }
    pub fn records(&self) -> &[Record] { self.store.records() }

    /// Accepts either a root-relative path or an absolute one inside the root.
    pub fn script_path(&self, input: &Path) -> PathBuf {
        input.strip_prefix(&self.paths.root).unwrap_or(input).to_path_buf()
    }

    /// Resolves a script named from `cwd`: a relative name that exists there
    /// wins, anything else is taken relative to the project root.
    pub fn locate_script(&self, input: &Path, cwd: &Path) -> PathBuf {
        if input.is_relative() {
            let from_cwd = normalize(&cwd.join(input));
            if from_cwd.is_file() { return self.script_path(&from_cwd); }
        }
        self.script_path(input)
    }

    fn absolute(&self, script: &Path) -> PathBuf { self.paths.root.join(script) }

    pub fn load_cached(&mut self) -> Result<usize> {
        let records = cache::load(&self.paths.cache_file)?;
        self.store.replace_all(records);
        self.store.sort_by_priority();
        Ok(self.store.len())
    }

    /// The cache when it has anything in it, a full scan otherwise.
    pub fn load_or_scan(&mut self) -> Result<usize> {
        match self.load_cached() {
            Ok(n) if n > 0 => return Ok(n),
            Ok(_) => {}
            Err(err) => warn!(error = %err, "cache unreadable; rescanning"),
        }
        Ok(self.refresh()?.records)
    }

    pub fn refresh(&mut self) -> Result<ScanSummary> {
        self.exclusions = ExclusionList::load(&self.paths.exclude_file)?;
        let report = Scanner::new(&self.grammar, &self.exclusions)
            .with_extensions(&self.extensions)
            .scan(&self.paths.root, &self.paths.source_dir);
        let summary = ScanSummary {
            files_scanned: report.files_scanned,
            records: report.records.len(),
            skipped: report.skipped,
        };
        self.store.replace_all(report.records);
        self.store.sort_by_priority();
        self.persist_cache();
        Ok(summary)
    }

    pub fn save_cache(&self) -> Result<()> { cache::save(&self.paths.cache_file, self.store.records()) }

    /// The cache is only a shortcut; failing to write it never undoes an edit.
    fn persist_cache(&self) {
        if let Err(err) = self.save_cache() {
            warn!(path = %self.paths.cache_file.display(), error = %err, "could not write cache");
        }
    }

    pub fn add(&mut self, mut record: Record) -> Result<()> {
        record.task = validate_task(&record.task)?;
        record.script = self.script_path(&record.script);
        let file = self.absolute(&record.script);
        SourceEditor::new(&self.grammar).add_annotation(&file, &record)
            .inspect_err(|e| error!(error = %e, record = %record, "add failed"))?;
        self.store.shift_lines(&record.script, record.line_number, 1);
        info!(record = %record, "annotation added");
        self.store.add(record);
        self.store.sort_by_priority();
        self.persist_cache();
        Ok(())
    }

    pub fn edit(&mut self, script: &Path, line_number: usize, priority: Priority, task: &str) -> Result<Record> {
        let script = self.script_path(script);
        let task = validate_task(task)?;
        let old = self.store.find(&script, line_number)
            .cloned()
            .ok_or_else(|| TodoError::NotFound { script: script.clone(), line: line_number })?;
        let new = Record { priority, task, ..old.clone() };
        SourceEditor::new(&self.grammar).change_annotation(&self.absolute(&script), &old, &new)
            .inspect_err(|e| error!(error = %e, record = %old, "edit failed"))?;
        if let Some(r) = self.store.find_mut(&script, line_number) { *r = new.clone(); }
        self.store.sort_by_priority();
        self.persist_cache();
        info!(record = %new, "annotation changed");
        Ok(new)
    }

    /// Removes the token from its file and the record from the store.
    pub fn complete(&mut self, script: &Path, line_number: usize) -> Result<Record> {
        let script = self.script_path(script);
        if self.store.find(&script, line_number).is_none() {
            return Err(TodoError::NotFound { script, line: line_number });
        }
        let removal = SourceEditor::new(&self.grammar).remove_annotation(&self.absolute(&script), line_number)
            .inspect_err(|e| error!(error = %e, script = %script.display(), line = line_number, "complete failed"))?;
        let done = self.store.remove(&script, line_number)
            .ok_or_else(|| TodoError::NotFound { script: script.clone(), line: line_number })?;
        if removal == Removal::LineDeleted { self.store.shift_lines(&script, line_number + 1, -1); }
        self.persist_cache();
        info!(record = %done, ?removal, "annotation completed");
        Ok(done)
    }

    pub fn open_in_editor(&self, script: &Path, line_number: usize) -> Result<()> {
        let editor = EditorCommand::resolve(&self.editor).ok_or(TodoError::NoEditor)?;
        editor.launch(&self.absolute(&self.script_path(script)), line_number)
    }
}

/// Tasks live on a single source line.
/// Lexically folds `.` and `..` so the result can be compared with the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in path.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => { out.pop(); }
            other => out.push(other),
        }
    }
    out
}

pub fn validate_task(task: &str) -> Result<String> {
    let task = task.trim();
    if task.is_empty() { return Err(TodoError::InvalidTask("task is empty".into())); }
    if task.contains(['\n', '\r']) { return Err(TodoError::InvalidTask("task spans several lines".into())); }
    Ok(task.to_string())
}
