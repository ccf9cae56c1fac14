// code-todos/src/config.rs

use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};

use crate::{scanner::DEFAULT_EXTENSIONS, token::DEFAULT_MARKER};

/// Merged user -> workspace -> runtime (CLI flags, never persisted).
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub storage: StorageConfig,
    pub editor: EditorConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    pub marker: Option<String>,        // default "QQQ"
    pub source_dir: Option<PathBuf>,   // relative to the project root; default "Assets"
    pub extensions: Vec<String>,       // empty = DEFAULT_EXTENSIONS
    pub all_files: Option<bool>,       // ignore extensions entirely
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub data_folder: Option<String>,   // searched breadth-first under source_dir; default "CodeTODOs"
    pub cache_file: Option<String>,    // default "todos.cache"
    pub exclude_file: Option<String>,  // default "exclude.txt"
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct EditorConfig {
    pub command: Option<String>,       // falls back to $VISUAL, then $EDITOR
    pub args: Vec<String>,             // {file} and {line}; default ["+{line}", "{file}"]
}

impl Config {
    pub fn marker(&self) -> &str { self.scan.marker.as_deref().unwrap_or(DEFAULT_MARKER) }

    pub fn source_dir(&self) -> &Path { self.scan.source_dir.as_deref().unwrap_or(Path::new("Assets")) }

    pub fn extensions(&self) -> Vec<String> {
        if self.scan.all_files == Some(true) { return Vec::new(); }
        if self.scan.extensions.is_empty() {
            DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
        } else {
            self.scan.extensions.clone()
        }
    }

    pub fn data_folder(&self) -> &str { self.storage.data_folder.as_deref().unwrap_or("CodeTODOs") }
    pub fn cache_file(&self) -> &str { self.storage.cache_file.as_deref().unwrap_or("todos.cache") }
    pub fn exclude_file(&self) -> &str { self.storage.exclude_file.as_deref().unwrap_or("exclude.txt") }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Scope { User, Workspace, Runtime }

fn merge(a: &mut Config, b: &Config) {
    let overlay = |dst: &mut Option<String>, src: &Option<String>| { if src.is_some() { *dst = src.clone(); } };
    overlay(&mut a.scan.marker, &b.scan.marker);
    if b.scan.source_dir.is_some() { a.scan.source_dir = b.scan.source_dir.clone(); }
    if !b.scan.extensions.is_empty() { a.scan.extensions = b.scan.extensions.clone(); }
    if b.scan.all_files.is_some() { a.scan.all_files = b.scan.all_files; }

    overlay(&mut a.storage.data_folder, &b.storage.data_folder);
    overlay(&mut a.storage.cache_file, &b.storage.cache_file);
    overlay(&mut a.storage.exclude_file, &b.storage.exclude_file);

    overlay(&mut a.editor.command, &b.editor.command);
    if !b.editor.args.is_empty() { a.editor.args = b.editor.args.clone(); }
}

pub const WORKSPACE_FILE: &str = ".codetodos.toml";

fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("dev", "code-todos", "codetodos").map(|p| p.config_dir().join("config.toml"))
}

pub struct ConfigManager {
    merged: Config,
    user_path: Option<PathBuf>,
    workspace_path: PathBuf,
    runtime_overlay: Config,
}

impl ConfigManager {
    pub fn load(project_root: impl AsRef<Path>) -> Result<Self> {
        Self::with_paths(user_config_path(), project_root.as_ref().join(WORKSPACE_FILE))
    }

    pub fn with_paths(user_path: Option<PathBuf>, workspace_path: PathBuf) -> Result<Self> {
        let mut cm = Self { merged: Config::default(), user_path, workspace_path, runtime_overlay: Config::default() };
        cm.reload_all()?;
        Ok(cm)
    }

    /// Absent file is `None`; a file that fails to parse is an error.
    fn read_file(path: &Path) -> Result<Option<Config>> {
        if !path.exists() { return Ok(None); }
        let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        let cfg = toml::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
        Ok(Some(cfg))
    }

    pub fn reload_all(&mut self) -> Result<()> {
        let mut merged = Config::default();
        if let Some(p) = &self.user_path {
            if let Some(usr) = Self::read_file(p)? { merge(&mut merged, &usr); }
        }
        if let Some(ws) = Self::read_file(&self.workspace_path)? { merge(&mut merged, &ws); }
        merge(&mut merged, &self.runtime_overlay);
        self.merged = merged;
        Ok(())
    }

    pub fn get(&self) -> &Config { &self.merged }

    pub fn apply_runtime_overlay(&mut self, patch: Config) -> Result<()> {
        merge(&mut self.runtime_overlay, &patch);
        self.reload_all()
    }

    pub fn path(&self, scope: Scope) -> Option<&Path> {
        match scope {
            Scope::User => self.user_path.as_deref(),
            Scope::Workspace => Some(&self.workspace_path),
            Scope::Runtime => None,
        }
    }

    pub fn write_patch(&mut self, scope: Scope, patch: &Config) -> Result<()> {
        let path = match scope {
            Scope::Runtime => bail!("Runtime scope is ephemeral; cannot persist"),
            s => self.path(s).context("no user config directory on this platform")?.to_path_buf(),
        };
        if let Some(dir) = path.parent() { fs::create_dir_all(dir)?; }
        let mut merged = Self::read_file(&path)?.unwrap_or_default();
        merge(&mut merged, patch);
        let text = toml::to_string_pretty(&merged).context("serialize toml")?;
        fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
        self.reload_all()
    }
}

/// Builds a one-field patch from a dotted key, e.g. `scan.marker TODOQ`.
pub fn patch_for(key: &str, value: &str) -> Result<Config> {
    let mut patch = Config::default();
    let list = |v: &str| -> Vec<String> {
        v.split([',', ' ']).map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect()
    };
    match key {
        "scan.marker" => {
            if value.is_empty() { bail!("scan.marker must not be empty"); }
            patch.scan.marker = Some(value.into());
        }
        "scan.source_dir" => patch.scan.source_dir = Some(value.into()),
        "scan.extensions" => patch.scan.extensions = list(value),
        "scan.all_files" => patch.scan.all_files = Some(value.parse::<bool>()?),
        "storage.data_folder" => patch.storage.data_folder = Some(value.into()),
        "storage.cache_file" => patch.storage.cache_file = Some(value.into()),
        "storage.exclude_file" => patch.storage.exclude_file = Some(value.into()),
        "editor.command" => patch.editor.command = Some(value.into()),
        "editor.args" => patch.editor.args = value.split_whitespace().map(String::from).collect(),
        _ => return Err(anyhow!("unsupported key: {}", key)),
    }
    Ok(patch)
}
