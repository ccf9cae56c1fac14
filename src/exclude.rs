// code-todos/src/exclude.rs

use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;
use tracing::debug;

use crate::{error::{Result, TodoError}, textfile::{read_text, strip_bom}};

/// Path fragments the scanner must not enter.
///
/// Plain entries match as suffixes of the `/`-separated path relative to the
/// project root (`Plugins` skips `Assets/Plugins` and `Assets/ThirdPartyPlugins`
/// alike). Entries with glob metacharacters match the whole relative path.
#[derive(Clone, Debug, Default)]
pub struct ExclusionList {
    suffixes: Vec<String>,
    globs: GlobSet,
    patterns: Vec<String>,
}

impl ExclusionList {
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut suffixes = Vec::new();
        let mut patterns = Vec::new();
        let mut b = GlobSetBuilder::new();
        for e in entries {
            let e = normalize(e.as_ref());
            if e.is_empty() { continue; }
            if e.contains(['*', '?', '[', '{']) {
                let glob = Glob::new(&e).map_err(|source| TodoError::Pattern { pattern: e.clone(), source })?;
                b.add(glob);
                patterns.push(e);
            } else {
                suffixes.push(e);
            }
        }
        let globs = b.build().map_err(|source| TodoError::Pattern { pattern: patterns.join(", "), source })?;
        Ok(Self { suffixes, globs, patterns })
    }

    /// One entry per non-blank line; `#` lines and single-space lines are comments.
    pub fn parse(doc: &str) -> Result<Self> {
        Self::new(strip_bom(doc).lines().filter(|l| !(l.is_empty() || *l == " " || l.starts_with('#'))))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no exclusion document; nothing excluded");
            return Ok(Self::default());
        }
        let list = Self::parse(&read_text(path)?)?;
        debug!(path = %path.display(), entries = list.len(), "exclusions loaded");
        Ok(list)
    }

    pub fn len(&self) -> usize { self.suffixes.len() + self.patterns.len() }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// `rel` is relative to the project root.
    pub fn is_excluded(&self, rel: &Path) -> bool {
        if self.is_empty() { return false; }
        let s = rel.to_string_lossy().replace('\\', "/");
        self.suffixes.iter().any(|f| s.ends_with(f.as_str())) || self.globs.is_match(&s)
    }
}

fn normalize(entry: &str) -> String {
    entry.trim_end().replace('\\', "/").trim_end_matches('/').to_string()
}
