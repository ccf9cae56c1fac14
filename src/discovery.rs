// code-todos/src/discovery.rs

use std::{
    collections::VecDeque,
    path::{Path, PathBuf},
};
use tracing::warn;
use walkdir::WalkDir;

/// Immediate children of `dir`, sorted by file name.
pub(crate) fn children(dir: &Path) -> walkdir::IntoIter {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
}

pub(crate) fn slash_path(p: &Path) -> String { p.to_string_lossy().replace('\\', "/") }

/// Breadth-first search below `root` for the first directory whose path ends
/// with `name` (which may itself span several components, e.g. `Editor/CodeTODOs`).
pub fn find_folder(root: &Path, name: &str) -> Option<PathBuf> {
    let name = name.replace('\\', "/");
    let name = name.trim_end_matches('/');
    if name.is_empty() { return None; }
    let mut queue = VecDeque::from([root.to_path_buf()]);
    while let Some(dir) = queue.pop_front() {
        for entry in children(&dir) {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!(dir = %dir.display(), error = %err, "cannot list directory");
                    continue;
                }
            };
            if !entry.file_type().is_dir() { continue; }
            if slash_path(entry.path()).ends_with(name) { return Some(entry.into_path()); }
            queue.push_back(entry.into_path());
        }
    }
    None
}

/// Nearest ancestor of `start` (itself included) that has `source_dir` in it.
pub fn find_project_root(start: &Path, source_dir: &Path) -> Option<PathBuf> {
    start.ancestors().find(|d| d.join(source_dir).is_dir()).map(Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_shallowest_match_first() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Assets/A/B/C/CodeTODOs")).unwrap();
        fs::create_dir_all(root.join("Assets/Z/CodeTODOs")).unwrap();
        let found = find_folder(&root.join("Assets"), "CodeTODOs").unwrap();
        assert_eq!(found, root.join("Assets/Z/CodeTODOs"));
    }

    #[test]
    fn multi_component_names() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Assets/Tools/CodeTODOs")).unwrap();
        fs::create_dir_all(root.join("Assets/Editor/CodeTODOs")).unwrap();
        let found = find_folder(root, "Editor/CodeTODOs/").unwrap();
        assert_eq!(found, root.join("Assets/Editor/CodeTODOs"));
        assert!(find_folder(root, "Missing").is_none());
    }

    #[test]
    fn project_root_from_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("Assets/Scripts/AI")).unwrap();
        let found = find_project_root(&root.join("Assets/Scripts/AI"), Path::new("Assets")).unwrap();
        assert_eq!(found, root);
    }
}
