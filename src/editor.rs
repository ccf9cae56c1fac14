// code-todos/src/editor.rs

use std::{path::Path, process::Command};
use tracing::info;

use crate::{config::EditorConfig, error::{Result, TodoError}};

const DEFAULT_ARGS: &[&str] = &["+{line}", "{file}"];

/// External editor used to jump to an annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl EditorCommand {
    /// Configured command first, then `$VISUAL`, then `$EDITOR`.
    pub fn resolve(cfg: &EditorConfig) -> Option<Self> {
        let program = cfg.command.clone()
            .or_else(|| std::env::var("VISUAL").ok())
            .or_else(|| std::env::var("EDITOR").ok())
            .filter(|p| !p.trim().is_empty())?;
        let args = if cfg.args.is_empty() {
            DEFAULT_ARGS.iter().map(|s| s.to_string()).collect()
        } else {
            cfg.args.clone()
        };
        Some(Self { program, args })
    }

    /// Substitutes `{file}` and `{line}` (one-based).
    pub fn arguments(&self, file: &Path, line_number: usize) -> Vec<String> {
        let file = file.display().to_string();
        let line = (line_number + 1).to_string();
        self.args.iter().map(|a| a.replace("{file}", &file).replace("{line}", &line)).collect()
    }

    pub fn launch(&self, file: &Path, line_number: usize) -> Result<()> {
        let args = self.arguments(file, line_number);
        info!(program = %self.program, ?args, "opening editor");
        Command::new(&self.program)
            .args(&args)
            .spawn()
            .map_err(|source| TodoError::Editor { command: self.program.clone(), source })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_arguments_are_vim_style() {
        let cfg = EditorConfig { command: Some("nvim".into()), args: vec![] };
        let ed = EditorCommand::resolve(&cfg).unwrap();
        assert_eq!(ed.program, "nvim");
        assert_eq!(ed.arguments(Path::new("/p/Assets/A.cs"), 9), ["+10", "/p/Assets/A.cs"]);
    }

    #[test]
    fn custom_template() {
        let cfg = EditorConfig { command: Some("code".into()), args: vec!["--goto".into(), "{file}:{line}".into()] };
        let ed = EditorCommand::resolve(&cfg).unwrap();
        assert_eq!(ed.arguments(Path::new("A.cs"), 0), ["--goto", "A.cs:1"]);
    }

    #[test]
    fn missing_program_reports_launch_error() {
        let ed = EditorCommand { program: "definitely-not-an-editor-3f9a".into(), args: vec![] };
        assert!(matches!(ed.launch(Path::new("A.cs"), 0), Err(TodoError::Editor { .. })));
    }
}
