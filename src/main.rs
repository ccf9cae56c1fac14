// code-todos/src/main.rs

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use code_todos::{
    config::{self, Config, ConfigManager, Scope},
    discovery::find_project_root,
    render, Priority, Record, Session,
};

#[derive(Parser)]
#[command(name = "codetodos", version, about = "Track QQQ annotations in source comments")]
struct Cli {
    /// Project root (default: nearest ancestor containing the source folder)
    #[arg(long, global = true)]
    root: Option<PathBuf>,
    /// Override the annotation marker for this run
    #[arg(long, global = true)]
    marker: Option<String>,
    /// Debug logging (RUST_LOG still wins when set)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Rescan the source tree, reorder and rewrite the cache
    Scan,
    /// Show annotations, most urgent first
    List {
        #[arg(long)]
        json: bool,
        /// Rescan instead of trusting the cache
        #[arg(long)]
        rescan: bool,
    },
    /// Insert a new annotation line at LINE (one-based)
    Add {
        script: PathBuf,
        line: usize,
        #[arg(short, long, default_value = "normal")]
        priority: Priority,
        #[arg(required = true, trailing_var_arg = true)]
        task: Vec<String>,
    },
    /// Change priority and/or task of the annotation on LINE
    Edit {
        script: PathBuf,
        line: usize,
        #[arg(short, long)]
        priority: Option<Priority>,
        #[arg(short, long)]
        task: Option<String>,
    },
    /// Complete an annotation: remove it from the source file
    Done { script: PathBuf, line: usize },
    /// Open the script at the annotation's line in the external editor
    Open { script: PathBuf, line: usize },
    /// Inspect or change configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCmd,
    },
}

#[derive(Subcommand)]
enum ConfigCmd {
    /// Print the merged configuration as TOML
    Show,
    /// Persist KEY=VALUE to the workspace (or user) config, e.g. `scan.marker QQQ`
    Set {
        key: String,
        value: String,
        #[arg(long)]
        user: bool,
    },
}

fn zero_based(line: usize) -> Result<usize> {
    if line == 0 { bail!("line numbers start at 1"); }
    Ok(line - 1)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()))
        .with_writer(std::io::stderr)
        .init();

    let cwd = std::env::current_dir().context("current directory")?;
    let bootstrap = ConfigManager::load(cli.root.as_deref().unwrap_or(&cwd))?;
    let root = match &cli.root {
        Some(r) => cwd.join(r),
        None => find_project_root(&cwd, bootstrap.get().source_dir()).unwrap_or_else(|| cwd.clone()),
    };
    let mut cfg = ConfigManager::load(&root)?;
    if let Some(m) = &cli.marker {
        cfg.apply_runtime_overlay(config::patch_for("scan.marker", m)?)?;
    }
    debug!(root = %root.display(), "project root");

    if let Cmd::Config { cmd } = &cli.cmd {
        return run_config(&mut cfg, cmd);
    }

    let mut session = Session::open(&root, cfg.get())?;
    match cli.cmd {
        Cmd::Scan => {
            let summary = session.refresh()?;
            println!("{} annotations in {} files ({} skipped)", summary.records, summary.files_scanned, summary.skipped.len());
            for s in &summary.skipped { println!("  skipped {}: {}", s.path.display(), s.reason); }
        }
        Cmd::List { json, rescan } => {
            if rescan { session.refresh()?; } else { session.load_or_scan()?; }
            if json {
                println!("{}", serde_json::to_string_pretty(session.records())?);
            } else {
                print!("{}", render::table(session.records()));
            }
        }
        Cmd::Add { script, line, priority, task } => {
            session.load_or_scan()?;
            let record = Record::new(priority, task.join(" "), session.locate_script(&script, &cwd), zero_based(line)?);
            session.add(record.clone())?;
            println!("added {}", record.location());
        }
        Cmd::Edit { script, line, priority, task } => {
            session.load_or_scan()?;
            let line = zero_based(line)?;
            let script = session.locate_script(&script, &cwd);
            let current = session.store().find(&script, line).cloned()
                .with_context(|| format!("no annotation at {}:{} (try `codetodos scan`)", script.display(), line + 1))?;
            let new = session.edit(
                &script, line,
                priority.unwrap_or(current.priority),
                task.as_deref().unwrap_or(&current.task),
            )?;
            println!("{new}");
        }
        Cmd::Done { script, line } => {
            session.load_or_scan()?;
            let done = session.complete(&session.locate_script(&script, &cwd), zero_based(line)?)?;
            println!("completed {done}");
        }
        Cmd::Open { script, line } => {
            session.open_in_editor(&session.locate_script(&script, &cwd), zero_based(line)?)?
        }
        Cmd::Config { .. } => unreachable!("handled above"),
    }
    Ok(())
}

fn run_config(cfg: &mut ConfigManager, cmd: &ConfigCmd) -> Result<()> {
    match cmd {
        ConfigCmd::Show => print!("{}", toml::to_string_pretty::<Config>(cfg.get())?),
        ConfigCmd::Set { key, value, user } => {
            let scope = if *user { Scope::User } else { Scope::Workspace };
            cfg.write_patch(scope, &config::patch_for(key, value)?)?;
            let path = cfg.path(scope).map(|p| p.display().to_string()).unwrap_or_default();
            println!("{key} = {value:?} written to {path}");
        }
    }
    Ok(())
}
