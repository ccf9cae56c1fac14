use code_todos::{Config, Priority, Record, Session, TodoError};
use std::{fs, path::Path};

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = dir.path();
    fs::create_dir_all(root.join("Assets/Gamedev Toolbelt/Editor/CodeTODOs")).unwrap();
    fs::create_dir_all(root.join("Assets/Scripts")).unwrap();
    fs::create_dir_all(root.join("Assets/Plugins")).unwrap();
    fs::write(
        root.join("Assets/Scripts/Player.cs"),
        "public class Player {\n    // QQQ3 polish animations\n    void Jump() {} // QQQ1 jump is too floaty\n}\n",
    ).unwrap();
    fs::write(root.join("Assets/Scripts/Enemy.cs"), "// QQQ2 smarter pathing\nclass Enemy {}\n").unwrap();
    fs::write(root.join("Assets/Plugins/Vendor.cs"), "// QQQ1 vendor todo\n").unwrap();
    fs::write(
        root.join("Assets/Gamedev Toolbelt/Editor/CodeTODOs/exclude.txt"),
        "# third-party code\nPlugins\n",
    ).unwrap();
    dir
}

fn open(root: &Path) -> Session {
    Session::open(root, &Config::default()).expect("session")
}

fn tasks(s: &Session) -> Vec<&str> { s.records().iter().map(|r| r.task.as_str()).collect() }

#[test]
fn refresh_sorts_and_honours_exclusions() {
    let dir = project();
    let mut s = open(dir.path());
    let summary = s.refresh().unwrap();
    assert_eq!(summary.records, 3);
    assert_eq!(tasks(&s), ["jump is too floaty", "smarter pathing", "polish animations"]);
    assert!(s.records().iter().all(|r| !r.script.starts_with("Assets/Plugins")));
}

#[test]
fn refresh_writes_cache_that_a_new_session_reloads() {
    let dir = project();
    let mut first = open(dir.path());
    first.refresh().unwrap();
    assert!(first.paths().cache_file.ends_with("Editor/CodeTODOs/todos.cache"));

    let mut second = open(dir.path());
    assert_eq!(second.load_cached().unwrap(), 3);
    assert_eq!(second.records(), first.records());
}

#[test]
fn load_or_scan_falls_back_to_scanning() {
    let dir = project();
    let mut s = open(dir.path());
    assert_eq!(s.load_or_scan().unwrap(), 3);
}

#[test]
fn added_annotation_is_found_by_rescan_at_same_line() {
    let dir = project();
    let mut s = open(dir.path());
    s.refresh().unwrap();
    s.add(Record::new(Priority::Urgent, "handle | pipes", "Assets/Scripts/Enemy.cs", 1)).unwrap();

    let mut fresh = open(dir.path());
    fresh.refresh().unwrap();
    let found = fresh.store().find(Path::new("Assets/Scripts/Enemy.cs"), 1).expect("rescanned record");
    assert_eq!(found.priority, Priority::Urgent);
    assert_eq!(found.task, "handle | pipes");
    assert_eq!(fresh.records().len(), s.records().len());
}

#[test]
fn add_above_existing_token_shifts_it_down() {
    let dir = project();
    let mut s = open(dir.path());
    s.refresh().unwrap();
    s.add(Record::new(Priority::Minor, "header note", "Assets/Scripts/Player.cs", 0)).unwrap();
    let jump = s.records().iter().find(|r| r.task == "jump is too floaty").unwrap();
    assert_eq!(jump.line_number, 3);
    // the shifted position is still editable without a rescan
    s.edit(Path::new("Assets/Scripts/Player.cs"), 3, Priority::Normal, "jump feels fine now").unwrap();
    let text = fs::read_to_string(dir.path().join("Assets/Scripts/Player.cs")).unwrap();
    assert!(text.contains("    void Jump() {} // QQQ2 jump feels fine now\n"));
}

#[test]
fn completing_token_only_line_deletes_it_and_shifts_siblings() {
    let dir = project();
    let mut s = open(dir.path());
    s.refresh().unwrap();
    let file = dir.path().join("Assets/Scripts/Player.cs");
    let before = fs::read_to_string(&file).unwrap().lines().count();

    let done = s.complete(Path::new("Assets/Scripts/Player.cs"), 1).unwrap();
    assert_eq!(done.task, "polish animations");

    let after = fs::read_to_string(&file).unwrap();
    assert_eq!(after.lines().count(), before - 1);
    let jump = s.records().iter().find(|r| r.task == "jump is too floaty").unwrap();
    assert_eq!(jump.line_number, 1);

    s.complete(Path::new("Assets/Scripts/Player.cs"), 1).unwrap();
    assert_eq!(fs::read_to_string(&file).unwrap(), "public class Player {\n    void Jump() {}\n}\n");
    assert_eq!(tasks(&s), ["smarter pathing"]);
}

#[test]
fn edit_keeps_line_and_resorts() {
    let dir = project();
    let mut s = open(dir.path());
    s.refresh().unwrap();
    s.edit(Path::new("Assets/Scripts/Player.cs"), 1, Priority::Urgent, "polish now").unwrap();
    let text = fs::read_to_string(dir.path().join("Assets/Scripts/Player.cs")).unwrap();
    assert_eq!(text.lines().nth(1), Some("// QQQ1 polish now"));
    assert_eq!(tasks(&s), ["jump is too floaty", "polish now", "smarter pathing"]);
}

#[test]
fn unknown_positions_are_rejected_without_touching_files() {
    let dir = project();
    let mut s = open(dir.path());
    s.refresh().unwrap();
    let file = dir.path().join("Assets/Scripts/Enemy.cs");
    let before = fs::read(&file).unwrap();
    assert!(matches!(s.complete(Path::new("Assets/Scripts/Enemy.cs"), 1), Err(TodoError::NotFound { .. })));
    assert!(matches!(
        s.edit(Path::new("Assets/Scripts/Enemy.cs"), 0, Priority::Normal, "two\nlines"),
        Err(TodoError::InvalidTask(_))
    ));
    assert_eq!(fs::read(&file).unwrap(), before);
}

#[test]
fn externally_changed_file_aborts_edit() {
    let dir = project();
    let mut s = open(dir.path());
    s.refresh().unwrap();
    let file = dir.path().join("Assets/Scripts/Enemy.cs");
    fs::write(&file, "class Enemy {}\n").unwrap();
    let err = s.complete(Path::new("Assets/Scripts/Enemy.cs"), 0).unwrap_err();
    assert!(matches!(err, TodoError::TokenMissing { line: 0, .. }));
    assert_eq!(fs::read_to_string(&file).unwrap(), "class Enemy {}\n");
    assert_eq!(s.records().len(), 3, "store unchanged after failed edit");
}

#[test]
fn absolute_script_paths_are_made_relative() {
    let dir = project();
    let mut s = open(dir.path());
    s.refresh().unwrap();
    let abs = dir.path().join("Assets/Scripts/Enemy.cs");
    let done = s.complete(&abs, 0).unwrap();
    assert_eq!(done.script, Path::new("Assets/Scripts/Enemy.cs"));
}

#[test]
fn bom_script_completes_first_line_cleanly() {
    let dir = project();
    let file = dir.path().join("Assets/Scripts/Boss.cs");
    fs::write(&file, "\u{FEFF}// QQQ1 phase two\r\nclass Boss {}\n").unwrap();
    let mut s = open(dir.path());
    s.refresh().unwrap();
    let done = s.complete(Path::new("Assets/Scripts/Boss.cs"), 0).unwrap();
    assert_eq!(done.task, "phase two");
    assert_eq!(fs::read_to_string(&file).unwrap(), "\u{FEFF}class Boss {}\n");
}
