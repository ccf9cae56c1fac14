// code-todos/src/render.rs

use unicode_width::UnicodeWidthStr;

use crate::record::Record;

/// Plain-text listing: priority, `script:line` (one-based), task.
pub fn table(records: &[Record]) -> String {
    let locations: Vec<String> = records.iter()
        .map(|r| format!("{}:{}", r.script.display(), r.line_number + 1))
        .collect();
    let loc_width = locations.iter().map(|l| l.width()).max().unwrap_or(0);
    let mut out = String::new();
    for (r, loc) in records.iter().zip(&locations) {
        out.push_str(&format!("{:<6}  ", r.priority.label()));
        out.push_str(loc);
        out.push_str(&" ".repeat(loc_width - loc.width() + 2));
        out.push_str(&r.task);
        out.push('\n');
    }
    out
}
