// code-todos/src/textfile.rs

use std::{
    fs,
    io::{self, BufWriter, Write},
    path::Path,
};
use tempfile::NamedTempFile;

use crate::error::{Result, TodoError};

/// Reads a file as UTF-8 text, rejecting anything that looks binary.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| TodoError::io(path, e))?;
    if bytes.contains(&0) { return Err(TodoError::Binary { path: path.to_path_buf() }); }
    String::from_utf8(bytes).map_err(|_| TodoError::NotUtf8 { path: path.to_path_buf() })
}

const BOM: char = '\u{FEFF}';

/// Drops a leading byte-order mark, which is not part of the first line.
pub fn strip_bom(text: &str) -> &str { text.strip_prefix(BOM).unwrap_or(text) }

/// A text file split into lines. Every line keeps its own terminator, so
/// lines an edit does not touch are written back byte for byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceText {
    lines: Vec<String>,
    /// `"\r\n"`, `"\n"`, or `""` for a final line with no terminator.
    endings: Vec<&'static str>,
    /// Terminator given to inserted lines: whichever the file uses most.
    eol: &'static str,
    bom: bool,
}

impl SourceText {
    pub fn parse(text: &str) -> Self {
        let body = strip_bom(text);
        let (mut lines, mut endings) = (Vec::new(), Vec::new());
        for piece in body.split_inclusive('\n') {
            let (line, ending) = if let Some(l) = piece.strip_suffix("\r\n") {
                (l, "\r\n")
            } else if let Some(l) = piece.strip_suffix('\n') {
                (l, "\n")
            } else {
                (piece, "")
            };
            lines.push(line.to_owned());
            endings.push(ending);
        }
        let crlf = endings.iter().filter(|e| **e == "\r\n").count();
        let lf = endings.iter().filter(|e| **e == "\n").count();
        Self {
            lines,
            endings,
            eol: if crlf > lf { "\r\n" } else { "\n" },
            bom: body.len() != text.len(),
        }
    }

    pub fn read(path: &Path) -> Result<Self> { Ok(Self::parse(&read_text(path)?)) }

    pub fn write_to(&self, w: &mut dyn Write) -> io::Result<()> {
        if self.bom {
            let mut buf = [0; 3];
            w.write_all(BOM.encode_utf8(&mut buf).as_bytes())?;
        }
        for (line, ending) in self.lines.iter().zip(&self.endings) {
            w.write_all(line.as_bytes())?;
            w.write_all(ending.as_bytes())?;
        }
        Ok(())
    }

    pub fn line(&self, index: usize) -> Option<&str> { self.lines.get(index).map(String::as_str) }

    /// Replaces the content of a line, keeping its terminator.
    pub fn replace(&mut self, index: usize, line: String) { self.lines[index] = line; }

    /// Inserts `line` before `index`, or appends it when `index == len()`.
    pub fn insert(&mut self, index: usize, line: String) {
        let appending_after_open_line = index == self.len() && self.endings.last() == Some(&"");
        if appending_after_open_line {
            // keep the file unterminated: the new last line inherits that
            if let Some(last) = self.endings.last_mut() { *last = self.eol; }
            self.endings.push("");
        } else {
            self.endings.insert(index, self.eol);
        }
        self.lines.insert(index, line);
    }

    /// Deletes a line together with its terminator.
    pub fn remove(&mut self, index: usize) {
        self.lines.remove(index);
        let ending = self.endings.remove(index);
        if ending.is_empty() && index == self.len() {
            if let Some(last) = self.endings.last_mut() { *last = ""; }
        }
    }

    pub fn len(&self) -> usize { self.lines.len() }

    pub fn is_empty(&self) -> bool { self.lines.is_empty() }
}

/// Replaces `path` with whatever `write` produces.
///
/// The content goes to a temporary file next to `path`, which is renamed over
/// the original only once `write` and the flush have succeeded. On any error
/// the temporary file is dropped and `path` is left as it was.
pub fn atomic_rewrite<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| TodoError::io(dir, e))?;
    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        write(&mut out).map_err(|e| TodoError::io(path, e))?;
        out.flush().map_err(|e| TodoError::io(path, e))?;
    }
    tmp.as_file().sync_all().map_err(|e| TodoError::io(path, e))?;
    // NamedTempFile is created 0600; keep the original's mode
    if let Ok(meta) = fs::metadata(path) {
        fs::set_permissions(tmp.path(), meta.permissions()).map_err(|e| TodoError::io(path, e))?;
    }
    tmp.persist(path).map_err(|e| TodoError::io(path, e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(t: &SourceText) -> String {
        let mut out = Vec::new();
        t.write_to(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn keeps_crlf_and_missing_final_newline() {
        for text in ["a\r\nb\r\n", "a\nb", "a\n\n", "", "only", "a\r\nb\nc", "\u{FEFF}x\r\n"] {
            assert_eq!(render(&SourceText::parse(text)), text);
        }
    }

    #[test]
    fn edits_leave_other_line_endings_alone() {
        let mut t = SourceText::parse("a\r\nb\nc\n// QQQ1 x\n");
        t.remove(3);
        assert_eq!(render(&t), "a\r\nb\nc\n");

        let mut t = SourceText::parse("a\r\nb\r\nc\n");
        t.insert(1, "new".into());
        t.replace(3, "C".into());
        assert_eq!(render(&t), "a\r\nnew\r\nb\r\nC\n");
    }

    #[test]
    fn unterminated_last_line_stays_unterminated() {
        let mut t = SourceText::parse("a\nb");
        t.insert(2, "c".into());
        assert_eq!(render(&t), "a\nb\nc");
        t.remove(2);
        assert_eq!(render(&t), "a\nb");
        t.remove(1);
        assert_eq!(render(&t), "a");
    }

    #[test]
    fn bom_is_kept_out_of_the_first_line() {
        let mut t = SourceText::parse("\u{FEFF}// QQQ1 task\nclass A {}\n");
        assert_eq!(t.line(0), Some("// QQQ1 task"));
        t.remove(0);
        assert_eq!(render(&t), "\u{FEFF}class A {}\n");
        assert_eq!(strip_bom("\u{FEFF}x"), "x");
    }

    #[test]
    fn rejects_binary_content() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("blob.cs");
        fs::write(&p, b"abc\0def").unwrap();
        assert!(matches!(read_text(&p), Err(TodoError::Binary { .. })));
        fs::write(&p, [0xff, 0xfe, 0x41]).unwrap();
        assert!(matches!(read_text(&p), Err(TodoError::NotUtf8 { .. })));
    }

    #[test]
    fn failed_write_leaves_original_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("Player.cs");
        let original = b"void Update() {}\n// QQQ1 keep me\n";
        fs::write(&p, original).unwrap();

        let res = atomic_rewrite(&p, |w| {
            w.write_all(b"partial content that must never land")?;
            Err(io::Error::other("disk full"))
        });

        assert!(matches!(res, Err(TodoError::Io { .. })));
        assert_eq!(fs::read(&p).unwrap(), original);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1, "temp file left behind");
    }

    #[test]
    fn successful_write_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.txt");
        fs::write(&p, "old").unwrap();
        atomic_rewrite(&p, |w| w.write_all(b"new")).unwrap();
        assert_eq!(fs::read_to_string(&p).unwrap(), "new");
    }

    #[cfg(unix)]
    #[test]
    fn keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("run.sh");
        fs::write(&p, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&p, fs::Permissions::from_mode(0o755)).unwrap();
        atomic_rewrite(&p, |w| w.write_all(b"#!/bin/sh\necho hi\n")).unwrap();
        assert_eq!(fs::metadata(&p).unwrap().permissions().mode() & 0o777, 0o755);
    }
}
