use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One self-contained, idempotent edit applied to a single file's full text.
///
/// The variant set is closed: these two operations are the whole repertoire.
/// Each op carries its own target path, so a mixed list of ops is fully
/// self-describing and ops never share state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "PatchOp does nothing until apply() is called"]
pub enum PatchOp {
    /// Replace every occurrence of `pattern` with `replacement` across the
    /// file's full text. The file is rewritten even when nothing matched.
    TextReplace {
        file: PathBuf,
        pattern: String,
        replacement: String,
    },
    /// Insert `line` on a new line directly after the line ending with
    /// `anchor`, reusing that line's indentation and line-break style.
    /// Skipped when the anchor is absent or the line is already there.
    LineInsertAfter {
        file: PathBuf,
        anchor: String,
        line: String,
    },
}

#[derive(Error, Debug)]
pub enum EditError {
    #[error("failed to read {file}: {source}")]
    Read {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {file}: {source}")]
    Write {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of applying one op against the file system.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditOutcome should be checked for applied/no-op status"]
pub enum EditOutcome {
    /// The file's content changed.
    Applied { file: PathBuf },
    /// The edit was already present; nothing was written.
    AlreadyApplied { file: PathBuf },
    /// The pattern or anchor never occurred in the file.
    NoMatch { file: PathBuf },
}

/// Result of applying one op against in-memory text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// The op produced different text.
    Changed(String),
    /// The insertion (or replacement) is already in place.
    AlreadyApplied,
    /// The pattern or anchor never occurred.
    NoMatch,
}

impl PatchOp {
    /// The file this op targets.
    pub fn file(&self) -> &Path {
        match self {
            PatchOp::TextReplace { file, .. } => file,
            PatchOp::LineInsertAfter { file, .. } => file,
        }
    }

    /// Compute the op's effect on `text` without touching the file system.
    ///
    /// This is the whole algorithm; [`PatchOp::apply`] only adds the
    /// read/write around it.
    pub fn rewrite(&self, text: &str) -> Rewrite {
        match self {
            PatchOp::TextReplace {
                pattern,
                replacement,
                ..
            } => rewrite_replace(text, pattern, replacement),
            PatchOp::LineInsertAfter { anchor, line, .. } => rewrite_insert(text, anchor, line),
        }
    }

    /// Read the target file, apply the op, and write the result back.
    ///
    /// Each call re-reads the file from disk, so ops against the same file
    /// stay independent. A `TextReplace` whose pattern never matched still
    /// rewrites the file with identical content; `LineInsertAfter` no-ops
    /// leave the file untouched.
    pub fn apply(&self) -> Result<EditOutcome, EditError> {
        let file = self.file();
        let text = fs::read_to_string(file).map_err(|source| EditError::Read {
            file: file.to_path_buf(),
            source,
        })?;

        match self.rewrite(&text) {
            Rewrite::Changed(new_text) => {
                atomic_write(file, new_text.as_bytes())?;
                Ok(EditOutcome::Applied {
                    file: file.to_path_buf(),
                })
            }
            Rewrite::AlreadyApplied => Ok(EditOutcome::AlreadyApplied {
                file: file.to_path_buf(),
            }),
            Rewrite::NoMatch => {
                if matches!(self, PatchOp::TextReplace { .. }) {
                    // No-op rewrite: same bytes, fresh write.
                    atomic_write(file, text.as_bytes())?;
                }
                Ok(EditOutcome::NoMatch {
                    file: file.to_path_buf(),
                })
            }
        }
    }
}

impl std::fmt::Display for PatchOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatchOp::TextReplace { file, pattern, .. } => {
                write!(f, "replace {:?} in {}", elide(pattern), file.display())
            }
            PatchOp::LineInsertAfter { file, line, .. } => {
                write!(f, "insert {:?} in {}", elide(line), file.display())
            }
        }
    }
}

fn elide(s: &str) -> String {
    const MAX: usize = 40;
    if s.chars().count() <= MAX {
        s.to_string()
    } else {
        let head: String = s.chars().take(MAX).collect();
        format!("{head}...")
    }
}

fn rewrite_replace(text: &str, pattern: &str, replacement: &str) -> Rewrite {
    if !text.contains(pattern) {
        return Rewrite::NoMatch;
    }
    let replaced = text.replace(pattern, replacement);
    if replaced == text {
        // Pattern and replacement are identical.
        Rewrite::AlreadyApplied
    } else {
        Rewrite::Changed(replaced)
    }
}

fn rewrite_insert(text: &str, anchor: &str, line: &str) -> Rewrite {
    let Some(anchor_start) = text.find(anchor) else {
        return Rewrite::NoMatch;
    };
    let anchor_end = anchor_start + anchor.len();

    let indent = indent_before(text, anchor_start);
    let brk = line_break_after(text, anchor_end);

    // The prospective new line would sit right after the anchor, its line
    // break, and a copy of the indent. If that slice already equals the
    // line to insert, the patch has been applied before.
    let new_line_start = anchor_end + brk.len() + indent.len();
    if text.get(new_line_start..new_line_start + line.len()) == Some(line) {
        return Rewrite::AlreadyApplied;
    }

    // The insertion is expressed as a global substring replace, so it lands
    // after *every* occurrence of the anchor, not just the first one the
    // analysis above looked at. Callers rely on anchors being unique lines.
    let with_line = format!("{anchor}{brk}{indent}{line}");
    Rewrite::Changed(text.replace(anchor, &with_line))
}

/// Indentation prefix of the line the anchor starts on: the contiguous run
/// of horizontal whitespace directly before `anchor_start`. Line breaks
/// terminate the scan, so an anchor at column zero yields "".
fn indent_before(text: &str, anchor_start: usize) -> &str {
    let mut line_start = anchor_start;
    for (idx, ch) in text[..anchor_start].char_indices().rev() {
        if ch.is_whitespace() && ch != '\n' && ch != '\r' {
            line_start = idx;
        } else {
            break;
        }
    }
    &text[line_start..anchor_start]
}

/// Line-break sequence directly after the anchor, or "" at end of file.
/// Checked against the remaining slice, so a lone trailing "\n" is still
/// recognized.
fn line_break_after(text: &str, anchor_end: usize) -> &'static str {
    let rest = &text[anchor_end..];
    if rest.starts_with("\r\n") {
        "\r\n"
    } else if rest.starts_with('\n') {
        "\n"
    } else {
        ""
    }
}

/// Atomic full-file write: tempfile in the same directory + fsync + rename.
///
/// The handle is scoped to this function; either the whole write lands or
/// the original file is left untouched.
fn atomic_write(path: &Path, content: &[u8]) -> Result<(), EditError> {
    let parent = path.parent().ok_or_else(|| EditError::Write {
        file: path.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no parent directory"),
    })?;

    let write_err = |source: std::io::Error| EditError::Write {
        file: path.to_path_buf(),
        source,
    };

    let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
    temp.write_all(content).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}
