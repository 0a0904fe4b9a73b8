use crate::checker::tokenizer::WordOccurrence;
use crate::error::{Error, Result};
use crate::walker::SourceFile;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// A replacement the operator accepted but that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub occurrence: WordOccurrence,
    pub replacement: String,
}

/// Result of committing one file's edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commit {
    /// No edits; the file was not opened for writing.
    Untouched,
    Written { edits: usize },
    DryRun { edits: usize },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FileRewriter {
    dry_run: bool,
}

impl FileRewriter {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Splice `edits` into `original`. Edits must be ordered by position,
    /// must not overlap, and each span must still hold the occurrence's word.
    pub fn apply(original: &str, edits: &[PendingEdit]) -> Result<String> {
        let mut output = String::with_capacity(original.len());
        let mut cursor = 0;

        for edit in edits {
            let span = edit.occurrence.span();
            let invalid = |reason: &str| Error::InvalidEdit {
                start: span.start,
                end: span.end,
                reason: reason.to_string(),
            };

            if span.start < cursor {
                return Err(invalid("overlaps or precedes the previous edit"));
            }
            if span.end > original.len()
                || !original.is_char_boundary(span.start)
                || !original.is_char_boundary(span.end)
            {
                return Err(invalid("span is outside the text"));
            }
            if original[span.clone()] != edit.occurrence.word {
                return Err(invalid("text at span no longer matches the word"));
            }

            output.push_str(&original[cursor..span.start]);
            output.push_str(&edit.replacement);
            cursor = span.end;
        }

        output.push_str(&original[cursor..]);
        Ok(output)
    }

    /// Write the file with all edits applied in a single atomic replace.
    /// Nothing is written when `edits` is empty.
    pub fn commit(&self, file: &SourceFile, edits: &[PendingEdit]) -> Result<Commit> {
        if edits.is_empty() {
            return Ok(Commit::Untouched);
        }

        let rewritten = Self::apply(&file.content, edits)?;

        if self.dry_run {
            debug!("dry run {}: {} changes", file.path.display(), edits.len());
            return Ok(Commit::DryRun { edits: edits.len() });
        }

        write_atomic(&file.path, rewritten.as_bytes()).map_err(|source| Error::WriteFailure {
            path: file.path.clone(),
            source,
        })?;

        debug!("Saving {}: {} changes", file.path.display(), edits.len());
        Ok(Commit::Written { edits: edits.len() })
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    // Write through symlinks instead of replacing them
    let target = fs::canonicalize(path)?;
    let permissions = fs::metadata(&target)?.permissions();
    let parent = target.parent().unwrap_or_else(|| Path::new("."));

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(bytes)?;
    temp_file.as_file().sync_all()?;
    fs::set_permissions(temp_file.path(), permissions)?;

    temp_file.persist(&target).map_err(|e| e.error)?;
    Ok(())
}
