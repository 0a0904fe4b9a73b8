//! Directory traversal.
//!
//! Files are visited in a stable order (entries sorted by file name at every
//! level) so repeated runs over an unchanged tree behave identically. Only the
//! file currently being yielded is held in memory.

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// A file's path and decoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub content: String,
}

impl SourceFile {
    /// Read and decode a file. Binary content (NUL bytes) and invalid UTF-8
    /// are reported as decode failures.
    pub fn read(path: &Path) -> Result<Self> {
        let failure = |reason: String| Error::FileDecodeFailure {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = fs::read(path).map_err(|e| failure(e.to_string()))?;
        if bytes.contains(&0) {
            return Err(failure("binary content".to_string()));
        }
        let content = String::from_utf8(bytes).map_err(|e| {
            failure(format!(
                "invalid UTF-8 at byte {}",
                e.utf8_error().valid_up_to()
            ))
        })?;

        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }
}

#[derive(Debug, Clone)]
pub struct FileTraverser {
    root: PathBuf,
    hidden: bool,
    follow_links: bool,
}

impl FileTraverser {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            hidden: false,
            follow_links: false,
        }
    }

    /// Include entries whose name starts with a dot.
    pub fn hidden(mut self, yes: bool) -> Self {
        self.hidden = yes;
        self
    }

    /// Descend into symlinked directories and read symlinked files.
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.follow_links = yes;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily yield every file under the root. Decode and walk errors are
    /// yielded in place of the entry and never end the traversal.
    pub fn files(&self) -> impl Iterator<Item = Result<SourceFile>> + '_ {
        let hidden = self.hidden;
        let mut visited_dirs: HashSet<PathBuf> = HashSet::new();
        let mut visited_files: HashSet<PathBuf> = HashSet::new();

        WalkDir::new(&self.root)
            .follow_links(self.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| admit(entry, hidden, &mut visited_dirs))
            .filter_map(move |entry| match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    let identity = fs::canonicalize(entry.path())
                        .unwrap_or_else(|_| entry.path().to_path_buf());
                    if !visited_files.insert(identity) {
                        debug!("already visited {}", entry.path().display());
                        return None;
                    }
                    Some(SourceFile::read(entry.path()))
                }
                Ok(_) => None,
                Err(err) if err.loop_ancestor().is_some() => {
                    debug!("not following loop {}", err);
                    None
                }
                Err(err) => Some(Err(Error::Traversal {
                    path: err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone()),
                    reason: err.to_string(),
                })),
            })
    }
}

fn admit(entry: &DirEntry, hidden: bool, visited_dirs: &mut HashSet<PathBuf>) -> bool {
    if !hidden && entry.depth() > 0 && is_hidden(entry) {
        return false;
    }

    if entry.file_type().is_dir() {
        // Reached twice only through symlinks; never enter a directory again
        let identity =
            fs::canonicalize(entry.path()).unwrap_or_else(|_| entry.path().to_path_buf());
        if !visited_dirs.insert(identity) {
            debug!("skipping revisited directory {}", entry.path().display());
            return false;
        }
    }

    true
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}
