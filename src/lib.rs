pub mod checker;
pub mod cli;
pub mod config;
pub mod dict;
pub mod error;
pub mod logging;
pub mod walker;

pub use checker::dictionary::DictionaryStore;
pub use checker::engine::{Decision, Operator, Prompt, ResolutionEngine};
pub use checker::SpellChecker;
pub use config::Config;
pub use error::{Error, Result};
pub use walker::{FileTraverser, SourceFile};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionReport {
    pub files: Vec<FileReport>,
    pub aborted: bool,
    pub learned: Vec<String>,
}

impl SessionReport {
    /// Replacements that reached disk.
    pub fn corrections(&self) -> usize {
        self.files
            .iter()
            .map(|f| match f.outcome {
                FileOutcome::Committed { edits } => edits,
                _ => 0,
            })
            .sum()
    }

    pub fn files_changed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Committed { .. }))
            .count()
    }

    pub fn write_failures(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::WriteFailed { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, FileOutcome::Skipped { .. }))
            .count()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Nothing was written; `prompts` unknown words were shown.
    Untouched { prompts: usize },
    Committed { edits: usize },
    DryRun { edits: usize },
    /// The session was aborted and this file's edits were dropped.
    Discarded { edits: usize },
    /// The file could not be read as text or walked.
    Skipped { reason: String },
    WriteFailed { edits: usize, reason: String },
}
