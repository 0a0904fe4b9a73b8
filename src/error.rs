use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The word list could not be opened or parsed. Fatal for the session.
    #[error("dictionary unavailable: {}: {reason}", path.display())]
    DictionaryUnavailable { path: PathBuf, reason: String },

    /// The file is not text we can check. The file is skipped.
    #[error("cannot decode {} as text: {reason}", path.display())]
    FileDecodeFailure { path: PathBuf, reason: String },

    /// A directory entry could not be walked. The entry is skipped.
    #[error("cannot traverse {}: {reason}", path.display())]
    Traversal { path: PathBuf, reason: String },

    /// Rewritten content could not be saved. The original file is intact.
    #[error("failed to write {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid edit at bytes {start}..{end}: {reason}")]
    InvalidEdit {
        start: usize,
        end: usize,
        reason: String,
    },

    #[error("failed to read operator input: {0}")]
    OperatorInput(#[from] io::Error),
}

impl Error {
    /// Errors that only affect a single file; the session moves on after reporting them.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::FileDecodeFailure { .. }
                | Error::Traversal { .. }
                | Error::WriteFailure { .. }
                | Error::InvalidEdit { .. }
        )
    }
}
