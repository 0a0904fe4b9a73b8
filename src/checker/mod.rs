pub mod dictionary;
pub mod engine;
pub mod ignore;
pub mod rewriter;
pub mod tokenizer;

use crate::config::{AbortPolicy, Config};
use crate::error::{Error, Result};
use crate::walker::{FileTraverser, SourceFile};
use crate::{FileOutcome, FileReport, SessionReport};
use dictionary::DictionaryStore;
use engine::{FileEnd, Operator, ResolutionEngine, State};
use ignore::IgnoreRules;
use rewriter::{Commit, FileRewriter};
use tracing::{info, warn};

/// One interactive run: the engine (which owns the dictionary and the
/// operator), the rewriter, and the abort policy.
pub struct SpellChecker<O> {
    engine: ResolutionEngine<O>,
    rewriter: FileRewriter,
    on_abort: AbortPolicy,
}

impl<O: Operator> SpellChecker<O> {
    pub fn new(dictionary: DictionaryStore, operator: O, config: &Config) -> Self {
        let engine = ResolutionEngine::new(dictionary, operator)
            .with_ignore_rules(IgnoreRules::new(&config.ignore_patterns))
            .with_context_width(config.context_width)
            .with_learn_replacements(config.learn_replacements);

        Self {
            engine,
            rewriter: FileRewriter::new(config.dry_run),
            on_abort: config.on_abort,
        }
    }

    pub fn engine(&self) -> &ResolutionEngine<O> {
        &self.engine
    }

    pub fn dictionary(&self) -> &DictionaryStore {
        self.engine.dictionary()
    }

    pub fn state(&self) -> State {
        self.engine.state()
    }

    pub fn into_operator(self) -> O {
        self.engine.into_parts().1
    }

    /// Check every file the traverser yields, one at a time.
    pub fn run(&mut self, traverser: &FileTraverser) -> Result<SessionReport> {
        info!(
            "main: {} words, root {}",
            self.dictionary().len(),
            traverser.root().display()
        );

        let mut report = SessionReport::default();

        for entry in traverser.files() {
            let file_report = match entry {
                Ok(file) => {
                    let (file_report, aborted) = self.check_file(&file)?;
                    if aborted {
                        self.publish(&mut report, file_report);
                        report.aborted = true;
                        break;
                    }
                    file_report
                }
                Err(err) if err.is_recoverable() => {
                    warn!("{}", err);
                    FileReport {
                        path: failed_path(&err),
                        outcome: FileOutcome::Skipped {
                            reason: err.to_string(),
                        },
                    }
                }
                Err(err) => return Err(err),
            };
            self.publish(&mut report, file_report);
        }

        self.engine.finish();
        report.learned = self
            .dictionary()
            .learned()
            .into_iter()
            .map(str::to_string)
            .collect();
        Ok(report)
    }

    /// Resolve and commit a single file. The flag is true when the operator
    /// asked to end the whole session.
    pub fn check_file(&mut self, file: &SourceFile) -> Result<(FileReport, bool)> {
        info!("checking {}", file.path.display());
        let resolution = self.engine.resolve(file)?;
        let aborted = resolution.end == FileEnd::Aborted;

        let outcome = if aborted && self.on_abort == AbortPolicy::Discard {
            if resolution.edits.is_empty() {
                FileOutcome::Untouched {
                    prompts: resolution.prompts,
                }
            } else {
                FileOutcome::Discarded {
                    edits: resolution.edits.len(),
                }
            }
        } else {
            match self.rewriter.commit(file, &resolution.edits) {
                Ok(Commit::Untouched) => FileOutcome::Untouched {
                    prompts: resolution.prompts,
                },
                Ok(Commit::Written { edits }) => FileOutcome::Committed { edits },
                Ok(Commit::DryRun { edits }) => FileOutcome::DryRun { edits },
                Err(err) if err.is_recoverable() => {
                    warn!("{}", err);
                    FileOutcome::WriteFailed {
                        edits: resolution.edits.len(),
                        reason: err.to_string(),
                    }
                }
                Err(err) => return Err(err),
            }
        };

        Ok((
            FileReport {
                path: file.path.clone(),
                outcome,
            },
            aborted,
        ))
    }

    fn publish(&mut self, report: &mut SessionReport, file_report: FileReport) {
        self.engine.operator_mut().notify(&file_report);
        report.files.push(file_report);
    }
}

fn failed_path(err: &Error) -> std::path::PathBuf {
    match err {
        Error::FileDecodeFailure { path, .. }
        | Error::Traversal { path, .. }
        | Error::WriteFailure { path, .. }
        | Error::DictionaryUnavailable { path, .. } => path.clone(),
        _ => std::path::PathBuf::new(),
    }
}
