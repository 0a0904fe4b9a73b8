//! Interactive resolution of unknown words.
//!
//! The engine walks a file's occurrences, silently passing known words and
//! stopping at each unknown one until the [`Operator`] decides what to do.
//! It only records intent as [`PendingEdit`]s; writing is the rewriter's job.

use crate::checker::dictionary::DictionaryStore;
use crate::checker::ignore::IgnoreRules;
use crate::checker::rewriter::PendingEdit;
use crate::checker::tokenizer::{normalize, PriorDecision, Tokenizer, WordOccurrence};
use crate::error::Result;
use crate::walker::SourceFile;
use crate::FileReport;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use tracing::debug;

/// What the operator chose for one unknown word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Replace,
    Skip,
    Learn,
    StopFile,
    Abort,
}

impl Decision {
    pub const KEYS: [(char, Decision, &'static str); 5] = [
        ('y', Decision::Replace, "replace word"),
        ('n', Decision::Skip, "leave word unchanged"),
        ('a', Decision::Learn, "add word to dictionary for this session"),
        ('s', Decision::StopFile, "stop checking this file"),
        ('q', Decision::Abort, "quit"),
    ];

    /// Parse operator input. Exactly one key character, case-insensitive.
    pub fn parse(input: &str) -> Option<Self> {
        let mut chars = input.trim().chars();
        let key = chars.next()?.to_ascii_lowercase();
        if chars.next().is_some() {
            return None;
        }
        Self::KEYS
            .iter()
            .find(|(k, _, _)| *k == key)
            .map(|(_, decision, _)| *decision)
    }

    pub fn key(self) -> char {
        Self::KEYS
            .iter()
            .find(|(_, decision, _)| *decision == self)
            .map(|(k, _, _)| *k)
            .unwrap_or('?')
    }
}

/// The occurrence's line, cut to a window around the word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context<'a> {
    pub before: &'a str,
    pub word: &'a str,
    pub after: &'a str,
    pub truncated_before: bool,
    pub truncated_after: bool,
}

impl<'a> Context<'a> {
    pub fn new(content: &'a str, occurrence: &WordOccurrence, width: usize) -> Self {
        let line_start = content[..occurrence.start]
            .rfind('\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        let line_end = content[occurrence.end..]
            .find('\n')
            .map(|i| occurrence.end + i)
            .unwrap_or(content.len());

        let before = &content[line_start..occurrence.start];
        let after = content[occurrence.end..line_end].trim_end_matches('\r');

        let before_chars = before.chars().count();
        let before_cut = before_chars.saturating_sub(width);
        let before_start = before
            .char_indices()
            .nth(before_cut)
            .map(|(i, _)| i)
            .unwrap_or(before.len());
        let after_end = after
            .char_indices()
            .nth(width)
            .map(|(i, _)| i)
            .unwrap_or(after.len());

        Self {
            before: &before[before_start..],
            word: &content[occurrence.span()],
            after: &after[..after_end],
            truncated_before: before_cut > 0,
            truncated_after: after_end < after.len(),
        }
    }
}

/// Everything shown to the operator for one unknown word.
#[derive(Debug, Clone)]
pub struct Prompt<'a> {
    pub path: &'a Path,
    pub occurrence: &'a WordOccurrence,
    pub context: Context<'a>,
}

/// The operator side of the conversation. Implementations block until input
/// arrives; `Ok(None)` means input is exhausted and ends the session.
pub trait Operator {
    fn ask_decision(&mut self, prompt: &Prompt<'_>) -> io::Result<Option<String>>;

    fn ask_replacement(&mut self, prompt: &Prompt<'_>) -> io::Result<Option<String>>;

    /// Called when a decision answer was not one of the keys, right before
    /// asking again. Empty replacements are re-asked without this call.
    fn rejected(&mut self, _input: &str) {}

    /// Called once per file with what happened to it.
    fn notify(&mut self, _report: &FileReport) {}
}

impl<O: Operator + ?Sized> Operator for &mut O {
    fn ask_decision(&mut self, prompt: &Prompt<'_>) -> io::Result<Option<String>> {
        (**self).ask_decision(prompt)
    }

    fn ask_replacement(&mut self, prompt: &Prompt<'_>) -> io::Result<Option<String>> {
        (**self).ask_replacement(prompt)
    }

    fn rejected(&mut self, input: &str) {
        (**self).rejected(input)
    }

    fn notify(&mut self, report: &FileReport) {
        (**self).notify(report)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Scanning,
    AwaitingDecision,
    FileDone,
    SessionDone,
}

/// Why resolution of a file ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEnd {
    Exhausted,
    Stopped,
    Aborted,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub edits: Vec<PendingEdit>,
    pub end: FileEnd,
    pub prompts: usize,
}

enum Action {
    Replace(String),
    Skip,
    Learn,
    StopFile,
    Abort,
}

pub struct ResolutionEngine<O> {
    dictionary: DictionaryStore,
    operator: O,
    ignore: IgnoreRules,
    context_width: usize,
    learn_replacements: bool,
    state: State,
}

impl<O: Operator> ResolutionEngine<O> {
    pub fn new(dictionary: DictionaryStore, operator: O) -> Self {
        Self {
            dictionary,
            operator,
            ignore: IgnoreRules::default(),
            context_width: 40,
            learn_replacements: true,
            state: State::Scanning,
        }
    }

    pub fn with_ignore_rules(mut self, ignore: IgnoreRules) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn with_context_width(mut self, width: usize) -> Self {
        self.context_width = width;
        self
    }

    /// Learn the words of every accepted replacement for the rest of the session.
    pub fn with_learn_replacements(mut self, yes: bool) -> Self {
        self.learn_replacements = yes;
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn dictionary(&self) -> &DictionaryStore {
        &self.dictionary
    }

    pub fn operator_mut(&mut self) -> &mut O {
        &mut self.operator
    }

    pub fn into_parts(self) -> (DictionaryStore, O) {
        (self.dictionary, self.operator)
    }

    /// Mark the session finished once there are no more files.
    pub fn finish(&mut self) {
        self.state = State::SessionDone;
    }

    /// Run one file through the state machine and return the accumulated edits.
    pub fn resolve(&mut self, file: &SourceFile) -> Result<Resolution> {
        self.state = State::Scanning;

        let ignored = self.ignore.regions(&file.content);
        let mut earlier: HashMap<String, PriorDecision> = HashMap::new();
        let mut edits = Vec::new();
        let mut prompts = 0;
        let mut end = FileEnd::Exhausted;

        for mut occurrence in Tokenizer::new(&file.content).occurrences() {
            if self.dictionary.contains(&occurrence.word) || ignored.covers(&occurrence.span()) {
                continue;
            }

            let key = normalize(&occurrence.word);
            occurrence.prior = earlier.get(&key).cloned();

            self.state = State::AwaitingDecision;
            prompts += 1;
            let action = {
                let prompt = Prompt {
                    path: &file.path,
                    occurrence: &occurrence,
                    context: Context::new(&file.content, &occurrence, self.context_width),
                };
                self.await_action(&prompt)?
            };
            self.state = State::Scanning;

            match action {
                Action::Replace(replacement) => {
                    if self.learn_replacements {
                        for word in Tokenizer::new(&replacement).occurrences() {
                            self.dictionary.learn(&word.word);
                        }
                    }
                    earlier.insert(key, PriorDecision::Replaced(replacement.clone()));
                    edits.push(PendingEdit {
                        occurrence,
                        replacement,
                    });
                }
                Action::Skip => {
                    earlier.insert(key, PriorDecision::Skipped);
                }
                Action::Learn => {
                    debug!("Adding {} to dictionary", key);
                    self.dictionary.learn(&occurrence.word);
                }
                Action::StopFile => {
                    end = FileEnd::Stopped;
                    break;
                }
                Action::Abort => {
                    end = FileEnd::Aborted;
                    break;
                }
            }
        }

        self.state = State::FileDone;
        Ok(Resolution {
            edits,
            end,
            prompts,
        })
    }

    fn await_action(&mut self, prompt: &Prompt<'_>) -> Result<Action> {
        let decision = loop {
            let Some(input) = self.operator.ask_decision(prompt)? else {
                return Ok(Action::Abort);
            };
            match Decision::parse(&input) {
                Some(decision) => break decision,
                None => self.operator.rejected(&input),
            }
        };

        Ok(match decision {
            Decision::Replace => loop {
                let Some(input) = self.operator.ask_replacement(prompt)? else {
                    return Ok(Action::Abort);
                };
                let replacement = input.trim();
                if replacement.is_empty() {
                    continue;
                }
                break Action::Replace(replacement.to_string());
            },
            Decision::Skip => Action::Skip,
            Decision::Learn => Action::Learn,
            Decision::StopFile => Action::StopFile,
            Decision::Abort => Action::Abort,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::path::PathBuf;

    /// Answers from a fixed script and records the words it was asked about.
    #[derive(Default)]
    struct Script {
        answers: VecDeque<&'static str>,
        asked: Vec<String>,
        priors: Vec<Option<PriorDecision>>,
        rejected: Vec<String>,
    }

    impl Script {
        fn new(answers: &[&'static str]) -> Self {
            Self {
                answers: answers.iter().copied().collect(),
                ..Default::default()
            }
        }
    }

    impl Operator for Script {
        fn ask_decision(&mut self, prompt: &Prompt<'_>) -> io::Result<Option<String>> {
            self.asked.push(prompt.occurrence.word.clone());
            self.priors.push(prompt.occurrence.prior.clone());
            Ok(self.answers.pop_front().map(str::to_string))
        }

        fn ask_replacement(&mut self, _prompt: &Prompt<'_>) -> io::Result<Option<String>> {
            Ok(self.answers.pop_front().map(str::to_string))
        }

        fn rejected(&mut self, input: &str) {
            self.rejected.push(input.to_string());
        }
    }

    fn file(content: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from("test.txt"),
            content: content.to_string(),
        }
    }

    fn engine(answers: &[&'static str]) -> ResolutionEngine<Script> {
        let dictionary = DictionaryStore::from_words(["the", "quick", "brown", "fox"]).unwrap();
        ResolutionEngine::new(dictionary, Script::new(answers))
    }

    #[test]
    fn test_decision_keys() {
        assert_eq!(Decision::parse("y"), Some(Decision::Replace));
        assert_eq!(Decision::parse("N\n"), Some(Decision::Skip));
        assert_eq!(Decision::parse("a"), Some(Decision::Learn));
        assert_eq!(Decision::parse("s"), Some(Decision::StopFile));
        assert_eq!(Decision::parse("q"), Some(Decision::Abort));
        assert_eq!(Decision::parse("yes"), None);
        assert_eq!(Decision::parse(""), None);
        assert_eq!(Decision::parse("x"), None);
        assert_eq!(Decision::Learn.key(), 'a');
    }

    #[test]
    fn test_known_words_are_not_prompted() {
        let mut engine = engine(&[]);
        let resolution = engine.resolve(&file("The QUICK brown fox.")).unwrap();

        assert_eq!(resolution.prompts, 0);
        assert!(resolution.edits.is_empty());
        assert_eq!(resolution.end, FileEnd::Exhausted);
        assert_eq!(engine.state(), State::FileDone);
    }

    #[test]
    fn test_replace_records_pending_edit() {
        let mut engine = engine(&["y", "quick"]);
        let resolution = engine.resolve(&file("The quikc fox")).unwrap();

        assert_eq!(resolution.edits.len(), 1);
        assert_eq!(resolution.edits[0].occurrence.word, "quikc");
        assert_eq!(resolution.edits[0].occurrence.span(), 4..9);
        assert_eq!(resolution.edits[0].replacement, "quick");
    }

    #[test]
    fn test_invalid_input_is_reprompted() {
        let mut engine = engine(&["maybe", "z", "y", "   ", "quick"]);
        let resolution = engine.resolve(&file("The quikc fox")).unwrap();

        assert_eq!(resolution.edits[0].replacement, "quick");
        assert_eq!(engine.operator_mut().rejected, vec!["maybe", "z"]);
        assert_eq!(engine.operator_mut().asked.len(), 3);
    }

    #[test]
    fn test_learn_applies_to_later_occurrences() {
        let mut engine = engine(&["a"]);
        let resolution = engine.resolve(&file("quikc Quikc QUIKC")).unwrap();

        assert_eq!(resolution.prompts, 1);
        assert!(resolution.edits.is_empty());
        assert!(engine.dictionary().contains("quikc"));
    }

    #[test]
    fn test_skip_is_remembered_as_prior_decision() {
        let mut engine = engine(&["n", "y", "fix", "n"]);
        let resolution = engine.resolve(&file("zzz zzz zzz")).unwrap();

        assert_eq!(resolution.prompts, 3);
        let priors = &engine.operator_mut().priors;
        assert_eq!(priors[0], None);
        assert_eq!(priors[1], Some(PriorDecision::Skipped));
        assert_eq!(priors[2], Some(PriorDecision::Replaced("fix".to_string())));
    }

    #[test]
    fn test_stop_file_keeps_earlier_edits() {
        let mut engine = engine(&["y", "quick", "s"]);
        let resolution = engine.resolve(&file("quikc brwn foxx")).unwrap();

        assert_eq!(resolution.end, FileEnd::Stopped);
        assert_eq!(resolution.prompts, 2);
        assert_eq!(resolution.edits.len(), 1);
        assert_eq!(engine.state(), State::FileDone);
    }

    #[test]
    fn test_abort_and_exhausted_input() {
        let mut quitting = engine(&["y", "quick", "q"]);
        let resolution = quitting.resolve(&file("quikc brwn")).unwrap();
        assert_eq!(resolution.end, FileEnd::Aborted);
        assert_eq!(resolution.edits.len(), 1);

        let mut silent = engine(&[]);
        let resolution = silent.resolve(&file("quikc")).unwrap();
        assert_eq!(resolution.end, FileEnd::Aborted);
    }

    #[test]
    fn test_replacement_words_are_learned() {
        let mut engine = engine(&["y", "quack", "n"]);
        let resolution = engine.resolve(&file("quikc quack")).unwrap();
        assert_eq!(resolution.prompts, 1);

        let dictionary = DictionaryStore::from_words(["fox"]).unwrap();
        let mut engine = ResolutionEngine::new(dictionary, Script::new(&["y", "quack", "n"]))
            .with_learn_replacements(false);
        let resolution = engine.resolve(&file("quikc quack")).unwrap();
        assert_eq!(resolution.prompts, 2);
    }

    #[test]
    fn test_ignored_regions_are_not_prompted() {
        let rules = IgnoreRules::new(&[r"https?://\S+".to_string()]);
        let mut engine = engine(&[]).with_ignore_rules(rules);
        let resolution = engine.resolve(&file("the https://exmpl.cm fox")).unwrap();
        assert_eq!(resolution.prompts, 0);
    }

    #[test]
    fn test_context_window() {
        let content = "first line\nsome words before the quikc and after it\nlast";
        let occurrence = Tokenizer::new(content)
            .occurrences()
            .find(|o| o.word == "quikc")
            .unwrap();

        let context = Context::new(content, &occurrence, 100);
        assert_eq!(context.before, "some words before the ");
        assert_eq!(context.word, "quikc");
        assert_eq!(context.after, " and after it");
        assert!(!context.truncated_before && !context.truncated_after);

        let context = Context::new(content, &occurrence, 4);
        assert_eq!(context.before, "the ");
        assert_eq!(context.after, " and");
        assert!(context.truncated_before && context.truncated_after);
    }
}
