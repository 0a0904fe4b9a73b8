//! Splits file text into checkable words.
//!
//! A word is a maximal run of alphabetic grapheme clusters. An apostrophe
//! (`'` or `’`) belongs to a word only when letters sit on both sides of it,
//! so `don't` is one word while `'quoted'` yields `quoted`. Hyphens,
//! underscores, digits and everything else split words.

use std::iter::Peekable;
use std::ops::Range;
use unicode_segmentation::{GraphemeIndices, UnicodeSegmentation};

/// Decision already taken for the same word earlier in the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PriorDecision {
    Skipped,
    Replaced(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordOccurrence {
    pub word: String,
    pub start: usize, // Byte offset where the word starts
    pub end: usize,   // Byte offset one past the word
    pub line: usize,
    pub column: usize,
    pub prior: Option<PriorDecision>,
}

impl WordOccurrence {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn normalized(&self) -> String {
        normalize(&self.word)
    }
}

/// Case-fold a word for dictionary matching. Shared by the tokenizer's
/// consumers and the dictionary so both sides always agree.
pub fn normalize(word: &str) -> String {
    word.replace('\u{2019}', "'").to_lowercase()
}

#[derive(Debug, Clone, Copy)]
pub struct Tokenizer<'a> {
    text: &'a str,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text }
    }

    /// Lazily yield occurrences in document order. Each call starts over.
    pub fn occurrences(&self) -> Occurrences<'a> {
        Occurrences {
            text: self.text,
            graphemes: self.text.grapheme_indices(true).peekable(),
            line: 1,
            line_start: 0,
        }
    }
}

impl<'a> IntoIterator for Tokenizer<'a> {
    type Item = WordOccurrence;
    type IntoIter = Occurrences<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.occurrences()
    }
}

pub struct Occurrences<'a> {
    text: &'a str,
    graphemes: Peekable<GraphemeIndices<'a>>,
    line: usize,
    line_start: usize,
}

impl Iterator for Occurrences<'_> {
    type Item = WordOccurrence;

    fn next(&mut self) -> Option<WordOccurrence> {
        loop {
            let (start, grapheme) = self.graphemes.next()?;

            if grapheme == "\n" || grapheme == "\r\n" {
                self.line += 1;
                self.line_start = start + grapheme.len();
                continue;
            }

            if !is_letter(grapheme) {
                continue;
            }

            let mut end = start + grapheme.len();
            while let Some(&(offset, next)) = self.graphemes.peek() {
                let joins = is_letter(next)
                    || (is_apostrophe(next) && self.letter_at(offset + next.len()));
                if !joins {
                    break;
                }
                end = offset + next.len();
                self.graphemes.next();
            }

            let column = self.text[self.line_start..start].chars().count() + 1;

            return Some(WordOccurrence {
                word: self.text[start..end].to_string(),
                start,
                end,
                line: self.line,
                column,
                prior: None,
            });
        }
    }
}

impl Occurrences<'_> {
    fn letter_at(&self, offset: usize) -> bool {
        self.text[offset..]
            .graphemes(true)
            .next()
            .is_some_and(is_letter)
    }
}

fn is_letter(grapheme: &str) -> bool {
    grapheme.chars().next().is_some_and(char::is_alphabetic)
}

fn is_apostrophe(grapheme: &str) -> bool {
    grapheme == "'" || grapheme == "\u{2019}"
}
