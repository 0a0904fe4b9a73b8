use crate::checker::tokenizer::normalize;
use crate::error::{Error, Result};
use fst::{Set, SetBuilder};
use std::collections::{BTreeSet, HashSet};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::Path;
use tracing::info;

/// Known words for one session: the loaded word list plus anything learned
/// while the session runs. Learned words are never written anywhere.
pub struct DictionaryStore {
    base: Set<Vec<u8>>,
    learned: HashSet<String>,
}

impl DictionaryStore {
    /// Load a dictionary from disk. Files with a `.dict` extension are read as
    /// compiled FST sets; anything else is treated as a plain word list.
    pub fn load(path: &Path) -> Result<Self> {
        let unavailable = |reason: String| Error::DictionaryUnavailable {
            path: path.to_path_buf(),
            reason,
        };

        let store = if path.extension().and_then(|e| e.to_str()) == Some("dict") {
            let bytes = fs::read(path).map_err(|e| unavailable(e.to_string()))?;
            let base = Set::new(bytes).map_err(|e| unavailable(e.to_string()))?;
            Self::from_set(base)
        } else {
            let file = File::open(path).map_err(|e| unavailable(e.to_string()))?;
            Self::from_reader(BufReader::new(file)).map_err(|e| match e {
                Error::DictionaryUnavailable { reason, .. } => unavailable(reason),
                other => other,
            })?
        };

        info!("dictionary file: {} ({} words)", path.display(), store.len());
        Ok(store)
    }

    /// Build a dictionary from an already opened word list: one word per
    /// line, blank lines and `#` comments ignored. Lines are decoded lossily.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut words = BTreeSet::new();
        for line in reader.split(b'\n') {
            let line = line.map_err(|e| Error::DictionaryUnavailable {
                path: "<reader>".into(),
                reason: e.to_string(),
            })?;
            let line = String::from_utf8_lossy(&line);
            let word = line.trim();
            if !word.is_empty() && !word.starts_with('#') {
                words.insert(normalize(word));
            }
        }

        let base = Set::from_iter(words).map_err(|e| Error::DictionaryUnavailable {
            path: "<reader>".into(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_set(base))
    }

    pub fn from_words<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sorted: BTreeSet<String> = words
            .into_iter()
            .map(|w| normalize(w.as_ref().trim()))
            .filter(|w| !w.is_empty())
            .collect();
        let base = Set::from_iter(sorted).map_err(|e| Error::DictionaryUnavailable {
            path: "<words>".into(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_set(base))
    }

    fn from_set(base: Set<Vec<u8>>) -> Self {
        Self {
            base,
            learned: HashSet::new(),
        }
    }

    /// Check if the word is known, ignoring case. Never mutates.
    pub fn contains(&self, word: &str) -> bool {
        let word = normalize(word);
        self.learned.contains(&word) || self.base.contains(word.as_bytes())
    }

    /// Remember a word for the rest of the session. Returns `false` if it was
    /// already known.
    pub fn learn(&mut self, word: &str) -> bool {
        let word = normalize(word.trim());
        if word.is_empty() || self.base.contains(word.as_bytes()) {
            return false;
        }
        self.learned.insert(word)
    }

    /// Number of words loaded from the source.
    pub fn len(&self) -> usize {
        self.base.len()
    }

    pub fn is_empty(&self) -> bool {
        self.base.is_empty() && self.learned.is_empty()
    }

    /// Words learned during this session, sorted.
    pub fn learned(&self) -> Vec<&str> {
        let mut words: Vec<&str> = self.learned.iter().map(String::as_str).collect();
        words.sort_unstable();
        words
    }

    /// Compile a word list into an FST dictionary file.
    pub fn build_from_words(words: &[String], output_path: &Path) -> anyhow::Result<usize> {
        use anyhow::Context;

        let sorted: BTreeSet<String> = words
            .iter()
            .map(|w| normalize(w.trim()))
            .filter(|w| !w.is_empty() && !w.starts_with('#'))
            .collect();

        let file = File::create(output_path)
            .with_context(|| format!("Failed to create dictionary: {}", output_path.display()))?;

        let writer = BufWriter::new(file);
        let mut builder = SetBuilder::new(writer).context("Failed to create FST builder")?;

        for word in &sorted {
            builder
                .insert(word.as_bytes())
                .context("Failed to insert word into dictionary")?;
        }

        builder.finish().context("Failed to finalize dictionary")?;

        Ok(sorted.len())
    }
}

impl std::fmt::Debug for DictionaryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DictionaryStore")
            .field("words", &self.base.len())
            .field("learned", &self.learned.len())
            .finish()
    }
}

/// Read a plain word list into memory, used when compiling dictionaries.
pub fn read_word_list(path: &Path) -> io::Result<Vec<String>> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes)
        .lines()
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let dict = DictionaryStore::from_words(["the", "Quick", "brown", "fox"]).unwrap();
        assert!(dict.contains("The"));
        assert!(dict.contains("QUICK"));
        assert!(dict.contains("quick"));
        assert!(!dict.contains("quikc"));
        assert_eq!(dict.len(), 4);
    }

    #[test]
    fn test_from_reader_skips_comments_and_blanks() {
        let source = "# header\napple\n\n  Banana  \r\ndon’t\n";
        let dict = DictionaryStore::from_reader(Cursor::new(source)).unwrap();
        assert_eq!(dict.len(), 3);
        assert!(dict.contains("banana"));
        assert!(dict.contains("don't"));
        assert!(!dict.contains("# header"));
    }

    #[test]
    fn test_from_reader_tolerates_invalid_utf8() {
        let source: &[u8] = b"caf\xe9\nok\n";
        let dict = DictionaryStore::from_reader(Cursor::new(source)).unwrap();
        assert!(dict.contains("ok"));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_learn_is_idempotent_and_case_folded() {
        let mut dict = DictionaryStore::from_words(["fox"]).unwrap();
        assert!(dict.learn("Quikc"));
        assert!(!dict.learn("quikc"));
        assert!(!dict.learn("QUIKC"));
        assert!(!dict.learn("fox"));
        assert!(dict.contains("qUiKc"));
        assert_eq!(dict.learned(), vec!["quikc"]);
        assert_eq!(dict.len(), 1);
    }

    #[test]
    fn test_missing_source_is_unavailable() {
        let dir = tempdir().unwrap();
        let err = DictionaryStore::load(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, Error::DictionaryUnavailable { .. }));
    }

    #[test]
    fn test_build_and_load_compiled_dictionary() {
        let dir = tempdir().unwrap();
        let dict_path = dir.path().join("test.dict");

        let words = vec!["hello".to_string(), "World".to_string(), "test".to_string()];
        let count = DictionaryStore::build_from_words(&words, &dict_path).unwrap();
        assert_eq!(count, 3);

        let dict = DictionaryStore::load(&dict_path).unwrap();
        assert!(dict.contains("hello"));
        assert!(dict.contains("world"));
        assert!(!dict.contains("notfound"));
    }

    #[test]
    fn test_load_word_list_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("words");
        fs::write(&path, "alpha\nbeta\n").unwrap();

        let dict = DictionaryStore::load(&path).unwrap();
        assert!(dict.contains("Alpha"));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_corrupt_compiled_dictionary_is_unavailable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.dict");
        fs::write(&path, b"not an fst").unwrap();

        let err = DictionaryStore::load(&path).unwrap_err();
        assert!(matches!(err, Error::DictionaryUnavailable { .. }));
    }
}
