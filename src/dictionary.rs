//! Word list loading and normalization.
//!
//! The filler only ever asks one question of a dictionary: "which words have
//! length N?", so words are bucketed by length up front. Input words are
//! normalized to lowercase ASCII; anything containing a non-letter after
//! trimming is skipped rather than rejected, so real-world lists with
//! phrases, hyphens or diacritics load without preprocessing.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde_json::Value;

use crate::errors::DictionaryError;

/// Words bucketed by length, normalized and deduplicated.
#[derive(Debug, Default, Clone)]
pub struct Dictionary {
    by_length: HashMap<usize, Vec<String>>,
}

impl Dictionary {
    /// Build a dictionary from any iterator of words.
    ///
    /// Words are lowercased; entries that are not purely ASCII letters after
    /// trimming are dropped. Each bucket is sorted and deduplicated.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut by_length: HashMap<usize, Vec<String>> = HashMap::new();
        let mut skipped = 0usize;

        for word in words {
            let word = word.as_ref().trim().to_ascii_lowercase();
            if word.is_empty() {
                continue;
            }
            if !word.bytes().all(|b| b.is_ascii_lowercase()) {
                skipped += 1;
                continue;
            }
            by_length.entry(word.len()).or_default().push(word);
        }

        for bucket in by_length.values_mut() {
            bucket.sort_unstable();
            bucket.dedup();
        }

        if skipped > 0 {
            debug!("skipped {skipped} non-alphabetic dictionary entries");
        }

        Self { by_length }
    }

    /// Parse a plain-text word list: one word per line, with an optional
    /// `;score` suffix that is ignored. Blank lines and `#` comments are
    /// skipped.
    #[must_use]
    pub fn parse_from_str(input: &str) -> Self {
        let words = input.lines().filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                return None;
            }
            Some(match line.split_once(';') {
                Some((word, _score)) => word,
                None => line,
            })
        });
        Self::from_words(words)
    }

    /// Load a plain-text word list from disk.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, DictionaryError> {
        let contents = fs::read_to_string(path)?;
        Ok(Self::parse_from_str(&contents))
    }

    /// Parse a JSON dictionary keyed by word length.
    ///
    /// Two layouts are accepted: `{"3": ["cat", ...]}` and
    /// `{"3": {"cat": <anything>, ...}}`. The length keys are advisory;
    /// bucketing always uses the actual word length.
    pub fn from_json_str(input: &str) -> Result<Self, DictionaryError> {
        let value: Value = serde_json::from_str(input)?;
        let Value::Object(map) = value else {
            return Err(DictionaryError::UnsupportedShape {
                context: "top level is not an object".to_string(),
            });
        };

        let mut words = Vec::new();
        for (key, bucket) in map {
            match bucket {
                Value::Array(entries) => {
                    for entry in entries {
                        let Value::String(word) = entry else {
                            return Err(DictionaryError::UnsupportedShape {
                                context: format!("non-string entry under key {key:?}"),
                            });
                        };
                        words.push(word);
                    }
                }
                Value::Object(entries) => {
                    words.extend(entries.into_iter().map(|(k, _)| k));
                }
                other => {
                    return Err(DictionaryError::UnsupportedShape {
                        context: format!(
                            "expected an array or object under key {key:?}, got {other}"
                        ),
                    });
                }
            }
        }

        Ok(Self::from_words(words))
    }

    /// Load a JSON dictionary from disk.
    pub fn load_json_from_path<P: AsRef<Path>>(path: P) -> Result<Self, DictionaryError> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Load either format based on the file extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::load_json_from_path(path)
        } else {
            Self::load_from_path(path)
        }
    }

    /// All words of the given length, sorted.
    #[must_use]
    pub fn words(&self, length: usize) -> &[String] {
        self.by_length
            .get(&length)
            .map_or(&[], |bucket| bucket.as_slice())
    }

    /// Total word count across all lengths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_length.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_length.is_empty()
    }

    /// Warn when the dictionary cannot possibly cover the configured word
    /// lengths; the fill step would then fail on every run of that length.
    pub fn warn_on_missing_lengths(&self, min: usize, max: usize) {
        for length in min..=max {
            if self.words(length).is_empty() {
                warn!("dictionary has no words of length {length}");
            }
        }
    }
}
