//! Phrase mining: recurring word n-grams pulled out of a user's own text.
//!
//! The document is lowercased, split into runs of word characters, and every
//! contiguous n-gram for each length in the configured range is counted.
//! N-grams of different lengths are counted independently, so a 3-gram that
//! sits inside a frequent 4-gram is reported alongside it.

use itertools::Itertools;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::phrase::{Phrase, PhraseCollection};

pub const DEFAULT_MIN_WORDS: usize = 3;
pub const DEFAULT_MAX_WORDS: usize = 5;

#[derive(Error, Debug)]
pub enum MineError {
    #[error("cannot read {}: {source}", .path.display())]
    FileUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("the text contains no words")]
    EmptyInput,

    #[error("no phrase repeats at least {min_repeats} times")]
    NoRecurringPhrases { min_repeats: usize },

    #[error("invalid phrase length range {min_n}..={max_n}")]
    InvalidRange { min_n: usize, max_n: usize },
}

pub type Result<T> = std::result::Result<T, MineError>;

/// Mining parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinerConfig {
    pub min_repeats: usize,
    pub min_n: usize,
    pub max_n: usize,
}

impl MinerConfig {
    pub fn new(min_repeats: usize) -> Self {
        Self {
            min_repeats,
            ..Self::default()
        }
    }

    pub fn with_lengths(mut self, min_n: usize, max_n: usize) -> Self {
        self.min_n = min_n;
        self.max_n = max_n;
        self
    }
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            min_repeats: 5,
            min_n: DEFAULT_MIN_WORDS,
            max_n: DEFAULT_MAX_WORDS,
        }
    }
}

/// Lowercase the text and split it into maximal runs of word characters
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Every contiguous `n`-word window of `words`, joined by single spaces
pub fn ngrams(words: &[String], n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    words.windows(n).map(|window| window.join(" ")).collect()
}

/// Extract recurring phrases from in-memory text, most frequent first.
///
/// Returns an empty collection when words exist but nothing repeats often
/// enough; callers decide whether that is an error for them.
pub fn extract(contents: &str, config: &MinerConfig) -> Result<PhraseCollection> {
    if config.min_n == 0 || config.min_n > config.max_n {
        return Err(MineError::InvalidRange {
            min_n: config.min_n,
            max_n: config.max_n,
        });
    }

    let words = tokenize(contents);
    if words.is_empty() {
        return Err(MineError::EmptyInput);
    }

    let min_repeats = config.min_repeats.max(1);
    let mut found: Vec<(String, usize)> = Vec::new();

    for n in config.min_n..=config.max_n {
        let grams = ngrams(&words, n);
        let counts = grams.iter().counts();

        found.extend(
            grams
                .iter()
                .unique()
                .filter_map(|gram| {
                    let count = counts[gram];
                    (count >= min_repeats).then(|| (gram.clone(), count))
                }),
        );
    }

    // stable: equal counts keep extraction order
    found.sort_by(|a, b| b.1.cmp(&a.1));

    Ok(found
        .into_iter()
        .map(|(text, count)| Phrase::mined(text, count))
        .collect())
}

/// Read a UTF-8 text file and extract recurring phrases from it
pub fn extract_file<P: AsRef<Path>>(path: P, config: &MinerConfig) -> Result<PhraseCollection> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| MineError::FileUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let phrases = extract(&contents, config)?;
    log::info!(
        "mined {} phrases from {} (min repeats {}, {}..={} words)",
        phrases.len(),
        path.display(),
        config.min_repeats,
        config.min_n,
        config.max_n
    );
    Ok(phrases)
}
