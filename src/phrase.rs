use include_dir::{include_dir, Dir};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

static PHRASE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/phrases");

/// What is shown above the masked phrase before any translation arrives
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Annotation {
    /// Human written gloss from a built-in list
    Gloss(String),
    /// Number of times a mined phrase occurs in its source text
    Repeats(usize),
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Annotation::Gloss(gloss) => f.write_str(gloss),
            Annotation::Repeats(count) => {
                write!(f, "found {count} times · Ctrl+T translates")
            }
        }
    }
}

/// A practice phrase. Never mutated once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Phrase {
    text: String,
    annotation: Annotation,
}

impl Phrase {
    pub fn with_gloss(text: impl Into<String>, gloss: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            annotation: Annotation::Gloss(gloss.into()),
        }
    }

    pub fn mined(text: impl Into<String>, repeats: usize) -> Self {
        Self {
            text: text.into(),
            annotation: Annotation::Repeats(repeats),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// Repeat count for mined phrases, `None` for glossed ones
    pub fn repeats(&self) -> Option<usize> {
        match self.annotation {
            Annotation::Repeats(count) => Some(count),
            Annotation::Gloss(_) => None,
        }
    }
}

/// Ordered phrases the trainer draws from; always swapped out as a whole
pub type PhraseCollection = Vec<Phrase>;

#[derive(Error, Debug)]
pub enum PhraseListError {
    #[error("phrase list not found: {0}")]
    NotFound(String),

    #[error("phrase list {0} is not valid UTF-8")]
    Encoding(String),

    #[error("phrase list is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Deserialize)]
struct PhraseList {
    #[allow(dead_code)]
    name: String,
    phrases: Vec<PhraseEntry>,
}

#[derive(Deserialize)]
struct PhraseEntry {
    text: String,
    gloss: String,
}

/// Load one of the phrase lists compiled into the binary
pub fn read_builtin(name: &str) -> Result<PhraseCollection, PhraseListError> {
    let file_name = format!("{name}.json");
    let file = PHRASE_DIR
        .get_file(&file_name)
        .ok_or_else(|| PhraseListError::NotFound(file_name.clone()))?;

    let contents = file
        .contents_utf8()
        .ok_or(PhraseListError::Encoding(file_name))?;

    let list: PhraseList = serde_json::from_str(contents)?;

    Ok(list
        .phrases
        .into_iter()
        .map(|entry| Phrase::with_gloss(entry.text, entry.gloss))
        .collect())
}

/// The collection a fresh session starts with
pub fn default_phrases() -> PhraseCollection {
    read_builtin("default").unwrap_or_else(|e| {
        log::error!("built-in phrase list unavailable: {e}");
        Vec::new()
    })
}
