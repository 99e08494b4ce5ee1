use rand::seq::index;
use rand::Rng;
use std::collections::BTreeSet;

/// Glyph standing in for a hidden character
pub const PLACEHOLDER: char = '_';

/// Hidden positions of the phrase currently on screen, and how it reads masked
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaskState {
    /// Char indices into the phrase; never points at a space
    pub hidden: BTreeSet<usize>,
    pub display: String,
}

impl MaskState {
    /// A mask that hides nothing
    pub fn unmasked(text: &str) -> Self {
        Self {
            hidden: BTreeSet::new(),
            display: text.to_owned(),
        }
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }
}

/// Number of characters that are eligible for masking
pub fn non_space_len(text: &str) -> usize {
    text.chars().filter(|&c| c != ' ').count()
}

/// Hide `hide_count` random non-space characters of `text`
pub fn mask(text: &str, hide_count: usize) -> String {
    mask_with(text, hide_count, &mut rand::thread_rng()).display
}

/// Like [`mask`] but with a caller supplied RNG, returning the full state
pub fn mask_with<R: Rng + ?Sized>(text: &str, hide_count: usize, rng: &mut R) -> MaskState {
    let candidates: Vec<usize> = text
        .chars()
        .enumerate()
        .filter(|&(_, c)| c != ' ')
        .map(|(i, _)| i)
        .collect();

    let k = hide_count.min(candidates.len());
    if k == 0 {
        return MaskState::unmasked(text);
    }

    let hidden: BTreeSet<usize> = index::sample(rng, candidates.len(), k)
        .into_iter()
        .map(|i| candidates[i])
        .collect();

    let display = text
        .chars()
        .enumerate()
        .map(|(i, c)| if hidden.contains(&i) { PLACEHOLDER } else { c })
        .collect();

    MaskState { hidden, display }
}

/// How close an answer came to the expected phrase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchResult {
    Exact,
    AcceptedWithDiacriticsNormalized,
    NoMatch,
}

impl MatchResult {
    pub fn is_solved(self) -> bool {
        !matches!(self, MatchResult::NoMatch)
    }

    /// Status line shown to the learner after a check
    pub fn feedback(self, correct_text: &str) -> String {
        match self {
            MatchResult::Exact => "✅ Perfect! (Enter or Alt+→ for the next one)".to_string(),
            MatchResult::AcceptedWithDiacriticsNormalized => {
                format!("✅ Accepted! (correct: {})", normalize(correct_text))
            }
            MatchResult::NoMatch => "❌ Still some mistakes...".to_string(),
        }
    }
}

/// Map Romanian diacritics to their base Latin letters.
///
/// Both the comma-below (ș, ț) and the legacy cedilla (ş, ţ) forms fold.
pub fn fold_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ă' | 'â' => 'a',
            'î' => 'i',
            'ș' | 'ş' => 's',
            'ț' | 'ţ' => 't',
            'Ă' | 'Â' => 'A',
            'Î' => 'I',
            'Ș' | 'Ş' => 'S',
            'Ț' | 'Ţ' => 'T',
            other => other,
        })
        .collect()
}

/// Trimmed, lowercased form used for comparison
pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Compare an answer against the expected phrase
pub fn score(user_input: &str, correct_text: &str) -> MatchResult {
    let user = normalize(user_input);
    let correct = normalize(correct_text);

    if user == correct {
        MatchResult::Exact
    } else if fold_diacritics(&user) == fold_diacritics(&correct) {
        MatchResult::AcceptedWithDiacriticsNormalized
    } else {
        MatchResult::NoMatch
    }
}
