use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;

use crate::history::SessionHistory;
use crate::masking::{mask_with, non_space_len, score, MaskState, MatchResult};
use crate::miner::{self, MineError, MinerConfig};
use crate::phrase::{default_phrases, Phrase, PhraseCollection};
use crate::translate::{TranslationDesk, TranslationError, TranslationReply};

/// Colour hint for the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Muted,
    Good,
    Bad,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Status {
    pub text: String,
    pub tone: Tone,
}

impl Status {
    pub fn new(text: impl Into<String>, tone: Tone) -> Self {
        Self {
            text: text.into(),
            tone,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Where the active phrases came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Builtin,
    File { name: String, phrases: usize },
}

impl Source {
    pub fn label(&self) -> String {
        match self {
            Source::Builtin => "(start: built-in phrases)".to_string(),
            Source::File { name, phrases } => format!("Loaded: {phrases} phrases from {name}"),
        }
    }
}

/// Single line text buffer with a char based cursor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineInput {
    chars: Vec<char>,
    cursor: usize,
}

impl LineInput {
    /// Buffer holding `text` with the cursor at its end
    pub fn prefilled(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn insert(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            self.chars.remove(self.cursor);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.chars.len() {
            self.chars.remove(self.cursor);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        if self.cursor < self.chars.len() {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.chars.len();
    }
}

/// One practice session: the phrases in play, what has been shown, and the
/// exercise currently on screen.
#[derive(Debug)]
pub struct Trainer {
    history: SessionHistory,
    source: Source,
    mask: MaskState,
    hide_count: usize,
    answer: LineInput,
    status: Status,
    info: String,
    solved: bool,
    last_result: Option<MatchResult>,
    // bumped whenever the displayed phrase changes
    generation: u64,
    translating: bool,
    rng: StdRng,
}

impl Trainer {
    pub fn new(collection: PhraseCollection) -> Self {
        Self::with_rng(collection, StdRng::from_entropy())
    }

    pub fn with_rng(collection: PhraseCollection, rng: StdRng) -> Self {
        Self {
            history: SessionHistory::new(collection),
            source: Source::Builtin,
            mask: MaskState::default(),
            hide_count: 0,
            answer: LineInput::default(),
            status: Status::default(),
            info: String::new(),
            solved: false,
            last_result: None,
            generation: 0,
            translating: false,
            rng,
        }
    }

    pub fn current_phrase(&self) -> Option<&Phrase> {
        self.history.current()
    }

    pub fn history(&self) -> &SessionHistory {
        &self.history
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn mask(&self) -> &MaskState {
        &self.mask
    }

    pub fn hide_count(&self) -> usize {
        self.hide_count
    }

    /// Upper bound of the hide slider for the current phrase
    pub fn max_hide(&self) -> usize {
        self.current_phrase()
            .map_or(0, |phrase| non_space_len(phrase.text()))
    }

    pub fn answer(&self) -> &LineInput {
        &self.answer
    }

    pub fn answer_mut(&mut self) -> &mut LineInput {
        &mut self.answer
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn info(&self) -> &str {
        &self.info
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn last_result(&self) -> Option<MatchResult> {
        self.last_result
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_translating(&self) -> bool {
        self.translating
    }

    pub fn can_go_back(&self) -> bool {
        self.history.can_retreat()
    }

    /// Show the next phrase, replaying history before drawing new ones
    pub fn next_phrase(&mut self) -> bool {
        if self.history.advance_with(&mut self.rng).is_none() {
            return false;
        }
        self.setup_current();
        true
    }

    pub fn prev_phrase(&mut self) -> bool {
        if self.history.retreat().is_none() {
            return false;
        }
        self.setup_current();
        self.status = Status::new("⏮ Went back", Tone::Muted);
        true
    }

    fn setup_current(&mut self) {
        self.generation += 1;
        self.translating = false;
        self.solved = false;
        self.last_result = None;
        self.status = Status::default();

        let Some(phrase) = self.history.current() else {
            return;
        };
        self.info = phrase.annotation().to_string();
        self.hide_count = usize::from(non_space_len(phrase.text()) > 0);
        self.remask();
    }

    fn remask(&mut self) {
        if let Some(phrase) = self.history.current() {
            self.mask = mask_with(phrase.text(), self.hide_count, &mut self.rng);
            self.answer = LineInput::prefilled(&self.mask.display);
        }
    }

    /// Move the hide slider; the phrase is masked afresh and the answer reset
    pub fn set_hide_count(&mut self, hide_count: usize) {
        if self.current_phrase().is_none() {
            return;
        }
        self.hide_count = hide_count.min(self.max_hide());
        self.solved = false;
        self.last_result = None;
        self.status = Status::default();
        self.remask();
    }

    pub fn increase_hide(&mut self) {
        self.set_hide_count(self.hide_count.saturating_add(1));
    }

    pub fn decrease_hide(&mut self) {
        self.set_hide_count(self.hide_count.saturating_sub(1));
    }

    /// Score the answer buffer against the current phrase
    pub fn check_answer(&mut self) -> Option<MatchResult> {
        let phrase = self.history.current()?;
        let result = score(&self.answer.text(), phrase.text());

        self.status = Status::new(
            result.feedback(phrase.text()),
            match result {
                MatchResult::Exact | MatchResult::AcceptedWithDiacriticsNormalized => Tone::Good,
                MatchResult::NoMatch => Tone::Bad,
            },
        );
        self.solved = result.is_solved();
        self.last_result = Some(result);
        Some(result)
    }

    /// Enter: move on once solved, otherwise check
    pub fn submit(&mut self) {
        if self.solved {
            self.next_phrase();
        } else {
            self.check_answer();
        }
    }

    /// Mine `path` and switch to its phrases.
    ///
    /// On any failure the previous phrases and history stay active; the error
    /// is both returned and shown on the status line.
    pub fn load_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        config: &MinerConfig,
    ) -> Result<usize, MineError> {
        let path = path.as_ref();
        let mined = miner::extract_file(path, config).and_then(|phrases| {
            if phrases.is_empty() {
                Err(MineError::NoRecurringPhrases {
                    min_repeats: config.min_repeats,
                })
            } else {
                Ok(phrases)
            }
        });

        let phrases = match mined {
            Ok(phrases) => phrases,
            Err(e) => {
                log::warn!("keeping current phrases, mining {} failed: {e}", path.display());
                self.status = Status::new(format!("⚠ {e}"), Tone::Bad);
                return Err(e);
            }
        };

        let count = phrases.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.history.reset(phrases);
        self.source = Source::File {
            name,
            phrases: count,
        };
        self.next_phrase();
        self.status = Status::new(format!("Found {count} phrases!"), Tone::Good);
        Ok(count)
    }

    /// Ask `desk` for a translation of the current phrase
    pub fn request_translation(&mut self, desk: &TranslationDesk) -> bool {
        if self.translating {
            return false;
        }
        let Some(phrase) = self.history.current() else {
            return false;
        };
        desk.request(phrase.text(), self.generation);
        self.translating = true;
        self.info = "⏳ Translating...".to_string();
        true
    }

    pub fn translation_unavailable(&mut self, err: TranslationError) {
        self.info = err.to_string();
    }

    /// Apply a finished lookup; replies for a phrase no longer shown are dropped
    pub fn apply_translation(&mut self, reply: TranslationReply) -> bool {
        if reply.generation != self.generation {
            log::debug!(
                "dropping stale translation for generation {} (now {})",
                reply.generation,
                self.generation
            );
            return false;
        }
        self.translating = false;
        self.info = match reply.text {
            Ok(text) => text,
            Err(e) => format!("error: {e}"),
        };
        true
    }
}

impl Default for Trainer {
    fn default() -> Self {
        Self::new(default_phrases())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::masking::PLACEHOLDER;
    use crate::phrase::Annotation;
    use assert_matches::assert_matches;
    use std::io::Write;

    fn seeded(collection: PhraseCollection) -> Trainer {
        Trainer::with_rng(collection, StdRng::seed_from_u64(11))
    }

    fn single(text: &str) -> Trainer {
        let mut trainer = seeded(vec![Phrase::with_gloss(text, "gloss")]);
        trainer.next_phrase();
        trainer
    }

    fn type_answer(trainer: &mut Trainer, text: &str) {
        *trainer.answer_mut() = LineInput::prefilled(text);
    }

    #[test]
    fn fresh_trainer_shows_nothing() {
        let trainer = Trainer::default();

        assert!(trainer.current_phrase().is_none());
        assert_eq!(trainer.source(), &Source::Builtin);
        assert_eq!(trainer.max_hide(), 0);
    }

    #[test]
    fn first_phrase_hides_one_char_and_prefills_answer() {
        let trainer = single("o zi buna");

        assert_eq!(trainer.hide_count(), 1);
        assert_eq!(trainer.mask().hidden_count(), 1);
        assert_eq!(trainer.answer().text(), trainer.mask().display);
        assert_eq!(trainer.info(), "gloss");
        assert!(!trainer.is_solved());
    }

    #[test]
    fn slider_is_clamped_and_remasks() {
        let mut trainer = single("o zi buna");

        trainer.set_hide_count(50);
        assert_eq!(trainer.hide_count(), 7);
        assert_eq!(trainer.answer().text(), "_ __ ____");

        trainer.set_hide_count(0);
        assert_eq!(trainer.answer().text(), "o zi buna");

        trainer.decrease_hide();
        assert_eq!(trainer.hide_count(), 0);
        trainer.increase_hide();
        assert_eq!(trainer.hide_count(), 1);
    }

    #[test]
    fn unedited_mask_is_not_accepted() {
        let mut trainer = single("ce mai faci");

        assert_eq!(trainer.check_answer(), Some(MatchResult::NoMatch));
        assert!(!trainer.is_solved());
        assert_eq!(trainer.status().tone, Tone::Bad);
    }

    #[test]
    fn accepted_answer_reveals_diacritics() {
        let mut trainer = single("nu știu nimic");
        type_answer(&mut trainer, "nu stiu nimic");

        assert_eq!(
            trainer.check_answer(),
            Some(MatchResult::AcceptedWithDiacriticsNormalized)
        );
        assert!(trainer.is_solved());
        assert!(trainer.status().text.contains("nu știu nimic"));
    }

    #[test]
    fn submit_checks_then_advances() {
        let mut trainer = seeded(vec![
            Phrase::with_gloss("ce mai faci", "a"),
            Phrase::with_gloss("o zi buna", "b"),
        ]);
        trainer.next_phrase();
        let first_generation = trainer.generation();
        let text = trainer.current_phrase().unwrap().text().to_string();

        type_answer(&mut trainer, &text);
        trainer.submit();
        assert_eq!(trainer.last_result(), Some(MatchResult::Exact));
        assert_eq!(trainer.generation(), first_generation);

        trainer.submit();
        assert!(!trainer.is_solved());
        assert_eq!(trainer.history().len(), 2);
        assert!(trainer.generation() > first_generation);
    }

    #[test]
    fn going_back_replays_and_says_so() {
        let mut trainer = seeded((0..30).map(|i| Phrase::mined(format!("a b {i}"), 2)).collect());
        trainer.next_phrase();
        let first = trainer.current_phrase().cloned();
        trainer.next_phrase();

        assert!(trainer.can_go_back());
        assert!(trainer.prev_phrase());
        assert_eq!(trainer.current_phrase().cloned(), first);
        assert_eq!(trainer.status().tone, Tone::Muted);
        assert!(!trainer.prev_phrase());
    }

    #[test]
    fn load_file_switches_collection() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "ce mai faci ce mai faci ce mai faci bine").unwrap();
        let mut trainer = Trainer::default();
        trainer.next_phrase();

        let count = trainer
            .load_file(file.path(), &MinerConfig::new(3).with_lengths(3, 3))
            .unwrap();

        assert_eq!(count, 1);
        assert_eq!(trainer.history().len(), 1);
        assert_eq!(trainer.current_phrase().unwrap().text(), "ce mai faci");
        assert_eq!(
            trainer.current_phrase().unwrap().annotation(),
            &Annotation::Repeats(3)
        );
        assert_matches!(trainer.source(), Source::File { phrases: 1, .. });
    }

    #[test]
    fn failed_load_keeps_previous_session() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "nimic nu se repeta aici").unwrap();
        let mut trainer = seeded(default_phrases());
        trainer.next_phrase();
        let before = trainer.current_phrase().cloned();

        let err = trainer.load_file(file.path(), &MinerConfig::new(2)).unwrap_err();
        assert_matches!(err, MineError::NoRecurringPhrases { min_repeats: 2 });
        assert_eq!(trainer.current_phrase().cloned(), before);
        assert_eq!(trainer.history().collection().len(), 3);
        assert_eq!(trainer.status().tone, Tone::Bad);

        let err = trainer
            .load_file("/definitely/not/here.txt", &MinerConfig::new(2))
            .unwrap_err();
        assert_matches!(err, MineError::FileUnavailable { .. });
        assert_eq!(trainer.source(), &Source::Builtin);
    }

    #[test]
    fn stale_translation_is_dropped() {
        let mut trainer = seeded((0..10).map(|i| Phrase::mined(format!("x y {i}"), 2)).collect());
        trainer.next_phrase();
        let old = trainer.generation();
        trainer.next_phrase();

        let stale = TranslationReply {
            generation: old,
            text: Ok("too late".into()),
        };
        assert!(!trainer.apply_translation(stale));
        assert_ne!(trainer.info(), "too late");

        let fresh = TranslationReply {
            generation: trainer.generation(),
            text: Err("offline".into()),
        };
        assert!(trainer.apply_translation(fresh));
        assert_eq!(trainer.info(), "error: offline");
    }

    #[test]
    fn editing_the_answer() {
        let mut input = LineInput::prefilled("o z_");
        input.backspace();
        input.insert('i');
        input.home();
        input.delete();
        input.insert('O');
        input.end();
        input.left();
        input.right();
        input.right();

        assert_eq!(input.text(), "O zi");
        assert_eq!(input.cursor(), 4);
        assert!(!input.text().contains(PLACEHOLDER));
    }
}
