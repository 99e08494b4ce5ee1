use rand::Rng;

use crate::phrase::{default_phrases, Phrase, PhraseCollection};

/// Phrases shown so far plus a cursor, so that going back and forward again
/// replays what was already drawn instead of picking new phrases.
#[derive(Debug, Clone)]
pub struct SessionHistory {
    collection: PhraseCollection,
    // indices into `collection`; cleared whenever the collection changes
    visited: Vec<usize>,
    cursor: Option<usize>,
}

impl SessionHistory {
    pub fn new(collection: PhraseCollection) -> Self {
        Self {
            collection,
            visited: Vec::new(),
            cursor: None,
        }
    }

    pub fn advance(&mut self) -> Option<&Phrase> {
        self.advance_with(&mut rand::thread_rng())
    }

    /// Step forward, drawing a fresh phrase only past the end of the history
    pub fn advance_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&Phrase> {
        if self.collection.is_empty() {
            return None;
        }

        let next = self.cursor.map_or(0, |c| c + 1);
        if next >= self.visited.len() {
            let drawn = rng.gen_range(0..self.collection.len());
            self.visited.push(drawn);
        }
        self.cursor = Some(next);
        self.current()
    }

    pub fn retreat(&mut self) -> Option<&Phrase> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                self.current()
            }
            _ => None,
        }
    }

    /// Swap in a new collection and forget everything shown so far
    pub fn reset(&mut self, collection: PhraseCollection) {
        self.collection = collection;
        self.visited.clear();
        self.cursor = None;
    }

    pub fn current(&self) -> Option<&Phrase> {
        self.cursor
            .and_then(|c| self.visited.get(c))
            .and_then(|&i| self.collection.get(i))
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn can_retreat(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    /// Number of phrases recorded in the history
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    pub fn collection(&self) -> &[Phrase] {
        &self.collection
    }
}

impl Default for SessionHistory {
    fn default() -> Self {
        Self::new(default_phrases())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn numbered(n: usize) -> PhraseCollection {
        (0..n)
            .map(|i| Phrase::with_gloss(format!("fraza {i}"), format!("#{i}")))
            .collect()
    }

    #[test]
    fn starts_empty_on_the_builtin_list() {
        let history = SessionHistory::default();

        assert_eq!(history.cursor(), None);
        assert!(history.is_empty());
        assert!(history.current().is_none());
        assert_eq!(history.collection().len(), 3);
    }

    #[test]
    fn advance_retreat_advance_replays() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut history = SessionHistory::new(numbered(50));

        let first = history.advance_with(&mut rng).cloned().unwrap();
        let second = history.advance_with(&mut rng).cloned().unwrap();
        assert_eq!(history.retreat(), Some(&first));
        assert_eq!(history.advance_with(&mut rng), Some(&second));
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn retreat_then_advance_from_first_entry() {
        let mut history = SessionHistory::new(numbered(20));

        let first = history.advance().cloned().unwrap();
        assert!(history.retreat().is_none());
        assert_eq!(history.current(), Some(&first));
        assert_eq!(history.cursor(), Some(0));
    }

    #[test]
    fn retreat_on_empty_history_is_noop() {
        let mut history = SessionHistory::new(numbered(3));

        assert!(history.retreat().is_none());
        assert_eq!(history.cursor(), None);
        assert!(!history.can_retreat());
    }

    #[test]
    fn advance_on_empty_collection_is_noop() {
        let mut history = SessionHistory::new(Vec::new());

        assert!(history.advance().is_none());
        assert_eq!(history.cursor(), None);
        assert!(history.is_empty());
    }

    #[test]
    fn cursor_stays_within_history() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut history = SessionHistory::new(numbered(4));
        history.advance_with(&mut rng);

        for step in 0..40 {
            if step % 3 == 0 {
                history.retreat();
            } else {
                history.advance_with(&mut rng);
            }
            let cursor = history.cursor().unwrap();
            assert!(cursor < history.len());
            assert!(history.current().is_some());
        }
    }

    #[test]
    fn reset_swaps_collection_and_clears() {
        let mut history = SessionHistory::new(numbered(5));
        history.advance();
        history.advance();

        let replacement = vec![Phrase::mined("ce mai faci", 3)];
        history.reset(replacement.clone());

        assert_eq!(history.cursor(), None);
        assert!(history.is_empty());
        assert_eq!(history.collection(), replacement.as_slice());
        assert_eq!(history.advance(), Some(&replacement[0]));
    }

    #[test]
    fn can_retreat_after_two_draws() {
        let mut history = SessionHistory::new(numbered(5));
        history.advance();
        assert!(!history.can_retreat());
        history.advance();
        assert!(history.can_retreat());
    }
}
