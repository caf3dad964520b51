use std::collections::HashSet;
use std::fmt;

use serde_json::Value;

use crate::deck::{Card, Deck};
use crate::session::error::SessionError;
use crate::session::recall::{RecallState, Verdict};
use crate::store::PositionStore;

/// A position write that did not reach the store. The session keeps going;
/// the position just may not survive a restart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistWarning {
    pub source_key: String,
    pub index: usize,
    pub message: String,
}

impl fmt::Display for PersistWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not save position {} for {}: {}",
            self.index + 1,
            self.source_key,
            self.message
        )
    }
}

#[derive(Debug)]
pub struct Loaded<'a> {
    pub card: &'a Card,
    pub index: usize,
    pub len: usize,
    pub warning: Option<PersistWarning>,
}

/// Result of a navigation request. The boundary variants are notices, not
/// errors: nothing changed.
#[derive(Debug)]
pub enum Step<'a> {
    Moved {
        card: &'a Card,
        index: usize,
        warning: Option<PersistWarning>,
    },
    AtFirstCard,
    AtLastCard,
}

impl Step<'_> {
    pub fn moved(&self) -> bool {
        matches!(self, Step::Moved { .. })
    }
}

pub struct SessionController {
    deck: Option<Deck>,
    index: usize,
    recall: RecallState,
    store: Box<dyn PositionStore>,
    clear_input_on_mismatch: bool,
}

impl SessionController {
    pub fn new(store: Box<dyn PositionStore>) -> Self {
        Self {
            deck: None,
            index: 0,
            recall: RecallState::default(),
            store,
            clear_input_on_mismatch: true,
        }
    }

    pub fn with_clear_input_on_mismatch(mut self, clear: bool) -> Self {
        self.clear_input_on_mismatch = clear;
        self
    }

    /// Validate raw records from a card source and start studying them.
    ///
    /// Any invalid record rejects the whole deck and leaves the current one
    /// in place. An empty deck clears the session.
    pub fn load_deck(
        &mut self,
        source_key: &str,
        records: &[Value],
    ) -> Result<Loaded<'_>, SessionError> {
        let mut cards = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let card = Card::from_record(record).map_err(|reason| SessionError::DeckLoad {
                index,
                id: record_id(record),
                reason,
            })?;
            cards.push(card);
        }
        self.install(source_key, cards)
    }

    /// Same as [`load_deck`](Self::load_deck) for cards that are already typed.
    pub fn load_cards(
        &mut self,
        source_key: &str,
        cards: Vec<Card>,
    ) -> Result<Loaded<'_>, SessionError> {
        for (index, card) in cards.iter().enumerate() {
            card.validate().map_err(|reason| SessionError::DeckLoad {
                index,
                id: card.id().to_string(),
                reason,
            })?;
        }
        self.install(source_key, cards)
    }

    fn install(&mut self, source_key: &str, cards: Vec<Card>) -> Result<Loaded<'_>, SessionError> {
        {
            let mut seen = HashSet::new();
            for (index, card) in cards.iter().enumerate() {
                if !seen.insert(card.id()) {
                    return Err(SessionError::DeckLoad {
                        index,
                        id: card.id().to_string(),
                        reason: "duplicate id".to_string(),
                    });
                }
            }
        }

        if cards.is_empty() {
            self.deck = None;
            self.index = 0;
            self.recall.reset();
            tracing::info!(source_key, "loaded empty deck");
            return Err(SessionError::EmptyDeck {
                source_key: source_key.to_string(),
            });
        }

        let deck = Deck::new(source_key, cards);
        let stored = self.store.get(source_key);
        let index = deck.clamp_index(stored.unwrap_or(0));
        let len = deck.len();
        self.deck = Some(deck);

        // Only a shrunken deck forces a write on load.
        let clamped = stored.is_some_and(|s| s != index);
        let warning = self.enter_card(index, clamped);
        tracing::info!(source_key, len, index, ?stored, "loaded deck");

        let card = self.current_card()?;
        Ok(Loaded {
            card,
            index,
            len,
            warning,
        })
    }

    /// The one path by which the displayed card changes.
    fn enter_card(&mut self, index: usize, persist: bool) -> Option<PersistWarning> {
        self.index = index;
        self.recall.reset();
        if persist { self.persist() } else { None }
    }

    fn persist(&mut self) -> Option<PersistWarning> {
        let deck = self.deck.as_ref()?;
        match self.store.set(&deck.source_key, self.index) {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    source_key = %deck.source_key,
                    index = self.index,
                    error = %e,
                    "failed to persist position"
                );
                Some(PersistWarning {
                    source_key: deck.source_key.clone(),
                    index: self.index,
                    message: e.to_string(),
                })
            }
        }
    }

    fn active_deck(&self) -> Result<&Deck, SessionError> {
        self.deck.as_ref().ok_or(SessionError::NoActiveDeck)
    }

    pub fn current_card(&self) -> Result<&Card, SessionError> {
        self.active_deck()?
            .get(self.index)
            .ok_or(SessionError::NoActiveDeck)
    }

    pub fn advance(&mut self) -> Result<Step<'_>, SessionError> {
        let len = self.active_deck()?.len();
        if self.index + 1 >= len {
            tracing::debug!(index = self.index, "advance at last card");
            return Ok(Step::AtLastCard);
        }
        let warning = self.enter_card(self.index + 1, true);
        tracing::debug!(index = self.index, "advanced");
        Ok(Step::Moved {
            card: self.current_card()?,
            index: self.index,
            warning,
        })
    }

    pub fn retreat(&mut self) -> Result<Step<'_>, SessionError> {
        self.active_deck()?;
        if self.index == 0 {
            tracing::debug!("retreat at first card");
            return Ok(Step::AtFirstCard);
        }
        let warning = self.enter_card(self.index - 1, true);
        tracing::debug!(index = self.index, "retreated");
        Ok(Step::Moved {
            card: self.current_card()?,
            index: self.index,
            warning,
        })
    }

    /// Returns the new detail visibility.
    pub fn toggle_detail(&mut self) -> Result<bool, SessionError> {
        self.active_deck()?;
        Ok(self.recall.toggle_detail())
    }

    /// Check a typed answer against the current card. A correct answer is
    /// followed by [`advance`](Self::advance), whose result is returned with
    /// the verdict.
    pub fn submit(&mut self, raw: &str) -> Result<(Verdict, Option<Step<'_>>), SessionError> {
        let card = self.current_card()?.clone();
        let verdict = self
            .recall
            .submit(&card, raw, self.clear_input_on_mismatch);
        tracing::debug!(card = card.id(), ?verdict, "submitted answer");
        if verdict == Verdict::Correct {
            let step = self.advance()?;
            return Ok((verdict, Some(step)));
        }
        Ok((verdict, None))
    }

    pub fn reveal_hint(&mut self) -> Result<(), SessionError> {
        self.active_deck()?;
        self.recall.reveal_hint();
        Ok(())
    }

    /// Mirror of the answer line being typed; not part of any transition.
    pub fn set_input(&mut self, text: &str) {
        self.recall.input_buffer = text.to_string();
    }

    pub fn recall(&self) -> &RecallState {
        &self.recall
    }

    pub fn source_key(&self) -> Option<&str> {
        self.deck.as_ref().map(|d| d.source_key.as_str())
    }

    /// `(index, len)` of the active deck.
    pub fn position(&self) -> Option<(usize, usize)> {
        self.deck.as_ref().map(|d| (self.index, d.len()))
    }

    pub fn is_active(&self) -> bool {
        self.deck.is_some()
    }

    /// Drop the active deck without touching stored positions.
    pub fn close(&mut self) {
        self.deck = None;
        self.index = 0;
        self.recall.reset();
    }
}

fn record_id(record: &Value) -> String {
    match record.get("id") {
        Some(Value::String(id)) => id.clone(),
        Some(other) => other.to_string(),
        None => "?".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryPositionStore;
    use serde_json::json;

    fn vocab(id: &str, word: &str) -> Value {
        json!({
            "id": id,
            "type": "vocabulary",
            "word": word,
            "reading": "よみ",
            "meaning": "meaning"
        })
    }

    fn deck(n: usize) -> Vec<Value> {
        (0..n)
            .map(|i| vocab(&i.to_string(), &format!("word{i}")))
            .collect()
    }

    fn controller(store: &MemoryPositionStore) -> SessionController {
        SessionController::new(Box::new(store.clone()))
    }

    #[test]
    fn test_load_defaults_to_first_card() {
        let store = MemoryPositionStore::new();
        let mut session = controller(&store);
        let loaded = session.load_deck("N5", &deck(3)).unwrap();
        assert_eq!(loaded.index, 0);
        assert_eq!(loaded.len, 3);
        assert_eq!(loaded.card.id(), "0");
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_load_restores_saved_position() {
        let store = MemoryPositionStore::new().with_position("N5", 2);
        let mut session = controller(&store);
        let loaded = session.load_deck("N5", &deck(4)).unwrap();
        assert_eq!(loaded.index, 2);
        assert_eq!(session.position(), Some((2, 4)));
    }

    #[test]
    fn test_load_clamps_when_deck_shrank() {
        let store = MemoryPositionStore::new().with_position("N5", 10);
        let mut session = controller(&store);
        let loaded = session.load_deck("N5", &deck(4)).unwrap();
        assert_eq!(loaded.index, 3);
        assert_eq!(store.peek("N5"), Some(3));
    }

    #[test]
    fn test_empty_deck_clears_session() {
        let store = MemoryPositionStore::new();
        let mut session = controller(&store);
        session.load_deck("N5", &deck(2)).unwrap();

        let err = session.load_deck("N4", &[]).unwrap_err();
        assert_eq!(
            err,
            SessionError::EmptyDeck {
                source_key: "N4".to_string()
            }
        );
        assert_eq!(session.current_card().unwrap_err(), SessionError::NoActiveDeck);
        assert!(session.advance().is_err());
    }

    #[test]
    fn test_invalid_record_keeps_previous_deck() {
        let store = MemoryPositionStore::new();
        let mut session = controller(&store);
        session.load_deck("N5", &deck(3)).unwrap();
        session.advance().unwrap();

        let bad = vec![
            vocab("a", "水"),
            json!({
                "id": "k1",
                "type": "kanji",
                "kanji": "食",
                "onyomi": [],
                "kunyomi": [],
                "meaning": "eat"
            }),
        ];
        let err = session.load_deck("N4", &bad).unwrap_err();
        match err {
            SessionError::DeckLoad { index, id, reason } => {
                assert_eq!(index, 1);
                assert_eq!(id, "k1");
                assert!(reason.contains("strokes"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(session.source_key(), Some("N5"));
        assert_eq!(session.current_card().unwrap().id(), "1");
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let store = MemoryPositionStore::new();
        let mut session = controller(&store);
        let err = session
            .load_deck("N5", &[vocab("1", "a"), vocab("1", "b")])
            .unwrap_err();
        assert!(matches!(err, SessionError::DeckLoad { index: 1, .. }));
        assert!(!session.is_active());
    }

    #[test]
    fn test_navigation_before_load_fails() {
        let store = MemoryPositionStore::new();
        let mut session = controller(&store);
        assert_eq!(session.current_card().unwrap_err(), SessionError::NoActiveDeck);
        assert_eq!(session.advance().unwrap_err(), SessionError::NoActiveDeck);
        assert_eq!(session.retreat().unwrap_err(), SessionError::NoActiveDeck);
        assert_eq!(session.toggle_detail().unwrap_err(), SessionError::NoActiveDeck);
        assert_eq!(session.submit("x").unwrap_err(), SessionError::NoActiveDeck);
        assert_eq!(session.reveal_hint().unwrap_err(), SessionError::NoActiveDeck);
    }

    #[test]
    fn test_advance_reaches_last_card_from_any_start() {
        for len in 1..5 {
            for start in 0..len {
                let store = MemoryPositionStore::new().with_position("N5", start);
                let mut session = controller(&store);
                session.load_deck("N5", &deck(len)).unwrap();
                for _ in 0..(len - 1 - start) {
                    assert!(session.advance().unwrap().moved());
                }
                assert_eq!(session.position(), Some((len - 1, len)));
                let writes = store.writes().len();
                assert!(matches!(session.advance().unwrap(), Step::AtLastCard));
                assert!(matches!(session.advance().unwrap(), Step::AtLastCard));
                assert_eq!(session.position(), Some((len - 1, len)));
                assert_eq!(store.writes().len(), writes);
            }
        }
    }

    #[test]
    fn test_retreat_reaches_first_card_from_any_start() {
        for len in 1..5 {
            for start in 0..len {
                let store = MemoryPositionStore::new().with_position("N5", start);
                let mut session = controller(&store);
                session.load_deck("N5", &deck(len)).unwrap();
                for _ in 0..start {
                    assert!(session.retreat().unwrap().moved());
                }
                assert_eq!(session.position(), Some((0, len)));
                assert!(matches!(session.retreat().unwrap(), Step::AtFirstCard));
                assert_eq!(session.position(), Some((0, len)));
            }
        }
    }

    #[test]
    fn test_every_move_is_persisted() {
        let store = MemoryPositionStore::new();
        let mut session = controller(&store);
        session.load_deck("N5", &deck(3)).unwrap();
        session.advance().unwrap();
        session.advance().unwrap();
        session.retreat().unwrap();
        assert_eq!(
            store.writes(),
            vec![
                ("N5".to_string(), 1),
                ("N5".to_string(), 2),
                ("N5".to_string(), 1)
            ]
        );
    }

    #[test]
    fn test_failed_write_does_not_roll_back() {
        let store = MemoryPositionStore::new();
        let mut session = controller(&store);
        session.load_deck("N5", &deck(3)).unwrap();
        store.fail_writes(true);

        match session.advance().unwrap() {
            Step::Moved { index, warning, .. } => {
                assert_eq!(index, 1);
                let warning = warning.unwrap();
                assert_eq!(warning.source_key, "N5");
                assert_eq!(warning.index, 1);
            }
            other => panic!("unexpected step: {other:?}"),
        }
        assert_eq!(session.position(), Some((1, 3)));
        assert_eq!(store.peek("N5"), None);
    }

    #[test]
    fn test_card_change_resets_recall() {
        let store = MemoryPositionStore::new();
        let mut session = controller(&store);
        session.load_deck("N5", &deck(3)).unwrap();
        session.submit("nope").unwrap();
        session.submit("nope").unwrap();
        session.toggle_detail().unwrap();
        assert!(session.recall().hint_visible);

        session.advance().unwrap();
        assert_eq!(*session.recall(), RecallState::default());

        session.reveal_hint().unwrap();
        session.retreat().unwrap();
        assert_eq!(*session.recall(), RecallState::default());

        session.reveal_hint().unwrap();
        session.load_deck("N5", &deck(3)).unwrap();
        assert_eq!(*session.recall(), RecallState::default());
    }

    #[test]
    fn test_correct_answer_advances() {
        let store = MemoryPositionStore::new();
        let mut session = controller(&store);
        session.load_deck("N5", &deck(2)).unwrap();
        let (verdict, step) = session.submit("WORD0").unwrap();
        assert_eq!(verdict, Verdict::Correct);
        assert!(step.unwrap().moved());
        assert_eq!(session.current_card().unwrap().id(), "1");
        assert!(!session.recall().detail_visible);
    }

    #[test]
    fn test_single_card_scenario() {
        let store = MemoryPositionStore::new();
        let mut session = controller(&store);
        let records = vec![json!({
            "id": "1",
            "type": "vocabulary",
            "word": "食べる",
            "reading": "たべる",
            "meaning": "to eat"
        })];
        let loaded = session.load_deck("N5", &records).unwrap();
        assert_eq!(loaded.index, 0);

        let (verdict, _) = session.submit("tabemasu").unwrap();
        assert_eq!(
            verdict,
            Verdict::Incorrect {
                wrong_count: 1,
                hint_visible: false
            }
        );
        let (verdict, _) = session.submit("tabemasu").unwrap();
        assert_eq!(
            verdict,
            Verdict::Incorrect {
                wrong_count: 2,
                hint_visible: true
            }
        );

        let (verdict, step) = session.submit(" 食べる ").unwrap();
        assert_eq!(verdict, Verdict::Correct);
        assert!(matches!(step, Some(Step::AtLastCard)));
        let recall = session.recall();
        assert!(recall.detail_visible);
        assert_eq!(recall.wrong_count, 0);
        assert!(!recall.hint_visible);
        assert!(store.writes().is_empty());
    }

    #[test]
    fn test_load_cards_validates_typed_cards() {
        let store = MemoryPositionStore::new();
        let mut session = controller(&store);
        let cards: Vec<Card> = deck(2)
            .iter()
            .map(|r| Card::from_record(r).unwrap())
            .collect();
        assert_eq!(session.load_cards("N5", cards).unwrap().len, 2);

        let mut blank = Card::from_record(&vocab("b", "x")).unwrap();
        if let Card::Vocabulary(v) = &mut blank {
            v.word = " ".to_string();
        }
        assert!(matches!(
            session.load_cards("N4", vec![blank]),
            Err(SessionError::DeckLoad { .. })
        ));
        assert_eq!(session.source_key(), Some("N5"));
    }
}
