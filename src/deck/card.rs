use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fields shared by every card variant.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMeta {
    pub id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    // Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Japanese text with optional English and Vietnamese translations.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Translated {
    pub ja: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub en: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vi: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyCard {
    #[serde(flatten)]
    pub meta: CardMeta,
    pub word: String,
    pub reading: String,
    pub meaning: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_sentence: Option<Translated>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KanjiCard {
    #[serde(flatten)]
    pub meta: CardMeta,
    pub kanji: String,
    pub onyomi: Vec<String>,
    pub kunyomi: Vec<String>,
    pub meaning: String,
    pub strokes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radicals: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_words: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceCard {
    #[serde(flatten)]
    pub meta: CardMeta,
    pub sentence: Translated,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grammar_points: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// A study card, discriminated on the wire by its `type` field.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Card {
    Vocabulary(VocabularyCard),
    Kanji(KanjiCard),
    Sentence(SentenceCard),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CardKind {
    Vocabulary,
    Kanji,
    Sentence,
}

impl CardKind {
    pub fn label(self) -> &'static str {
        match self {
            CardKind::Vocabulary => "Vocabulary",
            CardKind::Kanji => "Kanji",
            CardKind::Sentence => "Sentence",
        }
    }
}

impl Card {
    /// Parse and validate one raw record from a card source.
    pub fn from_record(record: &Value) -> Result<Self, String> {
        let card: Card = serde_json::from_value(record.clone()).map_err(|e| e.to_string())?;
        card.validate()?;
        Ok(card)
    }

    /// Checks the invariants serde cannot express: identity and the text the
    /// card is drilled on must not be blank.
    pub fn validate(&self) -> Result<(), String> {
        if self.meta().id.trim().is_empty() {
            return Err("field `id` is blank".to_string());
        }
        let (field, value) = match self {
            Card::Vocabulary(v) => ("word", v.word.as_str()),
            Card::Kanji(k) => ("kanji", k.kanji.as_str()),
            Card::Sentence(s) => ("sentence.ja", s.sentence.ja.as_str()),
        };
        if value.trim().is_empty() {
            return Err(format!("field `{field}` is blank"));
        }
        Ok(())
    }

    pub fn meta(&self) -> &CardMeta {
        match self {
            Card::Vocabulary(v) => &v.meta,
            Card::Kanji(k) => &k.meta,
            Card::Sentence(s) => &s.meta,
        }
    }

    pub fn id(&self) -> &str {
        &self.meta().id
    }

    pub fn tags(&self) -> &[String] {
        &self.meta().tags
    }

    pub fn kind(&self) -> CardKind {
        match self {
            Card::Vocabulary(_) => CardKind::Vocabulary,
            Card::Kanji(_) => CardKind::Kanji,
            Card::Sentence(_) => CardKind::Sentence,
        }
    }

    /// The text shown on the front of the card.
    pub fn prompt(&self) -> &str {
        match self {
            Card::Vocabulary(v) => &v.word,
            Card::Kanji(k) => &k.kanji,
            Card::Sentence(s) => &s.sentence.ja,
        }
    }

    /// Expected typed answer, if this card has a typed recall step.
    pub fn recall_target(&self) -> Option<&str> {
        match self {
            Card::Vocabulary(v) => Some(&v.word),
            Card::Kanji(_) | Card::Sentence(_) => None,
        }
    }
}

/// Review scheduling metadata found alongside card data. Parsed so such
/// files load, but nothing schedules with it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardStudyStatus {
    pub card_id: String,
    pub last_reviewed: String,
    pub next_review: String,
    pub ease_factor: f64,
    pub correct_streak: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_vocabulary_with_example() {
        let record = json!({
            "id": "1",
            "type": "vocabulary",
            "tags": ["JLPT N5"],
            "createdAt": "2024-01-01T00:00:00Z",
            "word": "食べる",
            "reading": "たべる",
            "meaning": "to eat",
            "exampleSentence": { "ja": "ご飯を食べる。", "en": "I eat rice." }
        });
        let card = Card::from_record(&record).unwrap();
        assert_eq!(card.kind(), CardKind::Vocabulary);
        assert_eq!(card.id(), "1");
        assert_eq!(card.tags(), ["JLPT N5".to_string()]);
        assert_eq!(card.recall_target(), Some("食べる"));
        match card {
            Card::Vocabulary(v) => {
                let example = v.example_sentence.unwrap();
                assert_eq!(example.en.as_deref(), Some("I eat rice."));
                assert!(example.vi.is_none());
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_kanji_missing_strokes_is_rejected() {
        let record = json!({
            "id": "k1",
            "type": "kanji",
            "kanji": "食",
            "onyomi": ["ショク"],
            "kunyomi": ["た.べる"],
            "meaning": "eat"
        });
        let err = Card::from_record(&record).unwrap_err();
        assert!(err.contains("strokes"), "{err}");
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let record = json!({ "id": "x", "type": "grammar", "word": "は" });
        assert!(Card::from_record(&record).is_err());
    }

    #[test]
    fn test_blank_word_is_rejected() {
        let record = json!({
            "id": "2",
            "type": "vocabulary",
            "word": "   ",
            "reading": "",
            "meaning": ""
        });
        let err = Card::from_record(&record).unwrap_err();
        assert!(err.contains("word"));
    }

    #[test]
    fn test_sentence_has_no_recall_target() {
        let record = json!({
            "id": "s1",
            "type": "sentence",
            "sentence": { "ja": "これはペンです。", "vi": "Đây là cái bút." },
            "grammarPoints": ["これは ~ です"],
            "audioUrl": "https://example.com/a.mp3"
        });
        let card = Card::from_record(&record).unwrap();
        assert_eq!(card.recall_target(), None);
        assert_eq!(card.prompt(), "これはペンです。");
    }

    #[test]
    fn test_study_status_parses() {
        let status: FlashcardStudyStatus = serde_json::from_value(json!({
            "cardId": "1",
            "lastReviewed": "2024-01-01",
            "nextReview": "2024-01-03",
            "easeFactor": 2.5,
            "correctStreak": 3
        }))
        .unwrap();
        assert_eq!(status.correct_streak, 3);
    }
}
