use std::fs;

use serde_json::json;
use tempfile::TempDir;

use flashdeck::deck::library::DeckLibrary;
use flashdeck::deck::{CardKind, CardSource};
use flashdeck::session::{Command, Outcome, SessionController, SessionError, Step, Verdict};
use flashdeck::store::PositionStore;
use flashdeck::store::json_store::JsonPositionStore;

fn disk_session(dir: &TempDir) -> SessionController {
    let store = JsonPositionStore::with_base_dir(dir.path().to_path_buf()).unwrap();
    SessionController::new(Box::new(store))
}

#[test]
fn position_survives_restart() {
    let data = TempDir::new().unwrap();
    let library = DeckLibrary::new(data.path().join("decks"));
    let records = library.fetch("N5").unwrap();
    assert_eq!(records.len(), 8);

    {
        let mut session = disk_session(&data);
        let loaded = session.load_deck("N5", &records).unwrap();
        assert_eq!(loaded.index, 0);
        for _ in 0..3 {
            assert!(session.advance().unwrap().moved());
        }
    }

    let mut session = disk_session(&data);
    let loaded = session.load_deck("N5", &records).unwrap();
    assert_eq!(loaded.index, 3);
    assert_eq!(loaded.len, 8);
    assert!(loaded.warning.is_none());
}

#[test]
fn shrunk_deck_restores_to_last_card() {
    let data = TempDir::new().unwrap();
    let mut store = JsonPositionStore::with_base_dir(data.path().to_path_buf()).unwrap();
    store.set("mini", 6).unwrap();

    let records = vec![
        json!({"id": "a", "type": "vocabulary", "word": "犬", "reading": "いぬ", "meaning": "dog"}),
        json!({"id": "b", "type": "vocabulary", "word": "猫", "reading": "ねこ", "meaning": "cat"}),
    ];
    let mut session = disk_session(&data);
    assert_eq!(session.load_deck("mini", &records).unwrap().index, 1);
    assert_eq!(store.get("mini"), Some(1));
}

#[test]
fn user_deck_overrides_bundled_one() {
    let data = TempDir::new().unwrap();
    let deck_dir = data.path().join("decks");
    fs::create_dir_all(&deck_dir).unwrap();
    fs::write(
        deck_dir.join("N5.json"),
        r#"{"cards": [{"id": "x", "type": "sentence", "sentence": {"ja": "雨です。"}}]}"#,
    )
    .unwrap();

    let library = DeckLibrary::new(deck_dir);
    let records = library.fetch("N5").unwrap();
    let mut session = disk_session(&data);
    let loaded = session.load_deck("N5", &records).unwrap();
    assert_eq!(loaded.len, 1);
    assert_eq!(loaded.card.kind(), CardKind::Sentence);

    match session.apply(Command::Submit("anything".to_string())).unwrap() {
        Outcome::Submitted { verdict, advanced } => {
            assert_eq!(verdict, Verdict::Revealed);
            assert!(advanced.is_none());
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert!(session.recall().detail_visible);
}

#[test]
fn bundled_deck_walkthrough() {
    let data = TempDir::new().unwrap();
    let library = DeckLibrary::new(data.path().join("decks"));
    let records = library.fetch("N5").unwrap();
    let mut session = disk_session(&data);
    session.load_deck("N5", &records).unwrap();

    assert!(matches!(session.retreat().unwrap(), Step::AtFirstCard));

    // Two misses bring up the hint, then the right answer moves on.
    for _ in 0..2 {
        session.submit("taberu").unwrap();
    }
    assert!(session.recall().hint_visible);
    let (verdict, step) = session.submit(" 食べる ").unwrap();
    assert_eq!(verdict, Verdict::Correct);
    assert!(step.is_some_and(|s| s.moved()));
    assert_eq!(session.position(), Some((1, 8)));
    assert!(!session.recall().hint_visible);

    while session.advance().unwrap().moved() {}
    assert_eq!(session.position(), Some((7, 8)));
    assert!(matches!(session.advance().unwrap(), Step::AtLastCard));
}

#[test]
fn missing_deck_and_bad_records_are_reported() {
    let data = TempDir::new().unwrap();
    let library = DeckLibrary::new(data.path().join("decks"));
    assert!(library.fetch("N0").is_err());
    assert!(library.fetch("../N5").is_err());

    let mut session = disk_session(&data);
    let err = session
        .load_deck(
            "bad",
            &[json!({"id": "k1", "type": "kanji", "kanji": "木", "meaning": "tree"})],
        )
        .unwrap_err();
    assert!(matches!(err, SessionError::DeckLoad { index: 0, .. }));
    assert!(!session.is_active());
}
