use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use flashdeck::session::Command;

/// What a key press on the study screen means.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StudyKey {
    Command(Command),
    /// Goes to the answer line editor.
    Edit,
    Back,
}

/// Translate one key press into at most one session command.
///
/// Arrow keys navigate only while the answer line is empty; once something
/// is typed they move the cursor instead.
pub fn study_key(key: &KeyEvent, buffer: &str) -> StudyKey {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let empty = buffer.is_empty();
    match key.code {
        KeyCode::Esc => StudyKey::Back,
        KeyCode::Enter => StudyKey::Command(Command::Submit(buffer.to_string())),
        KeyCode::Tab => StudyKey::Command(Command::ToggleDetail),
        KeyCode::PageDown => StudyKey::Command(Command::Advance),
        KeyCode::PageUp => StudyKey::Command(Command::Retreat),
        KeyCode::Char('n') if ctrl => StudyKey::Command(Command::Advance),
        KeyCode::Char('p') if ctrl => StudyKey::Command(Command::Retreat),
        KeyCode::Char('r') if ctrl => StudyKey::Command(Command::RevealHint),
        KeyCode::Right if empty => StudyKey::Command(Command::Advance),
        KeyCode::Left if empty => StudyKey::Command(Command::Retreat),
        KeyCode::Char('?') if empty => StudyKey::Command(Command::RevealHint),
        _ => StudyKey::Edit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_arrows_navigate_on_empty_line() {
        assert_eq!(
            study_key(&key(KeyCode::Right), ""),
            StudyKey::Command(Command::Advance)
        );
        assert_eq!(
            study_key(&key(KeyCode::Left), ""),
            StudyKey::Command(Command::Retreat)
        );
    }

    #[test]
    fn test_arrows_edit_when_typing() {
        assert_eq!(study_key(&key(KeyCode::Right), "ta"), StudyKey::Edit);
        assert_eq!(study_key(&key(KeyCode::Left), "ta"), StudyKey::Edit);
        assert_eq!(
            study_key(&ctrl('n'), "ta"),
            StudyKey::Command(Command::Advance)
        );
    }

    #[test]
    fn test_enter_submits_buffer() {
        assert_eq!(
            study_key(&key(KeyCode::Enter), "たべる"),
            StudyKey::Command(Command::Submit("たべる".to_string()))
        );
    }

    #[test]
    fn test_question_mark_reveals_only_on_empty_line() {
        assert_eq!(
            study_key(&key(KeyCode::Char('?')), ""),
            StudyKey::Command(Command::RevealHint)
        );
        assert_eq!(study_key(&key(KeyCode::Char('?')), "x"), StudyKey::Edit);
        assert_eq!(
            study_key(&ctrl('r'), "x"),
            StudyKey::Command(Command::RevealHint)
        );
    }

    #[test]
    fn test_tab_and_escape() {
        assert_eq!(
            study_key(&key(KeyCode::Tab), "abc"),
            StudyKey::Command(Command::ToggleDetail)
        );
        assert_eq!(study_key(&key(KeyCode::Esc), ""), StudyKey::Back);
    }
}
