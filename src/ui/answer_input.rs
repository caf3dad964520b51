use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

/// Single-line answer editor. Works on char indices so kana and kanji move
/// the cursor one glyph at a time.
#[derive(Clone, Debug, Default)]
pub struct AnswerLine {
    text: String,
    cursor: usize,
}

impl AnswerLine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.chars().count(),
        }
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Returns (before_cursor, cursor_char, after_cursor) for styled rendering.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let byte_offset = self.char_to_byte(self.cursor);
        match self.text[byte_offset..].chars().next() {
            Some(ch) => {
                let next_byte = byte_offset + ch.len_utf8();
                (&self.text[..byte_offset], Some(ch), &self.text[next_byte..])
            }
            None => (&self.text, None, ""),
        }
    }

    /// Apply an editing key. Returns false when the key is not an edit.
    pub fn edit(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.len(),
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.remove_at(self.cursor - 1);
                    self.cursor -= 1;
                }
            }
            KeyCode::Delete => {
                if self.cursor < self.len() {
                    self.remove_at(self.cursor);
                }
            }
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.len(),
            KeyCode::Char('u') if ctrl => self.clear(),
            KeyCode::Char('w') if ctrl => self.delete_word_back(),
            KeyCode::Char(ch) if !ctrl => {
                let byte_offset = self.char_to_byte(self.cursor);
                self.text.insert(byte_offset, ch);
                self.cursor += 1;
            }
            _ => return false,
        }
        true
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    fn remove_at(&mut self, char_idx: usize) {
        let start = self.char_to_byte(char_idx);
        let end = self.char_to_byte(char_idx + 1);
        self.text.replace_range(start..end, "");
    }

    /// unix-word-rubout: skip whitespace, then non-whitespace.
    fn delete_word_back(&mut self) {
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor;
        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        let start_byte = self.char_to_byte(pos);
        let end_byte = self.char_to_byte(self.cursor);
        self.text.replace_range(start_byte..end_byte, "");
        self.cursor = pos;
    }
}

pub struct AnswerInput<'a> {
    line: &'a AnswerLine,
    enabled: bool,
    theme: &'a Theme,
}

impl<'a> AnswerInput<'a> {
    pub fn new(line: &'a AnswerLine, enabled: bool, theme: &'a Theme) -> Self {
        Self {
            line,
            enabled,
            theme,
        }
    }
}

impl Widget for AnswerInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let border = if self.enabled {
            colors.border_focused()
        } else {
            colors.border()
        };
        let block = Block::bordered()
            .title(" Answer ")
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(colors.bg()));

        let line = if self.enabled {
            let (before, cursor, after) = self.line.render_parts();
            let cursor_style = Style::default()
                .fg(colors.input_cursor_fg())
                .bg(colors.input_cursor_bg());
            Line::from(vec![
                Span::styled(before.to_string(), Style::default().fg(colors.fg())),
                Span::styled(cursor.unwrap_or(' ').to_string(), cursor_style),
                Span::styled(after.to_string(), Style::default().fg(colors.fg())),
            ])
        } else {
            Line::from(Span::styled(
                "Press Enter to reveal",
                Style::default().fg(colors.muted()),
            ))
        };

        Paragraph::new(line).block(block).render(area, buf);
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
    fn test_typing_multibyte_and_backspace() {
        let mut line = AnswerLine::default();
        for ch in "たべる".chars() {
            assert!(line.edit(key(KeyCode::Char(ch))));
        }
        assert_eq!(line.value(), "たべる");
        line.edit(key(KeyCode::Backspace));
        assert_eq!(line.value(), "たべ");
    }

    #[test]
    fn test_cursor_editing_in_middle() {
        let mut line = AnswerLine::new("tbe");
        line.edit(key(KeyCode::Home));
        line.edit(key(KeyCode::Right));
        line.edit(key(KeyCode::Char('a')));
        assert_eq!(line.value(), "tabe");
        let (before, cursor, after) = line.render_parts();
        assert_eq!(before, "ta");
        assert_eq!(cursor, Some('b'));
        assert_eq!(after, "e");
        line.edit(key(KeyCode::Delete));
        assert_eq!(line.value(), "tae");
    }

    #[test]
    fn test_control_shortcuts() {
        let mut line = AnswerLine::new("to eat");
        line.edit(ctrl('w'));
        assert_eq!(line.value(), "to ");
        line.edit(ctrl('a'));
        assert_eq!(line.render_parts().1, Some('t'));
        line.edit(ctrl('u'));
        assert!(line.is_empty());
    }

    #[test]
    fn test_non_edit_keys_are_refused() {
        let mut line = AnswerLine::new("x");
        assert!(!line.edit(key(KeyCode::Enter)));
        assert!(!line.edit(key(KeyCode::Tab)));
        assert!(!line.edit(ctrl('n')));
        assert_eq!(line.value(), "x");
    }

    #[test]
    fn test_render_parts_at_end() {
        let line = AnswerLine::new("abc");
        assert_eq!(line.render_parts(), ("abc", None, ""));
    }
}
