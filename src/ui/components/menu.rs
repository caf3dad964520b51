use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Study(String),
    ResetProgress,
    Quit,
}

pub struct MenuItem {
    pub key: String,
    pub label: String,
    pub description: String,
    pub action: MenuAction,
}

pub struct Menu<'a> {
    pub items: Vec<MenuItem>,
    pub selected: usize,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    /// One entry per level, numbered from 1, then the housekeeping entries.
    pub fn new(levels: &[String], theme: &'a Theme) -> Self {
        let mut items: Vec<MenuItem> = levels
            .iter()
            .enumerate()
            .map(|(i, level)| MenuItem {
                key: if i < 9 {
                    (i + 1).to_string()
                } else {
                    String::new()
                },
                label: format!("Flashcard {level}"),
                description: format!("Study the {level} deck from where you left off"),
                action: MenuAction::Study(level.clone()),
            })
            .collect();
        items.push(MenuItem {
            key: "r".to_string(),
            label: "Reset progress".to_string(),
            description: "Forget the saved position of every deck".to_string(),
            action: MenuAction::ResetProgress,
        });
        items.push(MenuItem {
            key: "q".to_string(),
            label: "Quit".to_string(),
            description: String::new(),
            action: MenuAction::Quit,
        });
        Self {
            items,
            selected: 0,
            theme,
        }
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = self.items.len() - 1;
        }
    }

    pub fn selected_action(&self) -> Option<MenuAction> {
        self.items.get(self.selected).map(|i| i.action.clone())
    }

    /// Action bound to a shortcut key, also moving the selection onto it.
    pub fn shortcut(&mut self, key: char) -> Option<MenuAction> {
        let key = key.to_string();
        let idx = self.items.iter().position(|i| i.key == key)?;
        self.selected = idx;
        self.selected_action()
    }

    /// Put the selection on a level's entry, if there is one.
    pub fn select_level(&mut self, level: &str) {
        if let Some(idx) = self
            .items
            .iter()
            .position(|i| i.action == MenuAction::Study(level.to_string()))
        {
            self.selected = idx;
        }
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "flashdeck",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Choose Flashcard Level",
                Style::default().fg(colors.fg()),
            )),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let menu_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints(
                self.items
                    .iter()
                    .map(|_| Constraint::Length(2))
                    .collect::<Vec<_>>(),
            )
            .split(layout[1]);

        for (i, item) in self.items.iter().enumerate() {
            let is_selected = i == self.selected;
            let indicator = if is_selected { ">" } else { " " };
            let key = if item.key.is_empty() {
                "   ".to_string()
            } else {
                format!("[{}]", item.key)
            };

            let label_style = Style::default()
                .fg(if is_selected {
                    colors.accent()
                } else {
                    colors.fg()
                })
                .add_modifier(if is_selected {
                    Modifier::BOLD
                } else {
                    Modifier::empty()
                });
            let lines = vec![
                Line::from(Span::styled(
                    format!(" {indicator} {key} {}", item.label),
                    label_style,
                )),
                Line::from(Span::styled(
                    format!("       {}", item.description),
                    Style::default().fg(colors.muted()),
                )),
            ];

            if i < menu_layout.len() {
                Paragraph::new(lines).render(menu_layout[i], buf);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels() -> Vec<String> {
        vec!["N5".to_string(), "N4".to_string()]
    }

    #[test]
    fn test_items_follow_levels() {
        let theme = Theme::default();
        let menu = Menu::new(&levels(), &theme);
        assert_eq!(menu.items.len(), 4);
        assert_eq!(menu.items[0].key, "1");
        assert_eq!(menu.items[1].action, MenuAction::Study("N4".to_string()));
        assert_eq!(menu.items[3].action, MenuAction::Quit);
    }

    #[test]
    fn test_navigation_wraps() {
        let theme = Theme::default();
        let mut menu = Menu::new(&levels(), &theme);
        menu.prev();
        assert_eq!(menu.selected, 3);
        menu.next();
        assert_eq!(menu.selected, 0);
    }

    #[test]
    fn test_shortcut_and_select_level() {
        let theme = Theme::default();
        let mut menu = Menu::new(&levels(), &theme);
        assert_eq!(menu.shortcut('r'), Some(MenuAction::ResetProgress));
        assert_eq!(menu.selected, 2);
        assert_eq!(menu.shortcut('x'), None);
        menu.select_level("N4");
        assert_eq!(menu.selected, 1);
    }
}
