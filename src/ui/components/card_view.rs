use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget, Wrap};

use flashdeck::deck::Card;
use flashdeck::deck::card::Translated;
use flashdeck::session::{RecallStage, RecallState};

use crate::ui::theme::Theme;

/// Label/value rows for the escalating hint.
pub fn hint_fields(card: &Card) -> Vec<(&'static str, String)> {
    match card {
        Card::Vocabulary(v) => vec![
            ("Reading", v.reading.clone()),
            ("Meaning", v.meaning.clone()),
        ],
        Card::Kanji(k) => vec![("Meaning", k.meaning.clone())],
        Card::Sentence(s) => match &s.grammar_points {
            Some(points) if !points.is_empty() => vec![("Grammar", points.join(", "))],
            _ => Vec::new(),
        },
    }
}

/// Label/value rows for the back of the card.
pub fn detail_fields(card: &Card) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();
    match card {
        Card::Vocabulary(v) => {
            rows.push(("Reading", v.reading.clone()));
            rows.push(("Meaning", v.meaning.clone()));
            if let Some(example) = &v.example_sentence {
                push_translated(&mut rows, "Example", example);
            }
        }
        Card::Kanji(k) => {
            rows.push(("Onyomi", k.onyomi.join(", ")));
            rows.push(("Kunyomi", k.kunyomi.join(", ")));
            rows.push(("Meaning", k.meaning.clone()));
            rows.push(("Strokes", k.strokes.to_string()));
            if let Some(radicals) = &k.radicals {
                rows.push(("Radicals", radicals.join(", ")));
            }
            if let Some(words) = &k.example_words {
                rows.push(("Examples", words.join(", ")));
            }
        }
        Card::Sentence(s) => {
            push_translated(&mut rows, "Japanese", &s.sentence);
            if let Some(points) = &s.grammar_points {
                rows.push(("Grammar", points.join(", ")));
            }
            if let Some(url) = &s.audio_url {
                rows.push(("Audio", url.clone()));
            }
        }
    }
    rows
}

fn push_translated(rows: &mut Vec<(&'static str, String)>, label: &'static str, text: &Translated) {
    rows.push((label, text.ja.clone()));
    if let Some(en) = &text.en {
        rows.push(("English", en.clone()));
    }
    if let Some(vi) = &text.vi {
        rows.push(("Vietnamese", vi.clone()));
    }
}

pub struct CardView<'a> {
    card: &'a Card,
    recall: &'a RecallState,
    theme: &'a Theme,
}

impl<'a> CardView<'a> {
    pub fn new(card: &'a Card, recall: &'a RecallState, theme: &'a Theme) -> Self {
        Self {
            card,
            recall,
            theme,
        }
    }
}

impl Widget for CardView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(format!(" {} ", self.card.kind().label()))
            .border_style(Style::default().fg(if self.recall.detail_visible {
                colors.success()
            } else {
                colors.border()
            }))
            .style(Style::default().bg(colors.bg()));

        let mut lines: Vec<Line> = Vec::new();

        if !self.card.tags().is_empty() {
            let tag_style = Style::default().fg(colors.tag_fg()).bg(colors.tag_bg());
            let mut spans = Vec::new();
            for tag in self.card.tags() {
                spans.push(Span::styled(format!(" {tag} "), tag_style));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(""));
        lines.push(
            Line::from(Span::styled(
                self.card.prompt().to_string(),
                Style::default()
                    .fg(colors.prompt())
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
        );
        lines.push(Line::from(""));

        let stage = self.recall.stage();
        let (rows, value_color) = match stage {
            RecallStage::Answered => (detail_fields(self.card), colors.fg()),
            RecallStage::HintShown => (hint_fields(self.card), colors.hint()),
            RecallStage::Hidden => (Vec::new(), colors.fg()),
        };
        for (label, value) in rows {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {label}: "),
                    Style::default()
                        .fg(colors.accent())
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(value, Style::default().fg(value_color)),
            ]));
        }

        if self.recall.wrong_count > 0 && stage != RecallStage::Answered {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  Wrong attempts: {}", self.recall.wrong_count),
                Style::default().fg(colors.error()),
            )));
        }

        Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .render(area, buf);
    }
}
