use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Position within the deck, drawn as a bar with "current / total" centered.
pub struct DeckProgress<'a> {
    index: usize,
    len: usize,
    theme: &'a Theme,
}

impl<'a> DeckProgress<'a> {
    pub fn new(index: usize, len: usize, theme: &'a Theme) -> Self {
        Self { index, len, theme }
    }

    pub fn ratio(&self) -> f64 {
        if self.len == 0 {
            return 0.0;
        }
        ((self.index + 1) as f64 / self.len as f64).clamp(0.0, 1.0)
    }
}

impl Widget for DeckProgress<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Progress ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio() * inner.width as f64) as u16;
        let label = format!("{} / {}", self.index + 1, self.len);

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}
