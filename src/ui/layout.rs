use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Regions of the study screen, top to bottom.
pub struct StudyLayout {
    pub header: Rect,
    pub progress: Option<Rect>,
    pub card: Rect,
    pub input: Rect,
    pub status: Rect,
    pub footer: Rect,
}

impl StudyLayout {
    pub fn new(area: Rect, footer_lines: u16) -> Self {
        // Short terminals lose the progress bar first.
        let show_progress = area.height >= 20;

        let mut constraints = vec![Constraint::Length(1)];
        if show_progress {
            constraints.push(Constraint::Length(3));
        }
        constraints.extend([
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(footer_lines.max(1)),
        ]);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        if show_progress {
            Self {
                header: chunks[0],
                progress: Some(chunks[1]),
                card: chunks[2],
                input: chunks[3],
                status: chunks[4],
                footer: chunks[5],
            }
        } else {
            Self {
                header: chunks[0],
                progress: None,
                card: chunks[1],
                input: chunks[2],
                status: chunks[3],
                footer: chunks[4],
            }
        }
    }
}

/// Greedily pack key hints into as few lines as fit `width`.
pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = "  ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints {
        if hint.is_empty() {
            continue;
        }
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width {
            current = candidate;
            has_hint = true;
        } else {
            if has_hint {
                out.push(current);
            }
            current = format!("{prefix}{hint}");
            has_hint = true;
        }
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    const MIN_POPUP_WIDTH: u16 = 48;
    const MIN_POPUP_HEIGHT: u16 = 14;

    let requested_w = area.width.saturating_mul(percent_x.min(100)) / 100;
    let requested_h = area.height.saturating_mul(percent_y.min(100)) / 100;

    let target_w = requested_w.max(MIN_POPUP_WIDTH).min(area.width);
    let target_h = requested_h.max(MIN_POPUP_HEIGHT).min(area.height);

    let left = area
        .x
        .saturating_add((area.width.saturating_sub(target_w)) / 2);
    let top = area
        .y
        .saturating_add((area.height.saturating_sub(target_h)) / 2);

    Rect::new(left, top, target_w, target_h)
}
