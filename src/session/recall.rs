use crate::deck::Card;

/// Consecutive misses after which the reading and meaning are shown.
pub const HINT_THRESHOLD: u32 = 2;

/// Per-card answer state. Dropped back to default whenever the displayed
/// card changes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecallState {
    pub input_buffer: String,
    pub wrong_count: u32,
    pub hint_visible: bool,
    pub detail_visible: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecallStage {
    Hidden,
    HintShown,
    Answered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Blank input on a card with a typed recall step.
    Ignored,
    Correct,
    Incorrect { wrong_count: u32, hint_visible: bool },
    /// The card has no typed recall step; its detail was shown instead.
    Revealed,
}

impl RecallState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn stage(&self) -> RecallStage {
        if self.detail_visible {
            RecallStage::Answered
        } else if self.hint_visible {
            RecallStage::HintShown
        } else {
            RecallStage::Hidden
        }
    }

    pub fn toggle_detail(&mut self) -> bool {
        self.detail_visible = !self.detail_visible;
        self.detail_visible
    }

    pub fn reveal_hint(&mut self) {
        self.hint_visible = true;
    }

    pub fn submit(&mut self, card: &Card, raw: &str, clear_on_mismatch: bool) -> Verdict {
        let Some(expected) = card.recall_target() else {
            self.detail_visible = true;
            return Verdict::Revealed;
        };
        if raw.trim().is_empty() {
            return Verdict::Ignored;
        }

        if is_match(raw, expected) {
            self.detail_visible = true;
            self.wrong_count = 0;
            self.hint_visible = false;
            self.input_buffer.clear();
            Verdict::Correct
        } else {
            self.wrong_count += 1;
            if self.wrong_count >= HINT_THRESHOLD {
                self.hint_visible = true;
            }
            if clear_on_mismatch {
                self.input_buffer.clear();
            } else {
                self.input_buffer = raw.to_string();
            }
            Verdict::Incorrect {
                wrong_count: self.wrong_count,
                hint_visible: self.hint_visible,
            }
        }
    }
}

pub fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

pub fn is_match(input: &str, expected: &str) -> bool {
    normalize(input) == normalize(expected)
}
