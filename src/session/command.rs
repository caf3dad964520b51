use crate::session::controller::{SessionController, Step};
use crate::session::error::SessionError;
use crate::session::recall::Verdict;

/// The whole input surface of a study session. Input layers translate their
/// own events (keys, swipes, taps) into exactly one of these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Swipe left.
    Advance,
    /// Swipe right.
    Retreat,
    /// Tap.
    ToggleDetail,
    Submit(String),
    RevealHint,
}

#[derive(Debug)]
pub enum Outcome<'a> {
    Navigated(Step<'a>),
    DetailToggled { visible: bool },
    /// `advanced` is set only after a correct answer.
    Submitted {
        verdict: Verdict,
        advanced: Option<Step<'a>>,
    },
    HintRevealed,
}

impl SessionController {
    pub fn apply(&mut self, command: Command) -> Result<Outcome<'_>, SessionError> {
        tracing::trace!(?command, "apply");
        match command {
            Command::Advance => Ok(Outcome::Navigated(self.advance()?)),
            Command::Retreat => Ok(Outcome::Navigated(self.retreat()?)),
            Command::ToggleDetail => Ok(Outcome::DetailToggled {
                visible: self.toggle_detail()?,
            }),
            Command::Submit(text) => {
                let (verdict, advanced) = self.submit(&text)?;
                Ok(Outcome::Submitted { verdict, advanced })
            }
            Command::RevealHint => {
                self.reveal_hint()?;
                Ok(Outcome::HintRevealed)
            }
        }
    }
}
