use std::path::PathBuf;

use crossterm::event::KeyEvent;

use flashdeck::config::Config;
use flashdeck::deck::CardSource;
use flashdeck::session::{
    Command, Loaded, Outcome, SessionController, SessionError, Step, Verdict,
};
use flashdeck::store::PositionStore;
use flashdeck::store::json_store::JsonPositionStore;

use crate::ui::answer_input::AnswerLine;
use crate::ui::components::menu::{Menu, MenuAction};
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Menu,
    Study,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

/// One-line message for the status bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub text: String,
    pub kind: NoticeKind,
}

impl Notice {
    fn new(kind: NoticeKind, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

pub struct App {
    pub screen: AppScreen,
    pub menu: Menu<'static>,
    pub theme: &'static Theme,
    pub config: Config,
    pub session: SessionController,
    pub answer: AnswerLine,
    pub notice: Option<Notice>,
    pub should_quit: bool,
    library: Box<dyn CardSource>,
    config_path: Option<PathBuf>,
    positions_dir: Option<PathBuf>,
}

impl App {
    pub fn new(
        config: Config,
        theme: &'static Theme,
        store: Box<dyn PositionStore>,
        library: Box<dyn CardSource>,
    ) -> Self {
        let mut menu = Menu::new(&config.levels, theme);
        if let Some(ref last) = config.last_deck {
            menu.select_level(last);
        }
        let session = SessionController::new(store)
            .with_clear_input_on_mismatch(config.clear_input_on_mismatch);

        Self {
            screen: AppScreen::Menu,
            menu,
            theme,
            config,
            session,
            answer: AnswerLine::default(),
            notice: None,
            should_quit: false,
            library,
            config_path: None,
            positions_dir: None,
        }
    }

    /// Persist `last_deck` changes to this file.
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Directory of the on-disk position store, used by "Reset progress".
    pub fn with_positions_dir(mut self, dir: PathBuf) -> Self {
        self.positions_dir = Some(dir);
        self
    }

    pub fn run_menu_action(&mut self, action: MenuAction) {
        match action {
            MenuAction::Study(level) => self.start_deck(&level),
            MenuAction::ResetProgress => self.reset_progress(),
            MenuAction::Quit => self.should_quit = true,
        }
    }

    pub fn start_deck(&mut self, source_key: &str) {
        let records = match self.library.fetch(source_key) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(source_key, error = %e, "failed to fetch deck");
                self.notice = Some(Notice::new(
                    NoticeKind::Error,
                    format!("Failed to load flashcards for {source_key}: {e:#}"),
                ));
                return;
            }
        };

        match self.session.load_deck(source_key, &records) {
            Ok(Loaded {
                index,
                len,
                warning,
                ..
            }) => {
                let mut text = format!("Loaded {len} flashcards for {source_key}");
                if index > 0 {
                    text.push_str(&format!(", resuming at card {}", index + 1));
                }
                self.notice = Some(match warning {
                    Some(w) => Notice::new(NoticeKind::Warning, format!("{text} ({w})")),
                    None => Notice::new(NoticeKind::Success, text),
                });
                self.answer.clear();
                self.screen = AppScreen::Study;
                self.remember_deck(source_key);
            }
            Err(SessionError::EmptyDeck { .. }) => {
                self.notice = Some(Notice::new(
                    NoticeKind::Info,
                    format!("No flashcards found for {source_key}"),
                ));
                self.screen = AppScreen::Menu;
            }
            Err(e) => {
                tracing::warn!(source_key, error = %e, "rejected deck");
                self.notice = Some(Notice::new(
                    NoticeKind::Error,
                    format!("Failed to load flashcards for {source_key}: {e}"),
                ));
            }
        }
    }

    fn remember_deck(&mut self, source_key: &str) {
        if self.config.last_deck.as_deref() == Some(source_key) {
            return;
        }
        self.config.last_deck = Some(source_key.to_string());
        if let Some(ref path) = self.config_path
            && let Err(e) = self.config.save_to(path)
        {
            tracing::warn!(error = %e, "failed to save config");
        }
    }

    pub fn dispatch(&mut self, command: Command) {
        self.notice = match self.session.apply(command) {
            Ok(outcome) => notice_for(&outcome),
            Err(e) => Some(Notice::new(NoticeKind::Error, e.to_string())),
        };
        let buffer = &self.session.recall().input_buffer;
        if buffer != self.answer.value() {
            self.answer = AnswerLine::new(buffer);
        }
    }

    /// Only vocabulary cards take typed answers.
    pub fn accepts_answer(&self) -> bool {
        self.session
            .current_card()
            .is_ok_and(|card| card.recall_target().is_some())
    }

    pub fn edit_answer(&mut self, key: KeyEvent) {
        if self.accepts_answer() && self.answer.edit(key) {
            self.session.set_input(self.answer.value());
        }
    }

    pub fn reset_progress(&mut self) {
        let Some(ref dir) = self.positions_dir else {
            self.notice = Some(Notice::new(NoticeKind::Info, "No saved progress to reset"));
            return;
        };
        let result = JsonPositionStore::with_base_dir(dir.clone()).and_then(|s| s.reset_all());
        self.notice = Some(match result {
            Ok(()) => Notice::new(NoticeKind::Success, "Cleared saved progress for every deck"),
            Err(e) => {
                tracing::warn!(error = %e, "failed to reset positions");
                Notice::new(NoticeKind::Error, format!("Failed to reset progress: {e}"))
            }
        });
    }

    pub fn go_to_menu(&mut self) {
        if let Some(key) = self.session.source_key().map(str::to_string) {
            self.menu.select_level(&key);
        }
        self.session.close();
        self.answer.clear();
        self.screen = AppScreen::Menu;
    }
}

fn notice_for(outcome: &Outcome<'_>) -> Option<Notice> {
    match outcome {
        Outcome::Navigated(step) => step_notice(step, None),
        Outcome::DetailToggled { .. } => None,
        Outcome::HintRevealed => Some(Notice::new(NoticeKind::Info, "Hint shown")),
        Outcome::Submitted { verdict, advanced } => match verdict {
            Verdict::Ignored | Verdict::Revealed => None,
            Verdict::Correct => match advanced {
                Some(step) => step_notice(step, Some("Correct!")),
                None => Some(Notice::new(NoticeKind::Success, "Correct!")),
            },
            Verdict::Incorrect {
                wrong_count,
                hint_visible,
            } => {
                let mut text = format!("Not quite (attempt {wrong_count})");
                if *hint_visible {
                    text.push_str(", hint shown");
                }
                Some(Notice::new(NoticeKind::Error, text))
            }
        },
    }
}

fn step_notice(step: &Step<'_>, prefix: Option<&str>) -> Option<Notice> {
    let join = |msg: &str| match prefix {
        Some(p) => format!("{p} {msg}"),
        None => msg.to_string(),
    };
    match step {
        Step::Moved {
            warning: Some(w), ..
        } => Some(Notice::new(NoticeKind::Warning, join(&w.to_string()))),
        Step::Moved { .. } => prefix.map(|p| Notice::new(NoticeKind::Success, p)),
        Step::AtLastCard => Some(Notice::new(
            NoticeKind::Info,
            join("You reached the last card"),
        )),
        Step::AtFirstCard => Some(Notice::new(NoticeKind::Info, join("This is the first card"))),
    }
}
