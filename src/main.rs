mod app;
mod event;
mod keymap;
mod ui;

use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Result;
use clap::Parser;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use flashdeck::config::Config;
use flashdeck::deck::library::DeckLibrary;
use flashdeck::store::PositionStore;
use flashdeck::store::json_store::{JsonPositionStore, default_data_dir};
use flashdeck::store::memory::MemoryPositionStore;

use app::{App, AppScreen, NoticeKind};
use event::{AppEvent, EventHandler};
use keymap::StudyKey;
use ui::answer_input::AnswerInput;
use ui::components::card_view::CardView;
use ui::components::progress_bar::DeckProgress;
use ui::layout::{StudyLayout, pack_hint_lines};
use ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "flashdeck",
    version,
    about = "Terminal flashcards for Japanese vocabulary, kanji and sentences"
)]
struct Cli {
    #[arg(short, long, help = "Deck to open straight away (e.g. N5)")]
    deck: Option<String>,

    #[arg(short, long, help = "Theme name")]
    theme: Option<String>,

    #[arg(long, help = "Directory holding KEY.json deck files")]
    deck_dir: Option<PathBuf>,

    #[arg(long, default_value = "info", help = "Log filter used when RUST_LOG is unset")]
    log_level: String,

    #[arg(long, help = "Forget the saved position of every deck and exit")]
    reset_progress: bool,

    #[arg(long, help = "List decks and themes, then exit")]
    list: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = default_data_dir();
    init_logging(&data_dir, &cli.log_level);

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "unreadable config, using defaults");
        Config::default()
    });
    let deck_dir = cli.deck_dir.clone().unwrap_or_else(|| config.deck_dir());
    let library = DeckLibrary::new(deck_dir);

    if cli.list {
        println!("Decks: {}", library.available().join(", "));
        println!("Themes: {}", Theme::available_themes().join(", "));
        return Ok(());
    }

    let positions = JsonPositionStore::with_base_dir(data_dir.clone());
    if cli.reset_progress {
        positions?.reset_all()?;
        println!("Cleared saved progress for every deck.");
        return Ok(());
    }
    let store: Box<dyn PositionStore> = match positions {
        Ok(store) => Box::new(store),
        Err(e) => {
            tracing::warn!(error = %e, "positions will not be saved this run");
            Box::new(MemoryPositionStore::new())
        }
    };

    let theme_name = cli.theme.as_deref().unwrap_or(&config.theme);
    let theme = Theme::load(theme_name).unwrap_or_else(|| {
        tracing::warn!(theme = theme_name, "unknown theme, using default");
        Theme::default()
    });
    let theme: &'static Theme = Box::leak(Box::new(theme));

    let mut app = App::new(config, theme, store, Box::new(library))
        .with_config_path(Config::config_path())
        .with_positions_dir(data_dir);
    if let Some(ref key) = cli.deck {
        app.start_deck(key);
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let events = EventHandler::new();

    let result = run_app(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(error = %err, "exited with error");
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

/// Log to a file under the data dir; the terminal belongs to the UI.
fn init_logging(data_dir: &Path, level: &str) {
    if fs::create_dir_all(data_dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("flashdeck.log"))
    else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .with(filter)
        .try_init();
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, app))?;

        match events.next()? {
            AppEvent::Key(key) => handle_key(app, key),
            AppEvent::Resize => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.screen {
        AppScreen::Menu => handle_menu_key(app, key),
        AppScreen::Study => handle_study_key(app, key),
    }
}

fn handle_menu_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Up | KeyCode::Char('k') => app.menu.prev(),
        KeyCode::Down | KeyCode::Char('j') => app.menu.next(),
        KeyCode::Enter => {
            if let Some(action) = app.menu.selected_action() {
                app.run_menu_action(action);
            }
        }
        KeyCode::Char(ch) => {
            if let Some(action) = app.menu.shortcut(ch) {
                app.run_menu_action(action);
            }
        }
        _ => {}
    }
}

fn handle_study_key(app: &mut App, key: KeyEvent) {
    match keymap::study_key(&key, app.answer.value()) {
        StudyKey::Command(command) => app.dispatch(command),
        StudyKey::Edit => app.edit_answer(key),
        StudyKey::Back => app.go_to_menu(),
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let colors = &app.theme.colors;

    let bg = Block::default().style(Style::default().bg(colors.bg()));
    frame.render_widget(bg, area);

    match app.screen {
        AppScreen::Menu => render_menu(frame, app),
        AppScreen::Study => render_study(frame, app),
    }
}

fn header_line<'a>(app: &App, title: &'a str, info: String) -> Paragraph<'a> {
    let colors = &app.theme.colors;
    Paragraph::new(Line::from(vec![
        Span::styled(
            title,
            Style::default()
                .fg(colors.header_fg())
                .bg(colors.header_bg())
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(info, Style::default().fg(colors.muted()).bg(colors.header_bg())),
    ]))
    .style(Style::default().bg(colors.header_bg()))
}

fn status_line(app: &App) -> Paragraph<'static> {
    let colors = &app.theme.colors;
    let Some(ref notice) = app.notice else {
        return Paragraph::new("");
    };
    let color = match notice.kind {
        NoticeKind::Info => colors.accent(),
        NoticeKind::Success => colors.success(),
        NoticeKind::Warning => colors.warning(),
        NoticeKind::Error => colors.error(),
    };
    Paragraph::new(Line::from(Span::styled(
        format!(" {}", notice.text),
        Style::default().fg(color),
    )))
}

fn footer(app: &App, lines: Vec<String>) -> Paragraph<'static> {
    let style = Style::default().fg(app.theme.colors.muted());
    Paragraph::new(
        lines
            .into_iter()
            .map(|l| Line::from(Span::styled(l, style)))
            .collect::<Vec<_>>(),
    )
}

fn render_menu(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let info = match app.config.last_deck {
        Some(ref last) => format!(" Last studied: {last}"),
        None => String::new(),
    };
    frame.render_widget(header_line(app, " flashdeck ", info), layout[0]);

    let menu_area = ui::layout::centered_rect(50, 80, layout[1]);
    frame.render_widget(&app.menu, menu_area);

    frame.render_widget(status_line(app), layout[2]);
    frame.render_widget(
        footer(
            app,
            vec![" [1-9] Study  [r] Reset progress  [j/k] Move  [q] Quit ".to_string()],
        ),
        layout[3],
    );
}

fn render_study(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();
    let (Some(source_key), Some((index, len))) =
        (app.session.source_key(), app.session.position())
    else {
        return;
    };

    let hints = [
        "[Enter] Check",
        "[Tab] Details",
        "[Ctrl-r/?] Hint",
        "[\u{2190}/\u{2192}] Prev/Next",
        "[PgUp/PgDn] Prev/Next",
        "[Esc] Menu",
    ];
    let footer_lines = pack_hint_lines(&hints, area.width as usize);
    let layout = StudyLayout::new(area, footer_lines.len() as u16);

    let title = format!(" Flashcards - {source_key} ");
    frame.render_widget(
        header_line(app, &title, format!(" Card {} of {len}", index + 1)),
        layout.header,
    );

    if let Some(progress) = layout.progress {
        frame.render_widget(DeckProgress::new(index, len, app.theme), progress);
    }

    if let Ok(card) = app.session.current_card() {
        frame.render_widget(
            CardView::new(card, app.session.recall(), app.theme),
            layout.card,
        );
        frame.render_widget(
            AnswerInput::new(&app.answer, card.recall_target().is_some(), app.theme),
            layout.input,
        );
    }

    frame.render_widget(status_line(app), layout.status);
    frame.render_widget(footer(app, footer_lines), layout.footer);
}
