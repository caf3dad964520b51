use std::sync::mpsc;
use std::thread;

use crossterm::event::{self, Event, KeyEvent};

pub enum AppEvent {
    Key(KeyEvent),
    Resize,
}

/// Reads terminal events on a background thread. The main loop blocks on
/// `next`, so nothing runs between inputs.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            loop {
                let forwarded = match event::read() {
                    Ok(Event::Key(key)) => tx.send(AppEvent::Key(key)),
                    Ok(Event::Resize(_, _)) => tx.send(AppEvent::Resize),
                    Ok(_) => Ok(()),
                    Err(e) => {
                        tracing::error!(error = %e, "terminal event read failed");
                        return;
                    }
                };
                if forwarded.is_err() {
                    return;
                }
            }
        });

        Self { rx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
