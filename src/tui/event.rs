//! Event handling for TUI

use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;
use tokio::time::interval;

/// How long the input thread waits for a terminal event before checking
/// whether the app is still listening
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Application events
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Key press
    Key(KeyEvent),
    /// Tick event for periodic updates
    Tick,
}

/// Event handler for the TUI
///
/// Terminal input is read on a blocking thread and ticks come from a tokio
/// interval; both feed one channel. Both producers stop once the handler is
/// dropped.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _ticker: tokio::task::JoinHandle<()>,
}

impl EventHandler {
    /// Create a new event handler
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel(100);

        let input_tx = tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::poll(INPUT_POLL) {
                Ok(true) => match event::read() {
                    Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                        if input_tx.blocking_send(AppEvent::Key(key)).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("terminal read failed: {}", e);
                        break;
                    }
                },
                Ok(false) if input_tx.is_closed() => break,
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("terminal poll failed: {}", e);
                    break;
                }
            }
        });

        let ticker = tokio::spawn(async move {
            let mut ticks = interval(tick_rate);
            loop {
                ticks.tick().await;
                if tx.send(AppEvent::Tick).await.is_err() {
                    break;
                }
            }
        });

        Self {
            rx,
            _ticker: ticker,
        }
    }

    /// Get the next event
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

/// Ctrl+C, the only key that quits from every screen
pub fn is_quit_key(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Ctrl+R
pub fn is_reload_key(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// A printable character typed without Ctrl or Alt
pub fn typed_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(c)
        }
        _ => None,
    }
}
