//! Terminal keyboard as a [`KeySource`].
//!
//! Terminals deliver key events, not key state, so [`TerminalKeys`] rebuilds
//! the state from crossterm events. With the keyboard enhancement protocol
//! the terminal reports releases and a key is held from press to release.
//! Without it only presses and auto-repeats arrive, so a key counts as held
//! for [`HOLD_WINDOW`] after its last event. That window has to span the
//! terminal's initial repeat delay or a held key flickers.

use std::collections::HashMap;
use std::io::{self, stdout};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{execute, terminal};
use log::{debug, info};
use transmitter_core::{Key, KeySource, RunFlag};

/// How long a key counts as held after its last press or repeat event when
/// the terminal does not report releases.
pub const HOLD_WINDOW: Duration = Duration::from_millis(550);

/// Event wait per iteration of [`TerminalKeys::pump`].
const EVENT_POLL: Duration = Duration::from_millis(20);

/// Raw mode plus release reporting for the lifetime of the guard.
pub struct TerminalModeGuard {
    enhanced: bool,
}

impl TerminalModeGuard {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let enhanced = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
        if enhanced {
            undo_on_error(
                execute!(
                    stdout(),
                    PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
                ),
                || {
                    let _ = terminal::disable_raw_mode();
                },
            )?;
        }
        info!(
            "terminal raw mode enabled (key release events: {})",
            if enhanced { "yes" } else { "no" }
        );
        Ok(Self { enhanced })
    }

    /// Whether the terminal reports key releases.
    #[must_use]
    pub fn reports_releases(&self) -> bool {
        self.enhanced
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        if self.enhanced {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
        let _ = terminal::disable_raw_mode();
    }
}

/// Run `undo` when `result` is an error, then pass the result on.
fn undo_on_error<T>(result: io::Result<T>, undo: impl FnOnce()) -> io::Result<T> {
    if result.is_err() {
        undo();
    }
    result
}

/// What a key event means for the transmitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down(char),
    Up(char),
    Quit,
    Ignore,
}

/// Classify a crossterm key event.
#[must_use]
pub fn classify(event: &KeyEvent) -> KeyAction {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    match (event.code, event.kind) {
        (KeyCode::Esc, KeyEventKind::Press) => KeyAction::Quit,
        (KeyCode::Char('c' | 'C'), KeyEventKind::Press) if ctrl => KeyAction::Quit,
        (KeyCode::Char(_), _) if ctrl => KeyAction::Ignore,
        (KeyCode::Char(c), KeyEventKind::Press | KeyEventKind::Repeat) => KeyAction::Down(c),
        (KeyCode::Char(c), KeyEventKind::Release) => KeyAction::Up(c),
        _ => KeyAction::Ignore,
    }
}

/// Key state rebuilt from terminal events.
#[derive(Debug)]
pub struct TerminalKeys {
    last_seen: Mutex<HashMap<char, Instant>>,
    releases: AtomicBool,
    hold_window: Duration,
}

impl TerminalKeys {
    #[must_use]
    pub fn new(hold_window: Duration) -> Self {
        Self {
            last_seen: Mutex::new(HashMap::new()),
            releases: AtomicBool::new(false),
            hold_window,
        }
    }

    /// Treat keys as held until their release event.
    pub fn set_reports_releases(&self, releases: bool) {
        self.releases.store(releases, Ordering::Relaxed);
    }

    /// Apply one classified event observed at `now`.
    pub fn apply(&self, action: KeyAction, now: Instant) {
        match action {
            KeyAction::Down(c) => {
                self.keys().insert(c, now);
            }
            KeyAction::Up(c) => {
                // Releases carry the unshifted key, so `R` is released by `r`
                let mut keys = self.keys();
                keys.remove(&c.to_ascii_lowercase());
                keys.remove(&c.to_ascii_uppercase());
            }
            KeyAction::Quit | KeyAction::Ignore => {}
        }
    }

    /// Whether `key` is held as of `now`.
    #[must_use]
    pub fn is_held_at(&self, key: Key, now: Instant) -> bool {
        let keys = self.keys();
        let Some(&seen) = keys.get(&key.char()) else {
            return false;
        };
        self.releases.load(Ordering::Relaxed)
            || now.saturating_duration_since(seen) <= self.hold_window
    }

    /// Read terminal events until `running` is cleared or a quit key is
    /// pressed. Must run on its own thread.
    pub fn pump(&self, running: &RunFlag) -> io::Result<()> {
        while running.is_running() {
            if !event::poll(EVENT_POLL)? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                let action = classify(&key);
                if action == KeyAction::Quit {
                    info!("quit key pressed");
                    running.stop();
                    break;
                }
                self.apply(action, Instant::now());
            }
        }
        debug!("keyboard loop stopped");
        Ok(())
    }

    fn keys(&self) -> MutexGuard<'_, HashMap<char, Instant>> {
        self.last_seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TerminalKeys {
    fn default() -> Self {
        Self::new(HOLD_WINDOW)
    }
}

impl KeySource for TerminalKeys {
    fn is_held(&self, key: Key) -> bool {
        self.is_held_at(key, Instant::now())
    }
}
