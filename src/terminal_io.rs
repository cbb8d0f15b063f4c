use std::collections::HashMap;
use std::io;

use crossterm::{
    cursor::{Hide, Show},
    event::{
        Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode},
};
use log::{error, info, warn};

// --- SimulatedInput for debugging ---
pub struct SimulatedInput {
    events: HashMap<u64, Vec<Event>>,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Vec<Event>>) -> Self {
        SimulatedInput { events }
    }

    /// A short scripted session: thrust, turn, shoot a few times, then quit.
    pub fn demo_script(quit_frame: u64) -> Self {
        let press = |code| Event::Key(KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Press));
        let release = |code| Event::Key(KeyEvent::new_with_kind(code, KeyModifiers::NONE, KeyEventKind::Release));

        let mut script: HashMap<u64, Vec<Event>> = HashMap::new();
        script.entry(1).or_default().push(press(KeyCode::Up));
        script.entry(20).or_default().push(release(KeyCode::Up));
        script.entry(21).or_default().push(press(KeyCode::Right));
        script.entry(30).or_default().push(release(KeyCode::Right));
        for frame in [31, 40, 50, 60] {
            script.entry(frame).or_default().push(press(KeyCode::Char(' ')));
            script.entry(frame + 1).or_default().push(release(KeyCode::Char(' ')));
        }
        script.entry(70).or_default().push(press(KeyCode::Left));
        script.entry(80).or_default().push(release(KeyCode::Left));
        script.entry(quit_frame).or_default().push(press(KeyCode::Char('q')));
        SimulatedInput::new(script)
    }

    /// Events scheduled for `frame`, in the order they were scripted.
    pub fn take(&mut self, frame: u64) -> Vec<Event> {
        self.events.remove(&frame).unwrap_or_default()
    }

    #[cfg(test)]
    pub fn is_exhausted(&self) -> bool {
        self.events.is_empty()
    }
}

// --- Raw-mode terminal session ---

/// Puts the terminal into game mode and restores it on drop, error paths
/// included.
pub struct TerminalSession {
    reports_releases: bool,
}

impl TerminalSession {
    pub fn enter() -> io::Result<Self> {
        info!("Attempting to enable raw mode.");
        enable_raw_mode().map_err(|e| { error!("Failed to enable raw mode: {}", e); e })?;
        // From here on an early return drops the guard and restores the terminal
        let mut session = TerminalSession { reports_releases: false };

        let mut stdout = io::stdout();
        execute!(stdout, Hide).map_err(|e| { error!("Failed to hide cursor: {}", e); e })?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .map_err(|e| { error!("Failed to enable key release reporting: {}", e); e })?;
            session.reports_releases = true;
            info!("Terminal reports key releases.");
        } else {
            warn!("Terminal can't report key releases, falling back to timed release.");
        }

        Ok(session)
    }

    pub fn reports_releases(&self) -> bool {
        self.reports_releases
    }

    pub fn size() -> io::Result<(u16, u16)> {
        terminal::size().map_err(|e| { error!("Failed to get terminal size: {}", e); e })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if self.reports_releases {
            if let Err(e) = execute!(stdout, PopKeyboardEnhancementFlags) {
                error!("Failed to restore keyboard flags: {}", e);
            }
        }
        if let Err(e) = execute!(stdout, Show) {
            error!("Failed to show cursor: {}", e);
        }
        if let Err(e) = disable_raw_mode() {
            error!("Failed to disable raw mode: {}", e);
        }
        info!("Terminal restored.");
    }
}
