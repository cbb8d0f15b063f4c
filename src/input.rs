use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::debug;

use crate::constants::SHIP_ROTATION_SPEED;
use crate::simulation::{GamePhase, Simulation};

/// Game controls, independent of the physical key that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Thrust,
    RotateLeft,
    RotateRight,
    Fire,
    Pause,
    Confirm,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Down,
    Repeat,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Continue,
    Quit,
}

/// Maps a terminal key event onto a control. Unbound keys yield `None`.
pub fn translate(event: &KeyEvent) -> Option<(Key, KeyAction)> {
    let key = match event.code {
        KeyCode::Up => Key::Thrust,
        KeyCode::Left => Key::RotateLeft,
        KeyCode::Right => Key::RotateRight,
        KeyCode::Char(' ') => Key::Fire,
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Key::Quit,
        KeyCode::Char('p') | KeyCode::Char('P') => Key::Pause,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Key::Quit,
        KeyCode::Enter => Key::Confirm,
        _ => return None,
    };
    let action = match event.kind {
        KeyEventKind::Press => KeyAction::Down,
        KeyEventKind::Repeat => KeyAction::Repeat,
        KeyEventKind::Release => KeyAction::Up,
    };
    Some((key, action))
}

/// Turns discrete key transitions into the ship's continuous control state.
///
/// Terminals without release reporting only ever send presses (auto-repeat
/// included). For those the controller remembers when each held control was
/// last seen and releases it after `release_timeout` ms of silence. Fire
/// stays edge-triggered there too: presses arriving while it is held are
/// treated as auto-repeat.
pub struct InputController {
    release_timeout: Option<f64>,
    held: HashMap<Key, f64>,
}

impl InputController {
    pub fn new(release_timeout: Option<f64>) -> Self {
        InputController {
            release_timeout,
            held: HashMap::new(),
        }
    }

    pub fn handle(&mut self, key: Key, action: KeyAction, sim: &mut Simulation, now: f64) -> InputOutcome {
        let playing = sim.phase() == GamePhase::Playing;
        match (key, action) {
            (Key::Quit, KeyAction::Down) => return InputOutcome::Quit,
            (Key::Pause, KeyAction::Down) => sim.toggle_pause(),
            (Key::Confirm, KeyAction::Down) => {
                sim.acknowledge(now);
            }
            (Key::Fire, KeyAction::Down) => {
                // Without release events, auto-repeat arrives as fresh presses
                if let Some(timeout) = self.release_timeout {
                    let repeating = self.held.get(&Key::Fire).is_some_and(|seen| now - seen < timeout);
                    self.held.insert(Key::Fire, now);
                    if repeating {
                        return InputOutcome::Continue;
                    }
                }
                if sim.phase() == GamePhase::GameOver {
                    sim.acknowledge(now);
                } else {
                    sim.fire(now);
                }
            }
            (Key::Thrust | Key::RotateLeft | Key::RotateRight, KeyAction::Down | KeyAction::Repeat) if playing => {
                let ship = &mut sim.world.ship;
                match key {
                    Key::Thrust => ship.thrusting = true,
                    Key::RotateLeft => {
                        ship.rotation = -SHIP_ROTATION_SPEED;
                        self.held.remove(&Key::RotateRight);
                    }
                    _ => {
                        ship.rotation = SHIP_ROTATION_SPEED;
                        self.held.remove(&Key::RotateLeft);
                    }
                }
                if self.release_timeout.is_some() {
                    self.held.insert(key, now);
                }
            }
            (Key::Fire, KeyAction::Up) => {
                self.held.remove(&key);
            }
            (Key::Thrust, KeyAction::Up) => {
                sim.world.ship.thrusting = false;
                self.held.remove(&key);
            }
            (Key::RotateLeft | Key::RotateRight, KeyAction::Up) => {
                sim.world.ship.rotation = 0.0;
                self.held.remove(&key);
            }
            _ => {}
        }
        InputOutcome::Continue
    }

    /// Synthesises key-ups for controls that went quiet. No-op when the
    /// terminal reports releases itself.
    pub fn expire_held_keys(&mut self, sim: &mut Simulation, now: f64) {
        let Some(timeout) = self.release_timeout else {
            return;
        };
        let expired: Vec<Key> = self
            .held
            .iter()
            .filter(|(_, seen)| now - **seen >= timeout)
            .map(|(key, _)| *key)
            .collect();
        for key in expired {
            debug!("Releasing {:?} after {}ms without repeat", key, timeout);
            self.handle(key, KeyAction::Up, sim, now);
        }
    }
}
