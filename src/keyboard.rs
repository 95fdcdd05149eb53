// Local operator keyboard: movement, speed, experiment controls
//
// W/A/S/D move, K emergency stop, J/H speed up/down,
// B/N task start/end, P parking, L LED feedback, Q/Esc/Ctrl-C quit.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing::{info, warn};

use crate::messages::{Command, MotionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Command(Command),
    Quit,
}

/// Map a key press to an action
pub fn map_key(code: KeyCode, modifiers: KeyModifiers) -> Option<KeyAction> {
    if modifiers.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c' | 'C')) {
        return Some(KeyAction::Quit);
    }

    let command = match code {
        KeyCode::Esc => return Some(KeyAction::Quit),
        KeyCode::Char(c) => match c.to_ascii_lowercase() {
            'w' => Command::Move(MotionState::Forward),
            's' => Command::Move(MotionState::Backward),
            'a' => Command::Move(MotionState::TurnLeft),
            'd' => Command::Move(MotionState::TurnRight),
            'k' => Command::EmergencyStop,
            'j' => Command::SpeedUp,
            'h' => Command::SlowDown,
            'b' => Command::TaskStart,
            'n' => Command::TaskEnd,
            'p' => Command::MarkParking,
            'l' => Command::ToggleFeedback,
            'q' => return Some(KeyAction::Quit),
            _ => return None,
        },
        _ => return None,
    };
    Some(KeyAction::Command(command))
}

/// Raw-mode terminal keyboard; raw mode is left again on drop
pub struct TerminalKeyboard {
    _private: (),
}

impl TerminalKeyboard {
    pub fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        info!("Keys: WASD=move, K=e-stop, J/H=speed, B/N=task start/end, P=parking, L=LED, Q=quit");
        Ok(Self { _private: () })
    }

    /// Drain every pending key event without blocking
    pub fn poll(&mut self) -> Vec<KeyAction> {
        let mut actions = Vec::new();
        loop {
            match event::poll(Duration::ZERO) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => {
                    warn!("Keyboard poll failed: {}", e);
                    break;
                }
            }

            match event::read() {
                Ok(Event::Key(KeyEvent {
                    code,
                    modifiers,
                    kind,
                    ..
                })) if kind == KeyEventKind::Press => {
                    if let Some(action) = map_key(code, modifiers) {
                        actions.push(action);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Keyboard read failed: {}", e);
                    break;
                }
            }
        }
        actions
    }
}

impl Drop for TerminalKeyboard {
    fn drop(&mut self) {
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to restore terminal mode: {}", e);
        }
    }
}

/// Log sink that writes `\r\n` line endings, so lines stay flush left while
/// the terminal is in raw mode
pub struct CrlfWriter<W: Write> {
    inner: W,
}

impl<W: Write> CrlfWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CrlfWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut translated = Vec::with_capacity(buf.len() + 8);
        let mut prev = None;
        for &byte in buf {
            if byte == b'\n' && prev != Some(b'\r') {
                translated.push(b'\r');
            }
            translated.push(byte);
            prev = Some(byte);
        }
        self.inner.write_all(&translated)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
