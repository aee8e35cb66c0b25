use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;
use watchpost::{ControlRequest, MonitorControl};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyAction {
    Quit,
    Request(ControlRequest),
}

/// Spawn a thread that maps key presses onto the monitor's control.
///
/// - Esc, q, Q or Ctrl+C stop the monitor
/// - c clears all category logs
/// - s writes a game-structure dump
pub fn spawn_keyboard_monitor(control: Arc<MonitorControl>) -> JoinHandle<()> {
    thread::spawn(move || {
        debug!("Keyboard monitor started");

        while !control.is_stopped() {
            // Poll with a timeout so the stop state is re-checked
            if event::poll(Duration::from_millis(100)).unwrap_or(false)
                && let Ok(Event::Key(key_event)) = event::read()
                && let Some(action) = key_action(&key_event)
            {
                debug!("Key pressed: {:?} -> {:?}", key_event.code, action);
                match action {
                    KeyAction::Quit => {
                        control.stop();
                        break;
                    }
                    KeyAction::Request(request) => control.request(request),
                }
            }
        }

        debug!("Keyboard monitor stopped");
    })
}

fn key_action(event: &KeyEvent) -> Option<KeyAction> {
    match event.code {
        KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char('q') | KeyCode::Char('Q') => Some(KeyAction::Quit),
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyAction::Quit)
        }
        KeyCode::Char('c') => Some(KeyAction::Request(ControlRequest::ClearLogs)),
        KeyCode::Char('s') => Some(KeyAction::Request(ControlRequest::LogStructure)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_keys() {
        for event in [
            KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
            KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE),
            KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT),
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        ] {
            assert_eq!(key_action(&event), Some(KeyAction::Quit));
        }
    }

    #[test]
    fn test_plain_c_clears_logs() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert_eq!(
            key_action(&event),
            Some(KeyAction::Request(ControlRequest::ClearLogs))
        );
    }

    #[test]
    fn test_s_logs_structure() {
        let event = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        assert_eq!(
            key_action(&event),
            Some(KeyAction::Request(ControlRequest::LogStructure))
        );
    }

    #[test]
    fn test_other_keys_ignored() {
        let event = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(key_action(&event), None);

        let event = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(key_action(&event), None);
    }
}
