use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

/// Event utility functions
pub mod event_utils {
    use super::*;

    /// Check if a key event matches Ctrl+C or Ctrl+Q (terminate)
    pub fn is_terminate_event(event: &Event) -> bool {
        matches!(
            event,
            Event::Key(KeyEvent {
                code: KeyCode::Char('c') | KeyCode::Char('q'),
                modifiers,
                ..
            }) if modifiers.contains(KeyModifiers::CONTROL)
        )
    }

    /// Check if a key event moves the block selection
    pub fn is_navigation_event(event: &Event) -> bool {
        matches!(
            event,
            Event::Key(KeyEvent {
                code: KeyCode::Up | KeyCode::Down | KeyCode::Home | KeyCode::End,
                ..
            })
        )
    }

    /// Check if a key event opens command mode
    pub fn is_command_event(event: &Event) -> bool {
        matches!(
            event,
            Event::Key(KeyEvent {
                code: KeyCode::Char(':'),
                ..
            })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::event_utils::*;
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_terminate_needs_control() {
        assert!(is_terminate_event(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(is_terminate_event(&key(KeyCode::Char('q'), KeyModifiers::CONTROL)));
        assert!(!is_terminate_event(&key(KeyCode::Char('q'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_navigation_and_command_keys() {
        assert!(is_navigation_event(&key(KeyCode::Down, KeyModifiers::NONE)));
        assert!(!is_navigation_event(&key(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(is_command_event(&key(KeyCode::Char(':'), KeyModifiers::NONE)));
    }
}
