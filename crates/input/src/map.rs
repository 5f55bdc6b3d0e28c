//! Key and mouse mapping from terminal events to game input.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::types::{Direction, Event};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// A direction key went down (or repeated)
    Hold(Direction),
    Pause,
}

/// Map keyboard input to game actions.
pub fn map_key(key: KeyEvent) -> Option<InputAction> {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('a') | KeyCode::Char('A') => {
            Some(InputAction::Hold(Direction::Left))
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Char('d') | KeyCode::Char('D') => {
            Some(InputAction::Hold(Direction::Right))
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') | KeyCode::Char('w') | KeyCode::Char('W') => {
            Some(InputAction::Hold(Direction::Up))
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') | KeyCode::Char('s') | KeyCode::Char('S') => {
            Some(InputAction::Hold(Direction::Down))
        }

        KeyCode::Esc | KeyCode::Char('p') | KeyCode::Char('P') => Some(InputAction::Pause),

        _ => None,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// A left click becomes a tap in canvas pixels. Each terminal cell holds two
/// pixels stacked vertically.
pub fn map_mouse(mouse: MouseEvent) -> Option<Event> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Some(Event::Tap {
            x: mouse.column as i32,
            y: mouse.row as i32 * 2,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_keys() {
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Left)),
            Some(InputAction::Hold(Direction::Left))
        );
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Char('D'))),
            Some(InputAction::Hold(Direction::Right))
        );
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Char('k'))),
            Some(InputAction::Hold(Direction::Up))
        );
        assert_eq!(
            map_key(KeyEvent::from(KeyCode::Char('s'))),
            Some(InputAction::Hold(Direction::Down))
        );
    }

    #[test]
    fn test_pause_keys() {
        assert_eq!(map_key(KeyEvent::from(KeyCode::Esc)), Some(InputAction::Pause));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Char('p'))), Some(InputAction::Pause));
        assert_eq!(map_key(KeyEvent::from(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Char('q'))));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('c'))));
    }

    #[test]
    fn test_left_click_is_tap_in_pixels() {
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 7,
            row: 3,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(map_mouse(click), Some(Event::Tap { x: 7, y: 6 }));

        let moved = MouseEvent {
            kind: MouseEventKind::Moved,
            ..click
        };
        assert_eq!(map_mouse(moved), None);
    }
}
