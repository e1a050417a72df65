use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::App;

/// Name a key the way bindings are written: `ctrl+c`, `enter`, `pgdown`,
/// `f1`, or the character itself. Returns an empty string for keys that
/// have no name.
pub fn key_name(key: &KeyEvent) -> String {
    let base = match key.code {
        KeyCode::Char(c) if key.modifiers.contains(KeyModifiers::CONTROL) => {
            c.to_ascii_lowercase().to_string()
        }
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "enter".into(),
        KeyCode::Tab => "tab".into(),
        KeyCode::BackTab => "shift+tab".into(),
        KeyCode::Backspace => "backspace".into(),
        KeyCode::Delete => "delete".into(),
        KeyCode::Insert => "insert".into(),
        KeyCode::Esc => "esc".into(),
        KeyCode::Up => "up".into(),
        KeyCode::Down => "down".into(),
        KeyCode::Left => "left".into(),
        KeyCode::Right => "right".into(),
        KeyCode::PageUp => "pgup".into(),
        KeyCode::PageDown => "pgdown".into(),
        KeyCode::Home => "home".into(),
        KeyCode::End => "end".into(),
        KeyCode::F(n) => format!("f{n}"),
        _ => return String::new(),
    };

    let mut name = String::new();
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        name.push_str("ctrl+");
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        name.push_str("alt+");
    }
    name.push_str(&base);
    name
}

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // Windows reports releases too.
    if key.kind != KeyEventKind::Press {
        return;
    }
    let name = key_name(&key);
    if !name.is_empty() {
        app.handle_key(&name);
    }
}

/// Scroll the active panel with the mouse wheel.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.modal.is_some() {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => app.active_panel_mut().select_previous(),
        MouseEventKind::ScrollDown => app.active_panel_mut().select_next(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::Keymap;
    use crossterm::event::KeyEventState;
    use tempfile::TempDir;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn names_plain_and_control_keys() {
        assert_eq!(key_name(&key(KeyCode::Char('q'), KeyModifiers::NONE)), "q");
        assert_eq!(key_name(&key(KeyCode::Char(' '), KeyModifiers::NONE)), " ");
        assert_eq!(
            key_name(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            "ctrl+c"
        );
        assert_eq!(
            key_name(&key(KeyCode::Char('G'), KeyModifiers::SHIFT)),
            "G"
        );
        assert_eq!(
            key_name(&key(KeyCode::Char('x'), KeyModifiers::ALT)),
            "alt+x"
        );
    }

    #[test]
    fn names_special_keys() {
        let cases = [
            (KeyCode::Enter, "enter"),
            (KeyCode::Tab, "tab"),
            (KeyCode::Backspace, "backspace"),
            (KeyCode::Delete, "delete"),
            (KeyCode::Esc, "esc"),
            (KeyCode::PageUp, "pgup"),
            (KeyCode::PageDown, "pgdown"),
            (KeyCode::Home, "home"),
            (KeyCode::End, "end"),
            (KeyCode::F(1), "f1"),
            (KeyCode::Left, "left"),
        ];
        for (code, expected) in cases {
            assert_eq!(key_name(&key(code, KeyModifiers::NONE)), expected);
        }
        assert_eq!(key_name(&key(KeyCode::CapsLock, KeyModifiers::NONE)), "");
    }

    #[test]
    fn release_events_are_ignored() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(dir.path(), Keymap::default(), "code", None);
        let release = KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        handle_key_event(&mut app, release);
        assert!(!app.should_quit);

        handle_key_event(&mut app, key(KeyCode::Char('q'), KeyModifiers::NONE));
        assert!(app.should_quit);
    }

    #[test]
    fn wheel_moves_highlight() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a"), "").unwrap();
        let mut app = App::new(dir.path(), Keymap::default(), "code", None);
        let wheel = |kind| MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };

        handle_mouse_event(&mut app, wheel(MouseEventKind::ScrollDown));
        assert_eq!(app.left.highlighted, 1);
        handle_mouse_event(&mut app, wheel(MouseEventKind::ScrollUp));
        assert_eq!(app.left.highlighted, 0);
    }
}
