//! Command names and their key bindings.

use std::collections::HashMap;

use tracing::warn;

/// Everything a key can trigger in normal mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Quit,
    SwitchPanel,
    Select,
    Enter,
    Back,
    Copy,
    CopyOverwrite,
    Move,
    MoveOverwrite,
    Delete,
    Trash,
    MkDir,
    MkFile,
    OpenEditor,
    Help,
    Up,
    Down,
    PageUp,
    PageDown,
    Top,
    Bottom,
}

impl Command {
    pub const ALL: [Command; 21] = [
        Command::Quit,
        Command::SwitchPanel,
        Command::Select,
        Command::Enter,
        Command::Back,
        Command::Copy,
        Command::CopyOverwrite,
        Command::Move,
        Command::MoveOverwrite,
        Command::Delete,
        Command::Trash,
        Command::MkDir,
        Command::MkFile,
        Command::OpenEditor,
        Command::Help,
        Command::Up,
        Command::Down,
        Command::PageUp,
        Command::PageDown,
        Command::Top,
        Command::Bottom,
    ];

    /// Name used in the `[keys]` config table.
    pub fn name(self) -> &'static str {
        match self {
            Command::Quit => "quit",
            Command::SwitchPanel => "switch_panel",
            Command::Select => "select",
            Command::Enter => "enter",
            Command::Back => "back",
            Command::Copy => "copy",
            Command::CopyOverwrite => "copy_overwrite",
            Command::Move => "move",
            Command::MoveOverwrite => "move_overwrite",
            Command::Delete => "delete",
            Command::Trash => "trash",
            Command::MkDir => "mkdir",
            Command::MkFile => "mkfile",
            Command::OpenEditor => "open_editor",
            Command::Help => "help",
            Command::Up => "up",
            Command::Down => "down",
            Command::PageUp => "page_up",
            Command::PageDown => "page_down",
            Command::Top => "top",
            Command::Bottom => "bottom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// Short description for the help screen.
    pub fn description(self) -> &'static str {
        match self {
            Command::Quit => "Quit",
            Command::SwitchPanel => "Switch active panel",
            Command::Select => "Toggle selection",
            Command::Enter => "Open directory / file",
            Command::Back => "Go to parent directory",
            Command::Copy => "Copy to other panel",
            Command::CopyOverwrite => "Copy, overwriting",
            Command::Move => "Move to other panel",
            Command::MoveOverwrite => "Move, overwriting",
            Command::Delete => "Delete permanently",
            Command::Trash => "Move to trash",
            Command::MkDir => "New directory",
            Command::MkFile => "New file",
            Command::OpenEditor => "Open in editor",
            Command::Help => "Show this help",
            Command::Up => "Move up",
            Command::Down => "Move down",
            Command::PageUp => "Page up",
            Command::PageDown => "Page down",
            Command::Top => "First entry",
            Command::Bottom => "Last entry",
        }
    }

    fn default_keys(self) -> &'static [&'static str] {
        match self {
            Command::Quit => &["q", "ctrl+q"],
            Command::SwitchPanel => &["tab"],
            Command::Select => &[" "],
            Command::Enter => &["enter"],
            Command::Back => &["backspace", "left"],
            Command::Copy => &["ctrl+c"],
            Command::CopyOverwrite => &["ctrl+r"],
            Command::Move => &["ctrl+x"],
            Command::MoveOverwrite => &["ctrl+t"],
            Command::Delete => &["ctrl+d"],
            Command::Trash => &["delete"],
            Command::MkDir => &["ctrl+f"],
            Command::MkFile => &["ctrl+n"],
            Command::OpenEditor => &["ctrl+o"],
            Command::Help => &["?", "f1"],
            Command::Up => &["up"],
            Command::Down => &["down"],
            Command::PageUp => &["pgup"],
            Command::PageDown => &["pgdown"],
            Command::Top => &["home"],
            Command::Bottom => &["end"],
        }
    }
}

/// Normalise a key written in config to the form produced by
/// [`crate::handler::key_name`].
fn normalize_key(key: &str) -> String {
    match key {
        "space" => " ".to_string(),
        k if k.chars().count() > 1 => k.to_lowercase(),
        k => k.to_string(),
    }
}

/// Key name → command table.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: HashMap<String, Command>,
}

impl Default for Keymap {
    fn default() -> Self {
        let mut bindings = HashMap::new();
        for command in Command::ALL {
            for key in command.default_keys() {
                bindings.insert((*key).to_string(), command);
            }
        }
        Self { bindings }
    }
}

impl Keymap {
    /// Defaults with per-command replacements from the `[keys]` table.
    /// Unknown command names are logged and ignored.
    pub fn with_overrides(overrides: &HashMap<String, Vec<String>>) -> Self {
        let mut keymap = Self::default();
        for (name, keys) in overrides {
            let Some(command) = Command::from_name(name) else {
                warn!(command = %name, "unknown command in [keys], ignoring");
                continue;
            };
            keymap.bindings.retain(|_, bound| *bound != command);
            for key in keys {
                keymap.bindings.insert(normalize_key(key), command);
            }
        }
        keymap
    }

    pub fn lookup(&self, key: &str) -> Option<Command> {
        self.bindings.get(key).copied()
    }

    /// Keys bound to `command`, sorted for display.
    pub fn keys_for(&self, command: Command) -> Vec<&str> {
        let mut keys: Vec<&str> = self
            .bindings
            .iter()
            .filter(|(_, bound)| **bound == command)
            .map(|(key, _)| key.as_str())
            .collect();
        keys.sort_unstable();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_command() {
        let keymap = Keymap::default();
        for command in Command::ALL {
            assert!(!keymap.keys_for(command).is_empty(), "{command:?} unbound");
        }
    }

    #[test]
    fn default_lookups() {
        let keymap = Keymap::default();
        assert_eq!(keymap.lookup("ctrl+c"), Some(Command::Copy));
        assert_eq!(keymap.lookup("ctrl+t"), Some(Command::MoveOverwrite));
        assert_eq!(keymap.lookup("delete"), Some(Command::Trash));
        assert_eq!(keymap.lookup(" "), Some(Command::Select));
        assert_eq!(keymap.lookup("x"), None);
    }

    #[test]
    fn names_round_trip() {
        for command in Command::ALL {
            assert_eq!(Command::from_name(command.name()), Some(command));
        }
    }

    #[test]
    fn override_replaces_command_keys() {
        let overrides = HashMap::from([
            ("copy".to_string(), vec!["F5".to_string()]),
            ("select".to_string(), vec!["space".to_string(), "x".to_string()]),
            ("bogus".to_string(), vec!["z".to_string()]),
        ]);
        let keymap = Keymap::with_overrides(&overrides);

        assert_eq!(keymap.lookup("ctrl+c"), None);
        assert_eq!(keymap.lookup("f5"), Some(Command::Copy));
        assert_eq!(keymap.lookup(" "), Some(Command::Select));
        assert_eq!(keymap.lookup("x"), Some(Command::Select));
        assert_eq!(keymap.lookup("z"), None);
        assert_eq!(keymap.lookup("ctrl+x"), Some(Command::Move));
    }
}
