use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::keymap::{Command, Keymap};
use crate::theme::ThemeColors;

const KEY_WIDTH: usize = 24;
const OVERLAY_WIDTH: u16 = 64;

/// A group of commands shown under one heading.
struct CommandCategory {
    name: &'static str,
    commands: &'static [Command],
}

const CATEGORIES: &[CommandCategory] = &[
    CommandCategory {
        name: "Navigation",
        commands: &[
            Command::Up,
            Command::Down,
            Command::PageUp,
            Command::PageDown,
            Command::Top,
            Command::Bottom,
            Command::Enter,
            Command::Back,
            Command::SwitchPanel,
            Command::Select,
        ],
    },
    CommandCategory {
        name: "File Operations",
        commands: &[
            Command::Copy,
            Command::CopyOverwrite,
            Command::Move,
            Command::MoveOverwrite,
            Command::Delete,
            Command::Trash,
            Command::MkDir,
            Command::MkFile,
            Command::OpenEditor,
        ],
    },
    CommandCategory {
        name: "General",
        commands: &[Command::Help, Command::Quit],
    },
];

/// Human-readable form of a bound key name.
fn display_key(key: &str) -> String {
    match key {
        " " => "space".to_string(),
        k => k.to_string(),
    }
}

/// Help overlay listing every command with the keys currently bound to it.
pub struct HelpOverlay<'a> {
    keymap: &'a Keymap,
    theme: &'a ThemeColors,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(keymap: &'a Keymap, theme: &'a ThemeColors) -> Self {
        Self { keymap, theme }
    }

    /// Preferred size, borders included.
    pub fn size(&self) -> (u16, u16) {
        (OVERLAY_WIDTH, self.build_content_lines().len() as u16 + 2)
    }

    fn build_content_lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = Vec::new();

        lines.push(Line::from(vec![Span::styled(
            " Keybinding Reference ",
            Style::default()
                .fg(self.theme.accent_fg)
                .add_modifier(Modifier::BOLD),
        )]));
        lines.push(Line::from(""));

        for category in CATEGORIES {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("── {} ", category.name),
                    Style::default()
                        .fg(self.theme.accent_fg)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled("─".repeat(30), Style::default().fg(self.theme.dim_fg)),
            ]));

            for command in category.commands {
                let keys = self.keymap.keys_for(*command);
                let keys = if keys.is_empty() {
                    "(unbound)".to_string()
                } else {
                    keys.iter()
                        .map(|k| display_key(k))
                        .collect::<Vec<_>>()
                        .join(" / ")
                };
                let key_padded = format!("  {:<width$}", keys, width = KEY_WIDTH);
                lines.push(Line::from(vec![
                    Span::styled(
                        key_padded,
                        Style::default()
                            .fg(self.theme.warning_fg)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        command.description().to_string(),
                        Style::default().fg(self.theme.file_fg),
                    ),
                ]));
            }

            lines.push(Line::from(""));
        }

        lines.push(Line::from(vec![Span::styled(
            " Press Enter or Esc to close ",
            Style::default().fg(self.theme.dim_fg),
        )]));

        lines
    }
}

impl<'a> Widget for HelpOverlay<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused_fg))
            .style(Style::default().bg(self.theme.dialog_bg));

        let inner = block.inner(area);
        block.render(area, buf);

        let content_lines = self.build_content_lines();
        let visible_height = inner.height as usize;

        for (i, line) in content_lines.iter().take(visible_height).enumerate() {
            buf.set_line(
                inner.x + 1,
                inner.y + i as u16,
                line,
                inner.width.saturating_sub(2),
            );
        }

        if content_lines.len() > visible_height && area.height > 0 {
            let indicator = format!(" {}/{} ", visible_height, content_lines.len());
            let ind_span = Span::styled(indicator, Style::default().fg(self.theme.dim_fg));
            let ind_x = area.x + area.width.saturating_sub(ind_span.width() as u16 + 1);
            let ind_y = area.y + area.height - 1;
            buf.set_span(ind_x, ind_y, &ind_span, ind_span.width() as u16);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn every_command_has_a_category() {
        for command in Command::ALL {
            let count = CATEGORIES
                .iter()
                .filter(|c| c.commands.contains(&command))
                .count();
            assert_eq!(count, 1, "{:?} listed {} times", command, count);
        }
    }

    #[test]
    fn content_lines_match_size() {
        let theme = crate::theme::dark_theme();
        let keymap = Keymap::default();
        let overlay = HelpOverlay::new(&keymap, &theme);
        let lines = overlay.build_content_lines();
        // title + blank + per category (header + commands + blank) + footer
        let expected = 2 + CATEGORIES.iter().map(|c| c.commands.len() + 2).sum::<usize>() + 1;
        assert_eq!(lines.len(), expected);
        assert_eq!(overlay.size().1 as usize, expected + 2);
    }

    #[test]
    fn shows_overridden_keys() {
        let theme = crate::theme::dark_theme();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), vec!["ctrl+w".to_string()]);
        let keymap = Keymap::with_overrides(&overrides);
        let overlay = HelpOverlay::new(&keymap, &theme);
        let (w, h) = overlay.size();
        let area = Rect::new(0, 0, w, h);
        let mut buf = Buffer::empty(area);
        overlay.render(area, &mut buf);

        let text: String = (0..h)
            .map(|y| {
                (0..w)
                    .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("ctrl+w"));
        assert!(text.contains("space"));
        assert!(!text.contains("ctrl+q"));
    }

    #[test]
    fn small_area_shows_indicator() {
        let theme = crate::theme::dark_theme();
        let keymap = Keymap::default();
        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        HelpOverlay::new(&keymap, &theme).render(area, &mut buf);
        let bottom: String = (0..40)
            .map(|x| buf.cell((x, 5)).unwrap().symbol().to_string())
            .collect();
        assert!(bottom.contains("4/"));
    }
}
