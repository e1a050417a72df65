use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{InputPurpose, Modal};
use crate::components::help::HelpOverlay;
use crate::keymap::Keymap;
use crate::theme::ThemeColors;

const INPUT_WIDTH: u16 = 50;
const MIN_WIDTH: u16 = 30;

/// Modal dialog box. Fills the whole area it is rendered into; use
/// [`DialogWidget::size`] to find how large that area should be.
pub struct DialogWidget<'a> {
    modal: &'a Modal,
    keymap: &'a Keymap,
    theme: &'a ThemeColors,
}

impl<'a> DialogWidget<'a> {
    pub fn new(modal: &'a Modal, keymap: &'a Keymap, theme: &'a ThemeColors) -> Self {
        Self {
            modal,
            keymap,
            theme,
        }
    }

    /// Width and height of the dialog, at most `max`.
    pub fn size(&self, max: Rect) -> (u16, u16) {
        let (w, h) = match self.modal {
            Modal::Confirm { message, .. } | Modal::Alert { message } => {
                let text_width = message.lines().map(|l| l.width()).max().unwrap_or(0);
                let lines = message.lines().count().max(1);
                (
                    (text_width as u16).saturating_add(4).max(MIN_WIDTH),
                    lines as u16 + 4,
                )
            }
            Modal::Input { .. } => (INPUT_WIDTH, 6),
            Modal::Help => HelpOverlay::new(self.keymap, self.theme).size(),
        };
        (w.min(max.width), h.min(max.height))
    }
}

impl<'a> Widget for DialogWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.modal {
            Modal::Confirm { message, .. } => render_message_dialog(
                " Confirm ",
                message,
                Style::default().fg(self.theme.warning_fg),
                "[Enter] Confirm  [Esc] Cancel",
                self.theme,
                area,
                buf,
            ),
            Modal::Alert { message } => render_message_dialog(
                " Error ",
                message,
                Style::default().fg(self.theme.error_fg),
                "[Enter/Esc] Dismiss",
                self.theme,
                area,
                buf,
            ),
            Modal::Input {
                prompt,
                buffer,
                purpose,
            } => render_input_dialog(*purpose, prompt, buffer, self.theme, area, buf),
            Modal::Help => HelpOverlay::new(self.keymap, self.theme).render(area, buf),
        }
    }
}

fn dialog_block<'b>(title: &'b str, theme: &ThemeColors) -> Block<'b> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.dialog_border_fg))
        .style(Style::default().bg(theme.dialog_bg))
        .padding(Padding::horizontal(1))
}

fn hint_line(hint: &str, theme: &ThemeColors) -> Line<'static> {
    Line::from(Span::styled(
        hint.to_string(),
        Style::default().fg(theme.dim_fg).add_modifier(Modifier::DIM),
    ))
}

fn render_message_dialog(
    title: &str,
    message: &str,
    text_style: Style,
    hint: &str,
    theme: &ThemeColors,
    area: Rect,
    buf: &mut Buffer,
) {
    Clear.render(area, buf);
    let block = dialog_block(title, theme);
    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let body_rows = inner.height.saturating_sub(2);
    for (i, text) in message.lines().take(body_rows as usize).enumerate() {
        let line = Line::from(Span::styled(text.to_string(), text_style));
        buf.set_line(inner.x, inner.y + i as u16, &line, inner.width);
    }

    if inner.height > 1 {
        buf.set_line(
            inner.x,
            inner.y + inner.height - 1,
            &hint_line(hint, theme),
            inner.width,
        );
    }
}

fn render_input_dialog(
    purpose: InputPurpose,
    prompt: &str,
    input: &str,
    theme: &ThemeColors,
    area: Rect,
    buf: &mut Buffer,
) {
    let title = match purpose {
        InputPurpose::MkDir => " New Directory ",
        InputPurpose::MkFile => " New File ",
    };
    Clear.render(area, buf);
    let block = dialog_block(title, theme);
    let inner = block.inner(area);
    block.render(area, buf);

    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let prompt_line = Line::from(Span::styled(
        prompt.to_string(),
        Style::default().fg(theme.accent_fg),
    ));
    buf.set_line(inner.x, inner.y, &prompt_line, inner.width);

    // Show the tail of long input so the cursor stays visible.
    let room = (inner.width as usize).saturating_sub(1);
    let mut shown = input;
    while shown.width() > room {
        let mut chars = shown.chars();
        chars.next();
        shown = chars.as_str();
    }

    let input_line = Line::from(vec![
        Span::styled(shown.to_string(), Style::default().fg(theme.panel_fg)),
        Span::styled(
            " ",
            Style::default().bg(theme.panel_fg).fg(theme.dialog_bg),
        ),
    ]);
    if inner.height > 1 {
        buf.set_line(inner.x, inner.y + 1, &input_line, inner.width);
    }

    if inner.height > 2 {
        buf.set_line(
            inner.x,
            inner.y + inner.height - 1,
            &hint_line("[Enter] Confirm  [Esc] Cancel", theme),
            inner.width,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Action;
    use crate::theme::dark_theme;
    use std::path::PathBuf;

    fn render_modal(modal: &Modal) -> (Rect, Buffer) {
        let theme = dark_theme();
        let keymap = Keymap::default();
        let widget = DialogWidget::new(modal, &keymap, &theme);
        let (w, h) = widget.size(Rect::new(0, 0, 80, 24));
        let area = Rect::new(0, 0, w, h);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);
        (area, buf)
    }

    #[test]
    fn test_confirm_dialog_renders() {
        let modal = Modal::Confirm {
            message: "Are you sure you want to copy\n/tmp/file1.txt\n/tmp/file2.txt?".into(),
            action: Action::Delete {
                targets: vec![PathBuf::from("/tmp/file1.txt")],
            },
        };
        let (area, buf) = render_modal(&modal);
        assert_eq!(area.height, 7);

        let content = buffer_to_string(&buf, area);
        assert!(content.contains("Confirm"));
        assert!(content.contains("Are you sure you want to copy"));
        assert!(content.contains("/tmp/file2.txt?"));
        assert!(content.contains("[Enter] Confirm"));
    }

    #[test]
    fn test_input_dialog_renders() {
        let modal = Modal::Input {
            prompt: "Enter file name:".into(),
            buffer: "test.txt".into(),
            purpose: InputPurpose::MkFile,
        };
        let (area, buf) = render_modal(&modal);
        assert_eq!((area.width, area.height), (50, 6));

        let content = buffer_to_string(&buf, area);
        assert!(content.contains("New File"));
        assert!(content.contains("Enter file name:"));
        assert!(content.contains("test.txt"));
    }

    #[test]
    fn test_long_input_shows_tail() {
        let modal = Modal::Input {
            prompt: "Enter directory name:".into(),
            buffer: format!("{}END", "x".repeat(80)),
            purpose: InputPurpose::MkDir,
        };
        let (area, buf) = render_modal(&modal);
        let content = buffer_to_string(&buf, area);
        assert!(content.contains("xEND"));
    }

    #[test]
    fn test_alert_dialog_renders() {
        let modal = Modal::Alert {
            message: "Error copying file: Permission denied: /root".into(),
        };
        let (area, buf) = render_modal(&modal);
        let content = buffer_to_string(&buf, area);
        assert!(content.contains("Error"));
        assert!(content.contains("Permission denied"));
        assert!(content.contains("Dismiss"));
    }

    #[test]
    fn test_size_is_capped() {
        let theme = dark_theme();
        let keymap = Keymap::default();
        let modal = Modal::Alert {
            message: "y".repeat(300),
        };
        let widget = DialogWidget::new(&modal, &keymap, &theme);
        assert_eq!(widget.size(Rect::new(0, 0, 40, 3)), (40, 3));
    }

    fn buffer_to_string(buf: &Buffer, area: Rect) -> String {
        let mut s = String::new();
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                s.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            s.push('\n');
        }
        s
    }
}
