use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    widgets::Widget,
    Frame,
};

use crate::ansi::{buffer_to_lines, to_line};
use crate::app::{App, Modal};
use crate::components::dialog::DialogWidget;
use crate::components::panel::PanelWidget;
use crate::keymap::Keymap;
use crate::overlay::composite;
use crate::panel::PanelSide;
use crate::theme::ThemeColors;

/// Render the application UI.
pub fn render(app: &mut App, frame: &mut Frame, theme: &ThemeColors) {
    let area = frame.area();
    let [left_area, right_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(area);

    app.page_size = PanelWidget::visible_rows(left_area).max(1);

    frame.render_widget(
        PanelWidget::new(&app.left, theme, app.active == PanelSide::Left),
        left_area,
    );
    frame.render_widget(
        PanelWidget::new(&app.right, theme, app.active == PanelSide::Right),
        right_area,
    );

    if let Some(modal) = &app.modal {
        overlay_modal(frame.buffer_mut(), modal, &app.keymap, theme);
    }
}

/// Draw `modal` centered on top of whatever `buf` already holds.
fn overlay_modal(buf: &mut Buffer, modal: &Modal, keymap: &Keymap, theme: &ThemeColors) {
    let area = buf.area;
    let widget = DialogWidget::new(modal, keymap, theme);
    let (width, height) = widget.size(area);
    if width == 0 || height == 0 {
        return;
    }

    let mut scratch = Buffer::empty(Rect::new(0, 0, width, height));
    widget.render(scratch.area, &mut scratch);

    let base = buffer_to_lines(buf);
    let dialog = buffer_to_lines(&scratch);
    let merged = composite(&base, &dialog);

    buf.reset();
    for (i, line) in merged.iter().enumerate() {
        buf.set_line(area.x, area.y + i as u16, &to_line(line), area.width);
    }
}
