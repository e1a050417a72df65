use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Row, StatefulWidget, Table, TableState, Widget},
};

use crate::panel::PanelState;
use crate::theme::ThemeColors;

const FOOTER_HEIGHT: u16 = 2;
const HEADER_HEIGHT: u16 = 1;

/// Listing table for one pane, with a path and count footer.
pub struct PanelWidget<'a> {
    state: &'a PanelState,
    theme: &'a ThemeColors,
    active: bool,
}

impl<'a> PanelWidget<'a> {
    pub fn new(state: &'a PanelState, theme: &'a ThemeColors, active: bool) -> Self {
        Self {
            state,
            theme,
            active,
        }
    }

    /// Number of listing rows that fit in `area`.
    pub fn visible_rows(area: Rect) -> usize {
        area.height
            .saturating_sub(2 + HEADER_HEIGHT + FOOTER_HEIGHT)
            .into()
    }

    fn rows(&self) -> Vec<Row<'a>> {
        self.state
            .entries
            .iter()
            .map(|entry| {
                let selected = self.state.is_selected(&entry.path);
                let marker = if selected { "* " } else { "  " };
                let name = if entry.is_dir && !entry.is_parent() {
                    format!("{}{}/", marker, entry.name)
                } else {
                    format!("{}{}", marker, entry.name)
                };

                let style = if selected {
                    Style::default()
                        .fg(self.theme.selected_fg)
                        .add_modifier(Modifier::BOLD)
                } else if entry.is_dir {
                    Style::default().fg(self.theme.dir_fg)
                } else {
                    Style::default().fg(self.theme.file_fg)
                };

                Row::new([
                    name,
                    entry.size_display.clone(),
                    entry.permissions.clone(),
                ])
                .style(style)
            })
            .collect()
    }

    /// 1-based page of the highlight and the page count, for `page_size`
    /// rows per page.
    fn page_position(&self, page_size: usize) -> (usize, usize) {
        let page_size = page_size.max(1);
        let pages = self.state.entries.len().div_ceil(page_size).max(1);
        (self.state.highlighted / page_size + 1, pages)
    }

    fn render_footer(&self, area: Rect, page_size: usize, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let style = Style::default().fg(self.theme.footer_fg);
        let (page, pages) = self.page_position(page_size);
        let indicator = Span::styled(format!(" {}/{}", page, pages), style);
        let indicator_width = (indicator.width() as u16).min(area.width);

        let path = Line::from(Span::styled(
            format!("Path: {}", self.state.dir.display()),
            style,
        ));
        buf.set_line(area.x, area.y, &path, area.width - indicator_width);
        buf.set_span(
            area.x + area.width - indicator_width,
            area.y,
            &indicator,
            indicator_width,
        );

        if area.height > 1 {
            let counts = self.state.counts;
            let totals = Line::from(Span::styled(
                format!(
                    "Total: {} | Dirs: {} | Files: {}",
                    counts.total, counts.dirs, counts.files
                ),
                style,
            ));
            buf.set_line(area.x, area.y + 1, &totals, area.width);
        }
    }
}

impl<'a> Widget for PanelWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_fg = if self.active {
            self.theme.border_focused_fg
        } else {
            self.theme.border_fg
        };
        let block = Block::default()
            .title(format!(" {} ", self.state.dir.display()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_fg));
        let inner = block.inner(area);
        block.render(area, buf);

        let [table_area, footer_area] =
            Layout::vertical([Constraint::Min(0), Constraint::Length(FOOTER_HEIGHT)])
                .areas(inner);

        let header = Row::new(["Name", "Size", "Permissions"]).style(
            Style::default()
                .fg(self.theme.header_fg)
                .add_modifier(Modifier::BOLD),
        );
        let widths = [
            Constraint::Fill(1),
            Constraint::Length(10),
            Constraint::Length(11),
        ];

        let highlight_style = if self.active {
            Style::default()
                .fg(self.theme.highlight_fg)
                .bg(self.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(self.theme.highlight_bg)
        };

        let table = Table::new(self.rows(), widths)
            .header(header)
            .style(Style::default().fg(self.theme.panel_fg))
            .row_highlight_style(highlight_style);

        let mut table_state = TableState::default().with_selected(Some(self.state.highlighted));
        StatefulWidget::render(table, table_area, buf, &mut table_state);

        let page_size = table_area.height.saturating_sub(HEADER_HEIGHT) as usize;
        self.render_footer(footer_area, page_size, buf);
    }
}
