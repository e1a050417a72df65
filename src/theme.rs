//! Built-in palettes and their selection from config.

use ratatui::style::Color;

/// All runtime colors used in the UI.
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // Panels
    pub panel_fg: Color,
    pub highlight_bg: Color,
    pub highlight_fg: Color,
    pub dir_fg: Color,
    pub file_fg: Color,
    pub selected_fg: Color,
    pub header_fg: Color,
    pub footer_fg: Color,

    // Borders & chrome
    pub border_fg: Color,
    pub border_focused_fg: Color,

    // Dialogs
    pub dialog_bg: Color,
    pub dialog_border_fg: Color,

    // Semantic colors
    pub error_fg: Color,
    pub warning_fg: Color,
    pub accent_fg: Color,
    pub dim_fg: Color,
}

/// Dark theme using Catppuccin Mocha palette.
pub fn dark_theme() -> ThemeColors {
    ThemeColors {
        panel_fg: Color::Rgb(205, 214, 244),       // #cdd6f4 (text)
        highlight_bg: Color::Rgb(69, 71, 90),      // #45475a (surface1)
        highlight_fg: Color::Rgb(205, 214, 244),   // #cdd6f4
        dir_fg: Color::Rgb(137, 180, 250),         // #89b4fa (blue)
        file_fg: Color::Rgb(205, 214, 244),        // #cdd6f4
        selected_fg: Color::Rgb(250, 179, 135),    // #fab387 (peach)
        header_fg: Color::Rgb(203, 166, 247),      // #cba6f7 (mauve)
        footer_fg: Color::Rgb(166, 173, 200),      // #a6adc8 (subtext0)

        border_fg: Color::Rgb(88, 91, 112),           // #585b70 (surface2)
        border_focused_fg: Color::Rgb(137, 180, 250), // #89b4fa (blue)

        dialog_bg: Color::Rgb(49, 50, 68), // #313244 (surface0)
        dialog_border_fg: Color::Rgb(137, 180, 250),

        error_fg: Color::Rgb(243, 139, 168),   // #f38ba8 (red)
        warning_fg: Color::Rgb(249, 226, 175), // #f9e2af (yellow)
        accent_fg: Color::Rgb(203, 166, 247),  // #cba6f7 (mauve)
        dim_fg: Color::Rgb(108, 112, 134),     // #6c7086 (overlay0)
    }
}

/// Light theme using Catppuccin Latte palette.
pub fn light_theme() -> ThemeColors {
    ThemeColors {
        panel_fg: Color::Rgb(76, 79, 105),       // #4c4f69 (text)
        highlight_bg: Color::Rgb(204, 208, 218), // #ccd0da (surface1)
        highlight_fg: Color::Rgb(76, 79, 105),
        dir_fg: Color::Rgb(30, 102, 245), // #1e66f5 (blue)
        file_fg: Color::Rgb(76, 79, 105),
        selected_fg: Color::Rgb(254, 100, 11), // #fe640b (peach)
        header_fg: Color::Rgb(136, 57, 239),   // #8839ef (mauve)
        footer_fg: Color::Rgb(108, 111, 133),  // #6c6f85 (subtext0)

        border_fg: Color::Rgb(172, 176, 190), // #acb0be (surface2)
        border_focused_fg: Color::Rgb(30, 102, 245),

        dialog_bg: Color::Rgb(230, 233, 239), // #e6e9ef (surface0)
        dialog_border_fg: Color::Rgb(30, 102, 245),

        error_fg: Color::Rgb(210, 15, 57),    // #d20f39 (red)
        warning_fg: Color::Rgb(223, 142, 29), // #df8e1d (yellow)
        accent_fg: Color::Rgb(136, 57, 239),  // #8839ef (mauve)
        dim_fg: Color::Rgb(156, 160, 176),    // #9ca0b0 (overlay0)
    }
}

/// Pick a palette by scheme name. Unknown names get the dark palette.
pub fn resolve_theme(scheme: &str) -> ThemeColors {
    match scheme {
        "light" => light_theme(),
        _ => dark_theme(),
    }
}
