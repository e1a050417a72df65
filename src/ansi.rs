//! ANSI-styled text lines.
//!
//! Lines are scanned with the `vte` parser, so escape sequences of any kind
//! are recognised and measured as zero-width. Width arithmetic works in
//! terminal columns.

use std::fmt::Write as _;
use std::ops::Range;

use ratatui::buffer::Buffer;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

/// A piece of a line, addressed by byte range into the source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// One printable character.
    Text { range: Range<usize>, width: usize },
    /// A `CSI ... m` sequence.
    Sgr { range: Range<usize> },
    /// Any other escape sequence or control byte.
    Other { range: Range<usize> },
}

impl Token {
    pub fn range(&self) -> &Range<usize> {
        match self {
            Token::Text { range, .. } | Token::Sgr { range } | Token::Other { range } => range,
        }
    }

    fn width(&self) -> usize {
        match self {
            Token::Text { width, .. } => *width,
            _ => 0,
        }
    }
}

enum Dispatched {
    Text(char),
    Sgr,
    Other,
}

/// Records what the parser dispatched for the last byte fed to it.
#[derive(Default)]
struct Scanner {
    dispatched: Option<Dispatched>,
}

impl vte::Perform for Scanner {
    fn print(&mut self, c: char) {
        self.dispatched = Some(Dispatched::Text(c));
    }

    fn execute(&mut self, _byte: u8) {
        self.dispatched = Some(Dispatched::Other);
    }

    fn csi_dispatch(&mut self, _params: &vte::Params, intermediates: &[u8], _ignore: bool, action: char) {
        self.dispatched = Some(if action == 'm' && intermediates.is_empty() {
            Dispatched::Sgr
        } else {
            Dispatched::Other
        });
    }

    fn esc_dispatch(&mut self, _intermediates: &[u8], _ignore: bool, _byte: u8) {
        self.dispatched = Some(Dispatched::Other);
    }

    fn osc_dispatch(&mut self, _params: &[&[u8]], _bell_terminated: bool) {
        self.dispatched = Some(Dispatched::Other);
    }

    fn hook(&mut self, _params: &vte::Params, _intermediates: &[u8], _ignore: bool, _action: char) {}

    fn unhook(&mut self) {
        self.dispatched = Some(Dispatched::Other);
    }

    fn put(&mut self, _byte: u8) {}
}

/// Split `line` into tokens covering every byte exactly once.
pub fn tokenize(line: &str) -> Vec<Token> {
    let mut parser = vte::Parser::new();
    let mut scanner = Scanner::default();
    let mut tokens = Vec::new();
    let mut start = 0;

    for (i, &byte) in line.as_bytes().iter().enumerate() {
        parser.advance(&mut scanner, byte);
        let Some(dispatched) = scanner.dispatched.take() else {
            continue;
        };
        let range = start..i + 1;
        start = i + 1;
        tokens.push(match dispatched {
            Dispatched::Text(c) => Token::Text {
                range,
                width: c.width().unwrap_or(0),
            },
            Dispatched::Sgr => Token::Sgr { range },
            Dispatched::Other => Token::Other { range },
        });
    }

    // An unterminated sequence at the end of the line.
    if start < line.len() {
        tokens.push(Token::Other {
            range: start..line.len(),
        });
    }
    tokens
}

/// Width of `line` in terminal columns, ignoring escape sequences.
pub fn visible_width(line: &str) -> usize {
    tokenize(line).iter().map(Token::width).sum()
}

/// Keep the first `width` columns of `line`.
///
/// Escape sequences before the cut are kept. A wide character that would
/// straddle the cut is replaced by spaces up to `width`.
pub fn truncate(line: &str, width: usize) -> String {
    let mut out = String::with_capacity(line.len());
    let mut used = 0;
    for token in tokenize(line) {
        let w = token.width();
        if used + w > width {
            out.extend(std::iter::repeat(' ').take(width - used));
            break;
        }
        used += w;
        out.push_str(&line[token.range().clone()]);
    }
    out
}

/// Drop the first `width` columns of `line`.
///
/// The last SGR sequence seen in the dropped part is re-emitted in front of
/// the remainder so it keeps its colors. A wide character cut by the
/// boundary leaves spaces for its visible columns.
pub fn truncate_left(line: &str, width: usize) -> String {
    let tokens = tokenize(line);
    let mut used = 0;
    let mut last_sgr: Option<&str> = None;
    let mut pad = 0;
    let mut rest_start = line.len();

    for token in &tokens {
        if used >= width {
            rest_start = token.range().start;
            break;
        }
        match token {
            Token::Sgr { range } => last_sgr = Some(&line[range.clone()]),
            Token::Text { width: w, .. } => {
                used += w;
                if used > width {
                    pad = used - width;
                }
            }
            Token::Other { .. } => {}
        }
    }

    let mut out = String::with_capacity(line.len() - rest_start + 16);
    if let Some(sgr) = last_sgr {
        out.push_str(sgr);
    }
    out.extend(std::iter::repeat(' ').take(pad));
    out.push_str(&line[rest_start..]);
    out
}

// ── Buffer <-> styled strings ───────────────────────────────────────────────

fn push_color(codes: &mut Vec<String>, color: Color, foreground: bool) {
    let base = if foreground { 30 } else { 40 };
    let code = match color {
        Color::Reset => return,
        Color::Black => base,
        Color::Red => base + 1,
        Color::Green => base + 2,
        Color::Yellow => base + 3,
        Color::Blue => base + 4,
        Color::Magenta => base + 5,
        Color::Cyan => base + 6,
        Color::Gray => base + 7,
        Color::DarkGray => base + 60,
        Color::LightRed => base + 61,
        Color::LightGreen => base + 62,
        Color::LightYellow => base + 63,
        Color::LightBlue => base + 64,
        Color::LightMagenta => base + 65,
        Color::LightCyan => base + 66,
        Color::White => base + 67,
        Color::Indexed(i) => {
            codes.push(format!("{};5;{i}", base + 8));
            return;
        }
        Color::Rgb(r, g, b) => {
            codes.push(format!("{};2;{r};{g};{b}", base + 8));
            return;
        }
    };
    codes.push(code.to_string());
}

const MODIFIER_CODES: [(Modifier, &str); 9] = [
    (Modifier::BOLD, "1"),
    (Modifier::DIM, "2"),
    (Modifier::ITALIC, "3"),
    (Modifier::UNDERLINED, "4"),
    (Modifier::SLOW_BLINK, "5"),
    (Modifier::RAPID_BLINK, "6"),
    (Modifier::REVERSED, "7"),
    (Modifier::HIDDEN, "8"),
    (Modifier::CROSSED_OUT, "9"),
];

/// An SGR sequence that resets and then sets exactly this cell style.
fn sgr(fg: Color, bg: Color, modifier: Modifier) -> String {
    let mut codes = vec!["0".to_string()];
    for (flag, code) in MODIFIER_CODES {
        if modifier.contains(flag) {
            codes.push(code.to_string());
        }
    }
    push_color(&mut codes, fg, true);
    push_color(&mut codes, bg, false);
    format!("\x1b[{}m", codes.join(";"))
}

/// Serialise every row of `buf` into an SGR-styled string.
///
/// Each style change is written as a full reset-and-set sequence, so any
/// slice of a line carries its own style once prefixed with the last
/// sequence before it.
pub fn buffer_to_lines(buf: &Buffer) -> Vec<String> {
    let area = buf.area;
    let mut lines = Vec::with_capacity(area.height as usize);
    for y in area.top()..area.bottom() {
        let mut line = String::new();
        let mut current: Option<(Color, Color, Modifier)> = None;
        let mut covered = 0usize;
        for x in area.left()..area.right() {
            let Some(cell) = buf.cell((x, y)) else {
                continue;
            };
            if covered > 0 {
                covered -= 1;
                continue;
            }
            if cell.skip {
                continue;
            }
            let style = (cell.fg, cell.bg, cell.modifier);
            if current != Some(style) {
                line.push_str(&sgr(style.0, style.1, style.2));
                current = Some(style);
            }
            let symbol = cell.symbol();
            line.push_str(symbol);
            covered = unicode_width::UnicodeWidthStr::width(symbol).saturating_sub(1);
        }
        let _ = write!(line, "\x1b[0m");
        lines.push(line);
    }
    lines
}

/// Collects styled spans while parsing.
struct Styler {
    style: Style,
    text: String,
    spans: Vec<Span<'static>>,
}

impl Styler {
    fn flush(&mut self) {
        if !self.text.is_empty() {
            self.spans
                .push(Span::styled(std::mem::take(&mut self.text), self.style));
        }
    }

    fn apply_sgr(&mut self, params: &[u16]) {
        if params.is_empty() {
            self.style = Style::default();
            return;
        }
        let mut i = 0;
        while i < params.len() {
            match params[i] {
                0 => self.style = Style::default(),
                n @ 1..=9 => {
                    if let Some((flag, _)) = MODIFIER_CODES.get(n as usize - 1) {
                        self.style = self.style.add_modifier(*flag);
                    }
                }
                22 => self.style = self.style.remove_modifier(Modifier::BOLD | Modifier::DIM),
                23 => self.style = self.style.remove_modifier(Modifier::ITALIC),
                24 => self.style = self.style.remove_modifier(Modifier::UNDERLINED),
                27 => self.style = self.style.remove_modifier(Modifier::REVERSED),
                n @ (30..=37 | 90..=97) => self.style = self.style.fg(basic_color(n % 10, n >= 90)),
                39 => self.style = self.style.fg(Color::Reset),
                n @ (40..=47 | 100..=107) => {
                    self.style = self.style.bg(basic_color(n % 10, n >= 100))
                }
                49 => self.style = self.style.bg(Color::Reset),
                n @ (38 | 48) => {
                    let color = if params.get(i + 1) == Some(&5) && i + 2 < params.len() {
                        let c = Color::Indexed(params[i + 2] as u8);
                        i += 2;
                        Some(c)
                    } else if params.get(i + 1) == Some(&2) && i + 4 < params.len() {
                        let c = Color::Rgb(
                            params[i + 2] as u8,
                            params[i + 3] as u8,
                            params[i + 4] as u8,
                        );
                        i += 4;
                        Some(c)
                    } else {
                        None
                    };
                    if let Some(c) = color {
                        self.style = if n == 38 {
                            self.style.fg(c)
                        } else {
                            self.style.bg(c)
                        };
                    }
                }
                _ => {}
            }
            i += 1;
        }
    }
}

fn basic_color(index: u16, bright: bool) -> Color {
    match (index, bright) {
        (0, false) => Color::Black,
        (1, false) => Color::Red,
        (2, false) => Color::Green,
        (3, false) => Color::Yellow,
        (4, false) => Color::Blue,
        (5, false) => Color::Magenta,
        (6, false) => Color::Cyan,
        (7, false) => Color::Gray,
        (0, true) => Color::DarkGray,
        (1, true) => Color::LightRed,
        (2, true) => Color::LightGreen,
        (3, true) => Color::LightYellow,
        (4, true) => Color::LightBlue,
        (5, true) => Color::LightMagenta,
        (6, true) => Color::LightCyan,
        _ => Color::White,
    }
}

impl vte::Perform for Styler {
    fn print(&mut self, c: char) {
        self.text.push(c);
    }

    fn csi_dispatch(&mut self, params: &vte::Params, intermediates: &[u8], _ignore: bool, action: char) {
        if action != 'm' || !intermediates.is_empty() {
            return;
        }
        self.flush();
        let params: Vec<u16> = params.iter().flat_map(|sub| sub.iter().copied()).collect();
        self.apply_sgr(&params);
    }
}

/// Parse an SGR-styled string into a ratatui [`Line`].
pub fn to_line(s: &str) -> Line<'static> {
    let mut parser = vte::Parser::new();
    let mut styler = Styler {
        style: Style::default(),
        text: String::new(),
        spans: Vec::new(),
    };
    for &byte in s.as_bytes() {
        parser.advance(&mut styler, byte);
    }
    styler.flush();
    Line::from(styler.spans)
}
