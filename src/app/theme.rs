//! UI 主题：把可配置的颜色集中管理，避免散落在渲染代码里。

use crate::kernel::markdown::InlineKind;
use crate::kernel::services::ports::ThemeSettings;
use crate::kernel::syntax::HighlightKind;
use crate::views::DocSpanKind;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct UiTheme {
    pub focus_border: Color,
    pub inactive_border: Color,
    pub accent_fg: Color,
    pub header_fg: Color,
    pub error_fg: Color,
    pub muted_fg: Color,
    pub nav_active_bg: Color,
    pub nav_selected_bg: Color,
    pub heading_fg: Color,
    pub link_fg: Color,
    pub code_fg: Color,
    pub quote_fg: Color,
    pub diagram_fg: Color,
    pub syntax_comment_fg: Color,
    pub syntax_keyword_fg: Color,
    pub syntax_string_fg: Color,
    pub syntax_number_fg: Color,
    pub syntax_type_fg: Color,
    pub syntax_attribute_fg: Color,
    pub syntax_function_fg: Color,
    pub syntax_constant_fg: Color,
    pub syntax_property_fg: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalColorSupport {
    TrueColor,
    Ansi256,
    Ansi16,
}

pub fn detect_terminal_color_support() -> TerminalColorSupport {
    if let Ok(value) = std::env::var("ZDOC_COLOR_SUPPORT") {
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "truecolor" | "24bit" | "rgb" => return TerminalColorSupport::TrueColor,
            "256" | "ansi256" => return TerminalColorSupport::Ansi256,
            "16" | "ansi16" | "basic" => return TerminalColorSupport::Ansi16,
            _ => {}
        }
    }

    let colorterm = std::env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    let term = std::env::var("TERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor")
        || colorterm.contains("24bit")
        || term.contains("truecolor")
        || term.contains("24bit")
    {
        return TerminalColorSupport::TrueColor;
    }

    if term.contains("256color") {
        return TerminalColorSupport::Ansi256;
    }

    TerminalColorSupport::Ansi16
}

impl Default for UiTheme {
    fn default() -> Self {
        Self {
            focus_border: Color::Indexed(6),    // Cyan
            inactive_border: Color::Indexed(8), // DarkGray
            accent_fg: Color::Indexed(3),
            header_fg: Color::Indexed(6),
            error_fg: Color::Indexed(9),
            muted_fg: Color::Indexed(8),
            nav_active_bg: Color::Indexed(8),
            nav_selected_bg: Color::Indexed(4),
            heading_fg: Color::Indexed(14),
            link_fg: Color::Indexed(12),
            code_fg: Color::Indexed(11),
            quote_fg: Color::Indexed(7),
            diagram_fg: Color::Indexed(10),
            syntax_comment_fg: Color::Rgb(0x6A, 0x99, 0x55),
            syntax_keyword_fg: Color::Rgb(0x56, 0x9C, 0xD6),
            syntax_string_fg: Color::Rgb(0xCE, 0x91, 0x78),
            syntax_number_fg: Color::Rgb(0xB5, 0xCE, 0xA8),
            syntax_type_fg: Color::Rgb(0x4E, 0xC9, 0xB0),
            syntax_attribute_fg: Color::Rgb(0x4E, 0xC9, 0xB0),
            syntax_function_fg: Color::Rgb(0xDC, 0xDC, 0xAA),
            syntax_constant_fg: Color::Rgb(0x4F, 0xC1, 0xFF),
            syntax_property_fg: Color::Rgb(0x9C, 0xDC, 0xFE),
        }
    }
}

impl UiTheme {
    pub fn from_settings(settings: &ThemeSettings) -> Self {
        let mut theme = Self::default();
        theme.apply_settings(settings);
        theme.adapt_to_terminal_capabilities();
        theme
    }

    pub fn adapt_to_terminal_capabilities(&mut self) {
        self.apply_color_support(detect_terminal_color_support());
    }

    fn apply_color_support(&mut self, support: TerminalColorSupport) {
        if support == TerminalColorSupport::TrueColor {
            return;
        }

        for color in [
            &mut self.focus_border,
            &mut self.inactive_border,
            &mut self.accent_fg,
            &mut self.header_fg,
            &mut self.error_fg,
            &mut self.muted_fg,
            &mut self.nav_active_bg,
            &mut self.nav_selected_bg,
            &mut self.heading_fg,
            &mut self.link_fg,
            &mut self.code_fg,
            &mut self.quote_fg,
            &mut self.diagram_fg,
        ] {
            *color = map_color_for_support(*color, support);
        }

        self.syntax_comment_fg = syntax_fallback_color(support, 65, 2);
        self.syntax_keyword_fg = syntax_fallback_color(support, 33, 4);
        self.syntax_string_fg = syntax_fallback_color(support, 173, 3);
        self.syntax_number_fg = syntax_fallback_color(support, 151, 10);
        self.syntax_type_fg = syntax_fallback_color(support, 43, 6);
        self.syntax_attribute_fg = syntax_fallback_color(support, 43, 6);
        self.syntax_function_fg = syntax_fallback_color(support, 187, 11);
        self.syntax_constant_fg = syntax_fallback_color(support, 39, 12);
        self.syntax_property_fg = syntax_fallback_color(support, 153, 14);
    }

    /// Overrides colors named in `settings`; unparseable values are ignored.
    pub fn apply_settings(&mut self, settings: &ThemeSettings) {
        apply(&mut self.focus_border, &settings.focus_border);
        apply(&mut self.inactive_border, &settings.inactive_border);
        apply(&mut self.accent_fg, &settings.accent_fg);
        apply(&mut self.header_fg, &settings.header_fg);
        apply(&mut self.error_fg, &settings.error_fg);
        apply(&mut self.nav_active_bg, &settings.nav_active_bg);
        apply(&mut self.heading_fg, &settings.heading_fg);
        apply(&mut self.link_fg, &settings.link_fg);
        apply(&mut self.code_fg, &settings.code_fg);
        apply(&mut self.quote_fg, &settings.quote_fg);
        apply(&mut self.diagram_fg, &settings.diagram_fg);
    }

    pub fn border(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.focus_border
        } else {
            self.inactive_border
        })
    }

    pub fn style_for(&self, kind: DocSpanKind) -> Style {
        match kind {
            DocSpanKind::Syntax(kind) => Style::default().fg(self.syntax_fg(kind)),
            DocSpanKind::Inline(kind) => self.inline_style(kind),
            // Level 1 is the strongest; deeper levels fade.
            DocSpanKind::Heading(level) => match level {
                1 => Style::default()
                    .fg(self.heading_fg)
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                2 => Style::default()
                    .fg(self.heading_fg)
                    .add_modifier(Modifier::BOLD),
                3 => Style::default().fg(self.accent_fg).add_modifier(Modifier::BOLD),
                _ => Style::default().fg(self.accent_fg),
            },
            DocSpanKind::QuoteBar => Style::default().fg(self.inactive_border),
            DocSpanKind::Quote => Style::default()
                .fg(self.quote_fg)
                .add_modifier(Modifier::ITALIC),
            DocSpanKind::ListMarker => Style::default().fg(self.accent_fg),
            DocSpanKind::TaskDone => Style::default().add_modifier(Modifier::CROSSED_OUT),
            DocSpanKind::TableBorder | DocSpanKind::CodeBorder | DocSpanKind::Rule => {
                Style::default().fg(self.inactive_border)
            }
            DocSpanKind::TableHeader => Style::default().add_modifier(Modifier::BOLD),
            DocSpanKind::Code => Style::default().fg(self.code_fg),
            DocSpanKind::DiagramPending => Style::default()
                .fg(self.muted_fg)
                .add_modifier(Modifier::ITALIC),
            DocSpanKind::Diagram => Style::default().fg(self.diagram_fg),
            DocSpanKind::DiagramError => Style::default()
                .fg(self.error_fg)
                .add_modifier(Modifier::BOLD),
            DocSpanKind::Raw => Style::default().fg(self.muted_fg),
        }
    }

    fn inline_style(&self, kind: InlineKind) -> Style {
        match kind {
            InlineKind::Bold => Style::default().add_modifier(Modifier::BOLD),
            InlineKind::Italic => Style::default().add_modifier(Modifier::ITALIC),
            InlineKind::Strike => Style::default().add_modifier(Modifier::CROSSED_OUT),
            InlineKind::Code => Style::default().fg(self.code_fg),
            InlineKind::Link => Style::default()
                .fg(self.link_fg)
                .add_modifier(Modifier::UNDERLINED),
            InlineKind::Image => Style::default()
                .fg(self.link_fg)
                .add_modifier(Modifier::ITALIC),
        }
    }

    fn syntax_fg(&self, kind: HighlightKind) -> Color {
        match kind {
            HighlightKind::Comment => self.syntax_comment_fg,
            HighlightKind::String => self.syntax_string_fg,
            HighlightKind::Keyword | HighlightKind::Tag => self.syntax_keyword_fg,
            HighlightKind::Type => self.syntax_type_fg,
            HighlightKind::Number => self.syntax_number_fg,
            HighlightKind::Constant => self.syntax_constant_fg,
            HighlightKind::Function | HighlightKind::Macro => self.syntax_function_fg,
            HighlightKind::Attribute => self.syntax_attribute_fg,
            HighlightKind::Property => self.syntax_property_fg,
        }
    }
}

fn apply(slot: &mut Color, value: &Option<String>) {
    if let Some(c) = value.as_deref().and_then(parse_color) {
        *slot = c;
    }
}

fn map_color_for_support(color: Color, support: TerminalColorSupport) -> Color {
    match (support, color) {
        (TerminalColorSupport::TrueColor, value) => value,
        (TerminalColorSupport::Ansi256, Color::Rgb(r, g, b)) => {
            Color::Indexed(rgb_to_ansi256_index(r, g, b))
        }
        (TerminalColorSupport::Ansi16, Color::Rgb(r, g, b)) => {
            Color::Indexed(rgb_to_ansi16_index(r, g, b))
        }
        (TerminalColorSupport::Ansi16, Color::Indexed(i)) if i > 15 => {
            let (r, g, b) = ansi256_index_to_rgb(i);
            Color::Indexed(rgb_to_ansi16_index(r, g, b))
        }
        (_, value) => value,
    }
}

fn syntax_fallback_color(
    support: TerminalColorSupport,
    ansi256_index: u8,
    ansi16_index: u8,
) -> Color {
    match support {
        TerminalColorSupport::Ansi16 => Color::Indexed(ansi16_index),
        TerminalColorSupport::Ansi256 | TerminalColorSupport::TrueColor => {
            Color::Indexed(ansi256_index)
        }
    }
}

fn rgb_to_ansi256_index(r: u8, g: u8, b: u8) -> u8 {
    (0u8..=255)
        .min_by_key(|&i| {
            let (pr, pg, pb) = ansi256_index_to_rgb(i);
            color_distance_sq((r, g, b), (pr, pg, pb))
        })
        .unwrap_or(0)
}

fn rgb_to_ansi16_index(r: u8, g: u8, b: u8) -> u8 {
    ANSI16_RGB
        .iter()
        .enumerate()
        .min_by_key(|(_, rgb)| color_distance_sq((r, g, b), **rgb))
        .map_or(0, |(i, _)| i as u8)
}

fn ansi256_index_to_rgb(index: u8) -> (u8, u8, u8) {
    if index <= 15 {
        return ANSI16_RGB[index as usize];
    }

    if (16..=231).contains(&index) {
        let level = [0u8, 95, 135, 175, 215, 255];
        let offset = index - 16;
        let r = level[(offset / 36) as usize];
        let g = level[((offset / 6) % 6) as usize];
        let b = level[(offset % 6) as usize];
        return (r, g, b);
    }

    let gray = 8u8.saturating_add((index - 232).saturating_mul(10));
    (gray, gray, gray)
}

fn color_distance_sq(a: (u8, u8, u8), b: (u8, u8, u8)) -> u32 {
    let dr = i32::from(a.0) - i32::from(b.0);
    let dg = i32::from(a.1) - i32::from(b.1);
    let db = i32::from(a.2) - i32::from(b.2);
    (dr * dr + dg * dg + db * db) as u32
}

const ANSI16_RGB: [(u8, u8, u8); 16] = [
    (0, 0, 0),
    (205, 0, 0),
    (0, 205, 0),
    (205, 205, 0),
    (0, 0, 238),
    (205, 0, 205),
    (0, 205, 205),
    (229, 229, 229),
    (127, 127, 127),
    (255, 0, 0),
    (0, 255, 0),
    (255, 255, 0),
    (92, 92, 255),
    (255, 0, 255),
    (0, 255, 255),
    (255, 255, 255),
];

pub fn parse_color(value: &str) -> Option<Color> {
    let v = value.trim();
    if v.is_empty() {
        return None;
    }

    if let Some(hex) = v.strip_prefix('#') {
        if hex.len() == 6 && hex.is_ascii() {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Color::Rgb(r, g, b));
        }
        return None;
    }

    let v = v.to_ascii_lowercase();
    let c = match v.as_str() {
        "reset" => Color::Reset,
        "black" => Color::Indexed(0),
        "red" => Color::Indexed(1),
        "green" => Color::Indexed(2),
        "yellow" => Color::Indexed(3),
        "blue" => Color::Indexed(4),
        "magenta" => Color::Indexed(5),
        "cyan" => Color::Indexed(6),
        "gray" | "grey" => Color::Indexed(7),
        "dark_gray" | "darkgrey" => Color::Indexed(8),
        "white" => Color::Indexed(15),
        "light_red" => Color::Indexed(9),
        "light_green" => Color::Indexed(10),
        "light_yellow" => Color::Indexed(11),
        "light_blue" => Color::Indexed(12),
        "light_magenta" => Color::Indexed(13),
        "light_cyan" => Color::Indexed(14),
        _ => return None,
    };

    Some(c)
}

#[cfg(test)]
#[path = "../../tests/unit/app/theme.rs"]
mod tests;
