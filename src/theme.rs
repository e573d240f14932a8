use crate::ui::ToastLevel;
use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Debug)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub frame: Color,
    pub selected: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
}

impl Theme {
    pub fn synthwave_dark() -> Self {
        Self {
            bg: Color::Rgb(24, 24, 26),
            fg: Color::White,
            primary: Color::Rgb(255, 0, 153),
            secondary: Color::Rgb(0, 255, 255),
            accent: Color::Rgb(64, 160, 255),
            frame: Color::Rgb(90, 90, 100),
            selected: Color::Rgb(255, 120, 0),
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            muted: Color::DarkGray,
        }
    }

    pub fn synthwave_light() -> Self {
        Self {
            bg: Color::Rgb(245, 245, 247),
            fg: Color::Rgb(20, 20, 22),
            primary: Color::Rgb(200, 0, 120),
            secondary: Color::Rgb(0, 160, 160),
            accent: Color::Rgb(40, 120, 220),
            frame: Color::Rgb(200, 200, 210),
            selected: Color::Rgb(220, 100, 0),
            success: Color::Rgb(0, 150, 0),
            warning: Color::Rgb(190, 140, 0),
            error: Color::Rgb(200, 0, 0),
            muted: Color::Rgb(120, 120, 130),
        }
    }

    /// `light` selects the light palette; anything else is dark.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some(n) if n.eq_ignore_ascii_case("light") => Self::synthwave_light(),
            _ => Self::synthwave_dark(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::synthwave_dark()
    }
}

impl Theme {
    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.selected)
    }

    pub fn border_unfocused(&self) -> Style {
        Style::default().fg(self.frame)
    }

    pub fn text_active_bold(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_editing_bold(&self) -> Style {
        Style::default()
            .fg(self.selected)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn list_cursor_style(&self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.selected)
            .add_modifier(Modifier::BOLD)
    }

    pub fn base_style(&self) -> Style {
        Style::default().bg(self.bg).fg(self.fg)
    }

    pub fn toast_color(&self, level: ToastLevel) -> Color {
        match level {
            ToastLevel::Success => self.success,
            ToastLevel::Error => self.error,
            ToastLevel::Info => self.accent,
        }
    }

    pub fn method_color(&self, method: &str) -> Color {
        match method {
            "GET" => self.success,
            "POST" => self.accent,
            "PUT" | "PATCH" => self.warning,
            "DELETE" => self.error,
            _ => self.secondary,
        }
    }

    /// Colour by status class: the leading digit of e.g. `"404 Not Found"`.
    pub fn status_style(&self, status: &str) -> Style {
        let color = match status.trim_start().chars().next() {
            Some('2') => self.success,
            Some('3') => self.accent,
            Some('4') => self.warning,
            Some('5') => self.error,
            _ => self.muted,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}
