use std::collections::HashSet;

use ratatui::style::Color;

use super::ThemeName;

#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    names: HashSet<ThemeName>,
}

impl ThemeRegistry {
    pub fn contains(&self, theme: &ThemeName) -> bool {
        self.names.contains(theme)
    }

    pub fn all(&self) -> impl Iterator<Item = &ThemeName> {
        self.names.iter()
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        let names = [ThemeName::Dark, ThemeName::Light, ThemeName::HighContrast]
            .into_iter()
            .collect();
        Self { names }
    }
}

/// Accent color used for focus borders, badges, and highlights.
pub fn accent_color(theme: &ThemeName) -> Color {
    match theme {
        ThemeName::Dark => Color::Cyan,
        ThemeName::Light => Color::Blue,
        ThemeName::HighContrast => Color::Yellow,
    }
}
