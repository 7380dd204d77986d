//! Terminal palette for the search box.
//!
//! Muted backgrounds with a single accent, so matched title runs and the
//! selected row stand out.

use ratatui::style::{Color, Modifier, Style};

use crate::render::StockStatus;

pub mod colors {
    use ratatui::style::Color;

    // ═══════════════════════════════════════════════════════════════════════════
    // BASE COLORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deep background - primary canvas color
    pub const BG_DEEP: Color = Color::Rgb(26, 27, 38); // #1a1b26

    /// Elevated surface - the dropdown panel
    pub const BG_SURFACE: Color = Color::Rgb(36, 40, 59); // #24283b

    /// Selected row
    pub const BG_HIGHLIGHT: Color = Color::Rgb(41, 46, 66); // #292e42

    pub const BORDER: Color = Color::Rgb(59, 66, 97); // #3b4261
    pub const BORDER_FOCUS: Color = Color::Rgb(125, 145, 200); // #7d91c8

    // ═══════════════════════════════════════════════════════════════════════════
    // TEXT COLORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub const TEXT_PRIMARY: Color = Color::Rgb(192, 202, 245); // #c0caf5

    /// Muted text - hints, placeholders, manufacturer and EAN lines
    pub const TEXT_MUTED: Color = Color::Rgb(105, 114, 158); // #696e9e

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCENT / STATUS COLORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub const ACCENT_PRIMARY: Color = Color::Rgb(122, 162, 247); // #7aa2f7
    pub const ACCENT_SECONDARY: Color = Color::Rgb(187, 154, 247); // #bb9af7

    pub const STATUS_SUCCESS: Color = Color::Rgb(115, 218, 202); // #73daca
    pub const STATUS_ERROR: Color = Color::Rgb(247, 118, 142); // #f7768e
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemePalette {
    pub accent: Color,
    pub accent_alt: Color,
    pub bg: Color,
    pub fg: Color,
    pub surface: Color,
    pub hint: Color,
    pub border: Color,
}

impl ThemePalette {
    /// Light theme - for light terminal backgrounds
    pub fn light() -> Self {
        Self {
            accent: Color::Rgb(47, 107, 231),     // Rich blue
            accent_alt: Color::Rgb(124, 93, 198), // Purple
            bg: Color::Rgb(250, 250, 252),        // Off-white
            fg: Color::Rgb(36, 41, 46),           // Near-black
            surface: Color::Rgb(240, 241, 245),   // Light gray
            hint: Color::Rgb(125, 134, 144),      // Medium gray
            border: Color::Rgb(216, 222, 228),    // Border gray
        }
    }

    pub fn dark() -> Self {
        Self {
            accent: colors::ACCENT_PRIMARY,
            accent_alt: colors::ACCENT_SECONDARY,
            bg: colors::BG_DEEP,
            fg: colors::TEXT_PRIMARY,
            surface: colors::BG_SURFACE,
            hint: colors::TEXT_MUTED,
            border: colors::BORDER,
        }
    }

    pub fn toggled(self) -> Self {
        if self == Self::dark() {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Title style - accent colored with bold modifier
    pub fn title(self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn text_style(self) -> Style {
        Style::default().fg(self.fg)
    }

    /// Hint text style - for secondary/muted information
    pub fn hint_style(self) -> Style {
        Style::default().fg(self.hint)
    }

    pub fn border_style(self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focus_style(self) -> Style {
        Style::default().fg(colors::BORDER_FOCUS)
    }

    /// Matched runs of a result title.
    pub fn highlight_style(self) -> Style {
        Style::default()
            .fg(self.bg)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(self) -> Style {
        Style::default()
            .bg(colors::BG_HIGHLIGHT)
            .add_modifier(Modifier::BOLD)
    }
}

/// Keyboard shortcut style (for help text and the footer)
pub fn kbd_style(palette: ThemePalette) -> Style {
    Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::BOLD)
}

/// Regular price, or the discounted price when a sale is on.
pub fn price_style(palette: ThemePalette) -> Style {
    Style::default()
        .fg(palette.accent_alt)
        .add_modifier(Modifier::BOLD)
}

/// The struck-through regular price next to a discounted one.
pub fn old_price_style(palette: ThemePalette) -> Style {
    Style::default()
        .fg(palette.hint)
        .add_modifier(Modifier::CROSSED_OUT)
}

pub fn stock_style(status: StockStatus) -> Style {
    match status {
        StockStatus::InStock => Style::default().fg(colors::STATUS_SUCCESS),
        StockStatus::OutOfStock => Style::default().fg(colors::STATUS_ERROR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggled_flips_between_presets() {
        let dark = ThemePalette::dark();
        assert_eq!(dark.toggled(), ThemePalette::light());
        assert_eq!(dark.toggled().toggled(), dark);
    }

    #[test]
    fn stock_styles_differ() {
        assert_ne!(
            stock_style(StockStatus::InStock),
            stock_style(StockStatus::OutOfStock)
        );
    }
}
