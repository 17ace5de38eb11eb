use std::str::FromStr;

use ratatui::style::{Color, Modifier, Style};

/// Colors for the payload view in the details pane.
#[derive(Clone, Copy)]
pub struct JsonStyle {
    pub key: Color,
    pub string: Color,
    pub number: Color,
    pub boolean: Color,
}

/// Complete theme configuration for ratatui
#[derive(Clone)]
pub struct ThemeConfig {
    pub list_normal: Style,
    pub list_selected: Style,
    pub border: Style,
    pub border_selected: Style,
    pub title: Style,
    pub text: Style,
    /// Download-queue and expand markers in the tree.
    pub accent: Style,
    pub error: Style,
    pub json_style: JsonStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dracula,
    Solarized,
    Gruvbox,
    EverforestLight,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dracula" => Ok(Theme::Dracula),
            "solarized" | "solarized_dark" => Ok(Theme::Solarized),
            "gruvbox" => Ok(Theme::Gruvbox),
            "everforest_light" | "everforest" => Ok(Theme::EverforestLight),
            other => Err(format!(
                "Unknown theme '{}' (expected dracula, solarized, gruvbox, everforest_light)",
                other
            )),
        }
    }
}

impl Theme {
    pub fn config(self) -> ThemeConfig {
        match self {
            Theme::Dracula => dracula_theme(),
            Theme::Solarized => solarized_dark(),
            Theme::Gruvbox => gruvbox_theme(),
            Theme::EverforestLight => everforest_light_theme(),
        }
    }
}

/// Palette slots shared by every theme.
struct Palette {
    bg: Color,
    panel: Color,
    fg: Color,
    muted: Color,
    highlight: Color,
    selection_fg: Color,
    selection_bg: Color,
    accent: Color,
    error: Color,
    json_style: JsonStyle,
}

fn build(p: Palette) -> ThemeConfig {
    ThemeConfig {
        list_normal: Style::default().fg(p.fg).bg(p.panel),
        list_selected: Style::default()
            .fg(p.selection_fg)
            .bg(p.selection_bg)
            .add_modifier(Modifier::BOLD),
        border: Style::default().fg(p.muted),
        border_selected: Style::default().fg(p.highlight),
        title: Style::default().fg(p.highlight).add_modifier(Modifier::BOLD),
        text: Style::default().fg(p.fg).bg(p.bg),
        accent: Style::default().fg(p.accent),
        error: Style::default().fg(p.error).add_modifier(Modifier::BOLD),
        json_style: p.json_style,
    }
}

/// Returns a ThemeConfig based on the Solarized Dark color palette.
pub fn solarized_dark() -> ThemeConfig {
    let blue = Color::Rgb(38, 139, 210);
    build(Palette {
        bg: Color::Rgb(0, 43, 54),
        panel: Color::Rgb(7, 54, 66),
        fg: Color::Rgb(131, 148, 150),
        muted: Color::Rgb(88, 110, 117),
        highlight: blue,
        selection_fg: Color::Rgb(253, 246, 227),
        selection_bg: blue,
        accent: Color::Rgb(181, 137, 0),
        error: Color::Rgb(220, 50, 47),
        json_style: JsonStyle {
            key: Color::Rgb(42, 161, 152),
            string: Color::Rgb(133, 153, 0),
            number: Color::Rgb(211, 54, 130),
            boolean: Color::Rgb(203, 75, 22),
        },
    })
}

/// Returns a ThemeConfig based on the Dracula color palette.
pub fn dracula_theme() -> ThemeConfig {
    let bg = Color::Rgb(40, 42, 54);
    let fg = Color::Rgb(248, 248, 242);
    build(Palette {
        bg,
        panel: bg,
        fg,
        muted: Color::Rgb(98, 114, 164),
        highlight: Color::Rgb(189, 147, 249),
        selection_fg: fg,
        selection_bg: Color::Rgb(68, 71, 90),
        accent: Color::Rgb(80, 250, 123),
        error: Color::Rgb(255, 85, 85),
        json_style: JsonStyle {
            key: Color::Rgb(139, 233, 253),
            string: Color::Rgb(241, 250, 140),
            number: Color::Rgb(255, 184, 108),
            boolean: Color::Rgb(255, 121, 198),
        },
    })
}

/// Returns a ThemeConfig based on the Gruvbox Dark color palette.
pub fn gruvbox_theme() -> ThemeConfig {
    let bg0 = Color::Rgb(40, 40, 40);
    let fg1 = Color::Rgb(235, 219, 178);
    build(Palette {
        bg: bg0,
        panel: bg0,
        fg: fg1,
        muted: Color::Rgb(146, 131, 116),
        highlight: Color::Rgb(214, 93, 14),
        selection_fg: bg0,
        selection_bg: fg1,
        accent: Color::Rgb(215, 153, 33),
        error: Color::Rgb(204, 36, 29),
        json_style: JsonStyle {
            key: Color::Rgb(69, 133, 136),
            string: Color::Rgb(152, 151, 26),
            number: Color::Rgb(177, 98, 134),
            boolean: Color::Rgb(214, 93, 14),
        },
    })
}

/// Returns a ThemeConfig based on the Everforest Light color palette.
pub fn everforest_light_theme() -> ThemeConfig {
    let bg = Color::Rgb(253, 246, 227);
    let gray = Color::Rgb(147, 159, 149);
    build(Palette {
        bg,
        panel: Color::Rgb(243, 234, 211),
        fg: Color::Rgb(92, 106, 114),
        muted: gray,
        highlight: Color::Rgb(223, 160, 0),
        selection_fg: bg,
        selection_bg: gray,
        accent: Color::Rgb(53, 167, 124),
        error: Color::Rgb(248, 85, 82),
        json_style: JsonStyle {
            key: Color::Rgb(58, 148, 197),
            string: Color::Rgb(141, 161, 1),
            number: Color::Rgb(248, 85, 82),
            boolean: Color::Rgb(223, 105, 186),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_from_str() {
        assert_eq!(Theme::from_str("Dracula"), Ok(Theme::Dracula));
        assert_eq!(Theme::from_str("everforest"), Ok(Theme::EverforestLight));
        assert!(Theme::from_str("neon").is_err());
    }
}
