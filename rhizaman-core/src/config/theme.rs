use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ThemeConfig {
    /// Titles, cursor highlight and prompt borders (default: "magenta").
    #[serde(default = "ThemeConfig::default_accent", deserialize_with = "deserialize_color")]
    pub accent: ThemeColor,
    /// Success messages and the commit message preview (default: "green").
    #[serde(default = "ThemeConfig::default_success", deserialize_with = "deserialize_color")]
    pub success: ThemeColor,
    /// Error messages and failed rows (default: "red").
    #[serde(default = "ThemeConfig::default_error", deserialize_with = "deserialize_color")]
    pub error: ThemeColor,
    /// Status columns and borders (default: "gray").
    #[serde(default = "ThemeConfig::default_muted", deserialize_with = "deserialize_color")]
    pub muted: ThemeColor,
    /// Key hints in the help line (default: "blue").
    #[serde(default = "ThemeConfig::default_hint", deserialize_with = "deserialize_color")]
    pub hint: ThemeColor,
    /// Text on the highlighted cursor row (default: "black").
    #[serde(default = "ThemeConfig::default_highlight_fg", deserialize_with = "deserialize_color")]
    pub highlight_fg: ThemeColor,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            accent: Self::default_accent(),
            success: Self::default_success(),
            error: Self::default_error(),
            muted: Self::default_muted(),
            hint: Self::default_hint(),
            highlight_fg: Self::default_highlight_fg(),
        }
    }
}

impl ThemeConfig {
    fn default_accent() -> ThemeColor {
        ThemeColor::Named(NamedColor::Magenta)
    }
    fn default_success() -> ThemeColor {
        ThemeColor::Named(NamedColor::Green)
    }
    fn default_error() -> ThemeColor {
        ThemeColor::Named(NamedColor::Red)
    }
    fn default_muted() -> ThemeColor {
        ThemeColor::Named(NamedColor::Gray)
    }
    fn default_hint() -> ThemeColor {
        ThemeColor::Named(NamedColor::Blue)
    }
    fn default_highlight_fg() -> ThemeColor {
        ThemeColor::Named(NamedColor::Black)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeColor {
    Named(NamedColor),
    Rgb(u8, u8, u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    DarkGray,
}

const NAMED_COLORS: &[(&str, NamedColor)] = &[
    ("black", NamedColor::Black),
    ("blue", NamedColor::Blue),
    ("cyan", NamedColor::Cyan),
    ("darkgray", NamedColor::DarkGray),
    ("gray", NamedColor::Gray),
    ("green", NamedColor::Green),
    ("magenta", NamedColor::Magenta),
    ("red", NamedColor::Red),
    ("white", NamedColor::White),
    ("yellow", NamedColor::Yellow),
];

impl std::fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Named(named) => {
                let name = NAMED_COLORS
                    .iter()
                    .find(|(_, c)| c == named)
                    .map_or("?", |(n, _)| n);
                f.write_str(name)
            }
            Self::Rgb(r, g, b) => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

impl Serialize for ThemeColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl ThemeColor {
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(hex) = s.strip_prefix('#')
            && hex.len() == 6
        {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            return Some(Self::Rgb(r, g, b));
        }
        let lower = s.to_lowercase().replace(['_', '-'], "");
        let lookup = match lower.as_str() {
            "grey" => "gray",
            "darkgrey" => "darkgray",
            other => other,
        };
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == lookup)
            .map(|(_, color)| Self::Named(*color))
    }
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<ThemeColor, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ThemeColor::parse(&s).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "invalid color '{s}': expected a named color or hex (#rrggbb)"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_color_parse() {
        assert_eq!(ThemeColor::parse("RED"), Some(ThemeColor::Named(NamedColor::Red)));
        assert_eq!(ThemeColor::parse("grey"), Some(ThemeColor::Named(NamedColor::Gray)));
        assert_eq!(ThemeColor::parse("dark_gray"), Some(ThemeColor::Named(NamedColor::DarkGray)));
        assert_eq!(ThemeColor::parse("#7d56f4"), Some(ThemeColor::Rgb(0x7d, 0x56, 0xf4)));
        assert_eq!(ThemeColor::parse("#fff"), None);
        assert_eq!(ThemeColor::parse("notacolor"), None);
    }

    #[test]
    fn test_theme_color_display_round_trips() {
        for raw in ["magenta", "#a0a0a0", "darkgray"] {
            assert_eq!(ThemeColor::parse(raw).unwrap().to_string(), raw);
        }
    }

    #[test]
    fn test_highlight_fg_key() {
        let theme: ThemeConfig = toml::from_str("highlight_fg = \"white\"").unwrap();
        assert_eq!(theme.highlight_fg, ThemeColor::Named(NamedColor::White));
        assert_eq!(theme.accent, ThemeColor::Named(NamedColor::Magenta));

        let theme: ThemeConfig = toml::from_str("").unwrap();
        assert_eq!(theme.highlight_fg, ThemeColor::Named(NamedColor::Black));
    }
}
