//! Theme configuration.
//!
//! Colors are loaded from an optional `crude.toml` and handed to the renderers
//! explicitly; nothing reads configuration through a global. A missing file or
//! a missing key falls back to the built-in palette, but a present-and-broken
//! value is a hard configuration error.
//!
//! ```toml
//! [theme]
//! text = "#e2e8f0"
//! primary = "#615fff"
//! background = "#1d293d"
//! secondary_background = "#0f172b"
//! accent1 = "#f4f754"
//! accent2 = "#cd2c58"
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::AppError;

/// A terminal-friendly RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (leading `#` optional, case-insensitive).
    pub fn from_hex(raw: &str) -> Option<Rgb> {
        let hex = raw.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Rgb::new(r, g, b))
    }

    pub fn to_tui(self) -> ratatui::style::Color {
        ratatui::style::Color::Rgb(self.r, self.g, self.b)
    }

    pub fn to_plotters(self) -> plotters::style::RGBColor {
        plotters::style::RGBColor(self.r, self.g, self.b)
    }
}

/// Resolved dashboard palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub text: Rgb,
    pub primary: Rgb,
    pub background: Rgb,
    pub secondary_background: Rgb,
    pub accent1: Rgb,
    pub accent2: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            text: Rgb::new(0xe2, 0xe8, 0xf0),
            primary: Rgb::new(0x61, 0x5f, 0xff),
            background: Rgb::new(0x1d, 0x29, 0x3d),
            secondary_background: Rgb::new(0x0f, 0x17, 0x2b),
            accent1: Rgb::new(0xf4, 0xf7, 0x54),
            accent2: Rgb::new(0xcd, 0x2c, 0x58),
        }
    }
}

impl Theme {
    /// Load from a TOML file; a missing file yields the default palette.
    pub fn load(path: &Path) -> Result<Theme, AppError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Theme::default()),
            Err(e) => {
                return Err(AppError::new(
                    2,
                    format!("Failed to read config '{}': {e}", path.display()),
                ));
            }
        };
        Theme::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Theme, AppError> {
        let file: ConfigFile = toml::from_str(text)
            .map_err(|e| AppError::new(2, format!("Invalid config file: {e}")))?;

        let defaults = Theme::default();
        let section = file.theme;
        Ok(Theme {
            text: resolve(section.text, defaults.text, "theme.text")?,
            primary: resolve(section.primary, defaults.primary, "theme.primary")?,
            background: resolve(section.background, defaults.background, "theme.background")?,
            secondary_background: resolve(
                section.secondary_background,
                defaults.secondary_background,
                "theme.secondary_background",
            )?,
            accent1: resolve(section.accent1, defaults.accent1, "theme.accent1")?,
            accent2: resolve(section.accent2, defaults.accent2, "theme.accent2")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    theme: ThemeSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThemeSection {
    text: Option<String>,
    primary: Option<String>,
    background: Option<String>,
    secondary_background: Option<String>,
    accent1: Option<String>,
    accent2: Option<String>,
}

fn resolve(raw: Option<String>, default: Rgb, key: &str) -> Result<Rgb, AppError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    Rgb::from_hex(&raw)
        .ok_or_else(|| AppError::new(2, format!("Invalid color '{raw}' for {key} (expected #rrggbb).")))
}
