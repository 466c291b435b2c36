//! Hex color codec used by the color editor.
//!
//! Colors are edited as two independent parts: the RGB swatch and an
//! opacity percentage. Recomposed colors are always written as lowercase
//! 8-digit `#rrggbbaa`.

use crate::error::ColorError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const WHITE: Rgba8 = Rgba8::opaque(255, 255, 255);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// `#rrggbbaa`, lowercase.
    pub fn to_hex8(&self) -> String {
        format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }

    /// The swatch part, `#rrggbb`.
    pub fn rgb_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn opacity_percent(&self) -> f64 {
        self.a as f64 / 255.0 * 100.0
    }

    /// Opacity percentages are clamped to 0..=100 and rounded to the
    /// nearest alpha byte.
    pub fn with_opacity_percent(self, percent: f64) -> Self {
        Self {
            a: percent_to_alpha(percent),
            ..self
        }
    }

    /// Keep this color's alpha, take the RGB channels of `rgb`.
    pub fn with_rgb(self, rgb: Rgba8) -> Self {
        Self {
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
            a: self.a,
        }
    }
}

pub fn percent_to_alpha(percent: f64) -> u8 {
    let clamped = if percent.is_nan() { 100.0 } else { percent.clamp(0.0, 100.0) };
    (clamped / 100.0 * 255.0).round() as u8
}

impl fmt::Display for Rgba8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex8())
    }
}

impl FromStr for Rgba8 {
    type Err = ColorError;

    /// Accepts `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa`, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHash(s.to_string()))?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidDigit(s.to_string()));
        }

        let channels: Vec<u8> = match digits.len() {
            3 | 4 => digits
                .chars()
                .map(|c| {
                    let v = c.to_digit(16).unwrap_or(0) as u8;
                    v * 17
                })
                .collect(),
            6 | 8 => (0..digits.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(&digits[i..i + 2], 16))
                .collect::<Result<_, _>>()
                .map_err(|_| ColorError::InvalidDigit(s.to_string()))?,
            _ => return Err(ColorError::InvalidLength(s.to_string())),
        };

        Ok(Self {
            r: channels[0],
            g: channels[1],
            b: channels[2],
            a: channels.get(3).copied().unwrap_or(255),
        })
    }
}

/// Replace the alpha of `color`, keeping its RGB.
pub fn color_with_new_opacity(color: &str, alpha: u8) -> Result<String, ColorError> {
    let parsed: Rgba8 = color.parse()?;
    Ok(Rgba8 { a: alpha, ..parsed }.to_hex8())
}
