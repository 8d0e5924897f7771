//! RGB and HSV color types and the conversions between them.
//!
//! HSV follows the usual max/min channel formulation with hue in degrees
//! `[0, 360)` and saturation/value as percentages `[0, 100]`. Gray input
//! has no defined hue; it is reported as `0`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An 8-bit RGB color. Serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Build from floating channel values, clamping to `[0, 255]` and
    /// truncating the fractional part.
    pub fn from_f32(r: f32, g: f32, b: f32) -> Self {
        Self::new(clamp_channel(r), clamp_channel(g), clamp_channel(b))
    }

    /// Per-channel mean of two colors, truncated.
    pub fn average(a: Rgb, b: Rgb) -> Rgb {
        let mean = |x: u8, y: u8| ((x as u16 + y as u16) / 2) as u8;
        Rgb::new(mean(a.r, b.r), mean(a.g, b.g), mean(a.b, b.b))
    }

    /// Euclidean distance in RGB space.
    pub fn distance(&self, other: &Rgb) -> f32 {
        let dr = self.r as f32 - other.r as f32;
        let dg = self.g as f32 - other.g as f32;
        let db = self.b as f32 - other.b as f32;
        (dr * dr + dg * dg + db * db).sqrt()
    }

    /// Lowercase `#rrggbb`.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Parse `#rrggbb` or `rrggbb` (either case).
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(Error::InvalidHex(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| Error::InvalidHex(hex.to_string()))
        };
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hsv(&self) -> Hsv {
        rgb_to_hsv(*self)
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(c: [u8; 3]) -> Self {
        Rgb::new(c[0], c[1], c[2])
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(c: Rgb) -> Self {
        [c.r, c.g, c.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}]", self.r, self.g, self.b)
    }
}

/// Hue in degrees `[0, 360)`, saturation and value in percent `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    pub hue: f64,
    pub saturation: f64,
    pub value: f64,
}

impl Hsv {
    pub const fn new(hue: f64, saturation: f64, value: f64) -> Self {
        Self {
            hue,
            saturation,
            value,
        }
    }
}

#[inline]
fn clamp_channel(v: f32) -> u8 {
    v.clamp(0.0, 255.0) as u8
}

/// Convert RGB to HSV.
///
/// Computed in `f64` on channel fractions; inputs on a threshold such as
/// hue 160 or value 60 convert exactly.
pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let r = rgb.r as f64 / 255.0;
    let g = rgb.g as f64 / 255.0;
    let b = rgb.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let range = max - min;

    let value = max * 100.0;
    if range == 0.0 {
        return Hsv::new(0.0, 0.0, value);
    }
    let saturation = range / max * 100.0;

    // Distance of each channel from the max, relative to the range.
    let rc = (max - r) / range;
    let gc = (max - g) / range;
    let bc = (max - b) / range;

    // Ties resolve red, then green, then blue.
    let sector = if r == max {
        bc - gc
    } else if g == max {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    let hue = (sector / 6.0).rem_euclid(1.0) * 360.0;

    Hsv::new(hue, saturation, value)
}

/// Convert HSV back to RGB, rounding each channel to the nearest integer.
pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let v = (hsv.value / 100.0).clamp(0.0, 1.0);
    let s = (hsv.saturation / 100.0).clamp(0.0, 1.0);
    let h = hsv.hue.rem_euclid(360.0) / 60.0;

    let c = v * s;
    let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
    let m = v - c;

    let (r, g, b) = match h as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    let to_u8 = |ch: f64| clamp_channel(((ch + m) * 255.0).round() as f32);
    Rgb::new(to_u8(r), to_u8(g), to_u8(b))
}
