use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const FLOAT_ERROR: f64 = 5e-7;

/// RGBA color with unclamped floating point channels.
///
/// Channels may leave `[0, 1]` after arithmetic (wall illumination of
/// construction sites does that on purpose); values are clamped only when a
/// backend turns the color into bytes or text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid color `{0}`")]
pub struct ColorParseError(pub String);

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha: 1.0,
        }
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        Self { alpha, ..self }
    }

    /// Adds `delta` to every color channel, leaving alpha alone.
    pub fn shifted(self, delta: f64) -> Self {
        Self {
            red: self.red + delta,
            green: self.green + delta,
            blue: self.blue + delta,
            alpha: self.alpha,
        }
    }

    pub fn clamped(self) -> Self {
        Self {
            red: self.red.clamp(0.0, 1.0),
            green: self.green.clamp(0.0, 1.0),
            blue: self.blue.clamp(0.0, 1.0),
            alpha: self.alpha.clamp(0.0, 1.0),
        }
    }

    /// HSL lightness.
    pub fn luminance(&self) -> f64 {
        self.to_hsl().2
    }

    pub fn with_luminance(self, luminance: f64) -> Self {
        let (h, s, _) = self.to_hsl();
        let (red, green, blue) = hsl_to_rgb(h, s, luminance);
        Self {
            red,
            green,
            blue,
            alpha: self.alpha,
        }
    }

    /// Multiplies HSL lightness by `factor`.
    pub fn darkened(self, factor: f64) -> Self {
        let luminance = self.luminance();
        self.with_luminance(luminance * factor)
    }

    pub fn to_rgba8(&self) -> [u8; 4] {
        let c = self.clamped();
        [
            channel_to_u8(c.red),
            channel_to_u8(c.green),
            channel_to_u8(c.blue),
            channel_to_u8(c.alpha),
        ]
    }

    /// `#rrggbb`, ignoring alpha.
    pub fn to_hex(&self) -> String {
        let [r, g, b, _] = self.to_rgba8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    fn to_hsl(self) -> (f64, f64, f64) {
        let (r, g, b) = (self.red, self.green, self.blue);
        let vmin = r.min(g).min(b);
        let vmax = r.max(g).max(b);
        let diff = vmax - vmin;
        let vsum = vmin + vmax;
        let l = vsum / 2.0;

        if diff < FLOAT_ERROR {
            return (0.0, 0.0, l);
        }

        let s = if l < 0.5 {
            diff / vsum
        } else {
            diff / (2.0 - vsum)
        };

        let dr = ((vmax - r) / 6.0 + diff / 2.0) / diff;
        let dg = ((vmax - g) / 6.0 + diff / 2.0) / diff;
        let db = ((vmax - b) / 6.0 + diff / 2.0) / diff;

        let mut h = if r == vmax {
            db - dg
        } else if g == vmax {
            1.0 / 3.0 + dr - db
        } else {
            2.0 / 3.0 + dg - dr
        };
        if h < 0.0 {
            h += 1.0;
        }
        if h > 1.0 {
            h -= 1.0;
        }
        (h, s, l)
    }
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let v2 = if l < 0.5 { l * (1.0 + s) } else { (l + s) - s * l };
    let v1 = 2.0 * l - v2;
    (
        hue_to_rgb(v1, v2, h + 1.0 / 3.0),
        hue_to_rgb(v1, v2, h),
        hue_to_rgb(v1, v2, h - 1.0 / 3.0),
    )
}

fn hue_to_rgb(v1: f64, v2: f64, mut hue: f64) -> f64 {
    while hue < 0.0 {
        hue += 1.0;
    }
    while hue > 1.0 {
        hue -= 1.0;
    }
    if 6.0 * hue < 1.0 {
        return v1 + (v2 - v1) * 6.0 * hue;
    }
    if 2.0 * hue < 1.0 {
        return v2;
    }
    if 3.0 * hue < 2.0 {
        return v1 + (v2 - v1) * (2.0 / 3.0 - hue) * 6.0;
    }
    v1
}

fn channel_to_u8(value: f64) -> u8 {
    (value * 255.0).round() as u8
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = svgtypes::Color::from_str(s.trim()).map_err(|_| ColorParseError(s.to_string()))?;
        Ok(Self {
            red: f64::from(parsed.red) / 255.0,
            green: f64::from(parsed.green) / 255.0,
            blue: f64::from(parsed.blue) / 255.0,
            alpha: f64::from(parsed.alpha) / 255.0,
        })
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_rgba8();
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "rgba({r}, {g}, {b}, {})", f64::from(a) / 255.0)
        }
    }
}
