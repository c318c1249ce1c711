use serde::{Deserialize, Serialize};

/// Opaque sRGB colour used for strokes, labels, grid lines and highlights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Build a colour from 8-bit channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#RGB` or `#RRGGBB` (case-insensitive, `#` optional).
    pub fn parse_hex(s: &str) -> Result<Self, String> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> Result<u8, String> {
            u8::from_str_radix(pair, 16).map_err(|_| format!("invalid hex byte \"{pair}\""))
        }

        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("colour \"#{s}\" has non-hex digits"));
        }

        match s.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, ch) in out.iter_mut().zip(s.chars()) {
                    let nib = hex_byte(&ch.to_string())?;
                    *slot = nib * 17;
                }
                Ok(Self::rgb(out[0], out[1], out[2]))
            }
            6 => Ok(Self::rgb(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            _ => Err(format!(
                "colour \"{s}\" must be #RGB or #RRGGBB (case-insensitive)"
            )),
        }
    }

    /// Lowercase `#rrggbb` form, as written into SVG attributes.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Convert hue/saturation/brightness (all normalized to `[0, 1]`) to RGB.
    pub fn from_hsb(h: f64, s: f64, b: f64) -> Self {
        let h = h.rem_euclid(1.0) * 6.0;
        let s = s.clamp(0.0, 1.0);
        let v = b.clamp(0.0, 1.0);

        let c = v * s;
        let x = c * (1.0 - ((h % 2.0) - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = v - c;

        fn to_u8(x: f64) -> u8 {
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Self::rgb(to_u8(r + m), to_u8(g + m), to_u8(b + m))
    }
}

impl Serialize for Color {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            RgbObj { r: u8, g: u8, b: u8 },
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => Self::parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::RgbObj { r, g, b } => Ok(Self::rgb(r, g, b)),
        }
    }
}

/// Resting colour of a drawn stroke: fixed, or drawn from the backend's colour generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrokeColor {
    /// Always this colour.
    Fixed(Color),
    /// The literal keyword `"random"`.
    Random,
}

impl Serialize for StrokeColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Self::Fixed(c) => c.serialize(serializer),
            Self::Random => serializer.serialize_str("random"),
        }
    }
}

impl<'de> Deserialize<'de> for StrokeColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if s.trim().eq_ignore_ascii_case("random") {
            return Ok(Self::Random);
        }
        Color::parse_hex(&s)
            .map(Self::Fixed)
            .map_err(serde::de::Error::custom)
    }
}

/// Deterministic hue-cycling colour generator.
///
/// Walks the hue circle in steps of `0.075` at full saturation; each completed lap lowers
/// saturation by `0.2`, wrapping back to full saturation once it reaches zero.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorWheel {
    h: f64,
    s: f64,
    b: f64,
}

impl ColorWheel {
    const HUE_STEP: f64 = 0.075;
    const SAT_STEP: f64 = 0.2;

    /// Start a wheel at hue 0 with the given brightness.
    pub fn new(brightness: f64) -> Self {
        Self {
            h: 0.0,
            s: 1.0,
            b: brightness.clamp(0.0, 1.0),
        }
    }

    /// Produce the next colour and advance the wheel.
    pub fn next_color(&mut self) -> Color {
        let out = Color::from_hsb(self.h, self.s, self.b);
        self.h += Self::HUE_STEP;
        if self.h > 1.0 {
            self.h = 0.0;
            self.s -= Self::SAT_STEP;
            if self.s <= 0.0 {
                self.s = 1.0;
            }
        }
        out
    }
}

impl Default for ColorWheel {
    fn default() -> Self {
        Self::new(0.75)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/color.rs"]
mod tests;
