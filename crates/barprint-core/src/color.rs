//! Colors carried in both the RGB and CMYK models.
//!
//! A [`DualColor`] stores an additive RGB triple and a subtractive CMYK
//! quadruple side by side.  Vector exports pick whichever model the caller
//! asked for; raster exports always use RGB.  When only one model is
//! supplied the other is derived once, analytically, at construction and
//! is never recomputed afterwards.  Two colors that look the same in RGB
//! but carry different CMYK values are *not* equal.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::CoreError;

/// Upper bound of a CMYK component (percent).
pub const CMYK_MAX: u8 = 100;

/// One color in both RGB (`0..=255`) and CMYK (`0..=100`) form.
///
/// Deserialization goes through [`DualColor::new`], so out-of-range CMYK
/// components are clamped there too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawDualColor")]
pub struct DualColor {
    red: u8,
    green: u8,
    blue: u8,
    cyan: u8,
    magenta: u8,
    yellow: u8,
    key: u8,
}

/// Serialized field layout of [`DualColor`], before clamping.
#[derive(Deserialize)]
struct RawDualColor {
    red: u8,
    green: u8,
    blue: u8,
    cyan: u8,
    magenta: u8,
    yellow: u8,
    key: u8,
}

impl From<RawDualColor> for DualColor {
    fn from(raw: RawDualColor) -> Self {
        Self::new(
            raw.red,
            raw.green,
            raw.blue,
            raw.cyan,
            raw.magenta,
            raw.yellow,
            raw.key,
        )
    }
}

impl DualColor {
    /// Opaque black: RGB `0,0,0`, CMYK `0,0,0,100`.
    pub const BLACK: Self = Self {
        red: 0,
        green: 0,
        blue: 0,
        cyan: 0,
        magenta: 0,
        yellow: 0,
        key: CMYK_MAX,
    };

    /// White: RGB `255,255,255`, CMYK `0,0,0,0`.
    pub const WHITE: Self = Self {
        red: 255,
        green: 255,
        blue: 255,
        cyan: 0,
        magenta: 0,
        yellow: 0,
        key: 0,
    };

    /// Build a color from explicit values in both models.
    ///
    /// No conversion takes place.  CMYK components above 100 are clamped.
    #[must_use]
    #[allow(clippy::too_many_arguments, clippy::many_single_char_names)]
    pub fn new(r: u8, g: u8, b: u8, c: u8, m: u8, y: u8, k: u8) -> Self {
        Self {
            red: r,
            green: g,
            blue: b,
            cyan: c.min(CMYK_MAX),
            magenta: m.min(CMYK_MAX),
            yellow: y.min(CMYK_MAX),
            key: k.min(CMYK_MAX),
        }
    }

    /// Build a color from RGB, deriving CMYK.
    ///
    /// `k = min(1 - r, 1 - g, 1 - b)` on unit-scaled channels, then each of
    /// `c`, `m`, `y` is `(1 - channel - k) / (1 - k)`, or zero for pure black.
    #[must_use]
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let rf = f64::from(r) / 255.0;
        let gf = f64::from(g) / 255.0;
        let bf = f64::from(b) / 255.0;

        let k = (1.0 - rf).min(1.0 - gf).min(1.0 - bf);
        let (c, m, y) = if k < 1.0 {
            (
                (1.0 - rf - k) / (1.0 - k),
                (1.0 - gf - k) / (1.0 - k),
                (1.0 - bf - k) / (1.0 - k),
            )
        } else {
            (0.0, 0.0, 0.0)
        };

        Self {
            red: r,
            green: g,
            blue: b,
            cyan: to_percent(c),
            magenta: to_percent(m),
            yellow: to_percent(y),
            key: to_percent(k),
        }
    }

    /// Build a color from CMYK percentages, deriving RGB.
    ///
    /// Components above 100 are clamped.  Each channel is
    /// `255 * (1 - c) * (1 - k)` rounded to the nearest integer.
    #[must_use]
    pub fn from_cmyk(c: u8, m: u8, y: u8, k: u8) -> Self {
        let c = c.min(CMYK_MAX);
        let m = m.min(CMYK_MAX);
        let y = y.min(CMYK_MAX);
        let k = k.min(CMYK_MAX);
        let kf = 1.0 - f64::from(k) / 100.0;
        let channel = |v: u8| to_byte(255.0 * (1.0 - f64::from(v) / 100.0) * kf);

        Self {
            red: channel(c),
            green: channel(m),
            blue: channel(y),
            cyan: c,
            magenta: m,
            yellow: y,
            key: k,
        }
    }

    /// Decode the combined 64-bit form produced by [`to_bits`](Self::to_bits).
    ///
    /// The high 32 bits hold `0x00RRGGBB`, the low 32 bits `0xCCMMYYKK`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_bits(bits: u64) -> Self {
        let byte = |shift: u32| ((bits >> shift) & 0xFF) as u8;
        Self::new(
            byte(48),
            byte(40),
            byte(32),
            byte(24),
            byte(16),
            byte(8),
            byte(0),
        )
    }

    /// Combined 64-bit form: RGB in the high word, CMYK in the low word.
    #[must_use]
    pub fn to_bits(&self) -> u64 {
        (u64::from(self.rgb_bits()) << 32) | u64::from(self.cmyk_bits())
    }

    /// `0x00RRGGBB`.
    #[must_use]
    pub fn rgb_bits(&self) -> u32 {
        u32::from(self.red) << 16 | u32::from(self.green) << 8 | u32::from(self.blue)
    }

    /// `0xCCMMYYKK`.
    #[must_use]
    pub fn cmyk_bits(&self) -> u32 {
        u32::from(self.cyan) << 24
            | u32::from(self.magenta) << 16
            | u32::from(self.yellow) << 8
            | u32::from(self.key)
    }

    /// `(red, green, blue)`.
    #[must_use]
    pub const fn rgb(&self) -> (u8, u8, u8) {
        (self.red, self.green, self.blue)
    }

    /// `(cyan, magenta, yellow, key)` in percent.
    #[must_use]
    pub const fn cmyk(&self) -> (u8, u8, u8, u8) {
        (self.cyan, self.magenta, self.yellow, self.key)
    }

    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    #[must_use]
    pub const fn cyan(&self) -> u8 {
        self.cyan
    }

    #[must_use]
    pub const fn magenta(&self) -> u8 {
        self.magenta
    }

    #[must_use]
    pub const fn yellow(&self) -> u8 {
        self.yellow
    }

    #[must_use]
    pub const fn key(&self) -> u8 {
        self.key
    }

    /// True when the RGB channels are equal (a shade of gray).
    #[must_use]
    pub const fn is_achromatic(&self) -> bool {
        self.red == self.green && self.green == self.blue
    }

    /// Lowercase `#rrggbb` hex triplet of the RGB part.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("#{:06x}", self.rgb_bits())
    }
}

impl Default for DualColor {
    fn default() -> Self {
        Self::BLACK
    }
}

impl FromStr for DualColor {
    type Err = CoreError;

    /// Parse `#rrggbb`, `#rgb`, or `cmyk(c,m,y,k)`.
    #[allow(clippy::cast_possible_truncation)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || CoreError::InvalidArgument(format!("unrecognised color: {s:?}"));

        if let Some(hex) = s.strip_prefix('#') {
            let digits: Vec<u8> = hex
                .chars()
                .map(|ch| ch.to_digit(16).map(|d| d as u8))
                .collect::<Option<_>>()
                .ok_or_else(invalid)?;
            return match digits.as_slice() {
                [r, g, b] => Ok(Self::from_rgb(r * 17, g * 17, b * 17)),
                [r1, r2, g1, g2, b1, b2] => {
                    Ok(Self::from_rgb(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2))
                }
                _ => Err(invalid()),
            };
        }

        if let Some(body) = s
            .strip_prefix("cmyk(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<u8> = body
                .split(',')
                .map(|p| p.trim().parse::<u8>().ok().filter(|v| *v <= CMYK_MAX))
                .collect::<Option<_>>()
                .ok_or_else(invalid)?;
            return match parts.as_slice() {
                [c, m, y, k] => Ok(Self::from_cmyk(*c, *m, *y, *k)),
                _ => Err(invalid()),
            };
        }

        Err(invalid())
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_percent(unit: f64) -> u8 {
    (unit * 100.0).round().clamp(0.0, 100.0) as u8
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_byte(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}
