// src/color.rs

use std::ops::{Add, Sub};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("expected hex color of the form #RRGGBBAA, got {0:?}")]
    HexLength(String),
    #[error("invalid hex digits in {0:?}")]
    HexDigits(String),
    #[error("expected 4 decimal channels \"r g b a\", got {0:?}")]
    DecimalChannels(String),
}

/// RGBA color, one unsigned byte per channel.
///
/// Channel arithmetic wraps modulo 256 rather than saturating. That matches
/// the original renderer this tool descends from; whether the wrap is
/// intended there is unclear, so the behavior is preserved and pinned by
/// tests instead of being silently "fixed".
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    /// Sentinel returned for unresolvable color names.
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `blend = 0` returns `self`, `blend = 1` returns `other`. Channels are
    /// reduced modulo 256, so a `blend` outside `[0, 1]` wraps.
    pub fn lerp(self, other: Color, blend: f32) -> Color {
        let mix = |a: u8, b: u8| {
            let v = f32::from(a) * (1.0 - blend) + f32::from(b) * blend;
            v.rem_euclid(256.0) as u8
        };
        Color::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    /// Packs to `0xRRGGBBAA`.
    pub fn to_u32(self) -> u32 {
        (u32::from(self.r) << 24)
            | (u32::from(self.g) << 16)
            | (u32::from(self.b) << 8)
            | u32::from(self.a)
    }

    pub fn from_u32(packed: u32) -> Self {
        Color::new(
            (packed >> 24) as u8,
            (packed >> 16) as u8,
            (packed >> 8) as u8,
            packed as u8,
        )
    }

    /// Channels normalized to `[0, 1]`, for clear colors and uniforms.
    pub fn normalized(self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    fn parse_hex(s: &str) -> Result<Self, ColorParseError> {
        let digits = &s[1..];
        if digits.len() != 8 {
            return Err(ColorParseError::HexLength(s.to_string()));
        }
        if !digits.is_ascii() {
            return Err(ColorParseError::HexDigits(s.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ColorParseError::HexDigits(s.to_string()))
        };
        Ok(Color::new(
            channel(0..2)?,
            channel(2..4)?,
            channel(4..6)?,
            channel(6..8)?,
        ))
    }

    fn parse_decimal(s: &str) -> Result<Self, ColorParseError> {
        let mut channels = [0u8; 4];
        let mut count = 0;
        for token in s.split_whitespace() {
            if count == 4 {
                return Err(ColorParseError::DecimalChannels(s.to_string()));
            }
            channels[count] = token
                .parse()
                .map_err(|_| ColorParseError::DecimalChannels(s.to_string()))?;
            count += 1;
        }
        if count != 4 {
            return Err(ColorParseError::DecimalChannels(s.to_string()));
        }
        Ok(Color::new(channels[0], channels[1], channels[2], channels[3]))
    }

    fn lookup_named(name: &str) -> Color {
        match named_color(name) {
            Some(color) => color,
            None => {
                log::warn!("color name {name:?} not known, using transparent black");
                Color::TRANSPARENT
            }
        }
    }
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::new(
            self.r.wrapping_add(rhs.r),
            self.g.wrapping_add(rhs.g),
            self.b.wrapping_add(rhs.b),
            self.a.wrapping_add(rhs.a),
        )
    }
}

impl Sub for Color {
    type Output = Color;

    fn sub(self, rhs: Color) -> Color {
        Color::new(
            self.r.wrapping_sub(rhs.r),
            self.g.wrapping_sub(rhs.g),
            self.b.wrapping_sub(rhs.b),
            self.a.wrapping_sub(rhs.a),
        )
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts `#RRGGBBAA` hex, `"r g b a"` decimal bytes, or a known color
    /// name. An unknown name is not an error: it resolves to
    /// [`Color::TRANSPARENT`] with a logged warning.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with('#') {
            Color::parse_hex(s)
        } else if s.starts_with(|c: char| c.is_ascii_digit()) {
            Color::parse_decimal(s)
        } else {
            Ok(Color::lookup_named(s))
        }
    }
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name {
        "black" => Color::new(0x00, 0x00, 0x00, 0xff),
        "white" => Color::new(0xff, 0xff, 0xff, 0xff),
        "red" => Color::new(0xe0, 0x3e, 0x41, 0xff),
        "green" => Color::new(0x8a, 0xbc, 0x3f, 0xff),
        "blue" => Color::new(0x3c, 0xa4, 0xcb, 0xff),
        "pink" => Color::new(0xcc, 0x66, 0x9c, 0xff),
        "light gray" => Color::new(0xdb, 0xdb, 0xdb, 0xff),
        "dark gray" => Color::new(0x48, 0x48, 0x48, 0xff),
        _ => return None,
    };
    Some(color)
}
