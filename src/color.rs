// src/color.rs

//! Defines the named drawing colors (`Color`) and their concrete `Rgb` values.

use serde::{Deserialize, Serialize};

/// A concrete 24-bit color as understood by the raster backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Packs this color as `0x00RRGGBB`, the pixel layout used by `Raster`.
    pub fn to_pixel(self) -> u32 {
        let Rgb(r, g, b) = self;
        (r as u32) << 16 | (g as u32) << 8 | b as u32
    }

    /// Unpacks a `0x00RRGGBB` pixel.
    pub fn from_pixel(pixel: u32) -> Self {
        Rgb((pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8)
    }
}

/// A named drawing color.
///
/// Colors are plain tags: two colors are equal exactly when they name the
/// same tag. The concrete value comes from [`Color::to_rgb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Black,
    White,
    Red,
    Green,
    Blue,
    Yellow,
    Orange,
    Pink,
    Magenta,
    Cyan,
    Gray,
    LightGray,
    DarkGray,
}

impl Color {
    /// Every named color, in declaration order.
    pub const ALL: [Color; 13] = [
        Color::Black,
        Color::White,
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Orange,
        Color::Pink,
        Color::Magenta,
        Color::Cyan,
        Color::Gray,
        Color::LightGray,
        Color::DarkGray,
    ];

    /// Returns the concrete color value for this tag.
    /// Values follow the classic AWT palette.
    pub fn to_rgb(self) -> Rgb {
        match self {
            Color::Black => Rgb(0, 0, 0),
            Color::White => Rgb(255, 255, 255),
            Color::Red => Rgb(255, 0, 0),
            Color::Green => Rgb(0, 255, 0),
            Color::Blue => Rgb(0, 0, 255),
            Color::Yellow => Rgb(255, 255, 0),
            Color::Orange => Rgb(255, 200, 0),
            Color::Pink => Rgb(255, 175, 175),
            Color::Magenta => Rgb(255, 0, 255),
            Color::Cyan => Rgb(0, 255, 255),
            Color::Gray => Rgb(128, 128, 128),
            Color::LightGray => Rgb(192, 192, 192),
            Color::DarkGray => Rgb(64, 64, 64),
        }
    }

    /// Shorthand for `self.to_rgb().to_pixel()`.
    pub fn to_pixel(self) -> u32 {
        self.to_rgb().to_pixel()
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::Black
    }
}

impl From<Color> for Rgb {
    fn from(color: Color) -> Self {
        color.to_rgb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn pixel_packing_is_rrggbb() {
        assert_eq!(Rgb(0x12, 0x34, 0x56).to_pixel(), 0x0012_3456);
        assert_eq!(Rgb::from_pixel(0x00ab_cdef), Rgb(0xab, 0xcd, 0xef));
        assert_eq!(Rgb::from_pixel(Color::Orange.to_pixel()), Color::Orange.to_rgb());
    }

    #[test]
    fn equality_is_tag_equality() {
        assert_eq!(Color::Blue, Color::Blue);
        assert_ne!(Color::Gray, Color::LightGray);
        let distinct: HashSet<Rgb> = Color::ALL.iter().map(|c| c.to_rgb()).collect();
        assert_eq!(distinct.len(), Color::ALL.len());
    }

    #[test]
    fn deserializes_from_snake_case_names() {
        let color: Color = serde_json::from_str("\"light_gray\"").unwrap();
        assert_eq!(color, Color::LightGray);
    }
}
