//! Colors: true-color RGB values and the 3-bit wire color mask.
//!
//! The wire protocol only carries one bit per channel, so every color that
//! reaches the grid is one of eight corners of the RGB cube. The grid itself
//! stores full 24-bit values so a display sink never has to know about masks.

use bitflags::bitflags;

/// True-color RGB representation.
///
/// Uses 3 bytes for 24-bit color depth.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Black (0, 0, 0), the color of every cell before its first update.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// White (255, 255, 255)
    pub const WHITE: Self = Self::new(255, 255, 255);

    /// Expand a wire color mask to full-intensity channels.
    #[inline]
    pub const fn from_mask(mask: ColorMask) -> Self {
        const fn channel(on: bool) -> u8 {
            if on {
                u8::MAX
            } else {
                0
            }
        }

        Self::new(
            channel(mask.contains(ColorMask::RED)),
            channel(mask.contains(ColorMask::GREEN)),
            channel(mask.contains(ColorMask::BLUE)),
        )
    }
}

impl std::fmt::Debug for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

impl From<(u8, u8, u8)> for Rgb {
    #[inline]
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

impl From<Rgb> for (u8, u8, u8) {
    #[inline]
    fn from(color: Rgb) -> Self {
        (color.r, color.g, color.b)
    }
}

impl From<ColorMask> for Rgb {
    #[inline]
    fn from(mask: ColorMask) -> Self {
        Self::from_mask(mask)
    }
}

bitflags! {
    /// Color bits carried in byte 2 of a wire record.
    ///
    /// Only the low three bits are meaningful; the rest are dropped by
    /// [`ColorMask::from_byte`].
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ColorMask: u8 {
        /// Blue channel on
        const BLUE = 0b0000_0001;
        /// Green channel on
        const GREEN = 0b0000_0010;
        /// Red channel on
        const RED = 0b0000_0100;
    }
}

impl ColorMask {
    /// Take the color bits out of a raw wire byte.
    #[inline]
    pub const fn from_byte(byte: u8) -> Self {
        Self::from_bits_truncate(byte)
    }
}

impl std::fmt::Debug for ColorMask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_channels() {
        assert_eq!(Rgb::from_mask(ColorMask::from_byte(0b000)), Rgb::BLACK);
        assert_eq!(Rgb::from_mask(ColorMask::from_byte(0b111)), Rgb::WHITE);
        assert_eq!(Rgb::from_mask(ColorMask::from_byte(0b100)), Rgb::new(255, 0, 0));
        assert_eq!(Rgb::from_mask(ColorMask::from_byte(0b010)), Rgb::new(0, 255, 0));
        assert_eq!(Rgb::from_mask(ColorMask::from_byte(0b001)), Rgb::new(0, 0, 255));
        assert_eq!(Rgb::from_mask(ColorMask::from_byte(0b110)), Rgb::new(255, 255, 0));
        assert_eq!(Rgb::from_mask(ColorMask::from_byte(0b101)), Rgb::new(255, 0, 255));
    }

    #[test]
    fn test_mask_ignores_high_bits() {
        assert_eq!(ColorMask::from_byte(0b1111_1000), ColorMask::empty());
        assert_eq!(ColorMask::from_byte(0b1000_0101), ColorMask::RED | ColorMask::BLUE);
    }

    #[test]
    fn test_rgb_hex_format() {
        assert_eq!(Rgb::new(255, 0, 255).to_string(), "#ff00ff");
        assert_eq!(format!("{:?}", Rgb::BLACK), "#000000");
    }
}
